use mung::common::{DVec, Mat};
use mung::error::MungError;
use mung::graph_metric::NodeMetric;
use mung::power::*;

fn seeded(nodes: usize, effect: f64, num_iters: usize, seed: u64) -> PowerArgs {
    PowerArgs {
        num_iters,
        rseed: Some(seed),
        ..PowerArgs::new(nodes, effect, 1.0, 0.5)
    }
}

#[test]
fn small_network_has_modest_power() -> anyhow::Result<()> {
    let args = PowerArgs {
        rseed: Some(42),
        ..PowerArgs::new(8, 0.5, 1.78, 0.274)
    };
    let res = power_nodereg(&args)?;
    assert_eq!(res.num_valid + res.num_failed, 1000);
    assert!(res.power > 0.15 && res.power < 0.35, "power = {}", res.power);
    assert!(res.standard_error() > 0.0 && res.standard_error() < 0.02);
    Ok(())
}

#[test]
fn power_grows_with_effect() -> anyhow::Result<()> {
    let weak = power_nodereg(&seeded(20, 0.1, 300, 1))?;
    let strong = power_nodereg(&seeded(20, 0.7, 300, 1))?;
    assert!((0.0..=1.0).contains(&weak.power));
    assert!((0.0..=1.0).contains(&strong.power));
    assert!(strong.power > weak.power + 0.3);
    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> anyhow::Result<()> {
    let args = seeded(10, 0.4, 200, 2024);
    assert_eq!(power_nodereg(&args)?, power_nodereg(&args)?);
    Ok(())
}

#[test]
fn more_iterations_reduce_spread() -> anyhow::Result<()> {
    let spread = |num_iters: usize| -> anyhow::Result<f64> {
        let powers = (0..8)
            .map(|rep| -> anyhow::Result<f64> {
                Ok(power_nodereg(&seeded(10, 0.5, num_iters, rep * 10_000))?.power)
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        Ok(matrix_util::vector_stat::sd(&powers))
    };
    assert!(spread(500)? < spread(10)?);
    Ok(())
}

#[test]
fn every_metric_yields_a_probability() -> anyhow::Result<()> {
    for metric in [
        NodeMetric::Strength,
        NodeMetric::Eigenvector,
        NodeMetric::Closeness,
        NodeMetric::Betweenness,
    ] {
        for directed in [false, true] {
            let args = PowerArgs {
                metric: metric.clone(),
                directed,
                ..seeded(8, 0.5, 50, 3)
            };
            let res = power_nodereg(&args)?;
            assert!((0.0..=1.0).contains(&res.power), "{:?}", metric);
            assert_eq!(res.num_valid + res.num_failed, 50);
        }
    }
    Ok(())
}

#[test]
fn two_nodes_skip_every_iteration() -> anyhow::Result<()> {
    let res = power_nodereg(&seeded(2, 0.5, 20, 0))?;
    assert_eq!(res.power, 0.0);
    assert_eq!(res.num_valid, 0);
    assert_eq!(res.num_failed, 20);
    assert_eq!(res.standard_error(), 0.0);

    let abort = PowerArgs {
        on_failure: FailurePolicy::Abort,
        ..seeded(2, 0.5, 20, 0)
    };
    assert!(matches!(
        power_nodereg(&abort),
        Err(MungError::Regression(_))
    ));
    Ok(())
}

#[test]
fn constant_custom_metric_cannot_be_tested() -> anyhow::Result<()> {
    let args = PowerArgs {
        metric: NodeMetric::custom(|g| DVec::from_element(g.num_nodes(), 1.0)),
        ..seeded(6, 0.5, 10, 0)
    };
    let res = power_nodereg(&args)?;
    assert_eq!(res.num_valid, 0);
    assert_eq!(res.power, 0.0);
    Ok(())
}

#[test]
fn effort_matrix_is_used_as_given() -> anyhow::Result<()> {
    let nodes = 6;
    let effort = Mat::from_fn(nodes, nodes, |i, j| if i == j { 0.0 } else { 25.0 });
    let args = PowerArgs {
        sampling_effort: SamplingEffort::Matrix(effort),
        ..seeded(nodes, 0.5, 20, 0)
    };
    let res = power_nodereg(&args)?;
    assert!((0.0..=1.0).contains(&res.power));

    let wrong = PowerArgs {
        sampling_effort: SamplingEffort::Matrix(Mat::from_element(3, 3, 1.0)),
        ..seeded(nodes, 0.5, 20, 0)
    };
    assert!(matches!(
        power_nodereg(&wrong),
        Err(MungError::InvalidParameter {
            name: "sampling_effort",
            ..
        })
    ));
    Ok(())
}

#[test]
fn invalid_arguments_are_rejected() {
    for args in [
        seeded(1, 0.5, 10, 0),
        seeded(8, 1.0, 10, 0),
        seeded(8, 0.0, 10, 0),
        seeded(8, 0.5, 0, 0),
        PowerArgs::new(8, 0.5, -1.0, 0.5),
        PowerArgs::new(8, 0.5, 1.0, 0.0),
        PowerArgs {
            significance: 0.0,
            ..seeded(8, 0.5, 10, 0)
        },
    ] {
        assert!(matches!(
            power_nodereg(&args),
            Err(MungError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn effect_slope_reproduces_the_correlation() {
    // corr(m, 1 + β m + ε) with var(m) = sd² and var(ε) = 1
    let (r, metric_sd) = (0.4_f64, 2.5_f64);
    let beta = effect_slope(r, metric_sd);
    let signal = beta * metric_sd;
    approx::assert_abs_diff_eq!(signal / (signal * signal + 1.0).sqrt(), r, epsilon = 1e-12);
}

#[test]
fn parameters_pair_up_or_broadcast() -> anyhow::Result<()> {
    assert_eq!(
        pair_parameters(&[1.0, 2.0, 3.0], &[0.5])?,
        vec![(1.0, 0.5), (2.0, 0.5), (3.0, 0.5)]
    );
    assert_eq!(
        pair_parameters(&[1.0, 2.0], &[0.1, 0.2])?,
        vec![(1.0, 0.1), (2.0, 0.2)]
    );
    assert!(pair_parameters(&[1.0, 2.0], &[0.1, 0.2, 0.3]).is_err());
    assert!(pair_parameters(&[], &[0.1]).is_err());
    Ok(())
}
