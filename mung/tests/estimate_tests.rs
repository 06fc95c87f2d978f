use mung::common::Mat;
use mung::error::MungError;
use mung::estimate::*;
use mung::gamma_poisson::{simulate, SimArgs};
use rand::SeedableRng;

fn fast_options() -> EstimateOptions {
    EstimateOptions {
        num_draws: 20_000,
        ..EstimateOptions::default()
    }
}

fn simulate_network(
    nodes: usize,
    mean_sampling_effort: f64,
    social_differentiation: f64,
    mean_rate: f64,
    directed: bool,
    seed: u64,
) -> anyhow::Result<(Mat, Mat)> {
    let args = SimArgs {
        nodes,
        mean_sampling_effort,
        social_differentiation,
        mean_rate,
        directed,
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let out = simulate(&args, &mut rng)?;
    Ok((out.counts, out.effort))
}

#[test]
fn recovers_parameters_of_a_large_network() -> anyhow::Result<()> {
    let (counts, effort) = simulate_network(40, 20.0, 1.0, 0.5, false, 7)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(8);
    let est = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng)?;

    assert_eq!(est.fit.num_dyads, 40 * 39 / 2);
    assert_eq!(est.summary.rows.len(), 6);

    let sd_hat = est.summary.get(ESTIMATED_SOCIAL_DIFFERENTIATION).unwrap();
    let mu_hat = est.summary.get(ESTIMATED_INTERACTION_RATE).unwrap();
    let rho_hat = est.summary.get(ESTIMATED_CORRELATION).unwrap();

    assert!((sd_hat.estimate - 1.0).abs() < 0.2, "S = {}", sd_hat.estimate);
    assert!((mu_hat.estimate - 0.5).abs() < 0.1, "mu = {}", mu_hat.estimate);

    let lb = rho_hat.lower.unwrap();
    let ub = rho_hat.upper.unwrap();
    assert!(0.0 < lb && lb <= rho_hat.estimate && rho_hat.estimate <= ub && ub < 1.0);
    assert!(sd_hat.se.unwrap() > 0.0);

    // 1/sqrt(a) and a/b of the point estimate
    assert!((est.fit.shape() - 1.0).abs() < 0.4);
    assert!(est.fit.covariance[(0, 0)] > 0.0);
    Ok(())
}

#[test]
fn small_networks_mostly_cover_the_truth() -> anyhow::Result<()> {
    let (true_sd, true_rate) = (2.0, 0.5);
    let num_runs = 40;
    let mut covered_sd = 0;
    let mut covered_rate = 0;
    for seed in 0..num_runs {
        let (counts, effort) = simulate_network(8, 10.0, true_sd, true_rate, false, seed)?;
        let mut rng = rand::rngs::StdRng::seed_from_u64(100 + seed);
        let est = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng)?;
        let rows = &est.summary;
        if rows.get(ESTIMATED_SOCIAL_DIFFERENTIATION).unwrap().covers(true_sd) {
            covered_sd += 1;
        }
        if rows.get(ESTIMATED_INTERACTION_RATE).unwrap().covers(true_rate) {
            covered_rate += 1;
        }
    }
    assert!(covered_sd >= 32, "S covered {} of {}", covered_sd, num_runs);
    assert!(covered_rate >= 32, "mu covered {} of {}", covered_rate, num_runs);
    Ok(())
}

#[test]
fn correlation_grows_with_sampling_effort() -> anyhow::Result<()> {
    let mut rho_low = 0.0;
    let mut rho_high = 0.0;
    for seed in 0..5 {
        for (mean_effort, acc) in [(2.0, &mut rho_low), (50.0, &mut rho_high)] {
            let (counts, effort) = simulate_network(20, mean_effort, 1.0, 0.5, false, seed)?;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let est = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng)?;
            *acc += est.summary.get(ESTIMATED_CORRELATION).unwrap().estimate;
        }
    }
    assert!(rho_high > rho_low);
    Ok(())
}

#[test]
fn observed_statistics_need_no_fit() -> anyhow::Result<()> {
    let (counts, effort) = simulate_network(12, 10.0, 1.0, 0.5, false, 11)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let est = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng)?;
    for name in [
        OBSERVED_SOCIAL_DIFFERENTIATION,
        MEAN_INTERACTION_RATE,
        SAMPLING_EFFORT,
    ] {
        let row = est.summary.get(name).unwrap();
        assert!(row.estimate.is_finite() && row.estimate > 0.0);
        assert!(row.se.is_none() && row.lower.is_none() && row.upper.is_none());
    }
    assert!(est.sampling_effort.estimate > 0.0);
    assert!(est.qq.is_none());
    Ok(())
}

#[test]
fn directed_networks_use_both_triangles() -> anyhow::Result<()> {
    let (counts, effort) = simulate_network(10, 10.0, 1.0, 0.5, true, 5)?;
    let opts = EstimateOptions {
        qq_diagnostic: true,
        ..fast_options()
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(5);
    let est = estimate_correlation(&counts, &effort, true, &opts, &mut rng)?;
    assert_eq!(est.fit.num_dyads, 90);

    let qq = est.qq.unwrap();
    assert_eq!(qq.observed.len(), 90);
    assert_eq!(qq.fitted.len(), 90);
    assert!(qq.observed.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn two_nodes_fail_with_uncertainty_error() {
    let counts = Mat::from_row_slice(2, 2, &[0.0, 3.0, 3.0, 0.0]);
    let effort = Mat::from_row_slice(2, 2, &[0.0, 5.0, 5.0, 0.0]);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let res = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng);
    assert!(matches!(res, Err(MungError::UncertaintyPropagation(_))));
}

#[test]
fn zero_effort_is_floored() -> anyhow::Result<()> {
    let counts = Mat::from_row_slice(3, 3, &[0., 1., 0., 1., 0., 2., 0., 2., 0.]);
    let effort = Mat::from_row_slice(3, 3, &[0., 4., 0., 4., 0., 3., 0., 3., 0.]);
    let dyads = collect_dyads(&counts, &effort, false, 1.0)?;
    assert_eq!(dyads.len(), 3);
    assert!(dyads.iter().all(|d| d.effort >= 1.0));
    assert_eq!(dyads[1].effort, 1.0);
    Ok(())
}

#[test]
fn malformed_inputs_are_rejected() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let opts = fast_options();
    let square = Mat::from_element(3, 3, 1.0);

    let not_square = Mat::from_element(3, 2, 1.0);
    assert!(matches!(
        estimate_correlation(&not_square, &not_square, false, &opts, &mut rng),
        Err(MungError::InvalidParameter { .. })
    ));

    let other_shape = Mat::from_element(4, 4, 1.0);
    assert!(matches!(
        estimate_correlation(&square, &other_shape, false, &opts, &mut rng),
        Err(MungError::InvalidParameter { name: "effort", .. })
    ));

    let fractional = Mat::from_element(3, 3, 0.5);
    assert!(matches!(
        estimate_correlation(&fractional, &square, false, &opts, &mut rng),
        Err(MungError::InvalidParameter { name: "counts", .. })
    ));

    let bad_ci = EstimateOptions {
        confidence: 1.5,
        ..fast_options()
    };
    assert!(matches!(
        estimate_correlation(&square, &square, false, &bad_ci, &mut rng),
        Err(MungError::InvalidParameter {
            name: "confidence",
            ..
        })
    ));
}

#[test]
fn network_correlation_limits() {
    assert_eq!(network_correlation(1.0, 0.0), 0.0);
    let rho = network_correlation(1.0, 1e8);
    assert!(rho > 0.999 && rho < 1.0);
    approx::assert_abs_diff_eq!(network_correlation(1.0, 1.0), 0.5_f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn summary_table_writes_rounded_tsv() -> anyhow::Result<()> {
    let (counts, effort) = simulate_network(10, 10.0, 1.0, 0.5, false, 21)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(21);
    let est = estimate_correlation(&counts, &effort, false, &fast_options(), &mut rng)?;

    let dir = tempfile::tempdir()?;
    let file = dir.path().join("est.summary.tsv");
    let file = file.to_str().unwrap();
    est.summary.to_tsv(file)?;

    let lines = matrix_util::common_io::read_lines(file)?;
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0].as_ref(), "quantity\testimate\tse\t2.5%\t97.5%");
    assert!(lines[1].starts_with(OBSERVED_SOCIAL_DIFFERENTIATION));
    assert!(lines[1].ends_with("NA\tNA\tNA"));
    assert_eq!(lines[6].split('\t').count(), 5);
    Ok(())
}
