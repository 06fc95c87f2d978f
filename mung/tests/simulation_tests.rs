use mung::error::MungError;
use mung::gamma_poisson::*;
use rand::SeedableRng;

fn sim_args(nodes: usize, directed: bool) -> SimArgs {
    SimArgs {
        nodes,
        mean_sampling_effort: 10.0,
        social_differentiation: 2.0,
        mean_rate: 0.5,
        directed,
    }
}

#[test]
fn undirected_simulation_is_symmetric() -> anyhow::Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let out = simulate(&sim_args(8, false), &mut rng)?;

    for mat in [&out.counts, &out.effort, &out.rates] {
        assert_eq!(mat.shape(), (8, 8));
        for i in 0..8 {
            assert_eq!(mat[(i, i)], 0.0);
            for j in 0..8 {
                assert_eq!(mat[(i, j)], mat[(j, i)]);
            }
        }
    }

    for i in 0..8 {
        for j in 0..8 {
            if i != j {
                assert!(out.effort[(i, j)] >= 1.0);
            }
            let x = out.counts[(i, j)];
            assert!(x >= 0.0 && x.fract() == 0.0);
            assert!(out.rates[(i, j)] >= 0.0);
        }
    }
    Ok(())
}

#[test]
fn sampling_effort_mean_is_close_to_target() -> anyhow::Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let out = simulate(&sim_args(60, false), &mut rng)?;
    let (mut tot, mut num) = (0.0, 0.0);
    for j in 0..60 {
        for i in 0..j {
            tot += out.effort[(i, j)];
            num += 1.0;
        }
    }
    let avg = tot / num;
    assert!((avg - 10.0).abs() < 0.5, "mean effort {}", avg);
    Ok(())
}

#[test]
fn directed_simulation_draws_each_direction() -> anyhow::Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let out = simulate(&sim_args(10, true), &mut rng)?;
    let mut num_asymmetric = 0;
    for j in 0..10 {
        assert_eq!(out.rates[(j, j)], 0.0);
        for i in 0..j {
            if out.rates[(i, j)] != out.rates[(j, i)] {
                num_asymmetric += 1;
            }
        }
    }
    assert!(num_asymmetric > 40);
    Ok(())
}

#[test]
fn invalid_inputs_are_rejected() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let mut args = sim_args(1, false);
    assert!(matches!(
        simulate(&args, &mut rng),
        Err(MungError::InvalidParameter { name: "nodes", .. })
    ));

    args.nodes = 5;
    args.social_differentiation = 0.0;
    assert!(matches!(
        simulate(&args, &mut rng),
        Err(MungError::InvalidParameter { .. })
    ));

    args.social_differentiation = 1.0;
    args.mean_sampling_effort = -2.0;
    assert!(matches!(
        simulate(&args, &mut rng),
        Err(MungError::InvalidParameter {
            name: "mean_sampling_effort",
            ..
        })
    ));
}

#[test]
fn same_seed_same_network() -> anyhow::Result<()> {
    let args = sim_args(6, false);
    let a = simulate(&args, &mut rand::rngs::StdRng::seed_from_u64(9))?;
    let b = simulate(&args, &mut rand::rngs::StdRng::seed_from_u64(9))?;
    assert_eq!(a.counts, b.counts);
    assert_eq!(a.effort, b.effort);
    Ok(())
}
