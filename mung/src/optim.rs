//! Derivative-free minimization and numerical curvature

use crate::common::*;

/// Nelder-Mead options
#[derive(Debug, Clone)]
pub struct NelderMeadOptions {
    /// maximum number of iterations. Default: 2000
    pub max_iter: usize,
    /// relative tolerance on the spread of the simplex values. Default: 1e-10
    pub rel_tol: f64,
    /// absolute tolerance on the spread of the simplex values. Default: 1e-12
    pub abs_tol: f64,
    /// initial simplex edge when the start coordinate is zero. Default: 0.1
    pub init_step: f64,
    /// restart from the optimum this many times. Default: 1
    pub restarts: usize,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        NelderMeadOptions {
            max_iter: 2000,
            rel_tol: 1e-10,
            abs_tol: 1e-12,
            init_step: 0.1,
            restarts: 1,
        }
    }
}

/// Result of a minimization
#[derive(Debug, Clone)]
pub struct Minimum {
    pub argmin: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `func` by the Nelder-Mead simplex method with the usual
/// reflection 1, expansion 2, contraction 1/2 and shrink 1/2
/// coefficients.
pub fn nelder_mead<F>(func: F, start: &[f64], opts: &NelderMeadOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let mut best = nelder_mead_once(&func, start, opts);
    for _ in 0..opts.restarts {
        let next = nelder_mead_once(&func, &best.argmin, opts);
        let iterations = best.iterations + next.iterations;
        if next.value <= best.value {
            best = next;
        } else {
            best.converged = best.converged && next.converged;
        }
        best.iterations = iterations;
    }
    best
}

fn nelder_mead_once<F>(func: &F, start: &[f64], opts: &NelderMeadOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();

    let scale = start
        .iter()
        .fold(0_f64, |acc, x| acc.max(x.abs()))
        .max(1.0);
    let step = opts.init_step * scale;

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for k in 0..dim {
        let mut vertex = start.to_vec();
        vertex[k] += step;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| func(x)).collect();

    let mut converged = false;
    let mut iter = 0;

    while iter < opts.max_iter {
        iter += 1;

        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let (f_low, f_high) = (values[0], values[dim]);
        let tol = opts.rel_tol * f_low.abs() + opts.abs_tol;
        if f_low.is_finite() && (f_high - f_low).abs() <= tol {
            converged = true;
            break;
        }

        // centroid of all but the worst
        let centroid: Vec<f64> = (0..dim)
            .map(|k| simplex[..dim].iter().map(|v| v[k]).sum::<f64>() / dim as f64)
            .collect();

        let along = |coef: f64| -> Vec<f64> {
            (0..dim)
                .map(|k| centroid[k] + coef * (simplex[dim][k] - centroid[k]))
                .collect()
        };

        let reflected = along(-1.0);
        let f_reflected = func(&reflected);

        if f_reflected < values[0] {
            let expanded = along(-2.0);
            let f_expanded = func(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < values[dim] {
            let outside = along(-0.5);
            let f = func(&outside);
            (outside, f)
        } else {
            let inside = along(0.5);
            let f = func(&inside);
            (inside, f)
        };

        if f_contracted < values[dim].min(f_reflected) {
            simplex[dim] = contracted;
            values[dim] = f_contracted;
            continue;
        }

        // shrink towards the best vertex
        for v in 1..=dim {
            for k in 0..dim {
                simplex[v][k] = simplex[0][k] + 0.5 * (simplex[v][k] - simplex[0][k]);
            }
            values[v] = func(&simplex[v]);
        }
    }

    let best = (0..=dim)
        .min_by(|&i, &j| values[i].total_cmp(&values[j]))
        .unwrap_or(0);

    Minimum {
        argmin: simplex[best].clone(),
        value: values[best],
        iterations: iter,
        converged,
    }
}

/// Hessian by central differences of an analytic gradient,
/// symmetrized
///
/// ```text
/// H(i,j) = [g_i(θ + h e_j) - g_i(θ - h e_j)] / 2h
/// ```
pub fn hessian_from_gradient<G>(grad: G, theta: &[f64], step: f64) -> Mat
where
    G: Fn(&[f64]) -> Vec<f64>,
{
    let dim = theta.len();
    let mut hess = Mat::zeros(dim, dim);
    for j in 0..dim {
        let mut up = theta.to_vec();
        let mut dn = theta.to_vec();
        let h = step * theta[j].abs().max(1.0);
        up[j] += h;
        dn[j] -= h;
        let (g_up, g_dn) = (grad(&up), grad(&dn));
        for i in 0..dim {
            hess[(i, j)] = (g_up[i] - g_dn[i]) / (2.0 * h);
        }
    }
    (&hess + hess.transpose()) * 0.5
}
