//! Derivative-free minimisation
//!
//! Nelder-Mead simplex search. Used to estimate smoothing parameters and
//! ARMA coefficients, whose objectives are cheap to evaluate but have no
//! convenient closed-form gradient.

use crate::{MathError, Result};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Relative step for non-zero starting coordinates
const NONZERO_STEP: f64 = 0.05;
/// Absolute step for zero starting coordinates
const ZERO_STEP: f64 = 0.00025;

/// Result of a minimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Location of the best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Number of iterations performed
    pub iterations: usize,
}

/// Nelder-Mead simplex minimiser
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    x_tolerance: f64,
    f_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            x_tolerance: 1e-8,
            f_tolerance: 1e-8,
        }
    }
}

impl NelderMead {
    /// Create a minimiser with an iteration cap and a common tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration cap must be greater than zero".to_string(),
            ));
        }
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(MathError::InvalidInput(
                "Tolerance must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            x_tolerance: tolerance,
            f_tolerance: tolerance,
        })
    }

    /// Minimise `objective` starting from `start`
    ///
    /// Non-finite objective values are treated as `+inf`, which keeps the
    /// simplex away from regions where the objective blows up. The search
    /// is fully deterministic for a given start.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        let eval = |x: &[f64]| {
            let value = objective(x);
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let start_value = eval(start);
        if !start_value.is_finite() {
            return Err(MathError::CalculationError(
                "Objective is not finite at the starting point".to_string(),
            ));
        }

        let dim = start.len();
        if dim == 0 {
            return Ok(Minimum {
                point: Vec::new(),
                value: start_value,
                iterations: 0,
            });
        }

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((start.to_vec(), start_value));
        for i in 0..dim {
            let mut vertex = start.to_vec();
            vertex[i] = if vertex[i] != 0.0 {
                vertex[i] * (1.0 + NONZERO_STEP)
            } else {
                ZERO_STEP
            };
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            if self.converged(&simplex) {
                break;
            }
            iterations += 1;

            let centroid = centroid(&simplex[..dim]);
            let worst_value = simplex[dim].1;
            let second_worst_value = simplex[dim - 1].1;
            let best_value = simplex[0].1;

            let reflected = along(&centroid, &simplex[dim].0, -REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < best_value {
                let expanded = along(&centroid, &simplex[dim].0, -REFLECTION * EXPANSION);
                let expanded_value = eval(&expanded);
                simplex[dim] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < second_worst_value {
                simplex[dim] = (reflected, reflected_value);
                continue;
            }

            let (contracted, contracted_value) = if reflected_value < worst_value {
                let outside = along(&centroid, &simplex[dim].0, -REFLECTION * CONTRACTION);
                let value = eval(&outside);
                (outside, value)
            } else {
                let inside = along(&centroid, &simplex[dim].0, CONTRACTION);
                let value = eval(&inside);
                (inside, value)
            };

            if contracted_value < worst_value.min(reflected_value) {
                simplex[dim] = (contracted, contracted_value);
                continue;
            }

            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, x)| b + SHRINK * (x - b))
                    .collect();
                let value = eval(&shrunk);
                *vertex = (shrunk, value);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);
        Ok(Minimum {
            point,
            value,
            iterations,
        })
    }

    fn converged(&self, simplex: &[(Vec<f64>, f64)]) -> bool {
        let (best, best_value) = &simplex[0];
        simplex.iter().skip(1).all(|(vertex, value)| {
            let f_close = (value - best_value).abs() <= self.f_tolerance;
            let x_close = vertex
                .iter()
                .zip(best)
                .all(|(x, b)| (x - b).abs() <= self.x_tolerance);
            f_close && x_close
        })
    }
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let dim = vertices[0].0.len();
    let mut center = vec![0.0; dim];
    for (vertex, _) in vertices {
        for (c, x) in center.iter_mut().zip(vertex) {
            *c += x;
        }
    }
    let count = vertices.len() as f64;
    center.iter_mut().for_each(|c| *c /= count);
    center
}

/// `centroid + t * (point - centroid)`
fn along(centroid: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect()
}
