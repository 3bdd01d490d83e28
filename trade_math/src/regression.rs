//! Regularised linear regression
//!
//! Contains:
//! - `StandardScaler`: per-column centring and scaling
//! - `RidgeRegression`: L2-regularised least squares on standardised inputs with an
//!   unpenalised intercept, with the regularisation strength chosen by
//!   leave-one-out error
//! - `ordinary_least_squares`: plain least squares without intercept

use crate::volatility::population_std_dev;
use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Columns with a spread below this (relative to their mean) are left unscaled
const ZERO_SCALE_TOLERANCE: f64 = 10.0 * f64::EPSILON;

/// Per-column standardisation: `(x - mean) / std`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Learn column means and population standard deviations from `rows`
    ///
    /// A column with zero variance gets a scale of 1 so it maps to all zeros.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = check_rows(rows)?;
        let n = rows.len() as f64;

        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);
        let mut column = Vec::with_capacity(rows.len());
        for j in 0..width {
            column.clear();
            column.extend(rows.iter().map(|row| row[j]));

            let mean = column.iter().sum::<f64>() / n;
            let std = population_std_dev(&column);
            let scale = if std.is_finite() && std > ZERO_SCALE_TOLERANCE * mean.abs().max(1.0) {
                std
            } else {
                1.0
            };
            means.push(mean);
            scales.push(scale);
        }

        Ok(Self { means, scales })
    }

    /// Number of columns the scaler was fitted on
    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Standardise a single row
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.width() {
            return Err(MathError::InvalidInput(format!(
                "Row has {} columns, scaler was fitted on {}",
                row.len(),
                self.width()
            )));
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

/// Ridge regression on standardised inputs
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    scaler: StandardScaler,
    coefficients: Vec<f64>,
    intercept: f64,
    alpha: f64,
}

impl RidgeRegression {
    /// Fit with a fixed regularisation strength
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], alpha: f64) -> Result<Self> {
        Self::fit_cv(rows, targets, &[alpha])
    }

    /// Fit choosing `alpha` from `alphas` by efficient leave-one-out error
    ///
    /// Candidates are compared with a strict less-than, so the earliest
    /// alpha wins ties.
    pub fn fit_cv(rows: &[Vec<f64>], targets: &[f64], alphas: &[f64]) -> Result<Self> {
        let width = check_rows(rows)?;
        if rows.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "{} feature rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if rows.len() < 2 {
            return Err(MathError::InsufficientData(
                "Ridge regression needs at least 2 rows".to_string(),
            ));
        }
        if alphas.is_empty() || alphas.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(MathError::InvalidInput(
                "Alphas must be a non-empty list of positive values".to_string(),
            ));
        }
        if targets.iter().any(|y| !y.is_finite()) {
            return Err(MathError::InvalidInput(
                "Targets must be finite".to_string(),
            ));
        }

        let scaler = StandardScaler::fit(rows)?;
        let n = rows.len();
        let mut data = Vec::with_capacity(n * width);
        for row in rows {
            data.extend(scaler.transform_row(row)?);
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Feature rows must be finite".to_string(),
            ));
        }

        let z = DMatrix::from_row_slice(n, width, &data);
        let y_mean = targets.iter().sum::<f64>() / n as f64;
        let centered = DVector::from_iterator(n, targets.iter().map(|y| y - y_mean));

        let gram = z.transpose() * &z;
        let zty = z.transpose() * &centered;

        let mut best: Option<(f64, f64, DVector<f64>)> = None;
        for &alpha in alphas {
            let system = &gram + DMatrix::<f64>::identity(width, width) * alpha;
            let cholesky = system.cholesky().ok_or_else(|| {
                MathError::CalculationError(format!(
                    "Ridge system is not positive definite for alpha={}",
                    alpha
                ))
            })?;
            let weights = cholesky.solve(&zty);
            let leverage_basis = &z * cholesky.inverse();
            let fitted = &z * &weights;

            let mut loo_sse = 0.0;
            for i in 0..n {
                // Intercept contributes 1/n to every diagonal entry of the hat matrix
                let leverage = 1.0 / n as f64 + leverage_basis.row(i).dot(&z.row(i));
                let denominator = (1.0 - leverage).max(f64::EPSILON);
                let residual = (centered[i] - fitted[i]) / denominator;
                loo_sse += residual * residual;
            }
            let loo_mse = loo_sse / n as f64;

            let improves = match &best {
                None => true,
                Some((best_mse, _, _)) => loo_mse < *best_mse,
            };
            if improves {
                best = Some((loo_mse, alpha, weights));
            }
        }

        let (loo_mse, alpha, weights) = best.ok_or_else(|| {
            MathError::CalculationError("No regularisation strength could be evaluated".to_string())
        })?;
        if !loo_mse.is_finite() {
            return Err(MathError::CalculationError(
                "Leave-one-out error is not finite".to_string(),
            ));
        }

        Ok(Self {
            scaler,
            coefficients: weights.iter().copied().collect(),
            intercept: y_mean,
            alpha,
        })
    }

    /// Predict the target for one raw (unscaled) feature row
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform_row(row)?;
        Ok(self.intercept
            + scaled
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }

    /// Predict targets for several raw feature rows
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Selected regularisation strength
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Intercept (the training target mean)
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients in standardised feature space
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Least-squares coefficients for `targets ~ rows` (no intercept)
///
/// Solves the normal equations by Cholesky factorisation and fails when
/// the design matrix is rank deficient.
pub fn ordinary_least_squares(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    let width = check_rows(rows)?;
    if rows.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "{} regressor rows but {} targets",
            rows.len(),
            targets.len()
        )));
    }
    if rows.len() < width {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} rows to estimate {} coefficients, have {}",
            width,
            width,
            rows.len()
        )));
    }

    let data: Vec<f64> = rows.iter().flat_map(|row| row.iter().copied()).collect();
    let x = DMatrix::from_row_slice(rows.len(), width, &data);
    let y = DVector::from_column_slice(targets);

    let cholesky = (x.transpose() * &x).cholesky().ok_or_else(|| {
        MathError::CalculationError("Regressors are linearly dependent".to_string())
    })?;
    let beta = cholesky.solve(&(x.transpose() * &y));
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Least-squares solution is not finite".to_string(),
        ));
    }

    Ok(beta.iter().copied().collect())
}

fn check_rows(rows: &[Vec<f64>]) -> Result<usize> {
    let width = rows
        .first()
        .map(|row| row.len())
        .ok_or_else(|| MathError::InsufficientData("No feature rows".to_string()))?;
    if width == 0 {
        return Err(MathError::InvalidInput("Feature rows are empty".to_string()));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(MathError::InvalidInput(
            "Feature rows have inconsistent widths".to_string(),
        ));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_rows() -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..50)
            .map(|i| {
                let x = i as f64;
                vec![x, (x * 0.7).sin()]
            })
            .collect();
        let targets = rows.iter().map(|r| 3.0 + 2.0 * r[0] - 1.5 * r[1]).collect();
        (rows, targets)
    }

    #[test]
    fn test_scaler_zero_variance_column() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_row(&[3.0, 5.0]).unwrap();
        assert_relative_eq!(scaled[0], 1.0);
        assert_relative_eq!(scaled[1], 0.0);
        assert!(scaler.transform_row(&[1.0]).is_err());
    }

    #[test]
    fn test_ridge_recovers_linear_relationship() {
        let (rows, targets) = linear_rows();
        let model = RidgeRegression::fit_cv(&rows, &targets, &[0.1, 1.0, 10.0]).unwrap();
        let prediction = model.predict_row(&[20.0, (14.0_f64).sin()]).unwrap();
        let expected = 3.0 + 40.0 - 1.5 * (14.0_f64).sin();
        assert!((prediction - expected).abs() < 0.5);
        // Noise-free data prefers the weakest penalty
        assert_relative_eq!(model.alpha(), 0.1);
    }

    #[test]
    fn test_ridge_constant_target() {
        let rows: Vec<Vec<f64>> = (0..10).map(|_| vec![100.0, 100.0]).collect();
        let targets = vec![100.0; 10];
        let model = RidgeRegression::fit_cv(&rows, &targets, &[1.0]).unwrap();
        assert_relative_eq!(model.predict_row(&[100.0, 100.0]).unwrap(), 100.0);
        assert_relative_eq!(model.intercept(), 100.0);
        assert!(model.coefficients().iter().all(|w| w.abs() < 1e-12));
    }

    #[test]
    fn test_ordinary_least_squares() {
        let rows: Vec<Vec<f64>> = (1..20).map(|i| vec![i as f64, (i * i) as f64]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 0.5 * r[0] - 0.25 * r[1]).collect();
        let beta = ordinary_least_squares(&rows, &targets).unwrap();
        assert_relative_eq!(beta[0], 0.5, epsilon = 1e-8);
        assert_relative_eq!(beta[1], -0.25, epsilon = 1e-8);

        let degenerate: Vec<Vec<f64>> = (1..10).map(|i| vec![i as f64, 0.0]).collect();
        assert!(ordinary_least_squares(&degenerate, &[1.0; 9]).is_err());
    }

    #[test]
    fn test_ridge_rejects_bad_input() {
        let (rows, targets) = linear_rows();
        assert!(RidgeRegression::fit_cv(&rows, &targets[..10], &[1.0]).is_err());
        assert!(RidgeRegression::fit_cv(&rows, &targets, &[]).is_err());
        assert!(RidgeRegression::fit_cv(&rows, &targets, &[-1.0]).is_err());
        assert!(RidgeRegression::fit(&[], &[], 1.0).is_err());
    }
}
