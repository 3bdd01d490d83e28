//! Moving average calculations
//!
//! Contains the trailing simple moving average used by the lag features:
//! the mean of the `window` observations strictly before a target position.

use crate::{MathError, Result};

/// Check that a trailing window of `window` values ending before `end` fits inside `values`
pub(crate) fn trailing_window(values: &[f64], end: usize, window: usize) -> Result<&[f64]> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    if end > values.len() {
        return Err(MathError::InvalidInput(format!(
            "Window end {} is past the end of the series ({} values)",
            end,
            values.len()
        )));
    }
    if end < window {
        return Err(MathError::InsufficientData(format!(
            "Need {} values before position {}, have {}",
            window, end, end
        )));
    }

    Ok(&values[end - window..end])
}

/// Simple moving average of the `window` values in `values[end - window..end]`
///
/// The value at `end` itself is excluded, so the result only uses
/// information available before that position.
pub fn trailing_mean(values: &[f64], end: usize, window: usize) -> Result<f64> {
    let slice = trailing_window(values, end, window)?;
    Ok(slice.iter().sum::<f64>() / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trailing_mean_excludes_end() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        // Window of 3 ending before index 4 covers 2, 3, 4
        assert_relative_eq!(trailing_mean(&values, 4, 3).unwrap(), 3.0);
    }

    #[test]
    fn test_trailing_mean_insufficient() {
        let values = [1.0, 2.0];
        assert!(matches!(
            trailing_mean(&values, 2, 7),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            trailing_mean(&values, 3, 1),
            Err(MathError::InvalidInput(_))
        ));
    }
}
