//! Indicator trait definitions.

use crate::types::Bar;

/// Indicator over a single value series (typically closes).
///
/// Output is aligned with the input: `calculate(data)[i]` belongs to `data[i]`.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Number of points needed before values are meaningful.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Indicator that needs full OHLCV bars (true range, typical price, volume).
///
/// Output is aligned with the input bars.
pub trait BarIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values from bars ordered oldest first.
    fn calculate(&self, bars: &[Bar]) -> Vec<Self::Output>;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RunningSum {
        period: usize,
    }

    impl Indicator for RunningSum {
        type Output = f64;

        fn calculate(&self, data: &[f64]) -> Vec<f64> {
            data.iter()
                .scan(0.0, |acc, x| {
                    *acc += x;
                    Some(*acc)
                })
                .collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> &str {
            "running_sum"
        }
    }

    #[test]
    fn test_output_is_aligned_with_input() {
        let indicator = RunningSum { period: 1 };
        let result = indicator.calculate(&[1.0, 2.0, 3.0]);

        assert_eq!(result, vec![1.0, 3.0, 6.0]);
    }
}
