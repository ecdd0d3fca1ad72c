use attrbench_core::{BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Number of points on the shared x-axis of every aggregated curve.
pub const CURVE_POINTS: usize = 100;

/// Model output recorded after each perturbation step of one sample.
///
/// Index 0 is the initial (fully present or fully absent) output; index `k`
/// is the output after the first `k` ranked features were processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCurve {
    values: Vec<f64>,
}

impl StepCurve {
    /// Wraps recorded step values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Recorded values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of recorded steps (feature count + 1).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Piecewise-linear resampling of the curve onto `points` evenly spaced
    /// positions in `[0, 1]`.
    ///
    /// The curve's own indices are mapped evenly onto `[0, 1]`; a single-point
    /// curve resamples to a constant.
    pub fn resample(&self, points: usize) -> Vec<f64> {
        let last = match self.values.len() {
            0 => return vec![f64::NAN; points],
            1 => return vec![self.values[0]; points],
            len => len - 1,
        };
        linspace(0.0, 1.0, points)
            .into_iter()
            .map(|x| {
                let position = (x * last as f64).clamp(0.0, last as f64);
                let lower = (position.floor() as usize).min(last - 1);
                let weight = position - lower as f64;
                self.values[lower] * (1.0 - weight) + self.values[lower + 1] * weight
            })
            .collect()
    }
}

impl From<Vec<f64>> for StepCurve {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|idx| if idx == n - 1 { end } else { start + idx as f64 * step })
                .collect()
        }
    }
}

/// Mean of resampled step curves against a shared x-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCurve {
    /// Shared x-axis, evenly spaced over `[0, 1]`.
    pub xs: Vec<f64>,
    /// Coordinate-wise mean of the resampled curves.
    pub ys: Vec<f64>,
}

impl AggregatedCurve {
    /// Aggregates onto [`CURVE_POINTS`] points.
    pub fn from_curves(curves: &[StepCurve]) -> Result<Self, BenchError> {
        Self::with_resolution(curves, CURVE_POINTS)
    }

    /// Aggregates onto `points` points.
    ///
    /// Curves of different lengths are resampled independently before
    /// averaging.
    pub fn with_resolution(curves: &[StepCurve], points: usize) -> Result<Self, BenchError> {
        if curves.is_empty() {
            return Err(BenchError::invalid(
                "aggregate-empty",
                "at least one step curve is required to aggregate",
            ));
        }
        if let Some(idx) = curves.iter().position(StepCurve::is_empty) {
            return Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("aggregate-empty-curve", "step curve has no values")
                    .with_context("sample", idx),
            ));
        }
        let mut ys = vec![0.0; points];
        for curve in curves {
            for (total, value) in ys.iter_mut().zip(curve.resample(points)) {
                *total += value;
            }
        }
        let count = curves.len() as f64;
        ys.iter_mut().for_each(|total| *total /= count);
        Ok(Self {
            xs: linspace(0.0, 1.0, points),
            ys,
        })
    }

    /// Number of points on the curve.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(0.0, 1.0, 100);
        assert_eq!(xs.len(), 100);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[99], 1.0);
        assert!((xs[33] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
    }

    #[test]
    fn resample_interpolates_linearly() {
        let curve = StepCurve::new(vec![0.0, 10.0]);
        let ys = curve.resample(5);
        assert_eq!(ys, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn resample_keeps_endpoints() {
        let curve = StepCurve::new(vec![6.0, 5.0, 3.0, 0.0]);
        let ys = curve.resample(CURVE_POINTS);
        assert_eq!(ys[0], 6.0);
        assert_eq!(ys[CURVE_POINTS - 1], 0.0);
    }

    #[test]
    fn single_point_curve_is_constant() {
        let curve = StepCurve::new(vec![4.0]);
        assert!(curve.resample(CURVE_POINTS).iter().all(|&y| y == 4.0));
    }

    #[test]
    fn aggregation_averages_mixed_lengths() {
        let curves = vec![
            StepCurve::new(vec![0.0, 1.0]),
            StepCurve::new(vec![2.0, 2.0, 2.0, 2.0, 2.0]),
        ];
        let curve = AggregatedCurve::with_resolution(&curves, 3).expect("aggregate");
        assert_eq!(curve.xs, vec![0.0, 0.5, 1.0]);
        assert_eq!(curve.ys, vec![1.0, 1.25, 1.5]);
    }

    #[test]
    fn aggregation_requires_curves() {
        assert!(matches!(
            AggregatedCurve::from_curves(&[]),
            Err(BenchError::InvalidConfiguration(_))
        ));
        assert!(AggregatedCurve::from_curves(&[StepCurve::new(Vec::new())]).is_err());
    }
}
