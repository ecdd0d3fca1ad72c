use attrbench_core::MetricKey;

use crate::curve::AggregatedCurve;

/// Trapezoidal integral of `ys` over `xs`.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/// Signed area between the aggregated curve and its starting value.
///
/// The curve is shifted so that it starts at zero and flipped for the
/// `negative` sort order, so that a better explanation always scores higher.
/// The perturbation mode does not affect the sign. The result is unbounded
/// and may be negative.
pub fn score_auc(curve: &AggregatedCurve, key: MetricKey) -> f64 {
    let Some(&baseline) = curve.ys.first() else {
        return 0.0;
    };
    let sign = key.sort_order.curve_sign();
    let shifted: Vec<f64> = curve.ys.iter().map(|y| sign * (y - baseline)).collect();
    trapezoid(&curve.xs, &shifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrbench_core::{Perturbation, SortOrder};

    #[test]
    fn trapezoid_of_line() {
        assert!((trapezoid(&[0.0, 0.5, 1.0], &[0.0, 0.5, 1.0]) - 0.5).abs() < 1e-12);
        assert_eq!(trapezoid(&[0.0], &[3.0]), 0.0);
    }

    #[test]
    fn baseline_is_subtracted() {
        let curve = AggregatedCurve {
            xs: vec![0.0, 1.0],
            ys: vec![10.0, 10.0],
        };
        let key = MetricKey::new(Perturbation::Keep, SortOrder::Positive);
        assert_eq!(score_auc(&curve, key), 0.0);
    }

    #[test]
    fn negative_order_flips_sign() {
        let curve = AggregatedCurve {
            xs: vec![0.0, 0.5, 1.0],
            ys: vec![1.0, 2.0, 4.0],
        };
        let positive = score_auc(&curve, MetricKey::new(Perturbation::Remove, SortOrder::Positive));
        let absolute = score_auc(&curve, MetricKey::new(Perturbation::Keep, SortOrder::Absolute));
        let negative = score_auc(&curve, MetricKey::new(Perturbation::Remove, SortOrder::Negative));
        assert!(positive > 0.0);
        assert_eq!(positive, absolute);
        assert_eq!(negative, -positive);
    }
}
