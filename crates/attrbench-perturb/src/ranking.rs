use std::cmp::Ordering;

use attrbench_core::SortOrder;

/// Orders feature indices by the attribution policy of a [`SortOrder`].
///
/// The ordering is total: equal keys keep ascending original index, `-0.0`
/// ties with `0.0`, and NaN participates through [`f64::total_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    order: SortOrder,
}

impl RankingPolicy {
    /// Creates the policy for a sort order.
    pub fn new(order: SortOrder) -> Self {
        Self { order }
    }

    /// Sort order this policy applies.
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Returns a permutation of `0..attributions.len()` in perturbation order.
    pub fn rank(&self, attributions: &[f64]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..attributions.len()).collect();
        // sort_by is stable, which supplies the ascending-index tie break.
        indices.sort_by(|&a, &b| self.compare(attributions[a], attributions[b]));
        indices
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        let (a, b) = (unsigned_zero(a), unsigned_zero(b));
        match self.order {
            SortOrder::Positive => b.total_cmp(&a),
            SortOrder::Negative => a.total_cmp(&b),
            SortOrder::Absolute => b.abs().total_cmp(&a.abs()),
        }
    }
}

fn unsigned_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
