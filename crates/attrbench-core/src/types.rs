use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BenchError, ErrorInfo};

/// Policy ranking features by attribution before incremental perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most positively attributed features first.
    Positive,
    /// Most negatively attributed features first.
    Negative,
    /// Largest absolute attribution first.
    Absolute,
}

impl SortOrder {
    /// All sort orders in their canonical order.
    pub const ALL: [SortOrder; 3] = [SortOrder::Positive, SortOrder::Negative, SortOrder::Absolute];

    /// Lower-case label used in metric keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Positive => "positive",
            SortOrder::Negative => "negative",
            SortOrder::Absolute => "absolute",
        }
    }

    /// Whether a feature with this attribution is left untouched because its
    /// sign already makes it irrelevant for the ordering.
    ///
    /// `positive` skips values `<= 0`, `negative` skips values `>= 0`, and
    /// `absolute` never skips.
    pub fn skips(&self, attribution: f64) -> bool {
        match self {
            SortOrder::Positive => attribution <= 0.0,
            SortOrder::Negative => attribution >= 0.0,
            SortOrder::Absolute => false,
        }
    }

    /// Multiplier applied to a baseline-subtracted curve before integration.
    pub fn curve_sign(&self) -> f64 {
        match self {
            SortOrder::Negative => -1.0,
            SortOrder::Positive | SortOrder::Absolute => 1.0,
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "positive" => Ok(SortOrder::Positive),
            "negative" => Ok(SortOrder::Negative),
            "absolute" => Ok(SortOrder::Absolute),
            other => Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("sort-order", "unrecognised sort order")
                    .with_context("value", other)
                    .with_hint("sort_order must be either \"positive\", \"negative\", or \"absolute\""),
            )),
        }
    }
}

/// Direction in which features are perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perturbation {
    /// Start fully present and progressively hide ranked features.
    Remove,
    /// Start fully absent and progressively reveal ranked features.
    Keep,
}

impl Perturbation {
    /// All perturbation modes in their canonical order.
    pub const ALL: [Perturbation; 2] = [Perturbation::Remove, Perturbation::Keep];

    /// Lower-case label used in metric keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Perturbation::Remove => "remove",
            Perturbation::Keep => "keep",
        }
    }

    /// Mask value every feature starts from.
    pub fn initial_state(&self) -> bool {
        matches!(self, Perturbation::Remove)
    }

    /// Mask value a ranked feature is toggled to.
    pub fn target_state(&self) -> bool {
        matches!(self, Perturbation::Keep)
    }
}

impl Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Perturbation {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "remove" => Ok(Perturbation::Remove),
            "keep" => Ok(Perturbation::Keep),
            other => Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("perturbation", "unrecognised perturbation mode")
                    .with_context("value", other)
                    .with_hint("perturbation must be either \"remove\" or \"keep\""),
            )),
        }
    }
}

/// Identifies one aggregated curve inside a result bundle.
///
/// Renders as `"<perturbation> <sort_order>"`, e.g. `"remove positive"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MetricKey {
    /// Perturbation mode of the metric.
    pub perturbation: Perturbation,
    /// Sort order of the metric.
    pub sort_order: SortOrder,
}

impl MetricKey {
    /// Creates a key for the given combination.
    pub const fn new(perturbation: Perturbation, sort_order: SortOrder) -> Self {
        Self {
            perturbation,
            sort_order,
        }
    }

    /// X-axis label used when charting this metric.
    pub fn axis_label(&self) -> &'static str {
        match self.perturbation {
            Perturbation::Remove => "Max Fraction of Features Removed",
            Perturbation::Keep => "Max Fraction of Features Kept",
        }
    }

    /// Whether charts of this metric read better with an inverted y-axis.
    pub fn inverts_y_axis(&self) -> bool {
        (self.sort_order == SortOrder::Negative) != (self.perturbation == Perturbation::Remove)
    }
}

impl Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.perturbation, self.sort_order)
    }
}

impl FromStr for MetricKey {
    type Err = BenchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(perturbation), Some(sort_order), None) => {
                Ok(MetricKey::new(perturbation.parse()?, sort_order.parse()?))
            }
            _ => Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("metric-key", "metric key must be \"<perturbation> <sort_order>\"")
                    .with_context("value", value),
            )),
        }
    }
}

impl From<MetricKey> for String {
    fn from(key: MetricKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MetricKey {
    type Error = BenchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
