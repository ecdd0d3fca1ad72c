#![deny(missing_docs)]
#![doc = "Core traits and data types for sequential perturbation benchmarks of feature attributions."]

/// Numeric dataset sources (inline rows or CSV files).
pub mod data;
/// Structured error types.
pub mod errors;
/// Attribution providers.
pub mod explainer;
pub mod masker;
/// Model capability trait and a reference linear model.
pub mod model;
/// Canonical JSON/YAML helpers and stable hashing.
pub mod serde;
mod types;

pub use data::{read_csv_rows, DataSource};
pub use errors::{BenchError, ErrorInfo};
pub use explainer::{
    AttributionSource, Attributions, ConstantExplainer, Explainer, LinearExplainer,
    RandomExplainer,
};
pub use masker::{
    BackgroundMasker, ConstantMasker, FnMasker, Masker, MaskerConfig, MaskingAdapter,
};
pub use model::{mean_output, LinearModel, Model};
pub use crate::serde::{
    from_json_slice, from_yaml_slice, stable_hash_string, to_canonical_json_bytes, to_yaml_string,
};
pub use types::{MetricKey, Perturbation, SortOrder};
