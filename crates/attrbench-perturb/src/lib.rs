#![deny(missing_docs)]
//! Sequential perturbation scoring of feature attributions.
//!
//! A [`SequentialPerturbation`] masks or reveals features one by one in the
//! order given by a [`RankingPolicy`], records the model output after every
//! step, resamples the per-sample curves onto a shared axis and integrates the
//! mean curve into a signed AUC.

/// Area-under-curve scoring.
pub mod auc;
/// Step curves, resampling and aggregation.
pub mod curve;
pub mod progress;
/// Attribution ranking policies.
pub mod ranking;
pub mod simulator;

pub use auc::{score_auc, trapezoid};
pub use curve::{linspace, AggregatedCurve, StepCurve, CURVE_POINTS};
pub use progress::{ProgressObserver, SilentProgress, TracingProgress, PROGRESS_THRESHOLD};
pub use ranking::RankingPolicy;
pub use simulator::{MetricScore, SequentialPerturbation};
