//! Masking functions and the adapter that normalises them.
//!
//! A masker turns a boolean mask plus one sample into a batch of perturbed
//! rows: `true` keeps the sample's own value, `false` replaces it with a
//! reference value. Maskers that expand a sample into several rows (one per
//! background record) are averaged by the caller.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::DataSource;
use crate::errors::{BenchError, ErrorInfo};

/// Capability interface every masking function exposes.
pub trait Masker {
    /// Number of maskable features for the given sample.
    fn feature_count(&self, sample: &[f64]) -> Result<usize, BenchError>;

    /// Produces the perturbed batch for `sample` under `mask`.
    fn apply(&self, mask: &[bool], sample: &[f64]) -> Result<Vec<Vec<f64>>, BenchError>;
}

/// Independent masker backed by a reference dataset.
///
/// For each background row `b` the output row is `x * mask + b * !mask`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundMasker {
    background: Vec<Vec<f64>>,
    width: usize,
}

impl BackgroundMasker {
    /// Wraps a rectangular, non-empty background dataset.
    pub fn new(background: Vec<Vec<f64>>) -> Result<Self, BenchError> {
        let width = match background.first() {
            Some(row) => row.len(),
            None => {
                return Err(BenchError::invalid(
                    "background-empty",
                    "background dataset must contain at least one row",
                ))
            }
        };
        if let Some((idx, row)) = background
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("background-ragged", "background rows differ in length")
                    .with_context("row", idx)
                    .with_context("expected", width)
                    .with_context("actual", row.len()),
            ));
        }
        Ok(Self { background, width })
    }

    /// Reference rows captured at construction.
    pub fn background(&self) -> &[Vec<f64>] {
        &self.background
    }

    /// Column-wise mean of the background rows.
    pub fn column_means(&self) -> Vec<f64> {
        let rows = self.background.len() as f64;
        let mut means = vec![0.0; self.width];
        for row in &self.background {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        means.iter_mut().for_each(|mean| *mean /= rows);
        means
    }
}

impl Masker for BackgroundMasker {
    fn feature_count(&self, _sample: &[f64]) -> Result<usize, BenchError> {
        Ok(self.width)
    }

    fn apply(&self, mask: &[bool], sample: &[f64]) -> Result<Vec<Vec<f64>>, BenchError> {
        if mask.len() != self.width {
            return Err(BenchError::shape("mask-length", "mask", self.width, mask.len()));
        }
        if sample.len() != self.width {
            return Err(BenchError::shape("sample-length", "sample", self.width, sample.len()));
        }
        Ok(self
            .background
            .iter()
            .map(|reference| {
                mask.iter()
                    .zip(sample)
                    .zip(reference)
                    .map(|((&keep, &own), &other)| if keep { own } else { other })
                    .collect()
            })
            .collect())
    }
}

/// Replaces absent features with a single fill value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantMasker {
    /// Value written into masked-out positions.
    pub fill: f64,
    /// Fixed feature count reported for every sample.
    pub features: usize,
}

impl Masker for ConstantMasker {
    fn feature_count(&self, _sample: &[f64]) -> Result<usize, BenchError> {
        Ok(self.features)
    }

    fn apply(&self, mask: &[bool], sample: &[f64]) -> Result<Vec<Vec<f64>>, BenchError> {
        if mask.len() != self.features {
            return Err(BenchError::shape("mask-length", "mask", self.features, mask.len()));
        }
        if sample.len() != self.features {
            return Err(BenchError::shape("sample-length", "sample", self.features, sample.len()));
        }
        Ok(vec![mask
            .iter()
            .zip(sample)
            .map(|(&keep, &own)| if keep { own } else { self.fill })
            .collect()])
    }
}

/// Masker assembled from a pair of closures.
pub struct FnMasker<S, A> {
    shape: S,
    apply: A,
}

impl<S, A> FnMasker<S, A>
where
    S: Fn(&[f64]) -> usize,
    A: Fn(&[bool], &[f64]) -> Result<Vec<Vec<f64>>, BenchError>,
{
    /// Creates a masker from a shape query and a masking function.
    pub fn new(shape: S, apply: A) -> Self {
        Self { shape, apply }
    }
}

impl<S, A> Masker for FnMasker<S, A>
where
    S: Fn(&[f64]) -> usize,
    A: Fn(&[bool], &[f64]) -> Result<Vec<Vec<f64>>, BenchError>,
{
    fn feature_count(&self, sample: &[f64]) -> Result<usize, BenchError> {
        Ok((self.shape)(sample))
    }

    fn apply(&self, mask: &[bool], sample: &[f64]) -> Result<Vec<Vec<f64>>, BenchError> {
        (self.apply)(mask, sample)
    }
}

/// Uniform masking function built from either a reference dataset or an
/// existing [`Masker`].
pub enum MaskingAdapter {
    /// Independent masking against a background dataset.
    Background(BackgroundMasker),
    /// Caller supplied masking function.
    Callable(Box<dyn Masker>),
}

impl MaskingAdapter {
    /// Wraps a raw two-dimensional reference dataset.
    pub fn from_background(background: Vec<Vec<f64>>) -> Result<Self, BenchError> {
        BackgroundMasker::new(background).map(MaskingAdapter::Background)
    }

    /// Uses a caller supplied masker unchanged.
    pub fn from_masker(masker: impl Masker + 'static) -> Self {
        MaskingAdapter::Callable(Box::new(masker))
    }

    /// Background dataset when the adapter wraps one.
    pub fn background(&self) -> Option<&BackgroundMasker> {
        match self {
            MaskingAdapter::Background(masker) => Some(masker),
            MaskingAdapter::Callable(_) => None,
        }
    }

    /// Feature count the masker reports for `sample`.
    pub fn feature_count(&self, sample: &[f64]) -> Result<usize, BenchError> {
        match self {
            MaskingAdapter::Background(masker) => masker.feature_count(sample),
            MaskingAdapter::Callable(masker) => masker.feature_count(sample),
        }
    }

    /// Applies the mask; an empty batch is reported as an external failure.
    pub fn apply(&self, mask: &[bool], sample: &[f64]) -> Result<Vec<Vec<f64>>, BenchError> {
        let batch = match self {
            MaskingAdapter::Background(masker) => masker.apply(mask, sample)?,
            MaskingAdapter::Callable(masker) => masker.apply(mask, sample)?,
        };
        if batch.is_empty() {
            return Err(BenchError::external(
                "masker-empty-batch",
                "masker produced no rows",
            ));
        }
        Ok(batch)
    }
}

impl std::fmt::Debug for MaskingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaskingAdapter::Background(masker) => f
                .debug_struct("Background")
                .field("rows", &masker.background.len())
                .field("width", &masker.width)
                .finish(),
            MaskingAdapter::Callable(_) => f.debug_struct("Callable").finish_non_exhaustive(),
        }
    }
}

/// Persistable masker configuration, tagged by masker type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaskerConfig {
    /// Independent masking against a background dataset.
    Independent {
        /// Reference rows.
        #[serde(with = "serde_yaml::with::singleton_map")]
        background: DataSource,
    },
    /// Constant fill masking.
    Constant {
        /// Value written into masked-out positions.
        fill: f64,
        /// Feature count of every sample.
        features: usize,
    },
}

impl MaskerConfig {
    /// Builds the adapter, resolving relative data paths against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<MaskingAdapter, BenchError> {
        match self {
            MaskerConfig::Independent { background } => {
                MaskingAdapter::from_background(background.load(base_dir)?)
            }
            MaskerConfig::Constant { fill, features } => {
                Ok(MaskingAdapter::from_masker(ConstantMasker {
                    fill: *fill,
                    features: *features,
                }))
            }
        }
    }

    /// Same configuration with relative data paths joined onto `base_dir`,
    /// so it can be saved and loaded from anywhere.
    pub fn resolved(&self, base_dir: &Path) -> MaskerConfig {
        match self {
            MaskerConfig::Independent { background } => MaskerConfig::Independent {
                background: background.resolved(base_dir),
            },
            other => other.clone(),
        }
    }

    /// Writes the tagged configuration as JSON.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), BenchError> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|err| BenchError::Serde(ErrorInfo::new("masker-save", err.to_string())))
    }

    /// Reads a tagged configuration previously written by [`MaskerConfig::save`].
    pub fn load<R: Read>(reader: R) -> Result<Self, BenchError> {
        serde_json::from_reader(reader)
            .map_err(|err| BenchError::Serde(ErrorInfo::new("masker-load", err.to_string())))
    }
}
