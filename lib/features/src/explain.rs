//! Explainability for feature vectors
//!
//! Maps vector slots back to their names: which features an album lights
//! up, which features two albums share, and how features are distributed
//! across a whole collection.

use crate::pipeline::{FeatureMatrix, FittedPipeline};
use ordered_float::OrderedFloat;
use serde::Serialize;
use vinylx_core::{Album, Vector};

/// Number of features listed in [`FeatureAnalysis::top_variable_features`]
pub const TOP_VARIABLE_FEATURES: usize = 20;

/// Non-zero features of `row` as `(name, value)`, largest first
///
/// Equal values keep slot order.
pub fn importance_from_row(names: &[String], row: &[f32]) -> Vec<(String, f32)> {
    let mut importance: Vec<(String, f32)> = names
        .iter()
        .zip(row)
        .filter(|(_, &v)| v > 0.0)
        .map(|(name, &v)| (name.clone(), v))
        .collect();
    importance.sort_by_key(|&(_, v)| std::cmp::Reverse(OrderedFloat(v)));
    importance
}

/// Non-zero features of one album under a fitted pipeline
pub fn feature_importance(pipeline: &FittedPipeline, album: &Album) -> Vec<(String, f32)> {
    let row = pipeline.transform_one(album);
    importance_from_row(pipeline.feature_names(), row.as_slice())
}

/// Names of slots that are positive in both rows
pub fn shared_features(names: &[String], a: &[f32], b: &[f32]) -> Vec<String> {
    names
        .iter()
        .zip(a.iter().zip(b))
        .filter(|(_, (&x, &y))| x > 0.0 && y > 0.0)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Cosine similarity of two albums plus the features they share
#[derive(Debug, Clone, Serialize)]
pub struct AlbumComparison {
    pub similarity: f32,
    pub shared_features: Vec<String>,
}

impl AlbumComparison {
    pub fn compute(pipeline: &FittedPipeline, a: &Album, b: &Album) -> Self {
        let va = pipeline.transform_one(a);
        let vb = pipeline.transform_one(b);
        Self::from_vectors(pipeline.feature_names(), &va, &vb)
    }

    pub fn from_vectors(names: &[String], a: &Vector, b: &Vector) -> Self {
        Self {
            similarity: a.cosine_similarity(b),
            shared_features: shared_features(names, a.as_slice(), b.as_slice()),
        }
    }
}

/// Active features per block over a matrix
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockActivity {
    pub block: &'static str,
    /// Slots non-zero in at least one row
    pub active: usize,
    pub width: usize,
}

/// Collection-level feature distribution
#[derive(Debug, Clone, Serialize)]
pub struct FeatureAnalysis {
    pub feature_count: usize,
    pub album_count: usize,
    /// Rows in which each feature is non-zero
    pub non_zero_features: Vec<usize>,
    pub feature_means: Vec<f32>,
    /// Population standard deviations
    pub feature_stds: Vec<f32>,
    /// `1 - nonzero / size`, 0.0 for an empty matrix
    pub sparsity: f32,
    /// Highest-variance features, most variable first
    pub top_variable_features: Vec<(String, f32)>,
    pub blocks: Vec<BlockActivity>,
}

impl FeatureAnalysis {
    pub fn compute(pipeline: &FittedPipeline, albums: &[Album]) -> Self {
        let matrix = pipeline.transform(albums);
        Self::from_matrix(pipeline, &matrix)
    }

    pub fn from_matrix(pipeline: &FittedPipeline, matrix: &FeatureMatrix) -> Self {
        let (n_rows, n_features) = matrix.shape();
        let mut non_zero = vec![0usize; n_features];
        let mut sums = vec![0.0f64; n_features];

        for row in matrix.rows() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    non_zero[j] += 1;
                }
                sums[j] += f64::from(v);
            }
        }

        let n = n_rows.max(1) as f64;
        let means: Vec<f64> = sums.iter().map(|s| s / n).collect();

        let mut sq_dev = vec![0.0f64; n_features];
        for row in matrix.rows() {
            for (j, &v) in row.iter().enumerate() {
                let d = f64::from(v) - means[j];
                sq_dev[j] += d * d;
            }
        }
        let variances: Vec<f64> = sq_dev.iter().map(|s| s / n).collect();

        let size = n_rows * n_features;
        let sparsity = if size == 0 {
            0.0
        } else {
            1.0 - non_zero.iter().sum::<usize>() as f32 / size as f32
        };

        let names = pipeline.feature_names();
        let mut by_variance: Vec<usize> = (0..n_features).collect();
        by_variance.sort_by_key(|&j| std::cmp::Reverse(OrderedFloat(variances[j])));
        let top_variable_features = by_variance
            .into_iter()
            .take(TOP_VARIABLE_FEATURES)
            .map(|j| (names[j].clone(), variances[j] as f32))
            .collect();

        let blocks = pipeline
            .blocks()
            .iter()
            .map(|block| BlockActivity {
                block: block.kind.name(),
                active: non_zero[block.range.clone()].iter().filter(|&&c| c > 0).count(),
                width: block.width(),
            })
            .collect();

        Self {
            feature_count: n_features,
            album_count: n_rows,
            non_zero_features: non_zero,
            feature_means: means.into_iter().map(|m| m as f32).collect(),
            feature_stds: variances.into_iter().map(|v| v.sqrt() as f32).collect(),
            sparsity,
            top_variable_features,
            blocks,
        }
    }
}
