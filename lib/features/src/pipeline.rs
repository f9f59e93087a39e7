//! Vector assembler
//!
//! [`FittedPipeline::fit`] builds vocabularies, fits every encoder and records
//! feature names, block layout and the preference profile in one immutable
//! value. [`FeatureExtractor`] is the stateful facade: it holds a config and,
//! once fitted, the latest pipeline. A failed fit leaves the previous pipeline
//! in place.

use crate::config::FeatureConfig;
use crate::encoder::{BlockKind, Encoder};
use crate::error::{FeatureError, Result};
use crate::profile::PreferenceProfile;
use crate::vocabulary::{CollectionVocabulary, VocabularyBuilder};
use serde::Serialize;
use std::ops::Range;
use vinylx_core::{Album, Vector};

/// Contiguous slot range owned by one encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub range: Range<usize>,
}

impl Block {
    #[inline]
    pub fn width(&self) -> usize {
        self.range.len()
    }
}

/// Row-major `f32` matrix, one row per album
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    n_rows: usize,
    n_features: usize,
}

impl FeatureMatrix {
    pub fn new(data: Vec<f32>, n_rows: usize, n_features: usize) -> Self {
        assert_eq!(data.len(), n_rows * n_features, "matrix shape mismatch");
        Self {
            data,
            n_rows,
            n_features,
        }
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// `(rows, features)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_features)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n_features..(i + 1) * self.n_features]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics, and a zero-width matrix still has rows
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row_vector(&self, i: usize) -> Vector {
        Vector::from_slice(self.row(i))
    }
}

/// The immutable result of fitting on a collection
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    config: FeatureConfig,
    vocabulary: CollectionVocabulary,
    encoders: Vec<Encoder>,
    blocks: Vec<Block>,
    feature_names: Vec<String>,
    profile: PreferenceProfile,
}

impl FittedPipeline {
    /// Fit on `collection`; fails only on an invalid configuration
    pub fn fit(config: &FeatureConfig, collection: &[Album]) -> Result<Self> {
        config.validate()?;
        tracing::info!("Fitting feature extractor on {} albums", collection.len());

        let vocabulary = VocabularyBuilder::new(config).build(collection);
        let encoders = Encoder::fit_all(config, &vocabulary, collection);

        let mut blocks = Vec::with_capacity(encoders.len());
        let mut feature_names = Vec::new();
        for encoder in &encoders {
            let start = feature_names.len();
            feature_names.extend(encoder.feature_names());
            blocks.push(Block {
                kind: encoder.kind(),
                range: start..feature_names.len(),
            });
        }

        let profile = PreferenceProfile::compute(&vocabulary, collection);

        tracing::info!(
            "Feature extractor fitted with {} total features",
            feature_names.len()
        );

        Ok(Self {
            config: config.clone(),
            vocabulary,
            encoders,
            blocks,
            feature_names,
            profile,
        })
    }

    /// One row per album, blocks in fixed order
    pub fn transform(&self, albums: &[Album]) -> FeatureMatrix {
        let width = self.n_features();
        let mut data = Vec::with_capacity(albums.len() * width);
        for album in albums {
            for encoder in &self.encoders {
                encoder.encode(album, &mut data);
            }
        }

        tracing::debug!(
            "Transformed {} albums into ({}, {}) feature matrix",
            albums.len(),
            albums.len(),
            width
        );
        FeatureMatrix::new(data, albums.len(), width)
    }

    /// Feature vector of a single album
    pub fn transform_one(&self, album: &Album) -> Vector {
        let mut data = Vec::with_capacity(self.n_features());
        for encoder in &self.encoders {
            encoder.encode(album, &mut data);
        }
        Vector::new(data)
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    pub fn vocabulary(&self) -> &CollectionVocabulary {
        &self.vocabulary
    }

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }
}

/// Stateful fit/transform facade
///
/// `fit` takes `&mut self`, so a fit cannot overlap a transform on the same
/// extractor.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    fitted: Option<FittedPipeline>,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Fit on `collection`, replacing any previous fit only on success
    pub fn fit(&mut self, collection: &[Album]) -> Result<&FittedPipeline> {
        let pipeline = FittedPipeline::fit(&self.config, collection)?;
        Ok(&*self.fitted.insert(pipeline))
    }

    pub fn transform(&self, albums: &[Album]) -> Result<FeatureMatrix> {
        Ok(self.pipeline()?.transform(albums))
    }

    pub fn fit_transform(&mut self, collection: &[Album]) -> Result<FeatureMatrix> {
        self.fit(collection)?;
        self.transform(collection)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn pipeline(&self) -> Result<&FittedPipeline> {
        self.fitted.as_ref().ok_or(FeatureError::NotFitted)
    }

    pub fn feature_names(&self) -> Result<&[String]> {
        Ok(self.pipeline()?.feature_names())
    }

    pub fn profile(&self) -> Result<&PreferenceProfile> {
        Ok(self.pipeline()?.profile())
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Swap the configuration used by the next fit; the current fit is kept
    pub fn set_config(&mut self, config: FeatureConfig) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{FORMAT_WIDTH, YEAR_WIDTH};

    fn scenario() -> Vec<Album> {
        vec![
            Album::new(1, "Rock One", "Artist X").with_genres(["Rock"]).with_year(1975),
            Album::new(2, "Rock Two", "Artist X").with_genres(["Rock"]).with_year(1978),
            Album::new(3, "Jazz Three", "Artist Y").with_genres(["Jazz"]).with_year(2005),
        ]
    }

    fn scenario_config() -> FeatureConfig {
        FeatureConfig {
            min_genre_frequency: 1,
            max_genres: 10,
            min_artist_frequency: 1,
            max_artists: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_before_fit() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.transform(&scenario()), Err(FeatureError::NotFitted));
        assert_eq!(extractor.feature_names(), Err(FeatureError::NotFitted));
        assert!(!extractor.is_fitted());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let albums = scenario();
        let pipeline = FittedPipeline::fit(&scenario_config(), &albums).unwrap();

        let vocab = pipeline.vocabulary();
        assert_eq!(vocab.genres.vocabulary.terms(), &["Jazz", "Rock"]);
        assert_eq!(vocab.artists.vocabulary.terms(), &["Artist X", "Artist Y"]);

        let row = pipeline.transform_one(&albums[0]);
        let row = row.as_slice();

        let genre = pipeline.block(BlockKind::Genre).unwrap().range.clone();
        assert_eq!(&row[genre], &[0.0, 1.0]);

        let artist = pipeline.block(BlockKind::Artist).unwrap().range.clone();
        assert!((row[artist.start] - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(row[artist.start + 1], 0.0);

        let year = pipeline.block(BlockKind::Year).unwrap().range.clone();
        assert_eq!(&row[year.start + 7..year.start + 10], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_width_invariant() {
        let albums = scenario();
        let pipeline = FittedPipeline::fit(&scenario_config(), &albums).unwrap();
        let matrix = pipeline.transform(&albums);

        let block_sum: usize = pipeline.blocks().iter().map(Block::width).sum();
        assert_eq!(matrix.shape(), (3, pipeline.n_features()));
        assert_eq!(block_sum, pipeline.n_features());

        let kinds: Vec<BlockKind> = pipeline.blocks().iter().map(|b| b.kind).collect();
        assert_eq!(kinds, BlockKind::ORDER.to_vec());

        let stranger = Album::new(99, "Something Else", "Nobody").with_genres(["Polka"]);
        assert_eq!(pipeline.transform_one(&stranger).dim(), pipeline.n_features());
    }

    #[test]
    fn test_empty_collection() {
        let pipeline = FittedPipeline::fit(&FeatureConfig::default(), &[]).unwrap();
        assert_eq!(pipeline.n_features(), YEAR_WIDTH + FORMAT_WIDTH);
        assert_eq!(pipeline.profile().diversity_score, 0.0);

        let matrix = pipeline.transform(&[Album::new(1, "x", "y").with_year(2001)]);
        assert_eq!(matrix.shape(), (1, 14));
    }

    #[test]
    fn test_fit_transform_matches_fit_then_transform() {
        let albums = scenario();
        let mut a = FeatureExtractor::new(scenario_config());
        let mut b = FeatureExtractor::new(scenario_config());

        let combined = a.fit_transform(&albums).unwrap();
        b.fit(&albums).unwrap();
        let separate = b.transform(&albums).unwrap();

        assert_eq!(combined, separate);
        assert_eq!(combined, b.transform(&albums).unwrap());
    }

    #[test]
    fn test_refit_replaces_state() {
        let mut extractor = FeatureExtractor::new(scenario_config());
        extractor.fit(&scenario()).unwrap();

        let jazz_only = vec![Album::new(5, "t", "Z").with_genres(["Jazz"])];
        extractor.fit(&jazz_only).unwrap();

        let pipeline = extractor.pipeline().unwrap();
        assert_eq!(pipeline.vocabulary().genres.vocabulary.terms(), &["Jazz"]);
        assert_eq!(pipeline.vocabulary().artists.vocabulary.terms(), &["Z"]);
    }

    #[test]
    fn test_failed_refit_keeps_previous_state() {
        let mut extractor = FeatureExtractor::new(scenario_config());
        extractor.fit(&scenario()).unwrap();
        let before = extractor.pipeline().unwrap().clone();

        extractor.set_config(FeatureConfig {
            max_df: 2.0,
            ..Default::default()
        });
        assert!(matches!(
            extractor.fit(&[]),
            Err(FeatureError::Configuration(_))
        ));
        assert_eq!(extractor.pipeline().unwrap(), &before);
    }

    #[test]
    fn test_zero_width_matrix_rows() {
        let matrix = FeatureMatrix::new(Vec::new(), 2, 0);
        assert_eq!(matrix.rows().count(), 2);
        assert!(matrix.row(1).is_empty());
    }
}
