//! # vinylx Features
//!
//! Turns a personal record collection into fixed-width numeric vectors.
//!
//! ## Overview
//!
//! A pipeline is fitted once on a whole collection. Fitting learns the
//! vocabularies (genres, styles, artists, labels) and a TF-IDF text model
//! over titles and notes. The fitted pipeline then maps any album, seen or
//! unseen, to a vector of the same width.
//!
//! **Vector layout** (blocks in this order):
//! 1. Genre multi-hot
//! 2. Style multi-hot
//! 3. Artist weights, `min(count / 3, 1)`
//! 4. Label weights, `min(count / 5, 1)`
//! 5. Year: 7 decades, 3 eras, 1 recency score
//! 6. TF-IDF text terms (unigrams and bigrams)
//! 7. Format flags: vinyl, cd, digital
//!
//! ## Example
//!
//! ```rust
//! use vinylx_core::Album;
//! use vinylx_features::{FeatureConfig, FeatureExtractor};
//!
//! let albums = vec![
//!     Album::new(1, "Blue Train", "John Coltrane").with_genres(["Jazz"]).with_year(1957),
//!     Album::new(2, "Giant Steps", "John Coltrane").with_genres(["Jazz"]).with_year(1960),
//! ];
//!
//! let mut extractor = FeatureExtractor::new(FeatureConfig::default());
//! let matrix = extractor.fit_transform(&albums).unwrap();
//! assert_eq!(matrix.n_rows(), 2);
//! assert_eq!(matrix.n_features(), extractor.feature_names().unwrap().len());
//! ```
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐
//! │ Collection │────>│ Vocabulary │────>│  Encoders  │
//! │  (albums)  │     │  + TF-IDF  │     │  (blocks)  │
//! └────────────┘     └────────────┘     └────────────┘
//!                                              │
//!                                       ┌──────┴──────┐
//!                                       │   Feature   │
//!                                       │   Matrix    │
//!                                       └─────────────┘
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod explain;
pub mod pipeline;
pub mod profile;
pub mod stopwords;
pub mod tfidf;
pub mod vocabulary;

pub use config::{AxisLimits, FeatureConfig};
pub use encoder::{BlockKind, Encoder, FORMAT_WIDTH, YEAR_WIDTH};
pub use error::{FeatureError, Result};
pub use explain::{
    feature_importance, shared_features, AlbumComparison, BlockActivity, FeatureAnalysis,
};
pub use pipeline::{Block, FeatureExtractor, FeatureMatrix, FittedPipeline};
pub use profile::{EraDistribution, PreferenceProfile};
pub use tfidf::{TfidfParams, TfidfVectorizer};
pub use vocabulary::{
    Axis, AxisStats, CollectionVocabulary, FrequencyTable, Vocabulary, VocabularyBuilder,
};
