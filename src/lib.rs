//! # vinylx
//!
//! Content-based feature vectors for a personal record collection.
//!
//! vinylx learns the vocabulary of one collection (genres, styles, artists,
//! labels, title and note terms) and maps every album, including albums not
//! in the collection, to a fixed-width numeric vector. The vectors feed
//! similarity search and recommendation models built elsewhere.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install vinylx
//! vinylx fit --input collection.json --format discogs
//! vinylx compare --input collection.json 1001 1002
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use vinylx::prelude::*;
//!
//! let albums = vec![
//!     Album::new(1, "Kind of Blue", "Miles Davis")
//!         .with_year(1959)
//!         .with_genres(["Jazz"])
//!         .with_formats(["Vinyl"]),
//!     Album::new(2, "Sketches of Spain", "Miles Davis")
//!         .with_year(1960)
//!         .with_genres(["Jazz"])
//!         .with_formats(["Vinyl"]),
//! ];
//!
//! let pipeline = FittedPipeline::fit(&FeatureConfig::default(), &albums).unwrap();
//! let matrix = pipeline.transform(&albums);
//! assert_eq!(matrix.shape(), (2, pipeline.n_features()));
//!
//! let a = matrix.row_vector(0);
//! let b = matrix.row_vector(1);
//! assert!(a.cosine_similarity(&b) > 0.5);
//! ```
//!
//! ## Crate Structure
//!
//! vinylx is composed of several crates:
//!
//! - `vinylx-core` - Album records, Discogs export parsing, providers, vectors
//! - `vinylx-features` - Vocabularies, encoders, the fitted pipeline, explainability
//! - `vinylx-storage` - LMDB cache with TTL and a read-through provider
//!
//! ## Features
//!
//! - **Bounded vocabularies**: Frequency-ranked and thresholded per axis
//! - **Weighted encodings**: Artist and label counts saturate at 3 and 5
//! - **Text model**: Unigram and bigram TF-IDF over titles and notes
//! - **Explainability**: Every slot has a name; per-album importance
//! - **Caching**: Collections, release details and searches with TTLs

// Re-export core types
pub use vinylx_core::{
    Album, AlbumProvider, AlbumQuery, DiscogsExportProvider, JsonFileProvider, StaticProvider,
    Vector, Error, Result,
};

// Re-export feature pipeline
pub use vinylx_features::{
    AlbumComparison, BlockKind, FeatureAnalysis, FeatureConfig, FeatureError,
    FeatureExtractor, FeatureMatrix, FittedPipeline, PreferenceProfile,
    feature_importance, shared_features,
};

// Re-export storage
pub use vinylx_storage::{AlbumCache, CachedProvider, CollectionCache, cache_key};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Album, AlbumProvider, StaticProvider, Vector,
        FeatureConfig, FeatureExtractor, FeatureMatrix, FittedPipeline,
        FeatureError, PreferenceProfile,
        CachedProvider, CollectionCache,
    };
}
