//! # vinylx Core
//!
//! Core types shared by the vinylx crates.
//!
//! - [`Album`] - A release record from a personal collection
//! - [`AlbumProvider`] - Anything that can yield albums (memory, files, caches)
//! - [`discogs`] - Parsing of Discogs collection exports
//! - [`Vector`] - Dense feature vector with cosine similarity
//!
//! ## Example
//!
//! ```rust
//! use vinylx_core::{Album, AlbumProvider, StaticProvider};
//!
//! let albums = vec![
//!     Album::new(1, "Kind of Blue", "Miles Davis")
//!         .with_year(1959)
//!         .with_genres(["Jazz"])
//!         .with_formats(["Vinyl"]),
//! ];
//! let provider = StaticProvider::new("my-shelf", albums);
//! assert_eq!(provider.albums().unwrap().len(), 1);
//! ```

pub mod album;
pub mod discogs;
pub mod error;
pub mod provider;
pub mod vector;

pub use album::{Album, AlbumQuery, MIN_PLAUSIBLE_YEAR};
pub use discogs::{parse_collection_export, CollectionPage, CollectionRelease, UNKNOWN_ARTIST};
pub use error::{Error, Result};
pub use provider::{AlbumProvider, DiscogsExportProvider, JsonFileProvider, StaticProvider};
pub use vector::Vector;
