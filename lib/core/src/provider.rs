//! Album providers
//!
//! The feature pipeline never fetches anything. Callers hand it albums
//! obtained from a provider: an in-memory list, a normalized album file, or a
//! Discogs collection export. Providers are passed explicitly; there is no
//! process-wide client.

use crate::album::Album;
use crate::discogs::parse_collection_export;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Source of album records
pub trait AlbumProvider {
    /// Stable name of the collection this provider yields, used as a cache key
    fn source_key(&self) -> String;

    /// Load every album
    fn albums(&self) -> Result<Vec<Album>>;
}

impl<P: AlbumProvider + ?Sized> AlbumProvider for &P {
    fn source_key(&self) -> String {
        (**self).source_key()
    }

    fn albums(&self) -> Result<Vec<Album>> {
        (**self).albums()
    }
}

/// Albums already in memory
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    albums: Vec<Album>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            name: name.into(),
            albums,
        }
    }
}

impl AlbumProvider for StaticProvider {
    fn source_key(&self) -> String {
        self.name.clone()
    }

    fn albums(&self) -> Result<Vec<Album>> {
        Ok(self.albums.clone())
    }
}

/// A JSON array of [`Album`] records
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl AlbumProvider for JsonFileProvider {
    fn source_key(&self) -> String {
        format!("albums:{}", self.path.display())
    }

    fn albums(&self) -> Result<Vec<Album>> {
        let data = std::fs::read_to_string(&self.path)?;
        let albums: Vec<Album> = serde_json::from_str(&data)?;
        tracing::info!("Loaded {} albums from {:?}", albums.len(), self.path);
        Ok(albums)
    }
}

/// Discogs collection export: one page object or an array of pages
#[derive(Debug, Clone)]
pub struct DiscogsExportProvider {
    path: PathBuf,
    username: Option<String>,
}

impl DiscogsExportProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            username: None,
        }
    }

    /// Key the collection by its owner rather than by file path
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl AlbumProvider for DiscogsExportProvider {
    fn source_key(&self) -> String {
        match &self.username {
            Some(user) => format!("discogs:{}", user),
            None => format!("discogs:{}", self.path.display()),
        }
    }

    fn albums(&self) -> Result<Vec<Album>> {
        let data = std::fs::read_to_string(&self.path)?;
        let albums = parse_collection_export(&data)
            .map_err(|e| Error::Provider(format!("{}: {}", self.path.display(), e)))?;
        tracing::info!("Parsed {} releases from {:?}", albums.len(), self.path);
        Ok(albums)
    }
}
