use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Years at or before this are treated as unknown.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;

/// A release from a user's collection
///
/// Only the categorical, temporal and textual fields feed the feature
/// pipeline. `tracklist`, `date_added`, the folder/instance ids and the raw
/// `basic_information` payload are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Album {
    pub id: u64,
    pub title: String,
    /// Primary artist name
    pub artist: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tracklist: Vec<Value>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub instance_id: Option<u64>,
    #[serde(default)]
    pub basic_information: Value,
}

impl Album {
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.styles = styles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The release year, if present and after 1900
    #[inline]
    pub fn known_year(&self) -> Option<i32> {
        self.year.filter(|&y| y > MIN_PLAUSIBLE_YEAR)
    }

    /// Title and notes joined by a single space; absent notes become ""
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.notes.as_deref().unwrap_or(""))
    }

    /// Short "Artist - Title (year)" label for reports
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} - {} ({})", self.artist, self.title, year),
            None => format!("{} - {}", self.artist, self.title),
        }
    }

    /// Case-insensitive substring match on both title and artist
    pub fn matches(&self, title: &str, artist: &str) -> bool {
        self.title.to_lowercase().contains(&title.to_lowercase())
            && self.artist.to_lowercase().contains(&artist.to_lowercase())
    }
}

/// Picks one album out of a collection
///
/// Parsed from a numeric id, `"Artist - Title"`, or a bare title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumQuery {
    Id(u64),
    /// Substrings of title and artist; an empty artist matches any artist
    TitleArtist { title: String, artist: String },
}

impl AlbumQuery {
    /// The first album in `albums` selected by this query
    pub fn find<'a>(&self, albums: &'a [Album]) -> Option<&'a Album> {
        albums.iter().find(|album| match self {
            AlbumQuery::Id(id) => album.id == *id,
            AlbumQuery::TitleArtist { title, artist } => album.matches(title, artist),
        })
    }
}

impl FromStr for AlbumQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidData("empty album selector".to_string()));
        }
        if let Ok(id) = s.parse() {
            return Ok(AlbumQuery::Id(id));
        }

        let (artist, title) = s.split_once(" - ").unwrap_or(("", s));
        Ok(AlbumQuery::TitleArtist {
            title: title.trim().to_string(),
            artist: artist.trim().to_string(),
        })
    }
}

impl fmt::Display for AlbumQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumQuery::Id(id) => write!(f, "album {}", id),
            AlbumQuery::TitleArtist { title, artist } if artist.is_empty() => {
                write!(f, "\"{}\"", title)
            }
            AlbumQuery::TitleArtist { title, artist } => write!(f, "\"{} - {}\"", artist, title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_year_filters_implausible() {
        assert_eq!(Album::new(1, "a", "b").known_year(), None);
        assert_eq!(Album::new(1, "a", "b").with_year(1900).known_year(), None);
        assert_eq!(Album::new(1, "a", "b").with_year(0).known_year(), None);
        assert_eq!(Album::new(1, "a", "b").with_year(1901).known_year(), Some(1901));
    }

    #[test]
    fn test_text_without_notes() {
        let album = Album::new(1, "Kind of Blue", "Miles Davis");
        assert_eq!(album.text(), "Kind of Blue ");

        let album = album.with_notes("Original pressing");
        assert_eq!(album.text(), "Kind of Blue Original pressing");
    }

    #[test]
    fn test_matches_ignores_case() {
        let album = Album::new(1, "A Love Supreme", "John Coltrane");
        assert!(album.matches("love supreme", "coltrane"));
        assert!(album.matches("LOVE", ""));
        assert!(!album.matches("love supreme", "davis"));
        assert!(!album.matches("giant steps", "coltrane"));
    }

    #[test]
    fn test_album_query_selects() {
        let albums = vec![
            Album::new(10, "Kind of Blue", "Miles Davis"),
            Album::new(20, "Blue Train", "John Coltrane"),
            Album::new(30, "Giant Steps", "John Coltrane"),
        ];

        let query: AlbumQuery = "20".parse().unwrap();
        assert_eq!(query, AlbumQuery::Id(20));
        assert_eq!(query.find(&albums).unwrap().title, "Blue Train");

        let query: AlbumQuery = "coltrane - giant".parse().unwrap();
        assert_eq!(query.find(&albums).unwrap().id, 30);

        let query: AlbumQuery = "blue".parse().unwrap();
        assert_eq!(query.find(&albums).unwrap().id, 10);

        let query: AlbumQuery = "Davis - Giant Steps".parse().unwrap();
        assert!(query.find(&albums).is_none());
        assert_eq!(query.to_string(), "\"Davis - Giant Steps\"");

        assert!("  ".parse::<AlbumQuery>().is_err());
    }

    #[test]
    fn test_deserialize_minimal_album() {
        let album: Album = serde_json::from_str(
            r#"{"id": 7, "title": "Blue Train", "artist": "John Coltrane"}"#,
        )
        .unwrap();

        assert_eq!(album.id, 7);
        assert!(album.genres.is_empty());
        assert!(album.year.is_none());
        assert!(album.basic_information.is_null());
    }
}
