//! Discogs collection export parsing
//!
//! Converts the JSON returned by
//! `/users/{username}/collection/folders/{folder}/releases` into [`Album`]
//! records. Fetching those pages is left to the caller; this module only
//! understands their shape.

use crate::album::Album;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Artist name used when a release lists no artists
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// One page of a collection folder listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollectionPage {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub releases: Vec<CollectionRelease>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub items: u64,
}

/// A collection item, wrapping the release's `basic_information`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollectionRelease {
    #[serde(default)]
    pub basic_information: Value,
    #[serde(default)]
    pub notes: Option<Value>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    #[serde(default)]
    pub instance_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BasicInformation {
    id: Option<u64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    artists: Vec<Named>,
    #[serde(default)]
    labels: Vec<Named>,
    #[serde(default)]
    formats: Vec<Named>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    styles: Vec<String>,
    #[serde(default)]
    tracklist: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

impl CollectionRelease {
    /// Convert into an [`Album`], keeping the raw payload
    pub fn into_album(self) -> Result<Album> {
        let info: BasicInformation = serde_json::from_value(self.basic_information.clone())?;
        let id = info
            .id
            .ok_or_else(|| Error::InvalidData("release without basic_information.id".to_string()))?;

        let artist = info
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Ok(Album {
            id,
            title: info.title,
            artist,
            // Discogs reports unknown years as 0
            year: info.year.filter(|&y| y != 0),
            genres: info.genres,
            styles: info.styles,
            labels: info.labels.into_iter().map(|l| l.name).collect(),
            formats: info.formats.into_iter().map(|f| f.name).collect(),
            notes: self.notes.as_ref().and_then(notes_text),
            tracklist: info.tracklist,
            date_added: self.date_added,
            folder_id: self.folder_id,
            instance_id: self.instance_id,
            basic_information: self.basic_information,
        })
    }
}

/// Notes arrive either as plain text or as the collection note-field array
/// (`[{"field_id": 3, "value": "..."}]`).
fn notes_text(notes: &Value) -> Option<String> {
    match notes {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(fields) => {
            let parts: Vec<&str> = fields
                .iter()
                .filter_map(|f| f.get("value").and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        _ => None,
    }
}

impl CollectionPage {
    pub fn into_albums(self) -> Result<Vec<Album>> {
        self.releases.into_iter().map(CollectionRelease::into_album).collect()
    }
}

/// Parse an export document: a single page object or an array of pages
pub fn parse_collection_export(json: &str) -> Result<Vec<Album>> {
    let value: Value = serde_json::from_str(json)?;
    let pages: Vec<CollectionPage> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(_) => vec![serde_json::from_value(value)?],
        other => {
            return Err(Error::InvalidData(format!(
                "expected a page object or an array of pages, got {}",
                other
            )))
        }
    };

    let mut albums = Vec::new();
    for page in pages {
        if let Some(p) = &page.pagination {
            tracing::debug!("Parsing collection page {}/{}", p.page, p.pages);
        }
        albums.extend(page.into_albums()?);
    }
    Ok(albums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn release() -> Value {
        json!({
            "id": 1111,
            "instance_id": 42,
            "folder_id": 1,
            "date_added": "2024-03-01T10:00:00-08:00",
            "notes": [{"field_id": 3, "value": "Gatefold, first press"}],
            "basic_information": {
                "id": 249504,
                "title": "Kind Of Blue",
                "year": 1959,
                "artists": [{"name": "Miles Davis"}, {"name": "John Coltrane"}],
                "labels": [{"name": "Columbia", "catno": "CL 1355"}],
                "formats": [{"name": "Vinyl", "qty": "1"}],
                "genres": ["Jazz"],
                "styles": ["Modal", "Cool Jazz"]
            }
        })
    }

    #[test]
    fn test_parse_release() {
        let rel: CollectionRelease = serde_json::from_value(release()).unwrap();
        let album = rel.into_album().unwrap();

        assert_eq!(album.id, 249504);
        assert_eq!(album.artist, "Miles Davis");
        assert_eq!(album.year, Some(1959));
        assert_eq!(album.labels, vec!["Columbia"]);
        assert_eq!(album.formats, vec!["Vinyl"]);
        assert_eq!(album.styles, vec!["Modal", "Cool Jazz"]);
        assert_eq!(album.notes.as_deref(), Some("Gatefold, first press"));
        assert_eq!(album.instance_id, Some(42));
        assert_eq!(album.basic_information["title"], "Kind Of Blue");
    }

    #[test]
    fn test_missing_artist_and_zero_year() {
        let rel: CollectionRelease = serde_json::from_value(json!({
            "basic_information": {"id": 5, "title": "Untitled", "year": 0}
        }))
        .unwrap();
        let album = rel.into_album().unwrap();

        assert_eq!(album.artist, UNKNOWN_ARTIST);
        assert_eq!(album.year, None);
        assert!(album.notes.is_none());
    }

    #[test]
    fn test_missing_id_is_invalid() {
        let rel: CollectionRelease =
            serde_json::from_value(json!({"basic_information": {"title": "x"}})).unwrap();
        assert!(matches!(rel.into_album(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_parse_export_single_and_multi_page() {
        let page = json!({
            "pagination": {"page": 1, "pages": 1, "items": 1},
            "releases": [release()]
        });
        let single = parse_collection_export(&page.to_string()).unwrap();
        assert_eq!(single.len(), 1);

        let pages = json!([page.clone(), page]);
        let multi = parse_collection_export(&pages.to_string()).unwrap();
        assert_eq!(multi.len(), 2);

        assert!(parse_collection_export("42").is_err());
    }
}
