//! Frequency tables and bounded vocabularies
//!
//! One scan of the fit-time collection counts every occurrence of every
//! genre, style, artist and label. Each axis then keeps a bounded vocabulary:
//! the `max_size` most frequent values, of which only those seen at least
//! `min_frequency` times survive. Truncation happens first, so a value cut by
//! `max_size` never reaches the frequency filter.

use crate::config::{AxisLimits, FeatureConfig};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use vinylx_core::Album;

/// A categorical dimension of album metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Genre,
    Style,
    Artist,
    Label,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Genre, Axis::Style, Axis::Artist, Axis::Label];

    /// Prefix used in feature names
    pub fn prefix(self) -> &'static str {
        match self {
            Axis::Genre => "genre",
            Axis::Style => "style",
            Axis::Artist => "artist",
            Axis::Label => "label",
        }
    }

    /// The album's values on this axis; the single artist is a one-element slice
    pub fn values(self, album: &Album) -> &[String] {
        match self {
            Axis::Genre => &album.genres,
            Axis::Style => &album.styles,
            Axis::Artist => std::slice::from_ref(&album.artist),
            Axis::Label => &album.labels,
        }
    }

    pub fn limits(self, config: &FeatureConfig) -> AxisLimits {
        match self {
            Axis::Genre => config.genre_limits(),
            Axis::Style => config.style_limits(),
            Axis::Artist => config.artist_limits(),
            Axis::Label => config.label_limits(),
        }
    }
}

/// Occurrence counts for one axis over the fit-time collection
///
/// Duplicates inside a single album count separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: AHashMap<String, u32>,
}

impl FrequencyTable {
    pub fn from_albums(axis: Axis, albums: &[Album]) -> Self {
        let mut counts: AHashMap<String, u32> = AHashMap::new();
        for album in albums {
            for value in axis.values(album) {
                *counts.entry(value.clone()).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Count for `value`, 0 if never seen
    #[inline]
    pub fn get(&self, value: &str) -> u32 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of occurrences
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// All entries by descending count, ties by ascending value
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> =
            self.counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The `n` most common entries, owned
    pub fn most_common(&self, n: usize) -> Vec<(String, u32)> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// An ordered set of known values with stable slot indices
///
/// Slots follow ascending lexicographic order of the values, independent of
/// their frequencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build from arbitrary values; duplicates collapse
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort();
        terms.dedup();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { terms, index }
    }

    /// Top `max_size` by frequency, then drop those below `min_frequency`
    pub fn select(table: &FrequencyTable, limits: AxisLimits) -> Self {
        let kept = table
            .ranked()
            .into_iter()
            .take(limits.max_size)
            .filter(|&(_, count)| count >= limits.min_frequency)
            .map(|(value, _)| value);
        Self::from_terms(kept)
    }

    #[inline]
    pub fn slot(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    #[inline]
    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Values in slot order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Frequency table and vocabulary of one axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStats {
    pub axis: Axis,
    pub frequencies: FrequencyTable,
    pub vocabulary: Vocabulary,
}

/// Output of the vocabulary builder for all four axes
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionVocabulary {
    pub album_count: usize,
    pub genres: AxisStats,
    pub styles: AxisStats,
    pub artists: AxisStats,
    pub labels: AxisStats,
}

impl CollectionVocabulary {
    pub fn axis(&self, axis: Axis) -> &AxisStats {
        match axis {
            Axis::Genre => &self.genres,
            Axis::Style => &self.styles,
            Axis::Artist => &self.artists,
            Axis::Label => &self.labels,
        }
    }
}

/// Scans a collection and selects per-axis vocabularies
#[derive(Debug, Clone)]
pub struct VocabularyBuilder<'a> {
    config: &'a FeatureConfig,
}

impl<'a> VocabularyBuilder<'a> {
    pub fn new(config: &'a FeatureConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, albums: &[Album]) -> CollectionVocabulary {
        let stats = |axis: Axis| {
            let frequencies = FrequencyTable::from_albums(axis, albums);
            let vocabulary = Vocabulary::select(&frequencies, axis.limits(self.config));
            AxisStats {
                axis,
                frequencies,
                vocabulary,
            }
        };

        let vocab = CollectionVocabulary {
            album_count: albums.len(),
            genres: stats(Axis::Genre),
            styles: stats(Axis::Style),
            artists: stats(Axis::Artist),
            labels: stats(Axis::Label),
        };

        tracing::info!(
            "Selected features: {} genres, {} styles, {} artists, {} labels",
            vocab.genres.vocabulary.len(),
            vocab.styles.vocabulary.len(),
            vocab.artists.vocabulary.len(),
            vocab.labels.vocabulary.len()
        );

        vocab
    }
}
