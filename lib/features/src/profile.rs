//! Preference profile
//!
//! A descriptive summary of the fit-time collection. It is computed once per
//! fit for reporting and never feeds back into transform.

use crate::encoder::{era_index, ERAS};
use crate::vocabulary::CollectionVocabulary;
use serde::{Deserialize, Serialize};
use vinylx_core::Album;

/// Fraction of dated albums per era
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EraDistribution {
    pub classic: f32,
    pub modern: f32,
    pub contemporary: f32,
}

impl EraDistribution {
    /// Albums without a plausible year are left out; all zeros if none remain
    pub fn from_albums(albums: &[Album]) -> Self {
        let mut counts = [0usize; ERAS.len()];
        for year in albums.iter().filter_map(Album::known_year) {
            counts[era_index(year)] += 1;
        }

        let total: usize = counts.iter().sum();
        if total == 0 {
            return Self::default();
        }

        let fraction = |c: usize| c as f32 / total as f32;
        Self {
            classic: fraction(counts[0]),
            modern: fraction(counts[1]),
            contemporary: fraction(counts[2]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub favorite_genres: Vec<(String, u32)>,
    pub favorite_styles: Vec<(String, u32)>,
    pub favorite_artists: Vec<(String, u32)>,
    pub favorite_labels: Vec<(String, u32)>,
    pub era_preference: EraDistribution,
    /// `min(unique genres / albums, 1.0)`
    pub diversity_score: f32,
}

impl PreferenceProfile {
    pub fn compute(vocab: &CollectionVocabulary, albums: &[Album]) -> Self {
        let diversity_score = if albums.is_empty() {
            0.0
        } else {
            (vocab.genres.frequencies.len() as f32 / albums.len() as f32).min(1.0)
        };

        Self {
            favorite_genres: vocab.genres.frequencies.most_common(5),
            favorite_styles: vocab.styles.frequencies.most_common(5),
            favorite_artists: vocab.artists.frequencies.most_common(10),
            favorite_labels: vocab.labels.frequencies.most_common(10),
            era_preference: EraDistribution::from_albums(albums),
            diversity_score,
        }
    }
}
