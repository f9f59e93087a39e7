//! Per-axis encoders
//!
//! Every encoder turns one album into a fixed-width block of the feature
//! vector. Widths are settled at fit time and never depend on the album being
//! encoded; values a fitted encoder does not know map to zeros.

use crate::config::FeatureConfig;
use crate::tfidf::{TfidfParams, TfidfVectorizer};
use crate::vocabulary::{Axis, CollectionVocabulary, Vocabulary};
use serde::{Deserialize, Serialize};
use vinylx_core::Album;

/// Decades with a one-hot slot
pub const DECADES: [i32; 7] = [1960, 1970, 1980, 1990, 2000, 2010, 2020];

pub const ERAS: [&str; 3] = ["classic", "modern", "contemporary"];

/// 7 decades + 3 eras + recency
pub const YEAR_WIDTH: usize = DECADES.len() + ERAS.len() + 1;

pub const FORMAT_NAMES: [&str; 3] = ["format_vinyl", "format_cd", "format_digital"];

pub const FORMAT_WIDTH: usize = FORMAT_NAMES.len();

/// Artist frequency at which the preference weight saturates
pub const ARTIST_SATURATION: f32 = 3.0;

/// Label frequency at which the preference weight saturates
pub const LABEL_SATURATION: f32 = 5.0;

/// Span in years over which recency decays to zero
const RECENCY_SPAN: f32 = 50.0;

/// Blocks of the feature vector, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Genre,
    Style,
    Artist,
    Label,
    Year,
    Text,
    Format,
}

impl BlockKind {
    pub const ORDER: [BlockKind; 7] = [
        BlockKind::Genre,
        BlockKind::Style,
        BlockKind::Artist,
        BlockKind::Label,
        BlockKind::Year,
        BlockKind::Text,
        BlockKind::Format,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Genre => "genre",
            BlockKind::Style => "style",
            BlockKind::Artist => "artist",
            BlockKind::Label => "label",
            BlockKind::Year => "year",
            BlockKind::Text => "text",
            BlockKind::Format => "format",
        }
    }
}

impl From<Axis> for BlockKind {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Genre => BlockKind::Genre,
            Axis::Style => BlockKind::Style,
            Axis::Artist => BlockKind::Artist,
            Axis::Label => BlockKind::Label,
        }
    }
}

/// Era index for a plausible year: <1980 classic, <2000 modern, else contemporary
#[inline]
pub fn era_index(year: i32) -> usize {
    if year < 1980 {
        0
    } else if year < 2000 {
        1
    } else {
        2
    }
}

/// A fitted encoder for one block
#[derive(Debug, Clone, PartialEq)]
pub enum Encoder {
    /// 1.0 for each known value present, duplicates collapse
    MultiHot { axis: Axis, vocabulary: Vocabulary },
    /// Known values get `min(fit_frequency / saturation, 1.0)` at their slot
    Weighted {
        axis: Axis,
        vocabulary: Vocabulary,
        weights: Vec<f32>,
    },
    /// Decade one-hot, era one-hot, recency
    Year { reference_year: i32 },
    /// TF-IDF over lower-cased "title notes"
    Text(TfidfVectorizer),
    /// Vinyl, CD, digital flags
    Format,
}

impl Encoder {
    pub fn multi_hot(axis: Axis, vocabulary: Vocabulary) -> Self {
        Encoder::MultiHot { axis, vocabulary }
    }

    /// Preference-weighted encoder; `weight_of` yields the fit-time frequency
    pub fn weighted(
        axis: Axis,
        vocabulary: Vocabulary,
        saturation: f32,
        weight_of: impl Fn(&str) -> u32,
    ) -> Self {
        let weights = vocabulary
            .terms()
            .iter()
            .map(|term| (weight_of(term) as f32 / saturation).min(1.0))
            .collect();
        Encoder::Weighted {
            axis,
            vocabulary,
            weights,
        }
    }

    pub fn text<S: AsRef<str>>(corpus: &[S], config: &FeatureConfig) -> Self {
        Encoder::Text(TfidfVectorizer::fit(
            corpus,
            TfidfParams {
                max_features: config.max_text_features,
                min_df: config.min_df,
                max_df: config.max_df,
                stop_words: config.text_stop_words,
            },
        ))
    }

    /// Fit the full encoder set in block order
    pub fn fit_all(
        config: &FeatureConfig,
        vocab: &CollectionVocabulary,
        albums: &[Album],
    ) -> Vec<Encoder> {
        let corpus: Vec<String> = albums.iter().map(|a| a.text().to_lowercase()).collect();

        vec![
            Encoder::multi_hot(Axis::Genre, vocab.genres.vocabulary.clone()),
            Encoder::multi_hot(Axis::Style, vocab.styles.vocabulary.clone()),
            Encoder::weighted(
                Axis::Artist,
                vocab.artists.vocabulary.clone(),
                ARTIST_SATURATION,
                |artist| vocab.artists.frequencies.get(artist),
            ),
            Encoder::weighted(
                Axis::Label,
                vocab.labels.vocabulary.clone(),
                LABEL_SATURATION,
                |label| vocab.labels.frequencies.get(label),
            ),
            Encoder::Year {
                reference_year: config.reference_year,
            },
            Encoder::text(&corpus, config),
            Encoder::Format,
        ]
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Encoder::MultiHot { axis, .. } | Encoder::Weighted { axis, .. } => (*axis).into(),
            Encoder::Year { .. } => BlockKind::Year,
            Encoder::Text(_) => BlockKind::Text,
            Encoder::Format => BlockKind::Format,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Encoder::MultiHot { vocabulary, .. } | Encoder::Weighted { vocabulary, .. } => {
                vocabulary.len()
            }
            Encoder::Year { .. } => YEAR_WIDTH,
            Encoder::Text(model) => model.width(),
            Encoder::Format => FORMAT_WIDTH,
        }
    }

    /// Slot names, `width()` of them
    pub fn feature_names(&self) -> Vec<String> {
        match self {
            Encoder::MultiHot { axis, vocabulary } | Encoder::Weighted { axis, vocabulary, .. } => {
                vocabulary
                    .terms()
                    .iter()
                    .map(|term| format!("{}_{}", axis.prefix(), term))
                    .collect()
            }
            Encoder::Year { .. } => DECADES
                .iter()
                .map(|d| format!("decade_{}s", d))
                .chain(ERAS.iter().map(|e| format!("era_{}", e)))
                .chain(std::iter::once("year_recency".to_string()))
                .collect(),
            Encoder::Text(model) => model.terms().iter().map(|t| format!("text_{}", t)).collect(),
            Encoder::Format => FORMAT_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Append this block for `album` to `out`
    pub fn encode(&self, album: &Album, out: &mut Vec<f32>) {
        let start = out.len();
        out.resize(start + self.width(), 0.0);
        let block = &mut out[start..];

        match self {
            Encoder::MultiHot { axis, vocabulary } => {
                for value in axis.values(album) {
                    if let Some(slot) = vocabulary.slot(value) {
                        block[slot] = 1.0;
                    }
                }
            }
            Encoder::Weighted {
                axis,
                vocabulary,
                weights,
            } => {
                for value in axis.values(album) {
                    if let Some(slot) = vocabulary.slot(value) {
                        block[slot] = weights[slot];
                    }
                }
            }
            Encoder::Year { reference_year } => {
                encode_year(album.known_year(), *reference_year, block);
            }
            Encoder::Text(model) => {
                let weights = model.transform(&album.text().to_lowercase());
                block.copy_from_slice(&weights);
            }
            Encoder::Format => encode_formats(&album.formats, block),
        }
    }
}

fn encode_year(year: Option<i32>, reference_year: i32, block: &mut [f32]) {
    let Some(year) = year else {
        return;
    };

    let decade = (year / 10) * 10;
    if let Some(i) = DECADES.iter().position(|&d| d == decade) {
        block[i] = 1.0;
    }

    block[DECADES.len() + era_index(year)] = 1.0;

    let age = (reference_year - year) as f32;
    block[YEAR_WIDTH - 1] = (1.0 - age / RECENCY_SPAN).max(0.0);
}

fn encode_formats(formats: &[String], block: &mut [f32]) {
    let lowered: Vec<String> = formats.iter().map(|f| f.to_lowercase()).collect();
    let flag = |hit: bool| if hit { 1.0 } else { 0.0 };

    block[0] = flag(lowered.iter().any(|f| f.contains("vinyl")));
    block[1] = flag(lowered.iter().any(|f| f.contains("cd")));
    block[2] = flag(
        lowered
            .iter()
            .any(|f| matches!(f.as_str(), "digital" | "file" | "mp3")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(encoder: &Encoder, album: &Album) -> Vec<f32> {
        let mut out = Vec::new();
        encoder.encode(album, &mut out);
        assert_eq!(out.len(), encoder.width());
        out
    }

    fn year_block(year: Option<i32>, reference_year: i32) -> Vec<f32> {
        let mut album = Album::new(1, "t", "a");
        album.year = year;
        encode(&Encoder::Year { reference_year }, &album)
    }

    #[test]
    fn test_multi_hot_collapses_duplicates_and_drops_unknown() {
        let encoder = Encoder::multi_hot(Axis::Genre, Vocabulary::from_terms(["Jazz", "Rock"]));
        let album = Album::new(1, "t", "a").with_genres(["Rock", "Rock", "Polka"]);
        assert_eq!(encode(&encoder, &album), vec![0.0, 1.0]);

        let unknown = Album::new(2, "t", "a").with_genres(["Polka"]);
        assert_eq!(encode(&encoder, &unknown), vec![0.0, 0.0]);
    }

    #[test]
    fn test_artist_weight_boundaries() {
        let vocab = Vocabulary::from_terms(["one", "three", "ten"]);
        let encoder = Encoder::weighted(Axis::Artist, vocab, ARTIST_SATURATION, |a| match a {
            "one" => 1,
            "three" => 3,
            _ => 10,
        });

        let one = encode(&encoder, &Album::new(1, "t", "one"));
        assert!((one[0] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(encode(&encoder, &Album::new(1, "t", "three"))[2], 1.0);
        assert_eq!(encode(&encoder, &Album::new(1, "t", "ten"))[1], 1.0);
        assert_eq!(encode(&encoder, &Album::new(1, "t", "nobody")), vec![0.0; 3]);
    }

    #[test]
    fn test_label_weights_independent_slots() {
        let vocab = Vocabulary::from_terms(["Blue Note", "Impulse!"]);
        let encoder = Encoder::weighted(Axis::Label, vocab, LABEL_SATURATION, |l| {
            if l == "Blue Note" {
                2
            } else {
                7
            }
        });
        let album = Album::new(1, "t", "a").with_labels(["Impulse!", "Blue Note", "Unknown"]);
        assert_eq!(encode(&encoder, &album), vec![0.4, 1.0]);
    }

    #[test]
    fn test_year_absent_or_implausible() {
        assert_eq!(year_block(None, 2024), vec![0.0; YEAR_WIDTH]);
        assert_eq!(year_block(Some(1900), 2024), vec![0.0; YEAR_WIDTH]);
    }

    #[test]
    fn test_year_decade_era_recency() {
        let block = year_block(Some(1975), 2024);
        assert_eq!(&block[..7], &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(&block[7..10], &[1.0, 0.0, 0.0]);
        assert!((block[10] - 0.02).abs() < 1e-6);

        let block = year_block(Some(2024), 2024);
        assert_eq!(block[6], 1.0);
        assert_eq!(&block[7..10], &[0.0, 0.0, 1.0]);
        assert_eq!(block[10], 1.0);

        let block = year_block(Some(1985), 2024);
        assert_eq!(&block[7..10], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_year_outside_decade_set() {
        let block = year_block(Some(1955), 2024);
        assert!(block[..7].iter().all(|&x| x == 0.0));
        assert_eq!(block[7], 1.0);
        assert_eq!(block[10], 0.0);
    }

    #[test]
    fn test_year_after_reference_exceeds_full_recency() {
        let block = year_block(Some(2030), 2024);
        assert!(block[..7].iter().all(|&x| x == 0.0));
        assert_eq!(&block[7..10], &[0.0, 0.0, 1.0]);
        assert!((block[10] - 1.12).abs() < 1e-6);
    }

    #[test]
    fn test_format_flags() {
        let album = Album::new(1, "t", "a").with_formats(["Vinyl", "CDr", "File"]);
        assert_eq!(encode(&Encoder::Format, &album), vec![1.0, 1.0, 1.0]);

        let album = Album::new(1, "t", "a").with_formats(["Digital Download"]);
        assert_eq!(encode(&Encoder::Format, &album), vec![0.0, 0.0, 0.0]);

        let album = Album::new(1, "t", "a").with_formats(["MP3"]);
        assert_eq!(encode(&Encoder::Format, &album), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_feature_names_match_widths() {
        let year = Encoder::Year { reference_year: 2024 };
        let names = year.feature_names();
        assert_eq!(names.len(), YEAR_WIDTH);
        assert_eq!(names[0], "decade_1960s");
        assert_eq!(names[10], "year_recency");

        let genre = Encoder::multi_hot(Axis::Genre, Vocabulary::from_terms(["Rock"]));
        assert_eq!(genre.feature_names(), vec!["genre_Rock"]);
        assert_eq!(Encoder::Format.feature_names().len(), FORMAT_WIDTH);
    }
}
