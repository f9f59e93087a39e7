// TF-IDF text model over album titles and notes
use crate::stopwords::is_stop_word;
use crate::vocabulary::Vocabulary;
use ahash::AHashMap;

/// Bounded unigram + bigram TF-IDF model
///
/// Weights are raw term counts times a smoothed idf,
/// `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    stop_words: bool,
}

/// Fit-time limits for [`TfidfVectorizer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfidfParams {
    pub max_features: usize,
    pub min_df: u32,
    pub max_df: f64,
    pub stop_words: bool,
}

impl TfidfVectorizer {
    /// Split text into lower-cased tokens of at least two word characters
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|s| s.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }

    /// Unigrams followed by bigrams of adjacent surviving tokens
    fn analyze(&self, text: &str) -> Vec<String> {
        Self::analyze_with(text, self.stop_words)
    }

    fn analyze_with(text: &str, stop_words: bool) -> Vec<String> {
        let tokens: Vec<String> = Self::tokenize(text)
            .into_iter()
            .filter(|t| !stop_words || !is_stop_word(t))
            .collect();

        let mut terms = Vec::with_capacity(tokens.len() * 2);
        terms.extend(tokens.iter().cloned());
        terms.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
        terms
    }

    /// Fit on a corpus; an empty corpus or one pruned to nothing gives width 0
    pub fn fit<S: AsRef<str>>(corpus: &[S], params: TfidfParams) -> Self {
        let n_docs = corpus.len();
        let mut doc_freq: AHashMap<String, u32> = AHashMap::new();
        let mut term_count: AHashMap<String, u64> = AHashMap::new();

        for doc in corpus {
            let mut seen: AHashMap<String, ()> = AHashMap::new();
            for term in Self::analyze_with(doc.as_ref(), params.stop_words) {
                *term_count.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone(), ()).is_none() {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = params.max_df * n_docs as f64;
        let mut kept: Vec<(&str, u64)> = doc_freq
            .iter()
            .filter(|&(_, &df)| df >= params.min_df && f64::from(df) <= max_doc_count)
            .map(|(term, _)| (term.as_str(), term_count[term.as_str()]))
            .collect();

        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(params.max_features);

        let vocabulary = Vocabulary::from_terms(kept.into_iter().map(|(t, _)| t));
        let n = n_docs as f64;
        let idf = vocabulary
            .terms()
            .iter()
            .map(|term| {
                let df = f64::from(doc_freq[term.as_str()]);
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        tracing::debug!(
            "Text model fitted on {} documents, {} terms kept out of {}",
            n_docs,
            vocabulary.len(),
            doc_freq.len()
        );

        Self {
            vocabulary,
            idf,
            stop_words: params.stop_words,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Terms in slot order
    pub fn terms(&self) -> &[String] {
        self.vocabulary.terms()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Weighted-term vector for one document
    pub fn transform(&self, document: &str) -> Vec<f32> {
        let mut counts = vec![0.0f64; self.width()];
        for term in self.analyze(document) {
            if let Some(slot) = self.vocabulary.slot(&term) {
                counts[slot] += 1.0;
            }
        }

        for (value, idf) in counts.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = counts.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut counts {
                *value /= norm;
            }
        }

        counts.into_iter().map(|v| v as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_features: usize, min_df: u32, max_df: f64) -> TfidfParams {
        TfidfParams {
            max_features,
            min_df,
            max_df,
            stop_words: true,
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            TfidfVectorizer::tokenize("Live at the Village Vanguard, Vol. 2 (1961)"),
            vec!["live", "at", "the", "village", "vanguard", "vol", "1961"]
        );
    }

    #[test]
    fn test_stop_words_removed_before_bigrams() {
        let terms = TfidfVectorizer::analyze_with("live at the vanguard", true);
        assert_eq!(terms, vec!["live", "vanguard", "live vanguard"]);

        let terms = TfidfVectorizer::analyze_with("the vanguard", false);
        assert_eq!(terms, vec!["the", "vanguard", "the vanguard"]);
    }

    #[test]
    fn test_empty_corpus() {
        let model = TfidfVectorizer::fit::<&str>(&[], params(100, 1, 0.8));
        assert_eq!(model.width(), 0);
        assert!(model.transform("anything").is_empty());
    }

    #[test]
    fn test_ubiquitous_terms_pruned() {
        let corpus = ["blue train", "blue note", "blue monk"];
        let model = TfidfVectorizer::fit(&corpus, params(100, 1, 0.8));
        assert!(!model.terms().contains(&"blue".to_string()));
        assert!(model.terms().contains(&"train".to_string()));
        assert!(model.terms().contains(&"blue monk".to_string()));
    }

    #[test]
    fn test_min_df_and_max_features() {
        let corpus = ["kind blue", "kind love", "giant steps", "love supreme"];
        let model = TfidfVectorizer::fit(&corpus, params(100, 2, 1.0));
        assert_eq!(model.terms(), &["kind", "love"]);

        let model = TfidfVectorizer::fit(&corpus, params(1, 2, 1.0));
        assert_eq!(model.terms(), &["kind"]);
    }

    #[test]
    fn test_transform_is_unit_norm_and_deterministic() {
        let corpus = ["kind of blue", "a love supreme", "giant steps", "blue train"];
        let model = TfidfVectorizer::fit(&corpus, params(100, 1, 1.0));

        let v1 = model.transform("blue train blue");
        let v2 = model.transform("blue train blue");
        assert_eq!(v1, v2);
        assert_eq!(v1.len(), model.width());

        let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        assert!(model.transform("unrelated words").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_idf_smoothing() {
        let corpus = ["alpha beta", "alpha"];
        let model = TfidfVectorizer::fit(&corpus, params(100, 1, 1.0));
        let alpha = model.terms().iter().position(|t| t == "alpha").unwrap();
        let beta = model.terms().iter().position(|t| t == "beta").unwrap();
        assert!((model.idf()[alpha] - 1.0).abs() < 1e-12);
        assert!((model.idf()[beta] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }
}
