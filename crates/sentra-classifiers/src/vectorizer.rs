//! Term-frequency / inverse-document-frequency feature extraction

use crate::model_config::{NormKind, VectorizerConfig};
use regex::Regex;
use sentra_core::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Non-zero entries of one feature row
pub type SparseRow = Vec<(usize, f32)>;

/// Fitted vectorizer mapping text to a sparse feature row
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f32>>,
    lowercase: bool,
    token_regex: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: NormKind,
}

impl TfidfVectorizer {
    /// Build a vectorizer, checking the fitted state is consistent
    pub fn from_config(config: VectorizerConfig) -> Result<Self> {
        let num_features = config.vocabulary.len();
        if num_features == 0 {
            return Err(Error::artifact_load("Vectorizer vocabulary is empty"));
        }

        let mut seen = vec![false; num_features];
        for (term, &column) in &config.vocabulary {
            if column >= num_features {
                return Err(Error::artifact_load(format!(
                    "Vocabulary term '{}' maps to column {} but there are only {} features",
                    term, column, num_features
                )));
            }
            if std::mem::replace(&mut seen[column], true) {
                return Err(Error::artifact_load(format!(
                    "Vocabulary column {} is assigned to more than one term",
                    column
                )));
            }
        }

        if let Some(idf) = &config.idf {
            if idf.len() != num_features {
                return Err(Error::artifact_load(format!(
                    "idf has {} entries but vocabulary has {} terms",
                    idf.len(),
                    num_features
                )));
            }
        }

        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::artifact_load(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_regex = Regex::new(&config.token_pattern).map_err(|e| {
            Error::artifact_load(format!(
                "Invalid token_pattern '{}': {}",
                config.token_pattern, e
            ))
        })?;

        Ok(Self {
            vocabulary: config.vocabulary,
            idf: config.idf,
            lowercase: config.lowercase,
            token_regex,
            ngram_range: config.ngram_range,
            stop_words: config.stop_words.into_iter().collect(),
            binary: config.binary,
            sublinear_tf: config.sublinear_tf,
            norm: config.norm,
        })
    }

    /// Width of a feature row
    pub fn num_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Split text into the terms the vocabulary is keyed on
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = if self.token_regex.captures_len() > 1 {
            self.token_regex
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_regex.find_iter(&text).map(|m| m.as_str()).collect()
        };

        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Non-zero features of `text` as `(column, value)`, sorted by column
    pub fn transform_row(&self, text: &str) -> SparseRow {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts.into_iter().collect();
        row.sort_unstable_by_key(|(column, _)| *column);

        for (column, value) in row.iter_mut() {
            if self.binary {
                *value = 1.0;
            }
            if self.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            if let Some(idf) = &self.idf {
                *value *= idf[*column];
            }
        }

        let scale = match self.norm {
            NormKind::L2 => row.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            NormKind::L1 => row.iter().map(|(_, v)| v.abs()).sum::<f32>(),
            NormKind::None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            row.iter_mut().for_each(|(_, v)| *v /= scale);
        }
        row
    }

    /// One sparse row per text; memory follows the terms present, not the vocabulary width
    pub fn transform(&self, texts: &[String]) -> Vec<SparseRow> {
        texts.iter().map(|text| self.transform_row(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(terms: &[&str]) -> VectorizerConfig {
        VectorizerConfig {
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i))
                .collect(),
            idf: None,
            lowercase: true,
            token_pattern: r"\b\w\w+\b".to_string(),
            ngram_range: (1, 1),
            stop_words: Vec::new(),
            binary: false,
            sublinear_tf: false,
            norm: NormKind::None,
        }
    }

    #[test]
    fn test_analyze_lowercases_and_drops_short_tokens() {
        let vectorizer = TfidfVectorizer::from_config(config(&["love"])).unwrap();
        assert_eq!(vectorizer.analyze("I LOVE this!"), vec!["love", "this"]);
    }

    #[test]
    fn test_analyze_ngrams_and_stop_words() {
        let mut cfg = config(&["not"]);
        cfg.ngram_range = (1, 2);
        cfg.stop_words = vec!["the".to_string()];
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();

        assert_eq!(
            vectorizer.analyze("not the good"),
            vec!["not", "good", "not good"]
        );
    }

    #[test]
    fn test_analyze_short_text_skips_long_ngrams() {
        let mut cfg = config(&["ok"]);
        cfg.ngram_range = (2, 3);
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();

        assert!(vectorizer.analyze("ok").is_empty());
        assert!(vectorizer.analyze("").is_empty());
    }

    #[test]
    fn test_counts_binary_and_sublinear() {
        let vectorizer = TfidfVectorizer::from_config(config(&["good", "bad"])).unwrap();
        assert_eq!(
            vectorizer.transform_row("good good bad"),
            vec![(0, 2.0), (1, 1.0)]
        );

        let mut cfg = config(&["good", "bad"]);
        cfg.binary = true;
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();
        assert_eq!(
            vectorizer.transform_row("good good bad"),
            vec![(0, 1.0), (1, 1.0)]
        );

        let mut cfg = config(&["good", "bad"]);
        cfg.sublinear_tf = true;
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();
        let row = vectorizer.transform_row("good good bad");
        assert!((row[0].1 - (1.0 + 2f32.ln())).abs() < 1e-6);
        assert!((row[1].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_idf_and_l2_norm() {
        let mut cfg = config(&["good", "bad"]);
        cfg.idf = Some(vec![3.0, 4.0]);
        cfg.norm = NormKind::L2;
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();

        let row = vectorizer.transform_row("good bad");
        assert_eq!(row[0].0, 0);
        assert!((row[0].1 - 0.6).abs() < 1e-6);
        assert!((row[1].1 - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l1_norm_and_empty_row() {
        let mut cfg = config(&["good", "bad"]);
        cfg.norm = NormKind::L1;
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();

        assert_eq!(
            vectorizer.transform(&["good good bad".to_string(), "".to_string()]),
            vec![vec![(0, 2.0 / 3.0), (1, 1.0 / 3.0)], vec![]]
        );
    }

    #[test]
    fn test_rows_only_hold_present_terms() {
        let terms: Vec<String> = (0..200_000).map(|i| format!("t{}", i)).collect();
        let refs: Vec<&str> = terms.iter().map(|t| t.as_str()).collect();
        let vectorizer = TfidfVectorizer::from_config(config(&refs)).unwrap();

        let row = vectorizer.transform_row("t199999 t7 t7 unknown");
        assert_eq!(row, vec![(7, 2.0), (199_999, 1.0)]);
    }

    #[test]
    fn test_capture_group_pattern() {
        let mut cfg = config(&["good"]);
        cfg.token_pattern = r"#(\w+)".to_string();
        let vectorizer = TfidfVectorizer::from_config(cfg).unwrap();
        assert_eq!(vectorizer.analyze("so #good today"), vec!["good"]);
    }

    #[test]
    fn test_rejects_inconsistent_state() {
        let mut cfg = config(&["good", "bad"]);
        cfg.idf = Some(vec![1.0]);
        assert!(matches!(
            TfidfVectorizer::from_config(cfg),
            Err(Error::ArtifactLoad(_))
        ));

        let mut cfg = config(&["good"]);
        cfg.vocabulary.insert("bad".to_string(), 5);
        assert!(TfidfVectorizer::from_config(cfg).is_err());

        let mut cfg = config(&["good"]);
        cfg.vocabulary.insert("bad".to_string(), 0);
        assert!(TfidfVectorizer::from_config(cfg).is_err());

        let mut cfg = config(&["good"]);
        cfg.ngram_range = (2, 1);
        assert!(TfidfVectorizer::from_config(cfg).is_err());

        let mut cfg = config(&["good"]);
        cfg.token_pattern = "(".to_string();
        assert!(TfidfVectorizer::from_config(cfg).is_err());

        assert!(TfidfVectorizer::from_config(config(&[])).is_err());
    }
}
