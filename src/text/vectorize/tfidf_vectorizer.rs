use crate::error::{ComplaintError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse fixed-dimension feature vector.
///
/// `indices` are strictly increasing and all `< dim`; `values[i]` belongs
/// to column `indices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector of dimension `dim`.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(column, value)` pairs. Pairs are sorted by column;
    /// duplicate columns are summed and exact zeros dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is out of range.
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Result<Self> {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (col, value) in pairs {
            if col >= dim {
                return Err(ComplaintError::dimension_mismatch("column < dim", dim, col));
            }
            *merged.entry(col).or_insert(0.0) += value;
        }
        let (indices, values) = merged.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Ok(Self {
            dim,
            indices,
            values,
        })
    }

    /// Declared dimension (vocabulary size).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored non-zero entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// True when every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Column indices of the non-zero entries.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Values of the non-zero entries.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Component at `col` (zero when absent or out of range).
    #[must_use]
    pub fn get(&self, col: usize) -> f64 {
        self.indices
            .binary_search(&col)
            .map_or(0.0, |pos| self.values[pos])
    }

    /// Dot product with a dense weight vector. Columns past the end of
    /// `weights` contribute nothing.
    #[must_use]
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter()
            .map(|(col, value)| weights.get(col).map_or(0.0, |w| w * value))
            .sum()
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dense copy.
    #[must_use]
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (col, value) in self.iter() {
            dense[col] = value;
        }
        dense
    }
}

/// Split text into tokens of two or more word characters.
fn analyze(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .collect()
}

/// Every n-gram of `tokens` for n in `range`, joined by single spaces.
fn ngrams(tokens: &[&str], (min_n, max_n): (usize, usize)) -> Vec<String> {
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// TF-IDF fit settings.
///
/// **Weighting:**
/// ```text
/// tfidf(t, d) = tf(t, d) × idf(t)
/// tf(t, d)    = count of n-gram t in document d
/// idf(t)      = ln((1 + N) / (1 + df(t))) + 1
/// ```
/// Each document row is then scaled to unit L2 norm. Text is not
/// lowercased; single-character tokens are not features.
///
/// # Examples
///
/// ```
/// use complaint_loss::text::vectorize::TfidfVectorizer;
///
/// let docs = vec!["late fee charge", "late fee refund", "card close"];
/// let model = TfidfVectorizer::new()
///     .with_ngram_range(1, 2)
///     .with_min_df(1)
///     .with_max_df(1.0)
///     .fit(&docs)
///     .expect("fit should succeed");
///
/// assert!(model.vocabulary().contains_key("late fee"));
/// let row = model.transform("late fee charge");
/// assert!((row.norm() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    min_df: usize,
    max_df: f64,
}

impl TfidfVectorizer {
    /// Defaults: unigrams to trigrams, `min_df = 10`, `max_df = 0.3`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ngram_range: (1, 3),
            min_df: 10,
            max_df: 0.3,
        }
    }

    /// Set the n-gram range (inclusive).
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    /// Terms appearing in fewer than `min_df` documents are ignored.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Terms appearing in more than `max_df × N` documents are ignored.
    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    /// N-gram range.
    #[must_use]
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Minimum document count.
    #[must_use]
    pub fn min_df(&self) -> usize {
        self.min_df
    }

    /// Maximum document fraction.
    #[must_use]
    pub fn max_df(&self) -> f64 {
        self.max_df
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for an empty or zero n-gram range,
    /// `min_df == 0`, or `max_df` outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ComplaintError::invalid_hyperparameter(
                "ngram_range",
                format!("({min_n}, {max_n})"),
                "1 <= min_n <= max_n",
            ));
        }
        if self.min_df == 0 {
            return Err(ComplaintError::invalid_hyperparameter("min_df", 0, ">= 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ComplaintError::invalid_hyperparameter(
                "max_df",
                self.max_df,
                "0 < max_df <= 1",
            ));
        }
        Ok(())
    }

    /// Learn the vocabulary and IDF weights.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings, an empty corpus, or when no
    /// term falls within the document-frequency bounds.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<TfidfModel> {
        self.validate()?;
        if documents.is_empty() {
            return Err(ComplaintError::empty_input("cannot fit TF-IDF on zero documents"));
        }

        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let tokens = analyze(doc.as_ref());
            let unique: HashSet<String> = ngrams(&tokens, self.ngram_range).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let max_doc_count = self.max_df * n_docs as f64;
        #[allow(clippy::cast_precision_loss)]
        let too_strict = max_doc_count < self.min_df as f64;
        if too_strict {
            return Err(ComplaintError::invalid_hyperparameter(
                "max_df",
                self.max_df,
                &format!("max_df × {n_docs} documents >= min_df ({})", self.min_df),
            ));
        }

        #[allow(clippy::cast_precision_loss)]
        let kept: BTreeMap<String, usize> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && (*df as f64) <= max_doc_count)
            .collect();

        if kept.is_empty() {
            return Err(ComplaintError::EmptyVocabulary {
                min_df: self.min_df,
                max_df: self.max_df,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = n_docs as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        tracing::info!(
            documents = n_docs,
            vocabulary = vocabulary.len(),
            min_df = self.min_df,
            max_df = self.max_df,
            "fitted TF-IDF vocabulary"
        );

        Ok(TfidfModel {
            ngram_range: self.ngram_range,
            vocabulary,
            idf,
        })
    }

    /// Fit, then project the same documents.
    ///
    /// # Errors
    ///
    /// See [`TfidfVectorizer::fit`].
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<(TfidfModel, Vec<FeatureVector>)> {
        let model = self.fit(documents)?;
        let rows = model.transform_many(documents);
        Ok((model, rows))
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen vocabulary and IDF weights.
///
/// Column indices follow the lexicographic order of terms, so two fits of
/// the same corpus produce byte-identical models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
    ngram_range: (usize, usize),
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfModel {
    /// Term to column index.
    #[must_use]
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Number of columns.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight per column.
    #[must_use]
    pub fn idf_values(&self) -> &[f64] {
        &self.idf
    }

    /// N-gram range used at fit time.
    #[must_use]
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Project one document. Unseen terms contribute nothing; a document
    /// with no known term yields the all-zero vector.
    #[must_use]
    pub fn transform(&self, document: &str) -> FeatureVector {
        let tokens = analyze(document);
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in ngrams(&tokens, self.ngram_range) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let (indices, mut values): (Vec<usize>, Vec<f64>) = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .unzip();

        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut values {
                *value /= norm;
            }
        }

        FeatureVector {
            dim: self.vocabulary.len(),
            indices,
            values,
        }
    }

    /// Project many documents, preserving order.
    #[must_use]
    pub fn transform_many<S: AsRef<str>>(&self, documents: &[S]) -> Vec<FeatureVector> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Check the internal shape after deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the IDF table and vocabulary disagree, or an
    /// index is out of range or repeated.
    pub fn validate(&self) -> Result<()> {
        let dim = self.vocabulary.len();
        if self.idf.len() != dim {
            return Err(ComplaintError::dimension_mismatch("vocabulary", dim, self.idf.len()));
        }
        let mut seen = vec![false; dim];
        for &col in self.vocabulary.values() {
            if col >= dim || seen[col] {
                return Err(ComplaintError::FormatError {
                    message: format!("vocabulary column {col} out of range or repeated"),
                });
            }
            seen[col] = true;
        }
        Ok(())
    }
}
