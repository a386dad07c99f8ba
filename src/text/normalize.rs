//! Narrative cleaning: raw complaint text to a lemmatized token string.
//!
//! Steps, in order:
//!
//! 1. Every character that is neither a word character nor whitespace
//!    becomes a space.
//! 2. Everything that is not a letter or a plain space is dropped
//!    (digits, underscores, tabs and newlines).
//! 3. Redaction runs (two or more of `X x Y y Z z`) are removed.
//! 4. Named entities are scrubbed.
//! 5. Text is lowercased, stop words dropped, words joined by one space.
//! 6. The result is tokenized.
//! 7. Each token is replaced by its verb lemma.
//! 8. Tokens are joined by one space.
//!
//! # Examples
//!
//! ```
//! use complaint_loss::text::normalize::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new().expect("normalizer starts");
//! let cleaned = normalizer.normalize("XXXX charged me twice, John Smith never called back.");
//! assert_eq!(cleaned, "charge twice never call back");
//! ```

use super::entities::{EntityRecognizer, EntityScrubber, TitleCaseRecognizer};
use super::lemmatize::{Lemmatizer, VerbLemmatizer};
use super::stopwords::StopWordsFilter;
use super::tokenize::WordTokenizer;
use super::Tokenizer;
use crate::error::Result;
use crate::parallel::WorkerPool;
use crate::serialization::crc32;
use regex::Regex;
use std::sync::Arc;

/// Revision of the cleaning rules. Bump it whenever a step changes output,
/// so artifacts fitted with the old rules refuse to load.
pub const NORMALIZER_REVISION: &str = "complaint-normalizer/1";

/// Non-word, non-space characters.
const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// Redaction placeholders such as `XXXX` or `XX/XX/XXXX` remnants.
const REDACTION_PATTERN: &str = r"[XxYyZz]{2,}";

/// Deterministic narrative cleaner with an ordered parallel batch mode.
///
/// Cloning forks the entity recognizer and the lemmatizer; the worker pool
/// is shared.
#[derive(Debug)]
pub struct TextNormalizer {
    punctuation: Regex,
    redaction: Regex,
    stopwords: StopWordsFilter,
    scrubber: EntityScrubber,
    tokenizer: WordTokenizer,
    lemmatizer: Box<dyn Lemmatizer>,
    pool: Arc<WorkerPool>,
}

impl TextNormalizer {
    /// Normalizer with the bundled recognizer and lemmatizer and one worker
    /// per CPU.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot start.
    pub fn new() -> Result<Self> {
        Self::with_workers(None)
    }

    /// Normalizer with a fixed batch worker count (`None` = CPU count).
    ///
    /// # Errors
    ///
    /// Returns an error for `Some(0)` or if the worker pool cannot start.
    pub fn with_workers(workers: Option<usize>) -> Result<Self> {
        let pool = Arc::new(WorkerPool::new(workers)?);
        Ok(Self {
            punctuation: Regex::new(PUNCTUATION_PATTERN)?,
            redaction: Regex::new(REDACTION_PATTERN)?,
            stopwords: StopWordsFilter::english(),
            scrubber: EntityScrubber::new(Box::new(TitleCaseRecognizer::new())),
            tokenizer: WordTokenizer::new(),
            lemmatizer: Box::new(VerbLemmatizer::new()),
            pool,
        })
    }

    /// Replace the entity recognizer.
    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.scrubber = EntityScrubber::new(recognizer);
        self
    }

    /// Replace the lemmatizer.
    #[must_use]
    pub fn with_lemmatizer(mut self, lemmatizer: Box<dyn Lemmatizer>) -> Self {
        self.lemmatizer = lemmatizer;
        self
    }

    /// Share an existing worker pool.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Batch worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Clean one narrative. Never fails; empty output is valid.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let spaced = self.punctuation.replace_all(text, " ");
        let letters: String = spaced
            .chars()
            .filter(|c| c.is_alphabetic() || *c == ' ')
            .collect();
        let unredacted = self.redaction.replace_all(&letters, "");
        let scrubbed = self.scrubber.scrub(&unredacted);

        let lowered = scrubbed.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let kept = self.stopwords.filter(&words).join(" ");

        let tokens = self.tokenizer.tokenize(&kept);
        tokens
            .iter()
            .map(|token| self.lemmatizer.lemmatize(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean many narratives on the worker pool; output order matches input.
    #[must_use]
    pub fn normalize_many<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        tracing::debug!(documents = texts.len(), workers = self.workers(), "normalizing batch");
        self.pool
            .ordered_map(texts, || self.clone(), |worker, text| worker.normalize(text.as_ref()))
    }

    /// Identity of the cleaning logic: rule revision, recognizer,
    /// lemmatizer and stop word set. Artifacts store it and refuse to load
    /// under a normalizer that disagrees.
    #[must_use]
    pub fn fingerprint(&self) -> u32 {
        let mut identity = String::new();
        identity.push_str(NORMALIZER_REVISION);
        identity.push('\n');
        identity.push_str(self.scrubber.recognizer().name());
        identity.push('\n');
        identity.push_str(self.lemmatizer.name());
        for word in self.stopwords.sorted_words() {
            identity.push('\n');
            identity.push_str(word);
        }
        crc32(identity.as_bytes())
    }
}

impl Clone for TextNormalizer {
    fn clone(&self) -> Self {
        Self {
            punctuation: self.punctuation.clone(),
            redaction: self.redaction.clone(),
            stopwords: self.stopwords.clone(),
            scrubber: self.scrubber.clone(),
            tokenizer: self.tokenizer,
            lemmatizer: self.lemmatizer.fork(),
            pool: Arc::clone(&self.pool),
        }
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
