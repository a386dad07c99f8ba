//! Stop words removed from complaint narratives.
//!
//! The list is the 179-word NLTK English set. It includes the bare
//! fragments left behind when contractions lose their apostrophe
//! ("don", "t", "ll", "ve", ...), which matters here because punctuation is
//! replaced by spaces before stop words are filtered.
//!
//! # Examples
//!
//! ```
//! use complaint_loss::text::stopwords::StopWordsFilter;
//!
//! let filter = StopWordsFilter::english();
//! let tokens = vec!["i", "was", "charged", "twice"];
//! assert_eq!(filter.filter(&tokens), vec!["charged", "twice"]);
//! ```

use std::collections::HashSet;

/// Stop words filter with O(1) case-insensitive lookup.
#[derive(Debug, Clone)]
pub struct StopWordsFilter {
    /// Stored lowercase
    stop_words: HashSet<String>,
}

impl StopWordsFilter {
    /// Create a filter from custom words (lowercased on insert).
    ///
    /// # Examples
    ///
    /// ```
    /// use complaint_loss::text::stopwords::StopWordsFilter;
    ///
    /// let filter = StopWordsFilter::new(vec!["bank", "account"]);
    /// assert!(filter.is_stop_word("Bank"));
    /// ```
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = words
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();

        Self { stop_words }
    }

    /// The NLTK English list.
    #[must_use]
    pub fn english() -> Self {
        Self::new(ENGLISH_STOP_WORDS)
    }

    /// Keep the tokens that are not stop words, preserving order and case.
    pub fn filter<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !self.is_stop_word(t))
            .map(ToString::to_string)
            .collect()
    }

    /// Check if a word is a stop word (case-insensitive).
    #[must_use]
    pub fn is_stop_word(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.stop_words.contains(&word.to_lowercase())
        } else {
            self.stop_words.contains(word)
        }
    }

    /// Number of stop words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// True when the filter removes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }

    /// The words in lexicographic order; stable across runs, used for
    /// fingerprinting the cleaning configuration.
    #[must_use]
    pub fn sorted_words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.stop_words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

impl Default for StopWordsFilter {
    fn default() -> Self {
        Self::english()
    }
}

/// NLTK English stop words (179 words).
pub const ENGLISH_STOP_WORDS: &[&str] = &build_stop_words();

/// Category-based stop word definitions. Each tuple: (category, words).
const STOP_WORD_CATEGORIES: &[(&str, &[&str])] = &[
    ("pronouns", &[
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves",
        "you", "you're", "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves",
        "he", "him", "his", "himself", "she", "she's", "her", "hers", "herself",
        "it", "it's", "its", "itself", "they", "them", "their", "theirs", "themselves",
    ]),
    ("determiners", &[
        "what", "which", "who", "whom", "this", "that", "that'll", "these", "those",
        "a", "an", "the",
    ]),
    ("auxiliaries", &[
        "am", "is", "are", "was", "were", "be", "been", "being",
        "have", "has", "had", "having", "do", "does", "did", "doing",
        "can", "will", "should", "should've",
    ]),
    ("conjunctions", &[
        "and", "but", "if", "or", "because", "as", "until", "while", "nor", "than", "so",
    ]),
    ("prepositions", &[
        "of", "at", "by", "for", "with", "about", "against", "between", "into", "through",
        "during", "before", "after", "above", "below", "to", "from", "up", "down",
        "in", "out", "on", "off", "over", "under",
    ]),
    ("adverbs", &[
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
        "no", "not", "only", "own", "same", "too", "very", "just", "now",
    ]),
    ("contraction_fragments", &[
        "s", "t", "don", "don't", "d", "ll", "m", "o", "re", "ve", "y", "ma",
        "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't",
        "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't",
        "isn", "isn't", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't",
        "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't",
        "won", "won't", "wouldn", "wouldn't",
    ]),
];

/// Total number of stop words across all categories.
const TOTAL_STOP_WORDS: usize = count_total_stop_words();

/// Count total stop words at compile time.
const fn count_total_stop_words() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < STOP_WORD_CATEGORIES.len() {
        total += STOP_WORD_CATEGORIES[i].1.len();
        i += 1;
    }
    total
}

/// Flatten all category words into a single array at compile time.
const fn build_stop_words() -> [&'static str; TOTAL_STOP_WORDS] {
    let mut result = [""; TOTAL_STOP_WORDS];
    let mut idx = 0;
    let mut cat = 0;
    while cat < STOP_WORD_CATEGORIES.len() {
        let words = STOP_WORD_CATEGORIES[cat].1;
        let mut w = 0;
        while w < words.len() {
            result[idx] = words[w];
            idx += 1;
            w += 1;
        }
        cat += 1;
    }
    result
}

#[cfg(test)]
#[path = "stopwords_tests.rs"]
mod tests;
