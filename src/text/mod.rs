//! Text processing for complaint narratives.
//!
//! - [`normalize`]: the cleaning pipeline applied to every narrative
//! - [`entities`]: named-entity detection and scrubbing
//! - [`lemmatize`]: verb lemmatization
//! - [`stopwords`]: the English stop word list
//! - [`tokenize`]: word tokenization
//! - [`vectorize`]: n-gram TF-IDF features

pub mod entities;
pub mod lemmatize;
pub mod normalize;
pub mod stopwords;
pub mod tokenize;
pub mod vectorize;

/// Splits text into tokens.
///
/// Tokenization of already-cleaned text cannot fail.
pub trait Tokenizer {
    /// Tokenize `text` into owned tokens, in order.
    fn tokenize(&self, text: &str) -> Vec<String>;
}
