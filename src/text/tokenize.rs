//! Word tokenization of cleaned narratives.
//!
//! By the time text reaches the tokenizer it holds only lowercase letters and
//! single spaces, so word tokenization reduces to splitting on whitespace
//! while separating any stray punctuation into its own token.

use super::Tokenizer;

/// Word tokenizer that splits on whitespace and separates punctuation.
///
/// Apostrophes stay inside words so contractions remain one token.
///
/// # Examples
///
/// ```
/// use complaint_loss::text::{Tokenizer, tokenize::WordTokenizer};
///
/// let tokenizer = WordTokenizer::new();
/// assert_eq!(tokenizer.tokenize("charge twice"), vec!["charge", "twice"]);
/// assert_eq!(tokenizer.tokenize("fee, again!"), vec!["fee", ",", "again", "!"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a new word tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Separators are ASCII punctuation other than the apostrophe.
    fn is_separator(c: char) -> bool {
        c.is_ascii_punctuation() && c != '\''
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();

        for ch in text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            } else if Self::is_separator(ch) {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            } else {
                current.push(ch);
            }
        }

        if !current.is_empty() {
            tokens.push(current);
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_runs() {
        let tokens = WordTokenizer::new().tokenize("  late   fee\tcharge\n");
        assert_eq!(tokens, vec!["late", "fee", "charge"]);
    }

    #[test]
    fn test_contractions_kept() {
        let tokens = WordTokenizer::new().tokenize("don't pay");
        assert_eq!(tokens, vec!["don't", "pay"]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert!(WordTokenizer::new().tokenize("").is_empty());
        assert!(WordTokenizer::new().tokenize("   ").is_empty());
    }
}
