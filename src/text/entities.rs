//! Named-entity detection and scrubbing.
//!
//! Detection is a capability behind [`EntityRecognizer`] so a statistical
//! model can replace the bundled rules without touching the normalizer.
//! [`TitleCaseRecognizer`] finds runs of capitalized words, which is where
//! people, companies and places show up in complaint narratives once digits
//! and punctuation are gone.
//!
//! # Quick Start
//!
//! ```
//! use complaint_loss::text::entities::{EntityScrubber, TitleCaseRecognizer};
//!
//! let scrubber = EntityScrubber::new(Box::new(TitleCaseRecognizer::new()));
//! let text = "charged me twice John Smith never called back";
//! assert_eq!(scrubber.scrub(text), "charged me twice  never called back");
//! ```

use super::stopwords::StopWordsFilter;
use std::collections::HashSet;
use std::fmt;

/// Coarse entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    /// Person, organization or place
    Name,
    /// Month or weekday
    Temporal,
}

/// A detected entity: byte range into the scanned text plus its surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Exact text of the span
    pub text: String,
    /// Category
    pub label: EntityLabel,
}

/// Finds entity spans in text.
///
/// Implementations must be deterministic. Each normalizer worker receives
/// its own instance through [`EntityRecognizer::fork`], so internal caches
/// never cross threads.
pub trait EntityRecognizer: Send + Sync + fmt::Debug {
    /// Detect entities in `text`.
    fn entity_spans(&self, text: &str) -> Vec<EntitySpan>;

    /// A fresh instance with the same configuration.
    fn fork(&self) -> Box<dyn EntityRecognizer>;

    /// Identifier folded into the normalizer fingerprint; change it when the
    /// detection rules change.
    fn name(&self) -> &str;
}

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];

const WEEKDAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Lowercase words allowed inside a multi-word name ("Bank of America").
const CONNECTORS: &[&str] = &["of", "and", "de"];

/// Rule-based recognizer for title-case runs.
///
/// A run is a maximal sequence of title-case words, optionally joined by a
/// connector, that never crosses a sentence gap. Removed punctuation leaves
/// a whitespace gap wider than one character, and a word after such a gap
/// (or at the very start) opens a sentence. A lone word is not an entity
/// when it opens a sentence, when the same word also appears in lowercase
/// elsewhere in the text, or when it is a stop word ("The", "My"). All-caps
/// words are acronyms, not names.
#[derive(Debug, Clone)]
pub struct TitleCaseRecognizer {
    stopwords: StopWordsFilter,
}

impl TitleCaseRecognizer {
    /// Create a recognizer using the English stop word list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stopwords: StopWordsFilter::english(),
        }
    }

    /// First letter uppercase, more than one letter, not all caps.
    fn is_title_case(word: &str) -> bool {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let rest: Vec<char> = chars.collect();
        first.is_uppercase()
            && !rest.is_empty()
            && rest.iter().all(|c| c.is_alphabetic())
            && !rest.iter().all(|c| c.is_uppercase())
    }

    fn label_for(text: &str) -> EntityLabel {
        if MONTHS.contains(&text) || WEEKDAYS.contains(&text) {
            EntityLabel::Temporal
        } else {
            EntityLabel::Name
        }
    }

    /// Close the run `run` (indices into `words`) and push it if it qualifies.
    fn flush(&self, scan: &Scan<'_>, run: &mut Vec<usize>, spans: &mut Vec<EntitySpan>) {
        let words = &scan.words;
        let run_opens = run.first().is_some_and(|&i| scan.opens[i]);
        // Leading stop words ("The Bank") are not part of the name.
        while let Some(&first) = run.first() {
            if self.stopwords.is_stop_word(words[first].1) {
                run.remove(0);
            } else {
                break;
            }
        }
        // Trailing connectors are dropped.
        while let Some(&last) = run.last() {
            if CONNECTORS.contains(&words[last].1) {
                run.pop();
            } else {
                break;
            }
        }

        if let (Some(&first), Some(&last)) = (run.first(), run.last()) {
            let common_word = run.len() == 1
                && (run_opens || scan.lowercase.contains(words[first].1.to_lowercase().as_str()));
            if !common_word {
                let start = words[first].0;
                let end = words[last].0 + words[last].1.len();
                let text: String = run
                    .iter()
                    .map(|&i| words[i].1)
                    .collect::<Vec<_>>()
                    .join(" ");
                let label = Self::label_for(&text);
                spans.push(EntitySpan {
                    start,
                    end,
                    text,
                    label,
                });
            }
        }
        run.clear();
    }
}

impl Default for TitleCaseRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whitespace-separated words with their byte offsets.
fn words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..idx]));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

/// Words of one text plus the per-word facts the run rules need.
struct Scan<'a> {
    words: Vec<(usize, &'a str)>,
    /// `opens[i]`: word `i` starts the text or follows a sentence gap.
    opens: Vec<bool>,
    /// Words written entirely in lowercase somewhere in the text.
    lowercase: HashSet<&'a str>,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        let words = words_with_offsets(text);
        let opens = words
            .iter()
            .enumerate()
            .map(|(i, &(start, _))| match i.checked_sub(1).map(|p| words[p]) {
                None => true,
                Some((prev_start, prev)) => start - (prev_start + prev.len()) > 1,
            })
            .collect();
        let lowercase = words
            .iter()
            .map(|&(_, word)| word)
            .filter(|word| word.chars().all(char::is_lowercase))
            .collect();
        Self {
            words,
            opens,
            lowercase,
        }
    }
}

impl EntityRecognizer for TitleCaseRecognizer {
    fn entity_spans(&self, text: &str) -> Vec<EntitySpan> {
        let scan = Scan::new(text);
        let words = &scan.words;
        let mut spans = Vec::new();
        let mut run: Vec<usize> = Vec::new();

        for (i, (_, word)) in words.iter().enumerate() {
            if Self::is_title_case(word) {
                if scan.opens[i] {
                    self.flush(&scan, &mut run, &mut spans);
                }
                run.push(i);
            } else if !run.is_empty()
                && CONNECTORS.contains(word)
                && words.get(i + 1).is_some_and(|(_, next)| Self::is_title_case(next))
                && !scan.opens[i + 1]
            {
                run.push(i);
            } else {
                self.flush(&scan, &mut run, &mut spans);
            }
        }
        self.flush(&scan, &mut run, &mut spans);

        spans
    }

    fn fork(&self) -> Box<dyn EntityRecognizer> {
        Box::new(self.clone())
    }

    fn name(&self) -> &str {
        "title-case/2"
    }
}

/// Removes every occurrence of every detected entity from text.
///
/// Removal is by literal substring, longest entity first, so "John Smith"
/// goes before "John" and identical substrings elsewhere in the document
/// disappear too.
#[derive(Debug)]
pub struct EntityScrubber {
    recognizer: Box<dyn EntityRecognizer>,
}

impl EntityScrubber {
    /// Wrap a recognizer.
    #[must_use]
    pub fn new(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// The wrapped recognizer.
    #[must_use]
    pub fn recognizer(&self) -> &dyn EntityRecognizer {
        self.recognizer.as_ref()
    }

    /// Distinct entity texts in removal order.
    #[must_use]
    pub fn entities(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .recognizer
            .entity_spans(text)
            .into_iter()
            .map(|span| span.text)
            .filter(|t| !t.is_empty())
            .collect();
        found.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        found.dedup();
        found
    }

    /// Remove all entity occurrences from `text`.
    #[must_use]
    pub fn scrub(&self, text: &str) -> String {
        let mut out = text.to_string();
        for entity in self.entities(text) {
            if out.contains(&entity) {
                out = out.replace(&entity, "");
            }
        }
        out
    }
}

impl Clone for EntityScrubber {
    fn clone(&self) -> Self {
        Self {
            recognizer: self.recognizer.fork(),
        }
    }
}

impl Default for EntityScrubber {
    fn default() -> Self {
        Self::new(Box::new(TitleCaseRecognizer::new()))
    }
}
