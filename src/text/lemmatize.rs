//! Verb lemmatization for cleaned narrative tokens.
//!
//! Every token is reduced to its verb-sense lemma: "charged" and "charging"
//! become "charge", "paid" becomes "pay". Tokens that are not inflected
//! verbs come back unchanged, apart from a trailing plural "s".
//!
//! # Examples
//!
//! ```
//! use complaint_loss::text::lemmatize::{Lemmatizer, VerbLemmatizer};
//!
//! let lemmatizer = VerbLemmatizer::new();
//! assert_eq!(lemmatizer.lemmatize("charged"), "charge");
//! assert_eq!(lemmatizer.lemmatize("paid"), "pay");
//! assert_eq!(lemmatizer.lemmatize("called"), "call");
//! ```
//!
//! # References
//!
//! Suffix handling follows the step 1 rules of Porter, M.F. (1980),
//! "An algorithm for suffix stripping", with silent-e restoration extended
//! for common English verb endings.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Reduces a token to its lemma.
///
/// Implementations must be deterministic and idempotent:
/// `lemmatize(lemmatize(w)) == lemmatize(w)`.
pub trait Lemmatizer: Send + Sync + fmt::Debug {
    /// Lemmatize a single lowercase token.
    fn lemmatize(&self, word: &str) -> String;

    /// Lemmatize multiple tokens, preserving order.
    fn lemmatize_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String>
    where
        Self: Sized,
    {
        tokens
            .iter()
            .map(|token| self.lemmatize(token.as_ref()))
            .collect()
    }

    /// A fresh instance with the same configuration, for a worker thread.
    fn fork(&self) -> Box<dyn Lemmatizer>;

    /// Identifier folded into the normalizer fingerprint.
    fn name(&self) -> &str;
}

/// Irregular inflections mapped to their base verb.
///
/// Entries whose inflection is an English stop word ("was", "did") are
/// absent: stop words never reach the lemmatizer.
const IRREGULAR_VERBS: &[(&str, &[&str])] = &[
    ("age", &["aged"]),
    ("agree", &["agreed"]),
    ("arise", &["arose", "arisen"]),
    ("bear", &["bore", "borne"]),
    ("become", &["became", "becoming"]),
    ("begin", &["began", "begun"]),
    ("bend", &["bent"]),
    ("bleed", &["bled"]),
    ("blow", &["blew", "blown"]),
    ("break", &["broke", "broken"]),
    ("breed", &["bred"]),
    ("bring", &["brought"]),
    ("build", &["built"]),
    ("buy", &["bought"]),
    ("catch", &["caught"]),
    ("choose", &["chose", "chosen"]),
    ("come", &["came"]),
    ("complete", &["completed", "completing"]),
    ("create", &["created", "creating"]),
    ("deal", &["dealt"]),
    ("delete", &["deleted", "deleting"]),
    ("die", &["dying"]),
    ("dig", &["dug"]),
    ("draw", &["drew", "drawn"]),
    ("drink", &["drank", "drunk"]),
    ("drive", &["drove", "driven"]),
    ("eat", &["ate", "eaten"]),
    ("explore", &["explored", "exploring"]),
    ("fall", &["fell", "fallen"]),
    ("feed", &["fed"]),
    ("feel", &["felt"]),
    ("fight", &["fought"]),
    ("find", &["found"]),
    ("flee", &["fled"]),
    ("fly", &["flew", "flown"]),
    ("forget", &["forgot", "forgotten"]),
    ("forgive", &["forgave", "forgiven"]),
    ("free", &["freed"]),
    ("freeze", &["froze", "frozen"]),
    ("get", &["got", "gotten"]),
    ("give", &["gave", "given"]),
    ("go", &["went", "gone", "goes"]),
    ("grow", &["grew", "grown"]),
    ("guarantee", &["guaranteed"]),
    ("guide", &["guided", "guiding"]),
    ("hang", &["hung"]),
    ("hear", &["heard"]),
    ("hide", &["hid", "hidden"]),
    ("hold", &["held"]),
    ("ignore", &["ignored", "ignoring"]),
    ("keep", &["kept"]),
    ("know", &["knew", "known"]),
    ("lead", &["led"]),
    ("leave", &["left"]),
    ("lend", &["lent"]),
    ("lie", &["lying"]),
    ("lose", &["lost"]),
    ("make", &["made"]),
    ("mean", &["meant"]),
    ("meet", &["met"]),
    ("mislead", &["misled"]),
    ("mistake", &["mistook", "mistaken"]),
    ("overdraw", &["overdrew", "overdrawn"]),
    ("overpay", &["overpaid"]),
    ("owe", &["owed", "owing"]),
    ("pay", &["paid"]),
    ("prepay", &["prepaid"]),
    ("quote", &["quoted", "quoting"]),
    ("repay", &["repaid"]),
    ("restore", &["restored", "restoring"]),
    ("ride", &["rode", "ridden"]),
    ("ring", &["rang", "rung"]),
    ("rise", &["rose", "risen"]),
    ("run", &["ran"]),
    ("say", &["said"]),
    ("see", &["saw", "seen"]),
    ("seek", &["sought"]),
    ("sell", &["sold"]),
    ("send", &["sent"]),
    ("shake", &["shook", "shaken"]),
    ("show", &["shown"]),
    ("sing", &["sang", "sung"]),
    ("sink", &["sank", "sunk"]),
    ("sit", &["sat"]),
    ("sleep", &["slept"]),
    ("speak", &["spoke", "spoken"]),
    ("speed", &["sped"]),
    ("spend", &["spent"]),
    ("stand", &["stood"]),
    ("steal", &["stole", "stolen"]),
    ("stick", &["stuck"]),
    ("strike", &["struck"]),
    ("swear", &["swore", "sworn"]),
    ("swim", &["swam", "swum"]),
    ("take", &["took", "taken"]),
    ("teach", &["taught"]),
    ("tear", &["tore", "torn"]),
    ("tell", &["told"]),
    ("think", &["thought"]),
    ("throw", &["threw", "thrown"]),
    ("tie", &["tying"]),
    ("understand", &["understood"]),
    ("undertake", &["undertook", "undertaken"]),
    ("uphold", &["upheld"]),
    ("wake", &["woke", "woken"]),
    ("waste", &["wasted", "wasting"]),
    ("wear", &["wore", "worn"]),
    ("welcome", &["welcomed", "welcoming"]),
    ("withdraw", &["withdrew", "withdrawn"]),
    ("withhold", &["withheld"]),
    ("write", &["wrote", "written"]),
];

/// Words whose endings look inflected but are not.
const PROTECTED: &[&str] = &[
    // -ing
    "anything", "awning", "ceiling", "darling", "duckling", "evening", "everything",
    "herring", "inkling", "lightning", "morning", "nothing", "pudding", "shilling",
    "sibling", "something", "sterling", "viking",
    // -ed
    "beloved", "crooked", "embed", "hatred", "hundred", "infrared", "jagged",
    "kindred", "naked", "ragged", "rugged", "sacred", "shred", "sled", "wicked",
    "wretched",
    // -s
    "afterwards", "always", "besides", "economics", "lens", "mathematics",
    "nevertheless", "news", "overseas", "perhaps", "physics", "politics", "series",
    "sometimes", "species", "towards", "whereas", "yes",
];

/// Stems ending in a single `s` that keep it bare ("focused" -> "focus").
const BARE_S_STEMS: &[&str] = &[
    "alias", "atlas", "bias", "bonus", "bus", "census", "chorus", "focus", "status", "virus",
];

/// "-ang" stems that take no silent e ("banged" -> "bang", "ranged" -> "range").
const BARE_ANG_STEMS: &[&str] = &["bang", "clang", "gang", "hang", "overhang", "twang"];

/// Stem endings that take a silent e.
const SILENT_E_ENDINGS: &[&str] = &[
    "bl", "cl", "dl", "fl", "gl", "kl", "pl", "tl", "zl", "rg", "lg", "dg", "eng", "ung",
];

/// Rule-based verb lemmatizer.
///
/// Irregular forms come from a fixed table; regular forms lose `-s`, `-es`,
/// `-ed` or `-ing` and get their silent e or single final consonant back.
/// Rules are reapplied until the word stops changing, so "savings" reaches
/// "save" and the result is always a fixed point.
#[derive(Debug, Clone)]
pub struct VerbLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    protected: HashSet<&'static str>,
}

impl VerbLemmatizer {
    /// Create a lemmatizer with the built-in English tables.
    #[must_use]
    pub fn new() -> Self {
        let irregular = IRREGULAR_VERBS
            .iter()
            .flat_map(|(base, forms)| forms.iter().map(move |form| (*form, *base)))
            .collect();
        let protected = PROTECTED.iter().copied().collect();
        Self {
            irregular,
            protected,
        }
    }

    fn is_vowel(c: char) -> bool {
        matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
    }

    /// Number of vowel-consonant sequences.
    fn measure(chars: &[char]) -> usize {
        let mut count = 0;
        let mut prev_is_vowel = false;
        for &c in chars {
            let is_vowel = Self::is_vowel(c);
            if !is_vowel && prev_is_vowel {
                count += 1;
            }
            prev_is_vowel = is_vowel;
        }
        count
    }

    /// Consonant-vowel-consonant ending, final consonant not w, x or y.
    fn ends_with_cvc(chars: &[char]) -> bool {
        let n = chars.len();
        n >= 3
            && !Self::is_vowel(chars[n - 1])
            && Self::is_vowel(chars[n - 2])
            && !Self::is_vowel(chars[n - 3])
            && !matches!(chars[n - 1], 'w' | 'x' | 'y')
    }

    /// "denied" -> "deny", "died" -> "die".
    fn y_or_ie(stem: &str) -> String {
        if stem.chars().count() <= 1 {
            format!("{stem}ie")
        } else {
            format!("{stem}y")
        }
    }

    /// Strip `-ed`/`-ing` only when a plausible stem remains.
    fn undo_suffix(word: &str, stem: &str) -> String {
        if stem.chars().count() < 2 || !stem.chars().any(Self::is_vowel) {
            return word.to_string();
        }
        Self::restore_stem(stem)
    }

    /// Rebuild the base form of a stem left after removing `-ed`/`-ing`.
    fn restore_stem(stem: &str) -> String {
        let chars: Vec<char> = stem.chars().collect();
        let n = chars.len();
        let last = chars[n - 1];
        let prev = chars[n - 2];
        let with_e = || format!("{stem}e");

        // "cancelled" -> "cancel", but "spelled" -> "spell"
        if n > 5 && stem.ends_with("ell") {
            return chars[..n - 1].iter().collect();
        }
        if last == prev && !Self::is_vowel(last) {
            if n > 3 && !matches!(last, 'l' | 's' | 'z' | 'f') {
                return chars[..n - 1].iter().collect();
            }
            return stem.to_string();
        }

        if matches!(last, 'e' | 'y' | 'w' | 'x') {
            return stem.to_string();
        }
        if matches!(last, 'v' | 'c' | 'u') {
            return with_e();
        }
        if matches!(last, 's' | 'z') {
            return if BARE_S_STEMS.contains(&stem) {
                stem.to_string()
            } else {
                with_e()
            };
        }
        if SILENT_E_ENDINGS.iter().any(|end| stem.ends_with(end)) {
            return with_e();
        }
        if stem.ends_with("ang") {
            return if BARE_ANG_STEMS.contains(&stem) {
                stem.to_string()
            } else {
                with_e()
            };
        }

        // consonant + vowel + consonant endings that drop a silent e
        // ("managed", "declined", "disputed", "provided")
        let consonant_before = n >= 3
            && (!Self::is_vowel(chars[n - 3]) || (n >= 4 && chars[n - 4] == 'q' && chars[n - 3] == 'u'));
        if consonant_before {
            let takes_e = match last {
                'd' | 'k' => matches!(prev, 'a' | 'i' | 'o' | 'u'),
                'r' => matches!(prev, 'a' | 'i' | 'u'),
                't' => matches!(prev, 'a' | 'u'),
                'g' => prev == 'a',
                'm' => prev == 'u',
                'n' | 'b' => prev == 'i',
                _ => false,
            };
            if takes_e {
                return with_e();
            }
        }

        if Self::measure(&chars) == 1 && Self::ends_with_cvc(&chars) {
            return with_e();
        }

        stem.to_string()
    }

    /// One rewrite step.
    fn step(&self, word: &str) -> String {
        if let Some(base) = self.irregular.get(word) {
            return (*base).to_string();
        }
        if word.chars().count() <= 3 || self.protected.contains(word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            return Self::y_or_ie(stem);
        }
        if let Some(stem) = word.strip_suffix("ied") {
            return Self::y_or_ie(stem);
        }
        if word.ends_with("eed") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ying") {
            if stem.chars().count() >= 2 {
                return format!("{stem}y");
            }
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ed") {
            return Self::undo_suffix(word, stem);
        }
        if let Some(stem) = word.strip_suffix("ing") {
            return Self::undo_suffix(word, stem);
        }

        if ["sses", "shes", "ches", "xes", "zzes"]
            .iter()
            .any(|end| word.ends_with(end))
        {
            return word[..word.len() - 2].to_string();
        }
        if ["ss", "us", "is", "as"].iter().any(|end| word.ends_with(end)) {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }

        word.to_string()
    }
}

impl Default for VerbLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for VerbLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        // Every step either lands on an irregular base (a fixed point) or
        // shortens the word, so this bound is never the reason to stop.
        for _ in 0..=word.len() {
            let next = self.step(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn fork(&self) -> Box<dyn Lemmatizer> {
        Box::new(self.clone())
    }

    fn name(&self) -> &str {
        "verb-rules/1"
    }
}

#[cfg(test)]
#[path = "lemmatize_tests.rs"]
mod tests;
