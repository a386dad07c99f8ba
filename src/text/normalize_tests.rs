use super::*;
use crate::text::entities::{EntityLabel, EntitySpan};

fn normalizer() -> TextNormalizer {
    TextNormalizer::with_workers(Some(4)).expect("normalizer starts")
}

#[test]
fn test_complaint_example() {
    let cleaned = normalizer().normalize("XXXX charged me twice, John Smith never called back.");
    assert!(!cleaned.is_empty());
    assert!(cleaned.contains("charge"));
    assert!(!cleaned.contains("John"));
    assert!(!cleaned.contains("Smith"));
    assert!(!cleaned.contains("XXXX"));
    assert_eq!(cleaned, "charge twice never call back");
}

#[test]
fn test_empty_input() {
    assert_eq!(normalizer().normalize(""), "");
    assert_eq!(normalizer().normalize("   \n\t "), "");
}

#[test]
fn test_only_stop_words_and_digits() {
    assert_eq!(normalizer().normalize("I was at the 123 of 2019"), "");
}

#[test]
fn test_digits_and_punctuation_removed() {
    let cleaned = normalizer().normalize("fee of $35.00 charged on 01/02/2020!!!");
    assert_eq!(cleaned, "fee charge");
}

#[test]
fn test_redaction_runs_removed() {
    let cleaned = normalizer().normalize("account xxxx closed on XX/XX/XXXX");
    assert_eq!(cleaned, "account close");
}

#[test]
fn test_newlines_join_words() {
    // Only plain spaces survive letter filtering, so a bare newline fuses
    // the words around it.
    let cleaned = normalizer().normalize("refund\nlate");
    assert_eq!(cleaned, "refundlate");
}

#[test]
fn test_idempotent_on_clean_text() {
    let n = normalizer();
    for text in [
        "charge twice never call back",
        "bank refuse refund overdraft fee",
        "dispute charge credit report still show balance",
    ] {
        let once = n.normalize(text);
        assert_eq!(n.normalize(&once), once, "{text}");
    }
}

#[test]
fn test_batch_matches_single_and_keeps_order() {
    let n = normalizer();
    let texts: Vec<String> = (0..64)
        .map(|i| format!("complaint {i}: charged {} times, Jane Doe called", i % 5))
        .chain(["".to_string(), "XXXX".to_string()])
        .collect();

    let batch = n.normalize_many(&texts);
    assert_eq!(batch.len(), texts.len());
    for (text, cleaned) in texts.iter().zip(&batch) {
        assert_eq!(*cleaned, n.normalize(text));
    }
}

#[test]
fn test_fingerprint_stable() {
    assert_eq!(normalizer().fingerprint(), normalizer().fingerprint());
    assert_eq!(normalizer().fingerprint(), normalizer().clone().fingerprint());
}

#[derive(Debug, Clone)]
struct NoEntities;

impl EntityRecognizer for NoEntities {
    fn entity_spans(&self, _text: &str) -> Vec<EntitySpan> {
        Vec::new()
    }

    fn fork(&self) -> Box<dyn EntityRecognizer> {
        Box::new(self.clone())
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[derive(Debug, Clone)]
struct FixedEntity(&'static str);

impl EntityRecognizer for FixedEntity {
    fn entity_spans(&self, text: &str) -> Vec<EntitySpan> {
        text.find(self.0)
            .map(|start| EntitySpan {
                start,
                end: start + self.0.len(),
                text: self.0.to_string(),
                label: EntityLabel::Name,
            })
            .into_iter()
            .collect()
    }

    fn fork(&self) -> Box<dyn EntityRecognizer> {
        Box::new(self.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[test]
fn test_recognizer_is_pluggable() {
    let keep = normalizer().with_recognizer(Box::new(NoEntities));
    assert_eq!(keep.normalize("paid Acme Corp twice"), "pay acme corp twice");

    let drop = normalizer().with_recognizer(Box::new(FixedEntity("twice")));
    assert_eq!(drop.normalize("paid Acme twice"), "pay acme");
}

#[test]
fn test_recognizer_changes_fingerprint() {
    let default = normalizer();
    let custom = normalizer().with_recognizer(Box::new(NoEntities));
    assert_ne!(default.fingerprint(), custom.fingerprint());
}

#[test]
fn test_zero_workers_rejected() {
    assert!(TextNormalizer::with_workers(Some(0)).is_err());
}

#[test]
fn test_sentence_initial_words_survive() {
    let n = normalizer();
    assert!(n.normalize("I called the bank. Refund was denied.").contains("refund"));
    assert_eq!(
        n.normalize("I called the bank. Refund was denied. They charged a fee."),
        "call bank refund deny charge fee"
    );
    assert_eq!(
        n.normalize("My card was stolen. Fraud charges appeared. Bank refused."),
        "card steal fraud charge appear bank refuse"
    );
    assert_eq!(
        n.normalize("Chase charged me twice. Overdraft fees were charged."),
        "chase charge twice overdraft fee charge"
    );
}
