use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::error::ScraperError;

/// Classifier that answers from a fixed table and records what it was asked.
#[derive(Default)]
struct ScriptedClassifier {
    single: Vec<(&'static str, PhoneLabel)>,
    batch_reply: Option<Vec<String>>,
    calls: AtomicUsize,
    batch_input: Mutex<Vec<String>>,
}

#[async_trait]
impl PhoneClassifier for ScriptedClassifier {
    async fn classify(&self, number: &str) -> Result<PhoneLabel, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.single
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, label)| *label)
            .ok_or_else(|| ScraperError::Oracle("unscripted".to_string()))
    }

    async fn classify_batch(&self, numbers: &[String]) -> Result<Vec<String>, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.batch_input.lock().unwrap() = numbers.to_vec();
        self.batch_reply
            .clone()
            .ok_or_else(|| ScraperError::Oracle("batch down".to_string()))
    }
}

fn labeler(strategy: PhoneLabeling, classifier: ScriptedClassifier) -> (PhoneLabeler, Arc<ScriptedClassifier>) {
    let classifier = Arc::new(classifier);
    (PhoneLabeler::new(strategy, classifier.clone()), classifier)
}

#[test]
fn normalize_formats_ten_digit_numbers() {
    assert_eq!(normalize_phone("555.111.2222").as_deref(), Some("(555) 111-2222"));
    assert_eq!(normalize_phone("555-111-2222").as_deref(), Some("(555) 111-2222"));
    assert_eq!(normalize_phone("W (555) 111-2222").as_deref(), Some("(555) 111-2222"));
    assert_eq!(normalize_phone("Landline: 5551112222").as_deref(), Some("(555) 111-2222"));
}

#[test]
fn normalize_rejects_wrong_digit_counts() {
    assert_eq!(normalize_phone("555-1212"), None);
    assert_eq!(normalize_phone("1 (555) 111-2222"), None);
    assert_eq!(normalize_phone(""), None);
}

#[test]
fn normalize_is_idempotent() {
    for raw in ["555.111.2222", "Mobile - (555) 111 2222", "(555) 111-2222"] {
        let once = normalize_phone(raw).unwrap();
        assert_eq!(normalize_phone(&once).as_deref(), Some(once.as_str()));
    }
}

#[test]
fn hint_prefix_is_split_off() {
    assert_eq!(
        split_label_hint("W (555) 111-2222"),
        (Some(PhoneLabel::Wireless), "(555) 111-2222")
    );
    assert_eq!(
        split_label_hint("landline - 555"),
        (Some(PhoneLabel::Landline), "555")
    );
    assert_eq!(split_label_hint("(555) 111-2222"), (None, "(555) 111-2222"));
    // A word that merely starts with a hint letter is not a prefix.
    assert_eq!(split_label_hint("Work 555").0, None);
}

#[test]
fn batch_lines_accept_common_separators() {
    assert_eq!(
        parse_batch_line("(555) 111-2222 - Wireless"),
        Some(LabeledPhone::new("(555) 111-2222", PhoneLabel::Wireless))
    );
    assert_eq!(
        parse_batch_line("1. 555-333-4444: landline."),
        Some(LabeledPhone::new("(555) 333-4444", PhoneLabel::Landline))
    );
    assert_eq!(
        parse_batch_line("5553334444 | Mobile"),
        Some(LabeledPhone::new("(555) 333-4444", PhoneLabel::Wireless))
    );
    assert_eq!(parse_batch_line("Here are your results:"), None);
    assert_eq!(parse_batch_line("555-1212 - Wireless"), None);
}

#[tokio::test]
async fn per_number_merges_duplicates_into_one_oracle_call() {
    let (labeler, classifier) = labeler(
        PhoneLabeling::PerNumber,
        ScriptedClassifier {
            single: vec![("(555) 111-2222", PhoneLabel::Wireless)],
            ..ScriptedClassifier::default()
        },
    );
    let set = labeler
        .label(&["(555) 111-2222", "555-111-2222", "W (555) 111-2222"])
        .await;
    assert_eq!(
        set.into_vec(),
        vec![LabeledPhone::new("(555) 111-2222", PhoneLabel::Wireless)]
    );
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn per_number_discards_invalid_and_defaults_failures_to_unknown() {
    let (labeler, classifier) = labeler(PhoneLabeling::PerNumber, ScriptedClassifier::default());
    let set = labeler.label(&["not a phone", "555-333-4444"]).await;
    assert_eq!(
        set.into_vec(),
        vec![LabeledPhone::new("(555) 333-4444", PhoneLabel::Unknown)]
    );
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn per_number_keeps_site_hint_when_it_outranks_the_answer() {
    let (labeler, _) = labeler(
        PhoneLabeling::PerNumber,
        ScriptedClassifier {
            single: vec![("(555) 333-4444", PhoneLabel::Unknown)],
            ..ScriptedClassifier::default()
        },
    );
    let set = labeler.label(&["L 555-333-4444"]).await;
    assert_eq!(set.get("5553334444").map(|p| p.label), Some(PhoneLabel::Landline));
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let (labeler, classifier) = labeler(PhoneLabeling::Batch, ScriptedClassifier::default());
    let empty: [&str; 0] = [];
    assert!(labeler.label(&empty).await.is_empty());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_trusts_response_and_fills_missing_with_unknown() {
    let (labeler, classifier) = labeler(
        PhoneLabeling::Batch,
        ScriptedClassifier {
            batch_reply: Some(vec![
                "Sure, here you go:".to_string(),
                "(555) 111-2222 - Wireless".to_string(),
                "(555) 999-0000 - Landline".to_string(),
            ]),
            ..ScriptedClassifier::default()
        },
    );
    let set = labeler
        .label(&["555-111-2222", "555 333 4444", "555 999 000O"])
        .await;

    // Valid inputs are submitted normalized, invalid ones raw.
    assert_eq!(
        *classifier.batch_input.lock().unwrap(),
        vec!["(555) 111-2222", "(555) 333-4444", "555 999 000O"]
    );
    assert_eq!(
        set.into_vec(),
        vec![
            LabeledPhone::new("(555) 111-2222", PhoneLabel::Wireless),
            LabeledPhone::new("(555) 333-4444", PhoneLabel::Unknown),
            LabeledPhone::new("(555) 999-0000", PhoneLabel::Landline),
        ]
    );
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn batch_drops_invalid_inputs_not_echoed_back() {
    let (labeler, _) = labeler(
        PhoneLabeling::Batch,
        ScriptedClassifier {
            batch_reply: Some(vec!["(555) 111-2222 - Landline".to_string()]),
            ..ScriptedClassifier::default()
        },
    );
    let set = labeler.label(&["555-111-2222", "12345"]).await;
    assert_eq!(set.len(), 1);
    assert_eq!(set.get("5551112222").map(|p| p.label), Some(PhoneLabel::Landline));
}

#[tokio::test]
async fn failed_batch_labels_every_valid_input_unknown() {
    let (labeler, _) = labeler(PhoneLabeling::Batch, ScriptedClassifier::default());
    let set = labeler.label(&["555-111-2222", "555-333-4444", "junk"]).await;
    assert_eq!(
        set.into_vec(),
        vec![
            LabeledPhone::new("(555) 111-2222", PhoneLabel::Unknown),
            LabeledPhone::new("(555) 333-4444", PhoneLabel::Unknown),
        ]
    );
}
