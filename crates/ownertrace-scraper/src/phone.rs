//! Phone normalization and line-type labeling.
//!
//! Raw strings from result cards and profile pages look like
//! `"(555) 111-2222"`, `"555.111.2222"` or `"W (555) 111-2222"`, where the
//! optional leading word is the site's own line-type hint. Everything valid is
//! rendered as `(AAA) BBB-CCCC` and merged by digits into a [`PhoneSet`].

use std::sync::{Arc, LazyLock};

use ownertrace_core::{LabeledPhone, PhoneLabel, PhoneLabeling, PhoneSet};
use regex::Regex;

use crate::oracle::PhoneClassifier;

static HINT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(wireless|landline|mobile|cell|unknown|w|l|u)(?:\s*[:\-]\s*|\s+)")
        .expect("valid phone hint regex")
});

static BATCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.*?)[\s:\-|,]+(wireless|landline|land line|mobile|cellular|cell|unknown)\.?$",
    )
    .expect("valid batch line regex")
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d{1,3}[.)])\s+").expect("valid list marker regex"));

/// Splits an optional leading line-type word off `raw`.
///
/// Returns the hint (if any) and the remainder of the string.
#[must_use]
pub fn split_label_hint(raw: &str) -> (Option<PhoneLabel>, &str) {
    match HINT_PREFIX.captures(raw) {
        Some(caps) => {
            let hint = caps.get(1).and_then(|m| PhoneLabel::parse(m.as_str()));
            let rest = caps.get(0).map_or(raw, |m| &raw[m.end()..]);
            (hint, rest)
        }
        None => (None, raw),
    }
}

/// Renders `raw` as `(AAA) BBB-CCCC`, or `None` unless it holds exactly ten
/// digits after any hint prefix is removed. Idempotent.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let (_, rest) = split_label_hint(raw);
    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return None;
    }
    Some(format!(
        "({}) {}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..10]
    ))
}

/// A raw phone string after hint extraction and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCandidate {
    pub raw: String,
    pub hint: Option<PhoneLabel>,
    pub normalized: Option<String>,
}

impl PhoneCandidate {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (hint, _) = split_label_hint(raw);
        Self {
            raw: raw.trim().to_owned(),
            hint,
            normalized: normalize_phone(raw),
        }
    }

    /// The hint, or `Unknown` when the site gave none.
    fn hint_label(&self) -> PhoneLabel {
        self.hint.unwrap_or(PhoneLabel::Unknown)
    }
}

/// Parses one batch-classifier response line of the form
/// `<number> <sep> <label>`. Lines whose number is not a valid 10-digit
/// number are not recognized.
#[must_use]
pub fn parse_batch_line(line: &str) -> Option<LabeledPhone> {
    let line = LIST_MARKER.replace(line.trim(), "");
    let caps = BATCH_LINE.captures(line.trim())?;
    let number = normalize_phone(caps.get(1)?.as_str())?;
    let label = PhoneLabel::parse(caps.get(2)?.as_str())?;
    Some(LabeledPhone::new(number, label))
}

/// Labels phone candidates with one of the two [`PhoneLabeling`] strategies.
#[derive(Clone)]
pub struct PhoneLabeler {
    strategy: PhoneLabeling,
    classifier: Arc<dyn PhoneClassifier>,
}

impl PhoneLabeler {
    #[must_use]
    pub fn new(strategy: PhoneLabeling, classifier: Arc<dyn PhoneClassifier>) -> Self {
        Self {
            strategy,
            classifier,
        }
    }

    #[must_use]
    pub fn strategy(&self) -> PhoneLabeling {
        self.strategy
    }

    /// Normalizes, deduplicates and labels `raw` phone strings.
    pub async fn label<S: AsRef<str>>(&self, raw: &[S]) -> PhoneSet {
        let candidates: Vec<PhoneCandidate> =
            raw.iter().map(|r| PhoneCandidate::parse(r.as_ref())).collect();
        if candidates.is_empty() {
            return PhoneSet::new();
        }
        match self.strategy {
            PhoneLabeling::PerNumber => self.label_per_number(&candidates).await,
            PhoneLabeling::Batch => self.label_batch(&candidates).await,
        }
    }

    async fn label_per_number(&self, candidates: &[PhoneCandidate]) -> PhoneSet {
        // Collapse duplicates first so each distinct number costs one call.
        let mut hinted = PhoneSet::new();
        for candidate in candidates {
            match &candidate.normalized {
                Some(number) => {
                    hinted.insert(LabeledPhone::new(number.clone(), candidate.hint_label()));
                }
                None => tracing::debug!(raw = %candidate.raw, "discarding malformed phone"),
            }
        }

        let mut labeled = PhoneSet::new();
        for phone in &hinted {
            let answer = match self.classifier.classify(&phone.number).await {
                Ok(label) => label,
                Err(e) => {
                    tracing::warn!(number = %phone.number, error = %e, "phone classification failed");
                    PhoneLabel::Unknown
                }
            };
            labeled.insert(LabeledPhone::new(
                phone.number.clone(),
                phone.label.max_priority(answer),
            ));
        }
        labeled
    }

    async fn label_batch(&self, candidates: &[PhoneCandidate]) -> PhoneSet {
        let mut submitted: Vec<String> = Vec::new();
        for candidate in candidates {
            let entry = candidate
                .normalized
                .clone()
                .unwrap_or_else(|| candidate.raw.clone());
            if !entry.is_empty() && !submitted.contains(&entry) {
                submitted.push(entry);
            }
        }

        let answered: PhoneSet = match self.classifier.classify_batch(&submitted).await {
            Ok(lines) => lines.iter().filter_map(|l| parse_batch_line(l)).collect(),
            Err(e) => {
                tracing::warn!(count = submitted.len(), error = %e, "batch phone classification failed");
                PhoneSet::new()
            }
        };

        let mut labeled = PhoneSet::new();
        for candidate in candidates {
            let Some(number) = &candidate.normalized else {
                continue;
            };
            let digits: String = number.chars().filter(char::is_ascii_digit).collect();
            let answer = answered
                .get(&digits)
                .map_or(PhoneLabel::Unknown, |p| p.label);
            labeled.insert(LabeledPhone::new(
                number.clone(),
                candidate.hint_label().max_priority(answer),
            ));
        }
        // Numbers the classifier normalized from otherwise-invalid input.
        labeled.merge(answered.into_vec());
        labeled
    }
}

impl std::fmt::Debug for PhoneLabeler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoneLabeler")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "phone_test.rs"]
mod tests;
