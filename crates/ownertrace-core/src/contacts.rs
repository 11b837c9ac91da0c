//! Labelled phone numbers and the deduplicating set they accumulate into.

use serde::{Deserialize, Serialize};

/// Line type reported for a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneLabel {
    Wireless,
    Landline,
    Unknown,
}

impl PhoneLabel {
    /// Merge priority: when two sources disagree about the same number the
    /// higher value wins.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            PhoneLabel::Wireless => 3,
            PhoneLabel::Landline => 2,
            PhoneLabel::Unknown => 1,
        }
    }

    /// Returns whichever of `self` and `other` has the higher priority.
    #[must_use]
    pub fn max_priority(self, other: PhoneLabel) -> PhoneLabel {
        if other.priority() > self.priority() {
            other
        } else {
            self
        }
    }

    /// Parses a label word as written by people-search sites and classifiers:
    /// `Wireless`, `Mobile`, `Cell`, `W`, `Landline`, `L`, `Unknown`, `U`.
    #[must_use]
    pub fn parse(word: &str) -> Option<PhoneLabel> {
        match word.trim().to_ascii_lowercase().as_str() {
            "wireless" | "mobile" | "cell" | "cellular" | "w" => Some(PhoneLabel::Wireless),
            "landline" | "land line" | "fixed" | "l" => Some(PhoneLabel::Landline),
            "unknown" | "u" => Some(PhoneLabel::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for PhoneLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhoneLabel::Wireless => write!(f, "Wireless"),
            PhoneLabel::Landline => write!(f, "Landline"),
            PhoneLabel::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A phone number in `(AAA) BBB-CCCC` form together with its line type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledPhone {
    pub number: String,
    pub label: PhoneLabel,
}

impl LabeledPhone {
    #[must_use]
    pub fn new(number: impl Into<String>, label: PhoneLabel) -> Self {
        Self {
            number: number.into(),
            label,
        }
    }

    /// Digit sequence used as the identity of the number.
    #[must_use]
    pub fn digits(&self) -> String {
        self.number.chars().filter(char::is_ascii_digit).collect()
    }
}

impl std::fmt::Display for LabeledPhone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.number, self.label)
    }
}

/// Insertion-ordered set of [`LabeledPhone`]s, unique by digit sequence.
///
/// Inserting a number that is already present keeps the existing position
/// and upgrades the label if the new one has a higher priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneSet {
    phones: Vec<LabeledPhone>,
}

impl PhoneSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or merges `phone`. Returns `true` if the number was new.
    pub fn insert(&mut self, phone: LabeledPhone) -> bool {
        let digits = phone.digits();
        if let Some(existing) = self.phones.iter_mut().find(|p| p.digits() == digits) {
            existing.label = existing.label.max_priority(phone.label);
            false
        } else {
            self.phones.push(phone);
            true
        }
    }

    pub fn merge<I>(&mut self, phones: I)
    where
        I: IntoIterator<Item = LabeledPhone>,
    {
        for phone in phones {
            self.insert(phone);
        }
    }

    #[must_use]
    pub fn get(&self, digits: &str) -> Option<&LabeledPhone> {
        self.phones.iter().find(|p| p.digits() == digits)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledPhone> {
        self.phones.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<LabeledPhone> {
        self.phones
    }
}

impl FromIterator<LabeledPhone> for PhoneSet {
    fn from_iter<I: IntoIterator<Item = LabeledPhone>>(iter: I) -> Self {
        let mut set = PhoneSet::new();
        set.merge(iter);
        set
    }
}

impl<'a> IntoIterator for &'a PhoneSet {
    type Item = &'a LabeledPhone;
    type IntoIter = std::slice::Iter<'a, LabeledPhone>;

    fn into_iter(self) -> Self::IntoIter {
        self.phones.iter()
    }
}
