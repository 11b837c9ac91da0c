//! Owner names and the identity a search tries to confirm.

use serde::{Deserialize, Serialize};

/// One owner's name as it appears on the property record. Either half may be
/// missing (trusts, estates, partially filled rows).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first: Option<String>,
    pub last: Option<String>,
}

impl PersonName {
    #[must_use]
    pub fn new(first: Option<&str>, last: Option<&str>) -> Self {
        Self {
            first: clean(first),
            last: clean(last),
        }
    }

    /// Splits a free-form name into first and last token.
    ///
    /// `"John Q Smith"` becomes first `John`, last `Smith`. A single token is
    /// treated as a last name.
    #[must_use]
    pub fn from_full_name(full: &str) -> Self {
        let tokens: Vec<&str> = full.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Self::default(),
            [only] => Self::new(None, Some(only)),
            [first, .., last] => Self::new(Some(first), Some(last)),
        }
    }

    /// `"first last"` when both halves are present.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match (&self.first, &self.last) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.last.is_none()
    }
}

/// The person a search is trying to find: up to two owner names and the
/// address tied to the property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerIdentity {
    pub owner_one: PersonName,
    pub owner_two: PersonName,
    pub address: String,
}

impl OwnerIdentity {
    #[must_use]
    pub fn new(owner_one: PersonName, owner_two: PersonName, address: &str) -> Self {
        Self {
            owner_one,
            owner_two,
            address: address.trim().to_string(),
        }
    }

    /// Non-empty owner names, owner one first.
    pub fn owners(&self) -> impl Iterator<Item = &PersonName> {
        [&self.owner_one, &self.owner_two]
            .into_iter()
            .filter(|n| !n.is_empty())
    }

    /// Complete `"first last"` names for both owners, skipping partial ones.
    #[must_use]
    pub fn full_names(&self) -> Vec<String> {
        self.owners().filter_map(PersonName::full_name).collect()
    }
}

fn clean(part: Option<&str>) -> Option<String> {
    part.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
