//! Records extracted from people-search pages.

use serde::{Deserialize, Serialize};

/// One postal address attached to a person record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    /// Single-line form, e.g. `"12 Oak Ave, Austin, TX 78701"`.
    pub full: String,
}

impl PostalAddress {
    /// Builds an address from its parts, composing `full` as
    /// `"{street}, {city}, {state} {postal_code}"` with missing parts omitted.
    #[must_use]
    pub fn from_parts(
        street: Option<String>,
        city: Option<String>,
        state: Option<String>,
        postal_code: Option<String>,
    ) -> Self {
        let region = [state.as_deref(), postal_code.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let full = [street.as_deref(), city.as_deref(), Some(region.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            street,
            city,
            state,
            postal_code,
            full,
        }
    }

    /// An address known only by its display text.
    #[must_use]
    pub fn from_full(full: &str) -> Self {
        Self {
            full: full.trim().to_owned(),
            ..Self::default()
        }
    }
}

/// A person as found on a result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: Option<String>,
    pub telephones: Vec<String>,
    pub addresses: Vec<PostalAddress>,
    pub profile_link: Option<String>,
}

/// A linked relative or associate on a profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonLink {
    pub link: String,
    pub name: Option<String>,
}

/// Contact sections of a detail profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    /// Raw phone strings from the `Phone Numbers` section.
    pub phones: Vec<String>,
    pub relatives: Vec<PersonLink>,
    pub associates: Vec<PersonLink>,
    /// Normalized, validated email addresses.
    pub emails: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_composes_full_line() {
        let address = PostalAddress::from_parts(
            Some("12 Oak Ave".to_string()),
            Some("Austin".to_string()),
            Some("TX".to_string()),
            Some("78701".to_string()),
        );
        assert_eq!(address.full, "12 Oak Ave, Austin, TX 78701");
    }

    #[test]
    fn from_parts_skips_missing_pieces() {
        let address =
            PostalAddress::from_parts(Some("12 Oak Ave".to_string()), None, None, None);
        assert_eq!(address.full, "12 Oak Ave");
    }
}
