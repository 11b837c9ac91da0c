//! Turning fetched HTML into [`ProfileRecord`]s and [`ProfileDetails`].
//!
//! All functions here are synchronous and take `&str`: `scraper::Html` is not
//! `Send`, so documents are parsed and dropped before the caller awaits again.
//!
//! [`ProfileDetails`]: crate::types::ProfileDetails

mod cards;
mod jsonld;
mod sections;

use scraper::ElementRef;

use crate::types::ProfileRecord;

pub use cards::extract_cards;
pub use jsonld::extract_structured_person;
pub use sections::{extract_phone_section, extract_profile_details, normalize_email};

/// How person records are located on a search-result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionStrategy {
    /// The first `Person` entity in the page's JSON-LD blocks.
    #[default]
    StructuredData,
    /// Every visible result card, in document order.
    CardScan,
}

impl ExtractionStrategy {
    #[must_use]
    pub fn extract(self, html: &str) -> Vec<ProfileRecord> {
        if html.trim().is_empty() {
            return Vec::new();
        }
        match self {
            Self::StructuredData => extract_structured_person(html).into_iter().collect(),
            Self::CardScan => extract_cards(html),
        }
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
