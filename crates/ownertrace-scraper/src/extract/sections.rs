//! Labelled `.row` sections of a detail profile page.
//!
//! A section is a `.row` whose `h2.section-label` reads exactly one of the
//! labels below. Relatives and associates are read as `{link, name}` pairs
//! from the anchors inside their section, so a name can never drift onto the
//! wrong link.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::collapsed_text;
use crate::types::{PersonLink, ProfileDetails};

const PHONE_NUMBERS: &str = "Phone Numbers";
const POSSIBLE_RELATIVES: &str = "Possible Relatives";
const POSSIBLE_ASSOCIATES: &str = "Possible Associates";
const EMAIL_ADDRESSES: &str = "Email Addresses";

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".row").expect("valid row selector"));
static SECTION_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.section-label").expect("valid label selector"));
static PHONE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".phone").expect("valid phone selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static PERSON_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".relative, .associate, .name-given").expect("valid person name selector")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}$")
        .expect("valid email regex")
});

/// Reads all four contact sections of a profile page.
#[must_use]
pub fn extract_profile_details(html: &str) -> ProfileDetails {
    if html.trim().is_empty() {
        return ProfileDetails::default();
    }
    let document = Html::parse_document(html);

    let mut details = ProfileDetails::default();
    for row in sections(&document, PHONE_NUMBERS) {
        push_phones(row, &mut details.phones);
    }
    for row in sections(&document, POSSIBLE_RELATIVES) {
        push_person_links(row, &mut details.relatives);
    }
    for row in sections(&document, POSSIBLE_ASSOCIATES) {
        push_person_links(row, &mut details.associates);
    }
    for row in sections(&document, EMAIL_ADDRESSES) {
        for anchor in row.select(&ANCHOR) {
            let email = anchor
                .value()
                .attr("href")
                .and_then(normalize_email)
                .or_else(|| normalize_email(&collapsed_text(anchor)));
            if let Some(email) = email {
                if !details.emails.contains(&email) {
                    details.emails.push(email);
                }
            }
        }
    }
    details
}

/// Raw phone strings of the `Phone Numbers` section only.
#[must_use]
pub fn extract_phone_section(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let document = Html::parse_document(html);
    let mut phones = Vec::new();
    for row in sections(&document, PHONE_NUMBERS) {
        push_phones(row, &mut phones);
    }
    phones
}

/// Turns an email link or text into a bare lower-case address.
///
/// Handles `mailto:` links, links whose last path segment is the address,
/// and percent-encoded `@`. Returns `None` when the result is not a
/// plausible address.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    if value
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("mailto:"))
    {
        value = &value[7..];
    }
    value = value.split(['?', '#']).next().unwrap_or(value);
    value = value.trim_end_matches('/');
    if let Some((_, last)) = value.rsplit_once('/') {
        value = last;
    }
    let decoded = percent_decode_str(value).decode_utf8().ok()?;
    let email = decoded.trim().to_lowercase();
    EMAIL_RE.is_match(&email).then_some(email)
}

/// Rows whose section label text is exactly `label`.
fn sections<'a>(document: &'a Html, label: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    document.select(&ROW).filter(move |row| {
        let text: String = row.select(&SECTION_LABEL).flat_map(|h| h.text()).collect();
        text.trim() == label
    })
}

fn push_phones(row: ElementRef<'_>, phones: &mut Vec<String>) {
    for text in row.select(&PHONE).map(collapsed_text) {
        if !text.is_empty() && !phones.contains(&text) {
            phones.push(text);
        }
    }
}

fn push_person_links(row: ElementRef<'_>, people: &mut Vec<PersonLink>) {
    for anchor in row.select(&ANCHOR) {
        let Some(link) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        if link.is_empty() || link.starts_with('#') || link.starts_with("javascript:") {
            continue;
        }
        if people.iter().any(|p| p.link == link) {
            continue;
        }
        let name = anchor
            .select(&PERSON_NAME)
            .map(collapsed_text)
            .find(|t| !t.is_empty())
            .or_else(|| Some(collapsed_text(anchor)).filter(|t| !t.is_empty()));
        people.push(PersonLink {
            link: link.to_owned(),
            name,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r##"
        <div class="container">
          <div class="row">
            <h2 class="section-label">Phone Numbers</h2>
            <a class="phone" href="/phone/5551112222">(555) 111-2222</a>
            <span class="phone">Wireless (555) 333-4444</span>
          </div>
          <div class="row">
            <h2 class="section-label">Possible Relatives</h2>
            <a href="/detail/mary-doe/1"><span class="relative">Mary Doe</span></a>
            <a href="/detail/tom-doe/2">Tom  Doe</a>
            <a href="#">Show more</a>
          </div>
          <div class="row">
            <h2 class="section-label">Possible Associates</h2>
            <a href="/detail/sam-poe/3"><span class="associate">Sam Poe</span></a>
          </div>
          <div class="row">
            <h2 class="section-label">Email Addresses</h2>
            <a href="mailto:John.Doe@Example.com">John.Doe@Example.com</a>
            <a href="/email/jd%40mail.example.org">jd@mail.example.org</a>
            <a href="/email/not-an-email">not an email</a>
          </div>
          <div class="row">
            <h2 class="section-label">Phone Numbers Archive</h2>
            <span class="phone">(555) 000-0000</span>
          </div>
        </div>
    "##;

    #[test]
    fn reads_phone_section_by_exact_label() {
        assert_eq!(
            extract_phone_section(PROFILE),
            vec!["(555) 111-2222", "Wireless (555) 333-4444"]
        );
    }

    #[test]
    fn relatives_are_link_name_pairs() {
        let details = extract_profile_details(PROFILE);
        assert_eq!(
            details.relatives,
            vec![
                PersonLink {
                    link: "/detail/mary-doe/1".to_string(),
                    name: Some("Mary Doe".to_string()),
                },
                PersonLink {
                    link: "/detail/tom-doe/2".to_string(),
                    name: Some("Tom Doe".to_string()),
                },
            ]
        );
        assert_eq!(details.associates.len(), 1);
        assert_eq!(details.associates[0].name.as_deref(), Some("Sam Poe"));
    }

    #[test]
    fn emails_are_normalized_and_validated() {
        let details = extract_profile_details(PROFILE);
        assert_eq!(
            details.emails,
            vec!["john.doe@example.com", "jd@mail.example.org"]
        );
    }

    #[test]
    fn normalize_email_cases() {
        assert_eq!(
            normalize_email("MAILTO:A.B@C.IO").as_deref(),
            Some("a.b@c.io")
        );
        assert_eq!(
            normalize_email("https://site.test/email/a%40b.com?ref=1").as_deref(),
            Some("a@b.com")
        );
        assert_eq!(normalize_email("/email/"), None);
        assert_eq!(normalize_email("a@b"), None);
    }

    #[test]
    fn empty_document_has_no_details() {
        assert_eq!(extract_profile_details(""), ProfileDetails::default());
    }
}
