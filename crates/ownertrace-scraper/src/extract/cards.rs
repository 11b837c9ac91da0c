use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::collapsed_text;
use crate::types::{PostalAddress, ProfileRecord};

static CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.card").expect("valid card selector"));
static NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".name-given").expect("valid name selector"));
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".address-current, .address").expect("valid address selector")
});
static PHONE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".phone").expect("valid phone selector"));
static DETAIL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/detail/"]"#).expect("valid detail selector"));
static PRIMARY_BUTTON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.btn-primary").expect("valid button selector"));

/// One [`ProfileRecord`] per visible `div.card`, in document order.
#[must_use]
pub fn extract_cards(html: &str) -> Vec<ProfileRecord> {
    let document = Html::parse_document(html);
    document
        .select(&CARD)
        .filter(|card| !is_hidden(*card))
        .map(card_to_record)
        .collect()
}

/// Cards hidden with the `d-none` utility class or an inline
/// `display: none` style are placeholders, not results.
fn is_hidden(card: ElementRef<'_>) -> bool {
    let element = card.value();
    if element.classes().any(|c| c == "d-none") {
        return true;
    }
    element.attr("style").is_some_and(|style| {
        style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase()
            .contains("display:none")
    })
}

fn card_to_record(card: ElementRef<'_>) -> ProfileRecord {
    let name = card
        .select(&NAME)
        .map(collapsed_text)
        .find(|text| !text.is_empty());

    let mut addresses: Vec<PostalAddress> = Vec::new();
    for text in card.select(&ADDRESS).map(collapsed_text) {
        if !text.is_empty() && !addresses.iter().any(|a| a.full == text) {
            addresses.push(PostalAddress::from_full(&text));
        }
    }

    let telephones = card
        .select(&PHONE)
        .map(collapsed_text)
        .filter(|text| !text.is_empty())
        .collect();

    let profile_link = first_href(card, &DETAIL_LINK).or_else(|| first_href(card, &PRIMARY_BUTTON));

    ProfileRecord {
        name,
        telephones,
        addresses,
        profile_link,
    }
}

fn first_href(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"
        <div class="card d-none"><span class="name-given">Template Person</span></div>
        <div class="card">
            <span class="name-given"> John   Doe </span>
            <div class="address-current">12 Oak Ave, Austin, TX 78701</div>
            <div class="address">9 Elm St, Dallas, TX 75201</div>
            <span class="phone">(555) 111-2222</span>
            <span class="phone">W 555-333-4444</span>
            <a class="btn btn-primary" href="/detail/john-doe/abc">View Details</a>
        </div>
        <div class="card" style="display: none"><span class="name-given">Hidden</span></div>
        <div class="card">
            <span class="name-given">Jane Doe</span>
            <a href="/people/jane-doe">Search</a>
            <a class="btn-primary" href="/fallback/jane">Open</a>
        </div>
    "#;

    #[test]
    fn skips_hidden_cards_and_keeps_document_order() {
        let records = extract_cards(RESULTS);
        let names: Vec<Option<&str>> = records.iter().map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec![Some("John Doe"), Some("Jane Doe")]);
    }

    #[test]
    fn reads_addresses_phones_and_detail_link() {
        let records = extract_cards(RESULTS);
        let john = &records[0];
        let addresses: Vec<&str> = john.addresses.iter().map(|a| a.full.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["12 Oak Ave, Austin, TX 78701", "9 Elm St, Dallas, TX 75201"]
        );
        assert_eq!(john.telephones, vec!["(555) 111-2222", "W 555-333-4444"]);
        assert_eq!(john.profile_link.as_deref(), Some("/detail/john-doe/abc"));
    }

    #[test]
    fn falls_back_to_primary_button_link() {
        let records = extract_cards(RESULTS);
        assert_eq!(records[1].profile_link.as_deref(), Some("/fallback/jane"));
        assert!(records[1].addresses.is_empty());
    }

    #[test]
    fn page_without_cards_is_empty() {
        assert!(extract_cards("<html><body><p>No results</p></body></html>").is_empty());
    }
}
