//! Next-page detection for people-search result listings.
//!
//! Result pages end with a Bootstrap pager:
//!
//! ```text
//! <ul class="pagination">
//!   <li>«</li> <li>1</li> <li class="active">2</li> <li>3</li> <li>»</li>
//! </ul>
//! ```
//!
//! The second-to-last item is the link to the last page; the site marks it
//! `disabled` once the current page is the last one.

use std::sync::LazyLock;

use scraper::{Html, Selector};

static PAGER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.pagination").expect("valid pager selector"));
static ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("valid item selector"));

/// Returns `true` when the page advertises a further result page.
///
/// Returns `false` if:
/// - there is no `ul.pagination`,
/// - it has fewer than two `li` items,
/// - its second-to-last item carries the `disabled` class.
#[must_use]
pub fn has_next_page(html: &str) -> bool {
    if html.trim().is_empty() {
        return false;
    }
    let document = Html::parse_document(html);
    let Some(pager) = document.select(&PAGER).next() else {
        return false;
    };
    let items: Vec<_> = pager.select(&ITEM).collect();
    if items.len() < 2 {
        return false;
    }
    let second_to_last = items[items.len() - 2];
    !second_to_last.value().classes().any(|c| c == "disabled")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(items: &[&str]) -> String {
        let lis: String = items
            .iter()
            .map(|class| format!(r#"<li class="page-item {class}"><a>x</a></li>"#))
            .collect();
        format!(r#"<html><body><ul class="pagination">{lis}</ul></body></html>"#)
    }

    #[test]
    fn enabled_second_to_last_means_more_pages() {
        assert!(has_next_page(&pager(&["", "active", "", ""])));
    }

    #[test]
    fn disabled_second_to_last_means_last_page() {
        assert!(!has_next_page(&pager(&["", "", "active disabled", ""])));
    }

    #[test]
    fn missing_or_tiny_pager_means_last_page() {
        assert!(!has_next_page("<html><body><p>done</p></body></html>"));
        assert!(!has_next_page(&pager(&["active"])));
        assert!(!has_next_page(""));
    }

    #[test]
    fn only_the_second_to_last_item_matters() {
        assert!(has_next_page(&pager(&["disabled", "", "", "disabled"])));
    }
}
