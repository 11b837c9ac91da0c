//! URL construction for the people-search site.

use reqwest::Url;

/// Turns a free-text search term into a path segment:
/// lower-cased, runs of non-alphanumerics collapsed into single `-`.
///
/// `"123 Main St., Apt 4"` becomes `"123-main-st-apt-4"`.
#[must_use]
pub fn slug_segment(value: &str) -> String {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// `{site}/address/{address}/{city}/{state}/{page}`
#[must_use]
pub fn address_search_url(
    site_base_url: &str,
    address: &str,
    city: &str,
    state: &str,
    page: u32,
) -> String {
    format!(
        "{}/address/{}/{}/{}/{page}",
        site_base_url.trim_end_matches('/'),
        slug_segment(address),
        slug_segment(city),
        slug_segment(state),
    )
}

/// `{site}/people/{name}/{state}/{city}/{page}`
///
/// Note the state-before-city ordering, which differs from address search.
#[must_use]
pub fn name_search_url(
    site_base_url: &str,
    name: &str,
    city: &str,
    state: &str,
    page: u32,
) -> String {
    format!(
        "{}/people/{}/{}/{}/{page}",
        site_base_url.trim_end_matches('/'),
        slug_segment(name),
        slug_segment(state),
        slug_segment(city),
    )
}

/// Resolves a profile link scraped from a page against the site base URL.
///
/// Absolute links are returned unchanged. If the base URL does not parse, the
/// link is joined by string concatenation.
#[must_use]
pub fn resolve_profile_url(site_base_url: &str, link: &str) -> String {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_owned();
    }
    match Url::parse(site_base_url).and_then(|base| base.join(link)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(site_base_url, link, error = %e, "could not join profile link onto site base URL");
            format!(
                "{}/{}",
                site_base_url.trim_end_matches('/'),
                link.trim_start_matches('/')
            )
        }
    }
}
