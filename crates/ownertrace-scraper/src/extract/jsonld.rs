use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::types::{PostalAddress, ProfileRecord};

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid ld+json regex")
});

/// Maps the first schema.org `Person` found in the page's JSON-LD blocks.
///
/// Blocks are parsed one by one; a block that is not valid JSON is logged and
/// skipped without affecting the others. Each block may be a single object,
/// an array of objects, or an object wrapping an `@graph` array.
#[must_use]
pub fn extract_structured_person(html: &str) -> Option<ProfileRecord> {
    for (index, cap) in SCRIPT_RE.captures_iter(html).enumerate() {
        let Some(raw) = cap.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(block = index, error = %e, "skipping malformed ld+json block");
                continue;
            }
        };

        if let Some(person) = candidates(&value).into_iter().find(|item| is_person(item)) {
            return Some(person_to_record(person));
        }
    }
    None
}

/// Top-level entities of a JSON-LD block, with `@graph` members appended.
fn candidates(value: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut all = top.clone();
    for item in top {
        if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
            all.extend(graph.iter());
        }
    }
    all
}

/// `@type` may be a string or an array of strings.
fn is_person(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(s)) => s == "Person",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Person")),
        _ => false,
    }
}

fn person_to_record(person: &Value) -> ProfileRecord {
    let name = string_field(person, "name");

    let telephones = match person.get("telephone") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    };

    let addresses = match person.get("address") {
        Some(Value::Array(items)) => items.iter().filter_map(map_address).collect(),
        Some(single) => map_address(single).into_iter().collect(),
        None => Vec::new(),
    };

    let profile_link = string_field(person, "url").or_else(|| string_field(person, "@id"));

    ProfileRecord {
        name,
        telephones,
        addresses,
        profile_link,
    }
}

fn map_address(value: &Value) -> Option<PostalAddress> {
    if let Some(text) = value.as_str() {
        return Some(PostalAddress::from_full(text));
    }
    if !value.is_object() {
        return None;
    }
    Some(PostalAddress::from_parts(
        string_field(value, "streetAddress"),
        string_field(value, "addressLocality"),
        string_field(value, "addressRegion"),
        string_field(value, "postalCode"),
    ))
}

/// A trimmed, non-empty string field. Numbers are accepted for fields like
/// `postalCode` that some sites emit unquoted.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
