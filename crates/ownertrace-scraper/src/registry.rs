//! California BizFile lookups: from an LLC name to its registered agent and
//! the agent's mailing and principal addresses.

use std::sync::LazyLock;
use std::time::Duration;

use ownertrace_core::PersonName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScraperError;
use crate::oracle::NameExtractor;

static UNIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\d+").expect("valid unit number regex"));

/// Honorifics, suffixes and role words that show up around agent names.
const NAME_NOISE: &[&str] = &[
    "trustee", "tr", "ttee", "esq", "jr", "sr", "ii", "iii", "mr", "mrs", "ms", "dr", "inc", "llc",
    "corp", "agent", "manager", "member", "et", "al", "c/o",
];

/// The registered agent of a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessAgent {
    /// BizFile record id, used for the filing-detail lookup.
    pub record_id: Option<String>,
    /// Agent name as filed.
    pub full_name: String,
    /// First and last token, capitalized, unless refined by [`Self::refine_name`].
    pub name: PersonName,
}

impl BusinessAgent {
    /// True when the filed name is more than a plain `First Last` pair.
    #[must_use]
    pub fn carries_titles(&self) -> bool {
        let tokens: Vec<&str> = self.full_name.split_whitespace().collect();
        tokens.len() != 2
            || tokens.iter().any(|token| {
                let word = token.trim_matches(['.', ',']).to_lowercase();
                NAME_NOISE.contains(&word.as_str())
                    || !token.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
            })
    }

    /// Replaces the token-split name with one read by `extractor` when the
    /// filed name carries titles. On failure the token split is kept.
    pub async fn refine_name(&mut self, extractor: &dyn NameExtractor) {
        if !self.carries_titles() {
            return;
        }
        match extractor.extract_name(&self.full_name).await {
            Ok(name) => {
                tracing::debug!(full_name = %self.full_name, ?name, "agent name extracted");
                self.name = PersonName::new(
                    name.first.as_deref().map(capitalize).as_deref(),
                    name.last.as_deref().map(capitalize).as_deref(),
                );
            }
            Err(e) => {
                tracing::warn!(full_name = %self.full_name, error = %e, "name extraction failed; keeping token split");
            }
        }
    }
}

/// A filing address reduced to search-ready, lower-cased parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentAddress {
    /// First line with unit numbers (`#12`) removed.
    pub street: String,
    pub city: Option<String>,
    /// Letters only, e.g. `"ca"`.
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentAddresses {
    pub mailing: Option<AgentAddress>,
    pub principal: Option<AgentAddress>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct BusinessSearchRequest<'a> {
    search_value: &'a str,
    search_type_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct FilingDetail {
    #[serde(default)]
    drawer_detail_list: Vec<DrawerItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct DrawerItem {
    label: Option<String>,
    value: Option<String>,
}

/// HTTP client for the BizFile Online JSON API.
#[derive(Debug, Clone)]
pub struct BizFileClient {
    client: reqwest::Client,
    base_url: String,
}

impl BizFileClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Looks up the registered agent of the first business matching `llc_name`.
    ///
    /// Returns `Ok(None)` when the search has no rows or the first row names
    /// no agent.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, non-2xx status, or a
    /// response body that is not JSON.
    pub async fn find_agent(&self, llc_name: &str) -> Result<Option<BusinessAgent>, ScraperError> {
        let url = format!("{}/api/Records/businesssearch", self.base_url);
        let body = BusinessSearchRequest {
            search_value: llc_name,
            search_type_id: "1",
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let value = read_json(response, &url, "business search").await?;

        let Some(row) = first_row(&value) else {
            tracing::info!(llc_name, "no business found");
            return Ok(None);
        };
        let Some(full_name) = row
            .get("AGENT")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            tracing::info!(llc_name, "business has no registered agent");
            return Ok(None);
        };

        let record_id = match row.get("ID") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(Some(BusinessAgent {
            record_id,
            full_name: full_name.to_owned(),
            name: split_agent_name(full_name),
        }))
    }

    /// Fetches the mailing and principal addresses of business `record_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, non-2xx status, or an
    /// unexpected response shape.
    pub async fn agent_addresses(&self, record_id: &str) -> Result<AgentAddresses, ScraperError> {
        let url = format!("{}/api/FilingDetail/business/{record_id}/false", self.base_url);
        let response = self.client.get(&url).send().await?;
        let value = read_json(response, &url, "filing detail").await?;
        let detail: FilingDetail =
            serde_json::from_value(value).map_err(|source| ScraperError::Deserialize {
                context: format!("filing detail {record_id}"),
                source,
            })?;

        let lookup = |label: &str| {
            detail
                .drawer_detail_list
                .iter()
                .find(|item| item.label.as_deref() == Some(label))
                .and_then(|item| item.value.as_deref())
                .and_then(parse_filing_address)
        };

        Ok(AgentAddresses {
            mailing: lookup("Mailing Address"),
            principal: lookup("Principal Address"),
        })
    }
}

async fn read_json(
    response: reqwest::Response,
    url: &str,
    context: &str,
) -> Result<Value, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| ScraperError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

/// `rows` is keyed by record id; some deployments return a plain array.
///
/// Integer keys come first in ascending numeric order, so `"99"` precedes
/// `"100"`.
fn first_row(value: &Value) -> Option<&Value> {
    match value.get("rows")? {
        Value::Object(rows) => rows
            .iter()
            .filter_map(|(key, row)| numeric_key(key).map(|id| (id, row)))
            .min_by_key(|(id, _)| *id)
            .map(|(_, row)| row)
            .or_else(|| rows.values().next()),
        Value::Array(rows) => rows.first(),
        _ => None,
    }
}

/// A key in canonical integer form: digits only, no leading zeros.
fn numeric_key(key: &str) -> Option<u64> {
    let id = key.parse::<u64>().ok()?;
    (id.to_string() == key).then_some(id)
}

/// `"JOHN Q PUBLIC"` becomes first `John`, last `Public`.
fn split_agent_name(full_name: &str) -> PersonName {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let first = tokens.first().map(|t| capitalize(t));
    let last = tokens.last().map(|t| capitalize(t));
    PersonName::new(first.as_deref(), last.as_deref())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parses a two-line filing address: `"street\ncity, STATE zip"`.
fn parse_filing_address(value: &str) -> Option<AgentAddress> {
    let mut lines = value.lines().map(str::trim);
    let street = UNIT_NUMBER
        .replace_all(lines.next()?, "")
        .trim()
        .to_lowercase();
    if street.is_empty() {
        return None;
    }

    let mut locality = lines.next().unwrap_or_default().split(',');
    let city = locality
        .next()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());
    let state = locality
        .next()
        .map(|s| {
            s.chars()
                .filter(char::is_ascii_alphabetic)
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|s| !s.is_empty());

    Some(AgentAddress { street, city, state })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Option<PersonName>);

    #[async_trait::async_trait]
    impl NameExtractor for FixedExtractor {
        async fn extract_name(&self, _raw: &str) -> Result<PersonName, ScraperError> {
            self.0
                .clone()
                .ok_or_else(|| ScraperError::Oracle("no answer".to_string()))
        }
    }

    fn agent(full_name: &str) -> BusinessAgent {
        BusinessAgent {
            record_id: None,
            full_name: full_name.to_string(),
            name: split_agent_name(full_name),
        }
    }

    #[test]
    fn titles_are_detected() {
        assert!(!agent("JOHN DOE").carries_titles());
        assert!(!agent("MARY O'NEIL-SMITH").carries_titles());
        assert!(agent("JOHN DOE TRUSTEE").carries_titles());
        assert!(agent("DOE, JOHN").carries_titles());
        assert!(agent("JOHN Q PUBLIC").carries_titles());
    }

    #[tokio::test]
    async fn refine_name_uses_extractor_for_titled_names() {
        let mut titled = agent("JOHN DOE TRUSTEE");
        assert_eq!(titled.name.last.as_deref(), Some("Trustee"));
        titled
            .refine_name(&FixedExtractor(Some(PersonName::new(Some("JOHN"), Some("doe")))))
            .await;
        assert_eq!(titled.name, PersonName::new(Some("John"), Some("Doe")));
    }

    #[tokio::test]
    async fn refine_name_keeps_split_when_extraction_fails_or_is_unneeded() {
        let mut titled = agent("JOHN DOE TRUSTEE");
        titled.refine_name(&FixedExtractor(None)).await;
        assert_eq!(titled.name, PersonName::new(Some("John"), Some("Trustee")));

        let mut plain = agent("JANE ROE");
        plain
            .refine_name(&FixedExtractor(Some(PersonName::new(Some("X"), Some("Y")))))
            .await;
        assert_eq!(plain.name, PersonName::new(Some("Jane"), Some("Roe")));
    }

    #[test]
    fn agent_name_uses_first_and_last_token() {
        let name = split_agent_name("JOHN q PUBLIC");
        assert_eq!(name.first.as_deref(), Some("John"));
        assert_eq!(name.last.as_deref(), Some("Public"));
    }

    #[test]
    fn filing_address_strips_unit_and_keeps_state_letters() {
        let address = parse_filing_address("123 Main St #204\nLos Angeles, CA 90012").unwrap();
        assert_eq!(
            address,
            AgentAddress {
                street: "123 main st".to_string(),
                city: Some("los angeles".to_string()),
                state: Some("ca".to_string()),
            }
        );
    }

    #[test]
    fn filing_address_tolerates_missing_second_line() {
        let address = parse_filing_address("PO Box 9").unwrap();
        assert_eq!(address.street, "po box 9");
        assert_eq!(address.city, None);
        assert_eq!(address.state, None);
        assert!(parse_filing_address("").is_none());
    }

    #[test]
    fn first_row_accepts_object_or_array() {
        let keyed = serde_json::json!({"rows": {"42": {"ID": 42}}});
        let listed = serde_json::json!({"rows": [{"ID": "7"}]});
        assert_eq!(first_row(&keyed).and_then(|r| r.get("ID")), Some(&serde_json::json!(42)));
        assert_eq!(first_row(&listed).and_then(|r| r.get("ID")), Some(&serde_json::json!("7")));
        assert!(first_row(&serde_json::json!({"rows": {}})).is_none());
    }

    #[test]
    fn first_row_orders_integer_keys_numerically() {
        let rows = serde_json::json!({"rows": {
            "100": {"AGENT": "BOB SECOND"},
            "99": {"AGENT": "ALICE FIRST"},
            "abc": {"AGENT": "CAROL THIRD"}
        }});
        assert_eq!(
            first_row(&rows).and_then(|r| r.get("AGENT")),
            Some(&serde_json::json!("ALICE FIRST"))
        );

        let named = serde_json::json!({"rows": {"007": {"ID": 1}, "b": {"ID": 2}}});
        assert_eq!(first_row(&named).and_then(|r| r.get("ID")), Some(&serde_json::json!(1)));
    }
}
