//! Sub-command handlers. Each returns the JSON document printed by `main`.

use ownertrace_core::{AppConfig, CrawlAccumulator, OwnerIdentity, PersonName};
use ownertrace_scraper::search::OwnerSearchBuilder;
use ownertrace_scraper::{BizFileClient, OpenAiOracle, OwnerSearch, SearchOptions};
use serde_json::{json, Value};

/// Owner names and address given on the command line.
#[derive(Debug, Default)]
pub(crate) struct Owners {
    pub first: Option<String>,
    pub last: Option<String>,
    pub second_first: Option<String>,
    pub second_last: Option<String>,
    pub address: Option<String>,
}

impl Owners {
    pub(crate) fn into_identity(self, searched_address: &str) -> OwnerIdentity {
        OwnerIdentity::new(
            PersonName::new(self.first.as_deref(), self.last.as_deref()),
            PersonName::new(self.second_first.as_deref(), self.second_last.as_deref()),
            self.address.as_deref().unwrap_or(searched_address),
        )
    }
}

fn build_search(config: &AppConfig, options: SearchOptions) -> anyhow::Result<OwnerSearch> {
    Ok(OwnerSearchBuilder::from_config(config)?.options(options).build())
}

fn report(acc: &CrawlAccumulator, search: &OwnerSearch) -> anyhow::Result<Value> {
    Ok(json!({
        "matched": acc.matched,
        "result": serde_json::to_value(acc)?,
        "relative_fields": acc.relative_fields(),
        "request_count": search.request_count(),
    }))
}

pub(crate) async fn run_address(
    config: &AppConfig,
    address: &str,
    city: &str,
    state: &str,
    owners: Owners,
    options: SearchOptions,
) -> anyhow::Result<Value> {
    let search = build_search(config, options)?;
    let identity = owners.into_identity(address);
    if identity.owners().next().is_none() {
        tracing::warn!("no owner names given; only address matching can succeed");
    }
    let acc = search.search_by_address(address, city, state, &identity).await;
    report(&acc, &search)
}

pub(crate) async fn run_name(
    config: &AppConfig,
    name: &str,
    property_address: &str,
    mailing_address: &str,
    city: &str,
    state: &str,
    options: SearchOptions,
) -> anyhow::Result<Value> {
    if property_address.trim().is_empty() && mailing_address.trim().is_empty() {
        anyhow::bail!("name search needs --property-address or --mailing-address to confirm a match");
    }
    let search = build_search(config, options)?;
    let acc = search
        .search_by_name(name, property_address, mailing_address, city, state)
        .await;
    report(&acc, &search)
}

pub(crate) async fn run_llc(
    config: &AppConfig,
    llc_name: &str,
    search_agent: bool,
    options: SearchOptions,
) -> anyhow::Result<Value> {
    let bizfile = BizFileClient::new(
        &config.bizfile_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let Some(mut agent) = bizfile.find_agent(llc_name).await? else {
        return Ok(json!({ "llc": llc_name, "agent": null }));
    };
    if agent.carries_titles() {
        match &config.openai_api_key {
            Some(api_key) => {
                let extractor = OpenAiOracle::new(
                    &config.openai_base_url,
                    api_key,
                    &config.openai_model,
                    config.request_timeout_secs,
                )?;
                agent.refine_name(&extractor).await;
            }
            None => tracing::warn!(
                full_name = %agent.full_name,
                "OPENAI_API_KEY not set; using first and last token of the agent name"
            ),
        }
    }

    let addresses = match agent.record_id.as_deref() {
        Some(id) => Some(bizfile.agent_addresses(id).await?),
        None => None,
    };

    let mut output = json!({
        "llc": llc_name,
        "agent": serde_json::to_value(&agent)?,
        "addresses": serde_json::to_value(&addresses)?,
    });

    if search_agent {
        let mailing = addresses.as_ref().and_then(|a| a.mailing.as_ref());
        let principal = addresses.as_ref().and_then(|a| a.principal.as_ref());
        match (agent.name.full_name(), mailing) {
            (Some(name), Some(mailing)) => {
                let search = build_search(config, options)?;
                let acc = search
                    .search_by_name(
                        &name,
                        principal.map_or("", |p| p.street.as_str()),
                        &mailing.street,
                        mailing.city.as_deref().unwrap_or_default(),
                        mailing.state.as_deref().unwrap_or_default(),
                    )
                    .await;
                output["search"] = report(&acc, &search)?;
            }
            _ => tracing::warn!(llc_name, "agent has no usable name or mailing address; skipping search"),
        }
    }

    Ok(output)
}
