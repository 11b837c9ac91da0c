//! Search entry points: walk the result pages for an address or a name,
//! match each page against the owner, and expand every match.

use std::collections::HashSet;
use std::sync::Arc;

use ownertrace_core::{AppConfig, CrawlAccumulator, OwnerIdentity, PhoneLabeling};

use crate::client::urls::{address_search_url, name_search_url, resolve_profile_url};
use crate::client::{FetchService, PageFetcher, ScrapingProxyClient};
use crate::error::ScraperError;
use crate::expansion::{ExpansionLimits, ProfileExpander};
use crate::extract::ExtractionStrategy;
use crate::matcher::{IdentityMatcher, MatchPolicy, MatchTarget};
use crate::notify::{LogNotifier, Notifier, SlackNotifier};
use crate::oracle::{DisabledOracle, OpenAiOracle, PhoneClassifier, SemanticOracle};
use crate::pagination::has_next_page;
use crate::phone::PhoneLabeler;
use crate::rate_limit::{PacingConfig, RateLimiter};

/// Per-search crawl behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Optional safety valve on the number of result pages walked.
    pub max_pages: Option<u32>,
    /// End the crawl after the first expanded match.
    pub stop_after_match: bool,
    pub extraction: ExtractionStrategy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            stop_after_match: false,
            extraction: ExtractionStrategy::StructuredData,
        }
    }
}

/// Finds owner contact data on the people-search site.
#[derive(Debug, Clone)]
pub struct OwnerSearch {
    fetcher: PageFetcher,
    address_matcher: IdentityMatcher,
    name_matcher: IdentityMatcher,
    expander: ProfileExpander,
    site_base_url: String,
    options: SearchOptions,
}

impl OwnerSearch {
    #[must_use]
    pub fn builder(site_base_url: &str, service: Arc<dyn FetchService>) -> OwnerSearchBuilder {
        OwnerSearchBuilder::new(site_base_url, service)
    }

    /// Production wiring from configuration. See
    /// [`OwnerSearchBuilder::from_config`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if an adapter cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(OwnerSearchBuilder::from_config(config)?.build())
    }

    /// Successful page fetches since creation or the last reset.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.fetcher.counter().get()
    }

    pub fn reset_request_count(&self) {
        self.fetcher.counter().reset();
    }

    /// Walks `{site}/address/...` result pages and matches by owner name or
    /// address. Never fails: any error yields an empty accumulator.
    pub async fn search_by_address(
        &self,
        address: &str,
        city: &str,
        state: &str,
        identity: &OwnerIdentity,
    ) -> CrawlAccumulator {
        let mut target = MatchTarget::for_identity(identity);
        let address = address.trim();
        if !address.is_empty() && !target.addresses.iter().any(|a| a == address) {
            target.addresses.insert(0, address.to_owned());
        }

        let result = self
            .crawl(&target, &self.address_matcher, |page| {
                address_search_url(&self.site_base_url, address, city, state, page)
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::error!(address, city, state, error = %e, "address search failed");
            CrawlAccumulator::default()
        })
    }

    /// Walks `{site}/people/...` result pages for `name` and confirms a result
    /// by its mailing (`address`) or property address. Never fails: any error
    /// yields an empty accumulator.
    pub async fn search_by_name(
        &self,
        name: &str,
        property_address: &str,
        address: &str,
        city: &str,
        state: &str,
    ) -> CrawlAccumulator {
        let target = MatchTarget::for_addresses([address, property_address]);

        let result = self
            .crawl(&target, &self.name_matcher, |page| {
                name_search_url(&self.site_base_url, name, city, state, page)
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::error!(name, city, state, error = %e, "name search failed");
            CrawlAccumulator::default()
        })
    }

    /// The pagination loop shared by both searches.
    async fn crawl<F>(
        &self,
        target: &MatchTarget,
        matcher: &IdentityMatcher,
        page_url: F,
    ) -> Result<CrawlAccumulator, ScraperError>
    where
        F: Fn(u32) -> String,
    {
        reqwest::Url::parse(&self.site_base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: self.site_base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut acc = CrawlAccumulator::new();
        let mut expanded: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        loop {
            let url = page_url(page);
            tracing::info!(page, url = %url, "crawling result page");

            let html = self.fetcher.fetch_document(&url).await;
            let records = self.options.extraction.extract(&html);
            let outcome = matcher.match_records(target, &records).await;

            if outcome.is_match {
                acc.mark_matched();
                tracing::info!(page, rule = ?outcome.rule, link = ?outcome.profile_link, "owner matched");

                match outcome.profile_link.as_deref() {
                    Some(link) => {
                        let profile_url = resolve_profile_url(&self.site_base_url, link);
                        if expanded.insert(profile_url.clone()) {
                            self.expander
                                .expand(&profile_url, &outcome.initial_phones, &mut acc)
                                .await;
                        } else {
                            tracing::debug!(profile_url = %profile_url, "profile already expanded this session");
                            self.expander
                                .absorb_phones(&outcome.initial_phones, &mut acc)
                                .await;
                        }
                    }
                    None => {
                        self.expander
                            .absorb_phones(&outcome.initial_phones, &mut acc)
                            .await;
                    }
                }

                if self.options.stop_after_match {
                    break;
                }
            }

            if !has_next_page(&html) {
                break;
            }
            if self.options.max_pages.is_some_and(|max| page >= max) {
                tracing::warn!(page, "page limit reached; stopping pagination");
                break;
            }
            page += 1;
        }

        tracing::info!(
            pages = page,
            matched = acc.matched,
            phones = acc.phones.len(),
            relatives = acc.relatives.len(),
            requests = self.request_count(),
            "search finished"
        );
        Ok(acc)
    }
}

/// Assembles an [`OwnerSearch`] from its collaborators.
///
/// Defaults: no pacing, no oracle (fail closed), log notifications,
/// per-number phone labeling, default [`ExpansionLimits`] and
/// [`SearchOptions`].
pub struct OwnerSearchBuilder {
    site_base_url: String,
    service: Arc<dyn FetchService>,
    pacing: PacingConfig,
    oracle: Arc<dyn SemanticOracle>,
    classifier: Arc<dyn PhoneClassifier>,
    notifier: Arc<dyn Notifier>,
    phone_labeling: PhoneLabeling,
    limits: ExpansionLimits,
    options: SearchOptions,
}

impl OwnerSearchBuilder {
    fn new(site_base_url: &str, service: Arc<dyn FetchService>) -> Self {
        Self {
            site_base_url: site_base_url.trim_end_matches('/').to_owned(),
            service,
            pacing: PacingConfig::disabled(),
            oracle: Arc::new(DisabledOracle),
            classifier: Arc::new(DisabledOracle),
            notifier: Arc::new(LogNotifier),
            phone_labeling: PhoneLabeling::default(),
            limits: ExpansionLimits::default(),
            options: SearchOptions::default(),
        }
    }

    /// Wires the production adapters from configuration: the scraping proxy,
    /// OpenAI (or a disabled oracle when no key is set), and Slack (or the log).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if an HTTP client cannot be constructed or the
    /// fetch base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let service = ScrapingProxyClient::new(
            &config.fetch_base_url,
            &config.fetch_api_key,
            config.fetch_render_js,
            config.request_timeout_secs,
            &config.user_agent,
        )?;

        let mut builder = Self::new(&config.site_base_url, Arc::new(service))
            .pacing(PacingConfig::from_millis(
                config.inter_request_delay_ms,
                config.failure_delay_ms,
                config.delay_jitter_ms,
            ))
            .phone_labeling(config.phone_labeling)
            .limits(ExpansionLimits {
                max_relatives_to_crawl: config.max_relatives_to_crawl,
                max_parallel: config.max_parallel,
            });

        if let Some(api_key) = &config.openai_api_key {
            let oracle = Arc::new(OpenAiOracle::new(
                &config.openai_base_url,
                api_key,
                &config.openai_model,
                config.request_timeout_secs,
            )?);
            builder = builder.oracle(oracle.clone()).classifier(oracle);
        } else {
            tracing::warn!("OPENAI_API_KEY not set; oracle matching disabled and phones labelled Unknown");
        }

        if let Some(webhook) = &config.slack_webhook_url {
            builder = builder.notifier(Arc::new(SlackNotifier::new(webhook)?));
        }

        Ok(builder)
    }

    #[must_use]
    pub fn pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn oracle(mut self, oracle: Arc<dyn SemanticOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    #[must_use]
    pub fn classifier(mut self, classifier: Arc<dyn PhoneClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn phone_labeling(mut self, phone_labeling: PhoneLabeling) -> Self {
        self.phone_labeling = phone_labeling;
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn build(self) -> OwnerSearch {
        let limiter = Arc::new(RateLimiter::new(self.pacing));
        let fetcher = PageFetcher::new(self.service, limiter, self.notifier);
        let labeler = PhoneLabeler::new(self.phone_labeling, self.classifier);
        let expander = ProfileExpander::new(
            fetcher.clone(),
            labeler,
            &self.site_base_url,
            self.limits,
        );
        OwnerSearch {
            address_matcher: IdentityMatcher::new(MatchPolicy::address_search(), self.oracle.clone()),
            name_matcher: IdentityMatcher::new(MatchPolicy::name_search(), self.oracle),
            fetcher,
            expander,
            site_base_url: self.site_base_url,
            options: self.options,
        }
    }
}
