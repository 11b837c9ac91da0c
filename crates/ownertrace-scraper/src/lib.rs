//! Owner contact discovery on a people-search site.
//!
//! [`OwnerSearch`] walks result pages for an address or a name, decides which
//! scraped record is the owner ([`matcher`]), expands the matched profile into
//! phones, relatives, associates and emails ([`expansion`]), and returns a
//! [`CrawlAccumulator`](ownertrace_core::CrawlAccumulator).

pub mod client;
pub mod error;
pub mod expansion;
pub mod extract;
pub mod matcher;
pub mod notify;
pub mod oracle;
pub mod pagination;
pub mod phone;
pub mod rate_limit;
pub mod registry;
pub mod search;
pub mod types;

pub use client::{FetchService, PageFetcher, RequestCounter, ScrapingProxyClient};
pub use error::ScraperError;
pub use expansion::{ExpansionLimits, ProfileExpander};
pub use extract::ExtractionStrategy;
pub use matcher::{IdentityMatcher, MatchOutcome, MatchPolicy, MatchRule, MatchTarget};
pub use notify::{LogNotifier, Notifier, SlackNotifier};
pub use oracle::{DisabledOracle, NameExtractor, OpenAiOracle, PhoneClassifier, SemanticOracle};
pub use phone::PhoneLabeler;
pub use rate_limit::{PacingConfig, RateLimiter};
pub use registry::{AgentAddress, AgentAddresses, BizFileClient, BusinessAgent};
pub use search::{OwnerSearch, OwnerSearchBuilder, SearchOptions};
pub use types::{PersonLink, PostalAddress, ProfileDetails, ProfileRecord};
