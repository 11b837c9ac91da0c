//! Shared configuration and domain model for ownertrace.
//!
//! Holds the owner identity supplied by callers, the labelled phone model with
//! its merge-by-priority rules, and the per-search crawl accumulator returned
//! by the scraper engine.

pub mod accumulator;
pub mod app_config;
pub mod config;
pub mod contacts;
pub mod error;
pub mod identity;

pub use accumulator::{CrawlAccumulator, RelativeContact};
pub use app_config::{AppConfig, PhoneLabeling};
pub use config::{load_app_config, load_app_config_from_env};
pub use contacts::{LabeledPhone, PhoneLabel, PhoneSet};
pub use error::ConfigError;
pub use identity::{OwnerIdentity, PersonName};
