/// How raw phone strings are turned into labelled numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneLabeling {
    /// Drop strings that are not ten digits, then classify each distinct
    /// number with its own oracle call.
    #[default]
    PerNumber,
    /// Send every candidate in one oracle request and trust the labelled
    /// lines it echoes back.
    Batch,
}

impl std::fmt::Display for PhoneLabeling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhoneLabeling::PerNumber => write!(f, "per_number"),
            PhoneLabeling::Batch => write!(f, "batch"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub fetch_base_url: String,
    pub fetch_api_key: String,
    pub fetch_render_js: bool,
    pub site_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub failure_delay_ms: u64,
    pub delay_jitter_ms: u64,
    pub max_parallel: usize,
    pub max_relatives_to_crawl: usize,
    pub phone_labeling: PhoneLabeling,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub slack_webhook_url: Option<String>,
    pub bizfile_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("fetch_base_url", &self.fetch_base_url)
            .field("fetch_api_key", &"[redacted]")
            .field("fetch_render_js", &self.fetch_render_js)
            .field("site_base_url", &self.site_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("failure_delay_ms", &self.failure_delay_ms)
            .field("delay_jitter_ms", &self.delay_jitter_ms)
            .field("max_parallel", &self.max_parallel)
            .field("max_relatives_to_crawl", &self.max_relatives_to_crawl)
            .field("phone_labeling", &self.phone_labeling)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field(
                "slack_webhook_url",
                &self.slack_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field("bizfile_base_url", &self.bizfile_base_url)
            .finish()
    }
}
