use std::time::Duration;

/// Configuration for the Zendesk client
#[derive(Debug, Clone)]
pub struct ZendeskConfig {
    /// Account subdomain, i.e. the `acme` in `acme.zendesk.com`
    pub subdomain: String,
    /// Email address of the API user
    pub email: String,
    /// API token paired with the email address
    pub token: String,
    /// API version path segment, normally `v2`
    pub api_version: String,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Client-side request budget in requests per minute
    pub rate_limit: u32,
    /// Remaining-quota threshold below which requests wait for the reset
    pub quota_buffer: u32,
    /// How many times a 429 response is retried before giving up
    pub max_retries: u32,
    /// First backoff step for 429 retries without a Retry-After header
    pub backoff_base: Duration,
    /// Overrides the subdomain-derived base URL when set
    pub base_url: Option<String>,
}

impl Default for ZendeskConfig {
    fn default() -> Self {
        Self {
            subdomain: String::new(),
            email: String::new(),
            token: String::new(),
            api_version: "v2".to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: 700,
            quota_buffer: 10,
            max_retries: 3,
            backoff_base: Duration::from_millis(1000),
            base_url: None,
        }
    }
}

impl ZendeskConfig {
    /// Creates a configuration with the default limits for an account.
    ///
    /// The defaults match Zendesk's documented ceilings: 700 requests per
    /// minute, up to 3 retries on 429 responses with a 1 second initial
    /// backoff, and a 30 second HTTP timeout.
    pub fn new(
        subdomain: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            email: email.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_quota_buffer(mut self, quota_buffer: u32) -> Self {
        self.quota_buffer = quota_buffer;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Points the client at a different base URL, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Resolves the base URL all request paths are appended to.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.zendesk.com/api/{}",
                self.subdomain, self.api_version
            ),
        }
    }
}
