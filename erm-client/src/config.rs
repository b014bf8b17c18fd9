//! Client configuration

/// Default collaborator base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/v1/erm-project";
/// Default actor recorded on receipts
pub const DEFAULT_ACTOR: &str = "user_01";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration for connecting to the procurement backend
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ERM_API_BASE_URL | http://localhost:3000/v1/erm-project | Backend base URL |
/// | ERM_ACTOR | user_01 | Actor sent as `receivedBy` |
/// | ERM_REQUEST_TIMEOUT_SECS | 30 | Request timeout |
/// | ERM_API_TOKEN | (unset) | Bearer token passed through as-is |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000/v1/erm-project")
    pub base_url: String,

    /// Actor identifier recorded on receive actions
    pub actor: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Bearer token, sent unchanged when present
    pub token: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            actor: DEFAULT_ACTOR.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty("ERM_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            actor: non_empty("ERM_ACTOR").unwrap_or_else(|| DEFAULT_ACTOR.into()),
            timeout: non_empty("ERM_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            token: non_empty("ERM_API_TOKEN"),
        }
    }

    /// Set the actor identifier
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::NetworkHttpClient> {
        crate::NetworkHttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
