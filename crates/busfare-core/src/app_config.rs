use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process configuration, loaded from environment variables.
///
/// Browser settings live here (not as process-wide mutable defaults) so
/// every scrape task receives an explicit, independently configurable
/// session setup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,

    /// Base URL of the WebDriver endpoint (chromedriver).
    pub webdriver_url: String,
    /// HTTP timeout for individual WebDriver calls. Must comfortably
    /// exceed the slowest page-load wait the state machine performs.
    pub webdriver_timeout_secs: u64,

    pub browser_headless: bool,
    pub browser_user_agent: String,
    pub browser_window_width: u32,
    pub browser_window_height: u32,

    /// Bounded wait for an autocomplete suggestion list to settle.
    pub suggestion_settle_ms: u64,
    /// Pause after advancing the calendar one month, for the transition.
    pub calendar_transition_ms: u64,
    /// Upper bound on waiting for navigation to the results route.
    pub submit_timeout_secs: u64,
    /// Polling interval while waiting for the results route.
    pub submit_poll_ms: u64,
    /// Settle time on the results page before empty-check and extraction.
    pub results_settle_ms: u64,
    /// Bounded wait for result cards to appear before extraction.
    pub extract_wait_secs: u64,

    /// Fallback query values applied when a request omits fields.
    pub default_origin: String,
    pub default_destination: String,
    pub default_travel_date: String,
}
