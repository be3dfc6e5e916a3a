use crate::app_config::{AppConfig, Environment};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function, decoupled from the real environment so tests can drive it
/// with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("BUSFARE_ENV", "development"));
    let bind_addr = parse_addr("BUSFARE_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("BUSFARE_LOG_LEVEL", "info");

    let webdriver_url = or_default("BUSFARE_WEBDRIVER_URL", "http://127.0.0.1:9515");
    let webdriver_timeout_secs = parse_u64("BUSFARE_WEBDRIVER_TIMEOUT_SECS", "90")?;

    let browser_headless = parse_bool("BUSFARE_BROWSER_HEADLESS", "true")?;
    let browser_user_agent = or_default(
        "BUSFARE_BROWSER_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    );
    let browser_window_width = parse_u32("BUSFARE_BROWSER_WINDOW_WIDTH", "1280")?;
    let browser_window_height = parse_u32("BUSFARE_BROWSER_WINDOW_HEIGHT", "800")?;

    let suggestion_settle_ms = parse_u64("BUSFARE_SUGGESTION_SETTLE_MS", "1000")?;
    let calendar_transition_ms = parse_u64("BUSFARE_CALENDAR_TRANSITION_MS", "500")?;
    let submit_timeout_secs = parse_u64("BUSFARE_SUBMIT_TIMEOUT_SECS", "60")?;
    let submit_poll_ms = parse_u64("BUSFARE_SUBMIT_POLL_MS", "500")?;
    let results_settle_ms = parse_u64("BUSFARE_RESULTS_SETTLE_MS", "5000")?;
    let extract_wait_secs = parse_u64("BUSFARE_EXTRACT_WAIT_SECS", "10")?;

    let default_origin = or_default("BUSFARE_DEFAULT_ORIGIN", "khed");
    let default_destination = or_default("BUSFARE_DEFAULT_DESTINATION", "Pune");
    let default_travel_date = or_default("BUSFARE_DEFAULT_TRAVEL_DATE", "15 February 2026");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        webdriver_url,
        webdriver_timeout_secs,
        browser_headless,
        browser_user_agent,
        browser_window_width,
        browser_window_height,
        suggestion_settle_ms,
        calendar_transition_ms,
        submit_timeout_secs,
        submit_poll_ms,
        results_settle_ms,
        extract_wait_secs,
        default_origin,
        default_destination,
        default_travel_date,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(parse_environment("production"), Environment::Production);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("development"), Environment::Development);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.webdriver_url, "http://127.0.0.1:9515");
        assert!(cfg.browser_headless);
        assert_eq!(cfg.submit_timeout_secs, 60);
        assert_eq!(cfg.default_origin, "khed");
        assert_eq!(cfg.default_destination, "Pune");
        assert_eq!(cfg.default_travel_date, "15 February 2026");
    }

    #[test]
    fn build_app_config_overrides_apply() {
        let mut map = HashMap::new();
        map.insert("BUSFARE_WEBDRIVER_URL", "http://chromedriver:4444");
        map.insert("BUSFARE_BROWSER_HEADLESS", "false");
        map.insert("BUSFARE_SUBMIT_TIMEOUT_SECS", "30");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.webdriver_url, "http://chromedriver:4444");
        assert!(!cfg.browser_headless);
        assert_eq!(cfg.submit_timeout_secs, 30);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = HashMap::new();
        map.insert("BUSFARE_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUSFARE_BIND_ADDR"),
            "expected InvalidEnvVar(BUSFARE_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_headless_flag() {
        let mut map = HashMap::new();
        map.insert("BUSFARE_BROWSER_HEADLESS", "yes");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUSFARE_BROWSER_HEADLESS"),
            "expected InvalidEnvVar(BUSFARE_BROWSER_HEADLESS), got: {result:?}"
        );
    }
}
