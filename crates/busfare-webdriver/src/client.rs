use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::WebDriverError;

/// W3C element identifier key in element reference objects.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Per-session browser launch configuration.
///
/// Passed explicitly into every session rather than mutating a
/// process-wide default, so concurrent scrape tasks stay independently
/// configurable.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Additional Chrome switches appended after the standard set.
    pub extra_args: Vec<String>,
}

impl BrowserConfig {
    /// Chrome switches for this configuration. The automation-controlled
    /// and sandbox flags match what the target sites tolerate in
    /// containerized headless runs.
    #[must_use]
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-sandbox".to_owned(),
            "--disable-setuid-sandbox".to_owned(),
            "--disable-dev-shm-usage".to_owned(),
            "--disable-gpu".to_owned(),
            "--disable-blink-features=AutomationControlled".to_owned(),
            format!("--user-agent={}", self.user_agent),
            format!("--window-size={},{}", self.window_width, self.window_height),
        ];
        if self.headless {
            args.push("--headless=new".to_owned());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// HTTP client for a WebDriver remote end (chromedriver).
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
}

impl WebDriverClient {
    /// Creates a client with the given base URL and per-call timeout.
    ///
    /// The timeout bounds every individual WebDriver command, including
    /// navigation, so it must exceed the slowest expected page load.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, WebDriverError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Starts a new browser session with the given launch configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError::Api`] if the remote end rejects the
    /// session request, [`WebDriverError::MissingSessionId`] if the
    /// response carries no session id.
    pub async fn new_session(&self, config: &BrowserConfig) -> Result<Session, WebDriverError> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": config.chrome_args() }
                }
            }
        });

        let value: Value = send(
            &self.http,
            reqwest::Method::POST,
            &format!("{}/session", self.base_url),
            Some(&body),
            "new session",
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(WebDriverError::MissingSessionId)?
            .to_owned();

        tracing::debug!(session_id, "webdriver session created");
        Ok(Session {
            http: self.http.clone(),
            url: format!("{}/session/{}", self.base_url, session_id),
            session_id,
        })
    }
}

/// One live browser session. Cheap to clone; all clones drive the same
/// remote session.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    /// `<base>/session/<id>`, the prefix of every command for this session.
    url: String,
    session_id: String,
}

impl Session {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Navigates the session to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on navigation timeout or transport failure.
    pub async fn goto(&self, url: &str) -> Result<(), WebDriverError> {
        let _: Value = self.send_cmd("/url", Some(&json!({ "url": url }))).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`WebDriverError`] on transport or protocol failure.
    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        self.get_cmd("/url").await
    }

    /// Finds the first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns a `no such element` [`WebDriverError::Api`] when nothing
    /// matches (check with [`WebDriverError::is_no_such_element`]).
    pub async fn find(&self, css: &str) -> Result<Element, WebDriverError> {
        let value: Value = self
            .send_cmd("/element", Some(&locator_body(css)))
            .await?;
        self.element_from_value(&value)
    }

    /// Finds all elements matching a CSS selector; empty when none match.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on transport or protocol failure.
    pub async fn find_all(&self, css: &str) -> Result<Vec<Element>, WebDriverError> {
        let value: Value = self
            .send_cmd("/elements", Some(&locator_body(css)))
            .await?;
        value
            .as_array()
            .map(|refs| {
                refs.iter()
                    .map(|v| self.element_from_value(v))
                    .collect::<Result<Vec<_>, _>>()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// The element that currently has focus.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on transport or protocol failure.
    pub async fn active_element(&self) -> Result<Element, WebDriverError> {
        let value: Value = self.get_cmd("/element/active").await?;
        self.element_from_value(&value)
    }

    /// Executes synchronous JavaScript in the page.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on script or transport failure.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, WebDriverError> {
        self.send_cmd("/execute/sync", Some(&json!({ "script": script, "args": args })))
            .await
    }

    /// Ends the session and closes the browser.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] if the remote end fails the delete;
    /// callers tearing down a scrape swallow and log this.
    pub async fn close(&self) -> Result<(), WebDriverError> {
        let _: Value = send(
            &self.http,
            reqwest::Method::DELETE,
            &self.url,
            None,
            "delete session",
        )
        .await?;
        tracing::debug!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }

    fn element_from_value(&self, value: &Value) -> Result<Element, WebDriverError> {
        let element_id = value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .ok_or(WebDriverError::InvalidElementReference)?
            .to_owned();
        Ok(Element {
            session: self.clone(),
            element_id,
        })
    }

    async fn send_cmd<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, WebDriverError> {
        send(
            &self.http,
            reqwest::Method::POST,
            &format!("{}{}", self.url, path),
            body,
            path,
        )
        .await
    }

    async fn get_cmd<T: DeserializeOwned>(&self, path: &str) -> Result<T, WebDriverError> {
        send(
            &self.http,
            reqwest::Method::GET,
            &format!("{}{}", self.url, path),
            None,
            path,
        )
        .await
    }
}

/// A handle to one DOM element within a session.
#[derive(Debug, Clone)]
pub struct Element {
    session: Session,
    element_id: String,
}

impl Element {
    /// # Errors
    ///
    /// Returns [`WebDriverError`] if the element is stale or not
    /// interactable.
    pub async fn click(&self) -> Result<(), WebDriverError> {
        let _: Value = self.session.send_cmd(&self.path("/click"), Some(&json!({}))).await?;
        Ok(())
    }

    /// Types text (or WebDriver key code points) into the element.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] if the element is stale or not
    /// interactable.
    pub async fn send_keys(&self, text: &str) -> Result<(), WebDriverError> {
        let _: Value = self
            .session
            .send_cmd(&self.path("/value"), Some(&json!({ "text": text })))
            .await?;
        Ok(())
    }

    /// The element's rendered text.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on transport or protocol failure.
    pub async fn text(&self) -> Result<String, WebDriverError> {
        self.session.get_cmd(&self.path("/text")).await
    }

    /// An attribute value, `None` when the attribute is absent.
    ///
    /// # Errors
    ///
    /// Returns [`WebDriverError`] on transport or protocol failure.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>, WebDriverError> {
        self.session
            .get_cmd(&self.path(&format!("/attribute/{name}")))
            .await
    }

    /// Finds the first descendant matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns a `no such element` [`WebDriverError::Api`] when nothing
    /// matches.
    pub async fn find(&self, css: &str) -> Result<Element, WebDriverError> {
        let value: Value = self
            .session
            .send_cmd(&self.path("/element"), Some(&locator_body(css)))
            .await?;
        self.session.element_from_value(&value)
    }

    fn path(&self, suffix: &str) -> String {
        format!("/element/{}{}", self.element_id, suffix)
    }
}

fn locator_body(css: &str) -> Value {
    json!({ "using": "css selector", "value": css })
}

/// Issues one WebDriver command and unwraps the `{"value": ...}` envelope.
///
/// Non-2xx responses are parsed into [`WebDriverError::Api`] using the W3C
/// error body (`value.error` / `value.message`).
async fn send<T: DeserializeOwned>(
    http: &Client,
    method: reqwest::Method,
    url: &str,
    body: Option<&Value>,
    context: &str,
) -> Result<T, WebDriverError> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let (error, message) = parse_error_body(&text);
        return Err(WebDriverError::Api {
            status: status.as_u16(),
            error,
            message,
        });
    }

    let envelope: Value =
        serde_json::from_str(&text).map_err(|e| WebDriverError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;
    let value = envelope.get("value").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| WebDriverError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

fn parse_error_body(text: &str) -> (String, String) {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    let value = parsed.as_ref().and_then(|v| v.get("value"));
    let error = value
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_owned();
    let message = value
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(text)
        .to_owned();
    (error, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_args_include_user_agent_and_window_size() {
        let config = BrowserConfig {
            headless: true,
            user_agent: "test-agent".to_owned(),
            window_width: 1280,
            window_height: 800,
            extra_args: vec!["--disable-http2".to_owned()],
        };
        let args = config.chrome_args();
        assert!(args.contains(&"--user-agent=test-agent".to_owned()));
        assert!(args.contains(&"--window-size=1280,800".to_owned()));
        assert!(args.contains(&"--headless=new".to_owned()));
        assert!(args.contains(&"--disable-http2".to_owned()));
    }

    #[test]
    fn chrome_args_omit_headless_when_disabled() {
        let config = BrowserConfig {
            headless: false,
            user_agent: "ua".to_owned(),
            window_width: 800,
            window_height: 600,
            extra_args: Vec::new(),
        };
        assert!(!config.chrome_args().iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn parse_error_body_reads_w3c_shape() {
        let body = r#"{"value":{"error":"no such element","message":"no match","stacktrace":""}}"#;
        let (error, message) = parse_error_body(body);
        assert_eq!(error, "no such element");
        assert_eq!(message, "no match");
    }

    #[test]
    fn parse_error_body_falls_back_to_raw_text() {
        let (error, message) = parse_error_body("gateway exploded");
        assert_eq!(error, "unknown error");
        assert_eq!(message, "gateway exploded");
    }
}
