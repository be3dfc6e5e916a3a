use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error \"{error}\" (status {status}): {message}")]
    Api {
        status: u16,
        /// W3C error code string, e.g. `"no such element"`.
        error: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session response carried no session id")]
    MissingSessionId,

    #[error("response value is not a W3C element reference")]
    InvalidElementReference,
}

impl WebDriverError {
    /// True for the W3C `no such element` error, which callers treat as
    /// an ordinary absent-element answer rather than a failure.
    #[must_use]
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, WebDriverError::Api { error, .. } if error == "no such element")
    }
}
