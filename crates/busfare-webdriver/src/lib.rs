//! Minimal W3C WebDriver client for driving a headless Chrome through
//! chromedriver.
//!
//! Only the handful of commands the navigation state machines need are
//! implemented: session create/delete, navigate, find element(s), click,
//! send keys, read text/attributes, and synchronous script execution.
//! Everything is plain JSON over HTTP, so tests can stand the remote end
//! up with `wiremock`.

pub mod client;
pub mod error;
pub mod keys;

pub use client::{BrowserConfig, Element, Session, WebDriverClient};
pub use error::WebDriverError;
