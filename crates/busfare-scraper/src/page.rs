//! Browser page capability layer.
//!
//! The state machine only talks to [`Page`] and [`PageNode`], never to the
//! WebDriver wire types directly, so site plans stay testable against an
//! in-memory fake and the production driver stays swappable.
//!
//! Absence is an answer, not an error: presence-style reads map the W3C
//! `no such element` response to `Ok(false)` / `Ok(None)`.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use busfare_webdriver::{Element, Session, WebDriverError};

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Driver(#[from] WebDriverError),

    #[error("{0}")]
    Other(String),
}

/// A handle to one repeated card/list-item node on a results page.
#[async_trait]
pub trait PageNode: Send + Sync {
    /// The node's own rendered text.
    async fn text(&self) -> Result<String, PageError>;

    /// Text of the first descendant matching `css`, `None` when absent.
    async fn text_of(&self, css: &str) -> Result<Option<String>, PageError>;

    /// Attribute of the node itself, `None` when absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>, PageError>;

    async fn click(&self) -> Result<(), PageError>;
}

/// Capabilities the navigation state machine needs from a live page.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;

    /// Clicks the first match; error when the element is missing.
    async fn click(&self, css: &str) -> Result<(), PageError>;

    /// Clicks the first match if present; `Ok(false)` when absent.
    async fn try_click(&self, css: &str) -> Result<bool, PageError>;

    /// Focuses the first match and types `text` into it.
    async fn type_text(&self, css: &str, text: &str) -> Result<(), PageError>;

    /// Sends a key (WebDriver code point) to the focused element.
    async fn press_key(&self, key: &str) -> Result<(), PageError>;

    /// Text of the first match, `None` when absent.
    async fn text_of(&self, css: &str) -> Result<Option<String>, PageError>;

    async fn exists(&self, css: &str) -> Result<bool, PageError>;

    /// All matches, in document order; empty when none match.
    async fn nodes(&self, css: &str) -> Result<Vec<Box<dyn PageNode>>, PageError>;

    async fn scroll_by(&self, y: i64) -> Result<(), PageError>;

    /// Removes every match from the DOM (overlay/modal cleanup).
    async fn remove_nodes(&self, css: &str) -> Result<(), PageError>;

    /// Fixed artificial delay; fakes may return immediately.
    async fn sleep(&self, ms: u64);

    /// Releases the underlying browser session.
    async fn close(&self) -> Result<(), PageError>;
}

/// Production [`Page`] over a WebDriver session.
pub struct WebDriverPage {
    session: Session,
}

impl WebDriverPage {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    async fn find_optional(&self, css: &str) -> Result<Option<Element>, PageError> {
        match self.session.find(css).await {
            Ok(element) => Ok(Some(element)),
            Err(err) if err.is_no_such_element() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        Ok(self.session.goto(url).await?)
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.session.current_url().await?)
    }

    async fn click(&self, css: &str) -> Result<(), PageError> {
        Ok(self.session.find(css).await?.click().await?)
    }

    async fn try_click(&self, css: &str) -> Result<bool, PageError> {
        match self.find_optional(css).await? {
            Some(element) => {
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn type_text(&self, css: &str, text: &str) -> Result<(), PageError> {
        let element = self.session.find(css).await?;
        element.click().await?;
        Ok(element.send_keys(text).await?)
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        Ok(self.session.active_element().await?.send_keys(key).await?)
    }

    async fn text_of(&self, css: &str) -> Result<Option<String>, PageError> {
        match self.find_optional(css).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, css: &str) -> Result<bool, PageError> {
        Ok(self.find_optional(css).await?.is_some())
    }

    async fn nodes(&self, css: &str) -> Result<Vec<Box<dyn PageNode>>, PageError> {
        let elements = self.session.find_all(css).await?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(WebDriverNode { element }) as Box<dyn PageNode>)
            .collect())
    }

    async fn scroll_by(&self, y: i64) -> Result<(), PageError> {
        self.session
            .execute("window.scrollBy(0, arguments[0]);", vec![json!(y)])
            .await?;
        Ok(())
    }

    async fn remove_nodes(&self, css: &str) -> Result<(), PageError> {
        self.session
            .execute(
                "document.querySelectorAll(arguments[0]).forEach((el) => el.remove());",
                vec![json!(css)],
            )
            .await?;
        Ok(())
    }

    async fn sleep(&self, ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }

    async fn close(&self) -> Result<(), PageError> {
        Ok(self.session.close().await?)
    }
}

struct WebDriverNode {
    element: Element,
}

#[async_trait]
impl PageNode for WebDriverNode {
    async fn text(&self) -> Result<String, PageError> {
        Ok(self.element.text().await?)
    }

    async fn text_of(&self, css: &str) -> Result<Option<String>, PageError> {
        match self.element.find(css).await {
            Ok(child) => Ok(Some(child.text().await?)),
            Err(err) if err.is_no_such_element() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, PageError> {
        Ok(self.element.attribute(name).await?)
    }

    async fn click(&self) -> Result<(), PageError> {
        Ok(self.element.click().await?)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory page for state-machine tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{Page, PageError, PageNode};

    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeCard {
        pub fields: HashMap<String, String>,
        pub attrs: HashMap<String, String>,
        pub text: String,
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeState {
        pub url: String,
        /// Static selector -> text answers.
        pub texts: HashMap<String, String>,
        /// Month header shown after N advance clicks (last entry repeats).
        pub headers: Vec<String>,
        pub header_css: String,
        pub advance_css: String,
        pub advances: usize,
        /// Clicking a selector moves the page to a new URL (submit).
        pub url_on_click: HashMap<String, String>,
        /// Selectors that `exists`/`try_click` treat as present.
        pub present: HashSet<String>,
        pub cards_css: String,
        pub cards: Vec<FakeCard>,
        pub keys_pressed: Vec<String>,
        pub typed: Vec<(String, String)>,
        pub clicked: Vec<String>,
        pub removed: Vec<String>,
        pub closed: bool,
        pub fail_goto: bool,
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakePage {
        pub state: Mutex<FakeState>,
    }

    impl FakePage {
        pub fn with_state(state: FakeState) -> Self {
            Self {
                state: Mutex::new(state),
            }
        }

        pub fn closed(&self) -> bool {
            self.state.lock().unwrap().closed
        }
    }

    #[async_trait]
    impl Page for FakePage {
        async fn goto(&self, url: &str) -> Result<(), PageError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_goto {
                return Err(PageError::Other("net::ERR_CONNECTION_REFUSED".into()));
            }
            state.url = url.to_owned();
            Ok(())
        }

        async fn current_url(&self) -> Result<String, PageError> {
            Ok(self.state.lock().unwrap().url.clone())
        }

        async fn click(&self, css: &str) -> Result<(), PageError> {
            let mut state = self.state.lock().unwrap();
            state.clicked.push(css.to_owned());
            if css == state.advance_css {
                state.advances += 1;
            }
            if let Some(next) = state.url_on_click.get(css).cloned() {
                state.url = next;
            }
            Ok(())
        }

        async fn try_click(&self, css: &str) -> Result<bool, PageError> {
            let present = self.state.lock().unwrap().present.contains(css);
            if present {
                self.click(css).await?;
            }
            Ok(present)
        }

        async fn type_text(&self, css: &str, text: &str) -> Result<(), PageError> {
            self.state
                .lock()
                .unwrap()
                .typed
                .push((css.to_owned(), text.to_owned()));
            Ok(())
        }

        async fn press_key(&self, key: &str) -> Result<(), PageError> {
            self.state.lock().unwrap().keys_pressed.push(key.to_owned());
            Ok(())
        }

        async fn text_of(&self, css: &str) -> Result<Option<String>, PageError> {
            let state = self.state.lock().unwrap();
            if css == state.header_css && !state.headers.is_empty() {
                let idx = state.advances.min(state.headers.len() - 1);
                return Ok(Some(state.headers[idx].clone()));
            }
            Ok(state.texts.get(css).cloned())
        }

        async fn exists(&self, css: &str) -> Result<bool, PageError> {
            let state = self.state.lock().unwrap();
            Ok(state.present.contains(css) || state.texts.contains_key(css))
        }

        async fn nodes(&self, css: &str) -> Result<Vec<Box<dyn PageNode>>, PageError> {
            let state = self.state.lock().unwrap();
            if css == state.cards_css {
                Ok(state
                    .cards
                    .iter()
                    .cloned()
                    .map(|card| Box::new(FakeNode { card }) as Box<dyn PageNode>)
                    .collect())
            } else {
                Ok(Vec::new())
            }
        }

        async fn scroll_by(&self, _y: i64) -> Result<(), PageError> {
            Ok(())
        }

        async fn remove_nodes(&self, css: &str) -> Result<(), PageError> {
            self.state.lock().unwrap().removed.push(css.to_owned());
            Ok(())
        }

        async fn sleep(&self, _ms: u64) {}

        async fn close(&self) -> Result<(), PageError> {
            self.state.lock().unwrap().closed = true;
            Ok(())
        }
    }

    struct FakeNode {
        card: FakeCard,
    }

    #[async_trait]
    impl PageNode for FakeNode {
        async fn text(&self) -> Result<String, PageError> {
            Ok(self.card.text.clone())
        }

        async fn text_of(&self, css: &str) -> Result<Option<String>, PageError> {
            Ok(self.card.fields.get(css).cloned())
        }

        async fn attribute(&self, name: &str) -> Result<Option<String>, PageError> {
            Ok(self.card.attrs.get(name).cloned())
        }

        async fn click(&self) -> Result<(), PageError> {
            Ok(())
        }
    }
}
