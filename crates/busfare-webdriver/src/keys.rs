//! W3C WebDriver key code points for `send_keys`.

pub const ENTER: &str = "\u{e007}";
pub const ESCAPE: &str = "\u{e00c}";
pub const ARROW_DOWN: &str = "\u{e015}";
