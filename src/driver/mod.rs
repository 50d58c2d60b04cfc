//! The browser boundary.
//!
//! Page objects talk to a [`Driver`], never to `eoka` directly. The real
//! implementation lives in [`page`]; tests use a scripted in-memory storefront.

#[cfg(test)]
pub(crate) mod fake;
mod page;

use crate::Result;
use std::borrow::Cow;
use std::fmt;

/// One way of finding an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
    /// Element whose trimmed text equals this, case-insensitively. The innermost
    /// such element wins.
    Text(Cow<'static, str>),
}

impl Selector {
    pub const fn css(css: &'static str) -> Self {
        Self::Css(Cow::Borrowed(css))
    }

    pub const fn xpath(xpath: &'static str) -> Self {
        Self::XPath(Cow::Borrowed(xpath))
    }

    pub const fn text(text: &'static str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }

    /// The `n`th (0-based) element this selector matches.
    pub fn nth(&self, n: usize) -> Locator {
        Locator {
            selector: self.clone(),
            nth: n,
        }
    }

    pub fn first(&self) -> Locator {
        self.nth(0)
    }

    fn parts(&self) -> (&'static str, &str) {
        match self {
            Self::Css(s) => ("css", s),
            Self::XPath(s) => ("xpath", s),
            Self::Text(s) => ("text", s),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, value) = self.parts();
        write!(f, "{}={}", kind, value)
    }
}

/// A selector narrowed to a single match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub selector: Selector,
    pub nth: usize,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nth == 0 {
            write!(f, "{}", self.selector)
        } else {
            write!(f, "{} >> nth={}", self.selector, self.nth)
        }
    }
}

/// What the page objects need from a browser tab.
///
/// Element operations act on whatever the locator matches at call time and
/// fail with a browser error when nothing does; waiting is the caller's job.
#[allow(async_fn_in_trait)]
pub trait Driver {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn reload(&self) -> Result<()>;
    async fn url(&self) -> Result<String>;
    async fn title(&self) -> Result<String>;
    /// Visible text of the whole document.
    async fn body_text(&self) -> Result<String>;

    /// Number of attached matches, visible or not.
    async fn count(&self, selector: &Selector) -> Result<usize>;
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Pointer click at the element's center.
    async fn click(&self, locator: &Locator) -> Result<()>;
    /// `el.click()` in the page, bypassing hit testing.
    async fn dispatch_click(&self, locator: &Locator) -> Result<()>;
    async fn hover(&self, locator: &Locator) -> Result<()>;

    async fn clear(&self, locator: &Locator) -> Result<()>;
    /// Type at the end of the current value.
    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()>;
    async fn text_of(&self, locator: &Locator) -> Result<String>;
    /// Current value of an input.
    async fn value_of(&self, locator: &Locator) -> Result<String>;
    /// Choose the option of a native `<select>` whose text is `label`.
    /// `Ok(false)` when no option has that text.
    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<bool>;

    async fn press_key(&self, key: &str) -> Result<()>;
    /// PNG of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
