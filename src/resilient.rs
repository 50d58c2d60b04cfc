//! Primary attempt plus an ordered, bounded list of fallbacks.
//!
//! Each strategy runs at most once. Failures before the last strategy are
//! logged and dropped; if every strategy fails, the caller gets one
//! [`Error::FallbacksExhausted`] carrying the last cause.
//!
//! ```rust,ignore
//! let hit = ResilientAction::new("open login", "pointer", || ui.click(&login).boxed_local())
//!     .fallback("dismiss-overlays", || async {
//!         ui.dismiss_overlays(OVERLAY_CLOSERS).await;
//!         ui.click(&login).await
//!     }.boxed_local())
//!     .perform()
//!     .await?;
//! ```

use crate::driver::{Driver, Selector};
use crate::interact::{ElementRef, InteractionResult, Interactor};
use crate::{Error, Result};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tracing::{debug, info, warn};

type Attempt<'a, T> = Box<dyn FnMut() -> LocalBoxFuture<'a, Result<T>> + 'a>;

/// The value of the strategy that succeeded.
#[derive(Debug)]
pub struct Performed<T> {
    pub value: T,
    /// 0 for the primary, then fallbacks in order.
    pub strategy: usize,
    pub name: &'static str,
}

impl<T> Performed<T> {
    pub fn recovered(&self) -> bool {
        self.strategy > 0
    }
}

pub struct ResilientAction<'a, T> {
    action: String,
    primary: (&'static str, Attempt<'a, T>),
    fallbacks: Vec<(&'static str, Attempt<'a, T>)>,
}

impl<'a, T> ResilientAction<'a, T> {
    pub fn new<F>(action: impl Into<String>, name: &'static str, primary: F) -> Self
    where
        F: FnMut() -> LocalBoxFuture<'a, Result<T>> + 'a,
    {
        Self {
            action: action.into(),
            primary: (name, Box::new(primary)),
            fallbacks: Vec::new(),
        }
    }

    pub fn fallback<F>(mut self, name: &'static str, attempt: F) -> Self
    where
        F: FnMut() -> LocalBoxFuture<'a, Result<T>> + 'a,
    {
        self.fallbacks.push((name, Box::new(attempt)));
        self
    }

    pub fn attempts(&self) -> usize {
        1 + self.fallbacks.len()
    }

    pub async fn perform(self) -> Result<Performed<T>> {
        let attempts = self.attempts();
        let Self {
            action,
            primary: (primary_name, mut primary),
            fallbacks,
        } = self;

        let mut last = match primary().await {
            Ok(value) => {
                return Ok(Performed {
                    value,
                    strategy: 0,
                    name: primary_name,
                })
            }
            Err(e) => (primary_name, e),
        };

        for (i, (name, mut attempt)) in fallbacks.into_iter().enumerate() {
            warn!("{}: '{}' failed ({}), trying '{}'", action, last.0, last.1, name);
            match attempt().await {
                Ok(value) => {
                    info!("{}: recovered via '{}'", action, name);
                    return Ok(Performed {
                        value,
                        strategy: i + 1,
                        name,
                    });
                }
                Err(e) => last = (name, e),
            }
        }

        debug!("{}: {} strategies exhausted", action, attempts);
        Err(Error::FallbacksExhausted {
            action,
            strategy: last.0.to_string(),
            attempts,
            source: Box::new(last.1),
        })
    }
}

/// Click with the standard recovery ladder: pointer click, then dismiss
/// overlays and retry, then Escape and retry, then a DOM `el.click()`.
pub fn click<'a, D: Driver + 'a>(
    ui: Interactor<'a, D>,
    el: &'a ElementRef,
    closers: &'a [Selector],
) -> ResilientAction<'a, InteractionResult> {
    ResilientAction::new(format!("click {}", el.name()), "pointer", move || {
        async move { ui.click(el).await }.boxed_local()
    })
    .fallback("dismiss-overlays", move || {
        async move {
            ui.dismiss_overlays(closers).await;
            ui.click(el).await
        }
        .boxed_local()
    })
    .fallback("escape", move || {
        async move {
            ui.press("Escape").await?;
            ui.click(el).await
        }
        .boxed_local()
    })
    .fallback("dom-click", move || {
        async move { ui.dispatch_click(el).await }.boxed_local()
    })
}
