//! Lifecycle monitor
//!
//! Collapses the temporary capability when the page is about to unload or the
//! user walks through history, forcing a fresh code on return. The session is
//! never touched: closing a tab must not log anyone out.

mod bus;

#[cfg(feature = "web")]
mod browser;

pub use bus::LifecycleBus;

#[cfg(feature = "web")]
pub use browser::BrowserLifecycle;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::capability::{CapabilityRepository, CapabilityType};

/// Page lifecycle signals the monitor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleSignal {
    /// The page is about to unload (tab close, refresh)
    PageUnload,
    /// Back/forward navigation through history
    HistoryNavigation,
}

impl LifecycleSignal {
    /// DOM event name on `window`
    pub fn dom_event(&self) -> &'static str {
        match self {
            LifecycleSignal::PageUnload => "beforeunload",
            LifecycleSignal::HistoryNavigation => "popstate",
        }
    }
}

pub type SignalHandler = Arc<dyn Fn() + Send + Sync>;

/// Source of lifecycle signals
pub trait LifecycleEvents {
    /// Register a handler. It stays registered until the returned
    /// [`Subscription`] is dropped or cancelled.
    fn subscribe(&self, signal: LifecycleSignal, handler: SignalHandler) -> Subscription;
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription removes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to remove
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Revokes the capability on unload and history navigation while attached
#[derive(Debug)]
pub struct LifecycleMonitor {
    required: CapabilityType,
    subscriptions: Vec<Subscription>,
}

impl LifecycleMonitor {
    /// Subscribe both listeners for a gated view.
    ///
    /// Returns `None` for capability types that survive a refresh.
    pub fn attach<C>(
        events: &dyn LifecycleEvents,
        required: CapabilityType,
        capabilities: C,
    ) -> Option<Self>
    where
        C: CapabilityRepository + Send + Sync + 'static,
    {
        if !required.revoked_on_exit() {
            return None;
        }

        let capabilities = Arc::new(capabilities);
        let subscriptions = [LifecycleSignal::PageUnload, LifecycleSignal::HistoryNavigation]
            .into_iter()
            .map(|signal| {
                let capabilities = capabilities.clone();
                events.subscribe(
                    signal,
                    Arc::new(move || {
                        debug!(signal = ?signal, "Lifecycle signal; revoking access capability");
                        capabilities.clear();
                    }),
                )
            })
            .collect();

        debug!(required = %required, "Lifecycle monitor attached");
        Some(Self {
            required,
            subscriptions,
        })
    }

    pub fn required(&self) -> CapabilityType {
        self.required
    }

    /// Remove both listeners
    pub fn detach(self) {
        debug!(required = %self.required, "Lifecycle monitor detached");
        for subscription in self.subscriptions {
            subscription.cancel();
        }
    }
}
