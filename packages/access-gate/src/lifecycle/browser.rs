use gloo_events::EventListener;
use tracing::warn;

use super::{LifecycleEvents, LifecycleSignal, SignalHandler, Subscription};

/// `window` event listeners (`beforeunload`, `popstate`)
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLifecycle;

impl LifecycleEvents for BrowserLifecycle {
    fn subscribe(&self, signal: LifecycleSignal, handler: SignalHandler) -> Subscription {
        let Some(window) = web_sys::window() else {
            warn!(signal = ?signal, "No window; lifecycle listener not registered");
            return Subscription::inert();
        };

        let listener = EventListener::new(&window, signal.dom_event(), move |_event| handler());

        // EventListener removes itself from the window when dropped.
        Subscription::new(move || drop(listener))
    }
}
