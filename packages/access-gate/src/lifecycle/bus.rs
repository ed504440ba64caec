use std::sync::{Arc, RwLock};

use super::{LifecycleEvents, LifecycleSignal, SignalHandler, Subscription};

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, LifecycleSignal, SignalHandler)>,
}

/// In-process lifecycle signal source
///
/// Used for server-side rendering, where no page lifecycle exists, and by tests
/// that simulate a tab close with [`LifecycleBus::emit`].
#[derive(Clone, Default)]
pub struct LifecycleBus {
    listeners: Arc<RwLock<Listeners>>,
}

impl LifecycleBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a signal. Returns how many handlers ran.
    pub fn emit(&self, signal: LifecycleSignal) -> usize {
        // Handlers run outside the lock so they may subscribe or unsubscribe.
        let handlers: Vec<SignalHandler> = match self.listeners.read() {
            Ok(listeners) => listeners
                .entries
                .iter()
                .filter(|(_, s, _)| *s == signal)
                .map(|(_, _, handler)| handler.clone())
                .collect(),
            Err(_) => return 0,
        };

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of registered listeners across all signals
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .map(|listeners| listeners.entries.len())
            .unwrap_or(0)
    }
}

impl LifecycleEvents for LifecycleBus {
    fn subscribe(&self, signal: LifecycleSignal, handler: SignalHandler) -> Subscription {
        let id = match self.listeners.write() {
            Ok(mut listeners) => {
                let id = listeners.next_id;
                listeners.next_id += 1;
                listeners.entries.push((id, signal, handler));
                id
            }
            Err(_) => return Subscription::inert(),
        };

        let listeners = self.listeners.clone();
        Subscription::new(move || {
            if let Ok(mut listeners) = listeners.write() {
                listeners.entries.retain(|(entry_id, _, _)| *entry_id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_only_reaches_matching_signal() {
        let bus = LifecycleBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let _subscription = bus.subscribe(
            LifecycleSignal::PageUnload,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(bus.emit(LifecycleSignal::HistoryNavigation), 0);
        assert_eq!(bus.emit(LifecycleSignal::PageUnload), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_unsubscribes() {
        let bus = LifecycleBus::new();

        let subscription = bus.subscribe(LifecycleSignal::PageUnload, Arc::new(|| {}));
        assert_eq!(bus.listener_count(), 1);

        subscription.cancel();
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.emit(LifecycleSignal::PageUnload), 0);
    }
}
