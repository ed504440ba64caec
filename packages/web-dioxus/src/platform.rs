//! Storage, lifecycle and timer backends for the current build target
//!
//! The browser build gates on `localStorage` and window events. The server
//! render never evaluates a guard, so it gets in-memory stand-ins.

use std::time::Duration;

use access_gate::{AccessGate, GateConfig, LifecycleEvents};

#[cfg(feature = "web")]
pub type PortalStorage = access_gate::BrowserStorage;
#[cfg(not(feature = "web"))]
pub type PortalStorage = access_gate::MemoryStorage;

#[cfg(feature = "web")]
pub fn gate(config: GateConfig) -> AccessGate<PortalStorage> {
    AccessGate::browser(config)
}

#[cfg(not(feature = "web"))]
pub fn gate(config: GateConfig) -> AccessGate<PortalStorage> {
    AccessGate::new(PortalStorage::new(), access_gate::SystemClock, config)
}

#[cfg(feature = "web")]
pub fn lifecycle() -> Box<dyn LifecycleEvents> {
    Box::new(access_gate::BrowserLifecycle)
}

#[cfg(not(feature = "web"))]
pub fn lifecycle() -> Box<dyn LifecycleEvents> {
    Box::new(access_gate::LifecycleBus::new())
}

/// Gate configuration. The browser has no process environment, so the web
/// build bakes values in at compile time.
#[cfg(target_arch = "wasm32")]
pub fn config() -> GateConfig {
    let defaults = GateConfig::default();
    GateConfig {
        api_url: option_env!("API_URL")
            .map(String::from)
            .unwrap_or(defaults.api_url.clone()),
        static_access_code: option_env!("STATIC_ACCESS_CODE").map(String::from),
        ..defaults
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn config() -> GateConfig {
    GateConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid gate configuration; using defaults");
        GateConfig::default()
    })
}

/// Wait out the post-success pending state
pub async fn pause(duration: Duration) {
    #[cfg(feature = "web")]
    gloo_timers::future::TimeoutFuture::new(duration.as_millis().min(u32::MAX as u128) as u32)
        .await;

    #[cfg(not(feature = "web"))]
    let _ = duration;
}
