//! Test harness wiring an access gate to in-memory storage, a manual clock
//! and an in-process lifecycle bus.

use access_gate::{AccessGate, GateConfig, LifecycleBus, ManualClock, MemoryStorage};
use chrono::{TimeZone, Utc};
use test_context::AsyncTestContext;

pub struct GateHarness {
    pub gate: AccessGate<MemoryStorage>,
    pub storage: MemoryStorage,
    pub clock: ManualClock,
    pub lifecycle: LifecycleBus,
}

impl AsyncTestContext for GateHarness {
    async fn setup() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        Self::with_config(GateConfig {
            static_access_code: Some("ASDFGH".to_string()),
            ..GateConfig::default()
        })
    }

    async fn teardown(self) {
        // Storage and listeners are dropped with the harness
    }
}

impl GateHarness {
    pub fn with_config(config: GateConfig) -> Self {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
                .single()
                .expect("valid start instant"),
        );
        let gate = AccessGate::new(storage.clone(), clock.clone(), config);

        Self {
            gate,
            storage,
            clock,
            lifecycle: LifecycleBus::new(),
        }
    }
}
