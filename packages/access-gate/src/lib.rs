//! Access gating for the education portal.
//!
//! Two independently-lived credentials decide whether a protected view renders:
//!
//! - a long-lived **session** issued by the auth API at login ([`SessionStore`])
//! - a short-lived **access capability** unlocked by typing a shared code
//!   ([`CapabilityStore`], [`CodeValidator`])
//!
//! ```rust,ignore
//! use access_gate::{AccessGate, CapabilityType, GateConfig, LifecycleBus, MemoryStorage, SystemClock};
//!
//! let gate = AccessGate::new(MemoryStorage::new(), SystemClock, GateConfig::default());
//!
//! let mut guard = gate.guard(CapabilityType::RoleSelection);
//! guard.mount(&LifecycleBus::new());
//! if !guard.is_granted() {
//!     let copy = guard.denial();
//!     // render copy.title / copy.message with a link to copy.action_path
//! }
//! ```
//!
//! Every store read is parse-or-absent: corrupt client-local data is wiped and
//! reported as missing, never surfaced as an error.

pub mod capability;
pub mod client;
pub mod clock;
pub mod code;
pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod guard;
pub mod lifecycle;
pub mod session;
pub mod storage;

pub use capability::{AccessCapability, CapabilityRepository, CapabilityStore, CapabilityType};
pub use client::{ApiClient, ClientError, RemoteSessionVerifier, SessionVerdict, SessionVerifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{
    normalize_code, CodeError, CodeOutcome, CodeValidator, CodeVerifier, RemoteCodeVerifier,
    StaticSecretVerifier, VerifiedCode,
};
pub use config::GateConfig;
pub use decision::{AccessDecisionEngine, DenialReason, GuardResult};
pub use error::AccessError;
pub use gate::{AccessGate, AuthResponse, GateEngine, GateGuard};
pub use guard::{denial_copy, DenialCopy, GuardState, RouteGuard, ACCESS_CODE_PATH};
pub use lifecycle::{
    LifecycleBus, LifecycleEvents, LifecycleMonitor, LifecycleSignal, SignalHandler, Subscription,
};
pub use session::{Role, SessionRecord, SessionRepository, SessionStore, UserIdentity};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};

#[cfg(feature = "web")]
pub use lifecycle::BrowserLifecycle;
#[cfg(feature = "web")]
pub use storage::BrowserStorage;
