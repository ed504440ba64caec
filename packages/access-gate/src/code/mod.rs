//! Code validator: turns a typed access code into a capability
//!
//! Verification is a pluggable [`CodeVerifier`] strategy: a single shared
//! secret for the simplest gate, or the API's table of codes.

mod remote;
mod static_secret;

pub use remote::RemoteCodeVerifier;
pub use static_secret::StaticSecretVerifier;

use std::time::Duration as PendingDuration;

use async_trait::async_trait;
use chrono::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::capability::{AccessCapability, CapabilityRepository, CapabilityType};
use crate::config::GateConfig;
use crate::error::AccessError;

/// Keep ASCII letters only, uppercased. Applied as the user types, so
/// stray digits and punctuation are stripped rather than rejected.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Why a code did not produce a capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Incorrect access code")]
    Incorrect,

    #[error("Access code could not be verified: {0}")]
    Network(String),

    #[error("Access capability could not be stored: {0}")]
    Storage(String),
}

impl CodeError {
    /// Copy shown under the code input
    pub fn user_message(&self) -> &'static str {
        match self {
            CodeError::Incorrect => "Incorrect access code. Please check it and try again.",
            CodeError::Network(_) => {
                "We couldn't verify your code right now. Please try again in a moment."
            }
            CodeError::Storage(_) => {
                "Your browser blocked local storage, so the code can't be remembered."
            }
        }
    }
}

impl From<CodeError> for AccessError {
    fn from(e: CodeError) -> Self {
        match e {
            CodeError::Incorrect => AccessError::CodeRejected,
            CodeError::Network(msg) => AccessError::CodeNetworkError(msg),
            CodeError::Storage(msg) => AccessError::CorruptStoredData(msg),
        }
    }
}

/// A code accepted by a verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCode {
    pub capability_type: CapabilityType,
    /// Institution the code belongs to, when the API links one
    pub institution_link: Option<String>,
}

/// Verification strategy
#[async_trait(?Send)]
pub trait CodeVerifier {
    /// Check an already-normalized, non-empty code
    async fn verify(&self, code: &str) -> Result<VerifiedCode, CodeError>;
}

#[async_trait(?Send)]
impl<T: CodeVerifier + ?Sized> CodeVerifier for Box<T> {
    async fn verify(&self, code: &str) -> Result<VerifiedCode, CodeError> {
        (**self).verify(code).await
    }
}

/// Result of submitting the code entry form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    /// Nothing typed yet: no error, no pending state
    Neutral,
    /// Capability issued. Show the pending state for `pending_for`, then
    /// navigate to `destination`.
    Accepted {
        capability: AccessCapability,
        institution_link: Option<String>,
        destination: &'static str,
        pending_for: PendingDuration,
    },
    /// Capability store untouched
    Rejected(CodeError),
}

/// Validates codes and issues capabilities on success
pub struct CodeValidator<V, C> {
    verifier: V,
    capabilities: C,
    ttl: Duration,
    pending_for: PendingDuration,
}

impl<V, C> CodeValidator<V, C>
where
    V: CodeVerifier,
    C: CapabilityRepository,
{
    pub fn new(verifier: V, capabilities: C, config: &GateConfig) -> Self {
        Self {
            verifier,
            capabilities,
            ttl: config.capability_ttl_or_default(),
            pending_for: config.pending_delay(),
        }
    }

    /// Check a code without issuing anything
    pub async fn validate(&self, code: &str) -> Result<VerifiedCode, CodeError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(CodeError::Incorrect);
        }
        self.verifier.verify(&code).await
    }

    /// Validate a code and, on success, issue the matching capability
    pub async fn submit(&self, raw: &str) -> CodeOutcome {
        if normalize_code(raw).is_empty() {
            return CodeOutcome::Neutral;
        }

        let verified = match self.validate(raw).await {
            Ok(verified) => verified,
            Err(e) => {
                warn!(error = %e, "Access code rejected");
                return CodeOutcome::Rejected(e);
            }
        };

        let capability = match self.capabilities.issue(verified.capability_type, self.ttl) {
            Ok(capability) => capability,
            Err(e) => {
                warn!(error = %e, "Failed to store access capability");
                return CodeOutcome::Rejected(CodeError::Storage(e.to_string()));
            }
        };

        info!(
            capability_type = %verified.capability_type,
            institution_link = ?verified.institution_link,
            "Access code accepted"
        );

        CodeOutcome::Accepted {
            destination: capability.capability_type.protected_path(),
            capability,
            institution_link: verified.institution_link,
            pending_for: self.pending_for,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityStore;
    use crate::clock::{Clock, ManualClock};
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn validator() -> (
        CodeValidator<StaticSecretVerifier, CapabilityStore<MemoryStorage>>,
        CapabilityStore<MemoryStorage>,
        ManualClock,
    ) {
        let clock = ManualClock::default();
        let store = CapabilityStore::new(MemoryStorage::new(), Arc::new(clock.clone()));
        let validator = CodeValidator::new(
            StaticSecretVerifier::new("ASDFGH", CapabilityType::RoleSelection),
            store.clone(),
            &GateConfig::default(),
        );
        (validator, store, clock)
    }

    #[test]
    fn test_normalize_strips_and_uppercases() {
        assert_eq!(normalize_code("as-df 9gh"), "ASDFGH");
        assert_eq!(normalize_code("123 !?"), "");
        assert_eq!(normalize_code("ÄbC"), "BC");
    }

    #[tokio::test]
    async fn test_empty_input_is_neutral() {
        let (validator, store, _clock) = validator();

        assert_eq!(validator.submit("").await, CodeOutcome::Neutral);
        assert_eq!(validator.submit(" 12-3 ").await, CodeOutcome::Neutral);
        assert!(store.read().is_none());
    }

    #[tokio::test]
    async fn test_accepted_code_issues_capability() {
        let (validator, store, clock) = validator();

        let outcome = validator.submit("asdfgh").await;

        let (capability, destination, pending_for, institution_link) = match outcome {
            CodeOutcome::Accepted {
                capability,
                destination,
                pending_for,
                institution_link,
            } => (capability, destination, pending_for, institution_link),
            other => panic!("expected accepted outcome, got {:?}", other),
        };
        assert_eq!(capability.capability_type, CapabilityType::RoleSelection);
        assert_eq!(capability.expires_at, clock.now() + Duration::minutes(30));
        assert_eq!(destination, "/select-role");
        assert_eq!(pending_for, PendingDuration::from_millis(1500));
        assert_eq!(institution_link, None);
        assert_eq!(store.read(), Some(capability));
    }

    #[tokio::test]
    async fn test_rejected_code_leaves_store_untouched() {
        let (validator, store, _clock) = validator();
        let held = store
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(5))
            .unwrap();

        assert_eq!(
            validator.submit("WRONGX").await,
            CodeOutcome::Rejected(CodeError::Incorrect)
        );
        assert_eq!(store.read(), Some(held));
    }

    #[test]
    fn test_errors_are_distinguishable() {
        assert_ne!(
            CodeError::Incorrect.user_message(),
            CodeError::Network("timeout".into()).user_message()
        );
        assert_eq!(
            AccessError::from(CodeError::Incorrect),
            AccessError::CodeRejected
        );
        assert!(matches!(
            AccessError::from(CodeError::Network("timeout".into())),
            AccessError::CodeNetworkError(_)
        ));
    }
}
