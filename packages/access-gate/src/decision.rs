//! Access decision engine
//!
//! Pure function over the current contents of both stores. Nothing is cached:
//! lifecycle listeners may clear the capability between two evaluations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::capability::{CapabilityRepository, CapabilityType};
use crate::clock::Clock;
use crate::error::AccessError;
use crate::session::SessionRepository;

/// Why a guard evaluation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    None,
    NoCapability,
    Expired,
    IncompleteSession,
}

impl DenialReason {
    /// Matching error, for logging
    pub fn as_error(&self) -> Option<AccessError> {
        match self {
            DenialReason::None => None,
            DenialReason::NoCapability => Some(AccessError::NoCapability),
            DenialReason::Expired => Some(AccessError::ExpiredCapability),
            DenialReason::IncompleteSession => Some(AccessError::IncompleteSession),
        }
    }
}

/// Outcome of one guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardResult {
    pub granted: bool,
    pub reason: DenialReason,
}

impl GuardResult {
    pub fn granted() -> Self {
        Self {
            granted: true,
            reason: DenialReason::None,
        }
    }

    pub fn denied(reason: DenialReason) -> Self {
        Self {
            granted: false,
            reason,
        }
    }
}

/// Evaluates the capability and session stores for a required capability type
#[derive(Clone)]
pub struct AccessDecisionEngine<C, S> {
    capabilities: C,
    sessions: S,
    clock: Arc<dyn Clock>,
}

impl<C, S> AccessDecisionEngine<C, S>
where
    C: CapabilityRepository,
    S: SessionRepository,
{
    pub fn new(capabilities: C, sessions: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            capabilities,
            sessions,
            clock,
        }
    }

    pub fn capabilities(&self) -> &C {
        &self.capabilities
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Evaluate access, propagating storage backend failures.
    ///
    /// Expiry is checked before the type so an expired capability of another
    /// type still reports `Expired`. Session completeness is checked last so
    /// capability failures take priority.
    pub fn evaluate(&self, required: CapabilityType) -> Result<GuardResult, AccessError> {
        let capability = match self.capabilities.load()? {
            Some(capability) => capability,
            None => {
                debug!(required = %required, "Denied: no capability");
                return Ok(GuardResult::denied(DenialReason::NoCapability));
            }
        };

        if capability.is_expired_at(self.clock.now()) {
            self.capabilities.clear();
            debug!(
                required = %required,
                expired_at = %capability.expires_at,
                "Denied: capability expired"
            );
            return Ok(GuardResult::denied(DenialReason::Expired));
        }

        if capability.capability_type != required {
            debug!(
                required = %required,
                held = %capability.capability_type,
                error = %AccessError::WrongCapabilityType,
                "Denied: capability type mismatch"
            );
            return Ok(GuardResult::denied(DenialReason::NoCapability));
        }

        if required.requires_session() && self.sessions.load()?.is_none() {
            debug!(required = %required, "Denied: incomplete session");
            return Ok(GuardResult::denied(DenialReason::IncompleteSession));
        }

        Ok(GuardResult::granted())
    }

    /// Evaluate access. Backend failures deny (fail closed).
    pub fn decide(&self, required: CapabilityType) -> GuardResult {
        match self.evaluate(required) {
            Ok(result) => result,
            Err(e) => {
                error!(required = %required, error = %e, "Access evaluation failed; denying");
                GuardResult::denied(DenialReason::NoCapability)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{AccessCapability, CapabilityStore};
    use crate::clock::ManualClock;
    use crate::session::{Role, SessionRecord, SessionStore, UserIdentity};
    use crate::storage::{MemoryStorage, StorageError};
    use chrono::Duration;

    type Engine = AccessDecisionEngine<CapabilityStore<MemoryStorage>, SessionStore<MemoryStorage>>;

    fn engine() -> (Engine, ManualClock) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::default();
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let engine = AccessDecisionEngine::new(
            CapabilityStore::new(storage.clone(), shared.clone()),
            SessionStore::new(storage),
            shared,
        );
        (engine, clock)
    }

    fn sign_in(engine: &Engine) {
        let identity = UserIdentity {
            id: "u-1".to_string(),
            name: "Sam".to_string(),
            role: Some(Role::Supervisor),
            institution_code: None,
        };
        engine
            .sessions()
            .save("tok", &identity, Role::Supervisor)
            .unwrap();
    }

    #[test]
    fn test_no_capability() {
        let (engine, _clock) = engine();

        assert_eq!(
            engine.decide(CapabilityType::InstitutionRegistration),
            GuardResult::denied(DenialReason::NoCapability)
        );
    }

    #[test]
    fn test_institution_registration_needs_no_session() {
        let (engine, _clock) = engine();
        engine
            .capabilities()
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(30))
            .unwrap();

        assert_eq!(
            engine.decide(CapabilityType::InstitutionRegistration),
            GuardResult::granted()
        );
    }

    #[test]
    fn test_expired_is_reported_before_type_mismatch() {
        let (engine, clock) = engine();
        engine
            .capabilities()
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(30))
            .unwrap();

        clock.advance(Duration::minutes(31));

        assert_eq!(
            engine.decide(CapabilityType::RoleSelection),
            GuardResult::denied(DenialReason::Expired)
        );
        assert!(engine.capabilities().read().is_none());
    }

    #[test]
    fn test_exactly_at_expiry_is_still_valid() {
        let (engine, clock) = engine();
        engine
            .capabilities()
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(30))
            .unwrap();

        clock.advance(Duration::minutes(30));

        assert!(engine.decide(CapabilityType::InstitutionRegistration).granted);
    }

    #[test]
    fn test_wrong_type_is_no_capability() {
        let (engine, _clock) = engine();
        sign_in(&engine);
        engine
            .capabilities()
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(30))
            .unwrap();

        assert_eq!(
            engine.decide(CapabilityType::RoleSelection),
            GuardResult::denied(DenialReason::NoCapability)
        );
        // Mismatch leaves the capability in place
        assert!(engine.capabilities().read().is_some());
    }

    #[test]
    fn test_role_selection_requires_session() {
        let (engine, _clock) = engine();
        engine
            .capabilities()
            .issue(CapabilityType::RoleSelection, Duration::minutes(30))
            .unwrap();

        assert_eq!(
            engine.decide(CapabilityType::RoleSelection),
            GuardResult::denied(DenialReason::IncompleteSession)
        );

        sign_in(&engine);
        assert_eq!(
            engine.decide(CapabilityType::RoleSelection),
            GuardResult::granted()
        );
    }

    struct BrokenCapabilities;

    impl CapabilityRepository for BrokenCapabilities {
        fn issue(
            &self,
            _capability_type: CapabilityType,
            _ttl: Duration,
        ) -> Result<AccessCapability, AccessError> {
            Err(StorageError::Unavailable.into())
        }

        fn load(&self) -> Result<Option<AccessCapability>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn clear(&self) {}
    }

    struct NoSessions;

    impl SessionRepository for NoSessions {
        fn save(&self, _token: &str, _identity: &UserIdentity, _role: Role) -> Result<(), AccessError> {
            Ok(())
        }

        fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
            Ok(None)
        }

        fn clear(&self) {}
    }

    #[test]
    fn test_backend_failure_fails_closed() {
        let engine = AccessDecisionEngine::new(
            BrokenCapabilities,
            NoSessions,
            Arc::new(ManualClock::default()),
        );

        assert!(matches!(
            engine.evaluate(CapabilityType::InstitutionRegistration),
            Err(AccessError::Storage(StorageError::Unavailable))
        ));
        assert_eq!(
            engine.decide(CapabilityType::InstitutionRegistration),
            GuardResult::denied(DenialReason::NoCapability)
        );
    }

    #[test]
    fn test_reason_maps_to_error() {
        assert_eq!(DenialReason::None.as_error(), None);
        assert_eq!(
            DenialReason::Expired.as_error(),
            Some(AccessError::ExpiredCapability)
        );
    }
}
