//! One handle over storage, clock, stores and config for the UI layer

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capability::{CapabilityRepository, CapabilityStore, CapabilityType};
use crate::client::SessionVerifier;
use crate::clock::Clock;
use crate::code::{CodeValidator, CodeVerifier};
use crate::config::GateConfig;
use crate::decision::{AccessDecisionEngine, GuardResult};
use crate::error::AccessError;
use crate::guard::RouteGuard;
use crate::session::{Role, SessionRecord, SessionRepository, SessionStore, UserIdentity};
use crate::storage::KeyValueStorage;

/// Session payload issued by the auth API at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub identity: UserIdentity,
    pub role: Role,
}

pub type GateEngine<S> = AccessDecisionEngine<CapabilityStore<S>, SessionStore<S>>;
pub type GateGuard<S> = RouteGuard<CapabilityStore<S>, SessionStore<S>>;

/// Access gate over one storage backend
#[derive(Clone)]
pub struct AccessGate<S> {
    capabilities: CapabilityStore<S>,
    sessions: SessionStore<S>,
    clock: Arc<dyn Clock>,
    config: GateConfig,
}

impl<S> AccessGate<S>
where
    S: KeyValueStorage + Clone + Send + Sync + 'static,
{
    pub fn new(storage: S, clock: impl Clock + 'static, config: GateConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(clock);
        Self {
            capabilities: CapabilityStore::new(storage.clone(), clock.clone()),
            sessions: SessionStore::new(storage),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilityStore<S> {
        &self.capabilities
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn engine(&self) -> GateEngine<S> {
        AccessDecisionEngine::new(
            self.capabilities.clone(),
            self.sessions.clone(),
            self.clock.clone(),
        )
    }

    pub fn decide(&self, required: CapabilityType) -> GuardResult {
        self.engine().decide(required)
    }

    /// Fresh guard for one mount of a protected view
    pub fn guard(&self, required: CapabilityType) -> GateGuard<S> {
        RouteGuard::new(required, self.engine())
    }

    pub fn validator<V: CodeVerifier>(&self, verifier: V) -> CodeValidator<V, CapabilityStore<S>> {
        CodeValidator::new(verifier, self.capabilities.clone(), &self.config)
    }

    /// Validator using the strategy selected by configuration
    pub fn default_validator(&self) -> CodeValidator<Box<dyn CodeVerifier>, CapabilityStore<S>> {
        self.validator(self.config.verifier())
    }

    pub fn session(&self) -> Option<SessionRecord> {
        self.sessions.read()
    }

    /// Persist a session issued by the auth API
    pub fn sign_in(&self, auth: &AuthResponse) -> Result<(), AccessError> {
        self.sessions.save(&auth.token, &auth.identity, auth.role)
    }

    /// Drop both the capability and the session
    pub fn logout(&self) {
        self.capabilities.clear();
        self.sessions.clear();
        info!("Logged out");
    }

    /// Ask the session collaborator whether the stored token is still valid.
    ///
    /// An invalid verdict clears the session. Network failures keep it: the
    /// server stays the authority on the next real request.
    pub async fn refresh_session(&self, verifier: &dyn SessionVerifier) -> Option<SessionRecord> {
        let stored = self.sessions.read()?;

        let verdict = match verifier.verify_session(&stored.token).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "Session verification failed; keeping stored session");
                return Some(stored);
            }
        };

        if !verdict.valid {
            info!(user_id = %stored.identity.id, "Session rejected by API; clearing");
            self.sessions.clear();
            return None;
        }

        let refreshed = SessionRecord {
            role: verdict.role.unwrap_or(stored.role),
            identity: verdict.identity.unwrap_or_else(|| stored.identity.clone()),
            token: stored.token.clone(),
        };

        if refreshed != stored {
            if let Err(e) = self
                .sessions
                .save(&refreshed.token, &refreshed.identity, refreshed.role)
            {
                warn!(error = %e, "Failed to persist refreshed session");
            }
        }

        Some(refreshed)
    }
}

#[cfg(feature = "web")]
impl AccessGate<crate::storage::BrowserStorage> {
    /// Gate over `window.localStorage` and the wall clock
    pub fn browser(config: GateConfig) -> Self {
        Self::new(crate::storage::BrowserStorage, crate::clock::SystemClock, config)
    }
}
