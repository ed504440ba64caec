//! Route guard state machine
//!
//! One guard per mounted protected view: `Loading -> Granted | Denied`,
//! terminal until the view unmounts. Denial is never retried automatically;
//! the user goes back through code entry.

use tracing::{debug, error};

use crate::capability::{CapabilityRepository, CapabilityType};
use crate::decision::{AccessDecisionEngine, DenialReason};
use crate::lifecycle::{LifecycleEvents, LifecycleMonitor};
use crate::session::SessionRepository;

/// Path of the access code entry view
pub const ACCESS_CODE_PATH: &str = "/access";

/// Guard state for one mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Granted,
    Denied(DenialReason),
}

/// Restricted-access copy shown on denial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenialCopy {
    pub title: &'static str,
    pub message: &'static str,
    pub action_label: &'static str,
    pub action_path: &'static str,
}

/// Copy for a denied view. The reason only picks the wording; it is never
/// shown as a code.
pub fn denial_copy(required: CapabilityType, reason: DenialReason) -> DenialCopy {
    let (title, message) = match (required, reason) {
        (CapabilityType::RoleSelection, DenialReason::Expired) => (
            "Access code expired",
            "Your access code has expired. Enter it again to continue choosing your role.",
        ),
        (CapabilityType::RoleSelection, DenialReason::IncompleteSession) => (
            "Sign-in required",
            "Role selection needs an active sign-in. Sign in again, then re-enter your access code.",
        ),
        (CapabilityType::RoleSelection, _) => (
            "Access code required",
            "Role selection is only available after entering the access code provided by your institution.",
        ),
        (CapabilityType::InstitutionRegistration, DenialReason::Expired) => (
            "Registration code expired",
            "Your registration code has expired. Enter it again to continue registering your institution.",
        ),
        (CapabilityType::InstitutionRegistration, _) => (
            "Registration code required",
            "Registering an institution requires the registration code provided by the portal team.",
        ),
    };

    DenialCopy {
        title,
        message,
        action_label: "Enter access code",
        action_path: ACCESS_CODE_PATH,
    }
}

/// Guards one protected view
pub struct RouteGuard<C, S> {
    required: CapabilityType,
    engine: AccessDecisionEngine<C, S>,
    state: GuardState,
    monitor: Option<LifecycleMonitor>,
}

impl<C, S> RouteGuard<C, S>
where
    C: CapabilityRepository + Clone + Send + Sync + 'static,
    S: SessionRepository,
{
    pub fn new(required: CapabilityType, engine: AccessDecisionEngine<C, S>) -> Self {
        Self {
            required,
            engine,
            state: GuardState::Loading,
            monitor: None,
        }
    }

    pub fn required(&self) -> CapabilityType {
        self.required
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == GuardState::Granted
    }

    /// Attach lifecycle listeners and evaluate once.
    ///
    /// Calling it again before [`unmount`](Self::unmount) returns the
    /// existing decision.
    pub fn mount(&mut self, events: &dyn LifecycleEvents) -> GuardState {
        if self.state != GuardState::Loading {
            return self.state;
        }

        if self.monitor.is_none() {
            self.monitor = LifecycleMonitor::attach(
                events,
                self.required,
                self.engine.capabilities().clone(),
            );
        }

        self.state = match self.engine.evaluate(self.required) {
            Ok(result) if result.granted => GuardState::Granted,
            Ok(result) => GuardState::Denied(result.reason),
            Err(e) => {
                error!(required = %self.required, error = %e, "Guard evaluation failed; denying");
                GuardState::Denied(DenialReason::NoCapability)
            }
        };

        debug!(required = %self.required, state = ?self.state, "Route guard mounted");
        self.state
    }

    /// Detach lifecycle listeners. A later mount evaluates again.
    pub fn unmount(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.detach();
        }
        self.state = GuardState::Loading;
        debug!(required = %self.required, "Route guard unmounted");
    }

    /// Copy for the restricted-access panel, when denied
    pub fn denial(&self) -> Option<DenialCopy> {
        match self.state {
            GuardState::Denied(reason) => Some(denial_copy(self.required, reason)),
            _ => None,
        }
    }
}
