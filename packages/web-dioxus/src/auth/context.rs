//! Gate context provider

use access_gate::{AccessGate, RemoteSessionVerifier, Role, SessionRecord};
use dioxus::prelude::*;
use tracing::{info, warn};

use crate::platform::{self, PortalStorage};

/// Access gate plus reactive session state for the entire app
#[derive(Clone)]
pub struct GateContext {
    pub gate: AccessGate<PortalStorage>,
    /// Current session (if any)
    pub session: Signal<Option<SessionRecord>>,
    /// Whether the session is still being verified
    pub loading: Signal<bool>,
}

impl GateContext {
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.read().as_ref().map(|s| s.role)
    }

    /// Re-read the stored session and confirm it with the auth API
    pub async fn refresh(&self) {
        let verifier = RemoteSessionVerifier::new(self.gate.config().api_client());
        let session = self.gate.refresh_session(&verifier).await;

        let mut signal = self.session;
        signal.set(session);
        let mut loading = self.loading;
        loading.set(false);
    }

    /// Exchange credentials with the auth API and persist the session.
    /// The error is copy for the sign-in form.
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<(), String> {
        let auth = match self.gate.config().api_client().login(identifier, password).await {
            Ok(auth) => auth,
            Err(e) if e.is_client_error() => {
                return Err("Incorrect email or password".to_string());
            }
            Err(e) => {
                warn!(error = %e, "Sign-in request failed");
                return Err("We couldn't sign you in right now. Please try again.".to_string());
            }
        };

        if let Err(e) = self.gate.sign_in(&auth) {
            warn!(error = %e, "Failed to store session");
            return Err("Your browser blocked local storage, so you can't stay signed in.".to_string());
        }
        info!(user_id = %auth.identity.id, role = %auth.role, "Signed in");

        let mut signal = self.session;
        signal.set(Some(SessionRecord {
            token: auth.token,
            identity: auth.identity,
            role: auth.role,
        }));
        Ok(())
    }

    /// Drop the session and any held capability
    pub fn logout(&self) {
        self.gate.logout();
        let mut signal = self.session;
        signal.set(None);
    }
}

/// Gate provider component that wraps the app
#[component]
pub fn GateProvider(children: Element) -> Element {
    let session = use_signal(|| None::<SessionRecord>);
    let loading = use_signal(|| true);

    let ctx = use_context_provider(|| GateContext {
        gate: platform::gate(platform::config()),
        session,
        loading,
    });

    // Load initial session state
    use_effect(move || {
        let ctx = ctx.clone();
        spawn(async move {
            ctx.refresh().await;
        });
    });

    children
}

/// Hook to access the gate context
pub fn use_gate() -> GateContext {
    use_context::<GateContext>()
}
