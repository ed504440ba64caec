//! Route definitions for the application

use access_gate::CapabilityType;
use dioxus::prelude::*;

use crate::pages::{AccessCode, Home, InstitutionRegistration, RoleSelection, SignIn};

/// All application routes
#[derive(Clone, Debug, PartialEq, Routable)]
#[rustfmt::skip]
pub enum Route {
    #[route("/")]
    Home {},

    #[route("/sign-in")]
    SignIn {},

    // Code entry
    #[route("/access")]
    AccessCode {},

    // Gated views
    #[route("/select-role")]
    RoleSelection {},

    #[route("/register-institution")]
    InstitutionRegistration {},
}

impl Route {
    /// View unlocked by a capability of this type
    pub fn protected(kind: CapabilityType) -> Self {
        match kind {
            CapabilityType::RoleSelection => Route::RoleSelection {},
            CapabilityType::InstitutionRegistration => Route::InstitutionRegistration {},
        }
    }
}
