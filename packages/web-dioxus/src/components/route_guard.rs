//! Route guard wrapper for capability-gated views

use std::cell::RefCell;
use std::rc::Rc;

use access_gate::{denial_copy, CapabilityType, DenialCopy, GuardState};
use dioxus::prelude::*;

use super::LoadingSpinner;
use crate::auth::use_gate;
use crate::platform;
use crate::routes::Route;

/// Renders `children` only while the visitor holds a `required` capability.
///
/// The decision is made once per mount, after the first client render, and
/// stays put until the view unmounts. Leaving the page or navigating through
/// history revokes a role-selection capability.
#[component]
pub fn RouteGuard(required: CapabilityType, children: Element) -> Element {
    let ctx = use_gate();
    let mut state = use_signal(|| GuardState::Loading);

    let guard = use_hook(|| Rc::new(RefCell::new(ctx.gate.guard(required))));

    use_effect({
        let guard = guard.clone();
        move || {
            let lifecycle = platform::lifecycle();
            let decided = guard.borrow_mut().mount(lifecycle.as_ref());
            state.set(decided);
        }
    });

    use_drop(move || guard.borrow_mut().unmount());

    match state() {
        GuardState::Loading => rsx! {
            div {
                class: "min-h-screen flex items-center justify-center bg-gray-100",
                LoadingSpinner {}
            }
        },
        GuardState::Granted => children,
        GuardState::Denied(reason) => rsx! {
            RestrictedAccess { copy: denial_copy(required, reason) }
        },
    }
}

/// Restricted-access panel pointing back to code entry
#[component]
pub fn RestrictedAccess(copy: DenialCopy) -> Element {
    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full text-center",

                h1 { class: "text-2xl font-bold text-gray-900 mb-2", {copy.title} }
                p { class: "text-gray-600 text-sm mb-6", {copy.message} }

                Link {
                    to: Route::AccessCode {},
                    class: "inline-block w-full bg-amber-700 text-white py-2 px-4 rounded-md hover:bg-amber-800",
                    {copy.action_label}
                }
            }
        }
    }
}
