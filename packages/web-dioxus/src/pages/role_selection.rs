//! Role selection page (gated)

use access_gate::{CapabilityType, Role};
use dioxus::prelude::*;

use crate::auth::use_gate;
use crate::components::RouteGuard;
use crate::routes::Route;

#[component]
pub fn RoleSelection() -> Element {
    rsx! {
        RouteGuard {
            required: CapabilityType::RoleSelection,
            RolePicker {}
        }
    }
}

#[component]
fn RolePicker() -> Element {
    let ctx = use_gate();
    let mut selected = use_signal(|| ctx.role());

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full",

                h1 { class: "text-2xl font-bold text-gray-900 mb-6 text-center", "Choose your role" }

                div {
                    class: "space-y-2 mb-6",
                    for role in Role::variants().iter().copied() {
                        button {
                            key: "{role}",
                            r#type: "button",
                            class: if selected() == Some(role) {
                                "w-full py-2 px-4 rounded-md border border-amber-600 bg-amber-50 text-amber-800"
                            } else {
                                "w-full py-2 px-4 rounded-md border border-gray-300 text-gray-700 hover:bg-gray-50"
                            },
                            onclick: move |_| selected.set(Some(role)),
                            {role.label()}
                        }
                    }
                }

                if let Some(role) = selected() {
                    Link {
                        to: Route::Home {},
                        class: "block w-full text-center bg-amber-700 text-white py-2 px-4 rounded-md hover:bg-amber-800",
                        "Continue as "
                        {role.label()}
                    }
                }
            }
        }
    }
}
