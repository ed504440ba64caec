//! Institution registration page (gated)

use access_gate::CapabilityType;
use dioxus::prelude::*;

use crate::components::RouteGuard;

#[component]
pub fn InstitutionRegistration() -> Element {
    rsx! {
        RouteGuard {
            required: CapabilityType::InstitutionRegistration,
            RegistrationForm {}
        }
    }
}

#[component]
fn RegistrationForm() -> Element {
    let mut name = use_signal(String::new);
    let mut contact = use_signal(String::new);

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full",

                h1 { class: "text-2xl font-bold text-gray-900 mb-6 text-center", "Register your institution" }

                div {
                    class: "mb-4",
                    label { class: "block text-sm font-medium text-gray-700 mb-2", "Institution name" }
                    input {
                        r#type: "text",
                        value: "{name}",
                        oninput: move |e| name.set(e.value()),
                        class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-amber-500"
                    }
                }
                div {
                    class: "mb-4",
                    label { class: "block text-sm font-medium text-gray-700 mb-2", "Contact email" }
                    input {
                        r#type: "email",
                        value: "{contact}",
                        oninput: move |e| contact.set(e.value()),
                        class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-amber-500"
                    }
                }
            }
        }
    }
}
