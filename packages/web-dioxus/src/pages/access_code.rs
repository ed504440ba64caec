//! Access code entry page

use access_gate::{normalize_code, CodeError, CodeOutcome};
use dioxus::prelude::*;
use tracing::info;

use crate::auth::use_gate;
use crate::platform;
use crate::routes::Route;

/// Access code entry. A valid code issues a capability, shows a short
/// confirmation, then navigates to the view it unlocks.
#[component]
pub fn AccessCode() -> Element {
    let ctx = use_gate();
    let navigator = use_navigator();

    let mut code = use_signal(String::new);
    let mut error = use_signal(|| None::<CodeError>);
    let mut is_pending = use_signal(|| false);
    let mut institution_link = use_signal(|| None::<String>);

    let handle_submit = move |_| {
        let ctx = ctx.clone();
        let raw = code();

        spawn(async move {
            let validator = ctx.gate.default_validator();

            match validator.submit(&raw).await {
                CodeOutcome::Neutral => error.set(None),
                CodeOutcome::Accepted {
                    capability,
                    institution_link: link,
                    pending_for,
                    ..
                } => {
                    error.set(None);
                    institution_link.set(link);
                    is_pending.set(true);

                    platform::pause(pending_for).await;

                    info!(kind = %capability.capability_type, "Access code accepted; continuing");
                    navigator.push(Route::protected(capability.capability_type));
                }
                CodeOutcome::Rejected(e) => error.set(Some(e)),
            }
        });
    };

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full",

                div {
                    class: "mb-6 text-center",
                    h1 { class: "text-2xl font-bold text-gray-900 mb-2", "Enter Access Code" }
                    p { class: "text-gray-600 text-sm", "Use the code provided by your institution" }
                }

                if let Some(err) = error() {
                    div {
                        class: "mb-4 p-3 bg-orange-50 border border-orange-200 text-orange-800 rounded text-sm",
                        {err.user_message()}
                    }
                }

                if is_pending() {
                    div {
                        class: "mb-4 p-3 bg-green-50 border border-green-200 text-green-800 rounded text-sm",
                        "Code accepted. Redirecting..."
                        if let Some(link) = institution_link() {
                            p { class: "mt-1 text-xs", "Institution: {link}" }
                        }
                    }
                }

                form {
                    onsubmit: handle_submit,
                    div {
                        class: "mb-4",
                        label {
                            class: "block text-sm font-medium text-gray-700 mb-2",
                            "Access Code"
                        }
                        input {
                            r#type: "text",
                            value: "{code}",
                            oninput: move |e| code.set(normalize_code(&e.value())),
                            placeholder: "ABCDEF",
                            autocomplete: "off",
                            class: "w-full px-3 py-2 border border-gray-300 rounded-md tracking-widest uppercase focus:outline-none focus:ring-2 focus:ring-amber-500",
                            disabled: is_pending()
                        }
                        p {
                            class: "mt-1 text-xs text-gray-500",
                            "Letters only; case doesn't matter"
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "w-full bg-amber-700 text-white py-2 px-4 rounded-md hover:bg-amber-800 focus:outline-none focus:ring-2 focus:ring-amber-500 focus:ring-offset-2 disabled:opacity-50 disabled:cursor-not-allowed",
                        disabled: is_pending() || code().is_empty(),
                        if is_pending() { "Verifying..." } else { "Continue" }
                    }
                }
            }
        }
    }
}
