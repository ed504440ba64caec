//! Landing page

use dioxus::prelude::*;

use crate::auth::use_gate;
use crate::components::LoadingSpinner;
use crate::routes::Route;

#[component]
pub fn Home() -> Element {
    let ctx = use_gate();

    // Session still being verified
    if (ctx.loading)() {
        return rsx! {
            div {
                class: "min-h-screen flex items-center justify-center bg-gray-100",
                LoadingSpinner {}
            }
        };
    }

    let greeting = ctx
        .session
        .read()
        .as_ref()
        .map(|s| format!("Signed in as {} ({})", s.identity.name, s.role.label()));

    let handle_logout = {
        let ctx = ctx.clone();
        move |_| ctx.logout()
    };

    rsx! {
        div {
            class: "min-h-screen bg-gray-100 flex items-center justify-center px-4",

            div {
                class: "bg-white rounded-lg shadow-md p-8 max-w-md w-full text-center",

                h1 { class: "text-2xl font-bold text-gray-900 mb-2", "Education Portal" }

                if let Some(text) = greeting {
                    p { class: "text-gray-600 text-sm mb-6", "{text}" }
                } else {
                    p { class: "text-gray-600 text-sm mb-6", "Have an access code from your institution? Enter it to get started." }
                }

                div {
                    class: "space-y-2",
                    Link {
                        to: Route::AccessCode {},
                        class: "block w-full bg-amber-700 text-white py-2 px-4 rounded-md hover:bg-amber-800",
                        "Enter access code"
                    }
                    if ctx.is_authenticated() {
                        button {
                            r#type: "button",
                            class: "w-full bg-stone-100 text-stone-700 py-2 px-4 rounded-md hover:bg-stone-200",
                            onclick: handle_logout,
                            "Sign out"
                        }
                    } else {
                        Link {
                            to: Route::SignIn {},
                            class: "block w-full bg-stone-100 text-stone-700 py-2 px-4 rounded-md hover:bg-stone-200",
                            "Sign in"
                        }
                    }
                }
            }
        }
    }
}
