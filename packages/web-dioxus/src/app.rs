//! Root application component

use dioxus::prelude::*;

use crate::auth::GateProvider;
use crate::routes::Route;

/// Root application component
#[component]
pub fn App() -> Element {
    rsx! {
        // Global styles
        document::Stylesheet { href: asset!("/assets/tailwind.css") }

        // Gate context wraps the entire app
        GateProvider {
            Router::<Route> {}
        }
    }
}
