//! Education Portal - Dioxus Fullstack Web Application
//!
//! Fullstack SSR frontend for the portal's gated onboarding flow: access code
//! entry, role selection and institution registration. Gating itself lives in
//! the `access-gate` crate; this crate only wires it into components.
//!
//! ## Running
//!
//! Development (with hot reload):
//! ```bash
//! dx serve --features web,server
//! ```
//!
//! Production build:
//! ```bash
//! dx build --release --features web,server
//! ```

#![allow(non_snake_case)]

mod app;
mod auth;
mod components;
mod pages;
mod platform;
mod routes;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    dioxus::launch(app::App);
}
