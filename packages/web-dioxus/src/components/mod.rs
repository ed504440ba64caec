//! Reusable UI components

mod loading;
mod route_guard;

pub use loading::*;
pub use route_guard::*;
