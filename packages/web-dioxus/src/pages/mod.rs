//! Page components

mod access_code;
mod home;
mod institution_registration;
mod role_selection;
mod sign_in;

pub use access_code::*;
pub use home::*;
pub use institution_registration::*;
pub use role_selection::*;
pub use sign_in::*;
