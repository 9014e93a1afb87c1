//! Kernel services.

pub mod token;

pub use token::{Principal, TokenError, TokenService};
