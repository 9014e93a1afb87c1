//! Orderly kernel library.
//!
//! The request pipeline shared by the Orderly services: bearer token
//! authentication, fixed-window rate limiting, entity-tag negotiation,
//! pagination and background task tracking, plus the error and response
//! shapes every endpoint speaks.

pub mod config;
pub mod error;
pub mod middleware;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod tasks;

pub use config::KernelConfig;
pub use error::{AppError, AppResult, ErrorBody};
pub use pagination::{OrderedCollection, PageLinks, PageRequest, PageResult, Paginated, paginate};
pub use response::{ApiJson, ApiResponse, PublicUrl, Resource};
pub use state::KernelState;
