//! niyama-core: Shared infrastructure for Niyama backend services.

pub mod config;
pub mod error;
pub mod observability;
pub mod response;
