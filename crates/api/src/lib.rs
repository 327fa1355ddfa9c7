//! napwatch API server library.
//!
//! Exposes config, state, error handling, seed loading and routes so the
//! binary and integration tests build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
