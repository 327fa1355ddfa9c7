//! Platform provider gateway.
//!
//! A [`PlatformProvider`] retrieves one platform's currently published
//! identity snapshot. This is the only call that leaves the engine. Failures
//! are always returned as a typed [`FetchFailure`](napwatch_core::platform::FetchFailure).
//!
//! - [`HttpPlatformProvider`] fetches JSON snapshots over HTTP.
//! - [`RetryingProvider`] adds per-attempt timeouts and exponential backoff.
//! - [`FixtureProvider`] serves canned results for tests and local runs.

pub mod fixture;
pub mod http;
pub mod provider;
pub mod retry;

pub use fixture::FixtureProvider;
pub use http::HttpPlatformProvider;
pub use provider::PlatformProvider;
pub use retry::{RetryPolicy, RetryingProvider};
