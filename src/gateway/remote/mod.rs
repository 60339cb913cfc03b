//! Remote client-data service
//!
//! Resolves a [`ClientId`](super::metrics::ClientId) into a metrics record by
//! calling the upstream client-data service.
//!
//! # Trust Boundaries
//!
//! ```text
//! caller ──(API_SECRET)──► gateway ──(CLIENT_API_TOKEN)──► client-data service
//! ```
//!
//! The upstream bearer token is configured separately from the inbound
//! secret and never forwarded from the caller. Calls are bounded by a fixed
//! timeout and are not retried.

mod client;
mod error;
mod types;

pub use client::RemoteClientFetcher;
pub use error::{RemoteFetchError, RemoteFetchErrorKind};
pub use types::*;
