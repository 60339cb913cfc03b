//! WellnessZ Gateway
//!
//! Request-orchestration layer in front of the WellnessZ health-risk
//! prediction engine. Accepts raw metrics or a client identifier, resolves
//! and normalizes the metrics, authorizes the caller, invokes the engine and
//! returns a uniformly shaped envelope.
//!
//! - [`gateway`]: resolution strategies, normalization, orchestration
//! - [`server`]: HTTP surface

pub mod gateway;
pub mod server;

pub use gateway::*;
pub use server::{build_router, AppState};
