//! WellnessZ gateway core
//!
//! Data-source resolution and request orchestration in front of the
//! prediction engine.
//!
//! # Request Flow
//!
//! ```text
//! request ─► Authorizer ─► RequestOrchestrator
//!                            ├─ Manual ──────────────────┐
//!                            └─ ById ─► ClientSource ────┤
//!                                         ├─ Disabled    │
//!                                         ├─ Dataset     ▼
//!                                         └─ Remote    normalize
//!                                                        │
//!                                                        ▼
//!                                       engine.predict ─► engine.explain
//!                                                        │
//!                                                        ▼
//!                                                 ResponseEnvelope
//! ```
//!
//! # Modules
//!
//! - [`metrics`]: metrics records, client ids, normalization
//! - [`dataset`]: lazily loaded CSV dataset cache
//! - [`remote`]: client-data service fetcher
//! - [`auth`]: shared-secret bearer check
//! - [`source`]: data-mode strategy
//! - [`engine`]: prediction engine boundary
//! - [`orchestrator`]: request coordinator

pub mod auth;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod remote;
pub mod source;
pub mod telemetry;

pub use auth::Authorizer;
pub use config::{ConfigError, DataMode, GatewayConfig};
pub use dataset::{Dataset, DatasetCache, DatasetError, DatasetRow};
pub use engine::{EngineConfig, EngineError, HttpEngine, Prediction, PredictionEngine};
pub use envelope::{AnalysisRecord, ResponseEnvelope, Risks};
pub use error::{ErrorBody, GatewayError};
pub use metrics::{normalize, ClientId, MetricsRecord};
pub use orchestrator::{PredictRequest, RequestOrchestrator};
pub use remote::{RemoteClientFetcher, RemoteConfig, RemoteFetchError};
pub use source::ClientSource;
