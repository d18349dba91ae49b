//! vitals-ingest: a smoke-test ingestion service.
//!
//! Exposes a liveness endpoint and an endpoint that writes one synthetic
//! heart-rate reading to PostgreSQL per call.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod vitals;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
