//! HTTP server for the simulation engine.
//!
//! # Endpoints
//!
//! - `GET  /health`     - Liveness probe
//! - `GET  /agents`     - Persona catalog
//! - `GET  /agents/:id` - One persona
//! - `POST /simulate`   - Streamed simulation run

pub mod routes;

pub use routes::{app_router, AppState};
