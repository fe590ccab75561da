//! Network services: shared state, periodic cycle and HTTP API.
//!
//! All services work on one `PumpController` through `SharedPumpState<R>`
//! wrapped in `Arc`, so the cycle runner and the web handlers never issue
//! overlapping actuator sequences.
//!
//! # Shared State Pattern
//!
//! ```ignore
//! use std::sync::Arc;
//! use pumpctl::services::{build_router, spawn_cycle, SharedPumpState};
//!
//! // Create single shared state
//! let state = Arc::new(SharedPumpState::new(controller));
//!
//! // Cycle runner and web API both use the same state
//! spawn_cycle(Arc::clone(&state), config.cycle);
//! let router = build_router(Arc::clone(&state), page, auth, &web_config);
//! ```

pub mod api;
pub mod auth;
pub mod cycle;
pub mod page;
pub mod shared;
pub mod web;

// Re-exports
pub use api::*;
pub use auth::{BasicAuth, CHALLENGE};
pub use cycle::{spawn_cycle, CycleRunner};
pub use page::HomePage;
pub use shared::SharedPumpState;
pub use web::{build_router, run_server, serve, ApiState, TlsPaths, WebServerConfig};
