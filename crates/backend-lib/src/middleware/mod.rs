// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the employee-records server.

pub mod auth_gate;

pub use auth_gate::{resolve_identity, AuthGate, GateMiss};
