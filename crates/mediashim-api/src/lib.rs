//! Mediashim API Library
//!
//! Demo HTTP server for the upload middleware: telemetry, request ids and the
//! routes that put `UploaderFactory` middleware in front of upload handlers.

pub mod constants;
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use state::AppState;
