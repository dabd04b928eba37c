//! HTTP adapter for the shortlink service.
//!
//! Validates requests, calls into [`shortlink_service::Shortener`] and maps
//! its errors onto status codes.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use app::App;
pub use state::AppState;
