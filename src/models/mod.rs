//! Request and Response models for the badge server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query parameters and serializing JSON bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::CallbackParams;
pub use responses::{ErrorResponse, HealthResponse};
