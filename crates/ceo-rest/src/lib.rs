//! # CEO REST
//!
//! REST API layer using Axum for the CEO platform.
//! Provides the `/api` endpoints for authentication, organizations, reports,
//! dashboards and notifications, plus health checks and the OpenAPI document.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
