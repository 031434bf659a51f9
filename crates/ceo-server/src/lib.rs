//! # CEO Server
//!
//! Process wiring for the CEO platform: the dependency container that turns
//! configuration into repositories, senders and services, and the startup
//! helpers used by the `ceo-server` binary.

pub mod di;
pub mod startup;

pub use di::AppContainer;
