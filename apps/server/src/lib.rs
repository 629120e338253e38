//! Convene listing service
//!
//! Tenant-scoped, paginated listings of events, event schedules and speakers over a
//! document store, served as JSON over HTTP. The query engine lives in
//! `convene-query`; this crate supplies the domain models, per-listing query shapes,
//! the Postgres executor and the HTTP host.

#![allow(
    clippy::large_enum_variant,      // Error variants carry owned context
)]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod queries;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
