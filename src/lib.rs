//! Incident record service.
//!
//! CRUD over a single `Incident` entity backed by PostgreSQL (or an
//! in-memory store), with a best-effort outbound notification fired when a
//! Critical or High incident is created.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod processing;
pub mod state;

pub use error::{AppError, Result};
