//! # Clinic Desk Backend
//!
//! Front-desk backend for a small clinic: patient, doctor and staff records,
//! appointments, and the walk-in queue.
//!
//! ## Architecture
//!
//! - [`models`]: domain records and identifiers
//! - [`api`]: request DTOs as received over the wire
//! - [`validation`]: turns request DTOs into validated domain inputs
//! - [`listing`]: filters and pagination shared by every list operation
//! - [`queue`]: queue ranking and per-epoch queue numbering
//! - [`db`]: repository traits, the in-memory and PostgreSQL backends, and
//!   the service layer
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod db;
pub mod listing;
pub mod models;
pub mod queue;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;
