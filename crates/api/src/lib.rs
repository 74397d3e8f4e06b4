//! Pipecheck API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! importers, classifier service) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod ml_service;
pub mod response;
pub mod routes;
pub mod state;
