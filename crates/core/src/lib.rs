//! Pure domain logic for the pipecheck ingestion service.
//!
//! This crate has zero I/O dependencies (no DB, no async, no HTTP). It
//! provides the domain enums, the tabular decoder, schema detection, the
//! field normalizers, and per-row parsing used by the importers.

pub mod domain;
pub mod error;
pub mod ingest;
pub mod search;
pub mod types;
