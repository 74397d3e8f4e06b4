//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//!
//! Enum-valued columns (asset type, method, grades, labels) are stored
//! as TEXT and surfaced as `String`; `pipecheck_core::domain` owns
//! canonicalization at the boundary.

pub mod asset;
pub mod defect;
pub mod import_record;
pub mod inspection;
pub mod ml_metric;
pub mod pipeline;
