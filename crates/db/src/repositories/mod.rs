//! Repository layer. Each repository is a stateless struct with
//! associated functions taking a pool or transaction.

pub mod asset_repo;
pub mod defect_repo;
pub mod import_record_repo;
pub mod inspection_repo;
pub mod ml_metric_repo;
pub mod pipeline_repo;

pub use asset_repo::AssetRepo;
pub use defect_repo::DefectRepo;
pub use import_record_repo::ImportRecordRepo;
pub use inspection_repo::InspectionRepo;
pub use ml_metric_repo::MlMetricRepo;
pub use pipeline_repo::PipelineRepo;
