//! Criticality classifier for inspection records.
//!
//! A small feedforward network (Burn, ndarray backend) stands in for a
//! gradient-boosted model: categorical columns are label-encoded with a
//! -1 sentinel for anything missing or unseen, numeric columns pass
//! through with the same sentinel, and the net is trained full-batch
//! with Adam and cross-entropy loss. Training is incremental: as long
//! as the label set still fits the trained output layer, new batches
//! continue from the current weights.

pub mod classifier;
pub mod encoder;
pub mod model;
pub mod store;
pub mod training;

use burn::backend::{Autodiff, NdArray};

pub use classifier::{Classifier, LabeledSample, TrainOutcome};
pub use encoder::CategoricalEncoder;
pub use model::{LabelNet, ModelConfig};
pub use training::{EvalReport, TrainOptions};

/// Backend used for training. Inference reuses the same backend via
/// `AutodiffModule::valid`.
pub type TrainBackend = Autodiff<NdArray>;

/// Inner backend for inference.
pub type InferBackend = NdArray;

/// Width of the feature vector fed to the net: encoded method,
/// temperature, humidity, illumination, max defect depth, length and
/// width, defect presence flag, encoded quality grade.
pub const FEATURE_COUNT: usize = 9;

/// Sentinel standing in for missing numeric values and unseen or
/// missing categorical values.
pub const MISSING_VALUE: f32 = -1.0;

/// Minimum labeled rows before a training run is attempted.
pub const MIN_TRAIN_ROWS: usize = 10;

/// One inspection flattened into classifier input. Defect dimensions
/// are the per-inspection maxima.
#[derive(Debug, Clone)]
pub struct InspectionSample {
    pub inspection_id: i64,
    pub method: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub quality_grade: Option<String>,
    pub defect_found: bool,
    pub max_depth: Option<f64>,
    pub max_length: Option<f64>,
    pub max_width: Option<f64>,
}

/// Errors from the classifier layer.
#[derive(Debug, thiserror::Error)]
pub enum MlError {
    #[error("model has not been trained yet")]
    NotTrained,

    #[error("not enough training data: {got} rows, need {need}")]
    NotEnoughData { got: usize, need: usize },

    #[error("training produced a non-finite loss")]
    NonFiniteLoss,

    #[error("tensor conversion failed: {0}")]
    Tensor(String),

    #[error("artifact error: {0}")]
    Artifact(String),
}
