//! Persistence for trained classifier artifacts.
//!
//! Two files under the model directory: `encoders.json` holding the
//! fitted category mappings, and `model.mpk` holding the net weights
//! via Burn's compact recorder.

use std::fs;
use std::path::Path;

use burn::module::Module;
use burn::record::CompactRecorder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::Classifier;
use crate::encoder::CategoricalEncoder;
use crate::model::{LabelNet, ModelConfig};
use crate::{MlError, TrainBackend};

const ENCODERS_FILE: &str = "encoders.json";
const MODEL_FILE: &str = "model";

#[derive(Serialize, Deserialize)]
struct EncoderArtifact {
    method: CategoricalEncoder,
    grade: CategoricalEncoder,
    label: CategoricalEncoder,
}

/// Save a trained classifier's encoders and weights under `dir`,
/// creating the directory if needed. Untrained classifiers are
/// rejected.
pub fn save(classifier: &Classifier, dir: &Path) -> Result<(), MlError> {
    let model = classifier.model().ok_or(MlError::NotTrained)?;

    fs::create_dir_all(dir).map_err(|e| MlError::Artifact(e.to_string()))?;

    let artifact = EncoderArtifact {
        method: classifier.method_encoder().clone(),
        grade: classifier.grade_encoder().clone(),
        label: classifier.label_encoder().clone(),
    };
    let json =
        serde_json::to_string_pretty(&artifact).map_err(|e| MlError::Artifact(e.to_string()))?;
    fs::write(dir.join(ENCODERS_FILE), json).map_err(|e| MlError::Artifact(e.to_string()))?;

    model
        .clone()
        .save_file(dir.join(MODEL_FILE), &CompactRecorder::new())
        .map_err(|e| MlError::Artifact(e.to_string()))?;

    info!(dir = %dir.display(), "saved classifier artifacts");
    Ok(())
}

/// Load a trained classifier from `dir`. Returns `Ok(None)` when no
/// artifacts exist yet.
pub fn load(dir: &Path) -> Result<Option<Classifier>, MlError> {
    let encoders_path = dir.join(ENCODERS_FILE);
    if !encoders_path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&encoders_path).map_err(|e| MlError::Artifact(e.to_string()))?;
    let mut artifact: EncoderArtifact =
        serde_json::from_str(&json).map_err(|e| MlError::Artifact(e.to_string()))?;
    artifact.method.rebuild_index();
    artifact.grade.rebuild_index();
    artifact.label.rebuild_index();

    let device = Default::default();
    let config = ModelConfig::new(artifact.label.len());
    let model = LabelNet::<TrainBackend>::new(&device, &config)
        .load_file(dir.join(MODEL_FILE), &CompactRecorder::new(), &device)
        .map_err(|e| MlError::Artifact(e.to_string()))?;

    info!(dir = %dir.display(), "loaded classifier artifacts");
    Ok(Some(Classifier::from_parts(
        artifact.method,
        artifact.grade,
        artifact.label,
        model,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LabeledSample;
    use crate::InspectionSample;

    fn train_small() -> Classifier {
        let samples: Vec<_> = (0..20)
            .map(|i| {
                let defect = i % 2 == 0;
                LabeledSample {
                    sample: InspectionSample {
                        inspection_id: i,
                        method: "VIK".to_string(),
                        temperature: Some(18.0),
                        humidity: None,
                        illumination: None,
                        quality_grade: None,
                        defect_found: defect,
                        max_depth: if defect { Some(1.0) } else { None },
                        max_length: None,
                        max_width: None,
                    },
                    label: if defect { "high" } else { "normal" }.to_string(),
                }
            })
            .collect();
        let mut classifier = Classifier::new();
        classifier.train(&samples).unwrap().unwrap();
        classifier
    }

    #[test]
    fn save_untrained_is_rejected() {
        let dir = std::env::temp_dir().join("pipecheck-ml-untrained");
        let result = save(&Classifier::new(), &dir);
        assert!(result.is_err());
    }

    #[test]
    fn load_missing_dir_returns_none() {
        let loaded = load(Path::new("/nonexistent/pipecheck-model")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("pipecheck-ml-roundtrip");
        let _ = fs::remove_dir_all(&dir);

        let classifier = train_small();
        save(&classifier, &dir).unwrap();

        let loaded = load(&dir).unwrap().expect("artifacts should exist");
        assert!(loaded.is_trained());
        assert_eq!(
            loaded.label_encoder().classes(),
            classifier.label_encoder().classes()
        );

        let sample = InspectionSample {
            inspection_id: 99,
            method: "VIK".to_string(),
            temperature: Some(18.0),
            humidity: None,
            illumination: None,
            quality_grade: None,
            defect_found: true,
            max_depth: Some(1.0),
            max_length: None,
            max_width: None,
        };
        let original = classifier.predict_labels(std::slice::from_ref(&sample)).unwrap();
        let reloaded = loaded.predict_labels(std::slice::from_ref(&sample)).unwrap();
        assert_eq!(original, reloaded);

        let _ = fs::remove_dir_all(&dir);
    }
}
