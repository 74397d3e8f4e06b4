//! Classifier orchestration: the post-commit ML phase of an inspection
//! import, plus artifact reload at startup.
//!
//! Everything here is best-effort. The import that triggered it has
//! already committed, so failures are logged and surfaced only through
//! a degraded metrics record, never as an import error.

use std::collections::BTreeMap;

use pipecheck_db::models::inspection::LabeledInspectionRow;
use pipecheck_db::models::ml_metric::CreateMlMetric;
use pipecheck_db::repositories::{InspectionRepo, MlMetricRepo};
use pipecheck_ml::{store, Classifier, InspectionSample, LabeledSample, TrainOutcome, MIN_TRAIN_ROWS};
use tracing::{debug, info, warn};

use crate::state::AppState;

fn row_to_sample(row: &LabeledInspectionRow) -> InspectionSample {
    InspectionSample {
        inspection_id: row.id,
        method: row.method.clone(),
        temperature: row.temperature,
        humidity: row.humidity,
        illumination: row.illumination,
        quality_grade: row.quality_grade.clone(),
        defect_found: row.defect_found,
        max_depth: row.max_depth,
        max_length: row.max_length,
        max_width: row.max_width,
    }
}

/// Run the ML phase after an inspection import: train on the labeled
/// rows, predict labels for the unlabeled ones, persist one metrics
/// record. Returns an error only for the caller to log.
pub async fn run_after_import(
    state: &AppState,
    labeled: Vec<LabeledSample>,
    unlabeled: Vec<InspectionSample>,
) -> Result<(), String> {
    let mut classifier = state.classifier.lock().await;

    let training = train(state, &mut classifier, labeled).await?;
    let (predicted_count, predicted_distribution) =
        predict(state, &mut classifier, unlabeled).await?;

    save_metrics(state, training.as_ref(), predicted_count, predicted_distribution).await?;
    Ok(())
}

/// Train on the new batch, prefixed with the full labeled history when
/// the classifier has been trained before.
///
/// The size gate applies to the new batch alone: a trickle of labeled
/// rows must not trigger a full retrain over the history.
async fn train(
    state: &AppState,
    classifier: &mut Classifier,
    labeled: Vec<LabeledSample>,
) -> Result<Option<TrainOutcome>, String> {
    if !batch_trainable(labeled.len()) {
        debug!(
            rows = labeled.len(),
            "too few labeled rows in batch, skipping training"
        );
        return Ok(None);
    }

    let samples = if classifier.is_trained() {
        let historical = InspectionRepo::list_labeled_with_defect_dims(&state.pool)
            .await
            .map_err(|e| format!("historical reload failed: {e}"))?;
        let mut samples: Vec<LabeledSample> = historical
            .iter()
            .map(|row| LabeledSample {
                sample: row_to_sample(row),
                label: row.criticality_label.clone(),
            })
            .collect();
        samples.extend(labeled);
        samples
    } else {
        labeled
    };

    let outcome = classifier
        .train(&samples)
        .map_err(|e| format!("training failed: {e}"))?;

    if let Some(outcome) = &outcome {
        info!(
            train_samples = outcome.train_samples,
            test_samples = outcome.test_samples,
            training_accuracy = outcome.training_accuracy,
            test_accuracy = outcome.test_accuracy,
            continued = outcome.continued,
            "classifier trained"
        );
        if let Err(e) = store::save(classifier, &state.config.model_dir) {
            warn!(error = %e, "failed to save classifier artifacts");
        }
    }
    Ok(outcome)
}

/// Whether the labeled rows of the new batch alone reach the training
/// floor. Checked before the historical reload so a trickle of labeled
/// rows never triggers a full retrain over the history.
fn batch_trainable(rows: usize) -> bool {
    rows >= MIN_TRAIN_ROWS
}

/// Tally how often each label value was predicted.
fn tally_predictions(predictions: &[(i64, String)]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for (_, label) in predictions {
        *distribution.entry(label.clone()).or_insert(0) += 1;
    }
    distribution
}

/// Predict labels for the unlabeled batch rows and write them back onto
/// the inspections, returning the applied count and the distribution of
/// predicted label values. No-op while the classifier is untrained.
async fn predict(
    state: &AppState,
    classifier: &mut Classifier,
    unlabeled: Vec<InspectionSample>,
) -> Result<(i32, BTreeMap<String, usize>), String> {
    if !classifier.is_trained() || unlabeled.is_empty() {
        return Ok((0, BTreeMap::new()));
    }

    let predictions = classifier
        .predict_labels(&unlabeled)
        .map_err(|e| format!("prediction failed: {e}"))?;
    let distribution = tally_predictions(&predictions);
    let applied = InspectionRepo::apply_labels(&state.pool, &predictions)
        .await
        .map_err(|e| format!("writing predicted labels failed: {e}"))?;

    info!(applied, "predicted criticality labels applied");
    Ok((applied as i32, distribution))
}

/// Persist one metrics row. The label distribution is the one observed
/// over the newly predicted rows; phases that produced nothing leave
/// their fields zeroed.
async fn save_metrics(
    state: &AppState,
    training: Option<&TrainOutcome>,
    predicted_count: i32,
    predicted_distribution: BTreeMap<String, usize>,
) -> Result<(), String> {
    let label_distribution = serde_json::to_value(&predicted_distribution).unwrap_or_default();

    let input = match training {
        Some(outcome) => CreateMlMetric {
            training_accuracy: outcome.training_accuracy,
            test_accuracy: outcome.test_accuracy,
            train_samples: outcome.train_samples as i32,
            test_samples: outcome.test_samples as i32,
            training_report: serde_json::to_value(&outcome.training_report)
                .unwrap_or_default(),
            test_report: serde_json::to_value(&outcome.test_report).unwrap_or_default(),
            label_distribution,
            predicted_count,
        },
        None => CreateMlMetric {
            training_accuracy: 0.0,
            test_accuracy: 0.0,
            train_samples: 0,
            test_samples: 0,
            training_report: serde_json::Value::Object(serde_json::Map::new()),
            test_report: serde_json::Value::Object(serde_json::Map::new()),
            label_distribution,
            predicted_count,
        },
    };

    MlMetricRepo::create(&state.pool, &input)
        .await
        .map_err(|e| format!("saving metrics failed: {e}"))?;
    Ok(())
}

/// Reload persisted classifier artifacts at startup. A missing or
/// unreadable artifact set starts the service untrained.
pub fn load_at_startup(model_dir: &std::path::Path) -> Classifier {
    match store::load(model_dir) {
        Ok(Some(classifier)) => {
            info!("classifier artifacts loaded");
            classifier
        }
        Ok(None) => {
            info!("no classifier artifacts found, starting untrained");
            Classifier::new()
        }
        Err(e) => {
            warn!(error = %e, "failed to load classifier artifacts, starting untrained");
            Classifier::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_floor_applies_to_the_batch_size() {
        assert!(!batch_trainable(0));
        assert!(!batch_trainable(MIN_TRAIN_ROWS - 1));
        assert!(batch_trainable(MIN_TRAIN_ROWS));
    }

    #[test]
    fn tally_counts_each_predicted_label() {
        let predictions = vec![
            (1, "high".to_string()),
            (2, "normal".to_string()),
            (3, "high".to_string()),
        ];
        let distribution = tally_predictions(&predictions);

        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution["high"], 2);
        assert_eq!(distribution["normal"], 1);
    }
}
