//! Two-state classifier wrapper: untrained until the first successful
//! fit, then trained and able to continue from its current weights.

use tracing::{debug, warn};

use crate::encoder::CategoricalEncoder;
use crate::model::{LabelNet, ModelConfig};
use crate::training::{encode_features, evaluate, fit, predict, split_index, EvalReport, TrainOptions};
use crate::{InspectionSample, MlError, TrainBackend, FEATURE_COUNT, MIN_TRAIN_ROWS};

/// A labeled inspection used for training.
#[derive(Debug, Clone)]
pub struct LabeledSample {
    pub sample: InspectionSample,
    pub label: String,
}

/// Result of one training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub training_accuracy: f64,
    pub test_accuracy: f64,
    pub train_samples: usize,
    pub test_samples: usize,
    pub training_report: EvalReport,
    pub test_report: EvalReport,
    /// Whether the run continued from existing weights instead of
    /// starting fresh.
    pub continued: bool,
}

enum ClassifierModel {
    Untrained,
    Trained(LabelNet<TrainBackend>),
}

/// Criticality classifier: feature encoders plus the label net.
pub struct Classifier {
    method_encoder: CategoricalEncoder,
    grade_encoder: CategoricalEncoder,
    label_encoder: CategoricalEncoder,
    model: ClassifierModel,
    options: TrainOptions,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            method_encoder: CategoricalEncoder::default(),
            grade_encoder: CategoricalEncoder::default(),
            label_encoder: CategoricalEncoder::default(),
            model: ClassifierModel::Untrained,
            options: TrainOptions::default(),
        }
    }

    /// Rebuild a trained classifier from persisted parts.
    pub fn from_parts(
        method_encoder: CategoricalEncoder,
        grade_encoder: CategoricalEncoder,
        label_encoder: CategoricalEncoder,
        model: LabelNet<TrainBackend>,
    ) -> Self {
        Self {
            method_encoder,
            grade_encoder,
            label_encoder,
            model: ClassifierModel::Trained(model),
            options: TrainOptions::default(),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.model, ClassifierModel::Trained(_))
    }

    pub fn method_encoder(&self) -> &CategoricalEncoder {
        &self.method_encoder
    }

    pub fn grade_encoder(&self) -> &CategoricalEncoder {
        &self.grade_encoder
    }

    pub fn label_encoder(&self) -> &CategoricalEncoder {
        &self.label_encoder
    }

    /// The trained net, if any.
    pub fn model(&self) -> Option<&LabelNet<TrainBackend>> {
        match &self.model {
            ClassifierModel::Trained(model) => Some(model),
            ClassifierModel::Untrained => None,
        }
    }

    /// Train on a batch of labeled samples.
    ///
    /// Fewer than [`MIN_TRAIN_ROWS`] rows leaves the state untouched and
    /// returns `Ok(None)`. Otherwise the batch is split 80/20 by
    /// position, the net is fitted (continuing from current weights
    /// when the label set still matches the output layer, from scratch
    /// otherwise) and both splits are scored.
    pub fn train(&mut self, samples: &[LabeledSample]) -> Result<Option<TrainOutcome>, MlError> {
        if samples.len() < MIN_TRAIN_ROWS {
            debug!(rows = samples.len(), "too few labeled rows, skipping training");
            return Ok(None);
        }

        let can_continue = self.is_trained()
            && self
                .label_encoder
                .covers(samples.iter().map(|s| s.label.as_str()));

        let (model, continued) = if can_continue {
            match self.fit_continued(samples) {
                Ok(model) => (model, true),
                Err(MlError::NonFiniteLoss) => {
                    warn!("continued training diverged, reinitializing");
                    (self.fit_fresh(samples)?, false)
                }
                Err(e) => return Err(e),
            }
        } else {
            (self.fit_fresh(samples)?, false)
        };

        let outcome = self.score(&model, samples, continued)?;
        self.model = ClassifierModel::Trained(model);
        Ok(Some(outcome))
    }

    /// More optimizer steps on the existing net, reusing the fitted
    /// encoders.
    fn fit_continued(&self, samples: &[LabeledSample]) -> Result<LabelNet<TrainBackend>, MlError> {
        let model = match &self.model {
            ClassifierModel::Trained(model) => model.clone(),
            ClassifierModel::Untrained => return Err(MlError::NotTrained),
        };
        let split = split_index(samples.len());
        let (features, targets) = self.encode_labeled(&samples[..split]);
        fit(model, &features, &targets, &self.options)
    }

    /// Refit all encoders on the batch and train a fresh net.
    fn fit_fresh(&mut self, samples: &[LabeledSample]) -> Result<LabelNet<TrainBackend>, MlError> {
        self.method_encoder =
            CategoricalEncoder::fit(samples.iter().map(|s| s.sample.method.as_str()));
        self.grade_encoder = CategoricalEncoder::fit(
            samples
                .iter()
                .filter_map(|s| s.sample.quality_grade.as_deref()),
        );
        self.label_encoder = CategoricalEncoder::fit(samples.iter().map(|s| s.label.as_str()));

        let split = split_index(samples.len());
        let (features, targets) = self.encode_labeled(&samples[..split]);

        let device = Default::default();
        let model: LabelNet<TrainBackend> =
            LabelNet::new(&device, &ModelConfig::new(self.label_encoder.len()));
        fit(model, &features, &targets, &self.options)
    }

    fn encode_labeled(&self, samples: &[LabeledSample]) -> (Vec<[f32; FEATURE_COUNT]>, Vec<usize>) {
        let features = samples
            .iter()
            .map(|s| encode_features(&s.sample, &self.method_encoder, &self.grade_encoder))
            .collect();
        let targets = samples
            .iter()
            .map(|s| self.label_encoder.transform(&s.label).unwrap_or(0))
            .collect();
        (features, targets)
    }

    fn score(
        &self,
        model: &LabelNet<TrainBackend>,
        samples: &[LabeledSample],
        continued: bool,
    ) -> Result<TrainOutcome, MlError> {
        let split = split_index(samples.len());
        let (train_features, train_targets) = self.encode_labeled(&samples[..split]);
        let (test_features, test_targets) = self.encode_labeled(&samples[split..]);

        let train_predicted = predict(model, &train_features)?;
        let training_report = evaluate(&train_predicted, &train_targets, &self.label_encoder);

        let test_report = if test_features.is_empty() {
            EvalReport::default()
        } else {
            let test_predicted = predict(model, &test_features)?;
            evaluate(&test_predicted, &test_targets, &self.label_encoder)
        };

        Ok(TrainOutcome {
            training_accuracy: training_report.accuracy,
            test_accuracy: test_report.accuracy,
            train_samples: split,
            test_samples: samples.len() - split,
            training_report,
            test_report,
            continued,
        })
    }

    /// Predict labels for unlabeled inspections, returning one
    /// `(inspection_id, label)` pair per input row.
    pub fn predict_labels(
        &self,
        samples: &[InspectionSample],
    ) -> Result<Vec<(i64, String)>, MlError> {
        let model = match &self.model {
            ClassifierModel::Trained(model) => model,
            ClassifierModel::Untrained => return Err(MlError::NotTrained),
        };

        let features: Vec<_> = samples
            .iter()
            .map(|s| encode_features(s, &self.method_encoder, &self.grade_encoder))
            .collect();
        let indices = predict(model, &features)?;

        Ok(samples
            .iter()
            .zip(indices)
            .map(|(sample, index)| {
                let label = self
                    .label_encoder
                    .inverse(index)
                    .unwrap_or_default()
                    .to_string();
                (sample.inspection_id, label)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn labeled(id: i64, method: &str, defect: bool, label: &str) -> LabeledSample {
        LabeledSample {
            sample: InspectionSample {
                inspection_id: id,
                method: method.to_string(),
                temperature: Some(20.0),
                humidity: None,
                illumination: None,
                quality_grade: None,
                defect_found: defect,
                max_depth: if defect { Some(2.5) } else { None },
                max_length: None,
                max_width: None,
            },
            label: label.to_string(),
        }
    }

    fn batch(n: usize) -> Vec<LabeledSample> {
        (0..n)
            .map(|i| {
                let defect = i % 2 == 0;
                labeled(
                    i as i64,
                    "UZK",
                    defect,
                    if defect { "high" } else { "normal" },
                )
            })
            .collect()
    }

    #[test]
    fn too_few_rows_leaves_state_untouched() {
        let mut classifier = Classifier::new();
        let outcome = classifier.train(&batch(9)).unwrap();
        assert!(outcome.is_none());
        assert!(!classifier.is_trained());
    }

    #[test]
    fn predict_before_training_fails() {
        let classifier = Classifier::new();
        let result = classifier.predict_labels(&[batch(1)[0].sample.clone()]);
        assert_matches!(result, Err(MlError::NotTrained));
    }

    #[test]
    fn trains_and_predicts() {
        let mut classifier = Classifier::new();
        let outcome = classifier.train(&batch(40)).unwrap().unwrap();
        assert!(classifier.is_trained());
        assert!(!outcome.continued);
        assert_eq!(outcome.train_samples, 32);
        assert_eq!(outcome.test_samples, 8);
        assert!(outcome.training_accuracy > 0.9);

        let unlabeled: Vec<_> = batch(4).iter().map(|s| s.sample.clone()).collect();
        let predictions = classifier.predict_labels(&unlabeled).unwrap();
        assert_eq!(predictions.len(), 4);
        assert!(predictions
            .iter()
            .all(|(_, label)| label == "high" || label == "normal"));
    }

    #[test]
    fn second_run_continues_when_labels_match() {
        let mut classifier = Classifier::new();
        classifier.train(&batch(20)).unwrap().unwrap();
        let outcome = classifier.train(&batch(20)).unwrap().unwrap();
        assert!(outcome.continued);
    }

    #[test]
    fn new_label_forces_retrain_from_scratch() {
        let mut classifier = Classifier::new();
        classifier.train(&batch(20)).unwrap().unwrap();

        let mut samples = batch(20);
        for sample in samples.iter_mut().take(5) {
            sample.label = "medium".to_string();
        }
        let outcome = classifier.train(&samples).unwrap().unwrap();
        assert!(!outcome.continued);
        assert_eq!(classifier.label_encoder().len(), 3);
    }
}
