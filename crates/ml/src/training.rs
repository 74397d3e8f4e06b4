//! Training and evaluation for the label net.

use std::collections::BTreeMap;

use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use serde::Serialize;
use tracing::debug;

use crate::encoder::CategoricalEncoder;
use crate::model::LabelNet;
use crate::{InspectionSample, MlError, FEATURE_COUNT, MISSING_VALUE};

/// Full-batch training options.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub epochs: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            epochs: 200,
        }
    }
}

/// Per-class metrics, sklearn-style. Undefined ratios are reported
/// as zero.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Evaluation summary over one split.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalReport {
    pub accuracy: f64,
    pub classes: BTreeMap<String, ClassMetrics>,
    pub samples: usize,
}

/// Flatten one sample into its feature vector. Missing numerics and
/// unmapped categories become the sentinel.
pub fn encode_features(
    sample: &InspectionSample,
    method_encoder: &CategoricalEncoder,
    grade_encoder: &CategoricalEncoder,
) -> [f32; FEATURE_COUNT] {
    let num = |v: Option<f64>| v.map_or(MISSING_VALUE, |x| x as f32);
    [
        method_encoder.encode_feature(Some(&sample.method)),
        num(sample.temperature),
        num(sample.humidity),
        num(sample.illumination),
        num(sample.max_depth),
        num(sample.max_length),
        num(sample.max_width),
        if sample.defect_found { 1.0 } else { 0.0 },
        grade_encoder.encode_feature(sample.quality_grade.as_deref()),
    ]
}

/// Split rows 80/20 by position: train gets the first 80 percent.
pub fn split_index(total: usize) -> usize {
    (total * 4) / 5
}

fn features_tensor<B: Backend>(
    features: &[[f32; FEATURE_COUNT]],
    device: &B::Device,
) -> Tensor<B, 2> {
    let flat: Vec<f32> = features.iter().flatten().copied().collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([features.len(), FEATURE_COUNT])
}

fn targets_tensor<B: Backend>(targets: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let ints: Vec<i32> = targets.iter().map(|&t| t as i32).collect();
    Tensor::<B, 1, Int>::from_ints(ints.as_slice(), device)
}

/// Run further optimizer steps on `model` over the full batch.
///
/// The caller decides whether `model` is freshly initialized or carries
/// weights from an earlier run. Fails with [`MlError::NonFiniteLoss`]
/// when the loss degenerates, leaving it to the caller to re-initialize.
pub fn fit<B: AutodiffBackend>(
    mut model: LabelNet<B>,
    features: &[[f32; FEATURE_COUNT]],
    targets: &[usize],
    options: &TrainOptions,
) -> Result<LabelNet<B>, MlError> {
    if features.is_empty() {
        return Err(MlError::NotEnoughData { got: 0, need: 1 });
    }

    let device = model.device();
    let input = features_tensor::<B>(features, &device);
    let target = targets_tensor::<B>(targets, &device);

    let loss_fn = CrossEntropyLossConfig::new().init(&device);
    let mut optimizer = AdamConfig::new().init();
    let mut last_loss = f32::NAN;

    for epoch in 0..options.epochs {
        let logits = model.forward(input.clone());
        let loss = loss_fn.forward(logits, target.clone());

        let loss_value: f32 = loss
            .clone()
            .into_data()
            .to_vec()
            .unwrap_or_else(|_| vec![f32::NAN])
            .first()
            .copied()
            .unwrap_or(f32::NAN);
        if !loss_value.is_finite() {
            return Err(MlError::NonFiniteLoss);
        }
        last_loss = loss_value;

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(options.learning_rate, model, grads);

        if epoch % 50 == 0 {
            debug!(epoch, loss = loss_value, "training step");
        }
    }

    debug!(loss = last_loss, epochs = options.epochs, "training done");
    Ok(model)
}

/// Predict class indices for a feature batch.
pub fn predict<B: AutodiffBackend>(
    model: &LabelNet<B>,
    features: &[[f32; FEATURE_COUNT]],
) -> Result<Vec<usize>, MlError> {
    if features.is_empty() {
        return Ok(Vec::new());
    }
    let model = model.valid();
    let device = model.device();
    let input = features_tensor::<B::InnerBackend>(features, &device);
    let logits = model.forward(input);
    let indices = logits
        .argmax(1)
        .squeeze::<1>(1)
        .into_data()
        .to_vec::<i64>()
        .map_err(|e| MlError::Tensor(format!("{e:?}")))?;
    Ok(indices.into_iter().map(|i| i as usize).collect())
}

/// Score predictions against true class indices, reporting accuracy and
/// per-class precision, recall, F1 and support keyed by label string.
pub fn evaluate(
    predicted: &[usize],
    actual: &[usize],
    label_encoder: &CategoricalEncoder,
) -> EvalReport {
    let total = actual.len();
    if total == 0 {
        return EvalReport::default();
    }

    let num_classes = label_encoder.len();
    let mut tp = vec![0usize; num_classes];
    let mut fp = vec![0usize; num_classes];
    let mut fn_ = vec![0usize; num_classes];
    let mut support = vec![0usize; num_classes];
    let mut correct = 0usize;

    for (&p, &a) in predicted.iter().zip(actual) {
        if a < num_classes {
            support[a] += 1;
        }
        if p == a {
            correct += 1;
            if a < num_classes {
                tp[a] += 1;
            }
        } else {
            if p < num_classes {
                fp[p] += 1;
            }
            if a < num_classes {
                fn_[a] += 1;
            }
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let mut classes = BTreeMap::new();
    for i in 0..num_classes {
        let precision = ratio(tp[i], tp[i] + fp[i]);
        let recall = ratio(tp[i], tp[i] + fn_[i]);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        let label = label_encoder.inverse(i).unwrap_or_default().to_string();
        classes.insert(
            label,
            ClassMetrics {
                precision,
                recall,
                f1,
                support: support[i],
            },
        );
    }

    EvalReport {
        accuracy: correct as f64 / total as f64,
        classes,
        samples: total,
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ModelConfig;
    use crate::TrainBackend;

    use super::*;

    fn sample(method: &str, temp: f64, defect: bool) -> InspectionSample {
        InspectionSample {
            inspection_id: 0,
            method: method.to_string(),
            temperature: Some(temp),
            humidity: None,
            illumination: None,
            quality_grade: None,
            defect_found: defect,
            max_depth: None,
            max_length: None,
            max_width: None,
        }
    }

    #[test]
    fn feature_vector_layout() {
        let methods = CategoricalEncoder::fit(["UZK", "VIK"]);
        let grades = CategoricalEncoder::fit(["satisfactory"]);
        let features = encode_features(&sample("VIK", 21.5, true), &methods, &grades);
        assert_eq!(features[0], 1.0);
        assert_eq!(features[1], 21.5);
        assert_eq!(features[2], MISSING_VALUE);
        assert_eq!(features[7], 1.0);
        assert_eq!(features[8], MISSING_VALUE);
    }

    #[test]
    fn split_index_is_eighty_percent() {
        assert_eq!(split_index(10), 8);
        assert_eq!(split_index(11), 8);
        assert_eq!(split_index(4), 3);
        assert_eq!(split_index(0), 0);
    }

    #[test]
    fn fit_then_predict_separable_data() {
        let methods = CategoricalEncoder::fit(["UZK", "VIK"]);
        let grades = CategoricalEncoder::fit(std::iter::empty());
        let labels = CategoricalEncoder::fit(["high", "normal"]);

        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..40 {
            let defect = i % 2 == 0;
            features.push(encode_features(
                &sample("UZK", 20.0, defect),
                &methods,
                &grades,
            ));
            targets.push(labels.transform(if defect { "high" } else { "normal" }).unwrap());
        }

        let device = Default::default();
        let model: LabelNet<TrainBackend> = LabelNet::new(&device, &ModelConfig::new(labels.len()));
        let model = fit(model, &features, &targets, &TrainOptions::default()).unwrap();

        let predicted = predict(&model, &features).unwrap();
        let report = evaluate(&predicted, &targets, &labels);
        assert!(report.accuracy > 0.9, "accuracy was {}", report.accuracy);
    }

    #[test]
    fn evaluate_zero_division_reports_zero() {
        let labels = CategoricalEncoder::fit(["high", "normal"]);
        // "high" never predicted and never present: all ratios undefined.
        let report = evaluate(&[1, 1], &[1, 1], &labels);
        let high = &report.classes["high"];
        assert_eq!(high.precision, 0.0);
        assert_eq!(high.recall, 0.0);
        assert_eq!(high.f1, 0.0);
        assert_eq!(high.support, 0);
        assert_eq!(report.accuracy, 1.0);
    }
}
