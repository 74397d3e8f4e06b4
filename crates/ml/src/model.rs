//! Network definition for the criticality classifier.

use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::FEATURE_COUNT;

/// Architecture parameters for [`LabelNet`].
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub hidden_size_1: usize,
    pub hidden_size_2: usize,
    /// Width of the output layer; one logit per criticality label.
    pub num_classes: usize,
}

impl ModelConfig {
    pub fn new(num_classes: usize) -> Self {
        Self {
            hidden_size_1: 32,
            hidden_size_2: 16,
            num_classes,
        }
    }
}

/// Feedforward classifier over the flat inspection feature vector.
#[derive(Module, Debug)]
pub struct LabelNet<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
    linear_out: Linear<B>,
    activation: Relu,
}

impl<B: Backend> LabelNet<B> {
    pub fn new(device: &B::Device, config: &ModelConfig) -> Self {
        let linear1 = LinearConfig::new(FEATURE_COUNT, config.hidden_size_1).init(device);
        let linear2 = LinearConfig::new(config.hidden_size_1, config.hidden_size_2).init(device);
        let linear_out = LinearConfig::new(config.hidden_size_2, config.num_classes).init(device);

        Self {
            linear1,
            linear2,
            linear_out,
            activation: Relu::new(),
        }
    }

    /// Forward pass. Input shape `[batch, FEATURE_COUNT]`, output shape
    /// `[batch, num_classes]` of unnormalized logits.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear1.forward(input);
        let x = self.activation.forward(x);
        let x = self.linear2.forward(x);
        let x = self.activation.forward(x);
        self.linear_out.forward(x)
    }

    /// Width of the output layer.
    pub fn num_classes(&self) -> usize {
        self.linear_out.weight.shape().dims[1]
    }

    /// Device the parameters live on.
    pub fn device(&self) -> B::Device {
        self.linear1.weight.device()
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn output_shape_matches_num_classes() {
        let device = Default::default();
        let model: LabelNet<TestBackend> = LabelNet::new(&device, &ModelConfig::new(3));
        let input = Tensor::<TestBackend, 2>::zeros([4, FEATURE_COUNT], &device);
        let output = model.forward(input);
        assert_eq!(output.shape().dims, [4, 3]);
        assert_eq!(model.num_classes(), 3);
    }
}
