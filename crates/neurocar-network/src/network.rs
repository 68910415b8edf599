use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::operators;

/// A network shape that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("network needs at least an input and an output layer, got {layers} layers")]
    TooFewLayers { layers: usize },
    #[display("layer {layer} has no neurons")]
    EmptyLayer { layer: usize },
    #[display("layer {layer} expects {expected} {kind}, got {actual}")]
    ParameterCount {
        layer: usize,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Inputs whose length does not match the input layer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("network expects {expected} inputs, got {actual}")]
pub struct InputSizeError {
    pub expected: usize,
    pub actual: usize,
}

/// Fully-connected layer mapping `inputs` values to `outputs` values.
///
/// Weights are stored row-major: the weights feeding output `j` are
/// `weights[j * inputs..(j + 1) * inputs]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    fn zeros(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    fn forward(&self, inputs: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum = row.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>();
                sigmoid(sum + bias)
            })
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Feed-forward neural network with sigmoid activation.
///
/// The shape lists the width of every layer, input layer first. A network of shape
/// `[10, 8, 4]` takes 10 inputs, has one hidden layer of 8 neurons and produces 4
/// outputs in `(0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkData")]
pub struct NeuralNetwork {
    shape: Vec<usize>,
    layers: Vec<Layer>,
}

#[derive(Deserialize)]
struct NetworkData {
    shape: Vec<usize>,
    layers: Vec<Layer>,
}

impl TryFrom<NetworkData> for NeuralNetwork {
    type Error = ShapeError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        let network = Self::new(&data.shape)?;
        if data.layers.len() != network.layers.len() {
            return Err(ShapeError::ParameterCount {
                layer: 0,
                kind: "layers",
                expected: network.layers.len(),
                actual: data.layers.len(),
            });
        }
        for (i, (expected, actual)) in network.layers.iter().zip(&data.layers).enumerate() {
            let layer = i + 1;
            if actual.inputs != expected.inputs || actual.outputs != expected.outputs {
                return Err(ShapeError::ParameterCount {
                    layer,
                    kind: "neurons",
                    expected: expected.outputs,
                    actual: actual.outputs,
                });
            }
            if actual.weights.len() != expected.weights.len() {
                return Err(ShapeError::ParameterCount {
                    layer,
                    kind: "weights",
                    expected: expected.weights.len(),
                    actual: actual.weights.len(),
                });
            }
            if actual.biases.len() != expected.biases.len() {
                return Err(ShapeError::ParameterCount {
                    layer,
                    kind: "biases",
                    expected: expected.biases.len(),
                    actual: actual.biases.len(),
                });
            }
        }
        Ok(Self {
            shape: data.shape,
            layers: data.layers,
        })
    }
}

impl NeuralNetwork {
    /// Creates a network of the given shape with all parameters set to zero.
    pub fn new(shape: &[usize]) -> Result<Self, ShapeError> {
        if shape.len() < 2 {
            return Err(ShapeError::TooFewLayers {
                layers: shape.len(),
            });
        }
        if let Some(layer) = shape.iter().position(|&n| n == 0) {
            return Err(ShapeError::EmptyLayer { layer });
        }
        let layers = shape
            .windows(2)
            .map(|w| Layer::zeros(w[0], w[1]))
            .collect();
        Ok(Self {
            shape: shape.to_vec(),
            layers,
        })
    }

    /// Creates a network of the given shape with random parameters.
    pub fn random<R>(shape: &[usize], rng: &mut R) -> Result<Self, ShapeError>
    where
        R: Rng + ?Sized,
    {
        let mut network = Self::new(shape)?;
        network.synthesize(rng);
        Ok(network)
    }

    /// Replaces every parameter with a random value.
    ///
    /// Weights follow `N(0, 1 / inputs)` (Xavier initialization) so that the sigmoid
    /// of the first layers does not saturate; biases follow `N(0, 1)`.
    #[expect(clippy::cast_precision_loss)]
    pub fn synthesize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for layer in &mut self.layers {
            let weight_std = (1.0 / layer.inputs as f64).sqrt();
            for w in &mut layer.weights {
                *w = weight_std * rng.sample::<f64, _>(StandardNormal);
            }
            for b in &mut layer.biases {
                *b = rng.sample(StandardNormal);
            }
        }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.shape[0]
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.shape[self.shape.len() - 1]
    }

    /// Weight of the connection from `input` to `output` in connection layer `layer`.
    ///
    /// Connection layer `0` links the input layer to the first hidden layer.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    #[must_use]
    pub fn weight(&self, layer: usize, input: usize, output: usize) -> f64 {
        let layer = &self.layers[layer];
        assert!(input < layer.inputs);
        layer.weights[output * layer.inputs + input]
    }

    pub fn set_weight(&mut self, layer: usize, input: usize, output: usize, value: f64) {
        let layer = &mut self.layers[layer];
        assert!(input < layer.inputs);
        layer.weights[output * layer.inputs + input] = value;
    }

    #[must_use]
    pub fn bias(&self, layer: usize, output: usize) -> f64 {
        self.layers[layer].biases[output]
    }

    pub fn set_bias(&mut self, layer: usize, output: usize, value: f64) {
        self.layers[layer].biases[output] = value;
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Iterates over all weights and biases, layer by layer.
    pub fn parameters(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().chain(&l.biases).copied())
    }

    /// Runs a forward pass.
    pub fn compute(&self, inputs: &[f64]) -> Result<Vec<f64>, InputSizeError> {
        if inputs.len() != self.input_size() {
            return Err(InputSizeError {
                expected: self.input_size(),
                actual: inputs.len(),
            });
        }
        let mut values = inputs.to_vec();
        for layer in &self.layers {
            values = layer.forward(&values);
        }
        Ok(values)
    }

    /// Uniform crossover: every weight and bias comes from `self` or `partner` with
    /// equal probability.
    ///
    /// The offspring owns fresh parameter storage.
    ///
    /// # Panics
    ///
    /// Panics if the networks have different shapes.
    #[must_use]
    pub fn crossover<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            self.shape, partner.shape,
            "crossover requires networks of the same shape"
        );
        let layers = self
            .layers
            .iter()
            .zip(&partner.layers)
            .map(|(a, b)| Layer {
                inputs: a.inputs,
                outputs: a.outputs,
                weights: operators::uniform_crossover(&a.weights, &b.weights, rng),
                biases: operators::uniform_crossover(&a.biases, &b.biases, rng),
            })
            .collect();
        Self {
            shape: self.shape.clone(),
            layers,
        }
    }

    /// Perturbs each weight and bias with probability `rate`.
    ///
    /// See [`operators::mutate`] for the perturbation rule.
    pub fn mutate<R>(&mut self, rate: f64, strength: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for layer in &mut self.layers {
            operators::mutate(&mut layer.weights, rate, strength, rng);
            operators::mutate(&mut layer.biases, rate, strength, rng);
        }
    }
}
