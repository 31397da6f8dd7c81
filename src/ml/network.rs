// ============================================================
// Layer 5 — Text Classification Network
// ============================================================
// A 3-layer fully connected network, one per characteristic:
//
//   input  (vocabulary size, linear passthrough)
//     │  hidden: Linear [input → input/2] + bias, sigmoid
//     ▼
//   hidden
//     │  output: Linear [hidden → values]  + bias, sigmoid
//     ▼
//   output (one neuron per characteristic value)
//
// The topology is fixed when the network is built. Training works
// on the unpacked `NetworkParams` view and hands back a new network.
//
// Why half the input size for the hidden layer?
//   Inputs are sparse presence flags, usually a few hundred to a few
//   thousand of them. Halving gives the network room to combine
//   words without the weight count growing with input².
//
// Why sigmoid on the output instead of softmax?
//   Each output neuron is trained towards 0 or 1 on its own, and the
//   decoder only needs the arg-max. The squared-error gradient of a
//   sigmoid output is also what the RPROP trainer expects.
//
// TextNetwork vs NetworkParams:
//   TextNetwork is the burn Module (two nn::Linear layers).
//   NetworkParams is the same four tensors without the Module
//   wrappers. It can be shared between threads, which is what the
//   trainer's workers and concurrent inference need.

use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    module::Param,
    nn::Linear,
    prelude::*,
    tensor::{activation::sigmoid, TensorData},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};

/// CPU backend; the networks are small and dense.
pub type NetBackend = NdArray<f32>;
pub type NetDevice  = NdArrayDevice;

/// Initial weights are drawn uniformly from [-INIT_RANGE, INIT_RANGE).
const INIT_RANGE: f32 = 1.0;

// ─── Topology ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// One neuron per vocabulary word
    pub input:  usize,

    /// `input / 2`, at least 1
    pub hidden: usize,

    /// One neuron per characteristic value
    pub output: usize,
}

impl Topology {
    /// `[input, input / 2, output]`; a one-word vocabulary still gets
    /// a single hidden neuron.
    pub fn for_sizes(input: usize, output: usize) -> Self {
        Self { input, hidden: (input / 2).max(1), output }
    }

    pub fn hidden_weights(&self) -> usize {
        self.input * self.hidden
    }

    pub fn output_weights(&self) -> usize {
        self.hidden * self.output
    }
}

// ─── NetworkParams ────────────────────────────────────────────────────────────
/// Raw tensors of a network, laid out the way `nn::Linear` stores them
/// (`weight` is `[d_input, d_output]`).
#[derive(Debug, Clone)]
pub struct NetworkParams<B: Backend> {
    pub hidden_weight: Tensor<B, 2>,
    pub hidden_bias:   Tensor<B, 1>,
    pub output_weight: Tensor<B, 2>,
    pub output_bias:   Tensor<B, 1>,
}

impl<B: Backend> NetworkParams<B> {
    /// Hidden and output activations for a batch `[rows, input]`.
    pub fn activations(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let hidden = sigmoid(
            input.matmul(self.hidden_weight.clone()) + self.hidden_bias.clone().unsqueeze::<2>(),
        );
        let output = sigmoid(
            hidden.clone().matmul(self.output_weight.clone()) + self.output_bias.clone().unsqueeze::<2>(),
        );
        (hidden, output)
    }

    pub fn topology(&self) -> Topology {
        let [input, hidden] = self.hidden_weight.dims();
        let [_, output]     = self.output_weight.dims();
        Topology { input, hidden, output }
    }

    /// Forward pass for a single input vector. Only reads the tensors,
    /// so it is safe to call from many threads at once.
    pub fn compute(&self, input: &[f32]) -> Vec<f32> {
        let device      = self.hidden_weight.device();
        let batch       = matrix(input.to_vec(), [1, input.len()], &device);
        let (_, output) = self.activations(batch);
        to_vec(output)
    }
}

// ─── TextNetwork ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct TextNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> TextNetwork<B> {
    /// Fresh network with pseudo-random weights and biases.
    pub fn random(topology: Topology, seed: u64, device: &B::Device) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draw = |n: usize| -> Vec<f32> {
            (0..n).map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE)).collect()
        };

        let hidden_weight = draw(topology.hidden_weights());
        let hidden_bias   = draw(topology.hidden);
        let output_weight = draw(topology.output_weights());
        let output_bias   = draw(topology.output);

        Self::from_params(NetworkParams {
            hidden_weight: matrix(hidden_weight, [topology.input, topology.hidden], device),
            hidden_bias:   vector(hidden_bias, device),
            output_weight: matrix(output_weight, [topology.hidden, topology.output], device),
            output_bias:   vector(output_bias, device),
        })
    }

    pub fn from_params(params: NetworkParams<B>) -> Self {
        Self {
            hidden: Linear {
                weight: Param::from_tensor(params.hidden_weight),
                bias:   Some(Param::from_tensor(params.hidden_bias)),
            },
            output: Linear {
                weight: Param::from_tensor(params.output_weight),
                bias:   Some(Param::from_tensor(params.output_bias)),
            },
        }
    }

    pub fn params(&self) -> NetworkParams<B> {
        let hidden_weight = self.hidden.weight.val();
        let output_weight = self.output.weight.val();
        let [_, hidden]   = hidden_weight.dims();
        let [_, output]   = output_weight.dims();
        let device        = hidden_weight.device();

        NetworkParams {
            hidden_bias: bias_or_zeros(&self.hidden, hidden, &device),
            output_bias: bias_or_zeros(&self.output, output, &device),
            hidden_weight,
            output_weight,
        }
    }

    pub fn topology(&self) -> Topology {
        let [input, hidden] = self.hidden.weight.dims();
        let [_, output]     = self.output.weight.dims();
        Topology { input, hidden, output }
    }

    /// Forward pass over a batch `[rows, input]` → `[rows, output]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let hidden = sigmoid(self.hidden.forward(input));
        sigmoid(self.output.forward(hidden))
    }

    /// Forward pass for a single input vector.
    pub fn compute(&self, input: &[f32]) -> Vec<f32> {
        let device = self.hidden.weight.device();
        let batch  = matrix(input.to_vec(), [1, input.len()], &device);
        to_vec(self.forward(batch))
    }

    /// Flattened weights in row-major order, for snapshots.
    pub fn to_flat(&self) -> FlatWeights {
        let params = self.params();
        FlatWeights {
            topology:      self.topology(),
            hidden_weight: to_vec(params.hidden_weight),
            hidden_bias:   to_vec(params.hidden_bias),
            output_weight: to_vec(params.output_weight),
            output_bias:   to_vec(params.output_bias),
        }
    }

    /// Rebuild a network from flattened weights, checking every length
    /// against the declared topology.
    pub fn from_flat(flat: FlatWeights, device: &B::Device) -> Result<Self> {
        let t = flat.topology;
        if t.input == 0 || t.hidden == 0 || t.output == 0 {
            return Err(ClassifierError::CorruptModel(format!(
                "degenerate topology {}x{}x{}", t.input, t.hidden, t.output
            )));
        }

        check_len("hidden weights", flat.hidden_weight.len(), t.hidden_weights())?;
        check_len("hidden biases", flat.hidden_bias.len(), t.hidden)?;
        check_len("output weights", flat.output_weight.len(), t.output_weights())?;
        check_len("output biases", flat.output_bias.len(), t.output)?;

        if flat.iter_all().any(|w| !w.is_finite()) {
            return Err(ClassifierError::CorruptModel("non-finite weight".to_string()));
        }

        Ok(Self::from_params(NetworkParams {
            hidden_weight: matrix(flat.hidden_weight, [t.input, t.hidden], device),
            hidden_bias:   vector(flat.hidden_bias, device),
            output_weight: matrix(flat.output_weight, [t.hidden, t.output], device),
            output_bias:   vector(flat.output_bias, device),
        }))
    }
}

// ─── FlatWeights ──────────────────────────────────────────────────────────────
/// Plain-vector form of a network's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatWeights {
    pub topology:      Topology,
    pub hidden_weight: Vec<f32>,
    pub hidden_bias:   Vec<f32>,
    pub output_weight: Vec<f32>,
    pub output_bias:   Vec<f32>,
}

impl FlatWeights {
    fn iter_all(&self) -> impl Iterator<Item = &f32> {
        self.hidden_weight
            .iter()
            .chain(&self.hidden_bias)
            .chain(&self.output_weight)
            .chain(&self.output_bias)
    }
}

// ─── Tensor helpers ───────────────────────────────────────────────────────────

pub(crate) fn matrix<B: Backend>(values: Vec<f32>, shape: [usize; 2], device: &B::Device) -> Tensor<B, 2> {
    Tensor::from_data(TensorData::new(values, shape), device)
}

fn vector<B: Backend>(values: Vec<f32>, device: &B::Device) -> Tensor<B, 1> {
    let len = values.len();
    Tensor::from_data(TensorData::new(values, [len]), device)
}

fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}

fn bias_or_zeros<B: Backend>(layer: &Linear<B>, size: usize, device: &B::Device) -> Tensor<B, 1> {
    match &layer.bias {
        Some(bias) => bias.val(),
        None       => Tensor::zeros([size], device),
    }
}

fn check_len(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ClassifierError::CorruptModel(format!(
            "{what}: expected {expected} values, found {actual}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> NetDevice {
        NetDevice::default()
    }

    #[test]
    fn test_topology_halves_input() {
        assert_eq!(Topology::for_sizes(10, 3), Topology { input: 10, hidden: 5, output: 3 });
        assert_eq!(Topology::for_sizes(7, 2).hidden, 3);
        assert_eq!(Topology::for_sizes(1, 2).hidden, 1);
    }

    #[test]
    fn test_random_network_has_requested_shape() {
        let topology = Topology::for_sizes(6, 4);
        let net = TextNetwork::<NetBackend>::random(topology, 1, &device());
        assert_eq!(net.topology(), topology);
        assert_eq!(net.params().topology(), topology);
    }

    #[test]
    fn test_outputs_are_sigmoid_bounded() {
        let net = TextNetwork::<NetBackend>::random(Topology::for_sizes(4, 3), 9, &device());
        let out = net.compute(&[1.0, 0.0, 1.0, 1.0]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&o| o > 0.0 && o < 1.0));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let t = Topology::for_sizes(4, 2);
        let a = TextNetwork::<NetBackend>::random(t, 5, &device()).to_flat();
        let b = TextNetwork::<NetBackend>::random(t, 5, &device()).to_flat();
        let c = TextNetwork::<NetBackend>::random(t, 6, &device()).to_flat();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_params_activations_match_forward() {
        let net    = TextNetwork::<NetBackend>::random(Topology::for_sizes(4, 2), 3, &device());
        let input  = [0.0, 1.0, 1.0, 0.0];
        let direct = net.compute(&input);

        let batch       = matrix::<NetBackend>(input.to_vec(), [1, 4], &device());
        let (_, output) = net.params().activations(batch);
        let via_params  = to_vec(output);

        for (a, b) in direct.iter().zip(&via_params) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_params_compute_matches_network_compute() {
        let net   = TextNetwork::<NetBackend>::random(Topology::for_sizes(4, 3), 8, &device());
        let input = [1.0, 1.0, 0.0, 1.0];
        let a     = net.compute(&input);
        let b     = net.params().compute(&input);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_flat_round_trip_preserves_outputs() {
        let net   = TextNetwork::<NetBackend>::random(Topology::for_sizes(6, 3), 11, &device());
        let input = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
        let restored = TextNetwork::<NetBackend>::from_flat(net.to_flat(), &device()).unwrap();
        assert_eq!(net.compute(&input), restored.compute(&input));
    }

    #[test]
    fn test_from_flat_rejects_wrong_lengths() {
        let net = TextNetwork::<NetBackend>::random(Topology::for_sizes(4, 2), 2, &device());
        let mut flat = net.to_flat();
        flat.output_bias.pop();
        let err = TextNetwork::<NetBackend>::from_flat(flat, &device()).unwrap_err();
        assert!(matches!(err, ClassifierError::CorruptModel(_)));
    }
}
