// ============================================================
// Layer 5 — Resilient Propagation Trainer
// ============================================================
// Full-batch iRPROP− training loop.
//
// States:   Idle ──► Iterating ──► Converged ──► Finalized
//
// One iteration:
//   1. Split the batch into one chunk per worker (done once, up front)
//   2. Forward + backward pass on every chunk in the worker pool
//   3. Sum the chunk gradients and squared errors
//   4. error = Σ(actual − ideal)² / (rows × outputs)
//   5. Per weight:
//        gradient kept its sign   → step × 1.2   (capped at max_step)
//        gradient flipped sign    → step × 0.5   (floored at min_step),
//                                   skip the update and forget the gradient
//        weight −= sign(gradient) × step
//
// The loop repeats while error > threshold. There is no iteration
// ceiling unless TrainOptions::max_iterations sets one.
//
// Why resilient propagation instead of plain gradient descent?
//   Gradient descent needs a learning rate, and the right one
//   depends on vocabulary size and on how many calls there are.
//   RPROP only looks at the SIGN of each gradient and keeps its
//   own step per weight, so no learning rate has to be tuned.
//
// Why full-batch?
//   RPROP compares this iteration's gradient with the last one.
//   That comparison is only meaningful if both come from the same
//   examples, so every iteration sees the whole training set.
//
// Why a flat spot?
//   The sigmoid derivative o·(1−o) goes to zero when an output
//   saturates near 0 or 1, and the weight feeding it stops moving
//   even when the answer is wrong. Adding 0.1 keeps it learning.
//
// Parallelism:
//   Rows are split into one chunk per worker when the trainer is
//   built. Each iteration computes chunk gradients in the runtime's
//   pool and sums them; the sum does not depend on how the rows
//   were chunked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use burn::prelude::*;
use rayon::prelude::*;

use crate::domain::error::{ClassifierError, Result};
use crate::ml::network::{matrix, NetBackend, NetworkParams, TextNetwork};
use crate::ml::runtime::Runtime;

/// Training stops once the mean squared error is at or below this.
pub const CONVERGENCE_THRESHOLD: f64 = 0.01;

type B = NetBackend;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Step-size schedule for resilient propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RpropConfig {
    /// Step every weight starts with before any sign history exists
    pub initial_step: f64,

    /// Step multiplier while the gradient keeps its sign (η⁺)
    pub increase:     f64,

    /// Step multiplier after the gradient flips sign (η⁻)
    pub decrease:     f64,

    /// Upper bound on a single weight's step
    pub max_step:     f64,

    /// Lower bound; a step never shrinks to zero
    pub min_step:     f64,

    /// Added to the sigmoid derivative so saturated units still learn.
    pub flat_spot:    f64,
}

impl Default for RpropConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            increase:     1.2,
            decrease:     0.5,
            max_step:     50.0,
            min_step:     1e-6,
            flat_spot:    0.1,
        }
    }
}

/// Cooperative stop signal, checked after every iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Stop once the mean squared error is at or below this
    pub threshold:      f64,

    /// `None` iterates until convergence, however long that takes
    pub max_iterations: Option<usize>,

    /// Checked after every iteration
    pub cancel:         Option<CancelToken>,

    pub rprop:          RpropConfig,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            threshold:      CONVERGENCE_THRESHOLD,
            max_iterations: None,
            cancel:         None,
            rprop:          RpropConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub iterations: usize,
    pub error:      f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Idle,
    Iterating,
    Converged,
    Finalized,
}

// ─── Internals ────────────────────────────────────────────────────────────────

/// One worker's slice of the training set.
struct Chunk {
    inputs: Tensor<B, 2>,
    ideals: Tensor<B, 2>,
}

struct Gradients {
    hidden_weight: Tensor<B, 2>,
    hidden_bias:   Tensor<B, 1>,
    output_weight: Tensor<B, 2>,
    output_bias:   Tensor<B, 1>,
    squared_error: f64,
}

impl Gradients {
    fn merge(self, other: Self) -> Self {
        Self {
            hidden_weight: self.hidden_weight + other.hidden_weight,
            hidden_bias:   self.hidden_bias + other.hidden_bias,
            output_weight: self.output_weight + other.output_weight,
            output_bias:   self.output_bias + other.output_bias,
            squared_error: self.squared_error + other.squared_error,
        }
    }
}

/// Backpropagation of E = ½Σ(actual − ideal)² over one chunk.
fn chunk_gradients(params: &NetworkParams<B>, chunk: &Chunk, flat_spot: f64) -> Gradients {
    let (hidden, output) = params.activations(chunk.inputs.clone());
    let [_, hidden_size] = hidden.dims();
    let [_, output_size] = output.dims();

    let error = output.clone() - chunk.ideals.clone();
    let squared_error = error.clone().powf_scalar(2.0).sum().into_scalar().elem::<f64>();

    let output_slope = (output.clone() * output.neg().add_scalar(1.0)).add_scalar(flat_spot);
    let output_delta = error * output_slope;

    let hidden_slope = (hidden.clone() * hidden.clone().neg().add_scalar(1.0)).add_scalar(flat_spot);
    let hidden_delta = output_delta.clone().matmul(params.output_weight.clone().transpose()) * hidden_slope;

    Gradients {
        hidden_weight: chunk.inputs.clone().transpose().matmul(hidden_delta.clone()),
        hidden_bias:   hidden_delta.sum_dim(0).reshape([hidden_size]),
        output_weight: hidden.transpose().matmul(output_delta.clone()),
        output_bias:   output_delta.sum_dim(0).reshape([output_size]),
        squared_error,
    }
}

/// Per-weight step sizes and the previous gradient of one tensor.
struct RpropTensor<const D: usize> {
    step:          Tensor<B, D>,
    last_gradient: Tensor<B, D>,
}

impl<const D: usize> RpropTensor<D> {
    fn new(like: &Tensor<B, D>, initial_step: f64) -> Self {
        Self {
            step:          like.ones_like().mul_scalar(initial_step),
            last_gradient: like.zeros_like(),
        }
    }

    fn update(&mut self, weights: Tensor<B, D>, gradient: Tensor<B, D>, cfg: &RpropConfig) -> Tensor<B, D> {
        let change  = gradient.clone() * self.last_gradient.clone();
        let kept    = change.clone().greater_elem(0.0);
        let flipped = change.lower_elem(0.0);

        let grown  = self.step.clone().mul_scalar(cfg.increase).clamp_max(cfg.max_step);
        let shrunk = self.step.clone().mul_scalar(cfg.decrease).clamp_min(cfg.min_step);
        let step   = self.step.clone().mask_where(kept, grown).mask_where(flipped.clone(), shrunk);

        let gradient = gradient.mask_fill(flipped, 0.0);
        let updated  = weights - gradient.clone().sign() * step.clone();

        self.step          = step;
        self.last_gradient = gradient;
        updated
    }
}

struct RpropState {
    hidden_weight: RpropTensor<2>,
    hidden_bias:   RpropTensor<1>,
    output_weight: RpropTensor<2>,
    output_bias:   RpropTensor<1>,
}

impl RpropState {
    fn new(params: &NetworkParams<B>, initial_step: f64) -> Self {
        Self {
            hidden_weight: RpropTensor::new(&params.hidden_weight, initial_step),
            hidden_bias:   RpropTensor::new(&params.hidden_bias, initial_step),
            output_weight: RpropTensor::new(&params.output_weight, initial_step),
            output_bias:   RpropTensor::new(&params.output_bias, initial_step),
        }
    }

    fn apply(&mut self, params: NetworkParams<B>, g: Gradients, cfg: &RpropConfig) -> NetworkParams<B> {
        NetworkParams {
            hidden_weight: self.hidden_weight.update(params.hidden_weight, g.hidden_weight, cfg),
            hidden_bias:   self.hidden_bias.update(params.hidden_bias, g.hidden_bias, cfg),
            output_weight: self.output_weight.update(params.output_weight, g.output_weight, cfg),
            output_bias:   self.output_bias.update(params.output_bias, g.output_bias, cfg),
        }
    }
}

// ─── Trainer ──────────────────────────────────────────────────────────────────

pub struct Trainer {
    params:     NetworkParams<B>,
    /// Training rows, one chunk per worker; emptied by `finish`
    chunks:     Vec<Chunk>,
    /// Step sizes and last gradients; `None` once finalised
    rprop:      Option<RpropState>,
    config:     RpropConfig,
    runtime:    Arc<Runtime>,
    /// rows × outputs, the divisor of the error
    cells:      usize,
    iterations: usize,
    error:      f64,
    state:      TrainingState,
}

impl Trainer {
    /// Prepare a trainer over `inputs` / `ideals` (one row per example).
    pub fn new(
        network: &TextNetwork<B>,
        inputs:  &[Vec<f32>],
        ideals:  &[Vec<f32>],
        runtime: Arc<Runtime>,
        config:  RpropConfig,
    ) -> Result<Self> {
        runtime.ensure_running()?;

        let topology = network.topology();
        if inputs.is_empty() {
            return Err(ClassifierError::InvalidArgument(
                "training needs at least one example".to_string(),
            ));
        }
        if inputs.len() != ideals.len() {
            return Err(ClassifierError::InvalidArgument(format!(
                "{} input rows but {} ideal rows", inputs.len(), ideals.len()
            )));
        }
        if let Some(row) = inputs.iter().find(|r| r.len() != topology.input) {
            return Err(ClassifierError::InvalidArgument(format!(
                "input row of width {} for a network expecting {}", row.len(), topology.input
            )));
        }
        if let Some(row) = ideals.iter().find(|r| r.len() != topology.output) {
            return Err(ClassifierError::InvalidArgument(format!(
                "ideal row of width {} for a network producing {}", row.len(), topology.output
            )));
        }

        let params = network.params();
        let device = params.hidden_weight.device();

        // ── Split rows evenly across workers ─────────────────────────────────
        let rows       = inputs.len();
        let chunk_rows = rows.div_ceil(runtime.workers()).max(1);
        let chunks: Vec<Chunk> = inputs
            .chunks(chunk_rows)
            .zip(ideals.chunks(chunk_rows))
            .map(|(x, y)| Chunk {
                inputs: matrix(x.concat(), [x.len(), topology.input], &device),
                ideals: matrix(y.concat(), [y.len(), topology.output], &device),
            })
            .collect();

        tracing::debug!(
            rows,
            chunks = chunks.len(),
            "Trainer prepared for {}x{}x{} network",
            topology.input, topology.hidden, topology.output
        );

        Ok(Self {
            rprop: Some(RpropState::new(&params, config.initial_step)),
            params,
            chunks,
            config,
            runtime,
            cells: rows * topology.output,
            iterations: 0,
            error: f64::INFINITY,
            state: TrainingState::Idle,
        })
    }

    /// Run one full-batch iteration and return the error measured on it.
    pub fn iteration(&mut self) -> Result<f64> {
        let pool = self.runtime.pool()?;
        let Some(rprop) = self.rprop.as_mut() else {
            return Err(ClassifierError::InvalidArgument(
                "trainer has already been finalised".to_string(),
            ));
        };

        let params    = &self.params;
        let chunks    = &self.chunks;
        let flat_spot = self.config.flat_spot;

        let gradients = pool
            .install(|| {
                chunks
                    .par_iter()
                    .map(|chunk| chunk_gradients(params, chunk, flat_spot))
                    .reduce_with(Gradients::merge)
            })
            .ok_or_else(|| ClassifierError::InvalidArgument("empty training batch".to_string()))?;

        self.error = gradients.squared_error / self.cells as f64;
        self.params = rprop.apply(self.params.clone(), gradients, &self.config);
        self.iterations += 1;
        self.state = TrainingState::Iterating;

        tracing::trace!(iteration = self.iterations, error = self.error, "rprop iteration");
        Ok(self.error)
    }

    /// Iterate until the error reaches `options.threshold`, calling
    /// `progress(iteration, error)` after every iteration.
    pub fn run<F>(&mut self, options: &TrainOptions, mut progress: F) -> Result<TrainingReport>
    where
        F: FnMut(usize, f64),
    {
        loop {
            let error = self.iteration()?;
            progress(self.iterations, error);

            if error <= options.threshold {
                self.state = TrainingState::Converged;
                break;
            }
            if options.max_iterations.is_some_and(|max| self.iterations >= max) {
                self.finish();
                return Err(ClassifierError::DidNotConverge {
                    iterations: self.iterations,
                    error,
                });
            }
            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                self.finish();
                return Err(ClassifierError::Cancelled { iterations: self.iterations });
            }
        }

        self.finish();
        Ok(TrainingReport { iterations: self.iterations, error: self.error })
    }

    /// Drop training-only state (chunks, step sizes). Idempotent.
    pub fn finish(&mut self) {
        self.rprop = None;
        self.chunks.clear();
        self.state = TrainingState::Finalized;
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    /// The network carrying the current weights.
    pub fn into_network(self) -> TextNetwork<B> {
        TextNetwork::from_params(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::network::{NetDevice, Topology};

    fn xor() -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let inputs = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let ideals = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ];
        (inputs, ideals)
    }

    fn separable() -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let inputs = vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 1.0, 0.0], vec![0.0, 0.0, 0.0, 1.0]];
        let ideals = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]];
        (inputs, ideals)
    }

    fn network(input: usize, output: usize, seed: u64) -> TextNetwork<B> {
        TextNetwork::random(Topology::for_sizes(input, output), seed, &NetDevice::default())
    }

    fn runtime() -> Arc<Runtime> {
        Arc::new(Runtime::new(2).unwrap())
    }

    #[test]
    fn test_converges_and_finalizes() {
        let (inputs, ideals) = separable();
        let net = network(4, 2, 3);
        let mut trainer = Trainer::new(&net, &inputs, &ideals, runtime(), RpropConfig::default()).unwrap();
        assert_eq!(trainer.state(), TrainingState::Idle);

        let options = TrainOptions { max_iterations: Some(20_000), ..TrainOptions::default() };
        let mut reported = Vec::new();
        let report = trainer.run(&options, |_, e| reported.push(e)).unwrap();

        assert_eq!(trainer.state(), TrainingState::Finalized);
        assert!(report.error <= CONVERGENCE_THRESHOLD);
        assert_eq!(reported.len(), report.iterations);
        // Only the final report may be at or below the threshold.
        assert!(reported[..reported.len() - 1].iter().all(|&e| e > CONVERGENCE_THRESHOLD));
    }

    #[test]
    fn test_error_decreases_over_training() {
        let (inputs, ideals) = separable();
        let net = network(4, 2, 17);
        let mut trainer = Trainer::new(&net, &inputs, &ideals, runtime(), RpropConfig::default()).unwrap();

        let first = trainer.iteration().unwrap();
        for _ in 0..50 {
            trainer.iteration().unwrap();
        }
        assert!(trainer.error() < first);
        assert_eq!(trainer.state(), TrainingState::Iterating);
    }

    #[test]
    fn test_iteration_ceiling_reports_did_not_converge() {
        let (inputs, ideals) = xor();
        let net = network(2, 2, 1);
        let mut trainer = Trainer::new(&net, &inputs, &ideals, runtime(), RpropConfig::default()).unwrap();

        let options = TrainOptions { threshold: 0.0, max_iterations: Some(5), ..TrainOptions::default() };
        let err = trainer.run(&options, |_, _| {}).unwrap_err();
        assert!(matches!(err, ClassifierError::DidNotConverge { iterations: 5, .. }));
        assert_eq!(trainer.state(), TrainingState::Finalized);
    }

    #[test]
    fn test_cancel_token_stops_loop() {
        let (inputs, ideals) = xor();
        let net = network(2, 2, 1);
        let mut trainer = Trainer::new(&net, &inputs, &ideals, runtime(), RpropConfig::default()).unwrap();

        let token = CancelToken::new();
        let options = TrainOptions { threshold: 0.0, cancel: Some(token.clone()), ..TrainOptions::default() };
        let err = trainer
            .run(&options, |iteration, _| {
                if iteration == 3 {
                    token.cancel();
                }
            })
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Cancelled { iterations: 3 }));
    }

    #[test]
    fn test_iteration_after_finish_is_rejected() {
        let (inputs, ideals) = xor();
        let net = network(2, 2, 1);
        let mut trainer = Trainer::new(&net, &inputs, &ideals, runtime(), RpropConfig::default()).unwrap();
        trainer.finish();
        assert!(trainer.iteration().is_err());
    }

    #[test]
    fn test_shut_down_runtime_stops_training() {
        let (inputs, ideals) = xor();
        let net = network(2, 2, 1);
        let rt = runtime();
        let mut trainer = Trainer::new(&net, &inputs, &ideals, Arc::clone(&rt), RpropConfig::default()).unwrap();
        rt.shutdown().unwrap();
        assert!(matches!(trainer.iteration(), Err(ClassifierError::RuntimeShutdown)));
    }

    #[test]
    fn test_rejects_mismatched_rows() {
        let net = network(2, 2, 1);
        let err = Trainer::new(&net, &[vec![1.0]], &[vec![1.0, 0.0]], runtime(), RpropConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));

        let err = Trainer::new(&net, &[], &[], runtime(), RpropConfig::default()).err().unwrap();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));
    }
}
