use ndarray::{Array1, Array2, s};
use ndarray_rand::{RandomExt, rand_distr::Uniform};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use super::{
    SequenceRegressor, TrainConfig, TrainReport, check_training_set, check_window,
    adam::{Adam, Moments},
    lstm::{LstmLayer, LstmMoments},
};
use crate::{
    config::ModelConfig,
    errors::{ForecastError, Result},
    windowing::Window,
};

/// Bidirectional LSTM with a single linear output unit.
///
/// One LSTM reads the window oldest-to-newest, a second reads it
/// newest-to-oldest; their final hidden states are concatenated and fed to
/// `y = w · [h_fwd, h_bwd] + b`. Trained on mean squared error with Adam and
/// full backpropagation through time.
#[derive(Debug, Clone)]
pub struct BiLstmRegressor {
    input_len: usize,
    learning_rate: f64,
    forward: LstmLayer,
    backward: LstmLayer,
    dense_w: Array1<f64>,
    dense_b: Array1<f64>,
}

/// Gradients of every parameter, same layout as the model.
struct Gradients {
    forward: LstmLayer,
    backward: LstmLayer,
    dense_w: Array1<f64>,
    dense_b: Array1<f64>,
}

struct OptimizerState {
    adam: Adam,
    forward: LstmMoments,
    backward: LstmMoments,
    dense_w: Moments<ndarray::Ix1>,
    dense_b: Moments<ndarray::Ix1>,
}

impl BiLstmRegressor {
    pub fn hidden_size(&self) -> usize {
        self.forward.hidden_size()
    }

    fn sequences(window: &[f64]) -> (Array2<f64>, Array2<f64>) {
        let n = window.len();
        let forward = Array2::from_shape_fn((n, 1), |(t, _)| window[t]);
        let backward = Array2::from_shape_fn((n, 1), |(t, _)| window[n - 1 - t]);
        (forward, backward)
    }

    fn output(&self, h_fwd: &Array1<f64>, h_bwd: &Array1<f64>) -> f64 {
        let h = self.hidden_size();
        self.dense_w.slice(s![..h]).dot(h_fwd)
            + self.dense_w.slice(s![h..]).dot(h_bwd)
            + self.dense_b[0]
    }

    fn zero_gradients(&self) -> Gradients {
        Gradients {
            forward: LstmLayer::zeros_like(&self.forward),
            backward: LstmLayer::zeros_like(&self.backward),
            dense_w: Array1::zeros(self.dense_w.raw_dim()),
            dense_b: Array1::zeros(1),
        }
    }

    /// Accumulates the gradient of `scale * (y - target)^2` and returns the
    /// squared error.
    fn accumulate(&self, window: &Window, scale: f64, grads: &mut Gradients) -> f64 {
        let h = self.hidden_size();
        let (fwd_seq, bwd_seq) = Self::sequences(&window.input);
        let (h_fwd, fwd_cache) = self.forward.forward(&fwd_seq);
        let (h_bwd, bwd_cache) = self.backward.forward(&bwd_seq);

        let error = self.output(&h_fwd, &h_bwd) - window.target;
        let dy = 2.0 * error * scale;

        grads.dense_w.slice_mut(s![..h]).scaled_add(dy, &h_fwd);
        grads.dense_w.slice_mut(s![h..]).scaled_add(dy, &h_bwd);
        grads.dense_b[0] += dy;

        let dh_fwd = self.dense_w.slice(s![..h]).mapv(|w| w * dy);
        let dh_bwd = self.dense_w.slice(s![h..]).mapv(|w| w * dy);
        self.forward.backward(&fwd_cache, &dh_fwd, &mut grads.forward);
        self.backward.backward(&bwd_cache, &dh_bwd, &mut grads.backward);

        error * error
    }

    fn apply(&mut self, grads: &Gradients, state: &mut OptimizerState) {
        state.adam.begin_step();
        self.forward.apply(&grads.forward, &state.adam, &mut state.forward);
        self.backward.apply(&grads.backward, &state.adam, &mut state.backward);
        state.adam.update(&mut self.dense_w, &grads.dense_w, &mut state.dense_w);
        state.adam.update(&mut self.dense_b, &grads.dense_b, &mut state.dense_b);
    }
}

impl SequenceRegressor for BiLstmRegressor {
    fn build(config: &ModelConfig, input_len: usize) -> Result<Self> {
        config.validate()?;
        if input_len == 0 {
            return Err(ForecastError::InvalidConfig(
                "input length must be positive".into(),
            ));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hidden = config.hidden_size;
        let forward = LstmLayer::new(1, hidden, &mut rng);
        let backward = LstmLayer::new(1, hidden, &mut rng);

        let limit = (6.0 / (2 * hidden + 1) as f64).sqrt();
        let dense_w = Array1::random_using(2 * hidden, Uniform::new(-limit, limit), &mut rng);

        debug!(input_len, hidden, seed = ?config.seed, "built bidirectional LSTM");
        Ok(Self {
            input_len,
            learning_rate: config.learning_rate,
            forward,
            backward,
            dense_w,
            dense_b: Array1::zeros(1),
        })
    }

    fn name(&self) -> &'static str {
        "bidirectional LSTM"
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn train(&mut self, windows: &[Window], config: &TrainConfig) -> Result<TrainReport> {
        check_training_set(self.input_len, windows, config)?;

        let mut state = OptimizerState {
            adam: Adam::new(self.learning_rate),
            forward: LstmMoments::new(&self.forward),
            backward: LstmMoments::new(&self.backward),
            dense_w: Moments::zeros_like(&self.dense_w),
            dense_b: Moments::zeros_like(&self.dense_b),
        };

        let mut report = TrainReport::default();
        for epoch in 1..=config.epochs {
            let mut squared_error = 0.0;
            for batch in windows.chunks(config.batch_size) {
                let mut grads = self.zero_gradients();
                let scale = 1.0 / batch.len() as f64;
                for window in batch {
                    squared_error += self.accumulate(window, scale, &mut grads);
                }
                self.apply(&grads, &mut state);
            }

            let loss = squared_error / windows.len() as f64;
            debug!(epoch, epochs = config.epochs, loss, "epoch finished");
            report.epoch_losses.push(loss);
        }

        info!(
            windows = windows.len(),
            steps = state.adam.steps(),
            final_loss = ?report.final_loss(),
            "training finished"
        );
        Ok(report)
    }

    fn predict_one(&self, window: &[f64]) -> Result<f64> {
        check_window(self.input_len, window)?;
        let (fwd_seq, bwd_seq) = Self::sequences(window);
        let h_fwd = self.forward.last_hidden(&fwd_seq);
        let h_bwd = self.backward.last_hidden(&bwd_seq);
        Ok(self.output(&h_fwd, &h_bwd))
    }
}
