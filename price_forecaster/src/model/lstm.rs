//! One direction of an LSTM layer with backpropagation through time.
//!
//! Gate pre-activations are stacked in a single `4H` vector in the order
//! input, forget, cell candidate, output:
//!
//! ```text
//! z = W x + U h_prev + b
//! i = σ(z_i)   f = σ(z_f)   g = tanh(z_g)   o = σ(z_o)
//! c = f * c_prev + i * g
//! h = o * tanh(c)
//! ```

use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use ndarray_rand::{RandomExt, rand_distr::Uniform};
use rand::Rng;

use super::adam::{Adam, Moments};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LstmLayer {
    pub w: Array2<f64>,
    pub u: Array2<f64>,
    pub b: Array1<f64>,
}

/// Activations of one time step, kept for the backward pass.
#[derive(Debug)]
pub(crate) struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    c: Array1<f64>,
    tanh_c: Array1<f64>,
}

impl LstmLayer {
    /// Glorot-uniform kernels, zero biases except the forget gate at 1.
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let gates = 4 * hidden_size;
        let w_limit = (6.0 / (input_size + gates) as f64).sqrt();
        let u_limit = (6.0 / (hidden_size + gates) as f64).sqrt();

        let mut b = Array1::zeros(gates);
        b.slice_mut(s![hidden_size..2 * hidden_size]).fill(1.0);

        Self {
            w: Array2::random_using((gates, input_size), Uniform::new(-w_limit, w_limit), rng),
            u: Array2::random_using((gates, hidden_size), Uniform::new(-u_limit, u_limit), rng),
            b,
        }
    }

    /// Same shapes, all zeros. Used to accumulate gradients.
    pub fn zeros_like(other: &Self) -> Self {
        Self {
            w: Array2::zeros(other.w.raw_dim()),
            u: Array2::zeros(other.u.raw_dim()),
            b: Array1::zeros(other.b.raw_dim()),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.u.ncols()
    }

    fn step(&self, x: ArrayView1<f64>, h_prev: &Array1<f64>, c_prev: &Array1<f64>) -> StepCache {
        let h = self.hidden_size();
        let z = self.w.dot(&x) + self.u.dot(h_prev) + &self.b;

        let i = z.slice(s![..h]).mapv(sigmoid);
        let f = z.slice(s![h..2 * h]).mapv(sigmoid);
        let g = z.slice(s![2 * h..3 * h]).mapv(f64::tanh);
        let o = z.slice(s![3 * h..]).mapv(sigmoid);
        let c = &f * c_prev + &i * &g;
        let tanh_c = c.mapv(f64::tanh);
        StepCache {
            x: x.to_owned(),
            h_prev: h_prev.clone(),
            c_prev: c_prev.clone(),
            i,
            f,
            g,
            o,
            c,
            tanh_c,
        }
    }

    /// Runs the sequence (rows of `xs`) and returns the final hidden state.
    pub fn last_hidden(&self, xs: &Array2<f64>) -> Array1<f64> {
        let n = self.hidden_size();
        let (mut h, mut c) = (Array1::zeros(n), Array1::zeros(n));
        for x in xs.outer_iter() {
            let cache = self.step(x, &h, &c);
            h = &cache.o * &cache.tanh_c;
            c = cache.c.clone();
        }
        h
    }

    /// Runs the sequence, keeping every step for [`LstmLayer::backward`].
    pub fn forward(&self, xs: &Array2<f64>) -> (Array1<f64>, Vec<StepCache>) {
        let n = self.hidden_size();
        let (mut h, mut c) = (Array1::zeros(n), Array1::zeros(n));
        let mut caches = Vec::with_capacity(xs.nrows());
        for x in xs.outer_iter() {
            let cache = self.step(x, &h, &c);
            h = &cache.o * &cache.tanh_c;
            c = cache.c.clone();
            caches.push(cache);
        }
        (h, caches)
    }

    /// Backpropagates `dh_last` (loss gradient w.r.t. the final hidden
    /// state) through every cached step, adding parameter gradients to `grads`.
    pub fn backward(&self, caches: &[StepCache], dh_last: &Array1<f64>, grads: &mut LstmLayer) {
        let n = self.hidden_size();
        let mut dh = dh_last.clone();
        let mut dc: Array1<f64> = Array1::zeros(n);
        let mut dz: Array1<f64> = Array1::zeros(4 * n);

        for cache in caches.iter().rev() {
            let d_o = &dh * &cache.tanh_c;
            dc = dc + &dh * &cache.o * &cache.tanh_c.mapv(|t| 1.0 - t * t);

            let d_i = &dc * &cache.g;
            let d_f = &dc * &cache.c_prev;
            let d_g = &dc * &cache.i;

            dz.slice_mut(s![..n])
                .assign(&(d_i * &cache.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![n..2 * n])
                .assign(&(d_f * &cache.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * n..3 * n])
                .assign(&(d_g * &cache.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * n..])
                .assign(&(d_o * &cache.o.mapv(|v| v * (1.0 - v))));

            let dz_col = dz.view().insert_axis(Axis(1));
            grads.w += &dz_col.dot(&cache.x.view().insert_axis(Axis(0)));
            grads.u += &dz_col.dot(&cache.h_prev.view().insert_axis(Axis(0)));
            grads.b += &dz;

            dh = self.u.t().dot(&dz);
            dc = dc * &cache.f;
        }
    }

    pub fn apply(&mut self, grads: &LstmLayer, adam: &Adam, moments: &mut LstmMoments) {
        adam.update(&mut self.w, &grads.w, &mut moments.w);
        adam.update(&mut self.u, &grads.u, &mut moments.u);
        adam.update(&mut self.b, &grads.b, &mut moments.b);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LstmMoments {
    w: Moments<ndarray::Ix2>,
    u: Moments<ndarray::Ix2>,
    b: Moments<ndarray::Ix1>,
}

impl LstmMoments {
    pub fn new(layer: &LstmLayer) -> Self {
        Self {
            w: Moments::zeros_like(&layer.w),
            u: Moments::zeros_like(&layer.u),
            b: Moments::zeros_like(&layer.b),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
