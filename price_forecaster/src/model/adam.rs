//! Adam optimizer over `ndarray` parameters.
//!
//! ```text
//! m = beta1 * m + (1 - beta1) * g
//! v = beta2 * v + (1 - beta2) * g^2
//! lr_t = lr * sqrt(1 - beta2^t) / (1 - beta1^t)
//! p = p - lr_t * m / (sqrt(v) + epsilon)
//! ```

use ndarray::{Array, Dimension, Zip};

/// Step counter and hyperparameters shared by every parameter tensor.
///
/// Moment estimates live next to each tensor in a [`Moments`], so one `Adam`
/// drives a whole model.
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self::with_params(learning_rate, 0.9, 0.999, 1e-7)
    }

    pub fn with_params(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Number of completed steps.
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Starts a new optimization step. Call once per batch, before `update`.
    pub fn begin_step(&mut self) {
        self.t = self.t.saturating_add(1);
    }

    /// Applies one step to `param` given its accumulated gradient.
    pub fn update<D: Dimension>(
        &self,
        param: &mut Array<f64, D>,
        grad: &Array<f64, D>,
        moments: &mut Moments<D>,
    ) {
        let t = self.t.max(1);
        let lr_t = self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt()
            / (1.0 - self.beta1.powi(t));
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        Zip::from(param)
            .and(grad)
            .and(&mut moments.m)
            .and(&mut moments.v)
            .for_each(|p, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p -= lr_t * *m / (v.sqrt() + epsilon);
            });
    }
}

/// First and second moment estimates for one parameter tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Moments<D> {
    pub fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(0.1);
        let mut p = array![1.0, -2.0];
        let g = array![0.5, -3.0];
        let mut moments = Moments::zeros_like(&p);

        adam.begin_step();
        adam.update(&mut p, &g, &mut moments);

        // Bias-corrected first step is lr * sign(g), up to epsilon.
        assert!((p[0] - 0.9).abs() < 1e-6);
        assert!((p[1] - -1.9).abs() < 1e-6);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn minimizes_quadratic() {
        let mut adam = Adam::new(0.05);
        let mut p = array![[3.0, -4.0]];
        let mut moments = Moments::zeros_like(&p);
        for _ in 0..1000 {
            let g = p.mapv(|x| 2.0 * x);
            adam.begin_step();
            adam.update(&mut p, &g, &mut moments);
        }
        assert!(p.iter().all(|x| x.abs() < 0.1), "{p:?}");
    }

    #[test]
    fn zero_gradient_leaves_param() {
        let mut adam = Adam::new(0.001);
        let mut p = array![0.25];
        let mut moments = Moments::zeros_like(&p);
        adam.begin_step();
        adam.update(&mut p, &array![0.0], &mut moments);
        assert_eq!(p[0], 0.25);
    }
}
