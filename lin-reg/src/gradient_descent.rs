use nalgebra::{DMatrixView, DVector, DVectorView};

use super::{cost, Fit, LinReg};

/// Batch gradient descent with a fixed number of iterations.
/// There is no convergence check and no early stopping.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    /// Step size
    pub alpha: f64,
    /// Number of full passes over the data
    pub iterations: u64,
}

impl LinReg for GradientDescent {
    fn fit(&self, design: &DMatrixView<f64>, targets: &DVectorView<f64>, mut theta: DVector<f64>) -> Fit {
        assert_eq!(design.ncols(), theta.len(), "one parameter per design column required");
        assert_eq!(design.nrows(), targets.len(), "one target per design row required");

        let m = design.nrows();
        if m == 0 {
            return Fit { theta, cost: 0.0 };
        }
        debug!(
            "running gradient descent over {} rows: alpha: {}, iterations: {}",
            m, self.alpha, self.iterations
        );

        let step = self.alpha / m as f64;
        for i in 1..=self.iterations {
            let residuals = design * &theta - targets;
            theta -= design.tr_mul(&residuals) * step;
            trace!("iteration {}: cost {}", i, cost(design, targets, &theta));
        }

        let cost = cost(design, targets, &theta);
        debug!("theta found by gradient descent: {}, cost: {}", theta.transpose(), cost);

        Fit { theta, cost }
    }
}
