#[macro_use]
extern crate log;

use nalgebra::{DMatrix, DMatrixView, DVector, DVectorView};

mod gradient_descent;
mod normalization;

pub use gradient_descent::GradientDescent;
pub use normalization::Normalization;

/// The outcome of fitting a parameter vector
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// The parameters, the first entry being the bias
    pub theta: DVector<f64>,
    /// Cost of `theta` over the data it was fitted on
    pub cost: f64,
}

/// Generic way of performing linear regression and fitting the parameter vector
pub trait LinReg: Clone {
    /// Fit the parameter vector, mapping inputs to targets
    ///
    /// # Parameters
    /// design: Input data, where the first column should be just 1s
    /// targets: One target per row of `design`
    /// theta: Starting point of the fit, one entry per column of `design`
    fn fit(&self, design: &DMatrixView<f64>, targets: &DVectorView<f64>, theta: DVector<f64>) -> Fit;
}

/// Prepend a column of ones, the bias term
pub fn with_bias(features: DMatrix<f64>) -> DMatrix<f64> {
    features.insert_column(0, 1.0)
}

/// Half the mean squared error of `theta` over the design matrix
pub fn cost(design: &DMatrixView<f64>, targets: &DVectorView<f64>, theta: &DVector<f64>) -> f64 {
    let m = design.nrows();
    if m == 0 {
        return 0.0;
    }
    let residuals = design * theta - targets;

    residuals.norm_squared() / (2.0 * m as f64)
}

/// One prediction per row of the design matrix
#[inline(always)]
pub fn predict(design: &DMatrixView<f64>, theta: &DVector<f64>) -> DVector<f64> {
    design * theta
}
