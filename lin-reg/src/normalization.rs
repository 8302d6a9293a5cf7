use nalgebra::{DMatrix, Dim, Matrix, RowDVector};

/// Per column standardization parameters, learned once at training time
/// and reused unchanged for every later prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    /// Mean of every column
    pub mean: RowDVector<f64>,
    /// Sample standard deviation of every column, 1 where it would be 0
    pub std_dev: RowDVector<f64>,
}

impl Normalization {
    /// Learn mean and sample standard deviation of every column.
    /// A column without spread (or with a single row) gets a standard deviation of 1,
    /// so it is only centered.
    pub fn fit(features: &DMatrix<f64>) -> Self {
        let n = features.nrows();
        let cols = features.ncols();

        let mean: Vec<f64> = (0..cols).map(|j| features.column(j).mean()).collect();
        let std_dev: Vec<f64> = (0..cols)
            .map(|j| {
                let sd = if n > 1 {
                    let mu = mean[j];
                    let ss: f64 = features.column(j).iter().map(|v| (v - mu).powi(2)).sum();
                    (ss / (n - 1) as f64).sqrt()
                } else {
                    0.0
                };
                if sd == 0.0 || !sd.is_finite() {
                    1.0
                } else {
                    sd
                }
            })
            .collect();

        Self {
            mean: Matrix::from_vec_generic(Dim::from_usize(1), Dim::from_usize(cols), mean),
            std_dev: Matrix::from_vec_generic(Dim::from_usize(1), Dim::from_usize(cols), std_dev),
        }
    }

    /// Standardize every column: `(x - mean) / std_dev`
    pub fn apply(&self, mut features: DMatrix<f64>) -> DMatrix<f64> {
        assert_eq!(features.ncols(), self.mean.len(), "column count differs from fitted data");

        for j in 0..features.ncols() {
            let (mu, sd) = (self.mean[j], self.std_dev[j]);
            features.column_mut(j).iter_mut().for_each(|v| *v = (*v - mu) / sd);
        }

        features
    }
}
