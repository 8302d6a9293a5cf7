use chrono::NaiveDate;
use common::{days_between, parse_yyyymmdd, Error, FeatureSchema, ReferenceDate, Result};
use lin_reg::{predict, with_bias, LinReg, Normalization};
use nalgebra::{DMatrix, DVector};

use crate::RowStore;

/// Parse a number that is used as is, reporting `feature` on failure
pub(crate) fn parse_number(feature: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::InvalidNumeric { feature: feature.to_string(), value: raw.to_string() }),
    }
}

/// Turn encoded string rows into the numeric feature matrix.
/// Date columns become their age in days relative to `reference`.
pub(crate) fn shape_features<'a, I>(
    schema: &FeatureSchema,
    rows: I,
    reference: NaiveDate,
) -> Result<DMatrix<f64>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut data = Vec::new();
    let mut nrows = 0;
    for row in rows {
        if row.len() != schema.len() {
            return Err(Error::FeatureCountMismatch(format!(
                "expected {} values per row, got {}",
                schema.len(),
                row.len()
            )));
        }
        for (feature, raw) in schema.iter().zip(row) {
            let v = if feature.is_date {
                days_between(&parse_yyyymmdd(raw)?, &reference) as f64
            } else {
                parse_number(&feature.name, raw)?
            };
            data.push(v);
        }
        nrows += 1;
    }

    Ok(DMatrix::from_row_slice(nrows, schema.len(), &data))
}

/// Linear regression over the rows of a model.
///
/// Holds the running parameter vector and, once trained, the normalization learned from the
/// training data. Every train call continues from the current parameters.
#[derive(Debug, Clone)]
pub struct LinRegEngine<R> {
    regressor: R,
    theta: DVector<f64>,
    normalization: Option<Normalization>,
    cost: Option<f64>,
    reference: ReferenceDate,
}

impl<R> LinRegEngine<R>
where
    R: LinReg,
{
    /// # Arguments:
    /// regressor: The method fitting the parameters
    /// theta: Initial parameters, bias first
    /// reference: The day date features are measured against
    pub fn new(regressor: R, theta: DVector<f64>, reference: ReferenceDate) -> Self {
        Self { regressor, theta, normalization: None, cost: None, reference }
    }

    /// Fit the parameters to all rows of the store
    ///
    /// # Returns:
    /// the cost of the fitted parameters
    pub fn train(&mut self, model: &str, schema: &FeatureSchema, rows: &RowStore) -> Result<f64> {
        if rows.is_empty() {
            return Err(Error::NoTrainingData(model.to_string()));
        }
        if self.theta.len() != schema.len() + 1 {
            return Err(Error::InvalidThetaLength {
                model: model.to_string(),
                expected: schema.len() + 1,
                got: self.theta.len(),
            });
        }

        let reference = self.reference.resolve();
        let features = shape_features(schema, rows.iter().map(|r| r.values()), reference)?;
        let targets = DVector::from_vec(
            rows.iter().map(|r| parse_number("label", r.label())).collect::<Result<Vec<_>>>()?,
        );
        debug!("{}: features: {}, targets: {}", model, features, targets.transpose());

        let normalization = Normalization::fit(&features);
        let design = with_bias(normalization.apply(features));

        let fit = self.regressor.fit(&design.as_view(), &targets.as_view(), self.theta.clone());
        info!(
            "{}: trained on {} rows against {}, theta: {}, cost: {}",
            model,
            rows.len(),
            reference,
            fit.theta.transpose(),
            fit.cost
        );

        self.theta = fit.theta;
        self.normalization = Some(normalization);
        self.cost = Some(fit.cost);

        Ok(fit.cost)
    }

    /// Predict one value per encoded row, using the normalization learned in training
    pub fn predict<'a, I>(&self, model: &str, schema: &FeatureSchema, rows: I) -> Result<DVector<f64>>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let normalization =
            self.normalization.as_ref().ok_or_else(|| Error::NotTrainedYet(model.to_string()))?;

        let features = shape_features(schema, rows, self.reference.resolve())?;
        trace!("{}: prediction features: {}", model, features);
        let design = with_bias(normalization.apply(features));

        Ok(predict(&design.as_view(), &self.theta))
    }

    #[inline(always)]
    pub fn theta(&self) -> &DVector<f64> {
        &self.theta
    }

    /// The learned normalization, if trained
    #[inline(always)]
    pub fn normalization(&self) -> Option<&Normalization> {
        self.normalization.as_ref()
    }

    /// Cost after the last train call
    #[inline(always)]
    pub fn cost(&self) -> Option<f64> {
        self.cost
    }
}
