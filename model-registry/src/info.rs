use std::{collections::BTreeMap, fmt};

use common::FeatureSchema;
use serde::Serialize;

use crate::{HyperParams, ModelKind, State};

/// A human readable snapshot of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub kind: ModelKind,
    pub state: State,
    pub time_series: bool,
    pub schema: FeatureSchema,
    pub extra: BTreeMap<String, String>,
    pub rows: usize,
    pub params: HyperParams,
    /// Learned parameters, only after training
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.name)?;
        writeln!(f, "Implementation: {}", self.kind)?;
        writeln!(f, "Status: {}", self.state)?;
        writeln!(f, "Time series given: {}", self.time_series)?;
        writeln!(f, "Feature names: {} (total: {})", self.schema, self.schema.len())?;
        if self.extra.is_empty() {
            writeln!(f, "Extra attributes: none")?;
        } else {
            writeln!(f, "Extra attributes: {:?}", self.extra)?;
        }
        writeln!(f, "Number of added rows: {}", self.rows)?;
        write!(f, "Hyperparameters: {}", self.params)?;

        if let Some(theta) = &self.theta {
            write!(f, "\nTheta: {:?}", theta)?;
        }
        if let Some(cost) = self.cost {
            write!(f, "\nCost: {}", cost)?;
        }
        if let Some(mean) = &self.mean {
            write!(f, "\nMean: {:?}", mean)?;
        }
        if let Some(std_dev) = &self.std_dev {
            write!(f, "\nSigma: {:?}", std_dev)?;
        }

        Ok(())
    }
}
