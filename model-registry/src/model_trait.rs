use std::fmt;

use common::{FeatureMap, Result};
use serde::Serialize;

use crate::{ModelInfo, ModelKind, Prediction, Row};

/// The lifecycle of a model.
/// Adding a row always leads to `Filled`, so a trained model has to be trained again
/// before new rows have an effect on its predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Initialized without training data
    Created,
    /// Has rows and is ready to train
    Filled,
    /// Trained and ready to predict
    Trained,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Created => write!(f, "created"),
            State::Filled => write!(f, "filled"),
            State::Trained => write!(f, "trained"),
        }
    }
}

/// The capabilities every kind of model offers to the registry
pub trait Model: fmt::Debug + Send {
    /// The unique name the model is registered under
    fn name(&self) -> &str;

    /// The implementation backing this model
    fn kind(&self) -> ModelKind;

    fn state(&self) -> State;

    /// Encode and append one labeled row
    ///
    /// # Returns:
    /// the stored row
    fn add(&mut self, features: &FeatureMap, label: String) -> Result<Row>;

    /// Train on every row added so far
    ///
    /// # Returns:
    /// the cost of the trained model
    fn train(&mut self) -> Result<f64>;

    /// Predict for a single row, an aligned batch, or a date range
    fn predict(&self, features: &FeatureMap) -> Result<Vec<Prediction>>;

    /// A snapshot of configuration, data and learned parameters
    fn describe(&self) -> ModelInfo;
}
