#[macro_use]
extern crate log;

mod encoder;
mod engine;
mod info;
mod linear_model;
mod model_trait;
mod params;
mod prediction;
mod registry;
mod row_store;

pub use common::{
    Error, Feature, FeatureKind, FeatureMap, FeatureSchema, FeatureValue, ReferenceDate, Result,
};
pub use encoder::CategoricalEncoder;
pub use engine::LinRegEngine;
pub use info::ModelInfo;
pub use linear_model::LinearModel;
pub use model_trait::{Model, State};
pub use params::{HyperParams, ModelConfig, ModelKind};
pub use prediction::{Prediction, PredictionInput, PREDICTION_KEY};
pub use registry::{ModelHandle, ModelRegistry, NO_MODELS};
pub use row_store::{Row, RowStore};
