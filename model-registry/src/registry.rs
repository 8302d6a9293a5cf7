use std::sync::Arc;

use common::{Error, FeatureMap, Result};
use dashmap::{DashMap, Entry};
use parking_lot::Mutex;

use crate::{
    CategoricalEncoder, LinearModel, Model, ModelConfig, ModelInfo, ModelKind, Prediction, Row,
};

/// Shared access to one registered model. All operations on a model are serialized by its lock.
pub type ModelHandle = Arc<Mutex<Box<dyn Model>>>;

/// What presentation layers show instead of an empty model list
pub const NO_MODELS: &str = "There are currently no models in the database";

/// The concurrent name to model table.
///
/// Lives as long as its owner decides, typically from process start to shutdown or for the
/// duration of a test. Every model it creates shares the registry's categorical encoder.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: DashMap<String, ModelHandle>,
    encoder: Arc<CategoricalEncoder>,
}

impl ModelRegistry {
    /// A registry with its own, empty encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose models share `encoder` with other owners of it
    pub fn with_encoder(encoder: Arc<CategoricalEncoder>) -> Self {
        Self { models: DashMap::new(), encoder }
    }

    /// Create and register a model.
    /// Fails if the name is taken or the configuration is invalid, in which case nothing is
    /// registered.
    pub fn create(&self, name: &str, config: ModelConfig) -> Result<String> {
        match self.models.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateName(name.to_string())),
            Entry::Vacant(entry) => {
                let model: Box<dyn Model> = match config.kind {
                    ModelKind::LinearRegression => {
                        Box::new(LinearModel::new(name, config, self.encoder.clone())?)
                    }
                };
                entry.insert(Arc::new(Mutex::new(model)));
                info!("created model '{}'", name);

                Ok(format!("Created Model: '{}'", name))
            }
        }
    }

    /// The model registered under `name`
    pub fn get(&self, name: &str) -> Result<ModelHandle> {
        self.models
            .get(name)
            .map(|m| Arc::clone(m.value()))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Add one labeled row to a model
    ///
    /// # Returns:
    /// the stored row
    pub fn add(&self, name: &str, features: &FeatureMap, label: impl ToString) -> Result<Row> {
        let handle = self.get(name)?;
        let mut model = handle.lock();

        model.add(features, label.to_string())
    }

    pub fn train(&self, name: &str) -> Result<String> {
        let handle = self.get(name)?;
        let mut model = handle.lock();
        model.train()?;

        Ok(format!("Model '{}' trained.", name))
    }

    pub fn predict(&self, name: &str, features: &FeatureMap) -> Result<Vec<Prediction>> {
        let handle = self.get(name)?;
        let model = handle.lock();

        model.predict(features)
    }

    pub fn info(&self, name: &str) -> Result<ModelInfo> {
        let handle = self.get(name)?;
        let model = handle.lock();

        Ok(model.describe())
    }

    /// Unregister a model, freeing its name
    pub fn remove(&self, name: &str) -> Result<String> {
        match self.models.remove(name) {
            Some(_) => {
                info!("removed model '{}'", name);
                Ok(format!("Removed Model: '{}'", name))
            }
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// The names of all registered models, sorted
    pub fn list_all(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|m| m.key().clone()).collect();
        names.sort();

        names
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
