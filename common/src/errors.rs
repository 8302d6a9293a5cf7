use thiserror::Error;

/// Convenience alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when creating, filling, training or querying a model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A model with this name is already registered
    #[error("Model {0} already exists, please remove first")]
    DuplicateName(String),

    /// No model with this name is registered
    #[error("No valid ML-Model {0}")]
    NotFound(String),

    /// A schema type string other than "numeric" or "class"
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// The initial parameter vector does not cover every feature plus the bias
    #[error(
        "Illegal number of theta values. Expected {expected} values got {got}. \
         Model '{model}' has not been created."
    )]
    InvalidThetaLength {
        /// Name of the rejected model
        model: String,
        /// Number of features plus one
        expected: usize,
        /// Length of the given vector
        got: usize,
    },

    /// A feature declared in the schema is absent from the call
    #[error("The featurename '{0}' specified for this model is not given in this call")]
    MissingFeature(String),

    /// Prediction was requested before a successful train
    #[error(
        "Model {0} is not trained, please train first. If you have added some new data \
         after the last training, train the model again before predicting."
    )]
    NotTrainedYet(String),

    /// Train was requested on a model without rows
    #[error("Model {0} has no training data, please add some before training.")]
    NoTrainingData(String),

    /// A date value is not an 8-digit YYYYMMDD calendar date
    #[error("Malformed date '{0}', expected YYYYMMDD")]
    MalformedDate(String),

    /// The shape of the given features does not match what the model expects
    #[error("Feature count mismatch: {0}")]
    FeatureCountMismatch(String),

    /// A schema without any feature
    #[error("A model needs at least one feature")]
    EmptySchema,

    /// The same feature name declared twice
    #[error("Feature '{0}' is declared more than once")]
    DuplicateFeature(String),

    /// A numeric feature or a label that does not parse as a finite number
    #[error("Value '{value}' of '{feature}' is not a number")]
    InvalidNumeric {
        /// The feature name, or "label"
        feature: String,
        /// The offending raw value
        value: String,
    },

    /// A feature value that is neither a scalar nor a flat list of scalars
    #[error("Invalid feature value: {0}")]
    InvalidFeatureValue(String),

    /// Missing, ill-typed or out of range hyperparameters
    #[error("Invalid hyperparameters: {0}")]
    InvalidHyperParameter(String),

    /// A model implementation tag that is not supported
    #[error("Unknown Implementation: {0}")]
    UnknownModelKind(String),
}
