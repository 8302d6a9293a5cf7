use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::NaiveDate;
use common::{parse_yyyymmdd, to_yyyymmdd, Error, FeatureSchema, ReferenceDate, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The hyperparameters of a linear regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperParams {
    /// Learning rate of gradient descent
    pub alpha: f64,
    /// Number of gradient descent iterations per train call
    #[serde(alias = "iterations")]
    pub iter: u64,
    /// Initial parameter vector, bias first, then one entry per feature
    pub theta: Vec<f64>,
    /// Fixed YYYYMMDD date that date features are measured against.
    /// If absent, the current day is used on every call.
    #[serde(default, deserialize_with = "deserialize_date_literal", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

fn deserialize_date_literal<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("invalid reference date {}", other))),
    }
}

impl HyperParams {
    pub fn new(alpha: f64, iter: u64, theta: Vec<f64>) -> Self {
        Self { alpha, iter, theta, reference: None }
    }

    /// Measure date features against a fixed day instead of the wall clock
    pub fn with_reference(mut self, date: NaiveDate) -> Self {
        self.reference = Some(to_yyyymmdd(&date));
        self
    }

    /// Read the hyperparameters from a JSON object such as
    /// `{"alpha": 0.1, "iter": 300, "theta": [0.0, 0.0]}`.
    /// Unknown keys are ignored.
    pub fn from_json(value: Value) -> Result<Self> {
        let params: HyperParams =
            serde_json::from_value(value).map_err(|e| Error::InvalidHyperParameter(e.to_string()))?;
        params.validate()?;

        Ok(params)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(Error::InvalidHyperParameter(format!(
                "alpha must be a positive number, got {}",
                self.alpha
            )));
        }
        if let Some(v) = self.theta.iter().find(|v| !v.is_finite()) {
            return Err(Error::InvalidHyperParameter(format!("theta contains {}", v)));
        }
        self.reference_date()?;

        Ok(())
    }

    /// The day date features are measured against
    pub fn reference_date(&self) -> Result<ReferenceDate> {
        match &self.reference {
            Some(raw) => Ok(ReferenceDate::Fixed(parse_yyyymmdd(raw)?)),
            None => Ok(ReferenceDate::Today),
        }
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alpha: {}, iter: {}, theta: {:?}", self.alpha, self.iter, self.theta)?;
        if let Some(reference) = &self.reference {
            write!(f, ", reference: {}", reference)?;
        }
        Ok(())
    }
}

/// The implementation backing a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Linear regression trained with batch gradient descent
    #[default]
    #[serde(rename = "linreg")]
    LinearRegression,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LINREG" | "LINEAR" | "ND4J" => Ok(ModelKind::LinearRegression),
            _ => Err(Error::UnknownModelKind(s.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::LinearRegression => write!(f, "linreg"),
        }
    }
}

/// Everything needed to create a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub schema: FeatureSchema,
    pub params: HyperParams,
    /// Static attributes echoed in every prediction, never trained on
    pub extra: BTreeMap<String, String>,
    /// Whether predictions are requested as a `start`/`end` date range
    pub time_series: bool,
}

impl ModelConfig {
    pub fn new(schema: FeatureSchema, params: HyperParams) -> Self {
        Self {
            kind: ModelKind::default(),
            schema,
            params,
            extra: BTreeMap::new(),
            time_series: false,
        }
    }

    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_extra<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extra = extra.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn time_series(mut self, time_series: bool) -> Self {
        self.time_series = time_series;
        self
    }
}
