use std::sync::Arc;

use common::{parse_yyyymmdd, Error, Feature, FeatureKind, FeatureMap, Result};
use lin_reg::GradientDescent;
use nalgebra::DVector;

use crate::{
    engine::parse_number, prediction, CategoricalEncoder, LinRegEngine, Model, ModelConfig,
    ModelInfo, ModelKind, Prediction, PredictionInput, Row, RowStore, State,
};

/// A linear regression model trained with batch gradient descent
#[derive(Debug)]
pub struct LinearModel {
    name: String,
    config: ModelConfig,
    rows: RowStore,
    state: State,
    encoder: Arc<CategoricalEncoder>,
    engine: LinRegEngine<GradientDescent>,
}

impl LinearModel {
    /// Create a new model without any rows
    ///
    /// # Arguments
    /// name: The unique name of the model
    /// config: Schema, hyperparameters, extra attributes and the time series flag
    /// encoder: The encoder shared with every other model of the registry
    pub fn new(name: &str, config: ModelConfig, encoder: Arc<CategoricalEncoder>) -> Result<Self> {
        let expected = config.schema.len() + 1;
        if config.params.theta.len() != expected {
            return Err(Error::InvalidThetaLength {
                model: name.to_string(),
                expected,
                got: config.params.theta.len(),
            });
        }
        if config.time_series && !matches!(config.schema.features(), [f] if f.is_date) {
            return Err(Error::FeatureCountMismatch(format!(
                "a time series model needs exactly one date feature, got {}",
                config.schema
            )));
        }
        config.params.validate()?;

        let regressor =
            GradientDescent { alpha: config.params.alpha, iterations: config.params.iter };
        let engine = LinRegEngine::new(
            regressor,
            DVector::from_vec(config.params.theta.clone()),
            config.params.reference_date()?,
        );

        Ok(Self {
            name: name.to_string(),
            config,
            rows: RowStore::new(),
            state: State::Created,
            encoder,
            engine,
        })
    }

    /// Reject a raw value that cannot be stored.
    /// Date columns must hold a date whatever their declared kind.
    fn validate_value(feature: &Feature, raw: &str) -> Result<()> {
        if feature.is_date {
            parse_yyyymmdd(raw)?;
        } else if feature.kind == FeatureKind::Numeric {
            parse_number(&feature.name, raw)?;
        }

        Ok(())
    }

    /// The stored form of a validated value, categoricals replaced by their code
    fn stored_value(&self, feature: &Feature, raw: &str) -> String {
        let raw = raw.trim();
        match feature.kind {
            FeatureKind::Categorical if !feature.is_date => {
                self.encoder.encode(&feature.name, raw).to_string()
            }
            _ => raw.to_string(),
        }
    }

    /// Validate every value of every row before any categorical code is minted,
    /// so a rejected call leaves the shared encoder untouched
    fn encode_rows(&self, raw_rows: &[Vec<String>]) -> Result<Vec<Vec<String>>> {
        let schema = &self.config.schema;
        for row in raw_rows {
            for (feature, raw) in schema.iter().zip(row) {
                Self::validate_value(feature, raw)?;
            }
        }

        Ok(raw_rows
            .iter()
            .map(|row| schema.iter().zip(row).map(|(f, v)| self.stored_value(f, v)).collect())
            .collect())
    }
}

impl Model for LinearModel {
    #[inline(always)]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }

    #[inline(always)]
    fn state(&self) -> State {
        self.state
    }

    fn add(&mut self, features: &FeatureMap, label: String) -> Result<Row> {
        parse_number("label", &label)?;

        let mut raw = Vec::with_capacity(self.config.schema.len());
        for feature in self.config.schema.iter() {
            let value = features
                .get(&feature.name)
                .ok_or_else(|| Error::MissingFeature(feature.name.clone()))?;
            let value = value.as_single().ok_or_else(|| {
                Error::FeatureCountMismatch(format!(
                    "'{}' has to be a single value when adding a row",
                    feature.name
                ))
            })?;
            raw.push(value.to_string());
        }
        let values = self.encode_rows(&[raw])?.pop().unwrap_or_default();

        let row = self.rows.push(Row::new(label.trim().to_string(), values)).clone();
        self.state = State::Filled;
        debug!("{}: added row {} ({} rows)", self.name, row, self.rows.len());

        Ok(row)
    }

    fn train(&mut self) -> Result<f64> {
        if self.state == State::Created {
            return Err(Error::NoTrainingData(self.name.clone()));
        }

        let cost = self.engine.train(&self.name, &self.config.schema, &self.rows)?;
        self.state = State::Trained;

        Ok(cost)
    }

    fn predict(&self, features: &FeatureMap) -> Result<Vec<Prediction>> {
        if self.state != State::Trained {
            return Err(Error::NotTrainedYet(self.name.clone()));
        }

        let input =
            PredictionInput::from_features(&self.config.schema, features, self.config.time_series)?;
        let raw_rows = input.into_rows();
        let encoded = self.encode_rows(&raw_rows)?;

        let predictions = self.engine.predict(
            &self.name,
            &self.config.schema,
            encoded.iter().map(|r| r.as_slice()),
        )?;
        debug!("{}: predicted {} rows", self.name, predictions.len());

        Ok(prediction::assemble(
            &self.config.schema,
            &raw_rows,
            predictions.as_slice(),
            &self.config.extra,
        ))
    }

    fn describe(&self) -> ModelInfo {
        let trained = self.state == State::Trained;
        let normalization = self.engine.normalization().filter(|_| trained);

        ModelInfo {
            name: self.name.clone(),
            kind: self.kind(),
            state: self.state,
            time_series: self.config.time_series,
            schema: self.config.schema.clone(),
            extra: self.config.extra.clone(),
            rows: self.rows.len(),
            params: self.config.params.clone(),
            theta: trained.then(|| self.engine.theta().iter().copied().collect()),
            mean: normalization.map(|n| n.mean.iter().copied().collect()),
            std_dev: normalization.map(|n| n.std_dev.iter().copied().collect()),
            cost: self.engine.cost().filter(|_| trained),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use common::{FeatureSchema, FeatureValue};
    use round::round;
    use serde_json::json;

    use super::*;
    use crate::{HyperParams, PREDICTION_KEY};

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 5, 10).unwrap()
    }

    fn row(date: &str, flag: &str) -> FeatureMap {
        FeatureMap::from([
            ("date".to_string(), FeatureValue::from(date)),
            ("flag".to_string(), FeatureValue::from(flag)),
        ])
    }

    fn mixed_model(encoder: Arc<CategoricalEncoder>) -> LinearModel {
        let schema = FeatureSchema::parse([("date", "numeric"), ("flag", "class")]).unwrap();
        let params = HyperParams::new(0.1, 300, vec![0.0; 3]).with_reference(reference());
        LinearModel::new("mixed", ModelConfig::new(schema, params), encoder).unwrap()
    }

    #[test]
    fn add_encodes_categoricals_and_fills() {
        let encoder = Arc::new(CategoricalEncoder::new());
        let mut model = mixed_model(encoder.clone());
        assert_eq!(model.state(), State::Created);

        let stored = model.add(&row("20170501", "yes"), "10".to_string()).unwrap();
        assert_eq!(stored.to_string(), "[10, 20170501, 0]");
        let stored = model.add(&row("20170502", "no"), "12".to_string()).unwrap();
        assert_eq!(stored.values()[1], "1");
        assert_eq!(model.state(), State::Filled);
        assert_eq!(model.describe().rows, 2);
        assert_eq!(encoder.code_of("flag", "no"), Some(1));
    }

    #[test]
    fn add_rejects_bad_rows() {
        let mut model = mixed_model(Arc::new(CategoricalEncoder::new()));

        let missing = FeatureMap::from([("date".to_string(), FeatureValue::from("20170501"))]);
        assert_eq!(
            model.add(&missing, "1".to_string()),
            Err(Error::MissingFeature("flag".to_string()))
        );
        assert_eq!(
            model.add(&row("2017-05-01", "yes"), "1".to_string()),
            Err(Error::MalformedDate("2017-05-01".to_string()))
        );
        assert!(matches!(
            model.add(&row("20170501", "yes"), "lots".to_string()),
            Err(Error::InvalidNumeric { .. })
        ));

        let listed = FeatureMap::from([
            ("date".to_string(), FeatureValue::from(vec![20170501, 20170502])),
            ("flag".to_string(), FeatureValue::from("yes")),
        ]);
        assert!(matches!(model.add(&listed, "1".to_string()), Err(Error::FeatureCountMismatch(_))));

        // nothing was stored
        assert_eq!(model.state(), State::Created);
        assert_eq!(model.describe().rows, 0);
    }

    #[test]
    fn rejected_rows_mint_no_codes() {
        let encoder = Arc::new(CategoricalEncoder::new());
        let schema =
            FeatureSchema::parse([("date", "numeric"), ("flag", "class"), ("n", "numeric")])
                .unwrap();
        let params = HyperParams::new(0.1, 300, vec![0.0; 4]).with_reference(reference());
        let mut model =
            LinearModel::new("counted", ModelConfig::new(schema, params), encoder.clone()).unwrap();

        let features: FeatureMap =
            serde_json::from_value(json!({"date": 20170501, "flag": "ghost", "n": "abc"})).unwrap();
        assert_eq!(
            model.add(&features, "1".to_string()),
            Err(Error::InvalidNumeric { feature: "n".to_string(), value: "abc".to_string() })
        );
        assert_eq!(model.describe().rows, 0);
        assert!(encoder.known_values("flag").is_empty());

        let features: FeatureMap =
            serde_json::from_value(json!({"date": 20170501, "flag": "real", "n": 2})).unwrap();
        model.add(&features, "1".to_string()).unwrap();
        model.train().unwrap();

        // the second row of the batch fails, the first must not leave a code behind
        let batch: FeatureMap = serde_json::from_value(json!({
            "date": [20170510, 201705],
            "flag": ["fresh", "real"],
            "n": [1, 2]
        }))
        .unwrap();
        assert_eq!(model.predict(&batch), Err(Error::MalformedDate("201705".to_string())));
        assert_eq!(encoder.known_values("flag"), vec!["real".to_string()]);
    }

    #[test]
    fn unseen_categorical_at_predict_gets_next_code() {
        let encoder = Arc::new(CategoricalEncoder::new());
        let mut model = mixed_model(encoder.clone());
        for day in 1..4 {
            model.add(&row(&format!("2017050{}", day), "true"), day.to_string()).unwrap();
        }
        model.train().unwrap();
        assert_eq!(encoder.code_of("flag", "maybe"), None);

        let results = model.predict(&row("20170510", "maybe")).unwrap();
        assert_eq!(encoder.code_of("flag", "true"), Some(0));
        assert_eq!(encoder.code_of("flag", "maybe"), Some(1));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["flag"], json!("maybe"));
        assert!(results[0].contains_key(PREDICTION_KEY));
    }

    #[test]
    fn lifecycle_guards() {
        let mut model = mixed_model(Arc::new(CategoricalEncoder::new()));
        assert_eq!(model.train(), Err(Error::NoTrainingData("mixed".to_string())));
        assert_eq!(
            model.predict(&row("20170510", "yes")),
            Err(Error::NotTrainedYet("mixed".to_string()))
        );

        model.add(&row("20170501", "yes"), "10".to_string()).unwrap();
        assert_eq!(
            model.predict(&row("20170510", "yes")),
            Err(Error::NotTrainedYet("mixed".to_string()))
        );
        model.train().unwrap();
        assert_eq!(model.state(), State::Trained);
        assert!(model.predict(&row("20170510", "yes")).is_ok());

        // new rows require another train call
        model.add(&row("20170502", "yes"), "12".to_string()).unwrap();
        assert_eq!(model.state(), State::Filled);
        assert!(model.predict(&row("20170510", "yes")).is_err());
        model.train().unwrap();
        assert_eq!(model.state(), State::Trained);
    }

    #[test]
    fn predict_with_mixed_types() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut model = mixed_model(Arc::new(CategoricalEncoder::new()));
        for day in 1..10 {
            let label = (450000 + day * 500).to_string();
            model.add(&row(&format!("2017050{}", day), "true"), label).unwrap();
        }
        model.train().unwrap();

        let features: FeatureMap =
            serde_json::from_value(json!({"date": [20170510, 20170511], "flag": ["true", "true"]}))
                .unwrap();
        let results = model.predict(&features).unwrap();
        info!("results: {:?}", results);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["date"], json!(20170510));
        assert_eq!(results[0]["flag"], json!("true"));
        assert_eq!(results[0][PREDICTION_KEY], json!(455000));
        assert_eq!(results[1]["date"], json!(20170511));
        assert_eq!(results[1][PREDICTION_KEY], json!(455500));

        // the constant categorical column is only centered and keeps its initial weight
        let info = model.describe();
        assert_eq!(info.std_dev.as_ref().map(|s| s[1]), Some(1.0));
        assert_eq!(info.theta.as_ref().map(|t| round(t[2], 9)), Some(0.0));
    }

    #[test]
    fn describe_reports_learned_parameters_only_when_trained() {
        let mut model = mixed_model(Arc::new(CategoricalEncoder::new()));
        let info = model.describe();
        assert_eq!(info.state, State::Created);
        assert_eq!(info.rows, 0);
        assert!(info.theta.is_none() && info.cost.is_none() && info.mean.is_none());

        model.add(&row("20170501", "yes"), "10".to_string()).unwrap();
        model.add(&row("20170503", "yes"), "14".to_string()).unwrap();
        model.train().unwrap();
        let info = model.describe();
        assert_eq!(info.state, State::Trained);
        assert_eq!(info.theta.as_ref().map(Vec::len), Some(3));
        assert_eq!(info.mean, Some(vec![8.0, 0.0]));
        assert!(info.cost.is_some());

        let text = info.to_string();
        assert!(text.contains("Status: trained"));
        assert!(text.contains("Number of added rows: 2"));
        assert!(text.contains("Sigma: "));

        model.add(&row("20170504", "yes"), "16".to_string()).unwrap();
        assert!(model.describe().theta.is_none());
    }

    #[test]
    fn creation_is_validated() {
        let encoder = Arc::new(CategoricalEncoder::new());
        let schema = FeatureSchema::parse([("date", "numeric"), ("flag", "class")]).unwrap();

        let res = LinearModel::new(
            "short",
            ModelConfig::new(schema.clone(), HyperParams::new(0.1, 300, vec![0.0, 0.0])),
            encoder.clone(),
        );
        assert_eq!(
            res.map(|m| m.name().to_string()),
            Err(Error::InvalidThetaLength { model: "short".to_string(), expected: 3, got: 2 })
        );

        let res = LinearModel::new(
            "series",
            ModelConfig::new(schema, HyperParams::new(0.1, 300, vec![0.0; 3])).time_series(true),
            encoder,
        );
        assert!(matches!(res, Err(Error::FeatureCountMismatch(_))));
    }
}
