use std::collections::BTreeMap;

use chrono::NaiveDate;
use common::{
    date_range, parse_yyyymmdd, to_yyyymmdd, Error, Feature, FeatureKind, FeatureMap, FeatureSchema,
    FeatureValue, Result,
};
use serde_json::Value;

/// Key of the predicted value in every result row
pub const PREDICTION_KEY: &str = "prediction";

/// One result row: feature values as given, the prediction, and the model's extra attributes
pub type Prediction = BTreeMap<String, Value>;

const START: &str = "start";
const END: &str = "end";

/// The rows a predict call asks for, in schema order and not yet encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionInput {
    /// One row per day from `start` to `end`, both inclusive
    Period { start: NaiveDate, end: NaiveDate },
    /// A scalar for every feature
    Single(Vec<String>),
    /// An equally long list for every feature, one row per position
    Batch(Vec<Vec<String>>),
}

impl PredictionInput {
    /// Select the prediction mode from the shape of `features`.
    /// Time series models take exactly a `start` and an `end` date, all others take either
    /// one scalar or one list per schema feature, chosen by the first feature.
    pub fn from_features(
        schema: &FeatureSchema,
        features: &FeatureMap,
        time_series: bool,
    ) -> Result<Self> {
        if time_series {
            return Self::period(features);
        }

        let Some(first) = schema.get(0) else {
            return Err(Error::EmptySchema);
        };
        match lookup(features, first)? {
            FeatureValue::Single(_) => Self::single(schema, features),
            FeatureValue::Many(vs) => Self::batch(schema, features, vs.len()),
        }
    }

    fn period(features: &FeatureMap) -> Result<Self> {
        if features.len() != 2 || !features.contains_key(START) || !features.contains_key(END) {
            let mut keys: Vec<&str> = features.keys().map(String::as_str).collect();
            keys.sort_unstable();
            return Err(Error::FeatureCountMismatch(format!(
                "predicting a period requires exactly one start and one end date, got {:?}",
                keys
            )));
        }
        let date = |key: &str| {
            features[key]
                .as_single()
                .ok_or_else(|| {
                    Error::FeatureCountMismatch(format!("'{}' has to be a single date", key))
                })
                .and_then(parse_yyyymmdd)
        };

        Ok(PredictionInput::Period { start: date(START)?, end: date(END)? })
    }

    fn single(schema: &FeatureSchema, features: &FeatureMap) -> Result<Self> {
        let row = schema
            .iter()
            .map(|feature| {
                lookup(features, feature)?.as_single().map(str::to_string).ok_or_else(|| {
                    Error::FeatureCountMismatch(format!(
                        "'{}' is a list but the other features are single values",
                        feature.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PredictionInput::Single(row))
    }

    fn batch(schema: &FeatureSchema, features: &FeatureMap, len: usize) -> Result<Self> {
        let mut rows = vec![Vec::with_capacity(schema.len()); len];
        for feature in schema.iter() {
            let values = lookup(features, feature)?.as_many().ok_or_else(|| {
                Error::FeatureCountMismatch(format!(
                    "'{}' is a single value but the other features are lists",
                    feature.name
                ))
            })?;
            if values.len() != len {
                return Err(Error::FeatureCountMismatch(format!(
                    "'{}' has {} values, expected {}",
                    feature.name,
                    values.len(),
                    len
                )));
            }
            rows.iter_mut().zip(values).for_each(|(row, v)| row.push(v.clone()));
        }

        Ok(PredictionInput::Batch(rows))
    }

    /// The raw rows, in input order. Period rows hold just the date.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        match self {
            PredictionInput::Period { start, end } => {
                date_range(start, end).iter().map(|d| vec![to_yyyymmdd(d)]).collect()
            }
            PredictionInput::Single(row) => vec![row],
            PredictionInput::Batch(rows) => rows,
        }
    }
}

fn lookup<'a>(features: &'a FeatureMap, feature: &Feature) -> Result<&'a FeatureValue> {
    features.get(&feature.name).ok_or_else(|| Error::MissingFeature(feature.name.clone()))
}

/// How a raw feature value is echoed back: numbers rounded to integers,
/// categorical values as given
fn display_value(feature: &Feature, raw: &str) -> Value {
    if feature.kind == FeatureKind::Categorical && !feature.is_date {
        return Value::from(raw);
    }
    match raw.trim().parse::<f64>() {
        Ok(v) => Value::from(v.round() as i64),
        Err(_) => Value::from(raw),
    }
}

/// Build one result row per raw row and prediction
pub(crate) fn assemble(
    schema: &FeatureSchema,
    raw_rows: &[Vec<String>],
    predictions: &[f64],
    extra: &BTreeMap<String, String>,
) -> Vec<Prediction> {
    raw_rows
        .iter()
        .zip(predictions)
        .map(|(row, y)| {
            let mut result: Prediction = schema
                .iter()
                .zip(row)
                .map(|(feature, raw)| (feature.name.clone(), display_value(feature, raw)))
                .collect();
            result.insert(PREDICTION_KEY.to_string(), Value::from(y.round() as i64));
            result.extend(extra.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))));
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn features(value: Value) -> FeatureMap {
        serde_json::from_value(value).unwrap()
    }

    fn mixed_schema() -> FeatureSchema {
        FeatureSchema::parse([("date", "numeric"), ("flag", "class")]).unwrap()
    }

    #[test]
    fn period_expands_every_day() {
        let schema = FeatureSchema::parse([("date", "numeric")]).unwrap();
        let input = PredictionInput::from_features(
            &schema,
            &features(json!({"start": 20170508, "end": "20170515"})),
            true,
        )
        .unwrap();

        let rows = input.into_rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], vec!["20170508".to_string()]);
        assert_eq!(rows[7], vec!["20170515".to_string()]);
    }

    #[test]
    fn period_requires_exactly_start_and_end() {
        let schema = FeatureSchema::parse([("date", "numeric")]).unwrap();
        for value in [
            json!({"start": 20170508}),
            json!({"start": 20170508, "end": 20170515, "date": 1}),
            json!({"begin": 20170508, "end": 20170515}),
            json!({"start": [20170508], "end": 20170515}),
        ] {
            let res = PredictionInput::from_features(&schema, &features(value.clone()), true);
            assert!(matches!(res, Err(Error::FeatureCountMismatch(_))), "{} accepted", value);
        }

        let res = PredictionInput::from_features(
            &schema,
            &features(json!({"start": 20170532, "end": 20170515})),
            true,
        );
        assert_eq!(res, Err(Error::MalformedDate("20170532".to_string())));
    }

    #[test]
    fn single_and_batch_modes() {
        let schema = mixed_schema();

        let input = PredictionInput::from_features(
            &schema,
            &features(json!({"flag": "true", "date": 20170510, "ignored": 1})),
            false,
        )
        .unwrap();
        assert_eq!(
            input,
            PredictionInput::Single(vec!["20170510".to_string(), "true".to_string()])
        );

        let input = PredictionInput::from_features(
            &schema,
            &features(json!({"date": [20170510, 20170511], "flag": ["true", "false"]})),
            false,
        )
        .unwrap();
        assert_eq!(
            input.into_rows(),
            vec![
                vec!["20170510".to_string(), "true".to_string()],
                vec!["20170511".to_string(), "false".to_string()],
            ]
        );
    }

    #[test]
    fn misshapen_inputs() {
        let schema = mixed_schema();

        let res = PredictionInput::from_features(&schema, &features(json!({"date": 20170510})), false);
        assert_eq!(res, Err(Error::MissingFeature("flag".to_string())));

        for value in [
            json!({"date": [20170510, 20170511], "flag": ["true"]}),
            json!({"date": [20170510], "flag": "true"}),
            json!({"date": 20170510, "flag": ["true"]}),
        ] {
            let res = PredictionInput::from_features(&schema, &features(value.clone()), false);
            assert!(matches!(res, Err(Error::FeatureCountMismatch(_))), "{} accepted", value);
        }
    }

    #[test]
    fn assemble_echoes_inputs_and_extras() {
        let schema = mixed_schema();
        let rows = vec![
            vec!["20170510".to_string(), "true".to_string()],
            vec!["20170511.0".to_string(), "false".to_string()],
        ];
        let extra = BTreeMap::from([("touchMbcWorld".to_string(), "true".to_string())]);

        let results = assemble(&schema, &rows, &[451999.6, 452500.2], &extra);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["date"], json!(20170510));
        assert_eq!(results[0]["flag"], json!("true"));
        assert_eq!(results[0][PREDICTION_KEY], json!(452000));
        assert_eq!(results[0]["touchMbcWorld"], json!("true"));
        assert_eq!(results[1]["date"], json!(20170511));
        assert_eq!(results[1][PREDICTION_KEY], json!(452500));
    }
}
