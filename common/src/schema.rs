use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{Error, Result};

/// The kind of values a feature holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Integer or floating point values, used as they are
    Numeric,
    /// Discrete values, replaced by an integer code before training
    #[serde(rename = "class")]
    Categorical,
}

impl FromStr for FeatureKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NUMERIC" => Ok(FeatureKind::Numeric),
            "CLASS" => Ok(FeatureKind::Categorical),
            _ => Err(Error::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Numeric => write!(f, "numeric"),
            FeatureKind::Categorical => write!(f, "class"),
        }
    }
}

/// A single named column of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Name used as key in every add and predict call
    pub name: String,
    /// How raw values are turned into numbers
    pub kind: FeatureKind,
    /// Whether the column holds YYYYMMDD dates to be converted into an age in days
    pub is_date: bool,
}

impl Feature {
    /// A feature that is not a date column
    pub fn new(name: impl Into<String>, kind: FeatureKind) -> Self {
        Self { name: name.into(), kind, is_date: false }
    }

    /// A numeric feature holding YYYYMMDD dates
    pub fn date(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FeatureKind::Numeric, is_date: true }
    }
}

/// The ordered, non-empty set of features of a model.
/// The order is fixed at creation and defines the column order of every row and matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    features: Vec<Feature>,
}

impl FeatureSchema {
    /// Build a schema from explicit features
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::EmptySchema);
        }
        for (i, feature) in features.iter().enumerate() {
            if features[..i].iter().any(|f| f.name == feature.name) {
                return Err(Error::DuplicateFeature(feature.name.clone()));
            }
        }

        Ok(Self { features })
    }

    /// Build a schema from `(name, type)` pairs, where type is "numeric" or "class".
    /// The first feature is the date column.
    pub fn parse<I, K, V>(types: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let features = types
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                Ok(Feature { name: name.into(), kind: kind.as_ref().parse()?, is_date: i == 0 })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(features)
    }

    /// Number of features
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always false, a schema has at least one feature
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate the features in column order
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// The feature in column `idx`
    pub fn get(&self, idx: usize) -> Option<&Feature> {
        self.features.get(idx)
    }

    /// The features in column order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", feature.name, feature.kind)?;
            if feature.is_date {
                write!(f, " (date)")?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_type_strings() {
        assert_eq!("numeric".parse::<FeatureKind>(), Ok(FeatureKind::Numeric));
        assert_eq!("NUMERIC".parse::<FeatureKind>(), Ok(FeatureKind::Numeric));
        assert_eq!("Class".parse::<FeatureKind>(), Ok(FeatureKind::Categorical));
        assert_eq!("text".parse::<FeatureKind>(), Err(Error::UnknownType("text".to_string())));
    }

    #[test]
    fn first_feature_is_the_date_column() {
        let schema = FeatureSchema::parse([("date", "numeric"), ("flag", "class")]).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.features()[0], Feature::date("date"));
        assert_eq!(schema.features()[1], Feature::new("flag", FeatureKind::Categorical));
        assert_eq!(schema.to_string(), "{date=numeric (date), flag=class}");
    }

    #[test]
    fn order_is_preserved() {
        let schema =
            FeatureSchema::parse([("z", "numeric"), ("a", "numeric"), ("m", "class")]).unwrap();
        let names: Vec<&str> = schema.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn invalid_schemas() {
        let empty: [(&str, &str); 0] = [];
        assert_eq!(FeatureSchema::parse(empty), Err(Error::EmptySchema));
        assert_eq!(
            FeatureSchema::parse([("date", "numeric"), ("x", "vector")]),
            Err(Error::UnknownType("vector".to_string()))
        );
        assert_eq!(
            FeatureSchema::parse([("date", "numeric"), ("date", "class")]),
            Err(Error::DuplicateFeature("date".to_string()))
        );
    }

    #[test]
    fn explicit_date_columns() {
        let schema = FeatureSchema::new(vec![
            Feature::new("count", FeatureKind::Numeric),
            Feature::date("day"),
        ])
        .unwrap();
        assert!(!schema.features()[0].is_date);
        assert!(schema.features()[1].is_date);
    }
}
