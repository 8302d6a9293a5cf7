//! This crate provides the types shared by the regression engine and the model registry

#![deny(unused_imports)]
#![warn(missing_docs)]

mod date;
mod errors;
mod schema;
mod value;

pub use date::{date_range, days_between, parse_yyyymmdd, to_yyyymmdd, ReferenceDate};
pub use errors::{Error, Result};
pub use schema::{Feature, FeatureKind, FeatureSchema};
pub use value::{FeatureMap, FeatureValue};
