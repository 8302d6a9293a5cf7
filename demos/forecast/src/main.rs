#[macro_use]
extern crate log;

use std::error::Error;

use dialoguer::{theme::ColorfulTheme, Select};
use model_registry::{
    FeatureMap, FeatureSchema, HyperParams, ModelConfig, ModelRegistry, Prediction, NO_MODELS,
    PREDICTION_KEY,
};
use serde_json::json;

/// Fixed reference day so the demo output does not drift with the wall clock
const REFERENCE: u32 = 20170520;

fn main() -> Result<(), Box<dyn Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let registry = ModelRegistry::new();
    print_models(&registry);

    let scenarios = vec!["Users over time", "Users per batch", "Vehicles with attributes"];
    let e = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select scenario")
        .items(&scenarios)
        .default(0)
        .interact()?;
    let predictions = match e {
        0 => users_over_time(&registry)?,
        1 => users_per_batch(&registry)?,
        2 => vehicles(&registry)?,
        _ => unreachable!("Select only yields listed items"),
    };

    print_models(&registry);
    for name in registry.list_all() {
        println!("{}", registry.info(&name)?);
    }
    print_predictions(&predictions);

    for name in registry.list_all() {
        info!("{}", registry.remove(&name)?);
    }
    print_models(&registry);

    Ok(())
}

fn params(theta_len: usize) -> Result<HyperParams, model_registry::Error> {
    HyperParams::from_json(json!({
        "alpha": 0.1,
        "iter": 300,
        "theta": vec![0.0; theta_len],
        "reference": REFERENCE
    }))
}

fn users_over_time(registry: &ModelRegistry) -> Result<Vec<Prediction>, Box<dyn Error>> {
    let schema = FeatureSchema::parse([("date", "NUMERIC")])?;
    info!("{}", registry.create("user", ModelConfig::new(schema, params(2)?).time_series(true))?);

    for day in 1..10 {
        let features: FeatureMap = serde_json::from_value(json!({ "date": 20170500 + day }))?;
        registry.add("user", &features, 450000 + day * 500)?;
    }
    info!("{}", registry.train("user")?);

    let period: FeatureMap = serde_json::from_value(json!({"start": 20170508, "end": 20170515}))?;
    Ok(registry.predict("user", &period)?)
}

fn users_per_batch(registry: &ModelRegistry) -> Result<Vec<Prediction>, Box<dyn Error>> {
    let schema = FeatureSchema::parse([("date", "NUMERIC"), ("test", "CLASS")])?;
    info!("{}", registry.create("user", ModelConfig::new(schema, params(3)?))?);

    for day in 1..10 {
        let features: FeatureMap =
            serde_json::from_value(json!({"date": 20170500 + day, "test": "true"}))?;
        registry.add("user", &features, 450000 + day * 500)?;
    }
    info!("{}", registry.train("user")?);

    let batch: FeatureMap = serde_json::from_value(json!({
        "date": [20170510, 20170511, 20170512],
        "test": ["true", "true", "true"]
    }))?;
    Ok(registry.predict("user", &batch)?)
}

fn vehicles(registry: &ModelRegistry) -> Result<Vec<Prediction>, Box<dyn Error>> {
    let schema = FeatureSchema::parse([("date", "NUMERIC")])?;
    let config = ModelConfig::new(schema, params(2)?)
        .with_extra([("touchMbcWorld", "true")])
        .time_series(true);
    info!("{}", registry.create("vehicle", config)?);

    for day in 1..10 {
        let features: FeatureMap = serde_json::from_value(json!({ "date": 20170500 + day }))?;
        registry.add("vehicle", &features, 300 + day * 10)?;
    }
    info!("{}", registry.train("vehicle")?);

    let period: FeatureMap = serde_json::from_value(json!({"start": 20170510, "end": 20170520}))?;
    Ok(registry.predict("vehicle", &period)?)
}

fn print_models(registry: &ModelRegistry) {
    let names = registry.list_all();
    if names.is_empty() {
        println!("{}", NO_MODELS);
    } else {
        println!("Models: {}", names.join(", "));
    }
}

fn print_predictions(predictions: &[Prediction]) {
    for p in predictions {
        let prediction = p.get(PREDICTION_KEY).cloned().unwrap_or_default();
        let rest: Vec<String> = p
            .iter()
            .filter(|(k, _)| k.as_str() != PREDICTION_KEY)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        println!("{} -> {}", rest.join(", "), prediction);
    }
}
