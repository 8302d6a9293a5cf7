use std::collections::HashMap;

use dashmap::DashMap;

#[derive(Debug, Default)]
struct FeatureCodes {
    codes: HashMap<String, u32>,
    next_code: u32,
}

/// Assigns stable integer codes to the raw values of categorical features.
///
/// Codes are handed out per feature name in first-seen order starting at 0 and are never
/// reclaimed. One encoder is shared by every model of a registry, so the same raw value of
/// a feature maps to the same code during ingestion and prediction, and across models that
/// declare a feature of that name.
#[derive(Debug, Default)]
pub struct CategoricalEncoder {
    features: DashMap<String, FeatureCodes>,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The code of `raw` for `feature`, minting the next code if the value is new
    pub fn encode(&self, feature: &str, raw: &str) -> u32 {
        if let Some(code) = self.code_of(feature, raw) {
            return code;
        }

        // The entry guard is exclusive, so check and mint happen atomically
        let mut entry = self.features.entry(feature.to_string()).or_default();
        let table = &mut *entry;
        if let Some(code) = table.codes.get(raw) {
            return *code;
        }
        let code = table.next_code;
        table.codes.insert(raw.to_string(), code);
        table.next_code += 1;
        debug!("encoded new value '{}' of '{}' as {}", raw, feature, code);

        code
    }

    /// The code of `raw` for `feature`, if it was seen before
    pub fn code_of(&self, feature: &str, raw: &str) -> Option<u32> {
        self.features.get(feature).and_then(|table| table.codes.get(raw).copied())
    }

    /// All seen values of `feature`, ordered by their code
    pub fn known_values(&self, feature: &str) -> Vec<String> {
        let Some(table) = self.features.get(feature) else {
            return Vec::new();
        };
        let mut values: Vec<(&String, &u32)> = table.codes.iter().collect();
        values.sort_by_key(|(_, code)| **code);

        values.into_iter().map(|(v, _)| v.clone()).collect()
    }
}
