//! Forest plot property definitions with defaults from forest.json
//!
//! forest.json is embedded at compile time and is the single source of truth
//! for property names, kinds and defaults. `PropertyReader` overlays user
//! values on top of it; invalid user values are logged and replaced by the
//! default.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// forest.json embedded at compile time
const FOREST_JSON: &str = include_str!("../../forest.json");

/// User-set property values, keyed by property name
pub type PropertySettings = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from forest.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(rename = "values")]
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PropertyFile {
    properties: Vec<PropertyDef>,
}

/// Registry of all properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property file in the forest.json layout
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: PropertyFile = serde_json::from_str(json)?;
        let properties = file
            .properties
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        Ok(Self { properties })
    }

    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All property definitions, sorted by name
    pub fn definitions(&self) -> Vec<&PropertyDef> {
        let mut defs: Vec<&PropertyDef> = self.properties.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Global property registry built from the embedded forest.json
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(FOREST_JSON).unwrap_or_else(|e| {
            tracing::error!("Failed to load forest.json: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader: user value if set, otherwise the forest.json default
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(settings: Option<&PropertySettings>) -> Self {
        let user_values: HashMap<String, String> = settings
            .map(|values| {
                values
                    .iter()
                    .filter(|(_, v)| !v.is_empty()) // Empty = not set
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        for name in user_values.keys() {
            if registry().get_property(name).is_none() {
                tracing::warn!("Unknown property '{}' is ignored", name);
            }
        }

        Self { user_values }
    }

    fn default_of(&self, name: &str) -> &'static str {
        registry().get_default(name).unwrap_or("")
    }

    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        self.default_of(name).to_string()
    }

    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Enumerated property; invalid user values fall back to the default
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = self.default_of(name);

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get_enum(name) == "true"
    }

    pub fn get_f64(&self, name: &str) -> f64 {
        let default = self.default_of(name).parse::<f64>().unwrap_or(0.0);

        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    tracing::warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {}",
                        value,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }

    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = self.default_of(name).parse::<f64>().unwrap_or(0.0);

        if (min..=max).contains(&value) {
            value
        } else {
            tracing::warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value,
                name,
                min,
                max,
                default
            );
            default
        }
    }

    /// Split a property on `sep`, trimming each item (empty value = empty list)
    pub fn get_list(&self, name: &str, sep: char) -> Vec<String> {
        let value = self.get_string(name);
        if value.trim().is_empty() {
            return Vec::new();
        }
        value.split(sep).map(|s| s.trim().to_string()).collect()
    }

    /// Comma-separated reals; an unparsable user value falls back to the default
    pub fn get_f64_list(&self, name: &str) -> Vec<f64> {
        if let Some(value) = self.user_values.get(name) {
            match parse_f64_list(value) {
                Some(list) => return list,
                None => tracing::warn!(
                    "Invalid number list '{}' for property '{}'. Using default: '{}'",
                    value,
                    name,
                    self.default_of(name)
                ),
            }
        }
        parse_f64_list(self.default_of(name)).unwrap_or_default()
    }

    /// "min,max" pair; an invalid user value falls back to the default
    pub fn get_pair(&self, name: &str) -> Option<(f64, f64)> {
        match self.get_f64_list(name).as_slice() {
            [a, b] => Some((*a, *b)),
            other => {
                tracing::warn!(
                    "Property '{}' needs two numbers 'min,max', got {} value(s)",
                    name,
                    other.len()
                );
                parse_f64_list(self.default_of(name)).and_then(|list| match list.as_slice() {
                    [a, b] => Some((*a, *b)),
                    _ => None,
                })
            }
        }
    }
}

fn parse_f64_list(value: &str) -> Option<Vec<f64>> {
    if value.trim().is_empty() {
        return Some(Vec::new());
    }
    value
        .split(',')
        .map(|s| s.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> PropertySettings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("axis.ticks").is_some());
        assert!(reg.get_property("table.header").is_some());
        assert!(reg.get_property("flags.strict").is_some());
        assert_eq!(
            reg.get_property("axis.log").map(|p| p.kind),
            Some(PropertyKind::Enumerated)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("axis.ticks"), Some("0.02,1,4,16,64,256,1000"));
        assert_eq!(reg.get_default("box.size.min"), Some("0.15"));
        assert_eq!(reg.get_default("flags.strict"), Some("false"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("axis.log", "true"));
        assert!(reg.is_valid_enum_value("axis.log", "FALSE"));
        assert!(!reg.is_valid_enum_value("axis.log", "maybe"));
        assert!(reg.is_valid_enum_value("plot.title", "anything"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = PropertyReader::new(None);
        assert_eq!(reader.get_f64("axis.zero"), 1.0);
        assert!(reader.get_bool("axis.log"));
        assert_eq!(reader.get_optional_string("plot.title"), None);
        assert_eq!(reader.get_pair("axis.clip"), Some((0.02, 1000.0)));
        assert_eq!(
            reader.get_f64_list("axis.ticks"),
            vec![0.02, 1.0, 4.0, 16.0, 64.0, 256.0, 1000.0]
        );
        assert!(reader.get_list("axis.tick.labels", ',').is_empty());
    }

    #[test]
    fn test_user_values_override() {
        let values = settings(&[
            ("plot.title", "OS by biomarker"),
            ("axis.ticks", "0.5, 1, 2"),
            ("axis.log", "False"),
        ]);
        let reader = PropertyReader::new(Some(&values));
        assert_eq!(
            reader.get_optional_string("plot.title").as_deref(),
            Some("OS by biomarker")
        );
        assert_eq!(reader.get_f64_list("axis.ticks"), vec![0.5, 1.0, 2.0]);
        assert!(!reader.get_bool("axis.log"));
    }

    #[test]
    fn test_empty_user_value_means_not_set() {
        let values = settings(&[("axis.zero", "")]);
        let reader = PropertyReader::new(Some(&values));
        assert_eq!(reader.get_f64("axis.zero"), 1.0);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let values = settings(&[
            ("axis.zero", "one"),
            ("axis.ticks", "1,two,3"),
            ("axis.clip", "5"),
            ("flags.strict", "sometimes"),
            ("line.width", "500"),
        ]);
        let reader = PropertyReader::new(Some(&values));
        assert_eq!(reader.get_f64("axis.zero"), 1.0);
        assert_eq!(reader.get_f64_list("axis.ticks").len(), 7);
        assert_eq!(reader.get_pair("axis.clip"), Some((0.02, 1000.0)));
        assert!(!reader.get_bool("flags.strict"));
        assert_eq!(reader.get_f64_in_range("line.width", 0.0, 20.0), 1.5);
    }

    #[test]
    fn test_header_list_uses_pipe() {
        let reader = PropertyReader::new(None);
        let header = reader.get_list("table.header", '|');
        assert_eq!(header.len(), 5);
        assert_eq!(header[3], "Effect [95% CI]");
    }
}
