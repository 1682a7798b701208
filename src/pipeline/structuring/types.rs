use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Sentinel stored for every parameter the drawing did not resolve.
pub const NA: &str = "NA";

/// Canonical fluid label for hydraulic mineral oil.
pub const FLUID_HYDRAULIC: &str = "HYD. OIL MINERAL";
/// Canonical fluid label for compressed air.
pub const FLUID_AIR: &str = "AIR";

/// Generates the closed key enum with its canonical names and fixed order.
macro_rules! parameter_keys {
    ($($variant:ident => $s:literal),+ $(,)?) => {
        /// One of the twelve canonical cylinder parameters.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ParameterKey {
            $(#[serde(rename = $s)] $variant),+
        }

        impl ParameterKey {
            /// All keys in output order.
            pub const ALL: [ParameterKey; 12] = [$(ParameterKey::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for ParameterKey {
            type Err = UnknownParameter;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownParameter(s.to_string())),
                }
            }
        }
    };
}

parameter_keys!(
    CylinderAction => "CYLINDER ACTION",
    BoreDiameter => "BORE DIAMETER",
    RodDiameter => "ROD DIAMETER",
    StrokeLength => "STROKE LENGTH",
    CloseLength => "CLOSE LENGTH",
    OperatingPressure => "OPERATING PRESSURE",
    OperatingTemperature => "OPERATING TEMPERATURE",
    Mounting => "MOUNTING",
    RodEnd => "ROD END",
    Fluid => "FLUID",
    DrawingNumber => "DRAWING NUMBER",
    Revision => "REVISION",
);

impl ParameterKey {
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown parameter name: {0}")]
pub struct UnknownParameter(pub String);

/// Parameters that warrant a focused re-query when unresolved, in audit order.
pub const CRITICAL_SET: [ParameterKey; 3] = [
    ParameterKey::BoreDiameter,
    ParameterKey::Fluid,
    ParameterKey::Mounting,
];

/// Value slot of a record: either resolved text or the `NA` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterValue {
    #[default]
    Na,
    Text(String),
}

impl ParameterValue {
    /// Wraps `text`, folding blank input into `Na` so a resolved value is never empty.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Na
        } else {
            Self::Text(text)
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Self::Na)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Na => NA,
            Self::Text(s) => s,
        }
    }

    /// Resolved text, or `None` for the sentinel.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Na => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fixed-schema extraction record. Every key is always present; missing
/// information is the `NA` sentinel, never an absent entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterRecord {
    values: [ParameterValue; 12],
}

impl ParameterRecord {
    /// A record with every parameter set to `NA`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ParameterKey) -> &ParameterValue {
        &self.values[key.index()]
    }

    pub fn is_na(&self, key: ParameterKey) -> bool {
        self.get(key).is_na()
    }

    /// Resolved text for `key`, `None` when `NA`.
    pub fn text(&self, key: ParameterKey) -> Option<&str> {
        self.get(key).text()
    }

    pub(crate) fn set(&mut self, key: ParameterKey, value: ParameterValue) {
        self.values[key.index()] = value;
    }

    /// `(key, value)` pairs in canonical output order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, &ParameterValue)> + '_ {
        ParameterKey::ALL
            .iter()
            .map(move |&key| (key, &self.values[key.index()]))
    }

    /// Number of parameters that are not `NA`.
    pub fn resolved_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_na()).count()
    }
}

impl Serialize for ParameterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_all_na() {
        let record = ParameterRecord::new();
        assert!(ParameterKey::ALL.iter().all(|&k| record.is_na(k)));
        assert_eq!(record.resolved_count(), 0);
    }

    #[test]
    fn keys_iterate_in_canonical_order() {
        let record = ParameterRecord::new();
        let names: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "CYLINDER ACTION",
                "BORE DIAMETER",
                "ROD DIAMETER",
                "STROKE LENGTH",
                "CLOSE LENGTH",
                "OPERATING PRESSURE",
                "OPERATING TEMPERATURE",
                "MOUNTING",
                "ROD END",
                "FLUID",
                "DRAWING NUMBER",
                "REVISION",
            ]
        );
    }

    #[test]
    fn key_from_str_roundtrip() {
        for key in ParameterKey::ALL {
            assert_eq!(key.as_str().parse::<ParameterKey>().unwrap(), key);
        }
        assert!("PISTON COLOUR".parse::<ParameterKey>().is_err());
    }

    #[test]
    fn blank_text_folds_to_na() {
        assert!(ParameterValue::from_text("   ").is_na());
        assert_eq!(ParameterValue::from_text("110").as_str(), "110");
    }

    #[test]
    fn na_displays_sentinel() {
        assert_eq!(ParameterValue::Na.to_string(), "NA");
    }

    #[test]
    fn record_serializes_as_ordered_map() {
        let mut record = ParameterRecord::new();
        record.set(ParameterKey::BoreDiameter, ParameterValue::from_text("110"));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with("{\"CYLINDER ACTION\":\"NA\",\"BORE DIAMETER\":\"110\""));
        assert!(json.ends_with("\"REVISION\":\"NA\"}"));
    }

    #[test]
    fn key_serializes_as_canonical_name() {
        let json = serde_json::to_string(&ParameterKey::RodEnd).unwrap();
        assert_eq!(json, "\"ROD END\"");
    }
}
