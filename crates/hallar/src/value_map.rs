//! Display label to underlying value translation for discrete-option fields.
//!
//! Several labels may share one value (synonyms such as "Hướng Tây" and
//! "Tây"), but a label appears at most once. Once built the map never
//! changes, so the same label always resolves to the same value.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::result::{HallarError, HallarResult};

/// What the executor searches for and what it sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedValue {
    /// Text to look for in rendered options
    pub search_text: String,
    /// Value to apply to an underlying control
    pub value: String,
    /// Whether the label was found in the map
    pub mapped: bool,
}

/// Ordered label -> value table with unique labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ValueMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from pairs, rejecting duplicate labels
    pub fn from_pairs<I, L, V>(pairs: I) -> HallarResult<Self>
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (label, value) in pairs {
            map.insert(label, value)?;
        }
        Ok(map)
    }

    /// Add a label. Fails if the label is already present.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> HallarResult<()> {
        let label = label.into();
        if self.index.contains_key(&label) {
            return Err(HallarError::config(
                "",
                format!("duplicate value map label '{label}'"),
            ));
        }
        self.index.insert(label.clone(), self.entries.len());
        self.entries.push((label, value.into()));
        Ok(())
    }

    /// Look up the underlying value for a label
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.index
            .get(label)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Translate a label. Unknown labels are used verbatim.
    #[must_use]
    pub fn resolve(&self, label: &str) -> MappedValue {
        match self.get(label) {
            Some(value) => MappedValue {
                search_text: label.to_string(),
                value: value.to_string(),
                mapped: true,
            },
            None => MappedValue {
                search_text: label.to_string(),
                value: label.to_string(),
                mapped: false,
            },
        }
    }

    /// Translate a label, failing when it is absent
    pub fn resolve_required(&self, field: &str, label: &str) -> HallarResult<MappedValue> {
        if self.get(label).is_none() {
            return Err(HallarError::config(
                field,
                format!("no value mapping for label '{label}'"),
            ));
        }
        Ok(self.resolve(label))
    }

    /// All labels mapping to `value`, in insertion order
    #[must_use]
    pub fn labels_for(&self, value: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| v == value)
            .map(|(l, _)| l.as_str())
            .collect()
    }

    /// Whether `value` is one of the mapped values
    #[must_use]
    pub fn contains_value(&self, value: &str) -> bool {
        self.entries.iter().any(|(_, v)| v == value)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    /// Number of labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ValueMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueMapVisitor;

        impl<'de> Visitor<'de> for ValueMapVisitor {
            type Value = ValueMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of display labels to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ValueMap, A::Error> {
                let mut map = ValueMap::new();
                while let Some((label, value)) = access.next_entry::<String, String>()? {
                    map.insert(label, value).map_err(serde::de::Error::custom)?;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ValueMapVisitor)
    }
}
