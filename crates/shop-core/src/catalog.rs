//! # Item Catalog
//!
//! Item-name lookups loaded once from configuration.
//!
//! Two maps are kept: item name → provider price id, and item name →
//! download URL. Both are read-only after startup. A missing entry is an
//! ordinary `None`, never an error; callers decide what "not found" means.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Prefix of a well-formed provider price identifier
pub const PRICE_ID_PREFIX: &str = "price_";

/// Read-only item-name → identifier mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupMap {
    entries: HashMap<String, String>,
}

impl LookupMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `{"item name": "identifier"}`.
    ///
    /// Malformed JSON or a non-object yields an empty map. Entries whose
    /// value is not a non-empty string are dropped.
    pub fn from_json(json: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring malformed lookup map JSON: {}", e);
                return Self::new();
            }
        };

        let Some(object) = value.as_object() else {
            warn!("Ignoring lookup map JSON that is not an object");
            return Self::new();
        };

        object
            .iter()
            .filter_map(|(name, v)| v.as_str().map(|id| (name.clone(), id.to_string())))
            .collect()
    }

    /// Add an entry
    pub fn insert(&mut self, item_name: impl Into<String>, identifier: impl Into<String>) {
        self.entries.insert(item_name.into(), identifier.into());
    }

    /// Builder: add an entry
    pub fn with_entry(mut self, item_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.insert(item_name, identifier);
        self
    }

    /// Exact item-name lookup
    pub fn resolve(&self, item_name: &str) -> Option<&str> {
        if item_name.is_empty() {
            return None;
        }
        self.entries
            .get(item_name)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for LookupMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Price and download lookups for the shop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Item name → price id
    #[serde(default)]
    pub prices: LookupMap,
    /// Item name → download URL
    #[serde(default)]
    pub downloads: LookupMap,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the two JSON-encoded maps
    pub fn from_json(price_map: &str, download_map: &str) -> Self {
        Self {
            prices: LookupMap::from_json(price_map),
            downloads: LookupMap::from_json(download_map),
        }
    }

    /// Load catalog from TOML string (`[prices]` and `[downloads]` tables)
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Resolve the price for a selection.
    ///
    /// An explicit id wins when it carries the `price_` prefix; otherwise the
    /// item name is looked up.
    pub fn resolve_price_id<'a>(&'a self, explicit: &'a str, item_name: &str) -> Option<&'a str> {
        if explicit.starts_with(PRICE_ID_PREFIX) {
            return Some(explicit);
        }
        self.prices.resolve(item_name)
    }

    /// Resolve the download URL for an item
    pub fn resolve_download_url(&self, item_name: &str) -> Option<&str> {
        self.downloads.resolve(item_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_from_json() {
        let map = LookupMap::from_json(r#"{"Custom Portrait": "price_abc", "Mug": 12, "Empty": ""}"#);

        assert_eq!(map.resolve("Custom Portrait"), Some("price_abc"));
        assert_eq!(map.resolve("Mug"), None);
        assert_eq!(map.resolve("Empty"), None);
        assert_eq!(map.resolve("custom portrait"), None);
        assert_eq!(map.resolve(""), None);
    }

    #[test]
    fn test_malformed_json_is_empty() {
        assert!(LookupMap::from_json("{not json").is_empty());
        assert!(LookupMap::from_json(r#"["price_abc"]"#).is_empty());
        assert!(LookupMap::from_json("").is_empty());
    }

    #[test]
    fn test_explicit_price_wins_when_well_formed() {
        let catalog = Catalog {
            prices: LookupMap::new().with_entry("Custom Portrait", "price_abc"),
            downloads: LookupMap::new(),
        };

        assert_eq!(
            catalog.resolve_price_id("price_override", "Custom Portrait"),
            Some("price_override")
        );
        assert_eq!(
            catalog.resolve_price_id("prod_notaprice", "Custom Portrait"),
            Some("price_abc")
        );
        assert_eq!(catalog.resolve_price_id("", "Custom Portrait"), Some("price_abc"));
        assert_eq!(catalog.resolve_price_id("", "Unmapped Item"), None);
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
[prices]
"Custom Portrait" = "price_abc"

[downloads]
"Birthday Card (PDF Download)" = "https://files.example.com/card.pdf"
"#;
        let catalog = Catalog::from_toml(toml_str).unwrap();

        assert_eq!(catalog.prices.resolve("Custom Portrait"), Some("price_abc"));
        assert_eq!(
            catalog.resolve_download_url("Birthday Card (PDF Download)"),
            Some("https://files.example.com/card.pdf")
        );
    }
}
