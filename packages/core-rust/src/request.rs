//! Wire DTOs for a single data request sent by the grid frontend.
//!
//! Every field is optional on the wire: absent numbers decode to `0`, absent
//! strings to `""` and absent lists to empty lists. Structural sanity
//! (positive length, non-empty columns, ...) is checked later by the server's
//! request validator, not by deserialization.

use serde::{Deserialize, Deserializer, Serialize};

use crate::query::{FilterMode, SortDirection};

// ---------------------------------------------------------------------------
// Null-as-default helper
// ---------------------------------------------------------------------------

/// Deserializes a field that may be absent, `null`, or a value.
///
/// Browser clients routinely send `"search": null` for columns without a
/// filter. `#[serde(default)]` alone only covers the absent case; this maps
/// an explicit `null` to `T::default()` as well.
fn deserialize_null_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// A single data request from the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRequest {
    /// Offset of the first requested row.
    pub start: i64,
    /// Opaque echo token, returned verbatim in every response.
    pub draw: i64,
    /// Page size.
    pub length: i64,
    /// Locale the frontend renders in, forwarded to the connector.
    pub locale: String,
    /// Requested columns. Order defines the field order of response rows.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub columns: Vec<Column>,
    /// Sort directives, most significant first.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub order: Vec<ColumnOrder>,
    /// Global search over all requested columns.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub search: GlobalSearch,
}

/// A single requested column.
///
/// Multiple `search` entries are OR-chained against this column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    /// Column path within the schema.
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub search: Vec<ColumnSearch>,
}

impl Column {
    /// A column without any search entries.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search: Vec::new(),
        }
    }
}

/// Request to order a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder {
    pub column: String,
    #[serde(default)]
    pub dir: SortDirection,
}

/// Request to search for a value in a given mode.
///
/// Only meaningful inside a [`Column`], which names the searched column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSearch {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub mode: FilterMode,
}

/// Global search term applied across all requested columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSearch {
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_request() {
        let json = r#"{
            "start": 20,
            "draw": 3,
            "length": 10,
            "locale": "en",
            "columns": [
                {"name": "age", "search": [{"value": "42", "mode": "equals"}]},
                {"name": "name"}
            ],
            "order": [{"column": "age", "dir": "desc"}],
            "search": {"value": "bob"}
        }"#;

        let req: DataRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.start, 20);
        assert_eq!(req.draw, 3);
        assert_eq!(req.length, 10);
        assert_eq!(req.locale, "en");
        assert_eq!(req.columns.len(), 2);
        assert_eq!(req.columns[0].search[0].mode, FilterMode::Equals);
        assert!(req.columns[1].search.is_empty());
        assert_eq!(req.order[0].dir, SortDirection::Desc);
        assert_eq!(req.search.value, "bob");
    }

    #[test]
    fn missing_fields_default_to_zero_and_empty() {
        let req: DataRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, DataRequest::default());
        assert_eq!(req.length, 0);
        assert!(req.columns.is_empty());
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let json = r#"{"columns": [{"name": "age", "search": null}], "order": null, "search": null}"#;
        let req: DataRequest = serde_json::from_str(json).unwrap();
        assert!(req.columns[0].search.is_empty());
        assert!(req.order.is_empty());
        assert_eq!(req.search.value, "");
    }

    #[test]
    fn negative_numbers_survive_decoding() {
        // Rejection is the validator's job, so the DTO must keep the sign.
        let req: DataRequest = serde_json::from_str(r#"{"start": -1, "draw": -2}"#).unwrap();
        assert_eq!(req.start, -1);
        assert_eq!(req.draw, -2);
    }

    #[test]
    fn unknown_filter_mode_is_rejected() {
        let json = r#"{"columns": [{"name": "a", "search": [{"value": "x", "mode": "fuzzy"}]}]}"#;
        assert!(serde_json::from_str::<DataRequest>(json).is_err());
    }
}
