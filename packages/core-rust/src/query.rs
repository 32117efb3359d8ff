//! Data-source-agnostic query primitives.
//!
//! These are what connectors receive after the server has resolved a
//! [`DataRequest`](crate::DataRequest) against a schema: orders, filters and
//! filter groups keyed by column path.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Sort direction for a column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Predicate kind applied to a filter value.
///
/// Camel-case variant names match the frontend wire values exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    #[default]
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterOrEquals,
    LessThan,
    LessOrEquals,
}

impl FilterMode {
    /// Whether the mode compares by ordering rather than by equality or text.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterOrEquals | Self::LessThan | Self::LessOrEquals
        )
    }

    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::GreaterThan => "greaterThan",
            Self::GreaterOrEquals => "greaterOrEquals",
            Self::LessThan => "lessThan",
            Self::LessOrEquals => "lessOrEquals",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Abstract ordering directive for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Path of the ordered column.
    pub column: String,
    pub direction: SortDirection,
    /// Name of a connector-specific comparator overriding the natural order.
    /// Never set by the request mapper; reserved for connectors.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparator: Option<String>,
}

impl Order {
    #[must_use]
    pub fn new(column: impl Into<String>, direction: SortDirection, comparator: Option<String>) -> Self {
        Self {
            column: column.into(),
            direction,
            comparator,
        }
    }
}

/// A single predicate. Only meaningful inside a [`FilterGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub mode: FilterMode,
    pub value: String,
}

impl Filter {
    #[must_use]
    pub fn new(mode: FilterMode, value: impl Into<String>) -> Self {
        Self {
            mode,
            value: value.into(),
        }
    }
}

/// OR-combined filters scoped to one column.
///
/// Distinct groups are AND-combined by connectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    /// Path of the filtered column.
    pub column: String,
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    #[must_use]
    pub fn new(column: impl Into<String>, filters: Vec<Filter>) -> Self {
        Self {
            column: column.into(),
            filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_mode_wire_names_match_as_str() {
        let modes = [
            FilterMode::Equals,
            FilterMode::NotEquals,
            FilterMode::Contains,
            FilterMode::NotContains,
            FilterMode::StartsWith,
            FilterMode::EndsWith,
            FilterMode::GreaterThan,
            FilterMode::GreaterOrEquals,
            FilterMode::LessThan,
            FilterMode::LessOrEquals,
        ];
        for mode in modes {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn ordering_modes() {
        assert!(FilterMode::GreaterThan.is_ordering());
        assert!(FilterMode::LessOrEquals.is_ordering());
        assert!(!FilterMode::Contains.is_ordering());
        assert!(!FilterMode::Equals.is_ordering());
    }

    #[test]
    fn sort_direction_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"desc\"");
        let dir: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(dir, SortDirection::Asc);
    }

    #[test]
    fn order_omits_missing_comparator() {
        let order = Order::new("age", SortDirection::Asc, None);
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("comparator").is_none());
    }
}
