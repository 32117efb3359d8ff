//! Translation of request DTOs into resolved columns, orders and filter groups.
//!
//! Column and order mapping consult the schema and stop at the first unknown
//! path. Filter mapping is schema-free; column validity is covered by
//! [`map_columns`], which the facade runs first.

use tableaux_core::{DataRequest, Filter, FilterGroup, Order, TableSchema, TableSchemaColumn};

/// A referenced column path does not exist in the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("unknown column {path}")]
    UnknownColumn { path: String },
    #[error("unknown order column {path}")]
    UnknownOrderColumn { path: String },
}

/// Resolves every requested column, preserving request order.
///
/// # Errors
///
/// Returns [`MappingError::UnknownColumn`] for the first path the schema
/// cannot resolve; later columns are not looked at.
pub fn map_columns(
    request: &DataRequest,
    schema: &TableSchema,
) -> Result<Vec<TableSchemaColumn>, MappingError> {
    request
        .columns
        .iter()
        .map(|column| {
            schema
                .column(&column.name)
                .cloned()
                .map_err(|_| MappingError::UnknownColumn {
                    path: column.name.clone(),
                })
        })
        .collect()
}

/// Maps the request's column orders to abstract [`Order`]s.
///
/// The schema lookup only checks existence; no comparator override is set.
///
/// # Errors
///
/// Returns [`MappingError::UnknownOrderColumn`] for the first unknown path.
pub fn map_orders(request: &DataRequest, schema: &TableSchema) -> Result<Vec<Order>, MappingError> {
    request
        .order
        .iter()
        .map(|order| {
            schema
                .column(&order.column)
                .map_err(|_| MappingError::UnknownOrderColumn {
                    path: order.column.clone(),
                })?;
            Ok(Order::new(order.column.clone(), order.dir, None))
        })
        .collect()
}

/// Builds one [`FilterGroup`] per column that carries search entries.
///
/// Columns without searches produce no group.
#[must_use]
pub fn map_filters(request: &DataRequest) -> Vec<FilterGroup> {
    request
        .columns
        .iter()
        .filter(|column| !column.search.is_empty())
        .map(|column| {
            let filters = column
                .search
                .iter()
                .map(|search| Filter::new(search.mode, search.value.clone()))
                .collect();
            FilterGroup::new(column.name.clone(), filters)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tableaux_core::{Column, ColumnOrder, ColumnSearch, FilterMode, SortDirection};

    use super::*;

    fn schema() -> TableSchema {
        TableSchema::new(
            "people",
            vec![
                TableSchemaColumn::new("name"),
                TableSchemaColumn::new("age"),
                TableSchemaColumn::new("address.city"),
            ],
        )
        .unwrap()
    }

    fn search(value: &str, mode: FilterMode) -> ColumnSearch {
        ColumnSearch {
            value: value.to_string(),
            mode,
        }
    }

    fn request_with_columns(names: &[&str]) -> DataRequest {
        DataRequest {
            columns: names.iter().map(|n| Column::new(*n)).collect(),
            ..DataRequest::default()
        }
    }

    // -- columns --

    #[test]
    fn columns_keep_request_order() {
        let req = request_with_columns(&["address.city", "name", "age"]);
        let paths: Vec<_> = map_columns(&req, &schema())
            .unwrap()
            .into_iter()
            .map(|c| c.path)
            .collect();
        assert_eq!(paths, vec!["address.city", "name", "age"]);
    }

    #[test]
    fn unknown_column_names_the_path() {
        let req = request_with_columns(&["name", "ageee"]);
        let err = map_columns(&req, &schema()).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownColumn {
                path: "ageee".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown column ageee");
    }

    #[test]
    fn column_mapping_stops_at_first_unknown() {
        let req = request_with_columns(&["first_bad", "name", "second_bad"]);
        let err = map_columns(&req, &schema()).unwrap_err();
        assert_eq!(err.to_string(), "unknown column first_bad");
    }

    // -- orders --

    #[test]
    fn orders_keep_direction_and_order() {
        let req = DataRequest {
            order: vec![
                ColumnOrder {
                    column: "age".to_string(),
                    dir: SortDirection::Desc,
                },
                ColumnOrder {
                    column: "name".to_string(),
                    dir: SortDirection::Asc,
                },
            ],
            ..DataRequest::default()
        };
        let orders = map_orders(&req, &schema()).unwrap();
        assert_eq!(
            orders,
            vec![
                Order::new("age", SortDirection::Desc, None),
                Order::new("name", SortDirection::Asc, None),
            ]
        );
    }

    #[test]
    fn unknown_order_column_names_the_path() {
        let req = DataRequest {
            order: vec![ColumnOrder {
                column: "height".to_string(),
                dir: SortDirection::Asc,
            }],
            ..DataRequest::default()
        };
        let err = map_orders(&req, &schema()).unwrap_err();
        assert_eq!(err.to_string(), "unknown order column height");
    }

    #[test]
    fn no_orders_maps_to_empty() {
        assert!(map_orders(&DataRequest::default(), &schema()).unwrap().is_empty());
    }

    // -- filters --

    #[test]
    fn filters_only_for_searched_columns() {
        let req = DataRequest {
            columns: vec![
                Column::new("name"),
                Column {
                    name: "age".to_string(),
                    search: vec![
                        search("30", FilterMode::GreaterThan),
                        search("10", FilterMode::LessThan),
                    ],
                },
                Column::new("address.city"),
            ],
            ..DataRequest::default()
        };

        let groups = map_filters(&req);
        assert_eq!(
            groups,
            vec![FilterGroup::new(
                "age",
                vec![
                    Filter::new(FilterMode::GreaterThan, "30"),
                    Filter::new(FilterMode::LessThan, "10"),
                ],
            )]
        );
    }

    #[test]
    fn filters_ignore_schema() {
        // Filter mapping never consults the schema.
        let req = DataRequest {
            columns: vec![Column {
                name: "not_in_any_schema".to_string(),
                search: vec![search("x", FilterMode::Contains)],
            }],
            ..DataRequest::default()
        };
        assert_eq!(map_filters(&req)[0].column, "not_in_any_schema");
    }

    fn arb_mode() -> impl Strategy<Value = FilterMode> {
        prop_oneof![
            Just(FilterMode::Equals),
            Just(FilterMode::Contains),
            Just(FilterMode::StartsWith),
            Just(FilterMode::GreaterThan),
        ]
    }

    fn arb_column() -> impl Strategy<Value = Column> {
        (
            "[a-z]{1,8}",
            prop::collection::vec(("[a-z0-9]{0,6}", arb_mode()), 0..4),
        )
            .prop_map(|(name, searches)| Column {
                name,
                search: searches
                    .into_iter()
                    .map(|(value, mode)| ColumnSearch { value, mode })
                    .collect(),
            })
    }

    proptest! {
        #[test]
        fn one_group_per_searched_column(columns in prop::collection::vec(arb_column(), 0..8)) {
            let req = DataRequest { columns: columns.clone(), ..DataRequest::default() };
            let groups = map_filters(&req);

            let searched: Vec<&Column> = columns.iter().filter(|c| !c.search.is_empty()).collect();
            prop_assert_eq!(groups.len(), searched.len());

            for (group, column) in groups.iter().zip(searched) {
                prop_assert_eq!(&group.column, &column.name);
                prop_assert_eq!(group.filters.len(), column.search.len());
                for (filter, search) in group.filters.iter().zip(&column.search) {
                    prop_assert_eq!(filter.mode, search.mode);
                    prop_assert_eq!(&filter.value, &search.value);
                }
            }
        }
    }
}
