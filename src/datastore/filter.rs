// ABOUTME: Evaluates query filters and orders against JSON documents
// ABOUTME: Follows Firestore matching rules for missing fields and mixed value types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::cmp::Ordering;

use serde_json::Value;

use crate::errors::DatastoreError;
use crate::query::{Direction, Filter, Operator, Order, Query};

/// Resolve a dotted path such as `profile.city` inside `data`
#[must_use]
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.as_object()?.get(segment))
}

/// Reject filters whose operand shape cannot work with their operator
///
/// # Errors
/// Returns [`DatastoreError::InvalidQuery`] for a list operator without an array operand
pub fn validate(query: &Query) -> Result<(), DatastoreError> {
    for filter in &query.filters {
        let needs_array = matches!(
            filter.operator,
            Operator::In | Operator::NotIn | Operator::ArrayContainsAny
        );
        if needs_array && !filter.value.is_array() {
            return Err(DatastoreError::InvalidQuery(format!(
                "operator '{}' on '{}' requires an array value",
                filter.operator, filter.path
            )));
        }
        if filter.path.is_empty() {
            return Err(DatastoreError::InvalidQuery(
                "filter path must not be empty".to_owned(),
            ));
        }
    }
    Ok(())
}

/// Whether `data` satisfies every filter of `query`
#[must_use]
pub fn matches_all(data: &Value, query: &Query) -> bool {
    query.filters.iter().all(|filter| matches(data, filter))
}

/// Whether `data` satisfies `filter`
///
/// A document without the filtered field never matches, whatever the operator.
#[must_use]
pub fn matches(data: &Value, filter: &Filter) -> bool {
    let Some(field) = lookup(data, &filter.path) else {
        return false;
    };
    let operand = &filter.value;

    match filter.operator {
        Operator::Equal => values_equal(field, operand),
        Operator::NotEqual => !field.is_null() && !values_equal(field, operand),
        Operator::LessThan => compare(field, operand) == Some(Ordering::Less),
        Operator::LessThanOrEqual => matches!(
            compare(field, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::GreaterThan => compare(field, operand) == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => matches!(
            compare(field, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::In => operand
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| values_equal(field, c))),
        Operator::NotIn => {
            !field.is_null()
                && operand
                    .as_array()
                    .is_some_and(|candidates| !candidates.iter().any(|c| values_equal(field, c)))
        }
        Operator::ArrayContains => field
            .as_array()
            .is_some_and(|items| items.iter().any(|item| values_equal(item, operand))),
        Operator::ArrayContainsAny => match (field.as_array(), operand.as_array()) {
            (Some(items), Some(candidates)) => items
                .iter()
                .any(|item| candidates.iter().any(|c| values_equal(item, c))),
            _ => false,
        },
    }
}

/// Numbers compare by value regardless of integer or float representation
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Comparison for range filters; values of different types are not comparable
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used for sorting: by type first, then by value
fn sort_cmp(left: &Value, right: &Value) -> Ordering {
    type_rank(left)
        .cmp(&type_rank(right))
        .then_with(|| compare(left, right).unwrap_or(Ordering::Equal))
}

/// Sort documents by `orders`, dropping those missing an ordered field
pub fn apply_orders<T>(documents: &mut Vec<T>, orders: &[Order], data: impl Fn(&T) -> &Value) {
    if orders.is_empty() {
        return;
    }
    documents.retain(|doc| {
        orders
            .iter()
            .all(|order| lookup(data(doc), &order.path).is_some())
    });
    documents.sort_by(|a, b| {
        orders.iter().fold(Ordering::Equal, |acc, order| {
            acc.then_with(|| {
                let (Some(left), Some(right)) = (
                    lookup(data(a), &order.path),
                    lookup(data(b), &order.path),
                ) else {
                    return Ordering::Equal;
                };
                let ordering = sort_cmp(left, right);
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            })
        })
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lookup_nested_path() {
        let data = json!({"profile": {"city": "Tokyo"}});
        assert_eq!(lookup(&data, "profile.city"), Some(&json!("Tokyo")));
        assert_eq!(lookup(&data, "profile.country"), None);
        assert_eq!(lookup(&data, "profile.city.name"), None);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let data = json!({"name": "Or-1"});
        for operator in [Operator::Equal, Operator::NotEqual, Operator::NotIn] {
            let filter = Filter::new("age", operator, json!([1]));
            assert!(!matches(&data, &filter), "{operator} matched a missing field");
        }
    }

    #[test]
    fn test_numeric_comparison_ignores_representation() {
        let data = json!({"LastUsed": 100});
        assert!(matches(&data, &Filter::new("LastUsed", Operator::LessThanOrEqual, 100.0)));
        assert!(matches(&data, &Filter::new("LastUsed", Operator::GreaterThan, 99)));
        assert!(!matches(&data, &Filter::new("LastUsed", Operator::LessThan, "200")));
    }

    #[test]
    fn test_list_operators() {
        let data = json!({"role": "admin", "tags": ["a", "b"]});
        assert!(matches(&data, &Filter::new("role", Operator::In, json!(["admin", "ops"]))));
        assert!(!matches(&data, &Filter::new("role", Operator::NotIn, json!(["admin"]))));
        assert!(matches(&data, &Filter::new("tags", Operator::ArrayContains, "b")));
        assert!(matches(
            &data,
            &Filter::new("tags", Operator::ArrayContainsAny, json!(["z", "a"]))
        ));
    }

    #[test]
    fn test_validate_rejects_scalar_in_operand() {
        let query = Query::new().filter("role", Operator::In, "admin");
        assert!(matches!(validate(&query), Err(DatastoreError::InvalidQuery(_))));
    }

    #[test]
    fn test_apply_orders_desc_skips_missing() {
        let mut docs = vec![json!({"n": 1}), json!({"x": 0}), json!({"n": 3}), json!({"n": 2})];
        apply_orders(
            &mut docs,
            &[Order {
                path: "n".to_owned(),
                direction: Direction::Desc,
            }],
            |doc| doc,
        );
        assert_eq!(docs, vec![json!({"n": 3}), json!({"n": 2}), json!({"n": 1})]);
    }
}
