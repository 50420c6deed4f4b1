// ABOUTME: Database-agnostic query descriptors for filter, order, and limit criteria
// ABOUTME: Filters within one query are AND-ed; several queries are OR-ed by the OR engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Query Abstraction
//!
//! A [`Query`] is plain data. It carries no behaviour beyond construction;
//! stores translate it into their native query form.
//!
//! - An empty filter list matches every document of the collection.
//! - A missing limit, or a limit of zero, means unbounded.
//! - Without orders the iteration order is whatever the store yields.
//!
//! ```rust
//! use webapp_core::query::{Direction, Operator, Query};
//!
//! let recent = Query::new()
//!     .where_eq("Username", "alice")
//!     .filter("LastUsed", Operator::GreaterThan, 1_700_000_000)
//!     .order_by("LastUsed", Direction::Desc)
//!     .limit(10);
//! assert_eq!(recent.filters.len(), 2);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Direction {
    /// Wire name of the direction
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// Anything other than "ASC" sorts descending.
impl From<&str> for Direction {
    fn from(value: &str) -> Self {
        if value == "ASC" {
            Self::Asc
        } else {
            Self::Desc
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Comparison operator of a filter, using the Firestore vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `in`: field equals one of the listed values
    In,
    /// `not-in`: field equals none of the listed values
    NotIn,
    /// `array-contains`: array field contains the value
    ArrayContains,
    /// `array-contains-any`: array field contains one of the listed values
    ArrayContainsAny,
}

impl Operator {
    /// Wire form of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::In => "in",
            Self::NotIn => "not-in",
            Self::ArrayContains => "array-contains",
            Self::ArrayContainsAny => "array-contains-any",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            "<" => Ok(Self::LessThan),
            "<=" => Ok(Self::LessThanOrEqual),
            ">" => Ok(Self::GreaterThan),
            ">=" => Ok(Self::GreaterThanOrEqual),
            "in" => Ok(Self::In),
            "not-in" => Ok(Self::NotIn),
            "array-contains" => Ok(Self::ArrayContains),
            "array-contains-any" => Ok(Self::ArrayContainsAny),
            other => Err(AppError::invalid_input(format!(
                "Unsupported filter operator: {other}"
            ))),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Ordering criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Dotted field path
    pub path: String,
    /// Sort direction
    pub direction: Direction,
}

/// Filtering criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Dotted field path
    pub path: String,
    /// Comparison operator
    pub operator: Operator,
    /// Operand
    pub value: Value,
}

impl Filter {
    /// Create a filter
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create an equality filter
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Equal, value)
    }
}

/// A conjunctive query: every filter must hold for a document to match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Maximum number of documents; `None` or `Some(0)` is unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Orders applied in sequence
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Filters, implicitly AND-ed
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Query {
    /// Query matching every document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter
    #[must_use]
    pub fn filter(
        mut self,
        path: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter::new(path, operator, value));
        self
    }

    /// Add an equality filter
    #[must_use]
    pub fn where_eq(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(path, Operator::Equal, value)
    }

    /// Append an ordering criterion
    #[must_use]
    pub fn order_by(mut self, path: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(Order {
            path: path.into(),
            direction,
        });
        self
    }

    /// Limit the number of documents
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The limit to enforce, if any
    #[must_use]
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|limit| *limit > 0)
    }
}
