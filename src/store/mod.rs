// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Record store interface consumed by the import engine.
//!
//! The engine only needs condition-based find/insert/update/delete, a distinguishable
//! "not found" outcome and a per-table sequence generator. [`MemoryStore`] is the reference
//! implementation and doubles as the JSON-file backed store used by the CLI.

pub mod memory;
#[cfg(test)]
pub(crate) mod recording;
pub mod topo;

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde_json::Value;

use crate::model::{values_equal, MainlineError, Record};

pub use memory::{MemoryStore, WriteDurability};
pub use topo::{
    host_binding_count, load_mainline, load_processes, seed_mainline, StoredProcess,
};

/// Minimal surface of a backing record store.
///
/// Calls are independent and non-transactional; callers must tolerate partial application.
pub trait RecordStore {
    /// Returns the first record matching `condition`, or [`StoreError::NotFound`].
    fn find_one(&self, table: &str, condition: &Condition) -> Result<Record, StoreError>;

    fn find_all(&self, table: &str, condition: &Condition) -> Result<Vec<Record>, StoreError>;

    fn count(&self, table: &str, condition: &Condition) -> Result<u64, StoreError> {
        Ok(self.find_all(table, condition)?.len() as u64)
    }

    fn insert(&mut self, table: &str, record: Record) -> Result<(), StoreError>;

    /// Merges `patch` into every matching record; returns the number of records touched.
    fn update(
        &mut self,
        table: &str,
        condition: &Condition,
        patch: &Record,
    ) -> Result<u64, StoreError>;

    /// Removes every matching record; returns the number removed.
    fn delete(&mut self, table: &str, condition: &Condition) -> Result<u64, StoreError>;

    /// Next value of the monotonically increasing sequence for `table` (first value is 1).
    fn next_sequence(&mut self, table: &str) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    NotIn(Vec<Value>),
    /// Numeric `<=`; records without the field never match.
    Lte(Value),
}

impl Predicate {
    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Eq(expected) => values_equal(value.unwrap_or(&Value::Null), expected),
            Self::NotIn(excluded) => {
                let value = value.unwrap_or(&Value::Null);
                !excluded.iter().any(|candidate| values_equal(value, candidate))
            }
            Self::Lte(bound) => match (value.and_then(Value::as_f64), bound.as_f64()) {
                (Some(value), Some(bound)) => value <= bound,
                _ => false,
            },
        }
    }
}

/// Conjunction of per-field predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    clauses: Vec<(String, Predicate)>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses
            .push((field.to_owned(), Predicate::Eq(value.into())));
        self
    }

    pub fn not_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.to_owned(), Predicate::NotIn(values)));
        self
    }

    pub fn lte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses
            .push((field.to_owned(), Predicate::Lte(value.into())));
        self
    }

    pub fn clauses(&self) -> &[(String, Predicate)] {
        &self.clauses
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses
            .iter()
            .all(|(field, predicate)| predicate.matches(record.get(field)))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (field, predicate)) in self.clauses.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match predicate {
                Predicate::Eq(value) => write!(f, "{field}: {value}")?,
                Predicate::NotIn(values) => {
                    write!(f, "{field}: $nin {}", Value::Array(values.clone()))?
                }
                Predicate::Lte(value) => write!(f, "{field}: $lte {value}")?,
            }
        }
        f.write_str("}")
    }
}

#[derive(Debug)]
pub enum StoreError {
    NotFound {
        table: String,
        condition: String,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    /// Stored data violates an assumption of the reader (missing id, bad mainline, ...).
    Corrupt {
        table: String,
        detail: String,
    },
    InvalidMainline {
        found: Vec<String>,
        source: MainlineError,
    },
    /// Failure reported by an external backend implementation.
    Backend {
        message: String,
    },
}

impl StoreError {
    pub fn not_found(table: &str, condition: &Condition) -> Self {
        Self::NotFound {
            table: table.to_owned(),
            condition: condition.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { table, condition } => {
                write!(f, "no record in {table} matches {condition}")
            }
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
            Self::Corrupt { table, detail } => write!(f, "corrupt data in {table}: {detail}"),
            Self::InvalidMainline { found, source } => write!(
                f,
                "persisted mainline [{}] is invalid: {source}",
                found.join("->")
            ),
            Self::Backend { message } => write!(f, "store backend error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidMainline { source, .. } => Some(source),
            Self::NotFound { .. }
            | Self::SymlinkRefused { .. }
            | Self::Corrupt { .. }
            | Self::Backend { .. } => None,
        }
    }
}
