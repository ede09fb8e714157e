// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{Condition, MemoryStore, RecordStore, StoreError};
use crate::model::Record;

/// A mutating call observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Insert { table: String, record: Record },
    Update { table: String, condition: Condition, patch: Record },
    Delete { table: String, condition: Condition },
    NextSequence { table: String },
}

/// Wraps a [`MemoryStore`] and journals every mutating call.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    pub(crate) inner: MemoryStore,
    pub(crate) calls: Vec<Call>,
    /// When set, lookups against this table fail with a backend error.
    pub(crate) fail_table: Option<String>,
}

impl RecordingStore {
    pub(crate) fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            calls: Vec::new(),
            fail_table: None,
        }
    }

    pub(crate) fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub(crate) fn mutations(&self) -> impl Iterator<Item = &Call> {
        self.calls
            .iter()
            .filter(|call| !matches!(call, Call::NextSequence { .. }))
    }

    pub(crate) fn inserts_into<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Record> {
        self.calls.iter().filter_map(move |call| match call {
            Call::Insert { table: t, record } if t == table => Some(record),
            _ => None,
        })
    }

    pub(crate) fn updates_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Record> {
        self.calls.iter().filter_map(move |call| match call {
            Call::Update { table: t, patch, .. } if t == table => Some(patch),
            _ => None,
        })
    }

    pub(crate) fn deletes_from<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a Condition> {
        self.calls.iter().filter_map(move |call| match call {
            Call::Delete { table: t, condition } if t == table => Some(condition),
            _ => None,
        })
    }

    fn check(&self, table: &str) -> Result<(), StoreError> {
        if self.fail_table.as_deref() == Some(table) {
            return Err(StoreError::Backend {
                message: format!("injected failure on {table}"),
            });
        }
        Ok(())
    }
}

impl RecordStore for RecordingStore {
    fn find_one(&self, table: &str, condition: &Condition) -> Result<Record, StoreError> {
        self.check(table)?;
        self.inner.find_one(table, condition)
    }

    fn find_all(&self, table: &str, condition: &Condition) -> Result<Vec<Record>, StoreError> {
        self.check(table)?;
        self.inner.find_all(table, condition)
    }

    fn count(&self, table: &str, condition: &Condition) -> Result<u64, StoreError> {
        self.check(table)?;
        self.inner.count(table, condition)
    }

    fn insert(&mut self, table: &str, record: Record) -> Result<(), StoreError> {
        self.calls.push(Call::Insert {
            table: table.to_owned(),
            record: record.clone(),
        });
        self.inner.insert(table, record)
    }

    fn update(
        &mut self,
        table: &str,
        condition: &Condition,
        patch: &Record,
    ) -> Result<u64, StoreError> {
        self.calls.push(Call::Update {
            table: table.to_owned(),
            condition: condition.clone(),
            patch: patch.clone(),
        });
        self.inner.update(table, condition, patch)
    }

    fn delete(&mut self, table: &str, condition: &Condition) -> Result<u64, StoreError> {
        self.calls.push(Call::Delete {
            table: table.to_owned(),
            condition: condition.clone(),
        });
        self.inner.delete(table, condition)
    }

    fn next_sequence(&mut self, table: &str) -> Result<u64, StoreError> {
        self.calls.push(Call::NextSequence {
            table: table.to_owned(),
        });
        self.inner.next_sequence(table)
    }
}
