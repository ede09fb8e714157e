// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::{Condition, RecordStore, StoreError};
use crate::model::Record;

/// Table-per-collection store kept entirely in memory.
///
/// The whole store can be loaded from and saved to a single JSON document, which is what the
/// CLI operates on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    tables: BTreeMap<String, Vec<Record>>,
    #[serde(default)]
    sequences: BTreeMap<String, u64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place without syncing.
    #[default]
    BestEffort,

    /// Also syncs the file and its directory where the platform supports it.
    Durable,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store document; a missing file yields an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path, durability: WriteDurability) -> Result<(), StoreError> {
        let mut contents = serde_json::to_vec_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        contents.push(b'\n');
        write_atomic(path, &contents, durability)
    }

    pub fn table(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn current_sequence(&self, table: &str) -> u64 {
        self.sequences.get(table).copied().unwrap_or(0)
    }
}

impl RecordStore for MemoryStore {
    fn find_one(&self, table: &str, condition: &Condition) -> Result<Record, StoreError> {
        self.table(table)
            .iter()
            .find(|record| condition.matches(record))
            .cloned()
            .ok_or_else(|| StoreError::not_found(table, condition))
    }

    fn find_all(&self, table: &str, condition: &Condition) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .table(table)
            .iter()
            .filter(|record| condition.matches(record))
            .cloned()
            .collect())
    }

    fn count(&self, table: &str, condition: &Condition) -> Result<u64, StoreError> {
        Ok(self
            .table(table)
            .iter()
            .filter(|record| condition.matches(record))
            .count() as u64)
    }

    fn insert(&mut self, table: &str, record: Record) -> Result<(), StoreError> {
        self.tables.entry(table.to_owned()).or_default().push(record);
        Ok(())
    }

    fn update(
        &mut self,
        table: &str,
        condition: &Condition,
        patch: &Record,
    ) -> Result<u64, StoreError> {
        let Some(rows) = self.tables.get_mut(table) else {
            return Ok(0);
        };
        let mut touched = 0;
        for row in rows.iter_mut().filter(|row| condition.matches(row)) {
            for (field, value) in patch {
                row.insert(field.clone(), value.clone());
            }
            touched += 1;
        }
        Ok(touched)
    }

    fn delete(&mut self, table: &str, condition: &Condition) -> Result<u64, StoreError> {
        let Some(rows) = self.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !condition.matches(row));
        Ok((before - rows.len()) as u64)
    }

    fn next_sequence(&mut self, table: &str) -> Result<u64, StoreError> {
        let seq = self.sequences.entry(table.to_owned()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Replaces `path` with `contents` via a sibling temp file, so readers never see a torn store.
fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(io_at(path)(err)),
        _ => {}
    }

    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(io_at(dir))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| io_at(path)(io::Error::other("store path has no file name")))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = dir.join(format!(
        ".topo-import.tmp.{}.{}.{nanos}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let written = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            if durability == WriteDurability::Durable {
                file.sync_all()?;
            }
            Ok(())
        });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_at(&tmp_path)(err));
    }

    if let Err(err) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_at(path)(err));
    }

    if cfg!(unix) && durability == WriteDurability::Durable {
        fs::File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(io_at(dir))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests;
