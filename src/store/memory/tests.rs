// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};
use serde_json::json;

use super::{MemoryStore, WriteDurability};
use crate::model::fixtures::record;
use crate::store::{Condition, RecordStore, StoreError};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("topo-import-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert("cc_SetBase", record(json!({"bk_set_id": 1, "bk_set_name": "a", "bk_parent_id": 9})))
        .unwrap();
    store
        .insert("cc_SetBase", record(json!({"bk_set_id": 2, "bk_set_name": "b", "bk_parent_id": 9})))
        .unwrap();
    store
}

#[rstest]
fn find_one_distinguishes_not_found(store: MemoryStore) {
    let found = store
        .find_one("cc_SetBase", &Condition::new().eq("bk_set_name", "b"))
        .unwrap();
    assert_eq!(found["bk_set_id"], json!(2));

    let err = store
        .find_one("cc_SetBase", &Condition::new().eq("bk_set_name", "zzz"))
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .find_one("cc_Unknown", &Condition::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[rstest]
fn update_merges_patch_into_matches(mut store: MemoryStore) {
    let patch = record(json!({"bk_set_env": 5}));
    let touched = store
        .update("cc_SetBase", &Condition::new().eq("bk_set_id", 1u64), &patch)
        .unwrap();
    assert_eq!(touched, 1);

    let row = store
        .find_one("cc_SetBase", &Condition::new().eq("bk_set_id", 1u64))
        .unwrap();
    assert_eq!(row["bk_set_env"], json!(5));
    assert_eq!(row["bk_set_name"], json!("a"));
}

#[rstest]
fn delete_reports_removed_count(mut store: MemoryStore) {
    let removed = store
        .delete("cc_SetBase", &Condition::new().eq("bk_parent_id", 9u64))
        .unwrap();
    assert_eq!(removed, 2);
    assert!(store.table("cc_SetBase").is_empty());
    assert_eq!(store.delete("cc_Missing", &Condition::new()).unwrap(), 0);
}

#[rstest]
fn sequences_are_per_table_and_monotonic(mut store: MemoryStore) {
    assert_eq!(store.next_sequence("cc_SetBase").unwrap(), 1);
    assert_eq!(store.next_sequence("cc_SetBase").unwrap(), 2);
    assert_eq!(store.next_sequence("cc_ModuleBase").unwrap(), 1);
    assert_eq!(store.current_sequence("cc_SetBase"), 2);
}

#[rstest]
fn save_then_open_restores_tables_and_sequences(mut store: MemoryStore) {
    let tmp = TempDir::new("memory-store");
    let path = tmp.path().join("nested").join("store.json");
    store.next_sequence("cc_SetBase").unwrap();

    store.save(&path, WriteDurability::Durable).unwrap();
    let loaded = MemoryStore::open(&path).unwrap();
    assert_eq!(loaded, store);

    let leftovers = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".topo-import.tmp"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn open_missing_file_yields_empty_store() {
    let tmp = TempDir::new("memory-store-missing");
    let store = MemoryStore::open(&tmp.path().join("absent.json")).unwrap();
    assert_eq!(store, MemoryStore::new());
}

#[test]
fn open_rejects_malformed_json() {
    let tmp = TempDir::new("memory-store-bad");
    let path = tmp.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(MemoryStore::open(&path), Err(StoreError::Json { .. })));
}
