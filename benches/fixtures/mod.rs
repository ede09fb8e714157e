// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use topo_import::import::NoopRegistrar;
use topo_import::model::{Mainline, Node, ObjectKind, OwnerId, ProcessDef, ProcessTopology, Record, TopologyDefinition};
use topo_import::store::{seed_mainline, MemoryStore};
use topo_import::{import_topology, ImportOptions, ImportReport};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("topo_import_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 8 sets x 4 modules, one process per set.
    Small,
    /// 64 sets x 16 modules, one process per set.
    Medium,
}

impl Case {
    fn shape(self) -> (usize, usize) {
        match self {
            Self::Small => (8, 4),
            Self::Medium => (64, 16),
        }
    }
}

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record fixture must be an object")
}

/// Target tree for `case`; `revision` changes every set's `bk_set_env` so re-imports update.
pub fn definition(case: Case, revision: u64) -> TopologyDefinition {
    let (sets, modules) = case.shape();
    let children = (0..sets)
        .map(|set| {
            let modules = (0..modules)
                .map(|module| {
                    Node::new(
                        ObjectKind::Module,
                        record(json!({"bk_module_name": format!("m{set:03}-{module:03}")})),
                    )
                })
                .collect();
            Node::new(
                ObjectKind::Set,
                record(json!({"bk_set_name": format!("s{set:03}"), "bk_set_env": revision})),
            )
            .with_children(modules)
        })
        .collect();
    let root = Node::new(ObjectKind::Business, record(json!({"bk_biz_name": "bench"})))
        .with_children(children);

    let processes = (0..sets)
        .map(|set| {
            ProcessDef::new(
                record(json!({"bk_process_name": format!("p{set:03}"), "port": 8000 + set})),
                vec![format!("m{set:03}-000")],
            )
        })
        .collect();

    TopologyDefinition {
        mainline: Mainline::builtin().obj_ids(),
        biz_topo: Some(root),
        proc_topo: Some(ProcessTopology { processes }),
    }
}

pub fn options() -> ImportOptions {
    ImportOptions::new(OwnerId::new("0").expect("owner id"))
}

pub fn empty_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    seed_mainline(&mut store, &Mainline::builtin()).expect("seed mainline");
    store
}

/// Store already holding revision 1 of `case`.
pub fn populated_store(case: Case) -> MemoryStore {
    let mut store = empty_store();
    import_topology(&mut store, &mut NoopRegistrar, definition(case, 1), &options())
        .expect("populate store");
    store
}

pub fn checksum_report(report: &ImportReport) -> u64 {
    let mut acc = 0u64;
    for action in &report.actions {
        acc = acc.wrapping_mul(131).wrapping_add(action.name.len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(action.id.unwrap_or_default());
    }
    acc.wrapping_mul(131).wrapping_add(report.blocked.len() as u64)
}
