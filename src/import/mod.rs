// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Topology import: reconcile a persisted business topology with a target definition.
//!
//! A run validates the mainline, walks the target tree against the store (marking nodes and
//! collecting deferred deletes), applies creates/updates, applies the deferred deletes with
//! the host-binding guard, and finally reconciles the flat process list by name.
//!
//! There is no transaction boundary: a failed run may leave the store partially migrated.
//! Re-running the same definition is safe because nodes are matched by natural key.

mod apply;
mod cancel;
mod context;
mod process;
mod registrar;
mod report;
mod walker;


use std::fmt;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::model::kind::FIELD_OWNER;
use crate::model::{
    get_str, DefinitionError, Mainline, OwnerId, Record, TopologyDefinition,
};
use crate::store::{load_mainline, Condition, RecordStore, StoreError};

pub use cancel::CancelToken;
pub use context::WalkContext;
pub use registrar::{NoopRegistrar, RegistrarError, ResourceRef, ResourceRegistrar};
pub use report::{
    ActionKind, ActionRecord, BlockedDelete, BlockingModule, ImportReport, RegistrationFailure,
    ReportCounts,
};
pub use walker::{DeferredDeletes, DeleteCandidate};

use cancel::RunGuard;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Owner account used for records created under a business that does not exist yet.
    pub owner_id: OwnerId,
    /// Plan only: no insert/update/delete and no sequence allocation.
    pub dry_run: bool,
    pub cancel: CancelToken,
    pub deadline: Option<Instant>,
}

impl ImportOptions {
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            dry_run: false,
            cancel: CancelToken::new(),
            deadline: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }
}

#[derive(Debug)]
pub enum ImportError {
    /// Target and persisted mainlines differ; nothing was touched.
    MainlineMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    Definition(DefinitionError),
    /// A process topology was supplied without a business to attach it to.
    MissingBusiness,
    Store {
        table: String,
        source: StoreError,
    },
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainlineMismatch { expected, found } => write!(
                f,
                "different topo mainline found, your expecting import topo is [{}], but the existing topo is [{}]",
                expected.join("->"),
                found.join("->")
            ),
            Self::Definition(source) => write!(f, "invalid topology definition: {source}"),
            Self::MissingBusiness => {
                f.write_str("process topology requires a biz_topo to resolve the business")
            }
            Self::Store { table, source } => write!(f, "store error on {table}: {source}"),
            Self::Cancelled => f.write_str("import cancelled"),
            Self::DeadlineExceeded => f.write_str("import deadline exceeded"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Definition(source) => Some(source),
            Self::Store { source, .. } => Some(source),
            Self::MainlineMismatch { .. }
            | Self::MissingBusiness
            | Self::Cancelled
            | Self::DeadlineExceeded => None,
        }
    }
}

impl From<DefinitionError> for ImportError {
    fn from(source: DefinitionError) -> Self {
        Self::Definition(source)
    }
}

fn store_err(table: &str) -> impl FnOnce(StoreError) -> ImportError + '_ {
    move |source| ImportError::Store {
        table: table.to_owned(),
        source,
    }
}

fn corrupt(table: &str, detail: String) -> ImportError {
    ImportError::Store {
        table: table.to_owned(),
        source: StoreError::Corrupt {
            table: table.to_owned(),
            detail,
        },
    }
}

/// Reconciles the store with `definition`.
///
/// Blocked deletes and registration failures do not fail the run; they are listed in the
/// returned report. Store errors, cancellation and precondition violations abort it.
pub fn import_topology<S, R>(
    store: &mut S,
    registrar: &mut R,
    mut definition: TopologyDefinition,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError>
where
    S: RecordStore + ?Sized,
    R: ResourceRegistrar + ?Sized,
{
    let guard = RunGuard::new(options.cancel.clone(), options.deadline);
    guard.check()?;

    let mainline = load_mainline(&*store).map_err(store_err("cc_ObjAsst"))?;
    let persisted = mainline.obj_ids();
    if definition.mainline != persisted {
        return Err(ImportError::MainlineMismatch {
            expected: definition.mainline,
            found: persisted,
        });
    }
    definition.validate(&mainline)?;
    if definition.proc_topo.is_some() && definition.biz_topo.is_none() {
        return Err(ImportError::MissingBusiness);
    }

    tracing::info!(
        mainline = %mainline,
        dry_run = options.dry_run,
        nodes = definition.biz_topo.as_ref().map_or(0, |root| root.count()),
        processes = definition.proc_topo.as_ref().map_or(0, |procs| procs.processes.len()),
        "starting topology import"
    );

    let mut engine = Engine::new(store, registrar, &mainline, guard, options.dry_run);

    if let Some(root) = definition.biz_topo.as_mut() {
        let deletes = engine.walk(true, root, &WalkContext::root(options.owner_id.clone()))?;
        tracing::debug!(candidates = deletes.len(), "topology walk finished");
        engine.apply_marked(root)?;
        engine.apply_deletes(deletes)?;

        if let Some(target) = &definition.proc_topo {
            let Some(biz_id) = root.resolved_id() else {
                return Err(ImportError::MissingBusiness);
            };
            let owner_id = get_str(root.attributes(), FIELD_OWNER)
                .and_then(|raw| OwnerId::new(raw).ok())
                .unwrap_or_else(|| options.owner_id.clone());
            engine.reconcile_processes(target, biz_id, &owner_id)?;
        }
    }

    let report = engine.finish();
    let counts = report.counts();
    tracing::info!(
        created = counts.created,
        updated = counts.updated,
        deleted = counts.deleted,
        blocked = counts.blocked,
        dry_run = report.dry_run,
        "topology import finished"
    );
    Ok(report)
}

/// State of one import run.
///
/// Every store access goes through the gate methods below, which check cancellation and the
/// deadline, map errors, and suppress mutations in dry runs.
pub(crate) struct Engine<'a, S: ?Sized, R: ?Sized> {
    store: &'a mut S,
    registrar: &'a mut R,
    mainline: &'a Mainline,
    guard: RunGuard,
    dry_run: bool,
    next_provisional_id: u64,
    report: ImportReport,
}

impl<'a, S, R> Engine<'a, S, R>
where
    S: RecordStore + ?Sized,
    R: ResourceRegistrar + ?Sized,
{
    pub(crate) fn new(
        store: &'a mut S,
        registrar: &'a mut R,
        mainline: &'a Mainline,
        guard: RunGuard,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            registrar,
            mainline,
            guard,
            dry_run,
            next_provisional_id: u64::MAX,
            report: ImportReport::new(dry_run),
        }
    }

    pub(crate) fn finish(self) -> ImportReport {
        self.report
    }

    fn find_one(&self, table: &str, condition: &Condition) -> Result<Option<Record>, ImportError> {
        self.guard.check()?;
        tracing::debug!(table, %condition, "lookup");
        match self.store.find_one(table, condition) {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => Err(store_err(table)(source)),
        }
    }

    fn find_all(&self, table: &str, condition: &Condition) -> Result<Vec<Record>, ImportError> {
        self.guard.check()?;
        self.store
            .find_all(table, condition)
            .map_err(store_err(table))
    }

    fn insert(&mut self, table: &str, record: Record) -> Result<(), ImportError> {
        self.guard.check()?;
        if self.dry_run {
            return Ok(());
        }
        self.store.insert(table, record).map_err(store_err(table))
    }

    fn update(&mut self, table: &str, condition: &Condition, patch: &Record) -> Result<(), ImportError> {
        self.guard.check()?;
        if self.dry_run {
            return Ok(());
        }
        self.store
            .update(table, condition, patch)
            .map(|_| ())
            .map_err(store_err(table))
    }

    fn delete(&mut self, table: &str, condition: &Condition) -> Result<(), ImportError> {
        self.guard.check()?;
        if self.dry_run {
            return Ok(());
        }
        self.store
            .delete(table, condition)
            .map(|_| ())
            .map_err(store_err(table))
    }

    /// Next id for `table`; dry runs hand out provisional ids counting down from `u64::MAX`.
    fn allocate_id(&mut self, table: &str) -> Result<u64, ImportError> {
        self.guard.check()?;
        if self.dry_run {
            let id = self.next_provisional_id;
            self.next_provisional_id -= 1;
            return Ok(id);
        }
        self.store.next_sequence(table).map_err(store_err(table))
    }

    fn record_action(&mut self, action: ActionKind, object: &str, id: Option<u64>, name: &str) {
        tracing::info!(%action, object, id, name, dry_run = self.dry_run, "topology change");
        self.report.actions.push(ActionRecord {
            action,
            object: object.to_owned(),
            id,
            name: name.to_owned(),
            applied: !self.dry_run,
        });
    }

    /// Fire-and-forget notification of the authorization side channel.
    fn announce(&mut self, action: ActionKind, object: &str, id: u64, name: &str) {
        if self.dry_run {
            return;
        }
        let resource = ResourceRef {
            object: object.to_owned(),
            id,
            name: name.to_owned(),
        };
        let result = match action {
            ActionKind::Create => self.registrar.register(&resource),
            ActionKind::Update => self.registrar.update(&resource),
            ActionKind::Delete => self.registrar.deregister(&resource),
        };
        if let Err(err) = result {
            tracing::warn!(%action, object, id, error = %err, "resource registration failed");
            self.report.registration_failures.push(RegistrationFailure {
                action,
                object: object.to_owned(),
                id,
                message: err.message().to_owned(),
            });
        }
    }
}

fn name_of(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
