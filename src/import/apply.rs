// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::walker::DeleteCandidate;
use super::{
    corrupt, name_of, store_err, ActionKind, BlockedDelete, BlockingModule, DeferredDeletes, Engine,
    ImportError, ResourceRegistrar,
};
use crate::model::kind::{FIELD_BIZ_ID, FIELD_OBJ_ID, FIELD_PARENT_ID, TABLE_MODULE_HOST};
use crate::model::{get_u64, Mark, Node, ObjectKind};
use crate::store::{host_binding_count, Condition, RecordStore};

/// A persisted record scheduled for deletion as part of a candidate's subtree.
#[derive(Debug, Clone)]
struct SubtreeRecord {
    kind: ObjectKind,
    id: u64,
    name: String,
}

impl<'a, S, R> Engine<'a, S, R>
where
    S: RecordStore + ?Sized,
    R: ResourceRegistrar + ?Sized,
{
    /// Inserts created nodes and updates changed ones, parents before children.
    pub(crate) fn apply_marked(&mut self, root: &Node) -> Result<(), ImportError> {
        let mut pending = Vec::new();
        root.visit(&mut |node| {
            if matches!(node.mark(), Mark::Create | Mark::Update) {
                pending.push(node);
            }
        });

        for node in pending {
            let kind = node.kind();
            let Some(id) = node.resolved_id() else {
                return Err(corrupt(
                    kind.table(),
                    format!("{kind} {:?} marked {} without an id", node.name(), node.mark()),
                ));
            };
            let name = node.name().unwrap_or_default();
            match node.mark() {
                Mark::Create => {
                    self.insert(kind.table(), node.attributes().clone())?;
                    self.record_action(ActionKind::Create, kind.obj_id(), Some(id), name);
                    self.announce(ActionKind::Create, kind.obj_id(), id, name);
                }
                Mark::Update => {
                    let condition = identity_condition(kind, id);
                    self.update(kind.table(), &condition, node.attributes())?;
                    self.record_action(ActionKind::Update, kind.obj_id(), Some(id), name);
                    self.announce(ActionKind::Update, kind.obj_id(), id, name);
                }
                Mark::Unvisited | Mark::Unchanged => {}
            }
        }
        Ok(())
    }

    /// Deletes the deferred candidates, deepest mainline level first.
    ///
    /// A candidate whose subtree still has hosts bound to any module is left untouched and
    /// reported as blocked; the remaining candidates still proceed.
    pub(crate) fn apply_deletes(&mut self, deletes: DeferredDeletes) -> Result<(), ImportError> {
        let mut by_kind: Vec<_> = deletes.into_inner().into_iter().collect();
        by_kind.sort_by_key(|(kind, _)| std::cmp::Reverse(self.mainline.depth_of(kind)));

        for (_, candidates) in by_kind {
            for candidate in candidates {
                self.delete_candidate(candidate)?;
            }
        }
        Ok(())
    }

    fn delete_candidate(&mut self, candidate: DeleteCandidate) -> Result<(), ImportError> {
        let mut subtree = Vec::new();
        self.collect_subtree(
            SubtreeRecord {
                kind: candidate.kind.clone(),
                id: candidate.id,
                name: candidate.name.clone(),
            },
            candidate.biz_id,
            &mut subtree,
        )?;

        let mut blocking = Vec::new();
        for record in subtree.iter().filter(|record| record.kind == ObjectKind::Module) {
            self.guard.check()?;
            let host_count = host_binding_count(&*self.store, record.id)
                .map_err(store_err(TABLE_MODULE_HOST))?;
            if host_count > 0 {
                blocking.push(BlockingModule {
                    module_id: record.id,
                    module_name: record.name.clone(),
                    host_count,
                });
            }
        }

        if !blocking.is_empty() {
            let blocked = BlockedDelete {
                object: candidate.kind.obj_id().to_owned(),
                id: candidate.id,
                name: candidate.name,
                blocking,
            };
            tracing::warn!(
                object = %candidate.kind,
                id = candidate.id,
                modules = blocked.blocking.len(),
                "{blocked}"
            );
            self.report.blocked.push(blocked);
            return Ok(());
        }

        for record in subtree {
            self.delete(record.kind.table(), &identity_condition(&record.kind, record.id))?;
            self.record_action(ActionKind::Delete, record.kind.obj_id(), Some(record.id), &record.name);
            self.announce(ActionKind::Delete, record.kind.obj_id(), record.id, &record.name);
        }
        Ok(())
    }

    /// Pushes the persisted subtree under `record` in post-order (children before parents).
    fn collect_subtree(
        &mut self,
        record: SubtreeRecord,
        biz_id: u64,
        out: &mut Vec<SubtreeRecord>,
    ) -> Result<(), ImportError> {
        if let Some(child_kind) = self.mainline.child_of(&record.kind).cloned() {
            let mut condition = Condition::new().eq(FIELD_PARENT_ID, record.id);
            condition = match &child_kind {
                ObjectKind::Custom(obj_id) => condition.eq(FIELD_OBJ_ID, obj_id.as_str()),
                ObjectKind::Business | ObjectKind::Set | ObjectKind::Module => {
                    condition.eq(FIELD_BIZ_ID, biz_id)
                }
            };
            for child in self.find_all(child_kind.table(), &condition)? {
                let Some(id) = get_u64(&child, child_kind.id_field()) else {
                    return Err(corrupt(
                        child_kind.table(),
                        format!("{child_kind} record without {}: {child:?}", child_kind.id_field()),
                    ));
                };
                let name = name_of(&child, child_kind.name_field());
                self.collect_subtree(
                    SubtreeRecord {
                        kind: child_kind.clone(),
                        id,
                        name,
                    },
                    biz_id,
                    out,
                )?;
            }
        }
        out.push(record);
        Ok(())
    }
}

/// Condition addressing exactly one record of `kind`.
fn identity_condition(kind: &ObjectKind, id: u64) -> Condition {
    let condition = Condition::new().eq(kind.id_field(), id);
    match kind {
        ObjectKind::Custom(obj_id) => condition.eq(FIELD_OBJ_ID, obj_id.as_str()),
        ObjectKind::Business | ObjectKind::Set | ObjectKind::Module => condition,
    }
}
