// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Matching of the target tree against the store.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{corrupt, name_of, Engine, ImportError, ResourceRegistrar, WalkContext};
use crate::model::kind::{
    FIELD_BIZ_ID, FIELD_DEFAULT, FIELD_OBJ_ID, FIELD_OWNER, FIELD_PARENT_ID, FIELD_SET_ID,
};
use crate::model::{contains_attributes, get_str, get_u64, Mark, Node, ObjectKind, OwnerId, Record};
use crate::store::{Condition, RecordStore};

/// A persisted record that is absent from the target tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCandidate {
    pub kind: ObjectKind,
    pub id: u64,
    pub name: String,
    /// Business the record belongs to; scopes the subtree lookup of built-in levels.
    pub biz_id: u64,
    pub record: Record,
}

/// Delete candidates per node kind, produced by the walk and consumed by the applier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredDeletes {
    by_kind: BTreeMap<ObjectKind, Vec<DeleteCandidate>>,
}

impl DeferredDeletes {
    pub fn push(&mut self, candidate: DeleteCandidate) {
        self.by_kind
            .entry(candidate.kind.clone())
            .or_default()
            .push(candidate);
    }

    pub fn merge(&mut self, other: DeferredDeletes) {
        for (kind, mut candidates) in other.by_kind {
            self.by_kind.entry(kind).or_default().append(&mut candidates);
        }
    }

    pub fn of_kind(&self, kind: &ObjectKind) -> &[DeleteCandidate] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_inner(self) -> BTreeMap<ObjectKind, Vec<DeleteCandidate>> {
        self.by_kind
    }
}

impl<'a, S, R> Engine<'a, S, R>
where
    S: RecordStore + ?Sized,
    R: ResourceRegistrar + ?Sized,
{
    /// Resolves `node` (when `include_self`) and then its children.
    ///
    /// Marks are write-once; an already marked node is skipped entirely. Each child is walked
    /// with a context derived from its parent, never one left behind by a sibling.
    pub(crate) fn walk(
        &mut self,
        include_self: bool,
        node: &mut Node,
        ctx: &WalkContext,
    ) -> Result<DeferredDeletes, ImportError> {
        if node.mark().is_visited() {
            return Ok(DeferredDeletes::default());
        }

        let mut deletes = DeferredDeletes::default();
        let child_ctx = if include_self {
            let child_ctx = self.resolve(node, ctx)?;
            if node.mark() != Mark::Create {
                deletes.merge(self.collect_deletes(node, &child_ctx)?);
            }
            child_ctx
        } else {
            ctx.clone()
        };

        for child in node.children_mut() {
            deletes.merge(self.walk(true, child, &child_ctx)?);
        }
        Ok(deletes)
    }

    /// Matches one node by natural key, marks it and returns the context for its children.
    fn resolve(&mut self, node: &mut Node, ctx: &WalkContext) -> Result<WalkContext, ImportError> {
        let kind = node.kind().clone();
        inherit_attributes(node, ctx);

        let mut condition = Condition::new();
        for field in kind.natural_key_fields() {
            let value = node.attributes().get(*field).cloned().unwrap_or(Value::Null);
            condition = condition.eq(field, value);
        }

        let mut ctx = ctx.clone();
        match self.find_one(kind.table(), &condition)? {
            None => {
                if kind == ObjectKind::Business {
                    node.set_attribute(FIELD_OWNER, ctx.owner_id.as_str());
                    node.set_attribute(FIELD_DEFAULT, 0);
                }
                let id = self.allocate_id(kind.table())?;
                node.resolve(id);
                node.set_mark(Mark::Create);
                if kind == ObjectKind::Business {
                    node.set_attribute(FIELD_BIZ_ID, id);
                }
                Ok(ctx.descend(&kind, id))
            }
            Some(existing) => {
                let Some(id) = get_u64(&existing, kind.id_field()) else {
                    return Err(corrupt(
                        kind.table(),
                        format!("{kind} record without {}: {existing:?}", kind.id_field()),
                    ));
                };
                if kind == ObjectKind::Business {
                    let owner = get_str(&existing, FIELD_OWNER)
                        .and_then(|raw| OwnerId::new(raw).ok())
                        .ok_or_else(|| {
                            corrupt(
                                kind.table(),
                                format!("business {id} without a valid {FIELD_OWNER}"),
                            )
                        })?;
                    node.set_attribute(FIELD_OWNER, owner.as_str());
                    ctx = ctx.with_owner(owner);
                }

                let mark = if contains_attributes(&existing, node.attributes(), &[kind.id_field()])
                {
                    Mark::Unchanged
                } else {
                    Mark::Update
                };
                node.resolve(id);
                node.set_mark(mark);
                Ok(ctx.descend(&kind, id))
            }
        }
    }

    /// Finds persisted children of `node` whose names are absent from the target.
    ///
    /// System containers (idle/fault sets and modules, `default > 0`) are never nominated.
    fn collect_deletes(
        &mut self,
        node: &Node,
        child_ctx: &WalkContext,
    ) -> Result<DeferredDeletes, ImportError> {
        let mut deletes = DeferredDeletes::default();
        let Some(child_kind) = self.mainline.child_of(node.kind()).cloned() else {
            return Ok(deletes);
        };

        let condition = child_condition(&child_kind, child_ctx)
            .not_in(child_kind.name_field(), node.child_names());

        for record in self.find_all(child_kind.table(), &condition)? {
            let Some(id) = get_u64(&record, child_kind.id_field()) else {
                return Err(corrupt(
                    child_kind.table(),
                    format!("{child_kind} record without {}: {record:?}", child_kind.id_field()),
                ));
            };
            deletes.push(DeleteCandidate {
                kind: child_kind.clone(),
                id,
                name: name_of(&record, child_kind.name_field()),
                biz_id: child_ctx.biz_id,
                record,
            });
        }
        Ok(deletes)
    }
}

/// Condition selecting the persisted children of the node that produced `child_ctx`.
fn child_condition(child_kind: &ObjectKind, child_ctx: &WalkContext) -> Condition {
    let condition = Condition::new().eq(FIELD_PARENT_ID, child_ctx.parent_id);
    match child_kind {
        ObjectKind::Custom(obj_id) => condition.eq(FIELD_OBJ_ID, obj_id.as_str()),
        ObjectKind::Business | ObjectKind::Set | ObjectKind::Module => condition
            .eq(FIELD_BIZ_ID, child_ctx.biz_id)
            .lte(FIELD_DEFAULT, 0),
    }
}

/// Copies the ancestor ids every record of `node`'s kind carries.
fn inherit_attributes(node: &mut Node, ctx: &WalkContext) {
    match node.kind().clone() {
        ObjectKind::Business => {}
        ObjectKind::Set => {
            node.set_attribute(FIELD_OWNER, ctx.owner_id.as_str());
            node.set_attribute(FIELD_BIZ_ID, ctx.biz_id);
            node.set_attribute(FIELD_PARENT_ID, ctx.parent_id);
            node.set_attribute(FIELD_DEFAULT, 0);
        }
        ObjectKind::Module => {
            node.set_attribute(FIELD_OWNER, ctx.owner_id.as_str());
            node.set_attribute(FIELD_BIZ_ID, ctx.biz_id);
            node.set_attribute(FIELD_SET_ID, ctx.set_id);
            node.set_attribute(FIELD_PARENT_ID, ctx.parent_id);
            node.set_attribute(FIELD_DEFAULT, 0);
        }
        ObjectKind::Custom(obj_id) => {
            node.set_attribute(FIELD_OWNER, ctx.owner_id.as_str());
            node.set_attribute(FIELD_PARENT_ID, ctx.parent_id);
            node.set_attribute(FIELD_OBJ_ID, obj_id.as_str());
        }
    }
}
