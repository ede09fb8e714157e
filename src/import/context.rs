// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{ObjectKind, OwnerId};

/// Ancestor identifiers in scope for one node of the walk.
///
/// Values are immutable: descending derives a new context, so sibling subtrees can never
/// observe each other's resolved ids. Zero means "not resolved yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkContext {
    pub owner_id: OwnerId,
    pub biz_id: u64,
    pub set_id: u64,
    pub parent_id: u64,
}

impl WalkContext {
    pub fn root(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            biz_id: 0,
            set_id: 0,
            parent_id: 0,
        }
    }

    /// Context for the children of a node of `kind` resolved to `id`.
    pub fn descend(&self, kind: &ObjectKind, id: u64) -> Self {
        let mut next = self.clone();
        next.parent_id = id;
        match kind {
            ObjectKind::Business => next.biz_id = id,
            ObjectKind::Set => next.set_id = id,
            ObjectKind::Module | ObjectKind::Custom(_) => {}
        }
        next
    }

    pub fn with_owner(&self, owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            ..self.clone()
        }
    }
}
