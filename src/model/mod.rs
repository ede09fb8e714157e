// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A target topology is a tree of [`Node`]s following the [`Mainline`] level order, plus an
//! optional flat list of processes bound to modules by name.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod kind;
pub mod node;
pub mod record;
pub mod topology;

pub use ids::{Id, IdError, IdKind, ObjId, OwnerId};
pub use kind::{KindLayout, Mainline, MainlineError, ObjectKind};
pub use node::{Mark, Node};
pub use record::{contains_attributes, get_str, get_u64, values_equal, Record};
pub use topology::{
    DefinitionError, NodeJson, ProcessDef, ProcessJson, ProcessTopology, ProcessTopologyJson,
    TopologyDefinition, TopologyDefinitionJson,
};
