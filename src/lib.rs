// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Topology import for a CMDB-style business hierarchy.
//!
//! [`model`] holds the typed topology tree and definitions, [`store`] the record store
//! abstraction (with a JSON-file backed implementation), and [`import`] the reconciliation
//! engine that makes the store match a target definition.

pub mod import;
pub mod model;
pub mod store;

pub use import::{import_topology, ImportError, ImportOptions, ImportReport};
