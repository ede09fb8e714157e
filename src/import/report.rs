// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Outcome of an import run.
//!
//! A dry run produces the same report as a real run, with every action flagged as not applied.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// One create/update/delete against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub action: ActionKind,
    /// Object id (`biz`, `set`, `module`, custom level) or `process` / `process_module`.
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    /// False in dry runs.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingModule {
    pub module_id: u64,
    pub module_name: String,
    pub host_count: u64,
}

/// A deletion refused because hosts are still bound to a module in the subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedDelete {
    pub object: String,
    pub id: u64,
    pub name: String,
    pub blocking: Vec<BlockingModule>,
}

impl fmt::Display for BlockedDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot delete {} {:?} (id={}):", self.object, self.name, self.id)?;
        for module in &self.blocking {
            write!(
                f,
                " there are {} hosts bound to module {:?}, please unbind them first and try again;",
                module.host_count, module.module_name
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationFailure {
    pub action: ActionKind,
    pub object: String,
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub actions: Vec<ActionRecord>,
    pub blocked: Vec<BlockedDelete>,
    pub registration_failures: Vec<RegistrationFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub blocked: usize,
}

impl ImportReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn counts(&self) -> ReportCounts {
        let mut counts = ReportCounts {
            blocked: self.blocked.len(),
            ..ReportCounts::default()
        };
        for record in &self.actions {
            match record.action {
                ActionKind::Create => counts.created += 1,
                ActionKind::Update => counts.updated += 1,
                ActionKind::Delete => counts.deleted += 1,
            }
        }
        counts
    }

    pub fn actions_on<'a>(
        &'a self,
        action: ActionKind,
        object: &'a str,
    ) -> impl Iterator<Item = &'a ActionRecord> {
        self.actions
            .iter()
            .filter(move |record| record.action == action && record.object == object)
    }

    /// True when nothing was blocked and every registration succeeded.
    pub fn is_clean(&self) -> bool {
        self.blocked.is_empty() && self.registration_failures.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "would " } else { "" };
        for record in &self.actions {
            write!(f, "--- {prefix}{} {} {:?}", record.action, record.object, record.name)?;
            if let Some(id) = record.id {
                write!(f, " (id={id})")?;
            }
            writeln!(f)?;
        }
        for blocked in &self.blocked {
            writeln!(f, "!!! {blocked}")?;
        }
        for failure in &self.registration_failures {
            writeln!(
                f,
                "!!! registration of {} {} {} failed: {}",
                failure.action, failure.object, failure.id, failure.message
            )?;
        }
        let counts = self.counts();
        write!(
            f,
            "{prefix}create {}, update {}, delete {}, blocked {}",
            counts.created, counts.updated, counts.deleted, counts.blocked
        )
    }
}
