// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Name-keyed reconciliation of the flat process list and its module bindings.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::{corrupt, store_err, ActionKind, Engine, ImportError, ResourceRegistrar};
use crate::model::kind::{
    FIELD_BIZ_ID, FIELD_MODULE_NAME, FIELD_OWNER, FIELD_PROCESS_ID, TABLE_PROCESS,
    TABLE_PROC_MODULE,
};
use crate::model::{contains_attributes, OwnerId, ProcessTopology, Record};
use crate::store::{load_processes, Condition, RecordStore, StoredProcess};

pub(crate) const OBJECT_PROCESS: &str = "process";
pub(crate) const OBJECT_PROCESS_MODULE: &str = "process_module";

impl<'a, S, R> Engine<'a, S, R>
where
    S: RecordStore + ?Sized,
    R: ResourceRegistrar + ?Sized,
{
    /// Makes the processes of `biz_id` match `target`, keyed by process name.
    pub(crate) fn reconcile_processes(
        &mut self,
        target: &ProcessTopology,
        biz_id: u64,
        owner_id: &OwnerId,
    ) -> Result<(), ImportError> {
        self.guard.check()?;
        let current = load_processes(&*self.store, biz_id).map_err(store_err(TABLE_PROCESS))?;

        let mut current_by_name: BTreeMap<String, StoredProcess> = BTreeMap::new();
        for process in current {
            let Some(name) = process.name().map(ToOwned::to_owned) else {
                return Err(corrupt(
                    TABLE_PROCESS,
                    format!("process {} without a name", process.id),
                ));
            };
            current_by_name.insert(name, process);
        }

        let mut target_names = BTreeSet::new();
        for def in &target.processes {
            let name = def.name().unwrap_or_default().to_owned();
            target_names.insert(name.clone());

            let mut attributes = def.attributes.clone();
            attributes.insert(FIELD_BIZ_ID.to_owned(), Value::from(biz_id));
            attributes.insert(FIELD_OWNER.to_owned(), Value::from(owner_id.as_str()));

            match current_by_name.get(&name) {
                Some(existing) => {
                    let process_id = existing.id;
                    attributes.insert(FIELD_PROCESS_ID.to_owned(), Value::from(process_id));
                    if !contains_attributes(&existing.attributes, &attributes, &[]) {
                        let condition = Condition::new().eq(FIELD_PROCESS_ID, process_id);
                        self.update(TABLE_PROCESS, &condition, &attributes)?;
                        self.record_action(ActionKind::Update, OBJECT_PROCESS, Some(process_id), &name);
                        self.announce(ActionKind::Update, OBJECT_PROCESS, process_id, &name);
                    }

                    for module in &def.modules {
                        if !existing.modules.contains(module) {
                            self.bind(process_id, module, biz_id, owner_id)?;
                        }
                    }
                    for module in &existing.modules {
                        if !def.modules.contains(module) {
                            self.unbind(process_id, module)?;
                        }
                    }
                }
                None => {
                    let process_id = self.allocate_id(TABLE_PROCESS)?;
                    attributes.insert(FIELD_PROCESS_ID.to_owned(), Value::from(process_id));
                    self.insert(TABLE_PROCESS, attributes)?;
                    self.record_action(ActionKind::Create, OBJECT_PROCESS, Some(process_id), &name);
                    self.announce(ActionKind::Create, OBJECT_PROCESS, process_id, &name);
                    for module in &def.modules {
                        self.bind(process_id, module, biz_id, owner_id)?;
                    }
                }
            }
        }

        for (name, process) in &current_by_name {
            if target_names.contains(name) {
                continue;
            }
            let condition = Condition::new().eq(FIELD_PROCESS_ID, process.id);
            self.delete(TABLE_PROCESS, &condition)?;
            self.record_action(ActionKind::Delete, OBJECT_PROCESS, Some(process.id), name);
            self.announce(ActionKind::Delete, OBJECT_PROCESS, process.id, name);
            self.delete(TABLE_PROC_MODULE, &condition)?;
            for module in &process.modules {
                self.record_action(ActionKind::Delete, OBJECT_PROCESS_MODULE, Some(process.id), module);
            }
        }
        Ok(())
    }

    fn bind(
        &mut self,
        process_id: u64,
        module: &str,
        biz_id: u64,
        owner_id: &OwnerId,
    ) -> Result<(), ImportError> {
        let mut binding = Record::new();
        binding.insert(FIELD_MODULE_NAME.to_owned(), Value::from(module));
        binding.insert(FIELD_BIZ_ID.to_owned(), Value::from(biz_id));
        binding.insert(FIELD_PROCESS_ID.to_owned(), Value::from(process_id));
        binding.insert(FIELD_OWNER.to_owned(), Value::from(owner_id.as_str()));
        self.insert(TABLE_PROC_MODULE, binding)?;
        self.record_action(ActionKind::Create, OBJECT_PROCESS_MODULE, Some(process_id), module);
        Ok(())
    }

    fn unbind(&mut self, process_id: u64, module: &str) -> Result<(), ImportError> {
        let condition = Condition::new()
            .eq(FIELD_MODULE_NAME, module)
            .eq(FIELD_PROCESS_ID, process_id);
        self.delete(TABLE_PROC_MODULE, &condition)?;
        self.record_action(ActionKind::Delete, OBJECT_PROCESS_MODULE, Some(process_id), module);
        Ok(())
    }
}
