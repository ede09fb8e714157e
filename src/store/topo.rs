// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read helpers that reconstruct persisted topology facts from raw tables.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{Condition, RecordStore, StoreError};
use crate::model::kind::{
    FIELD_ASST_ID, FIELD_ASST_OBJ_ID, FIELD_BIZ_ID, FIELD_MODULE_ID, FIELD_MODULE_NAME, FIELD_OBJ_ID,
    FIELD_PROCESS_ID, FIELD_PROCESS_NAME, MAINLINE_ASST_ID, TABLE_MODULE_HOST, TABLE_OBJ_ASST,
    TABLE_PROCESS, TABLE_PROC_MODULE,
};
use crate::model::{get_str, get_u64, Mainline, ObjectKind, Record};

/// Rebuilds the mainline by following `bk_mainline` associations down from `biz`.
pub fn load_mainline<S: RecordStore + ?Sized>(store: &S) -> Result<Mainline, StoreError> {
    let associations = store.find_all(
        TABLE_OBJ_ASST,
        &Condition::new().eq(FIELD_ASST_ID, MAINLINE_ASST_ID),
    )?;

    let mut child_of: BTreeMap<&str, &str> = BTreeMap::new();
    for asst in &associations {
        let (Some(child), Some(parent)) =
            (get_str(asst, FIELD_OBJ_ID), get_str(asst, FIELD_ASST_OBJ_ID))
        else {
            return Err(StoreError::Corrupt {
                table: TABLE_OBJ_ASST.to_owned(),
                detail: format!("mainline association without object ids: {asst:?}"),
            });
        };
        if child_of.insert(parent, child).is_some() {
            return Err(StoreError::Corrupt {
                table: TABLE_OBJ_ASST.to_owned(),
                detail: format!("{parent} has more than one mainline child"),
            });
        }
    }

    let mut chain = vec![ObjectKind::Business.obj_id().to_owned()];
    while let Some(next) = child_of.get(chain[chain.len() - 1].as_str()) {
        if chain.iter().any(|seen| seen == next) {
            return Err(StoreError::Corrupt {
                table: TABLE_OBJ_ASST.to_owned(),
                detail: format!("mainline cycle at {next}"),
            });
        }
        chain.push((*next).to_owned());
    }

    Mainline::from_obj_ids(&chain).map_err(|source| StoreError::InvalidMainline {
        found: chain,
        source,
    })
}

/// Writes the `bk_mainline` associations describing `mainline`.
pub fn seed_mainline<S: RecordStore + ?Sized>(
    store: &mut S,
    mainline: &Mainline,
) -> Result<(), StoreError> {
    for pair in mainline.kinds().windows(2) {
        let mut asst = Record::new();
        asst.insert(FIELD_OBJ_ID.to_owned(), Value::from(pair[1].obj_id()));
        asst.insert(FIELD_ASST_OBJ_ID.to_owned(), Value::from(pair[0].obj_id()));
        asst.insert(FIELD_ASST_ID.to_owned(), Value::from(MAINLINE_ASST_ID));
        store.insert(TABLE_OBJ_ASST, asst)?;
    }
    Ok(())
}

/// Number of hosts currently bound to `module_id`.
pub fn host_binding_count<S: RecordStore + ?Sized>(
    store: &S,
    module_id: u64,
) -> Result<u64, StoreError> {
    store.count(
        TABLE_MODULE_HOST,
        &Condition::new().eq(FIELD_MODULE_ID, module_id),
    )
}

/// A persisted process with the names of the modules it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProcess {
    pub id: u64,
    pub attributes: Record,
    pub modules: Vec<String>,
}

impl StoredProcess {
    pub fn name(&self) -> Option<&str> {
        get_str(&self.attributes, FIELD_PROCESS_NAME)
    }
}

pub fn load_processes<S: RecordStore + ?Sized>(
    store: &S,
    biz_id: u64,
) -> Result<Vec<StoredProcess>, StoreError> {
    let rows = store.find_all(
        TABLE_PROCESS,
        &Condition::new().eq(FIELD_BIZ_ID, biz_id),
    )?;

    let mut processes = Vec::with_capacity(rows.len());
    for attributes in rows {
        let Some(id) = get_u64(&attributes, FIELD_PROCESS_ID) else {
            return Err(StoreError::Corrupt {
                table: TABLE_PROCESS.to_owned(),
                detail: format!("process without {FIELD_PROCESS_ID}: {attributes:?}"),
            });
        };
        let modules = store
            .find_all(TABLE_PROC_MODULE, &Condition::new().eq(FIELD_PROCESS_ID, id))?
            .iter()
            .filter_map(|binding| get_str(binding, FIELD_MODULE_NAME).map(ToOwned::to_owned))
            .collect();
        processes.push(StoredProcess {
            id,
            attributes,
            modules,
        });
    }
    Ok(processes)
}
