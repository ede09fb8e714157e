// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Topology levels and the per-level storage layout.

use std::fmt;

use super::ids::{IdError, ObjId};

pub const FIELD_OWNER: &str = "bk_supplier_account";
pub const FIELD_PARENT_ID: &str = "bk_parent_id";
pub const FIELD_DEFAULT: &str = "default";
pub const FIELD_OBJ_ID: &str = "bk_obj_id";
pub const FIELD_BIZ_ID: &str = "bk_biz_id";
pub const FIELD_BIZ_NAME: &str = "bk_biz_name";
pub const FIELD_SET_ID: &str = "bk_set_id";
pub const FIELD_SET_NAME: &str = "bk_set_name";
pub const FIELD_MODULE_ID: &str = "bk_module_id";
pub const FIELD_MODULE_NAME: &str = "bk_module_name";
pub const FIELD_INST_ID: &str = "bk_inst_id";
pub const FIELD_INST_NAME: &str = "bk_inst_name";
pub const FIELD_HOST_ID: &str = "bk_host_id";
pub const FIELD_PROCESS_ID: &str = "bk_process_id";
pub const FIELD_PROCESS_NAME: &str = "bk_process_name";
pub const FIELD_ASST_OBJ_ID: &str = "bk_asst_obj_id";
pub const FIELD_ASST_ID: &str = "bk_asst_id";

pub const TABLE_BIZ: &str = "cc_ApplicationBase";
pub const TABLE_SET: &str = "cc_SetBase";
pub const TABLE_MODULE: &str = "cc_ModuleBase";
pub const TABLE_OBJECT: &str = "cc_ObjectBase";
pub const TABLE_MODULE_HOST: &str = "cc_ModuleHostConfig";
pub const TABLE_PROCESS: &str = "cc_Process";
pub const TABLE_PROC_MODULE: &str = "cc_Proc2Module";
pub const TABLE_OBJ_ASST: &str = "cc_ObjAsst";

pub const MAINLINE_ASST_ID: &str = "bk_mainline";

const OBJ_BIZ: &str = "biz";
const OBJ_SET: &str = "set";
const OBJ_MODULE: &str = "module";

/// One level of the business topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Business,
    Set,
    Module,
    /// A user-defined mainline model (e.g. `idc`, `zone`) stored as a generic instance.
    Custom(ObjId),
}

impl ObjectKind {
    pub fn from_obj_id(raw: &str) -> Result<Self, IdError> {
        Ok(match raw {
            OBJ_BIZ => Self::Business,
            OBJ_SET => Self::Set,
            OBJ_MODULE => Self::Module,
            other => Self::Custom(ObjId::new(other)?),
        })
    }

    pub fn obj_id(&self) -> &str {
        match self {
            Self::Business => OBJ_BIZ,
            Self::Set => OBJ_SET,
            Self::Module => OBJ_MODULE,
            Self::Custom(obj_id) => obj_id.as_str(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    pub fn layout(&self) -> KindLayout {
        match self {
            Self::Business => KindLayout {
                table: TABLE_BIZ,
                id_field: FIELD_BIZ_ID,
                name_field: FIELD_BIZ_NAME,
            },
            Self::Set => KindLayout {
                table: TABLE_SET,
                id_field: FIELD_SET_ID,
                name_field: FIELD_SET_NAME,
            },
            Self::Module => KindLayout {
                table: TABLE_MODULE,
                id_field: FIELD_MODULE_ID,
                name_field: FIELD_MODULE_NAME,
            },
            Self::Custom(_) => KindLayout {
                table: TABLE_OBJECT,
                id_field: FIELD_INST_ID,
                name_field: FIELD_INST_NAME,
            },
        }
    }

    pub fn table(&self) -> &'static str {
        self.layout().table
    }

    pub fn id_field(&self) -> &'static str {
        self.layout().id_field
    }

    pub fn name_field(&self) -> &'static str {
        self.layout().name_field
    }

    /// Fields used to match a target node against a persisted record.
    ///
    /// Generic instances share one table, so their key also carries the kind tag.
    pub fn natural_key_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Business => &[FIELD_BIZ_NAME],
            Self::Set => &[FIELD_SET_NAME, FIELD_PARENT_ID],
            Self::Module => &[FIELD_MODULE_NAME, FIELD_PARENT_ID],
            Self::Custom(_) => &[FIELD_INST_NAME, FIELD_PARENT_ID, FIELD_OBJ_ID],
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.obj_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindLayout {
    pub table: &'static str,
    pub id_field: &'static str,
    pub name_field: &'static str,
}

/// Ordered topology levels from the business root down to modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mainline {
    kinds: Vec<ObjectKind>,
}

impl Mainline {
    pub fn new(kinds: Vec<ObjectKind>) -> Result<Self, MainlineError> {
        if kinds.first() != Some(&ObjectKind::Business) {
            return Err(MainlineError::MustStartWithBusiness);
        }
        if kinds.last() != Some(&ObjectKind::Module) {
            return Err(MainlineError::MustEndWithModule);
        }
        for (index, kind) in kinds.iter().enumerate() {
            if kinds[..index].contains(kind) {
                return Err(MainlineError::Repeated { kind: kind.clone() });
            }
        }
        let set_position = kinds.iter().position(|kind| *kind == ObjectKind::Set);
        if set_position != Some(kinds.len() - 2) {
            return Err(MainlineError::SetMustPrecedeModule);
        }
        Ok(Self { kinds })
    }

    pub fn from_obj_ids<I, S>(obj_ids: I) -> Result<Self, MainlineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kinds = obj_ids
            .into_iter()
            .map(|raw| {
                ObjectKind::from_obj_id(raw.as_ref()).map_err(|source| MainlineError::InvalidObjId {
                    value: raw.as_ref().to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kinds)
    }

    /// The default mainline without custom levels.
    pub fn builtin() -> Self {
        Self {
            kinds: vec![ObjectKind::Business, ObjectKind::Set, ObjectKind::Module],
        }
    }

    pub fn kinds(&self) -> &[ObjectKind] {
        &self.kinds
    }

    pub fn obj_ids(&self) -> Vec<String> {
        self.kinds.iter().map(|kind| kind.obj_id().to_owned()).collect()
    }

    pub fn contains(&self, kind: &ObjectKind) -> bool {
        self.kinds.contains(kind)
    }

    pub fn depth_of(&self, kind: &ObjectKind) -> Option<usize> {
        self.kinds.iter().position(|k| k == kind)
    }

    /// Kind of the children of `kind`; `None` for modules and unknown kinds.
    pub fn child_of(&self, kind: &ObjectKind) -> Option<&ObjectKind> {
        let depth = self.depth_of(kind)?;
        self.kinds.get(depth + 1)
    }
}

impl fmt::Display for Mainline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, kind) in self.kinds.iter().enumerate() {
            if index > 0 {
                f.write_str("->")?;
            }
            f.write_str(kind.obj_id())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainlineError {
    MustStartWithBusiness,
    MustEndWithModule,
    SetMustPrecedeModule,
    Repeated { kind: ObjectKind },
    InvalidObjId { value: String, source: IdError },
}

impl fmt::Display for MainlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustStartWithBusiness => f.write_str("mainline must start with biz"),
            Self::MustEndWithModule => f.write_str("mainline must end with module"),
            Self::SetMustPrecedeModule => {
                f.write_str("mainline must have set directly above module")
            }
            Self::Repeated { kind } => write!(f, "mainline repeats level {kind}"),
            Self::InvalidObjId { value, source } => {
                write!(f, "invalid mainline object id {value:?}: {source}")
            }
        }
    }
}

impl std::error::Error for MainlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidObjId { source, .. } => Some(source),
            _ => None,
        }
    }
}
