// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Target topology definitions as supplied by operators.
//!
//! The on-disk format is JSON (see [`TopologyDefinitionJson`]); it is converted into the
//! in-memory [`Node`] tree once per run and discarded afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::IdError;
use super::kind::{Mainline, ObjectKind, FIELD_PROCESS_NAME};
use super::node::Node;
use super::record::{get_str, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyDefinition {
    /// Raw mainline as written in the file; compared verbatim against the persisted one.
    pub mainline: Vec<String>,
    pub biz_topo: Option<Node>,
    pub proc_topo: Option<ProcessTopology>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTopology {
    pub processes: Vec<ProcessDef>,
}

/// A process plus the names of the modules it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDef {
    pub attributes: Record,
    pub modules: Vec<String>,
}

impl ProcessDef {
    pub fn new(attributes: Record, modules: Vec<String>) -> Self {
        Self { attributes, modules }
    }

    pub fn name(&self) -> Option<&str> {
        get_str(&self.attributes, FIELD_PROCESS_NAME)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopologyDefinitionJson {
    pub mainline: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biz_topo: Option<NodeJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_topo: Option<ProcessTopologyJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NodeJson {
    pub bk_obj_id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child: Vec<NodeJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessTopologyJson {
    #[serde(default)]
    pub procs: Vec<ProcessJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessJson {
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub bind_modules: Vec<String>,
}

#[derive(Debug)]
pub enum DefinitionError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    InvalidObjId {
        value: String,
        source: IdError,
    },
    MissingName {
        kind: ObjectKind,
    },
    RootNotBusiness {
        found: ObjectKind,
    },
    UnexpectedKind {
        parent: ObjectKind,
        expected: Option<ObjectKind>,
        found: ObjectKind,
    },
    DuplicateName {
        kind: ObjectKind,
        name: String,
    },
    ProcessMissingName,
    DuplicateProcess {
        name: String,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json {
                path: Some(path),
                source,
            } => write!(f, "json error at {path:?}: {source}"),
            Self::Json { path: None, source } => write!(f, "json error: {source}"),
            Self::InvalidObjId { value, source } => {
                write!(f, "invalid bk_obj_id {value:?}: {source}")
            }
            Self::MissingName { kind } => {
                write!(f, "{kind} node is missing its name field {}", kind.name_field())
            }
            Self::RootNotBusiness { found } => {
                write!(f, "topology root must be a biz node, found {found}")
            }
            Self::UnexpectedKind {
                parent,
                expected: Some(expected),
                found,
            } => write!(f, "{parent} node may only contain {expected} children, found {found}"),
            Self::UnexpectedKind {
                parent,
                expected: None,
                found,
            } => write!(f, "{parent} node may not have children, found {found}"),
            Self::DuplicateName { kind, name } => {
                write!(f, "duplicated {kind} name {name:?} under the same parent")
            }
            Self::ProcessMissingName => {
                write!(f, "process is missing its name field {FIELD_PROCESS_NAME}")
            }
            Self::DuplicateProcess { name } => write!(f, "duplicated process name {name:?}"),
        }
    }
}

impl std::error::Error for DefinitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidObjId { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl TopologyDefinition {
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let raw = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let json: TopologyDefinitionJson =
            serde_json::from_str(&raw).map_err(|source| DefinitionError::Json {
                path: Some(path.to_path_buf()),
                source,
            })?;
        Self::from_json(json)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DefinitionError> {
        let json: TopologyDefinitionJson = serde_json::from_str(raw)
            .map_err(|source| DefinitionError::Json { path: None, source })?;
        Self::from_json(json)
    }

    pub fn from_json(json: TopologyDefinitionJson) -> Result<Self, DefinitionError> {
        let biz_topo = json.biz_topo.map(node_from_json).transpose()?;
        let proc_topo = json.proc_topo.map(process_topology_from_json).transpose()?;
        Ok(Self {
            mainline: json.mainline,
            biz_topo,
            proc_topo,
        })
    }

    /// Checks the tree shape against an accepted mainline.
    ///
    /// Every child must be of the level directly below its parent and sibling names must be
    /// unique, otherwise two target nodes would resolve to the same stored record.
    pub fn validate(&self, mainline: &Mainline) -> Result<(), DefinitionError> {
        if let Some(root) = &self.biz_topo {
            if *root.kind() != ObjectKind::Business {
                return Err(DefinitionError::RootNotBusiness {
                    found: root.kind().clone(),
                });
            }
            validate_node(root, mainline)?;
        }
        Ok(())
    }

    pub fn json_schema() -> Value {
        serde_json::to_value(schemars::schema_for!(TopologyDefinitionJson))
            .unwrap_or(Value::Null)
    }
}

fn validate_node(node: &Node, mainline: &Mainline) -> Result<(), DefinitionError> {
    let expected = mainline.child_of(node.kind());
    let mut seen = BTreeSet::new();
    for child in node.children() {
        if expected != Some(child.kind()) {
            return Err(DefinitionError::UnexpectedKind {
                parent: node.kind().clone(),
                expected: expected.cloned(),
                found: child.kind().clone(),
            });
        }
        let name = child.name().unwrap_or_default();
        if !seen.insert(name) {
            return Err(DefinitionError::DuplicateName {
                kind: child.kind().clone(),
                name: name.to_owned(),
            });
        }
        validate_node(child, mainline)?;
    }
    Ok(())
}

fn node_from_json(json: NodeJson) -> Result<Node, DefinitionError> {
    let kind = ObjectKind::from_obj_id(&json.bk_obj_id).map_err(|source| {
        DefinitionError::InvalidObjId {
            value: json.bk_obj_id.clone(),
            source,
        }
    })?;
    if get_str(&json.data, kind.name_field()).map_or(true, str::is_empty) {
        return Err(DefinitionError::MissingName { kind });
    }
    let children = json
        .child
        .into_iter()
        .map(node_from_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Node::new(kind, json.data).with_children(children))
}

fn process_topology_from_json(json: ProcessTopologyJson) -> Result<ProcessTopology, DefinitionError> {
    let mut seen = BTreeSet::new();
    let mut processes = Vec::with_capacity(json.procs.len());
    for proc_json in json.procs {
        let process = ProcessDef::new(proc_json.data, proc_json.bind_modules);
        let Some(name) = process.name().filter(|name| !name.is_empty()) else {
            return Err(DefinitionError::ProcessMissingName);
        };
        if !seen.insert(name.to_owned()) {
            return Err(DefinitionError::DuplicateProcess {
                name: name.to_owned(),
            });
        }
        processes.push(process);
    }
    Ok(ProcessTopology { processes })
}

#[cfg(test)]
mod tests {
    use super::{DefinitionError, TopologyDefinition};
    use crate::model::{Mainline, ObjectKind};

    const DEFINITION: &str = r#"{
        "mainline": ["biz", "set", "module"],
        "biz_topo": {
            "bk_obj_id": "biz",
            "data": {"bk_biz_name": "blueking"},
            "child": [
                {"bk_obj_id": "set", "data": {"bk_set_name": "S", "bk_set_env": 3},
                 "child": [{"bk_obj_id": "module", "data": {"bk_module_name": "M"}}]}
            ]
        },
        "proc_topo": {"procs": [{"data": {"bk_process_name": "nginx"}, "bind_modules": ["M"]}]}
    }"#;

    #[test]
    fn parses_tree_and_processes() {
        let def = TopologyDefinition::from_json_str(DEFINITION).expect("definition");
        assert_eq!(def.mainline, ["biz", "set", "module"]);

        let root = def.biz_topo.as_ref().expect("biz topo");
        assert_eq!(*root.kind(), ObjectKind::Business);
        assert_eq!(root.name(), Some("blueking"));
        assert_eq!(root.children()[0].children()[0].name(), Some("M"));

        let procs = def.proc_topo.as_ref().expect("proc topo");
        assert_eq!(procs.processes[0].name(), Some("nginx"));
        assert_eq!(procs.processes[0].modules, ["M"]);

        def.validate(&Mainline::builtin()).expect("valid");
    }

    #[test]
    fn rejects_node_without_name() {
        let err = TopologyDefinition::from_json_str(
            r#"{"mainline": [], "biz_topo": {"bk_obj_id": "biz", "data": {}}}"#,
        )
        .expect_err("missing name");
        assert!(matches!(err, DefinitionError::MissingName { kind: ObjectKind::Business }));
    }

    #[test]
    fn validate_rejects_level_skips_and_duplicates() {
        let skip = TopologyDefinition::from_json_str(
            r#"{"mainline": [], "biz_topo": {"bk_obj_id": "biz", "data": {"bk_biz_name": "b"},
                "child": [{"bk_obj_id": "module", "data": {"bk_module_name": "m"}}]}}"#,
        )
        .expect("parse");
        assert!(matches!(
            skip.validate(&Mainline::builtin()),
            Err(DefinitionError::UnexpectedKind { .. })
        ));

        let dup = TopologyDefinition::from_json_str(
            r#"{"mainline": [], "biz_topo": {"bk_obj_id": "biz", "data": {"bk_biz_name": "b"},
                "child": [{"bk_obj_id": "set", "data": {"bk_set_name": "s"}},
                          {"bk_obj_id": "set", "data": {"bk_set_name": "s"}}]}}"#,
        )
        .expect("parse");
        assert!(matches!(
            dup.validate(&Mainline::builtin()),
            Err(DefinitionError::DuplicateName { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_process_names() {
        let err = TopologyDefinition::from_json_str(
            r#"{"mainline": [], "proc_topo": {"procs": [
                {"data": {"bk_process_name": "a"}}, {"data": {"bk_process_name": "a"}}]}}"#,
        )
        .expect_err("duplicate");
        assert!(matches!(err, DefinitionError::DuplicateProcess { .. }));
    }

    #[test]
    fn schema_describes_definition() {
        let schema = TopologyDefinition::json_schema();
        assert!(schema["properties"]["mainline"].is_object());
    }
}
