// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

use super::kind::ObjectKind;
use super::node::Node;
use super::record::Record;
use super::topology::ProcessDef;

pub(crate) fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record fixture must be an object")
}

fn named(kind: ObjectKind, name: &str, extra: Value) -> Node {
    let mut attributes = record(extra);
    attributes.insert(kind.name_field().to_owned(), Value::from(name));
    Node::new(kind, attributes)
}

pub(crate) fn biz(name: &str, children: Vec<Node>) -> Node {
    named(ObjectKind::Business, name, serde_json::json!({})).with_children(children)
}

pub(crate) fn set(name: &str, extra: Value, children: Vec<Node>) -> Node {
    named(ObjectKind::Set, name, extra).with_children(children)
}

pub(crate) fn module(name: &str) -> Node {
    named(ObjectKind::Module, name, serde_json::json!({}))
}

pub(crate) fn custom(obj_id: &str, name: &str, children: Vec<Node>) -> Node {
    let kind = ObjectKind::from_obj_id(obj_id).expect("custom obj id");
    named(kind, name, serde_json::json!({})).with_children(children)
}

pub(crate) fn process(name: &str, extra: Value, modules: &[&str]) -> ProcessDef {
    let mut attributes = record(extra);
    attributes.insert("bk_process_name".to_owned(), Value::from(name));
    ProcessDef::new(attributes, modules.iter().map(|m| (*m).to_owned()).collect())
}
