// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde_json::Value;

use super::kind::ObjectKind;
use super::record::{get_str, Record};

/// Action assigned to a node while walking the target tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    #[default]
    Unvisited,
    Create,
    Update,
    Unchanged,
}

impl Mark {
    pub fn is_visited(self) -> bool {
        self != Self::Unvisited
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Create => "create",
            Self::Update => "update",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of a target topology tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: ObjectKind,
    attributes: Record,
    children: Vec<Node>,
    resolved_id: Option<u64>,
    mark: Mark,
}

impl Node {
    pub fn new(kind: ObjectKind, attributes: Record) -> Self {
        Self {
            kind,
            attributes,
            children: Vec::new(),
            resolved_id: None,
            mark: Mark::Unvisited,
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    pub fn set_attribute(&mut self, field: &str, value: impl Into<Value>) {
        self.attributes.insert(field.to_owned(), value.into());
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Natural name (`bk_biz_name`, `bk_set_name`, ...) of this node.
    pub fn name(&self) -> Option<&str> {
        get_str(&self.attributes, self.kind.name_field())
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|child| child.name().map(ToOwned::to_owned))
            .collect()
    }

    pub fn resolved_id(&self) -> Option<u64> {
        self.resolved_id
    }

    /// Records the identifier and mirrors it into the node's id field so inserts carry it.
    pub(crate) fn resolve(&mut self, id: u64) {
        self.resolved_id = Some(id);
        self.attributes
            .insert(self.kind.id_field().to_owned(), Value::from(id));
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Sets the mark once; returns false (and leaves the node untouched) if already marked.
    pub(crate) fn set_mark(&mut self, mark: Mark) -> bool {
        if self.mark.is_visited() {
            return false;
        }
        self.mark = mark;
        true
    }

    /// Pre-order traversal; parents are always yielded before their children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    pub fn count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }
}
