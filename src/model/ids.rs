// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Names the field an [`Id`] flavour is stored in, for error messages.
pub trait IdKind {
    const FIELD: &'static str;
}

/// A validated textual identifier (owner accounts, model object ids).
///
/// Values are written verbatim into records and store conditions, so they must be non-empty
/// and must not carry whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdKind> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty { field: T::FIELD });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(IdError::ContainsWhitespace {
                field: T::FIELD,
                value,
            });
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }
}

impl<T> Id<T> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdKind> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty { field: &'static str },
    ContainsWhitespace { field: &'static str, value: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::ContainsWhitespace { field, value } => {
                write!(f, "{field} {value:?} must not contain whitespace")
            }
        }
    }
}

impl std::error::Error for IdError {}

/// Tenant account that owns every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwnerIdTag {}
pub type OwnerId = Id<OwnerIdTag>;

impl IdKind for OwnerIdTag {
    const FIELD: &'static str = "bk_supplier_account";
}

/// Model object id, e.g. `biz`, `set` or a custom level like `idc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjIdTag {}
pub type ObjId = Id<ObjIdTag>;

impl IdKind for ObjIdTag {
    const FIELD: &'static str = "bk_obj_id";
}
