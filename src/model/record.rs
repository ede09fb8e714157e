// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Raw attribute maps as stored in the record store.

use serde_json::{Map, Value};

/// One stored row: field name to JSON value.
pub type Record = Map<String, Value>;

/// Fields that are bookkeeping only and never take part in change detection.
pub const UNCOMPARED_FIELDS: &[&str] = &["_id", "create_time", "last_time"];

/// Reads an integral value regardless of how it was encoded (`3`, `3.0`, `-0`).
pub fn value_as_i128(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(v) = number.as_u64() {
        return Some(i128::from(v));
    }
    if let Some(v) = number.as_i64() {
        return Some(i128::from(v));
    }
    let v = number.as_f64()?;
    if v.fract() != 0.0 || !v.is_finite() {
        return None;
    }
    // Saturating casts; values outside i64/u64 are not identifiers anyway.
    Some(v as i128)
}

pub fn get_u64(record: &Record, field: &str) -> Option<u64> {
    record
        .get(field)
        .and_then(value_as_i128)
        .and_then(|v| u64::try_from(v).ok())
}

pub fn get_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Equality that treats numbers of different widths/encodings as equal when they denote
/// the same integer.
pub fn values_equal(persisted: &Value, target: &Value) -> bool {
    if persisted == target {
        return true;
    }
    match (value_as_i128(persisted), value_as_i128(target)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns true when every compared field of `target` is present in `persisted` with an equal
/// value. Missing persisted fields compare as `null`.
pub fn contains_attributes(persisted: &Record, target: &Record, skip: &[&str]) -> bool {
    target
        .iter()
        .filter(|(key, _)| !UNCOMPARED_FIELDS.contains(&key.as_str()))
        .filter(|(key, _)| !skip.contains(&key.as_str()))
        .all(|(key, value)| values_equal(persisted.get(key).unwrap_or(&Value::Null), value))
}
