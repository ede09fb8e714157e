// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Side channel announcing created, updated and deleted resources to an external
//! authorization system.
//!
//! Registration runs after the store mutation has been committed. A failure is reported but
//! never undoes the mutation.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Object id of the resource (`set`, `module`, a custom level, or `process`).
    pub object: String,
    pub id: u64,
    pub name: String,
}

pub trait ResourceRegistrar {
    fn register(&mut self, resource: &ResourceRef) -> Result<(), RegistrarError>;
    fn update(&mut self, resource: &ResourceRef) -> Result<(), RegistrarError>;
    fn deregister(&mut self, resource: &ResourceRef) -> Result<(), RegistrarError>;
}

/// Registrar for deployments without an external authorization system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistrar;

impl ResourceRegistrar for NoopRegistrar {
    fn register(&mut self, _resource: &ResourceRef) -> Result<(), RegistrarError> {
        Ok(())
    }

    fn update(&mut self, _resource: &ResourceRef) -> Result<(), RegistrarError> {
        Ok(())
    }

    fn deregister(&mut self, _resource: &ResourceRef) -> Result<(), RegistrarError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarError {
    message: String,
}

impl RegistrarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RegistrarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource registration failed: {}", self.message)
    }
}

impl std::error::Error for RegistrarError {}
