//! Per-operation overrides of the declared diagnostic defaults.

use crate::descriptor::ArgCode;
use crate::errors::{ContractError, FailureKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Overrides registered for one operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Customization {
    pub kind: Option<FailureKind>,
    pub format: Option<String>,
    pub argument_order: Option<Vec<ArgCode>>,
}

impl Customization {
    fn is_empty(&self) -> bool {
        self.kind.is_none() && self.format.is_none() && self.argument_order.is_none()
    }
}

/// Keyed table of [`Customization`]s, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct CustomizationRegistry {
    entries: Arc<RwLock<HashMap<String, Customization>>>,
}

fn require_key(operation_id: &str) -> Result<(), ContractError> {
    if operation_id.trim().is_empty() {
        return Err(ContractError::argument("operation id is empty"));
    }
    Ok(())
}

impl CustomizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<T>(
        &self,
        operation_id: &str,
        f: impl FnOnce(&mut Customization) -> T,
    ) -> Result<T, ContractError> {
        require_key(operation_id)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(operation_id.to_string()).or_default();
        let out = f(entry);
        if entry.is_empty() {
            entries.remove(operation_id);
        }
        Ok(out)
    }

    fn read<T>(
        &self,
        operation_id: &str,
        f: impl FnOnce(&Customization) -> Option<T>,
    ) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(operation_id).and_then(f)
    }

    pub fn register_exception_kind(
        &self,
        operation_id: &str,
        kind: FailureKind,
    ) -> Result<(), ContractError> {
        self.update(operation_id, |c| c.kind = Some(kind))
    }

    pub fn unregister_exception_kind(
        &self,
        operation_id: &str,
    ) -> Result<Option<FailureKind>, ContractError> {
        self.update(operation_id, |c| c.kind.take())
    }

    pub fn register_message_format(
        &self,
        operation_id: &str,
        format: impl Into<String>,
    ) -> Result<(), ContractError> {
        let format = format.into();
        self.update(operation_id, |c| c.format = Some(format))
    }

    pub fn unregister_message_format(
        &self,
        operation_id: &str,
    ) -> Result<Option<String>, ContractError> {
        self.update(operation_id, |c| c.format.take())
    }

    pub fn register_message_argument_order(
        &self,
        operation_id: &str,
        order: Vec<ArgCode>,
    ) -> Result<(), ContractError> {
        self.update(operation_id, |c| c.argument_order = Some(order))
    }

    pub fn unregister_message_argument_order(
        &self,
        operation_id: &str,
    ) -> Result<Option<Vec<ArgCode>>, ContractError> {
        self.update(operation_id, |c| c.argument_order.take())
    }

    /// Apply every field set in `customization`, leaving the others alone.
    pub fn register(
        &self,
        operation_id: &str,
        customization: Customization,
    ) -> Result<(), ContractError> {
        self.update(operation_id, |c| {
            if customization.kind.is_some() {
                c.kind = customization.kind;
            }
            if customization.format.is_some() {
                c.format = customization.format;
            }
            if customization.argument_order.is_some() {
                c.argument_order = customization.argument_order;
            }
        })
    }

    pub fn exception_kind(&self, operation_id: &str) -> Option<FailureKind> {
        self.read(operation_id, |c| c.kind.clone())
    }

    pub fn message_format(&self, operation_id: &str) -> Option<String> {
        self.read(operation_id, |c| c.format.clone())
    }

    pub fn message_argument_order(&self, operation_id: &str) -> Option<Vec<ArgCode>> {
        self.read(operation_id, |c| c.argument_order.clone())
    }

    pub fn entry(&self, operation_id: &str) -> Option<Customization> {
        self.read(operation_id, |c| Some(c.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
