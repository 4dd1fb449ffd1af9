//! Reference check/fail families built on the generic descriptor interface.
//!
//! Each family module declares a `DESCRIPTORS` table and adds a predicate
//! plus its fail operations to [`Checks`]:
//!
//! ```text
//! if checks.is_null(&caller, value.as_ref())? {
//!     checks.fail_null(&caller, "value")?;
//! }
//! ```

pub mod equality;
pub mod float;
pub mod object;
pub mod observed;
pub mod range;

use covenant_core::{ContractError, DescriptorTable, Diagnostic, Engine, EngineConfig, Value};
use std::convert::Infallible;
use std::sync::Arc;

/// Descriptor table covering every family in this crate.
pub fn descriptor_table() -> Result<DescriptorTable, ContractError> {
    DescriptorTable::from_catalogues(&[
        &object::DESCRIPTORS,
        &range::DESCRIPTORS,
        &equality::DESCRIPTORS,
        &float::DESCRIPTORS,
        &observed::DESCRIPTORS,
    ])
}

pub fn engine() -> Result<Engine, ContractError> {
    Ok(Engine::new(descriptor_table()?))
}

pub fn engine_with_config(config: &EngineConfig) -> Result<Engine, ContractError> {
    Engine::with_config(descriptor_table()?, config)
}

/// Check and fail operations of every family, bound to one engine.
#[derive(Debug, Clone, Copy)]
pub struct Checks<'e> {
    engine: &'e Engine,
}

impl<'e> Checks<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    pub fn last_diagnostic(&self) -> Option<Arc<Diagnostic>> {
        self.engine.last_diagnostic()
    }

    fn fail(
        &self,
        caller: &covenant_core::Caller,
        operation_id: &str,
        args: &[Value],
    ) -> Result<Infallible, ContractError> {
        tracing::trace!(operation = operation_id, "fail requested");
        self.engine.fail(caller, operation_id, args)
    }
}
