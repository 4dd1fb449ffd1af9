//! The engine context handed to every check/fail family.
//!
//! One [`Engine`] owns the descriptor table, the contract registry, the
//! customization registry and the last raised diagnostic. Construct it once
//! at startup and pass it (usually behind an `Arc`) to the code that checks.

use crate::config::EngineConfig;
use crate::contract::{Caller, CheckCall, Contract, Value};
use crate::customization::CustomizationRegistry;
use crate::descriptor::{ArgCode, DescriptorTable};
use crate::errors::{ContractError, Diagnostic, FailureKind};
use crate::runtime::ContractRegistry;
use crate::synth::MessageSynthesizer;
use std::convert::Infallible;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Engine {
    descriptors: DescriptorTable,
    contracts: ContractRegistry,
    customizations: CustomizationRegistry,
    strict_registration: bool,
    last: Mutex<Option<Arc<Diagnostic>>>,
}

impl Engine {
    pub fn new(descriptors: DescriptorTable) -> Self {
        Self {
            descriptors,
            contracts: ContractRegistry::new(),
            customizations: CustomizationRegistry::new(),
            strict_registration: false,
            last: Mutex::new(None),
        }
    }

    /// Build an engine and apply the configured overrides.
    pub fn with_config(
        descriptors: DescriptorTable,
        config: &EngineConfig,
    ) -> Result<Self, ContractError> {
        config
            .validate()
            .map_err(|e| ContractError::argument(e.to_string()))?;

        let mut engine = Self::new(descriptors);
        engine.strict_registration = config.strict_registration;
        for (operation_id, customization) in &config.customizations {
            engine.require_known(operation_id)?;
            engine
                .customizations
                .register(operation_id, customization.clone())?;
        }
        info!(
            descriptors = engine.descriptors.len(),
            customizations = config.customizations.len(),
            strict = config.strict_registration,
            "contract engine configured"
        );
        Ok(engine)
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn customizations(&self) -> &CustomizationRegistry {
        &self.customizations
    }

    // =========================================================================
    // Checker
    // =========================================================================

    /// Record the outcome of a predicate. When it asserted, a contract is
    /// pushed and the caller must invoke the linked fail operation next.
    pub fn check(
        &self,
        caller: &Caller,
        check_specification: &str,
        asserted: bool,
        call: CheckCall,
    ) -> Result<bool, ContractError> {
        if asserted {
            self.push(Contract::new(caller, check_specification, call))?;
        }
        Ok(asserted)
    }

    /// Like [`check`](Self::check), but evaluates `call` only on assertion.
    pub fn check_with(
        &self,
        caller: &Caller,
        check_specification: &str,
        asserted: bool,
        call: impl FnOnce() -> CheckCall,
    ) -> Result<bool, ContractError> {
        if asserted {
            self.push(Contract::new(caller, check_specification, call()))?;
        }
        Ok(asserted)
    }

    /// Observed-fault check: always asserts, and the fault is nested into
    /// the diagnostic raised by the matching fail.
    pub fn observe<E>(
        &self,
        caller: &Caller,
        check_specification: &str,
        fault: E,
        call: CheckCall,
    ) -> Result<(), ContractError>
    where
        E: Error + Send + Sync + 'static,
    {
        let contract = Contract::new(caller, check_specification, call)
            .with_observed(Arc::new(fault));
        self.push(contract)
    }

    /// Push a fully built contract. The check specification must be linked
    /// to some fail specification in the descriptor table.
    pub fn push(&self, contract: Contract) -> Result<(), ContractError> {
        if self
            .descriptors
            .fail_specification_for(contract.check_specification())
            .is_none()
        {
            return Err(ContractError::argument(format!(
                "no fail operation is linked to check '{}'",
                contract.check_specification()
            )));
        }
        self.contracts.push(contract)
    }

    /// The check specification of the contract `caller` has pending.
    pub fn pending_check(&self, caller: &Caller) -> Result<String, ContractError> {
        self.contracts
            .peek(caller)
            .map(|c| c.check_specification().to_string())
    }

    // =========================================================================
    // Per-contract customization (between check and fail only)
    // =========================================================================

    pub fn set_custom_exception_kind(
        &self,
        caller: &Caller,
        kind: FailureKind,
    ) -> Result<(), ContractError> {
        self.contracts
            .amend(caller, "set_custom_exception_kind", |c| {
                c.custom_kind = Some(kind)
            })
    }

    pub fn set_custom_message_format(
        &self,
        caller: &Caller,
        format: impl Into<String>,
    ) -> Result<(), ContractError> {
        let format = format.into();
        if format.is_empty() {
            return Err(ContractError::argument("custom message format is empty"));
        }
        self.contracts
            .amend(caller, "set_custom_message_format", |c| {
                c.custom_format = Some(format)
            })
    }

    pub fn set_custom_message_argument_order(
        &self,
        caller: &Caller,
        order: Vec<ArgCode>,
    ) -> Result<(), ContractError> {
        if order.is_empty() {
            return Err(ContractError::argument(
                "custom message argument order is empty",
            ));
        }
        self.contracts
            .amend(caller, "set_custom_message_argument_order", |c| {
                c.custom_argument_order = Some(order)
            })
    }

    pub fn set_custom_message_postfix(
        &self,
        caller: &Caller,
        postfix: impl Into<String>,
    ) -> Result<(), ContractError> {
        let postfix = postfix.into();
        self.contracts
            .amend(caller, "set_custom_message_postfix", |c| {
                c.custom_postfix = Some(postfix)
            })
    }

    // =========================================================================
    // Failer
    // =========================================================================

    /// Close the pending contract and raise its diagnostic.
    ///
    /// `args` are the fail-call arguments after the caller; the caller
    /// itself is always `fu0`. Never returns `Ok`.
    pub fn fail(
        &self,
        caller: &Caller,
        operation_id: &str,
        args: &[Value],
    ) -> Result<Infallible, ContractError> {
        let descriptor = self.descriptors.operation(operation_id).ok_or_else(|| {
            ContractError::argument(format!("unknown fail operation '{operation_id}'"))
        })?;

        let contract = self.contracts.pop(caller, descriptor)?;

        let mut fail_args = Vec::with_capacity(args.len() + 1);
        fail_args.push(Value::from(caller));
        fail_args.extend_from_slice(args);

        let synthesis = MessageSynthesizer::new(&self.customizations)
            .synthesize(descriptor, &contract, &fail_args)?;

        let diagnostic = Arc::new(
            Diagnostic::new(synthesis.kind, synthesis.message)
                .with_operation(descriptor.operation_id, descriptor.fail_specification)
                .with_check(contract.check_specification())
                .with_caller(caller.label())
                .with_context(contract.context())
                .with_observed(contract.observed().cloned()),
        );

        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(diagnostic.clone());
        debug!(
            operation = descriptor.operation_id,
            kind = %diagnostic.kind,
            "raising diagnostic"
        );
        Err(ContractError::Diagnostic(diagnostic))
    }

    /// The last diagnostic raised by [`fail`](Self::fail), on any thread.
    pub fn last_diagnostic(&self) -> Option<Arc<Diagnostic>> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Registered customization
    // =========================================================================

    fn require_known(&self, operation_id: &str) -> Result<(), ContractError> {
        if self.descriptors.contains_operation(operation_id) {
            return Ok(());
        }
        if self.strict_registration {
            return Err(ContractError::argument(format!(
                "no descriptor declares operation '{operation_id}'"
            )));
        }
        warn!(
            operation = operation_id,
            "customization registered for undeclared operation"
        );
        Ok(())
    }

    pub fn register_exception_kind(
        &self,
        operation_id: &str,
        kind: FailureKind,
    ) -> Result<(), ContractError> {
        self.require_known(operation_id)?;
        self.customizations
            .register_exception_kind(operation_id, kind)
    }

    pub fn unregister_exception_kind(&self, operation_id: &str) -> Result<(), ContractError> {
        self.customizations
            .unregister_exception_kind(operation_id)
            .map(drop)
    }

    pub fn register_message_format(
        &self,
        operation_id: &str,
        format: impl Into<String>,
    ) -> Result<(), ContractError> {
        self.require_known(operation_id)?;
        self.customizations
            .register_message_format(operation_id, format)
    }

    pub fn unregister_message_format(&self, operation_id: &str) -> Result<(), ContractError> {
        self.customizations
            .unregister_message_format(operation_id)
            .map(drop)
    }

    pub fn register_message_argument_order(
        &self,
        operation_id: &str,
        order: Vec<ArgCode>,
    ) -> Result<(), ContractError> {
        self.require_known(operation_id)?;
        self.customizations
            .register_message_argument_order(operation_id, order)
    }

    pub fn unregister_message_argument_order(
        &self,
        operation_id: &str,
    ) -> Result<(), ContractError> {
        self.customizations
            .unregister_message_argument_order(operation_id)
            .map(drop)
    }
}
