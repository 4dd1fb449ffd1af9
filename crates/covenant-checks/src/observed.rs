//! Observed-fault checks: a fault caught by the caller is nested into a
//! fresh diagnostic instead of being surfaced directly.

use crate::Checks;
use covenant_core::{ArgCode, Caller, CheckCall, ContractError, FailDescriptor, FailureKind};
use std::convert::Infallible;
use std::error::Error;

pub const OBSERVED_FAULT_CHECK: &str = "observed-fault";
pub const FAIL_OBSERVED: &str = "observed-fault/fail";

pub static DESCRIPTORS: [FailDescriptor; 1] = [FailDescriptor {
    operation_id: FAIL_OBSERVED,
    fail_specification: "observed-fault-fail",
    linked_check_specification: OBSERVED_FAULT_CHECK,
    default_kind: FailureKind::ObservedFault,
    default_format: "%s: Unexpected fault observed in %s: %s",
    default_argument_order: &[
        ArgCode::FailArg(0),
        ArgCode::FailArg(1),
        ArgCode::CheckExtra(0),
    ],
}];

impl Checks<'_> {
    /// Always asserts. The fault's message is captured as `cx0`.
    pub fn is_fault_observed<E>(&self, caller: &Caller, fault: E) -> Result<bool, ContractError>
    where
        E: Error + Send + Sync + 'static,
    {
        let call = CheckCall::new().extra(fault.to_string());
        self.engine()
            .observe(caller, OBSERVED_FAULT_CHECK, fault, call)?;
        Ok(true)
    }

    pub fn fail_observed(
        &self,
        caller: &Caller,
        location: &str,
    ) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_OBSERVED, &[location.into()])
    }
}
