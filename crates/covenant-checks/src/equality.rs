//! Equality checks.

use crate::Checks;
use covenant_core::{ArgCode, Caller, CheckCall, ContractError, FailDescriptor, FailureKind};
use std::convert::Infallible;
use std::fmt::Display;

pub const NOT_EQUAL_CHECK: &str = "values-not-equal";
pub const FAIL_NOT_EQUAL: &str = "values-not-equal/fail";

pub static DESCRIPTORS: [FailDescriptor; 1] = [FailDescriptor {
    operation_id: FAIL_NOT_EQUAL,
    fail_specification: "values-not-equal-fail",
    linked_check_specification: NOT_EQUAL_CHECK,
    default_kind: FailureKind::InvalidState,
    default_format: "%s: '%s' is %s but expected %s.",
    default_argument_order: &[
        ArgCode::FailArg(0),
        ArgCode::FailArg(1),
        ArgCode::CheckArg(0),
        ArgCode::CheckArg(1),
    ],
}];

impl Checks<'_> {
    /// Asserts when `actual != expected`.
    pub fn is_not_equal<T: PartialEq + Display>(
        &self,
        caller: &Caller,
        actual: T,
        expected: T,
    ) -> Result<bool, ContractError> {
        self.engine()
            .check_with(caller, NOT_EQUAL_CHECK, actual != expected, || {
                CheckCall::new()
                    .arg(actual.to_string())
                    .arg(expected.to_string())
            })
    }

    pub fn fail_not_equal(
        &self,
        caller: &Caller,
        reference: &str,
    ) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_NOT_EQUAL, &[reference.into()])
    }
}
