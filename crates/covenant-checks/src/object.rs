//! Object presence checks.

use crate::Checks;
use covenant_core::{ArgCode, Caller, CheckCall, ContractError, FailDescriptor, FailureKind, Value};
use std::convert::Infallible;
use std::fmt::Display;

pub const NULL_CHECK: &str = "object-null";
pub const NOT_NULL_CHECK: &str = "object-not-null";

pub const FAIL_NULL: &str = "object-null/fail";
pub const FAIL_NULL_WITH_MESSAGE: &str = "object-null/fail-with-message";
pub const FAIL_NOT_NULL: &str = "object-not-null/fail";

pub static DESCRIPTORS: [FailDescriptor; 3] = [
    FailDescriptor {
        operation_id: FAIL_NULL,
        fail_specification: "object-null-fail",
        linked_check_specification: NULL_CHECK,
        default_kind: FailureKind::NullValue,
        default_format: "%s: Object '%s' is null.",
        default_argument_order: &[ArgCode::FailArg(0), ArgCode::FailArg(1)],
    },
    FailDescriptor {
        operation_id: FAIL_NULL_WITH_MESSAGE,
        fail_specification: "object-null-fail",
        linked_check_specification: NULL_CHECK,
        default_kind: FailureKind::NullValue,
        default_format: "%s: Object '%s' is null. %s",
        default_argument_order: &[
            ArgCode::FailArg(0),
            ArgCode::FailArg(1),
            ArgCode::FailArg(2),
        ],
    },
    FailDescriptor {
        operation_id: FAIL_NOT_NULL,
        fail_specification: "object-not-null-fail",
        linked_check_specification: NOT_NULL_CHECK,
        default_kind: FailureKind::InvalidState,
        default_format: "%s: Object '%s' is not null but '%s'.",
        default_argument_order: &[
            ArgCode::FailArg(0),
            ArgCode::FailArg(1),
            ArgCode::CheckArg(0),
        ],
    },
];

impl Checks<'_> {
    /// Asserts when `value` is absent.
    pub fn is_null<T: Display>(
        &self,
        caller: &Caller,
        value: Option<T>,
    ) -> Result<bool, ContractError> {
        let asserted = value.is_none();
        self.engine().check(
            caller,
            NULL_CHECK,
            asserted,
            CheckCall::new().arg(Value::opt(value)),
        )
    }

    pub fn fail_null(&self, caller: &Caller, reference: &str) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_NULL, &[reference.into()])
    }

    pub fn fail_null_with_message(
        &self,
        caller: &Caller,
        reference: &str,
        message: Option<&str>,
    ) -> Result<Infallible, ContractError> {
        self.fail(
            caller,
            FAIL_NULL_WITH_MESSAGE,
            &[reference.into(), Value::opt(message)],
        )
    }

    /// Asserts when `value` is present.
    pub fn is_not_null<T: Display>(
        &self,
        caller: &Caller,
        value: Option<T>,
    ) -> Result<bool, ContractError> {
        let asserted = value.is_some();
        self.engine().check(
            caller,
            NOT_NULL_CHECK,
            asserted,
            CheckCall::new().arg(Value::opt(value)),
        )
    }

    pub fn fail_not_null(
        &self,
        caller: &Caller,
        reference: &str,
    ) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_NOT_NULL, &[reference.into()])
    }
}
