//! Inclusive range checks.

use crate::Checks;
use covenant_core::{ArgCode, Caller, CheckCall, ContractError, FailDescriptor, FailureKind, Value};
use std::convert::Infallible;
use std::fmt::Display;

pub const OUT_OF_RANGE_CHECK: &str = "value-out-of-range";
pub const FAIL_OUT_OF_RANGE: &str = "value-out-of-range/fail";

pub static DESCRIPTORS: [FailDescriptor; 1] = [FailDescriptor {
    operation_id: FAIL_OUT_OF_RANGE,
    fail_specification: "value-out-of-range-fail",
    linked_check_specification: OUT_OF_RANGE_CHECK,
    default_kind: FailureKind::OutOfRange,
    default_format: "%s: Value '%s' = %s is out of range [%s, %s] (%s).",
    default_argument_order: &[
        ArgCode::FailArg(0),
        ArgCode::FailArg(1),
        ArgCode::CheckArg(0),
        ArgCode::CheckArg(1),
        ArgCode::CheckArg(2),
        ArgCode::CheckExtra(0),
    ],
}];

impl Checks<'_> {
    /// Asserts when `value` lies outside `[min, max]`.
    ///
    /// Captures which bound was crossed as `cx0`.
    pub fn is_out_of_range<T: PartialOrd + Display>(
        &self,
        caller: &Caller,
        value: T,
        min: T,
        max: T,
    ) -> Result<bool, ContractError> {
        let crossed = if value < min {
            Some("below minimum")
        } else if value > max {
            Some("above maximum")
        } else {
            None
        };
        self.engine()
            .check_with(caller, OUT_OF_RANGE_CHECK, crossed.is_some(), || {
                CheckCall::new()
                    .arg(Value::of(&value))
                    .arg(Value::of(&min))
                    .arg(Value::of(&max))
                    .extra(crossed.unwrap_or_default())
            })
    }

    pub fn fail_out_of_range(
        &self,
        caller: &Caller,
        reference: &str,
    ) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_OUT_OF_RANGE, &[reference.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let engine = crate::engine().unwrap();
        let checks = Checks::new(&engine);
        let caller = Caller::new("c");
        assert!(!checks.is_out_of_range(&caller, 1, 1, 5).unwrap());
        assert!(!checks.is_out_of_range(&caller, 5, 1, 5).unwrap());
        assert!(!engine.contracts().is_pending());
    }

    #[test]
    fn reports_crossed_bound() {
        let engine = crate::engine().unwrap();
        let checks = Checks::new(&engine);
        let caller = Caller::new("pool");
        assert!(checks.is_out_of_range(&caller, 9, 1, 5).unwrap());
        let err = match checks.fail_out_of_range(&caller, "size") {
            Err(e) => e,
            Ok(never) => match never {},
        };
        let diag = err.diagnostic().unwrap();
        assert_eq!(
            diag.message,
            "pool: Value 'size' = 9 is out of range [1, 5] (above maximum)."
        );
        assert_eq!(diag.kind, FailureKind::OutOfRange);
    }
}
