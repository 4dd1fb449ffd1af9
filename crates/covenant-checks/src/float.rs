//! Floating point tolerance checks.

use crate::Checks;
use covenant_core::{ArgCode, Caller, CheckCall, ContractError, FailDescriptor, FailureKind};
use std::convert::Infallible;

pub const NOT_ALMOST_EQUAL_CHECK: &str = "float-not-almost-equal";
pub const FAIL_NOT_ALMOST_EQUAL: &str = "float-not-almost-equal/fail";

pub static DESCRIPTORS: [FailDescriptor; 1] = [FailDescriptor {
    operation_id: FAIL_NOT_ALMOST_EQUAL,
    fail_specification: "float-not-almost-equal-fail",
    linked_check_specification: NOT_ALMOST_EQUAL_CHECK,
    default_kind: FailureKind::InvalidArgument,
    default_format: "%s: '%s' = %s differs from %s by %s (tolerance %s).",
    default_argument_order: &[
        ArgCode::FailArg(0),
        ArgCode::FailArg(1),
        ArgCode::CheckArg(0),
        ArgCode::CheckArg(1),
        ArgCode::CheckExtra(0),
        ArgCode::CheckArg(2),
    ],
}];

impl Checks<'_> {
    /// Asserts when `|actual - expected| > epsilon`, or when either side is NaN.
    ///
    /// The computed difference is captured as `cx0`.
    pub fn is_not_almost_equal(
        &self,
        caller: &Caller,
        actual: f64,
        expected: f64,
        epsilon: f64,
    ) -> Result<bool, ContractError> {
        let difference = (actual - expected).abs();
        let asserted = difference.is_nan() || difference > epsilon;
        self.engine()
            .check_with(caller, NOT_ALMOST_EQUAL_CHECK, asserted, || {
                CheckCall::new()
                    .arg(actual)
                    .arg(expected)
                    .arg(epsilon)
                    .extra(difference)
            })
    }

    pub fn fail_not_almost_equal(
        &self,
        caller: &Caller,
        reference: &str,
    ) -> Result<Infallible, ContractError> {
        self.fail(caller, FAIL_NOT_ALMOST_EQUAL, &[reference.into()])
    }
}
