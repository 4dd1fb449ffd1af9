//! ContractRegistry: at most one pending contract per thread.
//!
//! Provides the check → fail pairing with:
//! - Double-push rejection on the same thread
//! - Caller identity matching on pop/peek
//! - Fail-specification matching on pop
//!
//! A contract pushed on thread T is only visible to code running on T.

use crate::contract::{Caller, Contract};
use crate::descriptor::FailDescriptor;
use crate::errors::{ContractError, ProtocolViolation};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// Thread-keyed store of pending contracts, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    pending: Arc<Mutex<HashMap<ThreadId, Contract>>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ThreadId, Contract>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `contract` as pending for the current thread.
    pub fn push(&self, contract: Contract) -> Result<(), ContractError> {
        contract.validate()?;

        let mut slots = self.slots();
        let tid = thread::current().id();
        if let Some(existing) = slots.get(&tid) {
            let violation = ProtocolViolation::AlreadyPending {
                caller: existing.caller().describe(),
                check_specification: existing.check_specification().to_string(),
            };
            warn!(
                caller = %contract.caller().describe(),
                check = contract.check_specification(),
                error = %violation,
                "rejected contract push"
            );
            return Err(violation.into());
        }

        debug!(
            caller = %contract.caller().describe(),
            check = contract.check_specification(),
            "contract pushed"
        );
        slots.insert(tid, contract);
        Ok(())
    }

    /// Consume the pending contract if `caller` owns it and `fail` is the
    /// operation linked to its check. On error the contract stays pending.
    pub fn pop(&self, caller: &Caller, fail: &FailDescriptor) -> Result<Contract, ContractError> {
        let mut slots = self.slots();
        let tid = thread::current().id();

        let result = match slots.get(&tid) {
            None => Err(ProtocolViolation::NothingPending {
                operation: fail.fail_specification.to_string(),
            }),
            Some(pending) => match_caller(pending, caller).and_then(|()| {
                if pending.check_specification() == fail.linked_check_specification {
                    Ok(())
                } else {
                    Err(ProtocolViolation::WrongFailOperation {
                        check_specification: pending.check_specification().to_string(),
                        fail_specification: fail.fail_specification.to_string(),
                        expected: fail.linked_check_specification.to_string(),
                    })
                }
            }),
        };

        if let Err(violation) = result {
            warn!(
                caller = %caller.describe(),
                operation = fail.operation_id,
                error = %violation,
                "rejected contract pop"
            );
            return Err(violation.into());
        }

        let contract = slots.remove(&tid).ok_or_else(|| {
            ContractError::Protocol(ProtocolViolation::NothingPending {
                operation: fail.fail_specification.to_string(),
            })
        })?;
        debug!(
            caller = %caller.describe(),
            check = contract.check_specification(),
            operation = fail.operation_id,
            "contract popped"
        );
        Ok(contract)
    }

    /// Read the pending contract without consuming it.
    pub fn peek(&self, caller: &Caller) -> Result<Contract, ContractError> {
        self.with_pending(caller, "peek", |c| c.clone())
    }

    /// Apply `f` to the pending contract owned by `caller`.
    pub(crate) fn amend<T>(
        &self,
        caller: &Caller,
        operation: &str,
        f: impl FnOnce(&mut Contract) -> T,
    ) -> Result<T, ContractError> {
        self.with_pending(caller, operation, f)
    }

    fn with_pending<T>(
        &self,
        caller: &Caller,
        operation: &str,
        f: impl FnOnce(&mut Contract) -> T,
    ) -> Result<T, ContractError> {
        let mut slots = self.slots();
        let tid = thread::current().id();
        let pending = slots.get_mut(&tid).ok_or_else(|| {
            ContractError::Protocol(ProtocolViolation::NothingPending {
                operation: operation.to_string(),
            })
        })?;
        if let Err(violation) = match_caller(pending, caller) {
            warn!(
                caller = %caller.describe(),
                operation,
                error = %violation,
                "rejected contract access"
            );
            return Err(violation.into());
        }
        Ok(f(pending))
    }

    /// True if the current thread has a pending contract.
    pub fn is_pending(&self) -> bool {
        self.slots().contains_key(&thread::current().id())
    }

    /// Number of threads with a pending contract.
    pub fn pending_count(&self) -> usize {
        self.slots().len()
    }
}

fn match_caller(pending: &Contract, caller: &Caller) -> Result<(), ProtocolViolation> {
    if pending.caller() == caller {
        Ok(())
    } else {
        Err(ProtocolViolation::CallerMismatch {
            expected: pending.caller().describe(),
            actual: caller.describe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::CheckCall;
    use crate::descriptor::ArgCode;
    use crate::errors::FailureKind;

    static NULL_FAIL: FailDescriptor = FailDescriptor {
        operation_id: "object-null/fail",
        fail_specification: "object-null-fail",
        linked_check_specification: "object-null",
        default_kind: FailureKind::NullValue,
        default_format: "%s: Object '%s' is null.",
        default_argument_order: &[ArgCode::FailArg(0), ArgCode::FailArg(1)],
    };

    static RANGE_FAIL: FailDescriptor = FailDescriptor {
        operation_id: "range/fail",
        fail_specification: "range-fail",
        linked_check_specification: "range",
        default_kind: FailureKind::OutOfRange,
        default_format: "%s",
        default_argument_order: &[ArgCode::FailArg(0)],
    };

    fn null_contract(caller: &Caller) -> Contract {
        Contract::new(caller, "object-null", CheckCall::new())
    }

    fn violation(err: ContractError) -> ProtocolViolation {
        match err {
            ContractError::Protocol(v) => v,
            other => panic!("expected protocol violation, got {other:?}"),
        }
    }

    // === Push ===

    #[test]
    fn test_push_then_pop_returns_contract() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();
        assert!(reg.is_pending());

        let contract = reg.pop(&caller, &NULL_FAIL).unwrap();
        assert_eq!(contract.check_specification(), "object-null");
        assert!(!reg.is_pending());
    }

    #[test]
    fn test_double_push_is_rejected_regardless_of_caller() {
        let reg = ContractRegistry::new();
        let a = Caller::new("a");
        let b = Caller::new("b");
        reg.push(null_contract(&a)).unwrap();

        let err = reg.push(null_contract(&b)).unwrap_err();
        assert!(matches!(
            violation(err),
            ProtocolViolation::AlreadyPending { caller, .. } if caller == a.describe()
        ));
        let err = reg.push(null_contract(&a)).unwrap_err();
        assert!(matches!(
            violation(err),
            ProtocolViolation::AlreadyPending { .. }
        ));

        // First contract is untouched.
        assert!(reg.pop(&a, &NULL_FAIL).is_ok());
    }

    #[test]
    fn test_push_validates_contract() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        let err = reg
            .push(Contract::new(&caller, "", CheckCall::new()))
            .unwrap_err();
        assert!(matches!(err, ContractError::Argument(_)));
        assert!(!reg.is_pending());
    }

    // === Pop ===

    #[test]
    fn test_pop_without_push_is_rejected() {
        let reg = ContractRegistry::new();
        let err = reg.pop(&Caller::new("c"), &NULL_FAIL).unwrap_err();
        assert!(matches!(
            violation(err),
            ProtocolViolation::NothingPending { operation } if operation == "object-null-fail"
        ));
    }

    #[test]
    fn test_pop_by_other_caller_leaves_contract_pending() {
        let reg = ContractRegistry::new();
        let owner = Caller::new("same-label");
        let other = Caller::new("same-label");
        reg.push(null_contract(&owner)).unwrap();

        let err = reg.pop(&other, &NULL_FAIL).unwrap_err();
        assert!(matches!(violation(err), ProtocolViolation::CallerMismatch { .. }));
        assert!(reg.is_pending());
        assert!(reg.pop(&owner, &NULL_FAIL).is_ok());
    }

    #[test]
    fn test_pop_with_wrong_fail_leaves_contract_pending() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();

        let err = reg.pop(&caller, &RANGE_FAIL).unwrap_err();
        assert!(matches!(
            violation(err),
            ProtocolViolation::WrongFailOperation { check_specification, expected, .. }
                if check_specification == "object-null" && expected == "range"
        ));
        assert!(reg.is_pending());
        assert!(reg.pop(&caller, &NULL_FAIL).is_ok());
    }

    #[test]
    fn test_popped_contract_cannot_be_popped_again() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();
        reg.pop(&caller, &NULL_FAIL).unwrap();
        assert!(reg.pop(&caller, &NULL_FAIL).is_err());
    }

    // === Peek / amend ===

    #[test]
    fn test_peek_does_not_consume() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();
        let seen = reg.peek(&caller).unwrap();
        assert_eq!(seen.caller(), &caller);
        assert!(reg.is_pending());
        assert!(reg.peek(&Caller::new("x")).is_err());
    }

    #[test]
    fn test_amend_mutates_pending_contract() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();
        reg.amend(&caller, "set_custom_message_postfix", |c| {
            c.custom_postfix = Some("tail".into())
        })
        .unwrap();
        assert_eq!(reg.peek(&caller).unwrap().custom_postfix(), Some("tail"));
    }

    // === Thread confinement ===

    #[test]
    fn test_contracts_are_confined_to_their_thread() {
        let reg = ContractRegistry::new();
        let caller = Caller::new("c");
        reg.push(null_contract(&caller)).unwrap();

        let other = reg.clone();
        let c2 = caller.clone();
        let (pop_result, push_result) = std::thread::spawn(move || {
            let pop = other.pop(&c2, &NULL_FAIL).map(|_| ());
            let push = other.push(Contract::new(&c2, "object-null", CheckCall::new()));
            let _ = other.pop(&c2, &NULL_FAIL);
            (pop, push)
        })
        .join()
        .unwrap();

        assert!(matches!(
            pop_result,
            Err(ContractError::Protocol(ProtocolViolation::NothingPending { .. }))
        ));
        assert!(push_result.is_ok());
        assert_eq!(reg.pending_count(), 1);
        assert!(reg.pop(&caller, &NULL_FAIL).is_ok());
    }
}
