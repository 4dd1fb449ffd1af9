pub mod diagnostic;

pub use diagnostic::{Diagnostic, FailureKind};

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// A break in the check → fail sequence. Always a defect in the calling code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("a contract is already pending for caller {caller} (check '{check_specification}')")]
    AlreadyPending {
        caller: String,
        check_specification: String,
    },

    #[error("no contract is pending on this thread ('{operation}')")]
    NothingPending { operation: String },

    #[error("caller mismatch: contract pending for {expected}, got {actual}")]
    CallerMismatch { expected: String, actual: String },

    #[error(
        "wrong fail operation for this check: '{fail_specification}' cannot close \
         check '{check_specification}' (expected '{expected}')"
    )]
    WrongFailOperation {
        check_specification: String,
        fail_specification: String,
        expected: String,
    },
}

/// Everything the engine can hand back to a caller.
///
/// `Argument` and `Protocol` are defects; `Diagnostic` is the product of a
/// correct check → fail sequence.
#[derive(Debug, Clone, Error)]
pub enum ContractError {
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Diagnostic(Arc<Diagnostic>),
}

impl ContractError {
    pub fn argument(detail: impl Into<String>) -> Self {
        ContractError::Argument(detail.into())
    }

    /// True for errors that indicate a bug in the caller rather than a fired contract.
    pub fn is_defect(&self) -> bool {
        !matches!(self, ContractError::Diagnostic(_))
    }

    pub fn diagnostic(&self) -> Option<&Arc<Diagnostic>> {
        match self {
            ContractError::Diagnostic(d) => Some(d),
            _ => None,
        }
    }

    pub fn protocol_violation(&self) -> Option<&ProtocolViolation> {
        match self {
            ContractError::Protocol(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defects_are_distinguished_from_diagnostics() {
        let arg = ContractError::argument("empty operation id");
        assert!(arg.is_defect());
        assert!(arg.diagnostic().is_none());

        let proto: ContractError = ProtocolViolation::NothingPending {
            operation: "object-null-fail".into(),
        }
        .into();
        assert!(proto.is_defect());
        assert!(matches!(
            proto.protocol_violation(),
            Some(ProtocolViolation::NothingPending { .. })
        ));

        let diag = ContractError::Diagnostic(Arc::new(Diagnostic::new(
            FailureKind::NullValue,
            "c: Object 'r' is null.",
        )));
        assert!(!diag.is_defect());
        assert_eq!(diag.to_string(), "c: Object 'r' is null.");
    }

    #[test]
    fn violation_messages_name_the_problem() {
        let v = ProtocolViolation::AlreadyPending {
            caller: "worker#3".into(),
            check_specification: "object-null".into(),
        };
        assert_eq!(
            v.to_string(),
            "a contract is already pending for caller worker#3 (check 'object-null')"
        );
        let v = ProtocolViolation::CallerMismatch {
            expected: "a#1".into(),
            actual: "b#2".into(),
        };
        assert!(v.to_string().starts_with("caller mismatch"));
    }
}
