//! The data handed from a check to its fail operation.

use crate::descriptor::ArgCode;
use crate::errors::{ContractError, FailureKind};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CALLER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of the object performing a check.
///
/// Equality is by identity: two callers created with the same label are
/// still different callers. Clones share the identity.
#[derive(Clone)]
pub struct Caller {
    id: u64,
    label: Arc<str>,
}

impl Caller {
    pub fn new(label: impl Into<String>) -> Self {
        let label: String = label.into();
        Self {
            id: NEXT_CALLER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label plus identity, for messages where two callers may share a label.
    pub fn describe(&self) -> String {
        format!("{}#{}", self.label, self.id)
    }
}

impl PartialEq for Caller {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Caller {}

impl Hash for Caller {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Caller({}#{})", self.label, self.id)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A substitution value. `Null` renders as the literal `null`, never as "".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
}

impl Value {
    pub fn of(value: impl fmt::Display) -> Self {
        Value::Text(value.to_string())
    }

    pub fn opt<T: fmt::Display>(value: Option<T>) -> Self {
        value.map_or(Value::Null, Value::of)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&Caller> for Value {
    fn from(c: &Caller) -> Self {
        Value::Text(c.label().to_string())
    }
}

macro_rules! value_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::of(v)
            }
        })*
    };
}

value_from_display!(bool, i32, i64, u32, u64, usize, f32, f64, char);

/// Values captured by a predicate at assertion time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckCall {
    pub arguments: Vec<Value>,
    pub extras: Vec<Value>,
}

impl CheckCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }

    pub fn extra(mut self, value: impl Into<Value>) -> Self {
        self.extras.push(value.into());
        self
    }
}

/// One pending check → fail obligation.
#[derive(Debug, Clone)]
pub struct Contract {
    caller: Caller,
    check_specification: String,
    check_arguments: Vec<Value>,
    check_extra_arguments: Vec<Value>,
    observed: Option<Arc<dyn Error + Send + Sync>>,
    pub(crate) custom_kind: Option<FailureKind>,
    pub(crate) custom_format: Option<String>,
    pub(crate) custom_argument_order: Option<Vec<ArgCode>>,
    pub(crate) custom_postfix: Option<String>,
}

impl Contract {
    pub fn new(caller: &Caller, check_specification: impl Into<String>, call: CheckCall) -> Self {
        Self {
            caller: caller.clone(),
            check_specification: check_specification.into(),
            check_arguments: call.arguments,
            check_extra_arguments: call.extras,
            observed: None,
            custom_kind: None,
            custom_format: None,
            custom_argument_order: None,
            custom_postfix: None,
        }
    }

    pub fn with_observed(mut self, fault: Arc<dyn Error + Send + Sync>) -> Self {
        self.observed = Some(fault);
        self
    }

    pub fn with_custom_kind(mut self, kind: FailureKind) -> Self {
        self.custom_kind = Some(kind);
        self
    }

    pub fn with_custom_format(mut self, format: impl Into<String>) -> Self {
        self.custom_format = Some(format.into());
        self
    }

    pub fn with_custom_argument_order(mut self, order: Vec<ArgCode>) -> Self {
        self.custom_argument_order = Some(order);
        self
    }

    pub fn with_custom_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.custom_postfix = Some(postfix.into());
        self
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn check_specification(&self) -> &str {
        &self.check_specification
    }

    pub fn check_arguments(&self) -> &[Value] {
        &self.check_arguments
    }

    pub fn check_extra_arguments(&self) -> &[Value] {
        &self.check_extra_arguments
    }

    pub fn observed(&self) -> Option<&Arc<dyn Error + Send + Sync>> {
        self.observed.as_ref()
    }

    pub fn custom_kind(&self) -> Option<&FailureKind> {
        self.custom_kind.as_ref()
    }

    pub fn custom_format(&self) -> Option<&str> {
        self.custom_format.as_deref()
    }

    pub fn custom_argument_order(&self) -> Option<&[ArgCode]> {
        self.custom_argument_order.as_deref()
    }

    pub fn custom_postfix(&self) -> Option<&str> {
        self.custom_postfix.as_deref()
    }

    /// Push-time validation of the fields the type system cannot enforce.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.check_specification.trim().is_empty() {
            return Err(ContractError::argument(
                "contract check specification is empty",
            ));
        }
        if self.custom_format.as_deref().is_some_and(str::is_empty) {
            return Err(ContractError::argument("custom message format is empty"));
        }
        if self
            .custom_argument_order
            .as_ref()
            .is_some_and(Vec::is_empty)
        {
            return Err(ContractError::argument(
                "custom message argument order is empty",
            ));
        }
        Ok(())
    }

    pub(crate) fn context(&self) -> serde_json::Value {
        serde_json::json!({
            "check_arguments": self.check_arguments,
            "check_extra_arguments": self.check_extra_arguments,
        })
    }
}
