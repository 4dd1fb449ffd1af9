use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

/// The kind of diagnostic a fail operation raises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidArgument,
    InvalidState,
    NullValue,
    OutOfRange,
    Unsupported,
    ObservedFault,
    /// Application-defined kind, identified by name.
    Custom(Cow<'static, str>),
}

impl FailureKind {
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        FailureKind::Custom(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::InvalidArgument => "invalid_argument",
            FailureKind::InvalidState => "invalid_state",
            FailureKind::NullValue => "null_value",
            FailureKind::OutOfRange => "out_of_range",
            FailureKind::Unsupported => "unsupported",
            FailureKind::ObservedFault => "observed_fault",
            FailureKind::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The diagnostic produced by a successful check → fail sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: FailureKind,
    pub message: String,
    pub operation_id: String,
    pub fail_specification: String,
    pub check_specification: String,
    pub caller: String,
    pub raised_at: DateTime<Utc>,
    pub context: serde_json::Value,
    #[serde(skip)]
    observed: Option<Arc<dyn Error + Send + Sync>>,
}

impl Diagnostic {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation_id: String::new(),
            fail_specification: String::new(),
            check_specification: String::new(),
            caller: String::new(),
            raised_at: Utc::now(),
            context: serde_json::json!({}),
            observed: None,
        }
    }

    pub fn with_operation(
        mut self,
        operation_id: impl Into<String>,
        fail_specification: impl Into<String>,
    ) -> Self {
        self.operation_id = operation_id.into();
        self.fail_specification = fail_specification.into();
        self
    }

    pub fn with_check(mut self, check_specification: impl Into<String>) -> Self {
        self.check_specification = check_specification.into();
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = caller.into();
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_observed(mut self, observed: Option<Arc<dyn Error + Send + Sync>>) -> Self {
        self.observed = observed;
        self
    }

    /// The fault a check observed, if this diagnostic nests one.
    pub fn observed(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.observed.as_deref()
    }

    pub fn format_terminal(&self) -> String {
        let mut s = format!("❌ [{}] {}\n", self.kind, self.message);
        s.push_str(&format!(
            "  operation: {} ({})\n",
            self.operation_id, self.fail_specification
        ));
        s.push_str(&format!("  check: {}\n", self.check_specification));
        s.push_str(&format!("  caller: {}\n", self.caller));

        if self.context.as_object().is_some_and(|o| !o.is_empty()) {
            if let Ok(json) = serde_json::to_string_pretty(&self.context) {
                for line in json.lines() {
                    s.push_str(&format!("  {}\n", line));
                }
            }
        }

        if let Some(observed) = &self.observed {
            s.push_str(&format!("\nCaused by:\n  {}\n", observed));
        }
        s
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.observed
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}
