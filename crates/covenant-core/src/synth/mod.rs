//! Diagnostic message synthesis.
//!
//! Resolution order for kind, format and argument order is always
//! contract override, then registered override, then declared default.

pub mod format;

use crate::contract::{Contract, Value};
use crate::customization::CustomizationRegistry;
use crate::descriptor::{ArgCode, FailDescriptor};
use crate::errors::{ContractError, FailureKind};
use std::borrow::Cow;
use tracing::debug;

/// Effective settings for one fail call, before substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub kind: FailureKind,
    pub format: Cow<'a, str>,
    pub argument_order: Cow<'a, [ArgCode]>,
    pub postfix: Option<&'a str>,
}

/// The synthesized kind and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub kind: FailureKind,
    pub message: String,
}

pub struct MessageSynthesizer<'r> {
    customizations: &'r CustomizationRegistry,
}

impl<'r> MessageSynthesizer<'r> {
    pub fn new(customizations: &'r CustomizationRegistry) -> Self {
        Self { customizations }
    }

    pub fn resolve<'a>(
        &self,
        descriptor: &'a FailDescriptor,
        contract: &'a Contract,
    ) -> Resolution<'a> {
        let op = descriptor.operation_id;

        let kind = contract
            .custom_kind()
            .cloned()
            .or_else(|| self.customizations.exception_kind(op))
            .unwrap_or_else(|| descriptor.default_kind.clone());

        let format = match contract.custom_format() {
            Some(f) => Cow::Borrowed(f),
            None => self
                .customizations
                .message_format(op)
                .map_or(Cow::Borrowed(descriptor.default_format), Cow::Owned),
        };

        let argument_order = match contract.custom_argument_order() {
            Some(o) => Cow::Borrowed(o),
            None => self
                .customizations
                .message_argument_order(op)
                .map_or(Cow::Borrowed(descriptor.default_argument_order), Cow::Owned),
        };

        Resolution {
            kind,
            format,
            argument_order,
            postfix: contract.custom_postfix(),
        }
    }

    /// Resolve and substitute. `fail_args` are the fail-call values, `fu0` first.
    pub fn synthesize(
        &self,
        descriptor: &FailDescriptor,
        contract: &Contract,
        fail_args: &[Value],
    ) -> Result<Synthesis, ContractError> {
        let resolution = self.resolve(descriptor, contract);

        let values = resolution
            .argument_order
            .iter()
            .map(|code| lookup(*code, fail_args, contract))
            .collect::<Result<Vec<_>, _>>()?;

        let mut message = format::substitute(&resolution.format, &values)?;
        if let Some(postfix) = resolution.postfix {
            message.push(' ');
            message.push_str(postfix);
        }

        debug!(
            operation = descriptor.operation_id,
            kind = %resolution.kind,
            codes = resolution.argument_order.len(),
            "synthesized diagnostic message"
        );

        Ok(Synthesis {
            kind: resolution.kind,
            message,
        })
    }
}

fn lookup<'a>(
    code: ArgCode,
    fail_args: &'a [Value],
    contract: &'a Contract,
) -> Result<&'a Value, ContractError> {
    let (zone, index) = match code {
        ArgCode::FailArg(i) => (fail_args, i),
        ArgCode::CheckArg(i) => (contract.check_arguments(), i),
        ArgCode::CheckExtra(i) => (contract.check_extra_arguments(), i),
    };
    zone.get(index).ok_or_else(|| {
        ContractError::argument(format!(
            "argument code {code} is out of range ({} values available)",
            zone.len()
        ))
    })
}
