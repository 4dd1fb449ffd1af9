//! Static fail-operation descriptors.
//!
//! Every check/fail family supplies one [`FailDescriptor`] per fail
//! operation. The engine consumes a [`DescriptorTable`] built from those
//! descriptors and never needs type-specific logic.

use crate::errors::{ContractError, FailureKind};
use crate::synth::format::count_placeholders;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A reference to one substitution source.
///
/// `fu<N>`: fail-call argument, `cu<N>`: check-call argument,
/// `cx<N>`: check extra argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArgCode {
    FailArg(usize),
    CheckArg(usize),
    CheckExtra(usize),
}

impl ArgCode {
    pub fn parse_list<I, S>(codes: I) -> Result<Vec<ArgCode>, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes.into_iter().map(|c| c.as_ref().parse()).collect()
    }
}

impl FromStr for ArgCode {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ContractError::argument(format!("invalid argument code '{s}'"));
        if s.len() < 3 || !s.is_char_boundary(2) {
            return Err(invalid());
        }
        let (zone, index) = s.split_at(2);
        if !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index: usize = index.parse().map_err(|_| invalid())?;
        match zone {
            "fu" => Ok(ArgCode::FailArg(index)),
            "cu" => Ok(ArgCode::CheckArg(index)),
            "cx" => Ok(ArgCode::CheckExtra(index)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ArgCode {
    type Error = ContractError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ArgCode> for String {
    fn from(code: ArgCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for ArgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgCode::FailArg(n) => write!(f, "fu{n}"),
            ArgCode::CheckArg(n) => write!(f, "cu{n}"),
            ArgCode::CheckExtra(n) => write!(f, "cx{n}"),
        }
    }
}

/// Declared defaults for one fail operation.
///
/// All fields are `'static` so catalogues can be plain `static` arrays.
#[derive(Debug, Clone)]
pub struct FailDescriptor {
    /// Key for customizations, e.g. `object-null/fail`.
    pub operation_id: &'static str,
    pub fail_specification: &'static str,
    /// The one check specification this fail may close.
    pub linked_check_specification: &'static str,
    pub default_kind: FailureKind,
    /// `%s` per code in `default_argument_order`.
    pub default_format: &'static str,
    pub default_argument_order: &'static [ArgCode],
}

impl FailDescriptor {
    fn validate(&self) -> Result<(), ContractError> {
        for (field, value) in [
            ("operation_id", self.operation_id),
            ("fail_specification", self.fail_specification),
            (
                "linked_check_specification",
                self.linked_check_specification,
            ),
        ] {
            if value.trim().is_empty() {
                return Err(ContractError::argument(format!(
                    "descriptor {field} is empty (operation '{}')",
                    self.operation_id
                )));
            }
        }
        let placeholders = count_placeholders(self.default_format);
        if placeholders != self.default_argument_order.len() {
            return Err(ContractError::argument(format!(
                "descriptor '{}' format has {} placeholders but {} argument codes",
                self.operation_id,
                placeholders,
                self.default_argument_order.len()
            )));
        }
        Ok(())
    }
}

/// Lookup table from operation id to descriptor, and from check
/// specification to the single fail specification allowed to close it.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    by_operation: HashMap<&'static str, &'static FailDescriptor>,
    fail_for_check: HashMap<&'static str, &'static str>,
}

impl DescriptorTable {
    pub fn new(descriptors: &'static [FailDescriptor]) -> Result<Self, ContractError> {
        Self::from_catalogues(&[descriptors])
    }

    /// Merge several family catalogues into one table.
    pub fn from_catalogues(
        catalogues: &[&'static [FailDescriptor]],
    ) -> Result<Self, ContractError> {
        let mut table = Self::default();
        for descriptor in catalogues.iter().flat_map(|c| c.iter()) {
            table.insert(descriptor)?;
        }
        Ok(table)
    }

    fn insert(&mut self, descriptor: &'static FailDescriptor) -> Result<(), ContractError> {
        descriptor.validate()?;

        if self
            .by_operation
            .insert(descriptor.operation_id, descriptor)
            .is_some()
        {
            return Err(ContractError::argument(format!(
                "duplicate operation id '{}'",
                descriptor.operation_id
            )));
        }

        let linked = self
            .fail_for_check
            .entry(descriptor.linked_check_specification)
            .or_insert(descriptor.fail_specification);
        if *linked != descriptor.fail_specification {
            return Err(ContractError::argument(format!(
                "check '{}' is linked to both '{}' and '{}'",
                descriptor.linked_check_specification, linked, descriptor.fail_specification
            )));
        }
        Ok(())
    }

    pub fn operation(&self, operation_id: &str) -> Option<&'static FailDescriptor> {
        self.by_operation.get(operation_id).copied()
    }

    pub fn fail_specification_for(&self, check_specification: &str) -> Option<&'static str> {
        self.fail_for_check.get(check_specification).copied()
    }

    pub fn contains_operation(&self, operation_id: &str) -> bool {
        self.by_operation.contains_key(operation_id)
    }

    pub fn len(&self) -> usize {
        self.by_operation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operation.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static FailDescriptor> + '_ {
        self.by_operation.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static NULL_FAMILY: [FailDescriptor; 2] = [
        FailDescriptor {
            operation_id: "object-null/fail",
            fail_specification: "object-null-fail",
            linked_check_specification: "object-null",
            default_kind: FailureKind::NullValue,
            default_format: "%s: Object '%s' is null.",
            default_argument_order: &[ArgCode::FailArg(0), ArgCode::FailArg(1)],
        },
        FailDescriptor {
            operation_id: "object-null/fail-with-message",
            fail_specification: "object-null-fail",
            linked_check_specification: "object-null",
            default_kind: FailureKind::NullValue,
            default_format: "%s: Object '%s' is null. %s",
            default_argument_order: &[
                ArgCode::FailArg(0),
                ArgCode::FailArg(1),
                ArgCode::FailArg(2),
            ],
        },
    ];

    static MISCOUNTED: [FailDescriptor; 1] = [FailDescriptor {
        operation_id: "bad/fail",
        fail_specification: "bad-fail",
        linked_check_specification: "bad",
        default_kind: FailureKind::InvalidState,
        default_format: "%s %s",
        default_argument_order: &[ArgCode::FailArg(0)],
    }];

    static CONFLICTING: [FailDescriptor; 1] = [FailDescriptor {
        operation_id: "object-null/other",
        fail_specification: "other-fail",
        linked_check_specification: "object-null",
        default_kind: FailureKind::NullValue,
        default_format: "%s",
        default_argument_order: &[ArgCode::FailArg(0)],
    }];

    #[test]
    fn parses_and_renders_codes() {
        assert_eq!("fu0".parse::<ArgCode>().unwrap(), ArgCode::FailArg(0));
        assert_eq!("cu12".parse::<ArgCode>().unwrap(), ArgCode::CheckArg(12));
        assert_eq!("cx3".parse::<ArgCode>().unwrap(), ArgCode::CheckExtra(3));
        assert_eq!(ArgCode::CheckExtra(3).to_string(), "cx3");
        for bad in ["", "fu", "xx1", "fu-1", "fu+1", "cu1a", "éu1"] {
            assert!(bad.parse::<ArgCode>().is_err(), "{bad} should not parse");
        }
        let list = ArgCode::parse_list(["fu1", "cu0"]).unwrap();
        assert_eq!(list, vec![ArgCode::FailArg(1), ArgCode::CheckArg(0)]);
    }

    #[test]
    fn codes_deserialize_from_strings() {
        let codes: Vec<ArgCode> = serde_yaml::from_str("[fu0, cx1]").unwrap();
        assert_eq!(codes, vec![ArgCode::FailArg(0), ArgCode::CheckExtra(1)]);
        assert!(serde_yaml::from_str::<Vec<ArgCode>>("[zz0]").is_err());
    }

    #[test]
    fn table_links_check_to_single_fail_specification() {
        let table = DescriptorTable::new(&NULL_FAMILY).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.fail_specification_for("object-null"),
            Some("object-null-fail")
        );
        assert!(table.operation("object-null/fail").is_some());
        assert!(table.operation("missing").is_none());
    }

    #[test]
    fn table_rejects_inconsistent_descriptors() {
        assert!(matches!(
            DescriptorTable::new(&MISCOUNTED),
            Err(ContractError::Argument(_))
        ));
        assert!(DescriptorTable::from_catalogues(&[&NULL_FAMILY, &CONFLICTING]).is_err());
        assert!(DescriptorTable::from_catalogues(&[&NULL_FAMILY, &NULL_FAMILY]).is_err());
    }
}
