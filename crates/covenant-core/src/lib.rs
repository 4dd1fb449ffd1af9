//! Design-by-contract check → fail engine.
//!
//! A check evaluates a predicate; when it asserts, a [`Contract`] is pushed
//! for the current thread and the caller must invoke the linked fail
//! operation next. The fail pops the contract, synthesizes a message from
//! layered overrides and raises a [`Diagnostic`].

pub mod config;
pub mod contract;
pub mod customization;
pub mod descriptor;
pub mod engine;
pub mod errors;
pub mod runtime;
pub mod synth;

pub use config::EngineConfig;
pub use contract::{Caller, CheckCall, Contract, Value};
pub use customization::{Customization, CustomizationRegistry};
pub use descriptor::{ArgCode, DescriptorTable, FailDescriptor};
pub use engine::Engine;
pub use errors::{ContractError, Diagnostic, FailureKind, ProtocolViolation};
pub use runtime::ContractRegistry;
pub use synth::{MessageSynthesizer, Synthesis};
