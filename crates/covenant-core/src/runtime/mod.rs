//! Runtime check → fail pairing.
//!
//! ```text
//! ┌──────────────┐  asserts   ┌──────────────────┐  fail<Op>  ┌────────────────────┐
//! │   Checker    │──────────▶│ ContractRegistry │──────────▶│ MessageSynthesizer │
//! │ (predicate)  │   push     │  (per thread)    │   pop      │  resolve + format  │
//! └──────────────┘            └──────────────────┘            └─────────┬──────────┘
//!                                                                        │
//!                                                              Diagnostic raised
//! ```

mod contract_registry;

pub use contract_registry::ContractRegistry;
