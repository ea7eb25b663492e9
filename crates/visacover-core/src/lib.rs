//! Visacover Core: Fact Records and Lookup Primitives
//!
//! The structured inputs of the compliance engine — visas with their evidenced
//! legal requirements, and products with their nested specification trees —
//! plus the two lookups every rule is built from: requirement-by-key and
//! spec-by-dotted-path. Both treat absence as a normal outcome, distinct from
//! an explicit `false` or `0`.
//!
//! Nothing in this crate performs I/O; the parse entry points take JSON text
//! supplied by the caller and fail fast on contract violations.

pub mod error;
pub mod model;

pub use error::VisacoverError;
pub use model::{Evidence, Product, Requirement, RequirementValue, Visa};
