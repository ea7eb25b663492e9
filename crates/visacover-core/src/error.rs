//! Unified Error Model
use thiserror::Error;

/// Errors raised at the parsing boundary, before any evaluation happens.
///
/// The engine itself never fails: a well-formed `Visa`/`Product` pair always
/// yields a well-formed result. These errors exist to reject caller contract
/// violations loudly instead of letting them reach the rule chain.
#[derive(Error, Debug)]
pub enum VisacoverError {
    #[error("PARSE/{0}")]
    Parse(#[from] serde_json::Error),

    #[error("SCHEMA/{0}")]
    Schema(String),
}
