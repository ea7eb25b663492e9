//! Fact records: Visa, Requirement, Evidence, Product
//!
//! Immutable structured inputs to the compliance engine. Visas describe the
//! legal requirements of an immigration route; products describe what an
//! insurance offering actually provides. Neither is mutated by evaluation.

use crate::error::VisacoverError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A citation substantiating a requirement's value.
///
/// Carried through into results verbatim; integrity checking of the cited
/// sources happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_id: String,
    /// Where in the source the claim lives (page, section, anchor).
    pub locator: String,
    pub excerpt: String,
}

/// The value of a legal requirement: a flag or an amount, semantics per key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementValue {
    Flag(bool),
    Amount(f64),
}

impl RequirementValue {
    pub fn is_true(&self) -> bool {
        matches!(self, RequirementValue::Flag(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, RequirementValue::Flag(false))
    }

    /// Numeric view; flags have no amount.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            RequirementValue::Amount(n) => Some(*n),
            RequirementValue::Flag(_) => None,
        }
    }
}

/// One named, evidenced legal condition a qualifying product must meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Dotted namespace key (ex: "insurance.no_deductible").
    pub key: String,
    pub value: RequirementValue,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

/// A jurisdiction's immigration/residency route and its insurance requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visa {
    /// Unique id, conventionally a 2-letter country prefix + route code
    /// (ex: "es-nlv").
    pub id: String,
    pub country: String,
    pub visa_name: String,
    pub route: String,
    /// Issuing authority the requirements were verified against.
    pub authority: String,
    pub last_verified: NaiveDate,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl Visa {
    /// Look up a requirement by exact key.
    ///
    /// Linear scan, first match wins — if a curated file carries duplicate
    /// keys, later entries never override earlier ones. Absence is a normal,
    /// frequent outcome and is distinct from a requirement whose value is
    /// `false`.
    pub fn requirement(&self, key: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.key == key)
    }

    /// Parse from JSON, rejecting contract violations before evaluation.
    pub fn from_json(text: &str) -> Result<Self, VisacoverError> {
        let visa: Visa = serde_json::from_str(text)?;
        if visa.id.trim().is_empty() {
            return Err(VisacoverError::Schema("visa id must be non-empty".into()));
        }
        Ok(visa)
    }
}

/// An insurance offering with a nested specification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub provider: String,
    pub product_name: String,
    /// Arbitrarily nested mapping: booleans, numbers, strings, sub-mappings.
    #[serde(default)]
    pub specs: Map<String, Value>,
}

impl Product {
    /// Navigate the spec tree by dot-separated path.
    ///
    /// Returns `None` as soon as any segment is missing or an intermediate
    /// node is not a mapping. Absence is the only failure mode: a malformed
    /// path never panics, and `None` is distinct from a present `false` or
    /// `0` leaf.
    pub fn spec(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.specs.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Parse from JSON, rejecting contract violations before evaluation.
    pub fn from_json(text: &str) -> Result<Self, VisacoverError> {
        let product: Product = serde_json::from_str(text)?;
        if product.id.trim().is_empty() {
            return Err(VisacoverError::Schema(
                "product id must be non-empty".into(),
            ));
        }
        Ok(product)
    }
}
