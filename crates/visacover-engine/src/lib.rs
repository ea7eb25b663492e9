//! Visacover Engine: Compliance Rule Chain and Evaluator
//!
//! Decides whether an insurance product satisfies the documented legal
//! requirements of a visa route, producing a traffic-light verdict with
//! evidence-linked reasons.
//!
//! # Architecture
//!
//! ```text
//! (Visa, Product) → Rule Chain (fixed order) → partial verdicts → fold
//!                        ↓                           ↓              ↓
//!                 terminal rule?              reasons/missing    severity
//!                        ↓                           ↓              ↓
//!                  NOT_REQUIRED ──────────────► MappingResult ◄────┘
//! ```
//!
//! Each rule is gated by one requirement key; a visa that never mentions the
//! condition leaves the rule silent. The fold only ever raises severity
//! (RED > UNKNOWN > YELLOW > GREEN), and a GREEN with unresolved product
//! facts degrades to UNKNOWN.
//!
//! # Example
//!
//! ```
//! use visacover_core::{Product, Visa};
//! use visacover_engine::{evaluate, Status};
//!
//! let visa = Visa::from_json(r#"{
//!     "id": "es-nlv",
//!     "country": "Spain",
//!     "visa_name": "Non-Lucrative Visa",
//!     "route": "non-lucrative",
//!     "authority": "Consulate General",
//!     "last_verified": "2026-03-14",
//!     "requirements": [
//!         {"key": "insurance.no_deductible", "value": true, "evidence": []}
//!     ]
//! }"#).unwrap();
//!
//! let product = Product::from_json(r#"{
//!     "id": "acme-health-plus",
//!     "provider": "Acme",
//!     "product_name": "Health Plus",
//!     "specs": {"deductible": {"amount": 0}}
//! }"#).unwrap();
//!
//! let result = evaluate(&visa, &product);
//! assert_eq!(result.status, Status::Green);
//! assert!(result.missing.is_empty());
//! ```

pub mod engine;
pub mod rule;
pub mod rules;
pub mod verdict;

// Core types
pub use verdict::{MappingResult, Reason, RuleOutcome, Status};

// Rule contract and the standard chain
pub use rule::ComplianceRule;
pub use rules::{
    default_chain, AuthorizedInJurisdiction, ComprehensiveCoverage,
    CoversPublicHealthSystemRisks, MandatoryInsurance, MinimumCoverage,
    MonthlyPaymentsAccepted, MustCoverFullPeriod, NoCopayment, NoDeductible,
    NoMoratorium, TravelInsuranceAccepted, UnlimitedCoverage,
};

// Evaluator
pub use engine::Engine;

use visacover_core::{Product, Visa};

/// Evaluate one (visa, product) pair against the standard rule chain.
///
/// Convenience for one-off calls; construct an [`Engine`] once when
/// evaluating many pairs.
pub fn evaluate(visa: &Visa, product: &Product) -> MappingResult {
    Engine::new().evaluate(visa, product)
}
