//! Verdict types for compliance evaluation
//!
//! Provides the traffic-light status enum, evidence-linked reasons, partial
//! rule outcomes, and the final per-pair mapping result.

use serde::{Deserialize, Serialize};
use std::fmt;
use visacover_core::Evidence;

/// The traffic-light verdict for a (visa, product) pair.
///
/// Severity is ordered `RED > UNKNOWN > YELLOW > GREEN`; the fold only ever
/// raises it. `NOT_REQUIRED` sits outside the ordering: it is produced solely
/// by the terminal rule and returned verbatim, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotRequired,
    Green,
    Yellow,
    Unknown,
    Red,
}

impl Status {
    /// Severity rank used by the merge fold. Higher never yields to lower.
    fn severity(self) -> u8 {
        match self {
            Status::Green => 0,
            Status::Yellow => 1,
            Status::Unknown => 2,
            Status::Red => 3,
            // Terminal-only; short-circuits before any fold can see it.
            Status::NotRequired => 4,
        }
    }

    /// Raise `self` to `other` if `other` is more severe.
    ///
    /// This is the whole merge rule: a YELLOW arriving after a RED or
    /// UNKNOWN changes nothing, and no rule can ever lower severity.
    pub fn raise(&mut self, other: Status) {
        if other.severity() > self.severity() {
            *self = other;
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Status::NotRequired => "NOT_REQUIRED",
            Status::Green => "GREEN",
            Status::Yellow => "YELLOW",
            Status::Unknown => "UNKNOWN",
            Status::Red => "RED",
        };
        write!(f, "{}", label)
    }
}

/// One human-readable reason, carrying the evidence of the requirement that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub text: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl Reason {
    pub fn new(text: impl Into<String>, evidence: Vec<Evidence>) -> Self {
        Self {
            text: text.into(),
            evidence,
        }
    }
}

/// A partial verdict contributed by one rule.
///
/// Rules that do not apply return no outcome at all; an outcome always means
/// the rule fired. `terminal` outcomes stop the chain and become the final
/// result verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub status: Status,
    pub reasons: Vec<Reason>,
    pub missing: Vec<String>,
    pub terminal: bool,
}

impl RuleOutcome {
    /// A failed check with an evidenced reason.
    pub fn red(reason: Reason) -> Self {
        Self {
            status: Status::Red,
            reasons: vec![reason],
            missing: Vec::new(),
            terminal: false,
        }
    }

    /// A soft warning with an evidenced reason.
    pub fn yellow(reason: Reason) -> Self {
        Self {
            status: Status::Yellow,
            reasons: vec![reason],
            missing: Vec::new(),
            terminal: false,
        }
    }

    /// An unresolved product fact at the given spec path.
    pub fn unknown(missing_path: impl Into<String>) -> Self {
        Self {
            status: Status::Unknown,
            reasons: Vec::new(),
            missing: vec![missing_path.into()],
            terminal: false,
        }
    }

    /// The terminal short-circuit: insurance is not required at all.
    pub fn not_required(reason: Reason) -> Self {
        Self {
            status: Status::NotRequired,
            reasons: vec![reason],
            missing: Vec::new(),
            terminal: true,
        }
    }
}

/// The engine's sole output: one verdict per (visa, product) pair.
///
/// A pure function of its two inputs — no hidden state, no history. `reasons`
/// and `missing` are append-only in rule-then-declaration order, so repeated
/// evaluation yields byte-identical serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub visa_id: String,
    pub product_id: String,
    pub status: Status,
    #[serde(default)]
    pub reasons: Vec<Reason>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl fmt::Display for MappingResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}__{}: {}",
            self.visa_id, self.product_id, self.status
        )?;
        if !self.reasons.is_empty() {
            write!(f, " ({} reasons)", self.reasons.len())?;
        }
        if !self.missing.is_empty() {
            write!(f, " ({} missing)", self.missing.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_raise_only_goes_up() {
        let mut status = Status::Green;
        status.raise(Status::Yellow);
        assert_eq!(status, Status::Yellow);

        status.raise(Status::Red);
        assert_eq!(status, Status::Red);

        // A later YELLOW or UNKNOWN never downgrades a RED.
        status.raise(Status::Yellow);
        status.raise(Status::Unknown);
        assert_eq!(status, Status::Red);
    }

    #[test]
    fn status_yellow_does_not_displace_unknown() {
        let mut status = Status::Unknown;
        status.raise(Status::Yellow);
        assert_eq!(status, Status::Unknown);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Status::NotRequired).unwrap(),
            "\"NOT_REQUIRED\""
        );
        assert_eq!(serde_json::to_string(&Status::Green).unwrap(), "\"GREEN\"");

        let parsed: Status = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert_eq!(parsed, Status::Unknown);
    }

    #[test]
    fn outcome_constructors() {
        let red = RuleOutcome::red(Reason::new("limit too low", vec![]));
        assert_eq!(red.status, Status::Red);
        assert!(!red.terminal);
        assert!(red.missing.is_empty());

        let unknown = RuleOutcome::unknown("specs.overall_limit");
        assert_eq!(unknown.status, Status::Unknown);
        assert!(unknown.reasons.is_empty());
        assert_eq!(unknown.missing, vec!["specs.overall_limit".to_string()]);

        let terminal = RuleOutcome::not_required(Reason::new("not required", vec![]));
        assert!(terminal.terminal);
        assert_eq!(terminal.status, Status::NotRequired);
    }

    #[test]
    fn mapping_result_serialization_contract() {
        let result = MappingResult {
            visa_id: "es-nlv".to_string(),
            product_id: "acme-health-plus".to_string(),
            status: Status::Unknown,
            reasons: vec![],
            missing: vec!["specs.deductible.amount".to_string()],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "UNKNOWN");
        assert_eq!(json["missing"][0], "specs.deductible.amount");

        let back: MappingResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn mapping_result_display() {
        let result = MappingResult {
            visa_id: "es-nlv".to_string(),
            product_id: "acme".to_string(),
            status: Status::Red,
            reasons: vec![Reason::new("bad", vec![])],
            missing: vec![],
        };
        let rendered = format!("{}", result);
        assert!(rendered.contains("es-nlv__acme"));
        assert!(rendered.contains("RED"));
        assert!(rendered.contains("1 reasons"));
    }
}
