//! The evaluator: drives the rule chain and folds partial verdicts
//!
//! One call per (visa, product) pair. The fold is raise-only over the
//! severity ordering RED > UNKNOWN > YELLOW > GREEN; the terminal rule
//! short-circuits everything; a GREEN with unresolved facts degrades to
//! UNKNOWN at the end. Deterministic and idempotent.

use crate::rule::ComplianceRule;
use crate::rules::default_chain;
use crate::verdict::{MappingResult, Status};
use tracing::debug;
use visacover_core::{Product, Visa};

/// An ordered, read-only rule chain.
///
/// Built once at startup and reusable across threads; evaluation holds no
/// state between calls, so any number of pairs can be checked concurrently
/// against the same engine.
pub struct Engine {
    rules: Vec<Box<dyn ComplianceRule>>,
}

impl Engine {
    /// Engine over the standard twelve-rule chain.
    pub fn new() -> Self {
        Self::with_rules(default_chain())
    }

    /// Engine over a custom chain. The caller owns the ordering; terminal
    /// rules must come before anything they are meant to bypass.
    pub fn with_rules(rules: Vec<Box<dyn ComplianceRule>>) -> Self {
        Self { rules }
    }

    /// Evaluate one pair into its mapping result.
    pub fn evaluate(&self, visa: &Visa, product: &Product) -> MappingResult {
        let mut status = Status::Green;
        let mut reasons = Vec::new();
        let mut missing = Vec::new();

        for rule in &self.rules {
            let Some(outcome) = rule.check(visa, product) else {
                continue;
            };
            debug!(
                rule = rule.name(),
                visa = %visa.id,
                product = %product.id,
                status = %outcome.status,
                terminal = outcome.terminal,
                "rule fired"
            );

            if outcome.terminal {
                return MappingResult {
                    visa_id: visa.id.clone(),
                    product_id: product.id.clone(),
                    status: outcome.status,
                    reasons: outcome.reasons,
                    missing: outcome.missing,
                };
            }

            reasons.extend(outcome.reasons);
            missing.extend(outcome.missing);
            status.raise(outcome.status);
        }

        // Unresolved evidence can never yield a clean pass.
        if status == Status::Green && !missing.is_empty() {
            status = Status::Unknown;
        }

        MappingResult {
            visa_id: visa.id.clone(),
            product_id: product.id.clone(),
            status,
            reasons,
            missing,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{Reason, RuleOutcome};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use visacover_core::{Requirement, RequirementValue};

    fn visa(requirements: &[(&str, Value)]) -> Visa {
        Visa {
            id: "es-nlv".to_string(),
            country: "Spain".to_string(),
            visa_name: "Non-Lucrative Visa".to_string(),
            route: "non-lucrative".to_string(),
            authority: "Consulate General".to_string(),
            last_verified: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            requirements: requirements
                .iter()
                .map(|(key, value)| Requirement {
                    key: (*key).to_string(),
                    value: serde_json::from_value::<RequirementValue>(value.clone()).unwrap(),
                    evidence: vec![],
                })
                .collect(),
        }
    }

    fn product(specs: Value) -> Product {
        Product {
            id: "acme-health-plus".to_string(),
            provider: "Acme".to_string(),
            product_name: "Health Plus".to_string(),
            specs: specs.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn clean_pass_is_green_with_empty_reasons_and_missing() {
        let engine = Engine::new();
        let visa = visa(&[("insurance.no_deductible", json!(true))]);
        let result = engine.evaluate(&visa, &product(json!({"deductible": {"amount": 0}})));

        assert_eq!(result.status, Status::Green);
        assert!(result.reasons.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn violation_is_red_with_one_reason() {
        let engine = Engine::new();
        let visa = visa(&[("insurance.no_deductible", json!(true))]);
        let result = engine.evaluate(&visa, &product(json!({"deductible": {"amount": 50}})));

        assert_eq!(result.status, Status::Red);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn unresolved_fact_is_unknown_with_missing_path() {
        let engine = Engine::new();
        let visa = visa(&[("insurance.no_deductible", json!(true))]);
        let result = engine.evaluate(&visa, &product(json!({})));

        assert_eq!(result.status, Status::Unknown);
        assert!(result.reasons.is_empty());
        assert_eq!(result.missing, vec!["specs.deductible.amount".to_string()]);
    }

    #[test]
    fn terminal_rule_short_circuits_everything_else() {
        let engine = Engine::new();
        // Plenty of other requirements the product would fail hard.
        let visa = visa(&[
            ("insurance.mandatory", json!(false)),
            ("insurance.no_deductible", json!(true)),
            ("insurance.min_coverage", json!(1_000_000)),
        ]);
        let result = engine.evaluate(&visa, &product(json!({"deductible": {"amount": 500}})));

        assert_eq!(result.status, Status::NotRequired);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn red_beats_yellow_regardless_of_rule_order() {
        struct Fixed(&'static str, RuleOutcome);
        impl ComplianceRule for Fixed {
            fn name(&self) -> &'static str {
                self.0
            }
            fn check(&self, _: &Visa, _: &Product) -> Option<RuleOutcome> {
                Some(self.1.clone())
            }
        }

        let red = || RuleOutcome::red(Reason::new("hard fail", vec![]));
        let yellow = || RuleOutcome::yellow(Reason::new("caution", vec![]));
        let visa = visa(&[]);
        let bare = product(json!({}));

        for rules in [
            vec![
                Box::new(Fixed("red", red())) as Box<dyn ComplianceRule>,
                Box::new(Fixed("yellow", yellow())),
            ],
            vec![
                Box::new(Fixed("yellow", yellow())) as Box<dyn ComplianceRule>,
                Box::new(Fixed("red", red())),
            ],
        ] {
            let result = Engine::with_rules(rules).evaluate(&visa, &bare);
            assert_eq!(result.status, Status::Red);
            assert_eq!(result.reasons.len(), 2);
        }
    }

    #[test]
    fn reasons_and_missing_accumulate_in_chain_order() {
        let engine = Engine::new();
        let visa = visa(&[
            ("insurance.travel_insurance_accepted", json!(false)),
            ("insurance.no_deductible", json!(true)),
            ("insurance.no_copayment", json!(true)),
        ]);
        let result = engine.evaluate(
            &visa,
            &product(json!({"type": "travel", "copay": true})),
        );

        assert_eq!(result.status, Status::Red);
        // Chain order: travel rule reason before copay rule reason; the
        // deductible lookup lands in missing.
        assert!(result.reasons[0].text.contains("Travel insurance"));
        assert!(result.reasons[1].text.contains("co-payments"));
        assert_eq!(result.missing, vec!["specs.deductible.amount".to_string()]);
    }

    #[test]
    fn green_with_missing_degrades_to_unknown() {
        let engine = Engine::new();
        let visa = visa(&[
            ("insurance.comprehensive", json!(true)),
            ("insurance.no_copayment", json!(true)),
        ]);
        // Comprehensive passes cleanly; copay is unresolved.
        let result = engine.evaluate(&visa, &product(json!({"comprehensive": true})));

        assert_eq!(result.status, Status::Unknown);
        assert!(result.reasons.is_empty());
        assert_eq!(result.missing, vec!["specs.copay".to_string()]);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let engine = Engine::new();
        let visa = visa(&[
            ("insurance.no_deductible", json!(true)),
            ("insurance.min_coverage", json!(100_000)),
            ("insurance.must_cover_full_period", json!(true)),
        ]);
        let product = product(json!({
            "deductible": {"amount": 20},
            "payment_cadence": "monthly",
        }));

        let first = engine.evaluate(&visa, &product);
        let second = engine.evaluate(&visa, &product);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn monthly_cadence_under_full_period_is_yellow() {
        let engine = Engine::new();
        let visa = visa(&[("insurance.must_cover_full_period", json!(true))]);
        let result = engine.evaluate(&visa, &product(json!({"payment_cadence": "monthly"})));

        assert_eq!(result.status, Status::Yellow);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn unlimited_flag_alone_is_a_clean_pass() {
        let engine = Engine::new();
        let visa = visa(&[("insurance.unlimited_coverage", json!(true))]);
        let result = engine.evaluate(&visa, &product(json!({"unlimited": true})));

        assert_eq!(result.status, Status::Green);
        assert!(result.reasons.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = std::sync::Arc::new(Engine::new());
        let visa = visa(&[("insurance.no_deductible", json!(true))]);
        let product = product(json!({"deductible": {"amount": 0}}));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                let visa = visa.clone();
                let product = product.clone();
                std::thread::spawn(move || engine.evaluate(&visa, &product).status)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Status::Green);
        }
    }
}
