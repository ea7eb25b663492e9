//! The twelve concrete compliance rules
//!
//! Each rule is gated by one requirement key on the visa. All but one are
//! gate-when-unmet checks: RED when the product demonstrably violates the
//! requirement, UNKNOWN when the deciding product fact cannot be resolved,
//! not applicable otherwise. The exceptions are `MandatoryInsurance` (the
//! terminal rule) and `MustCoverFullPeriod` (YELLOW only).
//!
//! Rule texts cite the visa requirement's evidence so downstream rendering
//! can link every reason back to its source.

use crate::rule::ComplianceRule;
use crate::verdict::{Reason, RuleOutcome};
use serde_json::Value;
use visacover_core::{Product, Requirement, Visa};

/// Payment cadences treated as monthly subscriptions.
const MONTHLY_CADENCES: [&str; 2] = ["monthly", "every_4_weeks"];

/// Coverage limits at or above this are considered effectively unlimited.
const UNLIMITED_FLOOR: f64 = 10_000_000.0;

/// The requirement gating a rule, but only when its value is `true`.
fn required_flag<'a>(visa: &'a Visa, key: &str) -> Option<&'a Requirement> {
    visa.requirement(key).filter(|r| r.value.is_true())
}

/// The requirement gating a rule, but only when its value is `false`.
fn forbidden_flag<'a>(visa: &'a Visa, key: &str) -> Option<&'a Requirement> {
    visa.requirement(key).filter(|r| r.value.is_false())
}

fn is_monthly_cadence(cadence: &str) -> bool {
    MONTHLY_CADENCES.contains(&cadence)
}

/// Shared body of the boolean-spec gate rules: UNKNOWN when the fact is
/// absent, RED only on an explicit `false`.
fn check_flag_spec(
    product: &Product,
    req: &Requirement,
    path: &str,
    red_text: &str,
) -> Option<RuleOutcome> {
    match product.spec(path) {
        None => Some(RuleOutcome::unknown(format!("specs.{path}"))),
        Some(value) if value.as_bool() == Some(false) => Some(RuleOutcome::red(Reason::new(
            red_text,
            req.evidence.clone(),
        ))),
        _ => None,
    }
}

/// Terminal rule: a visa that does not require insurance ends the chain.
pub struct MandatoryInsurance;

impl ComplianceRule for MandatoryInsurance {
    fn name(&self) -> &'static str {
        "MandatoryInsurance"
    }

    fn check(&self, visa: &Visa, _product: &Product) -> Option<RuleOutcome> {
        let req = forbidden_flag(visa, "insurance.mandatory")?;
        Some(RuleOutcome::not_required(Reason::new(
            "Visa does not require insurance",
            req.evidence.clone(),
        )))
    }
}

/// Rejects travel-type products where the route refuses travel insurance.
pub struct TravelInsuranceAccepted;

impl ComplianceRule for TravelInsuranceAccepted {
    fn name(&self) -> &'static str {
        "TravelInsuranceAccepted"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = forbidden_flag(visa, "insurance.travel_insurance_accepted")?;
        let Some(product_type) = product.spec("type") else {
            return Some(RuleOutcome::unknown("specs.type"));
        };
        let label = match product_type.as_str() {
            Some(text) => text.to_lowercase(),
            None => product_type.to_string().to_lowercase(),
        };
        if label.contains("travel") {
            return Some(RuleOutcome::red(Reason::new(
                "Travel insurance is not accepted for this visa",
                req.evidence.clone(),
            )));
        }
        None
    }
}

/// Checks that the insurer is authorized in the visa's jurisdiction.
///
/// The two-letter jurisdiction code comes from the visa id prefix, so the
/// rule works for any route: a visa `es-nlv` is gated by
/// `insurance.authorized_in_es` and consults
/// `specs.jurisdiction_facts.ES.authorized`.
pub struct AuthorizedInJurisdiction;

impl AuthorizedInJurisdiction {
    fn jurisdiction_code(visa: &Visa) -> Option<String> {
        let code: String = visa
            .id
            .chars()
            .take(2)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        (code.chars().count() == 2).then_some(code)
    }
}

impl ComplianceRule for AuthorizedInJurisdiction {
    fn name(&self) -> &'static str {
        "AuthorizedInJurisdiction"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let code = Self::jurisdiction_code(visa)?;
        let key = format!("insurance.authorized_in_{}", code.to_lowercase());
        let req = required_flag(visa, &key)?;

        let path = format!("jurisdiction_facts.{code}.authorized");
        match product.spec(&path) {
            None => Some(RuleOutcome::unknown(format!("specs.{path}"))),
            Some(value) if value.as_bool() == Some(false) => {
                Some(RuleOutcome::red(Reason::new(
                    format!("Insurer not authorized to operate in {}", visa.country),
                    req.evidence.clone(),
                )))
            }
            _ => None,
        }
    }
}

/// Requires a zero deductible when the route demands one.
pub struct NoDeductible;

impl ComplianceRule for NoDeductible {
    fn name(&self) -> &'static str {
        "NoDeductible"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.no_deductible")?;
        match product.spec("deductible.amount").and_then(Value::as_f64) {
            None => Some(RuleOutcome::unknown("specs.deductible.amount")),
            Some(amount) if amount > 0.0 => Some(RuleOutcome::red(Reason::new(
                format!("Visa requires zero deductible but product has {amount}"),
                req.evidence.clone(),
            ))),
            _ => None,
        }
    }
}

/// Requires the product to be a comprehensive policy.
pub struct ComprehensiveCoverage;

impl ComplianceRule for ComprehensiveCoverage {
    fn name(&self) -> &'static str {
        "ComprehensiveCoverage"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.comprehensive")?;
        check_flag_spec(
            product,
            req,
            "comprehensive",
            "Comprehensive coverage required",
        )
    }
}

/// Requires cover for the risks the public health system would insure.
pub struct CoversPublicHealthSystemRisks;

impl ComplianceRule for CoversPublicHealthSystemRisks {
    fn name(&self) -> &'static str {
        "CoversPublicHealthSystemRisks"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.covers_public_health_system_risks")?;
        check_flag_spec(
            product,
            req,
            "covers_public_health_system_risks",
            "Visa requires coverage of public health system risks",
        )
    }
}

/// Requires unlimited coverage; a true `unlimited` flag alone satisfies it.
pub struct UnlimitedCoverage;

impl ComplianceRule for UnlimitedCoverage {
    fn name(&self) -> &'static str {
        "UnlimitedCoverage"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.unlimited_coverage")?;

        let limit = product.spec("overall_limit").and_then(Value::as_f64);
        let unlimited = product.spec("unlimited").and_then(Value::as_bool);

        if unlimited == Some(true) {
            return None;
        }
        if limit.is_none() && unlimited.is_none() {
            return Some(RuleOutcome::unknown("specs.overall_limit or specs.unlimited"));
        }
        if unlimited == Some(false) || limit.is_some_and(|l| l < UNLIMITED_FLOOR) {
            let text = match limit {
                Some(l) => format!("Unlimited coverage required, product has limit of {l}"),
                None => "Unlimited coverage required, product coverage is capped".to_string(),
            };
            return Some(RuleOutcome::red(Reason::new(text, req.evidence.clone())));
        }
        None
    }
}

/// Requires a product with no co-payments.
pub struct NoCopayment;

impl ComplianceRule for NoCopayment {
    fn name(&self) -> &'static str {
        "NoCopayment"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.no_copayment")?;
        match product.spec("copay") {
            None => Some(RuleOutcome::unknown("specs.copay")),
            Some(value) if value.as_bool() == Some(true) => Some(RuleOutcome::red(Reason::new(
                "No co-payments required, product has co-payments",
                req.evidence.clone(),
            ))),
            _ => None,
        }
    }
}

/// Requires a product with no moratorium/waiting period.
pub struct NoMoratorium;

impl ComplianceRule for NoMoratorium {
    fn name(&self) -> &'static str {
        "NoMoratorium"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.no_moratorium")?;
        match product.spec("moratorium_days").and_then(Value::as_f64) {
            None => Some(RuleOutcome::unknown("specs.moratorium_days")),
            Some(days) if days > 0.0 => Some(RuleOutcome::red(Reason::new(
                format!("No moratorium required, product has {days} day waiting period"),
                req.evidence.clone(),
            ))),
            _ => None,
        }
    }
}

/// Compares the product's overall limit against the required minimum.
///
/// The only rule gated purely by presence: any `insurance.min_coverage`
/// requirement makes it applicable, whatever its value.
pub struct MinimumCoverage;

impl ComplianceRule for MinimumCoverage {
    fn name(&self) -> &'static str {
        "MinimumCoverage"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = visa.requirement("insurance.min_coverage")?;
        // A flag-valued minimum gives no threshold to compare against.
        let minimum = req.value.as_amount()?;

        match product.spec("overall_limit").and_then(Value::as_f64) {
            None => Some(RuleOutcome::unknown("specs.overall_limit")),
            Some(limit) if limit < minimum => Some(RuleOutcome::red(Reason::new(
                format!("Minimum coverage {minimum} required, product has {limit}"),
                req.evidence.clone(),
            ))),
            _ => None,
        }
    }
}

/// Rejects monthly-billed products where the authority refuses them.
pub struct MonthlyPaymentsAccepted;

impl ComplianceRule for MonthlyPaymentsAccepted {
    fn name(&self) -> &'static str {
        "MonthlyPaymentsAccepted"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = forbidden_flag(visa, "insurance.monthly_payments_accepted")?;
        match product.spec("payment_cadence") {
            None => Some(RuleOutcome::unknown("specs.payment_cadence")),
            Some(cadence) if cadence.as_str().is_some_and(is_monthly_cadence) => {
                Some(RuleOutcome::red(Reason::new(
                    "Monthly payments not accepted by visa authority",
                    req.evidence.clone(),
                )))
            }
            _ => None,
        }
    }
}

/// Flags monthly subscriptions where the stay must be covered up front.
///
/// Never RED and never UNKNOWN: a cancellable subscription is a caution,
/// not a documented violation.
pub struct MustCoverFullPeriod;

impl ComplianceRule for MustCoverFullPeriod {
    fn name(&self) -> &'static str {
        "MustCoverFullPeriod"
    }

    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome> {
        let req = required_flag(visa, "insurance.must_cover_full_period")?;
        let cadence = product.spec("payment_cadence")?;
        if cadence.as_str().is_some_and(is_monthly_cadence) {
            return Some(RuleOutcome::yellow(Reason::new(
                "Visa requires coverage for full legal stay, monthly subscriptions can be cancelled",
                req.evidence.clone(),
            )));
        }
        None
    }
}

/// The standard chain, in evaluation order.
///
/// Only the position of the terminal `MandatoryInsurance` rule is
/// load-bearing: it must run first so NOT_REQUIRED short-circuits before any
/// other rule can contribute. The rest of the order fixes reason/missing
/// ordering in the output but not the final status.
pub fn default_chain() -> Vec<Box<dyn ComplianceRule>> {
    vec![
        Box::new(MandatoryInsurance),
        Box::new(TravelInsuranceAccepted),
        Box::new(AuthorizedInJurisdiction),
        Box::new(NoDeductible),
        Box::new(ComprehensiveCoverage),
        Box::new(CoversPublicHealthSystemRisks),
        Box::new(UnlimitedCoverage),
        Box::new(NoCopayment),
        Box::new(NoMoratorium),
        Box::new(MinimumCoverage),
        Box::new(MonthlyPaymentsAccepted),
        Box::new(MustCoverFullPeriod),
    ]
}
