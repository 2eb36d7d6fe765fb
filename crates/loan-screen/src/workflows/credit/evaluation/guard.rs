use super::super::domain::{ApplicantRecord, CreditHistory, DecisionOutcome, DecisionSource};
use super::config::EvaluationConfig;

/// Hard policy floor checked before the classifier: credit issues combined with income below
/// the floor always reject.
pub(crate) fn policy_rejection(
    applicant: &ApplicantRecord,
    config: &EvaluationConfig,
) -> Option<DecisionOutcome> {
    let issues = applicant.credit_history == CreditHistory::IssuesPresent;
    if issues && applicant.monthly_income < config.income_floor {
        return Some(DecisionOutcome {
            approved: false,
            confidence: config.guard_confidence.clamp(0.0, 100.0),
            source: DecisionSource::PolicyGuard,
        });
    }

    None
}
