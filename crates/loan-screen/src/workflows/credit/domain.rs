use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Similarity function used by the support-vector classifier. Each kernel is trained and
/// persisted as its own artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    #[serde(alias = "polynomial")]
    Poly,
    Rbf,
}

impl Kernel {
    pub const ALL: [Kernel; 3] = [Kernel::Linear, Kernel::Poly, Kernel::Rbf];

    pub fn label(&self) -> &'static str {
        match self {
            Kernel::Linear => "Linear",
            Kernel::Poly => "Polynomial",
            Kernel::Rbf => "RBF",
        }
    }

    /// Short identifier used in artifact names and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Poly => "poly",
            Kernel::Rbf => "rbf",
        }
    }

    pub fn artifact_file_name(&self) -> String {
        format!("svm_{}.json", self.slug())
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a kernel name cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kernel '{0}' (expected linear, poly or rbf)")]
pub struct UnknownKernel(pub String);

impl FromStr for Kernel {
    type Err = UnknownKernel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Kernel::Linear),
            "poly" | "polynomial" => Ok(Kernel::Poly),
            "rbf" | "gaussian" => Ok(Kernel::Rbf),
            _ => Err(UnknownKernel(value.to_string())),
        }
    }
}

/// Credit record as reported by the bureau check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditHistory {
    #[serde(alias = "clean_history")]
    Clean,
    #[serde(alias = "issues")]
    IssuesPresent,
}

impl CreditHistory {
    /// Encoding used by the `Credit_History` training column.
    pub fn feature_value(&self) -> f64 {
        match self {
            CreditHistory::Clean => 1.0,
            CreditHistory::IssuesPresent => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CreditHistory::Clean => "Clean History",
            CreditHistory::IssuesPresent => "Issues Present",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Salaried,
    #[serde(alias = "self-employed")]
    SelfEmployed,
}

impl EmploymentType {
    /// Encoding used by the `Self_Employed` training column.
    pub fn self_employed_flag(&self) -> &'static str {
        match self {
            EmploymentType::Salaried => "No",
            EmploymentType::SelfEmployed => "Yes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::Salaried => "Salaried",
            EmploymentType::SelfEmployed => "Self-Employed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyArea {
    Urban,
    Semiurban,
    Rural,
}

impl PropertyArea {
    /// Category spelling used by the `Property_Area` training column.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyArea::Urban => "Urban",
            PropertyArea::Semiurban => "Semiurban",
            PropertyArea::Rural => "Rural",
        }
    }
}

/// Caller-supplied attributes for one loan applicant.
///
/// Monthly income and loan amount are accepted as-is; range checks beyond non-negativity
/// belong to the presentation boundary (see [`ApplicantRecord::validate`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub monthly_income: f64,
    pub loan_amount: f64,
    pub credit_history: CreditHistory,
    pub employment: EmploymentType,
    pub property_area: PropertyArea,
}

impl ApplicantRecord {
    /// Constraints enforced by the form and API surfaces before evaluation.
    pub fn validate(&self) -> Result<(), InputError> {
        check_amount("monthly_income", self.monthly_income)?;
        check_amount("loan_amount", self.loan_amount)?;
        Ok(())
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field, value });
    }
    Ok(())
}

/// Rejected applicant input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
}

/// Which step of the evaluation produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionSource {
    PolicyGuard,
    Model { kernel: Kernel },
}

impl DecisionSource {
    pub fn label(&self) -> String {
        match self {
            DecisionSource::PolicyGuard => "policy guard".to_string(),
            DecisionSource::Model { kernel } => format!("{} SVM", kernel.label()),
        }
    }
}

/// Approval decision and confidence percentage for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub approved: bool,
    pub confidence: f64,
    pub source: DecisionSource,
}

impl DecisionOutcome {
    pub fn decision_label(&self) -> &'static str {
        if self.approved {
            "APPROVED"
        } else {
            "REJECTED"
        }
    }

    pub fn risk_level(&self) -> &'static str {
        if self.approved {
            "low risk"
        } else {
            "high risk"
        }
    }

    /// Static explanation shown next to the decision.
    pub fn insight(&self) -> String {
        format!(
            "The system categorized this applicant as {} based on income stability, credit behavior, and residential profile.",
            self.risk_level()
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{} by {} with {:.1}% confidence",
            self.decision_label().to_ascii_lowercase(),
            self.source.label(),
            self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_parses_cli_and_dashboard_spellings() {
        assert_eq!("Linear".parse::<Kernel>(), Ok(Kernel::Linear));
        assert_eq!("Polynomial".parse::<Kernel>(), Ok(Kernel::Poly));
        assert_eq!(" rbf ".parse::<Kernel>(), Ok(Kernel::Rbf));
        assert!("sigmoid".parse::<Kernel>().is_err());
    }

    #[test]
    fn kernel_artifacts_are_distinct() {
        let names: Vec<String> = Kernel::ALL
            .iter()
            .map(|kernel| kernel.artifact_file_name())
            .collect();
        assert_eq!(names, vec!["svm_linear.json", "svm_poly.json", "svm_rbf.json"]);
    }

    #[test]
    fn validate_allows_large_and_zero_amounts() {
        let applicant = ApplicantRecord {
            monthly_income: 0.0,
            loan_amount: 1.0e9,
            credit_history: CreditHistory::Clean,
            employment: EmploymentType::Salaried,
            property_area: PropertyArea::Rural,
        };
        assert_eq!(applicant.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_and_non_finite_amounts() {
        let mut applicant = ApplicantRecord {
            monthly_income: -1.0,
            loan_amount: 100.0,
            credit_history: CreditHistory::Clean,
            employment: EmploymentType::Salaried,
            property_area: PropertyArea::Urban,
        };
        assert!(matches!(
            applicant.validate(),
            Err(InputError::Negative {
                field: "monthly_income",
                ..
            })
        ));

        applicant.monthly_income = 100.0;
        applicant.loan_amount = f64::NAN;
        assert_eq!(
            applicant.validate(),
            Err(InputError::NotFinite {
                field: "loan_amount"
            })
        );
    }

    #[test]
    fn outcome_insight_reflects_risk_level() {
        let outcome = DecisionOutcome {
            approved: false,
            confidence: 95.0,
            source: DecisionSource::PolicyGuard,
        };
        assert_eq!(outcome.decision_label(), "REJECTED");
        assert!(outcome.insight().contains("high risk"));
        assert_eq!(
            outcome.summary(),
            "rejected by policy guard with 95.0% confidence"
        );
    }
}
