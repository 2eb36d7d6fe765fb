use serde::{Deserialize, Serialize};

/// Policy constants applied around the learned classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Applicants with credit issues earning below this monthly amount are rejected outright.
    pub income_floor: f64,
    /// Confidence percentage reported for guard rejections.
    pub guard_confidence: f64,
    #[serde(default)]
    pub defaults: ApplicantDefaults,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            income_floor: 2000.0,
            guard_confidence: 95.0,
            defaults: ApplicantDefaults::default(),
        }
    }
}

/// Values used for training columns the intake form does not collect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantDefaults {
    pub gender: String,
    pub married: String,
    pub dependents: String,
    pub education: String,
    pub coapplicant_income: f64,
    pub loan_amount_term: f64,
}

impl Default for ApplicantDefaults {
    fn default() -> Self {
        Self {
            gender: "Male".to_string(),
            married: "No".to_string(),
            dependents: "0".to_string(),
            education: "Graduate".to_string(),
            coapplicant_income: 0.0,
            loan_amount_term: 360.0,
        }
    }
}
