mod config;
mod guard;

pub use config::{ApplicantDefaults, EvaluationConfig};

use super::domain::{ApplicantRecord, DecisionOutcome, DecisionSource};
use super::features::{FeatureRecord, SchemaError};
use super::model::{LoadedModel, ModelError};

/// Stateless evaluator: the policy guard first, then the loaded classifier.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        applicant: &ApplicantRecord,
        model: &LoadedModel,
    ) -> Result<DecisionOutcome, EvaluationError> {
        if let Some(outcome) = guard::policy_rejection(applicant, &self.config) {
            return Ok(outcome);
        }

        let record = FeatureRecord::from_applicant(applicant, &self.config.defaults);
        let row = record.project(model.feature_order())?;

        let classifier = model.classifier();
        let label = classifier.classify(&row)?;
        let probabilities = classifier.class_probabilities(&row)?;
        let confidence = (probabilities.max() * 100.0).clamp(0.0, 100.0);

        Ok(DecisionOutcome {
            approved: label.is_approval(),
            confidence: if confidence.is_nan() { 0.0 } else { confidence },
            source: DecisionSource::Model {
                kernel: model.kernel(),
            },
        })
    }
}

/// Failure while running the learned half of the evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
