mod artifacts;
mod pipeline;
mod preprocess;
mod registry;

pub use artifacts::{ArtifactError, ArtifactStore, PublishedArtifacts, FEATURE_ORDER_FILE};
pub use pipeline::{FitError, SvmPipeline, SvmSettings, PIPELINE_FORMAT_VERSION};
pub use preprocess::{ColumnPreprocessor, ColumnTransform};
pub use registry::{KernelSelection, KernelStatus, LoadedModel, ModelConfigError, ModelRegistry};

use serde::{Deserialize, Serialize};

use super::domain::Kernel;
use super::features::FeatureRow;

/// Binary outcome of the historical `Loan_Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanLabel {
    #[serde(rename = "Y")]
    Approve,
    #[serde(rename = "N")]
    Reject,
}

impl LoanLabel {
    pub fn code(&self) -> &'static str {
        match self {
            LoanLabel::Approve => "Y",
            LoanLabel::Reject => "N",
        }
    }

    pub fn is_approval(&self) -> bool {
        matches!(self, LoanLabel::Approve)
    }
}

/// Posterior distribution over the two labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub approve: f64,
    pub reject: f64,
}

impl ClassProbabilities {
    /// Build from the probability of approval, clamped into `[0, 1]`.
    pub fn from_approval(probability: f64) -> Self {
        let approve = if probability.is_nan() {
            0.5
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            approve,
            reject: 1.0 - approve,
        }
    }

    pub fn max(&self) -> f64 {
        self.approve.max(self.reject)
    }

    pub fn most_likely(&self) -> LoanLabel {
        if self.approve >= self.reject {
            LoanLabel::Approve
        } else {
            LoanLabel::Reject
        }
    }
}

/// Failure raised while running a loaded classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("row columns {found:?} do not match the fitted layout {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("classifier produced no prediction for the row")]
    EmptyPrediction,
    #[error("encoded matrix of {rows} rows by {width} columns is inconsistent: {message}")]
    Shape {
        rows: usize,
        width: usize,
        message: String,
    },
}

/// Inference surface of a trained pipeline. Implementations are immutable after loading and
/// shared across requests.
pub trait LoanClassifier: Send + Sync {
    fn kernel(&self) -> Kernel;

    /// Columns, in order, that the pipeline was fitted against.
    fn feature_columns(&self) -> &[String];

    fn class_probabilities(&self, row: &FeatureRow) -> Result<ClassProbabilities, ModelError>;

    fn classify(&self, row: &FeatureRow) -> Result<LoanLabel, ModelError> {
        Ok(self.class_probabilities(row)?.most_likely())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_are_clamped_and_complementary() {
        let probabilities = ClassProbabilities::from_approval(1.4);
        assert_eq!(probabilities.approve, 1.0);
        assert_eq!(probabilities.reject, 0.0);

        let probabilities = ClassProbabilities::from_approval(0.25);
        assert_eq!(probabilities.most_likely(), LoanLabel::Reject);
        assert_eq!(probabilities.max(), 0.75);
    }

    #[test]
    fn labels_round_trip_dataset_codes() {
        let label: LoanLabel = serde_json::from_str("\"Y\"").expect("parses");
        assert_eq!(label, LoanLabel::Approve);
        assert_eq!(LoanLabel::Reject.code(), "N");
    }
}
