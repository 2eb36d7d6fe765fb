use std::fmt;

use chrono::{DateTime, Utc};
use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::super::domain::Kernel;
use super::super::features::FeatureRow;
use super::super::training::TrainingSet;
use super::preprocess::ColumnPreprocessor;
use super::{ClassProbabilities, LoanClassifier, LoanLabel, ModelError};

/// Bumped whenever the serialized layout of [`SvmPipeline`] changes.
pub const PIPELINE_FORMAT_VERSION: u32 = 1;

/// Hyper-parameters shared by every kernel variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmSettings {
    /// Soft-margin penalty applied to both classes.
    pub c: f64,
    pub poly_constant: f64,
    pub poly_degree: f64,
}

impl Default for SvmSettings {
    fn default() -> Self {
        Self {
            c: 1.0,
            poly_constant: 1.0,
            poly_degree: 3.0,
        }
    }
}

/// Preprocessing plus a Platt-calibrated SVM, persisted as one artifact per kernel.
#[derive(Serialize, Deserialize)]
pub struct SvmPipeline {
    format_version: u32,
    kernel: Kernel,
    trained_at: DateTime<Utc>,
    columns: Vec<String>,
    preprocessor: ColumnPreprocessor,
    classifier: Svm<f64, Pr>,
}

impl SvmPipeline {
    pub fn fit(
        kernel: Kernel,
        preprocessor: ColumnPreprocessor,
        dataset: &TrainingSet,
        settings: &SvmSettings,
    ) -> Result<Self, FitError> {
        let records = preprocessor
            .transform_dataset(dataset.columns())
            .map_err(|err| FitError {
                kernel,
                message: err.to_string(),
            })?;
        let targets: Array1<bool> = dataset.labels().iter().map(LoanLabel::is_approval).collect();

        let params = Svm::<f64, Pr>::params().pos_neg_weights(settings.c, settings.c);
        let params = match kernel {
            Kernel::Linear => params.linear_kernel(),
            Kernel::Poly => params.polynomial_kernel(settings.poly_constant, settings.poly_degree),
            Kernel::Rbf => params.gaussian_kernel(scale_bandwidth(&records)),
        };

        let training = Dataset::new(records, targets);
        let classifier = params.fit(&training).map_err(|err| FitError {
            kernel,
            message: err.to_string(),
        })?;

        Ok(Self {
            format_version: PIPELINE_FORMAT_VERSION,
            kernel,
            trained_at: Utc::now(),
            columns: preprocessor.columns(),
            preprocessor,
            classifier,
        })
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Share of rows whose most likely label matches the recorded one.
    pub fn accuracy(&self, dataset: &TrainingSet) -> Result<f64, ModelError> {
        if dataset.rows() == 0 {
            return Ok(0.0);
        }
        let records = self.preprocessor.transform_dataset(dataset.columns())?;
        let predicted: Array1<Pr> = self.classifier.predict(&records);
        let correct = predicted
            .iter()
            .zip(dataset.labels())
            .filter(|(probability, label)| {
                ClassProbabilities::from_approval(f64::from(***probability)).most_likely() == **label
            })
            .count();
        Ok(correct as f64 / dataset.rows() as f64)
    }
}

impl LoanClassifier for SvmPipeline {
    fn kernel(&self) -> Kernel {
        self.kernel
    }

    fn feature_columns(&self) -> &[String] {
        &self.columns
    }

    fn class_probabilities(&self, row: &FeatureRow) -> Result<ClassProbabilities, ModelError> {
        let encoded = self.preprocessor.transform_row(row)?;
        let width = encoded.len();
        let features =
            Array2::from_shape_vec((1, width), encoded).map_err(|err| ModelError::Shape {
                rows: 1,
                width,
                message: err.to_string(),
            })?;

        let predicted: Array1<Pr> = self.classifier.predict(&features);
        let approval = predicted
            .iter()
            .next()
            .map(|probability| f64::from(**probability))
            .ok_or(ModelError::EmptyPrediction)?;

        Ok(ClassProbabilities::from_approval(approval))
    }
}

impl fmt::Debug for SvmPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvmPipeline")
            .field("format_version", &self.format_version)
            .field("kernel", &self.kernel)
            .field("trained_at", &self.trained_at)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Gaussian bandwidth following the "scale" heuristic: `n_features * var(X)`.
fn scale_bandwidth(records: &Array2<f64>) -> f64 {
    let count = records.len();
    if count == 0 {
        return 1.0;
    }
    let mean = records.iter().sum::<f64>() / count as f64;
    let variance = records.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count as f64;
    let bandwidth = records.ncols() as f64 * variance;
    if bandwidth > f64::EPSILON {
        bandwidth
    } else {
        1.0
    }
}

/// Raised when the solver rejects the training matrix.
#[derive(Debug, thiserror::Error)]
#[error("{kernel} SVM failed to fit: {message}")]
pub struct FitError {
    pub kernel: Kernel,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bandwidth_scales_with_width_and_variance() {
        let records = array![[1.0, -1.0], [-1.0, 1.0]];
        assert_eq!(scale_bandwidth(&records), 2.0);
    }

    #[test]
    fn constant_matrix_falls_back_to_unit_bandwidth() {
        let records = Array2::<f64>::zeros((3, 4));
        assert_eq!(scale_bandwidth(&records), 1.0);
    }
}
