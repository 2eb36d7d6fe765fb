mod dataset;

pub use dataset::{ColumnValues, DatasetColumn, DatasetError, DatasetSchema, TrainingSet};

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::domain::Kernel;
use super::features::FeatureOrder;
use super::model::{
    ArtifactError, ArtifactStore, ColumnPreprocessor, FitError, ModelError, SvmPipeline,
    SvmSettings,
};

/// Options for an offline training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSettings {
    pub schema: DatasetSchema,
    pub kernels: Vec<Kernel>,
    pub svm: SvmSettings,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            schema: DatasetSchema::default(),
            kernels: Kernel::ALL.to_vec(),
            svm: SvmSettings::default(),
        }
    }
}

/// Fits one pipeline per kernel from a labeled export and persists the artifacts.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    settings: TrainingSettings,
}

impl ModelTrainer {
    pub fn new(settings: TrainingSettings) -> Self {
        Self { settings }
    }

    pub fn train_from_path(
        &self,
        dataset_path: impl AsRef<Path>,
        store: &ArtifactStore,
    ) -> Result<TrainingSummary, TrainingError> {
        let dataset_path = dataset_path.as_ref();
        let dataset = TrainingSet::from_path(dataset_path, &self.settings.schema)?;
        info!(
            dataset = %dataset_path.display(),
            rows = dataset.rows(),
            "training dataset loaded"
        );
        self.train(&dataset, store)
    }

    /// Fit every configured kernel, then write the pipelines and the feature order.
    pub fn train(
        &self,
        dataset: &TrainingSet,
        store: &ArtifactStore,
    ) -> Result<TrainingSummary, TrainingError> {
        let pipelines = self.fit(dataset)?;
        let feature_order = dataset.feature_order();

        let fitted: Vec<&SvmPipeline> = pipelines.iter().map(|(pipeline, _)| pipeline).collect();
        let published = store.publish(&feature_order, &fitted)?;

        let artifacts: Vec<TrainedArtifact> = pipelines
            .iter()
            .zip(published.pipelines)
            .map(|((_, accuracy), (kernel, path))| {
                info!(%kernel, path = %path.display(), accuracy, "pipeline saved");
                TrainedArtifact {
                    kernel,
                    path,
                    training_accuracy: *accuracy,
                }
            })
            .collect();
        let feature_order_path = published.feature_order;

        Ok(TrainingSummary {
            rows: dataset.rows(),
            numeric_columns: dataset.numeric_columns(),
            categorical_columns: dataset.categorical_columns(),
            feature_order,
            feature_order_path,
            artifacts,
        })
    }

    /// Fit without touching disk, returning each pipeline with its in-sample accuracy.
    pub fn fit(&self, dataset: &TrainingSet) -> Result<Vec<(SvmPipeline, f64)>, TrainingError> {
        if self.settings.kernels.is_empty() {
            return Err(TrainingError::NoKernels);
        }

        let preprocessor = ColumnPreprocessor::fit(dataset.columns());
        info!(
            numeric = ?dataset.numeric_columns(),
            categorical = ?dataset.categorical_columns(),
            width = preprocessor.output_width(),
            "preprocessor fitted"
        );

        self.settings
            .kernels
            .iter()
            .map(|kernel| -> Result<(SvmPipeline, f64), TrainingError> {
                let pipeline =
                    SvmPipeline::fit(*kernel, preprocessor.clone(), dataset, &self.settings.svm)?;
                let accuracy = pipeline.accuracy(dataset)?;
                Ok((pipeline, accuracy))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainedArtifact {
    pub kernel: Kernel,
    pub path: PathBuf,
    pub training_accuracy: f64,
}

/// What a training run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub rows: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub feature_order: FeatureOrder,
    pub feature_order_path: PathBuf,
    pub artifacts: Vec<TrainedArtifact>,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no kernels selected for training")]
    NoKernels,
}
