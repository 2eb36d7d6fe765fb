use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use super::super::domain::Kernel;
use super::super::features::FeatureOrder;
use super::artifacts::{ArtifactError, ArtifactStore};
use super::LoanClassifier;

/// A classifier bound to the feature order its inputs are projected into.
pub struct LoadedModel {
    classifier: Arc<dyn LoanClassifier>,
    feature_order: FeatureOrder,
}

impl LoadedModel {
    /// Refuses an order that differs in names or positions from the fitted columns.
    pub fn new(
        classifier: Arc<dyn LoanClassifier>,
        feature_order: FeatureOrder,
    ) -> Result<Self, ModelConfigError> {
        if classifier.feature_columns() != feature_order.columns() {
            return Err(ModelConfigError::FeatureOrderMismatch {
                kernel: classifier.kernel(),
                expected: classifier.feature_columns().to_vec(),
                found: feature_order.columns().to_vec(),
            });
        }

        Ok(Self {
            classifier,
            feature_order,
        })
    }

    pub fn kernel(&self) -> Kernel {
        self.classifier.kernel()
    }

    pub fn classifier(&self) -> &dyn LoanClassifier {
        self.classifier.as_ref()
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("kernel", &self.kernel())
            .field("feature_order", &self.feature_order)
            .finish()
    }
}

/// Models available to the process, keyed by kernel.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    store: Option<ArtifactStore>,
    models: BTreeMap<Kernel, Arc<LoadedModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the feature order and every kernel present in `store`. Absent kernels are
    /// recorded and reported when selected; any other artifact problem fails the load.
    pub fn load(store: &ArtifactStore) -> Result<Self, ModelConfigError> {
        let feature_order = store
            .load_feature_order()
            .map_err(ModelConfigError::FeatureOrder)?;

        let mut registry = Self {
            store: Some(store.clone()),
            models: BTreeMap::new(),
        };

        for kernel in Kernel::ALL {
            let pipeline = match store.load_pipeline(kernel) {
                Ok(pipeline) => pipeline,
                Err(ArtifactError::Missing { path }) => {
                    warn!(%kernel, path = %path.display(), "model artifact missing");
                    continue;
                }
                Err(source) => return Err(ModelConfigError::ModelArtifact { kernel, source }),
            };

            if pipeline.kernel() != kernel {
                return Err(ModelConfigError::KernelMismatch {
                    kernel,
                    found: pipeline.kernel(),
                });
            }

            let trained_at = pipeline.trained_at();
            registry.insert(LoadedModel::new(Arc::new(pipeline), feature_order.clone())?);
            info!(%kernel, %trained_at, "model loaded");
        }

        Ok(registry)
    }

    pub fn insert(&mut self, model: LoadedModel) -> Arc<LoadedModel> {
        let model = Arc::new(model);
        self.models.insert(model.kernel(), model.clone());
        model
    }

    pub fn get(&self, kernel: Kernel) -> Result<Arc<LoadedModel>, ModelConfigError> {
        self.models
            .get(&kernel)
            .cloned()
            .ok_or_else(|| ModelConfigError::MissingModel {
                kernel,
                path: self.artifact_path(kernel),
            })
    }

    pub fn is_loaded(&self, kernel: Kernel) -> bool {
        self.models.contains_key(&kernel)
    }

    pub fn loaded_kernels(&self) -> Vec<Kernel> {
        self.models.keys().copied().collect()
    }

    pub fn artifact_path(&self, kernel: Kernel) -> PathBuf {
        match &self.store {
            Some(store) => store.pipeline_path(kernel),
            None => PathBuf::from(kernel.artifact_file_name()),
        }
    }
}

/// Process-wide active model. Switching replaces the shared reference wholesale, so a
/// reader holds either the previous model or the new one.
#[derive(Debug)]
pub struct KernelSelection {
    current: RwLock<Arc<LoadedModel>>,
}

impl KernelSelection {
    pub fn new(model: Arc<LoadedModel>) -> Self {
        Self {
            current: RwLock::new(model),
        }
    }

    pub fn current(&self) -> Arc<LoadedModel> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn kernel(&self) -> Kernel {
        self.current().kernel()
    }

    /// Install `model` and return the one it replaced.
    pub fn replace(&self, model: Arc<LoadedModel>) -> Arc<LoadedModel> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, model)
    }
}

/// Availability of one kernel for status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelStatus {
    pub kernel: Kernel,
    pub label: &'static str,
    pub artifact: String,
    pub loaded: bool,
    pub active: bool,
}

/// Deployment problem that blocks evaluation until artifacts are fixed.
#[derive(Debug, thiserror::Error)]
pub enum ModelConfigError {
    #[error("no trained {kernel} model is available: {} is missing", path.display())]
    MissingModel { kernel: Kernel, path: PathBuf },
    #[error("failed to load {kernel} model: {source}")]
    ModelArtifact {
        kernel: Kernel,
        #[source]
        source: ArtifactError,
    },
    #[error("failed to load feature order: {0}")]
    FeatureOrder(#[source] ArtifactError),
    #[error(
        "feature order {found:?} does not match the columns the {kernel} model was fitted on {expected:?}"
    )]
    FeatureOrderMismatch {
        kernel: Kernel,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("artifact for the {kernel} kernel contains a {found} model")]
    KernelMismatch { kernel: Kernel, found: Kernel },
}
