use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicantRecord, DecisionOutcome, InputError, Kernel};
use super::evaluation::{EvaluationConfig, EvaluationEngine, EvaluationError};
use super::model::{KernelSelection, KernelStatus, ModelConfigError, ModelRegistry};

/// Service composing the model registry, the active kernel and the evaluation engine.
pub struct CreditScreeningService {
    registry: Arc<ModelRegistry>,
    selection: KernelSelection,
    engine: EvaluationEngine,
}

impl CreditScreeningService {
    /// Fails when `default_kernel` has no loaded artifact.
    pub fn new(
        registry: Arc<ModelRegistry>,
        config: EvaluationConfig,
        default_kernel: Kernel,
    ) -> Result<Self, ScreeningServiceError> {
        let model = registry.get(default_kernel)?;

        Ok(Self {
            registry,
            selection: KernelSelection::new(model),
            engine: EvaluationEngine::new(config),
        })
    }

    /// Evaluate one applicant with the requested kernel, or the active one.
    ///
    /// The model is resolved before the applicant is inspected so a deployment problem is
    /// reported even for input the policy guard would have rejected.
    pub fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationReport, ScreeningServiceError> {
        let model = match request.kernel {
            Some(kernel) => self.registry.get(kernel)?,
            None => self.selection.current(),
        };

        request.applicant.validate()?;
        let outcome = self.engine.evaluate(&request.applicant, &model)?;

        info!(
            kernel = %model.kernel(),
            approved = outcome.approved,
            confidence = outcome.confidence,
            source = %outcome.source.label(),
            "applicant evaluated"
        );

        Ok(EvaluationReport {
            kernel: model.kernel(),
            outcome,
        })
    }

    /// Make `kernel` the default for requests that do not name one. Returns the kernel it
    /// replaced.
    pub fn select_kernel(&self, kernel: Kernel) -> Result<Kernel, ScreeningServiceError> {
        let model = self.registry.get(kernel)?;
        let previous = self.selection.replace(model).kernel();
        info!(from = %previous, to = %kernel, "active kernel switched");
        Ok(previous)
    }

    pub fn active_kernel(&self) -> Kernel {
        self.selection.kernel()
    }

    pub fn kernels(&self) -> Vec<KernelStatus> {
        let active = self.active_kernel();
        Kernel::ALL
            .into_iter()
            .map(|kernel| KernelStatus {
                kernel,
                label: kernel.label(),
                artifact: self.registry.artifact_path(kernel).display().to_string(),
                loaded: self.registry.is_loaded(kernel),
                active: kernel == active,
            })
            .collect()
    }
}

/// Applicant attributes plus an optional kernel override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    #[serde(flatten)]
    pub applicant: ApplicantRecord,
    #[serde(default)]
    pub kernel: Option<Kernel>,
}

impl EvaluationRequest {
    pub fn new(applicant: ApplicantRecord) -> Self {
        Self {
            applicant,
            kernel: None,
        }
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }
}

/// Decision returned to callers along with the kernel that served it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub kernel: Kernel,
    pub outcome: DecisionOutcome,
}

impl EvaluationReport {
    pub fn view(&self) -> EvaluationView {
        EvaluationView {
            approved: self.outcome.approved,
            decision: self.outcome.decision_label(),
            confidence: self.outcome.confidence,
            kernel: self.kernel,
            kernel_label: self.kernel.label(),
            source: self.outcome.source.label(),
            risk_level: self.outcome.risk_level(),
            insight: self.outcome.insight(),
        }
    }
}

/// Presentation payload for API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationView {
    pub approved: bool,
    pub decision: &'static str,
    pub confidence: f64,
    pub kernel: Kernel,
    pub kernel_label: &'static str,
    pub source: String,
    pub risk_level: &'static str,
    pub insight: String,
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Configuration(#[from] ModelConfigError),
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
