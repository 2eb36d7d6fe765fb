//! Loan creditworthiness screening.
//!
//! A deterministic policy guard runs ahead of a trained kernel SVM pipeline. Pipelines are
//! fitted offline by the [`training`] module, persisted through an [`ArtifactStore`], and
//! served from a [`ModelRegistry`] keyed by kernel.

pub mod domain;
pub mod evaluation;
pub mod features;
pub mod model;
pub mod router;
pub mod service;
pub mod training;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantRecord, CreditHistory, DecisionOutcome, DecisionSource, EmploymentType, InputError,
    Kernel, PropertyArea, UnknownKernel,
};
pub use evaluation::{ApplicantDefaults, EvaluationConfig, EvaluationEngine, EvaluationError};
pub use features::{FeatureOrder, FeatureRecord, FeatureRow, FeatureValue, SchemaError};
pub use model::{
    ArtifactError, ArtifactStore, ClassProbabilities, KernelSelection, KernelStatus,
    LoadedModel, LoanClassifier, LoanLabel, ModelConfigError, ModelError, ModelRegistry,
    SvmPipeline,
};
pub use router::credit_router;
pub use service::{
    CreditScreeningService, EvaluationReport, EvaluationRequest, EvaluationView,
    ScreeningServiceError,
};
pub use training::{ModelTrainer, TrainingError, TrainingSettings, TrainingSummary};
