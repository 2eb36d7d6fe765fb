use loan_screen::config::AppConfig;
use loan_screen::error::AppError;
use loan_screen::workflows::credit::{
    ArtifactStore, CreditHistory, CreditScreeningService, EmploymentType, Kernel, ModelRegistry,
    PropertyArea,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load every artifact under `artifact_dir` and wrap them in a screening service.
pub(crate) fn load_screening_service(
    config: &AppConfig,
    artifact_dir: &Path,
) -> Result<Arc<CreditScreeningService>, AppError> {
    let store = ArtifactStore::new(artifact_dir);
    let registry = ModelRegistry::load(&store)?;
    info!(
        dir = %artifact_dir.display(),
        kernels = ?registry.loaded_kernels(),
        "model registry loaded"
    );

    let service = CreditScreeningService::new(
        Arc::new(registry),
        config.evaluation.clone(),
        config.models.default_kernel,
    )?;
    Ok(Arc::new(service))
}

pub(crate) fn parse_kernel(raw: &str) -> Result<Kernel, String> {
    raw.parse::<Kernel>().map_err(|err| err.to_string())
}

pub(crate) fn parse_credit_history(raw: &str) -> Result<CreditHistory, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "clean" | "1" => Ok(CreditHistory::Clean),
        "issues" | "issues-present" | "0" => Ok(CreditHistory::IssuesPresent),
        other => Err(format!(
            "unknown credit history '{other}' (expected clean or issues)"
        )),
    }
}

pub(crate) fn parse_employment(raw: &str) -> Result<EmploymentType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "salaried" => Ok(EmploymentType::Salaried),
        "self-employed" | "self_employed" => Ok(EmploymentType::SelfEmployed),
        other => Err(format!(
            "unknown employment type '{other}' (expected salaried or self-employed)"
        )),
    }
}

pub(crate) fn parse_property_area(raw: &str) -> Result<PropertyArea, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "urban" => Ok(PropertyArea::Urban),
        "semiurban" | "semi-urban" => Ok(PropertyArea::Semiurban),
        "rural" => Ok(PropertyArea::Rural),
        other => Err(format!(
            "unknown property area '{other}' (expected urban, semiurban or rural)"
        )),
    }
}
