use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::Kernel;
use super::service::{CreditScreeningService, EvaluationRequest, EvaluationView};
use crate::error::AppError;

/// Router builder exposing the evaluation and kernel management endpoints.
pub fn credit_router(service: Arc<CreditScreeningService>) -> Router {
    Router::new()
        .route("/api/v1/credit/evaluations", post(evaluate_handler))
        .route("/api/v1/credit/kernels", get(kernels_handler))
        .route("/api/v1/credit/kernels/active", put(select_kernel_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct KernelSelectionRequest {
    pub(crate) kernel: Kernel,
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<CreditScreeningService>>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationView>, AppError> {
    let report = service.evaluate(request)?;
    Ok(Json(report.view()))
}

pub(crate) async fn kernels_handler(
    State(service): State<Arc<CreditScreeningService>>,
) -> Json<Value> {
    Json(json!({
        "active": service.active_kernel(),
        "kernels": service.kernels(),
    }))
}

pub(crate) async fn select_kernel_handler(
    State(service): State<Arc<CreditScreeningService>>,
    Json(request): Json<KernelSelectionRequest>,
) -> Result<Json<Value>, AppError> {
    let previous = service.select_kernel(request.kernel)?;
    Ok(Json(json!({
        "active": request.kernel,
        "previous": previous,
    })))
}
