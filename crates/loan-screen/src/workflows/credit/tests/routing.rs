use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::credit::domain::Kernel;
use crate::workflows::credit::router::credit_router;

fn json_request(method: &str, uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn applicant_payload() -> serde_json::Value {
    json!({
        "monthly_income": 8000,
        "loan_amount": 150,
        "credit_history": "clean",
        "employment": "salaried",
        "property_area": "urban",
    })
}

#[tokio::test]
async fn evaluation_route_returns_decision_view() {
    let (service, _) = build_service(&[(Kernel::Linear, 0.8)], Kernel::Linear);

    let response = credit_router(service)
        .oneshot(json_request(
            "POST",
            "/api/v1/credit/evaluations",
            applicant_payload(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "APPROVED");
    assert_eq!(body["kernel"], "linear");
    assert_eq!(body["source"], "Linear SVM");
    let confidence = body["confidence"].as_f64().expect("confidence");
    assert!((confidence - 80.0).abs() < 1e-9);
}

#[tokio::test]
async fn guard_rejection_is_served_over_http() {
    let (service, classifiers) = build_service(&[(Kernel::Linear, 0.99)], Kernel::Linear);
    let payload = json!({
        "monthly_income": 1500,
        "loan_amount": 150,
        "credit_history": "issues_present",
        "employment": "self_employed",
        "property_area": "rural",
    });

    let response = credit_router(service)
        .oneshot(json_request("POST", "/api/v1/credit/evaluations", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["approved"], false);
    assert_eq!(body["confidence"], 95.0);
    assert_eq!(body["source"], "policy guard");
    assert_eq!(classifiers[0].calls(), 0);
}

#[tokio::test]
async fn negative_amounts_are_unprocessable() {
    let (service, _) = build_service(&[(Kernel::Linear, 0.8)], Kernel::Linear);
    let mut payload = applicant_payload();
    payload["loan_amount"] = json!(-5);

    let response = credit_router(service)
        .oneshot(json_request("POST", "/api/v1/credit/evaluations", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("loan_amount"));
}

#[tokio::test]
async fn unloaded_kernel_is_service_unavailable() {
    let (service, _) = build_service(&[(Kernel::Linear, 0.8)], Kernel::Linear);
    let mut payload = applicant_payload();
    payload["kernel"] = json!("rbf");

    let response = credit_router(service)
        .oneshot(json_request("POST", "/api/v1/credit/evaluations", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.starts_with("screening error: "));
    assert!(message.contains("svm_rbf.json"));
}

#[tokio::test]
async fn unknown_kernel_name_is_rejected_by_the_extractor() {
    let (service, _) = build_service(&[(Kernel::Linear, 0.8)], Kernel::Linear);
    let mut payload = applicant_payload();
    payload["kernel"] = json!("sigmoid");

    let response = credit_router(service)
        .oneshot(json_request("POST", "/api/v1/credit/evaluations", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn kernel_routes_list_and_switch_the_active_kernel() {
    let (service, _) = build_service(
        &[(Kernel::Linear, 0.8), (Kernel::Poly, 0.3)],
        Kernel::Linear,
    );
    let router = credit_router(service.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/credit/kernels/active",
            json!({ "kernel": "polynomial" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["previous"], "linear");
    assert_eq!(body["active"], "poly");

    let response = router
        .oneshot(
            Request::get("/api/v1/credit/kernels")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["active"], "poly");
    assert_eq!(body["kernels"].as_array().expect("kernels").len(), 3);
    assert_eq!(body["kernels"][2]["loaded"], false);
    assert_eq!(service.active_kernel(), Kernel::Poly);
}

#[tokio::test]
async fn switching_to_an_unloaded_kernel_is_service_unavailable() {
    let (service, _) = build_service(&[(Kernel::Linear, 0.8)], Kernel::Linear);

    let response = credit_router(service.clone())
        .oneshot(json_request(
            "PUT",
            "/api/v1/credit/kernels/active",
            json!({ "kernel": "rbf" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .starts_with("screening error: "));
    assert_eq!(service.active_kernel(), Kernel::Linear);
}
