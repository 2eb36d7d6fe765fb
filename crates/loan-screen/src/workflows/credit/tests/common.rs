use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::credit::domain::{
    ApplicantRecord, CreditHistory, EmploymentType, Kernel, PropertyArea,
};
use crate::workflows::credit::evaluation::{EvaluationConfig, EvaluationEngine};
use crate::workflows::credit::features::{
    FeatureOrder, FeatureRow, APPLICANT_INCOME, COAPPLICANT_INCOME, CREDIT_HISTORY, DEPENDENTS,
    EDUCATION, GENDER, LOAN_AMOUNT, LOAN_AMOUNT_TERM, MARRIED, PROPERTY_AREA, SELF_EMPLOYED,
};
use crate::workflows::credit::model::{
    ClassProbabilities, LoadedModel, LoanClassifier, ModelError, ModelRegistry,
};
use crate::workflows::credit::service::CreditScreeningService;

/// Column layout of the historical export once the id and label columns are dropped.
pub(super) fn canonical_columns() -> Vec<String> {
    [
        GENDER,
        MARRIED,
        DEPENDENTS,
        EDUCATION,
        SELF_EMPLOYED,
        APPLICANT_INCOME,
        COAPPLICANT_INCOME,
        LOAN_AMOUNT,
        LOAN_AMOUNT_TERM,
        CREDIT_HISTORY,
        PROPERTY_AREA,
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub(super) fn canonical_order() -> FeatureOrder {
    FeatureOrder::new(canonical_columns())
}

/// Classifier returning a fixed approval probability and counting how often it is asked.
#[derive(Debug)]
pub(super) struct StaticClassifier {
    kernel: Kernel,
    columns: Vec<String>,
    approve_probability: f64,
    calls: AtomicUsize,
    last_row: Mutex<Option<FeatureRow>>,
}

impl StaticClassifier {
    pub(super) fn new(kernel: Kernel, approve_probability: f64) -> Self {
        Self::with_columns(kernel, approve_probability, canonical_columns())
    }

    pub(super) fn with_columns(
        kernel: Kernel,
        approve_probability: f64,
        columns: Vec<String>,
    ) -> Self {
        Self {
            kernel,
            columns,
            approve_probability,
            calls: AtomicUsize::new(0),
            last_row: Mutex::new(None),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recent row handed to the classifier.
    pub(super) fn last_row(&self) -> Option<FeatureRow> {
        self.last_row.lock().expect("row mutex poisoned").clone()
    }
}

impl LoanClassifier for StaticClassifier {
    fn kernel(&self) -> Kernel {
        self.kernel
    }

    fn feature_columns(&self) -> &[String] {
        &self.columns
    }

    fn class_probabilities(&self, row: &FeatureRow) -> Result<ClassProbabilities, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_row.lock().expect("row mutex poisoned") = Some(row.clone());
        if row.columns() != self.columns.as_slice() {
            return Err(ModelError::ColumnMismatch {
                expected: self.columns.clone(),
                found: row.columns().to_vec(),
            });
        }
        Ok(ClassProbabilities::from_approval(self.approve_probability))
    }
}

pub(super) fn loaded_model(
    kernel: Kernel,
    approve_probability: f64,
) -> (Arc<StaticClassifier>, LoadedModel) {
    let classifier = Arc::new(StaticClassifier::new(kernel, approve_probability));
    let model = LoadedModel::new(classifier.clone(), canonical_order()).expect("orders match");
    (classifier, model)
}

/// Registry holding one static classifier per entry.
pub(super) fn registry_with(
    entries: &[(Kernel, f64)],
) -> (ModelRegistry, Vec<Arc<StaticClassifier>>) {
    let mut registry = ModelRegistry::new();
    let mut classifiers = Vec::new();
    for (kernel, probability) in entries {
        let (classifier, model) = loaded_model(*kernel, *probability);
        registry.insert(model);
        classifiers.push(classifier);
    }
    (registry, classifiers)
}

pub(super) fn build_service(
    entries: &[(Kernel, f64)],
    default_kernel: Kernel,
) -> (Arc<CreditScreeningService>, Vec<Arc<StaticClassifier>>) {
    let (registry, classifiers) = registry_with(entries);
    let service = CreditScreeningService::new(
        Arc::new(registry),
        EvaluationConfig::default(),
        default_kernel,
    )
    .expect("default kernel loaded");
    (Arc::new(service), classifiers)
}

pub(super) fn engine() -> EvaluationEngine {
    EvaluationEngine::new(EvaluationConfig::default())
}

pub(super) fn applicant(monthly_income: f64, credit_history: CreditHistory) -> ApplicantRecord {
    ApplicantRecord {
        monthly_income,
        loan_amount: 150.0,
        credit_history,
        employment: EmploymentType::Salaried,
        property_area: PropertyArea::Urban,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
