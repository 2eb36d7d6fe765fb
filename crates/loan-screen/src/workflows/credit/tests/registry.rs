use std::sync::Arc;

use super::common::*;
use crate::workflows::credit::domain::Kernel;
use crate::workflows::credit::features::FeatureOrder;
use crate::workflows::credit::model::{
    ArtifactError, ArtifactStore, KernelSelection, LoadedModel, ModelConfigError, ModelRegistry,
};

#[test]
fn empty_registry_reports_missing_artifact_path() {
    let registry = ModelRegistry::new();

    match registry.get(Kernel::Rbf) {
        Err(ModelConfigError::MissingModel { kernel, path }) => {
            assert_eq!(kernel, Kernel::Rbf);
            assert!(path.ends_with("svm_rbf.json"));
        }
        other => panic!("expected missing model, got {other:?}"),
    }
}

#[test]
fn shuffled_feature_order_is_refused() {
    let mut columns = canonical_columns();
    columns.swap(5, 7);
    let classifier = Arc::new(StaticClassifier::new(Kernel::Linear, 0.7));

    match LoadedModel::new(classifier, FeatureOrder::new(columns)) {
        Err(ModelConfigError::FeatureOrderMismatch {
            kernel, expected, ..
        }) => {
            assert_eq!(kernel, Kernel::Linear);
            assert_eq!(expected, canonical_columns());
        }
        other => panic!("expected feature order mismatch, got {other:?}"),
    }
}

#[test]
fn registry_routes_by_kernel() {
    let (registry, _) = registry_with(&[(Kernel::Linear, 0.2), (Kernel::Rbf, 0.9)]);

    assert_eq!(registry.loaded_kernels(), vec![Kernel::Linear, Kernel::Rbf]);
    assert_eq!(registry.get(Kernel::Rbf).expect("rbf").kernel(), Kernel::Rbf);
    assert!(registry.is_loaded(Kernel::Linear));
    assert!(!registry.is_loaded(Kernel::Poly));
    assert!(registry.get(Kernel::Poly).is_err());
}

#[test]
fn selection_swaps_models_wholesale() {
    let (_, linear) = loaded_model(Kernel::Linear, 0.4);
    let (_, poly) = loaded_model(Kernel::Poly, 0.4);
    let selection = KernelSelection::new(Arc::new(linear));
    let held = selection.current();

    let previous = selection.replace(Arc::new(poly));

    assert_eq!(previous.kernel(), Kernel::Linear);
    assert_eq!(selection.kernel(), Kernel::Poly);
    assert_eq!(held.kernel(), Kernel::Linear);
}

#[test]
fn loading_without_feature_order_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::new(dir.path());

    match ModelRegistry::load(&store) {
        Err(ModelConfigError::FeatureOrder(ArtifactError::Missing { path })) => {
            assert!(path.ends_with("feature_order.json"));
        }
        other => panic!("expected missing feature order, got {other:?}"),
    }
}

#[test]
fn loading_skips_absent_kernels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::new(dir.path());
    store
        .publish(&canonical_order(), &[])
        .expect("order saved");

    let registry = ModelRegistry::load(&store).expect("registry loads");

    assert!(registry.loaded_kernels().is_empty());
    match registry.get(Kernel::Poly) {
        Err(ModelConfigError::MissingModel { path, .. }) => {
            assert_eq!(path, dir.path().join("svm_poly.json"));
        }
        other => panic!("expected missing model, got {other:?}"),
    }
}

#[test]
fn corrupt_artifact_fails_the_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArtifactStore::new(dir.path());
    store
        .publish(&canonical_order(), &[])
        .expect("order saved");
    std::fs::write(store.pipeline_path(Kernel::Linear), b"{ not json").expect("write");

    match ModelRegistry::load(&store) {
        Err(ModelConfigError::ModelArtifact {
            kernel,
            source: ArtifactError::Format { .. },
        }) => assert_eq!(kernel, Kernel::Linear),
        other => panic!("expected artifact format error, got {other:?}"),
    }
}
