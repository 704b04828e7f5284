//! Explainer path selection and ranking

use super::*;
use crate::model::{FeatureSchema, FeatureValue, Pipeline, PipelineError};

enum Importances {
    None,
    Fixed(Vec<f64>),
    Broken,
}

struct StubPipeline(Importances);

impl Pipeline for StubPipeline {
    fn predict_proba(&self, _: &[FeatureValue]) -> Result<Vec<f32>, PipelineError> {
        Ok(vec![1.0])
    }

    fn predict_label(&self, _: &[FeatureValue]) -> Result<String, PipelineError> {
        Ok("0".to_string())
    }

    fn feature_importances(&self) -> Result<Option<Vec<f64>>, PipelineError> {
        match &self.0 {
            Importances::None => Ok(None),
            Importances::Fixed(v) => Ok(Some(v.clone())),
            Importances::Broken => Err(PipelineError::Importances("estimator not fitted".to_string())),
        }
    }
}

fn schema(n: usize) -> FeatureSchema {
    FeatureSchema::new((0..n).map(|i| format!("f{}", i)).collect()).unwrap()
}

fn numbers(values: &[f64]) -> Vec<FeatureValue> {
    values.iter().map(|v| FeatureValue::Number(*v)).collect()
}

fn names(explanation: &Explanation) -> Vec<&str> {
    explanation.contributions.iter().map(|c| c.feature.as_str()).collect()
}

#[test]
fn test_model_importance_path() {
    let s = schema(3);
    let p = StubPipeline(Importances::Fixed(vec![0.1, -0.7, 0.2]));
    let e = explain(&s, &numbers(&[4.0, 5.0, 6.0]), &p);

    assert_eq!(e.source, ExplainSource::ModelImportance);
    assert_eq!(names(&e), vec!["f1", "f2", "f0"]);
    assert_eq!(e.contributions[0].importance, -0.7);
    assert_eq!(e.contributions[0].value, 5.0);
}

#[test]
fn test_magnitude_path_without_importances() {
    let s = schema(8);
    let p = StubPipeline(Importances::None);
    let e = explain(&s, &numbers(&[1.0, -9.0, 3.0, 0.0, 7.0, -2.0, 5.0, 4.0]), &p);

    assert_eq!(e.source, ExplainSource::InputMagnitude);
    assert_eq!(e.contributions.len(), TOP_FEATURES);
    assert_eq!(names(&e), vec!["f1", "f4", "f6", "f7", "f2", "f5"]);

    let first = &e.contributions[0];
    assert_eq!(first.importance, 9.0);
    assert_eq!(first.value, -9.0);
}

#[test]
fn test_length_mismatch_falls_back() {
    let s = schema(3);
    let p = StubPipeline(Importances::Fixed(vec![0.5, 0.5]));
    let e = explain(&s, &numbers(&[0.0, 2.0, 1.0]), &p);

    assert_eq!(e.source, ExplainSource::InputMagnitude);
    assert_eq!(names(&e), vec!["f1", "f2", "f0"]);
}

#[test]
fn test_importance_failure_falls_back() {
    let s = schema(2);
    let p = StubPipeline(Importances::Broken);
    let e = explain(&s, &numbers(&[3.0, 4.0]), &p);

    assert_eq!(e.source, ExplainSource::InputMagnitude);
    assert_eq!(names(&e), vec!["f1", "f0"]);
}

#[test]
fn test_ties_keep_schema_order() {
    let s = schema(4);
    let p = StubPipeline(Importances::None);
    let e = explain(&s, &numbers(&[2.0, -2.0, 2.0, 1.0]), &p);
    assert_eq!(names(&e), vec!["f0", "f1", "f2", "f3"]);

    let p = StubPipeline(Importances::Fixed(vec![0.25, 0.25, -0.25, 0.25]));
    let e = explain(&s, &numbers(&[0.0; 4]), &p);
    assert_eq!(names(&e), vec!["f0", "f1", "f2", "f3"]);
}

#[test]
fn test_text_and_nan_count_as_zero() {
    let s = schema(3);
    let p = StubPipeline(Importances::Fixed(vec![f64::NAN, 0.1, 0.2]));
    let features = vec![
        FeatureValue::Text("tcp".to_string()),
        FeatureValue::Number(f64::NAN),
        FeatureValue::Number(1.5),
    ];

    let e = explain(&s, &features, &p);
    assert_eq!(e.source, ExplainSource::ModelImportance);
    assert_eq!(names(&e), vec!["f2", "f1", "f0"]);
    assert_eq!(e.contributions[2].value, 0.0);

    let e = explain(&s, &features, &StubPipeline(Importances::None));
    assert_eq!(names(&e), vec!["f2", "f0", "f1"]);
    assert!(e.contributions.iter().all(|c| c.importance.is_finite()));
}

#[test]
fn test_output_sorted_and_bounded() {
    let s = schema(20);
    let values: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
    let e = explain(&s, &numbers(&values), &StubPipeline(Importances::None));

    assert!(e.contributions.len() <= TOP_FEATURES);
    for pair in e.contributions.windows(2) {
        assert!(pair[0].importance.abs() >= pair[1].importance.abs());
    }
}

#[test]
fn test_importances_serialize_unchanged() {
    let s = schema(2);
    let p = StubPipeline(Importances::Fixed(vec![0.1, 0.3]));
    let e = explain(&s, &numbers(&[0.0, 1.0]), &p);

    assert_eq!(e.contributions[0].importance, 0.3);
    let json = serde_json::to_string(&e.contributions[0]).unwrap();
    assert_eq!(json, r#"{"feature":"f1","importance":0.3,"value":1.0}"#);
}
