//! Inference service: raw record → prediction
//!
//! Everything here reads from the immutable `InferenceContext` and writes
//! only request-local values, so concurrent requests need no coordination.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::explain::{self, ExplainSource, FeatureContribution};
use crate::model::{predictor, FeatureSchema, LabelEncoder, LabelSource, Pipeline, PipelineError};

/// Process-wide artifacts, built once at startup
pub struct InferenceContext {
    pub schema: FeatureSchema,
    pub labels: Option<LabelEncoder>,
    pub pipeline: Arc<dyn Pipeline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f64,
    pub explanation: Vec<FeatureContribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_source: Option<ExplainSource>,
    #[serde(skip)]
    pub label_source: Option<LabelSource>,
}

impl InferenceContext {
    pub fn new(schema: FeatureSchema, labels: Option<LabelEncoder>, pipeline: Arc<dyn Pipeline>) -> Self {
        Self { schema, labels, pipeline }
    }

    /// Full predict flow for one record. Only pipeline failures surface;
    /// label and explanation problems are recovered internally.
    pub fn predict(&self, record: &Map<String, Value>) -> Result<PredictionResult, PipelineError> {
        let features = self.schema.normalize(record);
        let pipeline = self.pipeline.as_ref();

        let score = predictor::predict_distribution(pipeline, &features)?;
        let decoded = predictor::decode_label(self.labels.as_ref(), pipeline, score.index, &features)?;
        let explanation = explain::explain(&self.schema, &features, pipeline);

        tracing::debug!(
            class_index = score.index,
            label = %decoded.label,
            label_source = ?decoded.source,
            explain_source = ?explanation.source,
            "Prediction complete"
        );

        Ok(PredictionResult {
            prediction: decoded.label,
            confidence: round4(f64::from(score.confidence)),
            explanation: explanation.contributions,
            explanation_source: Some(explanation.source),
            label_source: Some(decoded.source),
        })
    }
}

/// Round to 4 decimal places, halves to even
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureValue;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the vector it was called with
    struct Recording {
        seen: Mutex<Vec<Vec<FeatureValue>>>,
        proba: Vec<f32>,
    }

    impl Pipeline for Recording {
        fn predict_proba(&self, features: &[FeatureValue]) -> Result<Vec<f32>, PipelineError> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(self.proba.clone())
        }

        fn predict_label(&self, _: &[FeatureValue]) -> Result<String, PipelineError> {
            Ok("raw".to_string())
        }
    }

    fn context(proba: Vec<f32>, labels: Option<LabelEncoder>) -> (InferenceContext, Arc<Recording>) {
        let pipeline = Arc::new(Recording { seen: Mutex::new(Vec::new()), proba });
        let schema = FeatureSchema::new(vec!["featA".into(), "featB".into(), "featC".into()]).unwrap();
        (InferenceContext::new(schema, labels, pipeline.clone()), pipeline)
    }

    #[test]
    fn test_pipeline_sees_schema_vector() {
        let (ctx, pipeline) = context(vec![0.2, 0.8], None);
        let record = json!({"featA": 5, "featB": 0}).as_object().cloned().unwrap();
        ctx.predict(&record).unwrap();

        let seen = pipeline.seen.lock().unwrap();
        assert_eq!(seen[0], vec![
            FeatureValue::Number(5.0),
            FeatureValue::Number(0.0),
            FeatureValue::Number(0.0),
        ]);
    }

    #[test]
    fn test_empty_record_still_predicts() {
        let labels = LabelEncoder::new(vec!["normal".into(), "attack".into()]);
        let (ctx, _) = context(vec![0.123456, 0.876544], Some(labels));
        let result = ctx.predict(&Map::new()).unwrap();

        assert_eq!(result.prediction, "attack");
        assert_eq!(result.confidence, 0.8765);
        assert_eq!(result.label_source, Some(LabelSource::Encoder));
        assert_eq!(result.explanation.len(), 3);
        assert!(result.explanation.iter().all(|c| c.importance == 0.0));
    }

    #[test]
    fn test_label_fallback_used() {
        let (ctx, _) = context(vec![0.1, 0.9], None);
        let result = ctx.predict(&Map::new()).unwrap();
        assert_eq!(result.prediction, "raw");
        assert_eq!(result.label_source, Some(LabelSource::Pipeline));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.87654), 0.8765);
        assert_eq!(round4(0.12345678), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn test_round4_halves_to_even() {
        assert_eq!(round4(f64::from(0.78125f32)), 0.7812);
        assert_eq!(round4(f64::from(0.15625f32)), 0.1562);
        assert_eq!(round4(f64::from(0.84375f32)), 0.8438);
    }
}
