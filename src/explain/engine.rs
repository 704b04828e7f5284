use super::types::{ExplainSource, Explanation, FallbackReason, FeatureContribution, TOP_FEATURES};
use crate::model::{FeatureSchema, FeatureValue, Pipeline};

/// Fast approximate explanation: model importances if usable, otherwise
/// the magnitude of each input. Never fails.
pub fn explain(schema: &FeatureSchema, features: &[FeatureValue], pipeline: &dyn Pipeline) -> Explanation {
    match model_importances(schema, pipeline) {
        Ok(importances) => Explanation {
            source: ExplainSource::ModelImportance,
            contributions: by_importance(schema, features, &importances),
        },
        Err(reason) => {
            tracing::debug!(?reason, "Explaining by input magnitude");
            Explanation {
                source: ExplainSource::InputMagnitude,
                contributions: by_magnitude(schema, features),
            }
        }
    }
}

fn model_importances(schema: &FeatureSchema, pipeline: &dyn Pipeline) -> Result<Vec<f64>, FallbackReason> {
    let importances = pipeline
        .feature_importances()
        .map_err(|e| FallbackReason::Failed(e.to_string()))?
        .ok_or(FallbackReason::Unsupported)?;

    if importances.len() != schema.len() {
        return Err(FallbackReason::LengthMismatch {
            expected: schema.len(),
            actual: importances.len(),
        });
    }
    Ok(importances)
}

fn by_importance(schema: &FeatureSchema, features: &[FeatureValue], importances: &[f64]) -> Vec<FeatureContribution> {
    let contributions = schema.names()
        .iter()
        .zip(importances)
        .enumerate()
        .map(|(i, (name, &imp))| FeatureContribution {
            feature: name.clone(),
            importance: imp,
            value: value_at(features, i),
        })
        .collect();

    top_by_abs_importance(contributions)
}

fn by_magnitude(schema: &FeatureSchema, features: &[FeatureValue]) -> Vec<FeatureContribution> {
    let contributions = schema.names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = value_at(features, i);
            FeatureContribution {
                feature: name.clone(),
                importance: value.abs(),
                value,
            }
        })
        .collect();

    top_by_abs_importance(contributions)
}

fn value_at(features: &[FeatureValue], index: usize) -> f64 {
    features.get(index).map(FeatureValue::as_f64).unwrap_or(0.0)
}

/// Stable sort, so ties keep schema order
fn top_by_abs_importance(mut contributions: Vec<FeatureContribution>) -> Vec<FeatureContribution> {
    contributions.sort_by(|a, b| sort_key(b.importance).total_cmp(&sort_key(a.importance)));
    contributions.truncate(TOP_FEATURES);
    contributions
}

fn sort_key(importance: f64) -> f64 {
    if importance.is_finite() { importance.abs() } else { 0.0 }
}
