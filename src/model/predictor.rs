//! Predictor + Label Decoder
//!
//! Argmax over the pipeline's distribution, then index → label with a
//! fallback to the pipeline's own prediction when the encoder can't answer.

use serde::Serialize;

use super::labels::{LabelEncoder, LabelError};
use super::pipeline::{Pipeline, PipelineError};
use super::schema::FeatureValue;

/// Winning class of a distribution
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub index: usize,
    pub confidence: f32,
}

/// Index of the largest entry; first wins on ties, NaN never wins
pub fn argmax(distribution: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in distribution.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if p <= b => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}

pub fn predict_distribution(
    pipeline: &dyn Pipeline,
    features: &[FeatureValue],
) -> Result<ClassScore, PipelineError> {
    let distribution = pipeline.predict_proba(features)?;
    let index = argmax(&distribution).ok_or(PipelineError::EmptyDistribution)?;

    Ok(ClassScore {
        index,
        confidence: distribution[index],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Encoder,
    Pipeline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLabel {
    pub label: String,
    pub source: LabelSource,
}

pub fn decode_label(
    labels: Option<&LabelEncoder>,
    pipeline: &dyn Pipeline,
    index: usize,
    features: &[FeatureValue],
) -> Result<DecodedLabel, PipelineError> {
    let primary = labels
        .ok_or(LabelError::NotLoaded)
        .and_then(|encoder| encoder.inverse_transform(index));

    match primary {
        Ok(label) => Ok(DecodedLabel {
            label: label.to_string(),
            source: LabelSource::Encoder,
        }),
        Err(e) => {
            tracing::warn!(index, "Label decode failed ({}), asking pipeline directly", e);
            let label = pipeline.predict_label(features)?;
            Ok(DecodedLabel { label, source: LabelSource::Pipeline })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        proba: Vec<f32>,
        label: Option<&'static str>,
    }

    impl Pipeline for Fixed {
        fn predict_proba(&self, _: &[FeatureValue]) -> Result<Vec<f32>, PipelineError> {
            Ok(self.proba.clone())
        }

        fn predict_label(&self, _: &[FeatureValue]) -> Result<String, PipelineError> {
            self.label
                .map(str::to_string)
                .ok_or_else(|| PipelineError::Runtime("no label".to_string()))
        }
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some(0));
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.7]), Some(2));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_confidence_is_max_entry() {
        let p = Fixed { proba: vec![0.05, 0.15, 0.8], label: None };
        let score = predict_distribution(&p, &[]).unwrap();
        assert_eq!(score.index, 2);
        assert_eq!(score.confidence, 0.8);
    }

    #[test]
    fn test_empty_distribution_is_error() {
        let p = Fixed { proba: vec![], label: None };
        assert!(matches!(predict_distribution(&p, &[]), Err(PipelineError::EmptyDistribution)));
    }

    #[test]
    fn test_encoder_path() {
        let enc = LabelEncoder::new(vec!["normal".into(), "attack".into()]);
        let p = Fixed { proba: vec![], label: Some("1") };
        let decoded = decode_label(Some(&enc), &p, 1, &[]).unwrap();
        assert_eq!(decoded, DecodedLabel { label: "attack".into(), source: LabelSource::Encoder });
    }

    #[test]
    fn test_falls_back_when_encoder_missing_or_short() {
        let p = Fixed { proba: vec![], label: Some("4") };

        let decoded = decode_label(None, &p, 0, &[]).unwrap();
        assert_eq!(decoded.source, LabelSource::Pipeline);
        assert_eq!(decoded.label, "4");

        let short = LabelEncoder::new(vec!["only".into()]);
        let decoded = decode_label(Some(&short), &p, 4, &[]).unwrap();
        assert_eq!(decoded.source, LabelSource::Pipeline);
    }

    #[test]
    fn test_both_paths_fail() {
        let p = Fixed { proba: vec![], label: None };
        assert!(decode_label(None, &p, 0, &[]).is_err());
    }
}
