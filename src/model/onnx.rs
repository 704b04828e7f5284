//! ONNX Runtime pipeline
//!
//! Runs the exported preprocessing+classifier graph. Expects the skl2onnx
//! classifier layout with `zipmap=False`: a label output and a
//! `[N, classes]` probability output. Inputs come in two shapes:
//!
//! - packed: a single float input `[N, features]` in schema order
//! - columns: one `[N, 1]` input per feature, named after it, typed by the
//!   exporter (string columns feed categorical encoders)

use std::path::Path;

use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};

use super::pipeline::{Pipeline, PipelineError};
use super::schema::{FeatureSchema, FeatureValue};
use super::ArtifactError;

// ============================================================================
// INPUT LAYOUT
// ============================================================================

/// Element type of a graph input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Float,
    Double,
    Int64,
    Text,
}

impl InputKind {
    fn from_element(ty: TensorElementType) -> Option<Self> {
        match ty {
            TensorElementType::Float32 => Some(Self::Float),
            TensorElementType::Float64 => Some(Self::Double),
            TensorElementType::Int64 => Some(Self::Int64),
            TensorElementType::String => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInput {
    pub name: String,
    pub slot: usize,
    pub kind: InputKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputLayout {
    /// One float tensor holding every slot in schema order
    Packed { name: String },
    /// One tensor per schema feature, matched by name
    Columns(Vec<ColumnInput>),
}

impl InputLayout {
    /// Map graph inputs onto schema slots
    pub fn resolve(inputs: &[(String, InputKind)], schema: &[String]) -> Result<Self, ArtifactError> {
        let slot_of = |name: &str| schema.iter().position(|f| f == name);

        if let [(name, kind)] = inputs {
            if slot_of(name).is_none() || schema.len() > 1 {
                if *kind != InputKind::Float {
                    return Err(ArtifactError::Model(format!(
                        "packed input {} must be float, got {:?}", name, kind
                    )));
                }
                return Ok(Self::Packed { name: name.clone() });
            }
        }

        let mut columns = Vec::with_capacity(inputs.len());
        for (name, kind) in inputs {
            let slot = slot_of(name).ok_or_else(|| {
                ArtifactError::Model(format!("model input {} has no matching feature", name))
            })?;
            columns.push(ColumnInput { name: name.clone(), slot, kind: *kind });
        }

        if columns.is_empty() {
            return Err(ArtifactError::Model("model declares no inputs".to_string()));
        }
        Ok(Self::Columns(columns))
    }
}

/// A single slot converted to its input's element type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Float(f32),
    Double(f64),
    Int64(i64),
    Text(String),
}

impl ColumnValue {
    pub fn convert(kind: InputKind, slot: usize, value: &FeatureValue) -> Result<Self, PipelineError> {
        let number = || value.as_number().ok_or_else(|| PipelineError::NonNumericInput {
            index: slot,
            value: value.to_string(),
        });

        Ok(match kind {
            InputKind::Text => match value {
                FeatureValue::Text(s) => Self::Text(s.clone()),
                FeatureValue::Number(v) => Self::Text(v.to_string()),
            },
            InputKind::Float => Self::Float(number()? as f32),
            InputKind::Double => Self::Double(number()?),
            InputKind::Int64 => Self::Int64(number()? as i64),
        })
    }

    fn into_tensor(self) -> Result<DynValue, PipelineError> {
        let tensor_err = |e: ort::Error| PipelineError::Runtime(format!("Tensor error: {}", e));
        match self {
            Self::Float(v) => Tensor::from_array(Array2::from_elem((1, 1), v)).map(|t| t.into_dyn()),
            Self::Double(v) => Tensor::from_array(Array2::from_elem((1, 1), v)).map(|t| t.into_dyn()),
            Self::Int64(v) => Tensor::from_array(Array2::from_elem((1, 1), v)).map(|t| t.into_dyn()),
            Self::Text(s) => Tensor::from_string_array(&Array2::from_elem((1, 1), s)).map(|t| t.into_dyn()),
        }
        .map_err(tensor_err)
    }
}

/// Schema-ordered float row for the packed layout
pub fn packed_row(features: &[FeatureValue]) -> Result<Array2<f32>, PipelineError> {
    let mut data = Vec::with_capacity(features.len());
    for (index, value) in features.iter().enumerate() {
        match value.as_number() {
            Some(v) => data.push(v as f32),
            None => return Err(PipelineError::NonNumericInput { index, value: value.to_string() }),
        }
    }

    Array2::<f32>::from_shape_vec((1, features.len()), data)
        .map_err(|e| PipelineError::Runtime(format!("Array error: {}", e)))
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct OnnxPipeline {
    session: Mutex<Session>,
    n_features: usize,
    layout: InputLayout,
    label_output: String,
    proba_output: String,
    importances: Option<Vec<f64>>,
    source: String,
}

impl OnnxPipeline {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, schema: &FeatureSchema) -> Result<Self, ArtifactError> {
        tracing::info!("Loading ONNX pipeline from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ArtifactError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Model(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ArtifactError::Model(format!("Failed to load model: {}", e)))?;

        let mut inputs = Vec::with_capacity(session.inputs.len());
        for input in &session.inputs {
            let kind = match &input.input_type {
                ValueType::Tensor { ty, .. } => InputKind::from_element(*ty),
                _ => None,
            }
            .ok_or_else(|| ArtifactError::Model(format!("unsupported input type for {}", input.name)))?;
            inputs.push((input.name.clone(), kind));
        }
        let layout = InputLayout::resolve(&inputs, schema.names())?;

        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let label_output = pick_output(&outputs, "label", 0)
            .ok_or_else(|| ArtifactError::Model("model has no label output".to_string()))?;
        let proba_output = pick_output(&outputs, "prob", 1)
            .ok_or_else(|| ArtifactError::Model("model has no probability output".to_string()))?;

        tracing::info!(
            inputs = inputs.len(),
            packed = matches!(layout, InputLayout::Packed { .. }),
            label_output = %label_output,
            proba_output = %proba_output,
            "ONNX pipeline loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            n_features: schema.len(),
            layout,
            label_output,
            proba_output,
            importances: None,
            source: model_path.display().to_string(),
        })
    }

    /// Attach importances exported from the final estimator
    pub fn with_importances(mut self, importances: Option<Vec<f64>>) -> Self {
        self.importances = importances;
        self
    }

    fn session_inputs(&self, features: &[FeatureValue]) -> Result<Vec<(String, DynValue)>, PipelineError> {
        if features.len() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        match &self.layout {
            InputLayout::Packed { name } => {
                let tensor = Tensor::from_array(packed_row(features)?)
                    .map_err(|e| PipelineError::Runtime(format!("Tensor error: {}", e)))?;
                Ok(vec![(name.clone(), tensor.into_dyn())])
            }
            InputLayout::Columns(columns) => columns
                .iter()
                .map(|c| {
                    let value = ColumnValue::convert(c.kind, c.slot, &features[c.slot])?;
                    Ok((c.name.clone(), value.into_tensor()?))
                })
                .collect(),
        }
    }

    /// Run the graph once and copy out the requested output
    fn run<T>(
        &self,
        features: &[FeatureValue],
        output_name: &str,
        extract: impl FnOnce(&DynValue) -> Result<T, PipelineError>,
    ) -> Result<T, PipelineError> {
        let inputs = self.session_inputs(features)?;

        let mut session = self.session.lock();
        let outputs = session.run(inputs)
            .map_err(|e| PipelineError::Runtime(e.to_string()))?;

        let output = outputs.get(output_name)
            .ok_or_else(|| PipelineError::MissingOutput(output_name.to_string()))?;

        extract(output)
    }
}

impl Pipeline for OnnxPipeline {
    fn predict_proba(&self, features: &[FeatureValue]) -> Result<Vec<f32>, PipelineError> {
        self.run(features, &self.proba_output, |output| {
            let (_, data) = output.try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Runtime(format!("Extract error: {}", e)))?;
            // Batch of one: the whole tensor is the first row
            Ok(data.to_vec())
        })
    }

    fn predict_label(&self, features: &[FeatureValue]) -> Result<String, PipelineError> {
        self.run(features, &self.label_output, |output| {
            if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                return data.first()
                    .map(|v| v.to_string())
                    .ok_or(PipelineError::MissingOutput("empty label tensor".to_string()));
            }
            let (_, data) = output.try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Runtime(format!("Extract error: {}", e)))?;
            data.first()
                .map(|v| v.to_string())
                .ok_or(PipelineError::MissingOutput("empty label tensor".to_string()))
        })
    }

    fn feature_importances(&self) -> Result<Option<Vec<f64>>, PipelineError> {
        Ok(self.importances.clone())
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.source)
    }
}

/// Output whose name contains `hint`, else the one at `fallback`
fn pick_output(names: &[String], hint: &str, fallback: usize) -> Option<String> {
    names.iter()
        .find(|n| n.to_ascii_lowercase().contains(hint))
        .or_else(|| names.get(fallback))
        .cloned()
}
