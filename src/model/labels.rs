//! Class label mapping (index ↔ label)

use serde::Deserialize;
use thiserror::Error;

use super::ArtifactError;

#[derive(Debug, Error, PartialEq)]
pub enum LabelError {
    #[error("label encoder not loaded")]
    NotLoaded,

    #[error("class index {index} out of range for {classes} known classes")]
    OutOfRange { index: usize, classes: usize },
}

/// Accepted on-disk layouts: `["a", "b"]` or `{"classes": ["a", "b"]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum EncoderFile {
    Classes(Vec<String>),
    Object { classes: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let classes = match serde_json::from_slice::<EncoderFile>(bytes)? {
            EncoderFile::Classes(c) | EncoderFile::Object { classes: c } => c,
        };
        Ok(Self::new(classes))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str, LabelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(LabelError::OutOfRange { index, classes: self.classes.len() })
    }
}
