//! ONNX Runtime session wrapper for image classification models.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{AdapterError, AdapterResult};

/// Wraps an ONNX Runtime session for a single-output classifier.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct ClassifierSession {
    session: Mutex<Session>,
    /// Name of the input tensor (configured, or detected from model metadata).
    input_name: String,
}

impl ClassifierSession {
    /// Load a classification model from an ONNX file.
    ///
    /// `input_name` overrides the detected input tensor name when non-empty.
    pub fn load(model_path: &Path, input_name: &str) -> AdapterResult<Self> {
        let session = Session::builder()
            .map_err(|e| AdapterError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| AdapterError::ModelLoad {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = if input_name.is_empty() {
            session
                .inputs()
                .first()
                .map(|i| i.name().to_string())
                .unwrap_or_else(|| "data".to_string())
        } else {
            input_name.to_string()
        };

        tracing::debug!(
            model = ?model_path,
            input = %input_name,
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "Loaded classification model"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Run inference on a preprocessed NCHW tensor and return the raw scores
    /// of the first output, one per class.
    pub fn scores(&self, preprocessed: &Array4<f32>) -> AdapterResult<Vec<f32>> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data)).map_err(|e| {
            AdapterError::Classification {
                message: format!("Failed to create input tensor: {e}"),
            }
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| AdapterError::Classification {
                message: format!("Session lock poisoned: {e}"),
            })?;

        let outputs = session
            .run(inputs)
            .map_err(|e| AdapterError::Classification {
                message: format!("ONNX inference failed: {e}"),
            })?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| AdapterError::Classification {
                message: "Model produced no outputs".to_string(),
            })?;

        let (shape, data) =
            output
                .try_extract_tensor::<f32>()
                .map_err(|e| AdapterError::Classification {
                    message: format!("Failed to extract output tensor: {e}"),
                })?;

        // Classifier heads emit [1, classes] or [classes].
        match shape.len() {
            1 | 2 => Ok(data.to_vec()),
            _ => Err(AdapterError::Classification {
                message: format!("Unexpected output shape: {:?}", shape),
            }),
        }
    }
}
