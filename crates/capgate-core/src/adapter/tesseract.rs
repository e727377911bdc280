//! Tesseract OCR recognizer.
//!
//! Pipes the uploaded image into the `tesseract` command-line engine
//! (`tesseract stdin stdout`) and returns whatever text it prints. Each call
//! spawns its own process, so concurrent requests never share engine state.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::TextRecognizer;
use crate::config::OcrConfig;
use crate::error::{AdapterError, AdapterResult};

/// LSTM-only engine mode.
const OEM_LSTM_ONLY: &str = "1";

/// OCR adapter backed by the tesseract binary.
pub struct TesseractRecognizer {
    binary: String,
    tessdata_dir: PathBuf,
    languages: String,
}

impl TesseractRecognizer {
    pub fn new(config: &OcrConfig, tessdata_dir: PathBuf) -> Self {
        Self {
            binary: config.binary.clone(),
            tessdata_dir,
            languages: config.languages.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&self.tessdata_dir)
            .arg("-l")
            .arg(&self.languages)
            .arg("--oem")
            .arg(OEM_LSTM_ONLY)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, image: Bytes) -> AdapterResult<String> {
        let mut child = self.command().spawn().map_err(|e| AdapterError::Recognition {
            message: format!("Failed to start {}: {e}", self.binary),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A broken pipe means the engine exited early; its exit status
            // below carries the real reason.
            if let Err(e) = stdin.write_all(&image).await {
                tracing::debug!("OCR stdin write stopped early: {e}");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AdapterError::Recognition {
                message: format!("Failed to wait for {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::Recognition {
                message: format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image: Bytes, cancel: &CancellationToken) -> AdapterResult<String> {
        // The child is killed when the run future is dropped.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AdapterError::Cancelled),
            result = self.run(image) => result,
        }
    }
}
