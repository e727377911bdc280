//! Capgate Core - capability dispatch and orchestration for AI backends.
//!
//! Capgate puts one HTTP surface in front of several AI engines: an ONNX
//! image classifier, Ollama-hosted text generation and agent models, and a
//! Tesseract OCR engine. This crate holds everything except the transport:
//! adapters, the capability registry, deadlines, orchestration workflows and
//! output formatting.
//!
//! # Architecture
//!
//! ```text
//! request → Orchestrator → CapabilityRegistry → AdapterHandle → backend
//!                      ↘ CancelScope (caller ∧ ceiling)
//! result  → format::render → JSON | text/plain
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use capgate_core::{Config, DispatchRequest, Orchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! let orchestrator = Orchestrator::from_config(&Config::load()?)?;
//! let result = orchestrator
//!     .dispatch(
//!         DispatchRequest {
//!             model: Some("textgeneration".into()),
//!             prompt: Some("Tell me a story".into()),
//!             ..Default::default()
//!         },
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! ```

pub mod adapter;
pub mod capability;
pub mod config;
pub mod deadline;
pub mod error;
pub mod format;
pub mod math;
pub mod mocks;
pub mod orchestrator;
pub mod registry;
pub mod types;

// Re-exports for convenient access
pub use capability::{CapabilityName, UnknownCapability};
pub use config::Config;
pub use deadline::{CancelScope, Interrupted};
pub use error::{AdapterError, ConfigError, GatewayError, Result, ServiceError, ServiceResult};
pub use format::{render, OutputFormat, PlainText, Rendered};
pub use orchestrator::{DispatchRequest, Orchestrator};
pub use registry::CapabilityRegistry;
pub use types::{
    Answer, BatchItem, Classification, Description, Payload, ProcessingResult, Recognized,
    UploadedItem,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
