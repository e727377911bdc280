//! Output formatting shared by every endpoint.
//!
//! Results render either as JSON (the default) or, when the client asks for
//! `outputFormat=text`, as a bare plain-text body.

use serde::Serialize;
use serde_json::Value;

use crate::types::{
    Answer, BatchItem, Description, ProcessingResult, Recognized, EMPTY_PLACEHOLDER,
};

/// Response rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON body
    #[default]
    Structured,
    /// `text/plain` body without any wrapping
    PlainText,
}

impl OutputFormat {
    /// Interpret the `outputFormat` query flag.
    ///
    /// Only `text` (any case, surrounding whitespace ignored) selects plain
    /// text; anything else, including no flag at all, selects JSON.
    pub fn parse(flag: Option<&str>) -> Self {
        match flag {
            Some(f) if f.trim().eq_ignore_ascii_case("text") => OutputFormat::PlainText,
            _ => OutputFormat::Structured,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "json",
            OutputFormat::PlainText => "text",
        }
    }
}

/// Plain-text rendering of a result.
pub trait PlainText {
    fn plain_text(&self) -> String;
}

impl PlainText for ProcessingResult {
    fn plain_text(&self) -> String {
        match self {
            ProcessingResult::Label(c) => format!("{}: {:.4}", c.label, c.confidence),
            ProcessingResult::Text(text) => text.clone(),
        }
    }
}

impl PlainText for Description {
    fn plain_text(&self) -> String {
        self.description.clone()
    }
}

impl PlainText for Answer {
    fn plain_text(&self) -> String {
        self.answer.clone()
    }
}

impl PlainText for Recognized {
    fn plain_text(&self) -> String {
        self.text.clone()
    }
}

impl PlainText for [BatchItem] {
    fn plain_text(&self) -> String {
        self.iter()
            .map(|item| format!("{}: {}", item.file, item.label))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A formatted response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Json(Value),
    Text(String),
}

/// Render `value` in `format`. A blank plain-text rendering becomes
/// [`EMPTY_PLACEHOLDER`].
pub fn render<T>(value: &T, format: OutputFormat) -> Rendered
where
    T: Serialize + PlainText + ?Sized,
{
    match format {
        OutputFormat::Structured => match serde_json::to_value(value) {
            Ok(json) => Rendered::Json(json),
            Err(e) => {
                tracing::error!("Failed to serialize response: {e}");
                Rendered::Json(Value::Null)
            }
        },
        OutputFormat::PlainText => Rendered::Text(non_blank(value.plain_text())),
    }
}

/// Replace blank text with [`EMPTY_PLACEHOLDER`].
pub fn non_blank(text: String) -> String {
    if text.trim().is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        text
    }
}
