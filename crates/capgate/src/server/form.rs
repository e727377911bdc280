//! Multipart form reading.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use capgate_core::UploadedItem;

use super::response::ApiError;

/// Field names whose content is always treated as an upload.
const FILE_FIELDS: [&str; 2] = ["file", "files"];

/// A fully buffered multipart form.
///
/// Field names are matched case-insensitively. Zero-byte uploads are kept
/// so batch results line up with the submitted files; single-file lookups
/// treat them as absent.
#[derive(Debug, Default)]
pub struct FormData {
    text: HashMap<String, String>,
    files: Vec<(String, UploadedItem)>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_ascii_lowercase();
            let file_name = field.file_name().map(str::to_string);

            if file_name.is_some() || FILE_FIELDS.contains(&name.as_str()) {
                let bytes = field.bytes().await?;
                let file_name = file_name.unwrap_or_else(|| name.clone());
                form.files.push((name, UploadedItem::new(file_name, bytes)));
            } else {
                let value = field.text().await?;
                form.text.entry(name).or_insert(value);
            }
        }

        tracing::debug!(
            fields = form.text.len(),
            files = form.files.len(),
            "Multipart form read"
        );
        Ok(form)
    }

    /// First text value of `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.text.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Content of the first upload under `name`, or `None` if it is empty.
    pub fn file(&self, name: &str) -> Option<Bytes> {
        let name = name.to_ascii_lowercase();
        self.files
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, item)| item.bytes.clone())
            .filter(|bytes| !bytes.is_empty())
    }

    /// Every upload under `name`, in submission order.
    pub fn files(&self, name: &str) -> Vec<UploadedItem> {
        let name = name.to_ascii_lowercase();
        self.files
            .iter()
            .filter(|(field, _)| *field == name)
            .map(|(_, item)| item.clone())
            .collect()
    }
}
