//! Upload models handed to downstream request handlers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A file accepted by the upload middleware and stored by the media service.
///
/// Inserted into the request extensions for single-file uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Form field the file arrived on
    pub field_name: String,
    pub original_filename: String,
    pub content_type: String,
    /// Identifier assigned by the media service (includes the folder)
    pub public_id: String,
    pub folder: String,
    pub format: String,
    pub size_bytes: u64,
    pub url: String,
    pub secure_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Files accepted by an array upload, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadedFiles(pub Vec<UploadedFile>);

impl UploadedFiles {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadedFile> {
        self.0.iter()
    }
}

impl IntoIterator for UploadedFiles {
    type Item = UploadedFile;
    type IntoIter = std::vec::IntoIter<UploadedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Non-file multipart fields of an upload request.
///
/// When a name repeats, the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
