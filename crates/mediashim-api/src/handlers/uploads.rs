//! Handlers behind the upload middleware
//!
//! Files have already been stored when these run; they only report what the
//! middleware left in the request extensions.

use crate::middleware::RequestId;
use axum::{http::StatusCode, Extension, Json};
use mediashim_upload::{
    FormFields, HttpUploadError, UploadError, UploadedFile, UploadedFiles, DEFAULT_SINGLE_FIELD,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub files: Vec<UploadedFile>,
    pub fields: FormFields,
}

pub async fn upload_avatar(
    Extension(request_id): Extension<RequestId>,
    file: Option<Extension<UploadedFile>>,
    Extension(fields): Extension<FormFields>,
) -> Result<(StatusCode, Json<UploadedFile>), HttpUploadError> {
    let Some(Extension(file)) = file else {
        return Err(UploadError::MissingFile(DEFAULT_SINGLE_FIELD.to_string()).into());
    };

    tracing::info!(
        request_id = %request_id.0,
        public_id = %file.public_id,
        secure_url = %file.secure_url,
        form_fields = fields.len(),
        "Avatar uploaded"
    );

    Ok((StatusCode::CREATED, Json(file)))
}

pub async fn upload_gallery(
    Extension(request_id): Extension<RequestId>,
    Extension(files): Extension<UploadedFiles>,
    Extension(fields): Extension<FormFields>,
) -> (StatusCode, Json<GalleryResponse>) {
    tracing::info!(
        request_id = %request_id.0,
        files = files.len(),
        total_bytes = files.iter().map(|f| f.size_bytes).sum::<u64>(),
        "Gallery uploaded"
    );

    (
        StatusCode::CREATED,
        Json(GalleryResponse {
            files: files.0,
            fields,
        }),
    )
}
