//! Mediashim Upload Library
//!
//! Wires a media service into axum's request pipeline. An [`UploaderFactory`]
//! owns the service client and lazily builds one [`UploadEngine`] (the multipart
//! parser bound to a storage adapter). Every [`UploadMiddleware`] it hands out
//! shares that engine:
//!
//! ```ignore
//! let factory = UploaderFactory::new(credentials)?;
//! let app = Router::new()
//!     .route("/avatars", post(save_avatar))
//!     .layer(from_fn_with_state(factory.single_field("image", "avatars"), upload_files));
//! ```
//!
//! Handlers read the results from request extensions: [`UploadedFile`] for
//! single uploads, [`UploadedFiles`] for arrays and [`FormFields`] for the text
//! fields of the form.

pub mod engine;
pub mod error;
pub mod factory;
pub mod middleware;

pub use engine::{ParsedUpload, UploadEngine, UploadLimits};
pub use error::{ErrorResponse, HttpUploadError};
pub use factory::{UploaderFactory, DEFAULT_ARRAY_FIELD, DEFAULT_SINGLE_FIELD};
pub use mediashim_core::{FormFields, UploadError, UploadedFile, UploadedFiles};
pub use middleware::{upload_files, UploadMiddleware, UploadMode};
