//! API constants

/// Versioned API path prefix
pub const API_PREFIX: &str = "/api/v0";

/// Folder avatar uploads are stored in
pub const AVATAR_FOLDER: &str = "avatars";

/// Maximum number of requests processed concurrently
pub const HTTP_CONCURRENCY_LIMIT: usize = 256;
