use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media service backend types
///
/// Defined in core because configuration selects the backend before the
/// storage crate builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    /// Hosted image service reached over its signed upload API
    Cloudinary,
    /// In-process recorder, for local development and tests
    Memory,
}

impl FromStr for MediaBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Ok(MediaBackend::Cloudinary),
            "memory" => Ok(MediaBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid media backend: {}", s)),
        }
    }
}

impl Display for MediaBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaBackend::Cloudinary => write!(f, "cloudinary"),
            MediaBackend::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!(
            "Cloudinary".parse::<MediaBackend>().unwrap(),
            MediaBackend::Cloudinary
        );
        assert_eq!(" memory ".parse::<MediaBackend>().unwrap(), MediaBackend::Memory);
        assert!("s3".parse::<MediaBackend>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        let backend = MediaBackend::Memory;
        assert_eq!(backend.to_string().parse::<MediaBackend>().unwrap(), backend);
    }
}
