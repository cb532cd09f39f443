//! Unified error type for the hosting layers — maps module errors to HTTP
//! status codes. The analyzer core itself never surfaces these: its
//! failures become report notes.

use thiserror::Error;

const BAD_REQUEST: u16 = 400;
const NOT_FOUND: u16 = 404;
const INTERNAL_ERROR: u16 = 500;

#[derive(Error, Debug)]
pub enum FerretError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Loader error: {0}")]
    Loader(#[from] crate::loader::LoaderError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crate::extractor::ExtractError),

    #[error("Embedder error: {0}")]
    Embedder(#[from] crate::ranker::EmbedderError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl FerretError {
    /// HTTP status code for this error variant.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => BAD_REQUEST,
            Self::NotFound(_) => NOT_FOUND,
            Self::Loader(crate::loader::LoaderError::UnsupportedFormat(_)) => BAD_REQUEST,
            Self::Loader(_) | Self::Extract(_) | Self::Embedder(_) | Self::Internal(_) => {
                INTERNAL_ERROR
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FerretError::InvalidRequest("bad".to_string()).http_status(),
            400
        );
        assert_eq!(FerretError::NotFound("x".to_string()).http_status(), 404);
        assert_eq!(
            FerretError::Internal(anyhow::anyhow!("boom")).http_status(),
            500
        );
        assert_eq!(
            FerretError::Loader(crate::loader::LoaderError::UnsupportedFormat(
                "repo.zip".to_string()
            ))
            .http_status(),
            400
        );
    }
}
