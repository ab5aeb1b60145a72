use thiserror::Error;

/// Failure talking to the portal backend.
///
/// Every variant is a transport-class failure: the caller keeps its state and
/// the user may retry. Empty results are not errors and never show up here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("Invalid API base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status for status-class failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessors() {
        let err = ApiError::Status {
            endpoint: "http://localhost/api/delivery/tracking/X".to_string(),
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "http://localhost/api/delivery/tracking/X returned HTTP 404"
        );

        let decode = ApiError::Decode {
            endpoint: "x".to_string(),
            message: "eof".to_string(),
        };
        assert_eq!(decode.status(), None);
    }
}
