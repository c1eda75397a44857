use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Adapter is not connected")]
    NotConnected,

    #[error("Document not found: {reason}")]
    NotFound { reason: String },

    #[error("Document update conflict: {reason}")]
    Conflict { reason: String },

    #[error("CouchDB error {status} ({error}): {reason}")]
    Couch {
        status: u16,
        error: String,
        reason: String,
    },
}

impl AdapterError {
    pub fn config(message: impl Into<String>) -> Self {
        AdapterError::ConfigError {
            message: message.into(),
        }
    }

    /// Builds the error for a non-2xx CouchDB reply from its status and
    /// `{error, reason}` body.
    pub fn from_couch(status: u16, error: String, reason: String) -> Self {
        match status {
            404 => AdapterError::NotFound { reason },
            409 => AdapterError::Conflict { reason },
            _ => AdapterError::Couch {
                status,
                error,
                reason,
            },
        }
    }

    /// Builds the error for a failed `_bulk_docs` row, which carries an error
    /// name but no HTTP status.
    pub fn from_bulk_row(error: String, reason: String) -> Self {
        let status = match error.as_str() {
            "not_found" => 404,
            "conflict" => 409,
            "forbidden" => 403,
            "unauthorized" => 401,
            _ => 500,
        };
        Self::from_couch(status, error, reason)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AdapterError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_couch_status_mapping() {
        let err = AdapterError::from_couch(404, "not_found".into(), "missing".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Document not found: missing");

        let err = AdapterError::from_couch(409, "conflict".into(), "Document update conflict.".into());
        assert!(err.is_conflict());

        let err = AdapterError::from_couch(401, "unauthorized".into(), "Name or password is incorrect.".into());
        match err {
            AdapterError::Couch { status, error, .. } => {
                assert_eq!(status, 401);
                assert_eq!(error, "unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_bulk_row() {
        assert!(AdapterError::from_bulk_row("conflict".into(), "Document update conflict.".into()).is_conflict());
        assert!(matches!(
            AdapterError::from_bulk_row("forbidden".into(), "no".into()),
            AdapterError::Couch { status: 403, .. }
        ));
    }
}
