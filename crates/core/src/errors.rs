use thiserror::Error;

use crate::flows::SessionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("product `{product_id}` rejected: {reason}")]
    InvalidProduct { product_id: String, reason: String },
    #[error("unknown {kind} `{value}`")]
    UnknownOption { kind: String, value: String },
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable class name for machine-readable command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Session(SessionError::InvalidQuantity { .. })) => {
                "invalid_quantity"
            }
            Self::Domain(DomainError::Session(SessionError::ProductNotFound { .. })) => {
                "product_not_found"
            }
            Self::Domain(_) => "domain_validation",
            Self::Persistence(_) => "persistence",
            Self::Integration(_) => "integration",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<SessionError> for ApplicationError {
    fn from(value: SessionError) -> Self {
        Self::Domain(DomainError::Session(value))
    }
}
