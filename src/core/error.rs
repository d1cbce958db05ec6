use super::types::RestaurantClass;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failure: {0}")]
    Validation(String),

    #[error("Relationship violation: {0}")]
    Relationship(String),

    #[error("Capability absent: restaurant is not classified as {0}")]
    CapabilityAbsent(RestaurantClass),

    #[error("{entity} #{id} is not live")]
    MissingEntity { entity: &'static str, id: u64 },

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// Coarse classification of [`StoreError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Relationship,
    Persistence,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Relationship(_) | Self::CapabilityAbsent(_) | Self::MissingEntity { .. } => {
                ErrorKind::Relationship
            }
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn relationship(message: impl Into<String>) -> Self {
        Self::Relationship(message.into())
    }

    pub(crate) fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{}: {}", context, err))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
