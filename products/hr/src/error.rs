use std::fmt::Display;

use thiserror::Error;

use crate::field::Field;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HrError {
    #[error("invalid {field}: {reason}")]
    Validation { field: Field, reason: &'static str },
    #[error("invalid field: {0}")]
    UnknownField(String),
    #[error("invalid type for field {field}: {value:?}")]
    WrongType { field: Field, value: String },
    #[error("employee with id {id} not found")]
    NotFound { id: String },
}

impl HrError {
    pub(crate) fn validation(field: Field, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub fn not_found(id: &impl Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// True for every kind caused by a bad value or field name.
    pub fn is_validation(&self) -> bool {
        !self.is_not_found()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HrError::NotFound { .. })
    }
}
