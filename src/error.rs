use arrow::error::ArrowError;
use ndarray::ShapeError;
use thiserror::Error;

/// Errors raised while inspecting or converting a collection.
///
/// `Type` covers inputs in the wrong layout and conversions a layout cannot
/// represent. `Value` covers well-typed inputs with unusable contents, such as
/// asking for the series length of an unequal-length collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Value(String),

    #[error("arrow: {0}")]
    Arrow(#[from] ArrowError),

    #[error("shape: {0}")]
    Shape(#[from] ShapeError),
}

impl CollectionError {
    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        CollectionError::Type(msg.into())
    }

    pub(crate) fn value_error(msg: impl Into<String>) -> Self {
        CollectionError::Value(msg.into())
    }

    /// Whether this is a type error (wrong layout or impossible conversion).
    pub fn is_type_error(&self) -> bool {
        matches!(self, CollectionError::Type(_))
    }

    /// Whether this is a value error.
    pub fn is_value_error(&self) -> bool {
        matches!(self, CollectionError::Value(_))
    }
}

pub type Result<T> = std::result::Result<T, CollectionError>;
