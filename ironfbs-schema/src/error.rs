//! Error types for schema loading and validation.

use thiserror::Error;

/// Error type for schema document loading.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax or shape error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown type reference.
    #[error("unknown type '{type_name}' referenced in '{context}'")]
    UnknownType {
        /// Type name.
        type_name: String,
        /// Definition or field containing the reference.
        context: String,
    },

    /// Malformed type expression.
    #[error("invalid type expression '{expr}' in '{context}': {reason}")]
    InvalidType {
        /// Type expression as written.
        expr: String,
        /// Definition or field containing the expression.
        context: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Invalid constant or attribute value.
    #[error("invalid value '{value}' for '{context}': {reason}")]
    InvalidValue {
        /// Value as written.
        value: String,
        /// Field or attribute the value belongs to.
        context: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} definition: '{name}'")]
    DuplicateDefinition {
        /// Kind of definition (enum, struct, field, value).
        kind: String,
        /// Name of the duplicate.
        name: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for schema validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Loading error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Type not found.
    #[error("type '{name}' not found")]
    TypeNotFound {
        /// Type name.
        name: String,
    },

    /// Fixed struct that contains itself.
    #[error("circular type reference detected: {path}")]
    CircularReference {
        /// Path of the circular reference.
        path: String,
    },

    /// Enum value outside its underlying type.
    #[error("invalid enum value '{value}' for enum '{enum_name}'")]
    InvalidEnumValue {
        /// Enum name.
        enum_name: String,
        /// Invalid value.
        value: String,
    },

    /// Fixed struct whose fields and padding disagree with its size.
    #[error("layout mismatch for struct '{name}': declared {declared} bytes, calculated {calculated}")]
    LayoutMismatch {
        /// Struct name.
        name: String,
        /// Declared byte size.
        declared: usize,
        /// Sum of field sizes and padding.
        calculated: usize,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl ParseError {
    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            context: context.into(),
        }
    }

    /// Creates an invalid type expression error.
    pub fn invalid_type(
        expr: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidType {
            expr: expr.into(),
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(
        value: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            value: value.into(),
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl SchemaError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
