//! # IronFBS Schema
//!
//! Resolved schema graph for the IronFBS code generators.
//!
//! This crate provides:
//! - The canonical base-type enumeration and type descriptors
//! - Struct, table, enum and union definitions with their namespaces
//! - A JSON schema-document loader that resolves names and computes layouts
//! - Schema validation

pub mod definitions;
pub mod document;
pub mod error;
pub mod parser;
pub mod schema;
pub mod types;
pub mod validation;

pub use definitions::{
    Attributes, Definition, EnumDef, EnumVal, FieldDef, Namespace, StructDef,
    UNION_TYPE_FIELD_SUFFIX,
};
pub use document::{
    EnumDocument, EnumValueDocument, FieldDocument, SchemaDocument, StructDocument,
};
pub use error::{ParseError, SchemaError};
pub use parser::{parse_schema, parse_schema_file, resolve_document};
pub use schema::Schema;
pub use types::{BaseType, EnumId, StructId, Type, Value};
pub use validation::{is_valid_identifier, validate_schema};
