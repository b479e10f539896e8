//! Declarative schema documents.
//!
//! A schema document is a JSON description of the definitions of one
//! compilation. It is already tokenized: type expressions are short strings
//! such as `"ubyte"`, `"[Monster]"` or `"[float:3]"`, and names are resolved
//! by [`crate::parser`].

use serde::{Deserialize, Serialize};

use crate::definitions::Attributes;

/// Top-level schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Base name of the schema file.
    #[serde(default)]
    pub file_name: String,
    /// Enums and unions.
    #[serde(default)]
    pub enums: Vec<EnumDocument>,
    /// Structs and tables.
    #[serde(default)]
    pub structs: Vec<StructDocument>,
    /// Name of the root table.
    #[serde(default)]
    pub root_type: Option<String>,
    /// Four-byte buffer identifier.
    #[serde(default)]
    pub file_identifier: Option<String>,
    /// Preferred binary file extension.
    #[serde(default)]
    pub file_extension: Option<String>,
}

/// Enum or union declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDocument {
    /// Declared name.
    pub name: String,
    /// Dotted namespace.
    #[serde(default)]
    pub namespace: String,
    /// Integer storage type; unions always use `ubyte`.
    #[serde(default)]
    pub underlying_type: Option<String>,
    /// Declares a union.
    #[serde(default)]
    pub is_union: bool,
    /// Members in declaration order.
    #[serde(default)]
    pub values: Vec<EnumValueDocument>,
    /// Metadata attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Documentation lines.
    #[serde(default)]
    pub doc: Vec<String>,
    /// Already emitted by an including schema.
    #[serde(default)]
    pub generated: bool,
}

/// Enum member or union variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDocument {
    /// Member name; for union variants also the payload table name.
    pub name: String,
    /// Explicit value (bit position for `bit_flags` enums).
    #[serde(default)]
    pub value: Option<i64>,
    /// Union payload type, when it differs from the member name.
    #[serde(default, rename = "type")]
    pub union_type: Option<String>,
    /// Documentation lines.
    #[serde(default)]
    pub doc: Vec<String>,
}

/// Struct or table declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDocument {
    /// Declared name.
    pub name: String,
    /// Dotted namespace.
    #[serde(default)]
    pub namespace: String,
    /// Declares a fixed struct instead of a table.
    #[serde(default)]
    pub fixed: bool,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
    /// Metadata attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Documentation lines.
    #[serde(default)]
    pub doc: Vec<String>,
    /// Already emitted by an including schema.
    #[serde(default)]
    pub generated: bool,
}

/// Field declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    /// Field name.
    pub name: String,
    /// Type expression.
    #[serde(rename = "type")]
    pub type_expr: String,
    /// Default value (number, bool, or enum member name).
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Field is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Field must be present.
    #[serde(default)]
    pub required: bool,
    /// Field is the sort key.
    #[serde(default)]
    pub key: bool,
    /// Root table of the nested buffer stored in this field.
    #[serde(default)]
    pub nested_flatbuffer: Option<String>,
    /// Metadata attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Documentation lines.
    #[serde(default)]
    pub doc: Vec<String>,
}
