//! Schema definitions: namespaces, structs, tables, fields, enums and unions.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{BaseType, Type, Value};

/// Schema-level metadata attached to a definition or field.
pub type Attributes = BTreeMap<String, String>;

/// Suffix of the hidden discriminant field paired with every union field.
pub const UNION_TYPE_FIELD_SUFFIX: &str = "_type";

/// Ordered sequence of namespace components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Namespace {
    /// Components, outermost first.
    pub components: Vec<String>,
}

impl Namespace {
    /// Creates a namespace from its components.
    #[must_use]
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }

    /// Returns the empty (root) namespace.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dotted namespace such as `MyGame.Example`.
    #[must_use]
    pub fn from_dotted(dotted: &str) -> Self {
        let components = dotted
            .split('.')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self { components }
    }

    /// Returns true for the root namespace.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the number of leading components shared with `other`.
    #[must_use]
    pub fn common_prefix_len(&self, other: &Namespace) -> usize {
        self.components
            .iter()
            .zip(&other.components)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Returns the innermost component, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Joins the components with `separator`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.components.join(separator)
    }

    /// Qualifies `name` with this namespace using `separator`.
    #[must_use]
    pub fn qualify(&self, name: &str, separator: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}{}{}", self.join(separator), separator, name)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

/// Common view over enum and struct definitions.
pub trait Definition {
    /// Declared name.
    fn name(&self) -> &str;

    /// Owning namespace.
    fn namespace(&self) -> &Namespace;

    /// Documentation lines.
    fn doc_comment(&self) -> &[String];

    /// True when the definition was already emitted by an including schema.
    fn is_generated(&self) -> bool;

    /// Metadata attributes.
    fn attributes(&self) -> &Attributes;

    /// Looks up a single attribute.
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes().get(key).map(String::as_str)
    }

    /// Dotted fully-qualified name.
    fn fully_qualified_name(&self) -> String {
        self.namespace().qualify(self.name(), ".")
    }
}

/// A field of a struct or table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Type, default constant and offset.
    pub value: Value,
    /// Documentation lines.
    pub doc_comment: Vec<String>,
    /// Metadata attributes.
    pub attributes: Attributes,
    /// Field is kept for its slot but no longer accessed.
    pub deprecated: bool,
    /// Table field that must be present in every buffer.
    pub required: bool,
    /// Field used for sorted-vector binary search.
    pub key: bool,
    /// Padding bytes following this field inside a fixed struct.
    ///
    /// Builders write the buffer back to front, so they emit this padding
    /// immediately before writing the field itself.
    pub padding: usize,
    /// Table type serialized inside this `[ubyte]` field.
    pub nested_flatbuffer: Option<crate::types::StructId>,
}

impl FieldDef {
    /// Creates a field of the given type with a zero default.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            value: Value::new(ty),
            ..Self::default()
        }
    }

    /// Returns the field type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.value.ty
    }

    /// Returns the vtable slot index of a table field.
    #[must_use]
    pub fn slot(&self) -> usize {
        usize::from(self.value.offset.saturating_sub(4)) / 2
    }

    /// Returns true for a hidden union discriminant field.
    #[must_use]
    pub fn is_union_discriminant(&self) -> bool {
        self.value.ty.is_discriminant()
    }

    /// For a discriminant field, returns the name of the union field it tags.
    #[must_use]
    pub fn tagged_union_name(&self) -> Option<&str> {
        if self.is_union_discriminant() {
            self.name.strip_suffix(UNION_TYPE_FIELD_SUFFIX)
        } else {
            None
        }
    }
}

/// A fixed struct or a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructDef {
    /// Declared name.
    pub name: String,
    /// Owning namespace.
    pub namespace: Namespace,
    /// Documentation lines.
    pub doc_comment: Vec<String>,
    /// Metadata attributes.
    pub attributes: Attributes,
    /// Already emitted by an including schema.
    pub generated: bool,
    /// Fixed struct (inline layout) rather than a table.
    pub fixed: bool,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
    /// Table fields are written largest first.
    pub sortbysize: bool,
    /// One field is marked as key.
    pub has_key: bool,
    /// Alignment of a fixed struct.
    pub minalign: usize,
    /// Size of a fixed struct.
    pub bytesize: usize,
}

impl StructDef {
    /// Returns the field marked as key.
    #[must_use]
    pub fn key_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key)
    }

    /// Finds a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterates over fields that are not deprecated.
    pub fn live_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.deprecated)
    }
}

impl Definition for StructDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn doc_comment(&self) -> &[String] {
        &self.doc_comment
    }

    fn is_generated(&self) -> bool {
        self.generated
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A member of an enum or union.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumVal {
    /// Member name.
    pub name: String,
    /// Integer value.
    pub value: i64,
    /// Payload type for union members, `None` otherwise.
    pub union_type: Type,
    /// Documentation lines.
    pub doc_comment: Vec<String>,
}

impl EnumVal {
    /// Returns true for the zero member.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value == 0
    }
}

/// An enum or union.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumDef {
    /// Declared name.
    pub name: String,
    /// Owning namespace.
    pub namespace: Namespace,
    /// Documentation lines.
    pub doc_comment: Vec<String>,
    /// Metadata attributes.
    pub attributes: Attributes,
    /// Already emitted by an including schema.
    pub generated: bool,
    /// Members carry payload types.
    pub is_union: bool,
    /// Integer storage type.
    pub underlying_type: Type,
    /// Members in declaration order.
    pub vals: Vec<EnumVal>,
}

impl EnumDef {
    /// Returns the first member with the given value.
    #[must_use]
    pub fn reverse_lookup(&self, value: i64) -> Option<&EnumVal> {
        self.vals.iter().find(|v| v.value == value)
    }

    /// Finds a member by name.
    #[must_use]
    pub fn val(&self, name: &str) -> Option<&EnumVal> {
        self.vals.iter().find(|v| v.name == name)
    }

    /// Smallest member value.
    #[must_use]
    pub fn min_value(&self) -> Option<i64> {
        self.vals.iter().map(|v| v.value).min()
    }

    /// Largest member value.
    #[must_use]
    pub fn max_value(&self) -> Option<i64> {
        self.vals.iter().map(|v| v.value).max()
    }

    /// Returns true for `bit_flags` enums.
    #[must_use]
    pub fn is_bit_flags(&self) -> bool {
        self.attributes.contains_key("bit_flags")
    }

    /// Returns the underlying integer base type.
    #[must_use]
    pub fn underlying_base(&self) -> BaseType {
        self.underlying_type.base_type
    }

    /// Returns true if any member carries a string payload.
    #[must_use]
    pub fn has_string_variant(&self) -> bool {
        self.vals.iter().any(|v| v.union_type.is_string())
    }
}

impl Definition for EnumDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn doc_comment(&self) -> &[String] {
        &self.doc_comment
    }

    fn is_generated(&self) -> bool {
        self.generated
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
