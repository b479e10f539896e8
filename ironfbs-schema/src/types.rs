//! Base types and type descriptors.
//!
//! This module contains the canonical base-type enumeration shared by the
//! whole toolchain, plus the [`Type`] and [`Value`] descriptors attached to
//! every field.

use std::fmt;

/// Index of a struct or table inside [`crate::Schema::structs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructId(pub usize);

/// Index of an enum or union inside [`crate::Schema::enums`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub usize);

/// Wire base types, in canonical order.
///
/// Every per-language type table is indexed by [`BaseType::index`], so the
/// tables must list their entries in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BaseType {
    /// No type (the zero member of a union).
    #[default]
    None,
    /// Union discriminant.
    UType,
    /// Boolean stored as one byte.
    Bool,
    /// Signed 8-bit integer.
    Char,
    /// Unsigned 8-bit integer.
    UChar,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UShort,
    /// Signed 32-bit integer.
    Int,
    /// Unsigned 32-bit integer.
    UInt,
    /// Signed 64-bit integer.
    Long,
    /// Unsigned 64-bit integer.
    ULong,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Offset to a length-prefixed UTF-8 string.
    String,
    /// Offset to a length-prefixed vector.
    Vector,
    /// Inline fixed struct, or offset to a table.
    Struct,
    /// Offset to a union payload.
    Union,
    /// Fixed-length inline array (structs only).
    Array,
}

impl BaseType {
    /// Number of base types.
    pub const COUNT: usize = 18;

    /// All base types in canonical order.
    pub const ALL: [BaseType; Self::COUNT] = [
        Self::None,
        Self::UType,
        Self::Bool,
        Self::Char,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Vector,
        Self::Struct,
        Self::Union,
        Self::Array,
    ];

    /// Returns the position of this type in the canonical order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the size in bytes this type occupies inline.
    ///
    /// Offset-typed values (strings, vectors, tables, unions) occupy 4 bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::None | Self::UType | Self::Bool | Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
            Self::String | Self::Vector | Self::Struct | Self::Union | Self::Array => 4,
        }
    }

    /// Returns true for scalar types (discriminant, bool, integers, floats).
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        let i = self as usize;
        i >= Self::UType as usize && i <= Self::Double as usize
    }

    /// Returns true for integer types, including bool and the discriminant.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        let i = self as usize;
        i >= Self::UType as usize && i <= Self::ULong as usize
    }

    /// Returns true for floating point types.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Returns true for signed integer types.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Char | Self::Short | Self::Int | Self::Long)
    }

    /// Returns true for types stored as an offset to out-of-line data.
    #[must_use]
    pub const fn is_offset(self) -> bool {
        matches!(self, Self::String | Self::Vector | Self::Union)
    }

    /// Returns the inclusive value range of an integer type.
    #[must_use]
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Bool => Some((0, 1)),
            Self::Char => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::UType | Self::UChar => Some((0, u8::MAX as i128)),
            Self::Short => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::UShort => Some((0, u16::MAX as i128)),
            Self::Int => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::UInt => Some((0, u32::MAX as i128)),
            Self::Long => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::ULong => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Returns the schema-language spelling of this type.
    #[must_use]
    pub const fn idl_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UType => "utype",
            Self::Bool => "bool",
            Self::Char => "byte",
            Self::UChar => "ubyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Vector => "vector",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Array => "array",
        }
    }

    /// Parses a scalar or string type name, accepting the sized aliases.
    #[must_use]
    pub fn from_idl_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Self::Bool),
            "byte" | "int8" => Some(Self::Char),
            "ubyte" | "uint8" => Some(Self::UChar),
            "short" | "int16" => Some(Self::Short),
            "ushort" | "uint16" => Some(Self::UShort),
            "int" | "int32" => Some(Self::Int),
            "uint" | "uint32" => Some(Self::UInt),
            "long" | "int64" => Some(Self::Long),
            "ulong" | "uint64" => Some(Self::ULong),
            "float" | "float32" => Some(Self::Float),
            "double" | "float64" => Some(Self::Double),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idl_name())
    }
}

/// Full type descriptor of a field or vector element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Type {
    /// Base type.
    pub base_type: BaseType,
    /// Element base type for vectors and arrays.
    pub element: BaseType,
    /// Referenced struct or table (for `Struct`, or vectors/arrays of them).
    pub struct_def: Option<StructId>,
    /// Referenced enum or union (for enum-typed scalars, unions, discriminants).
    pub enum_def: Option<EnumId>,
    /// Element count for `Array`.
    pub fixed_length: u16,
}

impl Type {
    /// Creates a plain type with no references.
    #[must_use]
    pub const fn new(base_type: BaseType) -> Self {
        Self {
            base_type,
            element: BaseType::None,
            struct_def: None,
            enum_def: None,
            fixed_length: 0,
        }
    }

    /// Creates an enum-typed scalar.
    #[must_use]
    pub const fn enumeration(underlying: BaseType, enum_def: EnumId) -> Self {
        Self {
            enum_def: Some(enum_def),
            ..Self::new(underlying)
        }
    }

    /// Creates a struct or table reference.
    #[must_use]
    pub const fn structure(struct_def: StructId) -> Self {
        Self {
            struct_def: Some(struct_def),
            ..Self::new(BaseType::Struct)
        }
    }

    /// Creates a union value type.
    #[must_use]
    pub const fn union(enum_def: EnumId) -> Self {
        Self {
            enum_def: Some(enum_def),
            ..Self::new(BaseType::Union)
        }
    }

    /// Creates a union discriminant type.
    #[must_use]
    pub const fn utype(enum_def: EnumId) -> Self {
        Self {
            enum_def: Some(enum_def),
            ..Self::new(BaseType::UType)
        }
    }

    /// Creates a vector whose elements have type `element`.
    #[must_use]
    pub fn vector_of(element: &Type) -> Self {
        Self {
            base_type: BaseType::Vector,
            element: element.base_type,
            struct_def: element.struct_def,
            enum_def: element.enum_def,
            fixed_length: 0,
        }
    }

    /// Creates a fixed-length array whose elements have type `element`.
    #[must_use]
    pub fn array_of(element: &Type, length: u16) -> Self {
        Self {
            base_type: BaseType::Array,
            fixed_length: length,
            ..Self::vector_of(element)
        }
    }

    /// Returns the element type of a vector or array.
    #[must_use]
    pub fn vector_type(&self) -> Type {
        Self {
            base_type: self.element,
            element: BaseType::None,
            struct_def: self.struct_def,
            enum_def: self.enum_def,
            fixed_length: 0,
        }
    }

    /// Returns true for scalar types.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.base_type.is_scalar()
    }

    /// Returns true for enum-typed scalars (not union discriminants).
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        self.enum_def.is_some()
            && self.base_type.is_integer()
            && !matches!(self.base_type, BaseType::UType)
    }

    /// Returns true for strings.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.base_type, BaseType::String)
    }

    /// Returns true for vectors.
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self.base_type, BaseType::Vector)
    }

    /// Returns true for fixed-length arrays.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self.base_type, BaseType::Array)
    }

    /// Returns true for struct or table references.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self.base_type, BaseType::Struct)
    }

    /// Returns true for union values.
    #[must_use]
    pub const fn is_union(&self) -> bool {
        matches!(self.base_type, BaseType::Union)
    }

    /// Returns true for vectors of union values.
    #[must_use]
    pub const fn is_union_vector(&self) -> bool {
        self.is_vector() && matches!(self.element, BaseType::Union)
    }

    /// Returns true for a discriminant or a vector of discriminants.
    #[must_use]
    pub const fn is_discriminant(&self) -> bool {
        matches!(self.base_type, BaseType::UType)
            || (self.is_vector() && matches!(self.element, BaseType::UType))
    }
}

/// Typed constant attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    /// Type of the field.
    pub ty: Type,
    /// Default constant in canonical textual form (`"0"` for non-scalars).
    pub constant: String,
    /// Byte offset inside a fixed struct, or vtable offset inside a table.
    pub offset: u16,
}

impl Value {
    /// Creates a value with a zero default and no offset.
    #[must_use]
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            constant: "0".to_string(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_index() {
        for (i, base) in BaseType::ALL.iter().enumerate() {
            assert_eq!(base.index(), i);
        }
        assert_eq!(BaseType::ALL.len(), BaseType::COUNT);
    }

    #[test]
    fn test_scalar_ranges() {
        assert!(BaseType::UType.is_scalar());
        assert!(BaseType::Double.is_scalar());
        assert!(!BaseType::String.is_scalar());
        assert!(!BaseType::None.is_scalar());
        assert!(BaseType::ULong.is_integer());
        assert!(!BaseType::Float.is_integer());
        assert!(BaseType::Float.is_float());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(BaseType::Bool.size(), 1);
        assert_eq!(BaseType::UShort.size(), 2);
        assert_eq!(BaseType::Float.size(), 4);
        assert_eq!(BaseType::Long.size(), 8);
        assert_eq!(BaseType::String.size(), 4);
    }

    #[test]
    fn test_idl_names() {
        assert_eq!(BaseType::from_idl_name("int8"), Some(BaseType::Char));
        assert_eq!(BaseType::from_idl_name("ubyte"), Some(BaseType::UChar));
        assert_eq!(BaseType::from_idl_name("float64"), Some(BaseType::Double));
        assert_eq!(BaseType::from_idl_name("Monster"), None);
        assert_eq!(BaseType::Short.to_string(), "short");
    }

    #[test]
    fn test_vector_type() {
        let element = Type::structure(StructId(3));
        let vector = Type::vector_of(&element);
        assert!(vector.is_vector());
        assert_eq!(vector.element, BaseType::Struct);
        assert_eq!(vector.vector_type(), element);

        let array = Type::array_of(&Type::new(BaseType::Int), 4);
        assert!(array.is_array());
        assert_eq!(array.fixed_length, 4);
        assert_eq!(array.vector_type(), Type::new(BaseType::Int));
    }

    #[test]
    fn test_enum_and_discriminant() {
        let color = Type::enumeration(BaseType::UChar, EnumId(0));
        assert!(color.is_enum());
        assert!(!Type::utype(EnumId(1)).is_enum());
        assert!(Type::utype(EnumId(1)).is_discriminant());
        assert!(Type::vector_of(&Type::utype(EnumId(1))).is_discriminant());
        assert!(Type::vector_of(&Type::union(EnumId(1))).is_union_vector());
    }
}
