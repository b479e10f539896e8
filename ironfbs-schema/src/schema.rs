//! The resolved schema graph.

use crate::definitions::{Definition, EnumDef, StructDef};
use crate::types::{BaseType, EnumId, StructId, Type};

/// Complete, resolved schema consumed by the generators.
///
/// Definitions reference each other through [`StructId`] and [`EnumId`]
/// indices into [`Schema::structs`] and [`Schema::enums`]. Once built the
/// graph is never mutated.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Base name of the schema file, used for single-file output names.
    pub file_name: String,
    /// Enums and unions in declaration order.
    pub enums: Vec<EnumDef>,
    /// Structs and tables in declaration order.
    pub structs: Vec<StructDef>,
    /// Designated root table.
    pub root_struct_def: Option<StructId>,
    /// Four-byte buffer identifier.
    pub file_identifier: Option<String>,
    /// Preferred binary file extension.
    pub file_extension: Option<String>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// Returns the enum with the given id.
    ///
    /// # Panics
    /// Panics if the id does not belong to this schema.
    #[must_use]
    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.0]
    }

    /// Returns the struct with the given id.
    ///
    /// # Panics
    /// Panics if the id does not belong to this schema.
    #[must_use]
    pub fn struct_def(&self, id: StructId) -> &StructDef {
        &self.structs[id.0]
    }

    /// Returns the enum referenced by a type.
    #[must_use]
    pub fn enum_of(&self, ty: &Type) -> Option<&EnumDef> {
        ty.enum_def.map(|id| self.enum_def(id))
    }

    /// Returns the struct referenced by a type.
    #[must_use]
    pub fn struct_of(&self, ty: &Type) -> Option<&StructDef> {
        ty.struct_def.map(|id| self.struct_def(id))
    }

    /// Returns the root table.
    #[must_use]
    pub fn root_struct(&self) -> Option<&StructDef> {
        self.root_struct_def.map(|id| self.struct_def(id))
    }

    /// Returns true if `struct_def` is the root table.
    #[must_use]
    pub fn is_root(&self, struct_def: &StructDef) -> bool {
        self.root_struct().is_some_and(|root| std::ptr::eq(root, struct_def))
    }

    /// Finds a struct by fully-qualified name.
    #[must_use]
    pub fn find_struct(&self, qualified_name: &str) -> Option<&StructDef> {
        self.structs
            .iter()
            .find(|s| s.fully_qualified_name() == qualified_name)
    }

    /// Finds an enum by fully-qualified name.
    #[must_use]
    pub fn find_enum(&self, qualified_name: &str) -> Option<&EnumDef> {
        self.enums
            .iter()
            .find(|e| e.fully_qualified_name() == qualified_name)
    }

    /// Returns true if the type is (or has elements that are) a fixed struct.
    #[must_use]
    pub fn is_fixed_struct(&self, ty: &Type) -> bool {
        self.struct_of(ty).is_some_and(|s| s.fixed)
            && (ty.is_struct() || ty.is_vector() || ty.is_array())
    }

    /// Returns true if the type is a table reference.
    #[must_use]
    pub fn is_table(&self, ty: &Type) -> bool {
        ty.is_struct() && self.struct_of(ty).is_some_and(|s| !s.fixed)
    }

    /// Returns the number of bytes a value of this type occupies inline.
    #[must_use]
    pub fn inline_size(&self, ty: &Type) -> usize {
        inline_size_in(&self.structs, ty)
    }

    /// Returns the inline alignment of a value of this type.
    #[must_use]
    pub fn inline_alignment(&self, ty: &Type) -> usize {
        inline_alignment_in(&self.structs, ty)
    }

    /// Returns true if some field nests a buffer rooted at `struct_def`.
    #[must_use]
    pub fn is_nested_root(&self, struct_def: &StructDef) -> bool {
        self.structs
            .iter()
            .flat_map(|s| &s.fields)
            .filter_map(|f| f.nested_flatbuffer)
            .any(|id| std::ptr::eq(self.struct_def(id), struct_def))
    }
}

/// Inline size over a struct list that may still be under construction.
pub(crate) fn inline_size_in(structs: &[StructDef], ty: &Type) -> usize {
    match ty.base_type {
        BaseType::Struct => match ty.struct_def.map(|id| &structs[id.0]) {
            Some(s) if s.fixed => s.bytesize,
            _ => BaseType::Struct.size(),
        },
        BaseType::Array => inline_size_in(structs, &ty.vector_type()) * usize::from(ty.fixed_length),
        base => base.size(),
    }
}

/// Inline alignment over a struct list that may still be under construction.
pub(crate) fn inline_alignment_in(structs: &[StructDef], ty: &Type) -> usize {
    match ty.base_type {
        BaseType::Struct => match ty.struct_def.map(|id| &structs[id.0]) {
            Some(s) if s.fixed => s.minalign,
            _ => BaseType::Struct.size(),
        },
        BaseType::Array => inline_alignment_in(structs, &ty.vector_type()),
        base => base.size(),
    }
}
