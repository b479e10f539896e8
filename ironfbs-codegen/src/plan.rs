//! Build plans shared by every language plugin.
//!
//! The builders emitted by generated code write buffers back to front.
//! That makes the order of writes load-bearing, so it is computed once here
//! and each plugin only renders the resulting sequence in its own syntax.

use ironfbs_schema::{FieldDef, Schema, StructDef, Type};

/// Fixed-length array enclosing a struct builder parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySpan {
    /// Index in [`StructParam::path`] of the array field.
    pub field_index: usize,
    /// Number of elements.
    pub length: usize,
    /// Elements are structs whose fields were flattened.
    pub of_structs: bool,
}

/// One flattened parameter of a struct `Create` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructParam<'a> {
    /// Raw parameter name; nested names are prefixed with their parent field.
    pub name: String,
    /// Fields walked from the outer struct down to the written value.
    pub path: Vec<&'a FieldDef>,
    /// Scalar type of one written value.
    pub ty: Type,
    /// Enclosing array, if any.
    pub array: Option<ArraySpan>,
}

impl<'a> StructParam<'a> {
    /// Returns the field the value is written for.
    #[must_use]
    pub fn field(&self) -> &'a FieldDef {
        self.path[self.path.len() - 1]
    }
}

/// One step of a fixed struct builder, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructBuildOp {
    /// Align for a struct of `size` bytes aligned to `align`.
    Prep {
        /// Alignment.
        align: usize,
        /// Byte size.
        size: usize,
    },
    /// Write zero bytes.
    Pad(usize),
    /// Write one scalar parameter, indexed by the enclosing loop inside arrays.
    Put {
        /// Raw parameter name.
        param: String,
        /// Scalar type written.
        ty: Type,
        /// Inside an array loop.
        in_array: bool,
    },
    /// Start a loop over array elements, last element first.
    BeginArray {
        /// Number of elements.
        length: usize,
    },
    /// End the innermost array loop.
    EndArray,
}

/// Parameters and writes of a fixed struct `Create` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructBuildPlan<'a> {
    /// Parameters in declaration order.
    pub params: Vec<StructParam<'a>>,
    /// Builder steps in emission order (reverse declaration order).
    pub ops: Vec<StructBuildOp>,
}

impl<'a> StructBuildPlan<'a> {
    /// Computes the plan for a fixed struct.
    #[must_use]
    pub fn new(schema: &'a Schema, struct_def: &'a StructDef) -> Self {
        let mut params = Vec::new();
        collect_params(schema, struct_def, "", &[], None, &mut params);
        let mut ops = Vec::new();
        collect_ops(schema, struct_def, "", false, &mut ops);
        Self { params, ops }
    }

    /// Total bytes written by the plan, counting array repetitions.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        let mut total = 0;
        let mut multipliers = vec![1usize];
        for op in &self.ops {
            let multiplier = multipliers.last().copied().unwrap_or(1);
            match op {
                StructBuildOp::Prep { .. } => {}
                StructBuildOp::Pad(n) => total += n * multiplier,
                StructBuildOp::Put { ty, .. } => total += ty.base_type.size() * multiplier,
                StructBuildOp::BeginArray { length } => multipliers.push(multiplier * length),
                StructBuildOp::EndArray => {
                    multipliers.pop();
                }
            }
        }
        total
    }
}

fn collect_params<'a>(
    schema: &'a Schema,
    struct_def: &'a StructDef,
    prefix: &str,
    path: &[&'a FieldDef],
    array: Option<ArraySpan>,
    out: &mut Vec<StructParam<'a>>,
) {
    for field in &struct_def.fields {
        let mut chain = path.to_vec();
        chain.push(field);
        let name = format!("{prefix}{}", field.name);
        let ty = &field.value.ty;

        if ty.is_struct() {
            if let Some(child) = schema.struct_of(ty) {
                collect_params(schema, child, &format!("{name}_"), &chain, array, out);
            }
        } else if ty.is_array() {
            let element = ty.vector_type();
            let span = ArraySpan {
                field_index: chain.len() - 1,
                length: usize::from(ty.fixed_length),
                of_structs: element.is_struct(),
            };
            match schema.struct_of(&element) {
                Some(child) if element.is_struct() => {
                    collect_params(schema, child, &format!("{name}_"), &chain, Some(span), out);
                }
                _ => out.push(StructParam {
                    name,
                    path: chain,
                    ty: element,
                    array: Some(span),
                }),
            }
        } else {
            out.push(StructParam {
                name,
                path: chain,
                ty: ty.clone(),
                array,
            });
        }
    }
}

fn collect_ops(
    schema: &Schema,
    struct_def: &StructDef,
    prefix: &str,
    in_array: bool,
    ops: &mut Vec<StructBuildOp>,
) {
    ops.push(StructBuildOp::Prep {
        align: struct_def.minalign,
        size: struct_def.bytesize,
    });
    for field in struct_def.fields.iter().rev() {
        if field.padding > 0 {
            ops.push(StructBuildOp::Pad(field.padding));
        }
        let name = format!("{prefix}{}", field.name);
        let ty = &field.value.ty;

        if ty.is_struct() {
            if let Some(child) = schema.struct_of(ty) {
                collect_ops(schema, child, &format!("{name}_"), in_array, ops);
            }
        } else if ty.is_array() {
            let element = ty.vector_type();
            ops.push(StructBuildOp::BeginArray {
                length: usize::from(ty.fixed_length),
            });
            match schema.struct_of(&element) {
                Some(child) if element.is_struct() => {
                    collect_ops(schema, child, &format!("{name}_"), true, ops);
                }
                _ => ops.push(StructBuildOp::Put {
                    param: name,
                    ty: element,
                    in_array: true,
                }),
            }
            ops.push(StructBuildOp::EndArray);
        } else {
            ops.push(StructBuildOp::Put {
                param: name,
                ty: ty.clone(),
                in_array,
            });
        }
    }
}

/// Returns the order in which a table's fields are added by `Create`.
///
/// Sorted tables add the largest scalars first (8, 4, 2 then 1 byte),
/// walking fields in reverse declaration order within each size class.
#[must_use]
pub fn create_order<'a>(struct_def: &'a StructDef) -> Vec<&'a FieldDef> {
    let live: Vec<&FieldDef> = struct_def.live_fields().collect();
    if !struct_def.sortbysize {
        return live.into_iter().rev().collect();
    }
    let mut ordered = Vec::with_capacity(live.len());
    for size in [8, 4, 2, 1] {
        ordered.extend(
            live.iter()
                .rev()
                .filter(|f| f.value.ty.base_type.size() == size)
                .copied(),
        );
    }
    ordered
}

/// Returns true if the table can be built by a single `Create` call.
///
/// Inline structs must be written between `Start` and `Add`, which a
/// single call taking prebuilt values cannot sequence.
#[must_use]
pub fn supports_single_call_create(schema: &Schema, struct_def: &StructDef) -> bool {
    !struct_def
        .live_fields()
        .any(|f| f.value.ty.is_struct() && schema.is_fixed_struct(&f.value.ty))
}

/// Out-of-line value that must exist before a table is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// String.
    String,
    /// Nested table.
    Table,
    /// Union payload.
    Union,
    /// Vector of scalars or enums.
    ScalarVector,
    /// Vector of strings.
    StringVector,
    /// Vector of tables.
    TableVector,
    /// Vector of inline structs.
    StructVector,
    /// Vector of union payloads.
    UnionVector,
    /// Discriminants of a union vector.
    UnionTypeVector,
}

/// A child value built ahead of its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackChild<'a> {
    /// Field holding the child.
    pub field: &'a FieldDef,
    /// What is built.
    pub kind: ChildKind,
}

/// How a field is added between `Start` and `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Scalar or enum value.
    Scalar,
    /// Discriminant taken from the union payload.
    UnionType,
    /// Struct built in place.
    InlineStruct,
    /// Offset of a child built earlier.
    Offset,
}

/// One `Add` call of a pack function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSlot<'a> {
    /// Field being added.
    pub field: &'a FieldDef,
    /// How the value is produced.
    pub kind: SlotKind,
}

/// Object-API pack sequence for a table.
///
/// All children are built first, in declaration order; slots are then
/// added in [`create_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackPlan<'a> {
    /// Children built before `Start`.
    pub children: Vec<PackChild<'a>>,
    /// Adds performed between `Start` and `End`.
    pub slots: Vec<PackSlot<'a>>,
}

impl<'a> PackPlan<'a> {
    /// Computes the pack plan of a table.
    #[must_use]
    pub fn new(schema: &Schema, struct_def: &'a StructDef) -> Self {
        let children = struct_def
            .live_fields()
            .filter_map(|field| child_kind(schema, &field.value.ty).map(|kind| PackChild { field, kind }))
            .collect();
        let slots = create_order(struct_def)
            .into_iter()
            .map(|field| PackSlot {
                field,
                kind: slot_kind(schema, &field.value.ty),
            })
            .collect();
        Self { children, slots }
    }

    /// Returns the child built for `field`, if any.
    #[must_use]
    pub fn child(&self, field: &FieldDef) -> Option<&PackChild<'a>> {
        self.children.iter().find(|c| std::ptr::eq(c.field, field))
    }
}

fn child_kind(schema: &Schema, ty: &Type) -> Option<ChildKind> {
    if ty.is_string() {
        return Some(ChildKind::String);
    }
    if ty.is_union() {
        return Some(ChildKind::Union);
    }
    if ty.is_struct() {
        return (!schema.is_fixed_struct(ty)).then_some(ChildKind::Table);
    }
    if !ty.is_vector() {
        return None;
    }
    let element = ty.vector_type();
    Some(if element.base_type == ironfbs_schema::BaseType::UType {
        ChildKind::UnionTypeVector
    } else if element.is_union() {
        ChildKind::UnionVector
    } else if element.is_string() {
        ChildKind::StringVector
    } else if element.is_struct() && schema.is_fixed_struct(&element) {
        ChildKind::StructVector
    } else if element.is_struct() {
        ChildKind::TableVector
    } else {
        ChildKind::ScalarVector
    })
}

fn slot_kind(schema: &Schema, ty: &Type) -> SlotKind {
    if ty.base_type == ironfbs_schema::BaseType::UType {
        SlotKind::UnionType
    } else if ty.is_scalar() {
        SlotKind::Scalar
    } else if ty.is_struct() && schema.is_fixed_struct(ty) {
        SlotKind::InlineStruct
    } else {
        SlotKind::Offset
    }
}
