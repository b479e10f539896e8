//! Native `T` types with `Pack`, `UnPack` and `UnPackTo`.

use ironfbs_schema::{BaseType, FieldDef, StructDef};

use super::GoGenerator;
use crate::language::{FileState, GenContext};
use crate::plan::{ChildKind, PackPlan, SlotKind, StructBuildPlan, StructParam};
use crate::writer::CodeWriter;

impl GoGenerator {
    /// Fields present on the native type; discriminants travel inside the
    /// union wrapper instead.
    fn native_fields<'a>(struct_def: &'a StructDef) -> impl Iterator<Item = &'a FieldDef> {
        struct_def.live_fields().filter(|f| {
            let ty = &f.value.ty;
            ty.base_type != BaseType::UType
                && !(ty.is_vector() && ty.vector_type().base_type == BaseType::UType)
        })
    }

    fn gen_native_type(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        fields: &[&FieldDef],
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let rows: Vec<(String, String, &str)> = fields
            .iter()
            .map(|f| {
                (
                    self.namer.field(&f.name),
                    self.native_type(ctx, state, &f.value.ty),
                    f.name.as_str(),
                )
            })
            .collect();
        let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
        let type_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

        code.line(&format!("type {} struct {{", self.namer.object_type(&struct_def.name)));
        code.indent();
        for (name, ty, raw) in rows {
            code.line(&format!("{name:<name_width$} {ty:<type_width$} `json:\"{raw}\"`"));
        }
        code.dedent();
        code.line("}");
        code.blank();
    }

    fn gen_unpack(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let object = self.namer.object_type(&struct_def.name);
        code.line(&format!("func (rcv *{name}) UnPack() *{object} {{"));
        code.line("\tif rcv == nil {");
        code.line("\t\treturn nil");
        code.line("\t}");
        code.line(&format!("\tt := &{object}{{}}"));
        code.line("\trcv.UnPackTo(t)");
        code.line("\treturn t");
        code.line("}");
        code.blank();
    }

    fn gen_pack_header(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        code.line(&format!(
            "func (t *{}) Pack(builder *flatbuffers.Builder) flatbuffers.UOffsetT {{",
            self.namer.object_type(&struct_def.name)
        ));
        code.indent();
        code.line("if t == nil {");
        code.line("\treturn 0");
        code.line("}");
    }

    pub(super) fn gen_native_struct(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let fields: Vec<&FieldDef> = struct_def.fields.iter().collect();
        self.gen_native_type(ctx, struct_def, &fields, state, code);

        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        self.gen_pack_header(struct_def, code);
        let mut args = Vec::with_capacity(plan.params.len());
        for param in &plan.params {
            args.push(self.struct_argument(ctx, param, state, code));
        }
        code.line(&format!(
            "return {}(builder, {})",
            self.struct_creator(struct_def),
            args.join(", ")
        ));
        code.dedent();
        code.line("}");
        code.blank();

        code.line(&format!(
            "func (rcv *{}) UnPackTo(t *{}) {{",
            self.namer.type_name(&struct_def.name),
            self.namer.object_type(&struct_def.name)
        ));
        code.indent();
        for field in &struct_def.fields {
            let member = self.namer.field(&field.name);
            let getter = self.function(field);
            let ty = &field.value.ty;
            if ty.is_struct() {
                code.line(&format!("t.{member} = rcv.{getter}(nil).UnPack()"));
            } else if ty.is_array() {
                let element = ty.vector_type();
                code.line(&format!(
                    "t.{member} = make({}, {})",
                    self.native_type(ctx, state, ty),
                    ty.fixed_length
                ));
                code.line(&format!("for j := range t.{member} {{"));
                if element.is_struct() {
                    code.line(&format!("\tt.{member}[j] = rcv.{getter}(nil, j).UnPack()"));
                } else {
                    code.line(&format!("\tt.{member}[j] = rcv.{getter}(j)"));
                }
                code.line("}");
            } else {
                code.line(&format!("t.{member} = rcv.{getter}()"));
            }
        }
        code.dedent();
        code.line("}");
        code.blank();
        self.gen_unpack(struct_def, code);
    }

    /// Expression passed to the struct creator for one flattened parameter.
    /// Struct array members are first gathered into a local slice.
    fn struct_argument(
        &self,
        ctx: &GenContext<'_>,
        param: &StructParam<'_>,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) -> String {
        let access = |fields: &[&FieldDef]| {
            fields
                .iter()
                .map(|f| self.namer.field(&f.name))
                .collect::<Vec<_>>()
                .join(".")
        };
        match param.array {
            Some(span) if span.of_structs => {
                let local = self.namer.variable(&param.name);
                let array = access(&param.path[..=span.field_index]);
                let member = access(&param.path[span.field_index + 1..]);
                code.line(&format!(
                    "{local} := make([]{}, len(t.{array}))",
                    self.type_get(ctx, state, &param.ty)
                ));
                code.line(&format!("for j := range t.{array} {{"));
                code.line(&format!("\t{local}[j] = t.{array}[j].{member}"));
                code.line("}");
                local
            }
            _ => format!("t.{}", access(&param.path)),
        }
    }

    pub(super) fn gen_native_table(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let fields: Vec<&FieldDef> = Self::native_fields(struct_def).collect();
        self.gen_native_type(ctx, struct_def, &fields, state, code);
        self.gen_table_pack(ctx, struct_def, code);
        self.gen_table_unpack_to(ctx, struct_def, state, code);
        self.gen_unpack(struct_def, code);
    }

    fn offset_var(&self, field: &FieldDef) -> String {
        format!("{}Offset", self.namer.variable(&field.name))
    }

    fn gen_table_pack(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let plan = PackPlan::new(ctx.schema, struct_def);
        self.gen_pack_header(struct_def, code);

        for child in &plan.children {
            let field = child.field;
            let member = self.namer.field(&field.name);
            let offset = self.offset_var(field);
            match child.kind {
                ChildKind::String if field.required => {
                    code.line(&format!("{offset} := builder.CreateString(t.{member})"));
                }
                ChildKind::String => {
                    code.line(&format!("{offset} := flatbuffers.UOffsetT(0)"));
                    code.line(&format!("if t.{member} != \"\" {{"));
                    code.line(&format!("\t{offset} = builder.CreateString(t.{member})"));
                    code.line("}");
                }
                ChildKind::Table | ChildKind::Union => {
                    code.line(&format!("{offset} := t.{member}.Pack(builder)"));
                }
                ChildKind::ScalarVector
                    if field.value.ty.vector_type().base_type == BaseType::UChar
                        && Self::scalar_enum(ctx, &field.value.ty.vector_type()).is_none() =>
                {
                    code.line(&format!("{offset} := flatbuffers.UOffsetT(0)"));
                    code.line(&format!("if t.{member} != nil {{"));
                    code.line(&format!("\t{offset} = builder.CreateByteString(t.{member})"));
                    code.line("}");
                }
                ChildKind::UnionTypeVector => {
                    let union_member = field
                        .tagged_union_name()
                        .map_or_else(|| member.clone(), |n| self.namer.field(n));
                    let element = field.value.ty.vector_type();
                    let value = Self::cast_to_base(ctx, &element, &format!("t.{union_member}[j].Type"));
                    self.gen_pack_vector(&name, field, &format!("t.{union_member}"), code, |code| {
                        code.line(&format!("builder.Prepend{}({value})", self.method(&element)));
                    });
                }
                ChildKind::ScalarVector => {
                    let element = field.value.ty.vector_type();
                    let value = Self::cast_to_base(ctx, &element, &format!("t.{member}[j]"));
                    self.gen_pack_vector(&name, field, &format!("t.{member}"), code, |code| {
                        code.line(&format!("builder.Prepend{}({value})", self.method(&element)));
                    });
                }
                ChildKind::StructVector => {
                    self.gen_pack_vector(&name, field, &format!("t.{member}"), code, |code| {
                        code.line(&format!("t.{member}[j].Pack(builder)"));
                    });
                }
                ChildKind::StringVector | ChildKind::TableVector | ChildKind::UnionVector => {
                    let variable = self.namer.variable(&field.name);
                    let create = if child.kind == ChildKind::StringVector {
                        format!("builder.CreateString(t.{member}[j])")
                    } else {
                        format!("t.{member}[j].Pack(builder)")
                    };
                    code.line(&format!("{offset} := flatbuffers.UOffsetT(0)"));
                    code.line(&format!("if t.{member} != nil {{"));
                    code.indent();
                    code.line(&format!("{variable}Length := len(t.{member})"));
                    code.line(&format!("{variable}Offsets := make([]flatbuffers.UOffsetT, {variable}Length)"));
                    code.line(&format!("for j := 0; j < {variable}Length; j++ {{"));
                    code.line(&format!("\t{variable}Offsets[j] = {create}"));
                    code.line("}");
                    code.line(&format!(
                        "{name}Start{}Vector(builder, {variable}Length)",
                        self.function(field)
                    ));
                    code.line(&format!("for j := {variable}Length - 1; j >= 0; j-- {{"));
                    code.line(&format!("\tbuilder.PrependUOffsetT({variable}Offsets[j])"));
                    code.line("}");
                    code.line(&format!("{offset} = builder.EndVector({variable}Length)"));
                    code.dedent();
                    code.line("}");
                }
            }
        }

        code.line(&format!("{name}Start(builder)"));
        for slot in &plan.slots {
            let field = slot.field;
            let function = self.function(field);
            let member = self.namer.field(&field.name);
            match slot.kind {
                SlotKind::Scalar => {
                    code.line(&format!("{name}Add{function}(builder, t.{member})"));
                }
                SlotKind::UnionType => {
                    let union_member = field
                        .tagged_union_name()
                        .map_or_else(|| member.clone(), |n| self.namer.field(n));
                    code.line(&format!("if t.{union_member} != nil {{"));
                    code.line(&format!("\t{name}Add{function}(builder, t.{union_member}.Type)"));
                    code.line("}");
                }
                SlotKind::InlineStruct => {
                    let offset = self.offset_var(field);
                    code.line(&format!("{offset} := t.{member}.Pack(builder)"));
                    code.line(&format!("{name}Add{function}(builder, {offset})"));
                }
                SlotKind::Offset => {
                    code.line(&format!(
                        "{name}Add{function}(builder, {})",
                        self.offset_var(field)
                    ));
                }
            }
        }
        code.line(&format!("return {name}End(builder)"));
        code.dedent();
        code.line("}");
        code.blank();
    }

    /// Writes an inline vector back to front from the slice `source`.
    fn gen_pack_vector(
        &self,
        table: &str,
        field: &FieldDef,
        source: &str,
        code: &mut CodeWriter,
        prepend: impl Fn(&mut CodeWriter),
    ) {
        let offset = self.offset_var(field);
        let length = format!("{}Length", self.namer.variable(&field.name));
        code.line(&format!("{offset} := flatbuffers.UOffsetT(0)"));
        code.line(&format!("if {source} != nil {{"));
        code.indent();
        code.line(&format!("{length} := len({source})"));
        code.line(&format!(
            "{table}Start{}Vector(builder, {length})",
            self.function(field)
        ));
        code.line(&format!("for j := {length} - 1; j >= 0; j-- {{"));
        code.indent();
        prepend(code);
        code.dedent();
        code.line("}");
        code.line(&format!("{offset} = builder.EndVector({length})"));
        code.dedent();
        code.line("}");
    }

    fn gen_table_unpack_to(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        code.line(&format!(
            "func (rcv *{}) UnPackTo(t *{}) {{",
            self.namer.type_name(&struct_def.name),
            self.namer.object_type(&struct_def.name)
        ));
        code.indent();
        for field in Self::native_fields(struct_def) {
            let member = self.namer.field(&field.name);
            let getter = self.function(field);
            let variable = self.namer.variable(&field.name);
            let ty = &field.value.ty;
            match ty.base_type {
                _ if ty.is_scalar() => code.line(&format!("t.{member} = rcv.{getter}()")),
                BaseType::String => code.line(&format!("t.{member} = string(rcv.{getter}())")),
                BaseType::Struct => code.line(&format!("t.{member} = rcv.{getter}(nil).UnPack()")),
                BaseType::Union => {
                    let discriminant = self.namer.function(&format!("{}_type", field.name));
                    code.line(&format!("{variable}Table := flatbuffers.Table{{}}"));
                    code.line(&format!("if rcv.{getter}(&{variable}Table) {{"));
                    code.line(&format!(
                        "\tt.{member} = rcv.{discriminant}().UnPack({variable}Table)"
                    ));
                    code.line("}");
                }
                BaseType::Vector => {
                    let element = ty.vector_type();
                    if element.base_type == BaseType::UChar && Self::scalar_enum(ctx, &element).is_none() {
                        code.line(&format!("t.{member} = rcv.{getter}Bytes()"));
                        continue;
                    }
                    code.line(&format!("{variable}Length := rcv.{getter}Length()"));
                    code.line(&format!(
                        "t.{member} = make({}, {variable}Length)",
                        self.native_type(ctx, state, ty)
                    ));
                    code.line(&format!("for j := 0; j < {variable}Length; j++ {{"));
                    code.indent();
                    if element.is_struct() {
                        let target = self.struct_name(ctx, state, ctx.struct_of(&element));
                        code.line(&format!("x := {target}{{}}"));
                        code.line(&format!("rcv.{getter}(&x, j)"));
                        code.line(&format!("t.{member}[j] = x.UnPack()"));
                    } else if element.is_union() {
                        let discriminant = self.namer.function(&format!("{}_type", field.name));
                        code.line(&format!("{variable}Table := flatbuffers.Table{{}}"));
                        code.line(&format!("if rcv.{getter}(&{variable}Table, j) {{"));
                        code.line(&format!(
                            "\tt.{member}[j] = rcv.{discriminant}(j).UnPack({variable}Table)"
                        ));
                        code.line("}");
                    } else if element.is_string() {
                        code.line(&format!("t.{member}[j] = string(rcv.{getter}(j))"));
                    } else {
                        code.line(&format!("t.{member}[j] = rcv.{getter}(j)"));
                    }
                    code.dedent();
                    code.line("}");
                }
                _ => {}
            }
        }
        code.dedent();
        code.line("}");
        code.blank();
    }
}
