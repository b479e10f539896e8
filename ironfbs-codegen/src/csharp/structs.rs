//! Fixed struct accessors and `Create*` methods.

use ironfbs_schema::{FieldDef, StructDef};

use super::CSharpGenerator;
use crate::language::GenContext;
use crate::plan::{StructBuildOp, StructBuildPlan};
use crate::writer::CodeWriter;

impl CSharpGenerator {
    /// Opens the type and writes the members every buffer object has.
    pub(super) fn gen_object_header(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let accessor = if struct_def.fixed { "Struct" } else { "Table" };
        Self::doc(code, &struct_def.doc_comment);
        code.line(&format!("public struct {name} : IFlatbufferObject"));
        code.line("{");
        code.indent();
        code.line(&format!("private {accessor} __p;"));
        code.line("public ByteBuffer ByteBuffer { get { return __p.bb; } }");
    }

    pub(super) fn gen_init_assign(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let accessor = if struct_def.fixed { "Struct" } else { "Table" };
        code.line(&format!(
            "public void __init(int _i, ByteBuffer _bb) {{ __p = new {accessor}(_i, _bb); }}"
        ));
        code.line(&format!(
            "public {name} __assign(int _i, ByteBuffer _bb) {{ __init(_i, _bb); return this; }}"
        ));
    }

    pub(super) fn gen_struct_decl(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        self.gen_object_header(struct_def, code);
        self.gen_init_assign(struct_def, code);
        code.blank();
        for field in &struct_def.fields {
            Self::doc(code, &field.doc_comment);
            self.gen_struct_field(ctx, struct_def, field, code);
        }
        code.blank();
        self.gen_struct_creator(ctx, struct_def, code);
        code.dedent();
        code.line("};");
    }

    fn gen_struct_field(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        code: &mut CodeWriter,
    ) {
        let member = self.member(struct_def, field);
        let variable = self.namer.variable(&field.name);
        let ty = &field.value.ty;
        let offset = field.value.offset;

        if ty.is_struct() {
            let target = self.struct_name(ctx.struct_of(ty));
            code.line(&format!(
                "public {target} {member} {{ get {{ return (new {target}()).__assign(__p.bb_pos + {offset}, __p.bb); }} }}"
            ));
            return;
        }

        if ty.is_array() {
            let element = ty.vector_type();
            let stride = ctx.schema.inline_size(&element);
            let position = format!("__p.bb_pos + {offset} + j * {stride}");
            if element.is_struct() {
                let target = self.struct_name(ctx.struct_of(&element));
                code.line(&format!(
                    "public {target} {member}(int j) {{ return (new {target}()).__assign({position}, __p.bb); }}"
                ));
            } else {
                let returns = self.type_get(ctx, &element);
                let read = self.cast_to_enum(ctx, &element, &Self::read_scalar(&element, &position));
                code.line(&format!("public {returns} {member}(int j) {{ return {read}; }}"));
            }
            code.line(&format!("public const int {member}Length = {};", ty.fixed_length));
            if ctx.options.mutable_buffer && !element.is_struct() {
                let arg = self.type_get(ctx, &element);
                let value = Self::cast_to_base(ctx, &element, &variable);
                code.line(&format!(
                    "public void Mutate{member}(int j, {arg} {variable}) {{ {}; }}",
                    Self::write_scalar(&element, &position, &value)
                ));
            }
            return;
        }

        let returns = self.type_get(ctx, ty);
        let position = format!("__p.bb_pos + {offset}");
        let read = self.cast_to_enum(ctx, ty, &Self::read_scalar(ty, &position));
        code.line(&format!("public {returns} {member} {{ get {{ return {read}; }} }}"));
        if ctx.options.mutable_buffer {
            let value = Self::cast_to_base(ctx, ty, &variable);
            code.line(&format!(
                "public void Mutate{member}({returns} {variable}) {{ {}; }}",
                Self::write_scalar(ty, &position, &value)
            ));
        }
    }

    fn gen_struct_creator(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.struct_name(struct_def);
        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        let params: Vec<String> = plan
            .params
            .iter()
            .map(|p| {
                let ty = self.type_get(ctx, &p.ty);
                let ty = if p.array.is_some() { format!("{ty}[]") } else { ty };
                format!("{ty} {}", self.namer.variable(&p.name))
            })
            .collect();
        code.line(&format!(
            "public static Offset<{name}> Create{}(FlatBufferBuilder builder, {}) {{",
            self.namer.type_name(&struct_def.name),
            params.join(", ")
        ));
        code.indent();
        let mut loops: Vec<String> = Vec::new();
        for op in &plan.ops {
            match op {
                StructBuildOp::Prep { align, size } => code.line(&format!("builder.Prep({align}, {size});")),
                StructBuildOp::Pad(n) => code.line(&format!("builder.Pad({n});")),
                StructBuildOp::Put { param, ty, in_array } => {
                    let mut value = self.namer.variable(param);
                    if *in_array {
                        for index in &loops {
                            value.push_str(&format!("[{index}]"));
                        }
                    }
                    code.line(&format!(
                        "builder.Put{}({});",
                        Self::suffix(ty),
                        Self::cast_to_base(ctx, ty, &value)
                    ));
                }
                StructBuildOp::BeginArray { length } => {
                    let index = format!("_idx{}", loops.len());
                    code.line(&format!(
                        "for (int {index} = {}; {index} >= 0; {index}--) {{",
                        length.saturating_sub(1)
                    ));
                    code.indent();
                    loops.push(index);
                }
                StructBuildOp::EndArray => {
                    loops.pop();
                    code.dedent();
                    code.line("}");
                }
            }
        }
        code.line(&format!("return new Offset<{name}>(builder.Offset);"));
        code.dedent();
        code.line("}");
    }
}
