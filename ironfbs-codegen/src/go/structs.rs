//! Fixed struct readers and `Create*` builder functions.

use ironfbs_schema::{FieldDef, StructDef};

use super::GoGenerator;
use crate::language::{FileState, GenContext, doc_lines};
use crate::plan::{StructBuildOp, StructBuildPlan};
use crate::writer::CodeWriter;

impl GoGenerator {
    /// Name of the function writing a struct inline.
    pub(super) fn struct_creator(&self, struct_def: &StructDef) -> String {
        self.namer.function(&format!("Create{}", struct_def.name))
    }

    /// The wrapper type, `Init` and `Table`, shared by structs and tables.
    pub(super) fn gen_view_header(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let runtime = if struct_def.fixed { "Struct" } else { "Table" };
        code.line(&format!("type {name} struct {{"));
        code.line(&format!("\t_tab flatbuffers.{runtime}"));
        code.line("}");
        code.blank();
    }

    pub(super) fn gen_init_and_table(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let receiver = self.receiver(struct_def);
        code.line(&format!("{receiver} Init(buf []byte, i flatbuffers.UOffsetT) {{"));
        code.line("\trcv._tab.Bytes = buf");
        code.line("\trcv._tab.Pos = i");
        code.line("}");
        code.blank();
        code.line(&format!("{receiver} Table() flatbuffers.Table {{"));
        if struct_def.fixed {
            code.line("\treturn rcv._tab.Table");
        } else {
            code.line("\treturn rcv._tab");
        }
        code.line("}");
    }

    pub(super) fn gen_struct_view(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        self.gen_view_header(struct_def, code);
        self.gen_init_and_table(struct_def, code);
        for field in &struct_def.fields {
            code.blank();
            doc_lines(code, "// ", &field.doc_comment);
            self.gen_struct_accessor(ctx, struct_def, field, state, code);
            if ctx.options.mutable_buffer && !field.value.ty.is_struct() {
                self.gen_struct_mutator(ctx, struct_def, field, state, code);
            }
        }
    }

    fn gen_struct_accessor(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let receiver = self.receiver(struct_def);
        let name = self.function(field);
        let ty = &field.value.ty;
        let offset = field.value.offset;

        if ty.is_struct() {
            let target = self.struct_name(ctx, state, ctx.struct_of(ty));
            code.line(&format!("{receiver} {name}(obj *{target}) *{target} {{"));
            code.line("\tif obj == nil {");
            code.line(&format!("\t\tobj = new({target})"));
            code.line("\t}");
            code.line(&format!("\tobj.Init(rcv._tab.Bytes, rcv._tab.Pos+{offset})"));
            code.line("\treturn obj");
            code.line("}");
            return;
        }

        if ty.is_array() {
            let element = ty.vector_type();
            let stride = ctx.schema.inline_size(&element);
            let position = format!("rcv._tab.Pos + flatbuffers.UOffsetT({offset}+j*{stride})");
            if element.is_struct() {
                let target = self.struct_name(ctx, state, ctx.struct_of(&element));
                code.line(&format!("{receiver} {name}(obj *{target}, j int) *{target} {{"));
                code.line("\tif obj == nil {");
                code.line(&format!("\t\tobj = new({target})"));
                code.line("\t}");
                code.line(&format!("\tobj.Init(rcv._tab.Bytes, {position})"));
                code.line("\treturn obj");
            } else {
                let returns = self.type_get(ctx, state, &element);
                let read = format!("{}({position})", self.getter(&element));
                code.line(&format!("{receiver} {name}(j int) {returns} {{"));
                code.line(&format!("\treturn {}", self.cast_to_enum(ctx, state, &element, &read)));
            }
            code.line("}");
            code.blank();
            code.line(&format!("{receiver} {name}Length() int {{"));
            code.line(&format!("\treturn {}", ty.fixed_length));
            code.line("}");
            return;
        }

        let returns = self.type_get(ctx, state, ty);
        let read = format!(
            "{}(rcv._tab.Pos + flatbuffers.UOffsetT({offset}))",
            self.getter(ty)
        );
        code.line(&format!("{receiver} {name}() {returns} {{"));
        code.line(&format!("\treturn {}", self.cast_to_enum(ctx, state, ty, &read)));
        code.line("}");
    }

    fn gen_struct_mutator(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let receiver = self.receiver(struct_def);
        let name = self.function(field);
        let ty = &field.value.ty;
        let offset = field.value.offset;

        if ty.is_array() {
            let element = ty.vector_type();
            if element.is_struct() {
                return;
            }
            let arg = self.type_get(ctx, state, &element);
            code.blank();
            code.line(&format!("{receiver} Mutate{name}(j int, n {arg}) bool {{"));
            code.line(&format!(
                "\treturn rcv._tab.Mutate{}(rcv._tab.Pos+flatbuffers.UOffsetT({offset}+j*{}), {})",
                self.method(&element),
                element.base_type.size(),
                Self::cast_to_base(ctx, &element, "n")
            ));
            code.line("}");
            return;
        }

        let arg = self.type_get(ctx, state, ty);
        code.blank();
        code.line(&format!("{receiver} Mutate{name}(n {arg}) bool {{"));
        code.line(&format!(
            "\treturn rcv._tab.Mutate{}(rcv._tab.Pos+flatbuffers.UOffsetT({offset}), {})",
            self.method(ty),
            Self::cast_to_base(ctx, ty, "n")
        ));
        code.line("}");
    }

    pub(super) fn gen_struct_builder(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        let mut params = Vec::with_capacity(plan.params.len());
        for param in &plan.params {
            let ty = self.type_get(ctx, state, &param.ty);
            let ty = if param.array.is_some() { format!("[]{ty}") } else { ty };
            params.push(format!("{} {ty}", self.namer.variable(&param.name)));
        }

        code.blank();
        code.line(&format!(
            "func {}(builder *flatbuffers.Builder, {}) flatbuffers.UOffsetT {{",
            self.struct_creator(struct_def),
            params.join(", ")
        ));
        code.indent();
        let mut loops: Vec<String> = Vec::new();
        for op in &plan.ops {
            match op {
                StructBuildOp::Prep { align, size } => {
                    code.line(&format!("builder.Prep({align}, {size})"));
                }
                StructBuildOp::Pad(n) => code.line(&format!("builder.Pad({n})")),
                StructBuildOp::Put { param, ty, in_array } => {
                    let mut value = self.namer.variable(param);
                    if *in_array {
                        for index in &loops {
                            value.push_str(&format!("[{index}]"));
                        }
                    }
                    code.line(&format!(
                        "builder.Prepend{}({})",
                        self.method(ty),
                        Self::cast_to_base(ctx, ty, &value)
                    ));
                }
                StructBuildOp::BeginArray { length } => {
                    let index = format!("_idx{}", loops.len());
                    code.line(&format!(
                        "for {index} := {}; {index} >= 0; {index}-- {{",
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
        code.line("return builder.Offset()");
        code.dedent();
        code.line("}");
    }
}
