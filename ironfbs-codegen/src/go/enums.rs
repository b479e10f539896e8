//! Enum types, name maps and the object-API union wrapper.

use ironfbs_schema::EnumDef;

use super::{GoGenerator, STRCONV_IMPORT};
use crate::language::{FileState, GenContext, doc_lines, enum_value_text};
use crate::writer::CodeWriter;

impl GoGenerator {
    pub(super) fn gen_enum_decl(
        &self,
        _ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        state.import(STRCONV_IMPORT);
        let name = self.namer.type_name(&enum_def.name);
        let members: Vec<String> = enum_def
            .vals
            .iter()
            .map(|v| self.namer.enum_variant(&enum_def.name, &v.name))
            .collect();
        let width = members.iter().map(String::len).max().unwrap_or(0);
        let raw_width = enum_def.vals.iter().map(|v| v.name.len()).max().unwrap_or(0) + 2;

        code.line(&format!("type {name} {}", Self::basic(&enum_def.underlying_type)));
        code.blank();
        code.line("const (");
        code.indent();
        for (val, member) in enum_def.vals.iter().zip(&members) {
            doc_lines(code, "// ", &val.doc_comment);
            code.line(&format!(
                "{member:<width$} {name} = {}",
                enum_value_text(enum_def, val.value)
            ));
        }
        code.dedent();
        code.line(")");
        code.blank();

        code.line(&format!("var EnumNames{name} = map[{name}]string{{"));
        code.indent();
        for (val, member) in enum_def.vals.iter().zip(&members) {
            let key = format!("{member}:");
            code.line(&format!("{key:<w$} \"{}\",", val.name, w = width + 1));
        }
        code.dedent();
        code.line("}");
        code.blank();

        code.line(&format!("var EnumValues{name} = map[string]{name}{{"));
        code.indent();
        for (val, member) in enum_def.vals.iter().zip(&members) {
            let key = format!("\"{}\":", val.name);
            code.line(&format!("{key:<raw_width$} {member},", raw_width = raw_width + 1));
        }
        code.dedent();
        code.line("}");
        code.blank();

        code.line(&format!("func (v {name}) String() string {{"));
        code.indent();
        code.line(&format!("if s, ok := EnumNames{name}[v]; ok {{"));
        code.line("\treturn s");
        code.line("}");
        code.line(&format!(
            "return \"{name}(\" + strconv.FormatInt(int64(v), 10) + \")\""
        ));
        code.dedent();
        code.line("}");
    }

    /// Object-API union: the discriminant plus the unpacked variant value.
    pub(super) fn gen_native_union(
        &self,
        ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.namer.type_name(&enum_def.name);
        let object = self.namer.object_type(&enum_def.name);
        let variants = || enum_def.vals.iter().filter(|v| !v.is_zero());

        code.blank();
        code.line(&format!("type {object} struct {{"));
        code.line(&format!("\tType  {name}"));
        code.line("\tValue interface{}");
        code.line("}");
        code.blank();

        code.line(&format!(
            "func (t *{object}) Pack(builder *flatbuffers.Builder) flatbuffers.UOffsetT {{"
        ));
        code.indent();
        code.line("if t == nil {");
        code.line("\treturn 0");
        code.line("}");
        code.line("switch t.Type {");
        for val in variants() {
            code.line(&format!("case {}:", self.namer.enum_variant(&enum_def.name, &val.name)));
            code.indent();
            if val.union_type.is_string() {
                code.line("return builder.CreateString(t.Value.(string))");
            } else {
                let target = self.object_name(ctx, state, ctx.struct_of(&val.union_type));
                code.line(&format!("return t.Value.(*{target}).Pack(builder)"));
            }
            code.dedent();
        }
        code.line("}");
        code.line("return 0");
        code.dedent();
        code.line("}");
        code.blank();

        code.line(&format!(
            "func (rcv {name}) UnPack(table flatbuffers.Table) *{object} {{"
        ));
        code.indent();
        code.line("switch rcv {");
        for val in variants() {
            let variant = self.namer.enum_variant(&enum_def.name, &val.name);
            code.line(&format!("case {variant}:"));
            code.indent();
            if val.union_type.is_string() {
                code.line("n := flatbuffers.GetUOffsetT(table.Bytes[table.Pos:])");
                code.line("start := table.Pos + flatbuffers.SizeUOffsetT");
                code.line(&format!(
                    "return &{object}{{Type: {variant}, Value: string(table.Bytes[start : start+n])}}"
                ));
            } else {
                let target = self.struct_name(ctx, state, ctx.struct_of(&val.union_type));
                code.line(&format!("var x {target}"));
                code.line("x.Init(table.Bytes, table.Pos)");
                code.line(&format!("return &{object}{{Type: {variant}, Value: x.UnPack()}}"));
            }
            code.dedent();
        }
        code.line("}");
        code.line("return nil");
        code.dedent();
        code.line("}");
    }
}
