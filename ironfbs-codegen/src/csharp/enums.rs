use ironfbs_schema::EnumDef;

use super::CSharpGenerator;
use crate::language::{GenContext, enum_value_text};
use crate::writer::CodeWriter;

impl CSharpGenerator {
    pub(super) fn gen_enum_decl(&self, _ctx: &GenContext<'_>, enum_def: &EnumDef, code: &mut CodeWriter) {
        Self::doc(code, &enum_def.doc_comment);
        if enum_def.is_bit_flags() {
            code.line("[System.FlagsAttribute]");
        }
        code.line(&format!(
            "public enum {} : {}",
            self.namer.type_name(&enum_def.name),
            Self::basic(&enum_def.underlying_type)
        ));
        code.line("{");
        code.indent();
        for val in &enum_def.vals {
            Self::doc(code, &val.doc_comment);
            code.line(&format!(
                "{} = {},",
                self.namer.variant(&val.name),
                enum_value_text(enum_def, val.value)
            ));
        }
        code.dedent();
        code.line("};");
    }
}
