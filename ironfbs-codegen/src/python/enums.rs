//! Enum and union classes.

use ironfbs_schema::{EnumDef, Type};

use super::PythonGenerator;
use crate::language::{GenContext, enum_value_text};
use crate::writer::CodeWriter;

impl PythonGenerator {
    /// Name of the module-level function turning a union payload into its
    /// object-API value.
    pub(super) fn union_creator(&self, enum_def: &EnumDef) -> String {
        self.namer.function(&format!("{}_creator", enum_def.name))
    }

    pub(super) fn gen_enum_class(
        &self,
        ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        code: &mut CodeWriter,
    ) {
        code.set_value("ENUM_NAME", self.namer.type_name(&enum_def.name));
        code.line("class {{ENUM_NAME}}(enum.IntEnum):");
        code.indent();
        Self::docstring(code, &enum_def.doc_comment);

        let mut any: i64 = 0;
        for val in &enum_def.vals {
            for doc in &val.doc_comment {
                code.line(&format!("# {}", doc.trim_end()));
            }
            code.line(&format!(
                "{} = {}",
                self.namer.variant(&val.name),
                enum_value_text(enum_def, val.value)
            ));
            any |= val.value;
        }

        if enum_def.is_bit_flags() {
            if enum_def.val("NONE").is_none() {
                code.line("NONE = 0");
            }
            if enum_def.val("ANY").is_none() {
                code.line(&format!("ANY = {}", enum_value_text(enum_def, any)));
            }
        } else {
            let min = enum_def.vals.iter().min_by_key(|v| v.value);
            let max = enum_def.vals.iter().max_by_key(|v| v.value);
            if let (Some(min), Some(max)) = (min, max)
                && enum_def.val("MIN").is_none()
                && enum_def.val("MAX").is_none()
            {
                code.line(&format!("MIN = {}", self.namer.variant(&min.name)));
                code.line(&format!("MAX = {}", self.namer.variant(&max.name)));
            }
        }
        if enum_def.vals.is_empty() && !enum_def.is_bit_flags() {
            code.line("pass");
        }

        if enum_def.is_union {
            self.gen_union_table_types(ctx, enum_def, code);
        }
        code.dedent();
    }

    fn gen_union_table_types(&self, ctx: &GenContext<'_>, enum_def: &EnumDef, code: &mut CodeWriter) {
        code.blank();
        code.line("@property");
        code.line("def table_type(self):");
        code.line("    return self.table_types().get(self)");
        code.blank();
        code.line("@classmethod");
        code.line("def table_types(cls):");
        code.indent();
        let tables: Vec<(String, &Type)> = enum_def
            .vals
            .iter()
            .filter(|v| !v.is_zero() && ctx.schema.is_table(&v.union_type))
            .map(|v| (self.namer.variant(&v.name), &v.union_type))
            .collect();
        if tables.is_empty() {
            code.line("return {}");
        } else {
            let mut entries = Vec::with_capacity(tables.len());
            for (variant, ty) in tables {
                let class = self.import_type(ctx, ty, code);
                entries.push(format!("cls.{variant}: {class},"));
            }
            code.line("return {");
            code.indent();
            for entry in entries {
                code.line(&entry);
            }
            code.dedent();
            code.line("}");
        }
        code.dedent();
    }

    pub(super) fn gen_union_creator(&self, ctx: &GenContext<'_>, enum_def: &EnumDef, code: &mut CodeWriter) {
        let union_name = self.namer.type_name(&enum_def.name);
        code.line(&format!("def {}(union_type, table):", self.union_creator(enum_def)));
        code.indent();
        code.line("from flatbuffers.table import Table");
        code.line("if not isinstance(table, Table):");
        code.line("    return None");
        for val in enum_def.vals.iter().filter(|v| !v.is_zero()) {
            code.line(&format!(
                "if union_type == {union_name}.{}:",
                self.namer.variant(&val.name)
            ));
            code.indent();
            if val.union_type.is_string() {
                code.line("length = flatbuffers.encode.Get(flatbuffers.packer.uoffset, table.Bytes, table.Pos)");
                code.line("start = table.Pos + flatbuffers.number_types.UOffsetTFlags.bytewidth");
                code.line("return bytes(table.Bytes[start:start + length])");
            } else if ctx.schema.is_table(&val.union_type) {
                let object = self.import_object(ctx, &val.union_type, code);
                code.line(&format!("return {object}.init_from_buf(table.Bytes, table.Pos)"));
            } else {
                unreachable!("union {} variant {} is neither a table nor a string", enum_def.name, val.name);
            }
            code.dedent();
        }
        code.line("return None");
        code.dedent();
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use crate::generator::Generator;
    use crate::options::GeneratorOptions;
    use crate::python::PythonGenerator;

    fn render(options: GeneratorOptions) -> Vec<crate::language::GeneratedFile> {
        let schema = fixtures::monster();
        let plugin = PythonGenerator::new(&options);
        Generator::new(&schema, &options, &plugin)
            .render()
            .expect("Failed to render")
    }

    #[test]
    fn test_bit_flags_enum() {
        let files = render(GeneratorOptions::default());
        let color = fixtures::file(&files, "Example/Color.py");
        pretty_assertions::assert_eq!(
            color,
            "# automatically generated by the FlatBuffers compiler, do not modify\n\
             \n\
             # namespace: MyGame.Example\n\
             \n\
             import flatbuffers\n\
             import enum\n\
             \n\
             \n\
             class Color(enum.IntEnum):\n    \
                 \"\"\"\n    \
                 Composite components of Monster color.\n    \
                 \"\"\"\n    \
                 Red = 1\n    \
                 Green = 2\n    \
                 Blue = 8\n    \
                 NONE = 0\n    \
                 ANY = 11\n"
        );
    }

    #[test]
    fn test_plain_enum_min_max() {
        let files = render(GeneratorOptions::default());
        let race = fixtures::file(&files, "Example/Race.py");
        assert!(race.contains("    None_ = -1\n    Human = 0\n    Dwarf = 1\n    Elf = 2\n"));
        assert!(race.contains("    MIN = None_\n    MAX = Elf\n"));
    }

    #[test]
    fn test_union_table_types_and_creator() {
        let files = render(GeneratorOptions::default().object_api(true));
        let any = fixtures::file(&files, "Example/Any.py");
        assert!(any.contains("    NONE = 0\n    Monster = 1\n    Weapon = 2\n    Label = 3\n"));
        assert!(any.contains("        from MyGame.Example2.Weapon import Weapon\n"));
        assert!(any.contains("            cls.Weapon: Weapon,\n"));
        assert!(!any.contains("cls.Label"));
        assert!(any.contains("def any_creator(union_type, table):\n"));
        assert!(any.contains("        return MonsterT.init_from_buf(table.Bytes, table.Pos)\n"));
        assert!(any.contains("return bytes(table.Bytes[start:start + length])"));
    }
}
