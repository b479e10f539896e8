//! Table view classes and `*Builder` classes.

use ironfbs_schema::{BaseType, EnumDef, FieldDef, StructDef, Type};

use super::{PythonGenerator, literal};
use crate::language::{FileState, GenContext};
use crate::plan::{create_order, supports_single_call_create};
use crate::writer::CodeWriter;

const UOFFSET: &str = "flatbuffers.number_types.UOffsetTFlags.py_type";

impl PythonGenerator {
    /// Name of the builder class of a table.
    pub(super) fn builder_class(&self, struct_def: &StructDef) -> String {
        format!("{}Builder", self.namer.type_name(&struct_def.name))
    }

    fn offset_line(&self, field: &FieldDef) -> String {
        format!("o = {UOFFSET}(self._tab.Offset(self.{}))", self.vt_name(field))
    }

    pub(super) fn gen_table_class(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let class = self.namer.type_name(&struct_def.name);
        code.line(&format!("class {class}(object):"));
        code.indent();
        Self::docstring(code, &struct_def.doc_comment);
        code.line("__slots__ = ['_tab']");
        code.blank();
        for field in struct_def.live_fields() {
            code.line(&format!("{} = {}", self.vt_name(field), field.value.offset));
        }
        if struct_def.live_fields().next().is_some() {
            code.blank();
        }
        code.line("def __init__(self, buf, offset):");
        code.line("    self._tab = flatbuffers.table.Table(buf, offset)");

        let is_root = ctx.schema.is_root(struct_def);
        if is_root || ctx.schema.is_nested_root(struct_def) {
            code.blank();
            code.line("@classmethod");
            code.line("def from_root(cls, buf, offset=0):");
            code.line("    n = flatbuffers.encode.Get(flatbuffers.packer.uoffset, buf, offset)");
            code.line("    return cls(buf, n + offset)");
        }
        if is_root && let Some(identifier) = &ctx.schema.file_identifier {
            code.blank();
            code.line(&format!("FILE_IDENTIFIER = b\"{identifier}\""));
            code.blank();
            code.line("@classmethod");
            code.line("def buffer_has_identifier(cls, buf, offset, size_prefixed=False):");
            code.line(
                "    return flatbuffers.util.BufferHasIdentifier(buf, offset, cls.FILE_IDENTIFIER, size_prefixed=size_prefixed)",
            );
        }
        if ctx.options.generate_name_strings {
            code.blank();
            code.line("@classmethod");
            code.line("def fully_qualified_name(cls):");
            code.line(&format!("    return \"{}\"", struct_def.namespace.qualify(&struct_def.name, ".")));
        }

        for field in struct_def.live_fields() {
            code.blank();
            for doc in &field.doc_comment {
                code.line(&format!("# {}", doc.trim_end()));
            }
            self.gen_table_accessor(ctx, field, state, code);
            if ctx.options.mutable_buffer {
                self.gen_table_mutator(field, code);
            }
        }
        code.dedent();
    }

    fn gen_table_accessor(
        &self,
        ctx: &GenContext<'_>,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.field(field);
        let ty = &field.value.ty;

        if ty.is_vector() {
            self.gen_vector_accessors(ctx, field, state, code);
            return;
        }

        code.line(&format!("def {name}(self):"));
        code.indent();
        // Imported ahead of the offset test so the fallback below sees it too.
        let class = if ty.is_enum() || ty.is_struct() {
            self.import_type(ctx, ty, code)
        } else {
            String::new()
        };
        code.line(&self.offset_line(field));
        code.line("if o != 0:");
        code.indent();
        let fallback = if ty.is_scalar() {
            let read = format!("self._tab.Get({}, o + self._tab.Pos)", Self::flags(ty));
            if ty.is_enum() {
                let default = self.enum_default(ctx.enum_of(ty), &class, field);
                Self::return_enum(&class, &read, &default, code);
                code.dedent();
                default
            } else if ty.base_type == BaseType::Bool {
                code.line(&format!("return bool({read})"));
                code.dedent();
                Self::default_value(field)
            } else {
                code.line(&format!("return {read}"));
                code.dedent();
                Self::default_value(field)
            }
        } else if ty.is_string() {
            code.line("return self._tab.String(o + self._tab.Pos)");
            code.dedent();
            "None".to_string()
        } else if ty.is_union() {
            code.line("table = flatbuffers.table.Table(bytearray(), 0)");
            code.line("self._tab.Union(table, o)");
            code.line("return table");
            code.dedent();
            "None".to_string()
        } else if ctx.schema.is_fixed_struct(ty) {
            code.line(&format!("return {class}(self._tab.Bytes, o + self._tab.Pos)"));
            code.dedent();
            "None".to_string()
        } else {
            code.line("x = self._tab.Indirect(o + self._tab.Pos)");
            code.line(&format!("return {class}(self._tab.Bytes, x)"));
            code.dedent();
            "None".to_string()
        };
        code.line(&format!("return {fallback}"));
        code.dedent();
    }

    /// Default of an enum field, spelled as a member when one matches.
    pub(super) fn enum_default(&self, enum_def: &EnumDef, class: &str, field: &FieldDef) -> String {
        let constant = &field.value.constant;
        let value = constant
            .parse::<i128>()
            .ok()
            .and_then(|v| i64::try_from(v).ok().or_else(|| u64::try_from(v).ok().map(|u| u as i64)));
        match value.and_then(|v| enum_def.reverse_lookup(v)) {
            Some(member) => format!("{class}.{}", self.namer.variant(&member.name)),
            None => constant.clone(),
        }
    }

    fn gen_vector_accessors(
        &self,
        ctx: &GenContext<'_>,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.field(field);
        let element = field.value.ty.vector_type();
        let stride = ctx.schema.inline_size(&element);
        let offset = self.offset_line(field);

        code.line(&format!("def {name}(self, j):"));
        code.indent();
        code.line(&offset);
        code.line("if o != 0:");
        code.indent();
        let fallback = if element.is_scalar() {
            code.line("a = self._tab.Vector(o)");
            let read = format!(
                "self._tab.Get({}, a + {UOFFSET}(j * {stride}))",
                Self::flags(&element)
            );
            if element.is_enum() {
                let class = self.import_type(ctx, &element, code);
                let default = self.enum_default(ctx.enum_of(&element), &class, field);
                Self::return_enum(&class, &read, &default, code);
            } else {
                code.line(&format!("return {read}"));
            }
            "0"
        } else if element.is_string() {
            code.line("a = self._tab.Vector(o)");
            code.line(&format!("return self._tab.String(a + {UOFFSET}(j * 4))"));
            "\"\""
        } else if element.is_union() {
            code.line("a = self._tab.Vector(o)");
            code.line("table = flatbuffers.table.Table(bytearray(), 0)");
            code.line(&format!("self._tab.Union(table, a + {UOFFSET}(j * 4) - self._tab.Pos)"));
            code.line("return table");
            "None"
        } else if ctx.schema.is_fixed_struct(&element) {
            code.line("x = self._tab.Vector(o)");
            code.line(&format!("x += {UOFFSET}(j) * {stride}"));
            let class = self.import_type(ctx, &element, code);
            code.line(&format!("return {class}(self._tab.Bytes, x)"));
            "None"
        } else {
            code.line("x = self._tab.Vector(o)");
            code.line(&format!("x += {UOFFSET}(j) * 4"));
            code.line("x = self._tab.Indirect(x)");
            let class = self.import_type(ctx, &element, code);
            code.line(&format!("return {class}(self._tab.Bytes, x)"));
            "None"
        };
        code.dedent();
        code.line(&format!("return {fallback}"));
        code.dedent();

        if element.is_scalar() {
            Self::use_numpy(state);
            code.blank();
            code.line(&format!("def {name}_as_numpy(self):"));
            code.indent();
            code.line(&offset);
            code.line("if o != 0:");
            code.line(&format!(
                "    return self._tab.GetVectorAsNumpy({}, o)",
                Self::flags(&element)
            ));
            code.line("return 0");
            code.dedent();
        }

        if let Some(nested) = field.nested_flatbuffer {
            code.blank();
            code.line(&format!("def {name}_nested_root(self):"));
            code.indent();
            code.line(&offset);
            code.line("if o != 0:");
            code.indent();
            let class = self.import_type(ctx, &Type::structure(nested), code);
            code.line(&format!("return {class}.from_root(self._tab.Bytes, self._tab.Vector(o))"));
            code.dedent();
            code.line("return None");
            code.dedent();
        }

        code.blank();
        code.line(&format!("def {name}_length(self):"));
        code.indent();
        code.line(&offset);
        code.line("if o != 0:");
        code.line("    return self._tab.VectorLen(o)");
        code.line("return 0");
        code.dedent();
        code.blank();
        code.line(&format!("def {name}_is_none(self):"));
        code.indent();
        code.line(&offset);
        code.line("return o == 0");
        code.dedent();
    }

    fn gen_table_mutator(&self, field: &FieldDef, code: &mut CodeWriter) {
        let name = self.field(field);
        let ty = &field.value.ty;
        if ty.is_scalar() {
            code.blank();
            code.line(&format!("def mutate_{name}(self, value):"));
            code.indent();
            code.line(&self.offset_line(field));
            code.line("if o == 0:");
            code.line("    return False");
            code.line(&format!(
                "flatbuffers.encode.Write({}.packer_type, self._tab.Bytes, o + self._tab.Pos, value)",
                Self::flags(ty)
            ));
            code.line("return True");
            code.dedent();
        } else if ty.is_vector() && ty.vector_type().is_scalar() {
            let element = ty.vector_type();
            code.blank();
            code.line(&format!("def mutate_{name}(self, j, value):"));
            code.indent();
            code.line(&self.offset_line(field));
            code.line("if o == 0 or not 0 <= j < self._tab.VectorLen(o):");
            code.line("    return False");
            code.line(&format!(
                "position = self._tab.Vector(o) + {UOFFSET}(j * {})",
                element.base_type.size()
            ));
            code.line(&format!(
                "flatbuffers.encode.Write({}.packer_type, self._tab.Bytes, position, value)",
                Self::flags(&element)
            ));
            code.line("return True");
            code.dedent();
        }
    }

    pub(super) fn gen_table_builder(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        code: &mut CodeWriter,
    ) {
        let slots = struct_def.fields.len();
        code.line(&format!("class {}(object):", self.builder_class(struct_def)));
        code.indent();
        code.line("__slots__ = ['_builder']");
        code.blank();
        code.line("def __init__(self, builder):");
        code.line("    self._builder = builder");
        code.blank();
        code.line("def start(self):");
        code.line(&format!("    self._builder.StartObject({slots})"));
        code.line("    return self");

        for field in struct_def.live_fields() {
            let name = self.field(field);
            let param = self.namer.variable(&field.name);
            let ty = &field.value.ty;
            let slot = field.slot();
            code.blank();
            code.line(&format!("def add_{name}(self, {param}):"));
            code.indent();
            if ty.is_scalar() {
                code.line(&format!(
                    "self._builder.Prepend{}Slot({slot}, {param}, {})",
                    Self::prepend(ty),
                    Self::default_value(field)
                ));
            } else if ctx.schema.is_fixed_struct(ty) && ty.is_struct() {
                code.line(&format!("self._builder.PrependStructSlot({slot}, {UOFFSET}({param}), 0)"));
            } else {
                code.line(&format!(
                    "self._builder.PrependUOffsetTRelativeSlot({slot}, {UOFFSET}({param}), 0)"
                ));
            }
            code.line("return self");
            code.dedent();

            if ty.is_vector() {
                let element = ty.vector_type();
                let (size, align) = match ctx.schema.struct_of(&element) {
                    Some(s) if s.fixed => (s.bytesize, s.minalign),
                    _ => (
                        ctx.schema.inline_size(&element),
                        ctx.schema.inline_alignment(&element),
                    ),
                };
                code.blank();
                code.line("@staticmethod");
                code.line(&format!("def start_{name}_vector(builder, num_elems):"));
                code.line(&format!("    return builder.StartVector({size}, num_elems, {align})"));
            }
        }

        code.blank();
        code.line("def finish(self):");
        code.indent();
        for field in struct_def.live_fields().filter(|f| f.required) {
            code.line(&format!("if self._builder.current_vtable[{}] == 0:", field.slot()));
            code.line(&format!(
                "    raise ValueError(\"missing required field '{}' in {}\")",
                field.name, struct_def.name
            ));
        }
        code.line("return self._builder.EndObject()");
        code.dedent();

        if supports_single_call_create(ctx.schema, struct_def) {
            self.gen_table_create(struct_def, code);
        }

        if ctx.schema.is_root(struct_def) {
            let identifier = match &ctx.schema.file_identifier {
                Some(id) => format!("b\"{id}\""),
                None => "None".to_string(),
            };
            code.blank();
            code.line("@staticmethod");
            code.line("def finish_buffer(builder, root, size_prefixed=False):");
            code.line("    if size_prefixed:");
            code.line(&format!("        builder.FinishSizePrefixed(root, file_identifier={identifier})"));
            code.line("    else:");
            code.line(&format!("        builder.Finish(root, file_identifier={identifier})"));
        }
        code.dedent();
    }

    /// Single-call constructor taking every field, offsets prebuilt.
    fn gen_table_create(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let params: Vec<String> = struct_def
            .live_fields()
            .map(|f| {
                let default = if f.value.ty.is_scalar() {
                    literal(&f.value.ty, &f.value.constant)
                } else {
                    "0".to_string()
                };
                format!("{}={default}", self.namer.variable(&f.name))
            })
            .collect();
        code.blank();
        code.line("@classmethod");
        if params.is_empty() {
            code.line("def create(cls, builder):");
        } else {
            code.line(&format!("def create(cls, builder, {}):", params.join(", ")));
        }
        code.indent();
        code.line("table = cls(builder).start()");
        for field in create_order(struct_def) {
            code.line(&format!(
                "table.add_{}({})",
                self.field(field),
                self.namer.variable(&field.name)
            ));
        }
        code.line("return table.finish()");
        code.dedent();
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use crate::generator::Generator;
    use crate::language::GeneratedFile;
    use crate::options::GeneratorOptions;
    use crate::python::PythonGenerator;

    fn render(options: GeneratorOptions) -> Vec<GeneratedFile> {
        let schema = fixtures::monster();
        let plugin = PythonGenerator::new(&options);
        Generator::new(&schema, &options, &plugin)
            .render()
            .expect("Failed to render")
    }

    #[test]
    fn test_vtable_constants_skip_deprecated() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("    VT_POS = 4\n    VT_MANA = 6\n    VT_HP = 8\n    VT_NAME = 10\n    VT_INVENTORY = 14\n"));
        assert!(monster.contains("    VT_TEST_TYPE = 20\n    VT_TEST = 22\n"));
        assert!(!monster.contains("VT_FRIENDLY"));
        assert!(!monster.contains("def friendly("));
    }

    #[test]
    fn test_scalar_accessor_defaults() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains(
            "    def hp(self):\n        \
                 o = flatbuffers.number_types.UOffsetTFlags.py_type(self._tab.Offset(self.VT_HP))\n        \
                 if o != 0:\n            \
                 return self._tab.Get(flatbuffers.number_types.Int16Flags, o + self._tab.Pos)\n        \
                 return 100\n"
        ));
        assert!(monster.contains("        return Color.Blue\n"));
        assert!(monster.contains("        return Race.None_\n"));
        assert!(monster.contains("        return 3.5\n"));
        let weapon = fixtures::file(&files, "Example2/Weapon.py");
        assert!(weapon.contains("            return bool(self._tab.Get(flatbuffers.number_types.BoolFlags, o + self._tab.Pos))\n        return True\n"));
    }

    #[test]
    fn test_enum_accessor_import_visible_to_fallback() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        for (header, import, fallback) in [
            ("def color(self):", "from MyGame.Example.Color import Color", "return Color.Blue"),
            ("def race(self):", "from MyGame.Example.Race import Race", "return Race.None_"),
        ] {
            let accessor = fixtures::block(monster, header);
            let import = fixtures::position(&accessor, import);
            let check = fixtures::position(&accessor, "if o != 0:");
            assert!(import < check, "{header} imports inside the offset check");
            assert_eq!(fixtures::indent_of(accessor[import]), fixtures::indent_of(accessor[check]));

            let unknown = fixtures::position(&accessor, "except ValueError:");
            assert_eq!(accessor[unknown + 1].trim(), fallback);
            let last = accessor[accessor.len() - 1];
            assert_eq!(last.trim(), fallback);
            assert_eq!(fixtures::indent_of(last), fixtures::indent_of(accessor[check]));
        }
    }

    #[test]
    fn test_reference_accessor_imports_before_offset_check() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        let pos = fixtures::block(monster, "def pos(self):");
        assert!(
            fixtures::position(&pos, "from MyGame.Example.Vec3 import Vec3")
                < fixtures::position(&pos, "if o != 0:")
        );
        let enemy = fixtures::block(monster, "def enemy(self):");
        assert!(
            fixtures::position(&enemy, "from MyGame.Example.Monster import Monster")
                < fixtures::position(&enemy, "return Monster(self._tab.Bytes, x)")
        );
    }

    #[test]
    fn test_union_type_accessor_default() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        let accessor = fixtures::block(monster, "def test_type(self):");
        let check = fixtures::position(&accessor, "if o != 0:");
        let last = accessor[accessor.len() - 1];
        assert_eq!(last.trim(), "return 0");
        assert_eq!(fixtures::indent_of(last), fixtures::indent_of(accessor[check]));
        assert!(!accessor.iter().any(|l| l.contains("import")));
    }

    #[test]
    fn test_one_file_enum_accessor_has_no_local_import() {
        let files = render(GeneratorOptions::default().one_file(true));
        let accessor = fixtures::block(fixtures::file(&files, "monster_test_generated.py"), "def color(self):");
        assert!(!accessor.iter().any(|l| l.contains("import")));
        assert_eq!(accessor[accessor.len() - 1].trim(), "return Color.Blue");
    }

    #[test]
    fn test_vector_accessors() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("from flatbuffers.compat import import_numpy\nnp = import_numpy()\n"));
        assert!(monster.contains("    def inventory_as_numpy(self):\n"));
        assert!(monster.contains("    def testarrayoftables_length(self):\n"));
        assert!(monster.contains("            x += flatbuffers.number_types.UOffsetTFlags.py_type(j) * 4\n            x = self._tab.Indirect(x)\n"));
        assert!(monster.contains("    def testnestedflatbuffer_nested_root(self):\n"));
        assert!(monster.contains("            return Monster.from_root(self._tab.Bytes, self._tab.Vector(o))\n"));
        assert!(!monster.contains("def test4_as_numpy"));
    }

    #[test]
    fn test_root_helpers() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("    FILE_IDENTIFIER = b\"MONS\"\n"));
        assert!(monster.contains("    def from_root(cls, buf, offset=0):\n"));
        assert!(monster.contains("            builder.Finish(root, file_identifier=b\"MONS\")\n"));
        let weapon = fixtures::file(&files, "Example2/Weapon.py");
        assert!(!weapon.contains("from_root"));
        assert!(!weapon.contains("FILE_IDENTIFIER"));
    }

    #[test]
    fn test_builder_slots_and_required_check() {
        let files = render(GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("        self._builder.StartObject(20)\n"));
        assert!(monster.contains("        self._builder.PrependStructSlot(0, flatbuffers.number_types.UOffsetTFlags.py_type(pos), 0)\n"));
        assert!(monster.contains("        self._builder.PrependInt16Slot(2, hp, 100)\n"));
        assert!(monster.contains("        self._builder.PrependUint8Slot(6, color, 8)\n"));
        assert!(monster.contains("        self._builder.PrependUint64Slot(19, big, 0)\n"));
        assert!(monster.contains(
            "        if self._builder.current_vtable[3] == 0:\n            \
                 raise ValueError(\"missing required field 'name' in Monster\")\n        \
                 return self._builder.EndObject()\n"
        ));
        assert!(monster.contains("        return builder.StartVector(4, num_elems, 2)\n"));
        assert!(!monster.contains("def create(cls"));
    }

    #[test]
    fn test_single_call_create() {
        let files = render(GeneratorOptions::default());
        let weapon = fixtures::file(&files, "Example2/Weapon.py");
        assert!(weapon.contains("    def create(cls, builder, damage=5, class_=0, range=0, end=True):\n"));
        assert!(weapon.contains(
            "        table = cls(builder).start()\n        \
                 table.add_range(range)\n        \
                 table.add_class_(class_)\n        \
                 table.add_damage(damage)\n        \
                 table.add_end(end)\n        \
                 return table.finish()\n"
        ));
    }

    #[test]
    fn test_mutators() {
        let files = render(GeneratorOptions::default().mutable_buffer(true));
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("    def mutate_hp(self, value):\n"));
        assert!(monster.contains("    def mutate_inventory(self, j, value):\n"));
        assert!(!monster.contains("def mutate_name("));
    }
}
