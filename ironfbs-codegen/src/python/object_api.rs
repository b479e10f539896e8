//! Object API: mutable `*T` classes that unpack from and pack into buffers.

use ironfbs_schema::{FieldDef, StructDef};

use super::{PythonGenerator, literal};
use crate::language::GenContext;
use crate::plan::{ChildKind, PackPlan, SlotKind, StructBuildPlan, StructParam};
use crate::writer::CodeWriter;

impl PythonGenerator {
    fn object_default(field: &FieldDef) -> String {
        let ty = &field.value.ty;
        if ty.is_scalar() {
            literal(ty, &field.value.constant)
        } else {
            "None".to_string()
        }
    }

    /// Writes `__init__` and the `init_from_*` constructors shared by
    /// struct and table objects.
    fn gen_object_preamble(&self, struct_def: &StructDef, code: &mut CodeWriter) {
        let view = self.namer.type_name(&struct_def.name);
        code.line(&format!("class {}(object):", self.namer.object_type(&struct_def.name)));
        code.indent();
        code.line("def __init__(self):");
        code.indent();
        let mut any = false;
        for field in struct_def.live_fields() {
            code.line(&format!("self.{} = {}", self.field(field), Self::object_default(field)));
            any = true;
        }
        if !any {
            code.line("pass");
        }
        code.dedent();
        code.blank();
        code.line("@classmethod");
        code.line("def init_from_buf(cls, buf, pos):");
        code.line(&format!("    return cls.init_from_obj({view}(buf, pos))"));
        if !struct_def.fixed {
            code.blank();
            code.line("@classmethod");
            code.line("def init_from_packed_buf(cls, buf, pos=0):");
            code.line("    n = flatbuffers.encode.Get(flatbuffers.packer.uoffset, buf, pos)");
            code.line("    return cls.init_from_buf(buf, pos + n)");
        }
        code.blank();
        code.line("@classmethod");
        code.line("def init_from_obj(cls, view):");
        code.line("    x = cls()");
        code.line("    x._unpack(view)");
        code.line("    return x");
    }

    pub(super) fn gen_struct_object(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        code: &mut CodeWriter,
    ) {
        self.gen_object_preamble(struct_def, code);

        code.blank();
        code.line("def _unpack(self, view):");
        code.indent();
        code.line("if view is None:");
        code.line("    return");
        for field in &struct_def.fields {
            let name = self.field(field);
            let ty = &field.value.ty;
            if ty.is_struct() {
                let object = self.import_object(ctx, ty, code);
                code.line(&format!("self.{name} = {object}.init_from_obj(view.{name}())"));
            } else if ty.is_array() && ty.vector_type().is_struct() {
                let object = self.import_object(ctx, &ty.vector_type(), code);
                code.line(&format!(
                    "self.{name} = [{object}.init_from_obj(view.{name}(i)) for i in range({})]",
                    ty.fixed_length
                ));
            } else if ty.is_array() {
                code.line(&format!("self.{name} = view.{name}_as_list()"));
            } else {
                code.line(&format!("self.{name} = view.{name}()"));
            }
        }
        code.dedent();

        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        let args: Vec<String> = plan.params.iter().map(|p| self.struct_argument(p)).collect();
        code.blank();
        code.line("def pack(self, builder):");
        code.line(&format!(
            "    return {}(builder, {})",
            self.struct_creator(struct_def),
            args.join(", ")
        ));
        code.dedent();
    }

    /// Expression reading one flattened `create_*` argument from an object.
    fn struct_argument(&self, param: &StructParam<'_>) -> String {
        let attribute = |fields: &[&FieldDef]| -> String {
            fields.iter().map(|f| self.field(f)).collect::<Vec<_>>().join(".")
        };
        match param.array {
            Some(span) if span.of_structs => {
                let (outer, inner) = param.path.split_at(span.field_index + 1);
                format!("[_e.{} for _e in self.{}]", attribute(inner), attribute(outer))
            }
            _ => format!("self.{}", attribute(&param.path)),
        }
    }

    pub(super) fn gen_table_object(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        code: &mut CodeWriter,
    ) {
        self.gen_object_preamble(struct_def, code);
        code.blank();
        self.gen_table_unpack(ctx, struct_def, code);
        code.blank();
        self.gen_table_pack(ctx, struct_def, code);
        code.dedent();
    }

    fn gen_table_unpack(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        code.line("def _unpack(self, view):");
        code.indent();
        code.line("if view is None:");
        code.line("    return");
        for field in struct_def.live_fields() {
            let name = self.field(field);
            let ty = &field.value.ty;
            if ty.is_scalar() || ty.is_string() {
                code.line(&format!("self.{name} = view.{name}()"));
            } else if ty.is_union() {
                let enum_def = ctx.enum_of(ty);
                let creator = self.union_creator(enum_def);
                let creator = self.import_symbol(ctx, &enum_def.namespace, &enum_def.name, &creator, code);
                code.line(&format!("self.{name} = {creator}(self.{name}_type, view.{name}())"));
            } else if ty.is_struct() {
                let object = self.import_object(ctx, ty, code);
                code.line(&format!("if view.{name}() is not None:"));
                code.line(&format!("    self.{name} = {object}.init_from_obj(view.{name}())"));
            } else {
                let element = ty.vector_type();
                code.line(&format!("if not view.{name}_is_none():"));
                code.indent();
                if element.is_union() {
                    let enum_def = ctx.enum_of(&element);
                    let creator = self.union_creator(enum_def);
                    let creator = self.import_symbol(ctx, &enum_def.namespace, &enum_def.name, &creator, code);
                    code.line(&format!(
                        "self.{name} = [{creator}(self.{name}_type[i], view.{name}(i)) for i in range(view.{name}_length())]"
                    ));
                } else if element.is_struct() {
                    let object = self.import_object(ctx, &element, code);
                    code.line(&format!(
                        "self.{name} = [{object}.init_from_obj(view.{name}(i)) for i in range(view.{name}_length())]"
                    ));
                } else {
                    code.line(&format!(
                        "self.{name} = [view.{name}(i) for i in range(view.{name}_length())]"
                    ));
                }
                code.dedent();
            }
        }
        code.dedent();
    }

    fn gen_table_pack(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let plan = PackPlan::new(ctx.schema, struct_def);
        code.line("def pack(self, builder):");
        code.indent();

        for child in &plan.children {
            let name = self.field(child.field);
            let local = format!("_{name}");
            let ty = &child.field.value.ty;
            code.line(&format!("if self.{name} is not None:"));
            code.indent();
            match child.kind {
                ChildKind::String => {
                    code.line(&format!("{local} = builder.CreateString(self.{name})"));
                }
                ChildKind::Table => code.line(&format!("{local} = self.{name}.pack(builder)")),
                ChildKind::Union => {
                    let string_variant = ctx.enum_of(ty).has_string_variant();
                    Self::pack_union_value(&local, &format!("self.{name}"), string_variant, code);
                }
                ChildKind::ScalarVector | ChildKind::UnionTypeVector => {
                    let element = ty.vector_type();
                    let size = element.base_type.size();
                    code.line(&format!("if np is not None and type(self.{name}) is np.ndarray:"));
                    code.line(&format!("    {local} = builder.CreateNumpyVector(self.{name})"));
                    code.line("else:");
                    code.indent();
                    code.line(&format!("builder.StartVector({size}, len(self.{name}), {size})"));
                    code.line(&format!("for item in reversed(self.{name}):"));
                    code.line(&format!("    builder.Prepend{}(item)", Self::prepend(&element)));
                    code.line(&format!("{local} = builder.EndVector()"));
                    code.dedent();
                }
                ChildKind::StringVector => {
                    code.line(&format!(
                        "{local}_items = [builder.CreateString(item) for item in self.{name}]"
                    ));
                    Self::pack_offset_vector(&local, code);
                }
                ChildKind::TableVector => {
                    code.line(&format!("{local}_items = [item.pack(builder) for item in self.{name}]"));
                    Self::pack_offset_vector(&local, code);
                }
                ChildKind::UnionVector => {
                    let string_variant = ctx.enum_of(&ty.vector_type()).has_string_variant();
                    code.line(&format!("{local}_items = []"));
                    code.line(&format!("for item in self.{name}:"));
                    code.indent();
                    Self::pack_union_value("packed", "item", string_variant, code);
                    code.line(&format!("{local}_items.append(packed)"));
                    code.dedent();
                    Self::pack_offset_vector(&local, code);
                }
                ChildKind::StructVector => {
                    let element = ctx.struct_of(&ty.vector_type());
                    code.line(&format!(
                        "builder.StartVector({}, len(self.{name}), {})",
                        element.bytesize, element.minalign
                    ));
                    code.line(&format!("for item in reversed(self.{name}):"));
                    code.line("    item.pack(builder)");
                    code.line(&format!("{local} = builder.EndVector()"));
                }
            }
            code.dedent();
        }

        code.line(&format!("table = {}(builder).start()", self.builder_class(struct_def)));
        for slot in &plan.slots {
            let name = self.field(slot.field);
            match slot.kind {
                SlotKind::Scalar | SlotKind::UnionType => {
                    code.line(&format!("table.add_{name}(self.{name})"));
                }
                SlotKind::InlineStruct => {
                    code.line(&format!("if self.{name} is not None:"));
                    code.line(&format!("    table.add_{name}(self.{name}.pack(builder))"));
                }
                SlotKind::Offset => {
                    code.line(&format!("if self.{name} is not None:"));
                    code.line(&format!("    table.add_{name}(_{name})"));
                }
            }
        }
        code.line("return table.finish()");
        code.dedent();
    }

    fn pack_union_value(target: &str, value: &str, string_variant: bool, code: &mut CodeWriter) {
        if string_variant {
            code.line(&format!("if isinstance({value}, (bytes, str)):"));
            code.line(&format!("    {target} = builder.CreateString({value})"));
            code.line("else:");
            code.line(&format!("    {target} = {value}.pack(builder)"));
        } else {
            code.line(&format!("{target} = {value}.pack(builder)"));
        }
    }

    fn pack_offset_vector(local: &str, code: &mut CodeWriter) {
        code.line(&format!("builder.StartVector(4, len({local}_items), 4)"));
        code.line(&format!("for item in reversed({local}_items):"));
        code.line("    builder.PrependUOffsetTRelative(item)");
        code.line(&format!("{local} = builder.EndVector()"));
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
    fn test_object_api_only_when_requested() {
        let files = render(GeneratorOptions::default());
        assert!(!fixtures::all(&files).contains("class MonsterT("));
        let files = render(GeneratorOptions::default().object_api(true));
        assert!(fixtures::file(&files, "Example/Monster.py").contains("class MonsterT(object):\n"));
    }

    #[test]
    fn test_struct_object_packs_flattened_fields() {
        let files = render(GeneratorOptions::default().object_api(true));
        let vec3 = fixtures::file(&files, "Example/Vec3.py");
        assert!(vec3.contains("        self.x = 0.0\n"));
        assert!(vec3.contains(
            "        return create_vec3(builder, self.x, self.y, self.z, self.test1, self.test2, self.test3.a, self.test3.b)\n"
        ));
        let grid = fixtures::file(&files, "Example/Grid.py");
        assert!(grid.contains(
            "        return create_grid(builder, self.cells, [_e.a for _e in self.corners], [_e.b for _e in self.corners], self.scale)\n"
        ));
        assert!(grid.contains("        self.cells = view.cells_as_list()\n"));
    }

    #[test]
    fn test_table_object_defaults_and_unpack() {
        let files = render(GeneratorOptions::default().object_api(true));
        let monster = fixtures::file(&files, "Example/Monster.py");
        assert!(monster.contains("        self.hp = 100\n"));
        assert!(monster.contains("        self.testf = 3.5\n"));
        assert!(monster.contains("        self.name = None\n"));
        assert!(monster.contains("        from MyGame.Example.Any import any_creator\n        self.test = any_creator(self.test_type, view.test())\n"));
        assert!(monster.contains(
            "            self.weapons = [any_creator(self.weapons_type[i], view.weapons(i)) for i in range(view.weapons_length())]\n"
        ));
    }

    #[test]
    fn test_table_pack_builds_children_first() {
        let files = render(GeneratorOptions::default().object_api(true));
        let monster = fixtures::file(&files, "Example/Monster.py");
        let pack = monster
            .split("    def pack(self, builder):\n")
            .nth(1)
            .unwrap_or_default();
        let start = pack.find("table = MonsterBuilder(builder).start()").unwrap_or(usize::MAX);
        let name = pack.find("_name = builder.CreateString(self.name)").unwrap_or(usize::MAX);
        let tables = pack.find("_testarrayoftables_items = [item.pack(builder)").unwrap_or(usize::MAX);
        assert!(name < start && tables < start && start < usize::MAX);
        assert!(pack.contains("            table.add_pos(self.pos.pack(builder))\n"));
        assert!(pack.contains("                _test = builder.CreateString(self.test)\n"));
        assert!(pack.contains("            builder.StartVector(4, len(self.test4), 2)\n"));
        assert!(pack.contains("        table.add_test_type(self.test_type)\n"));
        assert!(pack.ends_with("        return table.finish()\n"));
    }
}
