//! Fixed struct view classes and `create_*` functions.

use ironfbs_schema::{FieldDef, StructDef};

use super::PythonGenerator;
use crate::language::GenContext;
use crate::plan::{StructBuildOp, StructBuildPlan};
use crate::writer::CodeWriter;

impl PythonGenerator {
    /// Name of the module-level function building a struct in place.
    pub(super) fn struct_creator(&self, struct_def: &StructDef) -> String {
        self.namer.function(&format!("Create{}", struct_def.name))
    }

    pub(super) fn gen_struct_class(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        code: &mut CodeWriter,
    ) {
        code.line(&format!("class {}(object):", self.namer.type_name(&struct_def.name)));
        code.indent();
        Self::docstring(code, &struct_def.doc_comment);
        code.line("__slots__ = ['_buf', '_offset']");
        code.blank();
        code.line(&format!("BYTE_SIZE = {}", struct_def.bytesize));
        code.line(&format!("MIN_ALIGN = {}", struct_def.minalign));
        code.blank();
        code.line("def __init__(self, buf, offset):");
        code.line("    self._buf = buf");
        code.line("    self._offset = offset");
        if ctx.options.generate_name_strings {
            code.blank();
            code.line("@classmethod");
            code.line("def fully_qualified_name(cls):");
            code.line(&format!("    return \"{}\"", struct_def.namespace.qualify(&struct_def.name, ".")));
        }

        for field in &struct_def.fields {
            code.blank();
            self.gen_struct_accessor(ctx, field, code);
            if ctx.options.mutable_buffer && !field.value.ty.is_struct() {
                code.blank();
                self.gen_struct_mutator(field, code);
            }
        }
        code.dedent();
    }

    fn gen_struct_accessor(&self, ctx: &GenContext<'_>, field: &FieldDef, code: &mut CodeWriter) {
        let name = self.field(field);
        let ty = &field.value.ty;
        let offset = field.value.offset;
        for doc in &field.doc_comment {
            code.line(&format!("# {}", doc.trim_end()));
        }

        if ty.is_struct() {
            code.line(&format!("def {name}(self):"));
            code.indent();
            let class = self.import_type(ctx, ty, code);
            code.line(&format!("return {class}(self._buf, self._offset + {offset})"));
            code.dedent();
            return;
        }

        if ty.is_array() {
            let element = ty.vector_type();
            let length = ty.fixed_length;
            let stride = ctx.schema.inline_size(&element);
            code.line(&format!("def {name}(self, index):"));
            code.indent();
            code.line(&format!("if not 0 <= index < {length}:"));
            code.line(&format!("    raise IndexError(\"{name} index out of range\")"));
            code.line(&format!("position = self._offset + {offset} + index * {stride}"));
            if element.is_struct() {
                let class = self.import_type(ctx, &element, code);
                code.line(&format!("return {class}(self._buf, position)"));
            } else {
                code.line(&format!(
                    "return flatbuffers.encode.Get({}.packer_type, self._buf, position)",
                    Self::flags(&element)
                ));
            }
            code.dedent();
            code.blank();
            code.line(&format!("def {name}_length(self):"));
            code.line(&format!("    return {length}"));
            code.blank();
            code.line(&format!("def {name}_as_list(self):"));
            code.line(&format!("    return [self.{name}(i) for i in range({length})]"));
            return;
        }

        code.line(&format!("def {name}(self):"));
        code.indent();
        let read = format!(
            "flatbuffers.encode.Get({}.packer_type, self._buf, self._offset + {offset})",
            Self::flags(ty)
        );
        if ty.is_enum() {
            let class = self.import_type(ctx, ty, code);
            let default = self.enum_default(ctx.enum_of(ty), &class, field);
            Self::return_enum(&class, &read, &default, code);
        } else {
            code.line(&format!("return {read}"));
        }
        code.dedent();
    }

    fn gen_struct_mutator(&self, field: &FieldDef, code: &mut CodeWriter) {
        let name = self.field(field);
        let ty = &field.value.ty;
        let offset = field.value.offset;
        if ty.is_array() {
            let element = ty.vector_type();
            if element.is_struct() {
                return;
            }
            code.line(&format!("def mutate_{name}(self, index, value):"));
            code.line(&format!("    if not 0 <= index < {}:", ty.fixed_length));
            code.line("        return False");
            code.line(&format!(
                "    flatbuffers.encode.Write({}.packer_type, self._buf, self._offset + {offset} + index * {}, value)",
                Self::flags(&element),
                element.base_type.size()
            ));
            code.line("    return True");
            return;
        }
        code.line(&format!("def mutate_{name}(self, value):"));
        code.line(&format!(
            "    flatbuffers.encode.Write({}.packer_type, self._buf, self._offset + {offset}, value)",
            Self::flags(ty)
        ));
        code.line("    return True");
    }

    /// Returns an enum read as its enum class, or `fallback` for values the
    /// enum does not declare.
    pub(super) fn return_enum(class: &str, read: &str, fallback: &str, code: &mut CodeWriter) {
        code.line(&format!("value = {read}"));
        code.line("try:");
        code.line(&format!("    return {class}(value)"));
        code.line("except ValueError:");
        code.line(&format!("    return {fallback}"));
    }

    pub(super) fn gen_struct_builder(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        code: &mut CodeWriter,
    ) {
        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        let params: Vec<String> = plan
            .params
            .iter()
            .map(|p| self.namer.variable(&p.name))
            .collect();
        code.line(&format!(
            "def {}(builder, {}):",
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
                    code.line(&format!("builder.Prepend{}({value})", Self::prepend(ty)));
                }
                StructBuildOp::BeginArray { length } => {
                    let index = format!("_idx{}", loops.len());
                    code.line(&format!("for {index} in range({length} - 1, -1, -1):"));
                    code.indent();
                    loops.push(index);
                }
                StructBuildOp::EndArray => {
                    loops.pop();
                    code.dedent();
                }
            }
        }
        code.line("return builder.Offset()");
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
    fn test_struct_layout_constants() {
        let files = render(GeneratorOptions::default());
        let vec3 = fixtures::file(&files, "Example/Vec3.py");
        assert!(vec3.contains("class Vec3(object):\n"));
        assert!(vec3.contains("    BYTE_SIZE = 32\n    MIN_ALIGN = 8\n"));
        assert!(vec3.contains(
            "        return flatbuffers.encode.Get(flatbuffers.number_types.Float64Flags.packer_type, self._buf, self._offset + 16)\n"
        ));
        assert!(vec3.contains("        from MyGame.Example.Test import Test\n        return Test(self._buf, self._offset + 26)\n"));
        assert!(vec3.contains("            return Color(value)\n"));
    }

    #[test]
    fn test_struct_builder_writes_back_to_front() {
        let files = render(GeneratorOptions::default());
        let vec3 = fixtures::file(&files, "Example/Vec3.py");
        pretty_assertions::assert_eq!(
            vec3.split("def create_vec3").nth(1).unwrap_or_default(),
            "(builder, x, y, z, test1, test2, test3_a, test3_b):\n    \
                 builder.Prep(8, 32)\n    \
                 builder.Pad(2)\n    \
                 builder.Prep(2, 4)\n    \
                 builder.Pad(1)\n    \
                 builder.PrependInt8(test3_b)\n    \
                 builder.PrependInt16(test3_a)\n    \
                 builder.Pad(1)\n    \
                 builder.PrependUint8(test2)\n    \
                 builder.PrependFloat64(test1)\n    \
                 builder.Pad(4)\n    \
                 builder.PrependFloat32(z)\n    \
                 builder.PrependFloat32(y)\n    \
                 builder.PrependFloat32(x)\n    \
                 return builder.Offset()\n"
        );
    }

    #[test]
    fn test_array_builder_loops() {
        let files = render(GeneratorOptions::default());
        let grid = fixtures::file(&files, "Example/Grid.py");
        assert!(grid.contains("def create_grid(builder, cells, corners_a, corners_b, scale):\n"));
        assert!(grid.contains(
            "    for _idx0 in range(2 - 1, -1, -1):\n        builder.Prep(2, 4)\n        builder.Pad(1)\n        builder.PrependInt8(corners_b[_idx0])\n        builder.PrependInt16(corners_a[_idx0])\n"
        ));
        assert!(grid.contains("    for _idx0 in range(3 - 1, -1, -1):\n        builder.PrependInt16(cells[_idx0])\n"));
        assert!(grid.contains("    def cells_length(self):\n        return 3\n"));
        assert!(grid.contains("        position = self._offset + 6 + index * 4\n"));
    }

    #[test]
    fn test_struct_mutators_only_when_requested() {
        let files = render(GeneratorOptions::default());
        assert!(!fixtures::all(&files).contains("def mutate_"));
        let files = render(GeneratorOptions::default().mutable_buffer(true));
        let vec3 = fixtures::file(&files, "Example/Vec3.py");
        assert!(vec3.contains("    def mutate_x(self, value):\n"));
        assert!(!vec3.contains("def mutate_test3"));
    }
}
