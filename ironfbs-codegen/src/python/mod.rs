//! Python code generation.
//!
//! Emits classes over the `flatbuffers` Python runtime: an `IntEnum` per
//! enum, a view class and a `create_*` builder function per struct, and a
//! view class plus `*Builder` class per table. The object API adds plain
//! `*T` classes with `pack`/`init_from_obj`.

mod enums;
mod object_api;
mod structs;
mod tables;

use std::collections::BTreeSet;
use std::path::PathBuf;

use ironfbs_schema::{BaseType, EnumDef, FieldDef, Namespace, StructDef, Type};

use crate::language::{FileState, GenContext, GeneratedFile, LanguagePlugin, TargetLanguage};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig, convert_case};
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

/// Python reserved words.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Runtime number type of each base type, in canonical order.
const BASIC_TYPES: [&str; BaseType::COUNT] = [
    "uint8", "uint8", "bool", "int8", "uint8", "int16", "uint16", "int32", "uint32", "int64",
    "uint64", "float32", "float64", "int", "int", "int", "int", "int",
];

const NUMPY_IMPORT: &str = "from flatbuffers.compat import import_numpy";

/// Python language plugin.
#[derive(Debug, Clone)]
pub struct PythonGenerator {
    namer: Namer,
}

impl PythonGenerator {
    /// Creates the plugin.
    #[must_use]
    pub fn new(options: &GeneratorOptions) -> Self {
        let config = NamerConfig {
            types: Case::Keep,
            constants: Case::AllUpper,
            methods: Case::Keep,
            functions: Case::Snake,
            fields: Case::Keep,
            variables: Case::Keep,
            variants: Case::Keep,
            enum_variant_separator: ".".to_string(),
            namespaces: Case::Keep,
            namespace_separator: ".".to_string(),
            object_prefix: options.object_prefix.clone(),
            object_suffix: options.object_suffix.clone(),
            keyword_prefix: String::new(),
            keyword_suffix: "_".to_string(),
            escape_order: EscapeOrder::BeforeConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".py"),
        };
        Self {
            namer: Namer::new(config, KEYWORDS),
        }
    }

    fn basic(ty: &Type) -> &'static str {
        BASIC_TYPES[ty.base_type.index()]
    }

    /// Runtime flags object of a scalar type.
    fn flags(ty: &Type) -> String {
        format!(
            "flatbuffers.number_types.{}Flags",
            convert_case(Self::basic(ty), Case::UpperCamel)
        )
    }

    /// Builder method suffix of a scalar type, as in `Prepend{suffix}`.
    fn prepend(ty: &Type) -> String {
        convert_case(Self::basic(ty), Case::UpperCamel)
    }

    /// Python literal of a field's default.
    fn default_value(field: &FieldDef) -> String {
        literal(&field.value.ty, &field.value.constant)
    }

    /// Constant holding a table field's vtable offset.
    fn vt_name(&self, field: &FieldDef) -> String {
        format!("VT_{}", self.namer.constant(&field.name))
    }

    /// Name of a field accessor.
    fn field(&self, field: &FieldDef) -> String {
        self.namer.field(&field.name)
    }

    /// Dotted module path of a definition in per-definition output.
    fn module_path(&self, namespace: &Namespace, name: &str) -> String {
        let mut parts: Vec<String> = namespace
            .components
            .iter()
            .map(|c| self.namer.namespace_component(c))
            .collect();
        parts.push(name.to_string());
        parts.join(".")
    }

    fn per_definition(ctx: &GenContext<'_>) -> bool {
        !ctx.options.one_file
    }

    /// Makes `symbol`, defined in the module of `name`, usable at the
    /// current position of `code` and returns its local spelling.
    fn import_symbol(
        &self,
        ctx: &GenContext<'_>,
        namespace: &Namespace,
        name: &str,
        symbol: &str,
        code: &mut CodeWriter,
    ) -> String {
        if Self::per_definition(ctx) {
            code.line(&format!(
                "from {} import {symbol}",
                self.module_path(namespace, &self.namer.type_name(name))
            ));
        }
        symbol.to_string()
    }

    /// Local name of the view class of a struct, table or enum type.
    fn import_type(&self, ctx: &GenContext<'_>, ty: &Type, code: &mut CodeWriter) -> String {
        let (namespace, name) = if let Some(struct_def) = ctx.schema.struct_of(ty) {
            (&struct_def.namespace, &struct_def.name)
        } else {
            let enum_def = ctx.enum_of(ty);
            (&enum_def.namespace, &enum_def.name)
        };
        let symbol = self.namer.type_name(name);
        self.import_symbol(ctx, namespace, name, &symbol, code)
    }

    /// Local name of the object-API class of a struct or table type.
    fn import_object(&self, ctx: &GenContext<'_>, ty: &Type, code: &mut CodeWriter) -> String {
        let struct_def = ctx.struct_of(ty);
        let symbol = self.namer.object_type(&struct_def.name);
        self.import_symbol(ctx, &struct_def.namespace, &struct_def.name, &symbol, code)
    }

    /// Writes a docstring block at the current indentation.
    fn docstring(code: &mut CodeWriter, doc: &[String]) {
        if doc.is_empty() {
            return;
        }
        code.line("\"\"\"");
        for line in doc {
            code.line(line.trim_end());
        }
        code.line("\"\"\"");
    }

    fn separate(state: &FileState, code: &mut CodeWriter) {
        if state.emitted > 0 {
            code.blank();
            code.blank();
        }
    }

    fn use_numpy(state: &mut FileState) {
        state.import(NUMPY_IMPORT);
    }
}

/// Python spelling of a scalar constant.
fn literal(ty: &Type, constant: &str) -> String {
    match ty.base_type {
        BaseType::Bool => if constant == "0" { "False" } else { "True" }.to_string(),
        BaseType::Float | BaseType::Double
            if !constant.contains(['.', 'e', 'E', 'n', 'i']) =>
        {
            format!("{constant}.0")
        }
        _ => constant.to_string(),
    }
}

impl LanguagePlugin for PythonGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Python
    }

    fn namer(&self) -> &Namer {
        &self.namer
    }

    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        match ty.base_type {
            BaseType::String => "str".to_string(),
            BaseType::Vector | BaseType::Array => {
                format!("List[{}]", self.type_name(ctx, &ty.vector_type()))
            }
            BaseType::Struct => self.namer.type_name(&ctx.struct_of(ty).name),
            BaseType::Union => "flatbuffers.table.Table".to_string(),
            _ if ty.is_enum() => self.namer.type_name(&ctx.enum_of(ty).name),
            BaseType::Bool => "bool".to_string(),
            BaseType::Float | BaseType::Double => "float".to_string(),
            _ => "int".to_string(),
        }
    }

    fn begin_file(&self, _ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        code.line("# automatically generated by the FlatBuffers compiler, do not modify");
        code.blank();
        if !state.namespace.is_root() {
            code.line(&format!("# namespace: {}", self.namer.namespace(&state.namespace)));
            code.blank();
        }
        code.line("import flatbuffers");
        code.line("import enum");
        for import in &state.imports {
            code.line(import);
        }
        if state.imports.contains(NUMPY_IMPORT) {
            code.line("np = import_numpy()");
        }
        code.blank();
        code.blank();
    }

    fn gen_enum(
        &self,
        ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        self.gen_enum_class(ctx, enum_def, code);
        if enum_def.is_union && ctx.options.generate_object_based_api {
            code.blank();
            code.blank();
            self.gen_union_creator(ctx, enum_def, code);
        }
    }

    fn gen_struct(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        self.gen_struct_class(ctx, struct_def, code);
        code.blank();
        code.blank();
        self.gen_struct_builder(ctx, struct_def, code);
        if ctx.options.generate_object_based_api {
            code.blank();
            code.blank();
            self.gen_struct_object(ctx, struct_def, code);
        }
    }

    fn gen_table(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        self.gen_table_class(ctx, struct_def, state, code);
        code.blank();
        code.blank();
        self.gen_table_builder(ctx, struct_def, code);
        if ctx.options.generate_object_based_api {
            code.blank();
            code.blank();
            self.gen_table_object(ctx, struct_def, code);
        }
    }

    fn extra_files(&self, ctx: &GenContext<'_>, files: &[GeneratedFile]) -> Vec<GeneratedFile> {
        if !Self::per_definition(ctx) {
            return Vec::new();
        }
        let mut packages: BTreeSet<PathBuf> = BTreeSet::new();
        for file in files {
            let mut dir = file.path.parent();
            while let Some(d) = dir {
                if d.as_os_str().is_empty() {
                    break;
                }
                packages.insert(d.to_path_buf());
                dir = d.parent();
            }
        }
        packages
            .into_iter()
            .map(|dir| GeneratedFile {
                path: dir.join("__init__.py"),
                contents: String::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, EMITTED};
    use crate::generator::Generator;
    use crate::language::GeneratedFile;
    use ironfbs_schema::Schema;

    fn render(schema: &Schema, options: &GeneratorOptions) -> Vec<GeneratedFile> {
        let plugin = PythonGenerator::new(options);
        Generator::new(schema, options, &plugin)
            .render()
            .expect("Failed to render")
    }

    #[test]
    fn test_basic_types_follow_canonical_order() {
        assert_eq!(BASIC_TYPES[BaseType::Bool.index()], "bool");
        assert_eq!(BASIC_TYPES[BaseType::UShort.index()], "uint16");
        assert_eq!(BASIC_TYPES[BaseType::Double.index()], "float64");
        assert_eq!(
            PythonGenerator::flags(&Type::new(BaseType::ULong)),
            "flatbuffers.number_types.Uint64Flags"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Type::new(BaseType::Bool), "1"), "True");
        assert_eq!(literal(&Type::new(BaseType::Bool), "0"), "False");
        assert_eq!(literal(&Type::new(BaseType::Float), "3"), "3.0");
        assert_eq!(literal(&Type::new(BaseType::Double), "3.5"), "3.5");
        assert_eq!(literal(&Type::new(BaseType::Short), "-7"), "-7");
    }

    #[test]
    fn test_per_definition_files() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        for name in EMITTED {
            let defined = files
                .iter()
                .filter(|f| f.path.file_stem().and_then(|s| s.to_str()) == Some(name))
                .count();
            assert_eq!(defined, 1, "{name}");
        }
        assert!(!files.iter().any(|f| f.path.ends_with("Legacy.py")));
        assert!(!files.iter().any(|f| f.path.ends_with("OldEnum.py")));
        for package in ["MyGame/__init__.py", "MyGame/Example/__init__.py", "MyGame/Example2/__init__.py"] {
            assert!(files.iter().any(|f| f.path == PathBuf::from(package)), "{package}");
        }
    }

    #[test]
    fn test_one_declaration_per_definition() {
        let schema = fixtures::monster();
        let options = GeneratorOptions::default().one_file(true).object_api(true);
        let files = render(&schema, &options);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("monster_test_generated.py"));
        let text = &files[0].contents;
        for name in EMITTED {
            assert_eq!(
                fixtures::count_lines(text, &format!("class {name}(")),
                1,
                "{name}"
            );
        }
        assert!(!text.contains("class Legacy("));
        assert!(!text.contains("class OldEnum("));
    }

    #[test]
    fn test_deterministic() {
        let schema = fixtures::monster();
        let options = GeneratorOptions::default().object_api(true).mutable_buffer(true);
        assert_eq!(render(&schema, &options), render(&schema, &options));
    }

    #[test]
    fn test_keywords_escaped_once() {
        let plugin = PythonGenerator::new(&GeneratorOptions::default());
        for keyword in KEYWORDS {
            let escaped = plugin.namer.escape_keyword(keyword);
            assert_ne!(&escaped, keyword);
            assert_eq!(plugin.namer.escape_keyword(&escaped), escaped);
            assert!(!KEYWORDS.contains(&escaped.as_str()));
        }
    }

    #[test]
    fn test_keyword_fields_in_output() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let weapon = fixtures::file(&files, "Example2/Weapon.py");
        assert!(weapon.contains("    def class_(self):"));
        assert!(weapon.contains("    VT_CLASS_ = 6"));
        let race = fixtures::file(&files, "Example/Race.py");
        assert!(race.contains("    None_ = -1"));
    }
}
