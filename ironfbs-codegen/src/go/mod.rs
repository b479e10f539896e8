//! Go code generation.
//!
//! Each namespace becomes a package. A definition referenced from another
//! namespace is qualified with the package alias `A__B` and imported from
//! the path `A/B`. Tables and structs wrap the `flatbuffers` Go runtime's
//! `Table` and `Struct`; builders are free functions named after the type.

mod enums;
mod object_api;
mod structs;
mod tables;

use std::path::PathBuf;

use ironfbs_schema::{BaseType, EnumDef, FieldDef, Namespace, StructDef, Type};

use crate::language::{DefinitionRef, FileState, GenContext, LanguagePlugin, TargetLanguage, doc_lines};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig};
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

/// Go reserved words.
pub const KEYWORDS: &[&str] = &[
    "break", "default", "func", "interface", "select", "case", "defer", "go", "map", "struct",
    "chan", "else", "goto", "package", "switch", "const", "fallthrough", "if", "range", "type",
    "continue", "for", "import", "return", "var",
];

/// Go spelling of each base type, in canonical order.
const BASIC_TYPES: [&str; BaseType::COUNT] = [
    "uint8", "uint8", "bool", "int8", "byte", "int16", "uint16", "int32", "uint32", "int64",
    "uint64", "float32", "float64", "int", "int", "int", "int", "int",
];

const FLATBUFFERS_IMPORT: &str = "flatbuffers \"github.com/google/flatbuffers/go\"";
const STRCONV_IMPORT: &str = "\"strconv\"";
const BYTES_IMPORT: &str = "\"bytes\"";

/// Go language plugin.
#[derive(Debug, Clone)]
pub struct GoGenerator {
    namer: Namer,
    package_override: Option<Namespace>,
}

impl GoGenerator {
    /// Creates the plugin.
    #[must_use]
    pub fn new(options: &GeneratorOptions) -> Self {
        let config = NamerConfig {
            types: Case::Keep,
            constants: Case::Keep,
            methods: Case::UpperCamel,
            functions: Case::UpperCamel,
            fields: Case::UpperCamel,
            variables: Case::LowerCamel,
            variants: Case::Keep,
            enum_variant_separator: String::new(),
            namespaces: Case::Keep,
            namespace_separator: "__".to_string(),
            object_prefix: options.object_prefix.clone(),
            object_suffix: options.object_suffix.clone(),
            keyword_prefix: String::new(),
            keyword_suffix: "_".to_string(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".go"),
        };
        Self {
            namer: Namer::new(config, KEYWORDS),
            package_override: options
                .go_namespace
                .as_deref()
                .filter(|ns| !ns.is_empty())
                .map(Namespace::from_dotted),
        }
    }

    fn basic(ty: &Type) -> &'static str {
        BASIC_TYPES[ty.base_type.index()]
    }

    /// Runtime method suffix of a scalar type, as in `Get{suffix}`.
    fn method(&self, ty: &Type) -> String {
        self.namer.method(Self::basic(ty))
    }

    /// Reader call of a scalar, string or union value.
    fn getter(&self, ty: &Type) -> String {
        match ty.base_type {
            BaseType::String => "rcv._tab.ByteVector".to_string(),
            BaseType::Union => "rcv._tab.Union".to_string(),
            BaseType::Vector => self.getter(&ty.vector_type()),
            _ => format!("rcv._tab.Get{}", self.method(ty)),
        }
    }

    /// Go literal of a field's default.
    fn constant(field: &FieldDef) -> String {
        match field.value.ty.base_type {
            BaseType::Bool => if field.value.constant == "0" { "false" } else { "true" }.to_string(),
            _ => field.value.constant.clone(),
        }
    }

    /// Accessor method name of a field.
    fn function(&self, field: &FieldDef) -> String {
        self.namer.function(&field.name)
    }

    /// Package namespace a definition is emitted into.
    fn package_of<'n>(&'n self, namespace: &'n Namespace) -> &'n Namespace {
        self.package_override.as_ref().unwrap_or(namespace)
    }

    fn package_name(&self, ctx: &GenContext<'_>, namespace: &Namespace) -> String {
        match self.package_of(namespace).last() {
            Some(last) => last.to_string(),
            None => ctx.schema.file_name.clone(),
        }
    }

    /// Qualifies `name`, declared in `namespace`, for use in the current file
    /// and records the package import it needs.
    fn qualify(
        &self,
        ctx: &GenContext<'_>,
        state: &mut FileState,
        namespace: &Namespace,
        name: String,
    ) -> String {
        if ctx.options.one_file
            || self.package_override.is_some()
            || *namespace == state.current_namespace
        {
            return name;
        }
        let (alias, path) = if namespace.is_root() {
            (ctx.schema.file_name.clone(), ctx.schema.file_name.clone())
        } else {
            (self.namer.namespace(namespace), namespace.join("/"))
        };
        state.import(format!("{alias} \"{path}\""));
        format!("{alias}.{name}")
    }

    fn enum_name(&self, ctx: &GenContext<'_>, state: &mut FileState, enum_def: &EnumDef) -> String {
        self.qualify(ctx, state, &enum_def.namespace, self.namer.type_name(&enum_def.name))
    }

    fn struct_name(&self, ctx: &GenContext<'_>, state: &mut FileState, struct_def: &StructDef) -> String {
        self.qualify(ctx, state, &struct_def.namespace, self.namer.type_name(&struct_def.name))
    }

    fn object_name(&self, ctx: &GenContext<'_>, state: &mut FileState, struct_def: &StructDef) -> String {
        self.qualify(ctx, state, &struct_def.namespace, self.namer.object_type(&struct_def.name))
    }

    /// Enum carried by a scalar type, discriminants included.
    fn scalar_enum<'a>(ctx: &GenContext<'a>, ty: &Type) -> Option<&'a EnumDef> {
        if ty.is_scalar() {
            ctx.schema.enum_of(ty)
        } else {
            None
        }
    }

    /// Type returned by accessors.
    fn type_get(&self, ctx: &GenContext<'_>, state: &mut FileState, ty: &Type) -> String {
        if let Some(enum_def) = Self::scalar_enum(ctx, ty) {
            return self.enum_name(ctx, state, enum_def);
        }
        match ty.base_type {
            _ if ty.is_scalar() => Self::basic(ty).to_string(),
            BaseType::String => "[]byte".to_string(),
            BaseType::Vector | BaseType::Array => self.type_get(ctx, state, &ty.vector_type()),
            BaseType::Struct => self.struct_name(ctx, state, ctx.struct_of(ty)),
            _ => "*flatbuffers.Table".to_string(),
        }
    }

    /// Type of an object-API field.
    fn native_type(&self, ctx: &GenContext<'_>, state: &mut FileState, ty: &Type) -> String {
        if let Some(enum_def) = Self::scalar_enum(ctx, ty) {
            return self.enum_name(ctx, state, enum_def);
        }
        match ty.base_type {
            _ if ty.is_scalar() => Self::basic(ty).to_string(),
            BaseType::String => "string".to_string(),
            BaseType::Vector | BaseType::Array => {
                format!("[]{}", self.native_type(ctx, state, &ty.vector_type()))
            }
            BaseType::Struct => format!("*{}", self.object_name(ctx, state, ctx.struct_of(ty))),
            _ => {
                let enum_def = ctx.enum_of(ty);
                let name = self.qualify(ctx, state, &enum_def.namespace, self.namer.object_type(&enum_def.name));
                format!("*{name}")
            }
        }
    }

    fn cast_to_enum(&self, ctx: &GenContext<'_>, state: &mut FileState, ty: &Type, value: &str) -> String {
        match Self::scalar_enum(ctx, ty) {
            Some(enum_def) => format!("{}({value})", self.enum_name(ctx, state, enum_def)),
            None => value.to_string(),
        }
    }

    fn cast_to_base(ctx: &GenContext<'_>, ty: &Type, value: &str) -> String {
        if Self::scalar_enum(ctx, ty).is_some() {
            format!("{}({value})", Self::basic(ty))
        } else {
            value.to_string()
        }
    }

    /// Opening lines of an accessor that looks up the field's vtable slot.
    fn offset_prefix(field: &FieldDef, code: &mut CodeWriter) {
        code.line(&format!("o := flatbuffers.UOffsetT(rcv._tab.Offset({}))", field.value.offset));
        code.line("if o != 0 {");
    }

    fn separate(state: &FileState, code: &mut CodeWriter) {
        if state.emitted > 0 {
            code.blank();
        }
    }

    fn receiver(&self, struct_def: &StructDef) -> String {
        format!("func (rcv *{})", self.namer.type_name(&struct_def.name))
    }
}

impl LanguagePlugin for GoGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Go
    }

    fn namer(&self) -> &Namer {
        &self.namer
    }

    fn indent(&self) -> &'static str {
        "\t"
    }

    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        let qualified = |namespace: &Namespace, name: String| {
            if namespace.is_root() {
                name
            } else {
                format!("{}.{name}", self.namer.namespace(namespace))
            }
        };
        if let Some(enum_def) = Self::scalar_enum(ctx, ty) {
            return qualified(&enum_def.namespace, self.namer.type_name(&enum_def.name));
        }
        match ty.base_type {
            _ if ty.is_scalar() => Self::basic(ty).to_string(),
            BaseType::String => "[]byte".to_string(),
            BaseType::Vector | BaseType::Array => format!("[]{}", self.type_name(ctx, &ty.vector_type())),
            BaseType::Struct => {
                let struct_def = ctx.struct_of(ty);
                qualified(&struct_def.namespace, self.namer.type_name(&struct_def.name))
            }
            _ => "*flatbuffers.Table".to_string(),
        }
    }

    fn begin_file(&self, ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        let package = if ctx.options.one_file && self.package_override.is_none() {
            ctx.schema.file_name.clone()
        } else {
            self.package_name(ctx, &state.namespace)
        };
        code.line("// Code generated by the FlatBuffers compiler. DO NOT EDIT.");
        code.blank();
        code.line(&format!("package {package}"));
        code.blank();

        let standard: Vec<&String> = state.imports.iter().filter(|i| i.starts_with('"')).collect();
        let packages: Vec<&String> = state
            .imports
            .iter()
            .filter(|i| !i.starts_with('"') && i.as_str() != FLATBUFFERS_IMPORT)
            .collect();
        let runtime = state.imports.contains(FLATBUFFERS_IMPORT);

        if !runtime && packages.is_empty() {
            for import in standard {
                code.line(&format!("import {import}"));
                code.blank();
            }
            return;
        }
        code.line("import (");
        code.indent();
        for import in standard {
            code.line(import);
        }
        if runtime {
            code.line(FLATBUFFERS_IMPORT);
        }
        if !packages.is_empty() {
            code.blank();
            for import in packages {
                code.line(import);
            }
        }
        code.dedent();
        code.line(")");
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
        doc_lines(code, "// ", &enum_def.doc_comment);
        self.gen_enum_decl(ctx, enum_def, state, code);
        if enum_def.is_union && ctx.options.generate_object_based_api {
            state.import(FLATBUFFERS_IMPORT);
            self.gen_native_union(ctx, enum_def, state, code);
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
        state.import(FLATBUFFERS_IMPORT);
        doc_lines(code, "// ", &struct_def.doc_comment);
        if ctx.options.generate_object_based_api {
            self.gen_native_struct(ctx, struct_def, state, code);
        }
        self.gen_struct_view(ctx, struct_def, state, code);
        self.gen_struct_builder(ctx, struct_def, state, code);
    }

    fn gen_table(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        state.import(FLATBUFFERS_IMPORT);
        doc_lines(code, "// ", &struct_def.doc_comment);
        if ctx.options.generate_object_based_api {
            self.gen_native_table(ctx, struct_def, state, code);
        }
        self.gen_table_view(ctx, struct_def, state, code);
        self.gen_table_builders(ctx, struct_def, state, code);
    }

    fn definition_file_name(&self, ctx: &GenContext<'_>, definition: DefinitionRef<'_>) -> PathBuf {
        let namespace = self.package_of(definition.namespace());
        let directory = if namespace.is_root() {
            PathBuf::from(&ctx.schema.file_name)
        } else {
            self.namer.directories(namespace)
        };
        directory.join(self.namer.file(definition.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, EMITTED};
    use crate::generator::Generator;
    use crate::language::GeneratedFile;
    use ironfbs_schema::Schema;

    pub(super) fn render(schema: &Schema, options: &GeneratorOptions) -> Vec<GeneratedFile> {
        let plugin = GoGenerator::new(options);
        Generator::new(schema, options, &plugin)
            .render()
            .expect("Failed to render")
    }

    #[test]
    fn test_basic_types_follow_canonical_order() {
        assert_eq!(BASIC_TYPES[BaseType::UChar.index()], "byte");
        assert_eq!(BASIC_TYPES[BaseType::Long.index()], "int64");
        assert_eq!(BASIC_TYPES[BaseType::Float.index()], "float32");
        let plugin = GoGenerator::new(&GeneratorOptions::default());
        assert_eq!(plugin.getter(&Type::new(BaseType::UShort)), "rcv._tab.GetUint16");
    }

    #[test]
    fn test_files_grouped_by_package_directory() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        assert_eq!(files.len(), EMITTED.len());
        assert!(files.iter().any(|f| f.path == PathBuf::from("MyGame/Example/Monster.go")));
        assert!(files.iter().any(|f| f.path == PathBuf::from("MyGame/Example2/Weapon.go")));
        let weapon = fixtures::file(&files, "Example2/Weapon.go");
        assert!(weapon.starts_with(
            "// Code generated by the FlatBuffers compiler. DO NOT EDIT.\n\npackage Example2\n\nimport (\n\tflatbuffers \"github.com/google/flatbuffers/go\"\n)\n\n"
        ));
    }

    #[test]
    fn test_cross_package_import() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default().object_api(true));
        let any = fixtures::file(&files, "Example/Any.go");
        assert!(any.contains("\t\"strconv\"\n\tflatbuffers \"github.com/google/flatbuffers/go\"\n\n\tMyGame__Example2 \"MyGame/Example2\"\n)\n"));
        assert!(any.contains("\t\tvar x MyGame__Example2.Weapon\n"));
    }

    #[test]
    fn test_one_file_is_unqualified() {
        let schema = fixtures::monster();
        let options = GeneratorOptions::default().one_file(true).object_api(true);
        let files = render(&schema, &options);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("monster_test_generated.go"));
        let text = &files[0].contents;
        assert!(text.contains("package monster_test\n"));
        assert!(!text.contains("MyGame__"));
        for name in EMITTED {
            assert_eq!(fixtures::count_lines(text, &format!("type {name} ")), 1, "{name}");
        }
    }

    #[test]
    fn test_go_namespace_override() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default().go_namespace("game.fb"));
        assert!(files.iter().all(|f| f.path.starts_with("game/fb")));
        assert!(files.iter().all(|f| f.contents.contains("package fb\n")));
        assert!(!fixtures::all(&files).contains("MyGame__"));
    }

    #[test]
    fn test_keyword_variables_escaped() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let weapon = fixtures::file(&files, "Example2/Weapon.go");
        assert!(weapon.contains("func WeaponAddRange(builder *flatbuffers.Builder, range_ int32) {\n"));
        assert!(weapon.contains("func (rcv *Weapon) Range() int32 {\n"));
    }
}
