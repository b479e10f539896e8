//! C# code generation.
//!
//! One file per namespace, with nested `namespace` blocks opened and closed
//! by the engine's namespace transitions. Tables and structs are value
//! types implementing `IFlatbufferObject`; builders are static methods.

mod enums;
mod structs;
mod tables;

use ironfbs_schema::{BaseType, EnumDef, FieldDef, Namespace, StructDef, Type};

use crate::language::{FileState, GenContext, LanguagePlugin, OutputLayout, TargetLanguage};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig};
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

/// C# reserved words.
pub const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// C# spelling of each base type, in canonical order.
const BASIC_TYPES: [&str; BaseType::COUNT] = [
    "byte", "byte", "bool", "sbyte", "byte", "short", "ushort", "int", "uint", "long", "ulong",
    "float", "double", "string", "int", "int", "int", "int",
];

/// Builder and buffer method suffix of each scalar, in canonical order.
const METHOD_SUFFIXES: [&str; 13] = [
    "Byte", "Byte", "Bool", "Sbyte", "Byte", "Short", "Ushort", "Int", "Uint", "Long", "Ulong",
    "Float", "Double",
];

const USINGS: [&str; 3] = [
    "global::System",
    "global::System.Collections.Generic",
    "global::Google.FlatBuffers",
];

/// C# language plugin.
#[derive(Debug, Clone)]
pub struct CSharpGenerator {
    namer: Namer,
}

impl CSharpGenerator {
    /// Creates the plugin.
    #[must_use]
    pub fn new(options: &GeneratorOptions) -> Self {
        let config = NamerConfig {
            types: Case::Keep,
            constants: Case::UpperCamel,
            methods: Case::UpperCamel,
            functions: Case::UpperCamel,
            fields: Case::UpperCamel,
            variables: Case::LowerCamel,
            variants: Case::Keep,
            enum_variant_separator: ".".to_string(),
            namespaces: Case::Keep,
            namespace_separator: ".".to_string(),
            object_prefix: options.object_prefix.clone(),
            object_suffix: options.object_suffix.clone(),
            keyword_prefix: "@".to_string(),
            keyword_suffix: String::new(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".cs"),
        };
        Self {
            namer: Namer::new(config, KEYWORDS),
        }
    }

    fn basic(ty: &Type) -> &'static str {
        BASIC_TYPES[ty.base_type.index()]
    }

    /// `Byte`, `Short`... as used by `builder.Add*`, `builder.Put*` and `bb.Get*`.
    fn suffix(ty: &Type) -> &'static str {
        METHOD_SUFFIXES
            .get(ty.base_type.index())
            .copied()
            .unwrap_or("Int")
    }

    /// Expression reading a scalar at `position` from `__p.bb`.
    fn read_scalar(ty: &Type, position: &str) -> String {
        match ty.base_type {
            BaseType::Bool => format!("0!=__p.bb.Get({position})"),
            BaseType::UChar | BaseType::UType | BaseType::None => format!("__p.bb.Get({position})"),
            _ => format!("__p.bb.Get{}({position})", Self::suffix(ty)),
        }
    }

    /// Statement writing a scalar at `position` into `__p.bb`.
    fn write_scalar(ty: &Type, position: &str, value: &str) -> String {
        match ty.base_type {
            BaseType::Bool => format!("__p.bb.Put({position}, (byte)({value} ? 1 : 0))"),
            BaseType::UChar | BaseType::UType | BaseType::None => format!("__p.bb.Put({position}, {value})"),
            _ => format!("__p.bb.Put{}({position}, {value})", Self::suffix(ty)),
        }
    }

    fn qualified(&self, namespace: &Namespace, name: &str) -> String {
        self.namer.namespaced_type(namespace, name)
    }

    fn enum_name(&self, enum_def: &EnumDef) -> String {
        self.qualified(&enum_def.namespace, &enum_def.name)
    }

    fn struct_name(&self, struct_def: &StructDef) -> String {
        self.qualified(&struct_def.namespace, &struct_def.name)
    }

    /// Scalar enum a type carries, discriminants included.
    fn scalar_enum<'a>(ctx: &GenContext<'a>, ty: &Type) -> Option<&'a EnumDef> {
        if ty.is_scalar() {
            ctx.schema.enum_of(ty)
        } else {
            None
        }
    }

    /// Type of a value as read from the buffer.
    fn type_get(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        if let Some(enum_def) = Self::scalar_enum(ctx, ty) {
            return self.enum_name(enum_def);
        }
        match ty.base_type {
            _ if ty.is_scalar() => Self::basic(ty).to_string(),
            BaseType::String => "string".to_string(),
            BaseType::Vector | BaseType::Array => self.type_get(ctx, &ty.vector_type()),
            BaseType::Struct => self.struct_name(ctx.struct_of(ty)),
            _ => "TTable".to_string(),
        }
    }

    fn cast_to_enum(&self, ctx: &GenContext<'_>, ty: &Type, value: &str) -> String {
        match Self::scalar_enum(ctx, ty) {
            Some(enum_def) => format!("({}){value}", self.enum_name(enum_def)),
            None => value.to_string(),
        }
    }

    fn cast_to_base(ctx: &GenContext<'_>, ty: &Type, value: &str) -> String {
        if Self::scalar_enum(ctx, ty).is_some() {
            format!("({}){value}", Self::basic(ty))
        } else {
            value.to_string()
        }
    }

    /// Default of a scalar field as a C# expression of the accessor's type.
    fn default_value(&self, ctx: &GenContext<'_>, field: &FieldDef) -> String {
        let ty = &field.value.ty;
        let constant = &field.value.constant;
        if let Some(enum_def) = Self::scalar_enum(ctx, ty) {
            let name = self.enum_name(enum_def);
            let member = constant
                .parse::<i64>()
                .ok()
                .and_then(|v| enum_def.reverse_lookup(v))
                .filter(|_| !enum_def.is_bit_flags());
            return match member {
                Some(val) => format!("{name}.{}", self.namer.variant(&val.name)),
                None => format!("({name}){constant}"),
            };
        }
        Self::literal(ty, constant)
    }

    /// Literal of a scalar constant, usable as a builder default argument.
    fn literal(ty: &Type, constant: &str) -> String {
        match ty.base_type {
            BaseType::Bool => if constant == "0" { "false" } else { "true" }.to_string(),
            BaseType::Float => format!("{constant}f"),
            BaseType::Double if !constant.contains(['.', 'e', 'E']) => format!("{constant}.0"),
            _ if ty.is_scalar() => format!("({}){constant}", Self::basic(ty)),
            _ => constant.to_string(),
        }
    }

    /// Property or method name of a field. C# rejects members named after
    /// their enclosing type.
    fn member(&self, struct_def: &StructDef, field: &FieldDef) -> String {
        let name = self.namer.field(&field.name);
        if name == self.namer.type_name(&struct_def.name) {
            format!("{name}_")
        } else {
            name
        }
    }

    fn separate(state: &FileState, code: &mut CodeWriter) {
        if state.emitted > 0 {
            code.blank();
        }
    }

    fn doc(code: &mut CodeWriter, doc: &[String]) {
        crate::language::doc_lines(code, "/// ", doc);
    }
}

impl LanguagePlugin for CSharpGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::CSharp
    }

    fn namer(&self) -> &Namer {
        &self.namer
    }

    fn indent(&self) -> &'static str {
        "  "
    }

    fn layout(&self, options: &GeneratorOptions) -> OutputLayout {
        if options.one_file {
            OutputLayout::OneFile
        } else {
            OutputLayout::PerNamespace
        }
    }

    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        self.type_get(ctx, ty)
    }

    fn begin_file(&self, _ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        code.line("// <auto-generated>");
        code.line("//  automatically generated by the FlatBuffers compiler, do not modify");
        code.line("// </auto-generated>");
        code.blank();
        if !state.imports.is_empty() {
            for using in &state.imports {
                code.line(&format!("using {using};"));
            }
            code.blank();
        }
    }

    fn open_namespace(&self, _ctx: &GenContext<'_>, component: &str, code: &mut CodeWriter) {
        code.line(&format!("namespace {}", self.namer.namespace_component(component)));
        code.line("{");
        code.indent();
    }

    fn close_namespace(&self, _ctx: &GenContext<'_>, _component: &str, code: &mut CodeWriter) {
        code.dedent();
        code.line("}");
    }

    fn gen_enum(
        &self,
        ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        self.gen_enum_decl(ctx, enum_def, code);
    }

    fn gen_struct(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        for using in USINGS {
            state.import(using);
        }
        self.gen_struct_decl(ctx, struct_def, code);
    }

    fn gen_table(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        Self::separate(state, code);
        for using in USINGS {
            state.import(using);
        }
        self.gen_table_decl(ctx, struct_def, code);
    }
}
