//! Schema (`.fbs`) re-emission.
//!
//! Writes the resolved schema back as IDL text: one file holding every
//! non-generated definition, followed by the root declarations. Hidden
//! union discriminant fields are folded back into their union field.

use ironfbs_schema::{Attributes, BaseType, Definition, EnumDef, FieldDef, Namespace, StructDef, Type};

use crate::language::{
    FileState, GenContext, LanguagePlugin, OutputLayout, TargetLanguage, doc_lines,
    enum_value_text,
};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig};
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

/// Attribute keys written from dedicated field flags.
const FLAG_ATTRIBUTES: [&str; 4] = ["deprecated", "required", "key", "nested_flatbuffer"];

/// Schema language plugin.
#[derive(Debug, Clone)]
pub struct FbsGenerator {
    namer: Namer,
}

impl FbsGenerator {
    /// Creates the plugin.
    #[must_use]
    pub fn new(options: &GeneratorOptions) -> Self {
        let config = NamerConfig {
            types: Case::Keep,
            constants: Case::Keep,
            methods: Case::Keep,
            functions: Case::Keep,
            fields: Case::Keep,
            variables: Case::Keep,
            variants: Case::Keep,
            enum_variant_separator: ".".to_string(),
            namespaces: Case::Keep,
            namespace_separator: ".".to_string(),
            object_prefix: String::new(),
            object_suffix: String::new(),
            keyword_prefix: String::new(),
            keyword_suffix: String::new(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".fbs"),
        };
        Self {
            namer: Namer::new(config, &[]),
        }
    }

    /// Name of a definition as seen from `from`.
    fn qualified(definition: &dyn Definition, from: &Namespace) -> String {
        if definition.namespace() == from {
            definition.name().to_string()
        } else {
            definition.fully_qualified_name()
        }
    }

    /// IDL spelling of `ty` for a field declared in `from`.
    fn type_ref(ctx: &GenContext<'_>, ty: &Type, from: &Namespace) -> String {
        match ty.base_type {
            BaseType::Vector => format!("[{}]", Self::type_ref(ctx, &ty.vector_type(), from)),
            BaseType::Array => format!(
                "[{}:{}]",
                Self::type_ref(ctx, &ty.vector_type(), from),
                ty.fixed_length
            ),
            BaseType::String => "string".to_string(),
            BaseType::Struct => {
                let target = ctx.struct_of(ty);
                Self::qualified(target, from)
            }
            BaseType::Union => {
                let target = ctx.enum_of(ty);
                Self::qualified(target, from)
            }
            _ if ty.is_enum() => {
                let target = ctx.enum_of(ty);
                Self::qualified(target, from)
            }
            base => base.idl_name().to_string(),
        }
    }

    /// Namespace of the definition emitted before the current one.
    fn previous_namespace(state: &FileState) -> Namespace {
        state
            .declared
            .last()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(namespace, _)| Namespace::from_dotted(namespace))
            .unwrap_or_default()
    }

    /// Writes a `namespace` statement when the current definition moves.
    fn gen_namespace(state: &FileState, code: &mut CodeWriter) {
        if Self::previous_namespace(state) == state.current_namespace {
            return;
        }
        if state.current_namespace.is_root() {
            code.line("namespace;");
        } else {
            code.line(&format!("namespace {};", state.current_namespace.join(".")));
        }
        code.blank();
    }

    /// Renders `(a, b: 1, c: "x")`, or nothing without entries.
    fn attribute_list(entries: Vec<String>) -> String {
        if entries.is_empty() {
            String::new()
        } else {
            format!(" ({})", entries.join(", "))
        }
    }

    /// Renders the free-form attributes not covered by `skip`.
    fn extra_attributes(attributes: &Attributes, skip: &[&str]) -> Vec<String> {
        attributes
            .iter()
            .filter(|(key, _)| !skip.contains(&key.as_str()))
            .map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else if value.parse::<f64>().is_ok() {
                    format!("{key}: {value}")
                } else {
                    format!("{key}: \"{value}\"")
                }
            })
            .collect()
    }

    /// IDL default of a field, when it differs from zero.
    fn default_value(ctx: &GenContext<'_>, field: &FieldDef) -> Option<String> {
        let ty = &field.value.ty;
        let constant = field.value.constant.as_str();
        if !ty.is_scalar() || constant.parse::<f64>().is_ok_and(|v| v == 0.0) {
            return None;
        }
        if ty.base_type == BaseType::Bool {
            return Some("true".to_string());
        }
        if ty.is_enum() {
            let enum_def = ctx.enum_of(ty);
            let value = constant.parse::<i64>().ok().or_else(|| {
                constant.parse::<u64>().ok().map(|v| v as i64)
            });
            if let Some(val) = value.and_then(|v| enum_def.reverse_lookup(v)) {
                return Some(val.name.clone());
            }
        }
        Some(constant.to_string())
    }

    fn gen_field(&self, ctx: &GenContext<'_>, owner: &StructDef, field: &FieldDef, code: &mut CodeWriter) {
        let mut declaration = format!(
            "{}:{}",
            field.name,
            Self::type_ref(ctx, &field.value.ty, &owner.namespace)
        );
        if let Some(default) = Self::default_value(ctx, field) {
            declaration.push_str(&format!(" = {default}"));
        }

        let mut attributes = Vec::new();
        if field.deprecated {
            attributes.push("deprecated".to_string());
        }
        if field.required {
            attributes.push("required".to_string());
        }
        if field.key {
            attributes.push("key".to_string());
        }
        if let Some(nested) = field.nested_flatbuffer {
            let target = ctx.schema.struct_def(nested);
            attributes.push(format!(
                "nested_flatbuffer: \"{}\"",
                Self::qualified(target, &owner.namespace)
            ));
        }
        attributes.extend(Self::extra_attributes(&field.attributes, &FLAG_ATTRIBUTES));

        doc_lines(code, "/// ", &field.doc_comment);
        code.line(&format!("{declaration}{};", Self::attribute_list(attributes)));
    }

    fn gen_object(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &FileState, code: &mut CodeWriter) {
        Self::gen_namespace(state, code);
        doc_lines(code, "/// ", &struct_def.doc_comment);
        let keyword = if struct_def.fixed { "struct" } else { "table" };
        let attributes = Self::extra_attributes(&struct_def.attributes, &[]);
        code.line(&format!(
            "{keyword} {}{} {{",
            struct_def.name,
            Self::attribute_list(attributes)
        ));
        code.indent();
        for field in struct_def.fields.iter().filter(|f| !f.is_union_discriminant()) {
            self.gen_field(ctx, struct_def, field, code);
        }
        code.dedent();
        code.line("}");
        code.blank();
    }

    fn gen_union(&self, ctx: &GenContext<'_>, enum_def: &EnumDef, code: &mut CodeWriter) {
        code.line(&format!("union {} {{", enum_def.name));
        code.indent();
        for val in enum_def.vals.iter().filter(|v| !v.is_zero()) {
            doc_lines(code, "/// ", &val.doc_comment);
            let member = match val.union_type.base_type {
                BaseType::Struct => {
                    let target = ctx.struct_of(&val.union_type);
                    if target.name == val.name && target.namespace == enum_def.namespace {
                        val.name.clone()
                    } else {
                        format!(
                            "{}: {}",
                            val.name,
                            Self::qualified(target, &enum_def.namespace)
                        )
                    }
                }
                _ => format!("{}: string", val.name),
            };
            code.line(&format!("{member},"));
        }
        code.dedent();
        code.line("}");
    }
}

impl LanguagePlugin for FbsGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Fbs
    }

    fn namer(&self) -> &Namer {
        &self.namer
    }

    fn indent(&self) -> &'static str {
        "  "
    }

    fn layout(&self, _options: &GeneratorOptions) -> OutputLayout {
        OutputLayout::OneFile
    }

    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        Self::type_ref(ctx, ty, &Namespace::root())
    }

    fn begin_file(&self, ctx: &GenContext<'_>, _state: &FileState, code: &mut CodeWriter) {
        code.line(&format!("// Generated from {}", ctx.schema.file_name));
        code.blank();
    }

    fn end_file(&self, ctx: &GenContext<'_>, _state: &FileState, code: &mut CodeWriter) {
        let mut trailer = Vec::new();
        if let Some(root) = ctx.schema.root_struct() {
            trailer.push(format!("root_type {};", root.fully_qualified_name()));
        }
        if let Some(identifier) = &ctx.schema.file_identifier {
            trailer.push(format!("file_identifier \"{identifier}\";"));
        }
        if let Some(extension) = &ctx.schema.file_extension {
            trailer.push(format!("file_extension \"{extension}\";"));
        }
        for line in &trailer {
            code.line(line);
        }
    }

    fn gen_enum(&self, ctx: &GenContext<'_>, enum_def: &EnumDef, state: &mut FileState, code: &mut CodeWriter) {
        Self::gen_namespace(state, code);
        doc_lines(code, "/// ", &enum_def.doc_comment);
        if enum_def.is_union {
            self.gen_union(ctx, enum_def, code);
            code.blank();
            return;
        }

        let attributes = Self::extra_attributes(&enum_def.attributes, &[]);
        code.line(&format!(
            "enum {} : {}{} {{",
            enum_def.name,
            enum_def.underlying_base().idl_name(),
            Self::attribute_list(attributes)
        ));
        code.indent();
        let bit_flags = enum_def.is_bit_flags();
        for val in &enum_def.vals {
            doc_lines(code, "/// ", &val.doc_comment);
            // Flags are declared by bit position, not mask.
            let value = if bit_flags {
                (val.value as u64).trailing_zeros().to_string()
            } else {
                enum_value_text(enum_def, val.value)
            };
            code.line(&format!("{} = {value},", val.name));
        }
        code.dedent();
        code.line("}");
        code.blank();
    }

    fn gen_struct(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        self.gen_object(ctx, struct_def, state, code);
    }

    fn gen_table(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        self.gen_object(ctx, struct_def, state, code);
    }
}
