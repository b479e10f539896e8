//! The capability set a target language provides to the generation engine.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ironfbs_schema::{Definition, EnumDef, Namespace, Schema, StructDef, Type};

use crate::error::CodegenError;
use crate::namer::Namer;
use crate::namespace::NamespaceTransition;
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

/// Languages with a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    /// Python modules.
    Python,
    /// Go packages.
    Go,
    /// C# namespaces.
    CSharp,
    /// Lua modules.
    Lua,
    /// A JSON Schema document.
    JsonSchema,
    /// Normalized schema IDL.
    Fbs,
}

impl TargetLanguage {
    /// Every supported language.
    pub const ALL: [TargetLanguage; 6] = [
        Self::Python,
        Self::Go,
        Self::CSharp,
        Self::Lua,
        Self::JsonSchema,
        Self::Fbs,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Go => "go",
            Self::CSharp => "csharp",
            Self::Lua => "lua",
            Self::JsonSchema => "jsonschema",
            Self::Fbs => "fbs",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetLanguage {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "go" | "golang" => Ok(Self::Go),
            "csharp" | "cs" | "c#" => Ok(Self::CSharp),
            "lua" => Ok(Self::Lua),
            "jsonschema" | "json-schema" | "json_schema" => Ok(Self::JsonSchema),
            "fbs" | "idl" => Ok(Self::Fbs),
            _ => Err(CodegenError::UnknownLanguage {
                name: s.to_string(),
            }),
        }
    }
}

/// Read-only inputs of one generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenContext<'a> {
    /// Resolved schema.
    pub schema: &'a Schema,
    /// Generator options.
    pub options: &'a GeneratorOptions,
}

impl<'a> GenContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(schema: &'a Schema, options: &'a GeneratorOptions) -> Self {
        Self { schema, options }
    }

    /// Returns the enum referenced by `ty`.
    ///
    /// # Panics
    /// Panics if the type carries no enum, which validation rules out.
    #[must_use]
    pub fn enum_of(&self, ty: &Type) -> &'a EnumDef {
        match self.schema.enum_of(ty) {
            Some(enum_def) => enum_def,
            None => unreachable!("type {} has no enum definition", ty.base_type),
        }
    }

    /// Returns the struct referenced by `ty`.
    ///
    /// # Panics
    /// Panics if the type carries no struct, which validation rules out.
    #[must_use]
    pub fn struct_of(&self, ty: &Type) -> &'a StructDef {
        match self.schema.struct_of(ty) {
            Some(struct_def) => struct_def,
            None => unreachable!("type {} has no struct definition", ty.base_type),
        }
    }
}

/// A definition visited by the engine.
#[derive(Debug, Clone, Copy)]
pub enum DefinitionRef<'a> {
    /// Enum or union.
    Enum(&'a EnumDef),
    /// Fixed struct or table.
    Struct(&'a StructDef),
}

impl<'a> DefinitionRef<'a> {
    /// Returns the definition as a trait object.
    #[must_use]
    pub fn as_definition(&self) -> &'a dyn Definition {
        match *self {
            Self::Enum(e) => e,
            Self::Struct(s) => s,
        }
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Enum(e) => &e.name,
            Self::Struct(s) => &s.name,
        }
    }

    /// Owning namespace.
    #[must_use]
    pub fn namespace(&self) -> &'a Namespace {
        match *self {
            Self::Enum(e) => &e.namespace,
            Self::Struct(s) => &s.namespace,
        }
    }
}

/// Per-file state threaded through the emitters of one output file.
#[derive(Debug, Clone, Default)]
pub struct FileState {
    /// Namespace the file belongs to; root for single-file output.
    pub namespace: Namespace,
    /// Namespace of the definition being emitted.
    pub current_namespace: Namespace,
    /// Import or require lines collected while emitting the body.
    pub imports: BTreeSet<String>,
    /// Definitions emitted so far.
    pub emitted: usize,
    /// Fully qualified names of the definitions emitted so far.
    pub declared: Vec<String>,
}

impl FileState {
    /// Creates the state of a file placed in `namespace`.
    #[must_use]
    pub fn new(namespace: Namespace) -> Self {
        Self {
            current_namespace: namespace.clone(),
            namespace,
            ..Self::default()
        }
    }

    /// Records an import line.
    pub fn import(&mut self, line: impl Into<String>) {
        self.imports.insert(line.into());
    }
}

/// How definitions are distributed over output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// Everything in `<schema><suffix><ext>`.
    OneFile,
    /// One file per definition under namespace directories.
    PerDefinition,
    /// One file per namespace named after the dotted namespace.
    PerNamespace,
}

/// One rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

impl GeneratedFile {
    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.contents.lines().count()
    }
}

/// Language-specific part of code generation.
///
/// The engine walks every enum and then every struct, tracks namespaces
/// and distributes output over files; a plugin only renders declarations.
pub trait LanguagePlugin {
    /// Language implemented.
    fn language(&self) -> TargetLanguage;

    /// Identifier rules of the language.
    fn namer(&self) -> &Namer;

    /// Indentation unit.
    fn indent(&self) -> &'static str {
        "    "
    }

    /// File distribution for the given options.
    fn layout(&self, options: &GeneratorOptions) -> OutputLayout {
        if options.one_file {
            OutputLayout::OneFile
        } else {
            OutputLayout::PerDefinition
        }
    }

    /// Spelling of `ty` in the language.
    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String;

    /// Writes the file header. Called after the body, so imports are known.
    fn begin_file(&self, ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter);

    /// Writes the file footer.
    fn end_file(&self, _ctx: &GenContext<'_>, _state: &FileState, _code: &mut CodeWriter) {}

    /// Opens one namespace component.
    fn open_namespace(&self, _ctx: &GenContext<'_>, _component: &str, _code: &mut CodeWriter) {}

    /// Closes one namespace component.
    fn close_namespace(&self, _ctx: &GenContext<'_>, _component: &str, _code: &mut CodeWriter) {}

    /// Emits the statements for a namespace change.
    fn namespace_transition(
        &self,
        ctx: &GenContext<'_>,
        transition: &NamespaceTransition,
        code: &mut CodeWriter,
    ) {
        for component in transition.closing() {
            self.close_namespace(ctx, component, code);
        }
        for component in transition.opening() {
            self.open_namespace(ctx, component, code);
        }
    }

    /// Emits an enum or union.
    fn gen_enum(
        &self,
        ctx: &GenContext<'_>,
        enum_def: &EnumDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    );

    /// Emits a fixed struct.
    fn gen_struct(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    );

    /// Emits a table.
    fn gen_table(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    );

    /// Auxiliary files derived from the rendered ones.
    fn extra_files(&self, _ctx: &GenContext<'_>, _files: &[GeneratedFile]) -> Vec<GeneratedFile> {
        Vec::new()
    }

    /// Path of the single output file.
    fn one_file_name(&self, ctx: &GenContext<'_>) -> PathBuf {
        PathBuf::from(format!(
            "{}{}{}",
            ctx.schema.file_name,
            ctx.options.filename_suffix,
            self.namer().config().filename_extension
        ))
    }

    /// Path of the file holding one definition.
    fn definition_file_name(&self, _ctx: &GenContext<'_>, definition: DefinitionRef<'_>) -> PathBuf {
        let namer = self.namer();
        namer
            .directories(definition.namespace())
            .join(namer.file(definition.name()))
    }

    /// Path of the file holding one namespace.
    fn namespace_file_name(&self, ctx: &GenContext<'_>, namespace: &Namespace) -> PathBuf {
        let stem = if namespace.is_root() {
            ctx.schema.file_name.clone()
        } else {
            namespace.join(".")
        };
        PathBuf::from(format!("{stem}{}", self.namer().config().filename_extension))
    }
}

/// Decimal text of an enum member value in the enum's underlying type.
///
/// Values are stored as `i64`; `ulong` enums reinterpret the bits.
#[must_use]
pub fn enum_value_text(enum_def: &EnumDef, value: i64) -> String {
    if enum_def.underlying_base() == ironfbs_schema::BaseType::ULong {
        (value as u64).to_string()
    } else {
        value.to_string()
    }
}

/// Renders a documentation block for a definition or field.
pub fn doc_lines(code: &mut CodeWriter, prefix: &str, doc: &[String]) {
    if !doc.is_empty() {
        code.doc_comment(prefix, doc);
    }
}
