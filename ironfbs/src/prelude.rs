//! Prelude module for convenient imports.
//!
//! ```ignore
//! use ironfbs::prelude::*;
//! ```

// Schema types
pub use ironfbs_schema::{
    BaseType, Definition, EnumDef, FieldDef, Namespace, Schema, SchemaError, StructDef, Type,
    parse_schema, parse_schema_file, validate_schema,
};

// Generation
pub use ironfbs_codegen::{
    CodegenError, FileSink, FsSink, GenerationResult, Generator, GeneratorOptions,
    LanguagePlugin, MemorySink, TargetLanguage, create_plugin, generate, generate_csharp,
    generate_fbs, generate_go, generate_json_schema, generate_lua, generate_python,
    generate_with_sink,
};
