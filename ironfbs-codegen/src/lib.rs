//! # IronFBS Codegen
//!
//! Per-language code generation from resolved FlatBuffers schemas.
//!
//! This crate provides:
//! - A language-neutral engine walking the schema graph
//! - Language plugins for Python, Go, C#, Lua, JSON Schema and FlatBuffers IDL
//! - Naming, namespace tracking and builder plans shared by every plugin
//! - Output sinks for the file system and for memory

pub mod csharp;
pub mod error;
pub mod fbs;
pub mod generator;
pub mod go;
pub mod json_schema;
pub mod language;
pub mod lua;
pub mod namer;
pub mod namespace;
pub mod options;
pub mod plan;
pub mod python;
pub mod sink;
pub mod writer;

#[cfg(test)]
mod fixtures;

use std::path::Path;

use ironfbs_schema::Schema;

pub use csharp::CSharpGenerator;
pub use error::CodegenError;
pub use fbs::FbsGenerator;
pub use generator::{GenerationResult, Generator};
pub use go::GoGenerator;
pub use json_schema::JsonSchemaGenerator;
pub use language::{GeneratedFile, LanguagePlugin, OutputLayout, TargetLanguage};
pub use lua::LuaGenerator;
pub use namer::{Case, Namer, NamerConfig};
pub use options::GeneratorOptions;
pub use python::PythonGenerator;
pub use sink::{FileSink, FsSink, MemorySink};
pub use writer::CodeWriter;

/// Creates the plugin for `language`.
#[must_use]
pub fn create_plugin(language: TargetLanguage, options: &GeneratorOptions) -> Box<dyn LanguagePlugin> {
    match language {
        TargetLanguage::Python => Box::new(PythonGenerator::new(options)),
        TargetLanguage::Go => Box::new(GoGenerator::new(options)),
        TargetLanguage::CSharp => Box::new(CSharpGenerator::new(options)),
        TargetLanguage::Lua => Box::new(LuaGenerator::new(options)),
        TargetLanguage::JsonSchema => Box::new(JsonSchemaGenerator::new(options)),
        TargetLanguage::Fbs => Box::new(FbsGenerator::new(options)),
    }
}

/// Generates `language` sources for `schema` into any sink.
///
/// # Arguments
/// * `language` - Target language
/// * `schema` - Resolved schema
/// * `options` - Generator options
/// * `output` - Output directory prefix for every file
/// * `sink` - Destination of the files
///
/// # Returns
/// The written paths and line count.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a write fails.
pub fn generate_with_sink(
    language: TargetLanguage,
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
    sink: &mut dyn FileSink,
) -> Result<GenerationResult, CodegenError> {
    let plugin = create_plugin(language, options);
    Generator::new(schema, options, plugin.as_ref()).generate(output, sink)
}

/// Generates `language` sources for `schema` below the `output` directory.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate(
    language: TargetLanguage,
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate_with_sink(language, schema, options, output, &mut FsSink)
}

/// Parses a JSON schema document file and generates `language` sources from it.
///
/// # Errors
/// Returns `CodegenError` if reading, resolving or generation fails.
pub fn generate_from_file(
    language: TargetLanguage,
    schema_path: &Path,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    let schema = ironfbs_schema::parse_schema_file(schema_path)?;
    generate(language, &schema, options, output)
}

/// Generates Python modules.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_python(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::Python, schema, options, output)
}

/// Generates Go packages.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_go(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::Go, schema, options, output)
}

/// Generates C# sources.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_csharp(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::CSharp, schema, options, output)
}

/// Generates Lua modules.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_lua(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::Lua, schema, options, output)
}

/// Generates a JSON Schema document.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_json_schema(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::JsonSchema, schema, options, output)
}

/// Re-emits the schema as FlatBuffers IDL.
///
/// # Errors
/// Returns `CodegenError` if the schema is invalid or a file cannot be written.
pub fn generate_fbs(
    schema: &Schema,
    options: &GeneratorOptions,
    output: &Path,
) -> Result<GenerationResult, CodegenError> {
    generate(TargetLanguage::Fbs, schema, options, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_plugin_per_language() {
        let options = GeneratorOptions::default();
        for language in TargetLanguage::ALL {
            assert_eq!(create_plugin(language, &options).language(), language);
        }
    }

    #[test]
    fn test_generate_writes_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let schema = fixtures::monster();
        let result = generate_go(&schema, &GeneratorOptions::default(), dir.path())
            .expect("Failed to generate");
        assert!(!result.files.is_empty());
        for path in &result.files {
            assert!(path.starts_with(dir.path()));
            assert!(path.exists(), "{} was not written", path.display());
        }
        let written: usize = result
            .files
            .iter()
            .map(|p| std::fs::read_to_string(p).expect("Failed to read").lines().count())
            .sum();
        assert_eq!(written, result.lines_generated);
    }

    #[test]
    fn test_generate_with_sink_is_deterministic() {
        let schema = fixtures::monster();
        let options = GeneratorOptions::default().object_api(true);
        for language in TargetLanguage::ALL {
            let mut first = MemorySink::new();
            let mut second = MemorySink::new();
            let a = generate_with_sink(language, &schema, &options, Path::new("out"), &mut first)
                .expect("Failed to generate");
            let b = generate_with_sink(language, &schema, &options, Path::new("out"), &mut second)
                .expect("Failed to generate");
            assert_eq!(a, b);
            assert_eq!(
                first.iter().collect::<Vec<_>>(),
                second.iter().collect::<Vec<_>>(),
                "{language} output differs between runs"
            );
        }
    }

    #[test]
    fn test_generate_from_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let schema_path = dir.path().join("monster_test.json");
        std::fs::write(&schema_path, fixtures::MONSTER).expect("Failed to write schema");
        let result = generate_from_file(
            TargetLanguage::Fbs,
            &schema_path,
            &GeneratorOptions::default(),
            &dir.path().join("out"),
        )
        .expect("Failed to generate");
        assert_eq!(result.files, vec![dir.path().join("out/monster_test_generated.fbs")]);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").expect("Failed to write blocker");
        let schema = fixtures::monster();
        let err = generate_lua(&schema, &GeneratorOptions::default(), &blocker)
            .expect_err("writing below a file must fail");
        assert!(matches!(err, CodegenError::Io { .. }));
    }
}
