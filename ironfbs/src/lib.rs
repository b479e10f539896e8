//! # IronFBS
//!
//! Code generation for FlatBuffers schemas.
//!
//! A schema is loaded from a JSON schema document into an immutable,
//! fully resolved graph of enums, unions, structs and tables. Language
//! plugins then walk that graph and emit accessor and builder code.
//!
//! ## Features
//!
//! - **Six targets** - Python, Go, C#, Lua, JSON Schema and normalized `.fbs`
//! - **Deterministic output** - identical schema and options give identical files
//! - **Pluggable sinks** - write to disk or keep the files in memory
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironfbs::prelude::*;
//!
//! let schema = parse_schema_file(Path::new("monster.json"))?;
//! let options = GeneratorOptions::default().object_api(true);
//! let result = generate(TargetLanguage::Go, &schema, &options, Path::new("out"))?;
//! println!("{} files, {} lines", result.files.len(), result.lines_generated);
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Schema graph, document loader and validation
//! - [`codegen`] - Generation engine and language plugins

pub mod prelude;

/// Schema graph, document loading and validation.
pub mod schema {
    pub use ironfbs_schema::*;
}

/// Code generation from resolved schemas.
pub mod codegen {
    pub use ironfbs_codegen::*;
}
