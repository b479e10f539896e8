//! Generic code generation engine.
//!
//! Walks all enums and then all structs of a schema in declaration order,
//! skipping definitions already generated by an including schema. Output is
//! grouped into files according to the plugin's [`OutputLayout`], namespace
//! changes inside a file are driven by a [`NamespaceTracker`], and finished
//! files are handed to a [`FileSink`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ironfbs_schema::{Definition, Namespace, Schema, validate_schema};

use crate::error::CodegenError;
use crate::language::{
    DefinitionRef, FileState, GenContext, GeneratedFile, LanguagePlugin, OutputLayout,
};
use crate::namespace::{NamespaceTracker, NamespaceTransition};
use crate::options::GeneratorOptions;
use crate::sink::FileSink;
use crate::writer::CodeWriter;

/// Summary of a completed generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    /// Written paths, in write order.
    pub files: Vec<PathBuf>,
    /// Total number of lines written.
    pub lines_generated: usize,
}

/// Drives one [`LanguagePlugin`] over a schema.
pub struct Generator<'a> {
    ctx: GenContext<'a>,
    plugin: &'a dyn LanguagePlugin,
}

impl<'a> Generator<'a> {
    /// Creates a generator.
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        options: &'a GeneratorOptions,
        plugin: &'a dyn LanguagePlugin,
    ) -> Self {
        Self {
            ctx: GenContext::new(schema, options),
            plugin,
        }
    }

    /// Returns the generation context.
    #[must_use]
    pub fn context(&self) -> &GenContext<'a> {
        &self.ctx
    }

    /// Definitions to emit: enums first, then structs, minus generated ones.
    #[must_use]
    pub fn definitions(&self) -> Vec<DefinitionRef<'a>> {
        let schema = self.ctx.schema;
        schema
            .enums
            .iter()
            .filter(|e| !e.is_generated())
            .map(DefinitionRef::Enum)
            .chain(
                schema
                    .structs
                    .iter()
                    .filter(|s| !s.is_generated())
                    .map(DefinitionRef::Struct),
            )
            .collect()
    }

    /// Renders every output file in memory.
    ///
    /// # Returns
    /// The files, relative to the output directory.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` if the schema fails validation.
    pub fn render(&self) -> Result<Vec<GeneratedFile>, CodegenError> {
        validate_schema(self.ctx.schema)?;

        let mut files: Vec<GeneratedFile> = self
            .group_files()
            .into_iter()
            .map(|group| self.render_file(group))
            .collect();
        let extra = self.plugin.extra_files(&self.ctx, &files);
        files.extend(extra);
        Ok(files)
    }

    /// Renders and writes every output file below `output`.
    ///
    /// Writing stops at the first failure; files already written are kept.
    ///
    /// # Arguments
    /// * `output` - Output directory
    /// * `sink` - Destination of the files
    ///
    /// # Returns
    /// The written paths and line count.
    ///
    /// # Errors
    /// Returns `CodegenError` if validation or a write fails.
    pub fn generate(
        &self,
        output: &Path,
        sink: &mut dyn FileSink,
    ) -> Result<GenerationResult, CodegenError> {
        let language = self.plugin.language();
        let mut result = GenerationResult::default();
        for file in self.render()? {
            let path = output.join(&file.path);
            let lines = file.line_count();
            tracing::debug!("Writing {} ({} lines)", path.display(), lines);
            sink.save_file(&path, &file.contents).inspect_err(|e| {
                tracing::warn!("{} generation aborted: {}", language, e);
            })?;
            result.files.push(path);
            result.lines_generated += lines;
        }
        tracing::info!(
            "Generated {} file(s), {} line(s) of {}",
            result.files.len(),
            result.lines_generated,
            language
        );
        Ok(result)
    }

    fn group_files(&self) -> Vec<FileGroup<'a>> {
        let definitions = self.definitions();
        match self.plugin.layout(self.ctx.options) {
            OutputLayout::OneFile => vec![FileGroup {
                path: self.plugin.one_file_name(&self.ctx),
                namespace: Namespace::root(),
                definitions,
            }],
            OutputLayout::PerDefinition => definitions
                .into_iter()
                .map(|definition| FileGroup {
                    path: self.plugin.definition_file_name(&self.ctx, definition),
                    namespace: definition.namespace().clone(),
                    definitions: vec![definition],
                })
                .collect(),
            OutputLayout::PerNamespace => {
                let mut groups: Vec<FileGroup<'a>> = Vec::new();
                for definition in definitions {
                    match groups
                        .iter_mut()
                        .find(|g| &g.namespace == definition.namespace())
                    {
                        Some(group) => group.definitions.push(definition),
                        None => groups.push(FileGroup {
                            path: self
                                .plugin
                                .namespace_file_name(&self.ctx, definition.namespace()),
                            namespace: definition.namespace().clone(),
                            definitions: vec![definition],
                        }),
                    }
                }
                groups
            }
        }
    }

    fn render_file(&self, group: FileGroup<'a>) -> GeneratedFile {
        let plugin = self.plugin;
        let mut body = CodeWriter::new(plugin.indent());
        let mut state = FileState::new(group.namespace);
        let mut tracker = NamespaceTracker::new();
        let mut left: HashSet<Namespace> = HashSet::new();

        for definition in &group.definitions {
            tracing::debug!(
                "Generating {} {}",
                plugin.language(),
                definition.as_definition().fully_qualified_name()
            );
            let transition = tracker.transition_to(definition.namespace());
            if !transition.is_noop() {
                if left.contains(&transition.to) {
                    tracing::warn!(
                        "Namespace '{}' reopened in {}; definitions are not grouped by namespace",
                        transition.to,
                        group.path.display()
                    );
                }
                left.insert(transition.from.clone());
                self.apply(&transition, &mut body);
            }
            state.current_namespace = definition.namespace().clone();

            match *definition {
                DefinitionRef::Enum(enum_def) => {
                    plugin.gen_enum(&self.ctx, enum_def, &mut state, &mut body);
                }
                DefinitionRef::Struct(struct_def) if struct_def.fixed => {
                    plugin.gen_struct(&self.ctx, struct_def, &mut state, &mut body);
                }
                DefinitionRef::Struct(struct_def) => {
                    plugin.gen_table(&self.ctx, struct_def, &mut state, &mut body);
                }
            }
            state.emitted += 1;
            state
                .declared
                .push(definition.as_definition().fully_qualified_name());
        }
        let closing = tracker.finish();
        if !closing.is_noop() {
            self.apply(&closing, &mut body);
        }

        let mut code = CodeWriter::new(plugin.indent());
        plugin.begin_file(&self.ctx, &state, &mut code);
        code.append_raw(body.as_str());
        plugin.end_file(&self.ctx, &state, &mut code);

        let file = GeneratedFile {
            path: group.path,
            contents: code.into_string(),
        };
        tracing::debug!(
            "Rendered {} ({} lines)",
            file.path.display(),
            file.line_count()
        );
        file
    }

    fn apply(&self, transition: &NamespaceTransition, code: &mut CodeWriter) {
        self.plugin.namespace_transition(&self.ctx, transition, code);
    }
}

struct FileGroup<'a> {
    path: PathBuf,
    namespace: Namespace,
    definitions: Vec<DefinitionRef<'a>>,
}
