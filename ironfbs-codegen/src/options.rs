//! Generator configuration.

use serde::{Deserialize, Serialize};

/// Options shared by all language generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Emit a single combined file instead of one per definition.
    pub one_file: bool,
    /// Emit the native object API with pack/unpack.
    pub generate_object_based_api: bool,
    /// Emit in-place mutators.
    pub mutable_buffer: bool,
    /// Emit imports for every referenced definition.
    pub include_dependence_headers: bool,
    /// Emit fully-qualified name strings.
    pub generate_name_strings: bool,
    /// Prefix of object-API type names.
    pub object_prefix: String,
    /// Suffix of object-API type names.
    pub object_suffix: String,
    /// Suffix of single-file output names.
    pub filename_suffix: String,
    /// Override of the language's file extension (without the dot).
    pub filename_extension: Option<String>,
    /// Override of the Go package name.
    pub go_namespace: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            one_file: false,
            generate_object_based_api: false,
            mutable_buffer: false,
            include_dependence_headers: true,
            generate_name_strings: false,
            object_prefix: String::new(),
            object_suffix: "T".to_string(),
            filename_suffix: "_generated".to_string(),
            filename_extension: None,
            go_namespace: None,
        }
    }
}

impl GeneratorOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets single-file output.
    #[must_use]
    pub fn one_file(mut self, enabled: bool) -> Self {
        self.one_file = enabled;
        self
    }

    /// Enables or disables the object API.
    #[must_use]
    pub fn object_api(mut self, enabled: bool) -> Self {
        self.generate_object_based_api = enabled;
        self
    }

    /// Enables or disables mutators.
    #[must_use]
    pub fn mutable_buffer(mut self, enabled: bool) -> Self {
        self.mutable_buffer = enabled;
        self
    }

    /// Enables or disables name strings.
    #[must_use]
    pub fn name_strings(mut self, enabled: bool) -> Self {
        self.generate_name_strings = enabled;
        self
    }

    /// Sets the object-API name affixes.
    #[must_use]
    pub fn object_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.object_prefix = prefix.into();
        self.object_suffix = suffix.into();
        self
    }

    /// Sets the single-file name suffix.
    #[must_use]
    pub fn filename_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.filename_suffix = suffix.into();
        self
    }

    /// Overrides the file extension.
    #[must_use]
    pub fn filename_extension(mut self, extension: impl Into<String>) -> Self {
        self.filename_extension = Some(extension.into());
        self
    }

    /// Overrides the Go package name.
    #[must_use]
    pub fn go_namespace(mut self, package: impl Into<String>) -> Self {
        self.go_namespace = Some(package.into());
        self
    }

    /// Returns the file extension to use, given the language default.
    #[must_use]
    pub fn extension_or(&self, default: &str) -> String {
        match &self.filename_extension {
            Some(ext) => format!(".{}", ext.trim_start_matches('.')),
            None => default.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GeneratorOptions::default();
        assert!(!options.one_file);
        assert_eq!(options.object_suffix, "T");
        assert_eq!(options.filename_suffix, "_generated");
        assert_eq!(options.extension_or(".py"), ".py");
    }

    #[test]
    fn test_builder() {
        let options = GeneratorOptions::new()
            .one_file(true)
            .object_api(true)
            .filename_extension("pyi");
        assert!(options.one_file);
        assert!(options.generate_object_based_api);
        assert_eq!(options.extension_or(".py"), ".pyi");
    }

    #[test]
    fn test_deserialize_partial() {
        let options: GeneratorOptions =
            serde_json::from_str(r#"{ "mutable_buffer": true, "object_suffix": "Native" }"#)
                .expect("Failed to parse");
        assert!(options.mutable_buffer);
        assert_eq!(options.object_suffix, "Native");
        assert_eq!(options.filename_suffix, "_generated");
    }
}
