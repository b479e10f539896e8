//! Indented text accumulator with named-value substitution.
//!
//! Every appended line is scanned for `{{KEY}}` placeholders, which are
//! replaced by values registered with [`CodeWriter::set_value`]. A line that
//! ends in a backslash is continued by the next append instead of being
//! terminated.

use std::collections::BTreeMap;
use std::fmt;

/// Append-only code buffer.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    buffer: String,
    values: BTreeMap<String, String>,
    indent_unit: String,
    level: usize,
    continuation: bool,
}

impl CodeWriter {
    /// Creates an empty writer that indents with `indent_unit` per level.
    #[must_use]
    pub fn new(indent_unit: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            values: BTreeMap::new(),
            indent_unit: indent_unit.into(),
            level: 0,
            continuation: false,
        }
    }

    /// Registers a substitution for `{{key}}`.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the registered value of `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Appends one or more lines at the current indentation.
    pub fn line(&mut self, text: &str) {
        for raw in text.split('\n') {
            let expanded = self.substitute(raw);
            if expanded.is_empty() && !self.continuation {
                self.buffer.push('\n');
                continue;
            }
            if !self.continuation {
                for _ in 0..self.level {
                    self.buffer.push_str(&self.indent_unit);
                }
            }
            match expanded.strip_suffix('\\') {
                Some(head) => {
                    self.buffer.push_str(head);
                    self.continuation = true;
                }
                None => {
                    self.buffer.push_str(&expanded);
                    self.buffer.push('\n');
                    self.continuation = false;
                }
            }
        }
    }

    /// Appends an empty line.
    pub fn blank(&mut self) {
        self.line("");
    }

    /// Appends documentation lines, each prefixed by `prefix`.
    pub fn doc_comment(&mut self, prefix: &str, lines: &[String]) {
        for doc in lines {
            let doc = doc.trim_end();
            if doc.is_empty() {
                self.line(prefix.trim_end());
            } else {
                self.line(&format!("{prefix}{doc}"));
            }
        }
    }

    /// Appends text verbatim, bypassing indentation and substitution.
    pub fn append_raw(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.continuation = false;
    }

    /// Increases the indentation level.
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decreases the indentation level.
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Returns the current indentation level.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consumes the writer and returns the accumulated text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match self.values.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for CodeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut code = CodeWriter::new("  ");
        code.line("a {");
        code.indent();
        code.line("b;");
        code.dedent();
        code.line("}");
        assert_eq!(code.as_str(), "a {\n  b;\n}\n");
    }

    #[test]
    fn test_substitution() {
        let mut code = CodeWriter::new("    ");
        code.set_value("NAME", "Monster");
        code.line("class {{NAME}}(object):");
        code.line("{{UNKNOWN}} stays");
        assert_eq!(code.as_str(), "class Monster(object):\n{{UNKNOWN}} stays\n");
        assert_eq!(code.value("NAME"), Some("Monster"));
    }

    #[test]
    fn test_continuation() {
        let mut code = CodeWriter::new("\t");
        code.indent();
        code.line("x := \\");
        code.line("1 + \\");
        code.line("2");
        assert_eq!(code.as_str(), "\tx := 1 + 2\n");
    }

    #[test]
    fn test_blank_lines_have_no_indent() {
        let mut code = CodeWriter::new("    ");
        code.indent();
        code.line("a\n\nb");
        code.blank();
        assert_eq!(code.as_str(), "    a\n\n    b\n\n");
    }

    #[test]
    fn test_doc_comment() {
        let mut code = CodeWriter::new("    ");
        code.doc_comment("/// ", &["first".to_string(), String::new()]);
        assert_eq!(code.as_str(), "/// first\n///\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut code = CodeWriter::new("  ");
        code.dedent();
        assert_eq!(code.level(), 0);
        code.line("x");
        assert_eq!(code.to_string(), "x\n");
    }
}
