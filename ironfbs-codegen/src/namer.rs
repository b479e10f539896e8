//! Identifier case conversion and keyword escaping.

use std::collections::HashSet;
use std::path::PathBuf;

use ironfbs_schema::Namespace;

/// Case policy applied to an identifier written in `snake_case` or `CamelCase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// Leave the identifier untouched.
    Keep,
    /// `UpperCamel`
    UpperCamel,
    /// `lowerCamel`
    LowerCamel,
    /// `snake_case`
    Snake,
    /// `SCREAMING_SNAKE`
    ScreamingSnake,
    /// `alllower`
    AllLower,
    /// `ALLUPPER`
    AllUpper,
}

/// Converts `input` to the requested case using ASCII rules only.
#[must_use]
pub fn convert_case(input: &str, case: Case) -> String {
    match case {
        Case::Keep => input.to_string(),
        Case::UpperCamel => to_camel(input, true),
        Case::LowerCamel => to_camel(input, false),
        Case::Snake => to_snake(input),
        Case::ScreamingSnake => to_snake(input).to_ascii_uppercase(),
        Case::AllLower => input.to_ascii_lowercase(),
        Case::AllUpper => input.to_ascii_uppercase(),
    }
}

fn to_camel(input: &str, first_upper: bool) -> String {
    let mut result = String::with_capacity(input.len());
    let mut capitalize_next = false;
    let last = input.len().saturating_sub(1);

    for (i, c) in input.char_indices() {
        if i == 0 {
            result.push(if first_upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            });
        } else if c == '_' && i != last {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

fn to_snake(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut result = String::with_capacity(input.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
                let boundary = prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_lower);
                if boundary && prev != '_' {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Whether keywords are escaped on the raw name or on the converted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOrder {
    /// Escape the schema name, then convert its case.
    BeforeConvertingCase,
    /// Convert the case, then escape the result.
    AfterConvertingCase,
}

/// Per-language naming rules.
#[derive(Debug, Clone)]
pub struct NamerConfig {
    /// Case of type names.
    pub types: Case,
    /// Case of constants.
    pub constants: Case,
    /// Case of methods.
    pub methods: Case,
    /// Case of free functions.
    pub functions: Case,
    /// Case of object fields.
    pub fields: Case,
    /// Case of local variables and parameters.
    pub variables: Case,
    /// Case of enum variants.
    pub variants: Case,
    /// Separator between an enum name and a variant name.
    pub enum_variant_separator: String,
    /// Case of namespace components.
    pub namespaces: Case,
    /// Separator between namespace components in qualified names.
    pub namespace_separator: String,
    /// Prefix of object-API type names.
    pub object_prefix: String,
    /// Suffix of object-API type names.
    pub object_suffix: String,
    /// Prefix added to escaped keywords.
    pub keyword_prefix: String,
    /// Suffix added to escaped keywords.
    pub keyword_suffix: String,
    /// When keywords are escaped.
    pub escape_order: EscapeOrder,
    /// Case of file names.
    pub filenames: Case,
    /// Case of directory names.
    pub directories: Case,
    /// Suffix appended to file names.
    pub filename_suffix: String,
    /// File extension including the dot.
    pub filename_extension: String,
}

/// Applies a [`NamerConfig`] and a reserved-word set to schema identifiers.
#[derive(Debug, Clone)]
pub struct Namer {
    config: NamerConfig,
    keywords: HashSet<&'static str>,
}

impl Namer {
    /// Creates a namer.
    #[must_use]
    pub fn new(config: NamerConfig, keywords: &[&'static str]) -> Self {
        Self {
            config,
            keywords: keywords.iter().copied().collect(),
        }
    }

    /// Returns the naming rules.
    #[must_use]
    pub fn config(&self) -> &NamerConfig {
        &self.config
    }

    /// Returns true if `name` is reserved in the target language.
    #[must_use]
    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    /// Returns `name`, or an escaped variant when it is reserved.
    #[must_use]
    pub fn escape_keyword(&self, name: &str) -> String {
        if self.is_keyword(name) {
            format!(
                "{}{}{}",
                self.config.keyword_prefix, name, self.config.keyword_suffix
            )
        } else {
            name.to_string()
        }
    }

    /// Converts and escapes `name` according to the configured order.
    #[must_use]
    pub fn format(&self, name: &str, case: Case) -> String {
        match self.config.escape_order {
            EscapeOrder::BeforeConvertingCase => convert_case(&self.escape_keyword(name), case),
            EscapeOrder::AfterConvertingCase => self.escape_keyword(&convert_case(name, case)),
        }
    }

    /// Name of a type.
    #[must_use]
    pub fn type_name(&self, name: &str) -> String {
        self.format(name, self.config.types)
    }

    /// Name of the object-API type of a definition.
    #[must_use]
    pub fn object_type(&self, name: &str) -> String {
        format!(
            "{}{}{}",
            self.config.object_prefix,
            convert_case(name, self.config.types),
            self.config.object_suffix
        )
    }

    /// Name of a method.
    #[must_use]
    pub fn method(&self, name: &str) -> String {
        self.format(name, self.config.methods)
    }

    /// Name of a free function.
    #[must_use]
    pub fn function(&self, name: &str) -> String {
        self.format(name, self.config.functions)
    }

    /// Name of an object field.
    #[must_use]
    pub fn field(&self, name: &str) -> String {
        self.format(name, self.config.fields)
    }

    /// Name of a local variable or parameter.
    #[must_use]
    pub fn variable(&self, name: &str) -> String {
        self.format(name, self.config.variables)
    }

    /// Name of a constant.
    #[must_use]
    pub fn constant(&self, name: &str) -> String {
        self.format(name, self.config.constants)
    }

    /// Name of an enum variant on its own.
    #[must_use]
    pub fn variant(&self, name: &str) -> String {
        self.format(name, self.config.variants)
    }

    /// Name of an enum variant qualified by its enum.
    #[must_use]
    pub fn enum_variant(&self, enum_name: &str, variant: &str) -> String {
        format!(
            "{}{}{}",
            self.type_name(enum_name),
            self.config.enum_variant_separator,
            self.variant(variant)
        )
    }

    /// Name of one namespace component.
    #[must_use]
    pub fn namespace_component(&self, component: &str) -> String {
        self.format(component, self.config.namespaces)
    }

    /// A whole namespace joined with the namespace separator.
    #[must_use]
    pub fn namespace(&self, namespace: &Namespace) -> String {
        namespace
            .components
            .iter()
            .map(|c| self.namespace_component(c))
            .collect::<Vec<_>>()
            .join(&self.config.namespace_separator)
    }

    /// A type name qualified by its namespace.
    #[must_use]
    pub fn namespaced_type(&self, namespace: &Namespace, name: &str) -> String {
        if namespace.is_root() {
            self.type_name(name)
        } else {
            format!(
                "{}{}{}",
                self.namespace(namespace),
                self.config.namespace_separator,
                self.type_name(name)
            )
        }
    }

    /// Relative directory holding the files of a namespace.
    #[must_use]
    pub fn directories(&self, namespace: &Namespace) -> PathBuf {
        namespace
            .components
            .iter()
            .map(|c| convert_case(c, self.config.directories))
            .collect()
    }

    /// File name for a definition.
    #[must_use]
    pub fn file(&self, name: &str) -> String {
        format!(
            "{}{}{}",
            convert_case(name, self.config.filenames),
            self.config.filename_suffix,
            self.config.filename_extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NamerConfig {
        NamerConfig {
            types: Case::UpperCamel,
            constants: Case::ScreamingSnake,
            methods: Case::UpperCamel,
            functions: Case::UpperCamel,
            fields: Case::LowerCamel,
            variables: Case::LowerCamel,
            variants: Case::Keep,
            enum_variant_separator: String::new(),
            namespaces: Case::Keep,
            namespace_separator: "__".to_string(),
            object_prefix: String::new(),
            object_suffix: "T".to_string(),
            keyword_prefix: String::new(),
            keyword_suffix: "_".to_string(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: ".go".to_string(),
        }
    }

    #[test]
    fn test_convert_case() {
        assert_eq!(convert_case("test_nested_flatbuffer", Case::UpperCamel), "TestNestedFlatbuffer");
        assert_eq!(convert_case("test_nested_flatbuffer", Case::LowerCamel), "testNestedFlatbuffer");
        assert_eq!(convert_case("Monster", Case::LowerCamel), "monster");
        assert_eq!(convert_case("hp", Case::UpperCamel), "Hp");
        assert_eq!(convert_case("name_", Case::UpperCamel), "Name_");
        assert_eq!(convert_case("clOrdId", Case::Snake), "cl_ord_id");
        assert_eq!(convert_case("MDEntryPx", Case::Snake), "md_entry_px");
        assert_eq!(convert_case("already_snake", Case::Snake), "already_snake");
        assert_eq!(convert_case("testArray", Case::ScreamingSnake), "TEST_ARRAY");
        assert_eq!(convert_case("Vec3", Case::Snake), "vec3");
        assert_eq!(convert_case("MyGame", Case::AllLower), "mygame");
    }

    #[test]
    fn test_escape_keyword() {
        let namer = Namer::new(config(), &["type", "func"]);
        assert_eq!(namer.escape_keyword("type"), "type_");
        assert_eq!(namer.escape_keyword("types"), "types");
        assert_eq!(namer.variable("type"), "type_");
        assert_eq!(namer.method("type"), "Type");
    }

    #[test]
    fn test_escape_is_stable() {
        let namer = Namer::new(config(), &["type", "func"]);
        for keyword in ["type", "func"] {
            let once = namer.escape_keyword(keyword);
            assert_ne!(once, keyword);
            assert_eq!(namer.escape_keyword(&once), once);
        }
    }

    #[test]
    fn test_qualified_names() {
        let namer = Namer::new(config(), &[]);
        let ns = Namespace::from_dotted("MyGame.Example");
        assert_eq!(namer.namespaced_type(&ns, "Monster"), "MyGame__Example__Monster");
        assert_eq!(namer.namespaced_type(&Namespace::root(), "Monster"), "Monster");
        assert_eq!(namer.object_type("monster"), "MonsterT");
        assert_eq!(namer.enum_variant("Color", "Red"), "ColorRed");
        assert_eq!(namer.directories(&ns), PathBuf::from("MyGame").join("Example"));
        assert_eq!(namer.file("Monster"), "Monster.go");
    }
}
