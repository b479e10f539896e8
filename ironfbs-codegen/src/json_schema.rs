//! JSON Schema generation.
//!
//! Describes the JSON form of buffers of the schema: one `definitions` entry
//! per enum, struct and table, linked with `$ref`, and a top-level `$ref` to
//! the root table.

use std::path::PathBuf;

use ironfbs_schema::{BaseType, EnumDef, Namespace, StructDef, Type};
use serde_json::{Map, Value, json};

use crate::language::{FileState, GenContext, LanguagePlugin, OutputLayout, TargetLanguage};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig};
use crate::options::GeneratorOptions;
use crate::writer::CodeWriter;

const DRAFT: &str = "https://json-schema.org/draft/2019-09/schema";

/// JSON Schema generator.
#[derive(Debug, Clone)]
pub struct JsonSchemaGenerator {
    namer: Namer,
}

impl JsonSchemaGenerator {
    /// Creates the generator.
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
            namespace_separator: "_".to_string(),
            object_prefix: String::new(),
            object_suffix: String::new(),
            keyword_prefix: String::new(),
            keyword_suffix: String::new(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".schema.json"),
        };
        Self {
            namer: Namer::new(config, &[]),
        }
    }

    /// Key of a definition under `definitions`.
    fn definition_name(&self, namespace: &Namespace, name: &str) -> String {
        self.namer.namespaced_type(namespace, name)
    }

    fn reference(&self, namespace: &Namespace, name: &str) -> Value {
        json!({ "$ref": format!("#/definitions/{}", self.definition_name(namespace, name)) })
    }

    fn struct_ref(&self, struct_def: &StructDef) -> Value {
        self.reference(&struct_def.namespace, &struct_def.name)
    }

    fn enum_ref(&self, enum_def: &EnumDef) -> Value {
        self.reference(&enum_def.namespace, &enum_def.name)
    }

    fn bound(value: i128) -> Value {
        match i64::try_from(value) {
            Ok(v) => Value::from(v),
            Err(_) => u64::try_from(value).map(Value::from).unwrap_or(Value::Null),
        }
    }

    /// Schema of a value of type `ty`.
    fn type_schema(&self, ctx: &GenContext<'_>, ty: &Type) -> Value {
        if ty.is_scalar()
            && let Some(enum_def) = ctx.schema.enum_of(ty)
        {
            return self.enum_ref(enum_def);
        }
        match ty.base_type {
            BaseType::Bool => json!({ "type": "boolean" }),
            BaseType::Float | BaseType::Double => json!({ "type": "number" }),
            BaseType::String => json!({ "type": "string" }),
            BaseType::Struct => self.struct_ref(ctx.struct_of(ty)),
            BaseType::Vector | BaseType::Array => {
                json!({ "type": "array", "items": self.type_schema(ctx, &ty.vector_type()) })
            }
            BaseType::Union => {
                let variants: Vec<Value> = ctx
                    .enum_of(ty)
                    .vals
                    .iter()
                    .filter(|v| !v.is_zero())
                    .map(|v| self.type_schema(ctx, &v.union_type))
                    .collect();
                json!({ "anyOf": variants })
            }
            base => match base.integer_range() {
                Some((min, max)) => json!({
                    "type": "integer",
                    "minimum": Self::bound(min),
                    "maximum": Self::bound(max),
                }),
                None => json!({}),
            },
        }
    }

    fn description(doc: &[String]) -> Option<Value> {
        let text = doc
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        (!text.is_empty()).then(|| Value::String(text))
    }

    fn enum_schema(enum_def: &EnumDef) -> Value {
        let names: Vec<&str> = enum_def.vals.iter().map(|v| v.name.as_str()).collect();
        json!({ "type": "string", "enum": names })
    }

    fn object_schema(&self, ctx: &GenContext<'_>, struct_def: &StructDef) -> Value {
        let mut properties = Map::new();
        for field in &struct_def.fields {
            let mut property = match self.type_schema(ctx, &field.value.ty) {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            if field.value.ty.is_array() {
                property.insert("minItems".to_string(), Value::from(field.value.ty.fixed_length));
                property.insert("maxItems".to_string(), Value::from(field.value.ty.fixed_length));
            }
            if field.deprecated {
                property.insert("deprecated".to_string(), Value::Bool(true));
            }
            if let Some(description) = Self::description(&field.doc_comment) {
                property.insert("description".to_string(), description);
            }
            properties.insert(field.name.clone(), Value::Object(property));
        }

        let mut object = Map::new();
        object.insert("type".to_string(), json!("object"));
        if let Some(description) = Self::description(&struct_def.doc_comment) {
            object.insert("description".to_string(), description);
        }
        object.insert("properties".to_string(), Value::Object(properties));
        let required: Vec<&str> = struct_def
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        if !required.is_empty() {
            object.insert("required".to_string(), json!(required));
        }
        object.insert("additionalProperties".to_string(), Value::Bool(false));
        Value::Object(object)
    }

    /// Writes one `definitions` member, separated from the previous one.
    fn write_definition(&self, name: String, schema: &Value, state: &FileState, code: &mut CodeWriter) {
        if state.emitted > 0 {
            code.append_raw(",\n");
        }
        let pretty = format!("{schema:#}").replace('\n', "\n    ");
        code.append_raw(&format!("    {}: {pretty}", Value::String(name)));
    }
}

impl LanguagePlugin for JsonSchemaGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::JsonSchema
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
        self.type_schema(ctx, ty).to_string()
    }

    fn begin_file(&self, _ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        code.line("{");
        code.line(&format!("  \"$schema\": \"{DRAFT}\","));
        if state.emitted == 0 {
            code.append_raw("  \"definitions\": {");
        } else {
            code.line("  \"definitions\": {");
        }
    }

    fn end_file(&self, ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        if state.emitted > 0 {
            code.append_raw("\n  ");
        }
        match ctx.schema.root_struct() {
            Some(root) => {
                code.append_raw("},\n");
                code.line(&format!(
                    "  \"$ref\": \"#/definitions/{}\"",
                    self.definition_name(&root.namespace, &root.name)
                ));
            }
            None => {
                tracing::warn!(
                    "Schema {} has no root type; JSON Schema has no top-level $ref",
                    ctx.schema.file_name
                );
                code.append_raw("}\n");
            }
        }
        code.line("}");
    }

    fn gen_enum(&self, _ctx: &GenContext<'_>, enum_def: &EnumDef, state: &mut FileState, code: &mut CodeWriter) {
        let name = self.definition_name(&enum_def.namespace, &enum_def.name);
        self.write_definition(name, &Self::enum_schema(enum_def), state, code);
    }

    fn gen_struct(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        let name = self.definition_name(&struct_def.namespace, &struct_def.name);
        self.write_definition(name, &self.object_schema(ctx, struct_def), state, code);
    }

    fn gen_table(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        self.gen_struct(ctx, struct_def, state, code);
    }

    fn one_file_name(&self, ctx: &GenContext<'_>) -> PathBuf {
        PathBuf::from(format!(
            "{}{}",
            ctx.schema.file_name,
            self.namer.config().filename_extension
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::generator::Generator;
    use ironfbs_schema::parse_schema;
    use pretty_assertions::assert_eq;

    fn render(schema: &ironfbs_schema::Schema) -> (PathBuf, String) {
        let options = GeneratorOptions::default();
        let plugin = JsonSchemaGenerator::new(&options);
        let mut files = Generator::new(schema, &options, &plugin)
            .render()
            .expect("Failed to render");
        assert_eq!(files.len(), 1);
        let file = files.remove(0);
        (file.path, file.contents)
    }

    fn document(schema: &ironfbs_schema::Schema) -> Value {
        let (_, text) = render(schema);
        serde_json::from_str(&text).expect("generated schema is not JSON")
    }

    #[test]
    fn test_single_file_named_after_schema() {
        let (path, text) = render(&fixtures::monster());
        assert_eq!(path, PathBuf::from("monster_test.schema.json"));
        assert!(text.starts_with(
            "{\n  \"$schema\": \"https://json-schema.org/draft/2019-09/schema\",\n  \"definitions\": {\n    \"MyGame_Example_Color\": {\n      \"type\": \"string\",\n"
        ));
        assert!(text.ends_with("  },\n  \"$ref\": \"#/definitions/MyGame_Example_Monster\"\n}\n"));
    }

    #[test]
    fn test_definitions_and_refs() {
        let doc = document(&fixtures::monster());
        let definitions = doc["definitions"].as_object().expect("definitions");
        assert_eq!(definitions.len(), fixtures::EMITTED.len());
        assert!(!definitions.contains_key("MyGame_Legacy"));

        assert_eq!(
            doc["definitions"]["MyGame_Example_Color"]["enum"],
            json!(["Red", "Green", "Blue"])
        );
        let monster = &doc["definitions"]["MyGame_Example_Monster"];
        assert_eq!(monster["description"], json!("an example documentation comment: monster object"));
        assert_eq!(monster["required"], json!(["name"]));
        assert_eq!(monster["additionalProperties"], json!(false));
        assert_eq!(monster["properties"]["pos"], json!({ "$ref": "#/definitions/MyGame_Example_Vec3" }));
        assert_eq!(monster["properties"]["color"], json!({ "$ref": "#/definitions/MyGame_Example_Color" }));
        assert_eq!(monster["properties"]["friendly"]["deprecated"], json!(true));
        assert_eq!(
            monster["properties"]["testarrayofstring"],
            json!({ "type": "array", "items": { "type": "string" }, "description": "an array of names" })
        );
        assert_eq!(
            monster["properties"]["test"],
            json!({ "anyOf": [
                { "$ref": "#/definitions/MyGame_Example_Monster" },
                { "$ref": "#/definitions/MyGame_Example2_Weapon" },
                { "type": "string" }
            ] })
        );
    }

    #[test]
    fn test_integer_ranges() {
        let doc = document(&fixtures::monster());
        let monster = &doc["definitions"]["MyGame_Example_Monster"]["properties"];
        assert_eq!(monster["hp"], json!({ "type": "integer", "minimum": -32768, "maximum": 32767 }));
        assert_eq!(monster["big"]["maximum"], json!(u64::MAX));
        assert_eq!(monster["testf"], json!({ "type": "number" }));

        let grid = &doc["definitions"]["MyGame_Example_Grid"]["properties"]["cells"];
        assert_eq!(grid["minItems"], json!(3));
        assert_eq!(grid["maxItems"], json!(3));
    }

    #[test]
    fn test_schema_without_root() {
        let schema = parse_schema(
            r#"{ "file_name": "plain", "enums": [ { "name": "E", "values": [ { "name": "A" } ] } ] }"#,
        )
        .expect("Failed to parse");
        let (_, text) = render(&schema);
        let doc: Value = serde_json::from_str(&text).expect("generated schema is not JSON");
        assert!(doc.get("$ref").is_none());
        assert_eq!(doc["definitions"]["E"]["enum"], json!(["A"]));
    }

    #[test]
    fn test_empty_schema_is_valid_json() {
        let schema = parse_schema(r#"{ "file_name": "empty" }"#).expect("Failed to parse");
        let (_, text) = render(&schema);
        assert_eq!(
            text,
            "{\n  \"$schema\": \"https://json-schema.org/draft/2019-09/schema\",\n  \"definitions\": {}\n}\n"
        );
    }
}
