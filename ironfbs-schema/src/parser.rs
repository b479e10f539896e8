//! Schema document resolution.
//!
//! Turns a [`SchemaDocument`] into a fully resolved [`Schema`]: names are
//! bound to definitions, union discriminant fields are inserted, default
//! constants are normalized and struct layouts are computed.

use std::collections::HashMap;

use crate::definitions::{
    Definition, EnumDef, EnumVal, FieldDef, Namespace, StructDef, UNION_TYPE_FIELD_SUFFIX,
};
use crate::document::{EnumDocument, FieldDocument, SchemaDocument, StructDocument};
use crate::error::{ParseError, SchemaError};
use crate::schema::{Schema, inline_alignment_in, inline_size_in};
use crate::types::{BaseType, EnumId, StructId, Type, Value};
use crate::validation::validate_schema;

/// Largest alignment accepted by `force_align`.
const MAX_FORCE_ALIGN: usize = 16;

/// Parses and resolves a JSON schema document.
///
/// # Arguments
/// * `json` - Schema document content
///
/// # Returns
/// The resolved and validated schema.
///
/// # Errors
/// Returns `SchemaError` if the document is malformed, references unknown
/// types, or violates a schema invariant.
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    let document: SchemaDocument = serde_json::from_str(json).map_err(ParseError::from)?;
    resolve_document(&document)
}

/// Reads, parses and resolves a JSON schema document file.
///
/// The schema's file name defaults to the file stem when the document does
/// not declare one.
///
/// # Errors
/// Returns `SchemaError` if the file cannot be read or resolution fails.
pub fn parse_schema_file(path: &std::path::Path) -> Result<Schema, SchemaError> {
    let json = std::fs::read_to_string(path).map_err(ParseError::from)?;
    let mut document: SchemaDocument = serde_json::from_str(&json).map_err(ParseError::from)?;
    if document.file_name.is_empty() {
        document.file_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    resolve_document(&document)
}

/// Resolves an in-memory schema document.
///
/// # Errors
/// Returns `SchemaError` if resolution or validation fails.
pub fn resolve_document(document: &SchemaDocument) -> Result<Schema, SchemaError> {
    let schema = Resolver::new(document)?.resolve()?;
    validate_schema(&schema)?;
    Ok(schema)
}

/// Definition a name resolved to.
#[derive(Debug, Clone, Copy)]
enum Resolved {
    Enum(EnumId),
    Struct(StructId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutState {
    Pending,
    InProgress,
    Done,
}

struct Resolver<'d> {
    document: &'d SchemaDocument,
    names: HashMap<String, Resolved>,
    enums: Vec<EnumDef>,
}

impl<'d> Resolver<'d> {
    /// Declares every definition so that forward references resolve.
    fn new(document: &'d SchemaDocument) -> Result<Self, ParseError> {
        let mut names = HashMap::new();
        for (i, e) in document.enums.iter().enumerate() {
            let qualified = Namespace::from_dotted(&e.namespace).qualify(&e.name, ".");
            let kind = if e.is_union { "union" } else { "enum" };
            if names.insert(qualified.clone(), Resolved::Enum(EnumId(i))).is_some() {
                return Err(ParseError::duplicate(kind, qualified));
            }
        }
        for (i, s) in document.structs.iter().enumerate() {
            let qualified = Namespace::from_dotted(&s.namespace).qualify(&s.name, ".");
            let kind = if s.fixed { "struct" } else { "table" };
            if names.insert(qualified.clone(), Resolved::Struct(StructId(i))).is_some() {
                return Err(ParseError::duplicate(kind, qualified));
            }
        }
        Ok(Self {
            document,
            names,
            enums: Vec::with_capacity(document.enums.len()),
        })
    }

    fn resolve(mut self) -> Result<Schema, SchemaError> {
        for e in &self.document.enums {
            let def = self.resolve_enum(e)?;
            self.enums.push(def);
        }

        let mut structs = Vec::with_capacity(self.document.structs.len());
        for s in &self.document.structs {
            structs.push(self.resolve_struct(s)?);
        }
        layout_structs(&mut structs)?;

        let mut schema = Schema::new(self.document.file_name.clone());
        schema.root_struct_def = self.resolve_root(&structs)?;
        schema.file_identifier = self.resolve_identifier()?;
        schema.file_extension = self.document.file_extension.clone();
        schema.enums = self.enums;
        schema.structs = structs;
        Ok(schema)
    }

    /// Looks `name` up from the innermost enclosing namespace outward.
    fn lookup(&self, name: &str, namespace: &Namespace) -> Option<Resolved> {
        (0..=namespace.components.len()).rev().find_map(|len| {
            let candidate = Namespace::new(namespace.components[..len].to_vec()).qualify(name, ".");
            self.names.get(&candidate).copied()
        })
    }

    fn resolve_enum(&self, doc: &EnumDocument) -> Result<EnumDef, SchemaError> {
        let namespace = Namespace::from_dotted(&doc.namespace);
        let context = namespace.qualify(&doc.name, ".");

        let underlying = if doc.is_union {
            BaseType::UType
        } else {
            let expr = doc.underlying_type.as_deref().unwrap_or("int");
            match BaseType::from_idl_name(expr) {
                Some(base) if base.is_integer() && base != BaseType::Bool => base,
                _ => {
                    return Err(ParseError::invalid_type(
                        expr,
                        &context,
                        "enum underlying type must be an integer",
                    )
                    .into());
                }
            }
        };

        let bit_flags = doc.attributes.contains_key("bit_flags");
        let mut vals: Vec<EnumVal> = Vec::with_capacity(doc.values.len() + 1);
        let mut next: i64 = 0;
        if doc.is_union {
            vals.push(EnumVal {
                name: "NONE".to_string(),
                value: 0,
                union_type: Type::new(BaseType::None),
                doc_comment: Vec::new(),
            });
            next = 1;
        }

        for v in &doc.values {
            let declared = v.value.unwrap_or(next);
            next = declared.checked_add(1).ok_or_else(|| SchemaError::InvalidEnumValue {
                enum_name: context.clone(),
                value: declared.to_string(),
            })?;

            let value = if bit_flags {
                let bits = underlying.size() * 8;
                if declared < 0 || declared as usize >= bits {
                    return Err(SchemaError::InvalidEnumValue {
                        enum_name: context.clone(),
                        value: declared.to_string(),
                    });
                }
                if declared as usize == 63 {
                    i64::MIN
                } else {
                    1i64 << declared
                }
            } else {
                declared
            };

            let union_type = if doc.is_union {
                self.resolve_variant(v.union_type.as_deref().unwrap_or(&v.name), &namespace, &context)?
            } else {
                Type::new(BaseType::None)
            };
            let name = v.name.replace('.', "_");
            if vals.iter().any(|existing| existing.name == name) {
                return Err(ParseError::duplicate("enum value", format!("{context}.{name}")).into());
            }
            vals.push(EnumVal {
                name,
                value,
                union_type,
                doc_comment: v.doc.clone(),
            });
        }

        Ok(EnumDef {
            name: doc.name.clone(),
            namespace,
            doc_comment: doc.doc.clone(),
            attributes: doc.attributes.clone(),
            generated: doc.generated,
            is_union: doc.is_union,
            underlying_type: Type::new(underlying),
            vals,
        })
    }

    fn resolve_variant(
        &self,
        name: &str,
        namespace: &Namespace,
        context: &str,
    ) -> Result<Type, ParseError> {
        if name == "string" {
            return Ok(Type::new(BaseType::String));
        }
        match self.lookup(name, namespace) {
            Some(Resolved::Struct(id)) => Ok(Type::structure(id)),
            Some(Resolved::Enum(_)) => Err(ParseError::invalid_type(
                name,
                context,
                "union variants must be tables or strings",
            )),
            None => Err(ParseError::unknown_type(name, context)),
        }
    }

    fn resolve_struct(&self, doc: &StructDocument) -> Result<StructDef, SchemaError> {
        let namespace = Namespace::from_dotted(&doc.namespace);
        let context = namespace.qualify(&doc.name, ".");
        let mut fields: Vec<FieldDef> = Vec::with_capacity(doc.fields.len());

        for f in &doc.fields {
            let field_context = format!("{context}.{}", f.name);
            let ty = self.parse_type(&f.type_expr, &namespace, &field_context)?;

            if ty.is_union() || ty.is_union_vector() {
                let enum_id = ty.enum_def.ok_or_else(|| {
                    ParseError::invalid_type(&f.type_expr, &field_context, "union without definition")
                })?;
                let discriminant = if ty.is_union() {
                    Type::utype(enum_id)
                } else {
                    Type::vector_of(&Type::utype(enum_id))
                };
                let mut hidden =
                    FieldDef::new(format!("{}{UNION_TYPE_FIELD_SUFFIX}", f.name), discriminant);
                hidden.deprecated = f.deprecated;
                hidden.required = f.required && ty.is_union_vector();
                fields.push(hidden);
            }

            let field = self.resolve_field(f, ty, &namespace, &field_context)?;
            if fields.iter().any(|existing| existing.name == field.name) {
                return Err(ParseError::duplicate("field", field_context).into());
            }
            fields.push(field);
        }

        let has_key = fields.iter().any(|f| f.key);
        Ok(StructDef {
            name: doc.name.clone(),
            namespace,
            doc_comment: doc.doc.clone(),
            sortbysize: !doc.fixed && !doc.attributes.contains_key("original_order"),
            attributes: doc.attributes.clone(),
            generated: doc.generated,
            fixed: doc.fixed,
            fields,
            has_key,
            minalign: 1,
            bytesize: 0,
        })
    }

    fn resolve_field(
        &self,
        doc: &FieldDocument,
        ty: Type,
        namespace: &Namespace,
        context: &str,
    ) -> Result<FieldDef, SchemaError> {
        let constant = self.default_constant(&ty, doc.default.as_ref(), context)?;
        let nested_flatbuffer = match &doc.nested_flatbuffer {
            Some(name) => match self.lookup(name, namespace) {
                Some(Resolved::Struct(id)) => Some(id),
                _ => return Err(ParseError::unknown_type(name, context).into()),
            },
            None => None,
        };

        Ok(FieldDef {
            name: doc.name.clone(),
            value: Value {
                ty,
                constant,
                offset: 0,
            },
            doc_comment: doc.doc.clone(),
            attributes: doc.attributes.clone(),
            deprecated: doc.deprecated,
            required: doc.required,
            key: doc.key,
            padding: 0,
            nested_flatbuffer,
        })
    }

    /// Parses a type expression: a base type, a name, `[T]` or `[T:N]`.
    fn parse_type(&self, expr: &str, namespace: &Namespace, context: &str) -> Result<Type, ParseError> {
        let expr = expr.trim();
        let Some(inner) = expr.strip_prefix('[') else {
            return self.parse_element(expr, namespace, context);
        };
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| ParseError::invalid_type(expr, context, "unterminated '['"))?;

        if let Some((element, length)) = inner.rsplit_once(':') {
            let length: u16 = length
                .trim()
                .parse()
                .map_err(|_| ParseError::invalid_type(expr, context, "array length must be a number"))?;
            if length == 0 {
                return Err(ParseError::invalid_type(expr, context, "array length must be positive"));
            }
            let element = self.parse_nested_element(element, expr, namespace, context)?;
            return Ok(Type::array_of(&element, length));
        }

        let element = self.parse_nested_element(inner, expr, namespace, context)?;
        Ok(Type::vector_of(&element))
    }

    fn parse_nested_element(
        &self,
        element: &str,
        expr: &str,
        namespace: &Namespace,
        context: &str,
    ) -> Result<Type, ParseError> {
        let element = element.trim();
        if element.starts_with('[') {
            return Err(ParseError::invalid_type(
                expr,
                context,
                "nested vectors are not supported",
            ));
        }
        self.parse_element(element, namespace, context)
    }

    fn parse_element(&self, name: &str, namespace: &Namespace, context: &str) -> Result<Type, ParseError> {
        if let Some(base) = BaseType::from_idl_name(name) {
            return Ok(Type::new(base));
        }
        match self.lookup(name, namespace) {
            Some(Resolved::Struct(id)) => Ok(Type::structure(id)),
            Some(Resolved::Enum(id)) => {
                let def = self
                    .enums
                    .get(id.0)
                    .ok_or_else(|| ParseError::unknown_type(name, context))?;
                if def.is_union {
                    Ok(Type::union(id))
                } else {
                    Ok(Type::enumeration(def.underlying_base(), id))
                }
            }
            None => Err(ParseError::unknown_type(name, context)),
        }
    }

    /// Normalizes a default into canonical textual form.
    fn default_constant(
        &self,
        ty: &Type,
        raw: Option<&serde_json::Value>,
        context: &str,
    ) -> Result<String, ParseError> {
        let Some(raw) = raw else {
            return Ok("0".to_string());
        };
        if !ty.is_scalar() {
            return Err(ParseError::invalid_value(
                raw.to_string(),
                context,
                "only scalar fields can declare a default",
            ));
        }

        let base = ty.base_type;
        let text = match raw {
            serde_json::Value::Bool(b) => {
                if !base.is_integer() {
                    return Err(ParseError::invalid_value(b.to_string(), context, "expected a number"));
                }
                if *b { "1" } else { "0" }.to_string()
            }
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => {
                let s = s.trim();
                match s {
                    "true" => "1".to_string(),
                    "false" => "0".to_string(),
                    _ => match self.enum_member_value(ty, s) {
                        Some(value) => value.to_string(),
                        None => s.to_string(),
                    },
                }
            }
            other => {
                return Err(ParseError::invalid_value(
                    other.to_string(),
                    context,
                    "expected a number, bool or enum member",
                ));
            }
        };

        if base.is_float() {
            let parsed: f64 = text
                .parse()
                .map_err(|_| ParseError::invalid_value(&text, context, "expected a float"))?;
            if !parsed.is_finite() {
                return Err(ParseError::invalid_value(&text, context, "float default must be finite"));
            }
        } else {
            let parsed: i128 = text
                .parse()
                .map_err(|_| ParseError::invalid_value(&text, context, "expected an integer"))?;
            if let Some((min, max)) = base.integer_range()
                && (parsed < min || parsed > max)
            {
                return Err(ParseError::invalid_value(&text, context, format!("out of range for {base}")));
            }
        }
        Ok(text)
    }

    fn enum_member_value(&self, ty: &Type, member: &str) -> Option<i64> {
        let def = self.enums.get(ty.enum_def?.0)?;
        if def.is_bit_flags() {
            // Space separated flags combine.
            let mut combined = 0i64;
            for flag in member.split_whitespace() {
                combined |= def.val(flag)?.value;
            }
            Some(combined)
        } else {
            def.val(member).map(|v| v.value)
        }
    }

    fn resolve_root(&self, structs: &[StructDef]) -> Result<Option<StructId>, SchemaError> {
        let Some(name) = &self.document.root_type else {
            return Ok(None);
        };
        let id = match self.names.get(name.as_str()) {
            Some(Resolved::Struct(id)) => Some(*id),
            _ => {
                let mut matches = structs
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| &s.name == name)
                    .map(|(i, _)| StructId(i));
                match (matches.next(), matches.next()) {
                    (Some(id), None) => Some(id),
                    _ => None,
                }
            }
        };
        match id {
            Some(id) if !structs[id.0].fixed => Ok(Some(id)),
            Some(_) => Err(SchemaError::validation(format!(
                "root_type '{name}' must be a table"
            ))),
            None => Err(SchemaError::TypeNotFound { name: name.clone() }),
        }
    }

    fn resolve_identifier(&self) -> Result<Option<String>, ParseError> {
        match &self.document.file_identifier {
            Some(id) if id.len() != 4 || !id.is_ascii() => Err(ParseError::invalid_value(
                id,
                "file_identifier",
                "must be exactly 4 ASCII characters",
            )),
            other => Ok(other.clone()),
        }
    }
}

/// Assigns vtable offsets to tables and byte offsets to fixed structs.
fn layout_structs(structs: &mut [StructDef]) -> Result<(), SchemaError> {
    let mut state = vec![LayoutState::Pending; structs.len()];
    let mut path = Vec::new();
    for id in 0..structs.len() {
        if structs[id].fixed {
            layout_fixed(structs, id, &mut state, &mut path)?;
        } else {
            layout_table(&mut structs[id])?;
        }
    }
    Ok(())
}

fn layout_table(table: &mut StructDef) -> Result<(), SchemaError> {
    for (slot, field) in table.fields.iter_mut().enumerate() {
        field.value.offset = u16::try_from(4 + 2 * slot).map_err(|_| {
            SchemaError::validation(format!("table '{}' has too many fields", table.name))
        })?;
    }
    Ok(())
}

fn layout_fixed(
    structs: &mut [StructDef],
    id: usize,
    state: &mut [LayoutState],
    path: &mut Vec<String>,
) -> Result<(), SchemaError> {
    match state[id] {
        LayoutState::Done => return Ok(()),
        LayoutState::InProgress => {
            path.push(structs[id].fully_qualified_name());
            return Err(SchemaError::CircularReference {
                path: path.join(" -> "),
            });
        }
        LayoutState::Pending => {}
    }
    state[id] = LayoutState::InProgress;
    path.push(structs[id].fully_qualified_name());

    let children: Vec<usize> = structs[id]
        .fields
        .iter()
        .filter(|f| f.value.ty.is_struct() || f.value.ty.is_array())
        .filter_map(|f| f.value.ty.struct_def)
        .map(|s| s.0)
        .collect();
    for child in children {
        if structs[child].fixed {
            layout_fixed(structs, child, state, path)?;
        }
    }

    let mut bytesize = 0usize;
    let mut minalign = 1usize;
    for i in 0..structs[id].fields.len() {
        let (size, align) = {
            let ty = &structs[id].fields[i].value.ty;
            (inline_size_in(structs, ty), inline_alignment_in(structs, ty))
        };
        minalign = minalign.max(align);
        let pad = padding_bytes(bytesize, align);
        if i > 0 {
            structs[id].fields[i - 1].padding += pad;
        }
        bytesize += pad;
        structs[id].fields[i].value.offset = u16::try_from(bytesize).map_err(|_| {
            SchemaError::validation(format!("struct '{}' is too large", structs[id].name))
        })?;
        bytesize += size;
    }

    if let Some(force) = structs[id].attributes.get("force_align") {
        let force: usize = force.trim().parse().map_err(|_| {
            ParseError::invalid_value(force, format!("{}.force_align", structs[id].name), "expected a number")
        })?;
        if !force.is_power_of_two() || force < minalign || force > MAX_FORCE_ALIGN {
            return Err(ParseError::invalid_value(
                force.to_string(),
                format!("{}.force_align", structs[id].name),
                format!("must be a power of two between {minalign} and {MAX_FORCE_ALIGN}"),
            )
            .into());
        }
        minalign = force;
    }

    let pad = padding_bytes(bytesize, minalign);
    if let Some(last) = structs[id].fields.last_mut() {
        last.padding += pad;
    }
    bytesize += pad;

    structs[id].bytesize = bytesize;
    structs[id].minalign = minalign;
    state[id] = LayoutState::Done;
    path.pop();
    Ok(())
}

/// Bytes needed to align `size` up to `align`.
fn padding_bytes(size: usize, align: usize) -> usize {
    (align - size % align) % align
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONSTER: &str = r#"{
        "file_name": "monster",
        "enums": [
            { "name": "Color", "namespace": "MyGame.Example", "underlying_type": "ubyte",
              "values": [ { "name": "Red", "value": 1 }, { "name": "Green" }, { "name": "Blue", "value": 8 } ] },
            { "name": "Any", "namespace": "MyGame.Example", "is_union": true,
              "values": [ { "name": "Monster" }, { "name": "Label", "type": "string" } ] }
        ],
        "structs": [
            { "name": "Test", "namespace": "MyGame.Example", "fixed": true,
              "fields": [ { "name": "a", "type": "short" }, { "name": "b", "type": "byte" } ] },
            { "name": "Vec3", "namespace": "MyGame.Example", "fixed": true,
              "fields": [
                { "name": "x", "type": "float" }, { "name": "y", "type": "float" }, { "name": "z", "type": "float" },
                { "name": "test1", "type": "double" }, { "name": "test2", "type": "Color" },
                { "name": "test3", "type": "Test" } ] },
            { "name": "Monster", "namespace": "MyGame.Example",
              "fields": [
                { "name": "pos", "type": "Vec3" },
                { "name": "hp", "type": "short", "default": 100 },
                { "name": "name", "type": "string", "required": true, "key": true },
                { "name": "inventory", "type": "[ubyte]" },
                { "name": "color", "type": "Color", "default": "Blue" },
                { "name": "test", "type": "Any" },
                { "name": "friendly", "type": "bool", "default": true, "deprecated": true } ] }
        ],
        "root_type": "MyGame.Example.Monster",
        "file_identifier": "MONS"
    }"#;

    fn monster() -> Schema {
        parse_schema(MONSTER).expect("Failed to parse")
    }

    #[test]
    fn test_parse_definitions() {
        let schema = monster();
        assert_eq!(schema.file_name, "monster");
        assert_eq!(schema.enums.len(), 2);
        assert_eq!(schema.structs.len(), 3);
        assert_eq!(schema.file_identifier.as_deref(), Some("MONS"));
        assert_eq!(schema.root_struct().map(|s| s.name.as_str()), Some("Monster"));
    }

    #[test]
    fn test_enum_values_auto_increment() {
        let schema = monster();
        let color = &schema.enums[0];
        let values: Vec<i64> = color.vals.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![1, 2, 8]);
        assert_eq!(color.underlying_base(), BaseType::UChar);
    }

    #[test]
    fn test_union_gets_none_and_payload_types() {
        let schema = monster();
        let any = &schema.enums[1];
        assert!(any.is_union);
        assert_eq!(any.vals[0].name, "NONE");
        assert!(any.vals[0].is_zero());
        assert_eq!(any.vals[1].value, 1);
        assert!(schema.is_table(&any.vals[1].union_type));
        assert!(any.vals[2].union_type.is_string());
        assert_eq!(any.underlying_base(), BaseType::UType);
    }

    #[test]
    fn test_hidden_union_type_field() {
        let schema = monster();
        let table = schema.find_struct("MyGame.Example.Monster").expect("Monster");
        let names: Vec<&str> = table.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["pos", "hp", "name", "inventory", "color", "test_type", "test", "friendly"]
        );
        let hidden = table.field("test_type").expect("test_type");
        assert_eq!(hidden.value.ty.base_type, BaseType::UType);
        assert_eq!(hidden.value.offset, 14);
        assert_eq!(table.field("test").map(|f| f.value.offset), Some(16));
    }

    #[test]
    fn test_defaults_normalized() {
        let schema = monster();
        let table = schema.find_struct("MyGame.Example.Monster").expect("Monster");
        assert_eq!(table.field("hp").map(|f| f.value.constant.as_str()), Some("100"));
        assert_eq!(table.field("color").map(|f| f.value.constant.as_str()), Some("8"));
        assert_eq!(table.field("friendly").map(|f| f.value.constant.as_str()), Some("1"));
        assert_eq!(table.field("name").map(|f| f.value.constant.as_str()), Some("0"));
        assert!(table.has_key);
        assert!(table.sortbysize);
    }

    #[test]
    fn test_fixed_struct_layout() {
        let schema = monster();
        let test = schema.find_struct("MyGame.Example.Test").expect("Test");
        assert_eq!(test.bytesize, 4);
        assert_eq!(test.minalign, 2);
        assert_eq!(test.fields[1].padding, 1);

        let vec3 = schema.find_struct("MyGame.Example.Vec3").expect("Vec3");
        let offsets: Vec<u16> = vec3.fields.iter().map(|f| f.value.offset).collect();
        assert_eq!(offsets, vec![0, 4, 8, 16, 24, 26]);
        assert_eq!(vec3.fields[2].padding, 4);
        assert_eq!(vec3.fields[4].padding, 1);
        assert_eq!(vec3.fields[5].padding, 2);
        assert_eq!(vec3.bytesize, 32);
        assert_eq!(vec3.minalign, 8);
    }

    #[test]
    fn test_force_align() {
        let json = r#"{ "structs": [ { "name": "V", "fixed": true, "attributes": { "force_align": "16" },
            "fields": [ { "name": "x", "type": "float" } ] } ] }"#;
        let schema = parse_schema(json).expect("Failed to parse");
        assert_eq!(schema.structs[0].minalign, 16);
        assert_eq!(schema.structs[0].bytesize, 16);
        assert_eq!(schema.structs[0].fields[0].padding, 12);
    }

    #[test]
    fn test_arrays_in_struct() {
        let json = r#"{ "structs": [
            { "name": "Inner", "fixed": true, "fields": [ { "name": "a", "type": "int" }, { "name": "b", "type": "byte" } ] },
            { "name": "Outer", "fixed": true, "fields": [
                { "name": "xs", "type": "[short:3]" }, { "name": "inners", "type": "[Inner:2]" } ] } ] }"#;
        let schema = parse_schema(json).expect("Failed to parse");
        let outer = &schema.structs[1];
        assert_eq!(outer.fields[0].value.ty.fixed_length, 3);
        assert_eq!(outer.fields[1].value.offset, 8);
        assert_eq!(outer.fields[0].padding, 2);
        assert_eq!(outer.bytesize, 24);
    }

    #[test]
    fn test_lookup_from_inner_namespace_outward() {
        let json = r#"{ "structs": [
            { "name": "Point", "namespace": "A", "fixed": true, "fields": [ { "name": "x", "type": "int" } ] },
            { "name": "Shape", "namespace": "A.B", "fields": [ { "name": "origin", "type": "Point" } ] } ] }"#;
        let schema = parse_schema(json).expect("Failed to parse");
        assert_eq!(schema.structs[1].fields[0].value.ty.struct_def, Some(StructId(0)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{ "structs": [ { "name": "A", "fields": [ { "name": "b", "type": "Missing" } ] } ] }"#;
        let err = parse_schema(json).expect_err("should fail");
        assert!(matches!(err, SchemaError::Parse(ParseError::UnknownType { .. })));
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let json = r#"{ "structs": [ { "name": "A" }, { "name": "A", "fixed": true } ] }"#;
        let err = parse_schema(json).expect_err("should fail");
        assert!(matches!(err, SchemaError::Parse(ParseError::DuplicateDefinition { .. })));
    }

    #[test]
    fn test_circular_struct_rejected() {
        let json = r#"{ "structs": [
            { "name": "A", "fixed": true, "fields": [ { "name": "b", "type": "B" } ] },
            { "name": "B", "fixed": true, "fields": [ { "name": "a", "type": "A" } ] } ] }"#;
        let err = parse_schema(json).expect_err("should fail");
        assert!(matches!(err, SchemaError::CircularReference { .. }));
    }

    #[test]
    fn test_bad_file_identifier() {
        let json = r#"{ "file_identifier": "TOOLONG" }"#;
        assert!(parse_schema(json).is_err());
    }

    #[test]
    fn test_default_out_of_range() {
        let json = r#"{ "structs": [ { "name": "A", "fields": [ { "name": "b", "type": "ubyte", "default": 300 } ] } ] }"#;
        assert!(parse_schema(json).is_err());
    }

    #[test]
    fn test_bit_flags_values() {
        let json = r#"{ "enums": [ { "name": "Flags", "underlying_type": "ubyte", "attributes": { "bit_flags": "" },
            "values": [ { "name": "A" }, { "name": "B" }, { "name": "C", "value": 7 } ] } ],
            "structs": [ { "name": "T", "fields": [ { "name": "f", "type": "Flags", "default": "A C" } ] } ] }"#;
        let schema = parse_schema(json).expect("Failed to parse");
        let values: Vec<i64> = schema.enums[0].vals.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![1, 2, 128]);
        assert_eq!(schema.structs[0].fields[0].value.constant, "129");
    }

    #[test]
    fn test_parse_schema_file_uses_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weapons.json");
        std::fs::write(&path, r#"{ "structs": [ { "name": "Weapon" } ] }"#).expect("write");
        let schema = parse_schema_file(&path).expect("Failed to parse");
        assert_eq!(schema.file_name, "weapons");
    }
}
