//! Schema validation utilities.
//!
//! Checks the invariants every generator relies on. A schema that passes
//! [`validate_schema`] can be walked by any language plugin without hitting
//! an unsupported combination.

use std::collections::HashSet;

use crate::definitions::{Definition, EnumDef, FieldDef, StructDef};
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::types::BaseType;

/// Validates a resolved schema for correctness.
///
/// # Arguments
/// * `schema` - The schema to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    validate_names(schema)?;
    for enum_def in &schema.enums {
        validate_enum(schema, enum_def)?;
    }
    for struct_def in &schema.structs {
        if struct_def.fixed {
            validate_fixed_struct(schema, struct_def)?;
        } else {
            validate_table(schema, struct_def)?;
        }
        validate_key(struct_def)?;
    }
    if let Some(root) = schema.root_struct()
        && root.fixed
    {
        return Err(SchemaError::validation(format!(
            "root type '{}' must be a table",
            root.name
        )));
    }
    Ok(())
}

/// Returns true for identifiers of the form `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(name: &str, what: &str) -> Result<(), SchemaError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::validation(format!("invalid {what} name '{name}'")))
    }
}

fn validate_names(schema: &Schema) -> Result<(), SchemaError> {
    let definitions = schema
        .enums
        .iter()
        .map(|e| (e.name(), e.namespace()))
        .chain(schema.structs.iter().map(|s| (s.name(), s.namespace())));
    for (name, namespace) in definitions {
        check_identifier(name, "definition")?;
        for component in &namespace.components {
            check_identifier(component, "namespace component")?;
        }
    }
    for enum_def in &schema.enums {
        for val in &enum_def.vals {
            check_identifier(&val.name, "enum value")?;
        }
    }
    for struct_def in &schema.structs {
        for field in &struct_def.fields {
            check_identifier(&field.name, "field")?;
        }
    }
    Ok(())
}

fn validate_enum(schema: &Schema, enum_def: &EnumDef) -> Result<(), SchemaError> {
    let base = enum_def.underlying_base();
    let Some((min, max)) = base.integer_range() else {
        return Err(SchemaError::validation(format!(
            "enum '{}' must have an integer underlying type",
            enum_def.name
        )));
    };

    let mut seen_names = HashSet::new();
    for val in &enum_def.vals {
        if !seen_names.insert(val.name.as_str()) {
            return Err(SchemaError::validation(format!(
                "Duplicate enum value name '{}' in enum '{}'",
                val.name, enum_def.name
            )));
        }

        let value = if base == BaseType::ULong {
            i128::from(val.value as u64)
        } else {
            i128::from(val.value)
        };
        if value < min || value > max {
            return Err(SchemaError::InvalidEnumValue {
                enum_name: enum_def.name.clone(),
                value: val.value.to_string(),
            });
        }

        if enum_def.is_union && !val.is_zero() {
            let payload = &val.union_type;
            if !(payload.is_string() || schema.is_table(payload)) {
                return Err(SchemaError::validation(format!(
                    "union '{}' variant '{}' must be a table or a string",
                    enum_def.name, val.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_fixed_struct(schema: &Schema, struct_def: &StructDef) -> Result<(), SchemaError> {
    if struct_def.fields.is_empty() {
        return Err(SchemaError::validation(format!(
            "struct '{}' must declare at least one field",
            struct_def.name
        )));
    }

    let mut calculated = 0usize;
    for field in &struct_def.fields {
        let ty = &field.value.ty;
        let allowed = ty.is_scalar() || (ty.is_struct() && schema.is_fixed_struct(ty)) || ty.is_array();
        if !allowed || ty.is_discriminant() {
            return Err(SchemaError::validation(format!(
                "struct '{}' field '{}' must be a scalar, struct or array",
                struct_def.name, field.name
            )));
        }
        if ty.is_array() {
            let element = ty.vector_type();
            let element_ok =
                element.is_scalar() || (element.is_struct() && schema.is_fixed_struct(&element));
            let nested = schema
                .struct_of(&element)
                .is_some_and(|inner| contains_array(schema, inner));
            if !element_ok || nested {
                return Err(SchemaError::validation(format!(
                    "struct '{}' field '{}': arrays must hold scalars or array-free structs",
                    struct_def.name, field.name
                )));
            }
        }
        if field.deprecated {
            return Err(SchemaError::validation(format!(
                "struct '{}' field '{}' cannot be deprecated",
                struct_def.name, field.name
            )));
        }
        calculated += schema.inline_size(ty) + field.padding;
    }

    if calculated != struct_def.bytesize {
        return Err(SchemaError::LayoutMismatch {
            name: struct_def.name.clone(),
            declared: struct_def.bytesize,
            calculated,
        });
    }
    Ok(())
}

fn contains_array(schema: &Schema, struct_def: &StructDef) -> bool {
    struct_def.fields.iter().any(|f| {
        f.value.ty.is_array()
            || (f.value.ty.is_struct()
                && schema
                    .struct_of(&f.value.ty)
                    .is_some_and(|inner| contains_array(schema, inner)))
    })
}

fn validate_table(schema: &Schema, struct_def: &StructDef) -> Result<(), SchemaError> {
    for field in &struct_def.fields {
        let ty = &field.value.ty;
        if ty.is_array() {
            return Err(field_error(struct_def, field, "arrays are only allowed in structs"));
        }
        if ty.is_vector() && matches!(ty.element, BaseType::Vector | BaseType::Array) {
            return Err(field_error(struct_def, field, "vectors of vectors are not supported"));
        }
        if field.required && ty.is_scalar() {
            return Err(field_error(struct_def, field, "scalar fields cannot be required"));
        }
        if let Some(nested) = field.nested_flatbuffer {
            let is_bytes = ty.is_vector() && ty.element == BaseType::UChar;
            if !is_bytes || schema.struct_def(nested).fixed {
                return Err(field_error(
                    struct_def,
                    field,
                    "nested_flatbuffer requires a [ubyte] field naming a table",
                ));
            }
        }
    }
    Ok(())
}

fn validate_key(struct_def: &StructDef) -> Result<(), SchemaError> {
    let keys: Vec<&FieldDef> = struct_def.fields.iter().filter(|f| f.key).collect();
    if keys.len() > 1 {
        return Err(SchemaError::validation(format!(
            "'{}' declares more than one key field",
            struct_def.name
        )));
    }
    if let Some(key) = keys.first() {
        let ty = &key.value.ty;
        if !(ty.is_scalar() || ty.is_string()) || ty.is_discriminant() {
            return Err(field_error(struct_def, key, "key fields must be scalars or strings"));
        }
    }
    Ok(())
}

fn field_error(struct_def: &StructDef, field: &FieldDef, message: &str) -> SchemaError {
    SchemaError::validation(format!(
        "'{}' field '{}': {message}",
        struct_def.name, field.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    fn expect_invalid(json: &str) -> String {
        match parse_schema(json) {
            Ok(_) => panic!("expected validation failure"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("Monster"));
        assert!(is_valid_identifier("_private9"));
        assert!(!is_valid_identifier("9lives"));
        assert!(!is_valid_identifier("has-dash"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_invalid_field_name() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "A", "fields": [ { "name": "bad name", "type": "int" } ] } ] }"#,
        );
        assert!(message.contains("invalid field name"));
    }

    #[test]
    fn test_union_variant_must_be_table() {
        let message = expect_invalid(
            r#"{ "enums": [ { "name": "U", "is_union": true, "values": [ { "name": "S" } ] } ],
                "structs": [ { "name": "S", "fixed": true, "fields": [ { "name": "x", "type": "int" } ] } ] }"#,
        );
        assert!(message.contains("must be a table or a string"));
    }

    #[test]
    fn test_struct_rejects_strings() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "S", "fixed": true, "fields": [ { "name": "s", "type": "string" } ] } ] }"#,
        );
        assert!(message.contains("must be a scalar, struct or array"));
    }

    #[test]
    fn test_table_rejects_arrays() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "T", "fields": [ { "name": "xs", "type": "[int:4]" } ] } ] }"#,
        );
        assert!(message.contains("arrays are only allowed in structs"));
    }

    #[test]
    fn test_nested_arrays_rejected() {
        let message = expect_invalid(
            r#"{ "structs": [
                { "name": "I", "fixed": true, "fields": [ { "name": "xs", "type": "[int:2]" } ] },
                { "name": "O", "fixed": true, "fields": [ { "name": "is", "type": "[I:2]" } ] } ] }"#,
        );
        assert!(message.contains("array-free structs"));
    }

    #[test]
    fn test_required_scalar_rejected() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "T", "fields": [ { "name": "x", "type": "int", "required": true } ] } ] }"#,
        );
        assert!(message.contains("cannot be required"));
    }

    #[test]
    fn test_single_key() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "T", "fields": [
                { "name": "a", "type": "int", "key": true }, { "name": "b", "type": "int", "key": true } ] } ] }"#,
        );
        assert!(message.contains("more than one key"));
    }

    #[test]
    fn test_enum_value_range() {
        let err = parse_schema(
            r#"{ "enums": [ { "name": "E", "underlying_type": "byte", "values": [ { "name": "Big", "value": 200 } ] } ] }"#,
        )
        .expect_err("should fail");
        assert!(matches!(err, SchemaError::InvalidEnumValue { .. }));
    }

    #[test]
    fn test_nested_flatbuffer_requires_bytes() {
        let message = expect_invalid(
            r#"{ "structs": [ { "name": "T", "fields": [
                { "name": "n", "type": "[int]", "nested_flatbuffer": "T" } ] } ] }"#,
        );
        assert!(message.contains("nested_flatbuffer"));
    }

    #[test]
    fn test_layout_mismatch_detected() {
        let mut schema = parse_schema(
            r#"{ "structs": [ { "name": "S", "fixed": true, "fields": [ { "name": "x", "type": "int" } ] } ] }"#,
        )
        .expect("Failed to parse");
        schema.structs[0].bytesize = 8;
        let err = validate_schema(&schema).expect_err("should fail");
        assert!(matches!(err, SchemaError::LayoutMismatch { calculated: 4, .. }));
    }
}
