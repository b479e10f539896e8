//! Lua code generation.
//!
//! Every definition becomes a module file under its namespace directories.
//! A module returns a table holding `New`, the builder functions and a
//! metatable of accessors; other definitions are pulled in with `require`.

use ironfbs_schema::{BaseType, Definition, EnumDef, FieldDef, StructDef, Type};

use crate::language::{
    FileState, GenContext, LanguagePlugin, OutputLayout, TargetLanguage, doc_lines,
    enum_value_text,
};
use crate::namer::{Case, EscapeOrder, Namer, NamerConfig};
use crate::options::GeneratorOptions;
use crate::plan::{StructBuildOp, StructBuildPlan};
use crate::writer::CodeWriter;

/// Lua reserved words.
pub const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Runtime number type of each scalar, in canonical order.
const NUMBER_TYPES: [&str; 13] = [
    "Uint8", "Uint8", "Bool", "Int8", "Uint8", "Int16", "Uint16", "Int32", "Uint32", "Int64",
    "Uint64", "Float32", "Float64",
];

const FLATBUFFERS_REQUIRE: &str = "local flatbuffers = require('flatbuffers')";

/// Lua language plugin.
#[derive(Debug, Clone)]
pub struct LuaGenerator {
    namer: Namer,
}

impl LuaGenerator {
    /// Creates the plugin.
    #[must_use]
    pub fn new(options: &GeneratorOptions) -> Self {
        let config = NamerConfig {
            types: Case::UpperCamel,
            constants: Case::Keep,
            methods: Case::UpperCamel,
            functions: Case::UpperCamel,
            fields: Case::UpperCamel,
            variables: Case::LowerCamel,
            variants: Case::Keep,
            enum_variant_separator: String::new(),
            namespaces: Case::Keep,
            namespace_separator: "__".to_string(),
            object_prefix: options.object_prefix.clone(),
            object_suffix: options.object_suffix.clone(),
            keyword_prefix: String::new(),
            keyword_suffix: "_".to_string(),
            escape_order: EscapeOrder::AfterConvertingCase,
            filenames: Case::Keep,
            directories: Case::Keep,
            filename_suffix: String::new(),
            filename_extension: options.extension_or(".lua"),
        };
        Self {
            namer: Namer::new(config, KEYWORDS),
        }
    }

    /// `flatbuffers.N` member of a scalar type.
    fn number_type(ty: &Type) -> &'static str {
        NUMBER_TYPES
            .get(ty.base_type.index())
            .copied()
            .unwrap_or("UOffsetT")
    }

    /// Suffix of the builder's `Prepend*Slot` for a table field.
    fn slot_method(ctx: &GenContext<'_>, ty: &Type) -> &'static str {
        if ty.is_scalar() {
            Self::number_type(ty)
        } else if ty.is_struct() && ctx.schema.is_fixed_struct(ty) {
            "Struct"
        } else {
            "UOffsetTRelative"
        }
    }

    fn getter(ty: &Type, position: &str) -> String {
        match ty.base_type {
            BaseType::String => format!("self.view:String({position})"),
            BaseType::Bool => format!("(self.view:Get(flatbuffers.N.Bool, {position}) ~= 0)"),
            _ => format!(
                "self.view:Get(flatbuffers.N.{}, {position})",
                Self::number_type(ty)
            ),
        }
    }

    /// Lua literal of a field's default.
    fn default_value(field: &FieldDef) -> String {
        let ty = &field.value.ty;
        let constant = field.value.constant.as_str();
        match ty.base_type {
            BaseType::Bool => if constant == "0" { "false" } else { "true" }.to_string(),
            BaseType::Float | BaseType::Double => match constant {
                "nan" | "-nan" => "0/0".to_string(),
                "inf" | "+inf" => "math.huge".to_string(),
                "-inf" => "-math.huge".to_string(),
                _ => constant.to_string(),
            },
            // Lua integers are 64-bit signed.
            BaseType::ULong => constant
                .parse::<u64>()
                .map(|v| (v as i64).to_string())
                .unwrap_or_else(|_| constant.to_string()),
            _ if ty.is_scalar() => constant.to_string(),
            _ => "0".to_string(),
        }
    }

    /// Local name under which `target` is usable from the module of `owner`.
    fn require(&self, owner: &StructDef, target: &StructDef, state: &mut FileState) -> String {
        if std::ptr::eq(owner, target) {
            return self.namer.type_name(&target.name);
        }
        let module = target.fully_qualified_name();
        let local = format!("__{}", module.replace('.', "_"));
        state.import(format!("local {local} = require('{module}')"));
        local
    }

    fn offset_prefix(field: &FieldDef, code: &mut CodeWriter) {
        code.line(&format!("local o = self.view:Offset({})", field.value.offset));
        code.line("if o ~= 0 then");
        code.indent();
    }

    fn close_offset(code: &mut CodeWriter) {
        code.dedent();
        code.line("end");
    }

    fn end_function(code: &mut CodeWriter) {
        code.dedent();
        code.line("end");
        code.blank();
    }

    fn gen_object_header(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        doc_lines(code, "-- ", &struct_def.doc_comment);
        code.line(&format!("local {name} = {{}}"));
        code.line("local mt = {}");
        code.blank();
        code.line(&format!("function {name}.New()"));
        code.indent();
        code.line("local o = {}");
        code.line("setmetatable(o, {__index = mt})");
        code.line("return o");
        Self::end_function(code);

        if ctx.schema.is_root(struct_def) {
            code.line(&format!("function {name}.GetRootAs{name}(buf, offset)"));
            code.indent();
            code.line("if type(buf) == \"string\" then");
            code.line("  buf = flatbuffers.binaryArray.New(buf)");
            code.line("end");
            code.blank();
            code.line("local n = flatbuffers.N.UOffsetT:Unpack(buf, offset)");
            code.line(&format!("local o = {name}.New()"));
            code.line("o:Init(buf, n + offset)");
            code.line("return o");
            Self::end_function(code);
        }

        code.line("function mt:Init(buf, pos)");
        code.indent();
        code.line("self.view = flatbuffers.view.New(buf, pos)");
        Self::end_function(code);
    }

    fn gen_struct_accessor(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let method = self.namer.method(&field.name);
        let ty = &field.value.ty;
        let offset = field.value.offset;

        if ty.is_struct() {
            code.line(&format!("function mt:{method}(obj)"));
            code.indent();
            code.line(&format!("obj:Init(self.view.bytes, self.view.pos + {offset})"));
            code.line("return obj");
            Self::end_function(code);
            return;
        }

        if ty.is_array() {
            let element = ty.vector_type();
            let position = format!(
                "self.view.pos + {offset} + ((j-1) * {})",
                ctx.schema.inline_size(&element)
            );
            code.line(&format!("function mt:{method}(j)"));
            code.indent();
            if element.is_struct() {
                let local = self.require(struct_def, ctx.struct_of(&element), state);
                code.line(&format!("local obj = {local}.New()"));
                code.line(&format!("obj:Init(self.view.bytes, {position})"));
                code.line("return obj");
            } else {
                code.line(&format!("return {}", Self::getter(&element, &position)));
            }
            Self::end_function(code);

            code.line(&format!("function mt:{method}Length()"));
            code.indent();
            code.line(&format!("return {}", ty.fixed_length));
            Self::end_function(code);
            return;
        }

        code.line(&format!("function mt:{method}()"));
        code.indent();
        code.line(&format!(
            "return {}",
            Self::getter(ty, &format!("self.view.pos + {offset}"))
        ));
        Self::end_function(code);
    }

    fn gen_table_accessor(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let method = self.namer.method(&field.name);
        let ty = &field.value.ty;

        match ty.base_type {
            _ if ty.is_scalar() => {
                code.line(&format!("function mt:{method}()"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line(&format!("return {}", Self::getter(ty, "self.view.pos + o")));
                Self::close_offset(code);
                code.line(&format!("return {}", Self::default_value(field)));
                Self::end_function(code);
            }
            BaseType::String => {
                code.line(&format!("function mt:{method}()"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line(&format!("return {}", Self::getter(ty, "self.view.pos + o")));
                Self::close_offset(code);
                Self::end_function(code);
            }
            BaseType::Struct => {
                let target = ctx.struct_of(ty);
                code.line(&format!("function mt:{method}()"));
                code.indent();
                Self::offset_prefix(field, code);
                if target.fixed {
                    code.line("local x = self.view.pos + o");
                } else {
                    code.line("local x = self.view:Indirect(self.view.pos + o)");
                }
                let local = self.require(struct_def, target, state);
                code.line(&format!("local obj = {local}.New()"));
                code.line("obj:Init(self.view.bytes, x)");
                code.line("return obj");
                Self::close_offset(code);
                Self::end_function(code);
            }
            BaseType::Union => {
                code.line(&format!("function mt:{method}()"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line("local obj = flatbuffers.view.New(flatbuffers.binaryArray.New(0), 0)");
                code.line("self.view:Union(obj, o)");
                code.line("return obj");
                Self::close_offset(code);
                Self::end_function(code);
            }
            BaseType::Vector => self.gen_vector_accessor(ctx, struct_def, field, &method, state, code),
            _ => {}
        }
    }

    fn gen_vector_accessor(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        method: &str,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let element = field.value.ty.vector_type();
        let stride = ctx.schema.inline_size(&element);

        code.line(&format!("function mt:{method}(j)"));
        code.indent();
        Self::offset_prefix(field, code);
        match element.base_type {
            BaseType::Struct => {
                let target = ctx.struct_of(&element);
                code.line("local x = self.view:Vector(o)");
                code.line(&format!("x = x + ((j-1) * {stride})"));
                if !target.fixed {
                    code.line("x = self.view:Indirect(x)");
                }
                let local = self.require(struct_def, target, state);
                code.line(&format!("local obj = {local}.New()"));
                code.line("obj:Init(self.view.bytes, x)");
                code.line("return obj");
                Self::close_offset(code);
            }
            BaseType::Union => {
                code.line("local obj = flatbuffers.view.New(flatbuffers.binaryArray.New(0), 0)");
                code.line(&format!(
                    "self.view:Union(obj, self.view:Vector(o) + ((j-1) * {stride}) - self.view.pos)"
                ));
                code.line("return obj");
                Self::close_offset(code);
            }
            _ => {
                code.line("local a = self.view:Vector(o)");
                code.line(&format!(
                    "return {}",
                    Self::getter(&element, &format!("a + ((j-1) * {stride})"))
                ));
                Self::close_offset(code);
                let fallback = match element.base_type {
                    BaseType::String => "''",
                    BaseType::Bool => "false",
                    _ => "0",
                };
                code.line(&format!("return {fallback}"));
            }
        }
        Self::end_function(code);

        if element.is_scalar() && element.base_type.size() == 1 {
            code.line(&format!("function mt:{method}AsString(start, stop)"));
            code.indent();
            code.line(&format!(
                "return self.view:VectorAsString({}, start, stop)",
                field.value.offset
            ));
            Self::end_function(code);
        }

        code.line(&format!("function mt:{method}Length()"));
        code.indent();
        Self::offset_prefix(field, code);
        code.line("return self.view:VectorLen(o)");
        Self::close_offset(code);
        code.line("return 0");
        Self::end_function(code);
    }

    fn gen_struct_creator(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let plan = StructBuildPlan::new(ctx.schema, struct_def);
        let params: String = plan
            .params
            .iter()
            .map(|p| format!(", {}", self.namer.variable(&p.name)))
            .collect();
        code.line(&format!("function {name}.Create{name}(builder{params})"));
        code.indent();
        let mut loops: Vec<String> = Vec::new();
        for op in &plan.ops {
            match op {
                StructBuildOp::Prep { align, size } => code.line(&format!("builder:Prep({align}, {size})")),
                StructBuildOp::Pad(n) => code.line(&format!("builder:Pad({n})")),
                StructBuildOp::Put { param, ty, in_array } => {
                    let mut value = self.namer.variable(param);
                    if *in_array {
                        for index in &loops {
                            value.push_str(&format!("[{index}]"));
                        }
                    }
                    code.line(&format!("builder:Prepend{}({value})", Self::number_type(ty)));
                }
                StructBuildOp::BeginArray { length } => {
                    let index = format!("_idx{}", loops.len());
                    code.line(&format!("for {index} = {length}, 1, -1 do"));
                    code.indent();
                    loops.push(index);
                }
                StructBuildOp::EndArray => {
                    loops.pop();
                    code.dedent();
                    code.line("end");
                }
            }
        }
        code.line("return builder:Offset()");
        Self::end_function(code);
    }

    fn gen_table_builders(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        code.line(&format!("function {name}.Start(builder)"));
        code.indent();
        code.line(&format!("builder:StartObject({})", struct_def.fields.len()));
        Self::end_function(code);

        for field in struct_def.live_fields() {
            let method = self.namer.method(&field.name);
            let variable = self.namer.variable(&field.name);
            let ty = &field.value.ty;
            code.line(&format!("function {name}.Add{method}(builder, {variable})"));
            code.indent();
            code.line(&format!(
                "builder:Prepend{}Slot({}, {variable}, {})",
                Self::slot_method(ctx, ty),
                field.slot(),
                Self::default_value(field)
            ));
            Self::end_function(code);

            if ty.is_vector() {
                let element = ty.vector_type();
                code.line(&format!("function {name}.Start{method}Vector(builder, numElems)"));
                code.indent();
                code.line(&format!(
                    "return builder:StartVector({}, numElems, {})",
                    ctx.schema.inline_size(&element),
                    ctx.schema.inline_alignment(&element)
                ));
                Self::end_function(code);
            }
        }

        code.line(&format!("function {name}.End(builder)"));
        code.indent();
        code.line("return builder:EndObject()");
        Self::end_function(code);
    }

    fn gen_object(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        state.import(FLATBUFFERS_REQUIRE);
        self.gen_object_header(ctx, struct_def, code);
        for field in struct_def.live_fields() {
            doc_lines(code, "-- ", &field.doc_comment);
            if struct_def.fixed {
                self.gen_struct_accessor(ctx, struct_def, field, state, code);
            } else {
                self.gen_table_accessor(ctx, struct_def, field, state, code);
            }
        }
        if struct_def.fixed {
            self.gen_struct_creator(ctx, struct_def, code);
        } else {
            self.gen_table_builders(ctx, struct_def, code);
        }
        code.line(&format!("return {}", self.namer.type_name(&struct_def.name)));
    }
}

impl LanguagePlugin for LuaGenerator {
    fn language(&self) -> TargetLanguage {
        TargetLanguage::Lua
    }

    fn namer(&self) -> &Namer {
        &self.namer
    }

    fn indent(&self) -> &'static str {
        "  "
    }

    /// Modules are always one per definition; `require` resolves them by path.
    fn layout(&self, _options: &GeneratorOptions) -> OutputLayout {
        OutputLayout::PerDefinition
    }

    fn type_name(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        match ty.base_type {
            BaseType::String => "string".to_string(),
            BaseType::Vector | BaseType::Array => self.type_name(ctx, &ty.vector_type()),
            BaseType::Struct => self.namer.type_name(&ctx.struct_of(ty).name),
            BaseType::Union => "flatbuffers.view".to_string(),
            _ if ty.is_enum() => self.namer.type_name(&ctx.enum_of(ty).name),
            _ => Self::number_type(ty).to_string(),
        }
    }

    fn begin_file(&self, ctx: &GenContext<'_>, state: &FileState, code: &mut CodeWriter) {
        code.line(&format!("--[[ {}", state.declared.join(", ")));
        code.blank();
        code.line("  Automatically generated by the FlatBuffers compiler, do not modify.");
        code.blank();
        code.line(&format!("  Declared by  : {}.fbs", ctx.schema.file_name));
        if let Some(root) = ctx.schema.root_struct() {
            code.line(&format!(
                "  Rooting type : {} ({}.fbs)",
                root.fully_qualified_name(),
                ctx.schema.file_name
            ));
        }
        code.blank();
        code.line("--]]");
        code.blank();
        if !state.imports.is_empty() {
            for require in &state.imports {
                code.line(require);
            }
            code.blank();
        }
    }

    fn gen_enum(&self, _ctx: &GenContext<'_>, enum_def: &EnumDef, _state: &mut FileState, code: &mut CodeWriter) {
        let name = self.namer.type_name(&enum_def.name);
        doc_lines(code, "-- ", &enum_def.doc_comment);
        code.line(&format!("local {name} = {{"));
        code.indent();
        for val in &enum_def.vals {
            doc_lines(code, "-- ", &val.doc_comment);
            code.line(&format!(
                "{} = {},",
                self.namer.variant(&val.name),
                enum_value_text(enum_def, val.value)
            ));
        }
        code.dedent();
        code.line("}");
        code.blank();
        code.line(&format!("return {name}"));
    }

    fn gen_struct(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        self.gen_object(ctx, struct_def, state, code);
    }

    fn gen_table(&self, ctx: &GenContext<'_>, struct_def: &StructDef, state: &mut FileState, code: &mut CodeWriter) {
        self.gen_object(ctx, struct_def, state, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::generator::Generator;
    use crate::language::GeneratedFile;
    use ironfbs_schema::Schema;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn render(schema: &Schema, options: &GeneratorOptions) -> Vec<GeneratedFile> {
        let plugin = LuaGenerator::new(options);
        Generator::new(schema, options, &plugin)
            .render()
            .expect("Failed to render")
    }

    #[test]
    fn test_module_per_definition_even_in_one_file_mode() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default().one_file(true));
        assert_eq!(files.len(), fixtures::EMITTED.len());
        assert!(files.iter().any(|f| f.path == PathBuf::from("MyGame/Example/Monster.lua")));
        assert!(files.iter().any(|f| f.path == PathBuf::from("MyGame/Example2/Weapon.lua")));
        assert!(files.iter().any(|f| f.path == PathBuf::from("MyGame/InParentNamespace.lua")));
    }

    #[test]
    fn test_enum_module() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        assert_eq!(
            fixtures::file(&files, "MyGame/Example/Race.lua"),
            "--[[ MyGame.Example.Race\n\
             \n\
             \x20 Automatically generated by the FlatBuffers compiler, do not modify.\n\
             \n\
             \x20 Declared by  : monster_test.fbs\n\
             \x20 Rooting type : MyGame.Example.Monster (monster_test.fbs)\n\
             \n\
             --]]\n\
             \n\
             local Race = {\n\
             \x20 None = -1,\n\
             \x20 Human = 0,\n\
             \x20 Dwarf = 1,\n\
             \x20 Elf = 2,\n\
             }\n\
             \n\
             return Race\n"
        );
    }

    #[test]
    fn test_requires_collected() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        assert!(monster.contains(
            "--]]\n\n\
             local __MyGame_Example_Stat = require('MyGame.Example.Stat')\n\
             local __MyGame_Example_Test = require('MyGame.Example.Test')\n\
             local __MyGame_Example_Vec3 = require('MyGame.Example.Vec3')\n\
             local flatbuffers = require('flatbuffers')\n\n\
             -- an example documentation comment: monster object\n\
             local Monster = {}\n\
             local mt = {}\n"
        ));
        assert!(!monster.contains("require('MyGame.Example.Monster')"));
        assert!(monster.contains("    local obj = Monster.New()\n"));
        assert!(monster.ends_with("return Monster\n"));
    }

    #[test]
    fn test_table_accessors() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        assert!(monster.contains(
            "function mt:Hp()\n\
             \x20 local o = self.view:Offset(8)\n\
             \x20 if o ~= 0 then\n\
             \x20   return self.view:Get(flatbuffers.N.Int16, self.view.pos + o)\n\
             \x20 end\n\
             \x20 return 100\n\
             end\n"
        ));
        assert!(monster.contains("function Monster.GetRootAsMonster(buf, offset)\n"));
        assert!(monster.contains("    local x = self.view.pos + o\n    local obj = __MyGame_Example_Vec3.New()\n"));
        assert!(monster.contains("    x = self.view:Indirect(x)\n"));
        assert!(monster.contains("    self.view:Union(obj, self.view:Vector(o) + ((j-1) * 4) - self.view.pos)\n"));
        assert!(monster.contains("function mt:InventoryAsString(start, stop)\n  return self.view:VectorAsString(14, start, stop)\nend\n"));
        assert!(monster.contains("    return self.view:String(a + ((j-1) * 4))\n  end\n  return ''\n"));
        assert!(!monster.contains("Friendly"));
    }

    #[test]
    fn test_scalar_accessor_fallback_scope() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        for (header, fallback) in [
            ("function mt:Color()", "return 8"),
            ("function mt:Race()", "return -1"),
            ("function mt:TestType()", "return 0"),
        ] {
            let accessor = fixtures::block(monster, header);
            let check = fixtures::position(&accessor, "if o ~= 0 then");
            let read = fixtures::position(&accessor, "return self.view:Get(flatbuffers.N.");
            let close = accessor.len() - 2;
            assert!(check < read && read < close, "{header}");
            assert_eq!(accessor[close].trim(), "end");
            assert_eq!(fixtures::indent_of(accessor[close]), fixtures::indent_of(accessor[check]));

            let last = accessor[accessor.len() - 1];
            assert_eq!(last.trim(), fallback);
            assert_eq!(fixtures::indent_of(last), fixtures::indent_of(accessor[check]));
        }
    }

    #[test]
    fn test_require_precedes_use() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        let require = monster
            .find("local __MyGame_Example_Vec3 = require('MyGame.Example.Vec3')")
            .expect("missing require");
        let accessor = fixtures::block(monster, "function mt:Pos()");
        assert!(require < monster.find("function mt:Pos()").expect("missing accessor"));
        let local = fixtures::position(&accessor, "local obj = __MyGame_Example_Vec3.New()");
        assert!(fixtures::position(&accessor, "if o ~= 0 then") < local);
    }

    #[test]
    fn test_end_skips_required_field_check() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        assert_eq!(
            fixtures::block(monster, "function Monster.End(builder)"),
            vec!["function Monster.End(builder)", "  return builder:EndObject()"]
        );
        assert!(!monster.contains("Required"));
    }

    #[test]
    fn test_table_builders() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "MyGame/Example/Monster.lua");
        assert!(monster.contains("function Monster.Start(builder)\n  builder:StartObject(20)\nend\n"));
        assert!(monster.contains("  builder:PrependStructSlot(0, pos, 0)\n"));
        assert!(monster.contains("  builder:PrependUint8Slot(6, color, 8)\n"));
        assert!(monster.contains("  builder:PrependUOffsetTRelativeSlot(3, name, 0)\n"));
        assert!(monster.contains("  builder:PrependFloat32Slot(18, testf, 3.5)\n"));
        assert!(monster.contains("function Monster.StartTest4Vector(builder, numElems)\n  return builder:StartVector(4, numElems, 2)\nend\n"));

        let weapon = fixtures::file(&files, "MyGame/Example2/Weapon.lua");
        assert!(weapon.contains("function Weapon.AddEnd(builder, end_)\n  builder:PrependBoolSlot(3, end_, true)\nend\n"));
        assert!(weapon.contains("    return (self.view:Get(flatbuffers.N.Bool, self.view.pos + o) ~= 0)\n"));
    }

    #[test]
    fn test_struct_module() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let vec3 = fixtures::file(&files, "MyGame/Example/Vec3.lua");
        assert!(!vec3.contains("GetRootAs"));
        assert!(vec3.contains("function mt:Test1()\n  return self.view:Get(flatbuffers.N.Float64, self.view.pos + 16)\nend\n"));
        assert!(vec3.contains("function mt:Test3(obj)\n  obj:Init(self.view.bytes, self.view.pos + 26)\n  return obj\nend\n"));
        assert!(vec3.contains(
            "function Vec3.CreateVec3(builder, x, y, z, test1, test2, test3A, test3B)\n\
             \x20 builder:Prep(8, 32)\n\
             \x20 builder:Pad(2)\n\
             \x20 builder:Prep(2, 4)\n\
             \x20 builder:Pad(1)\n\
             \x20 builder:PrependInt8(test3B)\n\
             \x20 builder:PrependInt16(test3A)\n"
        ));

        let grid = fixtures::file(&files, "MyGame/Example/Grid.lua");
        assert!(grid.contains("  return self.view:Get(flatbuffers.N.Int16, self.view.pos + 0 + ((j-1) * 2))\n"));
        assert!(grid.contains("function mt:CellsLength()\n  return 3\nend\n"));
        assert!(grid.contains("  for _idx0 = 3, 1, -1 do\n    builder:PrependInt16(cells[_idx0])\n  end\n"));
        assert!(grid.contains("local __MyGame_Example_Test = require('MyGame.Example.Test')\n"));
    }

    #[test]
    fn test_unsigned_long_default_fits_lua_integers() {
        let mut field = FieldDef::new("big", Type::new(BaseType::ULong));
        field.value.constant = "18446744073709551615".to_string();
        assert_eq!(LuaGenerator::default_value(&field), "-1");
        field.value.constant = "7".to_string();
        assert_eq!(LuaGenerator::default_value(&field), "7");
    }
}
