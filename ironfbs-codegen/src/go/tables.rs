//! Table readers, key lookup and builder functions.

use ironfbs_schema::{BaseType, FieldDef, StructDef};

use super::{BYTES_IMPORT, GoGenerator};
use crate::language::{FileState, GenContext, doc_lines};
use crate::plan::{create_order, supports_single_call_create};
use crate::writer::CodeWriter;

impl GoGenerator {
    pub(super) fn gen_table_view(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        self.gen_view_header(struct_def, code);
        let is_root = ctx.schema.is_root(struct_def);
        if is_root || ctx.schema.is_nested_root(struct_def) {
            self.gen_root_readers(ctx, struct_def, is_root, code);
        }
        self.gen_init_and_table(struct_def, code);

        for field in struct_def.live_fields() {
            code.blank();
            doc_lines(code, "// ", &field.doc_comment);
            self.gen_table_accessors(ctx, struct_def, field, state, code);
            if ctx.options.mutable_buffer {
                self.gen_table_mutators(ctx, struct_def, field, state, code);
            }
        }

        if let Some(key) = struct_def.key_field() {
            code.blank();
            self.gen_key_compare(struct_def, key, code);
            code.blank();
            self.gen_lookup_by_key(ctx, struct_def, key, state, code);
        }
    }

    fn gen_root_readers(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        is_root: bool,
        code: &mut CodeWriter,
    ) {
        let name = self.namer.type_name(&struct_def.name);
        let identifier = ctx.schema.file_identifier.as_deref().filter(|_| is_root);
        if let Some(identifier) = identifier {
            code.line(&format!("const {name}Identifier = \"{identifier}\""));
            code.blank();
        }

        for (prefix, skip) in [("", ""), ("SizePrefixed", "+flatbuffers.SizeUint32")] {
            code.line(&format!(
                "func Get{prefix}RootAs{name}(buf []byte, offset flatbuffers.UOffsetT) *{name} {{"
            ));
            code.line(&format!("\tn := flatbuffers.GetUOffsetT(buf[offset{skip}:])"));
            code.line(&format!("\tx := &{name}{{}}"));
            code.line(&format!("\tx.Init(buf, n+offset{skip})"));
            code.line("\treturn x");
            code.line("}");
            code.blank();
        }
        if !is_root {
            return;
        }

        for prefix in ["", "SizePrefixed"] {
            code.line(&format!(
                "func Finish{prefix}{name}Buffer(builder *flatbuffers.Builder, offset flatbuffers.UOffsetT) {{"
            ));
            if identifier.is_some() {
                code.line(&format!("\tidentifierBytes := []byte({name}Identifier)"));
                code.line(&format!("\tbuilder.Finish{prefix}WithFileIdentifier(offset, identifierBytes)"));
            } else {
                code.line(&format!("\tbuilder.Finish{prefix}(offset)"));
            }
            code.line("}");
            code.blank();
            if identifier.is_some() {
                code.line(&format!("func {prefix}{name}BufferHasIdentifier(buf []byte) bool {{"));
                code.line(&format!(
                    "\treturn flatbuffers.{prefix}BufferHasIdentifier(buf, {name}Identifier)"
                ));
                code.line("}");
                code.blank();
            }
        }
    }

    fn gen_table_accessors(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let receiver = self.receiver(struct_def);
        let name = self.function(field);
        let ty = &field.value.ty;

        if ty.is_scalar() {
            let returns = self.type_get(ctx, state, ty);
            let read = format!("{}(o + rcv._tab.Pos)", self.getter(ty));
            code.line(&format!("{receiver} {name}() {returns} {{"));
            code.indent();
            Self::offset_prefix(field, code);
            code.line(&format!("\treturn {}", self.cast_to_enum(ctx, state, ty, &read)));
            code.line("}");
            code.line(&format!("return {}", Self::constant(field)));
            code.dedent();
            code.line("}");
            return;
        }

        match ty.base_type {
            BaseType::Struct => {
                let target = self.struct_name(ctx, state, ctx.struct_of(ty));
                code.line(&format!("{receiver} {name}(obj *{target}) *{target} {{"));
                code.indent();
                Self::offset_prefix(field, code);
                if ctx.schema.is_fixed_struct(ty) {
                    code.line("\tx := o + rcv._tab.Pos");
                } else {
                    code.line("\tx := rcv._tab.Indirect(o + rcv._tab.Pos)");
                }
                code.line("\tif obj == nil {");
                code.line(&format!("\t\tobj = new({target})"));
                code.line("\t}");
                code.line("\tobj.Init(rcv._tab.Bytes, x)");
                code.line("\treturn obj");
                code.line("}");
                code.line("return nil");
                code.dedent();
                code.line("}");
            }
            BaseType::String => {
                code.line(&format!("{receiver} {name}() []byte {{"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line("\treturn rcv._tab.ByteVector(o + rcv._tab.Pos)");
                code.line("}");
                code.line("return nil");
                code.dedent();
                code.line("}");
            }
            BaseType::Union => {
                code.line(&format!("{receiver} {name}(obj *flatbuffers.Table) bool {{"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line(&format!("\t{}(obj, o)", self.getter(ty)));
                code.line("\treturn true");
                code.line("}");
                code.line("return false");
                code.dedent();
                code.line("}");
            }
            BaseType::Vector => self.gen_vector_accessors(ctx, struct_def, field, state, code),
            _ => {}
        }
    }

    fn gen_vector_accessors(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let receiver = self.receiver(struct_def);
        let name = self.function(field);
        let element = field.value.ty.vector_type();
        let stride = ctx.schema.inline_size(&element);

        if element.is_struct() {
            let target = self.struct_name(ctx, state, ctx.struct_of(&element));
            code.line(&format!("{receiver} {name}(obj *{target}, j int) bool {{"));
            code.indent();
            Self::offset_prefix(field, code);
            code.line("\tx := rcv._tab.Vector(o)");
            code.line(&format!("\tx += flatbuffers.UOffsetT(j) * {stride}"));
            if !ctx.schema.is_fixed_struct(&element) {
                code.line("\tx = rcv._tab.Indirect(x)");
            }
            code.line("\tobj.Init(rcv._tab.Bytes, x)");
            code.line("\treturn true");
            code.line("}");
            code.line("return false");
            code.dedent();
            code.line("}");

            let keyed = ctx.struct_of(&element);
            if !keyed.fixed
                && let Some(key) = keyed.key_field()
            {
                let key_type = self.native_type(ctx, state, &key.value.ty);
                code.blank();
                code.line(&format!("{receiver} {name}ByKey(obj *{target}, key {key_type}) bool {{"));
                code.indent();
                Self::offset_prefix(field, code);
                code.line("\tx := rcv._tab.Vector(o)");
                code.line("\treturn obj.LookupByKey(key, x, rcv._tab.Bytes)");
                code.line("}");
                code.line("return false");
                code.dedent();
                code.line("}");
            }
        } else if element.is_union() {
            code.line(&format!("{receiver} {name}(obj *flatbuffers.Table, j int) bool {{"));
            code.indent();
            Self::offset_prefix(field, code);
            code.line("\ta := rcv._tab.Vector(o)");
            code.line(&format!(
                "\trcv._tab.Union(obj, a+flatbuffers.UOffsetT(j*{stride})-rcv._tab.Pos)"
            ));
            code.line("\treturn true");
            code.line("}");
            code.line("return false");
            code.dedent();
            code.line("}");
        } else {
            let returns = self.type_get(ctx, state, &element);
            let read = format!("{}(a + flatbuffers.UOffsetT(j*{stride}))", self.getter(&element));
            let fallback = match element.base_type {
                BaseType::String => "nil",
                BaseType::Bool => "false",
                _ => "0",
            };
            code.line(&format!("{receiver} {name}(j int) {returns} {{"));
            code.indent();
            Self::offset_prefix(field, code);
            code.line("\ta := rcv._tab.Vector(o)");
            code.line(&format!("\treturn {}", self.cast_to_enum(ctx, state, &element, &read)));
            code.line("}");
            code.line(&format!("return {fallback}"));
            code.dedent();
            code.line("}");
        }

        code.blank();
        code.line(&format!("{receiver} {name}Length() int {{"));
        code.indent();
        Self::offset_prefix(field, code);
        code.line("\treturn rcv._tab.VectorLen(o)");
        code.line("}");
        code.line("return 0");
        code.dedent();
        code.line("}");

        if element.base_type == BaseType::UChar && Self::scalar_enum(ctx, &element).is_none() {
            code.blank();
            code.line(&format!("{receiver} {name}Bytes() []byte {{"));
            code.indent();
            Self::offset_prefix(field, code);
            code.line("\treturn rcv._tab.ByteVector(o + rcv._tab.Pos)");
            code.line("}");
            code.line("return nil");
            code.dedent();
            code.line("}");

            if let Some(nested) = field.nested_flatbuffer.map(|id| ctx.schema.struct_def(id)) {
                let target = self.struct_name(ctx, state, nested);
                let reader = self.qualify(
                    ctx,
                    state,
                    &nested.namespace,
                    format!("GetRootAs{}", self.namer.type_name(&nested.name)),
                );
                code.blank();
                code.line(&format!("{receiver} {name}NestedRoot() *{target} {{"));
                code.line(&format!("\tbuf := rcv.{name}Bytes()"));
                code.line("\tif buf == nil {");
                code.line("\t\treturn nil");
                code.line("\t}");
                code.line(&format!("\treturn {reader}(buf, 0)"));
                code.line("}");
            }
        }
    }

    fn gen_table_mutators(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        field: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let receiver = self.receiver(struct_def);
        let name = self.function(field);
        let ty = &field.value.ty;

        if ty.is_scalar() {
            let arg = self.type_get(ctx, state, ty);
            code.blank();
            code.line(&format!("{receiver} Mutate{name}(n {arg}) bool {{"));
            code.line(&format!(
                "\treturn rcv._tab.Mutate{}Slot({}, {})",
                self.method(ty),
                field.value.offset,
                Self::cast_to_base(ctx, ty, "n")
            ));
            code.line("}");
            return;
        }

        let element = ty.vector_type();
        if !ty.is_vector() || !element.is_scalar() {
            return;
        }
        let arg = self.type_get(ctx, state, &element);
        code.blank();
        code.line(&format!("{receiver} Mutate{name}(j int, n {arg}) bool {{"));
        code.indent();
        Self::offset_prefix(field, code);
        code.line("\ta := rcv._tab.Vector(o)");
        code.line(&format!(
            "\treturn rcv._tab.Mutate{}(a+flatbuffers.UOffsetT(j*{}), {})",
            self.method(&element),
            element.base_type.size(),
            Self::cast_to_base(ctx, &element, "n")
        ));
        code.line("}");
        code.line("return false");
        code.dedent();
        code.line("}");
    }

    fn gen_key_compare(&self, struct_def: &StructDef, key: &FieldDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let getter = self.function(key);
        code.line(&format!(
            "func {name}KeyCompare(o1, o2 flatbuffers.UOffsetT, buf []byte) bool {{"
        ));
        code.indent();
        code.line(&format!("obj1 := &{name}{{}}"));
        code.line(&format!("obj2 := &{name}{{}}"));
        code.line("obj1.Init(buf, flatbuffers.UOffsetT(len(buf))-o1)");
        code.line("obj2.Init(buf, flatbuffers.UOffsetT(len(buf))-o2)");
        if key.value.ty.is_string() {
            code.line(&format!("return string(obj1.{getter}()) < string(obj2.{getter}())"));
        } else {
            code.line(&format!("return obj1.{getter}() < obj2.{getter}()"));
        }
        code.dedent();
        code.line("}");
    }

    fn gen_lookup_by_key(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        key: &FieldDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.namer.type_name(&struct_def.name);
        let getter = self.function(key);
        let key_type = self.native_type(ctx, state, &key.value.ty);
        let by_string = key.value.ty.is_string();

        code.line(&format!(
            "{} LookupByKey(key {key_type}, vectorLocation flatbuffers.UOffsetT, buf []byte) bool {{",
            self.receiver(struct_def)
        ));
        code.indent();
        code.line("span := flatbuffers.GetUOffsetT(buf[vectorLocation-4:])");
        code.line("start := flatbuffers.UOffsetT(0)");
        if by_string {
            state.import(BYTES_IMPORT);
            code.line("bKey := []byte(key)");
        }
        code.line("for span != 0 {");
        code.indent();
        code.line("middle := span / 2");
        code.line("tableOffset := flatbuffers.GetIndirectOffset(buf, vectorLocation+4*(start+middle))");
        code.line(&format!("obj := &{name}{{}}"));
        code.line("obj.Init(buf, tableOffset)");
        if by_string {
            code.line(&format!("comp := bytes.Compare(obj.{getter}(), bKey)"));
        } else {
            code.line(&format!("val := obj.{getter}()"));
            code.line("comp := 0");
            code.line("if val > key {");
            code.line("\tcomp = 1");
            code.line("} else if val < key {");
            code.line("\tcomp = -1");
            code.line("}");
        }
        code.line("if comp > 0 {");
        code.line("\tspan = middle");
        code.line("} else if comp < 0 {");
        code.line("\tmiddle += 1");
        code.line("\tstart += middle");
        code.line("\tspan -= middle");
        code.line("} else {");
        code.line("\trcv.Init(buf, tableOffset)");
        code.line("\treturn true");
        code.line("}");
        code.dedent();
        code.line("}");
        code.line("return false");
        code.dedent();
        code.line("}");
    }

    pub(super) fn gen_table_builders(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.namer.type_name(&struct_def.name);
        code.blank();
        code.line(&format!("func {name}Start(builder *flatbuffers.Builder) {{"));
        code.line(&format!("\tbuilder.StartObject({})", struct_def.fields.len()));
        code.line("}");

        for field in struct_def.live_fields() {
            let ty = &field.value.ty;
            let function = self.function(field);
            let variable = self.namer.variable(&field.name);
            let slot = field.slot();
            code.blank();
            if ty.is_scalar() {
                let arg = self.type_get(ctx, state, ty);
                code.line(&format!(
                    "func {name}Add{function}(builder *flatbuffers.Builder, {variable} {arg}) {{"
                ));
                code.line(&format!(
                    "\tbuilder.Prepend{}Slot({slot}, {}, {})",
                    self.method(ty),
                    Self::cast_to_base(ctx, ty, &variable),
                    Self::constant(field)
                ));
            } else {
                let method = if ty.is_struct() && ctx.schema.is_fixed_struct(ty) {
                    "Struct"
                } else {
                    "UOffsetT"
                };
                code.line(&format!(
                    "func {name}Add{function}(builder *flatbuffers.Builder, {variable} flatbuffers.UOffsetT) {{"
                ));
                code.line(&format!(
                    "\tbuilder.Prepend{method}Slot({slot}, flatbuffers.UOffsetT({variable}), 0)"
                ));
            }
            code.line("}");

            if ty.is_vector() {
                let element = ty.vector_type();
                code.blank();
                code.line(&format!(
                    "func {name}Start{function}Vector(builder *flatbuffers.Builder, numElems int) flatbuffers.UOffsetT {{"
                ));
                code.line(&format!(
                    "\treturn builder.StartVector({}, numElems, {})",
                    ctx.schema.inline_size(&element),
                    ctx.schema.inline_alignment(&element)
                ));
                code.line("}");
            }
        }

        code.blank();
        code.line(&format!("func {name}End(builder *flatbuffers.Builder) flatbuffers.UOffsetT {{"));
        code.indent();
        code.line("o := builder.EndObject()");
        let required: Vec<&FieldDef> = struct_def.live_fields().filter(|f| f.required).collect();
        if !required.is_empty() {
            code.line("t := flatbuffers.Table{Bytes: builder.Bytes, Pos: flatbuffers.UOffsetT(len(builder.Bytes)) - o}");
            for field in required {
                code.line(&format!("if t.Offset({}) == 0 {{", field.value.offset));
                code.line(&format!(
                    "\tpanic(\"flatbuffers: missing required field '{}' in {}\")",
                    field.name, struct_def.name
                ));
                code.line("}");
            }
        }
        code.line("return o");
        code.dedent();
        code.line("}");

        if supports_single_call_create(ctx.schema, struct_def) {
            self.gen_single_call_create(ctx, struct_def, state, code);
        }
    }

    fn gen_single_call_create(
        &self,
        ctx: &GenContext<'_>,
        struct_def: &StructDef,
        state: &mut FileState,
        code: &mut CodeWriter,
    ) {
        let name = self.namer.type_name(&struct_def.name);
        let mut params = Vec::new();
        for field in struct_def.live_fields() {
            let ty = if field.value.ty.is_scalar() {
                self.type_get(ctx, state, &field.value.ty)
            } else {
                "flatbuffers.UOffsetT".to_string()
            };
            params.push(format!("{} {ty}", self.namer.variable(&field.name)));
        }
        let params = if params.is_empty() {
            String::new()
        } else {
            format!(", {}", params.join(", "))
        };

        code.blank();
        code.line(&format!(
            "func Create{name}(builder *flatbuffers.Builder{params}) flatbuffers.UOffsetT {{"
        ));
        code.indent();
        code.line(&format!("{name}Start(builder)"));
        for field in create_order(struct_def) {
            code.line(&format!(
                "{name}Add{}(builder, {})",
                self.function(field),
                self.namer.variable(&field.name)
            ));
        }
        code.line(&format!("return {name}End(builder)"));
        code.dedent();
        code.line("}");
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use crate::go::tests::render;
    use crate::options::GeneratorOptions;

    #[test]
    fn test_scalar_accessor_with_default() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.go");
        pretty_assertions::assert_eq!(
            monster.split("func (rcv *Monster) Hp()").nth(1).and_then(|s| s.split("\n\n").next()),
            Some(
                " int16 {\n\
                 \to := flatbuffers.UOffsetT(rcv._tab.Offset(8))\n\
                 \tif o != 0 {\n\
                 \t\treturn rcv._tab.GetInt16(o + rcv._tab.Pos)\n\
                 \t}\n\
                 \treturn 100\n\
                 }"
            )
        );
        assert!(monster.contains("\t\treturn Color(rcv._tab.GetByte(o + rcv._tab.Pos))\n\t}\n\treturn 8\n"));
        assert!(monster.contains("\t\treturn Race(rcv._tab.GetInt8(o + rcv._tab.Pos))\n\t}\n\treturn -1\n"));
        assert!(monster.contains("\treturn 3.5\n"));
        assert!(!monster.contains("Friendly"));
    }

    #[test]
    fn test_enum_accessor_fallback_scope() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.go");
        for (header, read, fallback) in [
            ("func (rcv *Monster) Color() Color {", "return Color(", "return 8"),
            ("func (rcv *Monster) Race() Race {", "return Race(", "return -1"),
            ("func (rcv *Monster) TestType() Any {", "return Any(", "return 0"),
        ] {
            let accessor = fixtures::block(monster, header);
            let lookup = fixtures::position(&accessor, "o := flatbuffers.UOffsetT(rcv._tab.Offset(");
            let check = fixtures::position(&accessor, "if o != 0 {");
            let read = fixtures::position(&accessor, read);
            assert!(lookup < check && check < read, "{header}");
            assert!(fixtures::indent_of(accessor[read]) > fixtures::indent_of(accessor[check]));

            let last = accessor[accessor.len() - 1];
            assert_eq!(last.trim(), fallback);
            assert_eq!(fixtures::indent_of(last), fixtures::indent_of(accessor[check]));
            assert_eq!(accessor[accessor.len() - 2].trim(), "}");
        }
    }

    #[test]
    fn test_package_import_precedes_use() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default().object_api(true));
        let any = fixtures::file(&files, "Example/Any.go");
        let import = any
            .find("\tMyGame__Example2 \"MyGame/Example2\"\n")
            .expect("missing package import");
        let first_use = any.find("MyGame__Example2.").expect("missing qualified use");
        assert!(import < first_use);
        assert!(any[..import].contains("import (\n"));
    }

    #[test]
    fn test_root_helpers() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.go");
        assert!(monster.contains("const MonsterIdentifier = \"MONS\"\n"));
        assert!(monster.contains("func GetRootAsMonster(buf []byte, offset flatbuffers.UOffsetT) *Monster {\n"));
        assert!(monster.contains("\tn := flatbuffers.GetUOffsetT(buf[offset+flatbuffers.SizeUint32:])\n"));
        assert!(monster.contains("\tbuilder.FinishSizePrefixedWithFileIdentifier(offset, identifierBytes)\n"));
        assert!(monster.contains("func MonsterBufferHasIdentifier(buf []byte) bool {\n"));
        let weapon = fixtures::file(&files, "Example2/Weapon.go");
        assert!(!weapon.contains("GetRootAs"));
    }

    #[test]
    fn test_vector_accessors() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.go");
        assert!(monster.contains("\t\treturn rcv._tab.GetByte(a + flatbuffers.UOffsetT(j*1))\n"));
        assert!(monster.contains("func (rcv *Monster) InventoryBytes() []byte {\n"));
        assert!(monster.contains("func (rcv *Monster) Test4(obj *Test, j int) bool {\n"));
        assert!(monster.contains("\t\tx += flatbuffers.UOffsetT(j) * 4\n\t\tobj.Init(rcv._tab.Bytes, x)\n"));
        assert!(monster.contains("\t\tx = rcv._tab.Indirect(x)\n"));
        assert!(monster.contains("func (rcv *Monster) Testarrayofstring(j int) []byte {\n"));
        assert!(monster.contains("func (rcv *Monster) WeaponsType(j int) Any {\n"));
        assert!(monster.contains("\t\trcv._tab.Union(obj, a+flatbuffers.UOffsetT(j*4)-rcv._tab.Pos)\n"));
        assert!(monster.contains("func (rcv *Monster) TestnestedflatbufferNestedRoot() *Monster {\n"));
        assert!(monster.contains("\treturn GetRootAsMonster(buf, 0)\n"));
        assert!(monster.contains("func (rcv *Monster) StatsByKey(obj *Stat, key uint16) bool {\n"));
    }

    #[test]
    fn test_key_lookup() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let stat = fixtures::file(&files, "Example/Stat.go");
        assert!(stat.contains("\treturn obj1.Count() < obj2.Count()\n"));
        assert!(stat.contains("func (rcv *Stat) LookupByKey(key uint16, vectorLocation flatbuffers.UOffsetT, buf []byte) bool {\n"));
        assert!(stat.contains("\t\tif val > key {\n\t\t\tcomp = 1\n"));
        assert!(!stat.contains("\"bytes\""));

        let monster = fixtures::file(&files, "Example/Monster.go");
        assert!(monster.contains("\treturn string(obj1.Name()) < string(obj2.Name())\n"));
        assert!(monster.contains("\t\tcomp := bytes.Compare(obj.Name(), bKey)\n"));
        assert!(monster.contains("import (\n\t\"bytes\"\n\tflatbuffers \"github.com/google/flatbuffers/go\"\n)\n"));
    }

    #[test]
    fn test_builders() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let monster = fixtures::file(&files, "Example/Monster.go");
        assert!(monster.contains("func MonsterStart(builder *flatbuffers.Builder) {\n\tbuilder.StartObject(20)\n}\n"));
        assert!(monster.contains("\tbuilder.PrependStructSlot(0, flatbuffers.UOffsetT(pos), 0)\n"));
        assert!(monster.contains("\tbuilder.PrependInt16Slot(2, hp, 100)\n"));
        assert!(monster.contains("\tbuilder.PrependByteSlot(6, byte(color), 8)\n"));
        assert!(monster.contains("\tbuilder.PrependUint8Slot(8, uint8(testType), 0)\n"));
        assert!(monster.contains(
            "func MonsterStartTest4Vector(builder *flatbuffers.Builder, numElems int) flatbuffers.UOffsetT {\n\treturn builder.StartVector(4, numElems, 2)\n}\n"
        ));
        assert!(monster.contains("\tif t.Offset(10) == 0 {\n\t\tpanic(\"flatbuffers: missing required field 'name' in Monster\")\n\t}\n"));
        assert!(!monster.contains("func CreateMonster("));
    }

    #[test]
    fn test_single_call_create() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default());
        let weapon = fixtures::file(&files, "Example2/Weapon.go");
        assert!(weapon.contains(
            "func CreateWeapon(builder *flatbuffers.Builder, damage int16, class flatbuffers.UOffsetT, range_ int32, end bool) flatbuffers.UOffsetT {\n\
             \tWeaponStart(builder)\n\
             \tWeaponAddRange(builder, range_)\n\
             \tWeaponAddClass(builder, class)\n\
             \tWeaponAddDamage(builder, damage)\n\
             \tWeaponAddEnd(builder, end)\n\
             \treturn WeaponEnd(builder)\n\
             }\n"
        ));
        assert!(weapon.contains("\tbuilder.PrependBoolSlot(3, end, true)\n"));
    }

    #[test]
    fn test_table_mutators() {
        let schema = fixtures::monster();
        let files = render(&schema, &GeneratorOptions::default().mutable_buffer(true));
        let monster = fixtures::file(&files, "Example/Monster.go");
        assert!(monster.contains("func (rcv *Monster) MutateHp(n int16) bool {\n\treturn rcv._tab.MutateInt16Slot(8, n)\n}\n"));
        assert!(monster.contains("func (rcv *Monster) MutateColor(n Color) bool {\n\treturn rcv._tab.MutateByteSlot(16, byte(n))\n}\n"));
        assert!(monster.contains("\t\treturn rcv._tab.MutateByte(a+flatbuffers.UOffsetT(j*1), n)\n"));
    }
}
