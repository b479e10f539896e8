//! Table accessors, builder methods and key lookup.

use ironfbs_schema::{BaseType, FieldDef, StructDef, Type};

use super::CSharpGenerator;
use crate::language::GenContext;
use crate::plan::{create_order, supports_single_call_create};
use crate::writer::CodeWriter;

impl CSharpGenerator {
    pub(super) fn gen_table_decl(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        self.gen_object_header(struct_def, code);
        let is_root = ctx.schema.is_root(struct_def);
        if is_root || ctx.schema.is_nested_root(struct_def) {
            self.gen_root_accessors(ctx, struct_def, is_root, code);
        }
        self.gen_init_assign(struct_def, code);
        code.blank();

        for field in struct_def.live_fields() {
            Self::doc(code, &field.doc_comment);
            self.gen_table_field(ctx, struct_def, field, code);
        }
        code.blank();

        if supports_single_call_create(ctx.schema, struct_def) {
            self.gen_create(ctx, struct_def, code);
        }
        self.gen_builder_methods(ctx, struct_def, code);
        if is_root {
            self.gen_finish(ctx, struct_def, code);
        }
        if let Some(key) = struct_def.key_field() {
            code.blank();
            self.gen_sorted_vector(struct_def, key, code);
            code.blank();
            self.gen_lookup_by_key(ctx, struct_def, key, code);
        }
        code.dedent();
        code.line("};");
    }

    fn gen_root_accessors(&self, ctx: &GenContext<'_>, struct_def: &StructDef, is_root: bool, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        code.line(&format!(
            "public static {name} GetRootAs{name}(ByteBuffer _bb) {{ return GetRootAs{name}(_bb, new {name}()); }}"
        ));
        code.line(&format!(
            "public static {name} GetRootAs{name}(ByteBuffer _bb, {name} obj) {{ return (obj.__assign(_bb.GetInt(_bb.Position) + _bb.Position, _bb)); }}"
        ));
        if is_root && let Some(identifier) = &ctx.schema.file_identifier {
            code.line(&format!(
                "public static bool {name}BufferHasIdentifier(ByteBuffer _bb) {{ return Table.__has_identifier(_bb, \"{identifier}\"); }}"
            ));
        }
    }

    fn offset_prefix(field: &FieldDef) -> String {
        format!("int o = __p.__offset({}); return o != 0 ? ", field.value.offset)
    }

    fn gen_table_field(&self, ctx: &GenContext<'_>, struct_def: &StructDef, field: &FieldDef, code: &mut CodeWriter) {
        let member = self.member(struct_def, field);
        let variable = self.namer.variable(&field.name);
        let ty = &field.value.ty;
        let prefix = Self::offset_prefix(field);
        let slot = field.value.offset;

        if ty.is_scalar() {
            let returns = self.type_get(ctx, ty);
            let read = self.cast_to_enum(ctx, ty, &Self::read_scalar(ty, "o + __p.bb_pos"));
            code.line(&format!(
                "public {returns} {member} {{ get {{ {prefix}{read} : {}; }} }}",
                self.default_value(ctx, field)
            ));
            if ctx.options.mutable_buffer {
                let value = Self::cast_to_base(ctx, ty, &variable);
                code.line(&format!(
                    "public bool Mutate{member}({returns} {variable}) {{ int o = __p.__offset({slot}); if (o != 0) {{ {}; return true; }} else {{ return false; }} }}",
                    Self::write_scalar(ty, "o + __p.bb_pos", &value)
                ));
            }
            return;
        }

        match ty.base_type {
            BaseType::Struct => {
                let target = self.struct_name(ctx.struct_of(ty));
                let position = if ctx.schema.is_fixed_struct(ty) {
                    "o + __p.bb_pos"
                } else {
                    "__p.__indirect(o + __p.bb_pos)"
                };
                code.line(&format!(
                    "public {target}? {member} {{ get {{ {prefix}({target}?)(new {target}()).__assign({position}, __p.bb) : null; }} }}"
                ));
            }
            BaseType::String => {
                code.line(&format!(
                    "public string {member} {{ get {{ {prefix}__p.__string(o + __p.bb_pos) : null; }} }}"
                ));
                self.gen_byte_segments(&member, slot, &Type::new(BaseType::UChar), code);
            }
            BaseType::Union => {
                code.line(&format!(
                    "public TTable? {member}<TTable>() where TTable : struct, IFlatbufferObject {{ {prefix}(TTable?)__p.__union<TTable>(o + __p.bb_pos) : null; }}"
                ));
                let enum_def = ctx.enum_of(ty);
                for val in enum_def.vals.iter().filter(|v| !v.is_zero()) {
                    let variant = self.namer.type_name(&val.name);
                    if val.union_type.is_string() {
                        code.line(&format!(
                            "public string {member}As{variant}() {{ {prefix}__p.__union_string(o + __p.bb_pos) : null; }}"
                        ));
                    } else {
                        let target = self.struct_name(ctx.struct_of(&val.union_type));
                        code.line(&format!(
                            "public {target} {member}As{variant}() {{ return {member}<{target}>().Value; }}"
                        ));
                    }
                }
            }
            BaseType::Vector => self.gen_vector_field(ctx, field, &member, &variable, code),
            _ => {}
        }
    }

    fn gen_vector_field(
        &self,
        ctx: &GenContext<'_>,
        field: &FieldDef,
        member: &str,
        variable: &str,
        code: &mut CodeWriter,
    ) {
        let element = field.value.ty.vector_type();
        let stride = ctx.schema.inline_size(&element);
        let prefix = Self::offset_prefix(field);
        let slot = field.value.offset;
        let index = format!("__p.__vector(o) + j * {stride}");

        match element.base_type {
            BaseType::Struct => {
                let target = self.struct_name(ctx.struct_of(&element));
                let position = if ctx.schema.is_fixed_struct(&element) {
                    index.clone()
                } else {
                    format!("__p.__indirect({index})")
                };
                code.line(&format!(
                    "public {target}? {member}(int j) {{ {prefix}({target}?)(new {target}()).__assign({position}, __p.bb) : null; }}"
                ));
            }
            BaseType::String => {
                code.line(&format!(
                    "public string {member}(int j) {{ {prefix}__p.__string({index}) : null; }}"
                ));
            }
            BaseType::Union => {
                code.line(&format!(
                    "public TTable? {member}<TTable>(int j) where TTable : struct, IFlatbufferObject {{ {prefix}(TTable?)__p.__union<TTable>({index}) : null; }}"
                ));
            }
            _ => {
                let returns = self.type_get(ctx, &element);
                let read = self.cast_to_enum(ctx, &element, &Self::read_scalar(&element, &index));
                let fallback = match element.base_type {
                    BaseType::Bool => "false".to_string(),
                    _ => format!("({returns})0"),
                };
                code.line(&format!("public {returns} {member}(int j) {{ {prefix}{read} : {fallback}; }}"));
            }
        }
        code.line(&format!(
            "public int {member}Length {{ get {{ {prefix}__p.__vector_len(o) : 0; }} }}"
        ));

        if element.is_scalar() && element.base_type != BaseType::Bool && Self::scalar_enum(ctx, &element).is_none() {
            self.gen_byte_segments(member, slot, &element, code);
        }
        if let Some(nested) = field.nested_flatbuffer.map(|id| ctx.schema.struct_def(id)) {
            let target = self.struct_name(nested);
            code.line(&format!(
                "public {target}? Get{member}As{}() {{ {prefix}({target}?)(new {target}()).__assign(__p.__indirect(__p.__vector(o)), __p.bb) : null; }}",
                self.namer.type_name(&nested.name)
            ));
        }
        if element.is_struct() {
            let keyed = ctx.struct_of(&element);
            if !keyed.fixed
                && let Some(key) = keyed.key_field()
            {
                let target = self.struct_name(keyed);
                code.line(&format!(
                    "public {target}? {member}ByKey({} key) {{ {prefix}{target}.__lookup_by_key(__p.__vector(o), key, __p.bb) : null; }}",
                    self.type_get(ctx, &key.value.ty)
                ));
            }
        }
        if ctx.options.mutable_buffer && element.is_scalar() {
            let arg = self.type_get(ctx, &element);
            let value = Self::cast_to_base(ctx, &element, variable);
            code.line(&format!(
                "public bool Mutate{member}(int j, {arg} {variable}) {{ int o = __p.__offset({slot}); if (o != 0) {{ {}; return true; }} else {{ return false; }} }}",
                Self::write_scalar(&element, &format!("__p.__vector(o) + j * {}", element.base_type.size()), &value)
            ));
        }
    }

    /// Raw access to string and scalar vector storage.
    fn gen_byte_segments(&self, member: &str, slot: u16, element: &Type, code: &mut CodeWriter) {
        let basic = Self::basic(element);
        let size = element.base_type.size();
        code.line("#if ENABLE_SPAN_T");
        code.line(&format!(
            "public Span<{basic}> Get{member}Bytes() {{ return __p.__vector_as_span<{basic}>({slot}, {size}); }}"
        ));
        code.line("#else");
        code.line(&format!(
            "public ArraySegment<byte>? Get{member}Bytes() {{ return __p.__vector_as_arraysegment({slot}); }}"
        ));
        code.line("#endif");
        code.line(&format!(
            "public {basic}[] Get{member}Array() {{ return __p.__vector_as_array<{basic}>({slot}); }}"
        ));
    }

    /// Parameter type of a field in `Add*` and `Create*`.
    fn builder_arg(&self, ctx: &GenContext<'_>, ty: &Type) -> String {
        match ty.base_type {
            _ if ty.is_scalar() => self.type_get(ctx, ty),
            BaseType::String => "StringOffset".to_string(),
            BaseType::Vector => "VectorOffset".to_string(),
            BaseType::Union => "int".to_string(),
            _ => format!("Offset<{}>", self.struct_name(ctx.struct_of(ty))),
        }
    }

    fn builder_variable(&self, field: &FieldDef) -> String {
        let variable = self.namer.variable(&field.name);
        if field.value.ty.is_scalar() {
            variable
        } else {
            format!("{variable}Offset")
        }
    }

    /// Default of a scalar as passed to `builder.Add*`.
    fn add_default(field: &FieldDef) -> String {
        let constant = &field.value.constant;
        match field.value.ty.base_type {
            BaseType::Bool => if constant == "0" { "false" } else { "true" }.to_string(),
            BaseType::Float => format!("{constant}f"),
            _ => constant.clone(),
        }
    }

    fn gen_create(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let qualified = self.struct_name(struct_def);
        let fields: Vec<&FieldDef> = struct_def.live_fields().collect();
        if fields.is_empty() {
            code.line(&format!(
                "public static Offset<{qualified}> Create{name}(FlatBufferBuilder builder) {{"
            ));
        } else {
            code.line(&format!(
                "public static Offset<{qualified}> Create{name}(FlatBufferBuilder builder,"
            ));
            for (i, field) in fields.iter().enumerate() {
                let ty = &field.value.ty;
                let arg = self.builder_arg(ctx, ty);
                let default = if ty.is_scalar() {
                    self.default_value(ctx, field)
                } else if ty.is_union() {
                    "0".to_string()
                } else {
                    format!("default({arg})")
                };
                let end = if i + 1 == fields.len() { ") {" } else { "," };
                code.line(&format!("    {arg} {} = {default}{end}", self.builder_variable(field)));
            }
        }
        code.indent();
        code.line(&format!("builder.StartTable({});", struct_def.fields.len()));
        for field in create_order(struct_def) {
            code.line(&format!(
                "{name}.Add{}(builder, {});",
                self.member(struct_def, field),
                self.builder_variable(field)
            ));
        }
        code.line(&format!("return {name}.End{name}(builder);"));
        code.dedent();
        code.line("}");
        code.blank();
    }

    fn gen_builder_methods(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let qualified = self.struct_name(struct_def);
        code.line(&format!(
            "public static void Start{name}(FlatBufferBuilder builder) {{ builder.StartTable({}); }}",
            struct_def.fields.len()
        ));
        for field in struct_def.live_fields() {
            let ty = &field.value.ty;
            let member = self.member(struct_def, field);
            let arg = self.builder_arg(ctx, ty);
            let variable = self.builder_variable(field);
            let slot = field.slot();
            let body = if ty.is_scalar() {
                format!(
                    "builder.Add{}({slot}, {}, {});",
                    Self::suffix(ty),
                    Self::cast_to_base(ctx, ty, &variable),
                    Self::add_default(field)
                )
            } else if ty.is_union() {
                format!("builder.AddOffset({slot}, {variable}, 0);")
            } else if ty.is_struct() && ctx.schema.is_fixed_struct(ty) {
                format!("builder.AddStruct({slot}, {variable}.Value, 0);")
            } else {
                format!("builder.AddOffset({slot}, {variable}.Value, 0);")
            };
            code.line(&format!(
                "public static void Add{member}(FlatBufferBuilder builder, {arg} {variable}) {{ {body} }}"
            ));
            if ty.is_vector() {
                self.gen_vector_builders(ctx, &member, &ty.vector_type(), code);
            }
        }

        code.line(&format!("public static Offset<{qualified}> End{name}(FlatBufferBuilder builder) {{"));
        code.indent();
        code.line("int o = builder.EndTable();");
        for field in struct_def.live_fields().filter(|f| f.required) {
            code.line(&format!("builder.Required(o, {});  // {}", field.value.offset, field.name));
        }
        code.line(&format!("return new Offset<{qualified}>(o);"));
        code.dedent();
        code.line("}");
    }

    fn gen_vector_builders(&self, ctx: &GenContext<'_>, member: &str, element: &Type, code: &mut CodeWriter) {
        let size = ctx.schema.inline_size(element);
        let align = ctx.schema.inline_alignment(element);
        let start = format!("builder.StartVector({size}, data.Length, {align});");
        let data = match element.base_type {
            _ if element.is_scalar() => Some((
                format!("{}[]", self.type_get(ctx, element)),
                format!("builder.Add{}({})", Self::suffix(element), Self::cast_to_base(ctx, element, "data[i]")),
            )),
            BaseType::String => Some(("StringOffset[]".to_string(), "builder.AddOffset(data[i].Value)".to_string())),
            BaseType::Union => Some(("int[]".to_string(), "builder.AddOffset(data[i])".to_string())),
            BaseType::Struct if !ctx.schema.is_fixed_struct(element) => Some((
                format!("Offset<{}>[]", self.struct_name(ctx.struct_of(element))),
                "builder.AddOffset(data[i].Value)".to_string(),
            )),
            _ => None,
        };
        if let Some((array, add)) = data {
            code.line(&format!(
                "public static VectorOffset Create{member}Vector(FlatBufferBuilder builder, {array} data) {{ {start} for (int i = data.Length - 1; i >= 0; i--) {add}; return builder.EndVector(); }}"
            ));
            if element.is_scalar() && Self::scalar_enum(ctx, element).is_none() {
                code.line(&format!(
                    "public static VectorOffset Create{member}VectorBlock(FlatBufferBuilder builder, {array} data) {{ {start} builder.Add(data); return builder.EndVector(); }}"
                ));
            }
        }
        code.line(&format!(
            "public static void Start{member}Vector(FlatBufferBuilder builder, int numElems) {{ builder.StartVector({size}, numElems, {align}); }}"
        ));
    }

    fn gen_finish(&self, ctx: &GenContext<'_>, struct_def: &StructDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let qualified = self.struct_name(struct_def);
        let identifier = ctx
            .schema
            .file_identifier
            .as_ref()
            .map(|id| format!(", \"{id}\""))
            .unwrap_or_default();
        for prefix in ["", "SizePrefixed"] {
            code.line(&format!(
                "public static void Finish{prefix}{name}Buffer(FlatBufferBuilder builder, Offset<{qualified}> offset) {{ builder.Finish{prefix}(offset.Value{identifier}); }}"
            ));
        }
    }

    fn gen_sorted_vector(&self, struct_def: &StructDef, key: &FieldDef, code: &mut CodeWriter) {
        let name = self.namer.type_name(&struct_def.name);
        let qualified = self.struct_name(struct_def);
        code.line(&format!(
            "public static VectorOffset CreateSortedVectorOf{name}(FlatBufferBuilder builder, Offset<{qualified}>[] offsets) {{"
        ));
        code.indent();
        code.line("Array.Sort(offsets,");
        if key.value.ty.is_string() {
            let slot = key.value.offset;
            code.line(&format!(
                "  (Offset<{qualified}> o1, Offset<{qualified}> o2) => Table.CompareStrings(Table.__offset({slot}, o1.Value, builder.DataBuffer), Table.__offset({slot}, o2.Value, builder.DataBuffer), builder.DataBuffer));"
            ));
        } else {
            let member = self.member(struct_def, key);
            let read = |o: &str| {
                format!("new {qualified}().__assign(builder.DataBuffer.Length - {o}.Value, builder.DataBuffer).{member}")
            };
            code.line(&format!(
                "  (Offset<{qualified}> o1, Offset<{qualified}> o2) => {}.CompareTo({}));",
                read("o1"),
                read("o2")
            ));
        }
        code.line("return builder.CreateVectorOfTables(offsets);");
        code.dedent();
        code.line("}");
    }

    fn gen_lookup_by_key(&self, ctx: &GenContext<'_>, struct_def: &StructDef, key: &FieldDef, code: &mut CodeWriter) {
        let qualified = self.struct_name(struct_def);
        let by_string = key.value.ty.is_string();
        code.line(&format!(
            "public static {qualified}? __lookup_by_key(int vectorLocation, {} key, ByteBuffer bb) {{",
            self.type_get(ctx, &key.value.ty)
        ));
        code.indent();
        code.line(&format!("{qualified} obj_ = new {qualified}();"));
        if by_string {
            code.line("byte[] byteKey = System.Text.Encoding.UTF8.GetBytes(key);");
        }
        code.line("int span = bb.GetInt(vectorLocation - 4);");
        code.line("int start = 0;");
        code.line("while (span != 0) {");
        code.indent();
        code.line("int middle = span / 2;");
        code.line("int tableOffset = Table.__indirect(vectorLocation + 4 * (start + middle), bb);");
        code.line("obj_.__assign(tableOffset, bb);");
        if by_string {
            code.line(&format!(
                "int comp = Table.CompareStrings(Table.__offset({}, bb.Length - tableOffset, bb), byteKey, bb);",
                key.value.offset
            ));
        } else {
            code.line(&format!("int comp = obj_.{}.CompareTo(key);", self.member(struct_def, key)));
        }
        code.line("if (comp > 0) {");
        code.line("  span = middle;");
        code.line("} else if (comp < 0) {");
        code.line("  middle++;");
        code.line("  start += middle;");
        code.line("  span -= middle;");
        code.line("} else {");
        code.line("  return obj_;");
        code.line("}");
        code.dedent();
        code.line("}");
        code.line("return null;");
        code.dedent();
        code.line("}");
    }
}
