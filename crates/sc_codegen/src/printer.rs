use core::fmt::{self, Write};

use sc_model::{MemberAccess, OverrideKind};

use crate::{Accessor, AdapterExpr, CodecUnit, DispatchTable, FieldBinding, GenOptions};
use crate::{Generated, OverrideArg, ReadOp, TypeDescriptor, WriteOp};

// -----------------------------------------------------------------------------
// Printer

/// Renders codec units and the dispatch table as Rust-like source text.
///
/// The output is meant for inspection and for file emission by a caller,
/// it is not compiled by this crate.
pub struct Printer<'a> {
    options: &'a GenOptions,
}

impl<'a> Printer<'a> {
    #[inline]
    pub fn new(options: &'a GenOptions) -> Self {
        Self { options }
    }

    /// Renders every unit followed by the dispatch function.
    pub fn render(&self, generated: &Generated) -> String {
        struct Rendered<'p, 'g>(&'p Printer<'p>, &'g Generated);

        impl fmt::Display for Rendered<'_, '_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for unit in &self.1.units {
                    self.0.write_unit(f, unit)?;
                    f.write_char('\n')?;
                }
                self.0.write_dispatch(f, &self.1.dispatch)
            }
        }

        Rendered(self, generated).to_string()
    }

    /// Writes one codec unit: its struct, constructor, and procedures.
    pub fn write_unit(&self, out: &mut dyn Write, unit: &CodecUnit) -> fmt::Result {
        let name = self.codec_name(&unit.name);
        let ty = unit.spec.path();

        writeln!(out, "/// Codec of `{}`.", unit.spec)?;
        writeln!(out, "pub struct {name} {{")?;
        for adapter in &unit.adapters {
            writeln!(out, "    {}: Arc<dyn Codec>,", adapter.id)?;
        }
        writeln!(out, "}}\n")?;

        writeln!(out, "impl {name} {{")?;
        writeln!(
            out,
            "    pub fn new(registry: &CodecRegistry, type_args: &[RuntimeType]) -> Result<Self, CodecError> {{"
        )?;
        for adapter in &unit.adapters {
            write!(out, "        let {}: Arc<dyn Codec> = ", adapter.id)?;
            write_expr(out, &adapter.expr)?;
            writeln!(out, ";")?;
        }
        let ids: Vec<String> = unit.adapters.iter().map(|adapter| adapter.id.to_string()).collect();
        if ids.is_empty() {
            writeln!(out, "        Ok(Self {{}})")?;
        } else {
            writeln!(out, "        Ok(Self {{ {} }})", ids.join(", "))?;
        }
        writeln!(out, "    }}")?;
        writeln!(out, "}}\n")?;

        writeln!(out, "impl Codec for {name} {{")?;
        writeln!(out, "    fn read(&self, reader: &mut dyn JsonReader) -> Result<{ty}, CodecError> {{")?;
        for op in &unit.read {
            write_read_op(out, unit, op)?;
        }
        writeln!(out, "    }}\n")?;
        writeln!(
            out,
            "    fn write(&self, writer: &mut dyn JsonWriter, value: Option<&{ty}>) -> Result<(), CodecError> {{"
        )?;
        for op in &unit.write {
            write_write_op(out, unit, op)?;
        }
        writeln!(out, "    }}")?;
        writeln!(out, "}}")
    }

    /// Writes the dispatch function over every entry of `table`.
    pub fn write_dispatch(&self, out: &mut dyn Write, table: &DispatchTable) -> fmt::Result {
        writeln!(
            out,
            "pub fn dispatch(registry: &CodecRegistry, ty: &RuntimeType) -> Option<Result<Arc<dyn Codec>, CodecError>> {{"
        )?;
        writeln!(out, "    let RuntimeType::Parameterized {{ base, args }} = ty else {{ return None }};")?;
        writeln!(out, "    match base.type_path() {{")?;
        for entry in table.entries() {
            let name = self.codec_name(&entry.unit_name);
            if entry.arity == 0 {
                writeln!(
                    out,
                    "        \"{}\" => Some({name}::new(registry, &[]).map(|c| Arc::new(c) as _)),",
                    entry.path
                )?;
            } else {
                writeln!(
                    out,
                    "        \"{}\" => Some({name}::new(registry, &type_args(args, {})).map(|c| Arc::new(c) as _)),",
                    entry.path, entry.arity
                )?;
            }
        }
        writeln!(out, "        _ => None,")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")
    }

    fn codec_name(&self, unit_name: &str) -> String {
        format!("{unit_name}{}", self.options.codec_suffix)
    }
}

// -----------------------------------------------------------------------------
// Expressions

fn write_expr(out: &mut dyn Write, expr: &AdapterExpr) -> fmt::Result {
    match expr {
        AdapterExpr::Builtin(builtin) => write!(out, "builtin::{}.clone()", builtin.export_name()),
        AdapterExpr::Field(id) => write!(out, "{id}.clone()"),
        AdapterExpr::Array { elem, instantiator } => {
            write!(out, "ArrayCodec::new(")?;
            write_expr(out, elem)?;
            write!(out, ", |len| Vec::<{}>::with_capacity(len))", instantiator.elem_type)
        }
        AdapterExpr::List { shape_path, elem } => {
            write!(out, "ListCodec::<{shape_path}>::new(")?;
            write_expr(out, elem)?;
            write!(out, ")")
        }
        AdapterExpr::Map { shape_path, key, value } => {
            write!(out, "MapCodec::<{shape_path}>::new(")?;
            write_expr(out, key)?;
            write!(out, ", ")?;
            write_expr(out, value)?;
            write!(out, ")")
        }
        AdapterExpr::Lookup(desc) => {
            write!(out, "registry.codec(&")?;
            write_descriptor(out, desc)?;
            write!(out, ")?")
        }
        AdapterExpr::Override {
            codec,
            kind,
            args,
            target,
            null_safe,
        } => {
            if *null_safe {
                write!(out, "NullSafe::wrap(")?;
            }
            match kind {
                OverrideKind::Codec => {
                    write!(out, "Arc::new({codec}::new(")?;
                    for (index, arg) in args.iter().enumerate() {
                        if index > 0 {
                            write!(out, ", ")?;
                        }
                        match arg {
                            OverrideArg::Registry => write!(out, "registry")?,
                            OverrideArg::Factory(path) => write!(out, "{path}::new()")?,
                            OverrideArg::Codec(inner) => write_expr(out, inner)?,
                        }
                    }
                    write!(out, "))")?;
                }
                OverrideKind::Factory => {
                    write!(out, "{codec}::new().create(registry, &")?;
                    write_descriptor(out, target)?;
                    write!(out, ")?")?;
                }
                OverrideKind::Serializer | OverrideKind::Deserializer | OverrideKind::SerializerDeserializer => {
                    let (serializer, deserializer) = match kind {
                        OverrideKind::Serializer => ("Some(half.clone())", "None"),
                        OverrideKind::Deserializer => ("None", "Some(half.clone())"),
                        _ => ("Some(half.clone())", "Some(half.clone())"),
                    };
                    write!(out, "{{ let half = Arc::new({codec}::new()); Arc::new(SplitCodec::new({serializer}, {deserializer}, ")?;
                    match args.first() {
                        Some(OverrideArg::Codec(derived)) => write_expr(out, derived)?,
                        _ => {
                            write!(out, "registry.codec(&")?;
                            write_descriptor(out, target)?;
                            write!(out, ")?")?;
                        }
                    }
                    write!(out, ")) }}")?;
                }
            }
            if *null_safe {
                write!(out, ")")?;
            }
            Ok(())
        }
    }
}

fn write_descriptor(out: &mut dyn Write, desc: &TypeDescriptor) -> fmt::Result {
    match desc {
        TypeDescriptor::Leaf(kind) => write!(out, "RuntimeType::Leaf(LeafKind::{})", kind.fragment()),
        TypeDescriptor::Array(elem) => {
            write!(out, "RuntimeType::Array(Box::new(")?;
            write_descriptor(out, elem)?;
            write!(out, "))")
        }
        TypeDescriptor::Parameterized { base, args } => {
            write!(out, "RuntimeType::of(\"{base}\", [")?;
            for (index, arg) in args.iter().enumerate() {
                if index > 0 {
                    write!(out, ", ")?;
                }
                write_descriptor(out, arg)?;
            }
            write!(out, "])")
        }
        TypeDescriptor::TypeVarRef(index) => write!(out, "type_args[{index}].clone()"),
        TypeDescriptor::Object => write!(out, "RuntimeType::Object"),
    }
}

fn write_accessor(out: &mut dyn Write, accessor: Accessor) -> fmt::Result {
    match accessor {
        Accessor::Builtin(builtin) => write!(out, "builtin::{}", builtin.export_name()),
        Accessor::Field(id) => write!(out, "self.{id}"),
    }
}

// -----------------------------------------------------------------------------
// Procedures

fn get(field: &FieldBinding) -> String {
    match &field.access {
        MemberAccess::Direct => format!("value.{}", field.name),
        MemberAccess::Methods { getter, .. } => format!("value.{getter}()"),
    }
}

fn set(field: &FieldBinding, rhs: &str) -> String {
    match &field.access {
        MemberAccess::Direct => format!("value.{} = {rhs}", field.name),
        MemberAccess::Methods { setter, .. } => format!("value.{setter}({rhs})"),
    }
}

fn write_read_op(out: &mut dyn Write, unit: &CodecUnit, op: &ReadOp) -> fmt::Result {
    const IND: &str = "        ";
    match op {
        ReadOp::ReturnNullOnNullToken => writeln!(
            out,
            "{IND}if reader.peek()? == JsonToken::Null {{ reader.next_null()?; return Ok(None); }}"
        ),
        ReadOp::SkipNonObject => writeln!(
            out,
            "{IND}if reader.peek()? != JsonToken::BeginObject {{ reader.skip_value()?; return Ok(None); }}"
        ),
        ReadOp::BeginObject => writeln!(out, "{IND}reader.begin_object()?;"),
        ReadOp::NewInstance => writeln!(out, "{IND}let mut value = {}::default();", unit.spec.path()),
        ReadOp::ReadMembers(arms) => {
            writeln!(out, "{IND}while reader.has_next()? {{")?;
            writeln!(out, "{IND}    match reader.next_name()?.as_str() {{")?;
            for arm in arms {
                let Some(field) = unit.fields.get(arm.slot) else {
                    continue;
                };
                let names: Vec<_> = arm.names.iter().map(|n| format!("{n:?}")).collect();
                let mut read = String::new();
                write_accessor(&mut read, arm.accessor)?;
                if arm.primitive {
                    writeln!(
                        out,
                        "{IND}        {} => if let Some(v) = {read}.read(reader)? {{ {} }},",
                        names.join(" | "),
                        set(field, "v"),
                    )?;
                } else {
                    let rhs = format!("{read}.read(reader)?");
                    writeln!(out, "{IND}        {} => {},", names.join(" | "), set(field, &rhs))?;
                }
            }
            writeln!(out, "{IND}        _ => reader.skip_value()?,")?;
            writeln!(out, "{IND}    }}")?;
            writeln!(out, "{IND}}}")
        }
        ReadOp::EndObject => writeln!(out, "{IND}reader.end_object()?;"),
        ReadOp::RequireNonNull { slot, field } => match unit.fields.get(*slot) {
            Some(binding) => writeln!(
                out,
                "{IND}if {}.is_none() {{ return Err(CodecError::required({:?}, {field:?})); }}",
                get(binding),
                unit.spec.path().type_path(),
            ),
            None => Ok(()),
        },
        ReadOp::RequireAllNonNull(required) => {
            writeln!(out, "{IND}let mut missing = Vec::new();")?;
            for (slot, field) in required {
                if let Some(binding) = unit.fields.get(*slot) {
                    writeln!(out, "{IND}if {}.is_none() {{ missing.push({field:?}); }}", get(binding))?;
                }
            }
            writeln!(
                out,
                "{IND}if !missing.is_empty() {{ return Err(CodecError::all_required({:?}, missing)); }}",
                unit.spec.path().type_path(),
            )
        }
        ReadOp::ReturnInstance => writeln!(out, "{IND}Ok(Some(value))"),
    }
}

fn write_write_op(out: &mut dyn Write, unit: &CodecUnit, op: &WriteOp) -> fmt::Result {
    const IND: &str = "        ";
    match op {
        WriteOp::BeginObject => writeln!(out, "{IND}writer.begin_object()?;"),
        WriteOp::EndObjectIfNull => writeln!(
            out,
            "{IND}let Some(value) = value else {{ return writer.end_object(); }};"
        ),
        WriteOp::WriteAlways { name, slot, accessor } => {
            let Some(field) = unit.fields.get(*slot) else {
                return Ok(());
            };
            writeln!(out, "{IND}writer.name({name:?})?;")?;
            write!(out, "{IND}")?;
            write_accessor(out, *accessor)?;
            writeln!(out, ".write(writer, &{})?;", get(field))
        }
        WriteOp::WriteIfPresent {
            name,
            field,
            slot,
            accessor,
            required,
        } => {
            let Some(binding) = unit.fields.get(*slot) else {
                return Ok(());
            };
            writeln!(out, "{IND}if let Some(v) = &{} {{", get(binding))?;
            writeln!(out, "{IND}    writer.name({name:?})?;")?;
            write!(out, "{IND}    ")?;
            write_accessor(out, *accessor)?;
            writeln!(out, ".write(writer, v)?;")?;
            if *required {
                writeln!(
                    out,
                    "{IND}}} else {{ return Err(CodecError::required({:?}, {field:?})); }}",
                    unit.spec.path().type_path(),
                )
            } else {
                writeln!(out, "{IND}}}")
            }
        }
        WriteOp::EndObject => writeln!(out, "{IND}writer.end_object()"),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Printer;
    use crate::{GenOptions, generate};
    use sc_model::{FieldDescriptor, LeafKind, TypeDecl, TypeExpr, TypeModel};

    fn render(options: &GenOptions) -> String {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::User")
                    .with_field(FieldDescriptor::new("id", TypeExpr::primitive(LeafKind::I64)))
                    .with_field(
                        FieldDescriptor::new("name", TypeExpr::string())
                            .alias("userName")
                            .required()
                            .with_accessors("name", "set_name"),
                    )
                    .with_field(FieldDescriptor::new(
                        "friends",
                        TypeExpr::declared("std::vec::Vec", [TypeExpr::named("demo::User")]),
                    )),
            )
            .unwrap();
        let generated = generate(&model, options).into_result().unwrap();
        Printer::new(options).render(&generated)
    }

    #[test]
    fn renders_unit_and_dispatch() {
        let text = render(&GenOptions::default());

        assert!(text.contains("pub struct UserCodec {"));
        assert!(text.contains("    adapter_0: Arc<dyn Codec>,"));
        assert!(text.contains(
            "let adapter_0: Arc<dyn Codec> = registry.codec(&RuntimeType::of(\"demo::User\", []))?;"
        ));
        assert!(text.contains("let adapter_1: Arc<dyn Codec> = ListCodec::<std::vec::Vec>::new(adapter_0.clone());"));
        assert!(text.contains("Ok(Self { adapter_0, adapter_1 })"));
        assert!(text.contains("\"name\" | \"userName\" => value.set_name(builtin::STRING.read(reader)?),"));
        assert!(text.contains("if value.name().is_none() { return Err(CodecError::required(\"demo::User\", \"name\")); }"));
        assert!(text.contains("\"demo::User\" => Some(UserCodec::new(registry, &[])"));
    }

    #[test]
    fn suffix_comes_from_options() {
        let options = GenOptions {
            codec_suffix: String::from("Adapter"),
            ..GenOptions::default()
        };
        let text = render(&options);
        assert!(text.contains("pub struct UserAdapter {"));
        assert!(!text.contains("UserCodec"));
    }
}
