use std::sync::Arc;

use sc_codegen::{Accessor, AdapterExpr, CodecUnit, Generated, OverrideArg, ReadOp, RuntimeType, WriteOp};
use sc_model::{LeafKind, OverrideKind, TypePath};
use sc_stream::{JsonReader, JsonToken, JsonWriter};
use sc_utils::hash::HashMap;

use crate::builtin::builtin_codec;
use crate::registry::Deferred;
use crate::value::NULL;
use crate::{ArrayCodec, Codec, CodecError, CodecFactory, CodecRegistry, DynamicObject};
use crate::{ListCodec, MapCodec, NullSafe, OverrideValue, Value};

// -----------------------------------------------------------------------------
// UnitCodec

/// Executes the read and write procedures of one [`CodecUnit`].
///
/// Constructed with the type arguments of the requested type, which
/// resolve the unit's lookups.
pub struct UnitCodec {
    generated: Arc<Generated>,
    unit: usize,
    ty: RuntimeType,
    names: Arc<[String]>,
    // one codec per field slot
    accessors: Vec<Arc<dyn Codec>>,
    // read name -> (slot, primitive)
    members: HashMap<String, (usize, bool)>,
}

impl UnitCodec {
    /// Instantiates every adapter field of the unit with `args`.
    pub fn new(
        registry: &CodecRegistry,
        generated: Arc<Generated>,
        unit: usize,
        args: &[RuntimeType],
    ) -> Result<Self, CodecError> {
        let Some(codec_unit) = generated.units.get(unit) else {
            return Err(CodecError::NoCodec(RuntimeType::Object));
        };

        let ty = RuntimeType::of(codec_unit.path().clone(), args.iter().cloned());
        let mut built = Instantiator {
            registry,
            args,
            adapters: Vec::with_capacity(codec_unit.adapters.len()),
        };
        for adapter in &codec_unit.adapters {
            let codec = built.instantiate(&adapter.expr)?;
            built.adapters.push(codec);
        }
        let adapters = built.adapters;

        let accessors = codec_unit
            .fields
            .iter()
            .map(|field| match field.accessor {
                Accessor::Builtin(builtin) => Ok(builtin_codec(builtin)),
                Accessor::Field(id) => adapters
                    .get(id.0)
                    .cloned()
                    .ok_or_else(|| CodecError::NoCodec(ty.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut members = HashMap::default();
        for op in &codec_unit.read {
            if let ReadOp::ReadMembers(arms) = op {
                for arm in arms {
                    for name in &arm.names {
                        members.insert(name.clone(), (arm.slot, arm.primitive));
                    }
                }
            }
        }

        let names = codec_unit.fields.iter().map(|f| f.name.clone()).collect();

        Ok(Self {
            generated,
            unit,
            ty,
            names,
            accessors,
            members,
        })
    }

    #[inline]
    fn unit(&self) -> &CodecUnit {
        &self.generated.units[self.unit]
    }

    #[inline]
    fn path(&self) -> &TypePath {
        self.unit().path()
    }

    /// A default-constructed instance: zeroed primitives, null references.
    pub fn new_instance(&self) -> DynamicObject {
        let fields = self
            .unit()
            .fields
            .iter()
            .map(|field| match field.primitive() {
                Some(LeafKind::Bool) => Value::Bool(false),
                Some(LeafKind::F32 | LeafKind::F64) => Value::Float(0.0),
                Some(LeafKind::Char) => Value::Char('\0'),
                Some(_) => Value::Int(0),
                None => Value::Null,
            })
            .collect();
        DynamicObject::from_parts(self.ty.clone(), self.names.clone(), fields)
    }

    fn read_members(&self, reader: &mut dyn JsonReader, instance: &mut DynamicObject) -> Result<(), CodecError> {
        while reader.has_next()? {
            let name = reader.next_name()?;
            let Some(&(slot, primitive)) = self.members.get(&name) else {
                reader.skip_value()?;
                continue;
            };
            if primitive && reader.peek()? == JsonToken::Null {
                reader.next_null()?;
                continue;
            }
            let value = self.accessors[slot].read(reader)?;
            if let Some(target) = instance.slot_mut(slot) {
                *target = value;
            }
        }
        Ok(())
    }
}

impl Codec for UnitCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        let mut instance = None;
        for op in &self.unit().read {
            match op {
                ReadOp::ReturnNullOnNullToken => {
                    if reader.peek()? == JsonToken::Null {
                        reader.next_null()?;
                        return Ok(Value::Null);
                    }
                }
                ReadOp::SkipNonObject => {
                    if reader.peek()? != JsonToken::BeginObject {
                        reader.skip_value()?;
                        return Ok(Value::Null);
                    }
                }
                ReadOp::BeginObject => reader.begin_object()?,
                ReadOp::NewInstance => instance = Some(self.new_instance()),
                ReadOp::ReadMembers(_) => {
                    let instance = instance.get_or_insert_with(|| self.new_instance());
                    self.read_members(reader, instance)?;
                }
                ReadOp::EndObject => reader.end_object()?,
                ReadOp::RequireNonNull { slot, field } => {
                    if instance.as_ref().is_some_and(|obj| obj.slot(*slot).is_null()) {
                        return Err(CodecError::RequiredFieldNull {
                            ty: self.path().clone(),
                            field: field.clone(),
                        });
                    }
                }
                ReadOp::RequireAllNonNull(required) => {
                    let missing: Vec<String> = required
                        .iter()
                        .filter(|(slot, _)| instance.as_ref().is_some_and(|obj| obj.slot(*slot).is_null()))
                        .map(|(_, field)| field.clone())
                        .collect();
                    if !missing.is_empty() {
                        return Err(CodecError::RequiredFieldsNull {
                            ty: self.path().clone(),
                            fields: missing,
                        });
                    }
                }
                ReadOp::ReturnInstance => break,
            }
        }
        Ok(instance.map_or(Value::Null, Value::Object))
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        let instance = match value {
            Value::Null => None,
            Value::Object(obj) if obj.ty().base() == Some(self.path()) => Some(Fields::new(obj, &self.names)),
            Value::Object(obj) => return Err(CodecError::mismatch(self.path().to_string(), obj.ty().to_string())),
            other => return Err(CodecError::mismatch(self.path().to_string(), other.kind())),
        };

        for op in &self.unit().write {
            match op {
                WriteOp::BeginObject => writer.begin_object()?,
                WriteOp::EndObjectIfNull => {
                    if instance.is_none() {
                        return Ok(writer.end_object()?);
                    }
                }
                WriteOp::WriteAlways { name, slot, .. } => {
                    let Some(fields) = &instance else { continue };
                    writer.name(name)?;
                    self.accessors[*slot].write(writer, fields.get(*slot))?;
                }
                WriteOp::WriteIfPresent {
                    name,
                    field,
                    slot,
                    required,
                    ..
                } => {
                    let Some(fields) = &instance else { continue };
                    let value = fields.get(*slot);
                    if !value.is_null() {
                        writer.name(name)?;
                        self.accessors[*slot].write(writer, value)?;
                    } else if *required {
                        return Err(CodecError::RequiredFieldNull {
                            ty: self.path().clone(),
                            field: field.clone(),
                        });
                    }
                }
                WriteOp::EndObject => writer.end_object()?,
            }
        }
        Ok(())
    }
}

/// The fields of an object being written, by unit slot.
///
/// Objects built for the unit share its slot layout. Objects built by hand
/// may list their fields in any order and are read by name.
struct Fields<'a> {
    obj: &'a DynamicObject,
    names: Option<&'a [String]>,
}

impl<'a> Fields<'a> {
    fn new(obj: &'a DynamicObject, names: &'a [String]) -> Self {
        let names = (obj.field_names() != names).then_some(names);
        Self { obj, names }
    }

    fn get(&self, slot: usize) -> &'a Value {
        match self.names {
            None => self.obj.slot(slot),
            Some(names) => names
                .get(slot)
                .and_then(|name| self.obj.get(name))
                .unwrap_or(NULL),
        }
    }
}

// -----------------------------------------------------------------------------
// Adapter instantiation

/// Builds the adapter fields of a unit in order; later adapters may refer to
/// earlier ones.
struct Instantiator<'a> {
    registry: &'a CodecRegistry,
    args: &'a [RuntimeType],
    adapters: Vec<Arc<dyn Codec>>,
}

impl Instantiator<'_> {
    fn instantiate(&self, expr: &AdapterExpr) -> Result<Arc<dyn Codec>, CodecError> {
        let registry = self.registry;
        Ok(match expr {
            AdapterExpr::Builtin(builtin) => builtin_codec(*builtin),
            AdapterExpr::Field(id) => match self.adapters.get(id.0) {
                Some(codec) => codec.clone(),
                None => return Err(CodecError::NoCodec(RuntimeType::Object)),
            },
            AdapterExpr::Array { elem, instantiator } => Arc::new(ArrayCodec::new(
                self.instantiate(elem)?,
                instantiator.elem_type.clone(),
            )),
            AdapterExpr::List { shape_path, elem } => {
                Arc::new(ListCodec::new(shape_path.clone(), self.instantiate(elem)?))
            }
            AdapterExpr::Map { shape_path, key, value } => Arc::new(MapCodec::new(
                shape_path.clone(),
                self.instantiate(key)?,
                self.instantiate(value)?,
            )),
            AdapterExpr::Lookup(desc) => {
                // a miss only fails the values that reach it
                let ty = desc.substitute(self.args);
                match registry.codec(&ty) {
                    Err(CodecError::NoCodec(_)) => Arc::new(Deferred::new(registry, ty)) as Arc<dyn Codec>,
                    found => found?,
                }
            }
            AdapterExpr::Override {
                codec,
                kind,
                args,
                target,
                null_safe,
            } => {
                let instance = match kind {
                    OverrideKind::Codec => {
                        let values = args
                            .iter()
                            .map(|arg| -> Result<OverrideValue, CodecError> {
                                Ok(match arg {
                                    OverrideArg::Registry => OverrideValue::Registry,
                                    OverrideArg::Factory(path) => OverrideValue::Factory(registry.override_factory(path)?),
                                    OverrideArg::Codec(inner) => OverrideValue::Codec(self.instantiate(inner)?),
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        registry.override_codec(codec, &values)?
                    }
                    OverrideKind::Factory => {
                        let target = target.substitute(self.args);
                        registry
                            .override_factory(codec)?
                            .create(registry, &target)?
                            .ok_or(CodecError::NoCodec(target))?
                    }
                    OverrideKind::Serializer | OverrideKind::Deserializer | OverrideKind::SerializerDeserializer => {
                        let delegate = match args.as_slice() {
                            [OverrideArg::Codec(derived)] => self.instantiate(derived)?,
                            _ => registry.codec(&target.substitute(self.args))?,
                        };
                        registry.override_split(codec, *kind, delegate)?
                    }
                };
                if *null_safe { NullSafe::wrap(instance) } else { instance }
            }
        })
    }
}

// -----------------------------------------------------------------------------
// GeneratedFactory

/// Serves the units of a generation run through its dispatch table.
pub(crate) struct GeneratedFactory {
    generated: Arc<Generated>,
}

impl GeneratedFactory {
    #[inline]
    pub(crate) fn new(generated: Arc<Generated>) -> Self {
        Self { generated }
    }
}

impl CodecFactory for GeneratedFactory {
    fn create(&self, registry: &CodecRegistry, ty: &RuntimeType) -> Result<Option<Arc<dyn Codec>>, CodecError> {
        let Some(hit) = self.generated.dispatch.lookup(ty) else {
            return Ok(None);
        };
        let codec = UnitCodec::new(registry, self.generated.clone(), hit.entry.unit, &hit.args)?;
        Ok(Some(Arc::new(codec)))
    }
}

// -----------------------------------------------------------------------------
// Tests
