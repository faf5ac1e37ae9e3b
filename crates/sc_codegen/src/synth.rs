use log::trace;
use sc_model::{CtorParam, FieldDescriptor, OverrideKind, OverrideRef, TypeExpr, TypePath};
use sc_utils::hash::HashMap;

use crate::procedure::{read_procedure, write_procedure};
use crate::{Accessor, AdapterExpr, AdapterField, AdapterId, AdapterKey, ArrayInstantiator};
use crate::{BuiltinRegistry, CodecNames, CodecUnit, ContainerShape, FieldBinding, GenError};
use crate::{GenOptions, GraphNode, OverrideArg, TypeDescriptor};

// -----------------------------------------------------------------------------
// Synthesizer

/// Turns graph nodes into [`CodecUnit`]s.
///
/// Every field accessor is resolved by the first matching policy:
///
/// 1. a declared override, validated and owned by the field;
/// 2. a builtin leaf codec;
/// 3. a native array, through the primitive array builtin when the element
///    is a primitive;
/// 4. a list or map container, encoded structurally;
/// 5. anything else, including type variables, through a registry lookup
///    of its [`TypeDescriptor`].
///
/// Non-builtin accessors become adapter fields, shared by every occurrence
/// of the same type, including the elements of containers and arrays and
/// the delegates of overrides.
pub struct Synthesizer<'a> {
    builtins: &'static BuiltinRegistry,
    names: &'a CodecNames,
    options: &'a GenOptions,
}

impl<'a> Synthesizer<'a> {
    pub fn new(names: &'a CodecNames, options: &'a GenOptions) -> Self {
        Self {
            builtins: BuiltinRegistry::get(),
            names,
            options,
        }
    }

    /// Synthesizes the unit of `node`.
    pub fn synthesize(&self, node: &GraphNode<'_>) -> Result<CodecUnit, GenError> {
        let decl = node.decl;
        let mut builder = UnitBuilder {
            builtins: self.builtins,
            ty: &decl.path,
            params: &decl.type_params,
            adapters: Vec::new(),
            by_type: HashMap::default(),
        };

        let fields = decl
            .fields
            .iter()
            .enumerate()
            .map(|(slot, field)| -> Result<FieldBinding, GenError> {
                Ok(FieldBinding {
                    slot,
                    name: field.name.clone(),
                    wire_name: field.wire_name.clone(),
                    aliases: field.aliases.clone(),
                    ty: field.ty.clone(),
                    required: field.required,
                    access: field.access.clone(),
                    accessor: builder.accessor(field)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = self
            .names
            .name(&node.spec)
            .map_or_else(|| decl.path.type_ident().to_owned(), str::to_owned);

        Ok(CodecUnit {
            name,
            spec: node.spec.clone(),
            type_params: decl.type_params.clone(),
            adapters: builder.adapters,
            read: read_procedure(&fields, self.options.aggregate_required_violations),
            write: write_procedure(&fields),
            fields,
        })
    }
}

// -----------------------------------------------------------------------------
// UnitBuilder

struct UnitBuilder<'a> {
    builtins: &'static BuiltinRegistry,
    ty: &'a TypePath,
    params: &'a [String],
    adapters: Vec<AdapterField>,
    by_type: HashMap<TypeExpr, AdapterId>,
}

impl UnitBuilder<'_> {
    fn accessor(&mut self, field: &FieldDescriptor) -> Result<Accessor, GenError> {
        if let Some(codec) = &field.override_codec {
            let expr = self.override_expr(field, codec)?;
            let id = self.push(AdapterKey::Override(field.name.clone()), expr);
            return Ok(Accessor::Field(id));
        }
        self.shared(field, &field.ty)
    }

    /// A builtin, or the adapter field shared by every occurrence of `ty`
    /// in the unit, nested ones included.
    fn shared(&mut self, field: &FieldDescriptor, ty: &TypeExpr) -> Result<Accessor, GenError> {
        if let Some(id) = self.by_type.get(ty) {
            trace!("`{}` reuses {id} for `{ty}`", self.ty);
            return Ok(Accessor::Field(*id));
        }

        match self.expr(field, ty)? {
            AdapterExpr::Builtin(builtin) => Ok(Accessor::Builtin(builtin)),
            expr => {
                let id = self.push(AdapterKey::Type(ty.clone()), expr);
                self.by_type.insert(ty.clone(), id);
                Ok(Accessor::Field(id))
            }
        }
    }

    fn push(&mut self, key: AdapterKey, expr: AdapterExpr) -> AdapterId {
        let id = AdapterId(self.adapters.len());
        self.adapters.push(AdapterField { id, key, expr });
        id
    }

    fn expr(&mut self, field: &FieldDescriptor, ty: &TypeExpr) -> Result<AdapterExpr, GenError> {
        if let Some(builtin) = self.builtins.leaf(ty) {
            return Ok(AdapterExpr::Builtin(builtin));
        }
        match ty {
            TypeExpr::Array(elem) => Ok(match self.builtins.primitive_array(ty) {
                Some(builtin) => AdapterExpr::Builtin(builtin),
                None => AdapterExpr::Array {
                    elem: Box::new(self.shared(field, elem)?.into()),
                    instantiator: ArrayInstantiator {
                        elem_type: elem.to_string(),
                    },
                },
            }),
            TypeExpr::Declared { path, args } => {
                let Some(shape) = self.builtins.container_shape(path) else {
                    return Ok(AdapterExpr::Lookup(self.descriptor(field, ty)?));
                };
                Ok(match shape {
                    ContainerShape::List => AdapterExpr::List {
                        shape_path: path.clone(),
                        elem: self.shape_arg(field, shape, args, 0)?,
                    },
                    ContainerShape::Map => AdapterExpr::Map {
                        shape_path: path.clone(),
                        key: self.shape_arg(field, shape, args, 0)?,
                        value: self.shape_arg(field, shape, args, 1)?,
                    },
                })
            }
            _ => Ok(AdapterExpr::Lookup(self.descriptor(field, ty)?)),
        }
    }

    /// Argument `index` of a container; a raw or malformed use reads any value.
    fn shape_arg(
        &mut self,
        field: &FieldDescriptor,
        shape: ContainerShape,
        args: &[TypeExpr],
        index: usize,
    ) -> Result<Box<AdapterExpr>, GenError> {
        let expr = match args.get(index) {
            Some(arg) if args.len() == shape.arity() => self.shared(field, arg)?.into(),
            _ => AdapterExpr::Lookup(TypeDescriptor::Object),
        };
        Ok(Box::new(expr))
    }

    fn descriptor(&self, field: &FieldDescriptor, ty: &TypeExpr) -> Result<TypeDescriptor, GenError> {
        TypeDescriptor::from_expr(ty, self.params).map_err(|var| GenError::UnboundTypeVariable {
            ty: self.ty.clone(),
            field: field.name.clone(),
            var,
        })
    }

    fn override_expr(&mut self, field: &FieldDescriptor, codec: &OverrideRef) -> Result<AdapterExpr, GenError> {
        let owner = self.ty;
        let unsupported = |reason: String| GenError::UnsupportedOverrideSignature {
            ty: owner.clone(),
            field: field.name.clone(),
            codec: codec.path.clone(),
            reason,
        };

        let Some(params) = &codec.ctor else {
            return Err(unsupported(String::from("no accessible constructor")));
        };

        let mut args = Vec::with_capacity(params.len());
        match codec.kind {
            OverrideKind::Factory if !params.is_empty() => {
                return Err(unsupported(String::from(
                    "a factory override needs a constructor without parameters",
                )));
            }
            kind if kind.is_split() && !params.is_empty() => {
                return Err(unsupported(String::from(
                    "a serializer or deserializer override needs a constructor without parameters",
                )));
            }
            OverrideKind::Factory => {}
            OverrideKind::Serializer | OverrideKind::Deserializer | OverrideKind::SerializerDeserializer => {
                args.push(OverrideArg::Codec(self.shared(field, &field.ty)?.into()));
            }
            OverrideKind::Codec => {
                for param in params {
                    args.push(match param {
                        CtorParam::Registry => OverrideArg::Registry,
                        CtorParam::Factory(path) => OverrideArg::Factory(path.clone()),
                        CtorParam::Codec(ty) if *ty == field.ty => OverrideArg::Codec(self.shared(field, ty)?.into()),
                        CtorParam::Codec(ty) => {
                            return Err(unsupported(format!(
                                "delegate codec of `{ty}` does not match the field type `{}`",
                                field.ty
                            )));
                        }
                        CtorParam::Other(other) => {
                            return Err(unsupported(format!("unsupported constructor parameter `{other}`")));
                        }
                    });
                }
            }
        }

        Ok(AdapterExpr::Override {
            codec: codec.path.clone(),
            kind: codec.kind,
            args,
            target: self.descriptor(field, &field.ty)?,
            null_safe: codec.null_safe,
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Synthesizer;
    use crate::{Accessor, AdapterExpr, AdapterId, AdapterKey, BuiltinCodec, CodecNames, CodecUnit};
    use crate::{GenError, GenOptions, OverrideArg, TypeDescriptor, resolve};
    use sc_model::{CtorParam, FieldDescriptor, LeafKind, OverrideKind, OverrideRef, TypeDecl, TypeExpr, TypeModel};

    fn synthesize(decl: TypeDecl, extra: Vec<TypeDecl>) -> Result<CodecUnit, GenError> {
        let mut model = TypeModel::new();
        let path = decl.path.clone();
        model.add_root(decl).unwrap();
        extra.into_iter().for_each(|decl| model.insert(decl).unwrap());

        let (graph, errors) = resolve(&model);
        assert!(errors.is_empty(), "{errors:?}");
        let (names, _) = CodecNames::assign(&graph);
        let options = GenOptions::default();
        Synthesizer::new(&names, &options).synthesize(graph.node(&path).unwrap())
    }

    fn list_of(ty: TypeExpr) -> TypeExpr {
        TypeExpr::declared("std::vec::Vec", [ty])
    }

    // -------------------------------------------------------------------------
    // Policies

    #[test]
    fn leaves_and_primitive_arrays_are_builtin() {
        let unit = synthesize(
            TypeDecl::concrete("demo::Flat")
                .with_field(FieldDescriptor::new("id", TypeExpr::primitive(LeafKind::I64)))
                .with_field(FieldDescriptor::new("score", TypeExpr::boxed(LeafKind::F64)))
                .with_field(FieldDescriptor::new("bits", TypeExpr::array(TypeExpr::primitive(LeafKind::Bool)))),
            vec![],
        )
        .unwrap();

        assert!(unit.adapters.is_empty());
        assert_eq!(unit.fields[0].accessor, Accessor::Builtin(BuiltinCodec::Leaf(LeafKind::I64)));
        assert_eq!(unit.fields[1].accessor, Accessor::Builtin(BuiltinCodec::Leaf(LeafKind::F64)));
        assert_eq!(
            unit.fields[2].accessor,
            Accessor::Builtin(BuiltinCodec::PrimitiveArray(LeafKind::Bool))
        );
    }

    #[test]
    fn nested_types_get_their_own_adapters() {
        let doc = TypeExpr::named("demo::Doc");
        let docs = TypeExpr::array(doc.clone());
        let unit = synthesize(
            TypeDecl::concrete("demo::Doc").with_field(FieldDescriptor::new(
                "index",
                TypeExpr::declared("std::collections::HashMap", [TypeExpr::string(), list_of(docs.clone())]),
            )),
            vec![],
        )
        .unwrap();

        let keys: Vec<_> = unit.adapters.iter().map(|adapter| adapter.key.clone()).collect();
        assert_eq!(
            keys,
            [
                AdapterKey::Type(doc),
                AdapterKey::Type(docs.clone()),
                AdapterKey::Type(list_of(docs)),
                AdapterKey::Type(unit.fields[0].ty.clone()),
            ]
        );
        assert_eq!(unit.fields[0].accessor, Accessor::Field(AdapterId(3)));

        assert!(matches!(&unit.adapters[0].expr, AdapterExpr::Lookup(TypeDescriptor::Parameterized { args, .. }) if args.is_empty()));
        let AdapterExpr::Array { elem, instantiator } = &unit.adapters[1].expr else {
            panic!("expected an array adapter");
        };
        assert_eq!(**elem, AdapterExpr::Field(AdapterId(0)));
        assert_eq!(instantiator.elem_type, "demo::Doc");
        assert!(matches!(&unit.adapters[2].expr, AdapterExpr::List { elem, .. } if **elem == AdapterExpr::Field(AdapterId(1))));
        let AdapterExpr::Map { key, value, .. } = &unit.adapters[3].expr else {
            panic!("expected a map adapter");
        };
        assert_eq!(**key, AdapterExpr::Builtin(BuiltinCodec::Leaf(LeafKind::String)));
        assert_eq!(**value, AdapterExpr::Field(AdapterId(2)));
    }

    #[test]
    fn type_variables_become_lookups() {
        let unit = synthesize(
            TypeDecl::concrete("demo::Pair")
                .with_params(["A", "B"])
                .with_field(FieldDescriptor::new("first", TypeExpr::var("A")))
                .with_field(FieldDescriptor::new("second", list_of(TypeExpr::var("B")))),
            vec![],
        )
        .unwrap();

        assert_eq!(unit.adapters[0].expr, AdapterExpr::Lookup(TypeDescriptor::TypeVarRef(0)));
        assert_eq!(unit.adapters[1].expr, AdapterExpr::Lookup(TypeDescriptor::TypeVarRef(1)));
        assert!(matches!(
            &unit.adapters[2].expr,
            AdapterExpr::List { elem, .. } if **elem == AdapterExpr::Field(AdapterId(1))
        ));
    }

    #[test]
    fn raw_container_falls_back_to_object() {
        let unit = synthesize(
            TypeDecl::concrete("demo::Raw").with_field(FieldDescriptor::new("items", TypeExpr::named("std::vec::Vec"))),
            vec![],
        )
        .unwrap();
        assert!(matches!(
            &unit.adapters[0].expr,
            AdapterExpr::List { elem, .. } if **elem == AdapterExpr::Lookup(TypeDescriptor::Object)
        ));
    }

    // -------------------------------------------------------------------------
    // Sharing

    #[test]
    fn identical_types_share_one_adapter() {
        let child = TypeExpr::named("demo::Child");
        let unit = synthesize(
            TypeDecl::concrete("demo::Parent")
                .with_field(FieldDescriptor::new("left", child.clone()))
                .with_field(FieldDescriptor::new("right", child.clone()))
                .with_field(FieldDescriptor::new("all", list_of(child.clone())))
                .with_field(FieldDescriptor::new("more", list_of(child.clone())))
                .with_field(FieldDescriptor::new("row", TypeExpr::array(child.clone()))),
            vec![TypeDecl::concrete("demo::Child")],
        )
        .unwrap();

        assert_eq!(unit.adapters.len(), 3);
        assert_eq!(unit.fields[0].accessor, unit.fields[1].accessor);
        assert_eq!(unit.fields[2].accessor, Accessor::Field(AdapterId(1)));
        assert_eq!(unit.fields[3].accessor, Accessor::Field(AdapterId(1)));
        assert_eq!(unit.adapters[1].key, AdapterKey::Type(list_of(child)));

        // one lookup of `Child`, referenced by the list and the array
        let lookups = unit
            .adapters
            .iter()
            .filter(|adapter| matches!(adapter.expr, AdapterExpr::Lookup(_)))
            .count();
        assert_eq!(lookups, 1);
        assert!(matches!(&unit.adapters[1].expr, AdapterExpr::List { elem, .. } if **elem == AdapterExpr::Field(AdapterId(0))));
        assert!(matches!(&unit.adapters[2].expr, AdapterExpr::Array { elem, .. } if **elem == AdapterExpr::Field(AdapterId(0))));
    }

    // -------------------------------------------------------------------------
    // Overrides

    #[test]
    fn override_is_owned_by_its_field() {
        let ty = TypeExpr::named("demo::Point");
        let codec = OverrideRef::codec("demo::PointCodec", [CtorParam::Registry, CtorParam::Codec(ty.clone())]);
        let unit = synthesize(
            TypeDecl::concrete("demo::Shape")
                .with_field(FieldDescriptor::new("a", ty.clone()).with_override(codec.clone().null_safe()))
                .with_field(FieldDescriptor::new("b", ty.clone()).with_override(codec))
                .with_field(FieldDescriptor::new("c", ty.clone())),
            vec![TypeDecl::concrete("demo::Point")],
        )
        .unwrap();

        // the delegate lookup is shared with the plain field
        assert_eq!(unit.adapters.len(), 3);
        assert_eq!(unit.adapters[0].key, AdapterKey::Type(ty));
        assert_eq!(unit.adapters[1].key, AdapterKey::Override("a".to_owned()));
        assert_eq!(unit.adapters[2].key, AdapterKey::Override("b".to_owned()));
        assert_eq!(unit.fields[2].accessor, Accessor::Field(AdapterId(0)));

        let AdapterExpr::Override { args, null_safe, .. } = &unit.adapters[1].expr else {
            panic!("expected an override");
        };
        assert!(*null_safe);
        assert_eq!(args[0], OverrideArg::Registry);
        assert_eq!(args[1], OverrideArg::Codec(AdapterExpr::Field(AdapterId(0))));
    }

    #[test]
    fn split_overrides_carry_the_derived_codec() {
        let unit = synthesize(
            TypeDecl::concrete("demo::Event")
                .with_field(
                    FieldDescriptor::new("at", TypeExpr::boxed(LeafKind::Date))
                        .with_override(OverrideRef::split("demo::IsoDate", OverrideKind::Serializer)),
                )
                .with_field(
                    FieldDescriptor::new("tags", list_of(TypeExpr::string()))
                        .with_override(OverrideRef::split("demo::Tags", OverrideKind::SerializerDeserializer)),
                ),
            vec![],
        )
        .unwrap();

        let AdapterExpr::Override { kind, args, .. } = &unit.adapters[0].expr else {
            panic!("expected an override");
        };
        assert_eq!(*kind, OverrideKind::Serializer);
        assert_eq!(args, &[OverrideArg::Codec(AdapterExpr::Builtin(BuiltinCodec::Leaf(LeafKind::Date)))]);

        assert!(matches!(unit.adapters[1].expr, AdapterExpr::List { .. }));
        let AdapterExpr::Override { kind, args, .. } = &unit.adapters[2].expr else {
            panic!("expected an override");
        };
        assert_eq!(*kind, OverrideKind::SerializerDeserializer);
        assert_eq!(args, &[OverrideArg::Codec(AdapterExpr::Field(AdapterId(1)))]);
    }

    #[test]
    fn unsupported_override_shapes_are_fatal() {
        let ty = TypeExpr::string();
        let cases = [
            OverrideRef {
                ctor: None,
                ..OverrideRef::codec("demo::Hidden", [])
            },
            OverrideRef::codec("demo::Wrong", [CtorParam::Codec(TypeExpr::boxed(LeafKind::I32))]),
            OverrideRef::codec("demo::Odd", [CtorParam::Other("usize".to_owned())]),
            OverrideRef {
                ctor: Some(vec![CtorParam::Registry]),
                ..OverrideRef::factory("demo::Factory")
            },
            OverrideRef {
                ctor: Some(vec![CtorParam::Registry]),
                ..OverrideRef::split("demo::Reader", OverrideKind::Deserializer)
            },
        ];

        for codec in cases {
            let decl = TypeDecl::concrete("demo::Holder")
                .with_field(FieldDescriptor::new("value", ty.clone()).with_override(codec.clone()));
            let err = synthesize(decl, vec![]).unwrap_err();
            assert!(
                matches!(&err, GenError::UnsupportedOverrideSignature { codec: path, .. } if *path == codec.path),
                "{err}"
            );
        }
    }
}
