use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use log::debug;
use sc_codegen::{Generated, RuntimeType};
use sc_model::{OverrideKind, TypePath};
use sc_stream::{JsonReader, JsonWriter};
use sc_utils::hash::{HashMap, HashSet};

use crate::builtin::BuiltinFactory;
use crate::unit::GeneratedFactory;
use crate::{Codec, CodecError, CodecFactory, Deserializer, Serializer, SplitCodec, Value};

// -----------------------------------------------------------------------------
// Overrides

/// A constructor argument handed to a registered override codec.
pub enum OverrideValue {
    /// The registry handle, passed separately to the constructor.
    Registry,
    Factory(Arc<dyn CodecFactory>),
    /// The derived codec of the field type.
    Codec(Arc<dyn Codec>),
}

type CodecCtor = Arc<dyn Fn(&CodecRegistry, &[OverrideValue]) -> Result<Arc<dyn Codec>, CodecError> + Send + Sync>;
type FactoryCtor = Arc<dyn Fn() -> Arc<dyn CodecFactory> + Send + Sync>;
type SplitCtor = Arc<dyn Fn() -> SplitHalves + Send + Sync>;

/// The halves a registered serializer or deserializer provides.
struct SplitHalves {
    serializer: Option<Arc<dyn Serializer>>,
    deserializer: Option<Arc<dyn Deserializer>>,
}

// -----------------------------------------------------------------------------
// CodecRegistry

struct Inner {
    factories: Vec<Arc<dyn CodecFactory>>,
    override_codecs: HashMap<TypePath, CodecCtor>,
    override_factories: HashMap<TypePath, FactoryCtor>,
    override_splits: HashMap<TypePath, SplitCtor>,
    cache: RwLock<HashMap<RuntimeType, Arc<dyn Codec>>>,
    // types whose codec is under construction, per constructing thread
    building: Mutex<HashSet<(ThreadId, RuntimeType)>>,
}

/// Hands out one shared [`Codec`] per [`RuntimeType`].
///
/// The registry is a cheap handle; clones share the same cache.
///
/// # Examples
///
/// ```
/// use sc_codegen::RuntimeType;
/// use sc_model::LeafKind;
/// use sc_runtime::CodecRegistry;
///
/// let registry = CodecRegistry::builder().build();
/// let ty = RuntimeType::of("std::vec::Vec", [RuntimeType::Leaf(LeafKind::I32)]);
///
/// let a = registry.codec(&ty).unwrap();
/// let b = registry.codec(&ty).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
///
/// assert!(registry.codec(&RuntimeType::named("demo::Unknown")).is_err());
/// ```
#[derive(Clone)]
pub struct CodecRegistry {
    inner: Arc<Inner>,
}

impl CodecRegistry {
    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Returns the codec of `ty`, constructing it on first request.
    ///
    /// Fails with [`CodecError::NoCodec`] if every factory declines.
    pub fn codec(&self, ty: &RuntimeType) -> Result<Arc<dyn Codec>, CodecError> {
        if let Some(codec) = self.cached(ty) {
            return Ok(codec);
        }

        // A request for a type this thread is constructing is a cycle, it is
        // served through the cache once construction completes. Other threads
        // construct their own codec and the first one cached wins.
        let key = (thread::current().id(), ty.clone());
        if !self.building().insert(key.clone()) {
            return Ok(Arc::new(Deferred::new(self, ty.clone())));
        }
        let created = self.create(ty);
        self.building().remove(&key);

        let codec = created?;
        debug!("constructed codec for `{ty}`");
        let mut cache = self.inner.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(ty.clone()).or_insert(codec).clone())
    }

    /// A handle that does not keep the registry alive.
    #[inline]
    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn cached(&self, ty: &RuntimeType) -> Option<Arc<dyn Codec>> {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ty)
            .cloned()
    }

    fn building(&self) -> MutexGuard<'_, HashSet<(ThreadId, RuntimeType)>> {
        self.inner.building.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create(&self, ty: &RuntimeType) -> Result<Arc<dyn Codec>, CodecError> {
        for factory in &self.inner.factories {
            if let Some(codec) = factory.create(self, ty)? {
                return Ok(codec);
            }
        }
        Err(CodecError::NoCodec(ty.clone()))
    }

    /// Instantiates the override codec registered under `path`.
    pub(crate) fn override_codec(&self, path: &TypePath, args: &[OverrideValue]) -> Result<Arc<dyn Codec>, CodecError> {
        let ctor = self
            .inner
            .override_codecs
            .get(path)
            .ok_or_else(|| CodecError::MissingOverride(path.clone()))?;
        ctor(self, args)
    }

    /// Instantiates the override factory registered under `path`.
    pub(crate) fn override_factory(&self, path: &TypePath) -> Result<Arc<dyn CodecFactory>, CodecError> {
        self.inner
            .override_factories
            .get(path)
            .map(|ctor| ctor())
            .ok_or_else(|| CodecError::MissingOverride(path.clone()))
    }

    /// Pairs the serializer and/or deserializer registered under `path` with
    /// `delegate`, keeping the halves `kind` asks for.
    pub(crate) fn override_split(
        &self,
        path: &TypePath,
        kind: OverrideKind,
        delegate: Arc<dyn Codec>,
    ) -> Result<Arc<dyn Codec>, CodecError> {
        let missing = || CodecError::MissingOverride(path.clone());
        let ctor = self.inner.override_splits.get(path).ok_or_else(missing)?;
        let halves = ctor();

        let serializer = match kind {
            OverrideKind::Serializer | OverrideKind::SerializerDeserializer => {
                Some(halves.serializer.ok_or_else(missing)?)
            }
            _ => None,
        };
        let deserializer = match kind {
            OverrideKind::Deserializer | OverrideKind::SerializerDeserializer => {
                Some(halves.deserializer.ok_or_else(missing)?)
            }
            _ => None,
        };
        Ok(Arc::new(SplitCodec::new(serializer, deserializer, delegate)))
    }
}

/// A non-owning [`CodecRegistry`] handle, held by codecs that resolve
/// other codecs lazily.
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<Inner>,
}

impl WeakRegistry {
    #[inline]
    pub fn upgrade(&self) -> Option<CodecRegistry> {
        self.inner.upgrade().map(|inner| CodecRegistry { inner })
    }
}

// -----------------------------------------------------------------------------
// RegistryBuilder

/// Configures a [`CodecRegistry`].
///
/// Factories are asked in order: builtins, the generated units, then user
/// factories in registration order.
#[derive(Default)]
pub struct RegistryBuilder {
    generated: Option<Arc<Generated>>,
    factories: Vec<Arc<dyn CodecFactory>>,
    override_codecs: HashMap<TypePath, CodecCtor>,
    override_factories: HashMap<TypePath, FactoryCtor>,
    override_splits: HashMap<TypePath, SplitCtor>,
}

impl RegistryBuilder {
    /// Serves every unit of `generated`.
    pub fn generated(mut self, generated: impl Into<Arc<Generated>>) -> Self {
        self.generated = Some(generated.into());
        self
    }

    pub fn factory(mut self, factory: impl CodecFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Registers the constructor of an override codec.
    pub fn override_codec(
        mut self,
        path: impl Into<TypePath>,
        ctor: impl Fn(&CodecRegistry, &[OverrideValue]) -> Result<Arc<dyn Codec>, CodecError> + Send + Sync + 'static,
    ) -> Self {
        self.override_codecs.insert(path.into(), Arc::new(ctor));
        self
    }

    /// Registers the constructor of an override factory.
    pub fn override_factory(
        mut self,
        path: impl Into<TypePath>,
        ctor: impl Fn() -> Arc<dyn CodecFactory> + Send + Sync + 'static,
    ) -> Self {
        self.override_factories.insert(path.into(), Arc::new(ctor));
        self
    }

    /// Registers the constructor of an encode-only override.
    pub fn override_serializer<S: Serializer + 'static>(
        mut self,
        path: impl Into<TypePath>,
        ctor: impl Fn() -> S + Send + Sync + 'static,
    ) -> Self {
        let ctor = move || SplitHalves {
            serializer: Some(Arc::new(ctor())),
            deserializer: None,
        };
        self.override_splits.insert(path.into(), Arc::new(ctor));
        self
    }

    /// Registers the constructor of a decode-only override.
    pub fn override_deserializer<D: Deserializer + 'static>(
        mut self,
        path: impl Into<TypePath>,
        ctor: impl Fn() -> D + Send + Sync + 'static,
    ) -> Self {
        let ctor = move || SplitHalves {
            serializer: None,
            deserializer: Some(Arc::new(ctor())),
        };
        self.override_splits.insert(path.into(), Arc::new(ctor));
        self
    }

    /// Registers the constructor of an override handling both directions
    /// with a single instance.
    pub fn override_serializer_deserializer<T: Serializer + Deserializer + 'static>(
        mut self,
        path: impl Into<TypePath>,
        ctor: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        let ctor = move || {
            let both = Arc::new(ctor());
            SplitHalves {
                serializer: Some(both.clone()),
                deserializer: Some(both),
            }
        };
        self.override_splits.insert(path.into(), Arc::new(ctor));
        self
    }

    pub fn build(self) -> CodecRegistry {
        let mut factories: Vec<Arc<dyn CodecFactory>> = vec![Arc::new(BuiltinFactory)];
        if let Some(generated) = self.generated {
            factories.push(Arc::new(GeneratedFactory::new(generated)));
        }
        factories.extend(self.factories);

        CodecRegistry {
            inner: Arc::new(Inner {
                factories,
                override_codecs: self.override_codecs,
                override_factories: self.override_factories,
                override_splits: self.override_splits,
                cache: RwLock::new(HashMap::default()),
                building: Mutex::new(HashSet::default()),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Deferred

/// Stands in for a codec that cannot be constructed yet: one requested during
/// its own construction, or one no factory serves until a value needs it.
pub(crate) struct Deferred {
    registry: WeakRegistry,
    ty: RuntimeType,
}

impl Deferred {
    pub(crate) fn new(registry: &CodecRegistry, ty: RuntimeType) -> Self {
        Self {
            registry: registry.downgrade(),
            ty,
        }
    }

    fn resolve(&self) -> Result<Arc<dyn Codec>, CodecError> {
        self.registry
            .upgrade()
            .ok_or(CodecError::RegistryDropped)?
            .codec(&self.ty)
    }
}

impl Codec for Deferred {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        self.resolve()?.read(reader)
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        self.resolve()?.write(writer, value)
    }

    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        self.resolve()?.read_key(name)
    }

    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        self.resolve()?.write_key(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use sc_codegen::RuntimeType;
    use sc_model::LeafKind;
    use sc_stream::TreeReader;

    use super::CodecRegistry;
    use crate::{Codec, CodecError, CodecFactory, LeafCodec, Value};

    struct Counting(Arc<AtomicUsize>);

    impl CodecFactory for Counting {
        fn create(&self, _: &CodecRegistry, ty: &RuntimeType) -> Result<Option<Arc<dyn Codec>>, CodecError> {
            if ty.base().is_some_and(|base| base.type_path() == "demo::Id") {
                self.0.fetch_add(1, Ordering::SeqCst);
                return Ok(Some(Arc::new(LeafCodec(LeafKind::I64))));
            }
            Ok(None)
        }
    }

    #[test]
    fn user_factories_are_asked_last_and_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = CodecRegistry::builder().factory(Counting(calls.clone())).build();

        let id = RuntimeType::named("demo::Id");
        registry.codec(&id).unwrap();
        registry.codec(&id).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // builtins win over user factories
        registry.codec(&RuntimeType::Leaf(LeafKind::I64)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    struct Slow;

    impl CodecFactory for Slow {
        fn create(&self, _: &CodecRegistry, ty: &RuntimeType) -> Result<Option<Arc<dyn Codec>>, CodecError> {
            if ty.base().is_some_and(|base| base.type_path() == "demo::Slow") {
                thread::sleep(Duration::from_millis(200));
                return Ok(Some(Arc::new(LeafCodec(LeafKind::I64))));
            }
            Ok(None)
        }
    }

    #[test]
    fn concurrent_construction_is_not_a_cycle() {
        let registry = CodecRegistry::builder().factory(Slow).build();
        let ty = RuntimeType::named("demo::Slow");

        let read = |registry: &CodecRegistry| {
            let codec = registry.codec(&ty).unwrap();
            codec.read(&mut TreeReader::from_str("5").unwrap()).unwrap()
        };
        thread::scope(|scope| {
            let first = scope.spawn(|| read(&registry));
            thread::sleep(Duration::from_millis(50));
            let second = scope.spawn(|| read(&registry));
            assert_eq!(first.join().unwrap(), Value::Int(5));
            assert_eq!(second.join().unwrap(), Value::Int(5));
        });

        let a = registry.codec(&ty).unwrap();
        let b = registry.codec(&ty).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn misses_name_the_type() {
        let registry = CodecRegistry::builder().build();
        let ty = RuntimeType::of("demo::Box", [RuntimeType::Object]);
        assert_eq!(registry.codec(&ty).err(), Some(CodecError::NoCodec(ty)));
    }

    #[test]
    fn weak_handle_does_not_keep_registry_alive() {
        let registry = CodecRegistry::builder().build();
        let weak = registry.downgrade();
        assert!(weak.upgrade().is_some());
        drop(registry);
        assert!(weak.upgrade().is_none());
    }
}
