use sc_model::TypePath;
use sc_utils::hash::HashMap;

use crate::{CodecUnit, RuntimeType};

// -----------------------------------------------------------------------------
// DispatchTable

/// One constructible unit, keyed by its erased type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchEntry {
    pub path: TypePath,
    /// Index of the unit in the generated list.
    pub unit: usize,
    pub unit_name: String,
    /// Number of type arguments the unit is constructed with.
    pub arity: usize,
}

/// A resolved constructor invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instantiation<'a> {
    pub entry: &'a DispatchEntry,
    /// One argument per type parameter of the unit.
    pub args: Vec<RuntimeType>,
}

/// Maps a requested runtime type to the unit that serves it.
///
/// The table is immutable once built and may be shared freely.
///
/// # Examples
///
/// ```
/// use sc_codegen::{GenOptions, RuntimeType, generate};
/// use sc_model::{FieldDescriptor, TypeDecl, TypeExpr, TypeModel};
///
/// let mut model = TypeModel::new();
/// model.add_root(
///     TypeDecl::concrete("demo::Wrapper")
///         .with_params(["T"])
///         .with_field(FieldDescriptor::new("value", TypeExpr::var("T"))),
/// ).unwrap();
///
/// let generated = generate(&model, &GenOptions::default()).into_result().unwrap();
///
/// // A raw reference defaults every argument to the unknown object.
/// let hit = generated.dispatch.lookup(&RuntimeType::named("demo::Wrapper")).unwrap();
/// assert_eq!(hit.args, [RuntimeType::Object]);
///
/// assert!(generated.dispatch.lookup(&RuntimeType::named("demo::Other")).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
    index: HashMap<TypePath, usize>,
}

impl DispatchTable {
    /// Creates one entry per unit.
    pub fn build(units: &[CodecUnit]) -> Self {
        let mut table = Self::default();
        for (unit_index, unit) in units.iter().enumerate() {
            table.index.insert(unit.path().clone(), table.entries.len());
            table.entries.push(DispatchEntry {
                path: unit.path().clone(),
                unit: unit_index,
                unit_name: unit.name.clone(),
                arity: unit.type_params.len(),
            });
        }
        table
    }

    /// Finds the unit serving `ty` and the arguments to construct it with.
    ///
    /// Returns `None` for types outside the generated closure, including
    /// every non-declared type.
    pub fn lookup(&self, ty: &RuntimeType) -> Option<Instantiation<'_>> {
        let RuntimeType::Parameterized { base, args } = ty else {
            return None;
        };
        let entry = self.get(base)?;
        let args = if args.len() == entry.arity {
            args.clone()
        } else {
            vec![RuntimeType::Object; entry.arity]
        };
        Some(Instantiation { entry, args })
    }

    #[inline]
    pub fn get(&self, path: &TypePath) -> Option<&DispatchEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    #[inline]
    pub fn contains(&self, path: &TypePath) -> bool {
        self.index.contains_key(path)
    }

    #[inline]
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{GenOptions, RuntimeType, generate};
    use sc_model::{FieldDescriptor, LeafKind, TypeDecl, TypeExpr, TypeModel};

    fn table() -> crate::DispatchTable {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Pair")
                    .with_params(["A", "B"])
                    .with_field(FieldDescriptor::new("first", TypeExpr::var("A")))
                    .with_field(FieldDescriptor::new("second", TypeExpr::var("B"))),
            )
            .unwrap();
        model.add_root(TypeDecl::concrete("demo::Plain")).unwrap();
        generate(&model, &GenOptions::default()).into_result().unwrap().dispatch
    }

    #[test]
    fn parameterized_arguments_are_positional() {
        let table = table();
        let int = RuntimeType::Leaf(LeafKind::I32);
        let text = RuntimeType::Leaf(LeafKind::String);
        let hit = table
            .lookup(&RuntimeType::of("demo::Pair", [int.clone(), text.clone()]))
            .unwrap();
        assert_eq!(hit.entry.unit_name, "Pair");
        assert_eq!(hit.args, [int, text]);
    }

    #[test]
    fn mismatched_arity_defaults_to_object() {
        let table = table();
        let hit = table
            .lookup(&RuntimeType::of("demo::Pair", [RuntimeType::Leaf(LeafKind::I32)]))
            .unwrap();
        assert_eq!(hit.args, [RuntimeType::Object, RuntimeType::Object]);
    }

    #[test]
    fn misses_are_none() {
        let table = table();
        assert!(table.lookup(&RuntimeType::Leaf(LeafKind::I32)).is_none());
        assert!(table.lookup(&RuntimeType::Object).is_none());
        assert!(table.lookup(&RuntimeType::named("demo::Unknown")).is_none());

        let plain = table.lookup(&RuntimeType::named("demo::Plain")).unwrap();
        assert!(plain.args.is_empty());
        assert_eq!(table.len(), 2);
    }
}
