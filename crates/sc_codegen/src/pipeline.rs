use log::error;
use sc_model::{TypePath, TypeSource};
use sc_utils::hash::HashSet;

use crate::{CodecNames, CodecUnit, DispatchTable, GenError, GenOptions};
use crate::{Specialization, Synthesizer, resolve};

// -----------------------------------------------------------------------------
// Generated

/// Everything one generation run produced.
#[derive(Clone, Debug, Default)]
pub struct Generated {
    /// One unit per concrete declaration, in discovery order.
    pub units: Vec<CodecUnit>,
    pub dispatch: DispatchTable,
    pub names: CodecNames,
    /// Every specialization discovered, including the failed ones.
    pub specializations: Vec<Specialization>,
}

impl Generated {
    /// The unit generated for `path`.
    pub fn unit(&self, path: &TypePath) -> Option<&CodecUnit> {
        self.dispatch.get(path).map(|entry| &self.units[entry.unit])
    }
}

/// The outcome of [`generate`]: what could be generated, and why the rest
/// could not.
#[derive(Clone, Debug, Default)]
pub struct GenReport {
    pub generated: Generated,
    pub errors: Vec<GenError>,
}

impl GenReport {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The generated artifacts, or every error if any type failed.
    pub fn into_result(self) -> Result<Generated, Vec<GenError>> {
        if self.errors.is_empty() {
            Ok(self.generated)
        } else {
            Err(self.errors)
        }
    }
}

// -----------------------------------------------------------------------------
// generate

/// Runs resolution, naming, synthesis and dispatch over `source`.
///
/// A fatal error only removes the offending types from the output. Each
/// error is logged once and returned in the report.
pub fn generate(source: &dyn TypeSource, options: &GenOptions) -> GenReport {
    let (graph, mut errors) = resolve(source);
    let (names, name_errors) = CodecNames::assign(&graph);
    errors.extend(name_errors);

    let failed: HashSet<String> = errors
        .iter()
        .flat_map(GenError::offending_types)
        .map(str::to_owned)
        .collect();

    let synth = Synthesizer::new(&names, options);
    let mut units = Vec::new();
    for node in graph.nodes() {
        if failed.contains(node.spec.path().type_path()) {
            continue;
        }
        match synth.synthesize(node) {
            Ok(unit) => units.push(unit),
            Err(e) => errors.push(e),
        }
    }

    for e in &errors {
        error!("{e}");
    }

    GenReport {
        generated: Generated {
            dispatch: DispatchTable::build(&units),
            units,
            names,
            specializations: graph.specializations().to_vec(),
        },
        errors,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::generate;
    use crate::{GenError, GenOptions};
    use sc_model::{FieldDescriptor, OverrideRef, TypeDecl, TypeExpr, TypeModel, TypePath};

    #[test]
    fn failures_only_remove_offending_types() {
        let hidden = OverrideRef {
            ctor: None,
            ..OverrideRef::codec("demo::HiddenCodec", [])
        };
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Good")
                    .with_field(FieldDescriptor::new("bad", TypeExpr::named("demo::Bad"))),
            )
            .unwrap();
        model
            .insert(
                TypeDecl::concrete("demo::Bad")
                    .with_field(FieldDescriptor::new("value", TypeExpr::string()).with_override(hidden)),
            )
            .unwrap();
        model.mark_root("demo::Ghost");

        let report = generate(&model, &GenOptions::default());
        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0], GenError::MissingTypeModel(TypePath::new("demo::Ghost")));
        assert!(matches!(report.errors[1], GenError::UnsupportedOverrideSignature { .. }));

        assert!(report.generated.unit(&TypePath::new("demo::Good")).is_some());
        assert!(report.generated.unit(&TypePath::new("demo::Bad")).is_none());
    }

    #[test]
    fn colliding_types_are_not_generated() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Holder")
                    .with_field(FieldDescriptor::new(
                        "boxed",
                        TypeExpr::declared("demo::Box", [TypeExpr::named("demo::Holder")]),
                    ))
                    .with_field(FieldDescriptor::new("other", TypeExpr::named("demo::Box_Holder"))),
            )
            .unwrap();
        model.insert(TypeDecl::concrete("demo::Box").with_params(["T"])).unwrap();
        model.insert(TypeDecl::concrete("demo::Box_Holder")).unwrap();

        let report = generate(&model, &GenOptions::default());
        assert_eq!(report.errors.len(), 1);
        let generated = report.generated;
        let units: Vec<_> = generated.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(units, ["Holder"]);
        assert_eq!(generated.specializations.len(), 4);
    }
}
