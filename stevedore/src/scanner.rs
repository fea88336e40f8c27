//! Applies the registration plans of a module's types to a backend.

use tracing::{debug, error};

use crate::{
    backend::Backend,
    errors::ConfigureErrorKind,
    module::{Module, ModuleOutcome},
    planner::build_plan,
};

/// Plans every class-like type of `module` and applies the directives.
///
/// A type whose markers can't be planned is skipped and reported in the outcome.
///
/// # Errors
/// Returns an error on the first directive the backend rejects. Directives applied
/// before it stay registered.
pub(crate) fn configure(backend: &dyn Backend, module: &Module) -> Result<ModuleOutcome, ConfigureErrorKind> {
    let mut types = 0;
    let mut skipped = Vec::new();

    for descriptor in module.types().iter().filter(|ty| ty.kind().is_class_like()) {
        let plan = match build_plan(descriptor) {
            Ok(plan) => plan,
            Err(err) => {
                error!(%err, implementation = descriptor.info().name, "Type skipped");
                skipped.push(err);
                continue;
            }
        };

        let implementation = plan.implementation;
        for directive in plan.into_directives() {
            let kind = directive.kind();
            directive.apply(backend).map_err(|source| ConfigureErrorKind::Apply {
                module: module.name().to_owned(),
                implementation: implementation.name,
                directive: kind,
                source,
            })?;
        }

        debug!(implementation = implementation.name, "Type configured");
        types += 1;
    }

    Ok(ModuleOutcome::Configured { types, skipped })
}
