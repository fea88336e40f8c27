//! Modules: named groups of type descriptors handed to the scanner.

use std::collections::BTreeMap;

use crate::{any::TypeInfo, descriptor::TypeDescriptor, errors::{ModuleLoadErrorKind, PlannerErrorKind}};

/// A loaded module and the descriptors of its types.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    types: Vec<TypeDescriptor>,
}

impl Module {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, types: Vec<TypeDescriptor>) -> Self {
        Self { name: name.into(), types }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }
}

/// Source of modules and type descriptors.
pub trait ModuleLoader: Send + Sync + 'static {
    /// # Errors
    /// Returns [`ModuleLoadErrorKind::NotFound`] when no module is known under `name`.
    fn load(&self, name: &str) -> Result<Module, ModuleLoadErrorKind>;

    /// Looks a type up by its path, with or without the `dyn ` prefix of trait objects.
    fn find_type(&self, _name: &str) -> Option<TypeDescriptor> {
        None
    }

    /// Full descriptor of a type known to the loader.
    fn describe(&self, _ty: &TypeInfo) -> Option<TypeDescriptor> {
        None
    }
}

/// Modules assembled in code.
#[derive(Debug, Default, Clone)]
pub struct StaticModules {
    modules: BTreeMap<String, Vec<TypeDescriptor>>,
}

impl StaticModules {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `types` to the module `name`, creating it if needed.
    #[must_use]
    pub fn module(mut self, name: impl Into<String>, types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.modules.entry(name.into()).or_default().extend(types);
        self
    }

    fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.modules.values().flatten()
    }
}

impl ModuleLoader for StaticModules {
    fn load(&self, name: &str) -> Result<Module, ModuleLoadErrorKind> {
        self.modules
            .get(name)
            .map(|types| Module::new(name, types.clone()))
            .ok_or_else(|| ModuleLoadErrorKind::NotFound { name: name.to_owned() })
    }

    fn find_type(&self, name: &str) -> Option<TypeDescriptor> {
        self.types().find(|ty| ty.info().matches_name(name)).cloned()
    }

    fn describe(&self, ty: &TypeInfo) -> Option<TypeDescriptor> {
        self.types().find(|descriptor| descriptor.info() == *ty).cloned()
    }
}

/// What happened when a module was scanned.
#[derive(Debug, Clone)]
pub enum ModuleOutcome {
    /// Directives of `types` types were applied; `skipped` lists the planner failures.
    Configured {
        types: usize,
        skipped: Vec<PlannerErrorKind>,
    },
    LoadFailed {
        reason: String,
    },
    /// A directive was rejected by the backend.
    Aborted {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub name: String,
    pub processed: bool,
    pub outcome: Option<ModuleOutcome>,
}

/// Modules a container has seen, scanned at most once each.
#[derive(Debug, Default)]
pub(crate) struct ModuleTracker {
    records: BTreeMap<String, ModuleRecord>,
}

impl ModuleTracker {
    /// Records `name`. Returns `false` if it was recorded before.
    pub(crate) fn begin(&mut self, name: &str) -> bool {
        if self.records.contains_key(name) {
            return false;
        }

        self.records.insert(
            name.to_owned(),
            ModuleRecord {
                name: name.to_owned(),
                processed: false,
                outcome: None,
            },
        );
        true
    }

    pub(crate) fn finish(&mut self, name: &str, outcome: ModuleOutcome) {
        if let Some(record) = self.records.get_mut(name) {
            record.processed = true;
            record.outcome = Some(outcome);
        }
    }

    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<ModuleRecord> {
        self.records.get(name).cloned()
    }
}
