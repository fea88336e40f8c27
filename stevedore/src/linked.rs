//! Modules recorded at link time by `#[injectable]`.

use std::{collections::BTreeMap, sync::OnceLock};

use linkme::distributed_slice;
use tracing::debug;

use crate::{
    any::TypeInfo,
    descriptor::TypeDescriptor,
    errors::ModuleLoadErrorKind,
    module::{Module, ModuleLoader},
};

/// A descriptor fragment and the crate it was declared in.
pub struct TypeEntry {
    pub module: &'static str,
    pub descriptor: TypeDescriptor,
}

impl TypeEntry {
    #[inline]
    #[must_use]
    pub const fn new(module: &'static str, descriptor: TypeDescriptor) -> Self {
        Self { module, descriptor }
    }
}

#[distributed_slice]
pub static TYPE_ENTRIES: [fn() -> TypeEntry];

#[inline]
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

/// A type merged from its fragments, with the crates that declared them.
type LinkedType = (Vec<&'static str>, TypeDescriptor);

/// Module loader over the fragments linked into the binary.
///
/// A module is a crate: it contains every type with at least one fragment declared
/// in the crate, each merged with the fragments of other crates (trait impls).
/// Fragments are merged on first use and kept for the lifetime of the loader.
#[derive(Clone)]
pub struct LinkedModules {
    entries: &'static [fn() -> TypeEntry],
    merged: OnceLock<Vec<LinkedType>>,
}

impl LinkedModules {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_entries(TYPE_ENTRIES.static_slice())
    }

    #[inline]
    #[must_use]
    pub const fn from_entries(entries: &'static [fn() -> TypeEntry]) -> Self {
        Self {
            entries,
            merged: OnceLock::new(),
        }
    }

    /// All fragments merged per type, in first-declared order.
    fn merged(&self) -> &[LinkedType] {
        self.merged.get_or_init(|| {
            let mut order = Vec::new();
            let mut types: BTreeMap<TypeInfo, LinkedType> = BTreeMap::new();

            for TypeEntry { module, descriptor } in self.entries.iter().map(|getter| getter()) {
                let info = descriptor.info();
                match types.get_mut(&info) {
                    Some((modules, merged)) => {
                        modules.push(module);
                        merged.merge(descriptor);
                    }
                    None => {
                        order.push(info);
                        types.insert(info, (vec![module], descriptor));
                    }
                }
            }

            debug!(types = order.len(), "Linked fragments merged");
            order.iter().filter_map(|info| types.remove(info)).collect()
        })
    }

    fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.merged().iter().map(|(_, descriptor)| descriptor)
    }
}

impl Default for LinkedModules {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for LinkedModules {
    fn load(&self, name: &str) -> Result<Module, ModuleLoadErrorKind> {
        let name = normalize(name);
        let types = self
            .merged()
            .iter()
            .filter(|(modules, _)| modules.iter().any(|module| normalize(module) == name))
            .map(|(_, descriptor)| descriptor.clone())
            .collect::<Vec<_>>();

        if types.is_empty() {
            return Err(ModuleLoadErrorKind::NotFound { name });
        }

        debug!(module = name.as_str(), types = types.len(), "Linked module loaded");
        Ok(Module::new(name, types))
    }

    fn find_type(&self, name: &str) -> Option<TypeDescriptor> {
        self.descriptors()
            .find(|descriptor| descriptor.info().matches_name(name))
            .cloned()
    }

    fn describe(&self, ty: &TypeInfo) -> Option<TypeDescriptor> {
        self.descriptors().find(|descriptor| descriptor.info() == *ty).cloned()
    }
}
