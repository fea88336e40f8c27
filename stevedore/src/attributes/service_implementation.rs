use super::base::Attribute;
use crate::{any::TypeInfo, lifetime::Lifetime};

/// Registers the decorated type as an implementation of its interfaces.
///
/// Without explicit interfaces, every interface the type declares is mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceImplementation {
    interfaces: Vec<TypeInfo>,
    name: Option<String>,
    lifetime: Lifetime,
}

impl ServiceImplementation {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            name: None,
            lifetime: Lifetime::Transient,
        }
    }

    #[inline]
    #[must_use]
    pub fn interface<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeInfo::of::<I>());
        self
    }

    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    #[inline]
    #[must_use]
    pub fn interfaces(&self) -> &[TypeInfo] {
        &self.interfaces
    }

    /// Registration name; an empty name is the default registration.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    #[inline]
    #[must_use]
    pub const fn resolve_lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl Attribute for ServiceImplementation {}
