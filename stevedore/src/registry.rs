use std::{
    any::TypeId,
    collections::BTreeMap,
    sync::Arc,
};

use crate::{
    any::{Instance, TypeInfo},
    backend::{ConstructorRef, Implementation, MethodRef, ParameterPlan, PropertyRef, Resolution, ServiceType},
    cache::LifetimeCache,
    lifetime::Lifetime,
};

pub(crate) enum Target {
    Type(Implementation),
    Instance(Instance),
}

pub(crate) struct Registration {
    pub(crate) service: ServiceType,
    /// Closed service the target produces.
    pub(crate) provides: TypeInfo,
    pub(crate) name: Option<String>,
    pub(crate) target: Target,
    pub(crate) cache: LifetimeCache,
}

impl Registration {
    #[must_use]
    pub(crate) fn from_type(service: ServiceType, implementation: Implementation, name: Option<&str>, lifetime: Lifetime) -> Self {
        Self {
            service,
            provides: implementation.provides(),
            name: name.map(ToOwned::to_owned),
            target: Target::Type(implementation),
            cache: LifetimeCache::new(lifetime),
        }
    }

    #[must_use]
    pub(crate) fn from_instance(service: TypeInfo, name: Option<&str>, instance: Instance) -> Self {
        Self {
            service: ServiceType::Exact(service),
            provides: service,
            name: name.map(ToOwned::to_owned),
            target: Target::Instance(instance),
            cache: LifetimeCache::Transient,
        }
    }

    #[inline]
    fn serves(&self, service: &TypeInfo) -> bool {
        self.service.accepts(service) && self.provides == *service
    }

    #[inline]
    fn is_named(&self, name: Option<&str>) -> bool {
        self.name.as_deref() == name
    }

    #[inline]
    fn replaces(&self, other: &Registration) -> bool {
        self.service == other.service && self.provides == other.provides && self.name == other.name
    }
}

pub(crate) struct ConstructorInjection {
    pub(crate) constructor: ConstructorRef,
    pub(crate) parameters: ParameterPlan,
}

#[derive(Clone)]
pub(crate) struct MethodInjection {
    pub(crate) method: MethodRef,
    pub(crate) parameters: ParameterPlan,
}

#[derive(Clone)]
pub(crate) struct PropertyInjection {
    pub(crate) property: PropertyRef,
    pub(crate) resolution: Resolution,
}

/// Registration table of the default backend.
#[derive(Default)]
pub(crate) struct Registry {
    registrations: Vec<Arc<Registration>>,
    constructors: BTreeMap<TypeId, Arc<ConstructorInjection>>,
    methods: BTreeMap<TypeId, Vec<MethodInjection>>,
    properties: BTreeMap<TypeId, Vec<PropertyInjection>>,
}

impl Registry {
    /// Adds a registration, replacing one with the same key and name in place.
    pub(crate) fn insert(&mut self, registration: Registration) {
        match self
            .registrations
            .iter_mut()
            .find(|existing| existing.replaces(&registration))
        {
            Some(existing) => *existing = Arc::new(registration),
            None => self.registrations.push(Arc::new(registration)),
        }
    }

    /// Finds the registration serving `service` under `name`.
    ///
    /// Exact registrations win over open generic ones.
    #[must_use]
    pub(crate) fn find(&self, service: &TypeInfo, name: Option<&str>) -> Option<Arc<Registration>> {
        let candidates = || {
            self.registrations
                .iter()
                .filter(move |registration| registration.serves(service) && registration.is_named(name))
        };

        candidates()
            .find(|registration| matches!(registration.service, ServiceType::Exact(_)))
            .or_else(|| candidates().next())
            .cloned()
    }

    /// Every registration serving `service`, in registration order.
    #[must_use]
    pub(crate) fn find_all(&self, service: &TypeInfo) -> Vec<Arc<Registration>> {
        self.registrations
            .iter()
            .filter(|registration| registration.serves(service))
            .cloned()
            .collect()
    }

    pub(crate) fn set_constructor(&mut self, ty: TypeId, injection: ConstructorInjection) {
        self.constructors.insert(ty, Arc::new(injection));
    }

    #[must_use]
    pub(crate) fn constructor(&self, ty: &TypeId) -> Option<Arc<ConstructorInjection>> {
        self.constructors.get(ty).cloned()
    }

    /// Adds a method injection; a method with the same name is replaced.
    pub(crate) fn add_method(&mut self, ty: TypeId, injection: MethodInjection) {
        let methods = self.methods.entry(ty).or_default();
        match methods
            .iter_mut()
            .find(|existing| existing.method.name() == injection.method.name())
        {
            Some(existing) => *existing = injection,
            None => methods.push(injection),
        }
    }

    #[must_use]
    pub(crate) fn methods(&self, ty: &TypeId) -> Vec<MethodInjection> {
        self.methods.get(ty).cloned().unwrap_or_default()
    }

    /// Adds a property injection; a property with the same name is replaced.
    pub(crate) fn add_property(&mut self, ty: TypeId, injection: PropertyInjection) {
        let properties = self.properties.entry(ty).or_default();
        match properties
            .iter_mut()
            .find(|existing| existing.property.name() == injection.property.name())
        {
            Some(existing) => *existing = injection,
            None => properties.push(injection),
        }
    }

    #[must_use]
    pub(crate) fn properties(&self, ty: &TypeId) -> Vec<PropertyInjection> {
        self.properties.get(ty).cloned().unwrap_or_default()
    }
}
