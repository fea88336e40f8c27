use parking_lot::RwLock;
use tracing::debug;

use super::{Backend, BackendError, ConstructorRef, Implementation, MethodRef, ParameterPlan, PropertyRef, Resolution, ServiceType};
use crate::{
    any::{AnyValue, Instance, TypeInfo},
    errors::ResolveErrorKind,
    lifetime::Lifetime,
    registry::{ConstructorInjection, MethodInjection, PropertyInjection, Registration, Registry, Target},
};

/// Services requested by the resolution in progress, outermost first.
#[derive(Default)]
struct ResolutionPath(Vec<(TypeInfo, Option<String>)>);

impl ResolutionPath {
    fn enter(&mut self, service: &TypeInfo, name: Option<&str>) -> Result<(), ResolveErrorKind> {
        if self
            .0
            .iter()
            .any(|(entered, entered_name)| entered == service && entered_name.as_deref() == name)
        {
            let mut path = self.0.iter().map(|(entered, _)| entered.name).collect::<Vec<_>>();
            path.push(service.name);
            return Err(ResolveErrorKind::CyclicDependency { path });
        }

        self.0.push((*service, name.map(ToOwned::to_owned)));
        Ok(())
    }

    fn leave(&mut self) {
        self.0.pop();
    }
}

/// In-process backend: a registration table with per-registration lifetime caches.
///
/// Registrations are guarded by a read-write lock that is never held while user
/// constructors, setters or injection methods run.
#[derive(Default)]
pub struct DefaultBackend {
    registry: RwLock<Registry>,
}

impl DefaultBackend {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_in(&self, service: &TypeInfo, name: Option<&str>, path: &mut ResolutionPath) -> Result<Instance, ResolveErrorKind> {
        path.enter(service, name)?;
        let result = self.resolve_entered(service, name, path);
        path.leave();
        result
    }

    fn resolve_entered(&self, service: &TypeInfo, name: Option<&str>, path: &mut ResolutionPath) -> Result<Instance, ResolveErrorKind> {
        let registration = self.registry.read().find(service, name);
        if let Some(registration) = registration {
            return self.activate(&registration, path);
        }

        if name.is_none() {
            let injection = self.registry.read().constructor(&service.id);
            if let Some(injection) = injection {
                debug!(service = service.name, "Constructing unregistered type");
                let value = self.construct(service, &injection, path)?;
                if let Some(shared) = injection.constructor.share(value) {
                    return shared.map_err(Into::into);
                }
            }
        }

        Err(ResolveErrorKind::NoRegistration {
            service: service.name,
            name: name.map(ToOwned::to_owned),
        })
    }

    fn activate(&self, registration: &Registration, path: &mut ResolutionPath) -> Result<Instance, ResolveErrorKind> {
        match &registration.target {
            Target::Instance(instance) => Ok(instance.clone()),
            Target::Type(implementation) => registration.cache.get_or_create(|| {
                let ty = implementation.info();
                let injection = self
                    .registry
                    .read()
                    .constructor(&ty.id)
                    .ok_or(ResolveErrorKind::NoConstructor { implementation: ty.name })?;

                let value = self.construct(&ty, &injection, path)?;
                debug!(implementation = ty.name, "Constructed");
                implementation.share(value).map_err(Into::into)
            }),
        }
    }

    fn resolve_plan(&self, plan: &ParameterPlan, path: &mut ResolutionPath) -> Result<Vec<Instance>, ResolveErrorKind> {
        plan.resolutions()
            .iter()
            .map(|resolution| self.resolve_in(&resolution.service(), resolution.name(), path))
            .collect()
    }

    fn construct(&self, ty: &TypeInfo, injection: &ConstructorInjection, path: &mut ResolutionPath) -> Result<AnyValue, ResolveErrorKind> {
        let arguments = self
            .resolve_plan(&injection.parameters, path)
            .map_err(|source| ResolveErrorKind::Dependency {
                implementation: ty.name,
                member: injection.constructor.name(),
                source: Box::new(source),
            })?;
        let value = injection.constructor.construct(arguments)?;

        self.inject(ty, value, path)
    }

    /// Property injection first, then injection methods.
    fn inject(&self, ty: &TypeInfo, mut value: AnyValue, path: &mut ResolutionPath) -> Result<AnyValue, ResolveErrorKind> {
        let (properties, methods) = {
            let registry = self.registry.read();
            (registry.properties(&ty.id), registry.methods(&ty.id))
        };

        for PropertyInjection { property, resolution } in properties {
            let dependency = self
                .resolve_in(&resolution.service(), resolution.name(), path)
                .map_err(|source| ResolveErrorKind::Dependency {
                    implementation: ty.name,
                    member: property.name(),
                    source: Box::new(source),
                })?;
            value = property.set(value, dependency)?;
        }

        for MethodInjection { method, parameters } in methods {
            let arguments = self
                .resolve_plan(&parameters, path)
                .map_err(|source| ResolveErrorKind::Dependency {
                    implementation: ty.name,
                    member: method.name(),
                    source: Box::new(source),
                })?;
            value = method.invoke(value, arguments)?;
        }

        Ok(value)
    }
}

impl Backend for DefaultBackend {
    fn register_type(
        &self,
        service: ServiceType,
        implementation: Implementation,
        name: Option<&str>,
        lifetime: Lifetime,
    ) -> Result<(), BackendError> {
        debug!(
            ?service,
            implementation = implementation.info().name,
            name,
            lifetime = lifetime.name(),
            "Type registered"
        );
        self.registry
            .write()
            .insert(Registration::from_type(service, implementation, name, lifetime));
        Ok(())
    }

    fn register_instance(&self, service: TypeInfo, name: Option<&str>, instance: Instance) -> Result<(), BackendError> {
        debug!(service = service.name, name, "Instance registered");
        self.registry
            .write()
            .insert(Registration::from_instance(service, name, instance));
        Ok(())
    }

    fn resolve(&self, service: TypeInfo, name: Option<&str>) -> Result<Instance, BackendError> {
        Ok(self.resolve_in(&service, name, &mut ResolutionPath::default())?)
    }

    fn resolve_all(&self, service: TypeInfo) -> Result<Vec<Instance>, BackendError> {
        let registrations = self.registry.read().find_all(&service);
        let mut path = ResolutionPath::default();
        let mut instances = Vec::with_capacity(registrations.len());

        for registration in registrations {
            path.enter(&service, registration.name.as_deref())?;
            let instance = self.activate(&registration, &mut path);
            path.leave();
            instances.push(instance?);
        }

        Ok(instances)
    }

    fn inject_into(&self, ty: TypeInfo, existing: AnyValue) -> Result<AnyValue, BackendError> {
        Ok(self.inject(&ty, existing, &mut ResolutionPath::default())?)
    }

    fn register_constructor_injection(
        &self,
        ty: TypeInfo,
        constructor: ConstructorRef,
        parameters: ParameterPlan,
    ) -> Result<(), BackendError> {
        debug!(ty = ty.name, constructor = constructor.name(), "Constructor injection registered");
        self.registry
            .write()
            .set_constructor(ty.id, ConstructorInjection { constructor, parameters });
        Ok(())
    }

    fn register_method_injection(&self, ty: TypeInfo, method: MethodRef, parameters: ParameterPlan) -> Result<(), BackendError> {
        debug!(ty = ty.name, method = method.name(), "Method injection registered");
        self.registry.write().add_method(ty.id, MethodInjection { method, parameters });
        Ok(())
    }

    fn register_property_injection(&self, ty: TypeInfo, property: PropertyRef, resolution: Resolution) -> Result<(), BackendError> {
        debug!(ty = ty.name, property = property.name(), "Property injection registered");
        self.registry.write().add_property(ty.id, PropertyInjection { property, resolution });
        Ok(())
    }
}
