use crate::{
    any::TypeInfo,
    backend::{Backend, BackendError, ConstructorRef, Implementation, MethodRef, ParameterPlan, PropertyRef, Resolution, ServiceType},
    lifetime::Lifetime,
};

#[derive(Debug, Clone)]
pub struct ServiceDirective {
    pub service: ServiceType,
    pub implementation: Implementation,
    pub name: Option<String>,
    pub lifetime: Lifetime,
}

#[derive(Debug, Clone)]
pub struct ConstructorDirective {
    pub implementation: TypeInfo,
    pub constructor: ConstructorRef,
    pub parameters: ParameterPlan,
}

#[derive(Debug, Clone)]
pub struct MethodDirective {
    pub implementation: TypeInfo,
    pub method: MethodRef,
    pub parameters: ParameterPlan,
}

#[derive(Debug, Clone)]
pub struct PropertyDirective {
    pub implementation: TypeInfo,
    pub property: PropertyRef,
    pub resolution: Resolution,
}

#[derive(Debug, Clone)]
pub enum Directive {
    Service(ServiceDirective),
    Constructor(ConstructorDirective),
    Method(MethodDirective),
    Property(PropertyDirective),
}

impl Directive {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "service",
            Self::Constructor(_) => "constructor",
            Self::Method(_) => "method",
            Self::Property(_) => "property",
        }
    }

    pub fn apply(self, backend: &dyn Backend) -> Result<(), BackendError> {
        match self {
            Self::Service(ServiceDirective {
                service,
                implementation,
                name,
                lifetime,
            }) => backend.register_type(service, implementation, name.as_deref(), lifetime),
            Self::Constructor(ConstructorDirective {
                implementation,
                constructor,
                parameters,
            }) => backend.register_constructor_injection(implementation, constructor, parameters),
            Self::Method(MethodDirective {
                implementation,
                method,
                parameters,
            }) => backend.register_method_injection(implementation, method, parameters),
            Self::Property(PropertyDirective {
                implementation,
                property,
                resolution,
            }) => backend.register_property_injection(implementation, property, resolution),
        }
    }
}

/// Everything the markers of one type ask the backend to do.
#[derive(Debug, Clone)]
pub struct RegistrationPlan {
    pub implementation: TypeInfo,
    pub services: Vec<ServiceDirective>,
    pub constructor: Option<ConstructorDirective>,
    pub methods: Vec<MethodDirective>,
    pub properties: Vec<PropertyDirective>,
}

impl RegistrationPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.constructor.is_none() && self.methods.is_empty() && self.properties.is_empty()
    }

    /// Directives in application order: services, constructor, methods, properties.
    #[must_use]
    pub fn into_directives(self) -> Vec<Directive> {
        self.services
            .into_iter()
            .map(Directive::Service)
            .chain(self.constructor.map(Directive::Constructor))
            .chain(self.methods.into_iter().map(Directive::Method))
            .chain(self.properties.into_iter().map(Directive::Property))
            .collect()
    }
}
