//! The contract between the facade and the object graph builder.

mod default;

pub use default::DefaultBackend;
pub use crate::errors::BackendError;

use std::fmt::{self, Debug, Formatter};

use crate::{
    any::{AnyValue, Instance, TypeInfo},
    errors::InvokeErrorKind,
    lifetime::Lifetime,
    service::{BoxedCaster, BoxedConstructor, BoxedMethod, BoxedSetter},
};

/// Key a type mapping is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Exact(TypeInfo),
    /// Every closed instantiation of a generic definition, e.g. `dyn app::Repository`.
    OpenGeneric { definition: &'static str },
}

impl ServiceType {
    /// Whether a request for `service` may be served by this key.
    #[must_use]
    pub fn accepts(&self, service: &TypeInfo) -> bool {
        match self {
            Self::Exact(info) => info == service,
            Self::OpenGeneric { definition } => service.generic_definition() == Some(*definition),
        }
    }
}

/// How one constructor/method parameter or property is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ByType(TypeInfo),
    Named(TypeInfo, String),
}

impl Resolution {
    #[inline]
    #[must_use]
    pub fn new(service: TypeInfo, name: Option<&str>) -> Self {
        match name {
            Some(name) => Self::Named(service, name.to_owned()),
            None => Self::ByType(service),
        }
    }

    #[inline]
    #[must_use]
    pub const fn service(&self) -> TypeInfo {
        match self {
            Self::ByType(service) | Self::Named(service, _) => *service,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ByType(_) => None,
            Self::Named(_, name) => Some(name),
        }
    }
}

/// Ordered resolutions, one per parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPlan(Vec<Resolution>);

impl ParameterPlan {
    #[inline]
    #[must_use]
    pub const fn new(resolutions: Vec<Resolution>) -> Self {
        Self(resolutions)
    }

    #[inline]
    #[must_use]
    pub fn resolutions(&self) -> &[Resolution] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Resolution> for ParameterPlan {
    fn from_iter<T: IntoIterator<Item = Resolution>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An implementation type together with the up-cast to the service it provides.
#[derive(Clone)]
pub struct Implementation {
    info: TypeInfo,
    provides: TypeInfo,
    caster: BoxedCaster,
}

impl Implementation {
    #[inline]
    pub(crate) const fn new(info: TypeInfo, provides: TypeInfo, caster: BoxedCaster) -> Self {
        Self { info, provides, caster }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> TypeInfo {
        self.info
    }

    /// The closed service type produced by [`Self::share`].
    #[inline]
    #[must_use]
    pub const fn provides(&self) -> TypeInfo {
        self.provides
    }

    /// Shares a freshly built value of the implementation as the provided service.
    #[inline]
    pub fn share(&self, value: AnyValue) -> Result<Instance, InvokeErrorKind> {
        self.caster.invoke(value)
    }
}

impl Debug for Implementation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("info", &self.info.name)
            .field("provides", &self.provides.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ConstructorRef {
    name: &'static str,
    invoker: BoxedConstructor,
    identity: Option<BoxedCaster>,
}

impl ConstructorRef {
    #[inline]
    pub(crate) const fn new(name: &'static str, invoker: BoxedConstructor, identity: Option<BoxedCaster>) -> Self {
        Self { name, invoker, identity }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn construct(&self, arguments: Vec<Instance>) -> Result<AnyValue, InvokeErrorKind> {
        self.invoker.invoke(arguments)
    }

    /// Shares a constructed value as its own type, if the type is known.
    #[inline]
    pub fn share(&self, value: AnyValue) -> Option<Result<Instance, InvokeErrorKind>> {
        self.identity.as_ref().map(|identity| identity.invoke(value))
    }
}

impl Debug for ConstructorRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstructorRef").field(&self.name).finish()
    }
}

#[derive(Clone)]
pub struct MethodRef {
    name: &'static str,
    invoker: BoxedMethod,
}

impl MethodRef {
    #[inline]
    pub(crate) const fn new(name: &'static str, invoker: BoxedMethod) -> Self {
        Self { name, invoker }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn invoke(&self, target: AnyValue, arguments: Vec<Instance>) -> Result<AnyValue, InvokeErrorKind> {
        self.invoker.invoke((target, arguments))
    }
}

impl Debug for MethodRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodRef").field(&self.name).finish()
    }
}

#[derive(Clone)]
pub struct PropertyRef {
    name: &'static str,
    declared: TypeInfo,
    setter: BoxedSetter,
}

impl PropertyRef {
    #[inline]
    pub(crate) const fn new(name: &'static str, declared: TypeInfo, setter: BoxedSetter) -> Self {
        Self { name, declared, setter }
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn declared_type(&self) -> TypeInfo {
        self.declared
    }

    #[inline]
    pub fn set(&self, target: AnyValue, value: Instance) -> Result<AnyValue, InvokeErrorKind> {
        self.setter.invoke((target, value))
    }
}

impl Debug for PropertyRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRef")
            .field("name", &self.name)
            .field("declared", &self.declared.name)
            .finish()
    }
}

/// Object graph builder driven by registration directives.
///
/// All operations take `&self`; implementations synchronize internally.
pub trait Backend: Send + Sync + 'static {
    fn register_type(
        &self,
        service: ServiceType,
        implementation: Implementation,
        name: Option<&str>,
        lifetime: Lifetime,
    ) -> Result<(), BackendError>;

    /// `instance` holds an `Arc<S>` where `S` is the `service` type.
    fn register_instance(&self, service: TypeInfo, name: Option<&str>, instance: Instance) -> Result<(), BackendError>;

    fn resolve(&self, service: TypeInfo, name: Option<&str>) -> Result<Instance, BackendError>;

    /// Every registration of `service`. Resolves to an empty list when nothing is registered.
    fn resolve_all(&self, service: TypeInfo) -> Result<Vec<Instance>, BackendError>;

    /// Runs property and method injection on an existing value and hands it back.
    fn inject_into(&self, ty: TypeInfo, existing: AnyValue) -> Result<AnyValue, BackendError>;

    fn register_constructor_injection(
        &self,
        ty: TypeInfo,
        constructor: ConstructorRef,
        parameters: ParameterPlan,
    ) -> Result<(), BackendError>;

    fn register_method_injection(&self, ty: TypeInfo, method: MethodRef, parameters: ParameterPlan) -> Result<(), BackendError>;

    fn register_property_injection(&self, ty: TypeInfo, property: PropertyRef, resolution: Resolution) -> Result<(), BackendError>;
}
