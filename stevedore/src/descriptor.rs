//! Inspectable type metadata used in place of runtime reflection.

mod invoke;
mod members;

pub use invoke::{Constructor, Method};
pub use members::{ConstructorDescriptor, InterfaceDescriptor, MethodDescriptor, ParameterDescriptor, PropertyDescriptor};

pub(crate) use members::boxed_caster;

use std::{
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    sync::Arc,
};

use crate::{
    any::TypeInfo,
    attributes::{Attribute, AttributeSet, MemberInfo, MemberKind},
    service::BoxedCaster,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    #[default]
    Struct,
    Enum,
    Trait,
}

impl TypeKind {
    /// Whether values of the kind can be constructed and registered.
    #[inline]
    #[must_use]
    pub const fn is_class_like(&self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }
}

#[derive(Clone)]
pub struct TypeDescriptor {
    info: TypeInfo,
    kind: TypeKind,
    attributes: AttributeSet,
    interfaces: Vec<InterfaceDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    methods: Vec<MethodDescriptor>,
    properties: Vec<PropertyDescriptor>,
    identity: Option<BoxedCaster>,
}

impl TypeDescriptor {
    #[inline]
    #[must_use]
    pub fn builder<T>() -> TypeDescriptorBuilder<T>
    where
        T: Send + Sync + 'static,
    {
        TypeDescriptorBuilder {
            descriptor: Self {
                identity: Some(boxed_caster::<T, T>(|value| value)),
                ..Self::empty(TypeInfo::of::<T>(), TypeKind::Struct)
            },
            _marker: PhantomData,
        }
    }

    /// Descriptor of an interface. Interfaces are never registered themselves.
    #[inline]
    #[must_use]
    pub fn of_trait<I: ?Sized + 'static>() -> Self {
        Self::empty(TypeInfo::of::<I>(), TypeKind::Trait)
    }

    fn empty(info: TypeInfo, kind: TypeKind) -> Self {
        Self {
            info,
            kind,
            attributes: AttributeSet::new(),
            interfaces: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            identity: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> TypeInfo {
        self.info
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn interfaces(&self) -> &[InterfaceDescriptor] {
        &self.interfaces
    }

    #[inline]
    #[must_use]
    pub fn interface(&self, info: &TypeInfo) -> Option<&InterfaceDescriptor> {
        self.interfaces.iter().find(|interface| interface.info() == *info)
    }

    #[inline]
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    #[must_use]
    pub const fn member_info(&self) -> MemberInfo {
        MemberInfo {
            declaring_type: self.info,
            name: self.info.name,
            kind: MemberKind::Type,
            member_type: None,
        }
    }

    /// Shares a value of the type as itself.
    #[inline]
    pub(crate) const fn identity(&self) -> Option<&BoxedCaster> {
        self.identity.as_ref()
    }

    /// Folds another fragment of the same type into this one.
    ///
    /// Members keep their order, interfaces are kept once.
    pub(crate) fn merge(&mut self, other: TypeDescriptor) {
        debug_assert_eq!(self.info, other.info);

        if other.kind != TypeKind::default() {
            self.kind = other.kind;
        }
        if self.identity.is_none() {
            self.identity = other.identity;
        }
        self.attributes.extend(other.attributes);
        for interface in other.interfaces {
            if self.interface(&interface.info()).is_none() {
                self.interfaces.push(interface);
            }
        }
        self.constructors.extend(other.constructors);
        self.methods.extend(other.methods);
        self.properties.extend(other.properties);
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.info.name)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .field(
                "interfaces",
                &self.interfaces.iter().map(|interface| interface.info().name).collect::<Vec<_>>(),
            )
            .field(
                "constructors",
                &self.constructors.iter().map(ConstructorDescriptor::name).collect::<Vec<_>>(),
            )
            .field("methods", &self.methods.iter().map(MethodDescriptor::name).collect::<Vec<_>>())
            .field(
                "properties",
                &self.properties.iter().map(PropertyDescriptor::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Typed builder of a [`TypeDescriptor`].
///
/// ```
/// use std::sync::Arc;
/// use stevedore::{attributes::ServiceImplementation, TypeDescriptor};
///
/// trait Greeter: Send + Sync {}
///
/// struct Loud;
///
/// impl Greeter for Loud {}
///
/// let descriptor = TypeDescriptor::builder::<Loud>()
///     .attribute(ServiceImplementation::new())
///     .implements::<dyn Greeter>(|it| it)
///     .constructor("new", || Loud)
///     .build();
///
/// assert_eq!(descriptor.interfaces().len(), 1);
/// ```
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeDescriptorBuilder<T>
where
    T: Send + Sync + 'static,
{
    #[inline]
    #[must_use]
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: impl Attribute) -> Self {
        self.descriptor.attributes.push(attribute);
        self
    }

    /// Declares `I` as implemented, with the up-cast from `Arc<T>`.
    #[inline]
    #[must_use]
    pub fn implements<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let interface = InterfaceDescriptor::new(cast);
        if self.descriptor.interface(&interface.info()).is_none() {
            self.descriptor.interfaces.push(interface);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn constructor<Args, F>(self, name: &'static str, constructor: F) -> Self
    where
        F: Constructor<T, Args>,
    {
        self.constructor_with(ConstructorDescriptor::new(name, constructor))
    }

    #[inline]
    #[must_use]
    pub fn constructor_with(mut self, constructor: ConstructorDescriptor) -> Self {
        self.descriptor.constructors.push(constructor);
        self
    }

    #[inline]
    #[must_use]
    pub fn method<Args, F>(self, name: &'static str, method: F) -> Self
    where
        F: Method<T, Args>,
    {
        self.method_with(MethodDescriptor::new(name, method))
    }

    #[inline]
    #[must_use]
    pub fn method_with(mut self, method: MethodDescriptor) -> Self {
        self.descriptor.methods.push(method);
        self
    }

    #[inline]
    #[must_use]
    pub fn property<P, F>(self, name: &'static str, setter: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Clone + Send + Sync + 'static,
    {
        self.property_with(PropertyDescriptor::new(name, setter))
    }

    #[inline]
    #[must_use]
    pub fn property_with(mut self, property: PropertyDescriptor) -> Self {
        self.descriptor.properties.push(property);
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeDescriptor, TypeKind};
    use crate::{
        any::{erase, unerase, AnyValue, TypeInfo},
        attributes::{Dependency, InjectionMethod},
        descriptor::{MethodDescriptor, PropertyDescriptor},
    };

    use std::sync::Arc;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    trait Named: Send + Sync {}

    struct Fixed;

    impl Clock for Fixed {
        fn now(&self) -> u64 {
            42
        }
    }

    #[derive(Default)]
    struct Scheduler {
        clock: Option<Arc<dyn Clock>>,
        started: Option<u64>,
    }

    impl Named for Scheduler {}

    impl Scheduler {
        fn start(&mut self, clock: Arc<dyn Clock>) {
            self.started = Some(clock.now());
        }
    }

    #[test]
    fn test_builder() {
        let descriptor = TypeDescriptor::builder::<Scheduler>()
            .implements::<dyn Named>(|it| it)
            .implements::<dyn Named>(|it| it)
            .constructor("new", Scheduler::default)
            .method_with(MethodDescriptor::new("start", Scheduler::start).attribute(InjectionMethod))
            .property_with(
                PropertyDescriptor::new("clock", |this: &mut Scheduler, clock: Arc<dyn Clock>| {
                    this.clock = Some(clock);
                })
                .attribute(Dependency::new()),
            )
            .build();

        assert_eq!(descriptor.info(), TypeInfo::of::<Scheduler>());
        assert_eq!(descriptor.kind(), TypeKind::Struct);
        assert_eq!(descriptor.interfaces().len(), 1);
        assert_eq!(descriptor.constructors()[0].arity(), 0);
        assert_eq!(descriptor.methods()[0].parameters()[0].info(), TypeInfo::of::<dyn Clock>());
        assert_eq!(descriptor.properties()[0].declared_type(), TypeInfo::of::<dyn Clock>());
        assert!(descriptor.properties()[0].is_writable());
    }

    #[test]
    fn test_invokers() {
        let descriptor = TypeDescriptor::builder::<Scheduler>()
            .implements::<dyn Named>(|it| it)
            .constructor("new", Scheduler::default)
            .method("start", Scheduler::start)
            .property("clock", |this: &mut Scheduler, clock: Arc<dyn Clock>| this.clock = Some(clock))
            .build();
        let clock: Arc<dyn Clock> = Arc::new(Fixed);

        let value = descriptor.constructors()[0].invoker().invoke(vec![]).unwrap();
        let value = descriptor.properties()[0]
            .setter()
            .unwrap()
            .invoke((value, erase(clock.clone())))
            .unwrap();
        let value = descriptor.methods()[0]
            .invoker()
            .invoke((value, vec![erase(clock)]))
            .unwrap();

        let scheduler = value.downcast_ref::<Scheduler>().unwrap();
        assert_eq!(scheduler.started, Some(42));
        assert!(scheduler.clock.is_some());

        let instance = descriptor.interfaces()[0].caster().invoke(value).unwrap();
        assert!(unerase::<dyn Named>(&instance).is_some());

        let err = descriptor.methods()[0]
            .invoker()
            .invoke((Box::new(1u8) as AnyValue, vec![]))
            .unwrap_err();
        assert!(err.to_string().contains("Target"));
    }

    #[test]
    fn test_merge() {
        let mut descriptor = TypeDescriptor::builder::<Scheduler>()
            .property("clock", |this: &mut Scheduler, clock: Arc<dyn Clock>| this.clock = Some(clock))
            .build();
        descriptor.merge(
            TypeDescriptor::builder::<Scheduler>()
                .implements::<dyn Named>(|it| it)
                .constructor("new", Scheduler::default)
                .build(),
        );
        descriptor.merge(TypeDescriptor::builder::<Scheduler>().implements::<dyn Named>(|it| it).build());

        assert_eq!(descriptor.interfaces().len(), 1);
        assert_eq!(descriptor.constructors().len(), 1);
        assert_eq!(descriptor.properties().len(), 1);
        assert!(descriptor.identity().is_some());
    }

    #[test]
    fn test_of_trait() {
        let descriptor = TypeDescriptor::of_trait::<dyn Clock>();

        assert_eq!(descriptor.kind(), TypeKind::Trait);
        assert!(!descriptor.kind().is_class_like());
        assert!(descriptor.identity().is_none());
    }
}
