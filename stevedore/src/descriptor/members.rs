use std::sync::Arc;

use super::invoke::{Constructor, Method};
use crate::{
    any::{erase, unerase, AnyValue, Instance, TypeInfo},
    attributes::{Attribute, AttributeSet, MemberInfo, MemberKind, ParameterInfo},
    errors::InvokeErrorKind,
    service::{service_fn, BoxCloneService, BoxedCaster, BoxedConstructor, BoxedMethod, BoxedSetter},
};

const ARGUMENT_NAMES: [&str; 12] = [
    "arg0", "arg1", "arg2", "arg3", "arg4", "arg5", "arg6", "arg7", "arg8", "arg9", "arg10", "arg11",
];

fn parameters(types: Vec<TypeInfo>) -> Vec<ParameterDescriptor> {
    types
        .into_iter()
        .enumerate()
        .map(|(position, info)| ParameterDescriptor {
            name: ARGUMENT_NAMES.get(position).copied().unwrap_or("arg"),
            position,
            info,
            attributes: AttributeSet::new(),
        })
        .collect()
}

fn rename(parameters: &mut [ParameterDescriptor], names: &[&'static str]) {
    for (parameter, name) in parameters.iter_mut().zip(names) {
        parameter.name = *name;
    }
}

fn annotate(parameters: &mut [ParameterDescriptor], position: usize, attribute: impl Attribute) {
    if let Some(parameter) = parameters.get_mut(position) {
        parameter.attributes.push(attribute);
    }
}

pub(crate) fn boxed_caster<T, I>(cast: fn(Arc<T>) -> Arc<I>) -> BoxedCaster
where
    T: Send + Sync + 'static,
    I: ?Sized + Send + Sync + 'static,
{
    BoxCloneService::new(service_fn(move |value: AnyValue| match value.downcast::<T>() {
        Ok(value) => Ok(erase(cast(Arc::from(value)))),
        Err(_) => Err(InvokeErrorKind::IncorrectTarget {
            expected: TypeInfo::of::<T>(),
        }),
    }))
}

#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: &'static str,
    position: usize,
    info: TypeInfo,
    attributes: AttributeSet,
}

impl ParameterDescriptor {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> TypeInfo {
        self.info
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[must_use]
    pub const fn parameter_info(&self, member: MemberInfo) -> ParameterInfo {
        ParameterInfo {
            member,
            name: self.name,
            position: self.position,
            parameter_type: self.info,
        }
    }
}

/// An interface implemented by a type, with the up-cast that shares the type as it.
#[derive(Clone)]
pub struct InterfaceDescriptor {
    info: TypeInfo,
    caster: BoxedCaster,
}

impl InterfaceDescriptor {
    #[must_use]
    pub fn new<T, I>(cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        T: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            info: TypeInfo::of::<I>(),
            caster: boxed_caster(cast),
        }
    }

    #[inline]
    #[must_use]
    pub const fn info(&self) -> TypeInfo {
        self.info
    }

    #[inline]
    pub(crate) const fn caster(&self) -> &BoxedCaster {
        &self.caster
    }
}

#[derive(Clone)]
pub struct ConstructorDescriptor {
    declaring: TypeInfo,
    name: &'static str,
    public: bool,
    attributes: AttributeSet,
    parameters: Vec<ParameterDescriptor>,
    invoker: BoxedConstructor,
}

impl ConstructorDescriptor {
    #[must_use]
    pub fn new<T, Args, F>(name: &'static str, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Constructor<T, Args>,
    {
        Self {
            declaring: TypeInfo::of::<T>(),
            name,
            public: true,
            attributes: AttributeSet::new(),
            parameters: parameters(F::parameter_types()),
            invoker: BoxCloneService::new(service_fn(move |arguments: Vec<Instance>| {
                constructor.construct(arguments).map(|value| Box::new(value) as AnyValue)
            })),
        }
    }

    #[inline]
    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: impl Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Attaches a marker to the parameter at `position`. Out of range positions are ignored.
    #[inline]
    #[must_use]
    pub fn parameter_attribute(mut self, position: usize, attribute: impl Attribute) -> Self {
        annotate(&mut self.parameters, position, attribute);
        self
    }

    #[inline]
    #[must_use]
    pub fn parameter_names(mut self, names: &[&'static str]) -> Self {
        rename(&mut self.parameters, names);
        self
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub const fn member_info(&self) -> MemberInfo {
        MemberInfo {
            declaring_type: self.declaring,
            name: self.name,
            kind: MemberKind::Constructor,
            member_type: None,
        }
    }

    #[inline]
    pub(crate) const fn invoker(&self) -> &BoxedConstructor {
        &self.invoker
    }
}

#[derive(Clone)]
pub struct MethodDescriptor {
    declaring: TypeInfo,
    name: &'static str,
    public: bool,
    attributes: AttributeSet,
    parameters: Vec<ParameterDescriptor>,
    invoker: BoxedMethod,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new<T, Args, F>(name: &'static str, method: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Method<T, Args>,
    {
        Self {
            declaring: TypeInfo::of::<T>(),
            name,
            public: true,
            attributes: AttributeSet::new(),
            parameters: parameters(F::parameter_types()),
            invoker: BoxCloneService::new(service_fn(
                move |(mut target, arguments): (AnyValue, Vec<Instance>)| {
                    let Some(this) = target.downcast_mut::<T>() else {
                        return Err(InvokeErrorKind::IncorrectTarget {
                            expected: TypeInfo::of::<T>(),
                        });
                    };
                    method.invoke(this, arguments)?;
                    Ok(target)
                },
            )),
        }
    }

    #[inline]
    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: impl Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[inline]
    #[must_use]
    pub fn parameter_attribute(mut self, position: usize, attribute: impl Attribute) -> Self {
        annotate(&mut self.parameters, position, attribute);
        self
    }

    #[inline]
    #[must_use]
    pub fn parameter_names(mut self, names: &[&'static str]) -> Self {
        rename(&mut self.parameters, names);
        self
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub const fn member_info(&self) -> MemberInfo {
        MemberInfo {
            declaring_type: self.declaring,
            name: self.name,
            kind: MemberKind::Method,
            member_type: None,
        }
    }

    #[inline]
    pub(crate) const fn invoker(&self) -> &BoxedMethod {
        &self.invoker
    }
}

#[derive(Clone)]
pub struct PropertyDescriptor {
    declaring: TypeInfo,
    name: &'static str,
    public: bool,
    indexed: bool,
    declared: TypeInfo,
    attributes: AttributeSet,
    setter: Option<BoxedSetter>,
}

impl PropertyDescriptor {
    #[must_use]
    pub fn new<T, P, F>(name: &'static str, setter: F) -> Self
    where
        T: Send + Sync + 'static,
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Clone + Send + Sync + 'static,
    {
        Self {
            setter: Some(BoxCloneService::new(service_fn(
                move |(mut target, value): (AnyValue, Instance)| {
                    let Some(this) = target.downcast_mut::<T>() else {
                        return Err(InvokeErrorKind::IncorrectTarget {
                            expected: TypeInfo::of::<T>(),
                        });
                    };
                    let Some(value) = unerase::<P>(&value) else {
                        return Err(InvokeErrorKind::IncorrectArgument {
                            position: 0,
                            expected: TypeInfo::of::<P>(),
                        });
                    };
                    setter(this, value);
                    Ok(target)
                },
            ))),
            ..Self::read_only::<T, P>(name)
        }
    }

    /// A property the container can see but never write.
    #[must_use]
    pub fn read_only<T, P>(name: &'static str) -> Self
    where
        T: 'static,
        P: ?Sized + 'static,
    {
        Self {
            declaring: TypeInfo::of::<T>(),
            name,
            public: true,
            indexed: false,
            declared: TypeInfo::of::<P>(),
            attributes: AttributeSet::new(),
            setter: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    #[inline]
    #[must_use]
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: impl Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.indexed
    }

    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    #[inline]
    #[must_use]
    pub const fn declared_type(&self) -> TypeInfo {
        self.declared
    }

    #[inline]
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[must_use]
    pub const fn member_info(&self) -> MemberInfo {
        MemberInfo {
            declaring_type: self.declaring,
            name: self.name,
            kind: MemberKind::Property,
            member_type: Some(self.declared),
        }
    }

    #[inline]
    pub(crate) const fn setter(&self) -> Option<&BoxedSetter> {
        self.setter.as_ref()
    }
}
