use super::{
    base::{Attribute, SmartAttribute},
    member::{MemberInfo, ParameterInfo},
};

/// Marks a property or a constructor/method parameter as resolved from the container.
///
/// Without a name the default registration of the declared type is resolved.
/// An inferred dependency takes its name from the member or parameter it decorates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    name: Option<String>,
    inferred: bool,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            inferred: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            inferred: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn inferred() -> Self {
        Self { name: None, inferred: true }
    }

    /// Resolution name; an empty name means the default registration.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    #[inline]
    #[must_use]
    pub const fn is_inferred(&self) -> bool {
        self.inferred
    }

    fn infer(&mut self, name: &str) {
        if self.inferred && self.name.is_none() {
            self.name = Some(name.to_owned());
        }
    }
}

impl Attribute for Dependency {
    #[inline]
    fn as_smart(&mut self) -> Option<&mut dyn SmartAttribute> {
        Some(self)
    }
}

impl SmartAttribute for Dependency {
    fn read_member_info(&mut self, member: &MemberInfo) {
        self.infer(member.name);
    }

    fn read_parameter_info(&mut self, parameter: &ParameterInfo) {
        self.infer(parameter.name);
    }
}
