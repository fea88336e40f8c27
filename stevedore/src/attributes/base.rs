use std::{
    any::{type_name, Any},
    fmt::{self, Debug, Formatter},
};

use super::member::{MemberInfo, ParameterInfo};

/// A marker that can be attached to a type, member or parameter descriptor.
///
/// Any `Clone + Send + Sync + 'static` type can be a marker:
///
/// ```
/// use stevedore::attributes::Attribute;
///
/// #[derive(Clone)]
/// struct Audited;
///
/// impl Attribute for Audited {}
/// ```
pub trait Attribute: CloneAttribute + Send + Sync + 'static {
    /// Returns the context hooks of a marker that wants to see where it was found.
    #[inline]
    fn as_smart(&mut self) -> Option<&mut dyn SmartAttribute> {
        None
    }
}

/// Marker that customizes itself from the member or parameter it decorates.
///
/// Both hooks are called on the copy returned by [`super::try_load`] and
/// [`super::try_load_parameter`], never on the stored marker.
pub trait SmartAttribute {
    fn read_member_info(&mut self, _member: &MemberInfo) {}

    fn read_parameter_info(&mut self, _parameter: &ParameterInfo) {}
}

pub trait CloneAttribute {
    #[must_use]
    fn clone_attribute(&self) -> Box<dyn Attribute>;

    fn as_any(&self) -> &dyn Any;

    fn attribute_name(&self) -> &'static str;
}

impl<T> CloneAttribute for T
where
    T: Attribute + Clone,
{
    #[inline]
    fn clone_attribute(&self) -> Box<dyn Attribute> {
        Box::new(self.clone())
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn attribute_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl Clone for Box<dyn Attribute> {
    #[inline]
    fn clone(&self) -> Self {
        (**self).clone_attribute()
    }
}

/// Ordered set of markers attached to one descriptor.
#[derive(Clone, Default)]
pub struct AttributeSet(Vec<Box<dyn Attribute>>);

impl AttributeSet {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn push(&mut self, attribute: impl Attribute) {
        self.0.push(Box::new(attribute));
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, attribute: impl Attribute) -> Self {
        self.push(attribute);
        self
    }

    #[inline]
    pub fn extend(&mut self, other: AttributeSet) {
        self.0.extend(other.0);
    }

    /// Returns the first marker of type `T`.
    #[must_use]
    pub fn get<T: Attribute>(&self) -> Option<&T> {
        self.iter_of::<T>().next()
    }

    pub fn iter_of<T: Attribute>(&self) -> impl Iterator<Item = &T> {
        self.0.iter().filter_map(|attribute| attribute.as_any().downcast_ref::<T>())
    }

    #[inline]
    #[must_use]
    pub fn is_defined<T: Attribute>(&self) -> bool {
        self.get::<T>().is_some()
    }

    #[inline]
    #[must_use]
    pub fn count_of<T: Attribute>(&self) -> usize {
        self.iter_of::<T>().count()
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

impl Debug for AttributeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|attribute| attribute.attribute_name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Attribute, AttributeSet};

    #[derive(Clone, PartialEq, Debug)]
    struct Audited(u8);

    impl Attribute for Audited {}

    #[derive(Clone)]
    struct Cached;

    impl Attribute for Cached {}

    #[test]
    fn test_get() {
        let attributes = AttributeSet::new().with(Audited(1)).with(Cached).with(Audited(2));

        assert_eq!(attributes.get::<Audited>(), Some(&Audited(1)));
        assert_eq!(attributes.count_of::<Audited>(), 2);
        assert!(attributes.is_defined::<Cached>());
        assert_eq!(attributes.len(), 3);
    }

    #[test]
    fn test_clone() {
        let attributes = AttributeSet::new().with(Audited(3));
        let cloned = attributes.clone();

        assert_eq!(cloned.get::<Audited>(), Some(&Audited(3)));
        assert!(!cloned.is_defined::<Cached>());
    }
}
