use super::{
    base::{Attribute, AttributeSet},
    member::{MemberInfo, ParameterInfo},
};
use crate::{descriptor::TypeDescriptor, module::Module};

/// Returns a copy of the first marker of type `T`, after letting it read `member`.
#[must_use]
pub fn try_load<T>(attributes: &AttributeSet, member: &MemberInfo) -> Option<T>
where
    T: Attribute + Clone,
{
    let mut attribute = attributes.get::<T>()?.clone();
    if let Some(smart) = attribute.as_smart() {
        smart.read_member_info(member);
    }
    Some(attribute)
}

/// Returns a copy of the first marker of type `T`, after letting it read `parameter`.
#[must_use]
pub fn try_load_parameter<T>(attributes: &AttributeSet, parameter: &ParameterInfo) -> Option<T>
where
    T: Attribute + Clone,
{
    let mut attribute = attributes.get::<T>()?.clone();
    if let Some(smart) = attribute.as_smart() {
        smart.read_parameter_info(parameter);
    }
    Some(attribute)
}

/// Types of a module that carry a marker of type `T`.
pub fn find_types_with<T: Attribute>(module: &Module) -> impl Iterator<Item = &TypeDescriptor> {
    module.types().iter().filter(|ty| ty.attributes().is_defined::<T>())
}
