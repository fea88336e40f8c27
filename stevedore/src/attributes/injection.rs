use super::base::Attribute;

/// Selects the constructor the container uses, overriding arity-based selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionConstructor;

impl Attribute for InjectionConstructor {}

/// Marks a method called with resolved arguments right after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionMethod;

impl Attribute for InjectionMethod {}
