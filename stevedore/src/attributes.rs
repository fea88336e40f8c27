//! Declarative markers attached to types, members and parameters.

mod base;
mod dependency;
mod helper;
mod injection;
mod member;
mod service_implementation;

pub use base::{Attribute, AttributeSet, CloneAttribute, SmartAttribute};
pub use dependency::Dependency;
pub use helper::{find_types_with, try_load, try_load_parameter};
pub use injection::{InjectionConstructor, InjectionMethod};
pub use member::{MemberInfo, MemberKind, ParameterInfo};
pub use service_implementation::ServiceImplementation;
