use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerErrorKind {
    #[error("Type {} is mapped to {}, but doesn't implement it", .implementation.name, .interface.name)]
    UnknownInterface { implementation: TypeInfo, interface: TypeInfo },
    #[error("Attribute {attribute} is specified more than once on {member}")]
    DuplicateAttribute { member: String, attribute: &'static str },
    #[error("Unable to read generic definition of {} implemented by {}", .interface.name, .implementation.name)]
    MalformedGeneric { implementation: TypeInfo, interface: TypeInfo },
}
