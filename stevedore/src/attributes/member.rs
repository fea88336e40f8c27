use crate::any::TypeInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Type,
    Constructor,
    Method,
    Property,
}

/// Where a marker was found.
#[derive(Debug, Clone, Copy)]
pub struct MemberInfo {
    pub declaring_type: TypeInfo,
    pub name: &'static str,
    pub kind: MemberKind,
    /// Declared type of a property.
    pub member_type: Option<TypeInfo>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParameterInfo {
    pub member: MemberInfo,
    pub name: &'static str,
    pub position: usize,
    pub parameter_type: TypeInfo,
}
