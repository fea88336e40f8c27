use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InvokeErrorKind {
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Argument {position} isn't an instance of {}", .expected.name)]
    IncorrectArgument { position: usize, expected: TypeInfo },
    #[error("Target isn't an instance of {}", .expected.name)]
    IncorrectTarget { expected: TypeInfo },
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No registration for {service} with name {name:?}")]
    NoRegistration { service: &'static str, name: Option<String> },
    #[error("No injection constructor registered for {implementation}")]
    NoConstructor { implementation: &'static str },
    #[error("Cyclic dependency detected: {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<&'static str> },
    #[error("Failed to resolve dependencies of {member} on {implementation}")]
    Dependency {
        implementation: &'static str,
        member: &'static str,
        #[source]
        source: Box<ResolveErrorKind>,
    },
    #[error("Instance registered for {service} has an incorrect type")]
    IncorrectType { service: &'static str },
    #[error(transparent)]
    Invoke(#[from] InvokeErrorKind),
}
