use super::{BackendError, PlannerErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ModuleLoadErrorKind {
    #[error("Module {name} not found")]
    NotFound { name: String },
    #[error("Unable to load module {name}")]
    Failed {
        name: String,
        #[source]
        source: BackendError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigureErrorKind {
    #[error("Failed to apply {directive} directive of {implementation} from module {module}")]
    Apply {
        module: String,
        implementation: &'static str,
        directive: &'static str,
        #[source]
        source: BackendError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum RegisterErrorKind {
    #[error("Type {name} isn't known to the module loader")]
    UnknownType { name: String },
    #[error(transparent)]
    Planner(#[from] PlannerErrorKind),
    #[error("Backend rejected {directive} directive of {implementation}")]
    Backend {
        implementation: &'static str,
        directive: &'static str,
        #[source]
        source: BackendError,
    },
}
