mod activation;
mod bootstrap;
mod module;
mod planner;
mod resolve;

pub use activation::{ActivationAllError, ActivationError};
pub use bootstrap::{BootstrapErrorKind, ConfigErrorKind};
pub use module::{ConfigureErrorKind, ModuleLoadErrorKind, RegisterErrorKind};
pub use planner::PlannerErrorKind;
pub use resolve::{InvokeErrorKind, ResolveErrorKind};

/// Failure reported by a backend. Backends may return any error type.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;
