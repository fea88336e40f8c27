use super::BackendError;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
#[error(
    "Activation error occurred while trying to get instance of type {}, key \"{}\"",
    .service.short_name(),
    .name.as_deref().unwrap_or_default(),
)]
pub struct ActivationError {
    pub service: TypeInfo,
    pub name: Option<String>,
    #[source]
    pub source: BackendError,
}

#[derive(thiserror::Error, Debug)]
#[error("Activation error occurred while trying to get all instances of type {}", .service.short_name())]
pub struct ActivationAllError {
    pub service: TypeInfo,
    #[source]
    pub source: BackendError,
}
