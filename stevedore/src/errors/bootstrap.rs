use std::path::PathBuf;

use super::{ActivationAllError, ConfigureErrorKind, RegisterErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ConfigErrorKind {
    #[error("Unable to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "config")]
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum BootstrapErrorKind {
    #[error(transparent)]
    Config(#[from] ConfigErrorKind),
    #[error("Mapping of {service} names unknown implementation {implementation}")]
    UnknownMapping { service: String, implementation: String },
    #[error("Mapping names {service}, which {implementation} doesn't provide")]
    UnknownMappedService { service: String, implementation: String },
    #[error(transparent)]
    Register(#[from] RegisterErrorKind),
    #[error(transparent)]
    Configure(#[from] ConfigureErrorKind),
    #[error(transparent)]
    Initializers(#[from] ActivationAllError),
    #[error(transparent)]
    Initializer(anyhow::Error),
}
