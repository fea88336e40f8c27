//! Container configuration: the entry module, extra modules and explicit mappings.
//!
//! With the `config` feature it can be read from TOML:
//!
//! ```toml
//! entry_module = "app"
//! modules = ["billing", "mail"]
//!
//! [[mappings]]
//! service = "app::Sender"
//! implementation = "mail::Email"
//! name = "primary"
//! lifetime = "singleton"
//! ```

use crate::lifetime::Lifetime;

#[cfg(feature = "config")]
use crate::errors::ConfigErrorKind;
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Environment variable holding the path of the configuration file.
pub const CONFIG_ENV: &str = "STEVEDORE_CONFIG";
/// Configuration file looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "Stevedore.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct Config {
    /// Module scanned first. Defaults to the executable name for the ambient container.
    pub entry_module: Option<String>,
    /// Modules scanned after the entry module, in order.
    pub modules: Vec<String>,
    /// Explicit service mappings, applied before any module is scanned.
    pub mappings: Vec<Mapping>,
}

/// Maps a service to an implementation, both named by type path.
///
/// Trait objects may be named with or without the `dyn ` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(deny_unknown_fields))]
pub struct Mapping {
    pub service: String,
    pub implementation: String,
    #[cfg_attr(feature = "config", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "config", serde(default))]
    pub lifetime: Lifetime,
}

impl Mapping {
    #[must_use]
    pub fn new(service: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            implementation: implementation.into(),
            name: None,
            lifetime: Lifetime::default(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }
}

#[cfg(feature = "config")]
impl Config {
    /// # Errors
    /// Returns an error when `raw` isn't a valid configuration.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigErrorKind> {
        Ok(toml::from_str(raw)?)
    }

    /// # Errors
    /// Returns an error when the file can't be read or isn't a valid configuration.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigErrorKind> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigErrorKind::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Reads the file named by [`CONFIG_ENV`], or [`DEFAULT_CONFIG_PATH`] if it exists.
    ///
    /// Returns `None` when neither is present.
    ///
    /// # Errors
    /// Returns an error when the file can't be read or isn't a valid configuration.
    pub fn from_env() -> Result<Option<Self>, ConfigErrorKind> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !path.is_file() {
                    return Ok(None);
                }
                path
            }
        };

        Self::from_path(path).map(Some)
    }
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use super::{Config, Mapping};
    use crate::{errors::ConfigErrorKind, lifetime::Lifetime};

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            entry_module = "app"
            modules = ["billing", "mail"]

            [[mappings]]
            service = "app::Sender"
            implementation = "mail::Email"
            name = "primary"
            lifetime = "singleton"

            [[mappings]]
            service = "app::Clock"
            implementation = "app::SystemClock"
            lifetime = "per_thread"
            "#,
        )
        .unwrap();

        assert_eq!(config.entry_module.as_deref(), Some("app"));
        assert_eq!(config.modules, ["billing", "mail"]);
        assert_eq!(
            config.mappings,
            [
                Mapping::new("app::Sender", "mail::Email")
                    .named("primary")
                    .lifetime(Lifetime::Singleton),
                Mapping::new("app::Clock", "app::SystemClock").lifetime(Lifetime::PerExecutionContext),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(Config::from_toml("entry = 1"), Err(ConfigErrorKind::Parse(_))));
        assert!(matches!(
            Config::from_toml("[[mappings]]\nservice = \"app::Sender\""),
            Err(ConfigErrorKind::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("stevedore-config-{}.toml", std::process::id()));
        std::fs::write(&path, "modules = [\"mail\"]").unwrap();

        let config = Config::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.modules, ["mail"]);

        assert!(matches!(Config::from_path(&path), Err(ConfigErrorKind::Io { .. })));
    }
}
