//! The process-wide "current container".
//!
//! Without a provider, the first access bootstraps a container over the default backend
//! and the linked modules. The entry module is [`Config::entry_module`] or, failing that,
//! the name of the executable. The configuration is read with [`Config::from_env`] when
//! the `config` feature is enabled.
//!
//! A failed bootstrap is returned by [`try_current`] and nothing is cached, so the next
//! access bootstraps again. [`current`] panics on it.
//!
//! Initializers of the default container must not access the ambient container.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{const_rwlock, RwLock};
use tracing::{debug, error};

use crate::{bootstrap::ContainerBuilder, config::Config, container::Container, errors::BootstrapErrorKind};

pub type ContainerProvider = Arc<dyn Fn() -> Arc<Container> + Send + Sync>;

static PROVIDER: RwLock<Option<ContainerProvider>> = const_rwlock(None);
static DEFAULT: OnceCell<Arc<Container>> = OnceCell::new();

/// The container returned by the current provider.
///
/// # Errors
/// Returns an error when no provider is set and the default container can't be bootstrapped.
pub fn try_current() -> Result<Arc<Container>, BootstrapErrorKind> {
    let provider = PROVIDER.read().clone();
    match provider {
        Some(provider) => Ok(provider()),
        None => DEFAULT
            .get_or_try_init(|| bootstrap_default().map(Arc::new))
            .cloned()
            .map_err(|err| {
                error!("{}", err);
                err
            }),
    }
}

/// The container returned by the current provider.
///
/// # Panics
/// Panics when no provider is set and the default container can't be bootstrapped.
#[must_use]
pub fn current() -> Arc<Container> {
    match try_current() {
        Ok(container) => container,
        Err(err) => panic!("Unable to bootstrap the ambient container: {err}"),
    }
}

/// Replaces the provider. The last call wins.
pub fn set_provider<F>(provider: F)
where
    F: Fn() -> Arc<Container> + Send + Sync + 'static,
{
    *PROVIDER.write() = Some(Arc::new(provider));
}

/// Makes `container` the current container.
pub fn set_container(container: Arc<Container>) {
    set_provider(move || container.clone());
}

/// Restores the default provider.
pub fn reset_provider() {
    *PROVIDER.write() = None;
}

#[cfg(feature = "config")]
fn load_config() -> Result<Config, BootstrapErrorKind> {
    Ok(Config::from_env()?.unwrap_or_default())
}

#[cfg(not(feature = "config"))]
#[allow(clippy::unnecessary_wraps)]
fn load_config() -> Result<Config, BootstrapErrorKind> {
    Ok(Config::default())
}

fn executable_module() -> Option<String> {
    let path = std::env::current_exe().ok()?;
    let stem = path.file_stem()?.to_str()?;
    Some(stem.replace('-', "_"))
}

fn bootstrap_default() -> Result<Container, BootstrapErrorKind> {
    let config = load_config()?;
    let entry_module = config.entry_module.clone().or_else(executable_module);
    debug!(entry_module = entry_module.as_deref(), "Bootstrapping default container");

    let mut builder = ContainerBuilder::new().config(config);
    if let Some(entry_module) = entry_module {
        builder = builder.entry_module(entry_module);
    }

    builder.build()
}
