//! Resolution through the ambient container.
//!
//! Every function panics like [`ambient::current`] when the default container can't be
//! bootstrapped.

use std::sync::Arc;

use crate::{
    ambient,
    errors::{ActivationAllError, ActivationError},
};

/// See [`crate::Container::get_instance`].
///
/// # Errors
/// Returns an error carrying the backend failure.
#[inline]
pub fn get_instance<S>() -> Result<Arc<S>, ActivationError>
where
    S: ?Sized + Send + Sync + 'static,
{
    ambient::current().get_instance()
}

/// See [`crate::Container::get_named_instance`].
///
/// # Errors
/// Returns an error carrying the backend failure.
#[inline]
pub fn get_named_instance<S>(name: &str) -> Result<Arc<S>, ActivationError>
where
    S: ?Sized + Send + Sync + 'static,
{
    ambient::current().get_named_instance(name)
}

/// See [`crate::Container::get_all_instances`].
///
/// # Errors
/// Returns an error carrying the backend failure.
#[inline]
pub fn get_all_instances<S>() -> Result<Vec<Arc<S>>, ActivationAllError>
where
    S: ?Sized + Send + Sync + 'static,
{
    ambient::current().get_all_instances()
}

#[inline]
#[must_use]
pub fn try_get_instance<S>() -> Option<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    ambient::current().try_get_instance()
}

#[inline]
#[must_use]
pub fn try_get_named_instance<S>(name: &str) -> Option<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    ambient::current().try_get_named_instance(name)
}
