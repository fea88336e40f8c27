//! Attribute-driven dependency injection.
//!
//! Types describe themselves with a [`TypeDescriptor`] (written by hand or generated by
//! `#[injectable]`), modules group descriptors, and a [`Container`] scans modules and
//! drives a pluggable [`Backend`] that builds the object graph.

extern crate self as stevedore;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod container;
pub(crate) mod lifetime;
pub(crate) mod registry;
pub(crate) mod scanner;
pub(crate) mod service;

pub mod ambient;
pub mod attributes;
pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod linked;
pub mod locator;
pub mod module;
pub mod planner;

pub use any::{AnyValue, Instance, TypeInfo};
pub use backend::{Backend, DefaultBackend};
pub use bootstrap::{ContainerBuilder, ContainerInitializer};
pub use config::{Config, Mapping};
pub use container::Container;
pub use descriptor::{TypeDescriptor, TypeKind};
pub use errors::{ActivationAllError, ActivationError};
pub use lifetime::Lifetime;
pub use linked::LinkedModules;
pub use module::{Module, ModuleLoader, ModuleOutcome, ModuleRecord, StaticModules};

#[cfg(feature = "macros")]
pub use stevedore_macros::injectable;

#[doc(hidden)]
pub mod __private {
    pub use crate::linked::{TypeEntry, TYPE_ENTRIES};
    pub use linkme::{self, distributed_slice};
}
