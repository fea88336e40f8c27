//! Container setup: mappings, modules, then initializers.

use std::sync::Arc;

use tracing::{debug, error, info_span};

use crate::{
    backend::{Backend, DefaultBackend},
    config::{Config, Mapping},
    container::Container,
    descriptor::InterfaceDescriptor,
    errors::BootstrapErrorKind,
    linked::LinkedModules,
    module::ModuleLoader,
};

/// Hook run once the modules of a container are scanned.
///
/// Register an implementation of `dyn ContainerInitializer` in a module to complete
/// the configuration in code, for example with instances built at runtime.
pub trait ContainerInitializer: Send + Sync {
    /// # Errors
    /// An error aborts the bootstrap and is returned as is.
    fn init_container(&self, container: &Container) -> anyhow::Result<()>;
}

/// Builder of a configured [`Container`].
///
/// [`Self::build`] applies the configuration mappings, scans the entry module, the
/// configured modules and the builder modules, then runs every [`ContainerInitializer`].
#[derive(Default)]
#[must_use]
pub struct ContainerBuilder {
    backend: Option<Arc<dyn Backend>>,
    loader: Option<Arc<dyn ModuleLoader>>,
    entry_module: Option<String>,
    modules: Vec<String>,
    config: Config,
}

impl ContainerBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend to build the container over. Defaults to [`DefaultBackend`].
    #[inline]
    pub fn backend(mut self, backend: impl Backend) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Loader modules and mapped types are looked up in. Defaults to [`LinkedModules`].
    #[inline]
    pub fn loader(mut self, loader: impl ModuleLoader) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Module scanned first. Overrides [`Config::entry_module`].
    #[inline]
    pub fn entry_module(mut self, name: impl Into<String>) -> Self {
        self.entry_module = Some(name.into());
        self
    }

    /// Module scanned after the configured ones.
    #[inline]
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.modules.push(name.into());
        self
    }

    #[inline]
    pub fn modules<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.modules.extend(names.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// Returns an error when a mapping can't be applied, a module is rejected by the
    /// backend, initializers can't be resolved or one of them fails.
    pub fn build(self) -> Result<Container, BootstrapErrorKind> {
        let span = info_span!("build");
        let _guard = span.enter();

        let Self {
            backend,
            loader,
            entry_module,
            modules,
            config:
                Config {
                    entry_module: config_entry_module,
                    modules: config_modules,
                    mappings,
                },
        } = self;

        let container = Container::new(
            backend.unwrap_or_else(|| Arc::new(DefaultBackend::new())),
            loader.unwrap_or_else(|| Arc::new(LinkedModules::new())),
        );

        for mapping in &mappings {
            apply_mapping(&container, mapping).map_err(|err| {
                error!("{}", err);
                err
            })?;
        }

        for name in entry_module
            .or(config_entry_module)
            .into_iter()
            .chain(config_modules)
            .chain(modules)
        {
            container.configure_with_module(&name)?;
        }

        run_initializers(&container)?;

        debug!("Container built");
        Ok(container)
    }
}

fn apply_mapping(container: &Container, mapping: &Mapping) -> Result<(), BootstrapErrorKind> {
    let Some(implementation) = container.loader().find_type(&mapping.implementation) else {
        return Err(BootstrapErrorKind::UnknownMapping {
            service: mapping.service.clone(),
            implementation: mapping.implementation.clone(),
        });
    };

    let Some(service) = implementation
        .interfaces()
        .iter()
        .map(InterfaceDescriptor::info)
        .chain([implementation.info()])
        .find(|info| info.matches_name(&mapping.service))
    else {
        return Err(BootstrapErrorKind::UnknownMappedService {
            service: mapping.service.clone(),
            implementation: mapping.implementation.clone(),
        });
    };

    container.register_descriptor(&implementation, service, mapping.name.as_deref(), mapping.lifetime)?;
    Ok(())
}

fn run_initializers(container: &Container) -> Result<(), BootstrapErrorKind> {
    let initializers = container.get_all_instances::<dyn ContainerInitializer>()?;
    debug!(count = initializers.len(), "Running initializers");

    for initializer in initializers {
        initializer.init_container(container).map_err(|err| {
            error!("{:#}", err);
            BootstrapErrorKind::Initializer(err)
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ContainerBuilder, ContainerInitializer};
    use crate::{
        any::TypeInfo,
        attributes::ServiceImplementation,
        config::{Config, Mapping},
        container::Container,
        descriptor::TypeDescriptor,
        errors::BootstrapErrorKind,
        lifetime::Lifetime,
        module::StaticModules,
    };

    use std::sync::Arc;
    use tracing_test::traced_test;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct SystemClock;
    struct FrozenClock(u64);

    impl Clock for SystemClock {
        fn now(&self) -> u64 {
            1
        }
    }

    impl Clock for FrozenClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    struct Freezer;

    impl ContainerInitializer for Freezer {
        fn init_container(&self, container: &Container) -> anyhow::Result<()> {
            container.register_instance::<dyn Clock>(Some("frozen"), Arc::new(FrozenClock(42)))?;
            Ok(())
        }
    }

    struct Failing;

    impl ContainerInitializer for Failing {
        fn init_container(&self, _: &Container) -> anyhow::Result<()> {
            anyhow::bail!("clock drift detected")
        }
    }

    fn system_clock() -> TypeDescriptor {
        TypeDescriptor::builder::<SystemClock>()
            .implements::<dyn Clock>(|it| it)
            .attribute(ServiceImplementation::new().lifetime(Lifetime::Singleton))
            .constructor("new", || SystemClock)
            .build()
    }

    fn initializer<T: ContainerInitializer + 'static>(build: fn() -> T) -> TypeDescriptor {
        TypeDescriptor::builder::<T>()
            .implements::<dyn ContainerInitializer>(|it| it)
            .attribute(ServiceImplementation::new())
            .constructor("new", build)
            .build()
    }

    fn modules() -> StaticModules {
        StaticModules::new()
            .module("app", [system_clock()])
            .module("freezer", [initializer::<Freezer>(|| Freezer)])
            .module("failing", [initializer::<Failing>(|| Failing)])
    }

    #[test]
    #[traced_test]
    fn test_build_order() {
        let container = ContainerBuilder::new()
            .loader(modules())
            .config(Config {
                entry_module: Some("ignored".to_owned()),
                modules: vec!["app".to_owned()],
                ..Config::default()
            })
            .entry_module("missing")
            .module("freezer")
            .build()
            .unwrap();

        assert!(container.module_record("ignored").is_none());
        assert!(container.is_module_configured("missing"));
        assert!(container.is_module_configured("app"));
        assert!(container.is_module_configured("freezer"));

        assert_eq!(container.get_instance::<dyn Clock>().unwrap().now(), 1);
        assert_eq!(container.get_named_instance::<dyn Clock>("frozen").unwrap().now(), 42);
    }

    #[test]
    #[traced_test]
    fn test_mappings() {
        let container = Container::builder()
            .loader(modules())
            .config(Config {
                mappings: vec![
                    Mapping::new(TypeInfo::of::<dyn Clock>().name, TypeInfo::of::<SystemClock>().name)
                        .named("wall")
                        .lifetime(Lifetime::Singleton),
                    Mapping::new(TypeInfo::of::<SystemClock>().name, TypeInfo::of::<SystemClock>().name),
                ],
                ..Config::default()
            })
            .build()
            .unwrap();

        let wall = container.get_named_instance::<dyn Clock>("wall").unwrap();
        assert!(Arc::ptr_eq(&wall, &container.get_named_instance::<dyn Clock>("wall").unwrap()));
        assert!(container.get_instance::<SystemClock>().is_ok());
        assert!(container.try_get_instance::<dyn Clock>().is_none());
    }

    #[test]
    #[traced_test]
    fn test_unknown_mappings() {
        let unknown_implementation = Container::builder()
            .loader(modules())
            .config(Config {
                mappings: vec![Mapping::new("Clock", "app::AtomicClock")],
                ..Config::default()
            })
            .build();
        assert!(matches!(unknown_implementation, Err(BootstrapErrorKind::UnknownMapping { .. })));

        let unknown_service = Container::builder()
            .loader(modules())
            .config(Config {
                mappings: vec![Mapping::new("app::Timer", TypeInfo::of::<SystemClock>().name)],
                ..Config::default()
            })
            .build();
        assert!(matches!(unknown_service, Err(BootstrapErrorKind::UnknownMappedService { .. })));
    }

    #[test]
    #[traced_test]
    fn test_failing_initializer() {
        let result = Container::builder()
            .loader(modules())
            .modules(["app", "failing"])
            .build();

        let Err(BootstrapErrorKind::Initializer(err)) = result else {
            panic!("expected an initializer error");
        };
        assert_eq!(err.to_string(), "clock drift detected");
    }
}
