use std::{any::type_name, sync::Arc};

use parking_lot::Mutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::{erase, unerase, Instance, TypeInfo},
    backend::{Backend, DefaultBackend},
    bootstrap::ContainerBuilder,
    descriptor::TypeDescriptor,
    errors::{ActivationAllError, ActivationError, ConfigureErrorKind, RegisterErrorKind, ResolveErrorKind},
    lifetime::Lifetime,
    linked::LinkedModules,
    module::{ModuleLoader, ModuleOutcome, ModuleRecord, ModuleTracker},
    planner::plan_mapping,
    scanner,
};

/// Entry point for configuring and resolving services.
///
/// Wraps a [`Backend`] and the [`ModuleLoader`] modules are scanned from.
/// Library code should receive `&Container`; the ambient container in [`crate::ambient`]
/// is meant for the outermost layer of an application.
pub struct Container {
    backend: Arc<dyn Backend>,
    loader: Arc<dyn ModuleLoader>,
    modules: Mutex<ModuleTracker>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            backend,
            loader,
            modules: Mutex::new(ModuleTracker::default()),
        }
    }

    #[inline]
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    /// Scans the module `name` and applies the registrations of its types.
    ///
    /// A module is scanned at most once, whatever the outcome. A module that can't be
    /// loaded is logged and recorded, and the call still succeeds.
    ///
    /// # Errors
    /// Returns an error when the backend rejects a directive. The module is recorded
    /// as processed and won't be scanned again.
    pub fn configure_with_module(&self, name: &str) -> Result<(), ConfigureErrorKind> {
        let span = info_span!("configure_with_module", module = name);
        let _guard = span.enter();

        if !self.modules.lock().begin(name) {
            debug!("Module already processed");
            return Ok(());
        }

        let module = match self.loader.load(name) {
            Ok(module) => module,
            Err(err) => {
                warn!("{}", err);
                self.modules
                    .lock()
                    .finish(name, ModuleOutcome::LoadFailed { reason: err.to_string() });
                return Ok(());
            }
        };

        match scanner::configure(self.backend.as_ref(), &module) {
            Ok(outcome) => {
                debug!(?outcome, "Module configured");
                self.modules.lock().finish(name, outcome);
                Ok(())
            }
            Err(err) => {
                error!("{}", err);
                self.modules
                    .lock()
                    .finish(name, ModuleOutcome::Aborted { reason: err.to_string() });
                Err(err)
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn module_record(&self, name: &str) -> Option<ModuleRecord> {
        self.modules.lock().get(name)
    }

    #[inline]
    #[must_use]
    pub fn is_module_configured(&self, name: &str) -> bool {
        self.module_record(name).is_some_and(|record| record.processed)
    }

    /// Maps `S` to `T`, whose descriptor is looked up through the module loader.
    ///
    /// # Errors
    /// Returns an error when the loader doesn't know `T`, `T` doesn't implement `S`
    /// or the backend rejects the registration.
    pub fn register_type<S, T>(&self, name: Option<&str>, lifetime: Lifetime) -> Result<&Self, RegisterErrorKind>
    where
        S: ?Sized + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let Some(descriptor) = self.loader.describe(&TypeInfo::of::<T>()) else {
            return Err(RegisterErrorKind::UnknownType {
                name: type_name::<T>().to_owned(),
            });
        };
        self.register_descriptor(&descriptor, TypeInfo::of::<S>(), name, lifetime)
    }

    /// Maps `service` to the type of `descriptor`.
    ///
    /// # Errors
    /// Returns an error when the type doesn't implement `service` or the backend
    /// rejects the registration.
    pub fn register_descriptor(
        &self,
        descriptor: &TypeDescriptor,
        service: TypeInfo,
        name: Option<&str>,
        lifetime: Lifetime,
    ) -> Result<&Self, RegisterErrorKind> {
        let span = info_span!("register_type", service = service.name, implementation = descriptor.info().name, name);
        let _guard = span.enter();

        let plan = plan_mapping(descriptor, &service, name, lifetime).map_err(|err| {
            error!("{}", err);
            err
        })?;
        let implementation = plan.implementation;
        for directive in plan.into_directives() {
            let kind = directive.kind();
            directive.apply(self.backend.as_ref()).map_err(|source| {
                let err = RegisterErrorKind::Backend {
                    implementation: implementation.name,
                    directive: kind,
                    source,
                };
                error!("{}", err);
                err
            })?;
        }

        Ok(self)
    }

    /// Registers an existing instance as `S`.
    ///
    /// # Errors
    /// Returns an error when the backend rejects the instance.
    pub fn register_instance<S>(&self, name: Option<&str>, instance: Arc<S>) -> Result<&Self, RegisterErrorKind>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let name = name.filter(|name| !name.is_empty());
        self.backend
            .register_instance(TypeInfo::of::<S>(), name, erase(instance))
            .map_err(|source| RegisterErrorKind::Backend {
                implementation: type_name::<S>(),
                directive: "instance",
                source,
            })?;

        Ok(self)
    }

    /// Resolves the default registration of `S`.
    ///
    /// # Errors
    /// Returns an error carrying the backend failure.
    #[inline]
    pub fn get_instance<S>(&self) -> Result<Arc<S>, ActivationError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.activate(None)
    }

    /// Resolves the registration of `S` named `name`. An empty name is the default registration.
    ///
    /// # Errors
    /// Returns an error carrying the backend failure.
    #[inline]
    pub fn get_named_instance<S>(&self, name: &str) -> Result<Arc<S>, ActivationError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.activate(Some(name).filter(|name| !name.is_empty()))
    }

    #[inline]
    #[must_use]
    pub fn try_get_instance<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.get_instance().ok()
    }

    #[inline]
    #[must_use]
    pub fn try_get_named_instance<S>(&self, name: &str) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.get_named_instance(name).ok()
    }

    /// Resolves every registration of `S`, in registration order.
    ///
    /// # Errors
    /// Returns an error carrying the backend failure.
    pub fn get_all_instances<S>(&self) -> Result<Vec<Arc<S>>, ActivationAllError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<S>();
        let span = info_span!("get_all_instances", service = service.name);
        let _guard = span.enter();

        let to_error = |source| {
            let err = ActivationAllError { service, source };
            error!("{}", err);
            err
        };

        self.backend
            .resolve_all(service)
            .map_err(to_error)?
            .iter()
            .map(|instance| downcast::<S>(instance).map_err(|err| to_error(err.into())))
            .collect()
    }

    /// Runs property and method injection on a value built outside the container.
    ///
    /// # Errors
    /// Returns an error carrying the backend failure.
    pub fn build_up<T>(&self, existing: T) -> Result<T, ActivationError>
    where
        T: Send + Sync + 'static,
    {
        let service = TypeInfo::of::<T>();
        let span = info_span!("build_up", service = service.name);
        let _guard = span.enter();

        let to_error = |source| {
            let err = ActivationError {
                service,
                name: None,
                source,
            };
            error!("{}", err);
            err
        };

        let value = self.backend.inject_into(service, Box::new(existing)).map_err(to_error)?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(to_error(ResolveErrorKind::IncorrectType { service: service.name }.into())),
        }
    }

    fn activate<S>(&self, name: Option<&str>) -> Result<Arc<S>, ActivationError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<S>();
        let span = info_span!("get_instance", service = service.name, name);
        let _guard = span.enter();

        let to_error = |source| {
            let err = ActivationError {
                service,
                name: name.map(ToOwned::to_owned),
                source,
            };
            error!("{}", err);
            err
        };

        let instance = self.backend.resolve(service, name).map_err(to_error)?;
        let instance = downcast::<S>(&instance).map_err(|err| to_error(err.into()))?;
        debug!("Resolved");
        Ok(instance)
    }
}

#[inline]
fn downcast<S>(instance: &Instance) -> Result<Arc<S>, ResolveErrorKind>
where
    S: ?Sized + Send + Sync + 'static,
{
    unerase::<S>(instance).ok_or(ResolveErrorKind::IncorrectType {
        service: type_name::<S>(),
    })
}

impl Default for Container {
    /// A container over the default backend and the linked modules. No module is scanned.
    fn default() -> Self {
        Self::new(Arc::new(DefaultBackend::new()), Arc::new(LinkedModules::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::Container;
    use crate::{
        any::{erase, TypeInfo},
        attributes::{Dependency, ServiceImplementation},
        backend::DefaultBackend,
        descriptor::{PropertyDescriptor, TypeDescriptor},
        errors::{ModuleLoadErrorKind, RegisterErrorKind, ResolveErrorKind},
        lifetime::Lifetime,
        module::{Module, ModuleLoader, ModuleOutcome, StaticModules},
    };

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tracing_test::traced_test;

    trait Sender: Send + Sync {
        fn channel(&self) -> &'static str;
    }

    struct Email;
    struct Sms;

    impl Sender for Email {
        fn channel(&self) -> &'static str {
            "email"
        }
    }

    impl Sender for Sms {
        fn channel(&self) -> &'static str {
            "sms"
        }
    }

    #[derive(Default)]
    struct Newsletter {
        sender: Option<Arc<dyn Sender>>,
    }

    fn email(implementation: ServiceImplementation) -> TypeDescriptor {
        TypeDescriptor::builder::<Email>()
            .implements::<dyn Sender>(|it| it)
            .attribute(implementation)
            .constructor("new", || Email)
            .build()
    }

    fn sms() -> TypeDescriptor {
        TypeDescriptor::builder::<Sms>()
            .implements::<dyn Sender>(|it| it)
            .attribute(ServiceImplementation::new().named("sms"))
            .constructor("new", || Sms)
            .build()
    }

    fn newsletter() -> TypeDescriptor {
        TypeDescriptor::builder::<Newsletter>()
            .property_with(
                PropertyDescriptor::new("sender", |this: &mut Newsletter, sender: Arc<dyn Sender>| {
                    this.sender = Some(sender);
                })
                .attribute(Dependency::new()),
            )
            .build()
    }

    struct CountingLoader {
        inner: StaticModules,
        loads: AtomicUsize,
    }

    impl ModuleLoader for CountingLoader {
        fn load(&self, name: &str) -> Result<Module, ModuleLoadErrorKind> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(name)
        }

        fn describe(&self, ty: &TypeInfo) -> Option<TypeDescriptor> {
            self.inner.describe(ty)
        }
    }

    fn container(modules: StaticModules) -> (Container, Arc<CountingLoader>) {
        let loader = Arc::new(CountingLoader {
            inner: modules,
            loads: AtomicUsize::new(0),
        });
        (Container::new(Arc::new(DefaultBackend::new()), loader.clone()), loader)
    }

    #[test]
    #[traced_test]
    fn test_configure_with_module_once() {
        let (container, loader) = container(StaticModules::new().module("mail", [email(ServiceImplementation::new()), sms()]));

        container.configure_with_module("mail").unwrap();
        container.configure_with_module("mail").unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert!(container.is_module_configured("mail"));
        assert!(matches!(
            container.module_record("mail").unwrap().outcome,
            Some(ModuleOutcome::Configured { types: 2, .. })
        ));
        assert_eq!(container.get_all_instances::<dyn Sender>().unwrap().len(), 2);
    }

    #[test]
    #[traced_test]
    fn test_failed_module_load() {
        let (container, loader) = container(StaticModules::new().module("mail", [email(ServiceImplementation::new())]));

        container.configure_with_module("missing").unwrap();
        container.configure_with_module("missing").unwrap();
        container.configure_with_module("mail").unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert!(logs_contain("Module missing not found"));
        assert!(matches!(
            container.module_record("missing").unwrap().outcome,
            Some(ModuleOutcome::LoadFailed { .. })
        ));
        assert!(container.try_get_instance::<dyn Sender>().is_some());
    }

    #[test]
    #[traced_test]
    fn test_get_instance() {
        let (container, _) = container(StaticModules::new().module(
            "mail",
            [email(ServiceImplementation::new().lifetime(Lifetime::Singleton)), sms()],
        ));
        container.configure_with_module("mail").unwrap();

        let first = container.get_instance::<dyn Sender>().unwrap();
        assert!(Arc::ptr_eq(&first, &container.get_instance::<dyn Sender>().unwrap()));
        assert!(Arc::ptr_eq(&first, &container.get_named_instance::<dyn Sender>("").unwrap()));

        let sms = container.get_named_instance::<dyn Sender>("sms").unwrap();
        assert_eq!(sms.channel(), "sms");
        assert!(!Arc::ptr_eq(&sms, &container.get_named_instance::<dyn Sender>("sms").unwrap()));
    }

    #[test]
    #[traced_test]
    fn test_activation_errors() {
        let (container, _) = container(StaticModules::new());

        assert!(container.try_get_instance::<dyn Sender>().is_none());
        assert!(container.try_get_named_instance::<dyn Sender>("sms").is_none());

        let err = container.get_named_instance::<dyn Sender>("sms").err().unwrap();
        assert_eq!(err.service, TypeInfo::of::<dyn Sender>());
        assert_eq!(err.name.as_deref(), Some("sms"));
        assert!(matches!(
            err.source.downcast_ref::<ResolveErrorKind>(),
            Some(ResolveErrorKind::NoRegistration { .. })
        ));
        assert!(err.to_string().contains("key \"sms\""));
        assert!(logs_contain("Activation error occurred"));

        assert!(container.get_all_instances::<dyn Sender>().unwrap().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_incorrect_type() {
        let (container, _) = container(StaticModules::new());
        container
            .backend()
            .register_instance(TypeInfo::of::<dyn Sender>(), None, erase(Arc::new(5_u8)))
            .unwrap();

        let err = container.get_instance::<dyn Sender>().err().unwrap();
        assert!(matches!(
            err.source.downcast_ref::<ResolveErrorKind>(),
            Some(ResolveErrorKind::IncorrectType { .. })
        ));
        assert!(container.get_all_instances::<dyn Sender>().is_err());
    }

    #[test]
    #[traced_test]
    fn test_register() {
        let (container, _) = container(StaticModules::new().module("mail", [email(ServiceImplementation::new()), sms()]));

        container
            .register_type::<dyn Sender, Email>(Some("primary"), Lifetime::Singleton)
            .unwrap()
            .register_descriptor(&sms(), TypeInfo::of::<dyn Sender>(), None, Lifetime::Transient)
            .unwrap()
            .register_instance::<dyn Sender>(Some("fallback"), Arc::new(Email))
            .unwrap();

        assert_eq!(container.get_named_instance::<dyn Sender>("primary").unwrap().channel(), "email");
        assert_eq!(container.get_instance::<dyn Sender>().unwrap().channel(), "sms");
        assert_eq!(container.get_named_instance::<dyn Sender>("fallback").unwrap().channel(), "email");

        assert!(matches!(
            container.register_type::<dyn Sender, Newsletter>(None, Lifetime::Transient),
            Err(RegisterErrorKind::UnknownType { .. })
        ));
        assert!(matches!(
            container.register_descriptor(&newsletter(), TypeInfo::of::<dyn Sender>(), None, Lifetime::Transient),
            Err(RegisterErrorKind::Planner(_))
        ));
    }

    #[test]
    #[traced_test]
    fn test_build_up() {
        let (container, _) = container(StaticModules::new().module("mail", [email(ServiceImplementation::new()), newsletter()]));
        container.configure_with_module("mail").unwrap();

        let newsletter = container.build_up(Newsletter::default()).unwrap();
        assert_eq!(newsletter.sender.unwrap().channel(), "email");
    }
}
