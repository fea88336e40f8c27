use std::{
    fs, panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use stevedore::{
    ambient,
    config::CONFIG_ENV,
    errors::{BootstrapErrorKind, ConfigErrorKind},
    injectable, locator, Container, ContainerInitializer,
};

static AUDIT_AVAILABLE: AtomicBool = AtomicBool::new(false);

pub trait Journal: Send + Sync {
    fn entries(&self) -> usize;
}

pub struct MemoryJournal;

impl Journal for MemoryJournal {
    fn entries(&self) -> usize {
        0
    }
}

#[injectable]
#[service_implementation]
pub struct AuditSetup;

#[injectable]
impl AuditSetup {
    pub fn new() -> Self {
        Self
    }
}

#[injectable]
impl ContainerInitializer for AuditSetup {
    fn init_container(&self, container: &Container) -> anyhow::Result<()> {
        if !AUDIT_AVAILABLE.load(Ordering::SeqCst) {
            anyhow::bail!("audit journal unavailable");
        }

        container.register_instance::<dyn Journal>(None, Arc::new(MemoryJournal))?;
        Ok(())
    }
}

// The ambient container and the environment are process-wide, so every step runs in one test.
#[test]
fn test_default_bootstrap_from_config_file() {
    let path = std::env::temp_dir().join(format!("stevedore-ambient-{}.toml", std::process::id()));
    std::env::set_var(CONFIG_ENV, &path);

    fs::write(&path, "entry_module = 1\n").unwrap();
    assert!(matches!(
        ambient::try_current(),
        Err(BootstrapErrorKind::Config(ConfigErrorKind::Parse(_)))
    ));

    fs::write(&path, "entry_module = \"ambient\"\n").unwrap();
    match ambient::try_current() {
        Err(BootstrapErrorKind::Initializer(err)) => assert_eq!(err.to_string(), "audit journal unavailable"),
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("bootstrap succeeded with a failing initializer"),
    }
    assert!(panic::catch_unwind(ambient::current).is_err());

    AUDIT_AVAILABLE.store(true, Ordering::SeqCst);
    let container = ambient::try_current().unwrap();
    assert!(Arc::ptr_eq(&container, &ambient::current()));
    assert!(container.is_module_configured("ambient"));
    assert_eq!(locator::get_instance::<dyn Journal>().unwrap().entries(), 0);

    fs::remove_file(&path).unwrap();
}
