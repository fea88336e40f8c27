use std::sync::Arc;
use stevedore::{injectable, Config, Container, ContainerInitializer};

pub trait Greeting: Send + Sync {
    fn greet(&self) -> String;
}

#[injectable]
pub struct English;

#[injectable]
impl English {
    pub fn new() -> Self {
        Self
    }
}

#[injectable]
impl Greeting for English {
    fn greet(&self) -> String {
        "hello".to_owned()
    }
}

pub struct Custom(&'static str);

impl Greeting for Custom {
    fn greet(&self) -> String {
        self.0.to_owned()
    }
}

#[injectable]
#[service_implementation]
pub struct Seeder;

#[injectable]
impl Seeder {
    pub fn new() -> Self {
        Self
    }
}

#[injectable]
impl ContainerInitializer for Seeder {
    fn init_container(&self, container: &Container) -> anyhow::Result<()> {
        container.register_instance::<dyn Greeting>(Some("seeded"), Arc::new(Custom("hi")))?;
        Ok(())
    }
}

const CONFIG: &str = r#"
modules = ["bootstrap"]

[[mappings]]
service = "bootstrap::Greeting"
implementation = "bootstrap::English"
name = "mapped"
lifetime = "singleton"
"#;

#[test]
fn test_bootstrap_from_config() {
    let container = Container::builder()
        .config(Config::from_toml(CONFIG).unwrap())
        .entry_module("no-such-crate")
        .build()
        .unwrap();

    assert!(container.is_module_configured("no-such-crate"));
    assert!(container.is_module_configured("bootstrap"));

    let mapped = container.get_named_instance::<dyn Greeting>("mapped").unwrap();
    assert_eq!(mapped.greet(), "hello");
    assert!(Arc::ptr_eq(
        &mapped,
        &container.get_named_instance::<dyn Greeting>("mapped").unwrap()
    ));

    assert_eq!(container.get_named_instance::<dyn Greeting>("seeded").unwrap().greet(), "hi");
    assert!(container.try_get_instance::<dyn Greeting>().is_none());
    assert_eq!(container.get_all_instances::<dyn Greeting>().unwrap().len(), 2);
}

#[test]
fn test_initializers_run_once() {
    let container = Container::builder().module("bootstrap").module("bootstrap").build().unwrap();

    assert_eq!(container.get_all_instances::<dyn ContainerInitializer>().unwrap().len(), 1);
    assert_eq!(container.get_all_instances::<dyn Greeting>().unwrap().len(), 1);
}
