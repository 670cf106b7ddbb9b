//! Component type registry
//!
//! Maps the type name used in scene documents to a constructor returning a
//! zero-value component. Registration happens at startup, before any document
//! is decoded; entries are never removed.

use crate::component::Component;
use crate::error::{SceneError, SceneResult};
use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};

/// Constructor of a zero-value component
pub type ComponentConstructor = fn() -> Box<dyn Component>;

/// Name-keyed table of component constructors
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    constructors: BTreeMap<String, ComponentConstructor>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in component types
    pub fn with_builtins() -> SceneResult<Self> {
        let mut registry = Self::new();
        crate::components::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Process-wide registry used by the engine loop and the viewer
    pub fn global() -> &'static RwLock<ComponentRegistry> {
        static GLOBAL: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| RwLock::new(ComponentRegistry::new()))
    }

    /// Register `T` under the name its instances report
    pub fn register<T: Component + Default>(&mut self) -> SceneResult<()> {
        fn construct<T: Component + Default>() -> Box<dyn Component> {
            Box::new(T::default())
        }
        let name = T::default().type_name();
        self.register_with(name, construct::<T>)
    }

    /// Register a constructor under an explicit name.
    ///
    /// Fails if the name is already taken or if the constructed component
    /// reports a different type name than the one registered.
    pub fn register_with(
        &mut self,
        name: impl Into<String>,
        constructor: ComponentConstructor,
    ) -> SceneResult<()> {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(SceneError::DuplicateRegistration(name));
        }

        let actual = constructor().type_name();
        if actual != name {
            return Err(SceneError::RegistryNameMismatch {
                registered: name,
                actual: actual.to_string(),
            });
        }

        log::debug!("Registered component type {}", name);
        self.constructors.insert(name, constructor);
        Ok(())
    }

    /// Constructor registered under `name`
    pub fn resolve(&self, name: &str) -> Option<ComponentConstructor> {
        self.constructors.get(name).copied()
    }

    /// Construct a zero-value component of the named type
    pub fn construct(&self, name: &str) -> SceneResult<Box<dyn Component>> {
        self.resolve(name)
            .map(|constructor| constructor())
            .ok_or_else(|| SceneError::UnknownComponentType(name.to_string()))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.constructors.keys().map(String::as_str)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
