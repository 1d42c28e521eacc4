//! Scripting language driver registry.

use crate::components::LanguageDriver;
use crate::error::{FactoryError, FactoryResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dynamic-template dialect used unless another default is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlLanguageDriver;

impl XmlLanguageDriver {
    pub const NAME: &'static str = "XmlLanguageDriver";
}

impl LanguageDriver for XmlLanguageDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn alias(&self) -> Option<&str> {
        Some("xml")
    }
}

/// Static SQL without dynamic elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawLanguageDriver;

impl RawLanguageDriver {
    pub const NAME: &'static str = "RawLanguageDriver";
}

impl LanguageDriver for RawLanguageDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn alias(&self) -> Option<&str> {
        Some("raw")
    }
}

/// A driver declared by type name in configuration.
#[derive(Debug, Clone)]
pub struct DeclaredDriver {
    name: String,
}

impl DeclaredDriver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LanguageDriver for DeclaredDriver {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Drivers keyed by name. The first registration of a name wins.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    drivers: BTreeMap<String, Arc<dyn LanguageDriver>>,
    default_driver: String,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            drivers: BTreeMap::new(),
            default_driver: XmlLanguageDriver::NAME.to_string(),
        };
        registry.register(Arc::new(XmlLanguageDriver));
        registry.register(Arc::new(RawLanguageDriver));
        registry
    }

    /// Register a driver; returns false if one with the same name was already present.
    pub fn register(&mut self, driver: Arc<dyn LanguageDriver>) -> bool {
        let name = driver.name().to_string();
        if self.drivers.contains_key(&name) {
            return false;
        }
        self.drivers.insert(name, driver);
        true
    }

    /// Make a registered driver the default.
    pub fn set_default(&mut self, name: &str) -> FactoryResult<()> {
        if !self.drivers.contains_key(name) {
            return Err(FactoryError::invalid_configuration(format!(
                "Scripting language driver '{name}' is not registered"
            )));
        }
        self.default_driver = name.to_string();
        Ok(())
    }

    pub fn default_driver(&self) -> &Arc<dyn LanguageDriver> {
        // set_default only accepts registered names and drivers are never removed
        &self.drivers[&self.default_driver]
    }

    pub fn driver(&self, name: &str) -> Option<&Arc<dyn LanguageDriver>> {
        self.drivers.get(name)
    }

    /// Find a driver by name or (case-insensitive) alias.
    pub fn resolve(&self, name_or_alias: &str) -> Option<&Arc<dyn LanguageDriver>> {
        self.drivers.get(name_or_alias).or_else(|| {
            self.drivers.values().find(|d| {
                d.alias()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(name_or_alias))
            })
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }
}
