//! Type discovery.
//!
//! Namespace scanning is an injected capability: the surrounding platform supplies a
//! `TypeDiscovery` and the resolver and registry passes stay pure over it. `TypeCatalog`
//! is the in-memory implementation, built in code or loaded from a TOML catalog file.

use crate::error::{FactoryError, FactoryResult};
use crate::models::TypeDescriptor;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Source of application type descriptors.
pub trait TypeDiscovery: Send + Sync {
    /// Every namespace known to the application.
    fn packages(&self) -> Vec<String>;

    /// Every type in `prefix` or one of its sub-namespaces.
    fn scan(&self, prefix: &str) -> Vec<TypeDescriptor>;

    /// Look up a type by fully-qualified name.
    fn lookup(&self, name: &str) -> Option<TypeDescriptor>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
}

/// In-memory type catalog keyed by fully-qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type; a later descriptor with the same name replaces the earlier one.
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parse a catalog from TOML (`[[types]]` entries).
    pub fn from_toml_str(input: &str) -> FactoryResult<Self> {
        let file: CatalogFile = toml::from_str(input).map_err(|e| {
            FactoryError::invalid_configuration(format!("Invalid type catalog: {e}"))
        })?;
        Ok(file.types.into_iter().fold(Self::new(), Self::with_type))
    }

    /// Load a catalog file.
    pub fn from_file(path: &Path) -> FactoryResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| FactoryError::io(path.display().to_string(), e))?;
        let catalog = Self::from_toml_str(&input)?;
        debug!(path = %path.display(), types = catalog.len(), "Loaded type catalog");
        Ok(catalog)
    }
}

impl TypeDiscovery for TypeCatalog {
    fn packages(&self) -> Vec<String> {
        self.types
            .values()
            .map(|t| t.namespace().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn scan(&self, prefix: &str) -> Vec<TypeDescriptor> {
        self.types
            .values()
            .filter(|t| t.in_namespace(prefix))
            .cloned()
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<TypeDescriptor> {
        self.types.get(name).cloned()
    }
}
