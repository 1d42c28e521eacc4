//! Session factories and their publication.
//!
//! This module provides:
//! - `FactoryBuilder`, which assembles one `SessionFactory` per named configuration
//! - `SessionTemplate` and `MapperProxy`, the handles published for each factory
//! - `MapperContext`, which builds every configuration and publishes the results

pub mod builder;
pub mod context;
pub mod template;

pub use builder::FactoryBuilder;
pub use context::MapperContext;
pub use template::{MapperProxy, SessionTemplate};

use crate::models::CoreSettings;
use crate::registry::{Environment, MappedStatement, RegistrySet, TransactionStrategy};
use serde::Serialize;

/// The assembled runtime of one named configuration. Immutable once built.
#[derive(Debug)]
pub struct SessionFactory {
    registries: RegistrySet,
}

impl SessionFactory {
    pub(crate) fn new(registries: RegistrySet) -> Self {
        Self { registries }
    }

    /// Name of the configuration this factory was built from.
    pub fn name(&self) -> &str {
        &self.registries.environment.id
    }

    pub fn environment(&self) -> &Environment {
        &self.registries.environment
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.registries.settings
    }

    pub fn registries(&self) -> &RegistrySet {
        &self.registries
    }

    pub fn database_id(&self) -> Option<&str> {
        self.registries.database_id.as_deref()
    }

    pub fn has_mapper(&self, interface: &str) -> bool {
        self.registries.mappers.has_mapper(interface)
    }

    pub fn mappers(&self) -> impl Iterator<Item = &str> {
        self.registries.mappers.mappers()
    }

    pub fn statement(&self, id: &str) -> Option<&MappedStatement> {
        self.registries.mappers.statement(id)
    }

    pub fn summary(&self) -> FactorySummary {
        let registries = &self.registries;
        FactorySummary {
            name: self.name().to_string(),
            transaction_strategy: registries.environment.transaction_strategy,
            product_name: registries.environment.data_source.product_name().ok(),
            database_id: registries.database_id.clone(),
            mappers: registries.mappers.mappers().map(String::from).collect(),
            statements: registries.mappers.statements().map(|s| s.id.clone()).collect(),
            interceptors: registries.interceptors.names().into_iter().map(String::from).collect(),
            default_language_driver: registries.languages.default_driver().name().to_string(),
        }
    }
}

/// Serializable overview of a factory, used for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct FactorySummary {
    pub name: String,
    pub transaction_strategy: TransactionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub database_id: Option<String>,
    pub mappers: Vec<String>,
    pub statements: Vec<String>,
    pub interceptors: Vec<String>,
    pub default_language_driver: String,
}
