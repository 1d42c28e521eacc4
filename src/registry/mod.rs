//! Registries populated during assembly.
//!
//! A `RegistrySet` is created by the assembler's environment pass and filled by the
//! remaining passes. Customizers get mutable access to it before mappers are attached;
//! once a session factory owns it, it is read-only.

pub mod alias;
pub mod converter;
pub mod factories;
pub mod interceptor;
pub mod language;
pub mod mapper;

pub use alias::TypeAliasRegistry;
pub use converter::{DeclaredConverter, TypeConverterRegistry};
pub use factories::{
    DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultProxyFactory,
    DefaultReflectorFactory, Factories,
};
pub use interceptor::InterceptorChain;
pub use language::{DeclaredDriver, LanguageRegistry, RawLanguageDriver, XmlLanguageDriver};
pub use mapper::{MappedStatement, MapperRegistry, StatementKind};

use crate::assembler::AssemblyPass;
use crate::components::{Cache, DataSource};
use crate::error::{FactoryError, FactoryResult};
use crate::models::CoreSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// How sessions participate in transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStrategy {
    /// Sessions commit and roll back on their own connection
    #[default]
    Local,
    /// An outer transaction manager owns commit and rollback
    Managed,
}

impl fmt::Display for TransactionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStrategy::Local => write!(f, "local"),
            TransactionStrategy::Managed => write!(f, "managed"),
        }
    }
}

/// The environment a session factory is bound to.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Name of the configuration the factory was built for
    pub id: String,
    pub transaction_strategy: TransactionStrategy,
    pub data_source: Arc<dyn DataSource>,
}

/// Every registry a session factory owns.
#[derive(Debug, Clone)]
pub struct RegistrySet {
    pub environment: Environment,
    pub settings: CoreSettings,
    pub type_aliases: TypeAliasRegistry,
    pub type_converters: TypeConverterRegistry,
    pub factories: Factories,
    pub interceptors: InterceptorChain,
    pub languages: LanguageRegistry,
    pub caches: BTreeMap<String, Arc<dyn Cache>>,
    pub database_id: Option<String>,
    pub mappers: MapperRegistry,
    completed: Vec<AssemblyPass>,
}

impl RegistrySet {
    pub fn new(environment: Environment, settings: CoreSettings) -> Self {
        Self {
            environment,
            settings,
            type_aliases: TypeAliasRegistry::new(),
            type_converters: TypeConverterRegistry::new(),
            factories: Factories::default(),
            interceptors: InterceptorChain::new(),
            languages: LanguageRegistry::new(),
            caches: BTreeMap::new(),
            database_id: None,
            mappers: MapperRegistry::new(),
            completed: Vec::new(),
        }
    }

    /// Register a cache; a second cache with the same id is rejected.
    pub fn add_cache(&mut self, cache: Arc<dyn Cache>) -> FactoryResult<()> {
        let id = cache.id().to_string();
        if self.caches.contains_key(&id) {
            return Err(FactoryError::invalid_configuration(format!(
                "Cache '{id}' is registered more than once"
            )));
        }
        self.caches.insert(id, cache);
        Ok(())
    }

    pub fn cache(&self, id: &str) -> Option<&Arc<dyn Cache>> {
        self.caches.get(id)
    }

    pub(crate) fn record_pass(&mut self, pass: AssemblyPass) {
        if !self.completed.contains(&pass) {
            self.completed.push(pass);
        }
    }

    /// Passes completed so far, in completion order.
    pub fn completed_passes(&self) -> &[AssemblyPass] {
        &self.completed
    }

    pub fn has_completed(&self, pass: AssemblyPass) -> bool {
        self.completed.contains(&pass)
    }

    /// Whether every assembly pass has run.
    pub fn is_fully_assembled(&self) -> bool {
        AssemblyPass::ALL.iter().all(|pass| self.has_completed(*pass))
    }
}
