//! Session templates and mapper proxies.

use crate::error::{FactoryError, FactoryResult};
use crate::factory::SessionFactory;
use crate::models::ExecutorType;
use crate::registry::MappedStatement;
use std::sync::Arc;

/// Transactional handle over a session factory.
///
/// Templates are cheap to clone and carry the executor type sessions are opened with.
#[derive(Debug, Clone)]
pub struct SessionTemplate {
    factory: Arc<SessionFactory>,
    executor_type: ExecutorType,
}

impl SessionTemplate {
    /// A template using the factory's default executor type.
    pub fn new(factory: Arc<SessionFactory>) -> Self {
        let executor_type = factory.settings().default_executor_type;
        Self {
            factory,
            executor_type,
        }
    }

    pub fn with_executor_type(mut self, executor_type: ExecutorType) -> Self {
        self.executor_type = executor_type;
        self
    }

    pub fn factory(&self) -> &Arc<SessionFactory> {
        &self.factory
    }

    pub fn executor_type(&self) -> ExecutorType {
        self.executor_type
    }

    /// The executor wrapped by every installed interceptor, e.g. `audit(paging(SimpleExecutor))`.
    pub fn executor_chain(&self) -> String {
        let executor = match self.executor_type {
            ExecutorType::Simple => "SimpleExecutor",
            ExecutorType::Reuse => "ReuseExecutor",
            ExecutorType::Batch => "BatchExecutor",
        };
        self.factory
            .registries()
            .interceptors
            .plugin_all(executor.to_string())
    }

    /// Proxy for a mapper interface registered with the factory.
    pub fn get_mapper(&self, interface: &str) -> FactoryResult<MapperProxy> {
        if !self.factory.has_mapper(interface) {
            return Err(FactoryError::unknown_mapper(interface, self.factory.name()));
        }
        Ok(MapperProxy {
            interface: interface.to_string(),
            template: self.clone(),
        })
    }
}

/// A mapper interface bound to a session template.
#[derive(Debug, Clone)]
pub struct MapperProxy {
    interface: String,
    template: SessionTemplate,
}

impl MapperProxy {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Name of the configuration the proxy's factory was built from.
    pub fn configuration(&self) -> &str {
        self.template.factory().name()
    }

    pub fn template(&self) -> &SessionTemplate {
        &self.template
    }

    /// Statement backing `method`, if the interface has one.
    pub fn statement(&self, method: &str) -> Option<&MappedStatement> {
        self.template
            .factory()
            .statement(&format!("{}.{method}", self.interface))
    }

    pub fn statements(&self) -> impl Iterator<Item = &MappedStatement> {
        self.template
            .factory()
            .registries()
            .mappers
            .statements_for(&self.interface)
    }
}
