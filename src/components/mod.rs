//! Pluggable components.
//!
//! This module defines the capabilities the component pool can hold and the pool itself:
//! - Data sources, looked up by name
//! - Type converters, interceptors, language drivers, caches and customizers (find-all)
//! - Factory overrides and the database-id provider (find zero-or-one)
//!
//! Behaviour beyond what assembly needs belongs to the query-execution layer, so the
//! traits only expose identity plus the operations assembly actually performs.

pub mod datasource;
pub mod pool;

pub use datasource::{
    ConnectedDataSources, DatabaseType, DbPool, SqlxDataSource, VendorDatabaseIdProvider,
};
pub use pool::{ComponentPool, ComponentPoolBuilder};

use crate::error::FactoryResult;
use crate::registry::RegistrySet;
use std::fmt::Debug;

/// A connection source a session factory binds to.
pub trait DataSource: Send + Sync + Debug {
    /// Database product name reported by the connection, e.g. `PostgreSQL`.
    fn product_name(&self) -> FactoryResult<String>;

    fn product_version(&self) -> Option<String> {
        None
    }
}

/// Converts values of the handled types between stored and in-memory form.
pub trait TypeConverter: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Types this converter is registered for.
    fn handled_types(&self) -> Vec<String>;
}

/// Wraps statement execution. Interceptors wrap each other in registration order.
pub trait Interceptor: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Wrap `target`; the default renders the wrapping as `name(target)`.
    fn plugin(&self, target: String) -> String {
        format!("{}({})", self.name(), target)
    }
}

/// Parses dynamic query templates.
pub trait LanguageDriver: Send + Sync + Debug {
    /// Fully-qualified driver name.
    fn name(&self) -> &str;

    /// Short name usable in mapper documents.
    fn alias(&self) -> Option<&str> {
        None
    }
}

/// A named cache shared by mapped statements.
pub trait Cache: Send + Sync + Debug {
    fn id(&self) -> &str;
}

/// Resolves the database id of a data source.
pub trait DatabaseIdProvider: Send + Sync + Debug {
    fn database_id(&self, data_source: &dyn DataSource) -> FactoryResult<Option<String>>;
}

/// Creates result objects.
pub trait ObjectFactory: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Wraps result objects for property access.
pub trait ObjectWrapperFactory: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Caches type introspection.
pub trait ReflectorFactory: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Creates lazy-loading proxies.
pub trait ProxyFactory: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Late-stage mutation of the assembled registries, before mappers are attached.
pub trait ConfigurationCustomizer: Send + Sync {
    fn customize(&self, registry: &mut RegistrySet);
}

impl<F> ConfigurationCustomizer for F
where
    F: Fn(&mut RegistrySet) + Send + Sync,
{
    fn customize(&self, registry: &mut RegistrySet) {
        self(registry)
    }
}
