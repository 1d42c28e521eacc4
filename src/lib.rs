//! sqlmap-factory library
//!
//! Assembles one immutable session factory per named database configuration: mapper
//! interfaces and mapper documents are resolved, registries are populated from the
//! configuration and a shared component pool, and the result is published per name.

pub mod assembler;
pub mod components;
pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod factory;
pub mod models;
pub mod registry;
pub mod resolver;

pub use assembler::{AssemblyPass, RegistryAssembler};
pub use components::{ComponentPool, ComponentPoolBuilder};
pub use config::{Config, ConfigurationLoader};
pub use discovery::{FileResourceLoader, ResourceLoader, TypeCatalog, TypeDiscovery};
pub use error::{FactoryError, FactoryResult};
pub use factory::{FactoryBuilder, MapperContext, MapperProxy, SessionFactory, SessionTemplate};
pub use models::NamedConfiguration;
pub use registry::{RegistrySet, TransactionStrategy};
