//! Data models for session factory assembly.
//!
//! This module re-exports the configuration and type models used throughout the crate.

pub mod named;
pub mod settings;
pub mod types;

// Re-export commonly used types
pub use named::{
    DEFAULT_RESOURCE_ROOT, NamedConfiguration, PRIMARY_CONFIGURATION, validate_name,
};
pub use settings::{
    AutoMappingBehavior, CoreSettings, EXCLUDED_SETTINGS, ExecutorType, LocalCacheScope,
    UnknownColumnBehavior,
};
pub use types::{LANGUAGE_DRIVER, ROOT_TYPE, TYPE_CONVERTER, TypeDescriptor, TypeKind};
