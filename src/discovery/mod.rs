//! Injected discovery capabilities.
//!
//! This module provides the two capabilities the resolver depends on:
//! - Type discovery (namespace scans and type lookup)
//! - Resource loading (probing search roots for mapper documents)

pub mod catalog;
pub mod resources;

pub use catalog::{TypeCatalog, TypeDiscovery};
pub use resources::{FileResourceLoader, ResourceLoader, ResourceLocation};
