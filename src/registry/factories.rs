//! Object construction, introspection and proxy factories.

use crate::components::{ObjectFactory, ObjectWrapperFactory, ProxyFactory, ReflectorFactory};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn name(&self) -> &str {
        "DefaultObjectFactory"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectWrapperFactory;

impl ObjectWrapperFactory for DefaultObjectWrapperFactory {
    fn name(&self) -> &str {
        "DefaultObjectWrapperFactory"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReflectorFactory;

impl ReflectorFactory for DefaultReflectorFactory {
    fn name(&self) -> &str {
        "DefaultReflectorFactory"
    }
}

/// Lazy-loading proxy factory used unless the pool overrides it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProxyFactory;

impl ProxyFactory for DefaultProxyFactory {
    fn name(&self) -> &str {
        "DefaultProxyFactory"
    }
}

/// The four factory roles, each holding exactly one implementation.
#[derive(Debug, Clone)]
pub struct Factories {
    pub object_factory: Arc<dyn ObjectFactory>,
    pub object_wrapper_factory: Arc<dyn ObjectWrapperFactory>,
    pub reflector_factory: Arc<dyn ReflectorFactory>,
    pub proxy_factory: Arc<dyn ProxyFactory>,
}

impl Default for Factories {
    fn default() -> Self {
        Self {
            object_factory: Arc::new(DefaultObjectFactory),
            object_wrapper_factory: Arc::new(DefaultObjectWrapperFactory),
            reflector_factory: Arc::new(DefaultReflectorFactory),
            proxy_factory: Arc::new(DefaultProxyFactory),
        }
    }
}
