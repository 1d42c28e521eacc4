//! Component pool.
//!
//! A typed multimap built once at startup and read by every named configuration.
//! Find-all capabilities keep registration order; single-role capabilities accept at
//! most one registration, and a second one fails `build()`.

use crate::components::{
    Cache, ConfigurationCustomizer, DataSource, DatabaseIdProvider, Interceptor, LanguageDriver,
    ObjectFactory, ObjectWrapperFactory, ProxyFactory, ReflectorFactory, TypeConverter,
};
use crate::error::{FactoryError, FactoryResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct ComponentPool {
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
    unavailable_data_sources: BTreeMap<String, String>,
    type_converters: Vec<Arc<dyn TypeConverter>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    language_drivers: Vec<Arc<dyn LanguageDriver>>,
    caches: Vec<Arc<dyn Cache>>,
    customizers: Vec<Arc<dyn ConfigurationCustomizer>>,
    object_factory: Option<Arc<dyn ObjectFactory>>,
    object_wrapper_factory: Option<Arc<dyn ObjectWrapperFactory>>,
    reflector_factory: Option<Arc<dyn ReflectorFactory>>,
    proxy_factory: Option<Arc<dyn ProxyFactory>>,
    database_id_provider: Option<Arc<dyn DatabaseIdProvider>>,
}

impl ComponentPool {
    pub fn builder() -> ComponentPoolBuilder {
        ComponentPoolBuilder::default()
    }

    /// Find a data source by name.
    pub fn data_source(&self, name: &str) -> Option<Arc<dyn DataSource>> {
        self.data_sources.get(name).cloned()
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    /// Reason a declared data source could not be opened.
    pub fn unavailable_data_source(&self, name: &str) -> Option<&str> {
        self.unavailable_data_sources.get(name).map(String::as_str)
    }

    pub fn type_converters(&self) -> &[Arc<dyn TypeConverter>] {
        &self.type_converters
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn language_drivers(&self) -> &[Arc<dyn LanguageDriver>] {
        &self.language_drivers
    }

    pub fn caches(&self) -> &[Arc<dyn Cache>] {
        &self.caches
    }

    pub fn customizers(&self) -> &[Arc<dyn ConfigurationCustomizer>] {
        &self.customizers
    }

    pub fn object_factory(&self) -> Option<&Arc<dyn ObjectFactory>> {
        self.object_factory.as_ref()
    }

    pub fn object_wrapper_factory(&self) -> Option<&Arc<dyn ObjectWrapperFactory>> {
        self.object_wrapper_factory.as_ref()
    }

    pub fn reflector_factory(&self) -> Option<&Arc<dyn ReflectorFactory>> {
        self.reflector_factory.as_ref()
    }

    pub fn proxy_factory(&self) -> Option<&Arc<dyn ProxyFactory>> {
        self.proxy_factory.as_ref()
    }

    pub fn database_id_provider(&self) -> Option<&Arc<dyn DatabaseIdProvider>> {
        self.database_id_provider.as_ref()
    }
}

impl fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPool")
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .field(
                "unavailable_data_sources",
                &self.unavailable_data_sources.keys().collect::<Vec<_>>(),
            )
            .field("type_converters", &self.type_converters.len())
            .field("interceptors", &self.interceptors.len())
            .field("language_drivers", &self.language_drivers.len())
            .field("caches", &self.caches.len())
            .field("customizers", &self.customizers.len())
            .field("object_factory", &self.object_factory.is_some())
            .field("object_wrapper_factory", &self.object_wrapper_factory.is_some())
            .field("reflector_factory", &self.reflector_factory.is_some())
            .field("proxy_factory", &self.proxy_factory.is_some())
            .field("database_id_provider", &self.database_id_provider.is_some())
            .finish()
    }
}

/// Collects components; duplicate single-role or data-source registrations fail `build()`.
#[derive(Default)]
pub struct ComponentPoolBuilder {
    pool: ComponentPool,
    duplicates: Vec<String>,
}

fn set_once<T: ?Sized>(
    slot: &mut Option<Arc<T>>,
    value: Arc<T>,
    role: &str,
    duplicates: &mut Vec<String>,
) {
    if slot.is_some() {
        duplicates.push(role.to_string());
    } else {
        *slot = Some(value);
    }
}

impl ComponentPoolBuilder {
    pub fn data_source(
        mut self,
        name: impl Into<String>,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        let name = name.into();
        if self.pool.data_sources.contains_key(&name) {
            self.duplicates.push(format!("data source named '{name}'"));
        } else {
            self.pool.data_sources.insert(name, data_source);
        }
        self
    }

    /// Declare a data source that failed to open; configurations bound to it fail alone.
    pub fn unavailable_data_source(
        mut self,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.pool.unavailable_data_sources.insert(name.into(), reason.into());
        self
    }

    pub fn type_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.pool.type_converters.push(converter);
        self
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.pool.interceptors.push(interceptor);
        self
    }

    pub fn language_driver(mut self, driver: Arc<dyn LanguageDriver>) -> Self {
        self.pool.language_drivers.push(driver);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.pool.caches.push(cache);
        self
    }

    pub fn customizer(mut self, customizer: Arc<dyn ConfigurationCustomizer>) -> Self {
        self.pool.customizers.push(customizer);
        self
    }

    pub fn object_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        set_once(&mut self.pool.object_factory, factory, "object factory", &mut self.duplicates);
        self
    }

    pub fn object_wrapper_factory(mut self, factory: Arc<dyn ObjectWrapperFactory>) -> Self {
        set_once(
            &mut self.pool.object_wrapper_factory,
            factory,
            "object wrapper factory",
            &mut self.duplicates,
        );
        self
    }

    pub fn reflector_factory(mut self, factory: Arc<dyn ReflectorFactory>) -> Self {
        set_once(
            &mut self.pool.reflector_factory,
            factory,
            "reflector factory",
            &mut self.duplicates,
        );
        self
    }

    pub fn proxy_factory(mut self, factory: Arc<dyn ProxyFactory>) -> Self {
        set_once(&mut self.pool.proxy_factory, factory, "proxy factory", &mut self.duplicates);
        self
    }

    pub fn database_id_provider(mut self, provider: Arc<dyn DatabaseIdProvider>) -> Self {
        set_once(
            &mut self.pool.database_id_provider,
            provider,
            "database id provider",
            &mut self.duplicates,
        );
        self
    }

    pub fn build(self) -> FactoryResult<ComponentPool> {
        match self.duplicates.into_iter().next() {
            Some(role) => Err(FactoryError::duplicate_component(role)),
            None => Ok(self.pool),
        }
    }
}
