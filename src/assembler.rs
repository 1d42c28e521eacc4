//! Registry assembly.
//!
//! The assembler turns one named configuration plus the shared component pool into a
//! fully populated [`RegistrySet`]. Passes run in a fixed order and each one checks that
//! its predecessor has completed:
//!
//! 1. Environment binding
//! 2. Type aliases
//! 3. Type converters
//! 4. Factory overrides
//! 5. Interceptors
//! 6. Scripting language drivers
//! 7. Caches and database id
//!
//! Pool customizers run after the seventh pass. Mapper attachment is not part of assembly;
//! the factory builder does it once every pass has been recorded.

use crate::components::{ComponentPool, DataSource};
use crate::discovery::TypeDiscovery;
use crate::error::{FactoryError, FactoryResult};
use crate::models::NamedConfiguration;
use crate::registry::{
    DeclaredConverter, DeclaredDriver, Environment, RegistrySet, TransactionStrategy,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One step of registry assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyPass {
    Environment,
    TypeAliases,
    TypeConverters,
    Factories,
    Interceptors,
    LanguageDrivers,
    CachesAndDatabaseId,
}

impl AssemblyPass {
    /// Every pass in execution order.
    pub const ALL: [AssemblyPass; 7] = [
        AssemblyPass::Environment,
        AssemblyPass::TypeAliases,
        AssemblyPass::TypeConverters,
        AssemblyPass::Factories,
        AssemblyPass::Interceptors,
        AssemblyPass::LanguageDrivers,
        AssemblyPass::CachesAndDatabaseId,
    ];

    /// The pass that must have completed before this one runs.
    pub fn precondition(self) -> Option<AssemblyPass> {
        let index = Self::ALL.iter().position(|p| *p == self)?;
        index.checked_sub(1).map(|previous| Self::ALL[previous])
    }
}

impl fmt::Display for AssemblyPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssemblyPass::Environment => "environment",
            AssemblyPass::TypeAliases => "type aliases",
            AssemblyPass::TypeConverters => "type converters",
            AssemblyPass::Factories => "factories",
            AssemblyPass::Interceptors => "interceptors",
            AssemblyPass::LanguageDrivers => "language drivers",
            AssemblyPass::CachesAndDatabaseId => "caches and database id",
        };
        write!(f, "{s}")
    }
}

/// Populates the registries of one named configuration.
pub struct RegistryAssembler<'a> {
    name: &'a str,
    config: &'a NamedConfiguration,
    pool: &'a ComponentPool,
    discovery: &'a dyn TypeDiscovery,
}

impl<'a> RegistryAssembler<'a> {
    pub fn new(
        name: &'a str,
        config: &'a NamedConfiguration,
        pool: &'a ComponentPool,
        discovery: &'a dyn TypeDiscovery,
    ) -> Self {
        Self {
            name,
            config,
            pool,
            discovery,
        }
    }

    /// Run every pass, then every pool customizer.
    pub fn assemble(
        &self,
        data_source: Arc<dyn DataSource>,
        transaction_strategy: TransactionStrategy,
    ) -> FactoryResult<RegistrySet> {
        let mut registries = self.bind_environment(data_source, transaction_strategy);
        self.register_type_aliases(&mut registries)?;
        self.register_type_converters(&mut registries)?;
        self.install_factories(&mut registries)?;
        self.install_interceptors(&mut registries)?;
        self.register_language_drivers(&mut registries)?;
        self.register_caches_and_database_id(&mut registries)?;
        self.apply_customizers(&mut registries);

        info!(
            configuration = %self.name,
            aliases = registries.type_aliases.len(),
            interceptors = registries.interceptors.len(),
            caches = registries.caches.len(),
            database_id = ?registries.database_id,
            "Assembled registries"
        );
        Ok(registries)
    }

    fn require(&self, registries: &RegistrySet, pass: AssemblyPass) -> FactoryResult<()> {
        match pass.precondition() {
            Some(previous) if !registries.has_completed(previous) => {
                Err(FactoryError::internal(format!(
                    "Assembly pass '{pass}' for '{}' ran before '{previous}'",
                    self.name
                )))
            }
            _ => Ok(()),
        }
    }

    fn bind_environment(
        &self,
        data_source: Arc<dyn DataSource>,
        transaction_strategy: TransactionStrategy,
    ) -> RegistrySet {
        let environment = Environment {
            id: self.name.to_string(),
            transaction_strategy,
            data_source,
        };
        let mut registries = RegistrySet::new(environment, self.config.configuration.clone());
        registries.record_pass(AssemblyPass::Environment);
        debug!(configuration = %self.name, strategy = %transaction_strategy, "Bound environment");
        registries
    }

    fn register_type_aliases(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::TypeAliases)?;
        let super_type = self.config.type_alias_super_type.as_str();

        for package in &self.config.type_alias_packages {
            let mut registered = 0usize;
            for descriptor in self.discovery.scan(package) {
                if descriptor.is_interface() || !descriptor.is_assignable_to(super_type) {
                    continue;
                }
                registries.type_aliases.register_type(&descriptor)?;
                registered += 1;
            }
            debug!(
                configuration = %self.name,
                package = %package,
                super_type,
                registered,
                "Scanned type aliases"
            );
        }

        for type_name in &self.config.type_aliases {
            let descriptor = self
                .discovery
                .lookup(type_name)
                .ok_or_else(|| FactoryError::unknown_type(type_name, "type_aliases"))?;
            registries.type_aliases.register_type(&descriptor)?;
        }

        registries.record_pass(AssemblyPass::TypeAliases);
        Ok(())
    }

    fn register_type_converters(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::TypeConverters)?;

        for package in &self.config.type_handler_packages {
            for descriptor in self.discovery.scan(package) {
                if descriptor.is_type_converter() {
                    registries
                        .type_converters
                        .register(Arc::new(DeclaredConverter::from_descriptor(&descriptor)));
                }
            }
        }

        for type_name in &self.config.type_handlers {
            let descriptor = self
                .discovery
                .lookup(type_name)
                .ok_or_else(|| FactoryError::unknown_type(type_name, "type_handlers"))?;
            if !descriptor.is_type_converter() {
                return Err(FactoryError::invalid_configuration(format!(
                    "'{type_name}' in type_handlers is not a concrete type converter"
                )));
            }
            registries
                .type_converters
                .register(Arc::new(DeclaredConverter::from_descriptor(&descriptor)));
        }

        for converter in self.pool.type_converters() {
            debug!(
                configuration = %self.name,
                converter = converter.name(),
                "Registering pool type converter"
            );
            registries.type_converters.register(converter.clone());
        }

        registries.record_pass(AssemblyPass::TypeConverters);
        Ok(())
    }

    fn install_factories(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::Factories)?;
        let factories = &mut registries.factories;

        if let Some(factory) = self.pool.object_factory() {
            factories.object_factory = factory.clone();
        }
        if let Some(factory) = self.pool.object_wrapper_factory() {
            factories.object_wrapper_factory = factory.clone();
        }
        if let Some(factory) = self.pool.reflector_factory() {
            factories.reflector_factory = factory.clone();
        }
        if let Some(factory) = self.pool.proxy_factory() {
            factories.proxy_factory = factory.clone();
        }

        debug!(
            configuration = %self.name,
            object_factory = factories.object_factory.name(),
            object_wrapper_factory = factories.object_wrapper_factory.name(),
            reflector_factory = factories.reflector_factory.name(),
            proxy_factory = factories.proxy_factory.name(),
            "Installed factories"
        );
        registries.record_pass(AssemblyPass::Factories);
        Ok(())
    }

    fn install_interceptors(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::Interceptors)?;
        for interceptor in self.pool.interceptors() {
            registries.interceptors.add(interceptor.clone());
        }
        debug!(
            configuration = %self.name,
            interceptors = ?registries.interceptors.names(),
            "Installed interceptors"
        );
        registries.record_pass(AssemblyPass::Interceptors);
        Ok(())
    }

    fn register_language_drivers(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::LanguageDrivers)?;

        for type_name in &self.config.scripting_language_drivers {
            let descriptor = self.discovery.lookup(type_name).ok_or_else(|| {
                FactoryError::unknown_type(type_name, "scripting_language_drivers")
            })?;
            if !descriptor.is_language_driver() {
                return Err(FactoryError::invalid_configuration(format!(
                    "'{type_name}' in scripting_language_drivers is not a language driver"
                )));
            }
            registries
                .languages
                .register(Arc::new(DeclaredDriver::new(descriptor.name)));
        }

        for driver in self.pool.language_drivers() {
            registries.languages.register(driver.clone());
        }

        if let Some(default) = &self.config.default_scripting_language_driver {
            if registries.languages.driver(default).is_none() {
                let descriptor = self.discovery.lookup(default).ok_or_else(|| {
                    FactoryError::unknown_type(default, "default_scripting_language_driver")
                })?;
                if !descriptor.is_language_driver() {
                    return Err(FactoryError::invalid_configuration(format!(
                        "'{default}' in default_scripting_language_driver is not a language driver"
                    )));
                }
                registries
                    .languages
                    .register(Arc::new(DeclaredDriver::new(descriptor.name)));
            }
            registries.languages.set_default(default)?;
        }

        debug!(
            configuration = %self.name,
            default_driver = registries.languages.default_driver().name(),
            "Registered language drivers"
        );
        registries.record_pass(AssemblyPass::LanguageDrivers);
        Ok(())
    }

    fn register_caches_and_database_id(&self, registries: &mut RegistrySet) -> FactoryResult<()> {
        self.require(registries, AssemblyPass::CachesAndDatabaseId)?;

        for cache in self.pool.caches() {
            registries.add_cache(cache.clone())?;
        }

        if let Some(provider) = self.pool.database_id_provider() {
            let data_source = registries.environment.data_source.clone();
            let database_id = provider
                .database_id(data_source.as_ref())
                .map_err(|e| FactoryError::database_id(self.name, e.to_string()))?;
            debug!(configuration = %self.name, database_id = ?database_id, "Resolved database id");
            registries.database_id = database_id;
        }

        registries.record_pass(AssemblyPass::CachesAndDatabaseId);
        Ok(())
    }

    fn apply_customizers(&self, registries: &mut RegistrySet) {
        for customizer in self.pool.customizers() {
            customizer.customize(registries);
        }
        if !self.pool.customizers().is_empty() {
            debug!(
                configuration = %self.name,
                customizers = self.pool.customizers().len(),
                "Applied configuration customizers"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        Cache, ConfigurationCustomizer, DatabaseIdProvider, Interceptor, ObjectFactory,
        TypeConverter,
    };
    use crate::discovery::TypeCatalog;
    use crate::models::{ExecutorType, TypeDescriptor, TypeKind};
    use crate::registry::XmlLanguageDriver;

    #[derive(Debug)]
    struct Memory;

    impl DataSource for Memory {
        fn product_name(&self) -> FactoryResult<String> {
            Ok("SQLite".to_string())
        }
    }

    #[derive(Debug)]
    struct Named(&'static str);

    impl Interceptor for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    impl ObjectFactory for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    impl Cache for Named {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[derive(Debug)]
    struct PoolConverter;

    impl TypeConverter for PoolConverter {
        fn name(&self) -> &str {
            "pool.CityConverter"
        }

        fn handled_types(&self) -> Vec<String> {
            vec!["pkg.domain.City".to_string()]
        }
    }

    #[derive(Debug)]
    struct FailingProvider;

    impl DatabaseIdProvider for FailingProvider {
        fn database_id(&self, _: &dyn DataSource) -> FactoryResult<Option<String>> {
            Err(FactoryError::connection("metadata unavailable", "retry"))
        }
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with_type(TypeDescriptor::class("pkg.domain.City").with_supertype("pkg.domain.Entity"))
            .with_type(
                TypeDescriptor::class("pkg.domain.Country").with_supertype("pkg.domain.Entity"),
            )
            .with_type(TypeDescriptor::class("pkg.domain.Money"))
            .with_type(TypeDescriptor::interface("pkg.domain.Entity"))
            .with_type(TypeDescriptor::class("pkg.other.Region").with_alias("area"))
            .with_type(TypeDescriptor::converter("pkg.handler.CityConverter", ["pkg.domain.City"]))
            .with_type(
                TypeDescriptor::converter("pkg.handler.BaseConverter", ["pkg.domain.Money"])
                    .with_kind(TypeKind::Abstract),
            )
            .with_type(TypeDescriptor::language_driver("pkg.scripting.MyLanguageDriver"))
    }

    fn assemble(config: &NamedConfiguration, pool: &ComponentPool) -> FactoryResult<RegistrySet> {
        RegistryAssembler::new("default", config, pool, &catalog())
            .assemble(Arc::new(Memory), TransactionStrategy::Local)
    }

    fn empty_pool() -> ComponentPool {
        ComponentPool::builder().build().unwrap()
    }

    #[test]
    fn test_all_passes_recorded_in_order() {
        let registries = assemble(&NamedConfiguration::default(), &empty_pool()).unwrap();
        assert_eq!(registries.completed_passes(), &AssemblyPass::ALL);
        assert!(registries.is_fully_assembled());
        assert_eq!(registries.environment.id, "default");
    }

    #[test]
    fn test_precondition_is_previous_pass() {
        assert_eq!(AssemblyPass::Environment.precondition(), None);
        assert_eq!(
            AssemblyPass::TypeAliases.precondition(),
            Some(AssemblyPass::Environment)
        );
        assert_eq!(
            AssemblyPass::CachesAndDatabaseId.precondition(),
            Some(AssemblyPass::LanguageDrivers)
        );
    }

    #[test]
    fn test_alias_super_type_filters_scan_only() {
        let config = NamedConfiguration {
            type_alias_packages: vec!["pkg.domain".to_string()],
            type_alias_super_type: "pkg.domain.Entity".to_string(),
            type_aliases: vec!["pkg.other.Region".to_string()],
            ..Default::default()
        };
        let registries = assemble(&config, &empty_pool()).unwrap();
        let aliases = &registries.type_aliases;
        assert_eq!(aliases.resolve_alias("city"), Some("pkg.domain.City"));
        assert_eq!(aliases.resolve_alias("country"), Some("pkg.domain.Country"));
        assert!(aliases.resolve_alias("money").is_none());
        assert!(aliases.resolve_alias("entity").is_none());
        assert_eq!(aliases.resolve_alias("area"), Some("pkg.other.Region"));
    }

    #[test]
    fn test_unknown_explicit_alias_type() {
        let config = NamedConfiguration {
            type_aliases: vec!["pkg.Nope".to_string()],
            ..Default::default()
        };
        let err = assemble(&config, &empty_pool()).unwrap_err();
        assert!(matches!(err, FactoryError::UnknownType { .. }));
    }

    #[test]
    fn test_converter_scan_skips_abstract() {
        let config = NamedConfiguration {
            type_handler_packages: vec!["pkg.handler".to_string()],
            ..Default::default()
        };
        let registries = assemble(&config, &empty_pool()).unwrap();
        assert!(registries.type_converters.has_converter("pkg.domain.City"));
        assert!(!registries.type_converters.has_converter("pkg.domain.Money"));
    }

    #[test]
    fn test_pool_converter_overrides_configured() {
        let config = NamedConfiguration {
            type_handlers: vec!["pkg.handler.CityConverter".to_string()],
            ..Default::default()
        };
        let pool = ComponentPool::builder()
            .type_converter(Arc::new(PoolConverter))
            .build()
            .unwrap();
        let registries = assemble(&config, &pool).unwrap();
        assert_eq!(
            registries
                .type_converters
                .converter_for("pkg.domain.City")
                .map(|c| c.name()),
            Some("pool.CityConverter")
        );
    }

    #[test]
    fn test_non_converter_type_handler_rejected() {
        let config = NamedConfiguration {
            type_handlers: vec!["pkg.domain.City".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            assemble(&config, &empty_pool()),
            Err(FactoryError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_abstract_type_handler_rejected() {
        let config = NamedConfiguration {
            type_handlers: vec!["pkg.handler.BaseConverter".to_string()],
            ..Default::default()
        };
        match assemble(&config, &empty_pool()) {
            Err(FactoryError::InvalidConfiguration { message }) => {
                assert!(message.contains("pkg.handler.BaseConverter"));
            }
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_language_driver_registered() {
        let config = NamedConfiguration {
            scripting_language_drivers: vec!["pkg.scripting.MyLanguageDriver".to_string()],
            ..Default::default()
        };
        let registries = assemble(&config, &empty_pool()).unwrap();
        assert!(registries.languages.driver("pkg.scripting.MyLanguageDriver").is_some());
        assert_eq!(registries.languages.default_driver().name(), XmlLanguageDriver::NAME);
    }

    #[test]
    fn test_non_driver_language_driver_rejected() {
        let config = NamedConfiguration {
            scripting_language_drivers: vec!["pkg.domain.City".to_string()],
            ..Default::default()
        };
        match assemble(&config, &empty_pool()) {
            Err(FactoryError::InvalidConfiguration { message }) => {
                assert!(message.contains("scripting_language_drivers"));
            }
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_override_and_defaults() {
        let pool = ComponentPool::builder()
            .object_factory(Arc::new(Named("custom.ObjectFactory")))
            .build()
            .unwrap();
        let registries = assemble(&NamedConfiguration::default(), &pool).unwrap();
        assert_eq!(registries.factories.object_factory.name(), "custom.ObjectFactory");
        assert_eq!(registries.factories.proxy_factory.name(), "DefaultProxyFactory");
    }

    #[test]
    fn test_interceptor_order() {
        let pool = ComponentPool::builder()
            .interceptor(Arc::new(Named("first")))
            .interceptor(Arc::new(Named("second")))
            .build()
            .unwrap();
        let registries = assemble(&NamedConfiguration::default(), &pool).unwrap();
        assert_eq!(registries.interceptors.names(), vec!["first", "second"]);
    }

    #[test]
    fn test_default_language_driver() {
        let registries = assemble(&NamedConfiguration::default(), &empty_pool()).unwrap();
        assert_eq!(registries.languages.default_driver().name(), XmlLanguageDriver::NAME);

        let config = NamedConfiguration {
            default_scripting_language_driver: Some("pkg.scripting.MyLanguageDriver".to_string()),
            ..Default::default()
        };
        let registries = assemble(&config, &empty_pool()).unwrap();
        assert_eq!(
            registries.languages.default_driver().name(),
            "pkg.scripting.MyLanguageDriver"
        );
    }

    #[test]
    fn test_duplicate_pool_cache_rejected() {
        let pool = ComponentPool::builder()
            .cache(Arc::new(Named("mailCache")))
            .cache(Arc::new(Named("mailCache")))
            .build()
            .unwrap();
        assert!(matches!(
            assemble(&NamedConfiguration::default(), &pool),
            Err(FactoryError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_database_id_failure() {
        let pool = ComponentPool::builder()
            .database_id_provider(Arc::new(FailingProvider))
            .build()
            .unwrap();
        match assemble(&NamedConfiguration::default(), &pool) {
            Err(FactoryError::DatabaseIdResolution { configuration, message }) => {
                assert_eq!(configuration, "default");
                assert!(message.contains("metadata unavailable"));
            }
            other => panic!("expected database id failure, got {other:?}"),
        }
    }

    #[test]
    fn test_customizers_run_in_order_after_passes() {
        let first: Arc<dyn ConfigurationCustomizer> = Arc::new(|registries: &mut RegistrySet| {
            assert!(registries.is_fully_assembled());
            registries.settings.default_executor_type = ExecutorType::Reuse;
            registries.database_id = Some("first".to_string());
        });
        let second: Arc<dyn ConfigurationCustomizer> = Arc::new(|registries: &mut RegistrySet| {
            let previous = registries.database_id.take().unwrap_or_default();
            registries.database_id = Some(format!("{previous}+second"));
        });
        let pool = ComponentPool::builder()
            .customizer(first)
            .customizer(second)
            .build()
            .unwrap();
        let registries = assemble(&NamedConfiguration::default(), &pool).unwrap();
        assert_eq!(registries.settings.default_executor_type, ExecutorType::Reuse);
        assert_eq!(registries.database_id.as_deref(), Some("first+second"));
    }
}
