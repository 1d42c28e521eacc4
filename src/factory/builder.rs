//! Session factory builder.

use crate::assembler::RegistryAssembler;
use crate::components::ComponentPool;
use crate::discovery::{ResourceLoader, TypeDiscovery};
use crate::document::load_document;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::SessionFactory;
use crate::models::{NamedConfiguration, TypeDescriptor};
use crate::registry::{RegistrySet, TransactionStrategy};
use crate::resolver::{self, ResolvedDocument};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// Builds session factories from named configurations.
///
/// The builder is shared by every configuration: the pool, the discovery source and the
/// resource loader are read-only, so factories can be built from several threads at once.
#[derive(Clone)]
pub struct FactoryBuilder {
    pool: Arc<ComponentPool>,
    discovery: Arc<dyn TypeDiscovery>,
    resources: Arc<dyn ResourceLoader>,
    transaction_strategy: TransactionStrategy,
}

impl FactoryBuilder {
    pub fn new(
        pool: Arc<ComponentPool>,
        discovery: Arc<dyn TypeDiscovery>,
        resources: Arc<dyn ResourceLoader>,
    ) -> Self {
        Self {
            pool,
            discovery,
            resources,
            transaction_strategy: TransactionStrategy::default(),
        }
    }

    pub fn with_transaction_strategy(mut self, strategy: TransactionStrategy) -> Self {
        self.transaction_strategy = strategy;
        self
    }

    pub fn pool(&self) -> &ComponentPool {
        &self.pool
    }

    /// Build the session factory for the configuration named `name`.
    #[instrument(skip(self, name, config), fields(configuration = %name))]
    pub fn build(&self, name: &str, config: &NamedConfiguration) -> FactoryResult<SessionFactory> {
        let lookup_name = config.data_source_lookup_name(name);
        let data_source = match self.pool.data_source(lookup_name) {
            Some(data_source) => data_source,
            None => {
                return Err(match self.pool.unavailable_data_source(lookup_name) {
                    Some(reason) => FactoryError::connection(
                        format!("Data source '{lookup_name}' failed to connect: {reason}"),
                        "Check the data source URL and that the database server is reachable",
                    ),
                    None => FactoryError::missing_data_source(name, lookup_name),
                });
            }
        };
        debug!(data_source = %lookup_name, "Resolved data source");

        let mappers = resolver::find_mappers(name, config, self.discovery.as_ref())?;
        let documents = resolver::find_mapper_documents(name, config, self.resources.as_ref())?;

        let mut registries =
            RegistryAssembler::new(name, config, &self.pool, self.discovery.as_ref())
                .assemble(data_source, self.transaction_strategy)?;
        self.attach(&mut registries, &mappers, &documents)?;

        info!(
            mappers = registries.mappers.mapper_count(),
            statements = registries.mappers.statement_count(),
            "Built session factory"
        );
        Ok(SessionFactory::new(registries))
    }

    /// Build every configuration, one thread per configuration.
    pub fn build_all(
        &self,
        configs: &BTreeMap<String, NamedConfiguration>,
    ) -> BTreeMap<String, FactoryResult<SessionFactory>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = configs
                .iter()
                .map(|(name, config)| (name, scope.spawn(move || self.build(name, config))))
                .collect();
            handles
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(FactoryError::internal(format!("Assembly of '{name}' panicked")))
                    });
                    (name.clone(), result)
                })
                .collect()
        })
    }

    /// Register mapper interfaces, then parse mapper documents.
    ///
    /// Requires fully assembled registries.
    pub(crate) fn attach(
        &self,
        registries: &mut RegistrySet,
        mappers: &[TypeDescriptor],
        documents: &[ResolvedDocument],
    ) -> FactoryResult<()> {
        if !registries.is_fully_assembled() {
            return Err(FactoryError::internal(format!(
                "Cannot attach mappers to '{}' before assembly completes (completed: {:?})",
                registries.environment.id,
                registries.completed_passes()
            )));
        }

        for mapper in mappers {
            if mapper.is_interface() {
                registries.mappers.add_mapper(mapper.name.clone());
            } else {
                trace!(mapper = %mapper.name, "Skipping non-interface mapper");
            }
        }

        for document in documents {
            let location = document.location.to_string();
            let content = self.resources.read(&document.location)?;
            load_document(&location, &content, registries, self.discovery.as_ref())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FactoryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("pool", &self.pool)
            .field("transaction_strategy", &self.transaction_strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DataSource;
    use crate::discovery::{FileResourceLoader, TypeCatalog};
    use crate::models::CoreSettings;
    use crate::registry::Environment;
    use tempfile::TempDir;

    #[derive(Debug)]
    struct Memory;

    impl DataSource for Memory {
        fn product_name(&self) -> FactoryResult<String> {
            Ok("SQLite".to_string())
        }
    }

    fn builder(dir: &TempDir, pool: ComponentPool) -> FactoryBuilder {
        let catalog = TypeCatalog::new()
            .with_type(TypeDescriptor::mapper_interface("pkg.mapper.CityMapper"))
            .with_type(TypeDescriptor::class("pkg.domain.City"));
        FactoryBuilder::new(
            Arc::new(pool),
            Arc::new(catalog),
            Arc::new(FileResourceLoader::new(dir.path())),
        )
    }

    fn pool_with(name: &str) -> ComponentPool {
        ComponentPool::builder()
            .data_source(name, Arc::new(Memory))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_data_source_names_lookup() {
        let dir = TempDir::new().unwrap();
        let err = builder(&dir, pool_with("2nd"))
            .build("default", &NamedConfiguration::default())
            .unwrap_err();
        match err {
            FactoryError::MissingDataSource { configuration, lookup_name } => {
                assert_eq!(configuration, "default");
                assert_eq!(lookup_name, "default");
            }
            other => panic!("expected missing data source, got {other:?}"),
        }
    }

    #[test]
    fn test_unavailable_data_source_fails_only_its_configuration() {
        let dir = TempDir::new().unwrap();
        let pool = ComponentPool::builder()
            .data_source("default", Arc::new(Memory))
            .unavailable_data_source("2nd", "pool timed out")
            .build()
            .unwrap();
        let configs = BTreeMap::from([
            ("default".to_string(), NamedConfiguration::default()),
            ("2nd".to_string(), NamedConfiguration::default()),
        ]);
        let results = builder(&dir, pool).build_all(&configs);

        assert!(results["default"].is_ok());
        match &results["2nd"] {
            Err(FactoryError::Connection { message, .. }) => {
                assert!(message.contains("'2nd'"));
                assert!(message.contains("pool timed out"));
            }
            other => panic!("expected connection failure, got {other:?}"),
        }
    }

    #[test]
    fn test_data_source_name_override() {
        let dir = TempDir::new().unwrap();
        let config = NamedConfiguration::default().with_data_source_name("2nd");
        let factory = builder(&dir, pool_with("2nd")).build("default", &config).unwrap();
        assert_eq!(factory.name(), "default");
    }

    #[test]
    fn test_non_interface_mapper_skipped() {
        let dir = TempDir::new().unwrap();
        let config = NamedConfiguration::default()
            .with_mappers(["pkg.domain.City"])
            .with_mapper_packages(["pkg.mapper"]);
        let factory = builder(&dir, pool_with("default")).build("default", &config).unwrap();
        assert_eq!(factory.mappers().collect::<Vec<_>>(), vec!["pkg.mapper.CityMapper"]);
    }

    #[test]
    fn test_attach_requires_complete_assembly() {
        let dir = TempDir::new().unwrap();
        let mut registries = RegistrySet::new(
            Environment {
                id: "default".to_string(),
                transaction_strategy: TransactionStrategy::Local,
                data_source: Arc::new(Memory),
            },
            CoreSettings::default(),
        );
        let err = builder(&dir, pool_with("default"))
            .attach(
                &mut registries,
                &[TypeDescriptor::mapper_interface("pkg.mapper.CityMapper")],
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, FactoryError::Internal { .. }));
        assert_eq!(registries.mappers.mapper_count(), 0);
    }

    #[test]
    fn test_build_all_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let configs = BTreeMap::from([
            ("default".to_string(), NamedConfiguration::default()),
            ("2nd".to_string(), NamedConfiguration::default()),
        ]);
        let results = builder(&dir, pool_with("default")).build_all(&configs);
        assert!(results["default"].is_ok());
        assert!(matches!(results["2nd"], Err(FactoryError::MissingDataSource { .. })));
    }
}
