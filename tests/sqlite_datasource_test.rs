//! Integration tests for sqlx-backed data sources.
//!
//! Tests verify that:
//! - SQLite data sources connect and report their product name and version
//! - The vendor database-id provider resolves against a live data source
//! - A file database is created when missing
//! - A data source that fails to connect only fails the configurations bound to it

use sqlmap_factory::components::{
    ConnectedDataSources, DataSource, SqlxDataSource, VendorDatabaseIdProvider,
};
use sqlmap_factory::config::DataSourceConfig;
use sqlmap_factory::models::TypeDescriptor;
use sqlmap_factory::{
    ComponentPool, FactoryBuilder, FactoryError, FileResourceLoader, MapperContext,
    NamedConfiguration, TypeCatalog,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

async fn memory_data_source(definition: &str) -> SqlxDataSource {
    let config = DataSourceConfig::parse(definition).unwrap();
    SqlxDataSource::connect(&config).await.unwrap()
}

#[tokio::test]
async fn test_sqlite_memory_reports_product() {
    let data_source = memory_data_source("sqlite::memory:").await;
    assert_eq!(data_source.name(), "default");
    assert_eq!(data_source.product_name().unwrap(), "SQLite");
    assert!(data_source.product_version().is_some());
    data_source.close().await;
}

#[tokio::test]
async fn test_sqlite_file_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.db");
    let data_source = memory_data_source(&format!("itest=sqlite:{}", path.display())).await;
    assert_eq!(data_source.name(), "itest");
    assert!(path.exists());
    data_source.close().await;
}

#[tokio::test]
async fn test_context_over_sqlite_data_sources() {
    let default = Arc::new(memory_data_source("sqlite::memory:").await);
    let second = Arc::new(memory_data_source("2nd=sqlite::memory:").await);

    let pool = ComponentPool::builder()
        .data_source("default", default.clone())
        .data_source("2nd", second.clone())
        .database_id_provider(Arc::new(
            VendorDatabaseIdProvider::from_pairs(["SQLite=sqlite", "MySQL=mysql"]).unwrap(),
        ))
        .build()
        .unwrap();
    let catalog = TypeCatalog::new()
        .with_type(TypeDescriptor::mapper_interface("pkg.mapper.city.CityMapper"));
    let dir = TempDir::new().unwrap();
    let builder = FactoryBuilder::new(
        Arc::new(pool),
        Arc::new(catalog),
        Arc::new(FileResourceLoader::new(dir.path())),
    );

    let configs = BTreeMap::from([
        ("default".to_string(), NamedConfiguration::default()),
        ("2nd".to_string(), NamedConfiguration::default()),
    ]);
    let context = MapperContext::build(&builder, &configs);
    assert!(context.is_healthy());

    for summary in context.summaries() {
        assert_eq!(summary.database_id.as_deref(), Some("sqlite"));
        assert_eq!(summary.product_name.as_deref(), Some("SQLite"));
        assert_eq!(summary.mappers, vec!["pkg.mapper.city.CityMapper"]);
    }

    default.close().await;
    second.close().await;
}

#[tokio::test]
async fn test_failed_connection_isolated_to_its_configuration() {
    let configs = [
        DataSourceConfig::parse("sqlite::memory:").unwrap(),
        DataSourceConfig::parse("2nd=redis://localhost/0").unwrap(),
    ];
    let data_sources = ConnectedDataSources::connect_all(&configs).await;
    assert_eq!(data_sources.connected.len(), 1);
    assert!(data_sources.failed.contains_key("2nd"));

    let pool = data_sources.register(ComponentPool::builder()).build().unwrap();
    let dir = TempDir::new().unwrap();
    let builder = FactoryBuilder::new(
        Arc::new(pool),
        Arc::new(TypeCatalog::new()),
        Arc::new(FileResourceLoader::new(dir.path())),
    );
    let named = BTreeMap::from([
        ("default".to_string(), NamedConfiguration::default()),
        ("2nd".to_string(), NamedConfiguration::default()),
    ]);
    let context = MapperContext::build(&builder, &named);

    assert!(!context.is_healthy());
    assert!(context.factory("default").is_some());
    assert!(matches!(
        context.failures().get("2nd"),
        Some(FactoryError::Connection { .. })
    ));

    data_sources.close().await;
}
