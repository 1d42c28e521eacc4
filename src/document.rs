//! Mapper document parsing.
//!
//! A mapper document is a TOML file holding a namespace and its statements:
//!
//! ```toml
//! namespace = "com.example.mapper.mail.MailMapper"
//! cache_ref = "mailCache"
//!
//! [[statements]]
//! id = "selectById"
//! kind = "select"
//! sql = "SELECT * FROM mail WHERE id = #{id}"
//! parameter_type = "long"
//! result_type = "mail"
//! ```
//!
//! Documents are parsed against fully assembled registries, so type references, language
//! drivers and cache references all resolve against what the assembler registered.

use crate::discovery::TypeDiscovery;
use crate::error::{FactoryError, FactoryResult};
use crate::registry::{MappedStatement, RegistrySet, StatementKind};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, trace};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapperDocument {
    pub namespace: String,
    #[serde(default)]
    pub cache_ref: Option<String>,
    #[serde(default)]
    pub statements: Vec<StatementDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatementDefinition {
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    #[serde(default)]
    pub parameter_type: Option<String>,
    #[serde(default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
}

impl MapperDocument {
    /// Parse document text; `location` is only used for error reporting.
    pub fn parse(location: &str, content: &str) -> FactoryResult<Self> {
        let document: MapperDocument = toml::from_str(content)
            .map_err(|e| FactoryError::malformed_document(location, e.message().to_string()))?;
        if document.namespace.trim().is_empty() {
            return Err(FactoryError::malformed_document(location, "namespace cannot be empty"));
        }
        if let Some(statement) = document.statements.iter().find(|s| s.id.trim().is_empty()) {
            return Err(FactoryError::malformed_document(
                location,
                format!("statement with sql '{}' has no id", statement.sql),
            ));
        }
        Ok(document)
    }
}

/// Parse a document and register its statements. A location already loaded is skipped.
///
/// Returns the number of statements registered.
pub fn load_document(
    location: &str,
    content: &str,
    registries: &mut RegistrySet,
    discovery: &dyn TypeDiscovery,
) -> FactoryResult<usize> {
    if registries.mappers.is_resource_loaded(location) {
        trace!(location, "Mapper document already loaded");
        return Ok(0);
    }

    let document = MapperDocument::parse(location, content)?;
    let binder = DocumentBinder {
        location,
        registries: &*registries,
        discovery,
    };

    let cache = document
        .cache_ref
        .as_deref()
        .map(|cache_ref| binder.cache(cache_ref))
        .transpose()?;

    // Statements for the current database id first, then the generic ones they do not shadow
    let current = registries.database_id.clone();
    let mut statements = Vec::new();
    let mut specific_ids = BTreeSet::new();
    if current.is_some() {
        for definition in document.statements.iter().filter(|s| s.database_id == current) {
            let statement = binder.statement(&document.namespace, definition, cache.clone())?;
            if !specific_ids.insert(statement.id.clone()) {
                return Err(duplicate(location, &statement.id));
            }
            statements.push(statement);
        }
    }
    let mut generic_ids = BTreeSet::new();
    for definition in document.statements.iter().filter(|s| s.database_id.is_none()) {
        let statement = binder.statement(&document.namespace, definition, cache.clone())?;
        if !generic_ids.insert(statement.id.clone()) {
            return Err(duplicate(location, &statement.id));
        }
        if specific_ids.contains(&statement.id) {
            trace!(
                location,
                statement = %statement.id,
                "Generic statement shadowed by database-specific one"
            );
            continue;
        }
        statements.push(statement);
    }

    let bound_interface = discovery
        .lookup(&document.namespace)
        .filter(|t| t.is_interface())
        .map(|t| t.name);

    let registered = statements.len();
    for statement in statements {
        registries.mappers.add_statement(statement)?;
    }
    if let Some(interface) = bound_interface {
        registries.mappers.add_mapper(interface);
    }
    registries.mappers.mark_resource_loaded(location);

    debug!(
        location,
        namespace = %document.namespace,
        statements = registered,
        skipped = document.statements.len() - registered,
        "Loaded mapper document"
    );
    Ok(registered)
}

fn duplicate(location: &str, id: &str) -> FactoryError {
    FactoryError::malformed_document(
        location,
        format!("Statement '{id}' is defined more than once"),
    )
}

struct DocumentBinder<'a> {
    location: &'a str,
    registries: &'a RegistrySet,
    discovery: &'a dyn TypeDiscovery,
}

impl DocumentBinder<'_> {
    fn cache(&self, cache_ref: &str) -> FactoryResult<String> {
        self.registries
            .cache(cache_ref)
            .map(|cache| cache.id().to_string())
            .ok_or_else(|| {
                FactoryError::malformed_document(
                    self.location,
                    format!("unknown cache_ref '{cache_ref}'"),
                )
            })
    }

    /// Resolve an alias or a fully-qualified type name.
    fn type_name(&self, reference: &str) -> FactoryResult<String> {
        if let Some(resolved) = self.registries.type_aliases.resolve_alias(reference) {
            return Ok(resolved.to_string());
        }
        self.discovery
            .lookup(reference)
            .map(|t| t.name)
            .ok_or_else(|| {
                FactoryError::malformed_document(
                    self.location,
                    format!("unknown type '{reference}'"),
                )
            })
    }

    fn lang(&self, lang: Option<&str>) -> FactoryResult<String> {
        let driver = match lang {
            Some(lang) => self.registries.languages.resolve(lang).ok_or_else(|| {
                FactoryError::malformed_document(self.location, format!("unknown lang '{lang}'"))
            })?,
            None => self.registries.languages.default_driver(),
        };
        Ok(driver.name().to_string())
    }

    fn statement(
        &self,
        namespace: &str,
        definition: &StatementDefinition,
        cache: Option<String>,
    ) -> FactoryResult<MappedStatement> {
        Ok(MappedStatement {
            id: format!("{namespace}.{}", definition.id),
            kind: definition.kind,
            sql: definition.sql.trim().to_string(),
            parameter_type: definition
                .parameter_type
                .as_deref()
                .map(|t| self.type_name(t))
                .transpose()?,
            result_type: definition
                .result_type
                .as_deref()
                .map(|t| self.type_name(t))
                .transpose()?,
            lang: self.lang(definition.lang.as_deref())?,
            cache,
            database_id: definition.database_id.clone(),
            resource: self.location.to_string(),
        })
    }
}
