//! Mapper registry and mapped statements.

use crate::error::{FactoryError, FactoryResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Kind of SQL command a statement issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// A statement parsed from a mapper document, with its type references resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedStatement {
    /// `namespace.id`
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    pub parameter_type: Option<String>,
    pub result_type: Option<String>,
    /// Name of the language driver that parses `sql`
    pub lang: String,
    pub cache: Option<String>,
    pub database_id: Option<String>,
    /// Document the statement came from
    pub resource: String,
}

/// Mapper interfaces and statements attached to one session factory.
#[derive(Debug, Clone, Default)]
pub struct MapperRegistry {
    mappers: BTreeSet<String>,
    statements: BTreeMap<String, MappedStatement>,
    loaded_resources: BTreeSet<String>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper interface; returns false if it was already registered.
    pub fn add_mapper(&mut self, interface: impl Into<String>) -> bool {
        self.mappers.insert(interface.into())
    }

    pub fn has_mapper(&self, interface: &str) -> bool {
        self.mappers.contains(interface)
    }

    pub fn mappers(&self) -> impl Iterator<Item = &str> {
        self.mappers.iter().map(String::as_str)
    }

    pub fn mapper_count(&self) -> usize {
        self.mappers.len()
    }

    pub fn add_statement(&mut self, statement: MappedStatement) -> FactoryResult<()> {
        if self.statements.contains_key(&statement.id) {
            return Err(FactoryError::malformed_document(
                statement.resource.clone(),
                format!("Statement '{}' is already defined", statement.id),
            ));
        }
        self.statements.insert(statement.id.clone(), statement);
        Ok(())
    }

    pub fn statement(&self, id: &str) -> Option<&MappedStatement> {
        self.statements.get(id)
    }

    pub fn statements(&self) -> impl Iterator<Item = &MappedStatement> {
        self.statements.values()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Statements whose id lives in `namespace`.
    pub fn statements_for<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a MappedStatement> {
        self.statements.values().filter(move |s| {
            s.id
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with('.') && !rest[1..].contains('.'))
        })
    }

    pub fn is_resource_loaded(&self, resource: &str) -> bool {
        self.loaded_resources.contains(resource)
    }

    /// Mark a document location as loaded; returns false if it already was.
    pub fn mark_resource_loaded(&mut self, resource: impl Into<String>) -> bool {
        self.loaded_resources.insert(resource.into())
    }
}
