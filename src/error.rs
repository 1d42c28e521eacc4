//! Error types for session factory assembly.
//!
//! This module defines all error types using `thiserror`. Every assembly failure is
//! scoped to one named configuration; the variants carry enough context (names, roots,
//! locations) to reproduce and diagnose the failure without re-running with more logging.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Mapper documents {missing:?} do not exist in any of {roots:?}")]
    UnresolvedDocuments {
        configuration: String,
        /// Requested file names that matched no search root, in declaration order
        missing: Vec<String>,
        /// Every root that was searched, in search order
        roots: Vec<String>,
    },

    #[error("No data source registered under '{lookup_name}' (configuration '{configuration}')")]
    MissingDataSource {
        configuration: String,
        lookup_name: String,
    },

    #[error("Failed to resolve database id for '{configuration}': {message}")]
    DatabaseIdResolution {
        configuration: String,
        message: String,
    },

    #[error("Malformed mapper document {location}: {message}")]
    MalformedDocument { location: String, message: String },

    #[error("Unknown type '{type_name}' in {setting}")]
    UnknownType { type_name: String, setting: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Component pool already holds a {role}")]
    DuplicateComponent { role: String },

    #[error("Mapper '{interface}' is not registered in '{configuration}'")]
    UnknownMapper {
        interface: String,
        configuration: String,
    },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FactoryError {
    /// Create an unresolved mapper document error.
    pub fn unresolved_documents(
        configuration: impl Into<String>,
        missing: Vec<String>,
        roots: Vec<String>,
    ) -> Self {
        Self::UnresolvedDocuments {
            configuration: configuration.into(),
            missing,
            roots,
        }
    }

    /// Create a missing data source error.
    pub fn missing_data_source(
        configuration: impl Into<String>,
        lookup_name: impl Into<String>,
    ) -> Self {
        Self::MissingDataSource {
            configuration: configuration.into(),
            lookup_name: lookup_name.into(),
        }
    }

    /// Create a database id resolution error.
    pub fn database_id(configuration: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatabaseIdResolution {
            configuration: configuration.into(),
            message: message.into(),
        }
    }

    /// Create a malformed document error.
    pub fn malformed_document(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>, setting: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            setting: setting.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a duplicate component error.
    pub fn duplicate_component(role: impl Into<String>) -> Self {
        Self::DuplicateComponent { role: role.into() }
    }

    /// Create an unknown mapper error.
    pub fn unknown_mapper(interface: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self::UnknownMapper {
            interface: interface.into(),
            configuration: configuration.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an I/O error for a resource location.
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::UnresolvedDocuments { .. } => {
                Some("Check mapper_xml_base_paths and mapper_xml_files against the resource root")
            }
            Self::MissingDataSource { .. } => {
                Some("Register a data source under this name or set data_source_name")
            }
            _ => None,
        }
    }

    /// Name of the configuration this error belongs to, when it carries one.
    pub fn configuration(&self) -> Option<&str> {
        match self {
            Self::UnresolvedDocuments { configuration, .. }
            | Self::MissingDataSource { configuration, .. }
            | Self::DatabaseIdResolution { configuration, .. }
            | Self::UnknownMapper { configuration, .. } => Some(configuration),
            _ => None,
        }
    }
}

/// Convert sqlx errors raised while opening data sources.
impl From<sqlx::Error> for FactoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => FactoryError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::PoolTimedOut => FactoryError::connection(
                "Timed out acquiring a connection",
                "Check that the database server is reachable",
            ),
            sqlx::Error::PoolClosed => {
                FactoryError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => FactoryError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => FactoryError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            other => FactoryError::connection(
                format!("Database error: {}", other),
                "Check the data source configuration",
            ),
        }
    }
}

/// Convert configuration binding errors.
impl From<figment::Error> for FactoryError {
    fn from(err: figment::Error) -> Self {
        FactoryError::invalid_configuration(err.to_string())
    }
}

/// Result type alias for assembly operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
