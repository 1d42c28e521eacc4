//! Named configuration model.
//!
//! One `NamedConfiguration` exists per database target. The name itself is the key under
//! which the configuration was declared; it becomes the environment id of the assembled
//! session factory and the default data-source lookup name.

use crate::models::settings::{CoreSettings, deserialize_list};
use crate::models::types::ROOT_TYPE;
use serde::{Deserialize, Serialize};

/// Root searched for mapper documents when no base path is configured.
pub const DEFAULT_RESOURCE_ROOT: &str = "/";

/// Name of the primary configuration.
pub const PRIMARY_CONFIGURATION: &str = "default";

fn root_type() -> String {
    ROOT_TYPE.to_string()
}

/// Declarative inputs for one database target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedConfiguration {
    /// Mapper interfaces registered explicitly
    #[serde(default, deserialize_with = "deserialize_list")]
    pub mappers: Vec<String>,
    /// Namespaces scanned for mapper interfaces; empty scans every application namespace
    #[serde(default, deserialize_with = "deserialize_list")]
    pub mapper_packages: Vec<String>,
    /// Roots searched for mapper documents, in order
    #[serde(default, deserialize_with = "deserialize_list")]
    pub mapper_xml_base_paths: Vec<String>,
    /// Mapper documents that must resolve under one of the roots
    #[serde(default, deserialize_with = "deserialize_list")]
    pub mapper_xml_files: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub type_alias_packages: Vec<String>,
    /// Only scanned types assignable to this type get an alias
    #[serde(default = "root_type")]
    pub type_alias_super_type: String,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub type_aliases: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub type_handler_packages: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub type_handlers: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub scripting_language_drivers: Vec<String>,
    #[serde(default)]
    pub default_scripting_language_driver: Option<String>,
    /// Overrides the data-source lookup name (defaults to the configuration name)
    #[serde(default)]
    pub data_source_name: Option<String>,
    #[serde(default)]
    pub configuration: CoreSettings,
}

impl Default for NamedConfiguration {
    fn default() -> Self {
        Self {
            mappers: Vec::new(),
            mapper_packages: Vec::new(),
            mapper_xml_base_paths: Vec::new(),
            mapper_xml_files: Vec::new(),
            type_alias_packages: Vec::new(),
            type_alias_super_type: root_type(),
            type_aliases: Vec::new(),
            type_handler_packages: Vec::new(),
            type_handlers: Vec::new(),
            scripting_language_drivers: Vec::new(),
            default_scripting_language_driver: None,
            data_source_name: None,
            configuration: CoreSettings::default(),
        }
    }
}

impl NamedConfiguration {
    pub fn with_mappers<I, S>(mut self, mappers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mappers = mappers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mapper_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mapper_packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mapper_xml<I, S, J, T>(mut self, base_paths: I, files: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.mapper_xml_base_paths = base_paths.into_iter().map(Into::into).collect();
        self.mapper_xml_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_source_name(mut self, name: impl Into<String>) -> Self {
        self.data_source_name = Some(name.into());
        self
    }

    /// Name used to look up the data source in the component pool.
    pub fn data_source_lookup_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.data_source_name.as_deref().unwrap_or(name)
    }

    /// Roots searched for mapper documents, falling back to the default root.
    pub fn document_roots(&self) -> Vec<String> {
        if self.mapper_xml_base_paths.is_empty() {
            vec![DEFAULT_RESOURCE_ROOT.to_string()]
        } else {
            self.mapper_xml_base_paths.clone()
        }
    }
}

/// Validate a configuration name.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Configuration name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("Configuration name contains invalid characters: {name}"));
    }
    Ok(())
}
