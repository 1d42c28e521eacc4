//! Type alias registry.

use crate::error::{FactoryError, FactoryResult};
use crate::models::TypeDescriptor;
use std::collections::BTreeMap;

/// Aliases available before any configuration is applied.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("string", "String"),
    ("byte", "Byte"),
    ("long", "Long"),
    ("short", "Short"),
    ("int", "Integer"),
    ("integer", "Integer"),
    ("double", "Double"),
    ("float", "Float"),
    ("boolean", "Boolean"),
    ("_byte", "byte"),
    ("_long", "long"),
    ("_short", "short"),
    ("_int", "int"),
    ("_integer", "int"),
    ("_double", "double"),
    ("_float", "float"),
    ("_boolean", "boolean"),
    ("date", "Date"),
    ("decimal", "BigDecimal"),
    ("bigdecimal", "BigDecimal"),
    ("biginteger", "BigInteger"),
    ("object", "Object"),
    ("map", "Map"),
    ("hashmap", "HashMap"),
    ("list", "List"),
    ("arraylist", "ArrayList"),
    ("collection", "Collection"),
    ("iterator", "Iterator"),
];

/// Case-insensitive alias → type name mapping.
#[derive(Debug, Clone)]
pub struct TypeAliasRegistry {
    aliases: BTreeMap<String, String>,
}

impl Default for TypeAliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeAliasRegistry {
    pub fn new() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(alias, type_name)| (alias.to_string(), type_name.to_string()))
                .collect(),
        }
    }

    /// Register `alias` for `type_name`. Re-registering the same pair is a no-op;
    /// mapping an existing alias to a different type is an error.
    pub fn register_alias(&mut self, alias: &str, type_name: &str) -> FactoryResult<()> {
        let key = alias.to_lowercase();
        match self.aliases.get(&key) {
            Some(existing) if existing != type_name => {
                Err(FactoryError::invalid_configuration(format!(
                    "Alias '{alias}' is already mapped to '{existing}', \
                     cannot map it to '{type_name}'"
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.aliases.insert(key, type_name.to_string());
                Ok(())
            }
        }
    }

    /// Register a type under its declared alias or simple name.
    pub fn register_type(&mut self, descriptor: &TypeDescriptor) -> FactoryResult<()> {
        self.register_alias(descriptor.alias_name(), &descriptor.name)
    }

    /// Type registered for `alias`, if any.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(&alias.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(&alias.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }
}
