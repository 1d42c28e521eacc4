//! Core runtime settings.
//!
//! Only the knobs listed here can be bound from configuration. Components that the
//! registry assembler owns (environment, object/wrapper/reflector/proxy factories and
//! the default scripting language) have no field, so configuration cannot override
//! what the component pool provides.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Setting keys that are assembled from the component pool and never bound.
pub const EXCLUDED_SETTINGS: &[&str] = &[
    "environment",
    "proxy_factory",
    "reflector_factory",
    "object_factory",
    "object_wrapper_factory",
    "default_scripting_language",
];

/// Lazy-load trigger methods when none are configured.
pub const DEFAULT_LAZY_LOAD_TRIGGER_METHODS: &[&str] = &["equals", "clone", "hashCode", "toString"];

/// How statements are executed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorType {
    #[default]
    #[serde(alias = "SIMPLE")]
    Simple,
    #[serde(alias = "REUSE")]
    Reuse,
    #[serde(alias = "BATCH")]
    Batch,
}

/// How result columns are mapped onto fields automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoMappingBehavior {
    #[serde(alias = "NONE")]
    None,
    #[default]
    #[serde(alias = "PARTIAL")]
    Partial,
    #[serde(alias = "FULL")]
    Full,
}

/// What to do when auto-mapping meets an unknown column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownColumnBehavior {
    #[default]
    #[serde(alias = "NONE")]
    None,
    #[serde(alias = "WARNING")]
    Warning,
    #[serde(alias = "FAILING")]
    Failing,
}

/// Scope of the per-session local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalCacheScope {
    #[default]
    #[serde(alias = "SESSION")]
    Session,
    #[serde(alias = "STATEMENT")]
    Statement,
}

/// Primitive runtime knobs bound from the `configuration` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreSettings {
    pub cache_enabled: bool,
    pub lazy_loading_enabled: bool,
    pub aggressive_lazy_loading: bool,
    pub multiple_result_sets_enabled: bool,
    pub use_column_label: bool,
    pub use_generated_keys: bool,
    pub auto_mapping_behavior: AutoMappingBehavior,
    pub auto_mapping_unknown_column_behavior: UnknownColumnBehavior,
    pub default_executor_type: ExecutorType,
    /// Seconds
    pub default_statement_timeout: Option<u32>,
    pub default_fetch_size: Option<u32>,
    pub safe_row_bounds_enabled: bool,
    pub map_underscore_to_camel_case: bool,
    pub local_cache_scope: LocalCacheScope,
    pub jdbc_type_for_null: String,
    #[serde(deserialize_with = "deserialize_set")]
    pub lazy_load_trigger_methods: BTreeSet<String>,
    pub call_setters_on_nulls: bool,
    pub return_instance_for_empty_row: bool,
    pub log_prefix: Option<String>,
    pub use_actual_param_name: bool,
    /// Substitution variables available to mapper documents
    pub variables: BTreeMap<String, String>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            lazy_loading_enabled: false,
            aggressive_lazy_loading: false,
            multiple_result_sets_enabled: true,
            use_column_label: true,
            use_generated_keys: false,
            auto_mapping_behavior: AutoMappingBehavior::default(),
            auto_mapping_unknown_column_behavior: UnknownColumnBehavior::default(),
            default_executor_type: ExecutorType::default(),
            default_statement_timeout: None,
            default_fetch_size: None,
            safe_row_bounds_enabled: false,
            map_underscore_to_camel_case: false,
            local_cache_scope: LocalCacheScope::default(),
            jdbc_type_for_null: "OTHER".to_string(),
            lazy_load_trigger_methods: DEFAULT_LAZY_LOAD_TRIGGER_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            call_setters_on_nulls: false,
            return_instance_for_empty_row: false,
            log_prefix: None,
            use_actual_param_name: true,
            variables: BTreeMap::new(),
        }
    }
}

/// Accepts either an array of strings or one comma-separated string.
struct StringListVisitor;

impl<'de> Visitor<'de> for StringListVisitor {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of strings or a comma-separated string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(vec![value.to_string()])
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(vec![value.to_string()])
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<String>()? {
            values.push(value);
        }
        Ok(values)
    }
}

/// Deserialize a list-valued setting from an array or a comma-separated string.
pub(crate) fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringListVisitor)
}

fn deserialize_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_list(deserializer)?.into_iter().collect())
}
