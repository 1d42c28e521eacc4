//! Type descriptors.
//!
//! A type descriptor is what the discovery source knows about one application type:
//! its fully-qualified name, its kind, the markers relevant to assembly, and the
//! supertypes it can be assigned to.

use serde::{Deserialize, Serialize};

/// Supertype name carried by every type converter.
pub const TYPE_CONVERTER: &str = "TypeConverter";

/// Supertype name carried by every scripting language driver.
pub const LANGUAGE_DRIVER: &str = "LanguageDriver";

/// Root of the type hierarchy; every type is assignable to it.
pub const ROOT_TYPE: &str = "Object";

/// Kind of an application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Interface,
    #[default]
    Class,
    Abstract,
    Enum,
}

/// Description of one application type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified name, e.g. `com.example.mapper.CityMapper`
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Carries the "is a mapper" marker
    #[serde(default)]
    pub mapper: bool,
    /// Declared alias, overriding the simple name
    #[serde(default)]
    pub alias: Option<String>,
    /// Every type this one can be assigned to (transitive)
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Types handled by a type converter
    #[serde(default)]
    pub handles: Vec<String>,
}

impl TypeDescriptor {
    /// Create a descriptor for a plain class.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            mapper: false,
            alias: None,
            supertypes: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Create a descriptor for an interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(name)
        }
    }

    /// Create a descriptor for a mapper-marked interface.
    pub fn mapper_interface(name: impl Into<String>) -> Self {
        Self {
            mapper: true,
            ..Self::interface(name)
        }
    }

    /// Create a descriptor for a type converter handling the given types.
    pub fn converter<I, S>(name: impl Into<String>, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supertypes: vec![TYPE_CONVERTER.to_string()],
            handles: handles.into_iter().map(Into::into).collect(),
            ..Self::class(name)
        }
    }

    /// Create a descriptor for a scripting language driver.
    pub fn language_driver(name: impl Into<String>) -> Self {
        Self {
            supertypes: vec![LANGUAGE_DRIVER.to_string()],
            ..Self::class(name)
        }
    }

    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Name without its namespace.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Namespace the type lives in (empty for top-level types).
    pub fn namespace(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(namespace, _)| namespace)
            .unwrap_or("")
    }

    /// Whether the type lives in `prefix` or one of its sub-namespaces.
    pub fn in_namespace(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches('.');
        if prefix.is_empty() {
            return true;
        }
        let namespace = self.namespace();
        namespace == prefix
            || namespace
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Whether instances of this type can be created directly.
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Enum)
    }

    /// Whether this type can be assigned to `supertype`.
    pub fn is_assignable_to(&self, supertype: &str) -> bool {
        supertype == ROOT_TYPE
            || self.name == supertype
            || self.supertypes.iter().any(|s| s == supertype)
    }

    pub fn is_type_converter(&self) -> bool {
        self.is_concrete() && self.is_assignable_to(TYPE_CONVERTER)
    }

    pub fn is_language_driver(&self) -> bool {
        self.is_concrete() && self.is_assignable_to(LANGUAGE_DRIVER)
    }

    /// Alias registered for this type: the declared alias or the simple name.
    pub fn alias_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.simple_name())
    }
}
