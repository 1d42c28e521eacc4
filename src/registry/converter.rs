//! Type converter registry.

use crate::components::TypeConverter;
use crate::models::TypeDescriptor;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A converter declared by type name in configuration or found by a package scan.
#[derive(Debug, Clone)]
pub struct DeclaredConverter {
    name: String,
    handles: Vec<String>,
}

impl DeclaredConverter {
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            handles: descriptor.handles.clone(),
        }
    }
}

impl TypeConverter for DeclaredConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn handled_types(&self) -> Vec<String> {
        self.handles.clone()
    }
}

/// Converters keyed by handled type. Later registrations replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct TypeConverterRegistry {
    by_type: BTreeMap<String, Arc<dyn TypeConverter>>,
    /// Converters that declare no handled type
    unmapped: Vec<Arc<dyn TypeConverter>>,
}

impl TypeConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn TypeConverter>) {
        let handled = converter.handled_types();
        if handled.is_empty() {
            self.unmapped.push(converter);
            return;
        }
        for type_name in handled {
            self.by_type.insert(type_name, converter.clone());
        }
    }

    /// Converter registered for `type_name`.
    pub fn converter_for(&self, type_name: &str) -> Option<&Arc<dyn TypeConverter>> {
        self.by_type.get(type_name)
    }

    pub fn has_converter(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    /// Whether a converter with this name is registered, mapped or not.
    pub fn contains_converter(&self, name: &str) -> bool {
        self.by_type.values().chain(self.unmapped.iter()).any(|c| c.name() == name)
    }

    pub fn handled_types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_by_handled_type() {
        let mut registry = TypeConverterRegistry::new();
        registry.register(Arc::new(DeclaredConverter::from_descriptor(
            &TypeDescriptor::converter("pkg.CityConverter", ["pkg.City"]),
        )));
        assert_eq!(
            registry.converter_for("pkg.City").map(|c| c.name()),
            Some("pkg.CityConverter")
        );
        assert!(!registry.has_converter("pkg.Region"));
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let mut registry = TypeConverterRegistry::new();
        registry.register(Arc::new(DeclaredConverter::from_descriptor(
            &TypeDescriptor::converter("pkg.A", ["pkg.City"]),
        )));
        registry.register(Arc::new(DeclaredConverter::from_descriptor(
            &TypeDescriptor::converter("pkg.B", ["pkg.City"]),
        )));
        assert_eq!(registry.converter_for("pkg.City").map(|c| c.name()), Some("pkg.B"));
    }

    #[test]
    fn test_unmapped_converter_is_kept() {
        let mut registry = TypeConverterRegistry::new();
        let unmapped: [&str; 0] = [];
        registry.register(Arc::new(DeclaredConverter::from_descriptor(
            &TypeDescriptor::converter("pkg.Raw", unmapped),
        )));
        assert!(registry.contains_converter("pkg.Raw"));
        assert_eq!(registry.handled_types().count(), 0);
    }
}
