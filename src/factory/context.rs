//! Publication of factories, templates and mapper proxies.
//!
//! `MapperContext` plays the part of the dependency-injection boundary: every named
//! configuration is built, and each success is published as a factory, a template and
//! one proxy per mapper interface keyed by (interface, configuration name). A failing
//! configuration is recorded and never prevents the others from being published.

use crate::error::FactoryError;
use crate::factory::{FactoryBuilder, FactorySummary, MapperProxy, SessionFactory, SessionTemplate};
use crate::models::{NamedConfiguration, PRIMARY_CONFIGURATION};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Default)]
pub struct MapperContext {
    factories: BTreeMap<String, Arc<SessionFactory>>,
    templates: BTreeMap<String, SessionTemplate>,
    mappers: BTreeMap<(String, String), MapperProxy>,
    failures: BTreeMap<String, FactoryError>,
}

impl MapperContext {
    /// Build and publish every configuration.
    pub fn build(builder: &FactoryBuilder, configs: &BTreeMap<String, NamedConfiguration>) -> Self {
        let mut context = Self::default();
        for (name, result) in builder.build_all(configs) {
            match result {
                Ok(factory) => context.publish(factory),
                Err(e) => {
                    error!(configuration = %name, error = %e, "Failed to build session factory");
                    context.failures.insert(name, e);
                }
            }
        }
        info!(
            factories = context.factories.len(),
            mappers = context.mappers.len(),
            failures = context.failures.len(),
            "Published mapper context"
        );
        context
    }

    /// Publish an already built factory.
    pub fn publish(&mut self, factory: SessionFactory) {
        let name = factory.name().to_string();
        let factory = Arc::new(factory);
        let template = SessionTemplate::new(factory.clone());

        for interface in factory.mappers() {
            // Registered mappers always resolve
            if let Ok(proxy) = template.get_mapper(interface) {
                self.mappers.insert((interface.to_string(), name.clone()), proxy);
            }
        }
        self.templates.insert(name.clone(), template);
        self.factories.insert(name, factory);
    }

    pub fn factory(&self, name: &str) -> Option<&Arc<SessionFactory>> {
        self.factories.get(name)
    }

    pub fn template(&self, name: &str) -> Option<&SessionTemplate> {
        self.templates.get(name)
    }

    /// Proxy for `interface` published by the configuration `name`.
    pub fn mapper(&self, interface: &str, name: &str) -> Option<&MapperProxy> {
        self.mappers.get(&(interface.to_string(), name.to_string()))
    }

    /// Proxy for `interface` without naming a configuration.
    ///
    /// Returns the only published instance, or the primary configuration's instance when
    /// several configurations publish the interface.
    pub fn find_mapper(&self, interface: &str) -> Option<&MapperProxy> {
        let mut candidates = self
            .mappers
            .iter()
            .filter(|((i, _), _)| i == interface)
            .map(|(_, proxy)| proxy);
        let first = candidates.next()?;
        match candidates.next() {
            None => Some(first),
            Some(_) => self.mapper(interface, PRIMARY_CONFIGURATION),
        }
    }

    /// Configurations publishing `interface`.
    pub fn mapper_configurations(&self, interface: &str) -> Vec<&str> {
        self.mappers
            .keys()
            .filter(|(i, _)| i == interface)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub fn factory_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn failures(&self) -> &BTreeMap<String, FactoryError> {
        &self.failures
    }

    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summaries(&self) -> Vec<FactorySummary> {
        self.factories.values().map(|f| f.summary()).collect()
    }
}
