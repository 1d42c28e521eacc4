//! Mapper resolution.
//!
//! Turns a named configuration into the set of mapper interfaces to attach and the
//! mapper documents to parse. Both functions are pure apart from the injected discovery
//! and resource capabilities, and both fail before anything is registered.

use crate::discovery::{ResourceLoader, ResourceLocation, TypeDiscovery};
use crate::error::{FactoryError, FactoryResult};
use crate::models::{NamedConfiguration, TypeDescriptor};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// A mapper document found under one of the search roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Name as declared in `mapper_xml_files`
    pub file_name: String,
    /// Root the document was found under
    pub root: String,
    pub location: ResourceLocation,
}

/// Resolve the mapper interfaces of a configuration.
///
/// Explicit entries must exist in the discovery source. Every scanned type carrying the
/// mapper marker is added; with no scan packages every application namespace is scanned.
/// The result is keyed by type name, so overlapping inputs collapse.
pub fn find_mappers(
    name: &str,
    config: &NamedConfiguration,
    discovery: &dyn TypeDiscovery,
) -> FactoryResult<Vec<TypeDescriptor>> {
    let mut found: BTreeMap<String, TypeDescriptor> = BTreeMap::new();

    for mapper in &config.mappers {
        let descriptor = discovery
            .lookup(mapper)
            .ok_or_else(|| FactoryError::unknown_type(mapper, "mappers"))?;
        found.insert(descriptor.name.clone(), descriptor);
    }

    let packages = if config.mapper_packages.is_empty() {
        discovery.packages()
    } else {
        config.mapper_packages.clone()
    };

    for package in &packages {
        for descriptor in discovery.scan(package).into_iter().filter(|t| t.mapper) {
            trace!(
                configuration = %name,
                package = %package,
                mapper = %descriptor.name,
                "Scanned mapper"
            );
            found.entry(descriptor.name.clone()).or_insert(descriptor);
        }
    }

    debug!(
        configuration = %name,
        explicit = config.mappers.len(),
        packages = packages.len(),
        resolved = found.len(),
        "Resolved mapper interfaces"
    );
    Ok(found.into_values().collect())
}

/// Resolve the mapper documents of a configuration.
///
/// Each declared file name is probed against the roots in order and the first root that
/// has it wins. Every name must resolve; otherwise the error lists exactly the names that
/// matched no root together with every root searched.
pub fn find_mapper_documents(
    name: &str,
    config: &NamedConfiguration,
    loader: &dyn ResourceLoader,
) -> FactoryResult<Vec<ResolvedDocument>> {
    if config.mapper_xml_files.is_empty() {
        return Ok(Vec::new());
    }

    let roots = config.document_roots();
    let root_loaders: Vec<_> = roots.iter().map(|root| (root, loader.for_base(root))).collect();

    let mut requested = BTreeSet::new();
    let mut resolved = Vec::new();
    let mut seen_locations = BTreeSet::new();
    let mut missing = Vec::new();

    for file_name in &config.mapper_xml_files {
        if !requested.insert(file_name.as_str()) {
            continue;
        }
        let hit = root_loaders.iter().find_map(|(root, root_loader)| {
            root_loader.get_resource(file_name).map(|loc| (*root, loc))
        });
        match hit {
            Some((root, location)) => {
                trace!(
                    configuration = %name,
                    file = %file_name,
                    root = %root,
                    "Resolved mapper document"
                );
                if seen_locations.insert(location.clone()) {
                    resolved.push(ResolvedDocument {
                        file_name: file_name.clone(),
                        root: root.clone(),
                        location,
                    });
                }
            }
            None => missing.push(file_name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(FactoryError::unresolved_documents(name, missing, roots.clone()));
    }

    debug!(configuration = %name, documents = resolved.len(), "Resolved mapper documents");
    Ok(resolved)
}
