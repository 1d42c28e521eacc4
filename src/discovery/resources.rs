//! Resource loading for mapper documents.

use crate::error::{FactoryError, FactoryResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of a resolved resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation(PathBuf);

impl ResourceLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Probes and reads resources relative to a root.
pub trait ResourceLoader: Send + Sync {
    /// A loader rooted at `base` below this loader's root.
    fn for_base(&self, base: &str) -> Box<dyn ResourceLoader>;

    /// Location of `name` if it exists under this loader's root.
    fn get_resource(&self, name: &str) -> Option<ResourceLocation>;

    /// Read a resource as UTF-8 text.
    fn read(&self, location: &ResourceLocation) -> FactoryResult<String>;
}

/// Filesystem-backed loader. A leading `/` in a base path or name is relative to the root.
#[derive(Debug, Clone)]
pub struct FileResourceLoader {
    root: PathBuf,
}

impl FileResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl ResourceLoader for FileResourceLoader {
    fn for_base(&self, base: &str) -> Box<dyn ResourceLoader> {
        Box::new(Self::new(self.resolve(base)))
    }

    fn get_resource(&self, name: &str) -> Option<ResourceLocation> {
        let path = self.resolve(name);
        path.is_file().then(|| ResourceLocation::new(path))
    }

    fn read(&self, location: &ResourceLocation) -> FactoryResult<String> {
        std::fs::read_to_string(location.path())
            .map_err(|e| FactoryError::io(location.to_string(), e))
    }
}
