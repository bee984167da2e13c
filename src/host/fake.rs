//! In-memory host for tests.
//!
//! Registry keys are addressed by their `HIVE\sub\key` text, values by
//! `HIVE\sub\key\Name`. Every query is recorded so tests can assert on
//! short-circuiting, and every classification is counted.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::Filesystem;
use crate::error::RebootCheckError;
use crate::platform::{self, Platform, PlatformClassifier};
use crate::registry::{Registry, RegistryPath, RegistryValueRecord};

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    platforms: HashSet<String>,
    families: HashSet<String>,
    keys: HashSet<String>,
    values: HashSet<String>,
    enumerations: HashMap<String, Vec<RegistryValueRecord>>,
    files: HashSet<PathBuf>,
    denied: HashSet<String>,
    queries: RefCell<Vec<String>>,
    classifications: Cell<usize>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn windows() -> Self {
        Self::new().family("windows")
    }

    pub(crate) fn ubuntu() -> Self {
        Self::new().platform("ubuntu").family("ubuntu")
    }

    pub(crate) fn platform(mut self, name: &str) -> Self {
        self.platforms.insert(name.to_string());
        self
    }

    pub(crate) fn family(mut self, family: &str) -> Self {
        self.families.insert(family.to_string());
        self
    }

    pub(crate) fn key(mut self, key: &str) -> Self {
        self.keys.insert(key.to_string());
        self
    }

    pub(crate) fn value(mut self, value: &str) -> Self {
        self.values.insert(value.to_string());
        self
    }

    /// Make `key` exist and enumerate to `records`.
    pub(crate) fn key_values(mut self, key: &str, records: Vec<RegistryValueRecord>) -> Self {
        self.keys.insert(key.to_string());
        self.enumerations.insert(key.to_string(), records);
        self
    }

    pub(crate) fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    /// Fail any query on `target` with access denied.
    pub(crate) fn deny(mut self, target: &str) -> Self {
        self.denied.insert(target.to_string());
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// How many times the host identity was read for classification.
    pub(crate) fn classifications(&self) -> usize {
        self.classifications.get()
    }

    fn record(&self, target: &str) -> Result<(), RebootCheckError> {
        self.queries.borrow_mut().push(target.to_string());
        if self.denied.contains(target) {
            return Err(RebootCheckError::AccessDenied {
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

impl PlatformClassifier for FakeHost {
    fn is_platform(&self, name: &str) -> bool {
        self.platforms.contains(name)
    }

    fn is_platform_family(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    fn classify(&self) -> Platform {
        self.classifications.set(self.classifications.get() + 1);
        platform::classify(self)
    }
}

impl Registry for FakeHost {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        let key = path.key_path();
        self.record(&key)?;
        Ok(self.keys.contains(&key))
    }

    fn value_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        let value = path.to_string();
        self.record(&value)?;
        Ok(self.values.contains(&value))
    }

    fn values(
        &self,
        path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError> {
        let key = path.key_path();
        self.record(&key)?;
        Ok(self.enumerations.get(&key).cloned().unwrap_or_default())
    }
}

impl Filesystem for FakeHost {
    fn file_exists(&self, path: &Path) -> Result<bool, RebootCheckError> {
        self.record(&path.display().to_string())?;
        Ok(self.files.contains(path))
    }
}
