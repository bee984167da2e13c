//! Linux pending-reboot markers.
//!
//! Distributions that signal a pending reboot do it with a sentinel file
//! whose presence is the whole message. Which file depends on the family, so
//! the mapping lives in a [`SentinelTable`]; families without an entry are
//! not checked at all.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::RebootCheckError;
use crate::host::Filesystem;
use crate::platform::PlatformFamily;

/// Written by `update-notifier-common` after package upgrades.
pub const DEBIAN_REBOOT_REQUIRED: &str = "/var/run/reboot-required";

/// Family to sentinel path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelTable {
    paths: BTreeMap<PlatformFamily, PathBuf>,
}

impl SentinelTable {
    /// A table with no families mapped.
    pub fn empty() -> Self {
        Self {
            paths: BTreeMap::new(),
        }
    }

    /// Map `family` to `path`, replacing any previous entry.
    pub fn insert(&mut self, family: PlatformFamily, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.paths.insert(family, path.into())
    }

    pub fn with(mut self, family: PlatformFamily, path: impl Into<PathBuf>) -> Self {
        self.insert(family, path);
        self
    }

    pub fn get(&self, family: PlatformFamily) -> Option<&Path> {
        self.paths.get(&family).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlatformFamily, &Path)> {
        self.paths.iter().map(|(family, path)| (*family, path.as_path()))
    }
}

impl Default for SentinelTable {
    fn default() -> Self {
        Self::empty().with(PlatformFamily::Debian, DEBIAN_REBOOT_REQUIRED)
    }
}

/// Checks a family's sentinel file.
pub struct LinuxRebootDetector<'f, F: ?Sized> {
    fs: &'f F,
}

impl<'f, F: Filesystem + ?Sized> LinuxRebootDetector<'f, F> {
    pub fn new(fs: &'f F) -> Self {
        Self { fs }
    }

    /// True iff something exists at `sentinel`.
    pub fn evaluate(&self, sentinel: &Path) -> Result<bool, RebootCheckError> {
        let present = self.fs.file_exists(sentinel)?;
        trace!(sentinel = %sentinel.display(), present, "linux reboot sentinel");
        Ok(present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::host::LiveHost;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_table_maps_debian_only() {
        let table = SentinelTable::default();
        assert_eq!(
            table.get(PlatformFamily::Debian),
            Some(Path::new(DEBIAN_REBOOT_REQUIRED))
        );
        assert_eq!(table.get(PlatformFamily::Rhel), None);
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut table = SentinelTable::default();
        let previous = table.insert(PlatformFamily::Debian, "/run/reboot-required");
        assert_eq!(previous, Some(PathBuf::from(DEBIAN_REBOOT_REQUIRED)));
        assert_eq!(
            table.get(PlatformFamily::Debian),
            Some(Path::new("/run/reboot-required"))
        );
    }

    #[test]
    fn test_evaluate_with_fake_fs() {
        let present = FakeHost::ubuntu().file(DEBIAN_REBOOT_REQUIRED);
        let absent = FakeHost::ubuntu();
        let sentinel = Path::new(DEBIAN_REBOOT_REQUIRED);

        assert!(LinuxRebootDetector::new(&present).evaluate(sentinel).unwrap());
        assert!(!LinuxRebootDetector::new(&absent).evaluate(sentinel).unwrap());
    }

    #[test]
    fn test_evaluate_with_real_fs() {
        let temp = TempDir::new().unwrap();
        let sentinel = temp.path().join("reboot-required");
        let host = LiveHost::new();
        let detector = LinuxRebootDetector::new(&host);

        assert!(!detector.evaluate(&sentinel).unwrap());
        fs::write(&sentinel, "").unwrap();
        assert!(detector.evaluate(&sentinel).unwrap());
    }

    #[test]
    fn test_evaluate_propagates_denied() {
        let host = FakeHost::ubuntu().deny(DEBIAN_REBOOT_REQUIRED);
        let err = LinuxRebootDetector::new(&host)
            .evaluate(Path::new(DEBIAN_REBOOT_REQUIRED))
            .unwrap_err();
        assert!(matches!(err, RebootCheckError::AccessDenied { .. }));
    }
}
