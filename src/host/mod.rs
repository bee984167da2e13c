//! Host environment abstraction.
//!
//! The predicate needs three kinds of answers from the machine it runs on:
//! platform identity, registry lookups and file existence. Each is a trait so
//! detectors can be driven by the live machine ([`LiveHost`]) or by an
//! in-memory stand-in in tests.

#[cfg(test)]
pub(crate) mod fake;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::error::RebootCheckError;
use crate::platform::os_release::{OsRelease, OS_RELEASE_PATHS};
use crate::platform::{self, Platform, PlatformClassifier, WINDOWS_TAG};
use crate::registry::live::LiveRegistry;
use crate::registry::{Registry, RegistryPath, RegistryValueRecord};

/// Filesystem primitives supplied by the host environment.
pub trait Filesystem {
    /// Does anything exist at `path`? Missing is `Ok(false)`.
    fn file_exists(&self, path: &Path) -> Result<bool, RebootCheckError>;
}

/// Everything a reboot check reads from the host.
pub trait HostEnvironment: PlatformClassifier + Registry + Filesystem {}

impl<T: PlatformClassifier + Registry + Filesystem + ?Sized> HostEnvironment for T {}

/// One reading of the host's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostIdentity {
    Windows,
    OsRelease(OsRelease),
    /// No identity file, or one that could not be read.
    Unknown,
}

impl PlatformClassifier for HostIdentity {
    fn is_platform(&self, name: &str) -> bool {
        match self {
            HostIdentity::Windows => name == WINDOWS_TAG,
            HostIdentity::OsRelease(release) => release.is_platform(name),
            HostIdentity::Unknown => false,
        }
    }

    fn is_platform_family(&self, family: &str) -> bool {
        match self {
            HostIdentity::Windows => family == WINDOWS_TAG,
            HostIdentity::OsRelease(release) => release.is_platform_family(family),
            HostIdentity::Unknown => false,
        }
    }
}

/// The machine this process is running on.
#[derive(Debug, Clone)]
pub struct LiveHost {
    registry: LiveRegistry,
    os_release_paths: Vec<PathBuf>,
}

impl Default for LiveHost {
    fn default() -> Self {
        Self {
            registry: LiveRegistry,
            os_release_paths: OS_RELEASE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl LiveHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read Linux identity from these files instead, first existing wins.
    pub fn with_os_release_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.os_release_paths = paths;
        self
    }

    /// Read the host identity now. Never cached; the host may change
    /// between checks.
    pub fn identity(&self) -> HostIdentity {
        if cfg!(windows) {
            return HostIdentity::Windows;
        }
        let paths: Vec<&Path> = self.os_release_paths.iter().map(PathBuf::as_path).collect();
        match OsRelease::read_from(&paths) {
            Ok(Some(release)) => HostIdentity::OsRelease(release),
            Ok(None) => HostIdentity::Unknown,
            Err(e) => {
                warn!(error = %e, "cannot read os-release, platform treated as unrecognized");
                HostIdentity::Unknown
            }
        }
    }
}

impl PlatformClassifier for LiveHost {
    fn is_platform(&self, name: &str) -> bool {
        self.identity().is_platform(name)
    }

    fn is_platform_family(&self, family: &str) -> bool {
        self.identity().is_platform_family(family)
    }

    fn classify(&self) -> Platform {
        platform::classify(&self.identity())
    }
}

impl Registry for LiveHost {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        self.registry.key_exists(path)
    }

    fn value_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        self.registry.value_exists(path)
    }

    fn values(
        &self,
        path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError> {
        self.registry.values(path)
    }
}

impl Filesystem for LiveHost {
    fn file_exists(&self, path: &Path) -> Result<bool, RebootCheckError> {
        let exists = match fs::metadata(path) {
            Ok(_) => true,
            Err(e) if is_missing(&e) => false,
            Err(e) => return Err(RebootCheckError::from_io(path.display().to_string(), e)),
        };
        trace!(path = %path.display(), exists, "file existence check");
        Ok(exists)
    }
}

/// A path component that is a regular file also means "not there".
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
