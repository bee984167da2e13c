//! Windows pending-reboot markers.
//!
//! Four independent registry conditions, any one of which means a reboot is
//! pending. Conditions are checked in [`WindowsCondition::ALL`] order and the
//! first satisfied one wins.

use std::fmt;

use tracing::trace;

use crate::error::RebootCheckError;
use crate::registry::{Registry, RegistryData, RegistryHive, RegistryPath};

/// Files queued for replacement at next boot.
pub const SESSION_MANAGER_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager";
pub const PENDING_FILE_RENAME_VALUE: &str = "PendingFileRenameOperations";

/// Windows Update: one dword per update id, 1 when that update needs a reboot.
pub const WINDOWS_UPDATE_REBOOT_KEY: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\WindowsUpdate\Auto Update\RebootRequired";

/// Component Based Servicing: the key's presence is the signal.
pub const CBS_REBOOT_KEY: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Component Based Servicing\RebootRequired";

/// Update.exe based installers record pending work in a `Flags` dword.
pub const UPDATE_EXE_VOLATILE_KEY: &str = r"SOFTWARE\Microsoft\Updates\UpdateExeVolatile";
pub const UPDATE_EXE_VOLATILE_FLAGS: &str = "Flags";

/// One registry condition that signals a pending reboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowsCondition {
    /// `Session Manager\PendingFileRenameOperations` exists.
    PendingFileRenameOperations,
    /// `Auto Update\RebootRequired` exists and holds a dword equal to 1.
    WindowsUpdateRebootRequired,
    /// `Component Based Servicing\RebootRequired` exists.
    ComponentBasedServicing,
    /// `UpdateExeVolatile` exists and its `Flags` dword is nonzero.
    UpdateExeVolatile,
}

impl WindowsCondition {
    pub const ALL: [WindowsCondition; 4] = [
        WindowsCondition::PendingFileRenameOperations,
        WindowsCondition::WindowsUpdateRebootRequired,
        WindowsCondition::ComponentBasedServicing,
        WindowsCondition::UpdateExeVolatile,
    ];

    /// Registry location this condition inspects.
    pub fn registry_path(self) -> RegistryPath {
        let hklm = RegistryHive::LocalMachine;
        match self {
            WindowsCondition::PendingFileRenameOperations => {
                RegistryPath::key(hklm, SESSION_MANAGER_KEY).with_value(PENDING_FILE_RENAME_VALUE)
            }
            WindowsCondition::WindowsUpdateRebootRequired => {
                RegistryPath::key(hklm, WINDOWS_UPDATE_REBOOT_KEY)
            }
            WindowsCondition::ComponentBasedServicing => RegistryPath::key(hklm, CBS_REBOOT_KEY),
            WindowsCondition::UpdateExeVolatile => RegistryPath::key(hklm, UPDATE_EXE_VOLATILE_KEY),
        }
    }

    /// Check this condition against `registry`. Missing keys and values
    /// are `Ok(false)`.
    pub fn evaluate<R: Registry + ?Sized>(self, registry: &R) -> Result<bool, RebootCheckError> {
        let path = self.registry_path();
        let satisfied = match self {
            WindowsCondition::PendingFileRenameOperations => registry.value_exists(&path)?,
            WindowsCondition::ComponentBasedServicing => registry.key_exists(&path)?,
            WindowsCondition::WindowsUpdateRebootRequired => {
                // Value names are update GUIDs; only the data matters
                registry.key_exists(&path)?
                    && registry
                        .values(&path)?
                        .iter()
                        .any(|record| record.data == RegistryData::Dword(1))
            }
            WindowsCondition::UpdateExeVolatile => {
                registry.key_exists(&path)?
                    && registry.values(&path)?.iter().any(|record| {
                        record.is_named(UPDATE_EXE_VOLATILE_FLAGS)
                            && matches!(record.data, RegistryData::Dword(flags) if flags != 0)
                    })
            }
        };
        trace!(condition = %self, path = %path, satisfied, "windows reboot condition");
        Ok(satisfied)
    }
}

impl fmt::Display for WindowsCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowsCondition::PendingFileRenameOperations => "pending file rename operations",
            WindowsCondition::WindowsUpdateRebootRequired => "windows update reboot required",
            WindowsCondition::ComponentBasedServicing => "component based servicing reboot required",
            WindowsCondition::UpdateExeVolatile => "update.exe volatile flags set",
        };
        f.write_str(name)
    }
}

/// Evaluates every [`WindowsCondition`] against a registry.
pub struct WindowsRebootDetector<'r, R: ?Sized> {
    registry: &'r R,
}

impl<'r, R: Registry + ?Sized> WindowsRebootDetector<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }

    /// First satisfied condition, or `None` when all are clear.
    ///
    /// Stops at the first error; a condition that cannot be read is never
    /// treated as clear.
    pub fn first_satisfied(&self) -> Result<Option<WindowsCondition>, RebootCheckError> {
        for condition in WindowsCondition::ALL {
            if condition.evaluate(self.registry)? {
                return Ok(Some(condition));
            }
        }
        Ok(None)
    }

    pub fn evaluate(&self) -> Result<bool, RebootCheckError> {
        Ok(self.first_satisfied()?.is_some())
    }
}
