//! Windows registry data model and access trait.
//!
//! Detectors never touch the registry directly. They go through the
//! [`Registry`] trait, which the host environment implements (see
//! [`live`] for the Win32 backend). Every method folds "does not exist"
//! into `false` / an empty list; only genuine failures are errors.

pub mod live;

use std::fmt;

use crate::error::RebootCheckError;

/// Registry root keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryHive {
    LocalMachine,
    CurrentUser,
    ClassesRoot,
    Users,
    CurrentConfig,
}

impl RegistryHive {
    /// Abbreviated form, as in `HKLM\SOFTWARE`.
    pub fn short_name(self) -> &'static str {
        match self {
            RegistryHive::LocalMachine => "HKLM",
            RegistryHive::CurrentUser => "HKCU",
            RegistryHive::ClassesRoot => "HKCR",
            RegistryHive::Users => "HKU",
            RegistryHive::CurrentConfig => "HKCC",
        }
    }
}

/// A registry key, optionally narrowed to one value under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    pub hive: RegistryHive,
    /// Subkey below the hive, backslash separated, without leading separator.
    pub key: String,
    /// Value name; `None` addresses the key itself.
    pub value: Option<String>,
}

impl RegistryPath {
    pub fn key(hive: RegistryHive, key: impl Into<String>) -> Self {
        Self {
            hive,
            key: key.into(),
            value: None,
        }
    }

    /// Address a named value under this key.
    pub fn with_value(mut self, name: impl Into<String>) -> Self {
        self.value = Some(name.into());
        self
    }

    /// The key part only, as `HIVE\sub\key`.
    pub fn key_path(&self) -> String {
        if self.key.is_empty() {
            self.hive.short_name().to_string()
        } else {
            format!("{}\\{}", self.hive.short_name(), self.key)
        }
    }
}

impl fmt::Display for RegistryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}\\{}", self.key_path(), value),
            None => f.write_str(&self.key_path()),
        }
    }
}

/// Registry value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryValueKind {
    Dword,
    Qword,
    String,
    ExpandString,
    MultiString,
    Binary,
    None,
}

impl RegistryValueKind {
    pub const ALL: [RegistryValueKind; 7] = [
        RegistryValueKind::Dword,
        RegistryValueKind::Qword,
        RegistryValueKind::String,
        RegistryValueKind::ExpandString,
        RegistryValueKind::MultiString,
        RegistryValueKind::Binary,
        RegistryValueKind::None,
    ];

    /// Look up a kind by the type code the registry API reports.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// The Win32 `REG_*` type code.
    pub fn code(self) -> u32 {
        match self {
            RegistryValueKind::None => 0,
            RegistryValueKind::String => 1,
            RegistryValueKind::ExpandString => 2,
            RegistryValueKind::Binary => 3,
            RegistryValueKind::Dword => 4,
            RegistryValueKind::MultiString => 7,
            RegistryValueKind::Qword => 11,
        }
    }
}

/// Typed value data. The variant is the value's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryData {
    Dword(u32),
    Qword(u64),
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
    None,
}

impl RegistryData {
    pub fn kind(&self) -> RegistryValueKind {
        match self {
            RegistryData::Dword(_) => RegistryValueKind::Dword,
            RegistryData::Qword(_) => RegistryValueKind::Qword,
            RegistryData::String(_) => RegistryValueKind::String,
            RegistryData::ExpandString(_) => RegistryValueKind::ExpandString,
            RegistryData::MultiString(_) => RegistryValueKind::MultiString,
            RegistryData::Binary(_) => RegistryValueKind::Binary,
            RegistryData::None => RegistryValueKind::None,
        }
    }
}

/// One entry returned by value enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValueRecord {
    pub name: String,
    pub data: RegistryData,
}

impl RegistryValueRecord {
    pub fn new(name: impl Into<String>, data: RegistryData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn kind(&self) -> RegistryValueKind {
        self.data.kind()
    }

    /// Registry value names compare case-insensitively.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Registry access primitives supplied by the host environment.
pub trait Registry {
    /// Does the key at `path` exist? The value name, if any, is ignored.
    fn key_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError>;

    /// Does the value named by `path` exist? A path without a value name
    /// addresses the key's default value.
    fn value_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError>;

    /// Values directly under the key, in registry order. A missing key
    /// yields an empty list.
    fn values(
        &self,
        path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError>;
}
