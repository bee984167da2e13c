//! Live registry backend on the Win32 registry API.
//!
//! Keys are always opened in the 64-bit registry view, so a 32-bit build on
//! 64-bit Windows sees the same servicing markers as a native one instead of
//! the `Wow6432Node` mirror.
//!
//! Outcomes are decided from Win32 status codes only. Message text is
//! localized and never parsed:
//! - `ERROR_FILE_NOT_FOUND` / `ERROR_PATH_NOT_FOUND` → absent (`false`)
//! - `ERROR_ACCESS_DENIED` → [`RebootCheckError::AccessDenied`]
//! - anything else → [`RebootCheckError::RegistryQuery`]
//!
//! On other operating systems every query fails with
//! [`RebootCheckError::RegistryUnavailable`].

use tracing::trace;

use super::{Registry, RegistryData, RegistryPath, RegistryValueKind, RegistryValueRecord};
use crate::error::RebootCheckError;

/// Win32 status codes the backend tells apart.
pub mod status {
    pub const SUCCESS: u32 = 0;
    pub const FILE_NOT_FOUND: u32 = 2;
    pub const PATH_NOT_FOUND: u32 = 3;
    pub const ACCESS_DENIED: u32 = 5;
    pub const MORE_DATA: u32 = 234;
    pub const NO_MORE_ITEMS: u32 = 259;
}

/// `KEY_READ` access right.
pub const KEY_READ: u32 = 0x0002_0019;
/// Open the 64-bit view regardless of the caller's bitness.
pub const KEY_WOW64_64KEY: u32 = 0x0100;
/// Open the 32-bit view. Never requested.
pub const KEY_WOW64_32KEY: u32 = 0x0200;

/// Access mask for every key this backend opens.
pub const OPEN_ACCESS: u32 = KEY_READ | KEY_WOW64_64KEY;

/// Registry access through the Win32 API.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveRegistry;

impl Registry for LiveRegistry {
    fn key_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        let found = sys::key_exists(path)?;
        trace!(key = %path.key_path(), found, "registry key query");
        Ok(found)
    }

    fn value_exists(&self, path: &RegistryPath) -> Result<bool, RebootCheckError> {
        let found = sys::value_exists(path)?;
        trace!(value = %path, found, "registry value query");
        Ok(found)
    }

    fn values(
        &self,
        path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError> {
        let records = sys::values(path)?;
        trace!(key = %path.key_path(), count = records.len(), "registry value enumeration");
        Ok(records)
    }
}

/// Map a Win32 status code for `target` to present (`true`), absent
/// (`false`) or an error.
pub fn presence(code: u32, target: &str) -> Result<bool, RebootCheckError> {
    match code {
        status::SUCCESS => Ok(true),
        status::FILE_NOT_FOUND | status::PATH_NOT_FOUND => Ok(false),
        status::ACCESS_DENIED => Err(RebootCheckError::AccessDenied {
            target: target.to_string(),
        }),
        other => Err(RebootCheckError::RegistryQuery {
            key: target.to_string(),
            detail: format!("Win32 error {other}"),
        }),
    }
}

/// Decode raw value bytes of the given `REG_*` type code.
///
/// Returns `None` for types we do not model and for data too short for
/// its type.
pub fn decode_data(code: u32, bytes: &[u8]) -> Option<RegistryData> {
    let data = match RegistryValueKind::from_code(code)? {
        RegistryValueKind::Dword => {
            RegistryData::Dword(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?))
        }
        RegistryValueKind::Qword => {
            RegistryData::Qword(u64::from_le_bytes(bytes.get(..8)?.try_into().ok()?))
        }
        RegistryValueKind::String => RegistryData::String(wide_string(&utf16_units(bytes))),
        RegistryValueKind::ExpandString => {
            RegistryData::ExpandString(wide_string(&utf16_units(bytes)))
        }
        RegistryValueKind::MultiString => RegistryData::MultiString(
            utf16_units(bytes)
                .split(|&unit| unit == 0)
                .filter(|entry| !entry.is_empty())
                .map(String::from_utf16_lossy)
                .collect(),
        ),
        RegistryValueKind::Binary => RegistryData::Binary(bytes.to_vec()),
        RegistryValueKind::None => RegistryData::None,
    };
    Some(data)
}

/// A value name as returned by enumeration: `len` units of `buffer`, which
/// may contain any character including runs of spaces.
pub fn value_name(buffer: &[u16], len: u32) -> String {
    let len = (len as usize).min(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Stored strings usually, but not always, carry a terminator.
fn wide_string(units: &[u16]) -> String {
    let end = units.iter().position(|&unit| unit == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

#[cfg(windows)]
mod sys {
    use std::ptr;

    use tracing::trace;
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegEnumValueW, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_CLASSES_ROOT,
        HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
    };

    use super::{decode_data, presence, status, value_name, OPEN_ACCESS};
    use crate::error::RebootCheckError;
    use crate::registry::{RegistryHive, RegistryPath, RegistryValueRecord};

    /// Longest value name the registry allows, plus the terminator.
    const VALUE_NAME_CAPACITY: usize = 16_384;

    /// An open key, closed on drop.
    struct OpenKey(HKEY);

    impl Drop for OpenKey {
        fn drop(&mut self) {
            // SAFETY: the handle came from a successful RegOpenKeyExW and is closed once.
            unsafe { RegCloseKey(self.0) };
        }
    }

    fn root(hive: RegistryHive) -> HKEY {
        match hive {
            RegistryHive::LocalMachine => HKEY_LOCAL_MACHINE,
            RegistryHive::CurrentUser => HKEY_CURRENT_USER,
            RegistryHive::ClassesRoot => HKEY_CLASSES_ROOT,
            RegistryHive::Users => HKEY_USERS,
            RegistryHive::CurrentConfig => HKEY_CURRENT_CONFIG,
        }
    }

    fn wide(text: &str) -> Vec<u16> {
        text.encode_utf16().chain(Some(0)).collect()
    }

    fn open(path: &RegistryPath) -> Result<Option<OpenKey>, RebootCheckError> {
        let subkey = wide(&path.key);
        let mut handle: HKEY = ptr::null_mut();
        // SAFETY: `subkey` is NUL-terminated and outlives the call; `handle` is a valid out pointer.
        let code = unsafe {
            RegOpenKeyExW(root(path.hive), subkey.as_ptr(), 0, OPEN_ACCESS, &mut handle)
        };
        Ok(presence(code, &path.key_path())?.then(|| OpenKey(handle)))
    }

    pub(super) fn key_exists(path: &RegistryPath) -> Result<bool, RebootCheckError> {
        Ok(open(path)?.is_some())
    }

    pub(super) fn value_exists(path: &RegistryPath) -> Result<bool, RebootCheckError> {
        let Some(key) = open(path)? else {
            return Ok(false);
        };
        // The empty name addresses the default value
        let name = wide(path.value.as_deref().unwrap_or(""));
        // SAFETY: `name` is NUL-terminated; null type and data pointers only ask for existence.
        let code = unsafe {
            RegQueryValueExW(
                key.0,
                name.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        presence(code, &path.to_string())
    }

    pub(super) fn values(
        path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError> {
        let Some(key) = open(path)? else {
            return Ok(Vec::new());
        };
        let target = path.key_path();
        let mut records = Vec::new();
        let mut name = vec![0u16; VALUE_NAME_CAPACITY];
        let mut data = vec![0u8; 512];
        let mut index = 0u32;

        loop {
            let mut name_len = name.len() as u32;
            let mut data_len = data.len() as u32;
            let mut kind = 0u32;
            // SAFETY: the lengths passed describe the buffers exactly; every out pointer is valid.
            let code = unsafe {
                RegEnumValueW(
                    key.0,
                    index,
                    name.as_mut_ptr(),
                    &mut name_len,
                    ptr::null(),
                    &mut kind,
                    data.as_mut_ptr(),
                    &mut data_len,
                )
            };

            match code {
                status::NO_MORE_ITEMS => break,
                status::MORE_DATA => {
                    let needed = (data_len as usize).max(data.len() * 2);
                    data.resize(needed, 0);
                    continue;
                }
                _ => {}
            }
            if !presence(code, &target)? {
                // Key deleted mid-enumeration
                break;
            }

            let value = value_name(&name, name_len);
            let bytes = data.get(..data_len as usize).unwrap_or(&[]);
            match decode_data(kind, bytes) {
                Some(decoded) => records.push(RegistryValueRecord::new(value, decoded)),
                None => trace!(name = %value, kind, "skipping value of unmodelled type"),
            }
            index += 1;
        }

        Ok(records)
    }
}

#[cfg(not(windows))]
mod sys {
    use crate::error::RebootCheckError;
    use crate::registry::{RegistryPath, RegistryValueRecord};

    fn unavailable() -> RebootCheckError {
        RebootCheckError::RegistryUnavailable {
            reason: "the Windows registry only exists on Windows hosts".to_string(),
        }
    }

    pub(super) fn key_exists(_path: &RegistryPath) -> Result<bool, RebootCheckError> {
        Err(unavailable())
    }

    pub(super) fn value_exists(_path: &RegistryPath) -> Result<bool, RebootCheckError> {
        Err(unavailable())
    }

    pub(super) fn values(
        _path: &RegistryPath,
    ) -> Result<Vec<RegistryValueRecord>, RebootCheckError> {
        Err(unavailable())
    }
}
