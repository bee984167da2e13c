//! Optional TOML configuration.
//!
//! ```toml
//! [linux.sentinels]
//! debian = "/var/run/reboot-required"
//! rhel = "/run/reboot-required"
//! ```
//!
//! Entries under `linux.sentinels` are merged over the built-in table.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::SentinelTable;
use crate::platform::PlatformFamily;

/// File name under the user's config directory.
pub const CONFIG_RELATIVE_PATH: &str = "reboot-pending/config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedConfig {
    pub sentinels: SentinelTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    linux: LinuxToml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinuxToml {
    #[serde(default)]
    sentinels: BTreeMap<String, String>,
}

/// `<config dir>/reboot-pending/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_RELATIVE_PATH))
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    parse_config(&contents, path)
}

/// Load the default config file, falling back to built-in defaults when
/// there is none.
pub fn load_default_config() -> Result<LoadedConfig> {
    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => Ok(LoadedConfig::default()),
    }
}

fn parse_config(contents: &str, path: &Path) -> Result<LoadedConfig> {
    let parsed: ConfigToml = toml::from_str(contents)
        .with_context(|| format!("parsing config '{}'", path.display()))?;

    let mut sentinels = SentinelTable::default();
    for (tag, sentinel) in parsed.linux.sentinels {
        let family = parse_family(&tag, path)?;
        let sentinel = PathBuf::from(sentinel.trim());
        if !sentinel.is_absolute() {
            bail!(
                "invalid config '{}': sentinel for '{}' must be an absolute path, got '{}'",
                path.display(),
                tag,
                sentinel.display()
            );
        }
        sentinels.insert(family, sentinel);
    }

    Ok(LoadedConfig { sentinels })
}

fn parse_family(tag: &str, path: &Path) -> Result<PlatformFamily> {
    let normalized = tag.trim().to_ascii_lowercase();
    match PlatformFamily::from_tag(&normalized) {
        Some(family) => Ok(family),
        None => {
            let known = PlatformFamily::ALL
                .iter()
                .map(|family| family.tag())
                .collect::<Vec<_>>()
                .join(", ");
            bail!(
                "invalid config '{}': unsupported platform family '{}' (expected one of: {})",
                path.display(),
                tag,
                known
            )
        }
    }
}
