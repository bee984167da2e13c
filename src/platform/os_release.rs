//! Linux host identity from `os-release`.
//!
//! Only `ID` and `ID_LIKE` are consulted. `ID_LIKE` lists the distributions
//! a system is derived from, which is what family membership is built on.

use std::fs;
use std::io;
use std::path::Path;

use super::{PlatformClassifier, PlatformFamily};

/// Locations searched, in order.
pub const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Parsed identity fields of an `os-release` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    /// Lower-case distribution id (`ID=`).
    pub id: Option<String>,
    /// Parent distributions (`ID_LIKE=`), in file order.
    pub id_like: Vec<String>,
}

impl OsRelease {
    /// Parse `os-release` contents. Unknown keys and malformed lines are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut release = OsRelease::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(raw.trim());
            match key.trim() {
                "ID" => {
                    let id = value.trim().to_ascii_lowercase();
                    release.id = (!id.is_empty()).then_some(id);
                }
                "ID_LIKE" => {
                    release.id_like = value
                        .split_whitespace()
                        .map(|id| id.to_ascii_lowercase())
                        .collect();
                }
                _ => {}
            }
        }

        release
    }

    /// Read the first `os-release` file that exists under `paths`.
    ///
    /// Returns `Ok(None)` when none exist.
    pub fn read_from(paths: &[&Path]) -> io::Result<Option<Self>> {
        for path in paths {
            match fs::read_to_string(path) {
                Ok(contents) => return Ok(Some(Self::parse(&contents))),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

impl PlatformClassifier for OsRelease {
    fn is_platform(&self, name: &str) -> bool {
        self.id.as_deref() == Some(name)
    }

    /// Family membership: the id itself, any `ID_LIKE` entry, or the
    /// known family of the id.
    fn is_platform_family(&self, family: &str) -> bool {
        let Some(id) = self.id.as_deref() else {
            return false;
        };
        id == family
            || self.id_like.iter().any(|like| like == family)
            || PlatformFamily::of_platform(id).is_some_and(|known| known.tag() == family)
    }
}

/// Strip one layer of shell-style quoting.
fn unquote(raw: &str) -> String {
    let inner = match raw.as_bytes() {
        [b'"', .., b'"'] | [b'\'', .., b'\''] => &raw[1..raw.len() - 1],
        _ => raw,
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use tempfile::TempDir;

    const UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 24.04.1 LTS"
NAME="Ubuntu"
VERSION_ID="24.04"
ID=ubuntu
ID_LIKE=debian
HOME_URL="https://www.ubuntu.com/"
"#;

    #[test]
    fn test_parse_ubuntu() {
        let release = OsRelease::parse(UBUNTU);
        assert_eq!(release.id.as_deref(), Some("ubuntu"));
        assert_eq!(release.id_like, vec!["debian".to_string()]);
        assert!(release.is_platform("ubuntu"));
        assert!(release.is_platform_family("debian"));
        assert!(!release.is_platform_family("rhel"));
        assert_eq!(release.classify(), Platform::Linux(PlatformFamily::Debian));
    }

    #[test]
    fn test_parse_quoted_multi_id_like() {
        let release = OsRelease::parse("ID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n");
        assert_eq!(release.id.as_deref(), Some("rocky"));
        assert_eq!(release.id_like, vec!["rhel", "centos", "fedora"]);
        assert!(release.is_platform_family("fedora"));
    }

    #[test]
    fn test_family_from_known_id_without_id_like() {
        // Debian itself ships no ID_LIKE
        let release = OsRelease::parse("ID=debian\n");
        assert!(release.is_platform_family("debian"));

        let release = OsRelease::parse("ID=raspbian\n");
        assert!(release.is_platform_family("debian"));
    }

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        let release = OsRelease::parse("# comment\nnot a pair\n\nID='arch'\n");
        assert_eq!(release.id.as_deref(), Some("arch"));
        assert!(release.id_like.is_empty());
    }

    #[test]
    fn test_missing_id_matches_nothing() {
        let release = OsRelease::parse("NAME=Mystery\n");
        assert!(!release.is_platform_family("debian"));
        assert!(!release.is_platform("mystery"));
    }

    #[test]
    fn test_read_from_falls_back_to_second_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("etc-os-release");
        let fallback = temp.path().join("usr-lib-os-release");
        fs::write(&fallback, "ID=alpine\n").unwrap();

        let release = OsRelease::read_from(&[missing.as_path(), fallback.as_path()])
            .unwrap()
            .unwrap();
        assert_eq!(release.id.as_deref(), Some("alpine"));
    }

    #[test]
    fn test_read_from_none_present() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("os-release");
        assert_eq!(OsRelease::read_from(&[missing.as_path()]).unwrap(), None);
    }
}
