//! Host platform classification.
//!
//! The host environment answers two yes/no questions ("is this platform X?",
//! "is this platform family F?") through [`PlatformClassifier`]. [`classify`]
//! turns those answers into a closed [`Platform`] value exactly once per
//! reboot check, so each platform's detector is chosen explicitly rather than
//! discovered by probing.
//!
//! A classification asks many questions. Hosts whose identity comes from a
//! file override [`PlatformClassifier::classify`] to read it once and answer
//! every question from that snapshot.
//!
//! New Linux families are added as [`PlatformFamily`] variants, never by
//! matching free-form strings at call sites.

pub mod os_release;

use std::fmt;

/// Platform queries supplied by the host environment.
pub trait PlatformClassifier {
    /// Is the host exactly this platform (e.g. `"ubuntu"`, `"windows"`)?
    fn is_platform(&self, name: &str) -> bool;

    /// Does the host belong to this platform family (e.g. `"debian"`)?
    fn is_platform_family(&self, family: &str) -> bool;

    /// Classify the host from a single view of its identity.
    fn classify(&self) -> Platform {
        classify(self)
    }
}

/// Tag used for Windows by both platform and family queries.
pub const WINDOWS_TAG: &str = "windows";

/// Closed classification of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Any Windows release.
    Windows,
    /// A Linux distribution belonging to a known family.
    Linux(PlatformFamily),
    /// Anything this crate cannot reason about.
    Unrecognized,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Windows => write!(f, "windows"),
            Platform::Linux(family) => write!(f, "linux ({family} family)"),
            Platform::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Linux distribution families.
///
/// Order matters: [`classify`] picks the first family that matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformFamily {
    Debian,
    Rhel,
    Fedora,
    Suse,
    Arch,
    Alpine,
    Gentoo,
}

impl PlatformFamily {
    /// Every family, in classification order.
    pub const ALL: [PlatformFamily; 7] = [
        PlatformFamily::Debian,
        PlatformFamily::Rhel,
        PlatformFamily::Fedora,
        PlatformFamily::Suse,
        PlatformFamily::Arch,
        PlatformFamily::Alpine,
        PlatformFamily::Gentoo,
    ];

    /// Family tag as reported by `platform_family` queries.
    pub fn tag(self) -> &'static str {
        match self {
            PlatformFamily::Debian => "debian",
            PlatformFamily::Rhel => "rhel",
            PlatformFamily::Fedora => "fedora",
            PlatformFamily::Suse => "suse",
            PlatformFamily::Arch => "arch",
            PlatformFamily::Alpine => "alpine",
            PlatformFamily::Gentoo => "gentoo",
        }
    }

    /// Platforms known to belong to this family.
    pub fn member_platforms(self) -> &'static [&'static str] {
        match self {
            PlatformFamily::Debian => &["debian", "ubuntu", "linuxmint", "raspbian", "pop"],
            PlatformFamily::Rhel => &["rhel", "centos", "rocky", "almalinux", "oracle"],
            PlatformFamily::Fedora => &["fedora"],
            PlatformFamily::Suse => &["opensuse", "opensuse-leap", "opensuse-tumbleweed", "sles"],
            PlatformFamily::Arch => &["arch", "manjaro", "endeavouros"],
            PlatformFamily::Alpine => &["alpine"],
            PlatformFamily::Gentoo => &["gentoo"],
        }
    }

    /// Look up a family by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.tag() == tag)
    }

    /// Look up the family a platform name belongs to.
    pub fn of_platform(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.member_platforms().contains(&name))
    }

    /// Whether the classifier places the host in this family.
    ///
    /// Member platforms are asked both as platforms and as families, since
    /// some hosts report e.g. `ubuntu` as their own family.
    pub fn matches(self, classifier: &(impl PlatformClassifier + ?Sized)) -> bool {
        classifier.is_platform_family(self.tag())
            || self
                .member_platforms()
                .iter()
                .any(|name| classifier.is_platform(name) || classifier.is_platform_family(name))
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Classify from the classifier's answers.
///
/// Not cached: every call asks again.
pub fn classify(classifier: &(impl PlatformClassifier + ?Sized)) -> Platform {
    if classifier.is_platform(WINDOWS_TAG) || classifier.is_platform_family(WINDOWS_TAG) {
        return Platform::Windows;
    }

    PlatformFamily::ALL
        .into_iter()
        .find(|family| family.matches(classifier))
        .map_or(Platform::Unrecognized, Platform::Linux)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classifier answering from fixed platform and family lists.
    struct Fixed {
        platforms: &'static [&'static str],
        families: &'static [&'static str],
    }

    impl PlatformClassifier for Fixed {
        fn is_platform(&self, name: &str) -> bool {
            self.platforms.contains(&name)
        }

        fn is_platform_family(&self, family: &str) -> bool {
            self.families.contains(&family)
        }
    }

    #[test]
    fn test_classify_windows_by_family() {
        let host = Fixed {
            platforms: &[],
            families: &["windows"],
        };
        assert_eq!(classify(&host), Platform::Windows);
    }

    #[test]
    fn test_classify_ubuntu_as_debian_family() {
        // Hosts that only affirm "ubuntu" still land in the Debian family
        let host = Fixed {
            platforms: &["ubuntu"],
            families: &["ubuntu"],
        };
        assert_eq!(classify(&host), Platform::Linux(PlatformFamily::Debian));
    }

    #[test]
    fn test_classify_by_family_tag() {
        let host = Fixed {
            platforms: &["rocky"],
            families: &["rhel"],
        };
        assert_eq!(classify(&host), Platform::Linux(PlatformFamily::Rhel));
    }

    #[test]
    fn test_classify_unknown_is_unrecognized() {
        let host = Fixed {
            platforms: &["freebsd"],
            families: &["freebsd"],
        };
        assert_eq!(classify(&host), Platform::Unrecognized);
    }

    #[test]
    fn test_classify_method_defaults_to_queries() {
        let host = Fixed {
            platforms: &["manjaro"],
            families: &[],
        };
        assert_eq!(host.classify(), Platform::Linux(PlatformFamily::Arch));
    }

    #[test]
    fn test_family_tag_lookup() {
        for family in PlatformFamily::ALL {
            assert_eq!(PlatformFamily::from_tag(family.tag()), Some(family));
        }
        assert_eq!(PlatformFamily::from_tag("windows"), None);
        assert_eq!(
            PlatformFamily::of_platform("linuxmint"),
            Some(PlatformFamily::Debian)
        );
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(
            Platform::Linux(PlatformFamily::Debian).to_string(),
            "linux (debian family)"
        );
        assert_eq!(Platform::Windows.to_string(), "windows");
    }
}
