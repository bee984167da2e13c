//! Per-platform pending-reboot detectors.
//!
//! - [`windows`] - registry markers left by servicing and update tools
//! - [`linux`] - family-specific sentinel files
//!
//! Both detectors are stateless single-pass evaluators over the host
//! environment traits.

pub mod linux;
pub mod windows;

use std::fmt;
use std::path::PathBuf;

use crate::platform::PlatformFamily;

pub use linux::{LinuxRebootDetector, SentinelTable};
pub use windows::{WindowsCondition, WindowsRebootDetector};

/// Which signal showed a reboot to be pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebootSignal {
    /// A step of the current run asked for a reboot.
    Requested,
    /// A Windows registry marker is set.
    Windows(WindowsCondition),
    /// A Linux family's sentinel file exists.
    Sentinel {
        family: PlatformFamily,
        path: PathBuf,
    },
}

impl fmt::Display for RebootSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebootSignal::Requested => write!(f, "reboot requested earlier in this run"),
            RebootSignal::Windows(condition) => write!(f, "windows: {condition}"),
            RebootSignal::Sentinel { family, path } => {
                write!(f, "{family} family sentinel {} exists", path.display())
            }
        }
    }
}
