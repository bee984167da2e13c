//! Pending-reboot detection for infrastructure automation.
//!
//! Answers one question before configuration work is applied: does this
//! host currently require a reboot? Each operating system signals that
//! differently, so the check classifies the host and hands off to a
//! platform-specific detector:
//!
//! - **Run state** - a step earlier in the run explicitly asked for a reboot
//! - **Windows** - registry markers left by servicing and update tooling
//! - **Linux** - a sentinel file mapped per distribution family
//!
//! # Architecture
//!
//! ```text
//! caller (recipe, resource, preflight gate)
//!     │
//!     ▼
//! RebootPendingPredicate ── RunState (reboot_requested)
//!     │
//!     ├── platform::classify ──── PlatformClassifier
//!     │
//!     ├── WindowsRebootDetector ── Registry
//!     └── LinuxRebootDetector ──── Filesystem + SentinelTable
//! ```
//!
//! Host access goes through the [`host`] traits. [`LiveHost`] implements
//! them for the running machine; tests substitute an in-memory host.
//!
//! # Example
//!
//! ```rust,no_run
//! use reboot_pending::{LiveHost, RebootPendingPredicate, RunState};
//!
//! let host = LiveHost::new();
//! let run_state = RunState::new();
//!
//! if RebootPendingPredicate::new(&host).is_reboot_pending(&run_state)? {
//!     println!("reboot first");
//! }
//! # Ok::<(), reboot_pending::RebootCheckError>(())
//! ```

pub mod config;
pub mod detect;
pub mod dsl;
pub mod error;
pub mod host;
pub mod platform;
pub mod predicate;
pub mod preflight;
pub mod registry;
pub mod run_state;

pub use detect::{RebootSignal, SentinelTable};
pub use error::RebootCheckError;
pub use host::{HostEnvironment, HostIdentity, LiveHost};
pub use platform::{Platform, PlatformFamily};
pub use predicate::RebootPendingPredicate;
pub use run_state::RunState;
