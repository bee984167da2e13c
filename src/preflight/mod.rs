//! Preflight gate for configuration steps.
//!
//! Steps that must not run on a host awaiting a reboot call
//! [`ensure_no_reboot_pending`] first. This prevents changes from being
//! applied on top of half-installed updates.
//!
//! # Example
//!
//! ```rust
//! use reboot_pending::preflight::ensure_no_reboot_pending;
//! use reboot_pending::{LiveHost, RebootPendingPredicate, RunState};
//!
//! let host = LiveHost::new();
//! let predicate = RebootPendingPredicate::new(&host);
//!
//! let mut run_state = RunState::new();
//! run_state.request_reboot();
//!
//! if let Err(e) = ensure_no_reboot_pending(&predicate, &run_state) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Context, Result};

use crate::host::HostEnvironment;
use crate::predicate::RebootPendingPredicate;
use crate::run_state::RunState;

/// Fail if a reboot is pending, or if that cannot be determined.
pub fn ensure_no_reboot_pending<H: HostEnvironment + ?Sized>(
    predicate: &RebootPendingPredicate<'_, H>,
    run_state: &RunState,
) -> Result<()> {
    let signal = predicate
        .pending_signal(run_state)
        .context("checking for a pending reboot")?;

    if let Some(signal) = signal {
        bail!(
            "Host requires a reboot before further changes can be applied:\n  {}",
            signal
        );
    }

    Ok(())
}
