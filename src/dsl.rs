//! The reboot query as seen from automation code.
//!
//! Recipes and resources both carry a run context. Implementing
//! [`RebootPending`] for them exposes `is_reboot_pending()` with no
//! arguments, so script logic and resource evaluation ask the same question
//! the same way.
//!
//! # Example
//!
//! ```rust
//! use reboot_pending::dsl::RebootPending;
//! use reboot_pending::{LiveHost, RunState};
//!
//! struct Recipe {
//!     host: LiveHost,
//!     run_state: RunState,
//! }
//!
//! impl RebootPending for Recipe {
//!     type Host = LiveHost;
//!
//!     fn host(&self) -> &LiveHost {
//!         &self.host
//!     }
//!
//!     fn run_state(&self) -> &RunState {
//!         &self.run_state
//!     }
//! }
//!
//! let mut recipe = Recipe { host: LiveHost::new(), run_state: RunState::new() };
//! recipe.run_state.request_reboot();
//! assert!(recipe.is_reboot_pending().unwrap());
//! ```

use crate::detect::{RebootSignal, SentinelTable};
use crate::error::RebootCheckError;
use crate::host::HostEnvironment;
use crate::predicate::RebootPendingPredicate;
use crate::run_state::RunState;

/// Anything evaluated inside a run context can ask whether a reboot is pending.
pub trait RebootPending {
    type Host: HostEnvironment + ?Sized;

    fn host(&self) -> &Self::Host;

    fn run_state(&self) -> &RunState;

    /// Sentinel files to consult on Linux.
    fn sentinels(&self) -> SentinelTable {
        SentinelTable::default()
    }

    /// # Errors
    ///
    /// Fails when host state needed for the answer cannot be read.
    fn reboot_signal(&self) -> Result<Option<RebootSignal>, RebootCheckError> {
        RebootPendingPredicate::with_sentinels(self.host(), self.sentinels())
            .pending_signal(self.run_state())
    }

    /// # Errors
    ///
    /// Fails when host state needed for the answer cannot be read.
    fn is_reboot_pending(&self) -> Result<bool, RebootCheckError> {
        Ok(self.reboot_signal()?.is_some())
    }
}
