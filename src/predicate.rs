//! The pending-reboot predicate.
//!
//! Evaluation order:
//! 1. An explicit request in the run state wins on any platform
//! 2. Classify the platform (once per call, never cached)
//! 3. Windows: registry markers
//! 4. Linux family with a sentinel mapped: the sentinel file
//! 5. Anything else: not pending
//!
//! The predicate only reads. Calling it twice against unchanged host state
//! gives the same answer.

use tracing::debug;

use crate::detect::{LinuxRebootDetector, RebootSignal, SentinelTable, WindowsRebootDetector};
use crate::error::RebootCheckError;
use crate::host::HostEnvironment;
use crate::platform::Platform;
use crate::run_state::RunState;

/// Answers "does this host need a reboot before more changes are applied?".
pub struct RebootPendingPredicate<'h, H: ?Sized> {
    host: &'h H,
    sentinels: SentinelTable,
}

impl<'h, H: HostEnvironment + ?Sized> RebootPendingPredicate<'h, H> {
    /// Predicate using the built-in sentinel table.
    pub fn new(host: &'h H) -> Self {
        Self::with_sentinels(host, SentinelTable::default())
    }

    pub fn with_sentinels(host: &'h H, sentinels: SentinelTable) -> Self {
        Self { host, sentinels }
    }

    pub fn sentinels(&self) -> &SentinelTable {
        &self.sentinels
    }

    /// Classify the host as this predicate would: one identity read.
    pub fn platform(&self) -> Platform {
        self.host.classify()
    }

    /// The first signal showing a reboot is pending, if any.
    ///
    /// # Errors
    ///
    /// Propagates any [`RebootCheckError`] from the host primitives; an
    /// unreadable marker is never reported as "not pending".
    pub fn pending_signal(
        &self,
        run_state: &RunState,
    ) -> Result<Option<RebootSignal>, RebootCheckError> {
        if run_state.reboot_requested() {
            debug!("reboot explicitly requested in run state");
            return Ok(Some(RebootSignal::Requested));
        }

        let platform = self.platform();
        debug!(%platform, "checking for pending reboot");

        let signal = match platform {
            Platform::Windows => WindowsRebootDetector::new(self.host)
                .first_satisfied()?
                .map(RebootSignal::Windows),
            Platform::Linux(family) => match self.sentinels.get(family) {
                Some(sentinel) => LinuxRebootDetector::new(self.host)
                    .evaluate(sentinel)?
                    .then(|| RebootSignal::Sentinel {
                        family,
                        path: sentinel.to_path_buf(),
                    }),
                None => {
                    debug!(%family, "no sentinel mapped for family");
                    None
                }
            },
            Platform::Unrecognized => None,
        };

        debug!(pending = signal.is_some(), "pending reboot check finished");
        Ok(signal)
    }

    /// Whether a reboot is pending.
    ///
    /// # Errors
    ///
    /// See [`Self::pending_signal`].
    pub fn is_reboot_pending(&self, run_state: &RunState) -> Result<bool, RebootCheckError> {
        Ok(self.pending_signal(run_state)?.is_some())
    }
}
