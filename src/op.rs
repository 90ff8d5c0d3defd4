//! Operations: transfers started and queried as one unit.
//!
//! An [`Operation`] holds exclusive borrows of its member transfers, never
//! the transfers themselves. Removing or clearing members ends the borrow and
//! leaves the transfers with their owner.
//!
//! [`Operation::all_completed`] and [`Operation::has_error`] are independent
//! queries. Check both to tell "still running" apart from "finished with a
//! partial failure".

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

use crate::driver::engine::{DmaEngine, DmaStatus};
use crate::driver::error::{DmaError, DmaResult, IoError, IoResult, Result};
use crate::internal::constants::{DEFAULT_COMPLETION_TIMEOUT_US, DEFAULT_POLL_INTERVAL_US};
use crate::internal::fmt::dma_warn;
use crate::xfer::Transfer;

/// Ordered set of transfers
///
/// # Example
///
/// ```ignore
/// let mut op = Operation::new();
/// op.add(&mut header_xfer)?;
/// op.add(&mut payload_xfer)?;
///
/// op.start()?;
/// op.wait(&mut delay, 10_000)?;
/// ```
pub struct Operation<'t, 'a, E: DmaEngine> {
    xfers: Vec<&'t mut Transfer<'a, E>>,
}

impl<'t, 'a, E: DmaEngine> Operation<'t, 'a, E> {
    /// Create an empty operation
    #[must_use]
    pub const fn new() -> Self {
        Self { xfers: Vec::new() }
    }

    /// Append a transfer
    pub fn add(&mut self, xfer: &'t mut Transfer<'a, E>) -> DmaResult<()> {
        self.xfers.try_reserve(1).map_err(|_| DmaError::AllocFailed)?;
        self.xfers.push(xfer);
        Ok(())
    }

    /// Remove the transfer at `index`, handing its borrow back
    pub fn remove(&mut self, index: usize) -> Option<&'t mut Transfer<'a, E>> {
        if index < self.xfers.len() {
            Some(self.xfers.remove(index))
        } else {
            None
        }
    }

    /// Remove every transfer
    pub fn clear(&mut self) {
        self.xfers.clear();
    }

    /// Number of transfers
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.xfers.len()
    }

    /// Check if the operation has no transfers
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.xfers.is_empty()
    }

    /// Transfer at `index`
    pub fn get(&self, index: usize) -> Option<&Transfer<'a, E>> {
        self.xfers.get(index).map(|x| &**x)
    }

    /// Transfer at `index`, mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Transfer<'a, E>> {
        self.xfers.get_mut(index).map(|x| &mut **x)
    }

    /// Iterate over the transfers in order
    pub fn iter(&self) -> impl Iterator<Item = &Transfer<'a, E>> {
        self.xfers.iter().map(|x| &**x)
    }

    /// Start every transfer in order
    ///
    /// Stops at the first transfer that fails to start and returns its error.
    /// Transfers already started keep running; later ones are left untouched.
    pub fn start(&mut self) -> Result<()> {
        for (index, xfer) in self.xfers.iter_mut().enumerate() {
            if let Err(e) = xfer.start() {
                dma_warn!(
                    "{}: operation halted at transfer {}: {}",
                    xfer.engine().device_name(),
                    index,
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Every transfer reports completion
    ///
    /// False for an empty operation and while any transfer is unsubmitted,
    /// in progress or failed.
    pub fn all_completed(&self) -> bool {
        !self.xfers.is_empty()
            && self
                .xfers
                .iter()
                .all(|x| x.status() == Ok(DmaStatus::Complete))
    }

    /// At least one transfer reports an error
    pub fn has_error(&self) -> bool {
        self.xfers
            .iter()
            .any(|x| x.status() == Ok(DmaStatus::Error))
    }

    /// Poll until every transfer completes
    ///
    /// Queries status every [`DEFAULT_POLL_INTERVAL_US`] microseconds. Returns
    /// [`IoError::TransferFailed`] as soon as any transfer reports an error,
    /// or [`IoError::Timeout`] once `timeout_us` has elapsed. Nothing is
    /// cancelled on timeout.
    ///
    /// [`DEFAULT_POLL_INTERVAL_US`]: crate::constants::DEFAULT_POLL_INTERVAL_US
    pub fn wait<D: DelayNs>(&self, delay: &mut D, timeout_us: u32) -> IoResult<()> {
        let mut elapsed = 0u32;
        loop {
            if self.has_error() {
                return Err(IoError::TransferFailed);
            }
            if self.all_completed() {
                return Ok(());
            }
            if elapsed >= timeout_us {
                return Err(IoError::Timeout);
            }
            delay.delay_us(DEFAULT_POLL_INTERVAL_US);
            elapsed = elapsed.saturating_add(DEFAULT_POLL_INTERVAL_US);
        }
    }

    /// [`wait`](Self::wait) with [`DEFAULT_COMPLETION_TIMEOUT_US`]
    ///
    /// [`DEFAULT_COMPLETION_TIMEOUT_US`]: crate::constants::DEFAULT_COMPLETION_TIMEOUT_US
    pub fn wait_default<D: DelayNs>(&self, delay: &mut D) -> IoResult<()> {
        self.wait(delay, DEFAULT_COMPLETION_TIMEOUT_US)
    }
}

impl<E: DmaEngine> Default for Operation<'_, '_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DmaEngine> core::fmt::Debug for Operation<'_, '_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
