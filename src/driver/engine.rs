//! DMA engine collaborator contract.
//!
//! The transfer layer never touches hardware registers. Everything it needs
//! from the controller driver goes through [`DmaEngine`]: slave configuration,
//! descriptor preparation for the three transfer modes, submission, status
//! queries and mapping of scatter-gather tables into the device address space.
//!
//! Methods take `&self`. An engine is a shared channel handle; several
//! transfers hold a reference to the same engine and implementations keep
//! their mutable bookkeeping behind interior mutability (a critical section
//! on bare metal).

use crate::driver::config::{DataDirection, DmaAddr, PrepFlags, SlaveConfig, TransferDirection};
use crate::driver::error::DmaResult;
use crate::sg::{SgAddr, SgEntry};
use crate::xfer::Notifier;

/// Completion token returned by [`DmaEngine::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cookie(pub i32);

impl Cookie {
    /// Raw cookie value
    #[inline(always)]
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

/// Completion state of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaStatus {
    /// Engine is still working on the transaction
    InProgress,
    /// Transaction finished successfully
    Complete,
    /// Engine reported an error
    Error,
}

/// Parameters for a cyclic (ring buffer) transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclicInfo {
    /// Bus address of the ring
    pub dma_addr: DmaAddr,
    /// Total ring length in bytes
    pub len: usize,
    /// Length of one period in bytes (a completion fires per period)
    pub period_len: usize,
}

impl CyclicInfo {
    /// Create cyclic parameters
    #[must_use]
    pub const fn new(dma_addr: DmaAddr, len: usize, period_len: usize) -> Self {
        Self {
            dma_addr,
            len,
            period_len,
        }
    }

    /// Number of periods in the ring
    #[must_use]
    pub const fn periods(&self) -> usize {
        if self.period_len == 0 {
            0
        } else {
            self.len / self.period_len
        }
    }
}

/// Parameters for a flat memory-to-memory copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemcpyInfo {
    /// Destination bus address
    pub dst: DmaAddr,
    /// Source bus address
    pub src: DmaAddr,
    /// Number of bytes to copy
    pub len: usize,
}

impl MemcpyInfo {
    /// Create copy parameters
    #[must_use]
    pub const fn new(dst: DmaAddr, src: DmaAddr, len: usize) -> Self {
        Self { dst, src, len }
    }
}

/// Hardware DMA engine channel
///
/// Descriptor preparation entry points return `None` when the engine cannot
/// produce a descriptor; the transfer layer reports that as
/// [`DmaError::DescriptorPrepFailed`](crate::DmaError::DescriptorPrepFailed).
pub trait DmaEngine {
    /// Opaque hardware descriptor
    type Descriptor;

    /// Apply slave parameters to the channel
    fn slave_config(&self, config: &SlaveConfig) -> DmaResult<()>;

    /// Prepare a descriptor over a mapped scatter-gather table
    fn prep_slave_sg(
        &self,
        entries: &[SgEntry],
        direction: TransferDirection,
        flags: PrepFlags,
    ) -> Option<Self::Descriptor>;

    /// Prepare a repeating descriptor over a fixed ring
    fn prep_cyclic(
        &self,
        info: &CyclicInfo,
        direction: TransferDirection,
        flags: PrepFlags,
    ) -> Option<Self::Descriptor>;

    /// Prepare a flat copy descriptor
    fn prep_memcpy(&self, info: &MemcpyInfo, flags: PrepFlags) -> Option<Self::Descriptor>;

    /// Attach a completion notifier to a prepared descriptor
    ///
    /// The engine calls [`Notifier::notify`] from its completion context.
    fn attach_completion(&self, desc: &mut Self::Descriptor, notifier: Notifier);

    /// Hand a descriptor to the engine, returning its completion token
    fn submit(&self, desc: Self::Descriptor) -> DmaResult<Cookie>;

    /// Start processing submitted descriptors
    fn issue_pending(&self);

    /// Non-blocking completion query
    fn status(&self, cookie: Cookie) -> DmaStatus;

    /// Map table entries into the device address space
    ///
    /// Fills in each entry's bus address and returns how many entries were
    /// mapped. Anything short of `entries.len()` is a mapping failure.
    fn map_sg(&self, entries: &mut [SgEntry], direction: DataDirection) -> usize;

    /// Reverse a previous [`map_sg`](Self::map_sg) in the same direction
    fn unmap_sg(&self, entries: &mut [SgEntry], direction: DataDirection);

    /// Device name used as log context
    fn device_name(&self) -> &str {
        "dma"
    }

    /// Describe the chunk starting at `addr`
    ///
    /// Directly mapped memory is described by its address. Memory that is only
    /// virtually contiguous must be resolved to its backing page here; this is
    /// asked once per chunk while the table is populated.
    fn resolve(&self, addr: usize, page_size: usize) -> SgAddr {
        let _ = page_size;
        SgAddr::Linear(addr)
    }
}
