//! Hardware scatter-gather table.

use alloc::vec::Vec;

use super::Segment;
use crate::driver::config::DmaAddr;
use crate::driver::error::{DmaError, DmaResult};

/// CPU-side description of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SgAddr {
    /// Directly mapped memory, described by its address
    Linear(usize),
    /// Memory resolved to its backing page
    Page {
        /// Page frame number
        pfn: usize,
        /// Offset of the chunk within the page
        offset: usize,
    },
}

impl SgAddr {
    /// Resolve `addr` to a page frame and in-page offset
    #[must_use]
    pub const fn page_of(addr: usize, page_size: usize) -> Self {
        Self::Page {
            pfn: addr / page_size,
            offset: addr % page_size,
        }
    }
}

/// One scatter-gather table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SgEntry {
    addr: SgAddr,
    length: usize,
    dma_address: DmaAddr,
    dma_length: usize,
}

impl SgEntry {
    /// Unpopulated entry
    pub const EMPTY: Self = Self {
        addr: SgAddr::Linear(0),
        length: 0,
        dma_address: 0,
        dma_length: 0,
    };

    /// Create an unmapped entry
    #[must_use]
    pub const fn new(addr: SgAddr, length: usize) -> Self {
        Self {
            addr,
            length,
            dma_address: 0,
            dma_length: 0,
        }
    }

    /// CPU-side location of the chunk
    #[inline(always)]
    #[must_use]
    pub const fn addr(&self) -> SgAddr {
        self.addr
    }

    /// Chunk length in bytes
    #[inline(always)]
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Bus address assigned by the engine's mapping
    #[inline(always)]
    #[must_use]
    pub const fn dma_address(&self) -> DmaAddr {
        self.dma_address
    }

    /// Length of the mapped region (may differ from `length` if the engine merges entries)
    #[inline(always)]
    #[must_use]
    pub const fn dma_length(&self) -> usize {
        self.dma_length
    }

    /// Record the engine mapping for this entry
    #[inline(always)]
    pub fn set_dma(&mut self, address: DmaAddr, length: usize) {
        self.dma_address = address;
        self.dma_length = length;
    }

    /// Forget the engine mapping
    #[inline(always)]
    pub fn clear_dma(&mut self) {
        self.dma_address = 0;
        self.dma_length = 0;
    }
}

/// Fixed-capacity table of [`SgEntry`]s
///
/// Capacity is decided once at allocation; entries are then filled in place.
#[derive(Debug)]
pub struct SgTable {
    entries: Vec<SgEntry>,
}

impl SgTable {
    /// Allocate a table of `nents` empty entries
    ///
    /// Returns [`DmaError::TableAllocFailed`] if the entries cannot be allocated.
    pub fn alloc(nents: usize) -> DmaResult<Self> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(nents)
            .map_err(|_| DmaError::TableAllocFailed)?;
        entries.resize(nents, SgEntry::EMPTY);
        Ok(Self { entries })
    }

    /// Fill entries by walking `segments` in page-aligned chunks
    ///
    /// `resolve` describes each chunk's start address. Stops without error
    /// once every entry is written, even if chunks remain. Returns the number
    /// of entries written.
    pub fn populate<F>(&mut self, segments: &[Segment<'_>], page_size: usize, resolve: F) -> usize
    where
        F: Fn(usize) -> SgAddr,
    {
        let chunks = segments.iter().flat_map(|seg| seg.chunks(page_size));
        let mut written = 0;
        for (entry, chunk) in self.entries.iter_mut().zip(chunks) {
            *entry = SgEntry::new(resolve(chunk.addr), chunk.len);
            written += 1;
        }
        written
    }

    /// Number of entries
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries
    #[inline(always)]
    pub fn entries(&self) -> &[SgEntry] {
        &self.entries
    }

    /// All entries, mutably (for the engine's mapping pass)
    #[inline(always)]
    pub fn entries_mut(&mut self) -> &mut [SgEntry] {
        &mut self.entries
    }

    /// Sum of entry lengths
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(SgEntry::length).sum()
    }
}
