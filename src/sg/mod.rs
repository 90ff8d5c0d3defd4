//! Scatter-gather segmentation.
//!
//! A [`Segment`] is a non-owning reference into a block at a byte offset. The
//! referenced range is split into page-aligned [`Chunk`]s: each chunk runs
//! from the current address up to the next page boundary or the end of the
//! range, whichever comes first. Every chunk after the first therefore starts
//! on a page boundary and no chunk crosses one.
//!
//! The chunk walk is used twice per transfer. Once as a dry run to size the
//! [`SgTable`], and once to fill it in.

mod table;

pub use table::{SgAddr, SgEntry, SgTable};

use crate::block::DmaBlock;
use crate::driver::error::{ConfigError, ConfigResult};

// =============================================================================
// Segment
// =============================================================================

/// A block reference at an offset
///
/// The same block may be referenced by any number of segments at different
/// offsets. Segments never free their block.
#[derive(Clone, Copy)]
pub struct Segment<'a> {
    block: &'a dyn DmaBlock,
    offset: usize,
}

impl<'a> Segment<'a> {
    /// Reference `block` starting at `offset`
    ///
    /// Returns [`ConfigError::InvalidOffset`] unless `offset < block.size()`.
    pub fn new(block: &'a dyn DmaBlock, offset: usize) -> ConfigResult<Self> {
        if offset >= block.size() {
            return Err(ConfigError::InvalidOffset);
        }
        Ok(Self { block, offset })
    }

    /// Reference a whole block
    pub fn whole(block: &'a dyn DmaBlock) -> ConfigResult<Self> {
        Self::new(block, 0)
    }

    /// Referenced block
    #[inline(always)]
    #[must_use]
    pub fn block(&self) -> &'a dyn DmaBlock {
        self.block
    }

    /// Offset into the block
    #[inline(always)]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Start address of the referenced range
    #[inline(always)]
    #[must_use]
    pub fn start(&self) -> usize {
        self.block.addr().wrapping_add(self.offset)
    }

    /// Length of the referenced range (`block.size() - offset`)
    ///
    /// Zero if the block has shrunk below the offset since the segment was built.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.block.size().saturating_sub(self.offset)
    }

    /// Check if the referenced range is empty
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk the referenced range in page-aligned chunks
    #[must_use]
    pub fn chunks(&self, page_size: usize) -> Chunks {
        Chunks::new(self.start(), self.len(), page_size)
    }

    /// Number of pages the referenced range spans
    #[must_use]
    pub fn pages(&self, page_size: usize) -> usize {
        self.chunks(page_size).count()
    }
}

impl core::fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Segment")
            .field("start", &self.start())
            .field("offset", &self.offset)
            .field("len", &self.len())
            .finish()
    }
}

// =============================================================================
// Chunks
// =============================================================================

/// One page-bounded piece of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chunk {
    /// Start address
    pub addr: usize,
    /// Length in bytes
    pub len: usize,
}

/// Iterator over the page-aligned chunks of an address range
#[derive(Debug, Clone)]
pub struct Chunks {
    addr: usize,
    remaining: usize,
    page_size: usize,
}

impl Chunks {
    /// Split `len` bytes starting at `addr`
    ///
    /// A zero `page_size` yields no chunks.
    #[must_use]
    pub const fn new(addr: usize, len: usize, page_size: usize) -> Self {
        Self {
            addr,
            remaining: if page_size == 0 { 0 } else { len },
            page_size,
        }
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.remaining == 0 {
            return None;
        }
        let to_boundary = self.page_size - self.addr % self.page_size;
        let len = self.remaining.min(to_boundary);
        let chunk = Chunk {
            addr: self.addr,
            len,
        };
        self.addr = self.addr.wrapping_add(len);
        self.remaining -= len;
        Some(chunk)
    }
}

impl core::iter::FusedIterator for Chunks {}
