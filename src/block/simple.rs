//! Simple block over raw memory.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr::NonNull;

use super::DmaBlock;
use crate::driver::error::{DmaError, DmaResult};

/// Block over a plain memory region.
///
/// Either wraps memory the caller owns, or allocates a zeroed buffer of its
/// own. Only a self-allocated buffer is released when the block is dropped.
///
/// # Example
///
/// ```ignore
/// static mut RX_BUF: [u8; 2048] = [0; 2048];
///
/// // Caller-owned memory
/// let rx = SimpleBlock::from_static(unsafe { &mut *core::ptr::addr_of_mut!(RX_BUF) });
///
/// // Self-allocated memory, freed on drop
/// let tx = SimpleBlock::alloc(1536)?;
/// ```
#[derive(Debug)]
pub struct SimpleBlock {
    /// Data buffer
    buffer: NonNull<u8>,
    /// Data buffer size
    size: usize,
    /// Buffer was allocated by this block and is freed with it
    alloc_buffer: bool,
}

impl SimpleBlock {
    /// Wrap caller-owned memory.
    ///
    /// # Safety
    ///
    /// `buffer` must be valid for reads and writes of `size` bytes for the whole
    /// life of the block, and the caller keeps ownership: the memory is not
    /// freed when the block is dropped.
    #[must_use]
    pub const unsafe fn new(buffer: NonNull<u8>, size: usize) -> Self {
        Self {
            buffer,
            size,
            alloc_buffer: false,
        }
    }

    /// Wrap a static buffer.
    #[must_use]
    pub fn from_static(buffer: &'static mut [u8]) -> Self {
        let size = buffer.len();
        // SAFETY: A 'static exclusive borrow stays valid for the block's life.
        unsafe { Self::new(NonNull::from(buffer).cast::<u8>(), size) }
    }

    /// Allocate a zeroed buffer of `size` bytes owned by the block.
    ///
    /// Returns [`DmaError::AllocFailed`] if the allocator cannot satisfy the request.
    pub fn alloc(size: usize) -> DmaResult<Self> {
        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(size).map_err(|_| DmaError::AllocFailed)?;
        buf.resize(size, 0);

        let raw = Box::into_raw(buf.into_boxed_slice());
        let buffer = NonNull::new(raw.cast::<u8>()).ok_or(DmaError::AllocFailed)?;

        Ok(Self {
            buffer,
            size,
            alloc_buffer: true,
        })
    }

    /// Check if the block frees its buffer on drop
    #[inline(always)]
    #[must_use]
    pub fn owns_buffer(&self) -> bool {
        self.alloc_buffer
    }
}

// SAFETY: `buffer` is valid for `size` bytes: either by the `new` contract or
// because the block allocated it and keeps it until drop.
unsafe impl DmaBlock for SimpleBlock {
    #[inline(always)]
    fn buffer(&self) -> *mut u8 {
        self.buffer.as_ptr()
    }

    #[inline(always)]
    fn size(&self) -> usize {
        self.size
    }
}

// SAFETY: The block only hands out its pointer. Every access to the bytes goes
// through `unsafe` methods whose callers exclude concurrent access.
unsafe impl Send for SimpleBlock {}
// SAFETY: As above.
unsafe impl Sync for SimpleBlock {}

impl Drop for SimpleBlock {
    fn drop(&mut self) {
        if self.alloc_buffer {
            let slice = core::ptr::slice_from_raw_parts_mut(self.buffer.as_ptr(), self.size);
            // SAFETY: `alloc` produced this pointer from `Box<[u8]>` of exactly
            // `size` bytes and nothing else frees it.
            drop(unsafe { Box::from_raw(slice) });
        }
    }
}
