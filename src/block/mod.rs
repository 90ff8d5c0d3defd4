//! Buffer blocks.
//!
//! A block is a contiguous logical byte range, whatever owns the memory behind
//! it. Transfers and packet descriptors only ever see `&dyn DmaBlock`, so the
//! storage variant is chosen once, at construction:
//!
//! - [`SimpleBlock`] - caller-supplied memory, or a buffer it allocates and frees itself
//! - [`ExternalBlock`] - adapter over a foreign object implementing [`BufferSource`]
//!
//! Blocks are never freed by the segments, transfers or descriptors that
//! reference them.

mod external;
mod simple;

pub use external::{BufferSource, ExternalBlock};
pub use simple::SimpleBlock;

/// A contiguous byte range usable as a DMA source or destination.
///
/// # Safety
///
/// Implementors guarantee that, for as long as the block is alive and its
/// size is not changed by its owner, `buffer()` points to `size()` bytes that
/// are valid for reads and writes. A null `buffer()` is only allowed when
/// `size()` is zero.
///
/// Blocks are shared with the engine's completion context, so they must be
/// `Sync`. Byte access through [`read_into`](Self::read_into) and
/// [`write_from`](Self::write_from) stays `unsafe`; callers serialize it.
pub unsafe trait DmaBlock: Sync {
    /// Start of the block's data
    fn buffer(&self) -> *mut u8;

    /// Size of the block in bytes
    fn size(&self) -> usize;

    /// Start address as an integer, for page arithmetic
    #[inline(always)]
    fn addr(&self) -> usize {
        self.buffer() as usize
    }

    /// Check if the block holds no bytes
    #[inline(always)]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Copy up to `dst.len()` bytes out of the block, returning the count copied.
    ///
    /// # Safety
    ///
    /// No engine write into the block may be in flight, and nothing else may be
    /// writing the block for the duration of the call.
    unsafe fn read_into(&self, dst: &mut [u8]) -> usize {
        let len = dst.len().min(self.size());
        if len == 0 {
            return 0;
        }
        // SAFETY: The trait contract makes `buffer()` valid for `size()` bytes and
        // the caller excludes concurrent writers. `dst` is a distinct borrow.
        unsafe { core::ptr::copy_nonoverlapping(self.buffer(), dst.as_mut_ptr(), len) };
        len
    }

    /// Copy up to `size()` bytes from `src` into the block, returning the count copied.
    ///
    /// # Safety
    ///
    /// No engine access to the block may be in flight, and nothing else may be
    /// reading or writing the block for the duration of the call.
    unsafe fn write_from(&self, src: &[u8]) -> usize {
        let len = src.len().min(self.size());
        if len == 0 {
            return 0;
        }
        // SAFETY: The trait contract makes `buffer()` valid for `size()` bytes and
        // the caller guarantees exclusive access. `src` is a distinct borrow.
        unsafe { core::ptr::copy_nonoverlapping(src.as_ptr(), self.buffer(), len) };
        len
    }
}
