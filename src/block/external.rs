//! Block backed by a foreign buffer object.

use super::DmaBlock;

/// A foreign object that exposes its data region.
///
/// Implemented for packet buffers, network stack frames and similar types
/// that own memory the transfer layer should move data into or out of.
///
/// # Safety
///
/// `data_ptr()` must be valid for reads and writes of `data_len()` bytes for
/// as long as the object is alive and not resized. A null `data_ptr()` is only
/// allowed together with a zero `data_len()`.
pub unsafe trait BufferSource {
    /// Start of the object's data region
    fn data_ptr(&self) -> *mut u8;

    /// Current length of the data region
    fn data_len(&self) -> usize;
}

// SAFETY: Forwards to the referenced source, which upholds the contract.
unsafe impl<S: BufferSource + ?Sized> BufferSource for &S {
    #[inline(always)]
    fn data_ptr(&self) -> *mut u8 {
        (**self).data_ptr()
    }

    #[inline(always)]
    fn data_len(&self) -> usize {
        (**self).data_len()
    }
}

/// Adapter presenting a [`BufferSource`] as a [`DmaBlock`].
///
/// The block's buffer and size are read from the source on every call, so a
/// source whose data region moves or grows is always seen as it currently is.
#[derive(Debug)]
pub struct ExternalBlock<S> {
    source: S,
}

impl<S: BufferSource> ExternalBlock<S> {
    /// Wrap a foreign buffer object
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Borrow the wrapped object
    #[inline(always)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Release the wrapped object
    pub fn into_inner(self) -> S {
        self.source
    }
}

// SAFETY: Validity of the region is guaranteed by the `BufferSource` contract.
unsafe impl<S: BufferSource + Sync> DmaBlock for ExternalBlock<S> {
    #[inline(always)]
    fn buffer(&self) -> *mut u8 {
        self.source.data_ptr()
    }

    #[inline(always)]
    fn size(&self) -> usize {
        self.source.data_len()
    }
}
