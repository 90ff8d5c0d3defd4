//! Interrupt-safe packet pool.

use super::primitives::CriticalSectionCell;
use crate::driver::engine::DmaEngine;
use crate::driver::error::Result;
use crate::packet::{PacketDescriptor, PacketPool};

/// Packet pool shared between thread context and the completion interrupt
///
/// All access goes through `critical_section::with()`, so keep the closures
/// short: interrupts are masked while they run.
///
/// The pool is `Sync` only when the engine is `Sync` and its descriptors are
/// `Send`. An engine built on `Cell`/`RefCell` can use a local pool but not a
/// static one.
///
/// # Example
///
/// ```ignore
/// static RX_POOL: SharedPool<'static, Channel> = SharedPool::new();
///
/// RX_POOL.add(PacketDescriptor::new(&CHANNEL, &RX_BLOCK, 1, PacketKind::Inbound, &cfg)?)?;
///
/// #[interrupt]
/// fn DMA_CH0() {
///     RX_POOL.with_packet(1, |desc| desc.poll().ok());
/// }
/// ```
pub struct SharedPool<'a, E: DmaEngine> {
    inner: CriticalSectionCell<PacketPool<'a, E>>,
}

impl<'a, E: DmaEngine> SharedPool<'a, E> {
    /// Create an empty pool (const, suitable for statics)
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(PacketPool::new()),
        }
    }

    /// Run `f` with exclusive access to the pool
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut PacketPool<'a, E>) -> R,
    {
        self.inner.with(f)
    }

    /// Like [`with`](Self::with), but `None` if the pool is already borrowed
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut PacketPool<'a, E>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Insert a descriptor
    pub fn add(&self, desc: PacketDescriptor<'a, E>) -> Result<()> {
        self.with(|pool| pool.add(desc))
    }

    /// Remove and return the descriptor with `id`
    pub fn remove(&self, id: u16) -> Option<PacketDescriptor<'a, E>> {
        self.with(|pool| pool.remove(id))
    }

    /// Run `f` on the descriptor with `id`, if present
    pub fn with_packet<R, F>(&self, id: u16, f: F) -> Option<R>
    where
        F: FnOnce(&mut PacketDescriptor<'a, E>) -> R,
    {
        self.with(|pool| pool.find_mut(id).map(f))
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.inner.with_ref(PacketPool::len)
    }

    /// Check if the pool holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.inner.with_ref(PacketPool::is_empty)
    }
}

impl<E: DmaEngine> Default for SharedPool<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}
