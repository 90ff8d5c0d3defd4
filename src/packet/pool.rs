//! Packet descriptor pool.

use alloc::vec::Vec;

use super::descriptor::PacketDescriptor;
use crate::driver::engine::DmaEngine;
use crate::driver::error::{ConfigError, DmaError, DmaResult, Result};
use crate::internal::constants::DEFAULT_POOL_CAPACITY;

/// Unordered set of live descriptors, indexed by packet id
///
/// Ids are unique within the pool. Lookup is a linear scan.
pub struct PacketPool<'a, E: DmaEngine> {
    descs: Vec<PacketDescriptor<'a, E>>,
}

impl<'a, E: DmaEngine> PacketPool<'a, E> {
    /// Create an empty pool (const, no allocation)
    #[must_use]
    pub const fn new() -> Self {
        Self { descs: Vec::new() }
    }

    /// Create a pool with room for `capacity` descriptors
    pub fn with_capacity(capacity: usize) -> DmaResult<Self> {
        let mut descs = Vec::new();
        descs
            .try_reserve_exact(capacity)
            .map_err(|_| DmaError::AllocFailed)?;
        Ok(Self { descs })
    }

    /// Create a pool with room for [`DEFAULT_POOL_CAPACITY`] descriptors
    ///
    /// [`DEFAULT_POOL_CAPACITY`]: crate::constants::DEFAULT_POOL_CAPACITY
    pub fn with_default_capacity() -> DmaResult<Self> {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Insert a descriptor
    ///
    /// Returns [`ConfigError::DuplicateId`] if the id is already present.
    pub fn add(&mut self, desc: PacketDescriptor<'a, E>) -> Result<()> {
        if self.contains(desc.id()) {
            return Err(ConfigError::DuplicateId.into());
        }
        self.descs.try_reserve(1).map_err(|_| DmaError::AllocFailed)?;
        self.descs.push(desc);
        Ok(())
    }

    /// Remove and return the descriptor with `id`
    pub fn remove(&mut self, id: u16) -> Option<PacketDescriptor<'a, E>> {
        let index = self.descs.iter().position(|d| d.id() == id)?;
        Some(self.descs.swap_remove(index))
    }

    /// Drop every descriptor
    pub fn clear(&mut self) {
        self.descs.clear();
    }

    /// Descriptor with `id`
    pub fn find(&self, id: u16) -> Option<&PacketDescriptor<'a, E>> {
        self.descs.iter().find(|d| d.id() == id)
    }

    /// Descriptor with `id`, mutably
    pub fn find_mut(&mut self, id: u16) -> Option<&mut PacketDescriptor<'a, E>> {
        self.descs.iter_mut().find(|d| d.id() == id)
    }

    /// Check if a descriptor with `id` is present
    pub fn contains(&self, id: u16) -> bool {
        self.find(id).is_some()
    }

    /// Number of descriptors
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    /// Check if the pool holds no descriptors
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    /// Iterate over descriptors in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &PacketDescriptor<'a, E>> {
        self.descs.iter()
    }

    /// Iterate mutably over descriptors in no particular order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PacketDescriptor<'a, E>> {
        self.descs.iter_mut()
    }
}

impl<E: DmaEngine> Default for PacketPool<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DmaEngine> core::fmt::Debug for PacketPool<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.descs.iter().map(PacketDescriptor::id)).finish()
    }
}
