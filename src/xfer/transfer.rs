//! Transfer state machine.

use alloc::vec::Vec;

use super::completion::Notifier;
use crate::driver::config::{DataDirection, PrepFlags, SlaveConfig, TransferDirection, XferConfig};
use crate::driver::engine::{Cookie, CyclicInfo, DmaEngine, DmaStatus, MemcpyInfo};
use crate::driver::error::{ConfigError, ConfigResult, DmaError, DmaResult, Result};
use crate::internal::fmt::{dma_debug, dma_error, dma_warn};
use crate::sg::{Segment, SgTable};

// =============================================================================
// State
// =============================================================================

/// Transfer lifecycle state
///
/// ```text
/// Created -> TableBuilt -> Mapped -> Prepared -> Submitted -> Completed
///                                                          \-> Failed
/// ```
///
/// Cyclic and flat-copy transfers do not use the table and may be prepared
/// straight from `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum XferState {
    /// Segments may be added or removed
    Created,
    /// Scatter-gather table allocated and populated
    TableBuilt,
    /// Table mapped into the engine's address space
    Mapped,
    /// Engine descriptor ready to submit
    Prepared,
    /// Descriptor handed to the engine
    Submitted,
    /// Engine reported completion
    Completed,
    /// Engine reported an error
    Failed,
}

impl XferState {
    /// Descriptor is with the engine and has not been seen to finish
    #[inline]
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, XferState::Submitted)
    }
}

/// Kind of descriptor the transfer was prepared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum XferMode {
    /// Descriptor built from the mapped scatter-gather table
    #[default]
    Segmented,
    /// Repeating descriptor over a fixed ring
    Cyclic,
    /// Flat copy between two bus addresses
    Memcpy,
}

// =============================================================================
// Transfer
// =============================================================================

/// One asynchronous engine operation over a list of segments
///
/// The transfer owns its scatter-gather table. Dropping it unmaps and frees
/// the table; the blocks behind its segments are never freed.
///
/// # Dropping in flight
///
/// `Drop` cannot wait for the engine. A transfer dropped while `Submitted`
/// is unmapped even if the engine is still accessing the table, and only a
/// warning is logged. Before dropping, [`poll`](Self::poll) until the
/// transfer is `Completed` or `Failed`, or call [`release`](Self::release),
/// which returns [`DmaError::Busy`] while the engine is still working.
///
/// # Example
///
/// ```ignore
/// let mut xfer = Transfer::new(&engine, XferConfig::new().with_slave(slave))?;
/// xfer.add_segment(Segment::new(&block, 0)?)?;
///
/// xfer.map_tx()?;
/// xfer.prepare_tx(PrepFlags::INTERRUPT, Some(TX_DONE.notifier()))?;
/// xfer.start()?;
///
/// while xfer.poll()? == DmaStatus::InProgress {}
/// ```
pub struct Transfer<'a, E: DmaEngine> {
    engine: &'a E,
    config: XferConfig,
    segments: Vec<Segment<'a>>,
    table: Option<SgTable>,
    mapped: Option<DataDirection>,
    mode: XferMode,
    cyclic: Option<CyclicInfo>,
    memcpy: Option<MemcpyInfo>,
    desc: Option<E::Descriptor>,
    cookie: Option<Cookie>,
    state: XferState,
    /// State to fall back to if submission is rejected
    prepared_from: XferState,
}

impl<'a, E: DmaEngine> Transfer<'a, E> {
    /// Create an empty transfer on `engine`
    ///
    /// Returns [`ConfigError::InvalidPageSize`] if the page size is not a
    /// power of two.
    pub fn new(engine: &'a E, config: XferConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            segments: Vec::new(),
            table: None,
            mapped: None,
            mode: XferMode::Segmented,
            cyclic: None,
            memcpy: None,
            desc: None,
            cookie: None,
            state: XferState::Created,
            prepared_from: XferState::Created,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Engine this transfer runs on
    #[inline(always)]
    pub fn engine(&self) -> &'a E {
        self.engine
    }

    /// Current state
    #[inline(always)]
    pub fn state(&self) -> XferState {
        self.state
    }

    /// Descriptor mode (meaningful once prepared)
    #[inline(always)]
    pub fn mode(&self) -> XferMode {
        self.mode
    }

    /// Transfer configuration
    #[inline(always)]
    pub fn config(&self) -> &XferConfig {
        &self.config
    }

    /// Segment list
    #[inline(always)]
    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Built scatter-gather table, if any
    #[inline(always)]
    pub fn table(&self) -> Option<&SgTable> {
        self.table.as_ref()
    }

    /// Direction the table is mapped in, if mapped
    #[inline(always)]
    pub fn mapped_direction(&self) -> Option<DataDirection> {
        self.mapped
    }

    /// Completion token from the last successful submission
    #[inline(always)]
    pub fn cookie(&self) -> Option<Cookie> {
        self.cookie
    }

    /// Total bytes referenced by the segments
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Replace the slave parameters applied at prepare time
    pub fn set_slave_config(&mut self, slave: SlaveConfig) -> DmaResult<()> {
        self.require_unprepared()?;
        self.config.slave = slave;
        Ok(())
    }

    /// Set the ring parameters for [`prepare_cyclic`](Self::prepare_cyclic)
    pub fn set_cyclic(&mut self, info: CyclicInfo) -> Result<()> {
        self.require_unprepared()?;
        if info.len == 0 || info.period_len == 0 || info.len % info.period_len != 0 {
            return Err(ConfigError::InvalidArgument.into());
        }
        self.cyclic = Some(info);
        Ok(())
    }

    /// Set the copy parameters for [`prepare_memcpy`](Self::prepare_memcpy)
    pub fn set_memcpy(&mut self, info: MemcpyInfo) -> Result<()> {
        self.require_unprepared()?;
        if info.len == 0 {
            return Err(ConfigError::InvalidArgument.into());
        }
        self.memcpy = Some(info);
        Ok(())
    }

    /// Append a segment
    pub fn add_segment(&mut self, segment: Segment<'a>) -> DmaResult<()> {
        self.require(XferState::Created)?;
        self.segments
            .try_reserve(1)
            .map_err(|_| DmaError::AllocFailed)?;
        self.segments.push(segment);
        Ok(())
    }

    /// Remove and return the segment at `index`
    pub fn remove_segment(&mut self, index: usize) -> Result<Segment<'a>> {
        self.require(XferState::Created)?;
        if index >= self.segments.len() {
            return Err(ConfigError::InvalidArgument.into());
        }
        Ok(self.segments.remove(index))
    }

    /// Remove every segment
    pub fn clear_segments(&mut self) -> DmaResult<()> {
        self.require(XferState::Created)?;
        self.segments.clear();
        Ok(())
    }

    // =========================================================================
    // Table and mapping
    // =========================================================================

    /// Size, allocate and populate the scatter-gather table
    ///
    /// Every segment must span at least one page. The populated entry count
    /// must match the sizing pass.
    pub fn build_table(&mut self) -> Result<()> {
        self.require(XferState::Created)?;
        if self.segments.is_empty() {
            return Err(ConfigError::EmptyTransfer.into());
        }

        let page_size = self.config.page_size;
        let mut nents = 0usize;
        for (index, segment) in self.segments.iter().enumerate() {
            let pages = segment.pages(page_size);
            if pages == 0 {
                dma_error!(
                    "{}: segment {} spans no pages",
                    self.engine.device_name(),
                    index
                );
                return Err(DmaError::SegmentationFailed.into());
            }
            nents += pages;
        }

        let mut table = match SgTable::alloc(nents) {
            Ok(table) => table,
            Err(e) => {
                dma_error!(
                    "{}: cannot allocate {} table entries",
                    self.engine.device_name(),
                    nents
                );
                return Err(e.into());
            }
        };

        let engine = self.engine;
        let written = table.populate(&self.segments, page_size, |addr| {
            engine.resolve(addr, page_size)
        });
        if written != nents {
            dma_error!(
                "{}: table holds {} entries, populated {}",
                self.engine.device_name(),
                nents,
                written
            );
            return Err(DmaError::LengthMismatch.into());
        }

        self.table = Some(table);
        self.state = XferState::TableBuilt;
        Ok(())
    }

    /// Map the table into the engine's address space
    ///
    /// Builds the table first if needed. Every entry must be mapped; on a
    /// short mapping the table is kept so the mapping can be retried.
    pub fn map(&mut self, direction: DataDirection) -> Result<()> {
        if self.state == XferState::Created {
            self.build_table()?;
        }
        self.require(XferState::TableBuilt)?;

        let table = self.table.as_mut().ok_or(DmaError::InvalidState)?;
        let nents = table.len();
        let mapped = self.engine.map_sg(table.entries_mut(), direction);
        if mapped != nents {
            dma_warn!(
                "{}: mapped {} of {} entries",
                self.engine.device_name(),
                mapped,
                nents
            );
            let partial = mapped.min(nents);
            if partial > 0 {
                self.engine
                    .unmap_sg(&mut table.entries_mut()[..partial], direction);
            }
            table.entries_mut().iter_mut().for_each(|e| e.clear_dma());
            return Err(DmaError::MappingFailed.into());
        }

        self.mapped = Some(direction);
        self.state = XferState::Mapped;
        Ok(())
    }

    /// Map for memory-to-device
    pub fn map_tx(&mut self) -> Result<()> {
        self.map(DataDirection::ToDevice)
    }

    /// Map for device-to-memory
    pub fn map_rx(&mut self) -> Result<()> {
        self.map(DataDirection::FromDevice)
    }

    // =========================================================================
    // Descriptor preparation
    // =========================================================================

    /// Prepare a segmented descriptor over the mapped table
    pub fn prepare_sg(
        &mut self,
        direction: TransferDirection,
        flags: PrepFlags,
        completion: Option<Notifier>,
    ) -> Result<()> {
        self.require(XferState::Mapped)?;
        self.apply_slave_config(direction)?;

        let table = self.table.as_ref().ok_or(DmaError::InvalidState)?;
        let desc = self
            .engine
            .prep_slave_sg(table.entries(), direction, flags);
        self.finish_prepare(desc, XferMode::Segmented, completion)
    }

    /// Prepare a memory-to-device segmented descriptor
    pub fn prepare_tx(&mut self, flags: PrepFlags, completion: Option<Notifier>) -> Result<()> {
        self.prepare_sg(TransferDirection::MemToDev, flags, completion)
    }

    /// Prepare a device-to-memory segmented descriptor
    pub fn prepare_rx(&mut self, flags: PrepFlags, completion: Option<Notifier>) -> Result<()> {
        self.prepare_sg(TransferDirection::DevToMem, flags, completion)
    }

    /// Prepare a cyclic descriptor from the parameters given to [`set_cyclic`](Self::set_cyclic)
    pub fn prepare_cyclic(
        &mut self,
        direction: TransferDirection,
        flags: PrepFlags,
        completion: Option<Notifier>,
    ) -> Result<()> {
        self.require_flat_start()?;
        let info = self.cyclic.ok_or(ConfigError::MissingCyclicInfo)?;
        self.apply_slave_config(direction)?;

        let desc = self.engine.prep_cyclic(&info, direction, flags);
        self.finish_prepare(desc, XferMode::Cyclic, completion)
    }

    /// Prepare a flat copy from the parameters given to [`set_memcpy`](Self::set_memcpy)
    pub fn prepare_memcpy(&mut self, flags: PrepFlags, completion: Option<Notifier>) -> Result<()> {
        self.require_flat_start()?;
        let info = self.memcpy.ok_or(ConfigError::MissingMemcpyInfo)?;
        self.apply_slave_config(TransferDirection::MemToMem)?;

        let desc = self.engine.prep_memcpy(&info, flags);
        self.finish_prepare(desc, XferMode::Memcpy, completion)
    }

    fn apply_slave_config(&mut self, direction: TransferDirection) -> Result<()> {
        self.config.slave.direction = direction;
        if let Err(e) = self.engine.slave_config(&self.config.slave) {
            dma_warn!(
                "{}: slave config rejected: {}",
                self.engine.device_name(),
                e
            );
            return Err(ConfigError::SlaveConfigRejected.into());
        }
        Ok(())
    }

    fn finish_prepare(
        &mut self,
        desc: Option<E::Descriptor>,
        mode: XferMode,
        completion: Option<Notifier>,
    ) -> Result<()> {
        let Some(mut desc) = desc else {
            dma_warn!("{}: no descriptor", self.engine.device_name());
            return Err(DmaError::DescriptorPrepFailed.into());
        };
        if let Some(notifier) = completion {
            self.engine.attach_completion(&mut desc, notifier);
        }
        self.desc = Some(desc);
        self.mode = mode;
        self.prepared_from = self.state;
        self.state = XferState::Prepared;
        Ok(())
    }

    // =========================================================================
    // Submission and status
    // =========================================================================

    /// Submit the prepared descriptor and kick the engine
    ///
    /// On rejection the descriptor is gone and the transfer falls back to the
    /// state it was prepared from.
    pub fn start(&mut self) -> Result<Cookie> {
        self.require(XferState::Prepared)?;
        let desc = self.desc.take().ok_or(DmaError::InvalidState)?;

        let cookie = match self.engine.submit(desc) {
            Ok(cookie) => cookie,
            Err(e) => {
                dma_warn!("{}: submit rejected: {}", self.engine.device_name(), e);
                self.state = self.prepared_from;
                return Err(e.into());
            }
        };
        self.engine.issue_pending();

        dma_debug!(
            "{}: submitted cookie {}",
            self.engine.device_name(),
            cookie.value()
        );
        self.cookie = Some(cookie);
        self.state = XferState::Submitted;
        Ok(cookie)
    }

    /// Non-blocking completion query
    ///
    /// Returns [`DmaError::InvalidState`] if the transfer was never submitted.
    pub fn status(&self) -> DmaResult<DmaStatus> {
        let cookie = self.cookie.ok_or(DmaError::InvalidState)?;
        Ok(self.engine.status(cookie))
    }

    /// Query completion and record a terminal status in the state
    pub fn poll(&mut self) -> DmaResult<DmaStatus> {
        let status = self.status()?;
        if self.state == XferState::Submitted {
            match status {
                DmaStatus::Complete => self.state = XferState::Completed,
                DmaStatus::Error => self.state = XferState::Failed,
                DmaStatus::InProgress => {}
            }
        }
        Ok(status)
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Unmap and free the table, dropping any unsubmitted descriptor
    ///
    /// Segments and mode parameters are kept and the transfer returns to
    /// `Created`. Returns [`DmaError::Busy`] while the engine still reports
    /// the submission in progress.
    pub fn release(&mut self) -> DmaResult<()> {
        if self.state.is_in_flight() && self.status()? == DmaStatus::InProgress {
            return Err(DmaError::Busy);
        }
        self.teardown();
        self.state = XferState::Created;
        Ok(())
    }

    fn teardown(&mut self) {
        if let (Some(table), Some(direction)) = (self.table.as_mut(), self.mapped.take()) {
            self.engine.unmap_sg(table.entries_mut(), direction);
        }
        self.table = None;
        self.desc = None;
        self.cookie = None;
    }

    // =========================================================================
    // State guards
    // =========================================================================

    fn require(&self, state: XferState) -> DmaResult<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(DmaError::InvalidState)
        }
    }

    fn require_unprepared(&self) -> DmaResult<()> {
        if self.state < XferState::Prepared {
            Ok(())
        } else {
            Err(DmaError::InvalidState)
        }
    }

    fn require_flat_start(&self) -> DmaResult<()> {
        match self.state {
            XferState::Created | XferState::Mapped => Ok(()),
            _ => Err(DmaError::InvalidState),
        }
    }
}

impl<E: DmaEngine> Drop for Transfer<'_, E> {
    fn drop(&mut self) {
        if self.state.is_in_flight() {
            dma_warn!(
                "{}: dropping transfer still owned by the engine",
                self.engine.device_name()
            );
        }
        self.teardown();
    }
}

impl<E: DmaEngine> core::fmt::Debug for Transfer<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transfer")
            .field("device", &self.engine.device_name())
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("segments", &self.segments.len())
            .field("entries", &self.table.as_ref().map(SgTable::len))
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DmaBlock;
    use crate::driver::config::BusWidth;
    use crate::driver::error::Error;
    use crate::sg::SgAddr;
    use crate::testing::{Call, FakeBlock, MockEngine};
    use crate::xfer::Completion;

    const P: usize = 4096;

    fn xfer<'a>(engine: &'a MockEngine, blocks: &[&'a FakeBlock]) -> Transfer<'a, MockEngine> {
        let mut xfer = Transfer::new(engine, XferConfig::new()).unwrap();
        for block in blocks {
            xfer.add_segment(Segment::whole(*block).unwrap()).unwrap();
        }
        xfer
    }

    // =========================================================================
    // Table Tests
    // =========================================================================

    #[test]
    fn new_rejects_bad_page_size() {
        let engine = MockEngine::new();
        let config = XferConfig::new().with_page_size(3000);
        assert_eq!(
            Transfer::new(&engine, config).unwrap_err(),
            ConfigError::InvalidPageSize
        );
    }

    #[test]
    fn table_entries_match_page_counts() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000_0000, 4100);
        let b = FakeBlock::new(0x2000_0800, 2 * P);
        let mut xfer = Transfer::new(&engine, XferConfig::new()).unwrap();
        xfer.add_segment(Segment::new(&a, 50).unwrap()).unwrap();
        xfer.add_segment(Segment::whole(&b).unwrap()).unwrap();

        xfer.build_table().unwrap();
        assert_eq!(xfer.state(), XferState::TableBuilt);

        let table = xfer.table().unwrap();
        // 4046 + 4, then 0x800 + 0x1000 + 0x800
        assert_eq!(table.len(), 2 + 3);
        assert_eq!(table.total_len(), (4100 - 50) + 2 * P);
        assert_eq!(table.total_len(), xfer.total_len());
    }

    #[test]
    fn empty_transfer_cannot_build() {
        let engine = MockEngine::new();
        let mut xfer = xfer(&engine, &[]);
        assert_eq!(
            xfer.build_table(),
            Err(Error::Config(ConfigError::EmptyTransfer))
        );
        assert_eq!(xfer.state(), XferState::Created);
    }

    #[test]
    fn empty_segment_fails_segmentation() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        a.set_size(0);

        let err = xfer.build_table().unwrap_err();
        assert_eq!(err, Error::Dma(DmaError::SegmentationFailed));
        assert_eq!(err.code(), -22);
        assert!(xfer.table().is_none());
    }

    #[test]
    fn engine_resolves_chunks() {
        let engine = MockEngine::new().with_paged_memory();
        let a = FakeBlock::new(5 * P + 16, 32);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.build_table().unwrap();
        assert_eq!(
            xfer.table().unwrap().entries()[0].addr(),
            SgAddr::Page { pfn: 5, offset: 16 }
        );
    }

    #[test]
    fn segments_frozen_after_build() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let b = FakeBlock::new(0x2000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.build_table().unwrap();

        assert_eq!(
            xfer.add_segment(Segment::whole(&b).unwrap()),
            Err(DmaError::InvalidState)
        );
        assert_eq!(xfer.clear_segments(), Err(DmaError::InvalidState));
        assert_eq!(xfer.segments().len(), 1);
    }

    #[test]
    fn segment_list_edits() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let b = FakeBlock::new(0x2000, 64);
        let mut xfer = xfer(&engine, &[&a, &b]);

        let removed = xfer.remove_segment(0).unwrap();
        assert_eq!(removed.start(), 0x1000);
        assert_eq!(xfer.segments()[0].start(), 0x2000);
        assert_eq!(
            xfer.remove_segment(5).unwrap_err(),
            Error::Config(ConfigError::InvalidArgument)
        );

        xfer.clear_segments().unwrap();
        assert!(xfer.segments().is_empty());
    }

    // =========================================================================
    // Mapping Tests
    // =========================================================================

    #[test]
    fn map_builds_and_maps() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 2 * P);
        let mut xfer = xfer(&engine, &[&a]);

        xfer.map_tx().unwrap();
        assert_eq!(xfer.state(), XferState::Mapped);
        assert_eq!(xfer.mapped_direction(), Some(DataDirection::ToDevice));
        assert!(engine.calls().contains(&Call::MapSg(2, DataDirection::ToDevice)));
        assert!(
            xfer.table()
                .unwrap()
                .entries()
                .iter()
                .all(|e| e.dma_length() == e.length())
        );
    }

    #[test]
    fn short_mapping_fails_and_can_retry() {
        let engine = MockEngine::new();
        engine.limit_mapping(1);
        let a = FakeBlock::new(0x1000, 3 * P);
        let mut xfer = xfer(&engine, &[&a]);

        assert_eq!(xfer.map_rx(), Err(Error::Dma(DmaError::MappingFailed)));
        assert_eq!(xfer.state(), XferState::TableBuilt);
        assert!(engine.calls().contains(&Call::UnmapSg(1, DataDirection::FromDevice)));

        engine.limit_mapping(usize::MAX);
        xfer.map_rx().unwrap();
        assert_eq!(xfer.state(), XferState::Mapped);
    }

    #[test]
    fn drop_unmaps_symmetrically() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 2 * P);
        {
            let mut xfer = xfer(&engine, &[&a]);
            xfer.map_rx().unwrap();
        }
        assert_eq!(
            engine.calls().last(),
            Some(&Call::UnmapSg(2, DataDirection::FromDevice))
        );
        // Block untouched by teardown
        assert_eq!(a.size(), 2 * P);
    }

    #[test]
    fn drop_in_flight_unmaps_without_waiting() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        {
            let mut xfer = xfer(&engine, &[&a]);
            xfer.map_tx().unwrap();
            xfer.prepare_tx(PrepFlags::NONE, None).unwrap();
            let cookie = xfer.start().unwrap();
            assert_eq!(engine.status(cookie), DmaStatus::InProgress);
            assert_eq!(xfer.release(), Err(DmaError::Busy));
        }
        assert_eq!(
            engine.calls().last(),
            Some(&Call::UnmapSg(1, DataDirection::ToDevice))
        );
    }

    // =========================================================================
    // Preparation Tests
    // =========================================================================

    #[test]
    fn prepare_requires_mapping() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);

        assert_eq!(
            xfer.prepare_tx(PrepFlags::NONE, None),
            Err(Error::Dma(DmaError::InvalidState))
        );
        assert_eq!(xfer.start(), Err(Error::Dma(DmaError::InvalidState)));
        assert_eq!(xfer.status(), Err(DmaError::InvalidState));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn prepare_applies_slave_config_and_attaches_completion() {
        static DONE: Completion = Completion::new();
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let slave = SlaveConfig::new()
            .with_dst_addr(0x3FF0_0000)
            .with_dst_width(BusWidth::Bytes4);
        let mut xfer = Transfer::new(&engine, XferConfig::new().with_slave(slave)).unwrap();
        xfer.add_segment(Segment::whole(&a).unwrap()).unwrap();

        xfer.map_tx().unwrap();
        xfer.prepare_tx(PrepFlags::INTERRUPT, Some(DONE.notifier())).unwrap();

        assert_eq!(xfer.state(), XferState::Prepared);
        assert_eq!(xfer.mode(), XferMode::Segmented);
        let applied = engine.last_slave_config().unwrap();
        assert_eq!(applied.direction, TransferDirection::MemToDev);
        assert_eq!(applied.dst_addr, 0x3FF0_0000);
        assert!(engine.calls().contains(&Call::AttachCompletion));
    }

    #[test]
    fn engine_completion_signals_attached_notifier() {
        static DONE: Completion = Completion::new();
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_rx().unwrap();
        xfer.prepare_rx(PrepFlags::INTERRUPT, Some(DONE.notifier())).unwrap();
        let cookie = xfer.start().unwrap();
        assert!(!DONE.is_complete());

        engine.complete(cookie);
        assert!(DONE.take());
        assert_eq!(DONE.events(), 1);
        assert_eq!(xfer.poll(), Ok(DmaStatus::Complete));
    }

    #[test]
    fn failed_descriptor_never_attaches() {
        static DONE: Completion = Completion::new();
        let engine = MockEngine::new();
        engine.fail_prep(true);
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();

        let err = xfer.prepare_tx(PrepFlags::NONE, Some(DONE.notifier())).unwrap_err();
        assert_eq!(err, Error::Dma(DmaError::DescriptorPrepFailed));
        assert_eq!(xfer.state(), XferState::Mapped);
        assert!(!engine.calls().contains(&Call::AttachCompletion));
    }

    #[test]
    fn rejected_slave_config() {
        let engine = MockEngine::new();
        engine.reject_slave_config(true);
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();

        assert_eq!(
            xfer.prepare_tx(PrepFlags::NONE, None),
            Err(Error::Config(ConfigError::SlaveConfigRejected))
        );
        assert_eq!(xfer.state(), XferState::Mapped);
    }

    #[test]
    fn cyclic_needs_parameters() {
        let engine = MockEngine::new();
        let mut xfer = xfer(&engine, &[]);

        assert_eq!(
            xfer.prepare_cyclic(TransferDirection::DevToMem, PrepFlags::NONE, None),
            Err(Error::Config(ConfigError::MissingCyclicInfo))
        );
        assert_eq!(
            xfer.set_cyclic(CyclicInfo::new(0x4000, 1000, 300)),
            Err(Error::Config(ConfigError::InvalidArgument))
        );

        xfer.set_cyclic(CyclicInfo::new(0x4000, 4096, 1024)).unwrap();
        xfer.prepare_cyclic(TransferDirection::DevToMem, PrepFlags::INTERRUPT, None)
            .unwrap();
        assert_eq!(xfer.mode(), XferMode::Cyclic);
        assert!(engine.calls().contains(&Call::PrepCyclic(4096, 1024)));
        assert!(xfer.table().is_none());
    }

    #[test]
    fn memcpy_bypasses_table() {
        let engine = MockEngine::new();
        let mut xfer = xfer(&engine, &[]);

        assert_eq!(
            xfer.prepare_memcpy(PrepFlags::NONE, None),
            Err(Error::Config(ConfigError::MissingMemcpyInfo))
        );
        xfer.set_memcpy(MemcpyInfo::new(0x8000, 0x9000, 256)).unwrap();
        xfer.prepare_memcpy(PrepFlags::NONE, None).unwrap();
        xfer.start().unwrap();

        assert_eq!(xfer.mode(), XferMode::Memcpy);
        assert!(engine.calls().contains(&Call::PrepMemcpy(256)));
        assert_eq!(
            engine.last_slave_config().unwrap().direction,
            TransferDirection::MemToMem
        );
    }

    // =========================================================================
    // Submission Tests
    // =========================================================================

    #[test]
    fn start_submits_and_issues() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();
        xfer.prepare_tx(PrepFlags::NONE, None).unwrap();

        let cookie = xfer.start().unwrap();
        assert_eq!(xfer.state(), XferState::Submitted);
        assert_eq!(xfer.cookie(), Some(cookie));

        let calls = engine.calls();
        let submit = calls.iter().position(|c| *c == Call::Submit).unwrap();
        assert_eq!(calls[submit + 1], Call::IssuePending);

        // Cannot start twice
        assert_eq!(xfer.start(), Err(Error::Dma(DmaError::InvalidState)));
    }

    #[test]
    fn rejected_submit_falls_back() {
        let engine = MockEngine::new();
        engine.reject_submit(true);
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();
        xfer.prepare_tx(PrepFlags::NONE, None).unwrap();

        assert_eq!(xfer.start(), Err(Error::Dma(DmaError::SubmitRejected)));
        assert_eq!(xfer.state(), XferState::Mapped);
        assert!(!engine.calls().contains(&Call::IssuePending));
    }

    #[test]
    fn poll_records_terminal_state() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();
        xfer.prepare_tx(PrepFlags::NONE, None).unwrap();
        let cookie = xfer.start().unwrap();

        assert_eq!(xfer.poll(), Ok(DmaStatus::InProgress));
        assert_eq!(xfer.state(), XferState::Submitted);

        engine.set_status(cookie, DmaStatus::Complete);
        assert_eq!(xfer.poll(), Ok(DmaStatus::Complete));
        assert_eq!(xfer.state(), XferState::Completed);
    }

    #[test]
    fn release_waits_for_engine() {
        let engine = MockEngine::new();
        let a = FakeBlock::new(0x1000, 64);
        let mut xfer = xfer(&engine, &[&a]);
        xfer.map_tx().unwrap();
        xfer.prepare_tx(PrepFlags::NONE, None).unwrap();
        let cookie = xfer.start().unwrap();

        assert_eq!(xfer.release(), Err(DmaError::Busy));
        assert_eq!(xfer.state(), XferState::Submitted);

        engine.set_status(cookie, DmaStatus::Error);
        xfer.release().unwrap();
        assert_eq!(xfer.state(), XferState::Created);
        assert!(xfer.table().is_none());
        assert_eq!(xfer.segments().len(), 1);
        assert!(engine.calls().contains(&Call::UnmapSg(1, DataDirection::ToDevice)));
    }
}
