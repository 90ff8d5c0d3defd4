//! Testing utilities and mock implementations
//!
//! Mocks for exercising the transfer layer on the host without an engine.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;
use std::vec::Vec;

use crate::block::DmaBlock;
use crate::driver::config::{DataDirection, DmaAddr, PrepFlags, SlaveConfig, TransferDirection};
use crate::driver::engine::{Cookie, CyclicInfo, DmaEngine, DmaStatus, MemcpyInfo};
use crate::driver::error::{DmaError, DmaResult};
use crate::packet::{PacketBuffer, Timestamp};
use crate::sg::{SgAddr, SgEntry};
use crate::xfer::Notifier;

// =============================================================================
// Mock Engine
// =============================================================================

/// Engine call, as recorded by [`MockEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SlaveConfig,
    /// Entry count and direction
    PrepSlaveSg(usize, TransferDirection),
    /// Ring length and period length
    PrepCyclic(usize, usize),
    /// Copy length
    PrepMemcpy(usize),
    AttachCompletion,
    Submit,
    IssuePending,
    /// Entry count and direction
    MapSg(usize, DataDirection),
    /// Entry count and direction
    UnmapSg(usize, DataDirection),
}

/// Descriptor handed out by [`MockEngine`]
#[derive(Debug)]
pub struct MockDescriptor {
    notifier: Option<Notifier>,
}

/// Scriptable in-memory engine
///
/// Records every call, hands out increasing cookies and reports
/// `InProgress` for any cookie until told otherwise.
///
/// # Example
///
/// ```ignore
/// let engine = MockEngine::new();
/// engine.limit_mapping(1); // map_sg maps at most one entry
///
/// let cookie = xfer.start()?;
/// engine.complete(cookie);
/// assert_eq!(xfer.poll()?, DmaStatus::Complete);
/// ```
#[derive(Debug)]
pub struct MockEngine {
    calls: RefCell<Vec<Call>>,
    slave: Cell<Option<SlaveConfig>>,
    statuses: RefCell<HashMap<i32, DmaStatus>>,
    notifiers: RefCell<HashMap<i32, Notifier>>,
    next_cookie: Cell<i32>,
    map_limit: Cell<usize>,
    fail_prep: Cell<bool>,
    reject_slave: Cell<bool>,
    reject_submit: Cell<bool>,
    paged: bool,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            slave: Cell::new(None),
            statuses: RefCell::new(HashMap::new()),
            notifiers: RefCell::new(HashMap::new()),
            next_cookie: Cell::new(1),
            map_limit: Cell::new(usize::MAX),
            fail_prep: Cell::new(false),
            reject_slave: Cell::new(false),
            reject_submit: Cell::new(false),
            paged: false,
        }
    }

    /// Describe chunks by page frame instead of address
    pub fn with_paged_memory(mut self) -> Self {
        self.paged = true;
        self
    }

    /// Recorded calls, oldest first
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Last slave config applied
    pub fn last_slave_config(&self) -> Option<SlaveConfig> {
        self.slave.get()
    }

    /// Map at most `limit` entries per `map_sg` call
    pub fn limit_mapping(&self, limit: usize) {
        self.map_limit.set(limit);
    }

    /// Make every descriptor preparation return `None`
    pub fn fail_prep(&self, fail: bool) {
        self.fail_prep.set(fail);
    }

    /// Make `slave_config` fail
    pub fn reject_slave_config(&self, reject: bool) {
        self.reject_slave.set(reject);
    }

    /// Make `submit` fail
    pub fn reject_submit(&self, reject: bool) {
        self.reject_submit.set(reject);
    }

    /// Set the status reported for `cookie`
    pub fn set_status(&self, cookie: Cookie, status: DmaStatus) {
        self.statuses.borrow_mut().insert(cookie.value(), status);
    }

    /// Finish `cookie` successfully and fire its notifier, as an interrupt would
    pub fn complete(&self, cookie: Cookie) {
        self.set_status(cookie, DmaStatus::Complete);
        let notifier = self.notifiers.borrow().get(&cookie.value()).copied();
        if let Some(notifier) = notifier {
            notifier.notify();
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn descriptor(&self) -> Option<MockDescriptor> {
        if self.fail_prep.get() {
            None
        } else {
            Some(MockDescriptor { notifier: None })
        }
    }

    fn bus_address(addr: SgAddr) -> DmaAddr {
        match addr {
            SgAddr::Linear(addr) => addr as DmaAddr,
            SgAddr::Page { pfn, offset } => (pfn * 4096 + offset) as DmaAddr,
        }
    }
}

impl DmaEngine for MockEngine {
    type Descriptor = MockDescriptor;

    fn slave_config(&self, config: &SlaveConfig) -> DmaResult<()> {
        self.record(Call::SlaveConfig);
        if self.reject_slave.get() {
            return Err(DmaError::InvalidState);
        }
        self.slave.set(Some(*config));
        Ok(())
    }

    fn prep_slave_sg(
        &self,
        entries: &[SgEntry],
        direction: TransferDirection,
        _flags: PrepFlags,
    ) -> Option<MockDescriptor> {
        self.record(Call::PrepSlaveSg(entries.len(), direction));
        self.descriptor()
    }

    fn prep_cyclic(
        &self,
        info: &CyclicInfo,
        _direction: TransferDirection,
        _flags: PrepFlags,
    ) -> Option<MockDescriptor> {
        self.record(Call::PrepCyclic(info.len, info.period_len));
        self.descriptor()
    }

    fn prep_memcpy(&self, info: &MemcpyInfo, _flags: PrepFlags) -> Option<MockDescriptor> {
        self.record(Call::PrepMemcpy(info.len));
        self.descriptor()
    }

    fn attach_completion(&self, desc: &mut MockDescriptor, notifier: Notifier) {
        self.record(Call::AttachCompletion);
        desc.notifier = Some(notifier);
    }

    fn submit(&self, desc: MockDescriptor) -> DmaResult<Cookie> {
        self.record(Call::Submit);
        if self.reject_submit.get() {
            return Err(DmaError::SubmitRejected);
        }
        let cookie = Cookie(self.next_cookie.get());
        self.next_cookie.set(cookie.value() + 1);
        if let Some(notifier) = desc.notifier {
            self.notifiers.borrow_mut().insert(cookie.value(), notifier);
        }
        Ok(cookie)
    }

    fn issue_pending(&self) {
        self.record(Call::IssuePending);
    }

    fn status(&self, cookie: Cookie) -> DmaStatus {
        self.statuses
            .borrow()
            .get(&cookie.value())
            .copied()
            .unwrap_or(DmaStatus::InProgress)
    }

    fn map_sg(&self, entries: &mut [SgEntry], direction: DataDirection) -> usize {
        self.record(Call::MapSg(entries.len(), direction));
        let count = entries.len().min(self.map_limit.get());
        for entry in &mut entries[..count] {
            entry.set_dma(Self::bus_address(entry.addr()), entry.length());
        }
        count
    }

    fn unmap_sg(&self, entries: &mut [SgEntry], direction: DataDirection) {
        self.record(Call::UnmapSg(entries.len(), direction));
        for entry in entries.iter_mut() {
            entry.clear_dma();
        }
    }

    fn device_name(&self) -> &str {
        "mock-dma"
    }

    fn resolve(&self, addr: usize, page_size: usize) -> SgAddr {
        if self.paged {
            SgAddr::page_of(addr, page_size)
        } else {
            SgAddr::Linear(addr)
        }
    }
}

// =============================================================================
// Atomic Engine
// =============================================================================

/// Thread-safe engine that completes every submission immediately
///
/// For tests that share transfers across threads, which [`MockEngine`]
/// cannot do.
#[derive(Debug, Default)]
pub struct AtomicEngine {
    submitted: AtomicUsize,
}

impl AtomicEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl DmaEngine for AtomicEngine {
    type Descriptor = ();

    fn slave_config(&self, _config: &SlaveConfig) -> DmaResult<()> {
        Ok(())
    }

    fn prep_slave_sg(
        &self,
        _entries: &[SgEntry],
        _direction: TransferDirection,
        _flags: PrepFlags,
    ) -> Option<()> {
        Some(())
    }

    fn prep_cyclic(
        &self,
        _info: &CyclicInfo,
        _direction: TransferDirection,
        _flags: PrepFlags,
    ) -> Option<()> {
        Some(())
    }

    fn prep_memcpy(&self, _info: &MemcpyInfo, _flags: PrepFlags) -> Option<()> {
        Some(())
    }

    fn attach_completion(&self, _desc: &mut (), _notifier: Notifier) {}

    fn submit(&self, _desc: ()) -> DmaResult<Cookie> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(Cookie(n as i32 + 1))
    }

    fn issue_pending(&self) {}

    fn status(&self, _cookie: Cookie) -> DmaStatus {
        DmaStatus::Complete
    }

    fn map_sg(&self, entries: &mut [SgEntry], _direction: DataDirection) -> usize {
        for entry in entries.iter_mut() {
            entry.set_dma(MockEngine::bus_address(entry.addr()), entry.length());
        }
        entries.len()
    }

    fn unmap_sg(&self, entries: &mut [SgEntry], _direction: DataDirection) {
        for entry in entries.iter_mut() {
            entry.clear_dma();
        }
    }
}

// =============================================================================
// Fake Block
// =============================================================================

/// Block with a synthetic address and no memory behind it
///
/// For geometry tests only: its buffer must never be read or written.
#[derive(Debug)]
pub struct FakeBlock {
    addr: usize,
    size: AtomicUsize,
}

impl FakeBlock {
    pub fn new(addr: usize, size: usize) -> Self {
        Self {
            addr,
            size: AtomicUsize::new(size),
        }
    }

    /// Simulate the owner resizing the block
    pub fn set_size(&self, size: usize) {
        self.size.store(size, Ordering::Relaxed);
    }
}

// SAFETY: Test-only. Nothing in the tests dereferences a fake block's buffer.
unsafe impl DmaBlock for FakeBlock {
    fn buffer(&self) -> *mut u8 {
        self.addr as *mut u8
    }

    fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Packet Buffer
// =============================================================================

/// Growable packet buffer
#[derive(Debug, Default)]
pub struct VecPacket {
    data: Vec<u8>,
    timestamp: Option<Timestamp>,
}

impl VecPacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            timestamp: None,
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }
}

impl PacketBuffer for VecPacket {
    fn put(&mut self, len: usize) -> Option<&mut [u8]> {
        let start = self.data.len();
        self.data.resize(start + len, 0);
        Some(&mut self.data[start..])
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn set_hw_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = Some(timestamp);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: Cell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total microseconds "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns.get() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xfer::Completion;

    #[test]
    fn mock_engine_cookies_increase() {
        let engine = MockEngine::new();
        let a = engine.submit(MockDescriptor { notifier: None }).unwrap();
        let b = engine.submit(MockDescriptor { notifier: None }).unwrap();
        assert!(b > a);
        assert_eq!(engine.status(a), DmaStatus::InProgress);
    }

    #[test]
    fn mock_engine_complete_fires_notifier() {
        static DONE: Completion = Completion::new();
        let engine = MockEngine::new();
        let mut desc = engine
            .prep_memcpy(&MemcpyInfo::new(0, 0, 4), PrepFlags::NONE)
            .unwrap();
        engine.attach_completion(&mut desc, DONE.notifier());
        let cookie = engine.submit(desc).unwrap();

        engine.complete(cookie);
        assert_eq!(engine.status(cookie), DmaStatus::Complete);
        assert!(DONE.take());
    }

    #[test]
    fn atomic_engine_completes_on_submit() {
        let engine = AtomicEngine::new();
        let cookie = engine.submit(()).unwrap();
        assert_eq!(engine.submitted(), 1);
        assert_eq!(engine.status(cookie), DmaStatus::Complete);
    }

    #[test]
    fn mock_delay_accumulates() {
        use embedded_hal::delay::DelayNs;
        let mut delay = MockDelay::new();
        delay.delay_us(10);
        delay.delay_ns(5_000);
        assert_eq!(delay.total_us(), 15);
    }
}
