//! Packet descriptors.

use super::buffer::{PacketBuffer, Timestamp};
use crate::block::DmaBlock;
use crate::driver::config::{
    DataDirection, PacketChannelConfig, PrepFlags, SlaveConfig, TransferDirection, XferConfig,
};
use crate::driver::engine::{DmaEngine, DmaStatus};
use crate::driver::error::{DmaError, IoError, Result};
use crate::op::Operation;
use crate::sg::Segment;
use crate::xfer::{Notifier, Transfer, XferState};

/// Direction of a packet relative to memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketKind {
    /// Device to memory (receive)
    Inbound,
    /// Memory to device (transmit)
    Outbound,
}

impl PacketKind {
    /// Engine transaction direction
    #[must_use]
    pub const fn transfer_direction(self) -> TransferDirection {
        match self {
            PacketKind::Inbound => TransferDirection::DevToMem,
            PacketKind::Outbound => TransferDirection::MemToDev,
        }
    }

    /// Mapping direction
    #[must_use]
    pub const fn data_direction(self) -> DataDirection {
        self.transfer_direction().data_direction()
    }

    /// Slave parameters for this kind on the given channel
    ///
    /// Inbound packets read from the device FIFO, so the channel settings land
    /// on the source side. Outbound packets write to it.
    #[must_use]
    pub const fn slave_config(self, channel: &PacketChannelConfig) -> SlaveConfig {
        let slave = SlaveConfig::new().with_direction(self.transfer_direction());
        match self {
            PacketKind::Inbound => slave
                .with_src_addr(channel.fifo_addr)
                .with_src_width(channel.bus_width)
                .with_src_burst(channel.burst),
            PacketKind::Outbound => slave
                .with_dst_addr(channel.fifo_addr)
                .with_dst_width(channel.bus_width)
                .with_dst_burst(channel.burst),
        }
    }
}

/// One packet's in-flight transfer state
///
/// Binds a block, a single-segment transfer over it, a kind and a caller
/// assigned identifier. Dropping the descriptor unmaps and frees its transfer;
/// the block is left to its owner, so several descriptors may share one block
/// at different offsets.
///
/// # Example
///
/// ```ignore
/// let channel = PacketChannelConfig::new().with_fifo_addr(UART_RX_FIFO);
/// let mut desc = PacketDescriptor::new(&engine, &block, 7, PacketKind::Inbound, &channel)?;
///
/// desc.prepare(Some(RX_DONE.notifier()))?;
/// desc.start()?;
///
/// // after RX_DONE fires
/// let mut frame = FrameBuffer::<1522>::new();
/// desc.copy_from(&mut frame, Some(rx_time))?;
/// ```
pub struct PacketDescriptor<'a, E: DmaEngine> {
    id: u16,
    kind: PacketKind,
    block: &'a dyn DmaBlock,
    xfer: Transfer<'a, E>,
    flags: PrepFlags,
    timestamp: Option<Timestamp>,
}

impl<'a, E: DmaEngine> PacketDescriptor<'a, E> {
    /// Create a descriptor over a whole block
    pub fn new(
        engine: &'a E,
        block: &'a dyn DmaBlock,
        id: u16,
        kind: PacketKind,
        channel: &PacketChannelConfig,
    ) -> Result<Self> {
        Self::with_offset(engine, block, 0, id, kind, channel)
    }

    /// Create a descriptor over a block starting at `offset`
    ///
    /// The transfer's slave parameters are wired from `kind` and `channel`.
    pub fn with_offset(
        engine: &'a E,
        block: &'a dyn DmaBlock,
        offset: usize,
        id: u16,
        kind: PacketKind,
        channel: &PacketChannelConfig,
    ) -> Result<Self> {
        let segment = Segment::new(block, offset)?;
        let config = XferConfig::new()
            .with_slave(kind.slave_config(channel))
            .with_page_size(channel.page_size);

        let mut xfer = Transfer::new(engine, config)?;
        xfer.add_segment(segment)?;

        Ok(Self {
            id,
            kind,
            block,
            xfer,
            flags: channel.flags,
            timestamp: None,
        })
    }

    /// Packet identifier
    #[inline(always)]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Packet direction
    #[inline(always)]
    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    /// Block the packet lives in
    #[inline(always)]
    pub fn block(&self) -> &'a dyn DmaBlock {
        self.block
    }

    /// Offset of the packet within its block
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.xfer.segments().first().map_or(0, Segment::offset)
    }

    /// Underlying transfer
    #[inline(always)]
    pub fn transfer(&self) -> &Transfer<'a, E> {
        &self.xfer
    }

    /// Timestamp recorded by the last copy that supplied one
    #[inline(always)]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Map and prepare the transfer in the packet's direction
    ///
    /// A mapping left in place by an earlier failed prepare is reused.
    pub fn prepare(&mut self, completion: Option<Notifier>) -> Result<()> {
        if self.xfer.state() < XferState::Mapped {
            self.xfer.map(self.kind.data_direction())?;
        }
        self.xfer
            .prepare_sg(self.kind.transfer_direction(), self.flags, completion)
    }

    /// Single-member operation over this descriptor's transfer
    pub fn operation(&mut self) -> Result<Operation<'_, 'a, E>> {
        let mut op = Operation::new();
        op.add(&mut self.xfer)?;
        Ok(op)
    }

    /// Start the prepared transfer
    pub fn start(&mut self) -> Result<()> {
        self.operation()?.start()
    }

    /// Non-blocking completion query
    pub fn status(&self) -> Result<DmaStatus> {
        Ok(self.xfer.status()?)
    }

    /// Query completion and record a terminal state
    pub fn poll(&mut self) -> Result<DmaStatus> {
        Ok(self.xfer.poll()?)
    }

    /// Release the mapping so the descriptor can be prepared again
    pub fn recycle(&mut self) -> Result<()> {
        Ok(self.xfer.release()?)
    }

    /// Copy the block's contents into `pkt` (device to packet)
    ///
    /// Copies `block.size()` bytes and returns that count. With a timestamp,
    /// it is attached to `pkt` and recorded on the descriptor.
    ///
    /// The caller must keep other transfers from writing the block meanwhile.
    pub fn copy_from<P: PacketBuffer>(
        &mut self,
        pkt: &mut P,
        timestamp: Option<Timestamp>,
    ) -> Result<usize> {
        self.ensure_idle()?;
        let len = self.block.size();
        let dst = pkt.put(len).ok_or(IoError::BufferTooSmall)?;
        // SAFETY: This descriptor's transfer is idle and the caller serializes
        // access to the block.
        let copied = unsafe { self.block.read_into(dst) };
        self.stamp(pkt, timestamp);
        Ok(copied)
    }

    /// Copy `pkt`'s data into the block (packet to device)
    ///
    /// Copies `pkt.data().len()` bytes and returns that count. With a
    /// timestamp, it is attached to `pkt` and recorded on the descriptor.
    ///
    /// The caller must keep other transfers from touching the block meanwhile.
    pub fn copy_to<P: PacketBuffer>(
        &mut self,
        pkt: &mut P,
        timestamp: Option<Timestamp>,
    ) -> Result<usize> {
        self.ensure_idle()?;
        let data = pkt.data();
        if data.len() > self.block.size() {
            return Err(IoError::FrameTooLarge.into());
        }
        // SAFETY: This descriptor's transfer is idle and the caller serializes
        // access to the block.
        let copied = unsafe { self.block.write_from(data) };
        self.stamp(pkt, timestamp);
        Ok(copied)
    }

    fn stamp<P: PacketBuffer>(&mut self, pkt: &mut P, timestamp: Option<Timestamp>) {
        if let Some(ts) = timestamp {
            pkt.set_hw_timestamp(ts);
            self.timestamp = Some(ts);
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.xfer.state().is_in_flight() && self.xfer.status()? == DmaStatus::InProgress {
            return Err(DmaError::Busy.into());
        }
        Ok(())
    }
}

impl<E: DmaEngine> core::fmt::Debug for PacketDescriptor<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PacketDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("offset", &self.offset())
            .field("xfer", &self.xfer)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
