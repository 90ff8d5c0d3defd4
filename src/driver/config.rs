//! Configuration types for DMA transfers

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{DEFAULT_BUS_WIDTH_BYTES, DEFAULT_MAX_BURST, PAGE_SIZE};

/// Bus address as seen by the DMA engine
pub type DmaAddr = u64;

/// Direction used when mapping a scatter-gather table into the engine's address space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataDirection {
    /// Device both reads and writes the memory
    #[default]
    Bidirectional,
    /// Device reads the memory (transmit)
    ToDevice,
    /// Device writes the memory (receive)
    FromDevice,
}

/// Direction of an engine transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferDirection {
    /// Memory to memory
    MemToMem,
    /// Memory to device
    #[default]
    MemToDev,
    /// Device to memory
    DevToMem,
    /// Device to device
    DevToDev,
}

impl TransferDirection {
    /// Mapping direction implied by this transaction direction
    #[must_use]
    pub const fn data_direction(self) -> DataDirection {
        match self {
            TransferDirection::MemToDev => DataDirection::ToDevice,
            TransferDirection::DevToMem => DataDirection::FromDevice,
            TransferDirection::MemToMem | TransferDirection::DevToDev => {
                DataDirection::Bidirectional
            }
        }
    }
}

/// Device-side bus width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusWidth {
    /// Width left to the engine
    #[default]
    Undefined = 0,
    /// 1 byte
    Bytes1 = 1,
    /// 2 bytes
    Bytes2 = 2,
    /// 4 bytes
    Bytes4 = 4,
    /// 8 bytes
    Bytes8 = 8,
}

impl BusWidth {
    /// Width in bytes (0 when undefined)
    #[must_use]
    pub const fn bytes(self) -> u8 {
        self as u8
    }

    /// Convert a byte count to a bus width
    #[must_use]
    pub const fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            0 => Some(BusWidth::Undefined),
            1 => Some(BusWidth::Bytes1),
            2 => Some(BusWidth::Bytes2),
            4 => Some(BusWidth::Bytes4),
            8 => Some(BusWidth::Bytes8),
            _ => None,
        }
    }
}

/// Maximum burst length in bus-width units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BurstLen {
    /// 1 beat burst
    Burst1 = 1,
    /// 2 beat burst
    Burst2 = 2,
    /// 4 beat burst
    Burst4 = 4,
    /// 8 beat burst (default)
    #[default]
    Burst8 = 8,
    /// 16 beat burst
    Burst16 = 16,
    /// 32 beat burst
    Burst32 = 32,
}

impl BurstLen {
    /// Number of beats
    #[must_use]
    pub const fn beats(self) -> u32 {
        self as u32
    }

    /// Convert a beat count to a burst length
    #[must_use]
    pub const fn from_beats(beats: u8) -> Option<Self> {
        match beats {
            1 => Some(BurstLen::Burst1),
            2 => Some(BurstLen::Burst2),
            4 => Some(BurstLen::Burst4),
            8 => Some(BurstLen::Burst8),
            16 => Some(BurstLen::Burst16),
            32 => Some(BurstLen::Burst32),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Descriptor preparation flags passed through to the engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PrepFlags: u32 {
        /// Raise a completion interrupt when the descriptor finishes
        const INTERRUPT = 1 << 0;
        /// Descriptor may be reused by the engine once acknowledged
        const CTRL_ACK = 1 << 1;
        /// Descriptor depends on the result of the previous one
        const FENCE = 1 << 5;
    }
}

impl PrepFlags {
    /// No flags
    pub const NONE: Self = Self::empty();
}

impl Default for PrepFlags {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PrepFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PrepFlags({=u32:#x})", self.bits());
    }
}

// =============================================================================
// Slave Configuration
// =============================================================================

/// Engine channel slave parameters applied before each descriptor request
///
/// # Example
///
/// ```ignore
/// let config = SlaveConfig::new()
///     .with_direction(TransferDirection::MemToDev)
///     .with_dst_addr(UART_FIFO)
///     .with_dst_width(BusWidth::Bytes1)
///     .with_dst_burst(BurstLen::Burst4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveConfig {
    /// Transaction direction
    pub direction: TransferDirection,
    /// Device source address (device-to-memory)
    pub src_addr: DmaAddr,
    /// Device destination address (memory-to-device)
    pub dst_addr: DmaAddr,
    /// Source bus width
    pub src_width: BusWidth,
    /// Destination bus width
    pub dst_width: BusWidth,
    /// Source max burst
    pub src_burst: BurstLen,
    /// Destination max burst
    pub dst_burst: BurstLen,
    /// Peripheral acts as flow controller
    pub device_flow_control: bool,
}

impl SlaveConfig {
    /// Create an empty slave configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            direction: TransferDirection::MemToDev,
            src_addr: 0,
            dst_addr: 0,
            src_width: BusWidth::Undefined,
            dst_width: BusWidth::Undefined,
            src_burst: BurstLen::Burst8,
            dst_burst: BurstLen::Burst8,
            device_flow_control: false,
        }
    }

    /// Set the transaction direction
    #[must_use]
    pub const fn with_direction(mut self, direction: TransferDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the device source address
    #[must_use]
    pub const fn with_src_addr(mut self, addr: DmaAddr) -> Self {
        self.src_addr = addr;
        self
    }

    /// Set the device destination address
    #[must_use]
    pub const fn with_dst_addr(mut self, addr: DmaAddr) -> Self {
        self.dst_addr = addr;
        self
    }

    /// Set the source bus width
    #[must_use]
    pub const fn with_src_width(mut self, width: BusWidth) -> Self {
        self.src_width = width;
        self
    }

    /// Set the destination bus width
    #[must_use]
    pub const fn with_dst_width(mut self, width: BusWidth) -> Self {
        self.dst_width = width;
        self
    }

    /// Set the source max burst
    #[must_use]
    pub const fn with_src_burst(mut self, burst: BurstLen) -> Self {
        self.src_burst = burst;
        self
    }

    /// Set the destination max burst
    #[must_use]
    pub const fn with_dst_burst(mut self, burst: BurstLen) -> Self {
        self.dst_burst = burst;
        self
    }

    /// Let the peripheral control the transfer length
    #[must_use]
    pub const fn with_device_flow_control(mut self, enabled: bool) -> Self {
        self.device_flow_control = enabled;
        self
    }
}

// =============================================================================
// Transfer Configuration
// =============================================================================

/// Per-transfer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct XferConfig {
    /// Slave parameters applied before descriptor preparation
    pub slave: SlaveConfig,
    /// Page size used to split segments into table entries
    pub page_size: usize,
}

impl Default for XferConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl XferConfig {
    /// Create a configuration with an empty slave config and the default page size
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slave: SlaveConfig::new(),
            page_size: PAGE_SIZE,
        }
    }

    /// Set the slave parameters
    #[must_use]
    pub const fn with_slave(mut self, slave: SlaveConfig) -> Self {
        self.slave = slave;
        self
    }

    /// Set the page size
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.page_size.is_power_of_two() {
            return Err(ConfigError::InvalidPageSize);
        }
        Ok(())
    }
}

// =============================================================================
// Packet Channel Configuration
// =============================================================================

/// Channel parameters a packet descriptor wires into its transfer
///
/// The descriptor kind decides which side of the slave config these land on:
/// inbound descriptors read from `fifo_addr`, outbound descriptors write to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketChannelConfig {
    /// Device FIFO address
    pub fifo_addr: DmaAddr,
    /// Device-side bus width
    pub bus_width: BusWidth,
    /// Device-side max burst
    pub burst: BurstLen,
    /// Flags used when preparing descriptors
    pub flags: PrepFlags,
    /// Page size for segment splitting
    pub page_size: usize,
}

impl Default for PacketChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketChannelConfig {
    /// Create a configuration with default bus width and burst
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fifo_addr: 0,
            bus_width: match BusWidth::from_bytes(DEFAULT_BUS_WIDTH_BYTES) {
                Some(width) => width,
                None => BusWidth::Bytes4,
            },
            burst: match BurstLen::from_beats(DEFAULT_MAX_BURST) {
                Some(burst) => burst,
                None => BurstLen::Burst8,
            },
            flags: PrepFlags::INTERRUPT.union(PrepFlags::CTRL_ACK),
            page_size: PAGE_SIZE,
        }
    }

    /// Set the device FIFO address
    #[must_use]
    pub const fn with_fifo_addr(mut self, addr: DmaAddr) -> Self {
        self.fifo_addr = addr;
        self
    }

    /// Set the bus width
    #[must_use]
    pub const fn with_bus_width(mut self, width: BusWidth) -> Self {
        self.bus_width = width;
        self
    }

    /// Set the max burst
    #[must_use]
    pub const fn with_burst(mut self, burst: BurstLen) -> Self {
        self.burst = burst;
        self
    }

    /// Set the descriptor preparation flags
    #[must_use]
    pub const fn with_flags(mut self, flags: PrepFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the page size
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}
