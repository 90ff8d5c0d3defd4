//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers used
//! throughout the transfer layer.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Geometry**: page size used to split segments into table entries
//! - **Bus defaults**: default slave bus width and burst for packet channels
//! - **Packets**: frame size bound for packet buffers
//! - **Pool sizing**: default packet descriptor pool capacity
//! - **Timing**: completion polling interval and timeout defaults

// =============================================================================
// Geometry
// =============================================================================

/// Default page size in bytes. No table entry ever crosses a boundary of this size.
pub const PAGE_SIZE: usize = 4096;

// =============================================================================
// Bus Defaults
// =============================================================================

/// Default device-side bus width for packet channels, in bytes
pub const DEFAULT_BUS_WIDTH_BYTES: u8 = 4;

/// Default maximum burst (in bus-width units) for packet channels
pub const DEFAULT_MAX_BURST: u8 = 8;

// =============================================================================
// Packets
// =============================================================================

/// Largest frame carried by a packet descriptor (Ethernet with VLAN tag)
pub const MAX_FRAME_SIZE: usize = 1522;

// =============================================================================
// Pool Sizing
// =============================================================================

/// Default number of descriptors reserved by [`PacketPool::with_default_capacity`]
///
/// [`PacketPool::with_default_capacity`]: crate::packet::PacketPool::with_default_capacity
pub const DEFAULT_POOL_CAPACITY: usize = 16;

// =============================================================================
// Timing
// =============================================================================

/// Interval between status queries in [`Operation::wait`](crate::Operation::wait), in microseconds
pub const DEFAULT_POLL_INTERVAL_US: u32 = 10;

/// Default completion timeout in microseconds
pub const DEFAULT_COMPLETION_TIMEOUT_US: u32 = 100_000;

// =============================================================================
// Status Codes
// =============================================================================

/// errno values used for the negative status codes returned by [`Error::code`](crate::Error::code)
pub mod errno {
    /// No such entry
    pub const ENOENT: i32 = 2;
    /// I/O error
    pub const EIO: i32 = 5;
    /// Out of memory
    pub const ENOMEM: i32 = 12;
    /// Bad address
    pub const EFAULT: i32 = 14;
    /// Device or resource busy
    pub const EBUSY: i32 = 16;
    /// Entry exists
    pub const EEXIST: i32 = 17;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
    /// Out of range
    pub const ERANGE: i32 = 34;
    /// Message too long
    pub const EMSGSIZE: i32 = 90;
    /// Operation not permitted in the current state
    pub const EPERM: i32 = 1;
    /// No buffer space available
    pub const ENOBUFS: i32 = 105;
    /// Connection timed out
    pub const ETIMEDOUT: i32 = 110;
    /// Operation canceled by the engine
    pub const ECANCELED: i32 = 125;
}
