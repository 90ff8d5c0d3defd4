//! Packet buffers and hardware timestamps.

/// Hardware timestamp attached to a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Whole seconds
    pub secs: u64,
    /// Nanoseconds within the second (always below one billion)
    pub nanos: u32,
}

const NANOS_PER_SEC: u64 = 1_000_000_000;

impl Timestamp {
    /// Zero timestamp
    pub const ZERO: Self = Self { secs: 0, nanos: 0 };

    /// Create a timestamp, carrying excess nanoseconds into seconds
    #[must_use]
    pub const fn new(secs: u64, nanos: u32) -> Self {
        let carry = nanos as u64 / NANOS_PER_SEC;
        Self {
            secs: secs.saturating_add(carry),
            nanos: (nanos as u64 % NANOS_PER_SEC) as u32,
        }
    }

    /// Create from a nanosecond count
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            secs: nanos / NANOS_PER_SEC,
            nanos: (nanos % NANOS_PER_SEC) as u32,
        }
    }

    /// Create from a microsecond count
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self {
            secs: micros / 1_000_000,
            nanos: ((micros % 1_000_000) * 1_000) as u32,
        }
    }

    /// Total nanoseconds (saturating)
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.secs
            .saturating_mul(NANOS_PER_SEC)
            .saturating_add(self.nanos as u64)
    }

    /// Total microseconds (saturating)
    #[must_use]
    pub const fn as_micros(&self) -> u64 {
        self.secs
            .saturating_mul(1_000_000)
            .saturating_add(self.nanos as u64 / 1_000)
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Network packet buffer that descriptors copy into and out of
pub trait PacketBuffer {
    /// Grow the data region by `len` bytes and return the new tail
    ///
    /// Returns `None` if the buffer cannot hold `len` more bytes.
    fn put(&mut self, len: usize) -> Option<&mut [u8]>;

    /// Current data region
    fn data(&self) -> &[u8];

    /// Attach a hardware timestamp
    fn set_hw_timestamp(&mut self, timestamp: Timestamp);
}

/// Fixed-capacity packet buffer
///
/// Holds up to `N` bytes inline; no allocation.
#[derive(Clone)]
pub struct FrameBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
    timestamp: Option<Timestamp>,
}

impl<const N: usize> FrameBuffer<N> {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            timestamp: None,
        }
    }

    /// Create a buffer holding a copy of `data`
    ///
    /// Returns `None` if `data` is longer than `N`.
    #[must_use]
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let mut frame = Self::new();
        frame.put(data.len())?.copy_from_slice(data);
        Some(frame)
    }

    /// Number of bytes held
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no bytes
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bytes
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hardware timestamp, if one was attached
    #[inline(always)]
    pub const fn hw_timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// Drop the contents and the timestamp
    pub fn clear(&mut self) {
        self.len = 0;
        self.timestamp = None;
    }
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacketBuffer for FrameBuffer<N> {
    fn put(&mut self, len: usize) -> Option<&mut [u8]> {
        let end = self.len.checked_add(len).filter(|&end| end <= N)?;
        let tail = &mut self.buf[self.len..end];
        self.len = end;
        Some(tail)
    }

    fn data(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn set_hw_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = Some(timestamp);
    }
}

impl<const N: usize> core::fmt::Debug for FrameBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.len)
            .field("capacity", &N)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
