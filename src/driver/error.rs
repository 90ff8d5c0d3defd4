//! Error types for the DMA transfer layer
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Invalid arguments and incomplete configuration
//! - [`DmaError`]: Allocation, scatter-gather, mapping and engine failures
//! - [`IoError`]: Completion, packet copy and lookup failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most methods. [`Error::code`] gives the negative status code for
//! callers that speak errno.

use crate::internal::constants::errno;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid argument and configuration errors
///
/// Returned before any state is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Argument out of range or otherwise unusable
    InvalidArgument,
    /// Segment offset is not inside the block
    InvalidOffset,
    /// Transfer has no segments to map
    EmptyTransfer,
    /// Page size is zero or not a power of two
    InvalidPageSize,
    /// Cyclic parameters were not set before preparing a cyclic transfer
    MissingCyclicInfo,
    /// Copy parameters were not set before preparing a flat copy
    MissingMemcpyInfo,
    /// Engine rejected the slave configuration
    SlaveConfigRejected,
    /// Packet identifier already present in the pool
    DuplicateId,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidArgument => "invalid argument",
            ConfigError::InvalidOffset => "offset outside block",
            ConfigError::EmptyTransfer => "transfer has no segments",
            ConfigError::InvalidPageSize => "invalid page size",
            ConfigError::MissingCyclicInfo => "cyclic parameters not set",
            ConfigError::MissingMemcpyInfo => "copy parameters not set",
            ConfigError::SlaveConfigRejected => "slave configuration rejected",
            ConfigError::DuplicateId => "duplicate packet id",
        }
    }

    /// Negative status code for this error
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidArgument
            | ConfigError::InvalidPageSize
            | ConfigError::SlaveConfigRejected => -errno::EINVAL,
            ConfigError::InvalidOffset => -errno::ERANGE,
            ConfigError::EmptyTransfer => -errno::ENOENT,
            ConfigError::MissingCyclicInfo | ConfigError::MissingMemcpyInfo => -errno::EFAULT,
            ConfigError::DuplicateId => -errno::EEXIST,
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Scatter-gather, mapping and engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Structure or buffer allocation failed
    AllocFailed,
    /// A segment spans no pages
    SegmentationFailed,
    /// Scatter-gather table allocation failed
    TableAllocFailed,
    /// Populated entry count differs from the sized table
    LengthMismatch,
    /// Engine mapped fewer entries than requested
    MappingFailed,
    /// Engine returned no descriptor
    DescriptorPrepFailed,
    /// Engine refused the descriptor on submission
    SubmitRejected,
    /// Call made out of map → prepare → start order
    InvalidState,
    /// Transfer is still in flight
    Busy,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::AllocFailed => "allocation failed",
            DmaError::SegmentationFailed => "segment spans no pages",
            DmaError::TableAllocFailed => "scatter-gather table allocation failed",
            DmaError::LengthMismatch => "scatter-gather length mismatch",
            DmaError::MappingFailed => "scatter-gather mapping failed",
            DmaError::DescriptorPrepFailed => "descriptor preparation failed",
            DmaError::SubmitRejected => "descriptor submission rejected",
            DmaError::InvalidState => "invalid transfer state",
            DmaError::Busy => "transfer in flight",
        }
    }

    /// Negative status code for this error
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            DmaError::AllocFailed | DmaError::TableAllocFailed => -errno::ENOMEM,
            DmaError::SegmentationFailed => -errno::EINVAL,
            DmaError::LengthMismatch => -errno::EMSGSIZE,
            DmaError::MappingFailed => -errno::EFAULT,
            DmaError::DescriptorPrepFailed => -errno::ENOBUFS,
            DmaError::SubmitRejected => -errno::EIO,
            DmaError::InvalidState => -errno::EPERM,
            DmaError::Busy => -errno::EBUSY,
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Completion, copy and lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
    /// Engine reported an error for at least one transfer
    TransferFailed,
    /// Packet buffer has no room for the block contents
    BufferTooSmall,
    /// Packet data does not fit in the block
    FrameTooLarge,
    /// No descriptor with the requested identifier
    NotFound,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::TransferFailed => "transfer failed",
            IoError::BufferTooSmall => "buffer too small for block",
            IoError::FrameTooLarge => "frame too large for block",
            IoError::NotFound => "packet not found",
        }
    }

    /// Negative status code for this error
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            IoError::Timeout => -errno::ETIMEDOUT,
            IoError::TransferFailed => -errno::ECANCELED,
            IoError::BufferTooSmall => -errno::ENOBUFS,
            IoError::FrameTooLarge => -errno::EMSGSIZE,
            IoError::NotFound => -errno::ENOENT,
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match xfer.map_tx() {
///     Err(Error::Dma(DmaError::SegmentationFailed)) => { /* ... */ }
///     Err(Error::Dma(DmaError::MappingFailed)) => { /* ... */ }
///     Err(Error::Config(ConfigError::EmptyTransfer)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl Error {
    /// Negative status code for this error
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Error::Config(e) => e.code(),
            Error::Dma(e) => e.code(),
            Error::Io(e) => e.code(),
        }
    }

    /// Human-readable description of the wrapped error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::Config(e) => e.as_str(),
            Error::Dma(e) => e.as_str(),
            Error::Io(e) => e.as_str(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl core::error::Error for Error {}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for transfer operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
