//! Engine-facing building blocks.
//!
//! - [`config`] - Slave, transfer and packet-channel configuration
//! - [`engine`] - The [`DmaEngine`] collaborator trait and its token types
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use ph_dma_xfer::driver::{SlaveConfig, TransferDirection, XferConfig};
//!
//! let config = XferConfig::new().with_slave(
//!     SlaveConfig::new().with_direction(TransferDirection::MemToDev),
//! );
//! ```

// Submodules
pub mod config;
pub mod engine;
pub mod error;

// Re-exports for convenience
pub use config::{
    BurstLen, BusWidth, DataDirection, DmaAddr, PacketChannelConfig, PrepFlags, SlaveConfig,
    TransferDirection, XferConfig,
};
pub use engine::{Cookie, CyclicInfo, DmaEngine, DmaStatus, MemcpyInfo};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
