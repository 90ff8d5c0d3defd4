//! Packet descriptors and their pool.
//!
//! A [`PacketDescriptor`] is the per-packet binding of a block, a
//! single-segment transfer and a caller-assigned id. Data moves between the
//! block and an external [`PacketBuffer`] with `copy_from` / `copy_to`.
//! Live descriptors for a channel are kept in a [`PacketPool`].
//!
//! # Example
//!
//! ```ignore
//! let channel = PacketChannelConfig::new().with_fifo_addr(RX_FIFO);
//! let mut pool = PacketPool::with_default_capacity()?;
//!
//! for (id, block) in rx_blocks.iter().enumerate() {
//!     pool.add(PacketDescriptor::new(&engine, block, id as u16, PacketKind::Inbound, &channel)?)?;
//! }
//!
//! let desc = pool.find_mut(3).ok_or(IoError::NotFound)?;
//! desc.prepare(None)?;
//! desc.start()?;
//! ```

mod buffer;
mod descriptor;
mod pool;

pub use buffer::{FrameBuffer, PacketBuffer, Timestamp};
pub use descriptor::{PacketDescriptor, PacketKind};
pub use pool::PacketPool;
