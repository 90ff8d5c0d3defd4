//! smoltcp Network Stack Integration
//!
//! Lets a [`PacketDescriptor`] back the frame tokens of a
//! [smoltcp](https://docs.rs/smoltcp) `Device` implementation. Both tokens
//! copy through a stack [`FrameBuffer`] sized for one Ethernet frame.
//!
//! # Example
//!
//! ```ignore
//! impl Device for Nic {
//!     type RxToken<'a> = PacketRxToken<'a, 'static, Channel> where Self: 'a;
//!     type TxToken<'a> = PacketTxToken<'a, 'static, Channel> where Self: 'a;
//!
//!     fn transmit(&mut self, now: Instant) -> Option<Self::TxToken<'_>> {
//!         let desc = self.tx_pool.find_mut(TX_ID)?;
//!         Some(desc.tx_token(Some(now.into())))
//!     }
//!     // ...
//! }
//! ```
//!
//! Errors inside `consume` cannot be returned to smoltcp. A failed receive
//! hands the consumer an empty frame; a failed transmit is dropped and the
//! stack retries.

use smoltcp::time::Instant;

use crate::driver::engine::DmaEngine;
use crate::driver::error::Result;
use crate::internal::constants::MAX_FRAME_SIZE;
use crate::internal::fmt::dma_debug;
use crate::packet::{FrameBuffer, PacketBuffer, PacketDescriptor, Timestamp};

// =============================================================================
// Timestamps
// =============================================================================

impl From<Timestamp> for Instant {
    fn from(ts: Timestamp) -> Self {
        Instant::from_micros(ts.as_micros() as i64)
    }
}

impl From<Instant> for Timestamp {
    /// Instants before the epoch clamp to [`Timestamp::ZERO`]
    fn from(instant: Instant) -> Self {
        Timestamp::from_micros(instant.total_micros().max(0) as u64)
    }
}

// =============================================================================
// RX Token
// =============================================================================

/// Receive token copying one frame out of a descriptor's block
pub struct PacketRxToken<'d, 'a, E: DmaEngine> {
    desc: &'d mut PacketDescriptor<'a, E>,
    timestamp: Option<Timestamp>,
}

impl<E: DmaEngine> smoltcp::phy::RxToken for PacketRxToken<'_, '_, E> {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        let mut frame = FrameBuffer::<MAX_FRAME_SIZE>::new();
        match self.desc.copy_from(&mut frame, self.timestamp) {
            Ok(_) => f(frame.data()),
            Err(e) => {
                dma_debug!("rx token for packet {} dropped: {}", self.desc.id(), e);
                f(&[])
            }
        }
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token copying one frame into a descriptor's block and starting it
pub struct PacketTxToken<'d, 'a, E: DmaEngine> {
    desc: &'d mut PacketDescriptor<'a, E>,
    timestamp: Option<Timestamp>,
}

impl<E: DmaEngine> PacketTxToken<'_, '_, E> {
    fn send(self, frame: &mut FrameBuffer<MAX_FRAME_SIZE>) -> Result<()> {
        self.desc.recycle()?;
        self.desc.copy_to(frame, self.timestamp)?;
        self.desc.prepare(None)?;
        self.desc.start()
    }
}

impl<E: DmaEngine> smoltcp::phy::TxToken for PacketTxToken<'_, '_, E> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let mut frame = FrameBuffer::<MAX_FRAME_SIZE>::new();
        let result = match frame.put(len.min(MAX_FRAME_SIZE)) {
            Some(buf) => f(buf),
            None => f(&mut []),
        };

        let id = self.desc.id();
        if let Err(e) = self.send(&mut frame) {
            dma_debug!("tx token for packet {} dropped: {}", id, e);
        }
        result
    }
}

// =============================================================================
// Token Constructors
// =============================================================================

impl<'a, E: DmaEngine> PacketDescriptor<'a, E> {
    /// Receive token over this descriptor, stamping frames with `timestamp`
    pub fn rx_token(&mut self, timestamp: Option<Timestamp>) -> PacketRxToken<'_, 'a, E> {
        PacketRxToken {
            desc: self,
            timestamp,
        }
    }

    /// Transmit token over this descriptor, stamping frames with `timestamp`
    pub fn tx_token(&mut self, timestamp: Option<Timestamp>) -> PacketTxToken<'_, 'a, E> {
        PacketTxToken {
            desc: self,
            timestamp,
        }
    }
}
