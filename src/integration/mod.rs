//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): frame tokens over packet descriptors
//!   - `PacketRxToken` / `PacketTxToken`
//!   - `Timestamp` ↔ `smoltcp::time::Instant` conversions
//!   - Requires `smoltcp` feature
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::phy::TxToken;
//!
//! let token = desc.tx_token(Some(now.into()));
//! token.consume(len, |buf| build_frame(buf));
//! ```

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{PacketRxToken, PacketTxToken};
