//! DMA Transfer Orchestration
//!
//! A `no_std` layer that turns caller-owned memory blocks into scatter-gather
//! transfers and drives them through an asynchronous DMA engine.
//!
//! The crate does not program hardware. Channel drivers implement
//! [`DmaEngine`] and this crate handles everything above it: page-bounded
//! segmentation, table construction, mapping, descriptor preparation,
//! submission, completion tracking and release.
//!
//! # Architecture
//!
//! 1. **Memory** ([`block`], [`sg`]): buffer blocks, segments and the
//!    scatter-gather table built from them
//! 2. **Transfers** ([`xfer`], [`op`]): the per-transfer state machine and
//!    ordered groups started together
//! 3. **Packets** ([`packet`]): one block plus one transfer per packet, a pool
//!    keyed by packet id, and copies to and from network packet buffers
//!
//! ```text
//! Created ─build─▶ TableBuilt ─map─▶ Mapped ─prepare─▶ Prepared ─start─▶ Submitted
//!    ▲                                                                      │
//!    └──────────────────────────── release ◀── Completed / Failed ◀─ poll ─┘
//! ```
//!
//! # Features
//!
//! - `defmt`: Log through `defmt` and derive `defmt::Format` for public types
//! - `log`: Log through the `log` facade
//! - `smoltcp`: smoltcp frame tokens over packet descriptors
//! - `critical-section`: ISR-safe `SharedPool` wrapper
//! - `async`: Awaitable completions with wakers
//!
//! # Example
//!
//! ```ignore
//! use ph_dma_xfer::{Completion, Operation, PrepFlags, Segment, SimpleBlock, Transfer, XferConfig};
//!
//! static DONE: Completion = Completion::new();
//!
//! let block = SimpleBlock::alloc(4100)?;
//! let mut xfer = Transfer::new(&channel, XferConfig::new())?;
//! xfer.add_segment(Segment::new(&block, 50)?)?;
//!
//! xfer.map_tx()?;
//! xfer.prepare_tx(PrepFlags::INTERRUPT, Some(DONE.notifier()))?;
//!
//! let mut op = Operation::new();
//! op.add(&mut xfer)?;
//! op.start()?;
//! op.wait(&mut delay, 100_000)?;
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

extern crate alloc;

// =============================================================================
// Modules
// =============================================================================

pub mod block;
pub mod driver;
pub mod op;
pub mod packet;
pub mod sg;
pub mod xfer;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use block::{BufferSource, DmaBlock, ExternalBlock, SimpleBlock};
pub use driver::config::{
    BurstLen, BusWidth, DataDirection, DmaAddr, PacketChannelConfig, PrepFlags, SlaveConfig,
    TransferDirection, XferConfig,
};
pub use driver::engine::{Cookie, CyclicInfo, DmaEngine, DmaStatus, MemcpyInfo};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use op::Operation;
pub use packet::{FrameBuffer, PacketBuffer, PacketDescriptor, PacketKind, PacketPool, Timestamp};
pub use sg::{Chunk, Chunks, Segment, SgAddr, SgEntry, SgTable};
pub use xfer::{Completion, Notifier, Transfer, XferMode, XferState};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedPool};

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::asynch::CompletionFuture;

/// Shared crate constants.
///
/// Grouped into a dedicated module to keep the top-level facade focused on
/// transfer types.
pub mod constants {
    // Geometry
    pub use crate::internal::constants::PAGE_SIZE;

    // Bus defaults
    pub use crate::internal::constants::{DEFAULT_BUS_WIDTH_BYTES, DEFAULT_MAX_BURST};

    // Packets
    pub use crate::internal::constants::{DEFAULT_POOL_CAPACITY, MAX_FRAME_SIZE};

    // Timing
    pub use crate::internal::constants::{DEFAULT_COMPLETION_TIMEOUT_US, DEFAULT_POLL_INTERVAL_US};

    // Status codes
    pub use crate::internal::constants::errno;
}
