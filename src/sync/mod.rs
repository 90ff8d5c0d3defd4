//! Synchronization and Concurrency Support
//!
//! Nothing in the transfer layer locks internally. This module adds the
//! wrappers for sharing state with the engine's completion interrupt:
//!
//! - **Primitives** (`primitives`)
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - [`AtomicWaker`] - waker slot filled by a future, drained by the interrupt
//!
//! - **Shared Wrappers** (`shared`)
//!   - [`SharedPool`] - critical-section protected packet pool
//!
//! - **Async Support** (`asynch`)
//!   - [`CompletionFuture`] - awaits a [`Completion`](crate::xfer::Completion)
//!   - [`finish`] - awaits a transfer's completion and reports its status
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables `primitives` and `shared`
//! - `async`: Enables `asynch` (also enables `critical-section`)

mod primitives;

#[cfg(feature = "async")]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedPool;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::{CompletionFuture, finish};
