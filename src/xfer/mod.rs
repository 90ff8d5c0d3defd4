//! Transfers.
//!
//! A [`Transfer`] drives one engine descriptor through
//! build table, map, prepare, submit and poll. It supports three modes:
//!
//! - segmented: descriptor built from the mapped scatter-gather table
//! - cyclic: repeating descriptor over a fixed device ring ([`Transfer::set_cyclic`])
//! - flat copy: single source/destination range ([`Transfer::set_memcpy`])
//!
//! Completion is observed by polling ([`Transfer::poll`]) or through a
//! [`Completion`] whose [`Notifier`] is attached to the descriptor.

mod completion;
mod transfer;

pub use completion::{Completion, Notifier};
pub use transfer::{Transfer, XferMode, XferState};
