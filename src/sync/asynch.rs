//! Async completion support.
//!
//! The engine's completion interrupt calls [`Notifier::notify`], which wakes
//! whichever task is awaiting the matching [`Completion`].
//!
//! [`Notifier::notify`]: crate::xfer::Notifier::notify

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use crate::driver::engine::{DmaEngine, DmaStatus};
use crate::driver::error::{IoError, Result};
use crate::xfer::{Completion, Transfer};

/// Future resolving on the next signal of a [`Completion`]
///
/// Consumes the signal when it resolves.
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct CompletionFuture {
    completion: &'static Completion,
}

impl CompletionFuture {
    /// Wait on `completion`
    pub fn new(completion: &'static Completion) -> Self {
        Self { completion }
    }
}

impl Future for CompletionFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.completion.take() {
            return Poll::Ready(());
        }
        self.completion.register(cx.waker());
        // Signal may have landed between the check and the registration
        if self.completion.take() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Await `completion`, then report the transfer's final status
///
/// The completion must be the one attached when `xfer` was prepared.
/// Returns [`IoError::TransferFailed`] if the engine reports an error.
pub async fn finish<E: DmaEngine>(
    xfer: &mut Transfer<'_, E>,
    completion: &'static Completion,
) -> Result<()> {
    loop {
        match xfer.poll()? {
            DmaStatus::Complete => return Ok(()),
            DmaStatus::Error => return Err(IoError::TransferFailed.into()),
            DmaStatus::InProgress => completion.wait().await,
        }
    }
}
