//! Completion notification.
//!
//! The engine signals completion from its own context, typically an interrupt
//! handler. It is handed a [`Notifier`] and nothing else: a `Copy` handle
//! whose only operation is [`Notifier::notify`]. The thread side owns the
//! [`Completion`] and observes it by polling, by taking the flag, or (with the
//! `async` feature) by awaiting [`Completion::wait`].

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(feature = "async")]
use crate::sync::AtomicWaker;

/// Single-shot completion flag with an event counter
///
/// # Example
///
/// ```ignore
/// static RX_DONE: Completion = Completion::new();
///
/// xfer.prepare_rx(PrepFlags::INTERRUPT, Some(RX_DONE.notifier()))?;
/// xfer.start()?;
///
/// while !RX_DONE.take() {}
/// ```
pub struct Completion {
    done: AtomicBool,
    events: AtomicU32,
    #[cfg(feature = "async")]
    waker: AtomicWaker,
}

impl Completion {
    /// Create an unsignalled completion (const, suitable for statics)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
            events: AtomicU32::new(0),
            #[cfg(feature = "async")]
            waker: AtomicWaker::new(),
        }
    }

    /// Handle to give to the engine
    #[must_use]
    pub fn notifier(&'static self) -> Notifier {
        Notifier { completion: self }
    }

    /// Check if the completion has been signalled
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Consume the signal, returning whether it was set
    #[inline]
    pub fn take(&self) -> bool {
        self.done.swap(false, Ordering::AcqRel)
    }

    /// Clear the signal without consuming it
    #[inline]
    pub fn reset(&self) {
        self.done.store(false, Ordering::Release);
    }

    /// Total number of notifications received (wraps)
    ///
    /// Cyclic transfers notify once per period.
    #[inline]
    #[must_use]
    pub fn events(&self) -> u32 {
        self.events.load(Ordering::Relaxed)
    }

    fn signal(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
        self.done.store(true, Ordering::Release);
        #[cfg(feature = "async")]
        self.waker.wake();
    }

    /// Wait for the next signal
    #[cfg(feature = "async")]
    pub fn wait(&'static self) -> crate::sync::asynch::CompletionFuture {
        crate::sync::asynch::CompletionFuture::new(self)
    }

    #[cfg(feature = "async")]
    pub(crate) fn register(&self, waker: &core::task::Waker) {
        self.waker.register(waker);
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Completion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.is_complete())
            .field("events", &self.events())
            .finish_non_exhaustive()
    }
}

/// Engine-side handle to a [`Completion`]
///
/// Safe to call from interrupt context. It cannot reach the transfer that
/// owns the descriptor.
#[derive(Clone, Copy)]
pub struct Notifier {
    completion: &'static Completion,
}

impl Notifier {
    /// Signal completion
    #[inline]
    pub fn notify(&self) {
        self.completion.signal();
    }

    /// Check if two notifiers signal the same completion
    #[must_use]
    pub fn same_as(&self, other: &Notifier) -> bool {
        core::ptr::eq(self.completion, other.completion)
    }
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Notifier")
            .field(&(self.completion as *const Completion))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_sets_flag_and_counts() {
        static DONE: Completion = Completion::new();
        let notifier = DONE.notifier();

        assert!(!DONE.is_complete());
        notifier.notify();
        notifier.notify();
        assert!(DONE.is_complete());
        assert_eq!(DONE.events(), 2);

        assert!(DONE.take());
        assert!(!DONE.take());
        assert_eq!(DONE.events(), 2);
    }

    #[test]
    fn reset_clears_flag() {
        static DONE: Completion = Completion::new();
        DONE.notifier().notify();
        DONE.reset();
        assert!(!DONE.is_complete());
    }

    #[test]
    fn notifier_identity() {
        static A: Completion = Completion::new();
        static B: Completion = Completion::new();
        assert!(A.notifier().same_as(&A.notifier()));
        assert!(!A.notifier().same_as(&B.notifier()));
    }
}
