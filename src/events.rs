//! Interrupt → main-loop signalling.
//!
//! The only state shared with interrupt context is the one-shot timer's
//! expiry latch.  The timer callback is the single producer, the poll loop
//! the single consumer:
//!
//! ```text
//! ┌──────────────┐  raise()   ┌─────────────┐  take()   ┌──────────────┐
//! │ Timer ISR /  │──────────▶│ ExpiryFlag  │─────────▶│  Main Loop   │
//! │ esp_timer cb │            │ (AtomicBool)│           │  (consumer)  │
//! └──────────────┘            └─────────────┘           └──────────────┘
//! ```
//!
//! Re-arming the timer calls [`ExpiryFlag::clear`] so an expiry that raced
//! the re-arm is discarded (last-arm-wins).  A callback of the previous arm
//! can still be running on the other core and raise the flag after that
//! clear, so timers consume it with [`ExpiryFlag::take_settled`], which
//! ignores the flag while the current deadline is pending.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-slot, edge-triggered latch written from interrupt context.
pub struct ExpiryFlag(AtomicBool);

impl ExpiryFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Mark the deadline as passed.  Safe to call from ISR context.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume a pending expiry.  Returns `true` at most once per `raise`.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Like [`take`](Self::take), but reports nothing while `pending` (the
    /// current one-shot has not run out).  The flag is left raised; the
    /// real expiry raises it again anyway.
    pub fn take_settled(&self, pending: bool) -> bool {
        !pending && self.take()
    }

    /// Discard any pending expiry without reporting it.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Peek without consuming (diagnostics only).
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ExpiryFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Latch written by the hardware one-shot timer callback.
pub static TIMER_EXPIRED: ExpiryFlag = ExpiryFlag::new();
