//! One-shot notification timers.
//!
//! - [`EspNotificationTimer`]: ESP-IDF `esp_timer` one-shot.  The callback
//!   runs in the esp_timer task and only raises
//!   [`TIMER_EXPIRED`](crate::events::TIMER_EXPIRED).
//! - [`SoftTimer`]: deadline compared against a clock the caller advances.
//!   Used on host for simulation and tests.
//!
//! Both honour the [`NotificationTimer`] contract: re-arming discards the
//! previous deadline and any expiry not yet taken.

use crate::app::ports::NotificationTimer;
use crate::events::ExpiryFlag;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

#[cfg(target_os = "espidf")]
use crate::error::HwError;
#[cfg(target_os = "espidf")]
use crate::events::TIMER_EXPIRED;

// ───────────────────────────────────────────────────────────────
// ESP-IDF one-shot
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn expiry_cb(_arg: *mut core::ffi::c_void) {
    TIMER_EXPIRED.raise();
}

/// Notification timer backed by an `esp_timer` one-shot.
#[cfg(target_os = "espidf")]
pub struct EspNotificationTimer {
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
impl EspNotificationTimer {
    /// Create the timer.  It is not armed.
    pub fn new() -> Result<Self, HwError> {
        let args = esp_timer_create_args_t {
            callback: Some(expiry_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"door_notify".as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call; `handle` is written on success.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK {
            return Err(HwError::TimerInitFailed(ret));
        }
        TIMER_EXPIRED.clear();
        info!("hw_timer: notification timer ready");
        Ok(Self { handle })
    }
}

#[cfg(target_os = "espidf")]
impl NotificationTimer for EspNotificationTimer {
    fn arm(&mut self, duration_ms: u32) {
        // SAFETY: `handle` is a live timer created in `new`.  Stopping an
        // idle timer returns ESP_ERR_INVALID_STATE, which is expected.
        unsafe {
            esp_timer_stop(self.handle);
        }
        TIMER_EXPIRED.clear();
        let timeout_us = u64::from(duration_ms.max(1)) * 1_000;
        // SAFETY: as above.
        let ret = unsafe { esp_timer_start_once(self.handle, timeout_us) };
        if ret != ESP_OK {
            warn!("hw_timer: start_once failed (rc={}), expiring now", ret);
            TIMER_EXPIRED.raise();
        }
    }

    fn fired(&mut self) -> bool {
        // SAFETY: `handle` is a live timer created in `new`.
        let pending = unsafe { esp_timer_is_active(self.handle) };
        TIMER_EXPIRED.take_settled(pending)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for EspNotificationTimer {
    fn drop(&mut self) {
        // SAFETY: `handle` is live; it is not used after delete.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Software deadline timer
// ───────────────────────────────────────────────────────────────

/// Notification timer driven by [`SoftTimer::advance_to`].
pub struct SoftTimer {
    now_ms: u32,
    deadline_ms: Option<u32>,
    expired: ExpiryFlag,
}

impl SoftTimer {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            deadline_ms: None,
            expired: ExpiryFlag::new(),
        }
    }

    /// Move the clock forward and latch an expiry if the deadline passed.
    pub fn advance_to(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        if let Some(deadline) = self.deadline_ms {
            // Wrapping compare: the deadline is at most i32::MAX ms ahead.
            if now_ms.wrapping_sub(deadline) as i32 >= 0 {
                self.deadline_ms = None;
                self.expired.raise();
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }
}

impl Default for SoftTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationTimer for SoftTimer {
    fn arm(&mut self, duration_ms: u32) {
        self.expired.clear();
        self.deadline_ms = Some(self.now_ms.wrapping_add(duration_ms));
    }

    fn fired(&mut self) -> bool {
        self.expired.take_settled(self.is_armed())
    }
}
