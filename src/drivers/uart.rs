//! UART channel to the companion Wi-Fi module.
//!
//! 9600 8N1, no flow control.  The link polls this channel once per loop
//! iteration and moves at most one byte each way, so the driver only has
//! to answer "is a byte waiting" and "can I send one more".
//!
//! On non-espidf targets the channel is an in-memory pair of queues the
//! simulation and tests script directly.

use crate::error::HwError;
use crate::link::TransportIo;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

/// Driver-side receive ring size (bytes).
#[cfg(target_os = "espidf")]
const RX_RING_SIZE: i32 = 256;

#[cfg(target_os = "espidf")]
pub struct UartChannel {
    port: uart_port_t,
}

#[cfg(target_os = "espidf")]
impl UartChannel {
    /// Install the UART driver on `port` and route it to the given pins.
    pub fn new(port: i32, tx_gpio: i32, rx_gpio: i32, baud: u32) -> Result<Self, HwError> {
        let port = port as uart_port_t;
        let cfg = uart_config_t {
            baud_rate: baud as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };
        // SAFETY: plain driver calls on a port this channel takes ownership of;
        // every pointer argument outlives its call.
        unsafe {
            check(uart_param_config(port, &cfg))?;
            check(uart_set_pin(port, tx_gpio, rx_gpio, -1, -1))?;
            check(uart_driver_install(
                port,
                RX_RING_SIZE,
                0,
                0,
                core::ptr::null_mut(),
                0,
            ))?;
        }
        info!("uart: port {} up at {} baud (tx={}, rx={})", port, baud, tx_gpio, rx_gpio);
        Ok(Self { port })
    }
}

#[cfg(target_os = "espidf")]
fn check(rc: esp_err_t) -> Result<(), HwError> {
    if rc == ESP_OK {
        Ok(())
    } else {
        Err(HwError::UartInitFailed(rc))
    }
}

#[cfg(target_os = "espidf")]
impl TransportIo for UartChannel {
    type Error = HwError;

    fn ready_to_receive(&mut self) -> bool {
        let mut len: usize = 0;
        // SAFETY: driver installed in `new`; `len` outlives the call.
        let rc = unsafe { uart_get_buffered_data_len(self.port, &mut len) };
        rc == ESP_OK && len > 0
    }

    fn read_byte(&mut self) -> Result<u8, HwError> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero-tick timeout (never blocks).
        let n = unsafe {
            uart_read_bytes(self.port, (&raw mut byte).cast(), 1, 0)
        };
        if n == 1 { Ok(byte) } else { Err(HwError::UartIo(n)) }
    }

    fn ready_to_transmit(&mut self) -> bool {
        // SAFETY: zero-tick wait only polls the TX-done status.
        unsafe { uart_wait_tx_done(self.port, 0) == ESP_OK }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), HwError> {
        // SAFETY: one-byte buffer; the FIFO is empty per `ready_to_transmit`.
        let n = unsafe { uart_write_bytes(self.port, (&raw const byte).cast(), 1) };
        if n == 1 { Ok(()) } else { Err(HwError::UartIo(n)) }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for UartChannel {
    fn drop(&mut self) {
        // SAFETY: the driver was installed in `new` and is not used after this.
        unsafe {
            uart_driver_delete(self.port);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// In-memory stand-in for the module UART.
#[cfg(not(target_os = "espidf"))]
pub struct UartChannel {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    tx_ready: bool,
}

#[cfg(not(target_os = "espidf"))]
impl UartChannel {
    pub fn new(port: i32, tx_gpio: i32, rx_gpio: i32, baud: u32) -> Result<Self, HwError> {
        log::info!(
            "uart(sim): port {} at {} baud (tx={}, rx={})",
            port,
            baud,
            tx_gpio,
            rx_gpio
        );
        Ok(Self::loopback())
    }

    /// A channel with nothing queued and the transmitter ready.
    pub fn loopback() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            tx_ready: true,
        }
    }

    /// Queue bytes as if the module had sent them.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Everything written since the last call.
    pub fn take_written(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }

    /// Simulate a busy transmitter.
    pub fn set_tx_ready(&mut self, ready: bool) {
        self.tx_ready = ready;
    }

    pub fn rx_pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(not(target_os = "espidf"))]
impl TransportIo for UartChannel {
    type Error = HwError;

    fn ready_to_receive(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, HwError> {
        self.rx.pop_front().ok_or(HwError::UartIo(-1))
    }

    fn ready_to_transmit(&mut self) -> bool {
        self.tx_ready
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), HwError> {
        self.tx.push(byte);
        Ok(())
    }
}
