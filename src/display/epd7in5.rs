//! Blocking UC8179 driver for the Waveshare 7.5" V2 e-paper panel (800x480).
//!
//! The driver is generic over `embedded-hal` 1.0 traits so it runs on any
//! host that provides an SPI device, three GPIO lines and a delay. On a
//! Raspberry Pi these come from `linux-embedded-hal`, see
//! [`display::linux`](super).
//!
//! # Frame Format
//!
//! [`Canvas`] bytes are already in the controller's layout (MSB first,
//! set bit = white). The old-frame RAM (`0x10`) receives them unchanged and
//! the new-frame RAM (`0x13`) receives the inverted bytes, which is what the
//! controller's KW mode expects for black-on-white output.
//!
//! # Busy Handling
//!
//! The BUSY line reads low while the controller works. Waits poll it every
//! [`BUSY_POLL_MS`] (re-issuing `GET_STATUS` each time) and give up after the
//! configured timeout instead of hanging the refresh loop.

use embedded_graphics::prelude::Size;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use tracing::debug;

use super::{DisplayError, Panel, check_frame_size};
use crate::canvas::Canvas;
use crate::config::SCREEN_SIZE;

// UC8179 commands
const PANEL_SETTING: u8 = 0x00;
const POWER_SETTING: u8 = 0x01;
const POWER_OFF: u8 = 0x02;
const POWER_ON: u8 = 0x04;
const BOOSTER_SOFT_START: u8 = 0x06;
const DEEP_SLEEP: u8 = 0x07;
const DATA_START_OLD: u8 = 0x10;
const DISPLAY_REFRESH: u8 = 0x12;
const DATA_START_NEW: u8 = 0x13;
const DUAL_SPI: u8 = 0x15;
const VCOM_DATA_INTERVAL: u8 = 0x50;
const TCON_SETTING: u8 = 0x60;
const RESOLUTION: u8 = 0x61;
const GET_STATUS: u8 = 0x71;

/// Deep sleep only latches with this check code.
const DEEP_SLEEP_CHECK: u8 = 0xA5;

/// Interval between BUSY polls.
pub const BUSY_POLL_MS: u32 = 10;

/// Default upper bound for one busy wait. A full refresh takes about 4 s.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Largest data burst per SPI write (spidev's default buffer size).
const MAX_CHUNK: usize = 4096;

/// Waveshare 7.5" V2 panel.
pub struct Epd7in5<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    busy_timeout_ms: u32,
    awake: bool,
}

impl<SPI, BUSY, DC, RST, DELAY> Epd7in5<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Wrap the bus and pins. The panel stays untouched until [`Panel::init`].
    pub const fn new(
        spi: SPI,
        busy: BUSY,
        dc: DC,
        rst: RST,
        delay: DELAY,
    ) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            delay,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            awake: false,
        }
    }

    #[must_use]
    pub const fn with_busy_timeout(
        mut self,
        timeout_ms: u32,
    ) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    pub const fn is_awake(&self) -> bool { self.awake }

    /// Hardware reset pulse: high 20 ms, low 2 ms, high 20 ms.
    fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(pin_error)?;
        self.delay.delay_ms(20);
        self.rst.set_low().map_err(pin_error)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(pin_error)?;
        self.delay.delay_ms(20);
        Ok(())
    }

    fn command(
        &mut self,
        command: u8,
    ) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(pin_error)?;
        self.spi.write(&[command]).map_err(spi_error)
    }

    fn data(
        &mut self,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(pin_error)?;
        for chunk in data.chunks(MAX_CHUNK) {
            self.spi.write(chunk).map_err(spi_error)?;
        }
        Ok(())
    }

    fn command_with_data(
        &mut self,
        command: u8,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        self.command(command)?;
        self.data(data)
    }

    /// Poll BUSY until the controller is idle or the timeout expires.
    fn wait_until_idle(&mut self) -> Result<(), DisplayError> {
        let mut waited = 0;
        loop {
            self.command(GET_STATUS)?;
            if self.busy.is_high().map_err(pin_error)? {
                return Ok(());
            }
            if waited >= self.busy_timeout_ms {
                return Err(DisplayError::BusyTimeout(waited));
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited += BUSY_POLL_MS;
        }
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Panel for Epd7in5<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn size(&self) -> Size { SCREEN_SIZE }

    fn init(&mut self) -> Result<(), DisplayError> {
        debug!("epd: init");
        self.reset()?;

        self.command_with_data(BOOSTER_SOFT_START, &[0x17, 0x17, 0x28, 0x17])?;
        self.command_with_data(POWER_SETTING, &[0x07, 0x07, 0x28, 0x17])?;
        self.command(POWER_ON)?;
        self.delay.delay_ms(100);
        self.wait_until_idle()?;

        // KW mode, scan up, shift right, booster on
        self.command_with_data(PANEL_SETTING, &[0x1F])?;
        // 800 x 480
        self.command_with_data(RESOLUTION, &[0x03, 0x20, 0x01, 0xE0])?;
        self.command_with_data(DUAL_SPI, &[0x00])?;
        self.command_with_data(VCOM_DATA_INTERVAL, &[0x10, 0x07])?;
        self.command_with_data(TCON_SETTING, &[0x22])?;

        self.awake = true;
        Ok(())
    }

    fn display(
        &mut self,
        frame: &Canvas,
    ) -> Result<(), DisplayError> {
        if !self.awake {
            return Err(DisplayError::Asleep);
        }
        check_frame_size(SCREEN_SIZE, frame)?;

        debug!(bytes = frame.as_bytes().len(), "epd: display");
        self.command_with_data(DATA_START_OLD, frame.as_bytes())?;

        let inverted: Vec<u8> = frame.as_bytes().iter().map(|b| !b).collect();
        self.command_with_data(DATA_START_NEW, &inverted)?;

        self.command(DISPLAY_REFRESH)?;
        self.delay.delay_ms(100);
        self.wait_until_idle()
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        debug!("epd: sleep");
        self.command(POWER_OFF)?;
        self.wait_until_idle()?;
        self.command_with_data(DEEP_SLEEP, &[DEEP_SLEEP_CHECK])?;
        self.awake = false;
        Ok(())
    }
}

fn spi_error<E: core::fmt::Debug>(error: E) -> DisplayError { DisplayError::Spi(format!("{error:?}")) }

fn pin_error<E: core::fmt::Debug>(error: E) -> DisplayError { DisplayError::Pin(format!("{error:?}")) }

// =============================================================================
// Unit Tests
// =============================================================================
