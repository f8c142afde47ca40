//! Raspberry Pi wiring for the Waveshare HAT: `/dev/spidev*` plus sysfs GPIO.

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use tracing::info;

use super::DisplayError;
use super::epd7in5::Epd7in5;
use crate::config::DisplaySettings;

/// SPI clock used by the vendor driver.
const SPI_SPEED_HZ: u32 = 4_000_000;

pub type LinuxEpd = Epd7in5<SpidevDevice, SysfsPin, SysfsPin, SysfsPin, Delay>;

/// Open the SPI device and export the BUSY, DC and RST lines.
pub fn open(settings: &DisplaySettings) -> Result<LinuxEpd, DisplayError> {
    let mut spi = SpidevDevice::open(&settings.spi_device)
        .map_err(|e| DisplayError::Spi(format!("{}: {e:?}", settings.spi_device)))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).map_err(|e| DisplayError::Spi(e.to_string()))?;

    let busy = export_pin(settings.busy_pin, Direction::In)?;
    let dc = export_pin(settings.dc_pin, Direction::Out)?;
    let rst = export_pin(settings.rst_pin, Direction::Out)?;

    info!(
        spi = %settings.spi_device,
        busy = settings.busy_pin,
        dc = settings.dc_pin,
        rst = settings.rst_pin,
        "Opened Waveshare panel"
    );
    Ok(Epd7in5::new(spi, busy, dc, rst, Delay))
}

fn export_pin(
    number: u64,
    direction: Direction,
) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(number);
    pin.export().map_err(|e| DisplayError::Pin(format!("gpio{number}: {e}")))?;
    pin.set_direction(direction)
        .map_err(|e| DisplayError::Pin(format!("gpio{number}: {e}")))?;
    Ok(pin)
}
