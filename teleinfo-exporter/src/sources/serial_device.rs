use std::{io::BufReader, path::PathBuf};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::config::SerialConfig;

pub type DeviceReader = BufReader<Box<dyn SerialPort>>;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to open teleinfo device {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: serialport::Error,
    },
}

/// Opens the meter's serial line as 7 data bits, even parity, 1 stop bit,
/// in raw mode so CR bytes reach the validator untranslated.
///
/// Reads that see no byte within the configured timeout fail with
/// `TimedOut`.
pub fn open_device(config: &SerialConfig) -> Result<DeviceReader, SourceError> {
    let port = serialport::new(config.device.to_string_lossy(), config.baud_rate)
        .data_bits(DataBits::Seven)
        .parity(Parity::Even)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout())
        .open()
        .map_err(|source| SourceError::Open {
            path: config.device.clone(),
            source,
        })?;

    tracing::info!(
        device = %config.device.display(),
        baud_rate = config.baud_rate,
        timeout_ms = config.read_timeout().as_millis() as u64,
        "opened teleinfo device"
    );
    Ok(BufReader::new(port))
}
