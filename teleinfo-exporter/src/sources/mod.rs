pub mod serial_device;

pub use serial_device::{open_device, DeviceReader, SourceError};
