//! Teleinfo wire format: frame extraction, per-line checksum validation and
//! decoding into a [`MeasurementRecord`](crate::MeasurementRecord).
//!
//! A frame is `STX`, a sequence of `LABEL SP VALUE SP CHECKSUM` lines
//! separated by CR LF, then `ETX`.

pub mod decoder;
pub mod extractor;
pub mod validator;

pub use decoder::decode;
pub use extractor::FrameExtractor;
pub use validator::validate;

/// Start of frame.
pub const STX: u8 = 0x02;
/// End of frame.
pub const ETX: u8 = 0x03;
pub const LINE_SEPARATOR: &[u8] = b"\r\n";

/// Checksum character for the bytes of a line preceding its final
/// `SP CHECKSUM` pair: the low 6 bits of the byte sum, offset into printable
/// ASCII.
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (sum & 0x3F) + 0x20
}
