use std::io::{self, BufRead, Read};

use super::{ETX, STX};
use crate::error::TeleinfoError;

pub const DEFAULT_MAX_FRAME_LEN: usize = 4096;

/// Pulls one `STX ... ETX` span off a live byte stream.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    max_frame_len: usize,
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameExtractor {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            max_frame_len: max_frame_len.max(1),
        }
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    /// Skips everything up to the next start marker, then returns the frame
    /// including both markers.
    ///
    /// Bytes consumed by a failed call are lost; the next call resynchronizes
    /// on the following start marker.
    pub fn extract<R: BufRead + ?Sized>(&self, source: &mut R) -> Result<Vec<u8>, TeleinfoError> {
        let mut skipped = Vec::new();
        self.read_through(source, STX, &mut skipped)?;
        if skipped.len() > 1 {
            tracing::debug!(bytes = skipped.len() - 1, "discarded partial frame before start marker");
        }

        let mut frame = Vec::with_capacity(256);
        frame.push(STX);
        self.read_through(source, ETX, &mut frame)?;
        Ok(frame)
    }

    fn read_through<R: BufRead + ?Sized>(
        &self,
        source: &mut R,
        marker: u8,
        buf: &mut Vec<u8>,
    ) -> Result<(), TeleinfoError> {
        let limit = self.max_frame_len as u64;
        let read = (&mut *source).take(limit).read_until(marker, buf)?;

        if read > 0 && buf.last() == Some(&marker) {
            return Ok(());
        }
        if read as u64 == limit {
            return Err(TeleinfoError::FrameOverflow {
                limit: self.max_frame_len,
            });
        }

        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended before marker {marker:#04x}"),
        )
        .into())
    }
}
