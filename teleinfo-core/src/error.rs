use std::io;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Validate,
    Decode,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Validate => "validate",
            Stage::Decode => "decode",
        }
    }
}

/// Why a line failed to split into `LABEL SP VALUE SP CHECKSUM`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefect {
    #[error("expected 3 fields, got {0}")]
    FieldCount(usize),
    #[error("checksum must be a single character, got {0}")]
    ChecksumWidth(usize),
    #[error("empty label or value")]
    EmptyField,
    #[error("non-ASCII label or value")]
    NonAscii,
}

#[derive(thiserror::Error, Debug)]
pub enum TeleinfoError {
    #[error("stream read failed: {0}")]
    StreamRead(#[from] io::Error),
    #[error("no frame marker within {limit} bytes")]
    FrameOverflow { limit: usize },
    #[error("malformed line {line}: {defect}")]
    MalformedLine { line: usize, defect: LineDefect },
    #[error("checksum mismatch on line {line} ({label}): expected {expected:?}, found {found:?}")]
    ChecksumMismatch {
        line: usize,
        label: String,
        expected: char,
        found: char,
    },
    #[error("invalid value {value:?} for {label}: {reason}")]
    Decode {
        label: String,
        value: String,
        reason: String,
    },
}

impl TeleinfoError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::StreamRead(_) | Self::FrameOverflow { .. } => Stage::Read,
            Self::MalformedLine { .. } | Self::ChecksumMismatch { .. } => Stage::Validate,
            Self::Decode { .. } => Stage::Decode,
        }
    }

    /// True when the source has no more bytes to give.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::StreamRead(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::StreamRead(e)
                if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
        )
    }
}
