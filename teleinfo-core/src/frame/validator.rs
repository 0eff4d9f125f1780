use super::{checksum, ETX, LINE_SEPARATOR, STX};
use crate::{
    domain::RawFrame,
    error::{LineDefect, TeleinfoError},
};

/// Checks every line of `frame` and collects its label/value pairs.
///
/// The first malformed line or checksum mismatch rejects the whole frame.
pub fn validate(frame: &[u8]) -> Result<RawFrame, TeleinfoError> {
    let mut raw = RawFrame::new();

    for (idx, line) in split_lines(trim_frame(frame)).enumerate() {
        if line.is_empty() {
            continue;
        }
        let (label, value) = validate_line(idx + 1, line)?;
        if let Some(previous) = raw.insert(label.clone(), value) {
            tracing::warn!(%label, %previous, "duplicate label in frame, keeping last value");
        }
    }

    Ok(raw)
}

/// Strips the markers, the LF opening the first line and the CR closing the
/// last one. Other control bytes stay in place and fail that line's checks.
fn trim_frame(frame: &[u8]) -> &[u8] {
    let body = frame.strip_prefix(&[STX]).unwrap_or(frame);
    let body = body.strip_suffix(&[ETX]).unwrap_or(body);
    let body = body.strip_prefix(b"\n").unwrap_or(body);
    body.strip_suffix(LINE_SEPARATOR)
        .or_else(|| body.strip_suffix(b"\r"))
        .unwrap_or(body)
}

fn split_lines<'a>(body: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = Some(body);
    std::iter::from_fn(move || {
        let current = rest?;
        match current
            .windows(LINE_SEPARATOR.len())
            .position(|w| w == LINE_SEPARATOR)
        {
            Some(pos) => {
                rest = Some(&current[pos + LINE_SEPARATOR.len()..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Splits `LABEL SP VALUE SP CHECKSUM` and verifies the checksum.
///
/// Splitting stops after the second separator, so a space is a valid
/// checksum character.
fn validate_line(number: usize, line: &[u8]) -> Result<(String, String), TeleinfoError> {
    let malformed = |defect| TeleinfoError::MalformedLine { line: number, defect };

    let mut fields = line.splitn(3, |b| *b == b' ');
    let (label, value, found) = match (fields.next(), fields.next(), fields.next()) {
        (Some(label), Some(value), Some(found)) => (label, value, found),
        _ => return Err(malformed(LineDefect::FieldCount(token_count(line)))),
    };
    if label.is_empty() || value.is_empty() {
        return Err(malformed(LineDefect::EmptyField));
    }
    let found = match found {
        &[found] => found,
        rest => {
            let tokens = token_count(line);
            return Err(malformed(if tokens != 3 {
                LineDefect::FieldCount(tokens)
            } else {
                LineDefect::ChecksumWidth(rest.len())
            }));
        }
    };
    if !label.is_ascii() || !value.is_ascii() {
        return Err(malformed(LineDefect::NonAscii));
    }

    let label = String::from_utf8_lossy(label).into_owned();
    let expected = checksum(&line[..line.len() - 2]);
    if expected != found {
        return Err(TeleinfoError::ChecksumMismatch {
            line: number,
            label,
            expected: char::from(expected),
            found: char::from(found),
        });
    }

    Ok((label, String::from_utf8_lossy(value).into_owned()))
}

fn token_count(line: &[u8]) -> usize {
    line.split(|b| *b == b' ').filter(|f| !f.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Stage, frame::fixtures::REFERENCE_FRAME as FRAME};

    #[test]
    fn collects_every_label_of_a_valid_frame() {
        let raw = validate(FRAME).unwrap();

        assert_eq!(raw.len(), 10);
        assert_eq!(raw["ADCO"], "031762270346");
        assert_eq!(raw["OPTARIF"], "BASE");
        assert_eq!(raw["PTEC"], "TH..");
        assert_eq!(raw["PAPP"], "00390");
    }

    #[test]
    fn any_corrupted_checksum_rejects_the_frame() {
        // Every line ends with its checksum character followed by CR.
        let checksum_positions: Vec<usize> =
            (0..FRAME.len() - 1).filter(|&i| FRAME[i + 1] == b'\r').collect();
        assert_eq!(checksum_positions.len(), 10);

        for pos in checksum_positions {
            for replacement in [b'!', b'"', b'\r', b'\n'] {
                if FRAME[pos] == replacement {
                    continue;
                }
                let mut corrupted = FRAME.to_vec();
                corrupted[pos] = replacement;

                let err = validate(&corrupted).unwrap_err();
                assert!(
                    matches!(err, TeleinfoError::ChecksumMismatch { .. }),
                    "byte {pos} set to {replacement:#04x}: {err}"
                );
                assert_eq!(err.stage(), Stage::Validate);
            }
        }
    }

    #[test]
    fn control_byte_in_last_checksum_is_a_mismatch() {
        for frame in [
            &b"\x02\nIINST 002 Y\r\nMOTDETAT 000000 \n\r\x03"[..],
            &b"\x02\nIINST 002 Y\r\nMOTDETAT 000000 \r\r\x03"[..],
        ] {
            let err = validate(frame).unwrap_err();
            assert!(
                matches!(err, TeleinfoError::ChecksumMismatch { line: 2, expected: 'B', .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn two_token_line_is_malformed() {
        let err = validate(b"\x02\nIINST 002\r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                line: 1,
                defect: LineDefect::FieldCount(2)
            }
        ));
    }

    #[test]
    fn extra_token_is_malformed() {
        let err = validate(b"\x02\nIINST 002 Y Z\r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                defect: LineDefect::FieldCount(4),
                ..
            }
        ));
    }

    #[test]
    fn wide_checksum_is_reported_as_such() {
        let err = validate(b"\x02\nIINST 002 YZ\r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                defect: LineDefect::ChecksumWidth(2),
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "malformed line 1: checksum must be a single character, got 2"
        );
    }

    #[test]
    fn missing_checksum_is_a_field_count_defect() {
        let err = validate(b"\x02\nIINST 002 \r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                defect: LineDefect::FieldCount(2),
                ..
            }
        ));
    }

    #[test]
    fn doubled_separator_leaves_an_empty_field() {
        let err = validate(b"\x02\nIINST  002 Y\r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                defect: LineDefect::EmptyField,
                ..
            }
        ));
    }

    #[test]
    fn truncated_line_after_valid_ones_rejects_the_frame() {
        let err = validate(b"\x02\nIINST 002 Y\r\nIMAX\r\x03").unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                line: 2,
                defect: LineDefect::FieldCount(1)
            }
        ));
    }

    #[test]
    fn blank_lines_and_empty_frames_are_skipped() {
        assert!(validate(b"\x02\x03").unwrap().is_empty());
        assert!(validate(b"").unwrap().is_empty());

        let raw = validate(b"\x02\nIINST 002 Y\r\n\r\nIMAX 090 H\r\x03").unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn space_is_a_valid_checksum_character() {
        let raw = validate(b"\x02\nIINST 009  \r\x03").unwrap();
        assert_eq!(raw["IINST"], "009");
    }

    #[test]
    fn last_duplicate_label_wins() {
        let raw = validate(b"\x02\nIINST 002 Y\r\nIINST 003 Z\r\x03").unwrap();
        assert_eq!(raw["IINST"], "003");
    }

    #[test]
    fn non_ascii_value_is_malformed() {
        let err = validate("\x02\nPTEC H\u{e9} A\r\x03".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TeleinfoError::MalformedLine {
                defect: LineDefect::NonAscii,
                ..
            }
        ));
        assert_eq!(err.to_string(), "malformed line 1: non-ASCII label or value");
    }
}
