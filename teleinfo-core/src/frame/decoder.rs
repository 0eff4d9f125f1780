use std::{num::ParseIntError, str::FromStr};

use crate::{
    domain::{MeasurementRecord, RawFrame},
    error::TeleinfoError,
};

type Setter = fn(&mut MeasurementRecord, &str) -> Result<(), String>;

/// Labels this decoder understands and the record field each one fills.
static FIELDS: &[(&str, Setter)] = &[
    ("BASE", set_index),
    ("IINST", set_intensity_instant),
    ("IMAX", set_intensity_max),
    ("ISOUSC", set_intensity_subscribed),
    ("PAPP", set_power_apparent),
];

pub fn known_labels() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|(label, _)| *label)
}

/// Builds a record from validated label/value pairs.
///
/// Known labels missing from `raw` leave their field at zero. Unknown labels
/// are ignored. `collection_time` is left unset.
pub fn decode(raw: &RawFrame) -> Result<MeasurementRecord, TeleinfoError> {
    let mut record = MeasurementRecord::default();

    for (label, set) in FIELDS {
        if let Some(value) = raw.get(*label) {
            set(&mut record, value).map_err(|reason| TeleinfoError::Decode {
                label: label.to_string(),
                value: value.clone(),
                reason,
            })?;
        }
    }

    Ok(record)
}

/// Parses fixed-width, zero-padded decimal text.
fn parse_padded<T: FromStr<Err = ParseIntError>>(value: &str) -> Result<T, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not a decimal number".to_string());
    }
    value.parse().map_err(|e: ParseIntError| e.to_string())
}

fn set_index(record: &mut MeasurementRecord, value: &str) -> Result<(), String> {
    record.index = parse_padded(value)?;
    Ok(())
}

fn set_intensity_instant(record: &mut MeasurementRecord, value: &str) -> Result<(), String> {
    record.intensity_instant = parse_padded(value)?;
    Ok(())
}

fn set_intensity_max(record: &mut MeasurementRecord, value: &str) -> Result<(), String> {
    record.intensity_max = parse_padded(value)?;
    Ok(())
}

fn set_intensity_subscribed(record: &mut MeasurementRecord, value: &str) -> Result<(), String> {
    record.intensity_subscribed = parse_padded(value)?;
    Ok(())
}

fn set_power_apparent(record: &mut MeasurementRecord, value: &str) -> Result<(), String> {
    record.power_apparent = parse_padded(value)?;
    Ok(())
}
