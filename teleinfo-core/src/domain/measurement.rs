use std::{collections::BTreeMap, time::Duration};

/// Label/value pairs of one validated frame, keyed by label.
pub type RawFrame = BTreeMap<String, String>;

/// One decoded teleinfo frame.
///
/// A field whose label was missing from the frame stays at zero, so zero means
/// "absent or genuinely zero".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeasurementRecord {
    /// Cumulative energy index in kWh (`BASE`).
    pub index: u64,
    /// Instantaneous current in A (`IINST`).
    pub intensity_instant: u32,
    /// Maximum current in A (`IMAX`).
    pub intensity_max: u32,
    /// Subscribed current in A (`ISOUSC`).
    pub intensity_subscribed: u32,
    /// Apparent power in VA (`PAPP`).
    pub power_apparent: u32,
    /// Time spent reading and decoding this frame.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub collection_time: Duration,
}
