use std::{
    env,
    io::{self, Write},
};

use anyhow::Result;
use serde::Serialize;
use teleinfo_core::{exposition::MetricDescriptors, frame::FrameExtractor, MeasurementRecord, SampleCollector};
use teleinfo_exporter::{
    config::{AppConfig, SerialConfig},
    observability, sources,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Serialize)]
struct DumpLine<'a> {
    sampled_at: String,
    #[serde(flatten)]
    record: &'a MeasurementRecord,
    collection_time_seconds: f64,
}

/// Print every decoded teleinfo frame as one JSON line.
///
/// Usage:
///   teleinfo-dump [device]
///
/// Without a device argument the `[serial]` section of the config is used.
fn main() -> Result<()> {
    observability::init_tracing();

    let serial = match env::args().nth(1) {
        Some(device) => SerialConfig::for_device(device),
        None => AppConfig::load()?.serial,
    };

    let source = sources::open_device(&serial)?;
    let mut collector = SampleCollector::new(
        source,
        FrameExtractor::new(serial.max_frame_bytes),
        MetricDescriptors::default(),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        match collector.get_sample() {
            Ok(record) => {
                let line = DumpLine {
                    sampled_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
                    record: &record,
                    collection_time_seconds: record.collection_time.as_secs_f64(),
                };
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
                out.flush()?;
            }
            Err(e) if e.is_end_of_stream() => {
                tracing::info!("teleinfo stream closed");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, stage = e.stage().as_str(), "skipping teleinfo frame");
            }
        }
    }

    Ok(())
}
