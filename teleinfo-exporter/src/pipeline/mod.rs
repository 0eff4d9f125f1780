use std::{
    io::BufRead,
    sync::{Arc, Mutex, PoisonError},
};

use teleinfo_core::{MeasurementRecord, SampleCollector, TeleinfoError};

use crate::sinks::PrometheusGaugeSink;

pub type DeviceCollector = SampleCollector<Box<dyn BufRead + Send>>;

struct ScrapeState {
    collector: DeviceCollector,
    sink: PrometheusGaugeSink,
}

/// Shared handle that serializes scrapes over the single device stream.
#[derive(Clone)]
pub struct Scraper {
    state: Arc<Mutex<ScrapeState>>,
}

impl Scraper {
    pub fn new(collector: DeviceCollector) -> Self {
        let sink = PrometheusGaugeSink::new(collector.descriptors());
        Self {
            state: Arc::new(Mutex::new(ScrapeState { collector, sink })),
        }
    }

    /// Reads one frame and publishes it. On failure the gauges keep their
    /// previous values and the error counter for the failing stage is bumped.
    ///
    /// Blocks for up to the device read timeout.
    pub fn scrape(&self) -> Result<MeasurementRecord, TeleinfoError> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let ScrapeState { collector, sink } = &mut *guard;

        match collector.get_sample() {
            Ok(record) => {
                collector.export(&record, sink);
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, stage = e.stage().as_str(), "teleinfo scrape failed");
                sink.record_error(e.stage());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::io::Cursor;
    use teleinfo_core::{
        exposition::MetricDescriptors,
        frame::{checksum, FrameExtractor, ETX, STX},
        Stage,
    };

    /// Encodes `pairs` as one teleinfo frame with valid checksums.
    fn encode_frame(pairs: &[(&str, &str)]) -> Vec<u8> {
        let mut frame = vec![STX];
        for (label, value) in pairs {
            let body = format!("{label} {value}");
            frame.push(b'\n');
            frame.extend_from_slice(body.as_bytes());
            frame.push(b' ');
            frame.push(checksum(body.as_bytes()));
            frame.push(b'\r');
        }
        frame.push(ETX);
        frame
    }

    fn reference_frame() -> Vec<u8> {
        encode_frame(&[
            ("ADCO", "031762270346"),
            ("OPTARIF", "BASE"),
            ("ISOUSC", "30"),
            ("BASE", "007640930"),
            ("PTEC", "TH.."),
            ("IINST", "002"),
            ("IMAX", "090"),
            ("PAPP", "00390"),
            ("HHPHC", "A"),
            ("MOTDETAT", "000000"),
        ])
    }

    fn collector(bytes: &[u8], namespace: &str) -> DeviceCollector {
        let source: Box<dyn BufRead + Send> = Box::new(Cursor::new(bytes.to_vec()));
        SampleCollector::new(source, FrameExtractor::default(), MetricDescriptors::new(namespace))
    }

    fn sample_value(rendered: &str, name: &str) -> Option<f64> {
        rendered
            .lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(' ')?.trim().parse().ok())
    }

    #[test]
    fn successful_scrape_publishes_all_gauges() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let record = metrics::with_local_recorder(&recorder, || {
            Scraper::new(collector(&reference_frame(), "teleinfo")).scrape()
        })
        .unwrap();
        assert_eq!(record.power_apparent, 390);

        let rendered = handle.render();
        assert_eq!(sample_value(&rendered, "teleinfo_index_kwh"), Some(7640930.0));
        assert_eq!(sample_value(&rendered, "teleinfo_intensity_instant_amp"), Some(2.0));
        assert_eq!(sample_value(&rendered, "teleinfo_intensity_max_amp"), Some(90.0));
        assert_eq!(sample_value(&rendered, "teleinfo_intensity_subscribed_amp"), Some(30.0));
        assert_eq!(sample_value(&rendered, "teleinfo_power_apparent_va"), Some(390.0));
        assert!(sample_value(&rendered, "teleinfo_collection_time_seconds").is_some());
    }

    #[test]
    fn failed_scrape_counts_the_stage_and_keeps_previous_values() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let mut stream = reference_frame();
        stream.extend_from_slice(b"\x02\nIINST 002 Z\r\x03");

        let second = metrics::with_local_recorder(&recorder, || {
            let scraper = Scraper::new(collector(&stream, "home"));
            scraper.scrape().unwrap();
            scraper.scrape()
        });
        assert_eq!(second.unwrap_err().stage(), Stage::Validate);

        let rendered = handle.render();
        assert_eq!(sample_value(&rendered, "home_intensity_instant_amp"), Some(2.0));
        let errors = rendered
            .lines()
            .find(|line| line.starts_with("home_scrape_errors_total{"))
            .expect("error counter rendered");
        assert!(errors.contains("stage=\"validate\""));
        assert!(errors.ends_with(" 1"));
    }

    #[test]
    fn clones_share_one_stream() {
        let recorder = PrometheusBuilder::new().build_recorder();

        let mut stream = reference_frame();
        stream.extend_from_slice(&encode_frame(&[("IINST", "003")]));

        metrics::with_local_recorder(&recorder, || {
            let scraper = Scraper::new(collector(&stream, "teleinfo"));
            let other = scraper.clone();

            assert_eq!(scraper.scrape().unwrap().intensity_instant, 2);
            assert_eq!(other.scrape().unwrap().intensity_instant, 3);
            assert!(scraper.scrape().unwrap_err().is_end_of_stream());
        });
    }
}
