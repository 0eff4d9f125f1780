use std::{io::BufRead, time::Instant};

use crate::{
    domain::MeasurementRecord,
    error::TeleinfoError,
    exposition::{MetricDescriptors, Observation, ObservationSink},
    frame::{self, FrameExtractor},
};

/// Runs one extract/validate/decode cycle per call against a single stream.
///
/// `get_sample` takes `&mut self`; callers sharing a collector must serialize
/// access since interleaved reads would split frames.
pub struct SampleCollector<R> {
    source: R,
    extractor: FrameExtractor,
    descriptors: MetricDescriptors,
}

impl<R: BufRead> SampleCollector<R> {
    pub fn new(source: R, extractor: FrameExtractor, descriptors: MetricDescriptors) -> Self {
        Self {
            source,
            extractor,
            descriptors,
        }
    }

    pub fn with_defaults(source: R) -> Self {
        Self::new(source, FrameExtractor::default(), MetricDescriptors::default())
    }

    pub fn get_sample(&mut self) -> Result<MeasurementRecord, TeleinfoError> {
        let start = Instant::now();

        let bytes = self.extractor.extract(&mut self.source)?;
        let raw = frame::validate(&bytes)?;
        let mut record = frame::decode(&raw)?;
        record.collection_time = start.elapsed();

        tracing::debug!(
            index = record.index,
            intensity_instant = record.intensity_instant,
            power_apparent = record.power_apparent,
            elapsed_ms = record.collection_time.as_millis() as u64,
            "decoded teleinfo frame"
        );
        Ok(record)
    }

    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    pub fn observations(&self, record: &MeasurementRecord) -> [Observation<'_>; 6] {
        self.descriptors.observations(record)
    }

    /// Emits the six observations of `record` into `sink`.
    pub fn export<S: ObservationSink + ?Sized>(&self, record: &MeasurementRecord, sink: &mut S) {
        for observation in self.observations(record) {
            sink.observe(&observation);
        }
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}
