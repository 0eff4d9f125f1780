use metrics::Unit;
use teleinfo_core::{
    exposition::{MetricDescriptors, MetricUnit, Observation, ObservationSink},
    Stage,
};

/// `metrics` has no electrical units; those gauges carry their unit in the
/// name and help text only.
fn recorder_unit(unit: MetricUnit) -> Option<Unit> {
    match unit {
        MetricUnit::Seconds => Some(Unit::Seconds),
        MetricUnit::KilowattHours | MetricUnit::Amperes | MetricUnit::VoltAmperes => None,
    }
}

/// Publishes observations as gauges on the installed `metrics` recorder.
///
/// Must be built after the recorder is installed so the descriptions land on
/// it.
pub struct PrometheusGaugeSink {
    scrape_errors: String,
}

impl PrometheusGaugeSink {
    pub fn new(descriptors: &MetricDescriptors) -> Self {
        for descriptor in descriptors.iter() {
            match recorder_unit(descriptor.unit) {
                Some(unit) => metrics::describe_gauge!(descriptor.name.clone(), unit, descriptor.help),
                None => metrics::describe_gauge!(descriptor.name.clone(), descriptor.help),
            }
        }

        let scrape_errors = format!("{}_scrape_errors_total", descriptors.namespace());
        metrics::describe_counter!(
            scrape_errors.clone(),
            "Teleinfo samples that failed to read, validate or decode"
        );

        Self { scrape_errors }
    }

    pub fn record_error(&self, stage: Stage) {
        metrics::counter!(self.scrape_errors.clone(), "stage" => stage.as_str()).increment(1);
    }
}

impl ObservationSink for PrometheusGaugeSink {
    fn observe(&mut self, observation: &Observation<'_>) {
        metrics::gauge!(observation.descriptor.name.clone()).set(observation.value);
    }
}
