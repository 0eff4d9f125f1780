//! Mapping from a [`MeasurementRecord`] to named numeric observations.

use crate::domain::MeasurementRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    KilowattHours,
    Amperes,
    VoltAmperes,
    Seconds,
}

impl MetricUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            MetricUnit::KilowattHours => "kWh",
            MetricUnit::Amperes => "A",
            MetricUnit::VoltAmperes => "VA",
            MetricUnit::Seconds => "s",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: &'static str,
    pub unit: MetricUnit,
}

impl MetricDescriptor {
    fn new(namespace: &str, suffix: &str, unit: MetricUnit, help: &'static str) -> Self {
        Self {
            name: format!("{namespace}_{suffix}"),
            help,
            unit,
        }
    }
}

/// The six gauges published for every sample, named under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptors {
    namespace: String,
    pub index: MetricDescriptor,
    pub intensity_instant: MetricDescriptor,
    pub intensity_max: MetricDescriptor,
    pub intensity_subscribed: MetricDescriptor,
    pub power_apparent: MetricDescriptor,
    pub collection_time: MetricDescriptor,
}

impl Default for MetricDescriptors {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMESPACE)
    }
}

impl MetricDescriptors {
    pub const DEFAULT_NAMESPACE: &'static str = "teleinfo";

    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            index: MetricDescriptor::new(
                namespace,
                "index_kwh",
                MetricUnit::KilowattHours,
                "Current value of index in kilowatt.hour",
            ),
            intensity_instant: MetricDescriptor::new(
                namespace,
                "intensity_instant_amp",
                MetricUnit::Amperes,
                "Current intensity demand in ampere",
            ),
            intensity_max: MetricDescriptor::new(
                namespace,
                "intensity_max_amp",
                MetricUnit::Amperes,
                "Max intensity in ampere",
            ),
            intensity_subscribed: MetricDescriptor::new(
                namespace,
                "intensity_subscribed_amp",
                MetricUnit::Amperes,
                "Subscribed intensity in ampere",
            ),
            power_apparent: MetricDescriptor::new(
                namespace,
                "power_apparent_va",
                MetricUnit::VoltAmperes,
                "Current apparent power in volt.ampere",
            ),
            collection_time: MetricDescriptor::new(
                namespace,
                "collection_time_seconds",
                MetricUnit::Seconds,
                "Teleinfo data collection duration in seconds",
            ),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        [
            &self.index,
            &self.intensity_instant,
            &self.intensity_max,
            &self.intensity_subscribed,
            &self.power_apparent,
            &self.collection_time,
        ]
        .into_iter()
    }

    pub fn observations(&self, record: &MeasurementRecord) -> [Observation<'_>; 6] {
        [
            Observation::new(&self.index, record.index as f64),
            Observation::new(&self.intensity_instant, f64::from(record.intensity_instant)),
            Observation::new(&self.intensity_max, f64::from(record.intensity_max)),
            Observation::new(&self.intensity_subscribed, f64::from(record.intensity_subscribed)),
            Observation::new(&self.power_apparent, f64::from(record.power_apparent)),
            Observation::new(&self.collection_time, record.collection_time.as_secs_f64()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    pub descriptor: &'a MetricDescriptor,
    pub value: f64,
}

impl<'a> Observation<'a> {
    pub fn new(descriptor: &'a MetricDescriptor, value: f64) -> Self {
        Self { descriptor, value }
    }
}

/// Destination for observations, e.g. a metrics recorder.
pub trait ObservationSink {
    fn observe(&mut self, observation: &Observation<'_>);
}

impl ObservationSink for Vec<(String, f64)> {
    fn observe(&mut self, observation: &Observation<'_>) {
        self.push((observation.descriptor.name.clone(), observation.value));
    }
}
