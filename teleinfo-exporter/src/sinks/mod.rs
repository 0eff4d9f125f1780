pub mod prometheus;

pub use prometheus::PrometheusGaugeSink;
