use std::io::BufRead;

use anyhow::Result;
use teleinfo_core::{exposition::MetricDescriptors, frame::FrameExtractor, SampleCollector};
use teleinfo_exporter::{config::AppConfig, metrics_server, observability, sources, Scraper};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // The recorder must exist before the sink describes its gauges.
    let handle = metrics_server::install_recorder()?;

    let source: Box<dyn BufRead + Send> = Box::new(sources::open_device(&cfg.serial)?);
    let collector = SampleCollector::new(
        source,
        FrameExtractor::new(cfg.serial.max_frame_bytes),
        MetricDescriptors::new(&cfg.metrics.namespace),
    );
    let scraper = Scraper::new(collector);

    metrics_server::serve(&cfg.metrics.bind_addr, metrics_server::router(scraper, handle)).await
}
