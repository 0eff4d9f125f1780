use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    EnvFilter,
};

fn directive(s: &str) -> Directive {
    s.parse().unwrap_or_else(|_| LevelFilter::INFO.into())
}

pub fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive(directive("teleinfo_exporter=info"))
        .add_directive(directive("teleinfo_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
