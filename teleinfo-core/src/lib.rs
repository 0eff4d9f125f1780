pub mod collector;
pub mod domain;
pub mod error;
pub mod exposition;
pub mod frame;

pub use collector::SampleCollector;
pub use domain::MeasurementRecord;
pub use error::{LineDefect, Stage, TeleinfoError};
