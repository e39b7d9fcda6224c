pub mod ports;

pub use ports::{DatasetSink, PageFetcher};
