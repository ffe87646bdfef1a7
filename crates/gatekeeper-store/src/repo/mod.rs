pub mod pipeline;

pub use pipeline::{ImportStamp, PipelineRepo};
