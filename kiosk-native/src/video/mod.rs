//! GStreamer webcam pipeline and the camera handle the booth captures from.

pub mod pipeline;

pub use pipeline::{PipelineCamera, PipelineError, VideoPipeline};
