pub mod annotate;
pub mod config;
pub mod detect;
pub mod display;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod stats;

// 重新导出常用类型和函数
pub use annotate::{Annotator, OverlayInfo, color_index, draw_detections};
pub use config::{AppConfig, StyleConfig};
pub use detect::{BoundingBox, Detection, Detector};
#[cfg(feature = "onnx")]
pub use detect::YoloDetector;
pub use display::{Action, Display, HeadlessDisplay};
pub use error::{CaptureError, ConfigError, DetectionError, OutputError, RenderError};
pub use output::OutputSink;
pub use pipeline::{LoopMode, Pipeline, RunOutcome, StopReason, compute_fps, should_detect};
pub use source::{Frame, FrameSource, ImageDirSource};
pub use stats::{SessionReport, SessionStats};
