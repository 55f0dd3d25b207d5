use crate::detect::bounds::Detection;
use crate::error::DetectionError;
use crate::source::Frame;

/// 检测能力的窄接口
///
/// 给定一帧图像和置信度阈值，返回带标签的检测框列表。内部失败通过
/// `DetectionError` 返回，由调用方决定如何降级。实现必须在有限时间内返回。
pub trait Detector {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>, DetectionError>;

    /// 后端名称，用于日志
    fn name(&self) -> &str {
        "detector"
    }
}

impl<T: Detector + ?Sized> Detector for Box<T> {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>, DetectionError> {
        (**self).detect(frame, confidence_threshold)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(feature = "onnx")]
pub use yolo::YoloDetector;

#[cfg(feature = "onnx")]
mod yolo {
    use std::path::Path;
    use std::time::Instant;

    use ort::session::Session;
    use tracing::debug;

    use super::Detector;
    use crate::detect::bounds::Detection;
    use crate::detect::infer::run_inference;
    use crate::detect::model::load_model;
    use crate::detect::posts::{ScaleMessage, process_detections};
    use crate::detect::prevs::{image_to_tensor, resize_image};
    use crate::error::DetectionError;
    use crate::source::Frame;

    /// YOLO目标检测器
    ///
    /// 封装了完整的检测流程，包括图像预处理、模型推理和结果后处理。
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use livedet::detect::YoloDetector;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let detector = YoloDetector::from_path(Path::new("yolov8m.onnx"), 640, 640)?
    ///     .with_nms_threshold(0.45);
    /// # Ok(())
    /// # }
    /// ```
    pub struct YoloDetector {
        /// ONNX模型会话
        model: Session,
        input_width: usize,
        input_height: usize,
        /// NMS（非极大值抑制）阈值，用于去除重复检测
        nms_threshold: f32,
    }

    impl YoloDetector {
        pub fn new(model: Session, input_width: usize, input_height: usize) -> Self {
            Self {
                model,
                input_width,
                input_height,
                nms_threshold: 0.45,
            }
        }

        pub fn from_path(path: &Path, input_width: usize, input_height: usize) -> Result<Self, ort::Error> {
            Ok(Self::new(load_model(path)?, input_width, input_height))
        }

        pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
            self.nms_threshold = threshold;
            self
        }
    }

    impl Detector for YoloDetector {
        fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> Result<Vec<Detection>, DetectionError> {
            let image = frame.image();
            let resized = resize_image(image, self.input_width as u32, self.input_height as u32);
            let input_tensor = image_to_tensor(&resized);

            let start_time = Instant::now();
            let output = run_inference(&mut self.model, &input_tensor)?;
            debug!(elapsed = ?start_time.elapsed(), "模型推理完成");

            let message = ScaleMessage {
                o_width: image.width(),
                o_height: image.height(),
                s_width: self.input_width,
                s_height: self.input_height,
            };
            process_detections(output.view(), &message, confidence_threshold, self.nms_threshold)
        }

        fn name(&self) -> &str {
            "yolo-onnx"
        }
    }
}
