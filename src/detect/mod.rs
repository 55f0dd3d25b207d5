//! 目标检测模块
//!
//! 检测器在流水线中是一个不透明的能力：给定一帧，返回带标签、置信度的检测框。
//! 这里提供：
//! - `Detector`：检测能力的trait，可以替换后端（包括测试用的桩实现）
//! - `YoloDetector`：基于ONNX Runtime的YOLO实现（`onnx` 特性）
//! - 图像预处理（prevs）与模型输出后处理（posts）
//!
//! # 工作流程
//!
//! 1. 把帧缩放到模型输入尺寸并转换为NCHW张量
//! 2. 运行推理
//! 3. 解析输出、按阈值过滤、坐标映射回原始帧、NMS

pub mod bounds;
pub mod detector;
pub mod labels;
pub mod posts;
pub mod prevs;

#[cfg(feature = "onnx")]
pub mod infer;
#[cfg(feature = "onnx")]
pub mod model;

pub use bounds::{BoundingBox, Detection};
pub use detector::Detector;
#[cfg(feature = "onnx")]
pub use detector::YoloDetector;
