//! 后处理模块
//!
//! 负责解析模型输出，进行坐标转换、置信度过滤和非极大值抑制(NMS)。

use ndarray::{ArrayView3, Axis};

use crate::config::DETECTIONS_CAPACITY;
use crate::detect::bounds::{BoundingBox, Detection};
use crate::detect::labels::label_for;
use crate::error::DetectionError;

/// 模型输出张量的排布方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[1, 4 + C, N]`：YOLOv8导出格式，前4行是 cx, cy, w, h，其余是各类别得分
    ChannelsFirst,
    /// `[1, N, 5|6]`：每行 x1, y1, x2, y2, score[, class]
    RowMajor,
}

impl OutputLayout {
    /// 根据输出形状推断排布
    pub fn infer(shape: &[usize]) -> Result<Self, DetectionError> {
        if shape.len() != 3 || shape[0] != 1 {
            return Err(DetectionError::Input(format!("模型输出形状不符合预期: {shape:?}")));
        }
        match (shape[1], shape[2]) {
            (_, 5..=7) => Ok(OutputLayout::RowMajor),
            (rows, _) if rows > 4 => Ok(OutputLayout::ChannelsFirst),
            _ => Err(DetectionError::Input(format!("模型输出形状不符合预期: {shape:?}"))),
        }
    }
}

/// 图像缩放信息，用于把模型坐标映射回原始帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMessage {
    pub o_width: u32,
    pub o_height: u32,
    pub s_width: usize,
    pub s_height: usize,
}

impl ScaleMessage {
    fn factors(&self) -> (f32, f32) {
        (
            self.o_width as f32 / self.s_width as f32,
            self.o_height as f32 / self.s_height as f32,
        )
    }
}

/// 处理模型输出，应用置信度和NMS阈值
///
/// # 参数
/// * `output` - 模型输出，形状为 `[1, a, b]`
/// * `message` - 原始帧与模型输入的尺寸
/// * `confidence_threshold` - 置信度阈值
/// * `nms_threshold` - NMS阈值
///
/// # 返回值
/// 按置信度降序排列的检测结果
pub fn process_detections(
    output: ArrayView3<f32>,
    message: &ScaleMessage,
    confidence_threshold: f32,
    nms_threshold: f32,
) -> Result<Vec<Detection>, DetectionError> {
    let layout = OutputLayout::infer(output.shape())?;
    let table = output.index_axis(Axis(0), 0);
    let (scale_x, scale_y) = message.factors();

    let mut detections = Vec::new();
    match layout {
        OutputLayout::RowMajor => {
            for row in table.axis_iter(Axis(0)) {
                let score = row[4];
                if score < confidence_threshold {
                    continue;
                }
                let class_id = if row.len() > 5 { row[5].max(0.0) as usize } else { 0 };
                let bbox = BoundingBox::new(row[0], row[1], row[2], row[3]).scale(scale_x, scale_y);
                detections.push(Detection::new(bbox, label_for(class_id), score, class_id));
            }
        }
        OutputLayout::ChannelsFirst => {
            for column in table.axis_iter(Axis(1)) {
                let scores = column.slice(ndarray::s![4..]);
                let Some((class_id, &score)) = scores
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                else {
                    continue;
                };
                if score < confidence_threshold {
                    continue;
                }
                let bbox = BoundingBox::from_center(column[0], column[1], column[2], column[3])
                    .scale(scale_x, scale_y);
                detections.push(Detection::new(bbox, label_for(class_id), score, class_id));
            }
        }
    }

    detections.retain(|d| d.bbox.is_valid());
    detections.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept = apply_nms(detections, nms_threshold);
    kept.truncate(DETECTIONS_CAPACITY);
    Ok(kept)
}

/// 应用非极大值抑制
///
/// 输入需已按置信度降序排列；只在同一类别内互相抑制。
fn apply_nms(detections: Vec<Detection>, nms_threshold: f32) -> Vec<Detection> {
    let mut result: Vec<Detection> = Vec::with_capacity(detections.len());

    for candidate in detections {
        let suppressed = result.iter().any(|kept| {
            kept.class_id == candidate.class_id && kept.bbox.iou(&candidate.bbox) >= nms_threshold
        });
        if !suppressed {
            result.push(candidate);
        }
    }

    result
}
