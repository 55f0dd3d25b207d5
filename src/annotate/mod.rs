//! 画面标注
//!
//! 纯渲染：输入帧、检测结果和样式，输出新的帧，不修改任何流水线状态。

mod canvas;
pub mod font;

pub use canvas::Canvas;

use crate::config::{Rgb, StyleConfig};
use crate::detect::Detection;
use crate::error::RenderError;
use crate::source::Frame;

use font::{pixel_scale, text_size};

const WHITE: Rgb = [255, 255, 255];
const GREEN: Rgb = [0, 255, 0];
const YELLOW: Rgb = [255, 255, 0];
const RED: Rgb = [255, 0, 0];

/// 检测框按序号轮流取色（与类别无关）
///
/// 调色板为空时返回0，由配置校验保证不会出现这种情况。
pub fn color_index(index: usize, palette_size: usize) -> usize {
    if palette_size == 0 { 0 } else { index % palette_size }
}

/// 叠加层上显示的运行信息
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInfo<'a> {
    pub fps: f64,
    /// 当前帧上绘制的检测框数量
    pub detection_count: usize,
    pub model_name: &'a str,
    pub paused: bool,
}

pub struct Annotator {
    style: StyleConfig,
}

impl Annotator {
    pub fn new(style: StyleConfig) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    fn color_for(&self, index: usize) -> Rgb {
        self.style
            .palette
            .get(color_index(index, self.style.palette.len()))
            .copied()
            .unwrap_or(WHITE)
    }

    /// 绘制检测框和标签
    ///
    /// 每个检测框使用调色板中第 `序号 % 调色板大小` 个颜色；标签背景为同色实心矩形，
    /// 大小刚好容纳文本 `label: score%`，文字为白色。坐标先截断为整数像素，
    /// 再限制在画布外1像素以内。
    pub fn draw_detections(&self, canvas: &mut Canvas, detections: &[Detection]) {
        let scale = pixel_scale(self.style.font_scale);

        for (idx, detection) in detections.iter().enumerate() {
            let (xmin, ymin, xmax, ymax) = detection.bbox.to_pixels_within(canvas.width(), canvas.height());
            let color = self.color_for(idx);

            canvas.stroke_rect(xmin, ymin, xmax, ymax, color, self.style.line_thickness);

            let text = detection.caption(self.style.show_confidence);
            let (text_w, text_h) = text_size(&text, scale);
            canvas.fill_rect(
                xmin,
                ymin.saturating_sub(text_h).saturating_sub(10),
                xmin.saturating_add(text_w).saturating_add(5),
                ymin,
                color,
            );
            canvas.draw_text(xmin + 2, ymin.saturating_sub(5).saturating_sub(text_h), &text, scale, WHITE);
        }
    }

    /// 按样式开关绘制FPS、检测数量、模型名称、暂停标记和帮助提示
    pub fn draw_overlay(&self, canvas: &mut Canvas, info: &OverlayInfo<'_>) {
        let style = &self.style;
        let small = pixel_scale(0.5);
        let medium = pixel_scale(0.7);

        let line = |canvas: &mut Canvas, baseline: i32, text: &str, scale: i32, color: Rgb| {
            let (_, h) = text_size(text, scale);
            canvas.draw_text(10, baseline.saturating_sub(h), text, scale, color);
        };

        if style.show_fps {
            line(canvas, 30, &format!("FPS: {:.1}", info.fps), medium, GREEN);
        }
        if style.show_count {
            line(canvas, 70, &format!("Detected: {}", info.detection_count), medium, GREEN);
        }
        if style.show_model {
            line(canvas, 110, &format!("Model: {}", info.model_name), pixel_scale(0.6), YELLOW);
        }
        if info.paused {
            let scale = pixel_scale(1.0);
            let (_, h) = text_size("PAUSED", scale);
            let x = canvas.width() as i32 / 2 - 50;
            canvas.draw_text(x, 30 - h, "PAUSED", scale, RED);
        }
        if style.show_help {
            let text = format!("Press '{}' to quit", style.quit_key);
            let baseline = canvas.height() as i32 - 10;
            line(canvas, baseline, &text, small, WHITE);
        }
    }

    /// 完整标注一帧：检测框 + 叠加层
    pub fn annotate(
        &self,
        frame: &Frame,
        detections: &[Detection],
        info: &OverlayInfo<'_>,
    ) -> Result<Frame, RenderError> {
        let mut canvas = Canvas::from_frame(frame)?;
        self.draw_detections(&mut canvas, detections);
        self.draw_overlay(&mut canvas, info);
        canvas.into_frame(frame)
    }
}

/// 只绘制检测框的便捷函数
pub fn draw_detections(
    frame: &Frame,
    detections: &[Detection],
    style: &StyleConfig,
) -> Result<Frame, RenderError> {
    let annotator = Annotator::new(style.clone());
    let mut canvas = Canvas::from_frame(frame)?;
    annotator.draw_detections(&mut canvas, detections);
    canvas.into_frame(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_index_round_robin() {
        let picked: Vec<usize> = (0..10).map(|i| color_index(i, 4)).collect();
        assert_eq!(picked, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        assert_eq!(color_index(7, 0), 0);
    }
}
