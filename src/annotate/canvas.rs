use image::RgbImage;
use raqote::{DrawOptions, DrawTarget, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use super::font::{GLYPH_ADVANCE, GLYPH_WIDTH, glyph_bits};
use crate::config::Rgb;
use crate::error::RenderError;
use crate::source::Frame;

fn solid(color: Rgb) -> Source<'static> {
    let [r, g, b] = color;
    Source::Solid(SolidSource { r, g, b, a: 0xFF })
}

/// 基于raqote的绘制画布
pub struct Canvas {
    dt: DrawTarget,
    width: u32,
    height: u32,
}

impl Canvas {
    /// 将帧绘制到DrawTarget上
    pub fn from_frame(frame: &Frame) -> Result<Self, RenderError> {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(RenderError::Canvas(format!("无效的帧尺寸 {width}x{height}")));
        }
        let mut dt = DrawTarget::new(width as i32, height as i32);

        let image_data: Vec<u32> = frame
            .image()
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                u32::from_le_bytes([b, g, r, 0xFF])
            })
            .collect();
        let img = raqote::Image {
            width: width as i32,
            height: height as i32,
            data: &image_data,
        };
        dt.draw_image_at(0.0, 0.0, &img, &DrawOptions::new());

        Ok(Self { dt, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 描边矩形，线宽以边框线为中心
    pub fn stroke_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb, thickness: u32) {
        let mut pb = PathBuilder::new();
        let (x1, y1, x2, y2) = (x1 as f32, y1 as f32, x2 as f32, y2 as f32);
        pb.rect(x1, y1, x2 - x1, y2 - y1);
        let path = pb.finish();
        self.dt.stroke(
            &path,
            &solid(color),
            &StrokeStyle {
                join: LineJoin::Miter,
                width: thickness as f32,
                ..StrokeStyle::default()
            },
            &DrawOptions::default(),
        );
    }

    /// 填充矩形，(x1, y1) 与 (x2, y2) 为对角
    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        let (left, right) = (x1.min(x2) as f32, x1.max(x2) as f32);
        let (top, bottom) = (y1.min(y2) as f32, y1.max(y2) as f32);
        self.dt.fill_rect(
            left,
            top,
            right - left,
            bottom - top,
            &solid(color),
            &DrawOptions::new(),
        );
    }

    /// 从 (x, top) 开始绘制点阵文本
    pub fn draw_text(&mut self, x: i32, top: i32, text: &str, scale: i32, color: Rgb) {
        let source = solid(color);
        let options = DrawOptions::new();
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(glyph) = glyph_bits(ch) {
                for (row, pattern) in glyph.iter().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        if (pattern >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                            self.dt.fill_rect(
                                cursor as f32 + col.saturating_mul(scale) as f32,
                                top as f32 + (row as i32).saturating_mul(scale) as f32,
                                scale as f32,
                                scale as f32,
                                &source,
                                &options,
                            );
                        }
                    }
                }
            }
            cursor = cursor.saturating_add(GLYPH_ADVANCE.saturating_mul(scale));
        }
    }

    /// 将DrawTarget转换回帧
    pub fn into_frame(self, original: &Frame) -> Result<Frame, RenderError> {
        let pixels: Vec<u8> = self
            .dt
            .get_data()
            .iter()
            .flat_map(|&pixel| {
                let bytes = pixel.to_le_bytes();
                [bytes[2], bytes[1], bytes[0]]
            })
            .collect();

        let image = RgbImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| RenderError::Canvas("无法从绘制结果创建图像".to_string()))?;
        Ok(original.with_image(image))
    }
}
