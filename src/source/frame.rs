use std::time::Instant;

use image::{RgbImage, imageops};

/// 一帧采集到的图像
///
/// 在一次迭代内由流水线独占，交给标注和显示之后即被丢弃，不跨迭代共享。
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    captured_at: Instant,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Instant::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 每个像素的通道数
    pub fn channels(&self) -> u8 {
        3
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// 保留采集时间，替换像素内容
    pub fn with_image(&self, image: RgbImage) -> Self {
        Self {
            image,
            captured_at: self.captured_at,
        }
    }

    /// 水平翻转（镜像）
    ///
    /// # 示例
    ///
    /// ```
    /// use image::{Rgb, RgbImage};
    /// use livedet::source::Frame;
    ///
    /// let mut image = RgbImage::new(2, 1);
    /// image.put_pixel(0, 0, Rgb([255, 0, 0]));
    /// let frame = Frame::new(image).mirrored();
    /// assert_eq!(frame.image().get_pixel(1, 0), &Rgb([255, 0, 0]));
    /// ```
    pub fn mirrored(mut self) -> Self {
        imageops::flip_horizontal_in_place(&mut self.image);
        self
    }
}
