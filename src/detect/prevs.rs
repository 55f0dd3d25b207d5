use image::{RgbImage, imageops::{self, FilterType}};
use ndarray::{Array4, Zip};

/// 调整图像大小以适应模型输入
///
/// 使用Triangle插值，比CatmullRom快，实时场景下精度足够。
///
/// # 参数
/// * `img` - 原始图像
/// * `width` - 目标宽度
/// * `height` - 目标高度
pub fn resize_image(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Triangle)
}

/// 将图像转换为模型输入张量
///
/// 将图像转换为模型所需的四维张量格式，包括：
/// 1. 归一化像素值到[0, 1]范围
/// 2. 调整通道顺序为RGB
/// 3. 调整维度顺序为NCHW格式
///
/// # 参数
/// * `img` - 已缩放到模型输入尺寸的图像
///
/// # 返回值
/// 返回形状为(1, 3, height, width)的四维张量
///
/// # 示例
///
/// ```
/// use image::RgbImage;
/// use livedet::detect::prevs::image_to_tensor;
///
/// let img = RgbImage::new(64, 32);
/// let tensor = image_to_tensor(&img);
/// assert_eq!(tensor.shape(), &[1, 3, 32, 64]);
/// ```
pub fn image_to_tensor(img: &RgbImage) -> Array4<f32> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let raw = img.as_raw();
    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));

    // 按元素并行填充，RgbImage为行优先的交错RGB
    Zip::indexed(&mut tensor).par_for_each(|(_, c, y, x), value| {
        *value = f32::from(raw[(y * w + x) * 3 + c]) / 255.0;
    });

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_image_to_tensor_normalizes_channels() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([255, 0, 51]));
        let tensor = image_to_tensor(&img);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.0);
        assert!((tensor[[0, 2, 0, 1]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 1, 1]], 0.0);
    }

    #[test]
    fn test_image_to_tensor_non_square_layout() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([0, 255, 0]));
        let tensor = image_to_tensor(&img);
        assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
        assert_eq!(tensor[[0, 1, 1, 2]], 1.0);
        assert_eq!(tensor.sum(), 1.0);
    }

    #[test]
    fn test_resize_keeps_same_size() {
        let img = RgbImage::new(8, 4);
        let out = resize_image(&img, 8, 4);
        assert_eq!(out.dimensions(), (8, 4));
        let out = resize_image(&img, 4, 4);
        assert_eq!(out.dimensions(), (4, 4));
    }
}
