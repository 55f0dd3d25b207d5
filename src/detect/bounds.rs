use serde::Serialize;

/// 边界框结构
///
/// 像素坐标，(xmin, ymin) 为左上角，(xmax, ymax) 为右下角。
#[derive(Debug, Clone, Default, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    /// 由中心点和宽高构造
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            xmin: cx - w / 2.0,
            ymin: cy - h / 2.0,
            xmax: cx + w / 2.0,
            ymax: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.ymax - self.ymin).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// 检查边界框是否有效（宽度和高度都大于0）
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// 按比例缩放坐标
    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        Self {
            xmin: self.xmin * sx,
            ymin: self.ymin * sy,
            xmax: self.xmax * sx,
            ymax: self.ymax * sy,
        }
    }

    /// 交并比
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix = (self.xmax.min(other.xmax) - self.xmin.max(other.xmin)).max(0.0);
        let iy = (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0);
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }

    /// 截断为整数像素坐标（不四舍五入）
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (
            self.xmin as i32,
            self.ymin as i32,
            self.xmax as i32,
            self.ymax as i32,
        )
    }

    /// 截断为整数像素坐标，并限制在 `[-1, width + 1] x [-1, height + 1]` 内
    ///
    /// 越界或无效（NaN）的模型坐标不会在后续的整数运算中溢出。
    pub fn to_pixels_within(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
        let clamp_x = |v: f32| v.clamp(-1.0, width as f32 + 1.0) as i32;
        let clamp_y = |v: f32| v.clamp(-1.0, height as f32 + 1.0) as i32;
        (
            clamp_x(self.xmin),
            clamp_y(self.ymin),
            clamp_x(self.xmax),
            clamp_y(self.ymax),
        )
    }
}

/// 检测结果结构
///
/// 每个检测周期重新生成，只对产生它的那一帧有效。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    /// 类别名称
    pub label: String,
    /// 置信度 [0, 1]
    pub score: f32,
    /// 类别ID
    pub class_id: usize,
}

impl Detection {
    pub fn new(bbox: BoundingBox, label: impl Into<String>, score: f32, class_id: usize) -> Self {
        Self {
            bbox,
            label: label.into(),
            score,
            class_id,
        }
    }

    /// 标签文本，例如 `person: 87.5%`
    pub fn caption(&self, show_confidence: bool) -> String {
        if show_confidence {
            format!("{}: {:.1}%", self.label, self.score * 100.0)
        } else {
            self.label.clone()
        }
    }

    /// 日志用的简短形式，例如 `person(88%)`
    pub fn summary(&self) -> String {
        format!("{}({:.0}%)", self.label, self.score * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
        assert_eq!(a.iou(&BoundingBox::new(20.0, 20.0, 30.0, 30.0)), 0.0);
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_to_pixels_within_clamps_to_frame() {
        let inside = BoundingBox::new(10.9, 40.2, 60.7, 90.9);
        assert_eq!(inside.to_pixels_within(120, 120), inside.to_pixels());

        let huge = BoundingBox::new(-3e9, -3e9, 3e9, 3e9);
        assert_eq!(huge.to_pixels_within(640, 480), (-1, -1, 641, 481));

        let garbage = BoundingBox::new(f32::NAN, 5.0, f32::INFINITY, f32::NEG_INFINITY);
        assert_eq!(garbage.to_pixels_within(640, 480), (0, 5, 641, -1));
    }

    #[test]
    fn test_to_pixels_truncates() {
        let b = BoundingBox::new(10.9, 20.5, 99.99, 0.7);
        assert_eq!(b.to_pixels(), (10, 20, 99, 0));
    }

    #[test]
    fn test_caption() {
        let d = Detection::new(BoundingBox::default(), "cup", 0.875, 41);
        assert_eq!(d.caption(true), "cup: 87.5%");
        assert_eq!(d.caption(false), "cup");
        assert_eq!(d.summary(), "cup(88%)");
    }
}
