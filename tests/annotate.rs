use image::{Rgb, RgbImage};

use livedet::annotate::{Annotator, OverlayInfo, color_index, draw_detections};
use livedet::config::StyleConfig;
use livedet::detect::{BoundingBox, Detection};
use livedet::error::RenderError;
use livedet::source::Frame;

const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);

fn gray_frame(width: u32, height: u32) -> Frame {
    Frame::new(RgbImage::from_pixel(width, height, BACKGROUND))
}

fn quiet_style() -> StyleConfig {
    StyleConfig {
        show_fps: false,
        show_count: false,
        show_model: false,
        show_help: false,
        ..StyleConfig::default()
    }
}

/// 各通道允许1个单位的舍入误差
fn assert_pixel(frame: &Frame, x: u32, y: u32, expected: Rgb<u8>) {
    let actual = frame.image().get_pixel(x, y);
    let close = actual.0.iter().zip(expected.0.iter()).all(|(a, e)| a.abs_diff(*e) <= 1);
    assert!(close, "pixel ({x}, {y}) is {:?}, expected {:?}", actual.0, expected.0);
}

fn overlay(paused: bool) -> OverlayInfo<'static> {
    OverlayInfo {
        fps: 0.0,
        detection_count: 0,
        model_name: "yolov8m",
        paused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_uses_truncated_coordinates() {
        let style = quiet_style();
        let frame = gray_frame(120, 120);
        let detection = Detection::new(BoundingBox::new(10.9, 40.2, 60.7, 90.9), "person", 0.875, 0);

        let annotated = draw_detections(&frame, &[detection], &style).unwrap();
        let palette0 = Rgb(style.palette[0]);

        // 左边框落在 x=10 上（10.9截断为10）
        assert_pixel(&annotated, 10, 60, palette0);
        // 标签背景位于框的上方
        assert_pixel(&annotated, 11, 18, palette0);
        // 框内部保持原样
        assert_pixel(&annotated, 35, 65, BACKGROUND);
        // 原始帧不受影响
        assert_pixel(&frame, 10, 60, BACKGROUND);
    }

    #[test]
    fn test_palette_round_robin_by_index() {
        let style = StyleConfig {
            palette: vec![[255, 0, 0], [0, 0, 255]],
            ..quiet_style()
        };
        let frame = gray_frame(200, 100);
        let detections: Vec<Detection> = (0..3)
            .map(|i| {
                let x = 20.0 + i as f32 * 60.0;
                Detection::new(BoundingBox::new(x, 50.0, x + 40.0, 90.0), "cup", 0.5, 41)
            })
            .collect();

        let annotated = draw_detections(&frame, &detections, &style).unwrap();

        assert_pixel(&annotated, 20, 70, Rgb([255, 0, 0]));
        assert_pixel(&annotated, 80, 70, Rgb([0, 0, 255]));
        assert_pixel(&annotated, 140, 70, Rgb([255, 0, 0]));
        assert_eq!(color_index(5, 2), 1);
    }

    #[test]
    fn test_disabled_overlay_leaves_frame_unchanged() {
        let annotator = Annotator::new(quiet_style());
        let frame = gray_frame(64, 48);

        let annotated = annotator.annotate(&frame, &[], &overlay(false)).unwrap();

        for (x, y, _) in frame.image().enumerate_pixels() {
            assert_pixel(&annotated, x, y, BACKGROUND);
        }
        assert_eq!(annotated.captured_at(), frame.captured_at());
    }

    #[test]
    fn test_paused_indicator_is_red() {
        let annotator = Annotator::new(quiet_style());
        let frame = gray_frame(200, 100);

        let annotated = annotator.annotate(&frame, &[], &overlay(true)).unwrap();

        // "PAUSED" 从 (宽/2 - 50) 开始，P 的第一行填满前4列
        assert_pixel(&annotated, 51, 10, Rgb([255, 0, 0]));
    }

    #[test]
    fn test_enabled_overlay_draws_text() {
        let annotator = Annotator::new(StyleConfig::default());
        let frame = gray_frame(320, 240);
        let info = OverlayInfo {
            fps: 12.5,
            detection_count: 2,
            model_name: "yolov8m",
            paused: false,
        };

        let annotated = annotator.annotate(&frame, &[], &info).unwrap();

        assert_ne!(annotated.image(), frame.image());
    }

    #[test]
    fn test_out_of_range_box_is_clamped_to_frame() {
        let style = quiet_style();
        let frame = gray_frame(64, 48);
        let detections = vec![
            Detection::new(BoundingBox::new(-3e9, -3e9, 3e9, 3e9), "person", 0.9, 0),
            Detection::new(BoundingBox::new(f32::NAN, 10.0, f32::INFINITY, f32::NEG_INFINITY), "cup", 0.5, 41),
        ];

        let annotated = draw_detections(&frame, &detections, &style).unwrap();

        assert_eq!(annotated.image().dimensions(), (64, 48));
        // 框被限制在画布外1像素处，画面中部不受影响
        assert_pixel(&annotated, 32, 30, BACKGROUND);
    }

    #[test]
    fn test_huge_font_scale_does_not_overflow() {
        let style = StyleConfig {
            font_scale: 1e12,
            ..StyleConfig::default()
        };
        let annotator = Annotator::new(style);
        let frame = gray_frame(64, 48);
        let detection = Detection::new(BoundingBox::new(5.0, 5.0, 30.0, 30.0), "person", 0.9, 0);
        let info = OverlayInfo {
            fps: 30.0,
            detection_count: 1,
            model_name: "yolov8m",
            paused: true,
        };

        assert!(annotator.annotate(&frame, &[detection], &info).is_ok());
    }

    #[test]
    fn test_empty_frame_is_render_error() {
        let annotator = Annotator::new(quiet_style());
        let frame = Frame::new(RgbImage::new(0, 0));

        let result = annotator.annotate(&frame, &[], &overlay(false));

        assert!(matches!(result, Err(RenderError::Canvas(_))));
    }
}
