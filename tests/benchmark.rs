#![cfg(feature = "onnx")]

use livedet::detect::{Detector, YoloDetector};
use livedet::source::Frame;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 模型与测试图片通过环境变量指定：LIVEDET_MODEL、LIVEDET_IMAGE
fn fixture(var: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| panic!("需要设置环境变量 {var}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "需要ONNX模型和测试图片"]
    fn test_model_performance() -> Result<(), Box<dyn std::error::Error>> {
        println!("livedet 模型速度基准测试");
        println!("========================");

        let image = image::open(fixture("LIVEDET_IMAGE"))?.to_rgb8();
        println!("原始图像尺寸: {}x{}", image.width(), image.height());
        let frame = Frame::new(image);

        let mut detector = YoloDetector::from_path(&fixture("LIVEDET_MODEL"), 640, 640)?.with_nms_threshold(0.45);

        println!("执行预热运行...");
        let detections = detector.detect(&frame, 0.3)?;
        for detection in &detections {
            assert!(detection.bbox.is_valid());
            assert!((0.3..=1.0).contains(&detection.score));
            assert!(detection.bbox.xmax <= frame.width() as f32 + 1.0);
            assert!(detection.bbox.ymax <= frame.height() as f32 + 1.0);
        }

        let iterations = 50;
        let mut total_duration = Duration::ZERO;
        let mut max_duration = Duration::ZERO;
        for i in 0..iterations {
            let start = Instant::now();
            detector.detect(&frame, 0.3)?;
            let duration = start.elapsed();
            total_duration += duration;
            max_duration = max_duration.max(duration);

            if (i + 1) % 10 == 0 {
                println!("已完成 {} 次推理", i + 1);
            }
        }

        let average_duration = total_duration / iterations;
        println!("\n性能统计 ({} 次推理):", iterations);
        println!("平均耗时: {} ms", average_duration.as_millis());
        println!("最大耗时: {} ms", max_duration.as_millis());
        println!("平均 FPS: {:.2}", 1.0 / average_duration.as_secs_f64());

        // 检测调用必须有界，默认预算1秒
        assert!(average_duration.as_millis() < 1000, "平均推理时间过长: {:?} ms", average_duration.as_millis());

        Ok(())
    }
}
