use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::pipeline::compute_fps;

/// 会话统计
///
/// 计数器只增不减，只在会话开始时归零。
#[derive(Debug, Clone)]
pub struct SessionStats {
    frame_count: u64,
    detection_count: u64,
    start_time: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// 以指定时刻为会话开始时间
    pub fn starting_at(start_time: Instant) -> Self {
        Self {
            frame_count: 0,
            detection_count: 0,
            start_time,
        }
    }

    /// 记录一次循环迭代
    ///
    /// 每次迭代必须调用且只调用一次，无论本帧是否执行了检测。
    ///
    /// # 参数
    /// * `detections` - 本帧新产生的检测数量，跳过检测的帧传0
    ///
    /// # 示例
    ///
    /// ```
    /// use livedet::stats::SessionStats;
    ///
    /// let mut stats = SessionStats::new();
    /// stats.record(0);
    /// stats.record(2);
    /// assert_eq!(stats.frame_count(), 2);
    /// assert_eq!(stats.detection_count(), 2);
    /// ```
    pub fn record(&mut self, detections: usize) {
        self.frame_count += 1;
        self.detection_count += detections as u64;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn detection_count(&self) -> u64 {
        self.detection_count
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 当前平均帧率
    pub fn fps(&self) -> f64 {
        compute_fps(self.frame_count, self.elapsed().as_secs_f64())
    }

    pub fn report(&self) -> SessionReport {
        self.report_at(Instant::now())
    }

    /// 以指定时刻为结束时间生成报告
    ///
    /// # 参数
    /// * `end` - 会话结束时刻，早于开始时间时按0时长处理
    ///
    /// # 返回值
    /// 总帧数、总检测数、时长和平均帧率，时长为0时平均帧率为0
    pub fn report_at(&self, end: Instant) -> SessionReport {
        let duration_seconds = end.saturating_duration_since(self.start_time).as_secs_f64();
        SessionReport {
            total_frames: self.frame_count,
            total_detections: self.detection_count,
            duration_seconds,
            average_fps: compute_fps(self.frame_count, duration_seconds),
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// 会话结束时的最终报告
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionReport {
    pub total_frames: u64,
    pub total_detections: u64,
    pub duration_seconds: f64,
    pub average_fps: f64,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(70);
        writeln!(f, "{rule}")?;
        writeln!(f, "SESSION STATISTICS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "Total detections: {}", self.total_detections)?;
        writeln!(f, "Duration: {:.2}s", self.duration_seconds)?;
        writeln!(f, "Average FPS: {:.2}", self.average_fps)?;
        write!(f, "{rule}")
    }
}
