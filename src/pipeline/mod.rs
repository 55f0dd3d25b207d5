//! 实时检测主循环
//!
//! 单线程顺序执行：采集 → （按需）检测 → 标注 → 显示 → 处理按键。
//! 检测只在 `frame_index % skip_interval == 0` 的帧上运行，其余帧沿用上一次的结果。
//!
//! # 故障处理
//!
//! - 采集失败：结束循环，记录帧序号
//! - 检测失败：本帧按零检测处理，继续运行
//! - 标注失败：显示未标注的原始帧
//! - 显示或输出失败：记录日志，继续运行
//!
//! 无论从哪条路径退出，视频源和显示端都只释放一次。

mod limit;
mod scheduler;

pub use limit::LoopMode;
pub use scheduler::{Phase, Scheduler, compute_fps, should_detect};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::annotate::{Annotator, OverlayInfo};
use crate::config::{AppConfig, KeyBindings};
use crate::detect::{Detection, Detector};
use crate::display::{Action, Display};
use crate::error::CaptureError;
use crate::output::OutputSink;
use crate::source::{Frame, FrameSource};
use crate::stats::{SessionReport, SessionStats};

/// 主循环结束的原因
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// 用户按下退出键或关闭了窗口
    Quit,
    /// 收到Ctrl+C
    Interrupted,
    /// 达到帧数或时长上限
    LimitReached,
    /// 有限视频源已读完
    EndOfStream,
    CaptureFailed(CaptureError),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::CaptureFailed(_))
    }

    /// 进程退出码：采集失败为1，其余为0
    pub fn exit_code(&self) -> u8 {
        if self.is_failure() { 1 } else { 0 }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Quit => write!(f, "用户退出"),
            StopReason::Interrupted => write!(f, "收到中断信号"),
            StopReason::LimitReached => write!(f, "达到运行上限"),
            StopReason::EndOfStream => write!(f, "视频流结束"),
            StopReason::CaptureFailed(e) => write!(f, "采集失败: {e}"),
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub report: SessionReport,
    pub stop_reason: StopReason,
}

/// 主循环用到的运行参数，从配置中提取
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub confidence_threshold: f32,
    pub skip_interval: u64,
    pub warmup_frames: u32,
    pub mirror: bool,
    pub window_title: String,
    pub model_name: String,
    pub poll_timeout: Duration,
    pub detect_budget: Duration,
    pub keys: KeyBindings,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            confidence_threshold: config.model.confidence_threshold,
            skip_interval: config.model.skip_frames,
            warmup_frames: config.camera.warmup_frames,
            mirror: config.camera.mirror,
            window_title: config.display.window_title.clone(),
            model_name: config.model.name.clone(),
            poll_timeout: Duration::from_millis(config.display.poll_timeout_ms),
            detect_budget: Duration::from_millis(config.model.detect_budget_ms),
            keys: config.keys,
        }
    }
}

pub struct Pipeline<S, D, V>
where
    S: FrameSource,
    D: Detector,
    V: Display,
{
    source: S,
    detector: D,
    display: V,
    settings: PipelineSettings,
    annotator: Annotator,
    sink: OutputSink,
    scheduler: Scheduler,
    stats: SessionStats,
    shutdown: Arc<AtomicBool>,
    limit: LoopMode,
    released: bool,
}

impl<S, D, V> Pipeline<S, D, V>
where
    S: FrameSource,
    D: Detector,
    V: Display,
{
    /// 创建流水线
    ///
    /// # 参数
    /// * `config` - 已校验的运行配置，只在构造时读取
    /// * `source` - 已打开的视频源，流水线结束时关闭
    /// * `detector` - 检测后端
    /// * `display` - 显示端，同时提供按键输入
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use livedet::config::AppConfig;
    /// use livedet::detect::YoloDetector;
    /// use livedet::display::HeadlessDisplay;
    /// use livedet::pipeline::{LoopMode, Pipeline};
    /// use livedet::source::ImageDirSource;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = AppConfig::default();
    /// let source = ImageDirSource::open(Path::new("frames"))?;
    /// let detector = YoloDetector::from_path(Path::new("yolov8m.onnx"), 640, 640)?;
    /// let mut pipeline = Pipeline::new(&config, source, detector, HeadlessDisplay::new())
    ///     .with_limit(LoopMode::Count(100));
    /// let outcome = pipeline.run();
    /// println!("{}", outcome.report);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &AppConfig, source: S, detector: D, display: V) -> Self {
        let settings = PipelineSettings::from_config(config);
        Self {
            source,
            detector,
            display,
            scheduler: Scheduler::new(settings.skip_interval),
            settings,
            annotator: Annotator::new(config.style()),
            sink: OutputSink::new(&config.output),
            stats: SessionStats::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            limit: LoopMode::Continuous,
            released: false,
        }
    }

    /// 使用外部的停止标志，例如Ctrl+C处理器持有的那一份
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 设置运行上限，默认持续运行
    pub fn with_limit(mut self, limit: LoopMode) -> Self {
        self.limit = limit;
        self
    }

    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    /// 运行直到退出条件出现
    ///
    /// 依次预热视频源、进入主循环，退出时释放视频源和显示端。
    /// 采集失败不会以错误返回，而是体现在 `RunOutcome::stop_reason` 中，
    /// 此时最终统计仍然有效。
    ///
    /// # 返回值
    /// 最终统计和退出原因
    pub fn run(&mut self) -> RunOutcome {
        self.stats = SessionStats::new();
        let started = self.stats.start_time();
        info!(
            source = %self.source.describe(),
            detector = self.detector.name(),
            skip = self.settings.skip_interval,
            "开始实时检测"
        );

        let stop_reason = match self.warmup() {
            Ok(()) => {
                self.scheduler.start();
                self.run_loop(started)
            }
            Err(reason) => reason,
        };

        self.scheduler.stop();
        self.release();
        let report = self.stats.report();
        self.scheduler.terminate();
        info!(reason = %stop_reason, frames = report.total_frames, "检测结束");

        RunOutcome { report, stop_reason }
    }

    fn warmup(&mut self) -> Result<(), StopReason> {
        let count = self.settings.warmup_frames;
        if count == 0 {
            return Ok(());
        }
        debug!(count, "预热摄像头");
        self.source.warmup(count).map_err(|e| match e {
            CaptureError::EndOfStream => StopReason::EndOfStream,
            e => {
                error!(error = %e, "预热期间读取帧失败");
                StopReason::CaptureFailed(e)
            }
        })
    }

    fn run_loop(&mut self, started: Instant) -> StopReason {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break StopReason::Interrupted;
            }
            if self.limit.is_reached(self.stats.frame_count(), started) {
                break StopReason::LimitReached;
            }

            let frame_index = self.stats.frame_count() + 1;
            let frame = match self.source.read() {
                Ok(frame) => frame,
                Err(CaptureError::EndOfStream) => break StopReason::EndOfStream,
                Err(e) => {
                    error!(frame = frame_index, error = %e, "读取帧失败");
                    break StopReason::CaptureFailed(e);
                }
            };
            let frame = if self.settings.mirror { frame.mirrored() } else { frame };

            let fresh = if self.scheduler.should_detect(frame_index) {
                let detections = self.detect(&frame, frame_index);
                self.scheduler.replace(detections).len()
            } else {
                0
            };
            self.stats.record(fresh);

            let annotated = self.annotate(frame, frame_index);
            if let Err(e) = self.display.show(&annotated, &self.settings.window_title) {
                warn!(frame = frame_index, error = %e, "显示失败");
            }

            if self.sink.is_save_due(frame_index) {
                if let Err(e) = self.sink.append_detections(frame_index, self.scheduler.carry_forward()) {
                    warn!(frame = frame_index, error = %e, "写入检测日志失败");
                }
            }

            if let Some(key) = self.display.poll_key(self.settings.poll_timeout) {
                match self.settings.keys.action_for(key) {
                    Some(Action::Quit) => break StopReason::Quit,
                    Some(Action::TogglePause) => {
                        let paused = self.scheduler.toggle_pause();
                        info!(frame = frame_index, paused, "{}", if paused { "检测已暂停" } else { "检测已恢复" });
                    }
                    Some(Action::Screenshot) => {
                        if let Err(e) = self.sink.save_screenshot(&annotated) {
                            warn!(frame = frame_index, error = %e, "保存截图失败");
                        }
                    }
                    None => {}
                }
            }

            if !self.display.is_open() {
                break StopReason::Quit;
            }
        }
    }

    /// 运行一次检测，失败时按零检测处理
    fn detect(&mut self, frame: &Frame, frame_index: u64) -> Vec<Detection> {
        let start_time = Instant::now();
        let result = self.detector.detect(frame, self.settings.confidence_threshold);
        let elapsed = start_time.elapsed();
        if elapsed > self.settings.detect_budget {
            warn!(
                frame = frame_index,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.settings.detect_budget.as_millis() as u64,
                "检测耗时超出预算"
            );
        }

        match result {
            Ok(detections) => {
                if !detections.is_empty() {
                    let summary: Vec<String> = detections.iter().map(Detection::summary).collect();
                    info!(
                        "Frame {}: {} objects - {}",
                        frame_index,
                        detections.len(),
                        summary.join(", ")
                    );
                }
                detections
            }
            Err(e) => {
                warn!(frame = frame_index, error = %e, "检测失败，本帧按零检测处理");
                Vec::new()
            }
        }
    }

    /// 标注失败时返回原始帧
    fn annotate(&self, frame: Frame, frame_index: u64) -> Frame {
        let detections = self.scheduler.carry_forward();
        let info = OverlayInfo {
            fps: self.stats.fps(),
            detection_count: detections.len(),
            model_name: &self.settings.model_name,
            paused: self.scheduler.is_paused(),
        };
        match self.annotator.annotate(&frame, detections, &info) {
            Ok(annotated) => annotated,
            Err(e) => {
                warn!(frame = frame_index, error = %e, "标注失败，显示原始帧");
                frame
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.close();
        self.display.close();
        debug!("已释放视频源和显示端");
    }
}

impl<S, D, V> Drop for Pipeline<S, D, V>
where
    S: FrameSource,
    D: Detector,
    V: Display,
{
    fn drop(&mut self) {
        self.release();
    }
}
