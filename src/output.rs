//! 输出：截图和检测日志
//!
//! 写入失败只返回错误，由调用方记录日志，不影响主循环。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::config::{DETECTION_LOG_NAME, OutputConfig};
use crate::detect::Detection;
use crate::error::OutputError;
use crate::source::Frame;

/// 截图文件名：`screenshot_<YYYYMMDD_HHMMSS>.<ext>`
pub fn screenshot_name(now: &DateTime<Local>, ext: &str) -> String {
    format!("screenshot_{}.{}", now.format("%Y%m%d_%H%M%S"), ext.trim_start_matches('.'))
}

#[derive(Serialize)]
struct DetectionRecord<'a> {
    frame: u64,
    timestamp: String,
    detections: &'a [Detection],
}

/// 截图与检测日志的写入端
///
/// 输出目录按需创建，重复创建不报错。
pub struct OutputSink {
    dir: PathBuf,
    screenshot_ext: String,
    save_detections: bool,
    save_frequency: u64,
}

impl OutputSink {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            screenshot_ext: config.screenshot_ext.clone(),
            save_detections: config.save_detections,
            save_frequency: config.save_frequency.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 创建输出目录，已存在时不报错
    pub fn ensure_dir(&self) -> Result<(), OutputError> {
        fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// 以当前本地时间命名保存截图
    ///
    /// # 参数
    /// * `frame` - 要保存的帧（通常是已标注的帧）
    ///
    /// # 返回值
    /// 写入的文件路径
    ///
    /// # 错误处理
    /// 目录创建或图像编码失败时返回 `OutputError`，调用方只需记录日志
    pub fn save_screenshot(&self, frame: &Frame) -> Result<PathBuf, OutputError> {
        self.save_screenshot_at(frame, &Local::now())
    }

    pub fn save_screenshot_at(&self, frame: &Frame, now: &DateTime<Local>) -> Result<PathBuf, OutputError> {
        self.ensure_dir()?;
        let path = self.dir.join(screenshot_name(now, &self.screenshot_ext));
        frame.image().save(&path).map_err(|e| OutputError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "截图已保存");
        Ok(path)
    }

    /// 是否到了周期性保存检测日志的帧
    pub fn is_save_due(&self, frame_index: u64) -> bool {
        self.save_detections && frame_index > 0 && frame_index % self.save_frequency == 0
    }

    /// 向 `detections.jsonl` 追加一行JSON检测记录
    ///
    /// # 参数
    /// * `frame_index` - 帧序号（从1开始）
    /// * `detections` - 该帧上显示的检测结果，可以为空
    ///
    /// # 返回值
    /// 检测日志文件路径
    pub fn append_detections(&self, frame_index: u64, detections: &[Detection]) -> Result<PathBuf, OutputError> {
        self.ensure_dir()?;
        let path = self.dir.join(DETECTION_LOG_NAME);
        let write_err = |reason: String| OutputError::Write {
            path: path.clone(),
            reason,
        };

        let record = DetectionRecord {
            frame: frame_index,
            timestamp: Local::now().to_rfc3339(),
            detections,
        };
        let line = serde_json::to_string(&record).map_err(|e| write_err(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_err(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| write_err(e.to_string()))?;
        Ok(path)
    }
}
