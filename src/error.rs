//! 错误类型
//!
//! 按照故障对流水线的影响划分：
//! - `CaptureError`：采集打开失败属于启动期致命错误，读取失败会终止主循环
//! - `DetectionError`：可恢复，当前帧按零检测处理
//! - `RenderError`：可恢复，当前帧不带标注直接显示
//! - `OutputError`：可恢复，只记录日志
//! - `ConfigError`：启动期致命错误

use std::path::PathBuf;

use thiserror::Error;

/// 帧采集错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    /// 无法打开视频源（CaptureOpenError）
    #[error("无法打开视频源 {source_name}: {reason}")]
    Open { source_name: String, reason: String },
    /// 有限视频源已经读完
    #[error("视频流已结束")]
    EndOfStream,
    /// 读取帧失败（CaptureReadError）
    #[error("读取帧失败: {0}")]
    Read(String),
}

/// 检测器内部错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("推理后端错误: {0}")]
    Backend(String),
    #[error("无效的模型输入或输出: {0}")]
    Input(String),
}

/// 绘制或显示错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("画布错误: {0}")]
    Canvas(String),
    #[error("显示错误: {0}")]
    Display(String),
}

/// 输出文件写入错误（OutputWriteError）
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("无法创建输出目录 {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法写入 {path:?}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// 配置加载与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件 {path:?} 格式错误: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("无效配置: {0}")]
    Invalid(String),
}
