use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DETECTIONS_CAPACITY: usize = 100;

// 摄像头
pub const DEFAULT_CAMERA_INDEX: u32 = 0;
pub const DEFAULT_CAMERA_WIDTH: u32 = 1280;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 720;
pub const DEFAULT_CAMERA_FPS: u32 = 30;
pub const DEFAULT_WARMUP_FRAMES: u32 = 30;

// 目标检测超参数配置
pub const DEFAULT_MODEL_NAME: &str = "yolov8m";
pub const DEFAULT_MODEL_PATH: &str = "yolov8m.onnx";
pub const DEFAULT_INPUT_WIDTH: usize = 640;
pub const DEFAULT_INPUT_HEIGHT: usize = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.45;
pub const DEFAULT_SKIP_FRAMES: u64 = 2;
pub const DEFAULT_DETECT_BUDGET_MS: u64 = 1000;

// 显示
pub const DEFAULT_WINDOW_TITLE: &str = "Live Object Detection";
pub const DEFAULT_LINE_THICKNESS: u32 = 3;
pub const DEFAULT_FONT_SCALE: f32 = 0.6;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 1;

// 输出
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_SAVE_FREQUENCY: u64 = 30;
pub const DEFAULT_SCREENSHOT_EXT: &str = "jpg";
pub const DETECTION_LOG_NAME: &str = "detections.jsonl";

/// RGB颜色
pub type Rgb = [u8; 3];

/// 默认调色板（RGB），检测框按序号轮流取色
pub const DEFAULT_PALETTE: [Rgb; 8] = [
    [0, 255, 0],
    [0, 0, 255],
    [255, 0, 0],
    [255, 255, 0],
    [255, 0, 255],
    [0, 165, 255],
    [128, 0, 128],
    [128, 128, 0],
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub warmup_frames: u32,
    /// 采集后水平翻转（镜像效果）
    pub mirror: bool,
    /// 设置后从图片目录回放，而不是打开摄像头
    pub replay_dir: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_CAMERA_INDEX,
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            fps: DEFAULT_CAMERA_FPS,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
            mirror: true,
            replay_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 显示在画面上的模型名称
    pub name: String,
    pub path: PathBuf,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    pub input_width: usize,
    pub input_height: usize,
    /// 每隔多少帧执行一次检测
    pub skip_frames: u64,
    /// 单次检测耗时超过该值时告警
    pub detect_budget_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
            skip_frames: DEFAULT_SKIP_FRAMES,
            detect_budget_ms: DEFAULT_DETECT_BUDGET_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_title: String,
    pub headless: bool,
    pub show_fps: bool,
    pub show_count: bool,
    pub show_confidence: bool,
    pub show_model: bool,
    pub show_help: bool,
    pub line_thickness: u32,
    pub font_scale: f32,
    /// 每次迭代等待按键的最长时间
    pub poll_timeout_ms: u64,
    pub palette: Vec<Rgb>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            headless: false,
            show_fps: true,
            show_count: true,
            show_confidence: true,
            show_model: true,
            show_help: true,
            line_thickness: DEFAULT_LINE_THICKNESS,
            font_scale: DEFAULT_FONT_SCALE,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: char,
    pub pause: char,
    pub screenshot: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: 'q',
            pause: 'p',
            screenshot: 's',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// 是否周期性写入检测日志
    pub save_detections: bool,
    /// 每隔多少帧写一次检测日志
    pub save_frequency: u64,
    pub screenshot_ext: String,
    pub log_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            save_detections: true,
            save_frequency: DEFAULT_SAVE_FREQUENCY,
            screenshot_ext: DEFAULT_SCREENSHOT_EXT.to_string(),
            log_file: None,
        }
    }
}

/// 全部运行配置，启动时加载一次，之后只读
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub model: ModelConfig,
    pub display: DisplayConfig,
    pub keys: KeyBindings,
    pub output: OutputConfig,
}

impl AppConfig {
    /// 从TOML文件加载配置，缺省的字段使用默认值
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.camera.width == 0 || self.camera.height == 0 {
            return invalid("camera.width 和 camera.height 必须大于0");
        }
        if self.model.skip_frames == 0 {
            return invalid("model.skip_frames 必须至少为1");
        }
        if !(0.0..=1.0).contains(&self.model.confidence_threshold) {
            return invalid("model.confidence_threshold 必须在 [0, 1] 范围内");
        }
        if !(0.0..=1.0).contains(&self.model.nms_threshold) {
            return invalid("model.nms_threshold 必须在 [0, 1] 范围内");
        }
        if self.model.input_width == 0 || self.model.input_height == 0 {
            return invalid("model.input_width 和 model.input_height 必须大于0");
        }
        if self.display.palette.is_empty() {
            return invalid("display.palette 不能为空");
        }
        if self.display.line_thickness == 0 {
            return invalid("display.line_thickness 必须至少为1");
        }
        if !(self.display.font_scale > 0.0) {
            return invalid("display.font_scale 必须大于0");
        }
        let keys = self.keys;
        if keys.quit == keys.pause || keys.quit == keys.screenshot || keys.pause == keys.screenshot {
            return invalid("keys 中的按键不能重复");
        }
        if self.output.save_frequency == 0 {
            return invalid("output.save_frequency 必须至少为1");
        }
        if self.output.screenshot_ext.trim().is_empty() {
            return invalid("output.screenshot_ext 不能为空");
        }
        Ok(())
    }

    /// 提取绘制相关的配置
    pub fn style(&self) -> StyleConfig {
        StyleConfig {
            line_thickness: self.display.line_thickness,
            font_scale: self.display.font_scale,
            palette: self.display.palette.clone(),
            show_fps: self.display.show_fps,
            show_count: self.display.show_count,
            show_confidence: self.display.show_confidence,
            show_model: self.display.show_model,
            show_help: self.display.show_help,
            quit_key: self.keys.quit,
        }
    }
}

/// 绘制样式，只读
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub line_thickness: u32,
    pub font_scale: f32,
    pub palette: Vec<Rgb>,
    pub show_fps: bool,
    pub show_count: bool,
    pub show_confidence: bool,
    pub show_model: bool,
    pub show_help: bool,
    /// 帮助提示里显示的退出键
    pub quit_key: char,
}

impl Default for StyleConfig {
    fn default() -> Self {
        AppConfig::default().style()
    }
}
