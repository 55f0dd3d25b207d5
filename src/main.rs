use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use livedet::config::AppConfig;
use livedet::detect::Detector;
use livedet::display::{Display, HeadlessDisplay};
use livedet::pipeline::{LoopMode, Pipeline, RunOutcome};
use livedet::source::{FrameSource, ImageDirSource};

/// 摄像头实时目标检测
#[derive(Debug, Parser)]
#[command(name = "livedet", version, about)]
struct Args {
    /// TOML配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 摄像头编号
    #[arg(long)]
    camera: Option<u32>,

    /// 回放图片目录，代替摄像头
    #[arg(long, value_name = "DIR")]
    replay: Option<PathBuf>,

    /// ONNX模型路径
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// 画面上显示的模型名称
    #[arg(long)]
    model_name: Option<String>,

    /// 置信度阈值
    #[arg(long)]
    confidence: Option<f32>,

    /// 每隔多少帧检测一次
    #[arg(long)]
    skip: Option<u64>,

    /// 预热丢弃的帧数
    #[arg(long)]
    warmup: Option<u32>,

    /// 不打开窗口
    #[arg(long)]
    headless: bool,

    /// 处理指定帧数后退出
    #[arg(long)]
    max_frames: Option<u64>,

    /// 运行指定毫秒后退出
    #[arg(long)]
    duration_ms: Option<u64>,

    /// 截图和检测日志的输出目录
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 日志文件
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// 命令行参数覆盖配置文件
    fn apply(&self, config: &mut AppConfig) {
        if let Some(index) = self.camera {
            config.camera.index = index;
        }
        if let Some(dir) = &self.replay {
            config.camera.replay_dir = Some(dir.clone());
        }
        if let Some(path) = &self.model {
            config.model.path = path.clone();
        }
        if let Some(name) = &self.model_name {
            config.model.name = name.clone();
        }
        if let Some(confidence) = self.confidence {
            config.model.confidence_threshold = confidence;
        }
        if let Some(skip) = self.skip {
            config.model.skip_frames = skip;
        }
        if let Some(warmup) = self.warmup {
            config.camera.warmup_frames = warmup;
        }
        if self.headless {
            config.display.headless = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(path) = &self.log_file {
            config.output.log_file = Some(path.clone());
        }
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("无法创建日志文件 {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn print_banner(config: &AppConfig) {
    let rule = "=".repeat(70);
    println!("{rule}");
    println!("LIVE OBJECT DETECTION");
    println!("{rule}");
    println!("Model: {} ({})", config.model.name, config.model.path.display());
    match &config.camera.replay_dir {
        Some(dir) => println!("Source: replay {}", dir.display()),
        None => println!(
            "Source: camera {} ({}x{} @ {} fps)",
            config.camera.index, config.camera.width, config.camera.height, config.camera.fps
        ),
    }
    println!("Confidence threshold: {}", config.model.confidence_threshold);
    println!("Detect every {} frame(s)", config.model.skip_frames);
    println!();
    println!("Controls:");
    println!("  '{}' - quit", config.keys.quit);
    println!("  '{}' - pause/resume detection", config.keys.pause);
    println!("  '{}' - save screenshot", config.keys.screenshot);
    println!("{rule}");
}

fn open_source(config: &AppConfig) -> Result<Box<dyn FrameSource>> {
    if let Some(dir) = &config.camera.replay_dir {
        return Ok(Box::new(ImageDirSource::open(dir)?));
    }
    open_camera(config)
}

#[cfg(feature = "camera")]
fn open_camera(config: &AppConfig) -> Result<Box<dyn FrameSource>> {
    let camera = livedet::source::CameraSource::open(&config.camera)?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "camera"))]
fn open_camera(_config: &AppConfig) -> Result<Box<dyn FrameSource>> {
    anyhow::bail!("未启用 camera 特性，请使用 --replay 指定图片目录")
}

#[cfg(feature = "onnx")]
fn open_detector(config: &AppConfig) -> Result<Box<dyn Detector>> {
    let model = &config.model;
    let detector = livedet::detect::YoloDetector::from_path(&model.path, model.input_width, model.input_height)
        .with_context(|| format!("无法加载模型 {}", model.path.display()))?
        .with_nms_threshold(model.nms_threshold);
    Ok(Box::new(detector))
}

#[cfg(not(feature = "onnx"))]
fn open_detector(_config: &AppConfig) -> Result<Box<dyn Detector>> {
    anyhow::bail!("未启用 onnx 特性，没有可用的检测后端")
}

fn open_display(config: &AppConfig) -> Box<dyn Display> {
    if config.display.headless {
        return Box::new(HeadlessDisplay::new());
    }
    #[cfg(feature = "window")]
    {
        Box::new(livedet::display::WindowDisplay::new())
    }
    #[cfg(not(feature = "window"))]
    {
        warn!("未启用 window 特性，以无窗口模式运行");
        Box::new(HeadlessDisplay::new())
    }
}

fn run(config: &AppConfig, limit: LoopMode) -> Result<RunOutcome> {
    let detector = open_detector(config)?;
    let source = open_source(config).context("无法打开视频源")?;
    info!(source = %source.describe(), "视频源已打开");
    let display = open_display(config);

    if config.output.save_detections {
        if let Err(e) = std::fs::create_dir_all(&config.output.dir) {
            warn!(dir = %config.output.dir.display(), error = %e, "无法创建输出目录");
        }
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)).context("无法注册Ctrl+C处理器")?;

    let mut pipeline = Pipeline::new(config, source, detector, display)
        .with_shutdown(shutdown)
        .with_limit(limit);
    Ok(pipeline.run())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("错误: {e:#}");
            return ExitCode::from(1);
        }
    };
    if let Err(e) = init_tracing(args.verbose, config.output.log_file.as_deref()) {
        eprintln!("错误: {e:#}");
        return ExitCode::from(1);
    }

    print_banner(&config);
    let limit = LoopMode::from_limits(args.max_frames, args.duration_ms);

    match run(&config, limit) {
        Ok(outcome) => {
            println!("{}", outcome.report);
            if outcome.stop_reason.is_failure() {
                error!(reason = %outcome.stop_reason, "检测异常结束");
            }
            ExitCode::from(outcome.stop_reason.exit_code())
        }
        Err(e) => {
            error!("启动失败: {e:#}");
            ExitCode::from(1)
        }
    }
}
