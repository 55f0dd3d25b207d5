use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Frame, FrameSource};
use crate::error::CaptureError;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// 按文件名顺序回放目录中的图片
///
/// 有限视频源，读完后返回 `CaptureError::EndOfStream`。
pub struct ImageDirSource {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
    /// 解码后统一缩放到该尺寸，None表示保持原尺寸
    resize_to: Option<(u32, u32)>,
    closed: bool,
}

impl ImageDirSource {
    /// 打开图片目录
    ///
    /// 收集扩展名为 jpg、jpeg、png、bmp、webp 的文件并按文件名排序。
    ///
    /// # 参数
    /// * `dir` - 图片目录
    ///
    /// # 错误处理
    /// 目录不可读或其中没有图片时返回 `CaptureError::Open`
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use livedet::source::{FrameSource, ImageDirSource};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut source = ImageDirSource::open(Path::new("frames"))?.with_resize(1280, 720);
    /// let frame = source.read()?;
    /// assert_eq!((frame.width(), frame.height()), (1280, 720));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(dir: &Path) -> Result<Self, CaptureError> {
        let open_err = |reason: String| CaptureError::Open {
            source_name: dir.display().to_string(),
            reason,
        };

        let entries = std::fs::read_dir(dir).map_err(|e| open_err(e.to_string()))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        if files.is_empty() {
            return Err(open_err("目录中没有图片".to_string()));
        }
        files.sort();
        debug!(dir = %dir.display(), count = files.len(), "打开图片回放源");

        Ok(Self {
            dir: dir.to_path_buf(),
            pending: files.into(),
            resize_to: None,
            closed: false,
        })
    }

    /// 解码后统一缩放到指定尺寸，模拟固定分辨率的摄像头
    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize_to = Some((width, height));
        self
    }

    /// 尚未读取的图片数量
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageDirSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if self.closed {
            return Err(CaptureError::Read("视频源已关闭".to_string()));
        }
        let Some(path) = self.pending.pop_front() else {
            return Err(CaptureError::EndOfStream);
        };
        let image = image::open(&path)
            .map_err(|e| CaptureError::Read(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let image = match self.resize_to {
            Some((w, h)) if image.dimensions() != (w, h) => {
                image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle)
            }
            _ => image,
        };
        Ok(Frame::new(image))
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }

    fn describe(&self) -> String {
        format!("replay:{}", self.dir.display())
    }
}
