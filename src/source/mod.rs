//! 帧来源
//!
//! `FrameSource` 屏蔽具体的采集硬件和驱动：打开由各实现的构造函数完成，
//! 之后只需 `read` 和 `close`。

mod frame;
mod replay;

#[cfg(feature = "camera")]
mod camera;

pub use frame::Frame;
pub use replay::ImageDirSource;

#[cfg(feature = "camera")]
pub use camera::CameraSource;

use crate::error::CaptureError;

pub trait FrameSource {
    /// 读取下一帧，阻塞直到有帧或出错
    fn read(&mut self) -> Result<Frame, CaptureError>;

    /// 释放底层资源，之后的 `read` 都会失败
    fn close(&mut self);

    fn describe(&self) -> String {
        "frame-source".to_string()
    }

    /// 预热：读取并丢弃 `count` 帧，让摄像头自动曝光稳定下来
    fn warmup(&mut self, count: u32) -> Result<(), CaptureError> {
        for _ in 0..count {
            self.read()?;
        }
        Ok(())
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        (**self).read()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn warmup(&mut self, count: u32) -> Result<(), CaptureError> {
        (**self).warmup(count)
    }
}
