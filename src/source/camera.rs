//! 基于nokhwa的摄像头采集

use image::RgbImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};
use tracing::{info, warn};

use super::{Frame, FrameSource};
use crate::config::CameraConfig;
use crate::error::CaptureError;

pub struct CameraSource {
    camera: Camera,
    index: u32,
    streaming: bool,
}

impl CameraSource {
    /// 以请求的分辨率和帧率打开摄像头，驱动会选择最接近的格式
    ///
    /// # 参数
    /// * `config` - 摄像头编号、分辨率和帧率
    ///
    /// # 错误处理
    /// 设备不存在或无法开始采集时返回 `CaptureError::Open`
    pub fn open(config: &CameraConfig) -> Result<Self, CaptureError> {
        let open_err = |reason: String| CaptureError::Open {
            source_name: format!("camera:{}", config.index),
            reason,
        };

        let wanted = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(wanted));
        let mut camera = Camera::new(CameraIndex::Index(config.index), format)
            .map_err(|e| open_err(e.to_string()))?;
        camera.open_stream().map_err(|e| open_err(e.to_string()))?;

        let actual = camera.camera_format();
        info!(
            index = config.index,
            width = actual.width(),
            height = actual.height(),
            fps = actual.frame_rate(),
            "摄像头已打开"
        );

        Ok(Self {
            camera,
            index: config.index,
            streaming: true,
        })
    }
}

impl FrameSource for CameraSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if !self.streaming {
            return Err(CaptureError::Read("摄像头已关闭".to_string()));
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        // nokhwa依赖的image版本可能与本crate不同，经由原始字节转换
        let (width, height) = (decoded.width(), decoded.height());
        let image = RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CaptureError::Read("帧数据长度与尺寸不符".to_string()))?;
        Ok(Frame::new(image))
    }

    fn close(&mut self) {
        if self.streaming {
            self.streaming = false;
            if let Err(err) = self.camera.stop_stream() {
                warn!(index = self.index, error = %err, "关闭摄像头失败");
            }
        }
    }

    fn describe(&self) -> String {
        format!("camera:{}", self.index)
    }
}
