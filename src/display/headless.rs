use std::time::Duration;

use tracing::debug;

use super::Display;
use crate::error::RenderError;
use crate::source::Frame;

/// 无窗口显示端：只统计帧数，没有按键输入
///
/// 退出依赖Ctrl+C、运行上限或视频源结束。
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    shown: u64,
    closed: bool,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_shown(&self) -> u64 {
        self.shown
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, _frame: &Frame, _title: &str) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Display("显示端已关闭".to_string()));
        }
        self.shown += 1;
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Option<char> {
        None
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!(frames = self.shown, "关闭无窗口显示端");
        }
    }
}
