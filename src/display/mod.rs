//! 显示与控制
//!
//! 显示端既是画面的去处，也是用户按键的来源。流水线每次迭代调用一次
//! `show`，随后用有限的超时调用一次 `poll_key`。

mod headless;
#[cfg(feature = "window")]
mod window;

pub use headless::HeadlessDisplay;
#[cfg(feature = "window")]
pub use window::WindowDisplay;

use std::time::Duration;

use crate::config::KeyBindings;
use crate::error::RenderError;
use crate::source::Frame;

/// 按键触发的控制动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePause,
    Screenshot,
}

impl KeyBindings {
    /// 将按键映射为动作，大小写不敏感
    pub fn action_for(&self, key: char) -> Option<Action> {
        let key = key.to_ascii_lowercase();
        if key == self.quit.to_ascii_lowercase() {
            Some(Action::Quit)
        } else if key == self.pause.to_ascii_lowercase() {
            Some(Action::TogglePause)
        } else if key == self.screenshot.to_ascii_lowercase() {
            Some(Action::Screenshot)
        } else {
            None
        }
    }
}

pub trait Display {
    fn show(&mut self, frame: &Frame, title: &str) -> Result<(), RenderError>;

    /// 最多等待 `timeout`，返回期间按下的键
    fn poll_key(&mut self, timeout: Duration) -> Option<char>;

    /// 窗口被用户关闭后返回false，视同退出
    fn is_open(&self) -> bool {
        true
    }

    fn close(&mut self);
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn show(&mut self, frame: &Frame, title: &str) -> Result<(), RenderError> {
        (**self).show(frame, title)
    }

    fn poll_key(&mut self, timeout: Duration) -> Option<char> {
        (**self).poll_key(timeout)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_for_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action_for('q'), Some(Action::Quit));
        assert_eq!(keys.action_for('P'), Some(Action::TogglePause));
        assert_eq!(keys.action_for('s'), Some(Action::Screenshot));
        assert_eq!(keys.action_for('x'), None);
    }
}
