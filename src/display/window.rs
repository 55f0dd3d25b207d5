//! 基于minifb的预览窗口

use std::thread;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::debug;

use super::Display;
use crate::error::RenderError;
use crate::source::Frame;

/// 第一次 `show` 时按帧尺寸创建窗口
#[derive(Default)]
pub struct WindowDisplay {
    window: Option<Window>,
    buffer: Vec<u32>,
    size: (usize, usize),
    closed: bool,
}

impl WindowDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for WindowDisplay {
    fn show(&mut self, frame: &Frame, title: &str) -> Result<(), RenderError> {
        if self.closed {
            return Err(RenderError::Display("窗口已关闭".to_string()));
        }
        let size = (frame.width() as usize, frame.height() as usize);
        if self.window.is_none() || self.size != size {
            let window = Window::new(title, size.0, size.1, WindowOptions::default())
                .map_err(|e| RenderError::Display(e.to_string()))?;
            debug!(width = size.0, height = size.1, "创建预览窗口");
            self.window = Some(window);
            self.size = size;
        }

        // minifb 使用 0RGB 排布
        self.buffer.clear();
        self.buffer.extend(frame.image().pixels().map(|p| {
            let [r, g, b] = p.0;
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        }));

        match self.window.as_mut() {
            Some(window) => window
                .update_with_buffer(&self.buffer, size.0, size.1)
                .map_err(|e| RenderError::Display(e.to_string())),
            None => Err(RenderError::Display("窗口未创建".to_string())),
        }
    }

    fn poll_key(&mut self, timeout: Duration) -> Option<char> {
        let window = self.window.as_mut()?;
        if !timeout.is_zero() {
            thread::sleep(timeout);
        }
        window.update();
        window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .find_map(key_to_char)
    }

    fn is_open(&self) -> bool {
        !self.closed && self.window.as_ref().map(|w| w.is_open()).unwrap_or(true)
    }

    fn close(&mut self) {
        self.closed = true;
        self.window = None;
    }
}

fn key_to_char(key: Key) -> Option<char> {
    const LETTERS: [Key; 26] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I, Key::J, Key::K,
        Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R, Key::S, Key::T, Key::U, Key::V,
        Key::W, Key::X, Key::Y, Key::Z,
    ];
    const DIGITS: [Key; 10] = [
        Key::Key0, Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6, Key::Key7,
        Key::Key8, Key::Key9,
    ];

    if let Some(i) = LETTERS.iter().position(|k| *k == key) {
        return Some((b'a' + i as u8) as char);
    }
    if let Some(i) = DIGITS.iter().position(|k| *k == key) {
        return Some((b'0' + i as u8) as char);
    }
    match key {
        Key::Space => Some(' '),
        Key::Escape => Some('\u{1b}'),
        _ => None,
    }
}
