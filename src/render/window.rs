use std::time::Duration;

use anyhow::Result;
use minifb::{Key, Window, WindowOptions};

use crate::render::{Canvas, Present};
use crate::Error;

/// minifbウィンドウへの表示
///
/// update_with_buffer をリフレッシュレートに律速させることで、
/// 連続検出ループのペーシングを担う。
pub struct WindowPresenter {
    window: Window,
    width: usize,
    height: usize,
}

impl WindowPresenter {
    /// ウィンドウを作成 (約60fpsに制限)
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.limit_update_rate(Some(Duration::from_micros(16_600)));

        Ok(Self {
            window,
            width,
            height,
        })
    }
}

impl Present for WindowPresenter {
    /// ウィンドウが開いているか (Escで閉じる)
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    fn present(&mut self, canvas: &Canvas) -> crate::Result<()> {
        self.window
            .update_with_buffer(canvas.buffer(), self.width, self.height)
            .map_err(|e| Error::Present(e.to_string()))
    }
}
