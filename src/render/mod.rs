pub mod canvas;
#[cfg(feature = "desktop")]
pub mod window;

pub use canvas::{render, Canvas, KEYPOINT_COLOR, KEYPOINT_RADIUS, SCORE_THRESHOLD};
#[cfg(feature = "desktop")]
pub use window::WindowPresenter;

use crate::Result;

/// キャンバスを表示サーフェスへ出す側の口
///
/// present はディスプレイのリフレッシュに律速される前提で、
/// スケジューラの唯一のバックプレッシャとして機能する。
pub trait Present {
    fn is_open(&self) -> bool;
    fn present(&mut self, canvas: &Canvas) -> Result<()>;
}
