#[cfg(feature = "desktop")]
pub mod camera;
pub mod image;

#[cfg(feature = "desktop")]
pub use camera::CameraSource;
pub use image::ImageSource;

use crate::frame::Frame;
use crate::Result;

/// ピクセルデータを供給する側の口（静止画・カメラ・動画）
///
/// コアはソースを所有せず、サイクルごとに一時的に参照するだけ。
pub trait FrameSource {
    /// ソースの寸法 (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// 検出にかけてよい状態か。カメラは数フレームのバッファ後に真になる
    fn is_ready(&self) -> bool;

    /// 次のフレーム。ストリーム終端で None
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}
