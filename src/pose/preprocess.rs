use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::frame::Frame;

/// フレームをモデル入力テンソルに変換
///
/// - バイリニア補間で (target_h, target_w) にリサイズ
/// - 先頭にバッチ次元 1 を追加して [1, H, W, 3]
/// - f32 化して 255.0 で割り、値域を 0.0〜1.0 に正規化
///
/// 同一ピクセル入力に対して出力はビット単位で決定的。
pub fn preprocess(frame: &Frame, target_w: u32, target_h: u32) -> Array4<f32> {
    let resized = imageops::resize(frame.image(), target_w, target_h, FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, target_h as usize, target_w as usize, 3));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = px.0[c] as f32 / 255.0;
        }
    }

    tensor
}
