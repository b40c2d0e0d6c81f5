use image::RgbImage;

use crate::frame::Frame;
use crate::pose::Pose;

/// 描画対象になるスコアの下限（これ以下は一切描かない）。設計定数
pub const SCORE_THRESHOLD: f32 = 0.5;

/// キーポイント円の半径 (px)
pub const KEYPOINT_RADIUS: i32 = 5;

/// キーポイントの色 (RGB)
pub const KEYPOINT_COLOR: u32 = 0xFF0000; // 赤

/// オフスクリーンの2D描画サーフェス (0x00RRGGBB)
///
/// コアはここへ書くだけで、読み返すのは検証時のみ。
pub struct Canvas {
    buf: Vec<u32>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buf: vec![0u32; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// minifb の update_with_buffer へそのまま渡せる生バッファ
    pub fn buffer(&self) -> &[u32] {
        &self.buf
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.width + x]
    }

    /// 全面クリア（黒）
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// ソースフレームをキャンバス全面へスケールして描画
    pub fn draw_frame(&mut self, frame: &Frame) {
        let fw = frame.width() as usize;
        let fh = frame.height() as usize;
        if fw == 0 || fh == 0 {
            return;
        }

        for y in 0..self.height {
            let sy = (y * fh / self.height).min(fh - 1) as u32;
            for x in 0..self.width {
                let sx = (x * fw / self.width).min(fw - 1) as u32;
                let [r, g, b] = frame.pixel(sx, sy);
                self.buf[y * self.width + x] =
                    ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
            }
        }
    }

    /// 姿勢を描画
    ///
    /// キーポイントはソースフレームのピクセル座標で受け取り、
    /// キャンバス寸法に合わせてスケールする。
    /// スコアが閾値を超えたものだけ、配列順に同一の円を打つ。
    pub fn draw_pose(&mut self, pose: &Pose, src_w: u32, src_h: u32) {
        if src_w == 0 || src_h == 0 {
            return;
        }
        let sx = self.width as f32 / src_w as f32;
        let sy = self.height as f32 / src_h as f32;

        for (_, kp) in pose.iter_above(SCORE_THRESHOLD) {
            let cx = (kp.x * sx) as i32;
            let cy = (kp.y * sy) as i32;
            self.draw_circle(cx, cy, KEYPOINT_RADIUS, KEYPOINT_COLOR);
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    /// PNG保存用にRGB画像へ変換
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let px = self.buf[y as usize * self.width + x as usize];
            image::Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
        })
    }
}

/// 1サイクル分のオーバーレイ描画: クリア → フレーム → キーポイント
pub fn render(frame: &Frame, pose: &Pose, canvas: &mut Canvas) {
    canvas.clear();
    canvas.draw_frame(frame);
    canvas.draw_pose(pose, frame.width(), frame.height());
}
