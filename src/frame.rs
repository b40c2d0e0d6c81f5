use image::RgbImage;

/// ソースから取り出した1フレーム（RGB8、所有バッファ）
///
/// 画像ファイル・カメラのどちら由来でも同じ形で扱う。
/// 検出サイクルはこのフレームを参照するだけで、所有はしない。
#[derive(Debug, Clone)]
pub struct Frame {
    img: RgbImage,
}

impl Frame {
    pub fn new(img: RgbImage) -> Self {
        Self { img }
    }

    /// 生のRGB8バッファから構築。長さが width*height*3 と一致しない場合は None
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(|img| Self { img })
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    /// ピクセル取得（RGB）
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.img.get_pixel(x, y).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_length_mismatch() {
        assert!(Frame::from_raw(4, 4, vec![0u8; 4 * 4 * 3]).is_some());
        assert!(Frame::from_raw(4, 4, vec![0u8; 10]).is_none());
    }

    #[test]
    fn test_pixel_access() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, image::Rgb([10, 20, 30]));
        let frame = Frame::new(img);
        assert_eq!(frame.pixel(1, 0), [10, 20, 30]);
        assert_eq!(frame.pixel(0, 0), [0, 0, 0]);
    }
}
