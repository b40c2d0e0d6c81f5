use std::path::Path;

use crate::frame::Frame;
use crate::source::FrameSource;
use crate::{Error, Result};

/// 静止画ファイルのフレームソース
///
/// 単発検出用。ストリームとして読むと1フレームで終端になる。
pub struct ImageSource {
    frame: Frame,
    emitted: bool,
}

impl ImageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref())
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .to_rgb8();
        Ok(Self {
            frame: Frame::new(img),
            emitted: false,
        })
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self {
            frame,
            emitted: false,
        }
    }

    /// デコード済みフレームへの参照（単発検出パス用）
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameSource for ImageSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    /// デコードが済んでいる時点で常に準備完了
    fn is_ready(&self) -> bool {
        true
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.emitted {
            return Ok(None);
        }
        self.emitted = true;
        Ok(Some(self.frame.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_single_frame_stream() {
        let mut source = ImageSource::from_frame(Frame::new(RgbImage::new(8, 6)));
        assert!(source.is_ready());
        assert_eq!(source.dimensions(), (8, 6));
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }
}
