use opencv::{
    core::{AlgorithmHint, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs},
};
use tracing::info;

use crate::frame::Frame;
use crate::source::FrameSource;
use crate::{Error, Result};

/// 準備完了とみなすまでのキャプチャ数
const READY_FRAMES: u64 = 2;

/// OpenCVによるカメラ/ビデオのフレームソース
pub struct CameraSource {
    capture: VideoCapture,
    width: u32,
    height: u32,
    frames_seen: u64,
}

impl CameraSource {
    /// カメラを開く（デフォルトカメラ: index 0）
    pub fn open(index: i32) -> Result<Self> {
        Self::open_with_resolution(index, None, None)
    }

    /// 解像度を指定してカメラを開く
    pub fn open_with_resolution(
        index: i32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self> {
        let mut capture = VideoCapture::new(index, VideoCaptureAPIs::CAP_ANY as i32)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let opened = capture
            .is_opened()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        if !opened {
            return Err(Error::SourceNotReady);
        }

        if let Some(w) = width {
            let _ = capture.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64);
        }
        if let Some(h) = height {
            let _ = capture.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64);
        }
        let _ = capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0);

        let actual_width = capture
            .get(videoio::CAP_PROP_FRAME_WIDTH)
            .map_err(|e| Error::Io(std::io::Error::other(e)))? as u32;
        let actual_height = capture
            .get(videoio::CAP_PROP_FRAME_HEIGHT)
            .map_err(|e| Error::Io(std::io::Error::other(e)))? as u32;
        info!(index, width = actual_width, height = actual_height, "camera opened");

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
            frames_seen: 0,
        })
    }

    /// BGR Mat をRGBフレームに変換
    fn to_frame(&self, bgr: &Mat) -> Result<Frame> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(
            bgr,
            &mut rgb,
            imgproc::COLOR_BGR2RGB,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let data = rgb
            .data_bytes()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .to_vec();
        Frame::from_raw(rgb.cols() as u32, rgb.rows() as u32, data)
            .ok_or(Error::SourceNotReady)
    }
}

impl FrameSource for CameraSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 最低2フレームのバッファ後に準備完了
    fn is_ready(&self) -> bool {
        self.frames_seen >= READY_FRAMES
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut bgr = Mat::default();
        let grabbed = self
            .capture
            .read(&mut bgr)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        if !grabbed || bgr.empty() {
            // 立ち上がり前の空読みは未準備、以降はストリーム終端
            return if self.frames_seen == 0 {
                Err(Error::SourceNotReady)
            } else {
                Ok(None)
            };
        }

        self.frames_seen += 1;
        self.to_frame(&bgr).map(Some)
    }
}
