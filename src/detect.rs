use crate::frame::Frame;
use crate::pose::{infer, preprocess, Pose, SinglePoseModel};
use crate::render::{render, Canvas};
use crate::scope::{self, TensorGauge};
use crate::Result;

/// 1検出サイクル: 前処理 → 推論 → 描画
///
/// 全体をテンソルスコープで挟み、一時テンソルは成功・失敗どちらでも
/// サイクル終了時までに解放される。返る姿勢はソースフレームの
/// ピクセル座標。失敗時はキャンバスに手を付けずにエラーを返す。
pub fn detect_once<M: SinglePoseModel>(
    frame: &Frame,
    model: &mut M,
    canvas: &mut Canvas,
    gauge: &TensorGauge,
) -> Result<Pose> {
    scope::with_scope(gauge, |scope| {
        let [_, target_h, target_w, _] = model.input_shape();
        let input = scope.track(preprocess(frame, target_w as u32, target_h as u32));
        let pose = infer(model, input.take())?;
        let pose = pose.scale_to(frame.width(), frame.height());
        render(frame, &pose, canvas);
        Ok(pose)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::estimator::stub::StubModel;
    use crate::pose::{Keypoint, KeypointIndex};
    use crate::render::{KEYPOINT_COLOR, SCORE_THRESHOLD};
    use image::RgbImage;

    /// 100x100 合成画像に1箇所明るい領域を置く
    fn synthetic_frame() -> Frame {
        let img = RgbImage::from_fn(100, 100, |x, y| {
            if (40..60).contains(&x) && (40..60).contains(&y) {
                image::Rgb([240, 240, 240])
            } else {
                image::Rgb([16, 16, 16])
            }
        });
        Frame::new(img)
    }

    #[test]
    fn test_end_to_end_cycle() {
        // スタブモデルは正規化 (0.5, 0.5, 0.8) を返す → 100x100 で (50, 50)
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.8));
        let mut canvas = Canvas::new(100, 100);
        let gauge = TensorGauge::new();

        let pose = detect_once(&synthetic_frame(), &mut model, &mut canvas, &gauge).unwrap();

        let nose = pose.get(KeypointIndex::Nose);
        assert_eq!(nose.x, 50.0);
        assert_eq!(nose.y, 50.0);
        assert!(nose.is_above(SCORE_THRESHOLD));
        assert_eq!(canvas.pixel(50, 50), KEYPOINT_COLOR);
    }

    #[test]
    fn test_no_tensor_residue_per_cycle() {
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.8));
        let mut canvas = Canvas::new(64, 64);
        let gauge = TensorGauge::new();
        let frame = synthetic_frame();

        for _ in 0..3 {
            let before = gauge.live();
            detect_once(&frame, &mut model, &mut canvas, &gauge).unwrap();
            assert_eq!(gauge.live(), before);
        }
        assert_eq!(gauge.live(), 0);
    }

    #[test]
    fn test_failure_releases_and_keeps_canvas() {
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.8));
        model.fail_at = Some(0);
        let mut canvas = Canvas::new(64, 64);
        let gauge = TensorGauge::new();

        let out = detect_once(&synthetic_frame(), &mut model, &mut canvas, &gauge);
        assert!(matches!(out, Err(crate::Error::Inference(_))));
        assert_eq!(gauge.live(), 0);
        // 失敗サイクルはキャンバスを変更しない
        assert!(canvas.buffer().iter().all(|&px| px == 0));
    }

    #[test]
    fn test_preprocess_follows_model_shape() {
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.8));
        model.shape = [1, 256, 256, 3];
        let mut canvas = Canvas::new(32, 32);
        let gauge = TensorGauge::new();
        // スタブ側が入力形状をassertする
        detect_once(&synthetic_frame(), &mut model, &mut canvas, &gauge).unwrap();
    }
}
