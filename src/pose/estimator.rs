use ndarray::Array4;

use crate::pose::Pose;
use crate::Result;

/// 単一人物姿勢推定モデルの入口
///
/// 実体は `model::ModelHandle`。テストではスタブ実装を差し込む。
pub trait SinglePoseModel {
    /// 期待する入力形状 [batch, height, width, channels]
    fn input_shape(&self) -> [usize; 4];

    /// 前処理済みテンソルから姿勢を1つ推定する
    ///
    /// 返る座標はモデル空間の正規化座標 (0.0〜1.0)。
    /// flip_horizontal が真なら x 座標を左右反転して返す。
    fn estimate_single_pose(&mut self, input: Array4<f32>, flip_horizontal: bool) -> Result<Pose>;
}

/// 推論エンジン: 水平反転なし固定でモデルを1回実行する
///
/// リトライしない。失敗は `Error::Inference` として呼び出し元に伝播する。
pub fn infer<M: SinglePoseModel>(model: &mut M, input: Array4<f32>) -> Result<Pose> {
    model.estimate_single_pose(input, false)
}


#[cfg(test)]
mod tests {
    use super::stub::StubModel;
    use super::*;
    use crate::pose::{Keypoint, KeypointIndex};

    #[test]
    fn test_infer_does_not_flip() {
        let mut model = StubModel::fixed(Keypoint::new(0.25, 0.75, 0.8));
        let input = Array4::zeros((1, 192, 192, 3));
        let pose = infer(&mut model, input).unwrap();
        let nose = pose.get(KeypointIndex::Nose);
        assert_eq!(nose.x, 0.25);
        assert_eq!(nose.y, 0.75);
    }

    #[test]
    fn test_fresh_result_per_call() {
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.9));
        let a = infer(&mut model, Array4::zeros((1, 192, 192, 3))).unwrap();
        let b = infer(&mut model, Array4::zeros((1, 192, 192, 3))).unwrap();
        assert_eq!(a.get(KeypointIndex::Nose), b.get(KeypointIndex::Nose));
        assert_eq!(model.calls, 2);
    }

    #[test]
    fn test_failure_propagates() {
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.9));
        model.fail_at = Some(0);
        let out = infer(&mut model, Array4::zeros((1, 192, 192, 3)));
        assert!(matches!(out, Err(crate::Error::Inference(_))));
    }
}
