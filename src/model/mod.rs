pub mod loader;

pub use loader::{load, warm_up, LoadingState};

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use crate::pose::{Keypoint, KeypointIndex, Pose, SinglePoseModel};
use crate::{Error, Result};

/// 読み込み済みモデルへのハンドル
///
/// load() が一度だけ生成し、以後は全サイクルで読み取り共有される。
pub struct ModelHandle {
    session: Session,
    input_shape: [usize; 4],
    input_name: String,
    output_name: String,
}

impl ModelHandle {
    pub(crate) fn new(
        session: Session,
        input_shape: [usize; 4],
        input_name: String,
        output_name: String,
    ) -> Self {
        Self {
            session,
            input_shape,
            input_name,
            output_name,
        }
    }
}

impl SinglePoseModel for ModelHandle {
    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    /// MoveNet系グラフを1回実行し、[1, 1, 17, 3] (y, x, score) 出力を姿勢に変換
    fn estimate_single_pose(&mut self, input: Array4<f32>, flip_horizontal: bool) -> Result<Pose> {
        let input_tensor = Tensor::from_array(input).map_err(Error::Inference)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(Error::Inference)?;

        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .map_err(Error::Inference)?;

        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        for i in 0..KeypointIndex::COUNT {
            let y = output[[0, 0, i, 0]];
            let x = output[[0, 0, i, 1]];
            let score = output[[0, 0, i, 2]];
            let x = if flip_horizontal { 1.0 - x } else { x };
            keypoints[i] = Keypoint::new(x, y, score);
        }

        Ok(Pose::new(keypoints))
    }
}
