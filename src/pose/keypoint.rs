/// MoveNet系モデルの 17 キーポイントインデックス (COCO順)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// 単一キーポイント
///
/// x, y の意味は持ち手次第: 推論直後はモデル空間の正規化座標 (0.0〜1.0)、
/// `Pose::scale_to` 後はソースフレームのピクセル座標。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub score: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    /// スコアが閾値を超えているか（ちょうど閾値は不合格）
    pub fn is_above(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// 17キーポイントからなる単一人物の姿勢
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// 正規化座標をピクセル座標に変換した姿勢を返す
    pub fn scale_to(&self, width: u32, height: u32) -> Pose {
        let mut keypoints = self.keypoints;
        for kp in keypoints.iter_mut() {
            kp.x *= width as f32;
            kp.y *= height as f32;
        }
        Pose { keypoints }
    }

    /// 閾値を超えたキーポイントのみ列挙
    pub fn iter_above(&self, threshold: f32) -> impl Iterator<Item = (KeypointIndex, &Keypoint)> {
        self.keypoints
            .iter()
            .enumerate()
            .filter(move |(_, kp)| kp.is_above(threshold))
            .map(|(i, kp)| (KeypointIndex::from_index(i).unwrap(), kp))
    }

    /// 全キーポイントの平均スコア
    pub fn average_score(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.score).sum();
        sum / KeypointIndex::COUNT as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_count() {
        assert_eq!(KeypointIndex::COUNT, 17);
        assert_eq!(KeypointIndex::from_index(0), Some(KeypointIndex::Nose));
        assert_eq!(KeypointIndex::from_index(16), Some(KeypointIndex::RightAnkle));
        assert_eq!(KeypointIndex::from_index(17), None);
    }

    #[test]
    fn test_is_above_strict() {
        let kp = Keypoint::new(0.5, 0.5, 0.5);
        assert!(!kp.is_above(0.5));
        assert!(Keypoint::new(0.5, 0.5, 0.51).is_above(0.5));
    }

    #[test]
    fn test_scale_to_pixels() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[KeypointIndex::Nose as usize] = Keypoint::new(0.5, 0.25, 0.9);
        let pose = Pose::new(keypoints).scale_to(640, 480);
        let nose = pose.get(KeypointIndex::Nose);
        assert_eq!(nose.x, 320.0);
        assert_eq!(nose.y, 120.0);
        assert_eq!(nose.score, 0.9);
    }

    #[test]
    fn test_iter_above() {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        keypoints[0] = Keypoint::new(10.0, 20.0, 0.9);
        keypoints[1] = Keypoint::new(50.0, 60.0, 0.3);
        let pose = Pose::new(keypoints);
        let above: Vec<_> = pose.iter_above(0.5).collect();
        assert_eq!(above.len(), 1);
        assert_eq!(above[0].0, KeypointIndex::Nose);
    }

    #[test]
    fn test_average_score() {
        let keypoints = [Keypoint::new(0.0, 0.0, 0.5); KeypointIndex::COUNT];
        let pose = Pose::new(keypoints);
        assert!((pose.average_score() - 0.5).abs() < 1e-6);
    }
}
