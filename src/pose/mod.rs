pub mod estimator;
pub mod keypoint;
pub mod preprocess;

pub use estimator::{infer, SinglePoseModel};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
pub use preprocess::preprocess;
