//! 动画系统
//!
//! 提供 VMD 动作解析、关键帧查找和贝塞尔插值。

mod bezier;
mod keyframe;
mod motion;
mod motion_track;
mod vmd_loader;

pub use bezier::{BezierCurve, DEFAULT_BEZIER_EPSILON, DEFAULT_BEZIER_ITERATIONS};
pub use keyframe::{IkEnableRecord, MorphKeyFrame, MotionKeyFrame};
pub use motion::VmdMotionTable;
pub use motion_track::{BoneFrameTransform, MotionInterpolator};
