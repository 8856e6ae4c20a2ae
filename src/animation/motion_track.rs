//! 关键帧插值
//!
//! 一个骨骼在某一帧的前后关键帧对，以及插值结果。

use glam::{Mat4, Quat, Vec3};

use super::bezier::{DEFAULT_BEZIER_EPSILON, DEFAULT_BEZIER_ITERATIONS};
use super::MotionKeyFrame;

/// 骨骼帧变换结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneFrameTransform {
    /// 平移
    pub offset: Vec3,
    /// 旋转
    pub orientation: Quat,
}

impl Default for BoneFrameTransform {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl From<&MotionKeyFrame> for BoneFrameTransform {
    fn from(key: &MotionKeyFrame) -> Self {
        Self {
            offset: key.offset,
            orientation: key.quaternion,
        }
    }
}

impl BoneFrameTransform {
    /// 本地矩阵：绕初始位置旋转后再平移
    pub fn local_matrix(&self, rest_pos: Vec3) -> Mat4 {
        Mat4::from_translation(self.offset)
            * Mat4::from_translation(rest_pos)
            * Mat4::from_quat(self.orientation)
            * Mat4::from_translation(-rest_pos)
    }
}

/// 某一帧的插值描述：begin 为不晚于该帧的最后关键帧，end 为其后一帧
#[derive(Debug, Clone, Copy)]
pub struct MotionInterpolator<'a> {
    pub name: &'a str,
    pub begin: &'a MotionKeyFrame,
    pub end: &'a MotionKeyFrame,
}

impl<'a> MotionInterpolator<'a> {
    /// 线性时间比例，限制在 [0, 1]
    pub fn linear_t(&self, frame_no: u32) -> f32 {
        if self.begin.frame_no == self.end.frame_no {
            return 0.0;
        }
        let span = self.end.frame_no as f32 - self.begin.frame_no as f32;
        ((frame_no as f32 - self.begin.frame_no as f32) / span).clamp(0.0, 1.0)
    }

    /// 按线性时间比例 t 插值（t 经过 begin 关键帧的贝塞尔曲线缓动）
    pub fn interpolate(&self, t: f32, iterations: u32, epsilon: f32) -> BoneFrameTransform {
        let eased = self.begin.rotation_curve().evaluate_with(t, iterations, epsilon);
        BoneFrameTransform {
            offset: self.begin.offset.lerp(self.end.offset, eased),
            orientation: self.begin.quaternion.slerp(self.end.quaternion, eased),
        }
    }

    pub fn evaluate_with(&self, frame_no: u32, iterations: u32, epsilon: f32) -> BoneFrameTransform {
        // 前后是同一帧时保持 begin
        if self.begin.frame_no == self.end.frame_no {
            return BoneFrameTransform::from(self.begin);
        }
        self.interpolate(self.linear_t(frame_no), iterations, epsilon)
    }

    /// 使用默认贝塞尔参数求值
    pub fn evaluate(&self, frame_no: u32) -> BoneFrameTransform {
        self.evaluate_with(frame_no, DEFAULT_BEZIER_ITERATIONS, DEFAULT_BEZIER_EPSILON)
    }

    /// 插值后的旋转矩阵
    pub fn slerp(&self, frame_no: u32) -> Mat4 {
        Mat4::from_quat(self.evaluate(frame_no).orientation)
    }
}
