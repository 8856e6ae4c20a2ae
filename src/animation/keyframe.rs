//! 动画关键帧

use std::collections::HashMap;

use glam::{Quat, Vec2, Vec3};

use super::BezierCurve;

/// 骨骼关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionKeyFrame {
    /// 帧号（30fps）
    pub frame_no: u32,
    /// 相对初始姿态的旋转
    pub quaternion: Quat,
    /// 相对初始位置的平移
    pub offset: Vec3,
    /// 旋转插值的贝塞尔控制点
    pub bezier_p1: Vec2,
    pub bezier_p2: Vec2,
}

impl MotionKeyFrame {
    /// 线性插值的关键帧
    pub fn new(frame_no: u32, quaternion: Quat, offset: Vec3) -> Self {
        let linear = BezierCurve::linear();
        Self {
            frame_no,
            quaternion,
            offset,
            bezier_p1: Vec2::new(linear.x1, linear.y1),
            bezier_p2: Vec2::new(linear.x2, linear.y2),
        }
    }

    pub fn with_bezier(mut self, p1: Vec2, p2: Vec2) -> Self {
        self.bezier_p1 = p1;
        self.bezier_p2 = p2;
        self
    }

    /// 到下一关键帧之间的旋转缓动曲线
    pub fn rotation_curve(&self) -> BezierCurve {
        BezierCurve::from_control_points(self.bezier_p1, self.bezier_p2)
    }
}

/// Morph 关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphKeyFrame {
    pub frame_no: u32,
    pub weight: f32,
}

impl MorphKeyFrame {
    pub fn new(frame_no: u32, weight: f32) -> Self {
        Self { frame_no, weight }
    }
}

/// IK 开关记录
///
/// 某一帧开始生效的 IK 启用状态，只包含记录中出现的骨骼。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IkEnableRecord {
    pub frame_no: u32,
    /// 模型显示标志
    pub show: bool,
    /// IK 骨骼名 -> 是否启用
    pub enables: HashMap<String, bool>,
}

impl IkEnableRecord {
    pub fn new(frame_no: u32) -> Self {
        Self {
            frame_no,
            show: true,
            enables: HashMap::new(),
        }
    }

    pub fn with_enable(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.enables.insert(name.into(), enabled);
        self
    }

    /// 记录中没有该骨骼时返回 None
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.enables.get(name).copied()
    }
}
