//! 动画配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use glam::Vec3;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 动画配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    // ========== 播放 ==========
    /// 动作帧率，默认 30.0（VMD 固定帧率）
    pub fps: f32,
    /// 层级合成的起点骨骼名，默认 "センター"
    pub root_bone_name: String,

    // ========== 插值 ==========
    /// 贝塞尔曲线牛顿迭代次数上限，默认 12
    pub bezier_iterations: u32,
    /// 贝塞尔曲线牛顿迭代的收敛误差，默认 0.0005
    pub bezier_epsilon: f32,

    // ========== IK ==========
    /// 膝盖骨骼名称片段（区分大小写的子串匹配），默认 "ひざ"
    pub knee_name_token: String,
    /// 膝盖类骨骼使用的固定旋转轴，默认 X 轴
    pub lateral_axis: Vec3,
    /// CCD 终止距离，默认 1e-4
    pub ccd_epsilon: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            root_bone_name: "センター".to_string(),

            bezier_iterations: 12,
            bezier_epsilon: 0.0005,

            // 膝盖只允许绕横向轴弯曲，避免扭转
            knee_name_token: "ひざ".to_string(),
            lateral_axis: Vec3::X,
            ccd_epsilon: 1e-4,
        }
    }
}

/// 全局配置实例
static ANIMATION_CONFIG: Lazy<RwLock<AnimationConfig>> =
    Lazy::new(|| RwLock::new(AnimationConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> AnimationConfig {
    ANIMATION_CONFIG
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: AnimationConfig) {
    *ANIMATION_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(AnimationConfig::default());
}
