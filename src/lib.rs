//! MMD Actor - PMD 模型 + VMD 动作的骨骼动画核心
//!
//! 提供：
//! - PMD 模型解析（顶点、索引、材质、骨骼、IK）
//! - VMD 动作解析和关键帧插值
//! - 骨骼层级和 IK 求解（LookAt / 余弦定理 / CCD）
//! - 每帧骨骼矩阵缓冲区（交给渲染层上传 GPU）

pub mod animation;
mod binary;
pub mod config;
pub mod model;
pub mod skeleton;

pub use animation::{MotionInterpolator, MotionKeyFrame, VmdMotionTable};
pub use config::AnimationConfig;
pub use model::{PmdActor, PmdData, BONE_MATRIX_CAPACITY};
pub use skeleton::{BoneIdx, BoneNode, BoneTree, BoneType, IkSolver, PmdIk};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PMD parse error: {0}")]
    PmdParse(String),

    #[error("VMD parse error: {0}")]
    VmdParse(String),
}

pub type Result<T> = std::result::Result<T, MmdError>;
