//! PMD 模型数据和运行时

mod data;
mod loader;
mod material;
mod runtime;
mod vertex;

pub use data::PmdData;
pub use material::{MaterialForShader, PmdMaterial, TexturePaths};
pub use runtime::PmdActor;
pub use vertex::{VertexAttribute, VertexFormat, VertexSource, PMD_INPUT_LAYOUT};

use glam::{Vec2, Vec3};

/// 骨骼矩阵缓冲区容量（与着色器常量缓冲区一致）
pub const BONE_MATRIX_CAPACITY: usize = 256;

/// PMD 顶点的字节数
pub const PMD_VERTEX_STRIDE: usize = 38;

/// PMD 文件头
#[derive(Clone, Debug, Default)]
pub struct PmdHeader {
    pub version: f32,
    pub model_name: String,
    pub comment: String,
}

/// PMD 顶点
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PmdVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub bone_no: [u16; 2],
    /// 第一个骨骼的权重 (0-100)
    pub weight: u8,
    pub edge_flg: u8,
}
