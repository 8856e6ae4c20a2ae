//! 顶点数据的上传接口
//!
//! 渲染层只需要原始字节、步长和输入布局，不关心具体的模型格式。

use super::{PmdData, PMD_VERTEX_STRIDE};

/// 顶点属性格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Uint16x2,
    Uint8,
}

impl VertexFormat {
    pub fn size(self) -> usize {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Uint16x2 => 4,
            VertexFormat::Uint8 => 1,
        }
    }
}

/// 输入布局中的一个属性
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub format: VertexFormat,
    /// 在顶点内的字节偏移
    pub offset: usize,
}

/// 可以上传到 GPU 的顶点数据
pub trait VertexSource {
    /// 所有顶点的原始字节
    fn vertex_bytes(&self) -> &[u8];

    /// 每个顶点的字节数
    fn vertex_stride(&self) -> usize;

    fn input_layout(&self) -> &'static [VertexAttribute];

    fn vertex_count(&self) -> usize {
        match self.vertex_stride() {
            0 => 0,
            stride => self.vertex_bytes().len() / stride,
        }
    }
}

/// PMD 顶点布局 (38 字节)
pub const PMD_INPUT_LAYOUT: &[VertexAttribute] = &[
    VertexAttribute {
        semantic: "POSITION",
        semantic_index: 0,
        format: VertexFormat::Float32x3,
        offset: 0,
    },
    VertexAttribute {
        semantic: "NORMAL",
        semantic_index: 0,
        format: VertexFormat::Float32x3,
        offset: 12,
    },
    VertexAttribute {
        semantic: "TEXCOORD",
        semantic_index: 0,
        format: VertexFormat::Float32x2,
        offset: 24,
    },
    VertexAttribute {
        semantic: "BONE_NO",
        semantic_index: 0,
        format: VertexFormat::Uint16x2,
        offset: 32,
    },
    VertexAttribute {
        semantic: "WEIGHT",
        semantic_index: 0,
        format: VertexFormat::Uint8,
        offset: 36,
    },
    VertexAttribute {
        semantic: "EDGE_FLG",
        semantic_index: 0,
        format: VertexFormat::Uint8,
        offset: 37,
    },
];

impl VertexSource for PmdData {
    fn vertex_bytes(&self) -> &[u8] {
        self.raw_vertices()
    }

    fn vertex_stride(&self) -> usize {
        PMD_VERTEX_STRIDE
    }

    fn input_layout(&self) -> &'static [VertexAttribute] {
        PMD_INPUT_LAYOUT
    }
}
