//! PMD 模型数据

use crate::config;
use crate::skeleton::{BoneIdx, BoneTree, PmdBone, PmdIk};

use super::{PmdHeader, PmdMaterial, PmdVertex};

/// 解析后的 PMD 模型（加载后只读）
#[derive(Clone, Debug, Default)]
pub struct PmdData {
    pub(super) header: PmdHeader,
    pub(super) vertices: Vec<PmdVertex>,
    /// 与 vertices 对应的原始顶点字节，直接用于上传
    pub(super) raw_vertices: Vec<u8>,
    pub(super) indices: Vec<u16>,
    pub(super) materials: Vec<PmdMaterial>,
    pub(super) bones: Vec<PmdBone>,
    pub(super) bone_tree: BoneTree,
    pub(super) knee_idxes: Vec<BoneIdx>,
    pub(super) ik_data: Vec<PmdIk>,
}

impl PmdData {
    /// 只有骨骼和 IK 的模型
    ///
    /// 骨骼树和膝盖列表在这里生成，膝盖名称片段取全局配置。
    pub fn with_skeleton(bones: Vec<PmdBone>, ik_data: Vec<PmdIk>) -> Self {
        let knee_token = config::get_config().knee_name_token;
        let bone_tree = BoneTree::create(&bones);
        let knee_idxes = find_knee_idxes(&bones, &knee_token);

        Self {
            bones,
            bone_tree,
            knee_idxes,
            ik_data,
            ..Default::default()
        }
    }

    pub fn header(&self) -> &PmdHeader {
        &self.header
    }

    pub fn vertices(&self) -> &[PmdVertex] {
        &self.vertices
    }

    pub fn raw_vertices(&self) -> &[u8] {
        &self.raw_vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn materials(&self) -> &[PmdMaterial] {
        &self.materials
    }

    pub fn bones(&self) -> &[PmdBone] {
        &self.bones
    }

    pub fn bone_tree(&self) -> &BoneTree {
        &self.bone_tree
    }

    /// 名称包含膝盖片段的骨骼（加载时按全局配置）
    pub fn knee_idxes(&self) -> &[BoneIdx] {
        &self.knee_idxes
    }

    /// 按给定的名称片段重新查找膝盖骨骼
    pub fn knee_idxes_for(&self, token: &str) -> Vec<BoneIdx> {
        find_knee_idxes(&self.bones, token)
    }

    /// IK 约束，保持文件中的顺序
    pub fn ik_data(&self) -> &[PmdIk] {
        &self.ik_data
    }
}

pub(super) fn find_knee_idxes(bones: &[PmdBone], token: &str) -> Vec<BoneIdx> {
    if token.is_empty() {
        return Vec::new();
    }
    bones
        .iter()
        .enumerate()
        .filter(|(_, bone)| bone.name.contains(token))
        .map(|(idx, _)| idx)
        .collect()
}
