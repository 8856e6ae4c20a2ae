//! 骨骼层级

use glam::Mat4;
use std::collections::HashMap;

use super::{BoneIdx, BoneNode, PmdBone};

/// 骨骼树
///
/// 所有节点保存在一个数组中，子节点以索引引用，构建之后不再变动。
#[derive(Clone, Debug, Default)]
pub struct BoneTree {
    nodes: Vec<BoneNode>,
    name_to_index: HashMap<String, BoneIdx>,
}

impl BoneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从骨骼记录构建层级
    ///
    /// 父索引越界的骨骼视为根骨骼。会形成环的父索引同样被忽略。
    pub fn create(bones: &[PmdBone]) -> Self {
        let bone_count = bones.len();
        let mut nodes: Vec<BoneNode> = bones
            .iter()
            .enumerate()
            .map(|(idx, bone)| BoneNode::from_pmd_bone(idx, bone, bone_count))
            .collect();

        let mut name_to_index = HashMap::with_capacity(bone_count);
        for node in &nodes {
            // 重名时保留第一个
            name_to_index.entry(node.name.clone()).or_insert(node.bone_idx);
        }

        // 建立父子关系
        for (idx, bone) in bones.iter().enumerate() {
            let parent = bone.parent_bone_no as usize;
            if parent >= bone_count {
                continue;
            }
            if Self::reaches(&nodes, parent, idx) {
                log::warn!("骨骼 {} ({}) 的父索引 {} 会形成环，作为根骨骼处理", idx, bone.name, parent);
                continue;
            }
            nodes[idx].parent = Some(parent);
            nodes[parent].children.push(idx);
        }

        Self {
            nodes,
            name_to_index,
        }
    }

    /// 从 from 沿已建立的父链向上能否到达 target
    fn reaches(nodes: &[BoneNode], from: BoneIdx, target: BoneIdx) -> bool {
        let mut current = Some(from);
        while let Some(idx) = current {
            if idx == target {
                return true;
            }
            current = nodes[idx].parent;
        }
        false
    }

    /// 通过名称查找骨骼
    pub fn get_bone_node(&self, name: &str) -> Option<&BoneNode> {
        self.name_to_index.get(name).map(|&idx| &self.nodes[idx])
    }

    /// 通过索引查找骨骼
    pub fn get_bone_node_by_index(&self, index: BoneIdx) -> Option<&BoneNode> {
        self.nodes.get(index)
    }

    /// 通过名称查找骨骼索引
    pub fn find_bone_by_name(&self, name: &str) -> Option<BoneIdx> {
        self.name_to_index.get(name).copied()
    }

    /// 索引 -> 名称，越界返回空字符串
    pub fn get_bone_name_from_index(&self, index: BoneIdx) -> &str {
        self.nodes.get(index).map(|n| n.name.as_str()).unwrap_or("")
    }

    /// 获取骨骼数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[BoneNode] {
        &self.nodes
    }

    /// 所有根骨骼
    pub fn roots(&self) -> impl Iterator<Item = &BoneNode> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    /// 子孙骨骼（前序遍历，不含自身）
    pub fn descendants(&self, index: BoneIdx) -> Vec<BoneIdx> {
        let mut result = Vec::new();
        let Some(node) = self.nodes.get(index) else {
            return result;
        };

        let mut stack: Vec<BoneIdx> = node.children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            result.push(idx);
            stack.extend(self.nodes[idx].children.iter().rev().copied());
        }
        result
    }

    /// ancestor 是否为 index 的祖先
    pub fn is_ancestor(&self, ancestor: BoneIdx, index: BoneIdx) -> bool {
        let mut current = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.nodes[idx].parent;
        }
        false
    }

    /// 递归合成全局矩阵：child = parent * child_local（前序遍历）
    ///
    /// matrices 中存放的是各骨骼的本地矩阵，合成结果写回原位。
    pub fn recursive_matrix_multiply(&self, matrices: &mut [Mat4], index: BoneIdx, parent: Mat4) {
        if index >= matrices.len() || index >= self.nodes.len() {
            return;
        }

        matrices[index] = parent * matrices[index];
        let current = matrices[index];

        for &child in &self.nodes[index].children {
            self.recursive_matrix_multiply(matrices, child, current);
        }
    }
}
