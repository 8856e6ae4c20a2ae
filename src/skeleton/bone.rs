//! 骨骼节点

use glam::Vec3;

/// 骨骼索引（与骨骼表下标一致）
pub type BoneIdx = usize;

/// 骨骼种类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneType {
    Rotation,
    RotationAndMove,
    Ik,
    Undefined,
    IkChild,
    RotationChild,
    IkDestination,
    Invisible,
}

impl BoneType {
    /// 从文件中的原始值转换，未知值视为 Undefined
    pub fn from_raw(value: u8) -> Self {
        match value {
            0 => BoneType::Rotation,
            1 => BoneType::RotationAndMove,
            2 => BoneType::Ik,
            4 => BoneType::IkChild,
            5 => BoneType::RotationChild,
            6 => BoneType::IkDestination,
            7 => BoneType::Invisible,
            _ => BoneType::Undefined,
        }
    }
}

/// PMD 骨骼记录（文件中的原始数据）
#[derive(Clone, Debug)]
pub struct PmdBone {
    pub name: String,
    pub parent_bone_no: u16,
    pub tail_bone_no: u16,
    pub bone_type: u8,
    pub ik_parent_bone: u16,
    pub position: Vec3,
}

impl PmdBone {
    /// 创建没有父骨骼的记录
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            parent_bone_no: u16::MAX,
            tail_bone_no: 0,
            bone_type: 0,
            ik_parent_bone: 0,
            position,
        }
    }

    pub fn with_parent(mut self, parent: u16) -> Self {
        self.parent_bone_no = parent;
        self
    }
}

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct BoneNode {
    pub bone_idx: BoneIdx,
    pub name: String,
    pub bone_type: BoneType,
    pub parent: Option<BoneIdx>,
    pub tail: Option<BoneIdx>,
    /// IK 计算前需要剔除其累计变换的骨骼
    pub ik_parent_bone: Option<BoneIdx>,
    /// 初始位置（旋转中心）
    pub start_pos: Vec3,
    pub(crate) children: Vec<BoneIdx>,
}

impl BoneNode {
    /// 从 PMD 骨骼记录创建（父子关系在 BoneTree::create 中建立）
    ///
    /// 越界或指向自身的 tail / ik_parent_bone 视为没有。
    pub fn from_pmd_bone(idx: BoneIdx, bone: &PmdBone, bone_count: usize) -> Self {
        let valid = |raw: u16| {
            let i = raw as usize;
            (i < bone_count && i != idx).then_some(i)
        };

        Self {
            bone_idx: idx,
            name: bone.name.clone(),
            bone_type: BoneType::from_raw(bone.bone_type),
            parent: None,
            tail: valid(bone.tail_bone_no),
            // 0 表示没有
            ik_parent_bone: valid(bone.ik_parent_bone).filter(|&i| i != 0),
            start_pos: bone.position,
            children: Vec::new(),
        }
    }

    /// 子骨骼索引
    pub fn children(&self) -> &[BoneIdx] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// IK 约束
#[derive(Clone, Debug)]
pub struct PmdIk {
    /// IK 骨骼（驱动目标位置的骨骼，不是链末端）
    pub bone_idx: BoneIdx,
    /// 链末端骨骼
    pub target_idx: BoneIdx,
    /// 中间骨骼，按 末端 -> 根 的顺序
    pub node_idxes: Vec<BoneIdx>,
    pub iterations: u16,
    /// 每次迭代的角度上限（乘以 π 为弧度）
    pub limit: f32,
}

impl PmdIk {
    pub fn limit_radians(&self) -> f32 {
        self.limit * std::f32::consts::PI
    }

    /// 链的根骨骼
    pub fn chain_root(&self) -> Option<BoneIdx> {
        self.node_idxes.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_type_from_raw() {
        assert_eq!(BoneType::from_raw(0), BoneType::Rotation);
        assert_eq!(BoneType::from_raw(2), BoneType::Ik);
        assert_eq!(BoneType::from_raw(3), BoneType::Undefined);
        assert_eq!(BoneType::from_raw(7), BoneType::Invisible);
        assert_eq!(BoneType::from_raw(9), BoneType::Undefined);
    }

    #[test]
    fn test_out_of_range_links_are_none() {
        let mut bone = PmdBone::new("腕", Vec3::ONE);
        bone.tail_bone_no = 5;
        bone.ik_parent_bone = 1;
        let node = BoneNode::from_pmd_bone(1, &bone, 3);
        assert_eq!(node.tail, None);
        // 指向自身视为无效
        assert_eq!(node.ik_parent_bone, None);
        assert!(node.is_root());
    }

    #[test]
    fn test_limit_radians() {
        let ik = PmdIk {
            bone_idx: 0,
            target_idx: 1,
            node_idxes: vec![2],
            iterations: 4,
            limit: 0.5,
        };
        assert!((ik.limit_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(ik.chain_root(), Some(2));
    }
}
