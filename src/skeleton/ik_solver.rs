//! IK 求解器
//!
//! 根据链长度选择求解方式：
//! - 1 个中间骨骼：LookAt（直接朝向目标）
//! - 2 个中间骨骼：余弦定理（两骨骼 IK）
//! - 3 个及以上：CCD（循环坐标下降）
//!
//! 所有方式都直接修改已合成的骨骼矩阵缓冲区。

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use crate::config::AnimationConfig;

use super::{BoneIdx, BoneTree, PmdIk};

/// 长度判定为 0 的阈值
const LENGTH_EPSILON: f32 = 1e-6;

/// IK 求解器
#[derive(Clone, Debug)]
pub struct IkSolver<'a> {
    tree: &'a BoneTree,
    knee_idxes: &'a [BoneIdx],
    lateral_axis: Vec3,
    ccd_epsilon: f32,
}

impl<'a> IkSolver<'a> {
    pub fn new(tree: &'a BoneTree, knee_idxes: &'a [BoneIdx], config: &AnimationConfig) -> Self {
        Self {
            tree,
            knee_idxes,
            lateral_axis: config.lateral_axis,
            ccd_epsilon: config.ccd_epsilon,
        }
    }

    /// 求解一个 IK 约束，返回是否修改了矩阵
    ///
    /// 退化的几何情况（长度为 0、共线）直接跳过。
    pub fn solve(&self, ik: &PmdIk, matrices: &mut [Mat4]) -> bool {
        let in_range = |idx: BoneIdx| idx < matrices.len() && idx < self.tree.len();
        if !in_range(ik.bone_idx)
            || !in_range(ik.target_idx)
            || !ik.node_idxes.iter().all(|&idx| in_range(idx))
        {
            log::trace!("IK {} 引用了越界的骨骼，跳过", ik.bone_idx);
            return false;
        }

        match ik.node_idxes.len() {
            0 => {
                debug_assert!(false, "IK {} 没有中间骨骼", ik.bone_idx);
                false
            }
            1 => self.solve_look_at(ik, matrices),
            2 => self.solve_cosine_ik(ik, matrices),
            _ => self.solve_ccd_ik(ik, matrices),
        }
    }

    fn start_pos(&self, idx: BoneIdx) -> Vec3 {
        self.tree.nodes()[idx].start_pos
    }

    /// 骨骼当前（动作之后）的位置
    fn posed_pos(&self, idx: BoneIdx, matrices: &[Mat4]) -> Vec3 {
        matrices[idx].transform_point3(self.start_pos(idx))
    }

    /// LookAt：把静止姿态下 节点->末端 的方向转向 节点->IK 骨骼
    fn solve_look_at(&self, ik: &PmdIk, matrices: &mut [Mat4]) -> bool {
        let node = ik.node_idxes[0];

        let rest_node = self.start_pos(node);
        let posed_node = self.posed_pos(node, matrices);
        let target = self.posed_pos(ik.bone_idx, matrices);

        let origin_vec = (self.start_pos(ik.target_idx) - rest_node).normalize_or_zero();
        let target_vec = (target - posed_node).normalize_or_zero();
        if origin_vec == Vec3::ZERO || target_vec == Vec3::ZERO {
            log::trace!("LookAt IK {} 方向为 0，跳过", ik.bone_idx);
            return false;
        }

        let rotation = Quat::from_rotation_arc(origin_vec, target_vec);
        let look_at = Mat4::from_translation(posed_node)
            * Mat4::from_quat(rotation)
            * Mat4::from_translation(-rest_node);

        let delta = look_at * matrices[node].inverse();
        matrices[node] = look_at;
        for idx in self.tree.descendants(node) {
            if idx < matrices.len() {
                matrices[idx] = delta * matrices[idx];
            }
        }
        true
    }

    /// 两骨骼 IK（余弦定理）
    ///
    /// 骨骼长度取静止姿态的长度，不做关节角度限制。
    fn solve_cosine_ik(&self, ik: &PmdIk, matrices: &mut [Mat4]) -> bool {
        let mid = ik.node_idxes[0];
        let root = ik.node_idxes[1];
        let tip = ik.target_idx;

        let edge1 = self.start_pos(mid).distance(self.start_pos(root));
        let edge2 = self.start_pos(tip).distance(self.start_pos(mid));

        let root_pos = self.posed_pos(root, matrices);
        let mid_pos = self.posed_pos(mid, matrices);
        let tip_pos = self.posed_pos(tip, matrices);
        let target = self.posed_pos(ik.bone_idx, matrices);

        let linear = target - root_pos;
        let distance = linear.length();
        if edge1 < LENGTH_EPSILON || edge2 < LENGTH_EPSILON || distance < LENGTH_EPSILON {
            log::trace!("余弦 IK {} 存在长度为 0 的边，跳过", ik.bone_idx);
            return false;
        }
        let dir = linear / distance;

        let axis = if self.knee_idxes.contains(&mid) {
            self.lateral_axis
        } else {
            // 向当前末端一侧弯曲
            -(tip_pos - root_pos).cross(linear)
        };
        // 旋转平面必须包含 根->目标 方向
        let axis = (axis - dir * axis.dot(dir)).normalize_or_zero();
        if axis == Vec3::ZERO {
            log::trace!("余弦 IK {} 旋转轴退化，跳过", ik.bone_idx);
            return false;
        }

        let (theta1, theta2) = cosine_rule_angles(edge1, edge2, distance);
        let mid_dir = Quat::from_axis_angle(axis, theta1) * dir;
        let tip_dir = Quat::from_axis_angle(axis, theta1 + theta2 - std::f32::consts::PI) * dir;

        // 根骨骼：把当前的 根->中间 方向转到 mid_dir
        let Some(rot1) = rotation_between(mid_pos - root_pos, mid_dir) else {
            return false;
        };
        let delta1 = rotation_about(root_pos, rot1);
        let moved = self.chain_subtree(&[root, mid, tip]);
        apply_delta(matrices, &moved, delta1);

        // 中间骨骼：把 中间->末端 方向转到 tip_dir
        let mid_pos = delta1.transform_point3(mid_pos);
        let tip_pos = delta1.transform_point3(tip_pos);
        let Some(rot2) = rotation_between(tip_pos - mid_pos, tip_dir) else {
            return true;
        };
        let delta2 = rotation_about(mid_pos, rot2);
        let moved = self.chain_subtree(&[mid, tip]);
        apply_delta(matrices, &moved, delta2);

        true
    }

    /// CCD IK
    ///
    /// 链在链根骨骼的父骨骼空间中求解。IK 骨骼的目标位置要先去掉 ik_parent_bone
    /// 的累积变换，求解结果再由 ik_parent_bone 合成回去；没有 ik_parent_bone 时
    /// 两者都是链根的父骨骼。
    fn solve_ccd_ik(&self, ik: &PmdIk, matrices: &mut [Mat4]) -> bool {
        let Some(chain_root) = ik.chain_root() else {
            return false;
        };

        let matrix_of =
            |idx: Option<BoneIdx>| idx.filter(|&p| p < matrices.len()).map(|p| matrices[p]);
        let tree_parent_mat =
            matrix_of(self.tree.nodes()[chain_root].parent).unwrap_or(Mat4::IDENTITY);
        let parent_mat =
            matrix_of(self.tree.nodes()[ik.bone_idx].ik_parent_bone).unwrap_or(tree_parent_mat);
        let inv_parent = tree_parent_mat.inverse();

        let target = parent_mat
            .inverse()
            .transform_point3(self.posed_pos(ik.bone_idx, matrices));
        let mut end_pos = inv_parent.transform_point3(self.posed_pos(ik.target_idx, matrices));
        let mut positions: Vec<Vec3> = ik
            .node_idxes
            .iter()
            .map(|&idx| inv_parent.transform_point3(self.posed_pos(idx, matrices)))
            .collect();
        let mut rotations = vec![Mat4::IDENTITY; positions.len()];

        let limit = ik.limit_radians();
        'solve: for _ in 0..ik.iterations {
            if end_pos.distance(target) < self.ccd_epsilon {
                break;
            }

            for bidx in 0..positions.len() {
                let pos = positions[bidx];
                let to_end = (end_pos - pos).normalize_or_zero();
                let to_target = (target - pos).normalize_or_zero();
                if to_end == Vec3::ZERO || to_target == Vec3::ZERO {
                    continue;
                }

                let angle = to_end.angle_between(to_target);
                if angle < 1e-5 {
                    continue;
                }
                let cross = to_end.cross(to_target).normalize_or_zero();
                if cross == Vec3::ZERO {
                    continue;
                }

                let rot = rotation_about(pos, Quat::from_axis_angle(cross, angle.min(limit)));

                // 当前关节及其末端一侧都跟着旋转
                for r in rotations.iter_mut().take(bidx + 1) {
                    *r = rot * *r;
                }
                for p in positions.iter_mut().take(bidx) {
                    *p = rot.transform_point3(*p);
                }
                end_pos = rot.transform_point3(end_pos);

                if end_pos.distance(target) < self.ccd_epsilon {
                    break 'solve;
                }
            }
        }

        let solved: HashMap<BoneIdx, Mat4> = ik
            .node_idxes
            .iter()
            .zip(&rotations)
            .map(|(&idx, rot)| (idx, parent_mat * *rot * inv_parent))
            .collect();
        self.recompose(matrices, chain_root, Mat4::IDENTITY, &solved);
        true
    }

    /// 把求解结果沿子树合成：每个骨骼使用最近的已求解祖先（或自身）的变化量
    fn recompose(
        &self,
        matrices: &mut [Mat4],
        index: BoneIdx,
        delta: Mat4,
        solved: &HashMap<BoneIdx, Mat4>,
    ) {
        if index >= matrices.len() {
            return;
        }

        let delta = solved.get(&index).copied().unwrap_or(delta);
        matrices[index] = delta * matrices[index];

        for &child in self.tree.nodes()[index].children() {
            self.recompose(matrices, child, delta, solved);
        }
    }

    /// 给定骨骼及其子孙（去重，保持顺序）
    fn chain_subtree(&self, bones: &[BoneIdx]) -> Vec<BoneIdx> {
        let mut result: Vec<BoneIdx> = Vec::new();
        for &bone in bones {
            for idx in std::iter::once(bone).chain(self.tree.descendants(bone)) {
                if !result.contains(&idx) {
                    result.push(idx);
                }
            }
        }
        result
    }
}

/// 余弦定理求两个关节角
///
/// 返回 (根关节处 根->目标 与 根->中间 的夹角, 中间关节处的夹角)。
/// 目标不可达时角度被夹到伸直/折叠的极限。
pub fn cosine_rule_angles(edge1: f32, edge2: f32, distance: f32) -> (f32, f32) {
    let cos1 = (distance * distance + edge1 * edge1 - edge2 * edge2) / (2.0 * distance * edge1);
    let cos2 = (edge1 * edge1 + edge2 * edge2 - distance * distance) / (2.0 * edge1 * edge2);
    (cos1.clamp(-1.0, 1.0).acos(), cos2.clamp(-1.0, 1.0).acos())
}

/// 以 pivot 为中心的旋转矩阵
fn rotation_about(pivot: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_translation(pivot) * Mat4::from_quat(rotation) * Mat4::from_translation(-pivot)
}

/// from 方向转到 to 方向的最小旋转
fn rotation_between(from: Vec3, to: Vec3) -> Option<Quat> {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_arc(from, to))
}

fn apply_delta(matrices: &mut [Mat4], bones: &[BoneIdx], delta: Mat4) {
    for &idx in bones {
        if idx < matrices.len() {
            matrices[idx] = delta * matrices[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::PmdBone;

    const EPS: f32 = 1e-3;

    fn config() -> AnimationConfig {
        AnimationConfig::default()
    }

    /// 竖直的腿：足(0,10) -> ひざ(0,5) -> 足首(0,0)，IK 骨骼独立
    fn leg_tree(mid_name: &str) -> BoneTree {
        BoneTree::create(&[
            PmdBone::new("右足", Vec3::new(0.0, 10.0, 0.0)),
            PmdBone::new(mid_name, Vec3::new(0.0, 5.0, 0.0)).with_parent(0),
            PmdBone::new("右足首", Vec3::new(0.0, 0.0, 0.0)).with_parent(1),
            PmdBone::new("右足ＩＫ", Vec3::new(0.0, 0.0, 0.0)),
            PmdBone::new("右つま先", Vec3::new(0.0, 0.0, -1.0)).with_parent(2),
        ])
    }

    fn leg_ik() -> PmdIk {
        PmdIk {
            bone_idx: 3,
            target_idx: 2,
            node_idxes: vec![1, 0],
            iterations: 40,
            limit: 0.5,
        }
    }

    #[test]
    fn test_cosine_rule_angles() {
        let (theta1, theta2) = cosine_rule_angles(3.0, 4.0, 5.0);
        // 3-4-5 直角三角形
        assert!((theta2 - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((theta1.cos() - 3.0 / 5.0).abs() < 1e-5);

        // 不可达时完全伸直
        let (theta1, theta2) = cosine_rule_angles(3.0, 4.0, 9.0);
        assert!(theta1.abs() < 1e-6);
        assert!((theta2 - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_two_bone_knee_reaches_target() {
        let tree = leg_tree("右ひざ");
        let knees = vec![1];
        let solver = IkSolver::new(&tree, &knees, &config());
        let mut matrices = vec![Mat4::IDENTITY; 8];
        // IK 骨骼向上移动 2：目标在根正下方 8 处
        matrices[3] = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));

        assert!(solver.solve(&leg_ik(), &mut matrices));

        let root = matrices[0].transform_point3(Vec3::new(0.0, 10.0, 0.0));
        let mid = matrices[1].transform_point3(Vec3::new(0.0, 5.0, 0.0));
        let tip = matrices[2].transform_point3(Vec3::ZERO);
        let target = Vec3::new(0.0, 2.0, 0.0);

        assert!(tip.distance(target) < EPS, "tip = {tip:?}");
        assert!((mid.distance(root) - 5.0).abs() < EPS);
        assert!((tip.distance(mid) - 5.0).abs() < EPS);

        // 余弦定理：cos(theta1) = (D² + L1² - L2²) / (2·D·L1)
        let d = 8.0f32;
        let expected = (d * d + 25.0 - 25.0) / (2.0 * d * 5.0);
        let actual = (mid - root).normalize().dot((target - root).normalize());
        assert!((actual - expected).abs() < EPS);

        // 膝盖只在 YZ 平面内向前（-Z）弯曲
        assert!(mid.x.abs() < EPS);
        assert!(mid.z < 0.0);

        // 子骨骼跟随末端
        let toe = matrices[4].transform_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!((toe.distance(tip) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_two_bone_general_axis() {
        let tree = leg_tree("右もも");
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 8];
        // 目标偏到侧面，轴由叉积得到
        matrices[3] = Mat4::from_translation(Vec3::new(3.0, 4.0, 0.0));

        assert!(solver.solve(&leg_ik(), &mut matrices));

        let tip = matrices[2].transform_point3(Vec3::ZERO);
        assert!(tip.distance(Vec3::new(3.0, 4.0, 0.0)) < EPS, "tip = {tip:?}");
    }

    #[test]
    fn test_two_bone_collinear_without_knee_is_skipped() {
        let tree = leg_tree("右もも");
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 8];
        matrices[3] = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let before = matrices.clone();

        assert!(!solver.solve(&leg_ik(), &mut matrices));
        assert_eq!(matrices, before);
    }

    #[test]
    fn test_two_bone_zero_edge_is_skipped() {
        let tree = BoneTree::create(&[
            PmdBone::new("a", Vec3::ZERO),
            PmdBone::new("b", Vec3::ZERO).with_parent(0),
            PmdBone::new("c", Vec3::new(0.0, -1.0, 0.0)).with_parent(1),
            PmdBone::new("ik", Vec3::new(1.0, -1.0, 0.0)),
        ]);
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 4];
        let ik = PmdIk {
            bone_idx: 3,
            target_idx: 2,
            node_idxes: vec![1, 0],
            iterations: 1,
            limit: 1.0,
        };
        assert!(!solver.solve(&ik, &mut matrices));
        assert!(matrices.iter().all(|m| *m == Mat4::IDENTITY));
    }

    #[test]
    fn test_look_at_points_tip_at_target() {
        let tree = BoneTree::create(&[
            PmdBone::new("右足首", Vec3::new(0.0, 1.0, 0.0)),
            PmdBone::new("右つま先", Vec3::new(0.0, 1.0, -1.0)).with_parent(0),
            PmdBone::new("右つま先ＩＫ", Vec3::new(0.0, 1.0, -1.0)),
        ]);
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 3];
        // 足首整体平移，IK 骨骼放到正下方
        matrices[0] = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        matrices[1] = matrices[0];
        matrices[2] = Mat4::from_translation(Vec3::new(1.0, -2.0, 1.0));

        let ik = PmdIk {
            bone_idx: 2,
            target_idx: 1,
            node_idxes: vec![0],
            iterations: 3,
            limit: 1.0,
        };
        assert!(solver.solve(&ik, &mut matrices));

        let pivot = matrices[0].transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(pivot.distance(Vec3::new(1.0, 1.0, 0.0)) < EPS);

        let tip = matrices[1].transform_point3(Vec3::new(0.0, 1.0, -1.0));
        let dir = (tip - pivot).normalize();
        assert!(dir.distance(Vec3::NEG_Y) < EPS, "dir = {dir:?}");
    }

    /// 竖直的四节链：base(0,0) j0(0,1) j1(0,2) j2(0,3) tip(0,4)
    fn arm_tree() -> BoneTree {
        BoneTree::create(&[
            PmdBone::new("base", Vec3::ZERO),
            PmdBone::new("j0", Vec3::new(0.0, 1.0, 0.0)).with_parent(0),
            PmdBone::new("j1", Vec3::new(0.0, 2.0, 0.0)).with_parent(1),
            PmdBone::new("j2", Vec3::new(0.0, 3.0, 0.0)).with_parent(2),
            PmdBone::new("tip", Vec3::new(0.0, 4.0, 0.0)).with_parent(3),
            PmdBone::new("ik", Vec3::ZERO),
        ])
    }

    fn arm_ik(iterations: u16) -> PmdIk {
        PmdIk {
            bone_idx: 5,
            target_idx: 4,
            node_idxes: vec![3, 2, 1],
            iterations,
            limit: 1.0,
        }
    }

    #[test]
    fn test_ccd_converges_for_reachable_target() {
        let tree = arm_tree();
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 6];
        let target = Vec3::new(1.5, 2.5, 0.0);
        matrices[5] = Mat4::from_translation(target);

        assert!(solver.solve(&arm_ik(500), &mut matrices));

        let tip = matrices[4].transform_point3(Vec3::new(0.0, 4.0, 0.0));
        assert!(tip.distance(target) < EPS, "tip = {tip:?}");

        // 链根的位置不变，骨骼长度保持
        let j0 = matrices[1].transform_point3(Vec3::new(0.0, 1.0, 0.0));
        let j1 = matrices[2].transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!(j0.distance(Vec3::new(0.0, 1.0, 0.0)) < EPS);
        assert!((j1.distance(j0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_ccd_unreachable_terminates_extended() {
        let tree = arm_tree();
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 6];
        let target = Vec3::new(10.0, 1.0, 0.0);
        matrices[5] = Mat4::from_translation(target);

        assert!(solver.solve(&arm_ik(200), &mut matrices));

        let tip = matrices[4].transform_point3(Vec3::new(0.0, 4.0, 0.0));
        // 链长 3，最近距离为 10 - 3 = 7
        assert!((tip.distance(target) - 7.0).abs() < 0.05, "tip = {tip:?}");
    }

    #[test]
    fn test_ccd_respects_parent_transform() {
        let tree = arm_tree();
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 6];
        // 父骨骼整体旋转 90°，链的子骨骼已合成
        let parent = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        for m in matrices.iter_mut().take(5) {
            *m = parent;
        }
        let target = parent.transform_point3(Vec3::new(1.5, 2.5, 0.0));
        matrices[5] = Mat4::from_translation(target);

        assert!(solver.solve(&arm_ik(500), &mut matrices));

        let tip = matrices[4].transform_point3(Vec3::new(0.0, 4.0, 0.0));
        assert!(tip.distance(target) < EPS, "tip = {tip:?}");
        assert_eq!(matrices[0], parent);
    }

    #[test]
    fn test_ccd_uses_ik_parent_bone_frame() {
        // 6 号骨骼作为 IK 骨骼的 ik_parent_bone，合成后整体上移 0.5
        let mut bones = vec![
            PmdBone::new("base", Vec3::ZERO),
            PmdBone::new("j0", Vec3::new(0.0, 1.0, 0.0)).with_parent(0),
            PmdBone::new("j1", Vec3::new(0.0, 2.0, 0.0)).with_parent(1),
            PmdBone::new("j2", Vec3::new(0.0, 3.0, 0.0)).with_parent(2),
            PmdBone::new("tip", Vec3::new(0.0, 4.0, 0.0)).with_parent(3),
            PmdBone::new("ik", Vec3::ZERO),
            PmdBone::new("ik_parent", Vec3::ZERO),
        ];
        let plain = BoneTree::create(&bones);
        bones[5].ik_parent_bone = 6;
        let tree = BoneTree::create(&bones);
        assert_eq!(tree.nodes()[5].ik_parent_bone, Some(6));

        let target = Vec3::new(1.5, 3.0, 0.0);
        let mut posed = vec![Mat4::IDENTITY; 7];
        posed[5] = Mat4::from_translation(target);
        posed[6] = Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0));

        let mut matrices = posed.clone();
        assert!(IkSolver::new(&tree, &[], &config()).solve(&arm_ik(500), &mut matrices));
        let tip = matrices[4].transform_point3(Vec3::new(0.0, 4.0, 0.0));
        assert!(tip.distance(target) < EPS, "tip = {tip:?}");
        // 链根跟随 ik_parent_bone 上移
        let j0 = matrices[1].transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(j0.abs_diff_eq(Vec3::new(0.0, 1.5, 0.0), EPS), "j0 = {j0:?}");

        // 没有 ik_parent_bone 时链根留在原位
        let mut matrices = posed;
        assert!(IkSolver::new(&plain, &[], &config()).solve(&arm_ik(500), &mut matrices));
        let j0 = matrices[1].transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(j0.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), EPS), "j0 = {j0:?}");
    }

    #[test]
    fn test_ccd_limit_clamps_single_iteration() {
        let tree = arm_tree();
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 6];
        matrices[5] = Mat4::from_translation(Vec3::new(3.0, 3.0, 0.0));

        let mut ik = arm_ik(1);
        // 每步最多 0.01π
        ik.limit = 0.01;
        solver.solve(&ik, &mut matrices);

        // j2 的朝向变化不超过三个关节的上限之和
        let tip = matrices[4].transform_point3(Vec3::new(0.0, 4.0, 0.0));
        let j2 = matrices[3].transform_point3(Vec3::new(0.0, 3.0, 0.0));
        let angle = (tip - j2).normalize().angle_between(Vec3::Y);
        assert!(angle <= 3.0 * 0.01 * std::f32::consts::PI + 1e-4);
        assert!(angle > 0.0);
    }

    #[test]
    fn test_out_of_range_ik_is_skipped() {
        let tree = arm_tree();
        let solver = IkSolver::new(&tree, &[], &config());
        let mut matrices = vec![Mat4::IDENTITY; 6];
        let mut ik = arm_ik(10);
        ik.target_idx = 42;
        assert!(!solver.solve(&ik, &mut matrices));
    }
}
