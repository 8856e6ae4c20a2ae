//! PMD 运行时角色
//!
//! 每一帧：采样关键帧 -> 层级合成 -> IK 修正，结果写入骨骼矩阵缓冲区。

use std::path::Path;
use std::time::Instant;

use glam::Mat4;

use crate::animation::VmdMotionTable;
use crate::config::{self, AnimationConfig};
use crate::skeleton::{BoneIdx, IkSolver};
use crate::Result;

use super::{PmdData, BONE_MATRIX_CAPACITY};

/// 带动作的 PMD 模型
#[derive(Debug)]
pub struct PmdActor {
    pmd: PmdData,
    vmd: VmdMotionTable,
    config: AnimationConfig,
    /// 按 config.knee_name_token 查找的膝盖骨骼
    knee_idxes: Vec<BoneIdx>,
    /// 骨骼矩阵（渲染层只读）
    bone_matrices: Vec<Mat4>,
    /// 播放起点，None 表示尚未播放
    anime_start: Option<Instant>,
    current_frame: u32,
}

impl PmdActor {
    /// 从文件加载模型和动作
    pub fn create<P: AsRef<Path>, Q: AsRef<Path>>(pmd_path: P, vmd_path: Q) -> Result<Self> {
        let pmd = PmdData::open(pmd_path)?;
        let vmd = VmdMotionTable::open(vmd_path)?;
        Ok(Self::new(pmd, vmd))
    }

    /// 使用全局配置创建
    pub fn new(pmd: PmdData, vmd: VmdMotionTable) -> Self {
        Self::with_config(pmd, vmd, config::get_config())
    }

    pub fn with_config(pmd: PmdData, vmd: VmdMotionTable, config: AnimationConfig) -> Self {
        if pmd.bone_tree().find_bone_by_name(&config.root_bone_name).is_none() {
            log::warn!("模型中没有根骨骼 {}，只使用各骨骼的本地矩阵", config.root_bone_name);
        }
        if pmd.bones().len() > BONE_MATRIX_CAPACITY {
            log::warn!(
                "骨骼数 {} 超过缓冲区容量 {}，多余的骨骼不参与计算",
                pmd.bones().len(),
                BONE_MATRIX_CAPACITY
            );
        }
        let knee_idxes = pmd.knee_idxes_for(&config.knee_name_token);

        Self {
            pmd,
            vmd,
            config,
            knee_idxes,
            bone_matrices: vec![Mat4::IDENTITY; BONE_MATRIX_CAPACITY],
            anime_start: None,
            current_frame: 0,
        }
    }

    /// 开始播放（重置播放时钟）
    pub fn play_animation(&mut self) {
        self.play_animation_at(Instant::now());
    }

    pub fn play_animation_at(&mut self, now: Instant) {
        self.anime_start = Some(now);
        self.current_frame = 0;
    }

    /// 按当前时间推进一帧
    pub fn motion_update(&mut self) {
        self.motion_update_at(Instant::now());
    }

    /// 按给定时间推进一帧
    ///
    /// 超过动作最大帧时从 0 帧重新开始。尚未播放时先开始播放。
    pub fn motion_update_at(&mut self, now: Instant) {
        let start = *self.anime_start.get_or_insert(now);
        let elapsed_ms = now.saturating_duration_since(start).as_millis() as f32;
        let mut frame_no = (self.config.fps * elapsed_ms / 1000.0) as u32;

        if frame_no > self.vmd.max_key_frame_no() {
            log::trace!("动作循环: 帧 {} 超过 {}", frame_no, self.vmd.max_key_frame_no());
            self.anime_start = Some(now);
            frame_no = 0;
        }

        self.update_frame(frame_no);
    }

    /// 计算指定帧的骨骼矩阵
    pub fn update_frame(&mut self, frame_no: u32) {
        self.current_frame = frame_no;
        self.bone_matrices.fill(Mat4::IDENTITY);

        // 采样
        let tree = self.pmd.bone_tree();
        for motion in self.vmd.get_now_motion_list(frame_no) {
            let Some(node) = tree.get_bone_node(motion.name) else {
                continue;
            };
            if node.bone_idx >= BONE_MATRIX_CAPACITY {
                continue;
            }

            let transform = motion.evaluate_with(
                frame_no,
                self.config.bezier_iterations,
                self.config.bezier_epsilon,
            );
            self.bone_matrices[node.bone_idx] = transform.local_matrix(node.start_pos);
        }

        // 合成
        if let Some(root) = tree.find_bone_by_name(&self.config.root_bone_name) {
            tree.recursive_matrix_multiply(&mut self.bone_matrices, root, Mat4::IDENTITY);
        }

        self.ik_solve(frame_no);
    }

    /// 按文件中的顺序求解所有 IK
    fn ik_solve(&mut self, frame_no: u32) {
        let tree = self.pmd.bone_tree();
        let solver = IkSolver::new(tree, &self.knee_idxes, &self.config);
        let ik_enable = self.vmd.get_ik_enable(frame_no);

        for ik in self.pmd.ik_data() {
            let name = tree.get_bone_name_from_index(ik.bone_idx);
            if ik_enable.and_then(|record| record.is_enabled(name)) == Some(false) {
                log::trace!("IK {} 在帧 {} 被禁用", name, frame_no);
                continue;
            }
            solver.solve(ik, &mut self.bone_matrices);
        }
    }

    /// 骨骼矩阵缓冲区（长度固定为 BONE_MATRIX_CAPACITY）
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }

    pub fn pmd_data(&self) -> &PmdData {
        &self.pmd
    }

    pub fn vmd_motion_table(&self) -> &VmdMotionTable {
        &self.vmd
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// 求解 IK 时按膝盖处理的骨骼
    pub fn knee_idxes(&self) -> &[BoneIdx] {
        &self.knee_idxes
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn is_playing(&self) -> bool {
        self.anime_start.is_some()
    }

    pub fn playback_start(&self) -> Option<Instant> {
        self.anime_start
    }
}
