//! VMD 动作表
//!
//! 按骨骼名分组的关键帧列表（每组按帧号升序），以及 Morph 轨道和 IK 开关轨道。

use std::collections::HashMap;

use super::{IkEnableRecord, MorphKeyFrame, MotionInterpolator, MotionKeyFrame};

/// VMD 动作数据
#[derive(Debug, Clone, Default)]
pub struct VmdMotionTable {
    /// 动作对应的模型名
    pub(super) model_name: String,
    motion_table: HashMap<String, Vec<MotionKeyFrame>>,
    morph_table: HashMap<String, Vec<MorphKeyFrame>>,
    ik_enable_list: Vec<IkEnableRecord>,
    max_key_frame_no: u32,
    /// 跳过的相机、光照、阴影记录数
    pub(super) camera_count: u32,
    pub(super) light_count: u32,
    pub(super) self_shadow_count: u32,
}

impl VmdMotionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入骨骼关键帧，保持帧号升序
    ///
    /// 同一帧号的关键帧按插入顺序排在后面。
    pub fn insert_key_frame(&mut self, name: impl Into<String>, key_frame: MotionKeyFrame) {
        let frames = self.motion_table.entry(name.into()).or_default();
        let pos = frames.partition_point(|k| k.frame_no <= key_frame.frame_no);
        frames.insert(pos, key_frame);
        self.max_key_frame_no = self.max_key_frame_no.max(key_frame.frame_no);
    }

    /// 插入 Morph 关键帧
    pub fn insert_morph_key_frame(&mut self, name: impl Into<String>, key_frame: MorphKeyFrame) {
        let frames = self.morph_table.entry(name.into()).or_default();
        let pos = frames.partition_point(|k| k.frame_no <= key_frame.frame_no);
        frames.insert(pos, key_frame);
    }

    /// 插入 IK 开关记录，保持帧号升序
    pub fn insert_ik_enable(&mut self, record: IkEnableRecord) {
        let pos = self
            .ik_enable_list
            .partition_point(|r| r.frame_no <= record.frame_no);
        self.ik_enable_list.insert(pos, record);
    }

    /// 当前帧各骨骼的插值描述
    ///
    /// 没有不晚于 frame_no 的关键帧的骨骼不返回。
    pub fn get_now_motion_list(&self, frame_no: u32) -> Vec<MotionInterpolator<'_>> {
        self.motion_table
            .iter()
            .filter_map(|(name, frames)| {
                let pos = frames.partition_point(|k| k.frame_no <= frame_no);
                if pos == 0 {
                    return None;
                }
                let begin = &frames[pos - 1];
                let end = frames.get(pos).unwrap_or(begin);
                Some(MotionInterpolator {
                    name: name.as_str(),
                    begin,
                    end,
                })
            })
            .collect()
    }

    /// 不晚于 frame_no 的最后一条 IK 开关记录
    pub fn get_ik_enable(&self, frame_no: u32) -> Option<&IkEnableRecord> {
        let pos = self
            .ik_enable_list
            .partition_point(|r| r.frame_no <= frame_no);
        pos.checked_sub(1).map(|i| &self.ik_enable_list[i])
    }

    /// 所有骨骼关键帧中最大的帧号（动画循环长度）
    pub fn max_key_frame_no(&self) -> u32 {
        self.max_key_frame_no
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn camera_count(&self) -> u32 {
        self.camera_count
    }

    pub fn light_count(&self) -> u32 {
        self.light_count
    }

    pub fn self_shadow_count(&self) -> u32 {
        self.self_shadow_count
    }

    pub fn motion_table(&self) -> &HashMap<String, Vec<MotionKeyFrame>> {
        &self.motion_table
    }

    pub fn morph_table(&self) -> &HashMap<String, Vec<MorphKeyFrame>> {
        &self.morph_table
    }

    pub fn ik_enable_list(&self) -> &[IkEnableRecord] {
        &self.ik_enable_list
    }

    /// 骨骼关键帧总数
    pub fn key_frame_count(&self) -> usize {
        self.motion_table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.motion_table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn key(frame_no: u32, y: f32) -> MotionKeyFrame {
        MotionKeyFrame::new(frame_no, Quat::IDENTITY, Vec3::new(0.0, y, 0.0))
    }

    fn sample_table() -> VmdMotionTable {
        let mut table = VmdMotionTable::new();
        // 乱序插入
        table.insert_key_frame("センター", key(30, 3.0));
        table.insert_key_frame("センター", key(0, 0.0));
        table.insert_key_frame("センター", key(10, 1.0));
        table.insert_key_frame("右腕", key(20, 5.0));
        table
    }

    fn find<'a>(list: &'a [MotionInterpolator<'a>], name: &str) -> Option<&'a MotionInterpolator<'a>> {
        list.iter().find(|m| m.name == name)
    }

    #[test]
    fn test_key_frames_sorted_and_max() {
        let table = sample_table();
        let frames: Vec<u32> = table.motion_table()["センター"]
            .iter()
            .map(|k| k.frame_no)
            .collect();
        assert_eq!(frames, vec![0, 10, 30]);
        assert_eq!(table.max_key_frame_no(), 30);
        assert_eq!(table.key_frame_count(), 4);
    }

    #[test]
    fn test_now_motion_list_pairs() {
        let table = sample_table();

        let list = table.get_now_motion_list(15);
        let center = find(&list, "センター").unwrap();
        assert_eq!(center.begin.frame_no, 10);
        assert_eq!(center.end.frame_no, 30);
        // 右腕 的第一帧在 20，尚未开始
        assert!(find(&list, "右腕").is_none());

        // 正好落在关键帧上
        let list = table.get_now_motion_list(10);
        let center = find(&list, "センター").unwrap();
        assert_eq!(center.begin.frame_no, 10);
        assert_eq!(center.end.frame_no, 30);
    }

    #[test]
    fn test_last_key_frame_holds() {
        let table = sample_table();
        for frame_no in [30, 31, 1000] {
            let list = table.get_now_motion_list(frame_no);
            let center = find(&list, "センター").unwrap();
            assert_eq!(center.begin, center.end);
            assert_eq!(center.begin.frame_no, 30);
        }
    }

    #[test]
    fn test_duplicate_frame_last_wins() {
        let mut table = VmdMotionTable::new();
        table.insert_key_frame("首", key(5, 1.0));
        table.insert_key_frame("首", key(5, 2.0));
        let list = table.get_now_motion_list(5);
        let neck = find(&list, "首").unwrap();
        assert_eq!(neck.begin.offset.y, 2.0);
    }

    #[test]
    fn test_ik_enable_lookup() {
        let mut table = VmdMotionTable::new();
        table.insert_ik_enable(IkEnableRecord::new(20).with_enable("右足ＩＫ", true));
        table.insert_ik_enable(IkEnableRecord::new(5).with_enable("右足ＩＫ", false));

        assert!(table.get_ik_enable(4).is_none());
        assert_eq!(table.get_ik_enable(5).unwrap().frame_no, 5);
        assert_eq!(table.get_ik_enable(19).unwrap().is_enabled("右足ＩＫ"), Some(false));
        assert_eq!(table.get_ik_enable(500).unwrap().is_enabled("右足ＩＫ"), Some(true));
    }

    #[test]
    fn test_morph_table_does_not_extend_length() {
        let mut table = sample_table();
        table.insert_morph_key_frame("まばたき", MorphKeyFrame::new(300, 1.0));
        table.insert_morph_key_frame("まばたき", MorphKeyFrame::new(100, 0.5));
        assert_eq!(table.max_key_frame_no(), 30);
        assert_eq!(table.morph_table()["まばたき"][0].frame_no, 100);
    }
}
