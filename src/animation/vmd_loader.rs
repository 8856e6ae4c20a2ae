//! VMD 文件加载器
//!
//! 骨骼关键帧部分必须完整；其后的 Morph、相机、光照、阴影、IK 开关部分在较老的
//! VMD 文件中可能不存在，读到末尾即停止。

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Quat, Vec2};

use crate::binary::{decode_shift_jis, read_bytes, read_vec3, skip_bytes};
use crate::{MmdError, Result};

use super::{IkEnableRecord, MorphKeyFrame, MotionKeyFrame, VmdMotionTable};

/// VMD 文件头前缀
const VMD_MAGIC: &[u8] = b"Vocaloid Motion Data";

/// 各部分记录的字节数
const CAMERA_RECORD_SIZE: u64 = 61;
const LIGHT_RECORD_SIZE: u64 = 28;
const SELF_SHADOW_RECORD_SIZE: u64 = 9;

impl VmdMotionTable {
    /// 从文件路径加载 VMD
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let table = Self::load_from_reader(&mut reader)?;
        log::info!(
            "VMD 加载完成: {} ({} 个骨骼, {} 个关键帧, 最大帧 {})",
            path.display(),
            table.motion_table().len(),
            table.key_frame_count(),
            table.max_key_frame_no()
        );
        Ok(table)
    }

    /// 从字节切片加载 VMD
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = io::Cursor::new(bytes);
        Self::load_from_reader(&mut reader)
    }

    /// 从 Reader 加载 VMD
    pub fn load_from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        // 头部 30 字节 + 模型名 20 字节
        let header: [u8; 30] = read_bytes(reader)
            .map_err(|e| MmdError::VmdParse(format!("Failed to read header: {}", e)))?;
        if !header.starts_with(VMD_MAGIC) {
            log::debug!("VMD 头部不是标准格式，继续读取");
        }
        let model_name: [u8; 20] = read_bytes(reader)
            .map_err(|e| MmdError::VmdParse(format!("Failed to read model name: {}", e)))?;

        let mut table = VmdMotionTable::new();
        table.model_name = decode_shift_jis(&model_name);
        log::debug!("VMD 模型名: {}", table.model_name);

        let motion_count = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| MmdError::VmdParse(format!("Failed to read motion count: {}", e)))?;

        for i in 0..motion_count {
            let (name, key_frame) = read_motion_key_frame(reader).map_err(|e| {
                MmdError::VmdParse(format!("Failed to read motion {}/{}: {}", i, motion_count, e))
            })?;
            table.insert_key_frame(name, key_frame);
        }

        if let Err(e) = read_optional_sections(reader, &mut table) {
            log::warn!("VMD 尾部数据不完整，保留已读取部分: {}", e);
        }

        log::debug!(
            "VMD morph {} 条轨道, IK 开关 {} 条, 跳过相机 {} / 光照 {} / 阴影 {}",
            table.morph_table().len(),
            table.ik_enable_list().len(),
            table.camera_count,
            table.light_count,
            table.self_shadow_count
        );

        Ok(table)
    }
}

/// 读取一条骨骼关键帧 (111 字节)
fn read_motion_key_frame<R: Read>(reader: &mut R) -> io::Result<(String, MotionKeyFrame)> {
    let name: [u8; 15] = read_bytes(reader)?;
    let frame_no = reader.read_u32::<LittleEndian>()?;
    let offset = read_vec3(reader)?;

    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    let z = reader.read_f32::<LittleEndian>()?;
    let w = reader.read_f32::<LittleEndian>()?;
    let quaternion = Quat::from_xyzw(x, y, z, w);
    let quaternion = if quaternion.length_squared() > 0.0 {
        quaternion.normalize()
    } else {
        Quat::IDENTITY
    };

    // 插值参数 64 字节，只使用旋转曲线：第 3、7、11、15 字节
    let bezier: [u8; 64] = read_bytes(reader)?;
    let bezier_p1 = Vec2::new(bezier[3] as f32 / 127.0, bezier[7] as f32 / 127.0);
    let bezier_p2 = Vec2::new(bezier[11] as f32 / 127.0, bezier[15] as f32 / 127.0);

    let key_frame = MotionKeyFrame {
        frame_no,
        quaternion,
        offset,
        bezier_p1,
        bezier_p2,
    };
    Ok((decode_shift_jis(&name), key_frame))
}

/// 读取部分开头的数量，已到文件末尾时返回 None
fn read_section_count<R: Read>(reader: &mut R) -> io::Result<Option<u32>> {
    match reader.read_u32::<LittleEndian>() {
        Ok(count) => Ok(Some(count)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

fn read_optional_sections<R: Read>(reader: &mut R, table: &mut VmdMotionTable) -> io::Result<()> {
    // Morph
    let Some(count) = read_section_count(reader)? else {
        return Ok(());
    };
    for _ in 0..count {
        let name: [u8; 15] = read_bytes(reader)?;
        let frame_no = reader.read_u32::<LittleEndian>()?;
        let weight = reader.read_f32::<LittleEndian>()?;
        table.insert_morph_key_frame(decode_shift_jis(&name), MorphKeyFrame::new(frame_no, weight));
    }

    // 相机
    let Some(count) = read_section_count(reader)? else {
        return Ok(());
    };
    skip_bytes(reader, count as u64 * CAMERA_RECORD_SIZE)?;
    table.camera_count = count;

    // 光照
    let Some(count) = read_section_count(reader)? else {
        return Ok(());
    };
    skip_bytes(reader, count as u64 * LIGHT_RECORD_SIZE)?;
    table.light_count = count;

    // 阴影
    let Some(count) = read_section_count(reader)? else {
        return Ok(());
    };
    skip_bytes(reader, count as u64 * SELF_SHADOW_RECORD_SIZE)?;
    table.self_shadow_count = count;

    // IK 开关
    let Some(count) = read_section_count(reader)? else {
        return Ok(());
    };
    for _ in 0..count {
        table.insert_ik_enable(read_ik_enable(reader)?);
    }

    Ok(())
}

/// 读取一条 IK 开关记录
fn read_ik_enable<R: Read>(reader: &mut R) -> io::Result<IkEnableRecord> {
    let frame_no = reader.read_u32::<LittleEndian>()?;
    let show = reader.read_u8()? != 0;
    let info_count = reader.read_u32::<LittleEndian>()?;

    let mut record = IkEnableRecord::new(frame_no);
    record.show = show;
    for _ in 0..info_count {
        let name: [u8; 20] = read_bytes(reader)?;
        let enabled = reader.read_u8()? != 0;
        record.enables.insert(decode_shift_jis(&name), enabled);
    }
    Ok(record)
}
