//! PMD 模型加载器

use std::io::Read;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::binary::{decode_shift_jis, read_bytes, read_vec2, read_vec3, LenientReader};
use crate::config;
use crate::skeleton::{BoneTree, PmdBone, PmdIk};
use crate::{MmdError, Result};

use super::data::find_knee_idxes;
use super::{MaterialForShader, PmdData, PmdHeader, PmdMaterial, PmdVertex, PMD_VERTEX_STRIDE};

const PMD_SIGNATURE: &[u8; 3] = b"Pmd";

impl PmdData {
    /// 从文件路径加载 PMD
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let data = Self::load_from_bytes(&bytes)?;
        log::info!(
            "PMD 加载完成: {} ({}), 顶点 {}, 索引 {}, 材质 {}, 骨骼 {}, IK {}",
            path.display(),
            data.header.model_name,
            data.vertices.len(),
            data.indices.len(),
            data.materials.len(),
            data.bones.len(),
            data.ik_data.len()
        );
        Ok(data)
    }

    /// 从字节切片加载 PMD
    ///
    /// 各数量不与剩余长度校验，文件被截断时末尾数据按 0 读取。
    ///
    /// 截断后每个部分只保留读到末尾时的那条记录，后面的部分数量按 0 读取，
    /// 所以结果的长度可能小于文件中声明的数量。例如材质的索引数可能超过
    /// 实际读到的索引，调用方需要自行按长度截取。
    pub fn load_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = LenientReader::new(bytes);
        let data = load_pmd(&mut reader)
            .map_err(|e| MmdError::PmdParse(format!("Failed to read PMD: {}", e)))?;
        if reader.is_truncated() {
            log::warn!("PMD 文件被截断，末尾数据按 0 处理");
        }
        Ok(data)
    }
}

fn load_pmd(reader: &mut LenientReader<'_>) -> std::io::Result<PmdData> {
    let signature: [u8; 3] = read_bytes(reader)?;
    if &signature != PMD_SIGNATURE {
        log::debug!("PMD 签名不匹配: {:?}", signature);
    }

    let header = read_header(reader)?;
    log::debug!("PMD 版本 {}, 模型名 {}", header.version, header.model_name);

    // 顶点
    let vertex_count = reader.read_u32::<LittleEndian>()? as usize;
    let mut vertices = Vec::with_capacity(capacity(reader, vertex_count, PMD_VERTEX_STRIDE));
    let mut raw_vertices = Vec::with_capacity(vertices.capacity() * PMD_VERTEX_STRIDE);
    for _ in 0..vertex_count {
        if reader.is_truncated() {
            break;
        }
        let raw: [u8; PMD_VERTEX_STRIDE] = read_bytes(reader)?;
        vertices.push(read_vertex(&mut &raw[..])?);
        raw_vertices.extend_from_slice(&raw);
    }

    // 索引
    let index_count = reader.read_u32::<LittleEndian>()? as usize;
    let mut indices = Vec::with_capacity(capacity(reader, index_count, 2));
    for _ in 0..index_count {
        if reader.is_truncated() {
            break;
        }
        indices.push(reader.read_u16::<LittleEndian>()?);
    }

    // 材质
    let material_count = reader.read_u32::<LittleEndian>()? as usize;
    let mut materials = Vec::with_capacity(capacity(reader, material_count, 70));
    for _ in 0..material_count {
        if reader.is_truncated() {
            break;
        }
        materials.push(read_material(reader)?);
    }

    // 骨骼
    let bone_count = reader.read_u16::<LittleEndian>()? as usize;
    let mut bones = Vec::with_capacity(capacity(reader, bone_count, 39));
    for _ in 0..bone_count {
        if reader.is_truncated() {
            break;
        }
        bones.push(read_bone(reader)?);
    }
    let bone_tree = BoneTree::create(&bones);
    let knee_idxes = find_knee_idxes(&bones, &config::get_config().knee_name_token);
    log::debug!("骨骼 {} 个, 膝盖 {:?}", bones.len(), knee_idxes);

    // IK
    let ik_count = reader.read_u16::<LittleEndian>()? as usize;
    let mut ik_data = Vec::with_capacity(capacity(reader, ik_count, 11));
    for _ in 0..ik_count {
        if reader.is_truncated() {
            break;
        }
        ik_data.push(read_ik(reader)?);
    }

    Ok(PmdData {
        header,
        vertices,
        raw_vertices,
        indices,
        materials,
        bones,
        bone_tree,
        knee_idxes,
        ik_data,
    })
}

/// 预分配容量不超过剩余数据能容纳的记录数
fn capacity(reader: &LenientReader<'_>, count: usize, record_size: usize) -> usize {
    count.min(reader.remaining() / record_size)
}

fn read_header<R: Read>(reader: &mut R) -> std::io::Result<PmdHeader> {
    let version = reader.read_f32::<LittleEndian>()?;
    let model_name: [u8; 20] = read_bytes(reader)?;
    let comment: [u8; 256] = read_bytes(reader)?;
    Ok(PmdHeader {
        version,
        model_name: decode_shift_jis(&model_name),
        comment: decode_shift_jis(&comment),
    })
}

fn read_vertex<R: Read>(reader: &mut R) -> std::io::Result<PmdVertex> {
    Ok(PmdVertex {
        position: read_vec3(reader)?,
        normal: read_vec3(reader)?,
        uv: read_vec2(reader)?,
        bone_no: [
            reader.read_u16::<LittleEndian>()?,
            reader.read_u16::<LittleEndian>()?,
        ],
        weight: reader.read_u8()?,
        edge_flg: reader.read_u8()?,
    })
}

fn read_material<R: Read>(reader: &mut R) -> std::io::Result<PmdMaterial> {
    let diffuse = read_vec3(reader)?;
    let alpha = reader.read_f32::<LittleEndian>()?;
    let specularity = reader.read_f32::<LittleEndian>()?;
    let specular = read_vec3(reader)?;
    let ambient = read_vec3(reader)?;
    let toon_idx = reader.read_u8()?;
    let edge_flg = reader.read_u8()?;
    let indices_num = reader.read_u32::<LittleEndian>()?;
    let texture_file: [u8; 20] = read_bytes(reader)?;

    Ok(PmdMaterial {
        shader: MaterialForShader {
            diffuse,
            alpha,
            specular,
            specularity,
            ambient,
        },
        toon_idx,
        edge_flg,
        indices_num,
        texture_file: decode_shift_jis(&texture_file),
    })
}

fn read_bone<R: Read>(reader: &mut R) -> std::io::Result<PmdBone> {
    let name: [u8; 20] = read_bytes(reader)?;
    Ok(PmdBone {
        name: decode_shift_jis(&name),
        parent_bone_no: reader.read_u16::<LittleEndian>()?,
        tail_bone_no: reader.read_u16::<LittleEndian>()?,
        bone_type: reader.read_u8()?,
        ik_parent_bone: reader.read_u16::<LittleEndian>()?,
        position: read_vec3(reader)?,
    })
}

fn read_ik<R: Read>(reader: &mut R) -> std::io::Result<PmdIk> {
    let bone_idx = reader.read_u16::<LittleEndian>()? as usize;
    let target_idx = reader.read_u16::<LittleEndian>()? as usize;
    let chain_len = reader.read_u8()?;
    let iterations = reader.read_u16::<LittleEndian>()?;
    let limit = reader.read_f32::<LittleEndian>()?;

    let mut node_idxes = Vec::with_capacity(chain_len as usize);
    for _ in 0..chain_len {
        node_idxes.push(reader.read_u16::<LittleEndian>()? as usize);
    }

    Ok(PmdIk {
        bone_idx,
        target_idx,
        node_idxes,
        iterations,
        limit,
    })
}
