//! PMD 材质定义

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use glam::Vec3;

/// 着色器使用的材质参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialForShader {
    pub diffuse: Vec3,
    pub alpha: f32,
    pub specular: Vec3,
    pub specularity: f32,
    pub ambient: Vec3,
}

impl Default for MaterialForShader {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            alpha: 1.0,
            specular: Vec3::ZERO,
            specularity: 0.0,
            ambient: Vec3::splat(0.5),
        }
    }
}

impl MaterialForShader {
    /// 常量缓冲区中的字节数
    pub const SIZE: usize = 44;

    /// 常量缓冲区布局：diffuse, alpha, specular, specularity, ambient
    fn floats(&self) -> [f32; 11] {
        let [dr, dg, db] = self.diffuse.to_array();
        let [sr, sg, sb] = self.specular.to_array();
        let [ar, ag, ab] = self.ambient.to_array();
        [dr, dg, db, self.alpha, sr, sg, sb, self.specularity, ar, ag, ab]
    }

    /// 按常量缓冲区布局写出
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for v in self.floats() {
            writer.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        for v in self.floats() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }
}

/// 材质纹理路径（相对模型所在目录）
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TexturePaths {
    pub texture: Option<PathBuf>,
    /// 乘算球面贴图 (.sph)
    pub sphere: Option<PathBuf>,
    /// 加算球面贴图 (.spa)
    pub add_sphere: Option<PathBuf>,
}

/// PMD 材质
#[derive(Clone, Debug, Default)]
pub struct PmdMaterial {
    pub shader: MaterialForShader,
    pub toon_idx: u8,
    pub edge_flg: u8,
    /// 该材质使用的索引数
    pub indices_num: u32,
    /// 纹理文件名，可能包含以 '*' 分隔的球面贴图
    pub texture_file: String,
}

impl PmdMaterial {
    /// 拆分纹理字段，得到相对模型文件所在目录的路径
    pub fn texture_paths(&self, model_path: &Path) -> TexturePaths {
        let mut paths = TexturePaths::default();
        if self.texture_file.is_empty() {
            return paths;
        }

        let dir = model_path.parent().unwrap_or_else(|| Path::new(""));
        for part in self.texture_file.split('*') {
            let file = dir.join(part);
            match Path::new(part).extension().and_then(|e| e.to_str()) {
                Some("sph") => paths.sphere = Some(file),
                Some("spa") => paths.add_sphere = Some(file),
                _ => paths.texture = Some(file),
            }
        }
        paths
    }

    /// 共享 toon 纹理文件名，编号为记录值 + 1（u8 回绕）
    pub fn toon_file_name(&self) -> String {
        format!("toon/toon{:02}.bmp", self.toon_idx.wrapping_add(1))
    }
}
