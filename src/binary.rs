//! 二进制读取辅助

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec2, Vec3};

/// 宽松读取器：读到末尾之后返回 0 填充的数据
///
/// PMD 文件不校验各数量与剩余长度是否一致，截断的文件会得到末尾为 0 的数据。
pub(crate) struct LenientReader<'a> {
    data: &'a [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> LenientReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            truncated: false,
        }
    }

    /// 是否读到过文件末尾之外
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// 剩余的真实字节数
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

impl Read for LenientReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.remaining().min(buf.len());
        buf[..available].copy_from_slice(&self.data[self.pos..self.pos + available]);
        if available < buf.len() {
            buf[available..].fill(0);
            self.truncated = true;
        }
        self.pos += available;
        Ok(buf.len())
    }
}

/// 读取定长字节数组
pub(crate) fn read_bytes<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn read_vec2<R: Read>(reader: &mut R) -> io::Result<Vec2> {
    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    Ok(Vec2::new(x, y))
}

pub(crate) fn read_vec3<R: Read>(reader: &mut R) -> io::Result<Vec3> {
    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    let z = reader.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

/// 跳过定长数据
pub(crate) fn skip_bytes<R: Read>(reader: &mut R, count: u64) -> io::Result<()> {
    let skipped = io::copy(&mut reader.take(count), &mut io::sink())?;
    if skipped < count {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", count, skipped),
        ));
    }
    Ok(())
}

/// 解码 Shift-JIS 字符串
pub(crate) fn decode_shift_jis(bytes: &[u8]) -> String {
    // 找到第一个 null 字节
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (decoded, _, _) = encoding_rs::SHIFT_JIS.decode(&bytes[..end]);
    decoded.into_owned()
}
