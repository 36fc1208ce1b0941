//! MATLAB v5 (.mat) 文件的最小读取器
//!
//! 只支持读取数值矩阵（含 zlib 压缩的元素），足以解析 SVHN 的 `X`、`y`。
//!
//! 文件结构：128 字节文件头（116 字节描述 + 8 字节子系统偏移 + 2 字节版本 + 2 字节字节序标记），
//! 之后是一串数据元素，每个元素 = 8 字节标签（类型 u32 + 字节数 u32）+ 数据（补齐到 8 字节）。
//! 若标签第一个 u32 的高 16 位非零，则为“小元素”：类型与字节数各占 16 位，数据就在标签后 4 字节内。

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;

use crate::data::DataError;

const HEADER_BYTES: usize = 128;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT16: u32 = 3;
const MI_UINT16: u32 = 4;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_SINGLE: u32 = 7;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;

/// 矩阵数据；uint8 原样保留以节省内存
#[derive(Debug, Clone, PartialEq)]
pub enum MatData {
    UInt8(Vec<u8>),
    Numeric(Vec<f64>),
}

impl MatData {
    pub fn len(&self) -> usize {
        match self {
            Self::UInt8(v) => v.len(),
            Self::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按列优先顺序的第`i`个元素
    pub fn get(&self, i: usize) -> Option<f64> {
        match self {
            Self::UInt8(v) => v.get(i).map(|&x| f64::from(x)),
            Self::Numeric(v) => v.get(i).copied(),
        }
    }
}

/// 一个数值矩阵：维度 + 列优先数据
#[derive(Debug, Clone, PartialEq)]
pub struct MatArray {
    pub dims: Vec<usize>,
    pub data: MatData,
}

/// 解析后的 .mat 文件：变量名 -> 矩阵
#[derive(Debug, Default)]
pub struct MatFile {
    arrays: HashMap<String, MatArray>,
}

impl MatFile {
    pub fn open(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }
        Self::parse(&fs::read(path)?)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, DataError> {
        if bytes.len() < HEADER_BYTES {
            return Err(DataError::FormatError("MAT 文件头不完整".to_string()));
        }
        if &bytes[126..128] != b"IM" {
            return Err(DataError::FormatError(
                "只支持小端序的 MATLAB v5 文件".to_string(),
            ));
        }
        let mut file = Self::default();
        file.read_elements(&bytes[HEADER_BYTES..])?;
        Ok(file)
    }

    pub fn get(&self, name: &str) -> Option<&MatArray> {
        self.arrays.get(name)
    }

    /// 取出变量（转移所有权），不存在时报格式错误
    pub fn take(&mut self, name: &str) -> Result<MatArray, DataError> {
        self.arrays
            .remove(name)
            .ok_or_else(|| DataError::FormatError(format!("MAT 文件中没有变量`{name}`")))
    }

    fn read_elements(&mut self, mut bytes: &[u8]) -> Result<(), DataError> {
        while bytes.len() >= 8 {
            let (data_type, payload, rest) = read_element(bytes)?;
            match data_type {
                MI_COMPRESSED => {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(payload)
                        .read_to_end(&mut inflated)
                        .map_err(|e| DataError::DecompressionError(e.to_string()))?;
                    self.read_elements(&inflated)?;
                }
                MI_MATRIX => {
                    if let Some((name, array)) = parse_matrix(payload)? {
                        self.arrays.insert(name, array);
                    }
                }
                // 其他顶层元素与本读取器无关
                _ => {}
            }
            bytes = rest;
        }
        Ok(())
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, DataError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| DataError::FormatError("MAT 数据元素被截断".to_string()))
}

/// 读取一个数据元素，返回 (类型, 数据, 剩余字节)
fn read_element(bytes: &[u8]) -> Result<(u32, &[u8], &[u8]), DataError> {
    let first = read_u32(bytes, 0)?;
    if first >> 16 != 0 {
        // 小元素：数据在标签后的 4 字节内
        let data_type = first & 0xFFFF;
        let len = (first >> 16) as usize;
        if len > 4 || bytes.len() < 8 {
            return Err(DataError::FormatError("MAT 小元素长度无效".to_string()));
        }
        return Ok((data_type, &bytes[4..4 + len], &bytes[8..]));
    }
    let len = read_u32(bytes, 4)? as usize;
    let end = 8 + len;
    if bytes.len() < end {
        return Err(DataError::FormatError("MAT 数据元素被截断".to_string()));
    }
    // 压缩元素不补齐；其余补齐到 8 字节
    let padded = if first == MI_COMPRESSED {
        end
    } else {
        (end.div_ceil(8) * 8).min(bytes.len())
    };
    Ok((first, &bytes[8..end], &bytes[padded..]))
}

/// 解析 miMATRIX 的子元素：数组标志、维度、名称、实部
fn parse_matrix(payload: &[u8]) -> Result<Option<(String, MatArray)>, DataError> {
    if payload.is_empty() {
        return Ok(None);
    }
    let (_, flags, rest) = read_element(payload)?;
    let class = read_u32(flags, 0)? & 0xFF;
    // 6..=15 为数值类（double、single、各种整数）
    if !(6..=15).contains(&class) {
        return Ok(None);
    }

    let (_, dims_bytes, rest) = read_element(rest)?;
    let dims = dims_bytes
        .chunks_exact(4)
        .map(|b| {
            let dim = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            usize::try_from(dim).map_err(|_| DataError::FormatError(format!("MAT 维度{dim}无效")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (_, name_bytes, rest) = read_element(rest)?;
    let name = String::from_utf8_lossy(name_bytes).into_owned();

    let (data_type, real, _) = read_element(rest)?;
    let data = decode_numeric(data_type, real)?;
    let expected = dims.iter().product::<usize>();
    if data.len() != expected {
        return Err(DataError::ShapeMismatch {
            expected: dims,
            got: vec![data.len()],
        });
    }
    Ok(Some((name, MatArray { dims, data })))
}

fn decode_numeric(data_type: u32, bytes: &[u8]) -> Result<MatData, DataError> {
    fn convert<const N: usize>(bytes: &[u8], f: impl Fn([u8; N]) -> f64) -> MatData {
        MatData::Numeric(
            bytes
                .chunks_exact(N)
                .map(|c| {
                    let mut buf = [0u8; N];
                    buf.copy_from_slice(c);
                    f(buf)
                })
                .collect(),
        )
    }
    let data = match data_type {
        MI_UINT8 => MatData::UInt8(bytes.to_vec()),
        MI_INT8 => convert::<1>(bytes, |b| f64::from(i8::from_le_bytes(b))),
        MI_INT16 => convert::<2>(bytes, |b| f64::from(i16::from_le_bytes(b))),
        MI_UINT16 => convert::<2>(bytes, |b| f64::from(u16::from_le_bytes(b))),
        MI_INT32 => convert::<4>(bytes, |b| f64::from(i32::from_le_bytes(b))),
        MI_UINT32 => convert::<4>(bytes, |b| f64::from(u32::from_le_bytes(b))),
        MI_SINGLE => convert::<4>(bytes, |b| f64::from(f32::from_le_bytes(b))),
        MI_DOUBLE => convert::<8>(bytes, f64::from_le_bytes),
        other => {
            return Err(DataError::FormatError(format!(
                "不支持的 MAT 数据类型: {other}"
            )));
        }
    };
    Ok(data)
}
