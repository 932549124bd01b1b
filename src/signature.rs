use std::path::Path;

use serde::Serialize;

/// HSV 联合直方图的维度（8 x 8 x 4）
pub const HIST_DIM: usize = 256;
/// ORB 描述符均值的维度
pub const TEXTURE_DIM: usize = 32;
/// 文件名哈希词袋的维度
pub const TEXT_DIM: usize = 64;
/// 文件大小的字节数
pub const SIZE_DIM: usize = 8;
/// 完整视觉特征的维度
pub const VISUAL_DIM: usize = HIST_DIM + TEXTURE_DIM + TEXT_DIM;
/// 退化特征的维度，不足部分补 0
pub const FALLBACK_DIM: usize = 128;

const EPSILON: f32 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureKind {
    /// 颜色直方图 + ORB + 文件名
    Visual,
    /// 文件大小 + 文件名
    Fallback,
}

impl SignatureKind {
    pub fn dim(self) -> usize {
        match self {
            SignatureKind::Visual => VISUAL_DIM,
            SignatureKind::Fallback => FALLBACK_DIM,
        }
    }
}

/// 单个视频的定长特征向量，L2 归一化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub kind: SignatureKind,
    pub values: Vec<f32>,
}

impl FeatureVector {
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn norm(&self) -> f32 {
        norm(&self.values)
    }
}

pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// 原地 L2 归一化，分母加上一个极小值，全 0 向量保持为 0
pub fn l2_normalize(v: &mut [f32]) {
    let n = norm(v) + EPSILON;
    v.iter_mut().for_each(|x| *x /= n);
}

/// 文件名的哈希词袋向量
///
/// 只使用去掉目录后的小写文件名，非字母数字字符都视为分隔符，
/// 每个词的码点之和对 `dim` 取模作为下标。
pub fn text_vector(name: impl AsRef<Path>, dim: usize) -> Vec<f32> {
    let name = name.as_ref();
    let name = name.file_name().unwrap_or(name.as_os_str()).to_string_lossy().to_lowercase();

    let mut v = vec![0.0; dim];
    for token in name.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        let h = token.chars().map(|c| c as usize).sum::<usize>() % dim;
        v[h] += 1.0;
    }
    if norm(&v) > 0.0 {
        l2_normalize(&mut v);
    }
    v
}

/// 退化特征：文件大小的 8 个字节 + 文件名词袋，整体归一化后补 0 到 [`FALLBACK_DIM`]
pub fn size_signature(size: u64, name: impl AsRef<Path>) -> FeatureVector {
    let mut size_vec = size.to_le_bytes().map(|b| b as f32);
    l2_normalize(&mut size_vec);

    let mut values = Vec::with_capacity(FALLBACK_DIM);
    values.extend_from_slice(&size_vec);
    values.extend(text_vector(name, TEXT_DIM));
    l2_normalize(&mut values);
    values.resize(FALLBACK_DIM, 0.0);

    FeatureVector { kind: SignatureKind::Fallback, values }
}

/// 完整视觉特征：[直方图 : 纹理 : 文件名]，各段与整体都做归一化
pub fn visual_signature(
    histogram: &[f32],
    texture: &[f32],
    name: impl AsRef<Path>,
) -> FeatureVector {
    let mut hist = histogram.to_vec();
    hist.resize(HIST_DIM, 0.0);
    l2_normalize(&mut hist);

    let mut tex = texture.to_vec();
    tex.resize(TEXTURE_DIM, 0.0);
    if norm(&tex) > 0.0 {
        l2_normalize(&mut tex);
    }

    let mut values = Vec::with_capacity(VISUAL_DIM);
    values.extend(hist);
    values.extend(tex);
    values.extend(text_vector(name, TEXT_DIM));
    l2_normalize(&mut values);

    FeatureVector { kind: SignatureKind::Visual, values }
}
