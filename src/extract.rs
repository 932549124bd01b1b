use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{info, warn};
use rayon::prelude::*;

use crate::capability::Decoding;
use crate::config::FeatureOptions;
use crate::signature::{FeatureVector, size_signature};
use crate::utils::pb_style;

/// 单个视频在一次运行中的记录
#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub source: PathBuf,
    pub features: FeatureVector,
    /// 聚类后填入
    pub label: Option<usize>,
}

/// 单个文件的提取结果
#[derive(Debug, Clone)]
pub enum Extraction {
    Ready(FeatureVector),
    /// 视频能打开，但没有任何一帧得到颜色直方图
    NoVisualSignal,
    /// 整个文件被跳过，不参与聚类
    Skipped(String),
}

/// 在 `total` 帧中均匀选出 `n` 个帧号
pub fn sample_frame_indices(total: i64, n: usize) -> Vec<i64> {
    if total <= 0 || n == 0 {
        return vec![];
    }
    (0..n as i64).map(|i| (i * total / n as i64).min(total - 1)).collect()
}

pub struct FeatureExtractor {
    decoding: Decoding,
    #[cfg_attr(not(feature = "opencv"), allow(dead_code))]
    opts: FeatureOptions,
}

impl FeatureExtractor {
    pub fn new(decoding: Decoding, opts: FeatureOptions) -> Self {
        Self { decoding, opts }
    }

    /// 按当前的解码能力提取单个文件的特征
    pub fn extract(&self, path: &Path) -> Extraction {
        match self.decoding {
            #[cfg(feature = "opencv")]
            Decoding::OpenCv => match crate::video::analyze(path, &self.opts) {
                Ok(Some(summary)) => Extraction::Ready(crate::signature::visual_signature(
                    &summary.histogram,
                    &summary.texture,
                    path,
                )),
                Ok(None) => Extraction::NoVisualSignal,
                Err(e) => Extraction::Skipped(format!("{e:#}")),
            },
            Decoding::Unavailable => match fallback_signature(path) {
                Ok(v) => Extraction::Ready(v),
                Err(e) => Extraction::Skipped(format!("{e:#}")),
            },
        }
    }

    /// 并行提取一批文件的特征，结果交给 [`merge_extractions`] 统一特征空间
    pub fn extract_batch(&self, paths: &[PathBuf]) -> Vec<VideoRecord> {
        let pb = ProgressBar::new(paths.len() as u64).with_style(pb_style());
        let outcomes = paths
            .par_iter()
            .progress_with(pb.clone())
            .map(|path| {
                pb.suspend(|| println!("提取特征: {}", path.display()));
                self.extract(path)
            })
            .collect::<Vec<_>>();
        pb.finish_with_message("特征提取完成");

        merge_extractions(paths, outcomes)
    }
}

/// 把每个文件的提取结果合并为同一种特征空间的记录
///
/// 只要有一个视频没有视觉特征，整批都改用文件大小 + 文件名特征，
/// 避免两种不同含义的向量混在一起聚类。返回顺序与输入一致，无法读取的文件被丢弃。
pub fn merge_extractions(paths: &[PathBuf], outcomes: Vec<Extraction>) -> Vec<VideoRecord> {
    let fallback_all = outcomes.iter().any(|o| matches!(o, Extraction::NoVisualSignal));
    if fallback_all {
        warn!("部分视频没有可用的视觉特征，本批次全部改用文件大小 + 文件名特征");
    }

    let mut records = Vec::with_capacity(paths.len());
    for (path, outcome) in paths.iter().zip(outcomes) {
        let features = match outcome {
            Extraction::Ready(v) if !fallback_all => v,
            Extraction::Ready(_) | Extraction::NoVisualSignal => match fallback_signature(path) {
                Ok(v) => v,
                Err(e) => {
                    info!("跳过 {}: {:#}", path.display(), e);
                    continue;
                }
            },
            Extraction::Skipped(reason) => {
                info!("跳过 {}: {}", path.display(), reason);
                continue;
            }
        };
        records.push(VideoRecord { source: path.clone(), features, label: None });
    }
    records
}

/// 根据文件大小和文件名生成退化特征
pub fn fallback_signature(path: &Path) -> Result<FeatureVector> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("无法读取文件信息: {}", path.display()))?
        .len();
    Ok(size_signature(size, path))
}
