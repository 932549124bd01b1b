use anyhow::{Result, bail};
use log::{info, warn};
use ndarray::prelude::*;

use crate::capability::Clustering;
use crate::config::ClusterOptions;
use crate::kmeans::kmeans;
use crate::pca::{fit_transform, standardize};
use crate::signature::FeatureVector;

/// 每 10 个视频一个分类，至少 1 个，不超过视频数量
pub fn num_clusters(n: usize) -> usize {
    (n / 10).min(n).max(1)
}

/// PCA 保留的主成分数量：不超过 `cap`、`d - 1` 和 `n - 1`，至少为 1
pub fn num_components(n: usize, d: usize, cap: usize) -> usize {
    cap.min(d.saturating_sub(1)).min(n.saturating_sub(1)).max(1)
}

/// 将一批特征向量的行拼成矩阵
///
/// 整批必须属于同一种特征，且维度与特征种类一致。
pub fn feature_matrix<'a>(vectors: impl IntoIterator<Item = &'a FeatureVector>) -> Result<Array2<f64>> {
    let mut data = vec![];
    let mut kind = None;
    let mut rows = 0;
    for v in vectors {
        if v.dim() != v.kind.dim() {
            bail!("{:?} 特征的维度应为 {}，实际为 {}", v.kind, v.kind.dim(), v.dim());
        }
        match kind {
            None => kind = Some(v.kind),
            Some(k) if k != v.kind => bail!("同一批次中混合了 {:?} 和 {:?} 特征", k, v.kind),
            _ => {}
        }
        data.extend(v.values.iter().map(|x| *x as f64));
        rows += 1;
    }
    let dim = kind.map(|k| k.dim()).unwrap_or(0);
    Ok(Array2::from_shape_vec((rows, dim), data)?)
}

/// 为每个特征向量分配一个分类编号
///
/// 编号只是标识，没有大小或相似度上的含义。聚类不可用时全部为 0。
pub fn cluster(x: ArrayView2<f64>, clustering: Clustering, opts: &ClusterOptions) -> Result<Vec<usize>> {
    let (n, d) = x.dim();
    if n == 0 {
        return Ok(vec![]);
    }

    match clustering {
        Clustering::Unavailable => {
            info!("聚类不可用，所有视频归入同一分类");
            Ok(vec![0; n])
        }
        Clustering::KMeans => {
            let k = num_clusters(n);
            if k == 1 {
                info!("只有 {n} 个视频，全部归入同一分类");
                return Ok(vec![0; n]);
            }

            let scaled = standardize(x.to_owned())?;
            let nc = num_components(n, d, opts.components);
            let reduced = match fit_transform(scaled.view(), nc) {
                Ok(reduced) => reduced,
                Err(e) => {
                    warn!("{:#}，直接使用标准化后的特征聚类", e);
                    scaled
                }
            };

            info!("对 {n} 个 {d} 维向量降维到 {nc} 维，聚类中心数量 = {k}");
            kmeans(reduced.view(), k, opts.max_iter, opts.seed)
        }
    }
}
