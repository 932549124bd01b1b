use anyhow::{Context, Result};
use linfa::DatasetBase;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use log::info;
use ndarray::prelude::*;
use rand_08::SeedableRng;
use rand_08::rngs::StdRng;

fn imbalance_factor(hist: &[usize]) -> f32 {
    let (mut tot, mut uf) = (0.0, 0.0);
    for h in hist {
        let h = *h as f32;
        tot += h;
        uf += h.powf(2.0);
    }
    uf * hist.len() as f32 / tot.powf(2.0)
}

/// 使用 k-means 聚类，返回每一行所属的聚类中心编号
///
/// 参数：
/// - x: 输入矩阵，每行一个样本
/// - k: 聚类中心数量，不能超过样本数
/// - max_iter: 最大迭代次数
/// - seed: 初始化使用的随机种子，相同输入和种子的结果相同
pub fn kmeans(x: ArrayView2<f64>, k: usize, max_iter: usize, seed: u64) -> Result<Vec<usize>> {
    let n = x.nrows();
    if k <= 1 {
        return Ok(vec![0; n]);
    }

    let data = x.to_owned();
    let dataset = DatasetBase::from(data.clone());
    let model = KMeans::params_with_rng(k, StdRng::seed_from_u64(seed))
        .max_n_iterations(max_iter as u64)
        .fit(&dataset)
        .with_context(|| format!("无法将 {} 个样本聚类为 {} 类", n, k))?;

    let mut assignments = Array1::<usize>::zeros(n);
    model.predict_inplace(&data, &mut assignments);

    let mut hist = vec![0; k];
    assignments.iter().for_each(|&c| hist[c] += 1);
    info!("KMeans 完成 - 不平衡度：{:.2}", imbalance_factor(&hist));

    Ok(assignments.to_vec())
}
