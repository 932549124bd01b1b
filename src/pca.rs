use anyhow::{Context, Result};
use linfa::DatasetBase;
use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use linfa_reduction::Pca;
use log::debug;
use ndarray::prelude::*;

/// 按列标准化为均值 0、方差 1，方差为 0 的列只做中心化
pub fn standardize(x: Array2<f64>) -> Result<Array2<f64>> {
    let dataset = DatasetBase::from(x);
    let scaler = LinearScaler::standard().fit(&dataset).context("无法计算标准化参数")?;
    Ok(scaler.transform(dataset).records)
}

/// 用 PCA 把每行投影到前 `k` 个主成分上
pub fn fit_transform(x: ArrayView2<f64>, k: usize) -> Result<Array2<f64>> {
    let data = x.to_owned();
    let dataset = DatasetBase::from(data.clone());
    let pca = Pca::params(k)
        .fit(&dataset)
        .with_context(|| format!("PCA 降维到 {} 维失败", k))?;
    debug!("PCA 解释方差: {:?}", pca.explained_variance());
    let reduced: Array2<f64> = pca.predict(&data);
    Ok(reduced)
}
