use log::{info, warn};

/// 视频解码能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    /// 使用 OpenCV 解码视频帧，提取颜色直方图和 ORB 特征
    #[cfg(feature = "opencv")]
    OpenCv,
    /// 无法解码，只使用文件大小和文件名
    Unavailable,
}

/// 聚类能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clustering {
    /// 标准化 + PCA + k-means
    KMeans,
    /// 所有视频归入分类 0
    Unavailable,
}

/// 启动时确定一次的运行能力，之后只根据这里的结果分派
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub decoding: Decoding,
    pub clustering: Clustering,
}

impl Capabilities {
    pub fn resolve(no_decode: bool, no_cluster: bool) -> Self {
        let decoding = if no_decode { Decoding::Unavailable } else { Decoding::detect() };
        let clustering = if no_cluster { Clustering::Unavailable } else { Clustering::KMeans };
        info!("解码能力：{:?}，聚类能力：{:?}", decoding, clustering);
        Self { decoding, clustering }
    }
}

impl Decoding {
    #[cfg(feature = "opencv")]
    fn detect() -> Self {
        match opencv::videoio::get_backends() {
            Ok(backends) if !backends.is_empty() => Decoding::OpenCv,
            Ok(_) => {
                warn!("OpenCV 没有可用的视频后端，退回到文件名特征");
                Decoding::Unavailable
            }
            Err(e) => {
                warn!("无法查询 OpenCV 视频后端: {}", e);
                Decoding::Unavailable
            }
        }
    }

    #[cfg(not(feature = "opencv"))]
    fn detect() -> Self {
        warn!("未启用 opencv 特性，退回到文件名特征");
        Decoding::Unavailable
    }
}
