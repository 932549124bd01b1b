use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Parser, Subcommand, ValueEnum};
use directories::UserDirs;
use regex::Regex;

use crate::cli::*;

static VIDEO_DIRS: LazyLock<VideoDirs> = LazyLock::new(|| {
    let home = UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let videos = home.join("Videos");
    VideoDirs {
        input: videos.join("mixed_videos").to_string_lossy().into_owned(),
        output: videos.join("categorized_videos").to_string_lossy().into_owned(),
    }
});

struct VideoDirs {
    input: String,
    output: String,
}

fn default_input_dir() -> &'static str {
    &VIDEO_DIRS.input
}

fn default_output_dir() -> &'static str {
    &VIDEO_DIRS.output
}

#[derive(Parser, Debug, Clone)]
pub struct FeatureOptions {
    /// 每个视频均匀采样的帧数
    #[arg(long, value_name = "N", default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,
    /// 采样帧缩放后的边长
    #[arg(long, value_name = "SIZE", default_value_t = 224, value_parser = clap::value_parser!(u32).range(1..=4096))]
    pub analysis_size: u32,
    /// 每帧 ORB 特征点最大保留数量
    #[arg(short = 'n', long, value_name = "N", default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub orb_nfeatures: u32,
    /// 不解码视频，只使用文件大小和文件名作为特征
    #[arg(long)]
    pub no_decode: bool,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self::parse_from(["vidsort"])
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ClusterOptions {
    /// k-means 初始化使用的随机种子
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// k-means 最大迭代次数
    #[arg(long, value_name = "N", default_value_t = 300)]
    pub max_iter: usize,
    /// PCA 降维后保留的最大主成分数量
    #[arg(long, value_name = "N", default_value_t = 50)]
    pub components: usize,
    /// 不进行聚类，所有视频归入同一分类
    #[arg(long)]
    pub no_cluster: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self::parse_from(["vidsort"])
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DirOptions {
    /// 待整理的视频目录
    #[arg(short, long, env = "MIXED_VIDEOS_DIR", default_value = default_input_dir())]
    pub input: PathBuf,
    /// 分类目录的存放位置
    #[arg(short, long, env = "VIDEO_SOURCE_DIR", default_value = default_output_dir())]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vidsort", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 提取特征、聚类，并把视频移动到分类目录
    Organize(OrganizeCommand),
    /// 输出单个视频的特征向量
    Inspect(InspectCommand),
}

/// 一次整理任务需要的全部配置，在命令行边界处构建后传入流水线
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 审计 CSV 的路径
    pub report: PathBuf,
    /// 视频扩展名过滤
    pub suffix: Regex,
    pub dry_run: bool,
    pub feature: FeatureOptions,
    pub cluster: ClusterOptions,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 纯文本
    Table,
    /// JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults() {
        let feature = FeatureOptions::default();
        assert_eq!(feature.frames, 8);
        assert_eq!(feature.analysis_size, 224);
        assert_eq!(feature.orb_nfeatures, 500);
        assert!(!feature.no_decode);

        let cluster = ClusterOptions::default();
        assert_eq!(cluster.seed, 42);
        assert_eq!(cluster.components, 50);
        assert!(!cluster.no_cluster);
    }

    #[test]
    fn explicit_dirs_override_defaults() {
        let opts = Opts::try_parse_from([
            "vidsort", "organize", "-i", "/tmp/in", "-o", "/tmp/out", "--no-cluster",
        ])
        .unwrap();
        let SubCommand::Organize(cmd) = opts.subcmd else {
            panic!("expected organize");
        };
        assert_eq!(cmd.dirs.input, PathBuf::from("/tmp/in"));
        assert_eq!(cmd.dirs.output, PathBuf::from("/tmp/out"));
        assert!(cmd.cluster.no_cluster);
    }

    #[test]
    fn frame_size_is_bounded() {
        for size in ["0", "4097", "4294967295"] {
            let result =
                Opts::try_parse_from(["vidsort", "inspect", "--analysis-size", size, "a.mp4"]);
            assert!(result.is_err(), "{size}");
        }
        let opts =
            Opts::try_parse_from(["vidsort", "inspect", "--analysis-size", "4096", "a.mp4"]).unwrap();
        let SubCommand::Inspect(cmd) = opts.subcmd else {
            panic!("expected inspect");
        };
        assert_eq!(cmd.feature.analysis_size, 4096);
    }

    #[test]
    fn orb_nfeatures_is_bounded() {
        assert!(Opts::try_parse_from(["vidsort", "inspect", "-n", "0", "a.mp4"]).is_err());
        assert!(Opts::try_parse_from(["vidsort", "inspect", "-n", "3000000000", "a.mp4"]).is_err());
    }
}
