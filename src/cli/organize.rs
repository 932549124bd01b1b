use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::capability::Capabilities;
use crate::cli::SubCommandExtend;
use crate::config::{ClusterOptions, DirOptions, FeatureOptions, Opts, OrganizeConfig, OutputFormat};
use crate::pipeline::organize;
use crate::utils::suffix_regex;

#[derive(Parser, Debug, Clone)]
pub struct OrganizeCommand {
    #[command(flatten)]
    pub dirs: DirOptions,
    #[command(flatten)]
    pub feature: FeatureOptions,
    #[command(flatten)]
    pub cluster: ClusterOptions,
    /// 审计报告路径，每次运行都会覆盖
    #[arg(short, long, default_value = "categorize_report.csv")]
    pub report: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "mp4,mov,webm,avi")]
    pub suffix: String,
    /// 只输出计划的移动，不修改任何文件
    #[arg(long)]
    pub dry_run: bool,
    /// 汇总输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl OrganizeCommand {
    pub fn config(&self) -> Result<OrganizeConfig> {
        Ok(OrganizeConfig {
            input_dir: self.dirs.input.clone(),
            output_dir: self.dirs.output.clone(),
            report: self.report.clone(),
            suffix: suffix_regex(&self.suffix)?,
            dry_run: self.dry_run,
            feature: self.feature.clone(),
            cluster: self.cluster.clone(),
        })
    }
}

impl SubCommandExtend for OrganizeCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let config = self.config()?;
        let caps = Capabilities::resolve(self.feature.no_decode, self.cluster.no_cluster);

        match organize(&config, &caps)? {
            Some(organized) => organized.summary.print(self.output_format),
            None => {
                println!("待整理目录中没有找到视频");
                Ok(())
            }
        }
    }
}
