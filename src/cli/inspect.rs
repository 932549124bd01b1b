use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;

use crate::capability::Capabilities;
use crate::cli::SubCommandExtend;
use crate::config::{FeatureOptions, Opts};
use crate::extract::{Extraction, FeatureExtractor, fallback_signature};
use crate::signature::FeatureVector;

#[derive(Parser, Debug, Clone)]
pub struct InspectCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    /// 视频路径
    pub video: PathBuf,
}

#[derive(Serialize)]
struct Inspection<'a> {
    path: &'a PathBuf,
    dim: usize,
    norm: f32,
    #[serde(flatten)]
    features: &'a FeatureVector,
}

impl SubCommandExtend for InspectCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let caps = Capabilities::resolve(self.feature.no_decode, true);
        let extractor = FeatureExtractor::new(caps.decoding, self.feature.clone());

        let features = match extractor.extract(&self.video) {
            Extraction::Ready(v) => v,
            Extraction::NoVisualSignal => fallback_signature(&self.video)?,
            Extraction::Skipped(reason) => {
                return Err(anyhow!("无法提取特征 {}: {}", self.video.display(), reason));
            }
        };

        let inspection = Inspection {
            path: &self.video,
            dim: features.dim(),
            norm: features.norm(),
            features: &features,
        };
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        Ok(())
    }
}
