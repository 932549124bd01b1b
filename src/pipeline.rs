use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::{info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::capability::Capabilities;
use crate::cluster::{cluster, feature_matrix};
use crate::config::OrganizeConfig;
use crate::extract::{FeatureExtractor, VideoRecord};
use crate::relocate::{MoveOutcome, plan, relocate};
use crate::report::{Summary, write_audit};

/// 一次整理的结果
#[derive(Debug)]
pub struct Organized {
    pub records: Vec<VideoRecord>,
    pub outcomes: Vec<MoveOutcome>,
    pub summary: Summary,
}

/// 列出目录下（不递归）扩展名匹配的文件，按文件名排序
///
/// 只在开始时扫描一次，之后目录的变化不会影响本次处理的文件集合。
pub fn scan_videos(dir: &Path, suffix: &Regex) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("待整理的视频目录不存在: {}", dir.display());
    }
    info!("开始扫描目录: {}", dir.display());

    let mut entries = vec![];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if let Some(ext) = path.extension() {
            if suffix.is_match(&ext.to_string_lossy()) {
                entries.push(path);
            }
        }
    }
    info!("扫描完成，共 {} 个视频", entries.len());
    Ok(entries)
}

/// 提取全部特征 → 聚类 → 移动全部文件
///
/// 没有找到视频时返回 `Ok(None)`，此时不会修改文件系统。
pub fn organize(config: &OrganizeConfig, caps: &Capabilities) -> Result<Option<Organized>> {
    let paths = scan_videos(&config.input_dir, &config.suffix)?;

    let extractor = FeatureExtractor::new(caps.decoding, config.feature.clone());
    let mut records = extractor.extract_batch(&paths);
    if records.is_empty() {
        return Ok(None);
    }

    println!("正在对 {} 个视频进行聚类……", records.len());
    let x = feature_matrix(records.iter().map(|r| &r.features))?;
    let labels = cluster(x.view(), caps.clustering, &config.cluster)?;
    for (record, label) in records.iter_mut().zip(&labels) {
        record.label = Some(*label);
    }

    let sources = records.iter().map(|r| r.source.clone()).collect::<Vec<_>>();
    let outcomes = if config.dry_run {
        plan(&sources, &labels, &config.output_dir)
    } else {
        println!("正在移动视频到分类目录……");
        let outcomes = relocate(&sources, &labels, &config.output_dir);
        // 文件已经移动完毕，报告写入失败不影响本次结果
        match write_audit(&config.report, &outcomes) {
            Ok(()) => info!("报告已写入: {}", config.report.display()),
            Err(e) => warn!("{:#}", e),
        }
        outcomes
    };

    let summary = Summary::from_outcomes(&outcomes);
    Ok(Some(Organized { records, outcomes, summary }))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::{ClusterOptions, FeatureOptions};
    use crate::signature::FALLBACK_DIM;
    use crate::utils::suffix_regex;

    fn config(input: &Path, output: &Path, report: &Path) -> OrganizeConfig {
        OrganizeConfig {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            report: report.to_path_buf(),
            suffix: suffix_regex("mp4,mov,webm,avi").unwrap(),
            dry_run: false,
            feature: FeatureOptions::default(),
            cluster: ClusterOptions::default(),
        }
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["b.MP4", "a.mov", "c.webm", "d.avi", "notes.txt", "e.mp4.part"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let re = suffix_regex("mp4,mov,webm,avi").unwrap();
        let found = scan_videos(dir.path(), &re).unwrap();
        let names = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.mov", "b.MP4", "c.webm", "d.avi"]);
    }

    #[test]
    fn test_scan_missing_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let re = suffix_regex("mp4").unwrap();
        assert!(scan_videos(&dir.path().join("nope"), &re).is_err());
    }

    #[test]
    fn test_organize_fallback_end_to_end() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..12 {
            fs::write(input.path().join(format!("video_{i}.mp4")), vec![7u8; 1000 + i * 37])
                .unwrap();
        }
        let report = output.path().join("report.csv");
        let caps = Capabilities::resolve(true, false);

        let organized =
            organize(&config(input.path(), output.path(), &report), &caps).unwrap().unwrap();

        assert_eq!(organized.records.len(), 12);
        assert!(organized.records.iter().all(|r| r.features.dim() == FALLBACK_DIM));
        assert!(organized.records.iter().all(|r| r.label == Some(0)));
        assert_eq!(organized.summary.moved, 12);
        assert_eq!(fs::read_dir(output.path().join("category_0")).unwrap().count(), 12);
        assert_eq!(fs::read_dir(input.path()).unwrap().count(), 0);
        assert!(report.is_file());
    }

    #[test]
    fn test_organize_survives_unwritable_report() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        for i in 0..3 {
            fs::write(input.path().join(format!("clip_{i}.mov")), vec![1u8; 200 + i]).unwrap();
        }
        let report = output.path().join("no-such-dir").join("report.csv");
        let caps = Capabilities::resolve(true, true);

        let organized =
            organize(&config(input.path(), output.path(), &report), &caps).unwrap().unwrap();

        assert_eq!(organized.summary.moved, 3);
        assert_eq!(organized.outcomes.len(), 3);
        assert!(!report.exists());
        assert_eq!(fs::read_dir(input.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_organize_empty_dir() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let report = output.path().join("report.csv");
        let caps = Capabilities::resolve(true, true);

        let organized = organize(&config(input.path(), output.path(), &report), &caps).unwrap();

        assert!(organized.is_none());
        assert!(!report.exists());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
