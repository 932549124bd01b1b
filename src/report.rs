use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::relocate::{MoveOutcome, MoveStatus};

/// 整理结果的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// 参与移动的文件总数
    pub processed: usize,
    pub moved: usize,
    /// 源文件不存在或移动失败的数量
    pub failed: usize,
    /// 每个分类中成功移动（dry-run 时为计划移动）的文件数量
    pub categories: BTreeMap<usize, usize>,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[MoveOutcome]) -> Self {
        let mut summary = Summary { processed: outcomes.len(), ..Default::default() };
        for o in outcomes {
            if o.status.is_failure() {
                summary.failed += 1;
                continue;
            }
            if o.status == MoveStatus::Moved {
                summary.moved += 1;
            }
            *summary.categories.entry(o.label).or_default() += 1;
        }
        summary
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?)
            }
            OutputFormat::Table => {
                println!();
                println!("=== 分类报告 ===");
                println!("  处理文件总数: {}", self.processed);
                println!("  成功移动: {}", self.moved);
                println!("  失败/跳过: {}", self.failed);
                for (label, count) in &self.categories {
                    println!("  分类 {} 包含 {} 个视频", label, count);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct AuditRow<'a> {
    source: &'a str,
    destination: &'a str,
    status: String,
}

/// 写出审计 CSV，每个文件一行，覆盖旧文件
pub fn write_audit(path: &Path, outcomes: &[MoveOutcome]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("无法创建报告文件: {}", path.display()))?;
    for o in outcomes {
        let source = o.source.to_string_lossy();
        let destination = o.destination.to_string_lossy();
        writer.serialize(AuditRow {
            source: &source,
            destination: &destination,
            status: o.status.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
