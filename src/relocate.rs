use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 单个文件的移动结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStatus {
    Moved,
    /// 仅在 dry-run 时出现
    Planned,
    SourceNotFound,
    Error(String),
}

impl MoveStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, MoveStatus::SourceNotFound | MoveStatus::Error(_))
    }
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveStatus::Moved => f.write_str("moved"),
            MoveStatus::Planned => f.write_str("planned"),
            MoveStatus::SourceNotFound => f.write_str("source-not-found"),
            MoveStatus::Error(msg) => write!(f, "error:{msg}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub label: usize,
    pub status: MoveStatus,
}

/// 分类目录 `category_<label>`
pub fn category_dir(output_dir: &Path, label: usize) -> PathBuf {
    output_dir.join(format!("category_{label}"))
}

fn destination(output_dir: &Path, source: &Path, label: usize) -> PathBuf {
    let dir = category_dir(output_dir, label);
    match source.file_name() {
        Some(name) => dir.join(name),
        None => dir,
    }
}

/// 把每个文件移动到对应的分类目录
///
/// 单个文件失败只记录到结果中，不会中断整个批次。
pub fn relocate(sources: &[PathBuf], labels: &[usize], output_dir: &Path) -> Vec<MoveOutcome> {
    assert_eq!(sources.len(), labels.len(), "文件数量与分类数量不一致");

    let mut outcomes = Vec::with_capacity(sources.len());
    for (source, &label) in sources.iter().zip(labels) {
        let destination = destination(output_dir, source, label);
        let status = move_one(source, &destination);
        match &status {
            MoveStatus::Moved => {
                println!("[OK] {} -> {}", source.display(), destination.display())
            }
            MoveStatus::SourceNotFound => {
                eprintln!("[ERR] 源文件不存在，跳过: {}", source.display())
            }
            status => eprintln!(
                "[ERR] 移动失败 {} -> {}: {}",
                source.display(),
                destination.display(),
                status
            ),
        }
        outcomes.push(MoveOutcome { source: source.clone(), destination, label, status });
    }
    outcomes
}

/// 只计算目标路径，不修改文件系统
pub fn plan(sources: &[PathBuf], labels: &[usize], output_dir: &Path) -> Vec<MoveOutcome> {
    sources
        .iter()
        .zip(labels)
        .map(|(source, &label)| {
            let destination = destination(output_dir, source, label);
            println!("[PLAN] {} -> {}", source.display(), destination.display());
            MoveOutcome {
                source: source.clone(),
                destination,
                label,
                status: MoveStatus::Planned,
            }
        })
        .collect()
}

fn move_one(source: &Path, destination: &Path) -> MoveStatus {
    if let Some(dir) = destination.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            return MoveStatus::Error(e.to_string());
        }
    }
    if !source.exists() {
        return MoveStatus::SourceNotFound;
    }
    // 不覆盖已有文件
    if destination.exists() {
        return MoveStatus::Error(format!("目标已存在: {}", destination.display()));
    }
    match move_file(source, destination) {
        Ok(()) => MoveStatus::Moved,
        Err(e) => MoveStatus::Error(e.to_string()),
    }
}

/// 重命名，跨设备时退回到复制后删除
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        r => r,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path
    }

    #[test]
    fn test_relocate_moves_files() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let a = touch(src.path(), "a.mp4");
        let b = touch(src.path(), "b.mov");

        let outcomes = relocate(&[a.clone(), b.clone()], &[0, 1], out.path());

        assert!(outcomes.iter().all(|o| o.status == MoveStatus::Moved));
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(out.path().join("category_0/a.mp4").is_file());
        assert!(out.path().join("category_1/b.mov").is_file());
        assert_eq!(outcomes[1].destination, out.path().join("category_1").join("b.mov"));
    }

    #[test]
    fn test_relocate_missing_source_does_not_abort() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let a = touch(src.path(), "a.mp4");
        let gone = touch(src.path(), "gone.mp4");
        let c = touch(src.path(), "c.mp4");
        fs::remove_file(&gone).unwrap();

        let outcomes = relocate(&[a, gone, c], &[0, 0, 0], out.path());

        assert_eq!(outcomes[0].status, MoveStatus::Moved);
        assert_eq!(outcomes[1].status, MoveStatus::SourceNotFound);
        assert_eq!(outcomes[2].status, MoveStatus::Moved);
        assert_eq!(outcomes[1].destination, out.path().join("category_0/gone.mp4"));
    }

    #[test]
    fn test_relocate_does_not_overwrite() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let a = touch(src.path(), "a.mp4");
        fs::create_dir_all(out.path().join("category_0")).unwrap();
        fs::write(out.path().join("category_0/a.mp4"), "old").unwrap();

        let outcomes = relocate(&[a.clone()], &[0], out.path());

        assert!(matches!(outcomes[0].status, MoveStatus::Error(_)));
        assert!(a.exists());
        assert_eq!(fs::read_to_string(out.path().join("category_0/a.mp4")).unwrap(), "old");
    }

    #[test]
    fn test_plan_does_not_touch_files() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let a = touch(src.path(), "a.mp4");

        let outcomes = plan(&[a.clone()], &[3], out.path());

        assert_eq!(outcomes[0].status, MoveStatus::Planned);
        assert_eq!(outcomes[0].destination, out.path().join("category_3/a.mp4"));
        assert!(a.exists());
        assert!(!out.path().join("category_3").exists());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MoveStatus::Moved.to_string(), "moved");
        assert_eq!(MoveStatus::SourceNotFound.to_string(), "source-not-found");
        assert_eq!(MoveStatus::Error("disk full".into()).to_string(), "error:disk full");
    }
}
