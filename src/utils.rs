use anyhow::Result;
use indicatif::ProgressStyle;
use regex::Regex;

/// 进度条样式
pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap()
        .progress_chars("#>-")
}

/// 根据逗号分隔的后缀列表构建大小写不敏感的正则，需要完整匹配扩展名
pub fn suffix_regex(suffix: &str) -> Result<Regex> {
    let re = format!("(?i)^({})$", suffix.replace(',', "|"));
    Ok(Regex::new(&re)?)
}
