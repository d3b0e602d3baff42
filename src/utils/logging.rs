//! 批量编译的运行日志
//!
//! 终端输出走 tracing；每道题的结果另外追加到一个纯文本日志文件，
//! 方便批量跑完后对照。

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const RULE_WIDTH: usize = 60;

/// 逐行追加的结果日志文件
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// 新建日志文件并写入带时间的文件头（覆盖旧文件）
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rule = "=".repeat(RULE_WIDTH);
        let header = format!(
            "{}\n题目编译日志 - {}\n{}\n\n",
            rule,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            rule
        );
        fs::write(&path, header)
            .with_context(|| format!("无法创建日志文件: {}", path.display()))?;
        Ok(Self { path })
    }

    /// 沿用已有文件，不写文件头
    pub fn append_to(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一行，行首带时间
    pub fn append(&self, line: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("无法打开日志文件: {}", self.path.display()))?;
        writeln!(file, "[{}] {}", chrono::Local::now().format("%H:%M:%S"), line)?;
        Ok(())
    }
}

/// 用分隔线包起来的一组终端日志
fn banner(rule: char, lines: &[String]) {
    let rule = rule.to_string().repeat(RULE_WIDTH);
    info!("\n{}", rule);
    for line in lines {
        info!("{}", line);
    }
    info!("{}", rule);
}

pub fn log_startup(max_concurrent: usize) {
    banner(
        '=',
        &[
            "🚀 程序启动 - 批量题目编译模式".to_string(),
            format!("📊 最大并发数: {}", max_concurrent),
        ],
    );
}

/// 题目加载完成后的分批计划
pub fn log_plan(total: usize, per_batch: usize) {
    info!("✓ 找到 {} 道待编译的题目", total);
    info!("📋 每批 {} 道，共 {} 批，每批完成后再开始下一批", per_batch, total.div_ceil(per_batch.max(1)));
}

/// 批次开始；`first` 与 `last` 为题目序号（从 1 开始）
pub fn log_batch_start(batch_num: usize, total_batches: usize, first: usize, last: usize, total: usize) {
    banner(
        '=',
        &[
            format!("📦 开始处理第 {}/{} 批", batch_num, total_batches),
            format!("📄 本批题目: {}-{} / 共 {} 道", first, last, total),
        ],
    );
}

pub fn log_batch_complete(batch_num: usize, success: usize, attempted: usize) {
    banner('─', &[format!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, attempted)]);
}

/// 全部完成后的统计
pub fn log_summary(success: usize, failed: usize, fallback: usize, total: usize, log: &RunLog) {
    banner(
        '=',
        &[
            format!(
                "📊 全部编译完成 - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            format!("✅ 成功: {}/{}", success, total),
            format!("⚠️ 兜底场景: {}", fallback),
            format!("❌ 失败: {}", failed),
        ],
    );
    info!("日志已保存至: {}", log.path().display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_writes_header_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "旧内容\n").unwrap();

        let log = RunLog::create(&path).unwrap();
        log.append("任务 1 完成").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("题目编译日志"));
        assert!(!content.contains("旧内容"));
        assert!(content.trim_end().ends_with("任务 1 完成"));
    }

    #[test]
    fn test_append_to_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");

        let log = RunLog::append_to(&path);
        log.append("第一行").unwrap();
        log.append("第二行").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("题目编译日志"));
    }
}
