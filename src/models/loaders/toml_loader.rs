use crate::models::problem::{validate_problem_id, ProblemInput};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一道题目
///
/// 文件中未写 `id` 时使用文件名（不含扩展名）。`id` 会成为输出文件名，
/// 不合法时返回错误。
pub async fn load_problem(toml_file_path: &Path) -> Result<ProblemInput> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut problem: ProblemInput = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    if problem.id.trim().is_empty() {
        problem.id = toml_file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "problem".to_string());
    }
    validate_problem_id(&problem.id)
        .with_context(|| format!("题目标识不可用: {}", toml_file_path.display()))?;
    problem.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(problem)
}

/// 从文件夹中加载所有 TOML 题目，按文件名排序
///
/// 单个文件解析失败只记录警告，不影响其它文件。
pub async fn load_all_problems(folder_path: &str) -> Result<Vec<ProblemInput>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut problems = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_problem(&path).await {
            Ok(problem) => problems.push(problem),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(problems)
}
