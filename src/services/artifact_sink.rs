//! 产物输出服务 - 业务能力层
//!
//! 只负责"把一道题的编译产物交出去"，不关心产物如何生成。
//! 渲染和语音合成由外部工具完成，这里只落盘它们需要的输入。

use crate::error::{AppError, AppResult};
use crate::models::{validate_problem_id, CompilationBundle, Language, RenderResult};
use crate::services::narration::default_voice;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 产物接收方
pub trait ArtifactSink: Send + Sync + 'static {
    /// 交付一道题的全部产物
    fn deliver(
        &self,
        bundle: &CompilationBundle,
    ) -> impl Future<Output = AppResult<RenderResult>> + Send;
}

/// 写入本地目录的产物接收方
///
/// 每道题输出 6 个文件：
/// - `<id>.py`：场景程序
/// - `<id>.json`：完整编译结果
/// - `<id>.narration.txt`：旁白稿
/// - `<id>.ssml`：语音合成输入
/// - `<id>.srt` / `<id>.vtt`：字幕
pub struct DiskSink {
    output_dir: PathBuf,
}

impl DiskSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn write(&self, file_name: String, content: &str) -> AppResult<PathBuf> {
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }
}

impl ArtifactSink for DiskSink {
    async fn deliver(&self, bundle: &CompilationBundle) -> AppResult<RenderResult> {
        // 标识直接拼进文件名，写盘前再校验一次
        validate_problem_id(&bundle.id)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;

        let id = &bundle.id;
        let program_path = self
            .write(format!("{}.py", id), &bundle.scene.source)
            .await?;

        let json = serde_json::to_string_pretty(bundle)?;
        self.write(format!("{}.json", id), &json).await?;

        self.write(format!("{}.narration.txt", id), &bundle.narration.text)
            .await?;

        let voice = default_voice(Language::find(&bundle.language_tag));
        self.write(format!("{}.ssml", id), &bundle.narration.to_ssml(voice))
            .await?;

        self.write(format!("{}.srt", id), &bundle.subtitles.to_srt())
            .await?;
        self.write(format!("{}.vtt", id), &bundle.subtitles.to_vtt())
            .await?;

        debug!("产物已写入: {}", program_path.display());

        Ok(RenderResult {
            success: true,
            output_path: Some(program_path.display().to_string()),
            error: None,
        })
    }
}
