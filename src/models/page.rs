use serde::{Deserialize, Serialize};

/// 分页类型，决定时长下限和画面提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    Intro,
    Step,
    Verification,
    ConceptIntro,
    Concept,
    Example,
    Summary,
}

/// 屏幕脚本中的一页
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 页码（从 1 开始）
    pub index: usize,
    pub kind: PageKind,
    /// 时长（秒），始终大于 0
    pub duration_seconds: f64,
    pub narration_text: String,
    pub subtitle_text: String,
    /// 画面提示 ID，例如 `show_step_2`
    pub visual_cue_id: String,
}

/// 计算分页总时长
pub fn total_duration(pages: &[Page]) -> f64 {
    pages.iter().map(|p| p.duration_seconds).sum()
}
