use serde::{Deserialize, Serialize};

use crate::models::classification::Classification;
use crate::models::narration::NarrationTranscript;
use crate::models::page::Page;
use crate::models::scene::SceneProgram;
use crate::models::step::{ExtractionSource, Step};
use crate::models::subtitle::SubtitleTrack;

/// 交给外部渲染器的请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// 场景程序源码
    pub program: String,
    pub scene_name: String,
    /// 输出文件名（不含扩展名）
    pub output_name: String,
}

/// 外部渲染器的返回结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub success: bool,
    pub output_path: Option<String>,
    pub error: Option<String>,
}

/// 交给语音合成的请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    pub language_tag: String,
}

/// 时长一致性报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationReport {
    /// 分页脚本总时长
    pub page_total: f64,
    /// 场景程序预估时长
    pub scene: f64,
    /// 旁白预估时长
    pub narration: f64,
    /// 协调后的目标时长
    pub reconciled: f64,
    /// 分页时长需要乘的系数（reconciled / page_total）
    pub page_scale: f64,
    /// 三者是否都在容差范围内
    pub consistent: bool,
}

/// 一道题的全部编译产物
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationBundle {
    pub id: String,
    pub language_tag: String,
    pub classification: Classification,
    pub extraction_source: ExtractionSource,
    pub steps: Vec<Step>,
    pub concepts: Vec<String>,
    pub pages: Vec<Page>,
    pub scene: SceneProgram,
    pub narration: NarrationTranscript,
    pub subtitles: SubtitleTrack,
    pub durations: DurationReport,
    pub render_request: RenderRequest,
    pub speech_request: SpeechRequest,
}
