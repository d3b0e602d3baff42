//! 旁白生成
//!
//! 按讲解方式拼接固定话术与步骤/概念内容，再把数学符号改写为口语。

use crate::config::CompilerTables;
use crate::models::{Classification, Language, NarrationTranscript, Step};
use crate::services::math_terms::{normalize_punctuation, speak_math};
use crate::services::page_script::{resolve_mode, ScriptMode};
use crate::services::phrases::{phrases, Phrases};
use crate::services::sanitizer::ContentSanitizer;
use crate::utils::text::truncate_text;
use phf::phf_map;
use std::collections::HashMap;

/// 单个步骤在旁白中的最大长度
pub const MAX_STEP_CHARS: usize = 120;

/// 题干在旁白中的最大长度
const MAX_QUESTION_CHARS: usize = 150;

/// 各语言的默认配音
static DEFAULT_VOICES: phf::Map<&'static str, &'static str> = phf_map! {
    "zh" => "zh-CN-XiaoxiaoNeural",
    "en" => "en-US-JennyNeural",
    "es" => "es-ES-ElviraNeural",
    "ja" => "ja-JP-NanamiNeural",
    "fr" => "fr-FR-DeniseNeural",
};

/// 获取语言的默认配音
pub fn default_voice(language: Language) -> &'static str {
    DEFAULT_VOICES
        .get(language.tag())
        .copied()
        .unwrap_or("en-US-JennyNeural")
}

/// 旁白生成器
pub struct NarrationBuilder {
    narration_rates: HashMap<String, f64>,
    fallback_rate: f64,
    sanitizer: ContentSanitizer,
}

impl NarrationBuilder {
    pub fn new(tables: &CompilerTables) -> Self {
        Self {
            narration_rates: tables
                .rates
                .iter()
                .map(|(tag, rates)| (tag.clone(), rates.narration_chars_per_second))
                .collect(),
            fallback_rate: tables.rates_for(Language::En).narration_chars_per_second,
            sanitizer: ContentSanitizer::new(tables.sanitizer_max_len),
        }
    }

    /// 生成旁白
    ///
    /// # 参数
    /// - `classification`: 分类结果
    /// - `question`: 原始题干
    /// - `steps`: 提取出的步骤
    /// - `concepts`: 概念要点
    /// - `language`: 讲解语言
    pub fn build(
        &self,
        classification: &Classification,
        question: &str,
        steps: &[Step],
        concepts: &[String],
        language: Language,
    ) -> NarrationTranscript {
        let p = phrases(language);
        let question = truncate_text(&self.sanitizer.sanitize(question), MAX_QUESTION_CHARS);

        let segments = match resolve_mode(classification, &question) {
            ScriptMode::Concrete => concrete_segments(p, &question, steps),
            ScriptMode::Theoretical => theoretical_segments(p, &question, concepts),
        };

        let text = segments
            .iter()
            .map(|segment| terminate(&speak_math(segment, language), p))
            .collect::<Vec<_>>()
            .join("");
        let text = normalize_punctuation(&text, language);

        let estimated_duration_seconds = self.estimate_duration(&text, language);
        NarrationTranscript {
            text,
            estimated_duration_seconds,
            language_tag: language.tag().to_string(),
        }
    }

    /// 朗读时长估算：字符数 / 朗读速度，非空文本至少 1 秒
    pub fn estimate_duration(&self, text: &str, language: Language) -> f64 {
        let chars = text.chars().count();
        if chars == 0 {
            return 0.0;
        }
        let cps = self
            .narration_rates
            .get(language.tag())
            .copied()
            .unwrap_or(self.fallback_rate);
        (chars as f64 / cps).max(1.0)
    }
}

fn concrete_segments(p: &Phrases, question: &str, steps: &[Step]) -> Vec<String> {
    let mut segments = vec![format!("{}{}", p.intro_concrete, question)];

    if steps.iter().all(|s| s.is_sentinel()) {
        segments.push(p.steps_unavailable.to_string());
    } else {
        for step in steps.iter().filter(|s| !s.is_sentinel()) {
            segments.push(format!(
                "{}{}",
                p.step_narration(step.ordinal),
                truncate_text(&step.full_text(), MAX_STEP_CHARS)
            ));
        }
    }

    segments.push(p.closing.to_string());
    segments
}

fn theoretical_segments(p: &Phrases, question: &str, concepts: &[String]) -> Vec<String> {
    let mut segments = vec![format!("{}{}", p.intro_theory, question)];

    for (i, concept) in concepts.iter().enumerate() {
        let concept = truncate_text(concept, MAX_STEP_CHARS);
        if i == 0 {
            segments.push(concept);
        } else {
            segments.push(format!("{}{}", p.next_prefix, concept));
        }
    }

    segments.push(p.summary.to_string());
    segments
}

/// 保证每段以句末标点结尾
fn terminate(segment: &str, p: &Phrases) -> String {
    let trimmed = segment.trim();
    let ends_with_stop = trimmed
        .chars()
        .last()
        .map(|c| matches!(c, '。' | '！' | '？' | '.' | '!' | '?'))
        .unwrap_or(true);
    if ends_with_stop {
        if p.full_stop == "。" {
            trimmed.to_string()
        } else {
            format!("{} ", trimmed)
        }
    } else {
        format!("{}{}", trimmed, p.full_stop)
    }
}
