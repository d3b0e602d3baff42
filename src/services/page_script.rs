//! 页面脚本生成
//!
//! 把分类结果、步骤和概念整理成按时间排列的分页。每页时长为
//! `max(该类页面的下限, ceil(字符数 / 阅读速度))`。

use crate::config::{CompilerTables, LanguageRates, PageFloors};
use crate::models::{Category, Classification, Language, Page, PageKind, Step};
use crate::services::phrases::phrases;
use crate::services::sanitizer::ContentSanitizer;
use crate::utils::text::truncate_text;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// 页面中题干的最大展示长度
const QUESTION_PREVIEW_CHARS: usize = 120;

/// 混合类题目中出现这些词时按理论讲解处理
static DEMONSTRATION_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)拉窗帘|原理|演示|概念|\b(?:principle|demonstrat\w*|concept)\b").unwrap()
});

/// 讲解脚本的组织方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// 引入 → 步骤 → 验证
    Concrete,
    /// 概念引入 → 概念 → 举例 → 总结
    Theoretical,
}

/// 确定讲解方式；混合类题目看题干里是否有演示类字眼
pub fn resolve_mode(classification: &Classification, question: &str) -> ScriptMode {
    match classification.category {
        Category::ConcreteProblem => ScriptMode::Concrete,
        Category::TheoreticalQuestion => ScriptMode::Theoretical,
        Category::Mixed if DEMONSTRATION_CUE.is_match(question) => ScriptMode::Theoretical,
        Category::Mixed => ScriptMode::Concrete,
    }
}

/// 页面脚本生成器
pub struct PageScriptBuilder {
    floors: PageFloors,
    rates: HashMap<String, LanguageRates>,
    fallback_rates: LanguageRates,
    sanitizer: ContentSanitizer,
}

impl PageScriptBuilder {
    pub fn new(tables: &CompilerTables) -> Self {
        Self {
            floors: tables.pages.clone(),
            rates: tables.rates.clone(),
            fallback_rates: tables.rates_for(Language::En),
            sanitizer: ContentSanitizer::new(tables.sanitizer_max_len),
        }
    }

    /// 生成分页
    ///
    /// # 参数
    /// - `classification`: 分类结果
    /// - `question`: 原始题干
    /// - `steps`: 提取出的步骤（至少一条）
    /// - `concepts`: 概念要点（理论类使用）
    /// - `language`: 讲解语言
    ///
    /// # 返回
    /// 至少一页；页码从 1 开始连续编号
    pub fn build(
        &self,
        classification: &Classification,
        question: &str,
        steps: &[Step],
        concepts: &[String],
        language: Language,
    ) -> Vec<Page> {
        let question = truncate_text(&self.sanitizer.sanitize(question), QUESTION_PREVIEW_CHARS);
        let drafts = match resolve_mode(classification, &question) {
            ScriptMode::Concrete => concrete_drafts(&question, steps, language),
            ScriptMode::Theoretical => theoretical_drafts(&question, steps, concepts, language),
        };

        let rates = self.rates_for(language);
        drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| Page {
                index: i + 1,
                duration_seconds: self.duration_for(draft.kind, &draft.text, rates),
                kind: draft.kind,
                narration_text: draft.text,
                subtitle_text: draft.subtitle,
                visual_cue_id: draft.cue,
            })
            .collect()
    }

    fn rates_for(&self, language: Language) -> LanguageRates {
        self.rates
            .get(language.tag())
            .copied()
            .unwrap_or(self.fallback_rates)
    }

    /// 计算单页时长
    fn duration_for(&self, kind: PageKind, text: &str, rates: LanguageRates) -> f64 {
        let (floor, cps) = match kind {
            PageKind::Intro => (self.floors.intro, rates.step_chars_per_second),
            PageKind::Step => (self.floors.step, rates.step_chars_per_second),
            PageKind::Verification => (self.floors.verification, rates.step_chars_per_second),
            PageKind::ConceptIntro => (self.floors.concept_intro, rates.concept_chars_per_second),
            PageKind::Concept => (self.floors.concept, rates.concept_chars_per_second),
            PageKind::Example => (self.floors.example, rates.concept_chars_per_second),
            PageKind::Summary => (self.floors.summary, rates.concept_chars_per_second),
        };
        let reading = (text.chars().count() as f64 / cps).ceil();
        floor.max(reading)
    }
}

struct PageDraft {
    kind: PageKind,
    text: String,
    subtitle: String,
    cue: String,
}

impl PageDraft {
    fn new(kind: PageKind, text: String, subtitle: impl Into<String>, cue: impl Into<String>) -> Self {
        Self {
            kind,
            text,
            subtitle: subtitle.into(),
            cue: cue.into(),
        }
    }
}

fn concrete_drafts(question: &str, steps: &[Step], language: Language) -> Vec<PageDraft> {
    let p = phrases(language);
    let mut drafts = vec![PageDraft::new(
        PageKind::Intro,
        format!("{}{}", p.intro_concrete, question),
        p.analyze_label,
        "display_problem",
    )];

    for step in steps {
        let text = if step.is_sentinel() {
            p.steps_unavailable.to_string()
        } else {
            step.full_text()
        };
        drafts.push(PageDraft::new(
            PageKind::Step,
            text,
            p.step_label(step.ordinal),
            format!("show_step_{}", step.ordinal),
        ));
    }

    drafts.push(PageDraft::new(
        PageKind::Verification,
        p.verification.to_string(),
        p.verification_label,
        "show_verification",
    ));
    drafts
}

fn theoretical_drafts(
    question: &str,
    steps: &[Step],
    concepts: &[String],
    language: Language,
) -> Vec<PageDraft> {
    let p = phrases(language);
    let mut drafts = vec![PageDraft::new(
        PageKind::ConceptIntro,
        format!("{}{}", p.intro_theory, question),
        p.concept_label,
        "introduce_concept",
    )];

    for (i, concept) in concepts.iter().enumerate() {
        drafts.push(PageDraft::new(
            PageKind::Concept,
            concept.clone(),
            format!("{} {}", p.concept_label, i + 1),
            format!("explain_concept_{}", i + 1),
        ));
    }

    // 有表达式的步骤可以作为例子展示
    let example = steps
        .iter()
        .filter(|s| !s.is_sentinel())
        .find_map(|s| s.expressions.first())
        .map(|expr| format!("{}: {}", p.example, expr))
        .unwrap_or_else(|| p.example.to_string());
    drafts.push(PageDraft::new(
        PageKind::Example,
        example,
        p.example_label,
        "show_examples",
    ));

    drafts.push(PageDraft::new(
        PageKind::Summary,
        p.summary.to_string(),
        p.summary_label,
        "show_summary",
    ));
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::page::total_duration;
    use crate::services::classifier::Classifier;

    fn builder() -> PageScriptBuilder {
        PageScriptBuilder::new(&CompilerTables::default())
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::new(1, "Subtract 5", "3x = 12"),
            Step::new(2, "Divide by 3", "x = 4"),
        ]
    }

    #[test]
    fn test_concrete_layout() {
        let classification = Classifier::new().classify("Solve: 3x + 5 = 17");
        let pages = builder().build(&classification, "Solve: 3x + 5 = 17", &steps(), &[], Language::En);

        let kinds: Vec<PageKind> = pages.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PageKind::Intro, PageKind::Step, PageKind::Step, PageKind::Verification]
        );
        assert_eq!(pages[0].visual_cue_id, "display_problem");
        assert_eq!(pages[2].visual_cue_id, "show_step_2");
        assert_eq!(pages[2].subtitle_text, "Step 2");
        assert_eq!(pages[3].visual_cue_id, "show_verification");
        assert!(pages[0].narration_text.starts_with("Let's solve this math problem: "));
    }

    #[test]
    fn test_theoretical_layout() {
        let classification = Classifier::new().classify("Explain the Pythagorean theorem");
        let concepts = vec!["Right triangles".to_string(), "Squares on sides".to_string()];
        let pages = builder().build(
            &classification,
            "Explain the Pythagorean theorem",
            &steps(),
            &concepts,
            Language::En,
        );

        let cues: Vec<&str> = pages.iter().map(|p| p.visual_cue_id.as_str()).collect();
        assert_eq!(
            cues,
            vec![
                "introduce_concept",
                "explain_concept_1",
                "explain_concept_2",
                "show_examples",
                "show_summary"
            ]
        );
        // 步骤里没有表达式时，举例页只有引导语
        assert_eq!(pages[3].narration_text, "Let's look at a concrete example");
    }

    #[test]
    fn test_durations_respect_floors() {
        let classification = Classifier::new().classify("Solve: 3x + 5 = 17");
        let pages = builder().build(&classification, "Solve: 3x + 5 = 17", &steps(), &[], Language::En);

        assert!(pages.iter().all(|p| p.duration_seconds > 0.0));
        assert_eq!(pages[1].duration_seconds, 5.0);
        assert_eq!(pages[3].duration_seconds, 6.0);
        assert!(total_duration(&pages) >= 21.0);
    }

    #[test]
    fn test_long_text_exceeds_floor() {
        let long_body = "移".repeat(70);
        let classification = Classifier::new().classify("解方程：3x + 5 = 17");
        let pages = builder().build(
            &classification,
            "解方程：3x + 5 = 17",
            &[Step::new(1, "", long_body)],
            &[],
            Language::Zh,
        );
        // 70 字 / 3.5 字每秒
        assert_eq!(pages[1].duration_seconds, 20.0);
    }

    #[test]
    fn test_sentinel_step_page() {
        let classification = Classifier::new().classify("Solve: x + 1 = 2");
        let pages = builder().build(&classification, "Solve: x + 1 = 2", &[Step::sentinel()], &[], Language::En);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].narration_text, "The detailed steps are shown on screen");
    }

    #[test]
    fn test_mixed_mode_resolution() {
        let mixed = Classification {
            category: Category::Mixed,
            ..Classifier::new().classify("")
        };
        assert_eq!(resolve_mode(&mixed, "用拉窗帘原理说明"), ScriptMode::Theoretical);
        assert_eq!(resolve_mode(&mixed, "A box holds 12 apples"), ScriptMode::Concrete);
    }

    #[test]
    fn test_indices_are_contiguous() {
        let classification = Classifier::new().classify("Solve: 3x + 5 = 17");
        let pages = builder().build(&classification, "Solve: 3x + 5 = 17", &steps(), &[], Language::Zh);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.index, i + 1);
        }
    }
}
