//! 场景程序编译
//!
//! 理论题使用概念布局，其余按输入规模选择步骤布局。占位步骤不上屏，
//! 没有可展示的步骤时输出提示程序。构建器返回错误或 panic 时
//! 退回最小安全程序，保证每道题都能拿到一个可运行的场景。

use crate::config::{LayoutGeometry, SceneThresholds};
use crate::models::{Classification, Language, SceneProgram, SceneStrategy, Step};
use crate::services::page_script::{resolve_mode, ScriptMode};
use crate::services::phrases::phrases;
use crate::services::scene::builders::{
    ConceptLayoutBuilder, FullLayoutBuilder, SceneBuilder, SceneInput, SimplifiedLayoutBuilder,
    UltraSimplifiedLayoutBuilder,
};
use crate::services::scene::emitter::{py_str, PyEmitter};
use crate::utils::text::truncate_text;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// 最小程序的场景类名
pub const MINIMAL_SCENE_NAME: &str = "MinimalSolutionScene";

/// 最小程序标题的最大长度
const MINIMAL_TITLE_CHARS: usize = 50;

/// 最小程序的最短停留（秒）
const MINIMAL_HOLD: f64 = 3.0;

/// 场景编译器
pub struct SceneCompiler {
    thresholds: SceneThresholds,
    geometry: LayoutGeometry,
    builders: Vec<Box<dyn SceneBuilder>>,
}

impl SceneCompiler {
    pub fn new(thresholds: SceneThresholds, geometry: LayoutGeometry) -> Self {
        let builders: Vec<Box<dyn SceneBuilder>> = vec![
            Box::new(FullLayoutBuilder::new(thresholds.clone(), geometry.clone())),
            Box::new(SimplifiedLayoutBuilder::new(thresholds.clone(), geometry.clone())),
            Box::new(UltraSimplifiedLayoutBuilder::new(thresholds.clone(), geometry.clone())),
            Box::new(ConceptLayoutBuilder::new(thresholds.clone(), geometry.clone())),
        ];
        Self {
            thresholds,
            geometry,
            builders,
        }
    }

    /// 替换某个策略的构建器
    pub fn with_builder(mut self, builder: Box<dyn SceneBuilder>) -> Self {
        let strategy = builder.strategy();
        self.builders.retain(|b| b.strategy() != strategy);
        self.builders.push(builder);
        self
    }

    /// 根据题干和步骤的总规模选择布局策略
    pub fn select_strategy(&self, question: &str, steps: &[Step]) -> SceneStrategy {
        let t = &self.thresholds;
        let chars = question.chars().count()
            + steps
                .iter()
                .map(|s| s.title.chars().count() + s.body.chars().count())
                .sum::<usize>();

        if chars > t.high_chars || steps.len() > t.high_steps {
            SceneStrategy::UltraSimplified
        } else if chars > t.medium_chars || steps.len() > t.medium_steps {
            SceneStrategy::Simplified
        } else if t.prefer_full_layout {
            SceneStrategy::Full
        } else {
            SceneStrategy::UltraSimplified
        }
    }

    /// 编译场景程序
    ///
    /// # 参数
    /// - `question`: 清洗后的题干
    /// - `steps`: 步骤列表（占位步骤会被过滤掉）
    /// - `concepts`: 概念要点（理论题使用）
    /// - `classification`: 分类结果（决定布局和标题措辞）
    /// - `language`: 讲解语言
    /// - `duration_budget`: 期望的总时长（秒）
    ///
    /// # 返回
    /// 始终返回一个场景程序；构建失败时 `fallback_used` 为 true
    pub fn compile(
        &self,
        question: &str,
        steps: &[Step],
        concepts: &[String],
        classification: &Classification,
        language: Language,
        duration_budget: f64,
    ) -> SceneProgram {
        let p = phrases(language);
        let visible: Vec<Step> = steps.iter().filter(|s| !s.is_sentinel()).cloned().collect();
        let theoretical = resolve_mode(classification, question) == ScriptMode::Theoretical;

        let strategy = if theoretical && !concepts.is_empty() {
            SceneStrategy::Concept
        } else {
            self.select_strategy(question, &visible)
        };
        if strategy != SceneStrategy::Concept && visible.is_empty() {
            info!("📝 没有可展示的步骤，输出提示程序");
            return self.notice_program(
                question,
                language,
                p.steps_unavailable,
                strategy,
                duration_budget,
                false,
            );
        }

        let title = if question.trim().is_empty() {
            if classification.is_theoretical() {
                p.title_theory
            } else {
                p.title_concrete
            }
        } else {
            question
        };

        let Some(builder) = self.builders.iter().find(|b| b.strategy() == strategy) else {
            warn!("⚠️ 没有 {} 策略的构建器，使用最小程序", strategy);
            return self.fallback(question, language, strategy, duration_budget);
        };

        let input = SceneInput {
            title,
            question,
            steps: &visible,
            concepts,
            language,
            duration_budget,
        };

        match catch_unwind(AssertUnwindSafe(|| builder.build(&input))) {
            Ok(Ok(built)) => {
                debug!(
                    "场景 {} 生成完成, 预估时长 {:.1}s",
                    builder.scene_name(),
                    built.estimated_duration_seconds
                );
                SceneProgram {
                    source: built.source,
                    scene_name: builder.scene_name().to_string(),
                    estimated_duration_seconds: built.estimated_duration_seconds,
                    strategy,
                    fallback_used: false,
                }
            }
            Ok(Err(e)) => {
                warn!("⚠️ {} 布局生成失败: {}，使用最小程序", strategy, e);
                self.fallback(question, language, strategy, duration_budget)
            }
            Err(_) => {
                warn!("⚠️ {} 布局生成时发生 panic，使用最小程序", strategy);
                self.fallback(question, language, strategy, duration_budget)
            }
        }
    }

    fn fallback(
        &self,
        question: &str,
        language: Language,
        strategy: SceneStrategy,
        duration_budget: f64,
    ) -> SceneProgram {
        let note = phrases(language).solution_below;
        self.notice_program(question, language, note, strategy, duration_budget, true)
    }

    /// 最小安全程序：标题加一行提示，停留到预算用完（至少 3 秒）
    fn notice_program(
        &self,
        question: &str,
        language: Language,
        note: &str,
        strategy: SceneStrategy,
        duration_budget: f64,
        fallback_used: bool,
    ) -> SceneProgram {
        let font = language.font();
        let title = if question.trim().is_empty() {
            phrases(language).title_concrete.to_string()
        } else {
            truncate_text(question, MINIMAL_TITLE_CHARS)
        };

        let mut program = PyEmitter::new();
        program.header();
        program.line(format!("class {}(Scene):", MINIMAL_SCENE_NAME));
        program.indent();
        program.line("def construct(self):");
        program.indent();
        program.line(format!(
            "title = Text({}, font=\"{}\", font_size=36, color=BLUE).to_edge(UP, buff=0.4)",
            py_str(&title),
            font
        ));
        program.line(format!("if title.width > {:.2}:", self.geometry.max_block_width));
        program.indent();
        program.line(format!("title.scale_to_fit_width({:.2})", self.geometry.max_block_width));
        program.dedent();
        program.line(format!(
            "note = Text({}, font=\"{}\", font_size=28, color=WHITE)",
            py_str(note),
            font
        ));
        program.line(format!("if note.width > {:.2}:", self.geometry.max_block_width));
        program.indent();
        program.line(format!("note.scale_to_fit_width({:.2})", self.geometry.max_block_width));
        program.dedent();
        program.play("Write(title)", 1.0);
        program.play("FadeIn(note)", 0.5);
        program.wait((duration_budget - program.elapsed()).max(MINIMAL_HOLD));

        SceneProgram {
            estimated_duration_seconds: program.elapsed(),
            source: program.finish(),
            scene_name: MINIMAL_SCENE_NAME.to_string(),
            strategy,
            fallback_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::services::classifier::Classifier;
    use crate::models::step::SENTINEL_BODY;
    use crate::services::scene::builders::BuiltScene;

    struct FailingBuilder;

    impl SceneBuilder for FailingBuilder {
        fn strategy(&self) -> SceneStrategy {
            SceneStrategy::UltraSimplified
        }

        fn scene_name(&self) -> &'static str {
            "Broken"
        }

        fn build(&self, _input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
            Err(CompileError::BuilderFailed {
                builder: "Broken".to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    struct PanickingBuilder;

    impl SceneBuilder for PanickingBuilder {
        fn strategy(&self) -> SceneStrategy {
            SceneStrategy::UltraSimplified
        }

        fn scene_name(&self) -> &'static str {
            "Panicking"
        }

        fn build(&self, _input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
            panic!("layout exploded")
        }
    }

    fn compiler() -> SceneCompiler {
        SceneCompiler::new(SceneThresholds::default(), LayoutGeometry::default())
    }

    fn steps(n: u32) -> Vec<Step> {
        (1..=n)
            .map(|i| {
                let mut s = Step::new(i, format!("Stage {}", i), "x = 1");
                s.expressions = vec![format!("x = {}", i)];
                s
            })
            .collect()
    }

    /// 检查生成的程序在结构上可被解释器接受
    fn assert_well_formed(source: &str) {
        assert!(source.starts_with("from manim import *"));
        assert!(source.contains("def construct(self):"));
        for line in source.lines() {
            let indent = line.len() - line.trim_start().len();
            assert_eq!(indent % 4, 0, "bad indent: {}", line);
            let unescaped_quotes = line.replace("\\\\", "").replace("\\\"", "").matches('"').count();
            assert_eq!(unescaped_quotes % 2, 0, "unbalanced quotes: {}", line);
        }
    }

    #[test]
    fn test_strategy_selection() {
        let c = compiler();
        assert_eq!(c.select_strategy("short", &steps(3)), SceneStrategy::UltraSimplified);
        assert_eq!(c.select_strategy("short", &steps(6)), SceneStrategy::Simplified);
        assert_eq!(c.select_strategy("short", &steps(9)), SceneStrategy::UltraSimplified);
        assert_eq!(c.select_strategy(&"q".repeat(700), &steps(2)), SceneStrategy::Simplified);
        assert_eq!(c.select_strategy(&"q".repeat(1600), &steps(2)), SceneStrategy::UltraSimplified);
    }

    #[test]
    fn test_prefer_full_layout_for_small_inputs() {
        let thresholds = SceneThresholds {
            prefer_full_layout: true,
            ..SceneThresholds::default()
        };
        let c = SceneCompiler::new(thresholds, LayoutGeometry::default());
        assert_eq!(c.select_strategy("short", &steps(3)), SceneStrategy::Full);
    }

    #[test]
    fn test_compile_success() {
        let classification = Classifier::new().classify("Solve: x + 1 = 2");
        let program = compiler().compile("Solve: x + 1 = 2", &steps(2), &[], &classification, Language::En, 20.0);
        assert!(!program.fallback_used);
        assert_eq!(program.scene_name, "MathSolutionScene");
        assert!(program.estimated_duration_seconds > 0.0);
        assert_well_formed(&program.source);
    }

    #[test]
    fn test_builder_error_falls_back() {
        let classification = Classifier::new().classify("Solve: x + 1 = 2");
        let c = compiler().with_builder(Box::new(FailingBuilder));
        let program = c.compile("Solve: x + 1 = 2", &steps(2), &[], &classification, Language::Zh, 20.0);

        assert!(program.fallback_used);
        assert_eq!(program.scene_name, MINIMAL_SCENE_NAME);
        assert!(program.source.contains("解答如下"));
        assert!(program.source.contains("Solve: x + 1 = 2"));
        assert!(program.estimated_duration_seconds > 0.0);
        assert_well_formed(&program.source);
    }

    #[test]
    fn test_builder_panic_falls_back() {
        let classification = Classifier::new().classify("Solve: x + 1 = 2");
        let c = compiler().with_builder(Box::new(PanickingBuilder));
        let program = c.compile("Solve: x + 1 = 2", &steps(2), &[], &classification, Language::En, 20.0);
        assert!(program.fallback_used);
        assert!(program.source.contains("Solution below"));
    }

    #[test]
    fn test_hostile_text_stays_well_formed() {
        let classification = Classifier::new().classify("x");
        let mut step = Step::new(1, "He said \"done\" \\", "line one\nline two \\");
        step.expressions = vec!["x = \"4\"".to_string(), "y = 2 \\".to_string()];
        let question = "Quote \" and backslash \\ and 'apostrophe'";
        let program = compiler().compile(question, &[step], &[], &classification, Language::En, 10.0);
        assert!(!program.fallback_used);
        assert_well_formed(&program.source);
    }

    #[test]
    fn test_minimal_title_is_truncated() {
        let classification = Classifier::new().classify("x");
        let long_question = "z".repeat(200);
        let c = compiler().with_builder(Box::new(FailingBuilder));
        let program = c.compile(&long_question, &steps(1), &[], &classification, Language::En, 10.0);
        assert!(program.source.contains(&format!("\"{}...\"", "z".repeat(50))));
    }

    #[test]
    fn test_sentinel_step_never_reaches_scene() {
        let classification = Classifier::new().classify("Solve: 3x + 5 = 17");
        let program = compiler().compile(
            "Solve: 3x + 5 = 17",
            &[Step::sentinel()],
            &[],
            &classification,
            Language::En,
            12.0,
        );

        assert!(!program.fallback_used);
        assert_eq!(program.scene_name, MINIMAL_SCENE_NAME);
        assert!(!program.source.contains(SENTINEL_BODY));
        assert!(program.source.contains("The detailed steps are shown on screen"));
        assert!((program.estimated_duration_seconds - 12.0).abs() < 1e-6);
        assert_well_formed(&program.source);
    }

    #[test]
    fn test_sentinel_is_dropped_next_to_real_steps() {
        let classification = Classifier::new().classify("Solve: x + 1 = 2");
        let mut mixed = steps(2);
        mixed.push(Step::sentinel());
        let program = compiler().compile("Solve: x + 1 = 2", &mixed, &[], &classification, Language::Zh, 20.0);

        assert_eq!(program.scene_name, "MathSolutionScene");
        assert!(!program.source.contains(SENTINEL_BODY));
    }

    #[test]
    fn test_theoretical_question_uses_concept_scene() {
        let question = "什么是勾股定理？";
        let classification = Classifier::new().classify(question);
        let concepts = vec!["直角三角形".to_string(), "两直角边的平方和等于斜边的平方".to_string()];
        let program = compiler().compile(
            question,
            &[Step::sentinel()],
            &concepts,
            &classification,
            Language::Zh,
            25.0,
        );

        assert_eq!(program.strategy, SceneStrategy::Concept);
        assert_eq!(program.scene_name, "ConceptExplanationScene");
        assert!(!program.fallback_used);
        assert!(program.source.contains("1. 直角三角形"));
        assert!(program.source.contains("graphic = Polygon("));
        assert!(!program.source.contains(SENTINEL_BODY));
        assert!((program.estimated_duration_seconds - 25.0).abs() < 1e-6);
        assert_well_formed(&program.source);
    }
}
