//! 题目编译流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整编译流程
//!
//! 流程顺序：
//! 1. 分类 → 步骤提取 → 概念提取
//! 2. 分页脚本 + 旁白
//! 3. 以协调后的时长为预算生成场景程序
//! 4. 字幕 + 时长一致性报告
//!
//! 每个阶段都有兜底，流程本身不会失败。

use tracing::{debug, info, warn};

use crate::config::CompilerTables;
use crate::models::page::total_duration;
use crate::models::{
    CompilationBundle, DurationReport, ExtractionSource, ProblemInput, RenderRequest,
    SpeechRequest,
};
use crate::services::scene::SceneCompiler;
use crate::services::{
    Classifier, ConceptExtractor, ContentSanitizer, NarrationBuilder, PageScriptBuilder,
    StepExtractor, SubtitleBuilder,
};
use crate::utils::text::truncate_text;
use crate::workflow::compile_ctx::CompileCtx;

/// 题目编译流程
///
/// - 编排完整的编译流程
/// - 不持有可变状态，可在多个任务间共享
/// - 只依赖业务能力（services）
pub struct CompileFlow {
    classifier: Classifier,
    extractor: StepExtractor,
    concepts: ConceptExtractor,
    pages: PageScriptBuilder,
    narration: NarrationBuilder,
    scene: SceneCompiler,
    subtitles: SubtitleBuilder,
    sanitizer: ContentSanitizer,
    tolerance: f64,
    verbose_logging: bool,
}

impl CompileFlow {
    /// 创建新的编译流程
    pub fn new(tables: &CompilerTables) -> Self {
        let sanitizer = ContentSanitizer::new(tables.sanitizer_max_len);
        Self {
            classifier: Classifier::new(),
            extractor: StepExtractor::new(sanitizer.clone(), tables.extraction.clone()),
            concepts: ConceptExtractor::default(),
            pages: PageScriptBuilder::new(tables),
            narration: NarrationBuilder::new(tables),
            scene: SceneCompiler::new(tables.scene.clone(), tables.layout.clone()),
            subtitles: SubtitleBuilder::default(),
            sanitizer,
            tolerance: tables.duration_tolerance,
            verbose_logging: false,
        }
    }

    /// 替换场景编译器
    pub fn with_scene_compiler(mut self, scene: SceneCompiler) -> Self {
        self.scene = scene;
        self
    }

    /// 是否输出每个阶段的详细日志
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn run(&self, problem: &ProblemInput, ctx: &CompileCtx) -> CompilationBundle {
        let language = ctx.language;
        self.log_question(ctx, &problem.question);

        // ========== 阶段 1: 分类与提取 ==========
        let classification = self.classifier.classify(&problem.question);
        info!(
            "{} 📋 分类: {} (置信度 {:.2})",
            ctx, classification.category, classification.confidence
        );
        if self.verbose_logging {
            debug!("{} 分类依据: {}", ctx, classification.rationale);
        }

        let (steps, extraction_source) = self.extractor.extract_with_source(&problem.solution);
        match extraction_source {
            ExtractionSource::Sentinel => {
                warn!("{} ⚠️ 未能从解答中提取步骤，使用占位步骤", ctx)
            }
            source => info!("{} ✓ 提取到 {} 个步骤 ({:?})", ctx, steps.len(), source),
        }

        let concepts = self
            .concepts
            .extract(&problem.question, &problem.solution, &steps, language);

        // ========== 阶段 2: 分页与旁白 ==========
        let pages = self
            .pages
            .build(&classification, &problem.question, &steps, &concepts, language);
        let narration = self
            .narration
            .build(&classification, &problem.question, &steps, &concepts, language);

        let page_total = total_duration(&pages);
        let budget = page_total.max(narration.estimated_duration_seconds);

        // ========== 阶段 3: 场景程序 ==========
        let question = self.sanitizer.sanitize(&problem.question);
        let scene = self
            .scene
            .compile(&question, &steps, &concepts, &classification, language, budget);
        if scene.fallback_used {
            warn!("{} ⚠️ 场景程序使用了最小兜底程序", ctx);
        } else {
            info!(
                "{} 🎬 场景程序: {} ({})",
                ctx, scene.scene_name, scene.strategy
            );
        }

        // ========== 阶段 4: 字幕与时长 ==========
        let durations = reconcile_durations(
            page_total,
            scene.estimated_duration_seconds,
            narration.estimated_duration_seconds,
            self.tolerance,
        );
        if durations.consistent {
            info!(
                "{} ⏱️ 时长一致: 目标 {:.1}s",
                ctx, durations.reconciled
            );
        } else {
            warn!(
                "{} ⚠️ 时长不一致: 分页 {:.1}s / 场景 {:.1}s / 旁白 {:.1}s (目标 {:.1}s)",
                ctx, durations.page_total, durations.scene, durations.narration, durations.reconciled
            );
        }

        let subtitles = self.subtitles.build(&pages, durations.page_scale);

        let render_request = RenderRequest {
            program: scene.source.clone(),
            scene_name: scene.scene_name.clone(),
            output_name: problem.id.clone(),
        };
        let speech_request = SpeechRequest {
            text: narration.text.clone(),
            language_tag: narration.language_tag.clone(),
        };

        CompilationBundle {
            id: problem.id.clone(),
            language_tag: language.tag().to_string(),
            classification,
            extraction_source,
            steps,
            concepts,
            pages,
            scene,
            narration,
            subtitles,
            durations,
            render_request,
            speech_request,
        }
    }

    /// 显示题干预览
    fn log_question(&self, ctx: &CompileCtx, question: &str) {
        info!("{} 题干: {}", ctx, truncate_text(question, 80));
    }
}

/// 协调三种时长
///
/// 目标时长取分页与旁白中较长者；任一时长与目标的相对偏差超过容差即视为不一致。
pub fn reconcile_durations(
    page_total: f64,
    scene: f64,
    narration: f64,
    tolerance: f64,
) -> DurationReport {
    let reconciled = page_total.max(narration);
    let page_scale = if page_total > 0.0 {
        reconciled / page_total
    } else {
        1.0
    };
    let within = |d: f64| reconciled > 0.0 && (d - reconciled).abs() / reconciled <= tolerance;

    DurationReport {
        page_total,
        scene,
        narration,
        reconciled,
        page_scale,
        consistent: within(page_total) && within(scene) && within(narration),
    }
}
