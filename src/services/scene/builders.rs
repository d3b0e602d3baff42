//! 场景构建器
//!
//! 每种布局策略一个构建器。三种步骤布局共用同一套瀑布式模板，区别只在于
//! 展示多少步骤、正文保留几行、每步放几个表达式；概念布局逐条展示概念要点。

use crate::config::{LayoutGeometry, SceneThresholds};
use crate::error::CompileError;
use crate::models::{Language, SceneStrategy, Step};
use crate::services::phrases::phrases;
use crate::services::scene::emitter::{py_list, py_str, py_str_lines, raw_math, PyEmitter};
use crate::services::scene::graphic::Graphic;
use crate::services::scene::layout::{LayoutOp, WaterfallLayout};
use crate::utils::text::truncate_text;
use once_cell::sync::Lazy;
use regex::Regex;

/// 最终答案的放大倍数
const ANSWER_SCALE: f64 = 1.2;

/// 结尾停留时长（秒）
const FINAL_HOLD: f64 = 2.0;

/// 概念场景最多展示的概念数
const MAX_CONCEPT_BLOCKS: usize = 4;

/// 构建器的输入
pub struct SceneInput<'a> {
    /// 画面标题
    pub title: &'a str,
    /// 清洗后的题干
    pub question: &'a str,
    pub steps: &'a [Step],
    /// 概念要点（概念场景使用）
    pub concepts: &'a [String],
    pub language: Language,
    /// 期望的总时长（秒），用于分配步骤间停顿
    pub duration_budget: f64,
}

/// 构建结果
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub source: String,
    pub estimated_duration_seconds: f64,
}

/// 场景构建器
pub trait SceneBuilder: Send + Sync {
    fn strategy(&self) -> SceneStrategy;

    /// 生成的场景类名
    fn scene_name(&self) -> &'static str;

    fn build(&self, input: &SceneInput<'_>) -> Result<BuiltScene, CompileError>;
}

// ========== 布局构建器 ==========

/// 完整布局：展示题干、全部步骤（有上限）、两行正文
pub struct FullLayoutBuilder {
    thresholds: SceneThresholds,
    geometry: LayoutGeometry,
}

impl FullLayoutBuilder {
    pub fn new(thresholds: SceneThresholds, geometry: LayoutGeometry) -> Self {
        Self {
            thresholds,
            geometry,
        }
    }
}

impl SceneBuilder for FullLayoutBuilder {
    fn strategy(&self) -> SceneStrategy {
        SceneStrategy::Full
    }

    fn scene_name(&self) -> &'static str {
        "FullSolutionScene"
    }

    fn build(&self, input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
        let spec = LayoutSpec {
            scene_name: self.scene_name(),
            max_steps: self.thresholds.full_max_steps,
            body_lines: 2,
            max_expressions: self.thresholds.max_expressions_per_step + 1,
            max_expression_chars: self.thresholds.max_expression_chars,
            show_question: true,
            prefer_math_steps: false,
        };
        render_waterfall(&spec, &self.thresholds, &self.geometry, input)
    }
}

/// 简化布局：正文只保留一行
pub struct SimplifiedLayoutBuilder {
    thresholds: SceneThresholds,
    geometry: LayoutGeometry,
}

impl SimplifiedLayoutBuilder {
    pub fn new(thresholds: SceneThresholds, geometry: LayoutGeometry) -> Self {
        Self {
            thresholds,
            geometry,
        }
    }
}

impl SceneBuilder for SimplifiedLayoutBuilder {
    fn strategy(&self) -> SceneStrategy {
        SceneStrategy::Simplified
    }

    fn scene_name(&self) -> &'static str {
        "SimplifiedSolutionScene"
    }

    fn build(&self, input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
        let spec = LayoutSpec {
            scene_name: self.scene_name(),
            max_steps: self.thresholds.simplified_max_steps,
            body_lines: 1,
            max_expressions: self.thresholds.max_expressions_per_step,
            max_expression_chars: self.thresholds.max_expression_chars,
            show_question: false,
            prefer_math_steps: false,
        };
        render_waterfall(&spec, &self.thresholds, &self.geometry, input)
    }
}

/// 极简布局：只展示带表达式的少数步骤，每步标题加表达式
pub struct UltraSimplifiedLayoutBuilder {
    thresholds: SceneThresholds,
    geometry: LayoutGeometry,
}

impl UltraSimplifiedLayoutBuilder {
    pub fn new(thresholds: SceneThresholds, geometry: LayoutGeometry) -> Self {
        Self {
            thresholds,
            geometry,
        }
    }
}

impl SceneBuilder for UltraSimplifiedLayoutBuilder {
    fn strategy(&self) -> SceneStrategy {
        SceneStrategy::UltraSimplified
    }

    fn scene_name(&self) -> &'static str {
        "MathSolutionScene"
    }

    fn build(&self, input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
        let spec = LayoutSpec {
            scene_name: self.scene_name(),
            max_steps: self.thresholds.ultra_max_steps,
            body_lines: 0,
            max_expressions: self.thresholds.max_expressions_per_step,
            max_expression_chars: self.thresholds.max_expression_chars,
            show_question: false,
            prefer_math_steps: true,
        };
        render_waterfall(&spec, &self.thresholds, &self.geometry, input)
    }
}

/// 概念布局：题干、逐条概念、可选的例子表达式；几何题在右侧画示意图
pub struct ConceptLayoutBuilder {
    thresholds: SceneThresholds,
    geometry: LayoutGeometry,
}

impl ConceptLayoutBuilder {
    pub fn new(thresholds: SceneThresholds, geometry: LayoutGeometry) -> Self {
        Self {
            thresholds,
            geometry,
        }
    }
}

impl SceneBuilder for ConceptLayoutBuilder {
    fn strategy(&self) -> SceneStrategy {
        SceneStrategy::Concept
    }

    fn scene_name(&self) -> &'static str {
        "ConceptExplanationScene"
    }

    fn build(&self, input: &SceneInput<'_>) -> Result<BuiltScene, CompileError> {
        render_concepts(self.scene_name(), &self.thresholds, &self.geometry, input)
    }
}

// ========== 瀑布模板 ==========

struct LayoutSpec {
    scene_name: &'static str,
    max_steps: usize,
    /// 正文行数；0 表示只在没有表达式时显示一行
    body_lines: usize,
    max_expressions: usize,
    /// 超过该长度的表达式不上屏
    max_expression_chars: usize,
    show_question: bool,
    prefer_math_steps: bool,
}

enum BlockContent {
    Text {
        lines: Vec<String>,
        font_size: u32,
        color: &'static str,
    },
    Math {
        latex: String,
    },
}

struct Block {
    content: BlockContent,
    /// 布局中占用的高度（含答案放大）
    height: f64,
    answer: bool,
}

impl Block {
    /// 渲染前允许的最大高度，放大后正好占满预留高度
    fn render_height(&self) -> f64 {
        if self.answer {
            self.height / ANSWER_SCALE
        } else {
            self.height
        }
    }
}

fn render_waterfall(
    spec: &LayoutSpec,
    thresholds: &SceneThresholds,
    geometry: &LayoutGeometry,
    input: &SceneInput<'_>,
) -> Result<BuiltScene, CompileError> {
    let selected = select_steps(input.steps, spec.max_steps, spec.prefer_math_steps);
    if selected.is_empty() {
        return Err(CompileError::EmptyLayout);
    }

    let p = phrases(input.language);
    let font = input.language.font();
    let per_line = chars_per_line(geometry, input.language);

    let program = open_scene(spec.scene_name, input.title, p.analyze_label, font, thresholds, geometry);

    let mut layout = WaterfallLayout::new(geometry.clone());
    let mut next_id = 0usize;
    let mut segments: Vec<PyEmitter> = Vec::new();

    if spec.show_question && !input.question.trim().is_empty() {
        let block = text_block(input.question, per_line, 2, 26, "WHITE", geometry);
        let mut segment = PyEmitter::nested(2);
        place_block(&mut segment, &mut layout, next_id, &block, font, geometry);
        next_id += 1;
        segments.push(segment);
    }

    let last_index = selected.len() - 1;
    for (i, step) in selected.iter().enumerate() {
        let blocks = step_blocks(step, spec, geometry, per_line, input.language, i == last_index);
        let mut segment = PyEmitter::nested(2);

        let label = format!("{} {}", p.step_label(step.ordinal), step.headline());
        transition_subtitle(&mut segment, &label, font, thresholds, geometry);

        for block in &blocks {
            let name = place_block(&mut segment, &mut layout, next_id, block, font, geometry);
            next_id += 1;
            if block.answer {
                segment.play(
                    format!("{}.animate.scale({:.1}).set_color(GREEN)", name, ANSWER_SCALE),
                    0.6,
                );
                segment.line(format!(
                    "answer_box = SurroundingRectangle({}, color=GREEN, buff=0.1)",
                    name
                ));
                segment.play("Create(answer_box)", 0.6);
            }
        }
        segments.push(segment);
    }

    Ok(spread_waits(program, segments, input.duration_budget, thresholds.min_step_wait))
}

fn render_concepts(
    scene_name: &'static str,
    thresholds: &SceneThresholds,
    geometry: &LayoutGeometry,
    input: &SceneInput<'_>,
) -> Result<BuiltScene, CompileError> {
    let concepts: Vec<&String> = input
        .concepts
        .iter()
        .filter(|c| !c.trim().is_empty())
        .take(MAX_CONCEPT_BLOCKS)
        .collect();
    if concepts.is_empty() {
        return Err(CompileError::EmptyLayout);
    }

    let p = phrases(input.language);
    let font = input.language.font();
    let graphic = Graphic::detect(input.question);

    // 有示意图时文字只占左侧
    let text_geometry = match graphic {
        Some(_) => narrowed_geometry(geometry),
        None => geometry.clone(),
    };
    let per_line = chars_per_line(&text_geometry, input.language);

    let mut program = open_scene(scene_name, input.title, p.concept_label, font, thresholds, geometry);
    if let Some(graphic) = graphic {
        let center_x = geometry.left_edge + geometry.max_block_width - geometry.graphic_width / 2.0;
        let center_y = (geometry.title_boundary + geometry.visible_bottom) / 2.0;
        let max_height = geometry.title_boundary - geometry.visible_bottom - 2.0 * geometry.margin;
        graphic.emit(&mut program, "graphic", geometry.graphic_width, max_height, (center_x, center_y));
    }

    let mut layout = WaterfallLayout::new(text_geometry.clone());
    let mut next_id = 0usize;
    let mut segments: Vec<PyEmitter> = Vec::new();

    if !input.question.trim().is_empty() {
        let block = text_block(input.question, per_line, 2, 26, "WHITE", &text_geometry);
        let mut segment = PyEmitter::nested(2);
        place_block(&mut segment, &mut layout, next_id, &block, font, &text_geometry);
        next_id += 1;
        segments.push(segment);
    }

    for (i, concept) in concepts.iter().enumerate() {
        let mut segment = PyEmitter::nested(2);
        let label = format!("{} {}", p.concept_label, i + 1);
        transition_subtitle(&mut segment, &label, font, thresholds, geometry);
        let text = format!("{}. {}", i + 1, concept);
        let block = text_block(&text, per_line, 2, 28, "BLUE_B", &text_geometry);
        place_block(&mut segment, &mut layout, next_id, &block, font, &text_geometry);
        next_id += 1;
        segments.push(segment);
    }

    let examples: Vec<&String> = input
        .steps
        .iter()
        .filter(|s| !s.is_sentinel())
        .flat_map(|s| s.expressions.iter())
        .filter(|e| e.chars().count() <= thresholds.max_expression_chars)
        .take(thresholds.max_expressions_per_step)
        .collect();
    if !examples.is_empty() {
        let mut segment = PyEmitter::nested(2);
        transition_subtitle(&mut segment, p.example_label, font, thresholds, geometry);
        for expr in examples {
            let block = expression_block(expr, per_line, &text_geometry, false);
            place_block(&mut segment, &mut layout, next_id, &block, font, &text_geometry);
            next_id += 1;
        }
        segments.push(segment);
    }

    Ok(spread_waits(program, segments, input.duration_budget, thresholds.min_step_wait))
}

/// 文件头、场景类、标题和字幕区
fn open_scene(
    scene_name: &str,
    title: &str,
    subtitle: &str,
    font: &str,
    thresholds: &SceneThresholds,
    geometry: &LayoutGeometry,
) -> PyEmitter {
    let mut program = PyEmitter::new();
    program.header();
    program.line(format!("class {}(Scene):", scene_name));
    program.indent();
    program.line("def construct(self):");
    program.indent();

    program.line(format!(
        "title = Text({}, font=\"{}\", font_size=40, color=BLUE).to_edge(UP, buff=0.4)",
        py_str(&truncate_text(title, thresholds.subtitle_label_chars)),
        font
    ));
    clamp_width(&mut program, "title", geometry.max_block_width);
    program.line(format!(
        "subtitle = Text({}, font=\"{}\", font_size=24, color=GRAY_B).move_to(UP * {:.3})",
        py_str(subtitle),
        font,
        geometry.subtitle_y
    ));
    clamp_width(&mut program, "subtitle", geometry.max_block_width);
    program.play("Write(title)", 1.0);
    program.line("self.add(subtitle)");
    program
}

fn transition_subtitle(
    segment: &mut PyEmitter,
    label: &str,
    font: &str,
    thresholds: &SceneThresholds,
    geometry: &LayoutGeometry,
) {
    segment.line(format!(
        "subtitle_next = Text({}, font=\"{}\", font_size=24, color=GRAY_B).move_to(UP * {:.3})",
        py_str(&truncate_text(label, thresholds.subtitle_label_chars)),
        font,
        geometry.subtitle_y
    ));
    clamp_width(segment, "subtitle_next", geometry.max_block_width);
    segment.play("Transform(subtitle, subtitle_next)", 0.3);
}

/// 把预算中动画之外的时长均摊到每个片段之后，每段不少于 `min_wait`
fn spread_waits(
    mut program: PyEmitter,
    segments: Vec<PyEmitter>,
    duration_budget: f64,
    min_wait: f64,
) -> BuiltScene {
    let animated: f64 = program.elapsed() + segments.iter().map(|s| s.elapsed()).sum::<f64>();
    let wait = ((duration_budget - animated - FINAL_HOLD) / segments.len().max(1) as f64).max(min_wait);

    for segment in segments {
        program.append(segment);
        program.wait(wait);
    }
    program.wait(FINAL_HOLD);

    BuiltScene {
        estimated_duration_seconds: program.elapsed(),
        source: program.finish(),
    }
}

fn chars_per_line(geometry: &LayoutGeometry, language: Language) -> usize {
    if language.is_cjk() {
        geometry.cjk_chars_per_line
    } else {
        geometry.chars_per_line
    }
}

/// 给右侧示意图让出位置后的文字区几何参数
fn narrowed_geometry(geometry: &LayoutGeometry) -> LayoutGeometry {
    let width = (geometry.max_block_width - geometry.graphic_width - geometry.margin)
        .max(geometry.max_block_width / 2.0);
    let ratio = width / geometry.max_block_width;
    LayoutGeometry {
        max_block_width: width,
        chars_per_line: (geometry.chars_per_line as f64 * ratio) as usize,
        cjk_chars_per_line: (geometry.cjk_chars_per_line as f64 * ratio) as usize,
        ..geometry.clone()
    }
}

/// 挑选要展示的步骤：超出上限时保留前面的步骤和最后一步
fn select_steps(steps: &[Step], max_steps: usize, prefer_math: bool) -> Vec<&Step> {
    let with_math: Vec<&Step> = steps.iter().filter(|s| !s.expressions.is_empty()).collect();
    let pool: Vec<&Step> = if prefer_math && !with_math.is_empty() {
        with_math
    } else {
        steps.iter().collect()
    };

    let max_steps = max_steps.max(1);
    if pool.len() <= max_steps {
        return pool;
    }
    let mut picked: Vec<&Step> = pool[..max_steps - 1].to_vec();
    picked.push(pool[pool.len() - 1]);
    picked
}

fn step_blocks(
    step: &Step,
    spec: &LayoutSpec,
    geometry: &LayoutGeometry,
    per_line: usize,
    language: Language,
    is_last: bool,
) -> Vec<Block> {
    let p = phrases(language);
    let mut blocks = Vec::new();

    let separator = if language.is_cjk() { "：" } else { ": " };
    let heading = if step.title.trim().is_empty() {
        p.step_label(step.ordinal)
    } else {
        format!("{}{}{}", p.step_label(step.ordinal), separator, step.title)
    };
    blocks.push(text_block(&heading, per_line, 1, 30, "BLUE_B", geometry));

    let expressions: Vec<&String> = step
        .expressions
        .iter()
        .filter(|e| e.chars().count() <= spec.max_expression_chars)
        .take(spec.max_expressions)
        .collect();
    let body_lines = match spec.body_lines {
        0 if expressions.is_empty() => 1,
        n => n,
    };
    if body_lines > 0 && !step.body.trim().is_empty() {
        blocks.push(text_block(&step.body, per_line, body_lines, 24, "WHITE", geometry));
    }

    let last_expr = expressions.len().saturating_sub(1);
    for (i, expr) in expressions.iter().enumerate() {
        let answer = is_last && i == last_expr;
        blocks.push(expression_block(expr, per_line, geometry, answer));
    }

    blocks
}

fn text_block(
    text: &str,
    per_line: usize,
    max_lines: usize,
    font_size: u32,
    color: &'static str,
    geometry: &LayoutGeometry,
) -> Block {
    let lines = wrap_lines(text, per_line, max_lines);
    Block {
        height: lines.len() as f64 * geometry.text_line_height,
        content: BlockContent::Text {
            lines,
            font_size,
            color,
        },
        answer: false,
    }
}

/// 能转成 LaTeX 的用公式块，否则用黄色文字块
fn expression_block(expr: &str, per_line: usize, geometry: &LayoutGeometry, answer: bool) -> Block {
    let (content, base_height) = match to_latex(expr) {
        Some(latex) => (BlockContent::Math { latex }, geometry.math_height),
        None => {
            let lines = wrap_lines(expr, per_line, 2);
            let height = lines.len() as f64 * geometry.text_line_height;
            (
                BlockContent::Text {
                    lines,
                    font_size: 28,
                    color: "YELLOW",
                },
                height,
            )
        }
    };
    Block {
        content,
        height: if answer { base_height * ANSWER_SCALE } else { base_height },
        answer,
    }
}

/// 声明并放置一个内容块，返回其变量名
fn place_block(
    segment: &mut PyEmitter,
    layout: &mut WaterfallLayout,
    id: usize,
    block: &Block,
    font: &str,
    geometry: &LayoutGeometry,
) -> String {
    let name = format!("b{}", id);
    match &block.content {
        BlockContent::Text {
            lines,
            font_size,
            color,
        } => segment.line(format!(
            "{} = Text({}, font=\"{}\", font_size={}, color={})",
            name,
            py_str_lines(lines),
            font,
            font_size,
            color
        )),
        BlockContent::Math { latex } => segment.line(format!(
            "{} = MathTex({}, font_size=40, color=YELLOW)",
            name,
            raw_math(latex)
        )),
    }

    let width_limit = if block.answer {
        geometry.max_block_width / ANSWER_SCALE
    } else {
        geometry.max_block_width
    };
    clamp_width(segment, &name, width_limit);
    segment.line(format!("if {}.height > {:.3}:", name, block.render_height()));
    segment.indent();
    segment.line(format!("{}.scale_to_fit_height({:.3})", name, block.render_height()));
    segment.dedent();

    for op in layout.push(id, block.height) {
        match op {
            LayoutOp::Scroll {
                shift,
                moved,
                discarded,
            } => {
                let moved: Vec<String> = moved.iter().map(|i| format!("b{}", i)).collect();
                if !moved.is_empty() {
                    segment.play(
                        format!(
                            "*[m.animate.shift(UP * {:.3}) for m in {}]",
                            shift,
                            py_list(&moved)
                        ),
                        0.5,
                    );
                }
                let discarded: Vec<String> = discarded.iter().map(|i| format!("b{}", i)).collect();
                if !discarded.is_empty() {
                    segment.play(
                        format!("*[FadeOut(m) for m in {}]", py_list(&discarded)),
                        0.3,
                    );
                }
            }
            LayoutOp::Place { center_y, .. } => {
                segment.line(format!(
                    "{}.move_to(UP * {:.3}).align_to(RIGHT * {:.3}, LEFT)",
                    name, center_y, geometry.left_edge
                ));
                match block.content {
                    BlockContent::Math { .. } => segment.play(format!("Write({})", name), 0.8),
                    BlockContent::Text { .. } => {
                        segment.play(format!("FadeIn({}, shift=UP * 0.2)", name), 0.6)
                    }
                }
            }
        }
    }
    name
}

fn clamp_width(emitter: &mut PyEmitter, name: &str, max_width: f64) {
    emitter.line(format!("if {}.width > {:.2}:", name, max_width));
    emitter.indent();
    emitter.line(format!("{}.scale_to_fit_width({:.2})", name, max_width));
    emitter.dedent();
}

/// 按行宽折行，超过 `max_lines` 时末行以省略号结尾
pub fn wrap_lines(text: &str, per_line: usize, max_lines: usize) -> Vec<String> {
    let per_line = per_line.max(4);
    let max_lines = max_lines.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        loop {
            let current_len = current.chars().count();
            let word_len = word.chars().count();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed <= per_line {
                if current_len > 0 {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            // 单个词比整行还长，硬切
            let head: String = word.chars().take(per_line).collect();
            word = word.chars().skip(per_line).collect();
            lines.push(head);
            if word.is_empty() {
                break;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let kept: String = last.chars().take(per_line - 3).collect();
            *last = format!("{}...", kept);
        }
    }
    lines
}

// ========== 表达式转 LaTeX ==========

static SQRT_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"√\(([^()]*)\)").unwrap());
static SQRT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"√([0-9A-Za-z.]+)").unwrap());
static CBRT_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"∛\(([^()]*)\)").unwrap());
static CBRT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"∛([0-9A-Za-z.]+)").unwrap());
static NUMERIC_FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\s*/\s*(\d+)\b").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const SYMBOL_LATEX: &[(&str, &str)] = &[
    ("×", r" \times "),
    ("÷", r" \div "),
    ("·", r" \cdot "),
    ("≤", r" \leq "),
    ("≥", r" \geq "),
    ("≠", r" \neq "),
    ("≈", r" \approx "),
    ("±", r" \pm "),
    ("π", r"\pi "),
    ("θ", r"\theta "),
    ("α", r"\alpha "),
    ("β", r"\beta "),
    ("°", r"^{\circ}"),
    ("²", "^{2}"),
    ("³", "^{3}"),
    ("−", "-"),
    ("%", r"\%"),
    ("&", r"\&"),
    ("#", r"\#"),
];

/// 把清洗后的表达式转换为 LaTeX
///
/// 含有中日文等无法在公式里排版的字符，或括号不配对时返回 `None`，
/// 调用方改用普通文本展示。
pub fn to_latex(expr: &str) -> Option<String> {
    let mut s = SQRT_GROUP.replace_all(expr, r"\sqrt{${1}}").into_owned();
    s = SQRT_TOKEN.replace_all(&s, r"\sqrt{${1}}").into_owned();
    s = CBRT_GROUP.replace_all(&s, r"\sqrt[3]{${1}}").into_owned();
    s = CBRT_TOKEN.replace_all(&s, r"\sqrt[3]{${1}}").into_owned();
    for (symbol, latex) in SYMBOL_LATEX {
        s = s.replace(symbol, latex);
    }
    s = NUMERIC_FRACTION.replace_all(&s, r"\frac{${1}}{${2}}").into_owned();
    let s = WHITESPACE.replace_all(s.trim(), " ").into_owned();

    if s.is_empty() || !s.is_ascii() || !balanced(&s) {
        return None;
    }
    Some(s)
}

fn balanced(s: &str) -> bool {
    let mut depth: i32 = 0;
    for c in s.chars() {
        match c {
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved_steps() -> Vec<Step> {
        let mut first = Step::new(1, "Subtract 5", "Subtract 5 from both sides");
        first.expressions = vec!["3x = 12".to_string()];
        let mut second = Step::new(2, "Divide by 3", "Divide both sides by 3");
        second.expressions = vec!["x = 4".to_string()];
        vec![first, second]
    }

    fn input<'a>(steps: &'a [Step], language: Language) -> SceneInput<'a> {
        SceneInput {
            title: "Solve: 3x + 5 = 17",
            question: "Solve: 3x + 5 = 17",
            steps,
            concepts: &[],
            language,
            duration_budget: 20.0,
        }
    }

    #[test]
    fn test_ultra_layout_program() {
        let steps = solved_steps();
        let builder = UltraSimplifiedLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&input(&steps, Language::En)).unwrap();

        assert!(built.source.starts_with("from manim import *"));
        assert!(built.source.contains("class MathSolutionScene(Scene):"));
        assert!(built.source.contains("MathTex(r\"3x = 12\""));
        assert!(built.source.contains("SurroundingRectangle(b3"));
        assert!(built.source.contains("font=\"Arial\""));
        assert!(built.estimated_duration_seconds > 0.0);
    }

    #[test]
    fn test_answer_is_final_expression() {
        let steps = solved_steps();
        let builder = SimplifiedLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&input(&steps, Language::En)).unwrap();

        let answer_decl = built
            .source
            .lines()
            .find(|l| l.contains("MathTex(r\"x = 4\""))
            .unwrap();
        let name = answer_decl.trim().split(' ').next().unwrap();
        assert!(built
            .source
            .contains(&format!("{}.animate.scale(1.2).set_color(GREEN)", name)));
        assert_eq!(built.source.matches("SurroundingRectangle").count(), 1);
    }

    #[test]
    fn test_chinese_uses_cjk_font() {
        let steps = solved_steps();
        let builder = FullLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&input(&steps, Language::Zh)).unwrap();
        assert!(built.source.contains("font=\"SimHei\""));
        assert!(built.source.contains("class FullSolutionScene(Scene):"));
    }

    #[test]
    fn test_empty_steps_fail() {
        let builder = FullLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let result = builder.build(&input(&[], Language::En));
        assert!(matches!(result, Err(CompileError::EmptyLayout)));
    }

    #[test]
    fn test_waits_follow_budget() {
        let steps = solved_steps();
        let builder = UltraSimplifiedLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let mut short = input(&steps, Language::En);
        short.duration_budget = 1.0;
        let mut long = input(&steps, Language::En);
        long.duration_budget = 40.0;

        let short = builder.build(&short).unwrap();
        let long = builder.build(&long).unwrap();
        assert!(long.estimated_duration_seconds > short.estimated_duration_seconds);
    }

    #[test]
    fn test_waits_are_not_capped_by_a_fixed_maximum() {
        let steps = solved_steps();
        let builder = UltraSimplifiedLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let mut long = input(&steps, Language::En);
        long.duration_budget = 90.0;

        let built = builder.build(&long).unwrap();
        assert!((built.estimated_duration_seconds - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_concept_scene_lists_concepts() {
        let concepts = vec![
            "Right triangles have one 90 degree angle".to_string(),
            "The squares on the legs add up to the square on the hypotenuse".to_string(),
        ];
        let scene_input = SceneInput {
            title: "What is the Pythagorean theorem?",
            question: "What is the Pythagorean theorem?",
            steps: &[],
            concepts: &concepts,
            language: Language::En,
            duration_budget: 30.0,
        };
        let builder = ConceptLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&scene_input).unwrap();

        assert!(built.source.contains("class ConceptExplanationScene(Scene):"));
        assert!(built.source.contains("\"1. Right triangles have one\\n"));
        assert!(built.source.contains("\"Key concept 2\""));
        // 勾股定理画直角三角形
        assert!(built.source.contains("graphic = Polygon("));
        assert!((built.estimated_duration_seconds - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_concept_scene_without_geometry_has_no_graphic() {
        let concepts = vec!["Mean is the sum divided by the count".to_string()];
        let mut step = Step::new(1, "Example", "mean of 2 and 4");
        step.expressions = vec!["(2 + 4) / 2 = 3".to_string()];
        let steps = vec![step];
        let scene_input = SceneInput {
            title: "Explain the difference between mean and median",
            question: "Explain the difference between mean and median",
            steps: &steps,
            concepts: &concepts,
            language: Language::En,
            duration_budget: 20.0,
        };
        let builder = ConceptLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&scene_input).unwrap();

        assert!(!built.source.contains("graphic ="));
        assert!(built.source.contains("\"Example\""));
        assert!(built.source.contains("MathTex(r\"(2 + 4) / 2 = 3\""));
    }

    #[test]
    fn test_concept_scene_needs_concepts() {
        let builder = ConceptLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let result = builder.build(&input(&[], Language::En));
        assert!(matches!(result, Err(CompileError::EmptyLayout)));
    }

    #[test]
    fn test_narrowed_geometry_leaves_room_for_graphic() {
        let geometry = LayoutGeometry::default();
        let narrowed = narrowed_geometry(&geometry);
        assert!((narrowed.max_block_width - 7.25).abs() < 1e-9);
        assert!(narrowed.chars_per_line < geometry.chars_per_line);
        assert!(narrowed.cjk_chars_per_line < geometry.cjk_chars_per_line);
    }

    #[test]
    fn test_long_solution_scrolls() {
        let steps: Vec<Step> = (1..=12)
            .map(|i| {
                let mut s = Step::new(i, format!("Stage {}", i), "Rewrite both sides carefully");
                s.expressions = vec![format!("x + {} = {}", i, i + 1)];
                s
            })
            .collect();
        let builder = FullLayoutBuilder::new(SceneThresholds::default(), LayoutGeometry::default());
        let built = builder.build(&input(&steps, Language::En)).unwrap();
        assert!(built.source.contains("m.animate.shift(UP *"));
        assert!(built.source.contains("FadeOut(m)"));
    }

    #[test]
    fn test_to_latex() {
        assert_eq!(to_latex("3 × 4 = 12").as_deref(), Some(r"3 \times 4 = 12"));
        assert_eq!(to_latex("√(x+1) ≥ 2").as_deref(), Some(r"\sqrt{x+1} \geq 2"));
        assert_eq!(to_latex("x = 1/3").as_deref(), Some(r"x = \frac{1}{3}"));
        assert_eq!(to_latex("x² = 9").as_deref(), Some("x^{2} = 9"));
        assert_eq!(to_latex("面积 = 12"), None);
        assert_eq!(to_latex("f(x = 2"), None);
    }

    #[test]
    fn test_wrap_lines() {
        assert_eq!(wrap_lines("aa bb cc", 5, 3), vec!["aa bb", "cc"]);
        assert_eq!(wrap_lines("abcdefghij", 4, 5), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_lines("aa bb cc dd", 5, 1), vec!["aa..."]);
        assert_eq!(wrap_lines("一二三四五六七八九十", 4, 2), vec!["一二三四", "五..."]);
    }

    #[test]
    fn test_select_keeps_final_step() {
        let steps: Vec<Step> = (1..=6).map(|i| Step::new(i, "", format!("x = {}", i))).collect();
        let picked = select_steps(&steps, 3, false);
        let ordinals: Vec<u32> = picked.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 6]);
    }
}
