//! 步骤提取服务 - 业务能力层
//!
//! 从模型给出的自由文本解答中提取有序、去重的解题步骤。
//!
//! ## 提取顺序
//!
//! 1. 找"详细解题步骤"之类的标注段落，在段落内依次尝试各匹配层级
//! 2. 没有标注段落（或段落内没提取到）时，在全文上依次尝试各匹配层级
//! 3. 合并：同一序号保留较长的正文；指纹相同的步骤只保留一个
//! 4. 按序号排序
//! 5. 兜底：按段落/句子切块；仍然为空时返回占位步骤
//!
//! 匹配层级是一个有序列表（`TIERS`），第一个产出有效步骤的层级胜出。
//! 模板化的套话（"理解题意"、"Build a model"、"Verify"）和提示词回显会被过滤，
//! 除非这一行本身带有具体的数学内容。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::ExtractionLimits;
use crate::models::{ExtractionSource, ExtractionTier, Step};
use crate::services::expression::{has_math_content, ExpressionExtractor};
use crate::services::sanitizer::ContentSanitizer;

/// 匹配层级的尝试顺序
const TIERS: [ExtractionTier; 3] = [
    ExtractionTier::Titled,
    ExtractionTier::Multiline,
    ExtractionTier::Inline,
];

/// 序号上限，更大的数字多半是年份或数值
const MAX_ORDINAL: u32 = 99;

// ========== 正则 ==========

static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?[ \t]*(?:详细解题步骤|解题步骤|详细步骤|解题过程|step[- ]by[- ]step(?:[ \t]+solution)?|detailed[ \t]+steps|solution[ \t]+steps|steps)[ \t]*[:：]?[ \t]*(?:\*\*)?[ \t]*[:：]?[ \t]*$")
        .unwrap()
});

/// 编号 + 加粗标题
static TITLED_STARTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^\s*(?:#{1,6}\s*)?\*\*\s*(?:步骤|step|第)\s*(?P<num>\d+)\s*步?\s*[:：.、)）]?\s*(?P<title>[^*]*?)\s*\*\*\s*[:：]?\s*(?P<rest>.*)$").unwrap(),
        Regex::new(r"^\s*(?:[-*+]\s+)?(?P<num>\d+)\s*[.、)）]\s*\*\*(?P<title>[^*]+?)\*\*\s*[:：]?\s*(?P<rest>.*)$").unwrap(),
        Regex::new(r"(?i)^\s*#{1,6}\s*(?:步骤|step|第)\s*(?P<num>\d+)\s*步?\s*[:：.、)）]?\s*(?P<title>.*?)\s*$").unwrap(),
    ]
});

/// 编号开头的普通条目
static PLAIN_STARTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(r"(?i)^\s*(?:[-*+]\s+)?(?:(?:步骤|step)\s*(?P<num>\d+)|第\s*(?P<num2>\d+)\s*步|(?P<num3>\d+)\s*[.、)）])\s*[:：.、]?\s*(?P<rest>.+)$").unwrap()]
});

/// 行内编号
static INLINE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[\s，。；;,:：])(?:(?:步骤|step)\s*(?P<num>\d+)\s*[:：]|第\s*(?P<num2>\d+)\s*步\s*[:：，,]?|(?P<num3>\d+)\s*[、)）])")
        .unwrap()
});

static DECIMAL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.\d").unwrap());

/// 分节标记：独立的标题行、加粗行或分隔线
static SECTION_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s+\S.*|\*\*[^*]+\*\*\s*[:：]?|-{3,}|={3,}|\*{3,})\s*$").unwrap()
});

static LEADING_ENUMERATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*+]\s+)?(?:(?:步骤|step)\s*\d+|第\s*\d+\s*步|\d+\s*[.、)）])\s*[:：.、]?\s*")
        .unwrap()
});

static TEMPLATE_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^(?:理解题意|分析题意|审题|建立数学模型|建立模型|逐步计算|计算求解|验证结果|检验结果|分析已知条件|列出方程|移项求解|计算得出结果|检查答案|得出结论)").unwrap(),
        Regex::new(r"(?i)^(?:understand(?:ing)?\s+the\s+(?:problem|question)|read\s+the\s+(?:problem|question)|(?:establish|build|set\s+up|create)(?:ing)?\s+(?:a\s+|the\s+)?(?:mathematical\s+)?model|(?:calculate|compute)(?:\s+step\s+by\s+step)?|solve\s+it|verify(?:\s+the)?(?:\s+(?:results?|answer|solution))?|check\s+(?:the\s+)?(?:answer|result|solution)|analy[sz]e\s+the\s+(?:given\s+)?(?:conditions|problem|question)|write\s+(?:down\s+)?the\s+equation|draw\s+a\s+conclusion)\b").unwrap(),
        Regex::new(r"(?i)^step\s*\d+\s*[:：]?\s*(?:理解|分析|建立|计算|验证)").unwrap(),
    ]
});

static META_INSTRUCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)solve\s+this\s+math\s+problem\s+step\s+by\s+step|please\s+provide.*step|format\s+your\s+response|what\s+we'?re\s+doing.*operation.*result|mathematical\s+operation.*result\s+of\s+this\s+step|\bstepNumber\b|请提供.*步骤|请按.*格式|以下格式")
        .unwrap()
});

/// 具体数学内容（不含关键词，"Compute" 本身不算）
static CONCRETE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9=<>≤≥+×÷√^²³π]").unwrap());

static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[。！？!?；;]|\.(?:\s|$)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 匹配阶段得到的原始条目（未清洗）
#[derive(Debug, Clone)]
struct RawStep {
    ordinal: u32,
    title: String,
    body: String,
}

impl RawStep {
    fn len(&self) -> usize {
        self.title.chars().count() + self.body.chars().count()
    }

    fn raw_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// 步骤提取器
#[derive(Debug, Clone)]
pub struct StepExtractor {
    sanitizer: ContentSanitizer,
    expressions: ExpressionExtractor,
    limits: ExtractionLimits,
}

impl Default for StepExtractor {
    fn default() -> Self {
        Self::new(ContentSanitizer::default(), ExtractionLimits::default())
    }
}

impl StepExtractor {
    pub fn new(sanitizer: ContentSanitizer, limits: ExtractionLimits) -> Self {
        Self {
            sanitizer,
            expressions: ExpressionExtractor::new(limits.max_expressions_per_step),
            limits,
        }
    }

    /// 提取步骤，结果永不为空
    pub fn extract(&self, solution: &str) -> Vec<Step> {
        self.extract_with_source(solution).0
    }

    /// 提取步骤，同时返回步骤来自哪条路径
    pub fn extract_with_source(&self, solution: &str) -> (Vec<Step>, ExtractionSource) {
        if let Some(section) = locate_steps_section(solution) {
            if let Some((tier, steps)) = self.run_tiers(&section) {
                debug!("在标注段落中提取到 {} 个步骤 ({:?})", steps.len(), tier);
                return (steps, ExtractionSource::LabeledSection(tier));
            }
            debug!("标注段落中没有有效步骤，改为全文匹配");
        }

        if let Some((tier, steps)) = self.run_tiers(solution) {
            debug!("在全文中提取到 {} 个步骤 ({:?})", steps.len(), tier);
            return (steps, ExtractionSource::Document(tier));
        }

        let chunks = self.chunk_fallback(solution);
        if !chunks.is_empty() {
            debug!("按段落/句子切块得到 {} 个步骤", chunks.len());
            return (chunks, ExtractionSource::Chunks);
        }

        debug!("未能提取任何步骤，使用占位步骤");
        (vec![Step::sentinel()], ExtractionSource::Sentinel)
    }

    /// 依次尝试各匹配层级，返回第一个产出有效步骤的层级
    fn run_tiers(&self, text: &str) -> Option<(ExtractionTier, Vec<Step>)> {
        TIERS.iter().find_map(|tier| {
            let raws = match tier {
                ExtractionTier::Titled => scan_lines(text, &TITLED_STARTS, Some(&PLAIN_STARTS)),
                ExtractionTier::Multiline => scan_lines(text, &PLAIN_STARTS, None),
                ExtractionTier::Inline => scan_inline(text),
            };
            let qualifying: Vec<RawStep> =
                raws.into_iter().filter(|raw| self.qualifies(raw)).collect();
            let steps = self.finalize(qualifying);
            (!steps.is_empty()).then_some((*tier, steps))
        })
    }

    fn qualifies(&self, raw: &RawStep) -> bool {
        if raw.ordinal == 0 || raw.ordinal > MAX_ORDINAL {
            return false;
        }
        let cleaned = self.sanitizer.sanitize(&raw.raw_text());
        cleaned.chars().count() >= self.limits.min_step_chars && !is_boilerplate(&cleaned)
    }

    /// 合并同序号、按指纹去重、按序号排序
    fn finalize(&self, raws: Vec<RawStep>) -> Vec<Step> {
        let mut by_ordinal: BTreeMap<u32, RawStep> = BTreeMap::new();
        for raw in raws {
            match by_ordinal.entry(raw.ordinal) {
                Entry::Vacant(slot) => {
                    slot.insert(raw);
                }
                Entry::Occupied(mut slot) => {
                    if raw.len() > slot.get().len() {
                        slot.insert(raw);
                    }
                }
            }
        }

        let mut kept: Vec<(Step, usize)> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for raw in by_ordinal.into_values() {
            let step = self.build_step(&raw);
            let fp = self.fingerprint(&step.full_text());
            match seen.get(&fp).copied() {
                Some(index) => {
                    let (existing, existing_len) = &mut kept[index];
                    if raw.len() > *existing_len {
                        existing.title = step.title;
                        existing.body = step.body;
                        existing.expressions = step.expressions;
                        *existing_len = raw.len();
                    }
                }
                None => {
                    seen.insert(fp, kept.len());
                    kept.push((step, raw.len()));
                }
            }
        }

        kept.truncate(self.limits.max_steps);
        kept.into_iter().map(|(step, _)| step).collect()
    }

    fn build_step(&self, raw: &RawStep) -> Step {
        let mut step = Step::new(
            raw.ordinal,
            self.sanitizer.sanitize(&raw.title),
            self.sanitizer.sanitize(&raw.body),
        );
        step.expressions = self.expressions.extract_parts(&[&raw.title, &raw.body]);
        step
    }

    /// 指纹：清洗后文本的前 N 个字符（小写、空白归一）
    fn fingerprint(&self, text: &str) -> String {
        WHITESPACE
            .replace_all(text.trim(), " ")
            .to_lowercase()
            .chars()
            .take(self.limits.fingerprint_len)
            .collect()
    }

    /// 最后兜底：按段落切块，段落不足两个时按句子切块
    fn chunk_fallback(&self, solution: &str) -> Vec<Step> {
        let kept_lines: Vec<&str> = solution
            .lines()
            .filter(|line| !SECTION_BREAK.is_match(line) && !SECTION_HEADING.is_match(line))
            .filter(|line| {
                let stripped = LEADING_ENUMERATION.replace(line, "");
                !is_boilerplate(&self.sanitizer.sanitize(&stripped))
            })
            .collect();
        let text = kept_lines.join("\n");
        if text.trim().is_empty() {
            return Vec::new();
        }

        let paragraphs: Vec<String> = PARAGRAPH_SPLIT
            .split(&text)
            .map(|p| self.sanitizer.sanitize(p))
            .filter(|p| p.chars().count() >= 20 && has_math_content(p))
            .collect();

        let sentences: Vec<String> = SENTENCE_END
            .split(&text)
            .map(|s| self.sanitizer.sanitize(s))
            .filter(|s| {
                let len = s.chars().count();
                (10..=200).contains(&len) && has_math_content(s)
            })
            .collect();

        let chunks = if paragraphs.len() >= 2 || sentences.is_empty() {
            paragraphs
        } else {
            sentences
        };

        chunks
            .into_iter()
            .take(self.limits.max_fallback_chunks)
            .enumerate()
            .map(|(i, chunk)| {
                let mut step = Step::new(i as u32 + 1, "", chunk.clone());
                step.expressions = self.expressions.extract(&chunk);
                step
            })
            .collect()
    }
}

// ========== 匹配辅助函数 ==========

/// 截取标注段落：标题之后，直到下一个分节标记
fn locate_steps_section(text: &str) -> Option<String> {
    let heading = SECTION_HEADING.find(text)?;
    let mut section = Vec::new();
    for line in text[heading.end()..].lines() {
        let is_step_heading = TITLED_STARTS.iter().any(|re| re.is_match(line));
        if SECTION_BREAK.is_match(line) && !is_step_heading {
            break;
        }
        section.push(line);
    }
    let section = section.join("\n");
    (!section.trim().is_empty()).then_some(section)
}

/// 逐行扫描：命中起始行开始新条目，后续行并入正文，分节标记结束当前条目
///
/// `successor` 中的写法只在序号恰好接续当前条目时才开始新条目
/// （加粗标题的列表里混着普通编号行）。
fn scan_lines(text: &str, starts: &[Regex], successor: Option<&[Regex]>) -> Vec<RawStep> {
    let mut steps = Vec::new();
    let mut current: Option<RawStep> = None;

    for line in text.lines() {
        if let Some(raw) = match_start(line, starts) {
            steps.extend(current.take());
            current = Some(raw);
            continue;
        }
        let open_ordinal = current.as_ref().map(|step| step.ordinal);
        if let (Some(successor), Some(open_ordinal)) = (successor, open_ordinal) {
            if let Some(raw) = match_start(line, successor) {
                if raw.ordinal == open_ordinal + 1 {
                    steps.extend(current.take());
                    current = Some(raw);
                    continue;
                }
            }
        }
        if SECTION_BREAK.is_match(line) {
            steps.extend(current.take());
            continue;
        }
        if let Some(step) = current.as_mut() {
            let line = line.trim();
            if !line.is_empty() {
                if !step.body.is_empty() {
                    step.body.push('\n');
                }
                step.body.push_str(line);
            }
        }
    }
    steps.extend(current);
    steps
}

fn match_start(line: &str, starts: &[Regex]) -> Option<RawStep> {
    if DECIMAL_START.is_match(line) {
        return None;
    }
    starts.iter().find_map(|re| {
        let caps = re.captures(line)?;
        Some(RawStep {
            ordinal: capture_ordinal(&caps)?,
            title: caps.name("title").map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
            body: caps.name("rest").map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        })
    })
}

fn capture_ordinal(caps: &Captures) -> Option<u32> {
    ["num", "num2", "num3"]
        .iter()
        .find_map(|name| caps.name(name))
        .and_then(|m| m.as_str().parse().ok())
}

/// 行内编号：`1）… 2）…`、`第1步：… 第2步：…`
///
/// 全文至少出现两个编号才算。
fn scan_inline(text: &str) -> Vec<RawStep> {
    let mut steps = Vec::new();
    for line in text.lines() {
        let markers: Vec<(usize, usize, u32)> = INLINE_MARKER
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some((whole.start(), whole.end(), capture_ordinal(&caps)?))
            })
            .collect();

        for (i, (_, end, ordinal)) in markers.iter().enumerate() {
            let stop = markers.get(i + 1).map_or(line.len(), |next| next.0);
            let body = line[*end..stop].trim();
            steps.push(RawStep {
                ordinal: *ordinal,
                title: String::new(),
                body: body.to_string(),
            });
        }
    }

    if steps.len() < 2 {
        return Vec::new();
    }
    steps
}

/// 套话或提示词回显（且不带具体数学内容）
fn is_boilerplate(cleaned: &str) -> bool {
    let text = cleaned.trim_start_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    if META_INSTRUCTION.is_match(text) {
        return true;
    }
    TEMPLATE_PHRASES.iter().any(|re| match re.find(text) {
        Some(m) => !CONCRETE_MATH.is_match(&text[m.end()..]),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL_BODY;

    fn extractor() -> StepExtractor {
        StepExtractor::default()
    }

    fn ordinals(steps: &[Step]) -> Vec<u32> {
        steps.iter().map(|s| s.ordinal).collect()
    }

    #[test]
    fn test_labeled_section_with_titled_steps() {
        let text = "**问题分析**\n这是一个一元一次不等式。\n\n**详细解题步骤**\n1. **移项**：把常数移到右边 \\[3x > 216\\]\n2. **求解**：两边同时除以3\n得到 $x > \\frac{216}{3}$\n\n**最终答案**\nx > 72";
        let (steps, source) = extractor().extract_with_source(text);

        assert_eq!(source, ExtractionSource::LabeledSection(ExtractionTier::Titled));
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(steps[0].title, "移项");
        assert_eq!(steps[0].expressions, vec!["3x > 216".to_string()]);
        assert_eq!(steps[1].expressions, vec!["x > 72".to_string()]);
        assert!(!steps[1].body.contains("最终答案"));
    }

    #[test]
    fn test_bold_step_headings_with_following_body() {
        let text = "**步骤1：化简方程**\n2x + 3 = 7\n\n**步骤2：求解**\nx = 2";
        let (steps, source) = extractor().extract_with_source(text);
        assert_eq!(source, ExtractionSource::Document(ExtractionTier::Titled));
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(steps[0].title, "化简方程");
        assert_eq!(steps[0].body, "2x + 3 = 7");
    }

    #[test]
    fn test_out_of_order_ordinals_are_sorted() {
        let text = "3. Divide both sides by 3 to get x = 4\n1. Start from 3x + 5 = 17\n4. Check: 3*4 + 5 = 17\n2. Subtract 5 from both sides: 3x = 12";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1, 2, 3, 4]);
        assert_eq!(steps[1].expressions, vec!["3x = 12".to_string()]);
    }

    #[test]
    fn test_duplicate_fingerprints_collapse() {
        let text = "1. Subtract five from both sides of the equation so that 3x = 12 remains\n2. Subtract five from both sides of the equation so that 3x = 12 remains, as shown before\n3. Divide by 3 to get x = 4";
        let steps = extractor().extract(text);
        assert_eq!(steps.len(), 2);
        assert_eq!(ordinals(&steps), vec![1, 3]);
        assert!(steps[0].body.ends_with("as shown before"));
    }

    #[test]
    fn test_ordinal_collision_keeps_longer_body() {
        let text = "1. x + 1 = 2\n1. Subtract 1 from both sides: x + 1 - 1 = 2 - 1\n2. So x = 1";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert!(steps[0].body.starts_with("Subtract 1"));
    }

    #[test]
    fn test_boilerplate_only_response_yields_sentinel() {
        let text = "1. Understand the problem\n2. Build a model\n3. Compute\n4. Verify";
        let (steps, source) = extractor().extract_with_source(text);
        assert_eq!(source, ExtractionSource::Sentinel);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].body, SENTINEL_BODY);
    }

    #[test]
    fn test_chinese_template_section_yields_sentinel() {
        let text = "**详细解题步骤**\n1. 理解题意：分析题目条件\n2. 建立数学模型：设未知数\n3. 逐步计算：求解方程\n4. 验证结果：检查答案";
        let steps = extractor().extract(text);
        assert!(steps[0].is_sentinel());
    }

    #[test]
    fn test_template_phrase_with_real_math_is_kept() {
        let text = "1. Verify the answer by substituting x = 4: 3*4 + 5 = 17";
        let steps = extractor().extract(text);
        assert!(!steps[0].is_sentinel());
        assert_eq!(steps[0].ordinal, 1);
    }

    #[test]
    fn test_meta_instruction_echo_is_dropped() {
        let text = "1. Please provide each step in order\n2. Move 5 to the right: 3x = 12\n3. Divide by 3: x = 4";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![2, 3]);
    }

    #[test]
    fn test_plain_discussion_yields_sentinel() {
        let text = "This is just a general discussion about math concepts without any specific steps.";
        let steps = extractor().extract(text);
        assert_eq!(steps, vec![Step::sentinel()]);
    }

    #[test]
    fn test_paragraph_chunks_fallback() {
        let text = "First we subtract 5 from both sides, which leaves 3x = 12 on the left.\n\nThen dividing both sides by 3 gives x = 4 as the final answer.";
        let (steps, source) = extractor().extract_with_source(text);
        assert_eq!(source, ExtractionSource::Chunks);
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(steps[1].expressions, vec!["x = 4".to_string()]);
    }

    #[test]
    fn test_chunk_fallback_is_capped() {
        let text = (1..=10)
            .map(|i| format!("Paragraph number {} adds {} to the running total.", i, i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let steps = extractor().extract(&text);
        assert_eq!(steps.len(), 6);
    }

    #[test]
    fn test_inline_enumeration() {
        let text = "解法如下：1）移项得 3x = 12；2）两边除以3得 x = 4";
        let (steps, source) = extractor().extract_with_source(text);
        assert_eq!(source, ExtractionSource::Document(ExtractionTier::Inline));
        assert_eq!(ordinals(&steps), vec![1, 2]);
    }

    #[test]
    fn test_decimal_lines_are_not_steps() {
        let text = "3.14 is close to pi\n1. Multiply 2 by 3.14 to get 6.28";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1]);
    }

    #[test]
    fn test_expression_on_line_after_title() {
        let text = "1. Subtract 5 from both sides\n   3x = 12\n2. Divide by 3\n   x = 4";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(steps[0].expressions, vec!["3x = 12".to_string()]);
        assert_eq!(steps[1].expressions, vec!["x = 4".to_string()]);
    }

    #[test]
    fn test_consecutive_equation_lines_stay_separate() {
        let text = "**Step 1: Subtract 5**\n3x + 5 - 5 = 17 - 5\n3x = 12\n**Step 2: Divide by 3**\nx = 4";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(
            steps[0].expressions,
            vec!["3x + 5 - 5 = 17 - 5".to_string(), "3x = 12".to_string()]
        );
        assert_eq!(steps[1].title, "Divide by 3");
        assert_eq!(steps[1].expressions, vec!["x = 4".to_string()]);
    }

    #[test]
    fn test_plain_numbered_line_after_titled_step() {
        let text = "1. **Move**: 3x = 12\n2. Divide by 3: x = 4";
        let steps = extractor().extract(text);
        assert_eq!(ordinals(&steps), vec![1, 2]);
        assert_eq!(steps[0].expressions, vec!["3x = 12".to_string()]);
        assert_eq!(steps[1].expressions, vec!["x = 4".to_string()]);
    }

    #[test]
    fn test_result_is_never_empty_and_strictly_increasing() {
        let inputs = [
            "",
            "   ",
            "第2步：x = 3\n第1步：2x = 6\n第2步：所以 x = 3，检验 2*3 = 6",
            "Step 1: a + b = 3\nStep 2: a - b = 1\nStep 3: 2a = 4, so a = 2 and b = 1",
            "random text ### with * stray ** markup",
        ];
        for input in inputs {
            let steps = extractor().extract(input);
            assert!(!steps.is_empty());
            assert!(steps.windows(2).all(|w| w[0].ordinal < w[1].ordinal));
            assert!(steps.iter().all(|s| s.ordinal >= 1));
        }
    }
}
