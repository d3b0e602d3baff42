//! 概念要点提取
//!
//! 理论类题目按"概念"分页，要点来源依次为：
//! 解答中的概念段落 → 步骤标题 → 题干关键词对应的主题 → 语言默认值。
//! 返回结果永不为空。

use crate::models::{Language, Step};
use crate::services::sanitizer::ContentSanitizer;
use once_cell::sync::Lazy;
use regex::Regex;

/// 最多保留的概念数
pub const MAX_CONCEPTS: usize = 4;

/// 概念段落的最短字符数
const MIN_PARAGRAPH_CHARS: usize = 20;

static CONCEPT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)原理|概念|理解|定理|定义|公式|性质|\b(?:principle|concept|theorem|definition|formula|property)\b")
        .unwrap()
});

static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// 题干主题表：关键词 → 各语言主题名（顺序同 `Language::ALL`）
const TOPICS: &[(&str, [&str; 5])] = &[
    (
        r"(?i)不等式|inequalit",
        ["不等式求解", "Solving inequalities", "Resolución de desigualdades", "不等式の解法", "Résolution d'inéquations"],
    ),
    (
        r"(?i)方程|equation",
        ["方程求解", "Solving equations", "Resolución de ecuaciones", "方程式の解法", "Résolution d'équations"],
    ),
    (
        r"(?i)导数|derivative",
        ["导数计算", "Computing derivatives", "Cálculo de derivadas", "導関数の計算", "Calcul de dérivées"],
    ),
    (
        r"(?i)积分|integral",
        ["积分计算", "Computing integrals", "Cálculo de integrales", "積分の計算", "Calcul d'intégrales"],
    ),
    (
        r"(?i)函数|function",
        ["函数分析", "Function analysis", "Análisis de funciones", "関数の分析", "Analyse de fonctions"],
    ),
    (
        r"(?i)勾股|pythagor",
        ["勾股定理", "The Pythagorean theorem", "El teorema de Pitágoras", "三平方の定理", "Le théorème de Pythagore"],
    ),
    (
        r"(?i)三角形|triangle",
        ["三角形的性质", "Properties of triangles", "Propiedades del triángulo", "三角形の性質", "Propriétés du triangle"],
    ),
    (
        r"(?i)拉窗帘|curtain",
        ["拉窗帘原理", "The curtain principle", "El principio de la cortina", "カーテンの原理", "Le principe du rideau"],
    ),
    (
        r"(?i)概率|probabilit",
        ["概率计算", "Probability", "Probabilidad", "確率の計算", "Probabilités"],
    ),
];

static TOPIC_PATTERNS: Lazy<Vec<(Regex, [&'static str; 5])>> = Lazy::new(|| {
    TOPICS
        .iter()
        .map(|(pattern, labels)| (Regex::new(pattern).unwrap(), *labels))
        .collect()
});

fn default_concepts(language: Language) -> [&'static str; 3] {
    match language {
        Language::Zh => ["核心概念", "基本原理", "应用方法"],
        Language::En => ["Core idea", "Underlying principle", "How to apply it"],
        Language::Es => ["Idea central", "Principio fundamental", "Cómo aplicarlo"],
        Language::Ja => ["基本的な考え方", "基本原理", "応用方法"],
        Language::Fr => ["Idée centrale", "Principe fondamental", "Comment l'appliquer"],
    }
}

fn language_slot(language: Language) -> usize {
    Language::ALL
        .iter()
        .position(|l| *l == language)
        .unwrap_or_default()
}

/// 概念要点提取器
pub struct ConceptExtractor {
    sanitizer: ContentSanitizer,
}

impl Default for ConceptExtractor {
    fn default() -> Self {
        Self::new(ContentSanitizer::new(160))
    }
}

impl ConceptExtractor {
    pub fn new(sanitizer: ContentSanitizer) -> Self {
        Self { sanitizer }
    }

    /// 提取概念要点（1..=4 条，去重）
    pub fn extract(
        &self,
        question: &str,
        solution: &str,
        steps: &[Step],
        language: Language,
    ) -> Vec<String> {
        let from_paragraphs = self.from_paragraphs(solution);
        if !from_paragraphs.is_empty() {
            return from_paragraphs;
        }

        let from_steps = self.from_steps(steps);
        if !from_steps.is_empty() {
            return from_steps;
        }

        let topics = topics_for(&format!("{}\n{}", question, solution), language);
        if !topics.is_empty() {
            return topics;
        }

        default_concepts(language)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn from_paragraphs(&self, solution: &str) -> Vec<String> {
        let candidates = PARAGRAPH_SPLIT
            .split(solution)
            .filter(|p| CONCEPT_KEYWORDS.is_match(p))
            .map(|p| self.sanitizer.sanitize(p))
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS);
        dedup_capped(candidates)
    }

    fn from_steps(&self, steps: &[Step]) -> Vec<String> {
        let candidates = steps
            .iter()
            .filter(|s| !s.is_sentinel())
            .map(|s| self.sanitizer.sanitize(s.headline()))
            .filter(|h| !h.is_empty());
        dedup_capped(candidates)
    }
}

/// 根据题干关键词匹配主题
pub fn topics_for(text: &str, language: Language) -> Vec<String> {
    let slot = language_slot(language);
    let candidates = TOPIC_PATTERNS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .map(|(_, labels)| labels[slot].to_string());
    dedup_capped(candidates)
}

fn dedup_capped(candidates: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
        if out.len() == MAX_CONCEPTS {
            break;
        }
    }
    out
}
