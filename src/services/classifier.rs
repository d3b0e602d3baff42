//! 问题分类服务 - 业务能力层
//!
//! 判断问题属于"具体计算题"、"概念/原理题"还是"混合题"，并给出置信度和判定依据。
//!
//! 判定顺序固定（先命中先返回）：
//! 1. 指名原理或要求动画演示 → 理论题 0.9
//! 2. 没有数值（不计 90/180/360 和 π）→ 理论题；有计算命令且无演示措辞时为具体题
//! 3. 比较两类特征的命中数；打平或过低时走数值/概念词的次级判断，最后才是混合题

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{Category, Classification, Complexity, PresentationFormat};

/// 具体题特征
static CONCRETE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        // 带单位的数值
        r"\d+(?:\.\d+)?\s*(?:(?:cm|mm|km|m|kg|g|ml|l)\b|°|度|分|秒)",
        r"(?i)解方程\s*[:：]|\bsolve(?:\s+the\s+equation)?\s*[:：]",
        r"(?i)计算\s*[:：]|\b(?:calculate|compute)\s*[:：]",
        r"(?i)求\s*[:：]|\bfind\s*[:：]",
        r"(?i)化简\s*[:：]|\bsimplify\s*[:：]",
        r"(?i)(?:已知|given).*(?:底边|边长|高|半径|直径|base|side|height|radius|diameter).*\d",
        // 计算类命令
        r"(?i)\b(?:solve|calculate|compute|evaluate|simplify|find)\b|解方程|求解|计算|化简|求(?:面积|周长|体积|长度|边长|高|值|出)",
        // 给定数值（"底边为8"、"radius of 3"）
        r"(?i)(?:为|是|等于|\bis|\bequals?|\bof)\s*\d",
        // 等式/不等式字面量
        r"\d\s*(?:=|<|>|≤|≥)\s*-?\d|[a-z]\s*(?:=|<|>|≤|≥)\s*-?\d",
        // 系数+变量（3x）
        r"\b\d+[a-z]\b",
    ])
});

/// 理论题特征
static THEORETICAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        r"(?i)什么是|如何理解|为什么|原理|概念|定义|\bwhat\s+is\b|\bhow\s+to\s+understand\b|\bwhy\b|\bprinciple\b|\bconcept\b|\bdefinition\b",
        r"(?i)演示|说明|解释|展示|\b(?:demonstrate|explain|show|illustrate|visuali[sz]e)\b",
        r"(?i)拉窗帘原理|三角形面积不变|几何变换|勾股定理|\bcurtain\s+principle\b|\bpythagorean\b|\bgeometric\s+transformation\b",
        r"(?i)怎么|如何|怎样|方法|技巧|\bhow\b|\bmethod\b|\btechnique\b|\bapproach\b",
        r"(?i)区别|不同|比较|\bvs\.?\b|\bdifference\b|\bcompare\b|\bversus\b",
    ])
});

/// 指名原理或要求动画演示
static NAMED_PRINCIPLE_OR_ANIMATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)拉窗帘原理|勾股定理|毕达哥拉斯定理|三角形面积不变|几何变换|动画演示|用动画|演示一下|\bcurtain\s+principle\b|\bpythagorean\s+theorem\b|\bpythagoras\b|\btriangle\s+area\s+invarian|\bgeometric\s+transformation\b|\banimat(?:e|ion)\b|\bvisuali[sz]e\b")
        .unwrap()
});

/// 不算作"具体数值"的常见角度和 π
static IGNORED_NUMBERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:90|180|360)\b|π|\\pi\b|\bpi\b").unwrap());
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

static IMPERATIVE_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:solve|calculate|compute|evaluate|simplify|find|factor|expand)\b|求解|计算|化简|解方程|求出|展开|因式分解")
        .unwrap()
});
static DEMONSTRATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)演示|展示|说明|解释|\b(?:demonstrate|show|explain|illustrate|visuali[sz]e)\b")
        .unwrap()
});

static SPECIFIC_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
static GENERAL_CONCEPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)原理|概念|方法|技巧|理论|\b(?:principle|concept|method|technique|theory)\b")
        .unwrap()
});

/// 混合题细化用的关键词
static DEMO_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)拉窗帘|原理|演示|\b(?:principle|demonstrat\w*)\b").unwrap()
});
static SOLVE_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)求|计算|解|\b(?:solve|calculate|compute)\b").unwrap());

// ========== 复杂度/呈现形式 ==========

static SYMBOLIC_NOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[=<>≤≥≠^√∫∑π²³]|\\[A-Za-z]+|\$").unwrap());
static ADVANCED_TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)积分|导数|微分|矩阵|极限|数列|概率|方程组|\b(?:integral|derivative|differential|matrix|limit|sequence|probability|system\s+of)\b")
        .unwrap()
});
static OPERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+\-*/×÷^=<>≤≥]").unwrap());

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("内置正则必须合法"))
        .collect()
}

/// 问题分类器
///
/// 无状态，所有规则都是静态正则。
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// 对问题文本分类，永不失败
    pub fn classify(&self, question: &str) -> Classification {
        let text = question.trim();
        if text.is_empty() {
            return Classification {
                category: Category::TheoreticalQuestion,
                confidence: 0.5,
                rationale: "no input".to_string(),
                complexity: Complexity::Simple,
                presentation_format: PresentationFormat::Plain,
            };
        }

        let (category, confidence, rationale) = decide_category(text);
        let complexity = score_complexity(text);
        let presentation_format = if SYMBOLIC_NOTATION.is_match(text) {
            PresentationFormat::Symbolic
        } else {
            PresentationFormat::Plain
        };

        debug!(
            "分类结果: {} (置信度 {:.2}) - {}",
            category, confidence, rationale
        );

        Classification {
            category,
            confidence,
            rationale,
            complexity,
            presentation_format,
        }
    }
}

/// 按固定顺序判定类别
fn decide_category(text: &str) -> (Category, f64, String) {
    // 规则 1
    if let Some(m) = NAMED_PRINCIPLE_OR_ANIMATION.find(text) {
        return (
            Category::TheoreticalQuestion,
            0.9,
            format!("named principle or animation request: '{}'", m.as_str()),
        );
    }

    // 规则 2
    let without_ignored = IGNORED_NUMBERS.replace_all(text, " ");
    if !DIGIT.is_match(&without_ignored) {
        if IMPERATIVE_VERB.is_match(text) && !DEMONSTRATIVE.is_match(text) {
            return (
                Category::ConcreteProblem,
                0.7,
                "imperative computation verb without numeric literals".to_string(),
            );
        }
        return (
            Category::TheoreticalQuestion,
            0.8,
            "no specific numeric literals".to_string(),
        );
    }

    // 规则 3
    let concrete = count_matches(&CONCRETE_PATTERNS, text);
    let theoretical = count_matches(&THEORETICAL_PATTERNS, text);

    if concrete >= 2 && concrete > theoretical {
        return (
            Category::ConcreteProblem,
            score_confidence(concrete),
            format!("concrete indicators {} vs theoretical {}", concrete, theoretical),
        );
    }
    if theoretical >= 2 && theoretical > concrete {
        return (
            Category::TheoreticalQuestion,
            score_confidence(theoretical),
            format!("theoretical indicators {} vs concrete {}", theoretical, concrete),
        );
    }

    let has_numbers = SPECIFIC_NUMBER.is_match(&without_ignored);
    let has_concepts = GENERAL_CONCEPT.is_match(text);
    match (has_numbers, has_concepts) {
        (true, false) => (
            Category::ConcreteProblem,
            0.7,
            "specific numbers without general concept words".to_string(),
        ),
        (false, true) => (
            Category::TheoreticalQuestion,
            0.7,
            "general concept words without specific numbers".to_string(),
        ),
        _ => refine_mixed(text, concrete, theoretical),
    }
}

/// 混合题的最后细化
fn refine_mixed(text: &str, concrete: usize, theoretical: usize) -> (Category, f64, String) {
    if DEMO_KEYWORDS.is_match(text) {
        return (
            Category::TheoreticalQuestion,
            0.8,
            "mixed signals, demonstration keywords dominate".to_string(),
        );
    }
    if SOLVE_KEYWORDS.is_match(text) {
        return (
            Category::ConcreteProblem,
            0.8,
            "mixed signals, solve keywords dominate".to_string(),
        );
    }
    (
        Category::Mixed,
        0.5,
        format!("ambiguous: concrete {} vs theoretical {}", concrete, theoretical),
    )
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(text)).count()
}

fn score_confidence(score: usize) -> f64 {
    (score as f64 / 5.0).min(0.9)
}

/// 复杂度加权：长度、进阶主题、运算符数量
fn score_complexity(text: &str) -> Complexity {
    let mut score = 0;
    if text.chars().count() > 80 {
        score += 1;
    }
    if ADVANCED_TOPIC.is_match(text) {
        score += 1;
    }
    if OPERATOR.find_iter(text).count() >= 3 {
        score += 1;
    }
    if score >= 2 {
        Complexity::Complex
    } else {
        Complexity::Simple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        Classifier::new().classify(text)
    }

    #[test]
    fn test_linear_equation_is_concrete() {
        let result = classify("Solve: 3x + 5 = 17");
        assert_eq!(result.category, Category::ConcreteProblem);
        assert!(result.confidence >= 0.6, "confidence {}", result.confidence);
        assert_eq!(result.presentation_format, PresentationFormat::Symbolic);
    }

    #[test]
    fn test_named_theorem_is_theoretical() {
        let result = classify("What is the Pythagorean theorem?");
        assert_eq!(result.category, Category::TheoreticalQuestion);
        assert!(result.confidence >= 0.8);
    }

    #[test]
    fn test_curtain_principle_is_theoretical() {
        let result = classify("请用拉窗帘原理演示三角形面积不变");
        assert_eq!(result.category, Category::TheoreticalQuestion);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_empty_input() {
        let result = classify("   ");
        assert_eq!(result.category, Category::TheoreticalQuestion);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.rationale, "no input");
    }

    #[test]
    fn test_right_angle_is_not_a_specific_number() {
        let result = classify("Why do the angles of a triangle add up to 180 degrees?");
        assert_eq!(result.category, Category::TheoreticalQuestion);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_imperative_without_numbers_is_concrete() {
        let result = classify("Simplify the expression a times b plus a times c");
        assert_eq!(result.category, Category::ConcreteProblem);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_chinese_geometry_problem() {
        let result = classify("已知三角形的底边为8cm，高为5cm，求面积");
        assert_eq!(result.category, Category::ConcreteProblem);
        assert!(result.confidence >= 0.6);
    }

    #[test]
    fn test_secondary_heuristic_numbers_only() {
        // 只有一个数字、没有任何特征词
        let result = classify("A box holds 12 apples");
        assert_eq!(result.category, Category::ConcreteProblem);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_confidence_bounds() {
        for text in [
            "Solve: 3x + 5 = 17",
            "什么是函数",
            "Compare the method for 2 and 3",
            "Calculate: 12 cm + 5 cm, find: the total, simplify: 3x = 6",
        ] {
            let c = classify(text).confidence;
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn test_complexity_scoring() {
        assert_eq!(classify("Solve: x + 1 = 2").complexity, Complexity::Simple);
        assert_eq!(
            classify("Compute the derivative of f(x) = x^3 + 2x^2 - 5x + 7 and find where it equals zero").complexity,
            Complexity::Complex
        );
    }
}
