//! 数学表达式服务 - 业务能力层
//!
//! - 从步骤原文中找出数学表达式（LaTeX 定界符、反引号、括号记法、行内等式）
//! - 规范化表达式：清洗 LaTeX、折叠空白、把右侧的整数分数化简（`x > 216/3` → `x > 72`）
//! - 判断一段文字是否带有数学内容

use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::sanitizer::ContentSanitizer;

static DISPLAY_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\\[(.+?)\\\]").unwrap());
static DOUBLE_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap());
static INLINE_DOLLAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$\n]+?)\$").unwrap());
static INLINE_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\((.+?)\\\)").unwrap());
static BACKTICK: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]*[=<>≤≥≠][^\[\]\n]*)\]").unwrap());
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()\n]*\d[^()\n]*[=<>≤≥≠][^()\n]*)\)").unwrap());
static INLINE_EQUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9A-Za-z(√π][0-9A-Za-z()+\-*/^.√π×÷·²³ ]*(?:=|<|>|≤|≥|≠)[0-9A-Za-z()+\-*/^.√π×÷·²³=<>≤≥ ]*[0-9A-Za-z)π²³]")
        .unwrap()
});
static FRACTION_RHS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<lhs>.*?)\s*(?P<rel><=|>=|≤|≥|≠|=|<|>)\s*(?P<num>-?\d+)\s*/\s*(?P<den>-?\d+)$")
        .unwrap()
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static MATH_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)计算|求解|代入|化简|展开|合并|移项|方程|解得|等于|\b(calculate|solve|substitute|simplify|expand|combine|equation|equals)\b")
        .unwrap()
});
static MATH_SYMBOLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9=+×÷√²³∑∏∫<>≤≥^π]").unwrap());
static RELATION_OR_OPERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[=<>≤≥≠+\-*/^×÷√]").unwrap());

/// 文本是否带有数学内容（运算关键词、数字或数学符号）
pub fn has_math_content(text: &str) -> bool {
    MATH_KEYWORDS.is_match(text) || MATH_SYMBOLS.is_match(text)
}

/// 表达式提取器
#[derive(Debug, Clone)]
pub struct ExpressionExtractor {
    sanitizer: ContentSanitizer,
    max_per_step: usize,
}

impl ExpressionExtractor {
    /// # 参数
    /// - `max_per_step`: 每段文字最多保留的表达式数
    pub fn new(max_per_step: usize) -> Self {
        Self {
            sanitizer: ContentSanitizer::new(200),
            max_per_step: max_per_step.max(1),
        }
    }

    /// 从原始（未清洗的）步骤文本中提取表达式
    ///
    /// 先找带定界符的写法；都没有时再找括号记法；最后在清洗后的文本里找行内等式。
    /// 结果已规范化、去重，并按出现顺序排列。
    pub fn extract(&self, raw: &str) -> Vec<String> {
        let mut candidates: Vec<(usize, String)> = Vec::new();

        for re in [
            &*DISPLAY_BRACKET,
            &*DOUBLE_DOLLAR,
            &*INLINE_PAREN,
            &*BACKTICK,
        ] {
            for caps in re.captures_iter(raw) {
                if let Some(m) = caps.get(1) {
                    candidates.push((m.start(), m.as_str().to_string()));
                }
            }
        }
        // `$$` 已处理，单 `$` 只在去掉 `$$` 块之后匹配
        let without_display = DOUBLE_DOLLAR.replace_all(raw, |caps: &regex::Captures| {
            " ".repeat(caps[0].len())
        });
        for caps in INLINE_DOLLAR.captures_iter(&without_display) {
            if let Some(m) = caps.get(1) {
                candidates.push((m.start(), m.as_str().to_string()));
            }
        }

        if candidates.is_empty() {
            for re in [&*BRACKETED, &*PARENTHESIZED] {
                for caps in re.captures_iter(raw) {
                    if let Some(m) = caps.get(1) {
                        candidates.push((m.start(), m.as_str().to_string()));
                    }
                }
            }
        }

        let mut expressions = Vec::new();
        if candidates.is_empty() {
            // 逐行匹配，等式不会跨行拼接
            for line in raw.lines() {
                let cleaned = self.sanitizer.sanitize(line);
                for m in INLINE_EQUATION.find_iter(&cleaned) {
                    self.push_unique(&mut expressions, &trim_prose(m.as_str()));
                }
            }
        } else {
            candidates.sort_by_key(|(pos, _)| *pos);
            for (_, candidate) in candidates {
                let cleaned = self.sanitizer.sanitize(&candidate);
                self.push_unique(&mut expressions, &cleaned);
            }
        }

        expressions.truncate(self.max_per_step);
        expressions
    }

    /// 分别从多段文字（如标题和正文）中提取，合并去重后截断
    pub fn extract_parts(&self, parts: &[&str]) -> Vec<String> {
        let mut expressions: Vec<String> = Vec::new();
        for part in parts {
            for expr in self.extract(part) {
                if !expressions.contains(&expr) {
                    expressions.push(expr);
                }
            }
        }
        expressions.truncate(self.max_per_step);
        expressions
    }

    fn push_unique(&self, expressions: &mut Vec<String>, candidate: &str) {
        let normalized = normalize_expression(candidate);
        if normalized.is_empty() || !RELATION_OR_OPERATOR.is_match(&normalized) {
            return;
        }
        if !expressions.contains(&normalized) {
            expressions.push(normalized);
        }
    }
}

/// 去掉行内等式两边混进来的普通单词（`so x = 4 is the answer` → `x = 4`）
///
/// 以第一个关系符为中心，向两侧扩展到遇到普通单词为止。
fn trim_prose(matched: &str) -> String {
    let is_word = |token: &str| {
        token.chars().count() >= 2
            && token.chars().all(|c| c.is_ascii_alphabetic())
            && !MATH_FUNCTIONS.contains(&token.to_ascii_lowercase().as_str())
    };
    let tokens: Vec<&str> = matched.split_whitespace().collect();
    let Some(relation) = tokens
        .iter()
        .position(|t| t.contains(['=', '<', '>', '≤', '≥', '≠']))
    else {
        return String::new();
    };

    let mut start = relation;
    while start > 0 && !is_word(tokens[start - 1]) {
        start -= 1;
    }
    let mut end = relation;
    while end + 1 < tokens.len() && !is_word(tokens[end + 1]) {
        end += 1;
    }
    tokens[start..=end].join(" ")
}

const MATH_FUNCTIONS: [&str; 8] = ["sin", "cos", "tan", "log", "ln", "exp", "sqrt", "abs"];

/// 规范化单个（已清洗的）表达式
///
/// 折叠空白；若右侧是整数分数，则化简为整数、有限小数或带分数。
pub fn normalize_expression(expr: &str) -> String {
    let collapsed = WHITESPACE.replace_all(expr.trim(), " ").to_string();
    let collapsed = collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | '，' | '。' | ';' | '；' | ':' | '：'))
        .trim()
        .to_string();

    let Some(caps) = FRACTION_RHS.captures(&collapsed) else {
        return collapsed;
    };
    let (Ok(num), Ok(den)) = (caps["num"].parse::<i64>(), caps["den"].parse::<i64>()) else {
        return collapsed;
    };
    let lhs = caps["lhs"].trim();
    if lhs.is_empty() {
        return collapsed;
    }
    match reduce_fraction(num, den) {
        Some(value) => format!("{} {} {}", lhs, &caps["rel"], value),
        None => collapsed,
    }
}

/// 化简整数分数
///
/// 整除时返回整数；分母只含因子 2 和 5 时返回有限小数；否则返回带分数（或最简真分数）。
/// 分母为 0 返回 `None`。
pub fn reduce_fraction(num: i64, den: i64) -> Option<String> {
    if den == 0 {
        return None;
    }
    let negative = (num < 0) != (den < 0);
    let (mut n, mut d) = (num.unsigned_abs(), den.unsigned_abs());
    let g = gcd(n, d);
    n /= g;
    d /= g;
    let sign = if negative && n != 0 { "-" } else { "" };

    if d == 1 {
        return Some(format!("{}{}", sign, n));
    }

    if let Some(places) = terminating_places(d) {
        let value = n as f64 / d as f64;
        let text = format!("{:.*}", places, value);
        return Some(format!("{}{}", sign, text));
    }

    let whole = n / d;
    let rem = n % d;
    if whole == 0 {
        Some(format!("{}{}/{}", sign, rem, d))
    } else {
        Some(format!("{}{} {}/{}", sign, whole, rem, d))
    }
}

/// 分母只含 2、5 因子时返回所需小数位数（最多 6 位）
fn terminating_places(mut d: u64) -> Option<usize> {
    let (mut twos, mut fives) = (0usize, 0usize);
    while d % 2 == 0 {
        d /= 2;
        twos += 1;
    }
    while d % 5 == 0 {
        d /= 5;
        fives += 1;
    }
    let places = twos.max(fives);
    (d == 1 && places <= 6).then_some(places)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}
