//! 内容清洗服务 - 业务能力层
//!
//! 两项能力：
//! 1. `sanitize`：去掉 Markdown 装饰、数学定界符和 LaTeX 命令，输出可直接展示/朗读的纯文本。
//!    结果是不动点：`sanitize(sanitize(x)) == sanitize(x)`。
//! 2. `escape_for_embedding`：把任意文本转成可以安全嵌入场景程序字面量的形式。

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::{Captures, Regex};

/// LaTeX 命令 → Unicode 符号
///
/// 不在表中的命令会被直接删除。
static LATEX_SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "times" => "×",
    "div" => "÷",
    "cdot" => "·",
    "pm" => "±",
    "mp" => "∓",
    "leq" => "≤",
    "le" => "≤",
    "leqslant" => "≤",
    "geq" => "≥",
    "ge" => "≥",
    "geqslant" => "≥",
    "neq" => "≠",
    "ne" => "≠",
    "approx" => "≈",
    "equiv" => "≡",
    "infty" => "∞",
    "pi" => "π",
    "alpha" => "α",
    "beta" => "β",
    "gamma" => "γ",
    "theta" => "θ",
    "lambda" => "λ",
    "mu" => "μ",
    "sigma" => "σ",
    "Delta" => "Δ",
    "angle" => "∠",
    "triangle" => "△",
    "circ" => "°",
    "degree" => "°",
    "perp" => "⊥",
    "parallel" => "∥",
    "sum" => "∑",
    "prod" => "∏",
    "int" => "∫",
    "Rightarrow" => "⇒",
    "rightarrow" => "→",
    "to" => "→",
    "therefore" => "∴",
    "because" => "∵",
    "in" => "∈",
    "quad" => " ",
    "qquad" => " ",
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+)+").unwrap());
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+•][ \t]+").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]\([^()]*\)").unwrap());
static MATH_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$|\\\[|\\\]|\\\(|\\\)").unwrap());
static TEXT_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:text|mathrm|mathbf|mathit|textbf|operatorname|boxed)\s*\{([^{}]*)\}")
        .unwrap()
});
static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[dt]?frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}").unwrap());
static ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\sqrt\s*(?:\[([^\[\]]*)\])?\s*\{([^{}]*)\}").unwrap());
static LEFT_RIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(?:left|right)\b\s*").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\").unwrap());
static SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[,;:! ]").unwrap());
static ESCAPED_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[{}]").unwrap());
static COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([A-Za-z]+)").unwrap());
static BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 清洗循环的最大轮数，实际输入两三轮即可收敛
const MAX_PASSES: usize = 8;

/// 内容清洗器
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    max_len: usize,
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self { max_len: 600 }
    }
}

impl ContentSanitizer {
    /// # 参数
    /// - `max_len`: 输出最大字符数（含截断标记 `...`）
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(8),
        }
    }

    /// 清洗文本
    ///
    /// 反复执行一轮清洗 + 截断，直到结果不再变化。
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..MAX_PASSES {
            let next = truncate_with_marker(&sanitize_once(&current), self.max_len);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

/// 单轮清洗
fn sanitize_once(text: &str) -> String {
    let text = CODE_FENCE.replace_all(text, " ");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BOLD.replace_all(&text, "$1");
    let text = text.replace("**", "");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = MATH_DELIMITER.replace_all(&text, " ");
    let text = text.replace('$', "");

    // 带参数的命令从最内层开始展开，必须在删除未知命令之前完成
    let mut text = text;
    for _ in 0..MAX_PASSES {
        let expanded = expand_structured_commands(&text);
        if expanded == text {
            break;
        }
        text = expanded;
    }

    let text = LEFT_RIGHT.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, " ");
    let text = SPACING.replace_all(&text, " ");
    let text = ESCAPED_BRACE.replace_all(&text, "");
    let text = COMMAND.replace_all(&text, |caps: &Captures| {
        LATEX_SYMBOLS.get(&caps[1]).copied().unwrap_or("").to_string()
    });
    let text = BRACES.replace_all(&text, "");
    let text = text.replace("^°", "°");

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn expand_structured_commands(text: &str) -> String {
    let text = TEXT_COMMAND.replace_all(text, "$1");
    let text = FRACTION.replace_all(&text, |caps: &Captures| {
        format!("{}/{}", wrap_operand(&caps[1]), wrap_operand(&caps[2]))
    });
    let text = ROOT.replace_all(&text, |caps: &Captures| {
        let radical = match caps.get(1).map(|m| m.as_str().trim()) {
            Some("3") => "∛",
            Some("4") => "∜",
            _ => "√",
        };
        format!("{}{}", radical, wrap_operand(&caps[2]))
    });
    text.into_owned()
}

/// 分子分母、根号内容只有一个"词"时不加括号
fn wrap_operand(operand: &str) -> String {
    let operand = operand.trim();
    if !operand.is_empty() && operand.chars().all(|c| c.is_alphanumeric() || c == '.') {
        operand.to_string()
    } else {
        format!("({})", operand)
    }
}

/// 截断到 `max_len` 个字符以内，超长时以 `...` 结尾
fn truncate_with_marker(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

// ========== 嵌入转义 ==========

/// 嵌入位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedContext {
    /// 双引号包围的普通 Python 字符串
    PyString,
    /// `r"..."` 原始字符串中的 LaTeX 内容
    RawMath,
}

/// 把文本转义为可安全嵌入场景程序的字面量内容
///
/// 换行折叠为空格，回车与其它控制字符删除，末尾多余的反斜杠先去掉再转义。
pub fn escape_for_embedding(text: &str, context: EmbedContext) -> String {
    let flattened: String = text
        .chars()
        .filter_map(|c| match c {
            '\n' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    match context {
        EmbedContext::PyString => {
            let trimmed = trim_trailing_escapes(&flattened);
            let mut out = String::with_capacity(trimmed.len() + 8);
            for c in trimmed.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\'' => out.push_str("\\'"),
                    c => out.push(c),
                }
            }
            out
        }
        // 原始字符串里无法转义引号，只能删掉；删掉后末尾可能重新露出反斜杠
        EmbedContext::RawMath => {
            let unquoted: String = flattened.chars().filter(|c| *c != '"').collect();
            trim_trailing_escapes(&unquoted).to_string()
        }
    }
}

/// 去掉首尾空白和末尾的反斜杠，直到末尾既不是空白也不是反斜杠
fn trim_trailing_escapes(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| c == '\\' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> ContentSanitizer {
        ContentSanitizer::new(600)
    }

    #[test]
    fn test_strips_markdown_decoration() {
        let s = sanitizer();
        assert_eq!(s.sanitize("**移项**：把 5 移到右边"), "移项：把 5 移到右边");
        assert_eq!(s.sanitize("## Step 1\n- first\n- second"), "Step 1 first second");
        assert_eq!(s.sanitize("see [the docs](http://x.y/z)"), "see the docs");
        assert_eq!(s.sanitize("use `x = 2`"), "use x = 2");
    }

    #[test]
    fn test_rewrites_latex() {
        let s = sanitizer();
        assert_eq!(s.sanitize(r"\[3x > 216\]"), "3x > 216");
        assert_eq!(s.sanitize(r"$x = \frac{216}{3}$"), "x = 216/3");
        assert_eq!(s.sanitize(r"$\frac{a+1}{2}$"), "(a+1)/2");
        assert_eq!(s.sanitize(r"$\sqrt{16} = 4$"), "√16 = 4");
        assert_eq!(s.sanitize(r"$2 \times 3 \leq 7$"), "2 × 3 ≤ 7");
        assert_eq!(s.sanitize(r"$90^\circ$"), "90°");
        assert_eq!(s.sanitize(r"\text{area} = \pi r^2"), "area = π r^2");
        assert_eq!(s.sanitize(r"\left( x \right)"), "( x )");
    }

    #[test]
    fn test_nested_latex_resolves_across_passes() {
        let s = sanitizer();
        assert_eq!(s.sanitize(r"$\frac{\sqrt{9}}{3}$"), "(√9)/3");
    }

    #[test]
    fn test_keeps_plain_multiplication_star() {
        assert_eq!(sanitizer().sanitize("2*3*4 = 24"), "2*3*4 = 24");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let s = ContentSanitizer::new(40);
        let inputs = [
            "# # double heading",
            "***bold italic***",
            r"\frac{\frac{1}{2}}{3}",
            "**unterminated bold",
            "a very long line that will certainly be truncated because it exceeds forty characters **bold**",
            r"trailing command \frac",
            "  spaced   out\n\n text ",
            r"$$x^2 + \sqrt[3]{8} = 6$$",
            "",
        ];
        for input in inputs {
            let once = s.sanitize(input);
            assert_eq!(s.sanitize(&once), once, "not idempotent for {:?}", input);
            assert!(once.chars().count() <= 40);
        }
    }

    #[test]
    fn test_truncation_marker() {
        let s = ContentSanitizer::new(10);
        assert_eq!(s.sanitize("abcdefghijklmnop"), "abcdefg...");
        assert_eq!(s.sanitize("short"), "short");
    }

    #[test]
    fn test_escape_python_string() {
        let escaped = escape_for_embedding("say \"hi\"\nit's C:\\path\\", EmbedContext::PyString);
        assert_eq!(escaped, "say \\\"hi\\\" it\\'s C:\\\\path");
    }

    #[test]
    fn test_escape_raw_math() {
        let escaped = escape_for_embedding("x \\geq \"2\"\r\n\\", EmbedContext::RawMath);
        assert_eq!(escaped, "x \\geq 2");
    }

    #[test]
    fn test_escape_raw_math_never_ends_with_backslash() {
        for input in ["a\\ \\", "a\\\"", "b \\ \\  \\", "\\\\"] {
            let escaped = escape_for_embedding(input, EmbedContext::RawMath);
            assert!(!escaped.ends_with('\\'), "{:?} -> {:?}", input, escaped);
        }
        assert_eq!(escape_for_embedding("a\\ \\", EmbedContext::RawMath), "a");
    }
}
