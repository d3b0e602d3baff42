//! 数学符号的口语化
//!
//! 按顺序套用替换规则，把表达式改写成可以朗读的文字。
//! 规则顺序有意义：`^2` 要先于 `^n`，`<=` 要先于 `<`。

use crate::models::Language;
use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;

/// 各语言的替换文本，顺序同 `Language::ALL`
type Spoken = [&'static str; 5];

const RULES: &[(&str, Spoken)] = &[
    // 系数与变量分开读："3x" → "3 x"
    (r"(\d)([A-Za-z])\b", ["${1}${2}", "${1} ${2}", "${1} ${2}", "${1}${2}", "${1} ${2}"]),
    (r"\^\{?2\}?|²", ["的平方", " squared", " al cuadrado", "の二乗", " au carré"]),
    (r"\^\{?3\}?|³", ["的立方", " cubed", " al cubo", "の三乗", " au cube"]),
    (
        r"\^\{?\(?(-?[A-Za-z0-9]+)\)?\}?",
        ["的${1}次方", " to the power of ${1}", " elevado a ${1}", "の${1}乗", " puissance ${1}"],
    ),
    (
        r"√\(?([^\s()]+)\)?",
        ["根号${1}", "the square root of ${1}", "la raíz cuadrada de ${1}", "ルート${1}", "la racine carrée de ${1}"],
    ),
    (
        r"(\b\d+|\b[A-Za-z]\b)\s*/\s*(\d+\b|[A-Za-z]\b)",
        ["${2}分之${1}", "${1} over ${2}", "${1} sobre ${2}", "${2}分の${1}", "${1} sur ${2}"],
    ),
    (r"×|·|\*", ["乘以", " times ", " por ", "かける", " fois "]),
    (r"÷", ["除以", " divided by ", " dividido entre ", "割る", " divisé par "]),
    (
        r"≤|<=",
        ["小于等于", " is less than or equal to ", " es menor o igual que ", "以下", " est inférieur ou égal à "],
    ),
    (
        r"≥|>=",
        ["大于等于", " is greater than or equal to ", " es mayor o igual que ", "以上", " est supérieur ou égal à "],
    ),
    (r"≠|!=", ["不等于", " is not equal to ", " no es igual a ", "ノットイコール", " est différent de "]),
    (r"≈", ["约等于", " is approximately ", " es aproximadamente ", "ニアリーイコール", " vaut environ "]),
    (r"±", ["正负", " plus or minus ", " más o menos ", "プラスマイナス", " plus ou moins "]),
    (r"<", ["小于", " is less than ", " es menor que ", "小なり", " est inférieur à "]),
    (r">", ["大于", " is greater than ", " es mayor que ", "大なり", " est supérieur à "]),
    (r"=", ["等于", " equals ", " es igual a ", "イコール", " égale "]),
    (r"\+", ["加", " plus ", " más ", "たす", " plus "]),
    // 减号只认数字和单字母操作数，"step-by-step" 这类连字符保持原样
    (
        r"(\b\d+(?:\.\d+)?|\b[A-Za-z]\b|\))\s*[-−]\s*(\d|[A-Za-z]\b|\()",
        ["${1}减${2}", "${1} minus ${2}", "${1} menos ${2}", "${1}ひく${2}", "${1} moins ${2}"],
    ),
    // 剩下的是一元负号：行首、空白、括号或等号之后
    (
        r"(^|[\s(（=])[-−]\s*(\d)",
        ["${1}负${2}", "${1}negative ${2}", "${1}menos ${2}", "${1}マイナス${2}", "${1}moins ${2}"],
    ),
    (r"°", ["度", " degrees", " grados", "度", " degrés"]),
];

/// 希腊字母读法
static GREEK: phf::Map<char, Spoken> = phf_map! {
    'π' => ["派", " pi ", " pi ", "パイ", " pi "],
    'θ' => ["西塔", " theta ", " theta ", "シータ", " thêta "],
    'α' => ["阿尔法", " alpha ", " alfa ", "アルファ", " alpha "],
    'β' => ["贝塔", " beta ", " beta ", "ベータ", " bêta "],
    'λ' => ["兰姆达", " lambda ", " lambda ", "ラムダ", " lambda "],
};

static COMPILED_RULES: Lazy<Vec<(Regex, Spoken)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(pattern, spoken)| (Regex::new(pattern).unwrap(), *spoken))
        .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([,.;:!?])").unwrap());
static SENTENCE_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(\s|$)").unwrap());

fn slot(language: Language) -> usize {
    Language::ALL
        .iter()
        .position(|l| *l == language)
        .unwrap_or_default()
}

/// 把文本中的数学符号改写为口语
pub fn speak_math(text: &str, language: Language) -> String {
    let slot = slot(language);
    let mut out = text.to_string();

    for (pattern, spoken) in COMPILED_RULES.iter() {
        // 连续减法 "a-b-c" 需要两遍才能全部替换
        for _ in 0..2 {
            let next = pattern.replace_all(&out, spoken[slot]).into_owned();
            if next == out {
                break;
            }
            out = next;
        }
    }

    out = out
        .chars()
        .map(|c| match GREEK.get(&c) {
            Some(spoken) => spoken[slot].to_string(),
            None => c.to_string(),
        })
        .collect();

    normalize_punctuation(&out, language)
}

/// 统一标点：中日文使用全角标点，其余语言使用半角标点
pub fn normalize_punctuation(text: &str, language: Language) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ").into_owned();

    if language.is_cjk() {
        let full_width = SENTENCE_DOT.replace_all(&collapsed, "。").into_owned();
        full_width
            .replace(", ", "，")
            .replace(',', "，")
            .replace(": ", "：")
            .replace(':', "：")
            .replace("; ", "；")
            .replace(';', "；")
            .replace('?', "？")
            .replace('!', "！")
    } else {
        let half_width = collapsed
            .replace('，', ", ")
            .replace('。', ". ")
            .replace('：', ": ")
            .replace('；', "; ")
            .replace('？', "? ")
            .replace('！', "! ");
        let half_width = WHITESPACE.replace_all(half_width.trim(), " ").into_owned();
        SPACE_BEFORE_PUNCT.replace_all(&half_width, "$1").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_equation() {
        assert_eq!(speak_math("3x + 5 = 17", Language::En), "3 x plus 5 equals 17");
    }

    #[test]
    fn test_chinese_equation() {
        assert_eq!(speak_math("3x + 5 = 17", Language::Zh), "3x 加 5 等于 17");
    }

    #[test]
    fn test_fraction_reading() {
        assert_eq!(speak_math("1/3", Language::Zh), "3分之1");
        assert_eq!(speak_math("1/3", Language::En), "1 over 3");
        assert_eq!(speak_math("1/3", Language::Fr), "1 sur 3");
    }

    #[test]
    fn test_powers_and_roots() {
        assert_eq!(speak_math("x^2", Language::En), "x squared");
        assert_eq!(speak_math("x²", Language::Zh), "x的平方");
        assert_eq!(speak_math("2^n", Language::En), "2 to the power of n");
        assert_eq!(speak_math("√9 = 3", Language::En), "the square root of 9 equals 3");
    }

    #[test]
    fn test_power_exponent_stops_at_cjk() {
        assert_eq!(speak_math("2^n的值", Language::Zh), "2的n次方的值");
        assert_eq!(speak_math("x^{10}", Language::En), "x to the power of 10");
    }

    #[test]
    fn test_minus_forms() {
        assert_eq!(speak_math("x = -2", Language::En), "x equals negative 2");
        assert_eq!(speak_math("a-b-c", Language::En), "a minus b minus c");
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(speak_math("x <= 4", Language::En), "x is less than or equal to 4");
        assert_eq!(speak_math("x > 72", Language::Es), "x es mayor que 72");
    }

    #[test]
    fn test_greek_letters() {
        assert_eq!(speak_math("2π", Language::En), "2 pi");
    }

    #[test]
    fn test_punctuation_normalization() {
        assert_eq!(normalize_punctuation("第1步, 移项.", Language::Zh), "第1步，移项。");
        assert_eq!(normalize_punctuation("Step 1：move。", Language::En), "Step 1: move.");
        // 小数点不受影响
        assert_eq!(normalize_punctuation("x = 2.5", Language::Zh), "x = 2.5");
    }
}
