use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::language::Language;

/// 一道待编译的题目（来自 TOML 文件）
///
/// ```toml
/// id = "linear-01"
/// language = "en"
/// question = "Solve: 3x + 5 = 17"
/// solution = """
/// 1. Subtract 5 from both sides: 3x = 12
/// 2. Divide by 3: x = 4
/// """
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInput {
    /// 题目标识，同时作为输出文件名（见 [`validate_problem_id`]）
    #[serde(default)]
    pub id: String,
    pub question: String,
    /// 模型给出的自由文本解答
    pub solution: String,
    /// 语言标签，缺省时使用配置中的默认语言
    #[serde(default)]
    pub language: Option<String>,
    /// 源文件路径（加载时填充）
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl ProblemInput {
    pub fn new(id: impl Into<String>, question: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            solution: solution.into(),
            language: None,
            file_path: None,
        }
    }

    pub fn with_language(mut self, tag: impl Into<String>) -> Self {
        self.language = Some(tag.into());
        self
    }

    /// 解析语言，未指定时使用默认值
    pub fn resolve_language(&self, default: Language) -> Language {
        match &self.language {
            Some(tag) if !tag.trim().is_empty() => Language::find(tag),
            _ => default,
        }
    }
}

/// 校验题目标识可以安全地用作输出目录下的文件名
///
/// 不允许为空，不允许包含路径分隔符、`..` 或控制字符。
pub fn validate_problem_id(id: &str) -> AppResult<()> {
    let reason = if id.trim().is_empty() {
        "不能为空"
    } else if id.contains('/') || id.contains('\\') {
        "不能包含路径分隔符"
    } else if id.contains("..") {
        "不能包含 .."
    } else if id.chars().any(char::is_control) {
        "不能包含控制字符"
    } else {
        return Ok(());
    };
    Err(AppError::invalid_problem_id(id, reason))
}
