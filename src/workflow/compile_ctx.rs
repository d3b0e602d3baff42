//! 编译上下文
//!
//! 封装"我正在编译第几个任务、哪道题、用什么语言"这一信息

use crate::models::Language;
use std::fmt::Display;

/// 单道题的编译上下文
#[derive(Debug, Clone)]
pub struct CompileCtx {
    /// 任务序号（仅用于日志显示，从 1 开始）
    pub job_index: usize,

    /// 题目标识
    pub problem_id: String,

    /// 讲解语言
    pub language: Language,
}

impl CompileCtx {
    /// 创建新的编译上下文
    pub fn new(job_index: usize, problem_id: impl Into<String>, language: Language) -> Self {
        Self {
            job_index,
            problem_id: problem_id.into(),
            language,
        }
    }
}

impl Display for CompileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} 题目 {} 语言 {}]",
            self.job_index, self.problem_id, self.language
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = CompileCtx::new(3, "linear-01", Language::Zh);
        assert_eq!(ctx.to_string(), "[任务 3 题目 linear-01 语言 zh]");
    }
}
