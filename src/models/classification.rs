use serde::{Deserialize, Serialize};
use std::fmt;

/// 问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// 具体计算题
    ConcreteProblem,
    /// 概念/原理类问题
    TheoreticalQuestion,
    /// 两者兼有
    Mixed,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::ConcreteProblem => "具体问题",
            Category::TheoreticalQuestion => "理论问题",
            Category::Mixed => "混合问题",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 复杂度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    Simple,
    Complex,
}

/// 呈现形式：纯文字或带数学符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationFormat {
    Plain,
    Symbolic,
}

/// 分类结果
///
/// 每个请求只生成一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: Category,
    /// 置信度，范围 [0, 1]
    pub confidence: f64,
    /// 判定依据（用于日志和排查）
    pub rationale: String,
    pub complexity: Complexity,
    pub presentation_format: PresentationFormat,
}

impl Classification {
    pub fn is_concrete(&self) -> bool {
        self.category == Category::ConcreteProblem
    }

    pub fn is_theoretical(&self) -> bool {
        self.category == Category::TheoreticalQuestion
    }
}
