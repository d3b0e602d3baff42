use serde::{Deserialize, Serialize};

/// 无法提取步骤时使用的占位文本
pub const SENTINEL_BODY: &str = "[无法从响应中提取有效步骤，请检查AI响应格式]";

/// 单个解题步骤
///
/// `body` 与 `expressions` 均为清洗后的内容。
/// 同一列表中 `ordinal` 唯一且严格递增。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 步骤序号（从 1 开始）
    pub ordinal: u32,
    /// 步骤标题，可能为空
    pub title: String,
    /// 步骤正文
    pub body: String,
    /// 从正文中提取出的数学表达式
    pub expressions: Vec<String>,
}

impl Step {
    pub fn new(ordinal: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            ordinal,
            title: title.into(),
            body: body.into(),
            expressions: Vec::new(),
        }
    }

    /// 提取失败时的占位步骤
    pub fn sentinel() -> Self {
        Self::new(1, "", SENTINEL_BODY)
    }

    pub fn is_sentinel(&self) -> bool {
        self.body == SENTINEL_BODY
    }

    /// 标题优先，没有标题时使用正文
    pub fn headline(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.body
        } else {
            &self.title
        }
    }

    /// 标题与正文拼接后的完整文本
    pub fn full_text(&self) -> String {
        match (self.title.trim().is_empty(), self.body.trim().is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => self.title.clone(),
            (false, false) => format!("{}: {}", self.title, self.body),
        }
    }
}

/// 步骤提取的匹配层级（按尝试顺序排列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionTier {
    /// 编号 + 加粗标题，正文可跨行
    Titled,
    /// 编号开头的多行条目
    Multiline,
    /// 行内编号（例如 `1）… 2）…`）
    Inline,
}

/// 步骤最终来自哪一条提取路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "tier")]
pub enum ExtractionSource {
    /// 在"解题步骤"等标注段落中匹配成功
    LabeledSection(ExtractionTier),
    /// 在全文中匹配成功
    Document(ExtractionTier),
    /// 按段落/句子切块
    Chunks,
    /// 什么都没提取到
    Sentinel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel() {
        let step = Step::sentinel();
        assert!(step.is_sentinel());
        assert_eq!(step.ordinal, 1);
        assert!(!Step::new(1, "", "x = 3").is_sentinel());
    }

    #[test]
    fn test_full_text() {
        assert_eq!(Step::new(1, "移项", "3x = 12").full_text(), "移项: 3x = 12");
        assert_eq!(Step::new(1, "", "3x = 12").full_text(), "3x = 12");
        assert_eq!(Step::new(1, "移项", "").full_text(), "移项");
    }
}
