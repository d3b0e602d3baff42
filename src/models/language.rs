use serde::{Deserialize, Serialize};
use std::fmt;

/// 讲解语言枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// 中文
    #[default]
    Zh,
    /// 英语
    En,
    /// 西班牙语
    Es,
    /// 日语
    Ja,
    /// 法语
    Fr,
}

impl Language {
    /// 全部支持的语言
    pub const ALL: [Language; 5] = [
        Language::Zh,
        Language::En,
        Language::Es,
        Language::Ja,
        Language::Fr,
    ];

    /// 获取语言标签
    pub fn tag(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
            Language::Es => "es",
            Language::Ja => "ja",
            Language::Fr => "fr",
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Language::Zh => "中文",
            Language::En => "英语",
            Language::Es => "西班牙语",
            Language::Ja => "日语",
            Language::Fr => "法语",
        }
    }

    /// 尝试从标签解析语言（精确匹配）
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "zh" | "zh-CN" | "zh-cn" | "chinese" => Some(Language::Zh),
            "en" | "en-US" | "en-us" | "english" => Some(Language::En),
            "es" | "es-ES" | "es-es" | "spanish" => Some(Language::Es),
            "ja" | "ja-JP" | "ja-jp" | "japanese" => Some(Language::Ja),
            "fr" | "fr-FR" | "fr-fr" | "french" => Some(Language::Fr),
            _ => None,
        }
    }

    /// 查找语言，未知标签回退为英语
    pub fn find(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        if let Some(lang) = Self::from_tag(&lower) {
            return lang;
        }

        // 只看主标签，例如 "zh-Hant" -> "zh"
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        Self::from_tag(primary).unwrap_or(Language::En)
    }

    /// 是否为中日文（影响字体与标点）
    pub fn is_cjk(self) -> bool {
        matches!(self, Language::Zh | Language::Ja)
    }

    /// 场景程序使用的字体
    pub fn font(self) -> &'static str {
        if self.is_cjk() {
            "SimHei"
        } else {
            "Arial"
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
