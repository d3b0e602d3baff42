use serde::{Deserialize, Serialize};
use std::fmt;

/// 场景布局策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SceneStrategy {
    Full,
    Simplified,
    UltraSimplified,
    /// 理论题的概念讲解
    Concept,
}

impl SceneStrategy {
    pub fn name(self) -> &'static str {
        match self {
            SceneStrategy::Full => "full",
            SceneStrategy::Simplified => "simplified",
            SceneStrategy::UltraSimplified => "ultraSimplified",
            SceneStrategy::Concept => "concept",
        }
    }
}

impl fmt::Display for SceneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 交给外部渲染器的场景程序
///
/// 生成后只写不读，本 crate 不会再解析 `source`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneProgram {
    /// Python 源码
    pub source: String,
    /// 渲染时需要指定的场景类名
    pub scene_name: String,
    /// 预估时长（秒），始终大于 0
    pub estimated_duration_seconds: f64,
    /// 选用的布局策略
    pub strategy: SceneStrategy,
    /// 是否因构建失败而退回最小程序
    pub fallback_used: bool,
}
