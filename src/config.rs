//! 配置
//!
//! - `Config`：运行参数，来自环境变量（带默认值）
//! - `CompilerTables`：编译管线的全部可调参数表（语速、时长下限、阈值、布局几何），
//!   可以从 TOML 文件覆盖，缺省字段使用内置默认值

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::Language;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时编译的题目数量
    pub max_concurrent_jobs: usize,
    /// 题目 TOML 文件存放目录
    pub input_folder: String,
    /// 编译产物输出目录
    pub output_folder: String,
    /// 题目未指定语言时使用的默认语言
    pub default_language: Language,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 参数表 TOML 文件（可选）
    pub tables_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 8,
            input_folder: "input_toml".to_string(),
            output_folder: "output".to_string(),
            default_language: Language::Zh,
            verbose_logging: false,
            output_log_file: "compile_log.txt".to_string(),
            tables_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_jobs),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            default_language: std::env::var("DEFAULT_LANGUAGE").map(|v| Language::find(&v)).unwrap_or(default.default_language),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            tables_file: std::env::var("COMPILER_TABLES_FILE").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_jobs == 0 {
            return Err(AppError::invalid_config(
                "MAX_CONCURRENT_JOBS",
                self.max_concurrent_jobs,
                "并发数必须大于 0",
            ));
        }
        if self.input_folder.trim().is_empty() {
            return Err(AppError::invalid_config("INPUT_FOLDER", "", "输入目录不能为空"));
        }
        Ok(())
    }
}

// ========== 编译参数表 ==========

/// 单个语言的语速参数（字符/秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanguageRates {
    /// 步骤页阅读速度
    pub step_chars_per_second: f64,
    /// 概念页阅读速度（通常更慢）
    pub concept_chars_per_second: f64,
    /// 旁白朗读速度
    pub narration_chars_per_second: f64,
}

/// 各类页面的最短时长（秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFloors {
    pub intro: f64,
    pub step: f64,
    pub verification: f64,
    pub concept_intro: f64,
    pub concept: f64,
    pub example: f64,
    pub summary: f64,
}

impl Default for PageFloors {
    fn default() -> Self {
        Self {
            intro: 5.0,
            step: 5.0,
            verification: 6.0,
            concept_intro: 8.0,
            concept: 8.0,
            example: 12.0,
            summary: 8.0,
        }
    }
}

/// 场景策略阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneThresholds {
    /// 输入总字符数超过该值时使用简化布局
    pub medium_chars: usize,
    /// 输入总字符数超过该值时使用极简布局
    pub high_chars: usize,
    pub medium_steps: usize,
    pub high_steps: usize,
    /// 小输入时是否使用完整布局（默认使用极简布局）
    pub prefer_full_layout: bool,
    pub full_max_steps: usize,
    pub simplified_max_steps: usize,
    pub ultra_max_steps: usize,
    /// 每个步骤最多展示的表达式数
    pub max_expressions_per_step: usize,
    /// 可嵌入的表达式最大长度
    pub max_expression_chars: usize,
    /// 字幕区标签最大长度
    pub subtitle_label_chars: usize,
    /// 步骤间最短停顿（秒），其余时长按预算均摊
    pub min_step_wait: f64,
}

impl Default for SceneThresholds {
    fn default() -> Self {
        Self {
            medium_chars: 600,
            high_chars: 1500,
            medium_steps: 5,
            high_steps: 8,
            prefer_full_layout: false,
            full_max_steps: 12,
            simplified_max_steps: 6,
            ultra_max_steps: 4,
            max_expressions_per_step: 2,
            max_expression_chars: 120,
            subtitle_label_chars: 40,
            min_step_wait: 1.0,
        }
    }
}

/// 瀑布布局几何参数（渲染器坐标系，画面高度 8 个单位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGeometry {
    /// 标题下边界，超过此线的内容块会被移除
    pub title_boundary: f64,
    /// 可视区域下边界（字幕区上方）
    pub visible_bottom: f64,
    /// 内容块左对齐位置
    pub left_edge: f64,
    /// 内容块之间的间距
    pub margin: f64,
    /// 单行文字高度
    pub text_line_height: f64,
    /// 公式块高度
    pub math_height: f64,
    /// 每行可容纳的字符数（西文）
    pub chars_per_line: usize,
    /// 每行可容纳的字符数（中日文）
    pub cjk_chars_per_line: usize,
    /// 内容块最大宽度
    pub max_block_width: f64,
    /// 字幕区纵坐标
    pub subtitle_y: f64,
    /// 右侧几何示意图的宽度
    pub graphic_width: f64,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self {
            title_boundary: 2.8,
            visible_bottom: -2.6,
            left_edge: -6.2,
            margin: 0.25,
            text_line_height: 0.5,
            math_height: 0.8,
            chars_per_line: 48,
            cjk_chars_per_line: 24,
            max_block_width: 12.0,
            subtitle_y: -3.4,
            graphic_width: 4.5,
        }
    }
}

/// 步骤提取参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    /// 去重指纹长度（字符）
    pub fingerprint_len: usize,
    /// 兜底切块的最大数量
    pub max_fallback_chunks: usize,
    /// 单次最多保留的步骤数
    pub max_steps: usize,
    /// 有效步骤的最短字符数
    pub min_step_chars: usize,
    /// 每个步骤最多保留的表达式数
    pub max_expressions_per_step: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            fingerprint_len: 50,
            max_fallback_chunks: 6,
            max_steps: 20,
            min_step_chars: 4,
            max_expressions_per_step: 4,
        }
    }
}

/// 编译管线参数表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerTables {
    /// 按语言标签索引的语速
    pub rates: HashMap<String, LanguageRates>,
    pub pages: PageFloors,
    pub scene: SceneThresholds,
    pub layout: LayoutGeometry,
    pub extraction: ExtractionLimits,
    /// 清洗后文本的最大长度
    pub sanitizer_max_len: usize,
    /// 时长一致性容差（相对值）
    pub duration_tolerance: f64,
}

impl Default for CompilerTables {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            pages: PageFloors::default(),
            scene: SceneThresholds::default(),
            layout: LayoutGeometry::default(),
            extraction: ExtractionLimits::default(),
            sanitizer_max_len: 600,
            duration_tolerance: 0.25,
        }
    }
}

fn default_rates() -> HashMap<String, LanguageRates> {
    let entry = |step, concept, narration| LanguageRates {
        step_chars_per_second: step,
        concept_chars_per_second: concept,
        narration_chars_per_second: narration,
    };
    HashMap::from([
        ("zh".to_string(), entry(3.5, 3.2, 4.0)),
        ("en".to_string(), entry(15.0, 12.0, 14.0)),
        ("es".to_string(), entry(14.0, 11.0, 13.0)),
        ("ja".to_string(), entry(4.0, 3.6, 4.5)),
        ("fr".to_string(), entry(14.0, 11.0, 13.0)),
    ])
}

impl CompilerTables {
    /// 从 TOML 文件加载参数表，文件中未出现的字段使用默认值
    ///
    /// `rates` 只覆盖文件中列出的语言。
    pub async fn load(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let mut tables: CompilerTables = toml::from_str(&content)
            .map_err(|e| AppError::toml_parse_failed(path.display().to_string(), e))?;

        for (tag, rates) in default_rates() {
            tables.rates.entry(tag).or_insert(rates);
        }
        tables.validate()?;
        Ok(tables)
    }

    /// 获取某个语言的语速，缺失时回退到英语
    pub fn rates_for(&self, language: Language) -> LanguageRates {
        self.rates
            .get(language.tag())
            .or_else(|| self.rates.get(Language::En.tag()))
            .copied()
            .unwrap_or(LanguageRates {
                step_chars_per_second: 15.0,
                concept_chars_per_second: 12.0,
                narration_chars_per_second: 14.0,
            })
    }

    /// 检查参数表是否自洽
    pub fn validate(&self) -> AppResult<()> {
        for (tag, rates) in &self.rates {
            if rates.step_chars_per_second <= 0.0
                || rates.concept_chars_per_second <= 0.0
                || rates.narration_chars_per_second <= 0.0
            {
                return Err(AppError::invalid_tables(format!("{} 的语速必须大于 0", tag)));
            }
        }

        let floors = &self.pages;
        let all_floors = [
            floors.intro,
            floors.step,
            floors.verification,
            floors.concept_intro,
            floors.concept,
            floors.example,
            floors.summary,
        ];
        if all_floors.iter().any(|f| *f <= 0.0) {
            return Err(AppError::invalid_tables("页面时长下限必须大于 0"));
        }

        if self.scene.medium_chars > self.scene.high_chars
            || self.scene.medium_steps > self.scene.high_steps
        {
            return Err(AppError::invalid_tables("场景阈值 medium 不能大于 high"));
        }
        if self.scene.min_step_wait < 0.0 {
            return Err(AppError::invalid_tables("min_step_wait 不能为负数"));
        }

        if self.layout.visible_bottom >= self.layout.title_boundary {
            return Err(AppError::invalid_tables("可视区域下边界必须低于标题边界"));
        }
        if self.layout.text_line_height <= 0.0 || self.layout.math_height <= 0.0 {
            return Err(AppError::invalid_tables("内容块高度必须大于 0"));
        }
        if self.layout.graphic_width < 0.0 || self.layout.graphic_width >= self.layout.max_block_width {
            return Err(AppError::invalid_tables("示意图宽度必须小于内容块最大宽度"));
        }

        if self.extraction.fingerprint_len == 0 || self.extraction.max_fallback_chunks == 0 {
            return Err(AppError::invalid_tables("提取参数必须大于 0"));
        }
        if self.sanitizer_max_len < 8 {
            return Err(AppError::invalid_tables("sanitizer_max_len 过小"));
        }
        if self.duration_tolerance < 0.0 {
            return Err(AppError::invalid_tables("duration_tolerance 不能为负"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        let tables = CompilerTables::default();
        assert!(tables.validate().is_ok());
        for lang in Language::ALL {
            assert!(tables.rates_for(lang).step_chars_per_second > 0.0);
        }
    }

    #[test]
    fn test_rates_fall_back_to_english() {
        let mut tables = CompilerTables::default();
        tables.rates.remove("fr");
        assert_eq!(tables.rates_for(Language::Fr), tables.rates_for(Language::En));
    }

    #[tokio::test]
    async fn test_load_partial_tables_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        std::fs::write(
            &path,
            "duration_tolerance = 0.5\n\n[scene]\nprefer_full_layout = true\n\n[rates.zh]\nstep_chars_per_second = 5.0\nconcept_chars_per_second = 4.0\nnarration_chars_per_second = 5.0\n",
        )
        .unwrap();

        let tables = CompilerTables::load(&path).await.unwrap();
        assert_eq!(tables.duration_tolerance, 0.5);
        assert!(tables.scene.prefer_full_layout);
        assert_eq!(tables.scene.high_chars, 1500);
        assert_eq!(tables.rates_for(Language::Zh).step_chars_per_second, 5.0);
        assert_eq!(tables.rates_for(Language::En).step_chars_per_second, 15.0);
    }

    #[tokio::test]
    async fn test_load_rejects_zero_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        std::fs::write(
            &path,
            "[rates.en]\nstep_chars_per_second = 0.0\nconcept_chars_per_second = 1.0\nnarration_chars_per_second = 1.0\n",
        )
        .unwrap();

        assert!(CompilerTables::load(&path).await.is_err());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());
    }
}
