//! # Solution Compiler
//!
//! 把一道数学题的题干和解答文本编译成讲解视频所需的全部产物：
//! 分页脚本、动画场景程序、旁白稿、字幕，以及时长一致性报告。
//!
//! ## 架构设计
//!
//! 本系统采用三层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理一道题
//! - `Classifier` - 题目分类（具体题 / 理论题 / 混合）
//! - `StepExtractor` - 多级步骤提取
//! - `ContentSanitizer` - 文本清洗
//! - `PageScriptBuilder` - 分页脚本
//! - `SceneCompiler` - 场景程序生成（带兜底）
//! - `NarrationBuilder` - 旁白稿
//! - `SubtitleBuilder` - 字幕
//! - `ArtifactSink` - 产物输出
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整编译流程
//! - `CompileCtx` - 上下文封装（任务序号 + 题目标识 + 语言）
//! - `CompileFlow` - 流程编排（分类 → 提取 → 分页/旁白 → 场景 → 字幕）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量题目编译器，管理并发和统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{CompilerTables, Config};
pub use error::{AppError, AppResult};
pub use models::{CompilationBundle, Language, ProblemInput};
pub use orchestrator::{App, ProcessingStats};
pub use workflow::{CompileCtx, CompileFlow};
