//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量题目编译器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载题目（Vec<ProblemInput>）
//! - 控制并发数量（Semaphore）
//! - 把编译产物交给 `ArtifactSink`
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ProblemInput>)
//!     ↓
//! workflow::CompileFlow (处理单道题)
//!     ↓
//! services (能力层：分类 / 提取 / 分页 / 场景 / 旁白 / 字幕 / 输出)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → models
//! 2. **无业务逻辑**：只做调度和统计，不做具体编译判断

pub mod batch_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
