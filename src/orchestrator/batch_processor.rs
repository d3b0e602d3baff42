//! 批量题目编译器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量题目的编译和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、启动日志、加载参数表、创建产物接收方
//! 2. **批量加载**：扫描并加载所有待编译的题目（`Vec<ProblemInput>`），重复标识的题目记为失败
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将题目分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有题目的编译结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单道题的细节
//! - **共享流程**：`CompileFlow` 无可变状态，通过 Arc 在任务间共享
//! - **向下委托**：编译交给 workflow，落盘交给 `ArtifactSink`

use crate::config::{CompilerTables, Config};
use crate::error::{AppError, FileError};
use crate::models::{load_all_problems, ProblemInput};
use crate::services::{ArtifactSink, DiskSink};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_plan, log_startup, log_summary, RunLog,
};
use crate::workflow::{CompileCtx, CompileFlow};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<S: ArtifactSink = DiskSink> {
    config: Config,
    flow: Arc<CompileFlow>,
    sink: Arc<S>,
    run_log: RunLog,
}

impl App<DiskSink> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 新建结果日志文件
        let run_log = RunLog::create(&config.output_log_file)?;
        log_startup(config.max_concurrent_jobs);

        let tables = match &config.tables_file {
            Some(path) => {
                info!("📋 加载参数表: {}", path);
                CompilerTables::load(Path::new(path)).await?
            }
            None => CompilerTables::default(),
        };

        let sink = DiskSink::new(&config.output_folder);
        Ok(Self::with_sink(config, &tables, sink).with_run_log(run_log))
    }
}

impl<S: ArtifactSink> App<S> {
    /// 使用指定的产物接收方创建应用（结果追加到已有日志文件，不写文件头）
    pub fn with_sink(config: Config, tables: &CompilerTables, sink: S) -> Self {
        let flow = CompileFlow::new(tables).with_verbose_logging(config.verbose_logging);
        let run_log = RunLog::append_to(&config.output_log_file);
        Self {
            config,
            flow: Arc::new(flow),
            sink: Arc::new(sink),
            run_log,
        }
    }

    fn with_run_log(mut self, run_log: RunLog) -> Self {
        self.run_log = run_log;
        self
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        if !Path::new(&self.config.input_folder).is_dir() {
            return Err(AppError::File(FileError::DirectoryNotFound {
                path: self.config.input_folder.clone(),
            })
            .into());
        }

        // 加载所有待编译的题目
        let all_problems = self.load_problems().await?;

        if all_problems.is_empty() {
            warn!("⚠️ 没有找到待编译的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_plan(all_problems.len(), self.config.max_concurrent_jobs);

        // 标识决定输出文件名，重复的题目会互相覆盖产物
        let (unique, duplicates) = split_duplicate_ids(all_problems);
        for (problem, first_path) in &duplicates {
            let line = format!(
                "❌ 题目 {} 标识重复: {} 与 {} 相同，已跳过",
                problem.id,
                problem.file_path.as_deref().unwrap_or("<memory>"),
                first_path.as_deref().unwrap_or("<memory>")
            );
            warn!("⚠️ {}", line);
            self.record(&line);
        }

        let mut stats = self.process_all(unique).await?;
        stats.total += duplicates.len();
        stats.failed += duplicates.len();

        log_summary(
            stats.success,
            stats.failed,
            stats.fallback,
            stats.total,
            &self.run_log,
        );

        Ok(stats)
    }

    /// 加载题目
    async fn load_problems(&self) -> Result<Vec<ProblemInput>> {
        info!("\n📁 正在扫描待编译的题目...");
        load_all_problems(&self.config.input_folder).await
    }

    /// 处理所有题目
    async fn process_all(&self, all_problems: Vec<ProblemInput>) -> Result<ProcessingStats> {
        let per_batch = self.config.max_concurrent_jobs;
        let semaphore = Arc::new(Semaphore::new(per_batch));
        let total = all_problems.len();
        let total_batches = total.div_ceil(per_batch);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total).step_by(per_batch) {
            let batch_end = (batch_start + per_batch).min(total);
            let batch_num = batch_start / per_batch + 1;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let batch_result = self
                .process_batch(&all_problems[batch_start..batch_end], batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
            stats.fallback += batch_result.fallback;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[ProblemInput],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        // 为本批创建并发任务
        for (idx, problem) in batch.iter().enumerate() {
            let job_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let language = problem.resolve_language(self.config.default_language);
            let ctx = CompileCtx::new(job_index, problem.id.clone(), language);

            let flow = self.flow.clone();
            let sink = self.sink.clone();
            let problem = problem.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                compile_one(flow, sink, problem, ctx).await
            });
            handles.push((job_index, batch[idx].id.clone(), handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (job_index, problem_id, handle) in handles {
            let line = match handle.await {
                Ok(JobOutcome::Compiled { fallback, output }) => {
                    result.success += 1;
                    if fallback {
                        result.fallback += 1;
                    }
                    format!(
                        "✓ 任务 {} 题目 {} -> {}{}",
                        job_index,
                        problem_id,
                        output,
                        if fallback { " (兜底场景)" } else { "" }
                    )
                }
                Ok(JobOutcome::Failed(reason)) => {
                    result.failed += 1;
                    format!("❌ 任务 {} 题目 {} 失败: {}", job_index, problem_id, reason)
                }
                Err(e) => {
                    error!("[任务 {}] 任务执行失败: {}", job_index, e);
                    result.failed += 1;
                    format!("❌ 任务 {} 题目 {} 执行失败: {}", job_index, problem_id, e)
                }
            };

            self.record(&line);
        }

        Ok(result)
    }

    /// 结果写入日志文件，失败只告警
    fn record(&self, line: &str) {
        if let Err(e) = self.run_log.append(line) {
            warn!("⚠️ 写入日志文件失败: {:#}", e);
        }
    }
}

/// 按标识去重，保留最先加载的题目
///
/// 返回保留的题目，以及被跳过的题目和与其冲突的首个文件路径。
fn split_duplicate_ids(
    problems: Vec<ProblemInput>,
) -> (Vec<ProblemInput>, Vec<(ProblemInput, Option<String>)>) {
    let mut seen: HashMap<String, Option<String>> = HashMap::new();
    let mut unique = Vec::with_capacity(problems.len());
    let mut duplicates = Vec::new();

    for problem in problems {
        match seen.get(&problem.id) {
            Some(first_path) => {
                let first_path = first_path.clone();
                duplicates.push((problem, first_path));
            }
            None => {
                seen.insert(problem.id.clone(), problem.file_path.clone());
                unique.push(problem);
            }
        }
    }
    (unique, duplicates)
}

/// 编译并交付一道题
async fn compile_one<S: ArtifactSink>(
    flow: Arc<CompileFlow>,
    sink: Arc<S>,
    problem: ProblemInput,
    ctx: CompileCtx,
) -> JobOutcome {
    let compile_ctx = ctx.clone();
    let bundle = match tokio::task::spawn_blocking(move || flow.run(&problem, &compile_ctx)).await
    {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("{} ❌ 编译任务异常退出: {}", ctx, e);
            return JobOutcome::Failed(e.to_string());
        }
    };

    match sink.deliver(&bundle).await {
        Ok(rendered) => {
            let output = rendered.output_path.unwrap_or_default();
            info!("{} ✅ 产物已输出: {}", ctx, output);
            JobOutcome::Compiled {
                fallback: bundle.scene.fallback_used,
                output,
            }
        }
        Err(e) => {
            error!("{} ❌ 产物输出失败: {}", ctx, e);
            JobOutcome::Failed(e.to_string())
        }
    }
}

/// 单道题的结果
enum JobOutcome {
    Compiled { fallback: bool, output: String },
    Failed(String),
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    /// 成功的题目中使用了兜底场景程序的数量
    pub fallback: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    fallback: usize,
}
