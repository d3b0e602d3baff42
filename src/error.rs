use thiserror::Error;

/// 应用程序错误类型
///
/// 只有不可恢复的问题才会以此类型向上传播，
/// 编译管线内部的失败（分类不确定、步骤为空、场景生成失败）都在各自阶段兜底。
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 场景程序生成错误
    #[error("编译错误: {0}")]
    Compile(#[from] CompileError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 题目标识不能用作输出文件名
    #[error("题目标识不合法 '{id}': {reason}")]
    InvalidProblemId { id: String, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值不合法
    #[error("配置项 {name} 的值 '{value}' 不合法: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    /// 参数表内容不合法
    #[error("参数表无效: {reason}")]
    InvalidTables { reason: String },
}

/// 场景程序构建错误
///
/// 由各个 `SceneBuilder` 返回，`SceneCompiler` 捕获后切换到最小安全程序。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 没有任何可布局的内容块
    #[error("没有可布局的内容")]
    EmptyLayout,
    /// 构建器内部失败
    #[error("构建器 {builder} 失败: {reason}")]
    BuilderFailed { builder: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON序列化失败: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 TOML 解析错误（带路径）
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建题目标识不合法错误
    pub fn invalid_problem_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::File(FileError::InvalidProblemId {
            id: id.into(),
            reason: reason.into(),
        })
    }

    /// 创建配置项不合法错误
    pub fn invalid_config(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    /// 创建参数表无效错误
    pub fn invalid_tables(reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidTables {
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
