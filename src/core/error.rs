//! 错误类型
//!
//! - SignatureError：工具签名无法反射（注册阶段快速失败）
//! - MergeError：流式增量合并时的结构性冲突（索引非法、类型不一致）
//! - SwarmError：对外统一错误，供注册表 / 执行器 / 流式累积使用

use thiserror::Error;

/// 工具签名反射失败：注册时直接返回，不允许带病注册
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Tool name is empty")]
    EmptyName,

    #[error("Duplicate parameter '{param}' in signature of {tool}")]
    DuplicateParameter { tool: String, param: String },

    /// 参数根 Schema 不是带 properties 的对象（无法内省出参数表）
    #[error("Failed to get signature for function {0}: parameters are not an object")]
    NotAnObject(String),

    #[error("Failed to get signature for function {tool}: {reason}")]
    Opaque { tool: String, reason: String },
}

/// 增量合并失败；返回错误时累积文档保持调用前的状态
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Delta is not a JSON object")]
    NotAnObject,

    #[error("Tool call fragment has no index")]
    MissingIndex,

    #[error("Negative tool call index: {0}")]
    NegativeIndex(i64),

    #[error("Tool call index is not an integer: {0}")]
    InvalidIndex(String),

    #[error("Tool call index {index} exceeds slot limit {limit}")]
    IndexOutOfRange { index: u64, limit: usize },

    #[error("Tool call fragment is not a JSON object")]
    InvalidToolCall,

    #[error("Accumulator field '{0}' is not a sequence")]
    NotASequence(String),

    /// 增量与累积文档在同一路径上的类型不一致（如向对象追加字符串）
    #[error("Type mismatch at '{path}': cannot merge {delta} into {target}")]
    TypeMismatch {
        path: String,
        target: &'static str,
        delta: &'static str,
    },
}

/// 工具层与流式层的统一错误
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
