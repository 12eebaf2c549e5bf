//! Bee Swarm - 多智能体编排的工具层
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型（签名反射 / 增量合并 / 执行）
//! - **observability**: tracing 日志初始化
//! - **stream**: 流式响应增量合并（DeltaMerger）、索引槽位、累积器、async-openai 适配
//! - **tools**: 签名反射、工具描述符生成（SchemaBuilder）、注册表与执行器

pub mod config;
pub mod core;
pub mod observability;
pub mod stream;
pub mod tools;

pub use crate::core::{MergeError, SignatureError, SwarmError};
pub use stream::{merge_chunk, AssistantMessage, DeltaMerger, ResponseAccumulator, ToolCall};
pub use tools::{build, parse_type, Callable, Signature, Tool, ToolDescriptor, ToolRegistry, TypeDescriptor};
