//! 工具注册表
//!
//! 工具实现 Tool trait（签名反射 + 异步执行），注册时即生成 ToolDescriptor：
//! 签名无法反射则注册失败，不会把残缺的工具暴露给 LLM。描述符按注册顺序输出。

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::core::{SignatureError, SwarmError};
use crate::tools::descriptor::ToolDescriptor;
use crate::tools::schema::{self, Callable};

/// 工具 trait：签名由 Callable 提供，执行时 args 为 LLM 给出的 JSON 参数对象
#[async_trait]
pub trait Tool: Callable + Send + Sync {
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 已注册工具：实现与注册时生成的描述符
struct Registered {
    tool: Arc<dyn Tool>,
    descriptor: ToolDescriptor,
}

/// 工具注册表：按名称存储，保持注册顺序
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Registered>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具并生成描述符；同名工具覆盖旧实现（位置不变）
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<&ToolDescriptor, SignatureError> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<&ToolDescriptor, SignatureError> {
        let descriptor = schema::build(tool.as_ref())?;
        let name = descriptor.name().to_string();
        tracing::info!(tool = %name, "tool registered");
        let (index, previous) = self.tools.insert_full(name, Registered { tool, descriptor });
        if previous.is_some() {
            tracing::warn!("tool re-registered, replacing previous implementation");
        }
        Ok(&self.tools[index].descriptor)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|r| r.tool.clone())
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|r| &r.descriptor)
    }

    /// 全部描述符（注册顺序），可直接放入请求的 tools 字段
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|r| &r.descriptor).collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, SwarmError> {
        let tool = self
            .get(name)
            .ok_or_else(|| SwarmError::UnknownTool(name.to_string()))?;
        tool.execute(args)
            .await
            .map_err(SwarmError::ToolExecutionFailed)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 描述符 JSON 数组（pretty）
    pub fn to_schema_json(&self) -> String {
        schema::descriptors_json(&self.descriptors())
    }
}
