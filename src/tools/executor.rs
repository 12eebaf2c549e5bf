//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时；既可按名称执行，也可直接执行流式累积出的 ToolCall
//! （先解析参数 JSON）。每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::SwarmError;
use crate::stream::ToolCall;
use crate::tools::ToolRegistry;

pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self::with_timeout(registry, Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(registry: ToolRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// 执行指定工具；超时返回 ToolTimeout，工具返回 Err 则为 ToolExecutionFailed
    pub async fn execute(
        &self,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Result<String, SwarmError> {
        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, self.registry.execute(tool_name, args)).await;

        let outcome = match &result {
            Ok(Ok(_)) => "ok",
            Ok(Err(_)) => "error",
            Err(_) => "timeout",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": outcome == "ok",
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit, "tool");

        match result {
            Ok(inner) => inner,
            Err(_) => Err(SwarmError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 执行模型请求的一次工具调用
    pub async fn execute_call(&self, call: &ToolCall) -> Result<String, SwarmError> {
        let args = call
            .parsed_arguments()
            .map_err(|e| SwarmError::InvalidArguments {
                tool: call.function.name.clone(),
                reason: e.to_string(),
            })?;
        self.execute(&call.function.name, args).await
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::FunctionCall;
    use crate::tools::descriptor::Signature;
    use crate::tools::{EchoTool, FunctionTool, Tool};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct SlowTool;

    impl crate::tools::Callable for SlowTool {
        fn signature(&self) -> Result<Signature, crate::core::SignatureError> {
            Ok(Signature::builder("slow").build())
        }
    }

    #[async_trait]
    impl Tool for SlowTool {
        async fn execute(&self, _args: Value) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_execute_call_parses_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        let executor = ToolExecutor::new(registry, 5);
        let out = executor
            .execute_call(&call("echo", "{\"text\": \"hi\"}"))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[tokio::test]
    async fn test_execute_call_invalid_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        let executor = ToolExecutor::new(registry, 5);
        let result = executor.execute_call(&call("echo", "{\"text\": ")).await;
        assert!(matches!(result, Err(SwarmError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_tool_failure_is_mapped() {
        let mut registry = ToolRegistry::new();
        registry
            .register(FunctionTool::new(Signature::builder("fail").build(), |_| {
                Err("boom".to_string())
            }))
            .unwrap();
        let executor = ToolExecutor::new(registry, 5);
        let result = executor.execute("fail", json!({})).await;
        assert!(matches!(result, Err(SwarmError::ToolExecutionFailed(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool).unwrap();
        let executor = ToolExecutor::with_timeout(registry, Duration::from_millis(50));
        let result = executor.execute("slow", json!({})).await;
        assert!(matches!(result, Err(SwarmError::ToolTimeout(name)) if name == "slow"));
    }

    #[test]
    fn test_args_preview_truncates() {
        let long = json!({"text": "x".repeat(500)});
        let preview = args_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }
}
