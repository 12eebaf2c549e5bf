//! Echo 工具（测试 / 演示用）

use async_trait::async_trait;
use serde_json::Value;

use crate::core::SignatureError;
use crate::tools::descriptor::Signature;
use crate::tools::schema::Callable;
use crate::tools::Tool;

/// Echo 工具：回显文本
pub struct EchoTool;

impl Callable for EchoTool {
    fn signature(&self) -> Result<Signature, SignatureError> {
        Ok(Signature::builder("echo")
            .doc("Echo text back to the caller (for testing).")
            .param::<String>("text")
            .build())
    }
}

#[async_trait]
impl Tool for EchoTool {
    async fn execute(&self, args: Value) -> Result<String, String> {
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("(empty)");
        Ok(text.to_string())
    }
}
