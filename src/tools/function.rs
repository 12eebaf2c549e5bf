//! 闭包工具：一份签名 + 一个同步闭包，适合把普通函数快速注册为工具

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::SignatureError;
use crate::tools::descriptor::Signature;
use crate::tools::schema::Callable;
use crate::tools::Tool;

type Handler = Arc<dyn Fn(Value) -> Result<String, String> + Send + Sync>;

#[derive(Clone)]
pub struct FunctionTool {
    signature: Signature,
    handler: Handler,
}

impl FunctionTool {
    pub fn new<F>(signature: Signature, handler: F) -> Self
    where
        F: Fn(Value) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            signature,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Callable for FunctionTool {
    fn signature(&self) -> Result<Signature, SignatureError> {
        Ok(self.signature.clone())
    }
}

#[async_trait]
impl Tool for FunctionTool {
    async fn execute(&self, args: Value) -> Result<String, String> {
        (self.handler)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::build;
    use serde_json::json;

    fn add_tool() -> FunctionTool {
        let sig = Signature::builder("add")
            .doc("Add two numbers")
            .param::<i64>("a")
            .param_with_default::<i64>("b")
            .build();
        FunctionTool::new(sig, |args| {
            let a = args["a"].as_i64().ok_or("a must be an integer")?;
            let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
            Ok((a + b).to_string())
        })
    }

    #[test]
    fn test_function_tool_descriptor() {
        let desc = build(&add_tool()).unwrap();
        assert_eq!(desc.function.name, "add");
        assert_eq!(desc.function.parameters.required, vec!["a"]);
    }

    #[tokio::test]
    async fn test_function_tool_execute() {
        let tool = add_tool();
        assert_eq!(tool.execute(json!({"a": 2, "b": 3})).await.unwrap(), "5");
        assert_eq!(tool.execute(json!({"a": 2})).await.unwrap(), "2");
        assert!(tool.execute(json!({"a": "x"})).await.is_err());
    }
}
