//! 工具注册 + 流式累积 + 执行 集成测试

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bee_swarm::core::SignatureError;
    use bee_swarm::stream::{accumulate, DeltaMerger};
    use bee_swarm::tools::{Callable, Signature, Tool, ToolExecutor, ToolRegistry};
    use futures_util::stream;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{json, Value};

    /// Add two numbers
    #[derive(Deserialize, JsonSchema)]
    struct AddArgs {
        a: i64,
        #[serde(default)]
        b: i64,
    }

    struct AddTool;

    impl Callable for AddTool {
        fn signature(&self) -> Result<Signature, SignatureError> {
            Signature::from_json_schema::<AddArgs>("add")
        }
    }

    #[async_trait]
    impl Tool for AddTool {
        async fn execute(&self, args: Value) -> Result<String, String> {
            let args: AddArgs = serde_json::from_value(args).map_err(|e| e.to_string())?;
            Ok((args.a + args.b).to_string())
        }
    }

    #[test]
    fn test_add_descriptor_from_schema() {
        let mut registry = ToolRegistry::new();
        let desc = registry.register(AddTool).unwrap();
        assert_eq!(
            serde_json::to_value(desc).unwrap(),
            json!({
                "type": "function",
                "function": {
                    "name": "add",
                    "description": "Add two numbers",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "a": {"type": "integer"},
                            "b": {"type": "integer"}
                        },
                        "required": ["a"]
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn test_stream_then_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(AddTool).unwrap();
        let executor = ToolExecutor::new(registry, 5);

        let deltas = vec![
            json!({"role": "assistant", "content": "Let me add. "}),
            json!({"tool_calls": [{"index": 0, "id": "call_1", "type": "function",
                "function": {"name": "add", "arguments": ""}}]}),
            json!({"tool_calls": [{"index": 0, "function": {"arguments": "{\"a\": 40"}}]}),
            json!({"content": null, "tool_calls": [{"index": 0, "function": {"arguments": ", \"b\": 2}"}}]}),
        ];
        let message = accumulate(
            "Calculator",
            DeltaMerger::default(),
            stream::iter(deltas.into_iter().map(Ok::<_, String>)),
        )
        .await
        .unwrap();

        assert_eq!(message.sender, "Calculator");
        assert_eq!(message.content, "Let me add. ");
        let calls = message.tool_calls.expect("tool call accumulated");
        assert_eq!(calls.len(), 1);

        let result = executor.execute_call(&calls[0]).await.unwrap();
        assert_eq!(result, "42");
    }

    #[tokio::test]
    async fn test_stream_with_bad_index_fails() {
        let deltas = vec![
            json!({"content": "x"}),
            json!({"tool_calls": [{"index": -2, "function": {"arguments": "{}"}}]}),
        ];
        let result = accumulate(
            "Agent",
            DeltaMerger::default(),
            stream::iter(deltas.into_iter().map(Ok::<_, String>)),
        )
        .await;
        assert!(result.is_err());
    }
}
