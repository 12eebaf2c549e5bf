//! 流式响应累积器
//!
//! 一次流式响应对应一个累积器：创建时固定 sender / role，逐片 apply delta，
//! 流结束后 finish 得到类型化的 AssistantMessage。累积器由单一消费者独占（&mut）。

use futures_util::{pin_mut, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{MergeError, SwarmError};
use crate::stream::merge::{DeltaMerger, TOOL_CALLS_KEY};
use crate::stream::slots::blank_tool_call;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// 累积完成的一次工具调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

impl ToolCall {
    /// 解析拼接好的参数 JSON；空字符串视为无参数
    pub fn parsed_arguments(&self) -> Result<Value, serde_json::Error> {
        let raw = self.function.arguments.trim();
        if raw.is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(raw)
    }
}

/// 流结束后的助手消息（累积文档的类型化视图）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub function_call: Option<Value>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// 单个流式响应的累积器
#[derive(Debug, Clone)]
pub struct ResponseAccumulator {
    document: Value,
    merger: DeltaMerger,
    chunks: usize,
}

impl ResponseAccumulator {
    pub fn new(sender: &str) -> Self {
        Self::with_merger(sender, DeltaMerger::default())
    }

    pub fn with_merger(sender: &str, merger: DeltaMerger) -> Self {
        Self {
            document: json!({
                "content": "",
                "sender": sender,
                "role": "assistant",
                "function_call": null,
                "tool_calls": []
            }),
            merger,
            chunks: 0,
        }
    }

    /// 合并一片 delta
    pub fn apply(&mut self, delta: &Value) -> Result<(), MergeError> {
        self.merger.merge(&mut self.document, delta)?;
        self.chunks += 1;
        Ok(())
    }

    /// 当前累积文档（只读）
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// 结束累积：去掉从未写入的占位槽位，空的 tool_calls 归为 None
    pub fn finish(self) -> Result<AssistantMessage, serde_json::Error> {
        let mut document = self.document;
        if let Some(slots) = document.get_mut(TOOL_CALLS_KEY) {
            if let Value::Array(entries) = slots {
                let blank = blank_tool_call();
                entries.retain(|entry| *entry != blank);
            }
            if slots.as_array().map_or(true, Vec::is_empty) {
                *slots = Value::Null;
            }
        }
        tracing::debug!(chunks = self.chunks, "response accumulated");
        serde_json::from_value(document)
    }
}

/// 消费一条 delta 流直到结束，返回累积后的消息
pub async fn accumulate<S, E>(
    sender: &str,
    merger: DeltaMerger,
    stream: S,
) -> Result<AssistantMessage, SwarmError>
where
    S: Stream<Item = Result<Value, E>>,
    E: std::fmt::Display,
{
    pin_mut!(stream);
    let mut acc = ResponseAccumulator::with_merger(sender, merger);
    while let Some(item) = stream.next().await {
        let delta = item.map_err(|e| SwarmError::Stream(e.to_string()))?;
        acc.apply(&delta)?;
    }
    Ok(acc.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn tool_delta(index: u64, body: Value) -> Value {
        let mut entry = body;
        entry["index"] = json!(index);
        json!({"role": "assistant", "content": null, "tool_calls": [entry]})
    }

    #[test]
    fn test_text_response() {
        let mut acc = ResponseAccumulator::new("Agent");
        for piece in ["Hel", "lo", ", world"] {
            acc.apply(&json!({"role": "assistant", "content": piece})).unwrap();
        }
        assert_eq!(acc.chunks(), 3);
        let message = acc.finish().unwrap();
        assert_eq!(message.content, "Hello, world");
        assert_eq!(message.role, "assistant");
        assert_eq!(message.sender, "Agent");
        assert_eq!(message.tool_calls, None);
    }

    #[test]
    fn test_interleaved_tool_calls() {
        let mut acc = ResponseAccumulator::new("Agent");
        acc.apply(&tool_delta(
            0,
            json!({"id": "call_a", "type": "function", "function": {"name": "add", "arguments": ""}}),
        ))
        .unwrap();
        acc.apply(&tool_delta(
            1,
            json!({"id": "call_b", "type": "function", "function": {"name": "echo", "arguments": ""}}),
        ))
        .unwrap();
        acc.apply(&tool_delta(0, json!({"function": {"arguments": "{\"a\": 1"}})))
            .unwrap();
        acc.apply(&tool_delta(1, json!({"function": {"arguments": "{\"text\": \"hi\"}"}})))
            .unwrap();
        acc.apply(&tool_delta(0, json!({"function": {"arguments": ", \"b\": 2}"}})))
            .unwrap();

        let message = acc.finish().unwrap();
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].parsed_arguments().unwrap(), json!({"a": 1, "b": 2}));
        assert_eq!(calls[1].function.name, "echo");
        assert_eq!(calls[1].parsed_arguments().unwrap(), json!({"text": "hi"}));
    }

    #[test]
    fn test_untouched_slots_are_dropped() {
        let mut acc = ResponseAccumulator::new("Agent");
        acc.apply(&tool_delta(2, json!({"id": "call_c", "function": {"name": "echo"}})))
            .unwrap();
        assert_eq!(acc.document()["tool_calls"].as_array().unwrap().len(), 3);
        let calls = acc.finish().unwrap().tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_c");
    }

    #[test]
    fn test_role_stays_pinned() {
        let mut acc = ResponseAccumulator::new("Agent");
        acc.apply(&json!({"role": "tool", "content": "x"})).unwrap();
        assert_eq!(acc.document()["role"], "assistant");
    }

    #[test]
    fn test_failed_apply_not_counted() {
        let mut acc = ResponseAccumulator::new("Agent");
        assert!(acc.apply(&json!({"tool_calls": [{"index": -3}]})).is_err());
        assert_eq!(acc.chunks(), 0);
    }

    #[test]
    fn test_empty_arguments_parse_to_object() {
        let call = ToolCall {
            id: "c".to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: "noop".to_string(),
                arguments: String::new(),
            },
        };
        assert_eq!(call.parsed_arguments().unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_accumulate_stream() {
        let deltas = vec![
            Ok::<_, String>(json!({"role": "assistant", "content": "Hi"})),
            Ok(json!({"content": " there"})),
        ];
        let message = accumulate("Agent", DeltaMerger::default(), stream::iter(deltas))
            .await
            .unwrap();
        assert_eq!(message.content, "Hi there");
    }

    #[tokio::test]
    async fn test_accumulate_stream_error() {
        let deltas = vec![
            Ok(json!({"content": "Hi"})),
            Err("connection reset".to_string()),
        ];
        let result = accumulate("Agent", DeltaMerger::default(), stream::iter(deltas)).await;
        assert!(matches!(result, Err(SwarmError::Stream(msg)) if msg == "connection reset"));
    }
}
