//! async-openai 流式 chunk 适配
//!
//! 取每个 chunk 第一个 choice 的 delta，序列化为 JSON 后交给 DeltaMerger。

use async_openai::types::chat::CreateChatCompletionStreamResponse;
use futures_util::{pin_mut, Stream, StreamExt};
use serde_json::Value;

use crate::core::SwarmError;
use crate::stream::accumulator::{AssistantMessage, ResponseAccumulator};
use crate::stream::merge::DeltaMerger;

/// chunk → delta；没有 choice 的 chunk（如末尾 usage）返回 None
pub fn chunk_delta(
    chunk: &CreateChatCompletionStreamResponse,
) -> Result<Option<Value>, serde_json::Error> {
    chunk
        .choices
        .first()
        .map(|choice| serde_json::to_value(&choice.delta))
        .transpose()
}

/// 消费 async-openai 的流式响应，返回累积后的消息
pub async fn accumulate_openai<S, E>(
    sender: &str,
    merger: DeltaMerger,
    stream: S,
) -> Result<AssistantMessage, SwarmError>
where
    S: Stream<Item = Result<CreateChatCompletionStreamResponse, E>>,
    E: std::fmt::Display,
{
    pin_mut!(stream);
    let mut acc = ResponseAccumulator::with_merger(sender, merger);
    while let Some(item) = stream.next().await {
        let chunk = item.map_err(|e| SwarmError::Stream(e.to_string()))?;
        if let Some(delta) = chunk_delta(&chunk)? {
            acc.apply(&delta)?;
        }
    }
    Ok(acc.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;

    fn chunk(delta: Value) -> CreateChatCompletionStreamResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "system_fingerprint": null,
            "choices": [{
                "index": 0,
                "delta": delta,
                "logprobs": null,
                "finish_reason": null
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_chunk_delta_content() {
        let delta = chunk_delta(&chunk(json!({"role": "assistant", "content": "Hi"})))
            .unwrap()
            .unwrap();
        assert_eq!(delta["content"], "Hi");
    }

    #[tokio::test]
    async fn test_accumulate_openai_tool_call() {
        let chunks = vec![
            Ok::<_, String>(chunk(json!({"role": "assistant", "content": null}))),
            Ok(chunk(json!({"tool_calls": [{
                "index": 0,
                "id": "call_1",
                "type": "function",
                "function": {"name": "add", "arguments": ""}
            }]}))),
            Ok(chunk(json!({"tool_calls": [{
                "index": 0,
                "function": {"arguments": "{\"a\": 2}"}
            }]}))),
        ];
        let message = accumulate_openai("Agent", DeltaMerger::default(), stream::iter(chunks))
            .await
            .unwrap();
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "add");
        assert_eq!(calls[0].parsed_arguments().unwrap(), json!({"a": 2}));
    }
}
