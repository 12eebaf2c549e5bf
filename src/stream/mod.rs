//! 流式响应层：增量合并、索引槽位、累积器与 async-openai 适配

pub mod accumulator;
pub mod merge;
pub mod openai;
pub mod slots;

pub use accumulator::{accumulate, AssistantMessage, FunctionCall, ResponseAccumulator, ToolCall};
pub use merge::{merge_chunk, DeltaMerger, DEFAULT_MAX_TOOL_CALLS};
pub use openai::{accumulate_openai, chunk_delta};
pub use slots::{blank_tool_call, IndexedSlotMap};
