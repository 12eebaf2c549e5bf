//! 按索引寻址的槽位序列（tool_calls）
//!
//! 流式增量用显式 `index` 指向第几个工具调用，而不是按到达顺序追加。
//! 越界处理只在这里：`[0, limit)` 内自动扩展（新槽位为空白模板），其余一律返回 MergeError。

use serde_json::{json, Value};

use crate::core::MergeError;

/// 新建工具调用槽位的空白模板
pub fn blank_tool_call() -> Value {
    json!({
        "function": {"arguments": "", "name": ""},
        "id": "",
        "type": ""
    })
}

/// 校验增量中的 index 字段
pub fn parse_index(raw: Option<&Value>, limit: usize) -> Result<usize, MergeError> {
    let raw = raw.ok_or(MergeError::MissingIndex)?;
    if let Some(index) = raw.as_u64() {
        if index >= limit as u64 {
            return Err(MergeError::IndexOutOfRange { index, limit });
        }
        return Ok(index as usize);
    }
    match raw.as_i64() {
        Some(negative) => Err(MergeError::NegativeIndex(negative)),
        None => Err(MergeError::InvalidIndex(raw.to_string())),
    }
}

/// 对累积文档中 tool_calls 数组的索引视图
pub struct IndexedSlotMap<'a> {
    slots: &'a mut Vec<Value>,
    limit: usize,
}

impl<'a> IndexedSlotMap<'a> {
    pub fn new(slots: &'a mut Vec<Value>, limit: usize) -> Self {
        Self { slots, limit }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 取第 index 个槽位，不存在时用空白模板扩展到该位置
    pub fn upsert(&mut self, index: usize) -> Result<&mut Value, MergeError> {
        if index >= self.limit {
            return Err(MergeError::IndexOutOfRange {
                index: index as u64,
                limit: self.limit,
            });
        }
        if index >= self.slots.len() {
            tracing::debug!(index, from = self.slots.len(), "extending tool call slots");
            self.slots.resize_with(index + 1, blank_tool_call);
        }
        Ok(&mut self.slots[index])
    }
}
