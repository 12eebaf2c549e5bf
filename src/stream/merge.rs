//! 流式增量合并
//!
//! 把模型流式返回的 delta 逐片合并进累积文档（原地修改）：
//! - 顶层 `role` 丢弃（角色在文档创建时固定）
//! - 字符串追加到已有字符串末尾（token 逐片拼接）
//! - 非空对象递归合并；null 忽略；数字 / 布尔 / 数组不参与合并
//! - `tool_calls` 只取第一条，按其 `index` 路由到累积文档对应槽位
//!
//! 每次调用先整体校验再写入：返回错误时文档保持原样。

use serde_json::{Map, Value};

use crate::core::MergeError;
use crate::stream::slots::{blank_tool_call, parse_index, IndexedSlotMap};

pub const ROLE_KEY: &str = "role";
pub const TOOL_CALLS_KEY: &str = "tool_calls";
const INDEX_KEY: &str = "index";

/// 单个响应允许的工具调用槽位上限
pub const DEFAULT_MAX_TOOL_CALLS: usize = 128;

/// 增量合并器（无状态，仅持有槽位上限）
#[derive(Debug, Clone, Copy)]
pub struct DeltaMerger {
    max_tool_calls: usize,
}

impl Default for DeltaMerger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOOL_CALLS)
    }
}

impl DeltaMerger {
    pub fn new(max_tool_calls: usize) -> Self {
        Self { max_tool_calls }
    }

    pub fn max_tool_calls(&self) -> usize {
        self.max_tool_calls
    }

    /// 把 delta 合并进 accumulator
    ///
    /// 任意字段（不限于 tool_calls 条目）的类型冲突都返回 `MergeError::TypeMismatch`，此时 accumulator 保持不变
    pub fn merge(&self, accumulator: &mut Value, delta: &Value) -> Result<(), MergeError> {
        let fields = delta.as_object().ok_or(MergeError::NotAnObject)?;
        let routed = self.routed_tool_call(fields)?;

        // 校验
        match &*accumulator {
            Value::Object(_) | Value::Null => {}
            other => return Err(mismatch("$", other, delta)),
        }
        check_fields(Some(&*accumulator), fields, "", &[ROLE_KEY, TOOL_CALLS_KEY])?;
        if let Some((index, entry)) = routed {
            let path = format!("{TOOL_CALLS_KEY}[{index}]");
            let blank;
            let slot = match existing_slots(accumulator)?.and_then(|slots| slots.get(index)) {
                Some(slot) => slot,
                None => {
                    blank = blank_tool_call();
                    &blank
                }
            };
            if !slot.is_object() {
                return Err(MergeError::TypeMismatch {
                    path,
                    target: kind_name(slot),
                    delta: "object",
                });
            }
            check_fields(Some(slot), entry, &path, &[INDEX_KEY])?;
        }

        // 写入
        if accumulator.is_null() {
            *accumulator = Value::Object(Map::new());
        }
        let Value::Object(target) = accumulator else {
            return Ok(());
        };
        merge_fields(target, fields, &[ROLE_KEY, TOOL_CALLS_KEY]);

        if let Some((index, entry)) = routed {
            let slots = target
                .entry(TOOL_CALLS_KEY)
                .or_insert_with(|| Value::Array(Vec::new()));
            if slots.is_null() {
                *slots = Value::Array(Vec::new());
            }
            if let Value::Array(slots) = slots {
                let mut slot_map = IndexedSlotMap::new(slots, self.max_tool_calls);
                if let Value::Object(slot) = slot_map.upsert(index)? {
                    merge_fields(slot, entry, &[INDEX_KEY]);
                }
            }
        }
        Ok(())
    }

    /// 取 delta 中第一条工具调用片段及其目标索引
    fn routed_tool_call<'d>(
        &self,
        fields: &'d Map<String, Value>,
    ) -> Result<Option<(usize, &'d Map<String, Value>)>, MergeError> {
        let first = match fields.get(TOOL_CALLS_KEY) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(calls)) => match calls.first() {
                Some(first) => first,
                None => return Ok(None),
            },
            Some(_) => return Err(MergeError::InvalidToolCall),
        };
        let entry = first.as_object().ok_or(MergeError::InvalidToolCall)?;
        let index = parse_index(entry.get(INDEX_KEY), self.max_tool_calls)?;
        Ok(Some((index, entry)))
    }
}

/// 使用默认上限合并
pub fn merge_chunk(accumulator: &mut Value, delta: &Value) -> Result<(), MergeError> {
    DeltaMerger::default().merge(accumulator, delta)
}

fn existing_slots(accumulator: &Value) -> Result<Option<&Vec<Value>>, MergeError> {
    match accumulator.get(TOOL_CALLS_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(slots)) => Ok(Some(slots)),
        Some(_) => Err(MergeError::NotASequence(TOOL_CALLS_KEY.to_string())),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, target: &Value, delta: &Value) -> MergeError {
    MergeError::TypeMismatch {
        path: path.to_string(),
        target: kind_name(target),
        delta: kind_name(delta),
    }
}

/// 干跑：检查 delta 能否无冲突地落到 target 上
fn check_fields(
    target: Option<&Value>,
    fields: &Map<String, Value>,
    path: &str,
    skip: &[&str],
) -> Result<(), MergeError> {
    for (key, value) in fields {
        if skip.contains(&key.as_str()) {
            continue;
        }
        let child = target.and_then(|t| t.get(key));
        check_value(child, value, &join(path, key))?;
    }
    Ok(())
}

fn check_value(target: Option<&Value>, delta: &Value, path: &str) -> Result<(), MergeError> {
    match (delta, target) {
        (Value::String(_), None | Some(Value::Null) | Some(Value::String(_))) => Ok(()),
        (Value::Object(_), None | Some(Value::Null)) => Ok(()),
        (Value::Object(fields), Some(existing @ Value::Object(_))) => {
            check_fields(Some(existing), fields, path, &[])
        }
        (Value::String(_) | Value::Object(_), Some(existing)) => Err(mismatch(path, existing, delta)),
        _ => Ok(()),
    }
}

fn merge_fields(target: &mut Map<String, Value>, fields: &Map<String, Value>, skip: &[&str]) {
    for (key, value) in fields {
        if skip.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::String(fragment) => {
                let slot = target
                    .entry(key.as_str())
                    .or_insert_with(|| Value::String(String::new()));
                match slot {
                    Value::String(text) => text.push_str(fragment),
                    other => *other = Value::String(fragment.clone()),
                }
            }
            Value::Object(sub) => {
                let slot = target
                    .entry(key.as_str())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(inner) = slot {
                    merge_fields(inner, sub, &[]);
                }
            }
            Value::Null => {}
            other => {
                tracing::debug!(field = %key, value = %other, "ignoring non-mergeable delta field");
            }
        }
    }
}
