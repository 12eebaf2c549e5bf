//! Bee Swarm 命令行
//!
//! - `bee-swarm tools`：输出内置工具的 function calling 描述符
//! - `bee-swarm merge [sender]`：从 stdin 逐行读取 delta（JSON Lines），输出累积后的助手消息
//! - `bee-swarm run [sender]`：同 merge，随后按 [tools] 超时执行消息中的每个工具调用

use std::io::BufRead;

use anyhow::{bail, Context};
use bee_swarm::{
    config::{load_config, AppConfig},
    observability,
    stream::{AssistantMessage, ResponseAccumulator},
    tools::{EchoTool, FunctionTool, Signature, ToolRegistry},
};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config(None).unwrap_or_default();
    observability::init(&cfg.app.log_level);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("tools") | None => {
            println!("{}", builtin_registry()?.to_schema_json());
            Ok(())
        }
        Some("merge") => {
            let sender = args.next().unwrap_or_else(|| cfg.stream.sender.clone());
            let message = merge_stdin(&sender, &cfg)?;
            println!("{}", serde_json::to_string_pretty(&message)?);
            Ok(())
        }
        Some("run") => {
            let sender = args.next().unwrap_or_else(|| cfg.stream.sender.clone());
            let message = merge_stdin(&sender, &cfg)?;
            println!("{}", serde_json::to_string_pretty(&message)?);
            let executor = cfg.tools.executor(builtin_registry()?);
            for call in message.tool_calls.iter().flatten() {
                let output = executor
                    .execute_call(call)
                    .await
                    .with_context(|| format!("tool call {} failed", call.id))?;
                println!("{} -> {}", call.function.name, output);
            }
            Ok(())
        }
        Some(other) => bail!("unknown command '{other}', expected 'tools', 'merge' or 'run'"),
    }
}

fn builtin_registry() -> anyhow::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool)?;
    registry.register(FunctionTool::new(
        Signature::builder("add")
            .doc("Add two numbers")
            .param::<i64>("a")
            .param_with_default::<i64>("b")
            .build(),
        |args| {
            let a = args["a"].as_i64().ok_or("a must be an integer")?;
            let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
            Ok((a + b).to_string())
        },
    ))?;
    Ok(registry)
}

fn merge_stdin(sender: &str, cfg: &AppConfig) -> anyhow::Result<AssistantMessage> {
    let mut acc = ResponseAccumulator::with_merger(sender, cfg.stream.merger());
    for (lineno, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let delta: Value = serde_json::from_str(&line)
            .with_context(|| format!("line {}: invalid JSON", lineno + 1))?;
        acc.apply(&delta)
            .with_context(|| format!("line {}: merge failed", lineno + 1))?;
    }
    acc.finish().context("Failed to finalize message")
}
