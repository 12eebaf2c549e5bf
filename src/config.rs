//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SWARM__*` 覆盖（双下划线表示嵌套，如 `SWARM__STREAM__MAX_TOOL_CALLS=16`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::stream::{DeltaMerger, DEFAULT_MAX_TOOL_CALLS};
use crate::tools::{ToolExecutor, ToolRegistry};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub stream: StreamSection,
    pub tools: ToolsSection,
}

/// [app] 段：应用名与日志级别
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// RUST_LOG 未设置时的默认日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// [stream] 段：累积消息的 sender 与工具调用槽位上限
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSection {
    #[serde(default = "default_sender")]
    pub sender: String,
    /// 单个响应最多的工具调用数，超出的 index 视为非法
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,
}

impl Default for StreamSection {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            max_tool_calls: default_max_tool_calls(),
        }
    }
}

impl StreamSection {
    pub fn merger(&self) -> DeltaMerger {
        DeltaMerger::new(self.max_tool_calls)
    }
}

fn default_sender() -> String {
    "Agent".to_string()
}

fn default_max_tool_calls() -> usize {
    DEFAULT_MAX_TOOL_CALLS
}

/// [tools] 段：单次工具调用超时
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 秒
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl ToolsSection {
    /// 以配置的超时包装注册表
    pub fn executor(&self, registry: ToolRegistry) -> ToolExecutor {
        ToolExecutor::new(registry, self.tool_timeout_secs)
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// 从 config 目录加载配置，环境变量 SWARM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SWARM__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SWARM")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
