//! 工具签名与描述符数据模型
//!
//! - TypeDescriptor：参数声明类型的递归描述（注册时由反射设施构造，不可变）
//! - Signature / Parameter：可调用对象的签名（参数名、类型、是否有默认值、文档）
//! - ParameterSchema / ToolDescriptor：生成给 LLM 的 function calling 描述（可直接序列化进请求）

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 基本类型种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Integer,
    Floating,
    Boolean,
    /// 未标注元素类型的列表
    RawList,
    /// 未标注值类型的映射
    RawMapping,
    Null,
}

impl PrimitiveKind {
    /// 对应的 JSON Schema 类型名
    pub fn json_kind(self) -> &'static str {
        match self {
            PrimitiveKind::Text => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Floating => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::RawList => "array",
            PrimitiveKind::RawMapping => "object",
            PrimitiveKind::Null => "null",
        }
    }
}

/// 参数声明类型（递归）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    /// 列表，元素类型可缺省
    Array(Option<Box<TypeDescriptor>>),
    /// 字符串键映射，值类型可缺省
    Object(Option<Box<TypeDescriptor>>),
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    /// 未标注或无法识别
    Unknown,
}

impl TypeDescriptor {
    pub fn text() -> Self {
        Self::Primitive(PrimitiveKind::Text)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveKind::Integer)
    }

    pub fn floating() -> Self {
        Self::Primitive(PrimitiveKind::Floating)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveKind::Boolean)
    }

    pub fn null() -> Self {
        Self::Primitive(PrimitiveKind::Null)
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::Array(Some(Box::new(element)))
    }

    pub fn map_of(value: TypeDescriptor) -> Self {
        Self::Object(Some(Box::new(value)))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn union(members: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Primitive(PrimitiveKind::Null))
    }
}

/// 单个参数：名称、声明类型、是否带默认值
///
/// 类型是否 Optional 与是否有默认值相互独立，必填判断只看 `has_default`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    pub has_default: bool,
}

/// 可调用对象的反射签名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<Parameter>,
}

/// JSON Schema 的 type 字段：单一类型名或类型名列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    One(String),
    Many(Vec<String>),
}

impl SchemaType {
    /// 展开为类型名列表
    pub fn names(&self) -> Vec<&str> {
        match self {
            SchemaType::One(name) => vec![name.as_str()],
            SchemaType::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        matches!(self, SchemaType::One(n) if n == name)
    }
}

/// 单个参数的 Schema 片段：`{type, items?, additionalProperties?, nullable?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<ParameterSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl ParameterSchema {
    pub fn of(kind: &str) -> Self {
        Self {
            kind: SchemaType::One(kind.to_string()),
            items: None,
            additional_properties: None,
            nullable: None,
        }
    }
}

/// parameters 段：`{type: "object", properties, required}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: IndexMap<String, ParameterSchema>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

/// 工具描述符（OpenAI function calling 格式），构造后只读，可跨线程共享
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDescriptor,
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
