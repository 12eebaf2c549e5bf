//! 工具调用 JSON Schema 生成
//!
//! 把可调用对象的签名转换为 function calling 描述符：名称、描述、参数 Schema、必填参数列表。
//! 类型映射是纯函数 `parse_type`，无法识别的类型一律降级为 "string"，保证注册不因冷门类型阻塞。

use indexmap::IndexMap;

use crate::core::SignatureError;
use crate::tools::descriptor::{
    FunctionDescriptor, ParameterSchema, ParametersSchema, SchemaType, Signature, ToolDescriptor,
    TypeDescriptor,
};

const DEFAULT_KIND: &str = "string";

/// 可反射出签名的对象（工具、手写签名等）
pub trait Callable {
    fn signature(&self) -> Result<Signature, SignatureError>;
}

impl Callable for Signature {
    fn signature(&self) -> Result<Signature, SignatureError> {
        Ok(self.clone())
    }
}

/// 声明类型 → Schema 片段
pub fn parse_type(ty: &TypeDescriptor) -> ParameterSchema {
    match ty {
        TypeDescriptor::Primitive(kind) => ParameterSchema::of(kind.json_kind()),
        TypeDescriptor::Optional(inner) => mark_nullable(parse_type(inner)),
        TypeDescriptor::Union(members) => parse_union(members),
        TypeDescriptor::Array(element) => {
            // items 只保留元素的 type，不再向下展开
            let items_kind = element
                .as_deref()
                .map(|e| parse_type(e).kind)
                .unwrap_or_else(|| SchemaType::One(DEFAULT_KIND.to_string()));
            ParameterSchema {
                items: Some(Box::new(ParameterSchema {
                    kind: items_kind,
                    items: None,
                    additional_properties: None,
                    nullable: None,
                })),
                ..ParameterSchema::of("array")
            }
        }
        TypeDescriptor::Object(value) => {
            let additional = value
                .as_deref()
                .map(parse_type)
                .unwrap_or_else(|| ParameterSchema::of(DEFAULT_KIND));
            ParameterSchema {
                additional_properties: Some(Box::new(additional)),
                ..ParameterSchema::of("object")
            }
        }
        TypeDescriptor::Unknown => ParameterSchema::of(DEFAULT_KIND),
    }
}

fn mark_nullable(mut schema: ParameterSchema) -> ParameterSchema {
    schema.nullable = Some(true);
    schema
}

/// Union：恰好一个非 null 成员且含 null 时按 Optional 处理；否则收集去重后的类型名。
/// 多个数组成员时只保留第一个找到的 items。
fn parse_union(members: &[TypeDescriptor]) -> ParameterSchema {
    let non_null: Vec<&TypeDescriptor> = members.iter().filter(|m| !m.is_null()).collect();
    if non_null.len() == 1 && non_null.len() < members.len() {
        return mark_nullable(parse_type(non_null[0]));
    }

    let mut names: Vec<String> = Vec::new();
    let mut items = None;
    for member in members {
        let parsed = parse_type(member);
        for name in parsed.kind.names() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if items.is_none() && parsed.kind.is("array") {
            items = parsed.items;
        }
    }

    ParameterSchema {
        kind: SchemaType::Many(names),
        items,
        additional_properties: None,
        nullable: None,
    }
}

/// 从可调用对象构建描述符；签名无法反射时返回 SignatureError
pub fn build<C: Callable + ?Sized>(callable: &C) -> Result<ToolDescriptor, SignatureError> {
    let signature = callable.signature()?;
    build_from_signature(&signature)
}

/// 从已反射的签名构建描述符
pub fn build_from_signature(signature: &Signature) -> Result<ToolDescriptor, SignatureError> {
    if signature.name.trim().is_empty() {
        return Err(SignatureError::EmptyName);
    }

    let mut properties = IndexMap::with_capacity(signature.params.len());
    for param in &signature.params {
        if properties
            .insert(param.name.clone(), parse_type(&param.ty))
            .is_some()
        {
            return Err(SignatureError::DuplicateParameter {
                tool: signature.name.clone(),
                param: param.name.clone(),
            });
        }
    }

    let required: Vec<String> = signature
        .params
        .iter()
        .filter(|p| !p.has_default)
        .map(|p| p.name.clone())
        .collect();

    tracing::debug!(
        tool = %signature.name,
        params = properties.len(),
        required = required.len(),
        "tool descriptor built"
    );

    Ok(ToolDescriptor {
        kind: "function".to_string(),
        function: FunctionDescriptor {
            name: signature.name.clone(),
            description: signature.doc.clone().unwrap_or_default(),
            parameters: ParametersSchema {
                kind: "object".to_string(),
                properties,
                required,
            },
        },
    })
}

/// 一组描述符序列化为 JSON 数组字符串，可直接拼入请求或 system prompt
pub fn descriptors_json(descriptors: &[&ToolDescriptor]) -> String {
    serde_json::to_string_pretty(descriptors).unwrap_or_else(|_| "[]".to_string())
}
