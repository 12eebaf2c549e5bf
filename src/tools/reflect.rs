//! 签名反射
//!
//! Rust 没有运行时注解内省，签名在注册时由两种方式构造：
//! - `Describe`：Rust 类型静态映射到 TypeDescriptor，配合 `Signature::builder` 手写参数表
//! - `Signature::from_json_schema`：从参数结构体的 schemars Schema 反推（字段顺序、默认值、文档注释）

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject, SingleOrVec};
use schemars::JsonSchema;

use crate::core::SignatureError;
use crate::tools::descriptor::{Parameter, PrimitiveKind, Signature, TypeDescriptor};

/// 解析 $ref 的最大深度（递归类型到此降级为 Unknown）
const MAX_REF_DEPTH: usize = 8;

/// Rust 类型 → 声明类型描述
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_primitive {
    ($kind:expr => $($t:ty),+ $(,)?) => {
        $(
            impl Describe for $t {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Primitive($kind)
                }
            }
        )+
    };
}

describe_primitive!(PrimitiveKind::Text => String, str, char);
describe_primitive!(
    PrimitiveKind::Integer =>
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);
describe_primitive!(PrimitiveKind::Floating => f32, f64);
describe_primitive!(PrimitiveKind::Boolean => bool);
describe_primitive!(PrimitiveKind::Null => ());
describe_primitive!(PrimitiveKind::RawMapping => serde_json::Map<String, serde_json::Value>);

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

macro_rules! describe_sequence {
    ($($seq:ident),+) => {
        $(
            impl<T: Describe> Describe for $seq<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::array_of(T::describe())
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array_of(T::describe())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array_of(T::describe())
    }
}

impl<K, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_of(V::describe())
    }
}

impl<K, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_of(V::describe())
    }
}

impl<K, V: Describe, S> Describe for indexmap::IndexMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map_of(V::describe())
    }
}

/// 手写签名构造器
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    signature: Signature,
}

impl SignatureBuilder {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.signature.doc = Some(doc.into());
        self
    }

    /// 必填参数，类型由 `T` 推导
    pub fn param<T: Describe + ?Sized>(self, name: impl Into<String>) -> Self {
        self.param_typed(name, T::describe(), false)
    }

    /// 带默认值的参数（不进入 required）
    pub fn param_with_default<T: Describe + ?Sized>(self, name: impl Into<String>) -> Self {
        self.param_typed(name, T::describe(), true)
    }

    /// 未标注类型的必填参数
    pub fn untyped(self, name: impl Into<String>) -> Self {
        self.param_typed(name, TypeDescriptor::Unknown, false)
    }

    pub fn param_typed(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        has_default: bool,
    ) -> Self {
        self.signature.params.push(Parameter {
            name: name.into(),
            ty,
            has_default,
        });
        self
    }

    pub fn build(self) -> Signature {
        self.signature
    }
}

impl Signature {
    pub fn builder(name: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder {
            signature: Signature {
                name: name.into(),
                doc: None,
                params: Vec::new(),
            },
        }
    }

    /// 从参数结构体的 JSON Schema 反射签名：不在 required 中的字段视为有默认值，结构体文档注释作为描述
    pub fn from_json_schema<T: JsonSchema>(name: impl Into<String>) -> Result<Self, SignatureError> {
        let root = schemars::schema_for!(T);
        Self::from_root_schema(name, &root)
    }

    /// 描述取自根 schema 的 `description`。schemars 会把相邻的 `///` 行以空格拼接、空行转为 `\n\n`，
    /// 因此多行文档注释不是逐字保留；需要逐字描述时用 `SignatureBuilder::doc`
    pub fn from_root_schema(
        name: impl Into<String>,
        root: &RootSchema,
    ) -> Result<Self, SignatureError> {
        let name = name.into();
        let object = root
            .schema
            .object
            .as_ref()
            .ok_or_else(|| SignatureError::NotAnObject(name.clone()))?;

        let reflector = SchemaReflector {
            definitions: &root.definitions,
        };
        let params = object
            .properties
            .iter()
            .map(|(param, schema)| Parameter {
                name: param.clone(),
                ty: reflector.describe(schema, 0),
                has_default: !object.required.contains(param),
            })
            .collect();
        let doc = root
            .schema
            .metadata
            .as_ref()
            .and_then(|m| m.description.clone());

        Ok(Signature { name, doc, params })
    }
}

/// schemars Schema → TypeDescriptor
struct SchemaReflector<'a> {
    definitions: &'a schemars::Map<String, Schema>,
}

impl SchemaReflector<'_> {
    fn describe(&self, schema: &Schema, depth: usize) -> TypeDescriptor {
        match schema {
            Schema::Bool(_) => TypeDescriptor::Unknown,
            Schema::Object(obj) => self.describe_object(obj, depth),
        }
    }

    fn describe_object(&self, obj: &SchemaObject, depth: usize) -> TypeDescriptor {
        if let Some(reference) = &obj.reference {
            return self.resolve(reference, depth);
        }
        if let Some(instance_type) = &obj.instance_type {
            return match instance_type {
                SingleOrVec::Single(t) => self.describe_instance(t, obj, depth),
                SingleOrVec::Vec(types) => members_to_type(
                    types
                        .iter()
                        .map(|t| self.describe_instance(t, obj, depth))
                        .collect(),
                ),
            };
        }
        if let Some(sub) = &obj.subschemas {
            if let Some(members) = sub.any_of.as_ref().or(sub.one_of.as_ref()) {
                return members_to_type(members.iter().map(|m| self.describe(m, depth)).collect());
            }
            // 带文档注释的 $ref 字段会被包成单元素 allOf
            if let Some([single]) = sub.all_of.as_deref() {
                return self.describe(single, depth);
            }
        }
        TypeDescriptor::Unknown
    }

    fn resolve(&self, reference: &str, depth: usize) -> TypeDescriptor {
        if depth >= MAX_REF_DEPTH {
            tracing::debug!(reference, "schema reference too deep, treated as unknown");
            return TypeDescriptor::Unknown;
        }
        reference
            .strip_prefix("#/definitions/")
            .and_then(|name| self.definitions.get(name))
            .map(|schema| self.describe(schema, depth + 1))
            .unwrap_or(TypeDescriptor::Unknown)
    }

    fn describe_instance(
        &self,
        instance: &InstanceType,
        obj: &SchemaObject,
        depth: usize,
    ) -> TypeDescriptor {
        match instance {
            InstanceType::String => TypeDescriptor::text(),
            InstanceType::Integer => TypeDescriptor::integer(),
            InstanceType::Number => TypeDescriptor::floating(),
            InstanceType::Boolean => TypeDescriptor::boolean(),
            InstanceType::Null => TypeDescriptor::null(),
            InstanceType::Array => {
                let element = obj
                    .array
                    .as_ref()
                    .and_then(|a| a.items.as_ref())
                    .and_then(|items| match items {
                        SingleOrVec::Single(schema) => Some(self.describe(schema, depth)),
                        // 元组
                        SingleOrVec::Vec(_) => None,
                    });
                match element {
                    Some(element) => TypeDescriptor::array_of(element),
                    None => TypeDescriptor::Primitive(PrimitiveKind::RawList),
                }
            }
            InstanceType::Object => {
                match obj
                    .object
                    .as_ref()
                    .and_then(|o| o.additional_properties.as_deref())
                {
                    Some(Schema::Object(value)) => {
                        TypeDescriptor::map_of(self.describe_object(value, depth))
                    }
                    _ => TypeDescriptor::Primitive(PrimitiveKind::RawMapping),
                }
            }
        }
    }
}

/// `[T, null]` → Optional(T)，其余多成员 → Union
fn members_to_type(mut members: Vec<TypeDescriptor>) -> TypeDescriptor {
    if members.len() == 2 {
        if let Some(pos) = members.iter().position(TypeDescriptor::is_null) {
            let inner = members.swap_remove(1 - pos);
            if !inner.is_null() {
                return TypeDescriptor::optional(inner);
            }
            members.push(inner);
        }
    }
    if members.len() == 1 {
        return members.remove(0);
    }
    TypeDescriptor::Union(members)
}
