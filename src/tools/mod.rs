pub mod descriptor;
pub mod echo;
pub mod executor;
pub mod function;
pub mod reflect;
pub mod registry;
pub mod schema;

pub use descriptor::{
    Parameter, ParameterSchema, PrimitiveKind, SchemaType, Signature, ToolDescriptor,
    TypeDescriptor,
};
pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use function::FunctionTool;
pub use reflect::{Describe, SignatureBuilder};
pub use registry::{Tool, ToolRegistry};
pub use schema::{build, build_from_signature, parse_type, Callable};
