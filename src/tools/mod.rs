pub mod handler;
pub mod registry;
pub mod tool;

pub use handler::{FuncHandler, ToolHandler, TypedHandler};
pub use registry::ToolRegistry;
pub use tool::Tool;
