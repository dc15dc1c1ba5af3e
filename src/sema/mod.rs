//! The frontend semantic layer: frontend types and values, promotion
//! rules, and the dispatch facade that lowers language operations to IR.

pub mod context;
pub mod dispatch;
pub mod promote;
pub mod types;
pub mod value;

pub use context::TypeContext;
pub use promote::{broadcast_shapes, computation_type, integer_promote, DivOrMod};
pub use types::{FrontendType, Signedness};
pub use value::FrontendValue;
