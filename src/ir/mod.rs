pub mod block;
pub mod builder;
pub mod function;
pub mod instr;
pub mod module;
pub mod printer;
pub mod types;
pub mod value;

pub use block::{BlockId, IrBlock};
pub use builder::{InsertPoint, IrBuilder};
pub use function::{FunctionId, IrFunction, Param};
pub use instr::{
    BinOp, CacheModifier, CastOp, FcmpPred, IcmpPred, IrInstr, MathOp, ReduceOp, RmwOp,
};
pub use module::IrModule;
pub use types::{FpKind, IrType, Shape};
pub use value::{BlockParam, ConstValue, MetadataHint, ValueDef, ValueId};
