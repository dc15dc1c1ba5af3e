//! tessera: the semantic dispatch and IR-lowering layer of a block-oriented
//! GPU kernel language.
//!
//! Lowering pipeline:
//!
//! ```text
//! AST walk → [sema::dispatch] → typed SSA IR (IrBuilder/IrModule)
//!   → PassManager (inline, validate) → later optimization + codegen
//! ```
//!
//! The `sema` layer is where the language's numeric model lives: the cast
//! matrix across signed/unsigned integers, half/bfloat/float/double floats,
//! pointers, and blocks; two-way shape broadcasting; promotion rules for
//! arithmetic, division/modulo, and bitwise ops; masked loads and stores
//! with cache modifiers; atomic primitives including the float-max-via-
//! int-reinterpret lowering; and reductions with automatic widening.
//!
//! The `ir` layer is the substrate the dispatch layer emits into: an
//! index-based SSA representation with a cursor-driven builder. The `pass`
//! layer holds the function inliner and a structural validator.
//!
//! Compilation of one kernel is single-threaded and synchronous: one
//! `TypeContext` plus one `IrBuilder` per kernel, never shared. The first
//! semantic error aborts lowering; there is no recovery at this layer.

pub mod error;
pub mod ir;
pub mod pass;
pub mod sema;

pub use error::{Error, PassError, SemanticError, Unreachable};
pub use ir::{IrBuilder, IrModule};
pub use pass::{InlinePass, Pass, PassManager, ValidatePass};
pub use sema::{FrontendType, FrontendValue, Signedness, TypeContext};
