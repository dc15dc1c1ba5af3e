use thiserror::Error;

/// Top-level error type for the tessera frontend.
#[derive(Debug, Error)]
pub enum Error {
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Unreachable(#[from] Unreachable),

    #[error("pass error: {0}")]
    Pass(#[from] PassError),
}

impl Error {
    /// Shorthand for tagging an internal invariant violation with the name
    /// of the dispatch path that hit it.
    pub fn unreachable(key: impl Into<String>) -> Self {
        Error::Unreachable(Unreachable { key: key.into() })
    }
}

/// An unimplemented or impossible code path was reached.
///
/// These indicate a compiler bug, not a user error. The key names the
/// dispatch operation (and, for casts, the offending type pair).
#[derive(Debug, Error)]
#[error("encountered unimplemented code path in `{key}`; this is likely a compiler bug")]
pub struct Unreachable {
    pub key: String,
}

// ---------------------------------------------------------------------------
// Semantic errors
// ---------------------------------------------------------------------------

/// A user-visible mismatch in operand types, shapes, signedness, or
/// arguments. The first semantic error aborts lowering; there is no
/// recovery at this layer.
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("invalid operands of type {lhs} and {rhs}")]
    IncompatibleTypes { lhs: String, rhs: String },

    #[error(
        "cannot use /, //, or % with {lhs} and {rhs} because they have \
         different signedness; cast them to the same signedness"
    )]
    DifferentSignedness { lhs: String, rhs: String },

    #[error("cannot make shapes compatible: blocks must have the same rank")]
    BroadcastRankMismatch,

    #[error("cannot make shapes compatible: incompatible dimensions at index {index}: {left} and {right}")]
    IncompatibleDimensions { index: usize, left: u32, right: u32 },

    #[error("cannot broadcast a block of rank {src} to a shape of rank {dst}")]
    CannotBroadcast { src: usize, dst: usize },

    #[error("cannot reshape a block of {src} elements to a shape of {dst} elements")]
    CannotReshape { src: u64, dst: u64 },

    #[error("blocks must have rank >= 1")]
    ZeroRankBlock,

    #[error("arange requires end > start (got {start}..{end})")]
    EmptyRange { start: i32, end: i32 },

    #[error("wrong type argument to unary {op} ({ty})")]
    InvalidUnaryOperand { op: &'static str, ty: String },

    #[error("pointer argument of {op} instruction is {ty}")]
    ExpectedPointer { op: &'static str, ty: String },

    #[error("cache modifier {0} not supported")]
    UnsupportedCacheModifier(String),

    #[error("`other` cannot be provided without `mask`")]
    OtherWithoutMask,

    #[error("mask must have boolean scalar type (got {0})")]
    NonBooleanMask(String),

    #[error("both operands of fdiv must have floating point scalar type")]
    NonFloatFdiv,

    #[error("xor_sum is only supported for integers")]
    XorSumOnFloat,

    #[error("cannot bitcast data-type of size {src} to data-type of size {dst}")]
    BitcastWidthMismatch { src: u32, dst: u32 },

    #[error("dot requires rank-2 block operands (got {lhs} and {rhs})")]
    DotRankMismatch { lhs: String, rhs: String },

    #[error("reduction requires a block operand (got {0})")]
    ReduceOnScalar(String),
}

// ---------------------------------------------------------------------------
// Pass errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PassError {
    #[error("SSA violation in function '{func}': value {value} used without a definition")]
    UseWithoutDef { func: String, value: String },

    #[error("SSA violation in function '{func}': value {value} defined more than once")]
    MultipleDefinition { func: String, value: String },

    #[error("block '{block}' in function '{func}' has no terminator")]
    MissingTerminator { func: String, block: String },

    #[error("phi in function '{func}' names unknown incoming block '{block}'")]
    UnknownIncomingBlock { func: String, block: String },

    #[error("type error in function '{func}': {detail}")]
    TypeError { func: String, detail: String },

    #[error("cannot inline '{func}': recursive call cycle detected")]
    RecursionDetected { func: String },
}
