use crate::ir::block::BlockId;
use crate::ir::function::FunctionId;
use crate::ir::types::{IrType, Shape};
use crate::ir::value::ValueId;

/// Binary arithmetic and bitwise operations. Integer division/remainder
/// comes in signed and unsigned flavors; the frontend picks one based on
/// the operands' frontend signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::UDiv => "udiv",
            BinOp::SRem => "srem",
            BinOp::URem => "urem",
            BinOp::FAdd => "fadd",
            BinOp::FSub => "fsub",
            BinOp::FMul => "fmul",
            BinOp::FDiv => "fdiv",
            BinOp::FRem => "frem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::LShr => "lshr",
        };
        f.write_str(s)
    }
}

/// Integer comparison predicates. Signed/unsigned orderings are distinct
/// instructions; equality is signedness-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpPred {
    Eq,
    Ne,
    Sgt,
    Sge,
    Slt,
    Sle,
    Ugt,
    Uge,
    Ult,
    Ule,
}

/// Float comparison predicates. All orderings are ordered (NaN compares
/// false) except `Une`, which is unordered-or-unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcmpPred {
    Oeq,
    Ogt,
    Oge,
    Olt,
    Ole,
    Une,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    FpTrunc,
    FpExt,
    FpToSi,
    FpToUi,
    SiToFp,
    UiToFp,
    /// Integer resize. `sign_extend` selects sext over zext when widening.
    IntCast { sign_extend: bool },
    PtrToInt,
    IntToPtr,
    Bitcast,
}

/// Atomic read-modify-write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmwOp {
    Add,
    FAdd,
    And,
    Or,
    Xor,
    Xchg,
    Max,
    Min,
    UMax,
    UMin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Add,
    FAdd,
    Min,
    FMin,
    Max,
    FMax,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Exp,
    Log,
    Cos,
    Sin,
    Sqrt,
}

/// GPU load cache policy hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheModifier {
    #[default]
    None,
    /// Cache at all levels (`.ca`).
    Ca,
    /// Cache at global level only (`.cg`).
    Cg,
}

/// A single instruction in SSA form.
///
/// Invariants:
/// - Every value-producing instruction has exactly one result `ValueId`.
/// - Terminators (`Br`, `CondBr`, `Return`) are the last instruction in a
///   block; phis come first.
/// - Stores and barriers produce a void-typed result value so that every
///   instruction can be referred to uniformly.
#[derive(Debug, Clone)]
pub enum IrInstr {
    Binary {
        result: ValueId,
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
        /// Only meaningful for `FDiv`: requests IEEE-compliant rounding
        /// instead of the target's fast-division sequence.
        fdiv_ieee_rounding: bool,
    },
    Icmp {
        result: ValueId,
        pred: IcmpPred,
        lhs: ValueId,
        rhs: ValueId,
    },
    Fcmp {
        result: ValueId,
        pred: FcmpPred,
        lhs: ValueId,
        rhs: ValueId,
    },
    Cast {
        result: ValueId,
        op: CastOp,
        operand: ValueId,
        to_ty: IrType,
    },
    /// Pointer plus element offset.
    Gep {
        result: ValueId,
        ptr: ValueId,
        offset: ValueId,
    },

    // ---- Shape operators ----
    /// Scalar-to-block replication.
    Splat {
        result: ValueId,
        operand: ValueId,
        shape: Shape,
    },
    /// Replicate size-1 dimensions of a block up to `shape`.
    Broadcast {
        result: ValueId,
        operand: ValueId,
        shape: Shape,
    },
    Reshape {
        result: ValueId,
        operand: ValueId,
        shape: Shape,
    },
    /// Concatenation along the leading axis.
    Cat {
        result: ValueId,
        lhs: ValueId,
        rhs: ValueId,
    },

    // ---- Memory ----
    Load {
        result: ValueId,
        ptr: ValueId,
        cache: CacheModifier,
        is_volatile: bool,
    },
    /// Load gated by a boolean mask; unset lanes yield `other`.
    MaskedLoad {
        result: ValueId,
        ptr: ValueId,
        mask: ValueId,
        other: ValueId,
        cache: CacheModifier,
        is_volatile: bool,
    },
    Store {
        result: ValueId,
        ptr: ValueId,
        value: ValueId,
    },
    MaskedStore {
        result: ValueId,
        ptr: ValueId,
        value: ValueId,
        mask: ValueId,
    },
    AtomicCas {
        result: ValueId,
        ptr: ValueId,
        cmp: ValueId,
        value: ValueId,
    },
    AtomicRmw {
        result: ValueId,
        op: RmwOp,
        ptr: ValueId,
        value: ValueId,
        mask: ValueId,
    },

    // ---- Programming model ----
    GetProgramId {
        result: ValueId,
        axis: u32,
    },
    GetNumPrograms {
        result: ValueId,
        axis: u32,
    },
    /// The int32 block `{start, start+1, .., end-1}`.
    Range {
        result: ValueId,
        start: i32,
        end: i32,
    },

    // ---- Linear algebra / indexing / reductions ----
    Dot {
        result: ValueId,
        lhs: ValueId,
        rhs: ValueId,
        acc: ValueId,
        allow_tf32: bool,
    },
    Select {
        result: ValueId,
        cond: ValueId,
        then_val: ValueId,
        else_val: ValueId,
    },
    Reduce {
        result: ValueId,
        op: ReduceOp,
        operand: ValueId,
        axis: u32,
    },

    // ---- Math ----
    MathUnary {
        result: ValueId,
        op: MathOp,
        operand: ValueId,
    },
    /// High half of the full-width unsigned product.
    Umulhi {
        result: ValueId,
        lhs: ValueId,
        rhs: ValueId,
    },

    Barrier {
        result: ValueId,
    },

    // ---- Control flow ----
    /// SSA merge node: selects a value by predecessor block.
    Phi {
        result: ValueId,
        ty: IrType,
        incomings: Vec<(ValueId, BlockId)>,
    },
    Br {
        target: BlockId,
    },
    CondBr {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Return {
        value: Option<ValueId>,
    },
    Call {
        result: Option<ValueId>,
        callee: FunctionId,
        args: Vec<ValueId>,
    },
}

impl IrInstr {
    /// Returns the `ValueId` produced by this instruction, if any.
    pub fn result(&self) -> Option<ValueId> {
        match self {
            IrInstr::Binary { result, .. }
            | IrInstr::Icmp { result, .. }
            | IrInstr::Fcmp { result, .. }
            | IrInstr::Cast { result, .. }
            | IrInstr::Gep { result, .. }
            | IrInstr::Splat { result, .. }
            | IrInstr::Broadcast { result, .. }
            | IrInstr::Reshape { result, .. }
            | IrInstr::Cat { result, .. }
            | IrInstr::Load { result, .. }
            | IrInstr::MaskedLoad { result, .. }
            | IrInstr::Store { result, .. }
            | IrInstr::MaskedStore { result, .. }
            | IrInstr::AtomicCas { result, .. }
            | IrInstr::AtomicRmw { result, .. }
            | IrInstr::GetProgramId { result, .. }
            | IrInstr::GetNumPrograms { result, .. }
            | IrInstr::Range { result, .. }
            | IrInstr::Dot { result, .. }
            | IrInstr::Select { result, .. }
            | IrInstr::Reduce { result, .. }
            | IrInstr::MathUnary { result, .. }
            | IrInstr::Umulhi { result, .. }
            | IrInstr::Barrier { result }
            | IrInstr::Phi { result, .. } => Some(*result),
            IrInstr::Call { result, .. } => *result,
            IrInstr::Br { .. } | IrInstr::CondBr { .. } | IrInstr::Return { .. } => None,
        }
    }

    /// Returns `true` if this instruction is a block terminator.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            IrInstr::Br { .. } | IrInstr::CondBr { .. } | IrInstr::Return { .. }
        )
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, IrInstr::Phi { .. })
    }

    /// Returns all `ValueId`s consumed by this instruction (operands).
    pub fn operands(&self) -> Vec<ValueId> {
        let mut ops = Vec::new();
        self.visit_operands(|v| ops.push(v));
        ops
    }

    fn visit_operands(&self, mut f: impl FnMut(ValueId)) {
        match self {
            IrInstr::Binary { lhs, rhs, .. }
            | IrInstr::Icmp { lhs, rhs, .. }
            | IrInstr::Fcmp { lhs, rhs, .. }
            | IrInstr::Cat { lhs, rhs, .. }
            | IrInstr::Umulhi { lhs, rhs, .. } => {
                f(*lhs);
                f(*rhs);
            }
            IrInstr::Cast { operand, .. }
            | IrInstr::Splat { operand, .. }
            | IrInstr::Broadcast { operand, .. }
            | IrInstr::Reshape { operand, .. }
            | IrInstr::Reduce { operand, .. }
            | IrInstr::MathUnary { operand, .. } => f(*operand),
            IrInstr::Gep { ptr, offset, .. } => {
                f(*ptr);
                f(*offset);
            }
            IrInstr::Load { ptr, .. } => f(*ptr),
            IrInstr::MaskedLoad {
                ptr, mask, other, ..
            } => {
                f(*ptr);
                f(*mask);
                f(*other);
            }
            IrInstr::Store { ptr, value, .. } => {
                f(*ptr);
                f(*value);
            }
            IrInstr::MaskedStore {
                ptr, value, mask, ..
            } => {
                f(*ptr);
                f(*value);
                f(*mask);
            }
            IrInstr::AtomicCas {
                ptr, cmp, value, ..
            } => {
                f(*ptr);
                f(*cmp);
                f(*value);
            }
            IrInstr::AtomicRmw {
                ptr, value, mask, ..
            } => {
                f(*ptr);
                f(*value);
                f(*mask);
            }
            IrInstr::Dot { lhs, rhs, acc, .. } => {
                f(*lhs);
                f(*rhs);
                f(*acc);
            }
            IrInstr::Select {
                cond,
                then_val,
                else_val,
                ..
            } => {
                f(*cond);
                f(*then_val);
                f(*else_val);
            }
            IrInstr::Phi { incomings, .. } => {
                for (v, _) in incomings {
                    f(*v);
                }
            }
            IrInstr::CondBr { cond, .. } => f(*cond),
            IrInstr::Return { value } => {
                if let Some(v) = value {
                    f(*v);
                }
            }
            IrInstr::Call { args, .. } => {
                for a in args {
                    f(*a);
                }
            }
            IrInstr::GetProgramId { .. }
            | IrInstr::GetNumPrograms { .. }
            | IrInstr::Range { .. }
            | IrInstr::Barrier { .. }
            | IrInstr::Br { .. } => {}
        }
    }

    /// Applies `f` to every operand position. The result is not visited;
    /// use `remap_result` for that.
    pub fn for_each_operand_mut(&mut self, mut f: impl FnMut(&mut ValueId)) {
        match self {
            IrInstr::Binary { lhs, rhs, .. }
            | IrInstr::Icmp { lhs, rhs, .. }
            | IrInstr::Fcmp { lhs, rhs, .. }
            | IrInstr::Cat { lhs, rhs, .. }
            | IrInstr::Umulhi { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            IrInstr::Cast { operand, .. }
            | IrInstr::Splat { operand, .. }
            | IrInstr::Broadcast { operand, .. }
            | IrInstr::Reshape { operand, .. }
            | IrInstr::Reduce { operand, .. }
            | IrInstr::MathUnary { operand, .. } => f(operand),
            IrInstr::Gep { ptr, offset, .. } => {
                f(ptr);
                f(offset);
            }
            IrInstr::Load { ptr, .. } => f(ptr),
            IrInstr::MaskedLoad {
                ptr, mask, other, ..
            } => {
                f(ptr);
                f(mask);
                f(other);
            }
            IrInstr::Store { ptr, value, .. } => {
                f(ptr);
                f(value);
            }
            IrInstr::MaskedStore {
                ptr, value, mask, ..
            } => {
                f(ptr);
                f(value);
                f(mask);
            }
            IrInstr::AtomicCas {
                ptr, cmp, value, ..
            } => {
                f(ptr);
                f(cmp);
                f(value);
            }
            IrInstr::AtomicRmw {
                ptr, value, mask, ..
            } => {
                f(ptr);
                f(value);
                f(mask);
            }
            IrInstr::Dot { lhs, rhs, acc, .. } => {
                f(lhs);
                f(rhs);
                f(acc);
            }
            IrInstr::Select {
                cond,
                then_val,
                else_val,
                ..
            } => {
                f(cond);
                f(then_val);
                f(else_val);
            }
            IrInstr::Phi { incomings, .. } => {
                for (v, _) in incomings {
                    f(v);
                }
            }
            IrInstr::CondBr { cond, .. } => f(cond),
            IrInstr::Return { value } => {
                if let Some(v) = value {
                    f(v);
                }
            }
            IrInstr::Call { args, .. } => {
                for a in args {
                    f(a);
                }
            }
            IrInstr::GetProgramId { .. }
            | IrInstr::GetNumPrograms { .. }
            | IrInstr::Range { .. }
            | IrInstr::Barrier { .. }
            | IrInstr::Br { .. } => {}
        }
    }

    /// Replaces every operand use of `old` with `new`. The result id is
    /// left untouched.
    pub fn replace_uses_of_value(&mut self, old: ValueId, new: ValueId) {
        self.for_each_operand_mut(|v| {
            if *v == old {
                *v = new;
            }
        });
    }

    /// Rewrites the result id through `f`.
    pub fn remap_result(&mut self, mut f: impl FnMut(&mut ValueId)) {
        match self {
            IrInstr::Binary { result, .. }
            | IrInstr::Icmp { result, .. }
            | IrInstr::Fcmp { result, .. }
            | IrInstr::Cast { result, .. }
            | IrInstr::Gep { result, .. }
            | IrInstr::Splat { result, .. }
            | IrInstr::Broadcast { result, .. }
            | IrInstr::Reshape { result, .. }
            | IrInstr::Cat { result, .. }
            | IrInstr::Load { result, .. }
            | IrInstr::MaskedLoad { result, .. }
            | IrInstr::Store { result, .. }
            | IrInstr::MaskedStore { result, .. }
            | IrInstr::AtomicCas { result, .. }
            | IrInstr::AtomicRmw { result, .. }
            | IrInstr::GetProgramId { result, .. }
            | IrInstr::GetNumPrograms { result, .. }
            | IrInstr::Range { result, .. }
            | IrInstr::Dot { result, .. }
            | IrInstr::Select { result, .. }
            | IrInstr::Reduce { result, .. }
            | IrInstr::MathUnary { result, .. }
            | IrInstr::Umulhi { result, .. }
            | IrInstr::Barrier { result }
            | IrInstr::Phi { result, .. } => f(result),
            IrInstr::Call { result, .. } => {
                if let Some(r) = result {
                    f(r);
                }
            }
            IrInstr::Br { .. } | IrInstr::CondBr { .. } | IrInstr::Return { .. } => {}
        }
    }

    /// Applies `f` to every block reference (branch targets and phi
    /// incoming blocks). A single pass, so substitutions never chain.
    pub fn for_each_block_mut(&mut self, mut f: impl FnMut(&mut BlockId)) {
        match self {
            IrInstr::Br { target } => f(target),
            IrInstr::CondBr {
                then_block,
                else_block,
                ..
            } => {
                f(then_block);
                f(else_block);
            }
            IrInstr::Phi { incomings, .. } => {
                for (_, b) in incomings {
                    f(b);
                }
            }
            _ => {}
        }
    }

    /// Replaces every reference to block `old` with `new`.
    pub fn replace_uses_of_block(&mut self, old: BlockId, new: BlockId) {
        self.for_each_block_mut(|b| {
            if *b == old {
                *b = new;
            }
        });
    }
}
