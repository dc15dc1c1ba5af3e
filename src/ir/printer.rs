//! IR pretty-printer.
//!
//! Output is deterministic: functions in `FunctionId` order, blocks in
//! `BlockId` order, instructions in program order. The entry block is
//! marked, since block vector order stops being control-flow order once
//! the inliner has split blocks.

use std::fmt;

use crate::ir::block::IrBlock;
use crate::ir::function::IrFunction;
use crate::ir::instr::{CacheModifier, CastOp, IrInstr, MathOp, RmwOp};
use crate::ir::module::IrModule;
use crate::ir::types::Shape;

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// module: {}", self.name)?;
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
        }
        writeln!(f, ") -> {} {{", self.return_ty)?;
        for block in &self.blocks {
            write!(f, "{}", BlockPrinter { block, func: self })?;
        }
        writeln!(f, "}}")
    }
}

struct BlockPrinter<'a> {
    block: &'a IrBlock,
    func: &'a IrFunction,
}

impl fmt::Display for BlockPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.block.name.as_deref().unwrap_or("bb");
        let entry = if self.func.entry == self.block.id {
            " // entry"
        } else {
            ""
        };
        write!(f, "  {}.{}(", label, self.block.id.0)?;
        for (i, param) in self.block.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.id, param.ty)?;
        }
        writeln!(f, "):{}", entry)?;
        for instr in &self.block.instrs {
            writeln!(f, "    {}", instr)?;
        }
        Ok(())
    }
}

fn shape_str(shape: &Shape) -> String {
    shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::Binary {
                result,
                op,
                lhs,
                rhs,
                fdiv_ieee_rounding,
            } => {
                write!(f, "{} = {} {}, {}", result, op, lhs, rhs)?;
                if *fdiv_ieee_rounding {
                    write!(f, " ieee")?;
                }
                Ok(())
            }
            IrInstr::Icmp {
                result,
                pred,
                lhs,
                rhs,
            } => write!(f, "{} = icmp.{:?} {}, {}", result, pred, lhs, rhs),
            IrInstr::Fcmp {
                result,
                pred,
                lhs,
                rhs,
            } => write!(f, "{} = fcmp.{:?} {}, {}", result, pred, lhs, rhs),
            IrInstr::Cast {
                result,
                op,
                operand,
                to_ty,
            } => {
                let name = match op {
                    CastOp::FpTrunc => "fptrunc",
                    CastOp::FpExt => "fpext",
                    CastOp::FpToSi => "fptosi",
                    CastOp::FpToUi => "fptoui",
                    CastOp::SiToFp => "sitofp",
                    CastOp::UiToFp => "uitofp",
                    CastOp::IntCast { sign_extend: true } => "sext",
                    CastOp::IntCast { sign_extend: false } => "zext",
                    CastOp::PtrToInt => "ptrtoint",
                    CastOp::IntToPtr => "inttoptr",
                    CastOp::Bitcast => "bitcast",
                };
                write!(f, "{} = {} {} to {}", result, name, operand, to_ty)
            }
            IrInstr::Gep {
                result,
                ptr,
                offset,
            } => write!(f, "{} = gep {}, {}", result, ptr, offset),
            IrInstr::Splat {
                result,
                operand,
                shape,
            } => write!(f, "{} = splat {} <{}>", result, operand, shape_str(shape)),
            IrInstr::Broadcast {
                result,
                operand,
                shape,
            } => write!(
                f,
                "{} = broadcast {} <{}>",
                result,
                operand,
                shape_str(shape)
            ),
            IrInstr::Reshape {
                result,
                operand,
                shape,
            } => write!(f, "{} = reshape {} <{}>", result, operand, shape_str(shape)),
            IrInstr::Cat { result, lhs, rhs } => write!(f, "{} = cat {}, {}", result, lhs, rhs),
            IrInstr::Load {
                result,
                ptr,
                cache,
                is_volatile,
            } => {
                write!(f, "{} = load {}", result, ptr)?;
                write_load_attrs(f, *cache, *is_volatile)
            }
            IrInstr::MaskedLoad {
                result,
                ptr,
                mask,
                other,
                cache,
                is_volatile,
            } => {
                write!(f, "{} = masked.load {}, {}, {}", result, ptr, mask, other)?;
                write_load_attrs(f, *cache, *is_volatile)
            }
            IrInstr::Store { ptr, value, .. } => write!(f, "store {}, {}", ptr, value),
            IrInstr::MaskedStore {
                ptr, value, mask, ..
            } => write!(f, "masked.store {}, {}, {}", ptr, value, mask),
            IrInstr::AtomicCas {
                result,
                ptr,
                cmp,
                value,
            } => write!(f, "{} = atomic.cas {}, {}, {}", result, ptr, cmp, value),
            IrInstr::AtomicRmw {
                result,
                op,
                ptr,
                value,
                mask,
            } => {
                let name = match op {
                    RmwOp::Add => "add",
                    RmwOp::FAdd => "fadd",
                    RmwOp::And => "and",
                    RmwOp::Or => "or",
                    RmwOp::Xor => "xor",
                    RmwOp::Xchg => "xchg",
                    RmwOp::Max => "max",
                    RmwOp::Min => "min",
                    RmwOp::UMax => "umax",
                    RmwOp::UMin => "umin",
                };
                write!(
                    f,
                    "{} = atomic.{} {}, {}, {}",
                    result, name, ptr, value, mask
                )
            }
            IrInstr::GetProgramId { result, axis } => {
                write!(f, "{} = program.id {}", result, axis)
            }
            IrInstr::GetNumPrograms { result, axis } => {
                write!(f, "{} = num.programs {}", result, axis)
            }
            IrInstr::Range { result, start, end } => {
                write!(f, "{} = range {}, {}", result, start, end)
            }
            IrInstr::Dot {
                result,
                lhs,
                rhs,
                acc,
                allow_tf32,
            } => {
                write!(f, "{} = dot {}, {}, {}", result, lhs, rhs, acc)?;
                if *allow_tf32 {
                    write!(f, " tf32")?;
                }
                Ok(())
            }
            IrInstr::Select {
                result,
                cond,
                then_val,
                else_val,
            } => write!(f, "{} = select {}, {}, {}", result, cond, then_val, else_val),
            IrInstr::Reduce {
                result,
                op,
                operand,
                axis,
            } => write!(f, "{} = reduce.{:?} {}, axis={}", result, op, operand, axis),
            IrInstr::MathUnary {
                result,
                op,
                operand,
            } => {
                let name = match op {
                    MathOp::Exp => "exp",
                    MathOp::Log => "log",
                    MathOp::Cos => "cos",
                    MathOp::Sin => "sin",
                    MathOp::Sqrt => "sqrt",
                };
                write!(f, "{} = {} {}", result, name, operand)
            }
            IrInstr::Umulhi { result, lhs, rhs } => {
                write!(f, "{} = umulhi {}, {}", result, lhs, rhs)
            }
            IrInstr::Barrier { .. } => write!(f, "barrier"),
            IrInstr::Phi {
                result, incomings, ..
            } => {
                write!(f, "{} = phi ", result)?;
                for (i, (v, b)) in incomings.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {}]", v, b)?;
                }
                Ok(())
            }
            IrInstr::Br { target } => write!(f, "br {}", target),
            IrInstr::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(f, "br {}, {}, {}", cond, then_block, else_block),
            IrInstr::Return { value } => match value {
                Some(v) => write!(f, "ret {}", v),
                None => write!(f, "ret"),
            },
            IrInstr::Call {
                result,
                callee,
                args,
            } => {
                if let Some(r) = result {
                    write!(f, "{} = ", r)?;
                }
                write!(f, "call @fn{}(", callee.0)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_load_attrs(f: &mut fmt::Formatter<'_>, cache: CacheModifier, is_volatile: bool) -> fmt::Result {
    match cache {
        CacheModifier::None => {}
        CacheModifier::Ca => write!(f, " .ca")?,
        CacheModifier::Cg => write!(f, " .cg")?,
    }
    if is_volatile {
        write!(f, " volatile")?;
    }
    Ok(())
}
