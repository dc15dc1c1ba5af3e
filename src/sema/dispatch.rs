//! The language-semantics facade.
//!
//! Every operation takes frontend values plus a `(TypeContext, IrBuilder)`
//! pair, validates operand types, applies implicit broadcasting and numeric
//! promotion, emits the typed IR, and returns a new frontend value. This is
//! where the source language's numeric model lives: the cast matrix, the
//! promotion rules, pointer arithmetic, masked memory access, atomics, and
//! reductions.
//!
//! Operations recurse into one another freely — `minus` is a subtraction
//! from zero, pointer-to-bool casts go through `not_equal`, the float
//! atomic max/min lower through `bitcast`/`bit_and`/`select`.

use crate::error::{Error, SemanticError};
use crate::ir::builder::IrBuilder;
use crate::ir::instr::{
    BinOp, CacheModifier, CastOp, FcmpPred, IcmpPred, MathOp, RmwOp, ReduceOp,
};
use crate::ir::types::Shape;
use crate::ir::value::MetadataHint;
use crate::sema::context::TypeContext;
use crate::sema::promote::{broadcast_shapes, computation_type, integer_promote, DivOrMod};
use crate::sema::types::{FrontendType, Signedness};
use crate::sema::value::FrontendValue;

// ---------------------------------------------------------------------------
// Programming model
// ---------------------------------------------------------------------------

pub fn program_id(
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let ret = builder.create_get_program_id(axis);
    Ok(ctx.value_from_ir(builder, ret, Signedness::Signed))
}

pub fn num_programs(
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let ret = builder.create_get_num_programs(axis);
    Ok(ctx.value_from_ir(builder, ret, Signedness::Signed))
}

// ---------------------------------------------------------------------------
// Implicit conversion utilities
// ---------------------------------------------------------------------------

fn incompatible(a: &FrontendType, b: &FrontendType) -> Error {
    SemanticError::IncompatibleTypes {
        lhs: a.to_string(),
        rhs: b.to_string(),
    }
    .into()
}

fn check_ptr_operand(a: &FrontendType, b: &FrontendType, allow_ptr_a: bool) -> Result<(), Error> {
    if a.is_ptr() {
        if !allow_ptr_a {
            return Err(incompatible(a, b));
        }
        // T* + U* with T != U
        if b.is_ptr() && a != b {
            return Err(incompatible(a, b));
        }
        // T* + float
        if b.is_fp() {
            return Err(incompatible(a, b));
        }
    }
    Ok(())
}

/// Common preamble of every binary operation: two-way broadcast, pointer
/// operand validation, and (when `arithmetic_check` is set) conversion of
/// both sides to their computation type.
#[allow(clippy::too_many_arguments)]
fn binary_op_type_checking(
    lhs: FrontendValue,
    rhs: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
    allow_lhs_ptr: bool,
    allow_rhs_ptr: bool,
    arithmetic_check: bool,
    div_or_mod: DivOrMod,
) -> Result<(FrontendValue, FrontendValue), Error> {
    // implicit broadcasting
    let (mut lhs, mut rhs) = broadcast_pair(lhs, rhs, ctx, builder)?;
    // implicit typecasting
    let lhs_sca = lhs.scalar_ty().clone();
    let rhs_sca = rhs.scalar_ty().clone();
    check_ptr_operand(&lhs_sca, &rhs_sca, allow_lhs_ptr)?;
    check_ptr_operand(&rhs_sca, &lhs_sca, allow_rhs_ptr)?;
    if arithmetic_check && !lhs_sca.is_ptr() && !rhs_sca.is_ptr() {
        let ret_sca = computation_type(&lhs_sca, &rhs_sca, div_or_mod)?;
        lhs = cast(lhs, &ret_sca, ctx, builder)?;
        rhs = cast(rhs, &ret_sca, ctx, builder)?;
    }
    Ok((lhs, rhs))
}

// ---------------------------------------------------------------------------
// Binary operators
// ---------------------------------------------------------------------------

pub fn add(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (mut input, mut other) =
        binary_op_type_checking(input, other, ctx, builder, true, true, true, DivOrMod::No)?;
    // offset + ptr: canonicalize so the pointer is on the left
    if other.scalar_ty().is_ptr() && !input.scalar_ty().is_ptr() {
        std::mem::swap(&mut input, &mut other);
    }
    let scalar = input.scalar_ty().clone();
    // ptr + offset
    if scalar.is_ptr() {
        let ret = builder.create_gep(input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    // float + float
    if scalar.is_fp() {
        let ret = builder.create_binary(BinOp::FAdd, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    // int + int
    if scalar.is_int() {
        let ret = builder.create_binary(BinOp::Add, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    Err(Error::unreachable("add"))
}

pub fn sub(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, true, false, true, DivOrMod::No)?;
    let scalar = input.scalar_ty().clone();
    // ptr - offset
    if scalar.is_ptr() {
        let neg = minus(other, ctx, builder)?;
        let ret = builder.create_gep(input.ir, neg.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    if scalar.is_fp() {
        let ret = builder.create_binary(BinOp::FSub, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    if scalar.is_int() {
        let ret = builder.create_binary(BinOp::Sub, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    Err(Error::unreachable("sub"))
}

pub fn mul(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, true, DivOrMod::No)?;
    let scalar = input.scalar_ty().clone();
    if scalar.is_fp() {
        let ret = builder.create_binary(BinOp::FMul, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    if scalar.is_int() {
        let ret = builder.create_binary(BinOp::Mul, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    Err(Error::unreachable("mul"))
}

/// `/`: always a floating-point division. int/int goes to f32; the
/// arithmetic check has already put mixed operands on a common type (and
/// rejected mixed-signedness integers).
pub fn truediv(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, true, DivOrMod::Yes)?;
    let scalar = input.scalar_ty().clone();
    let (input, other) = if scalar.is_int() {
        let fp32 = FrontendType::fp32();
        (
            cast(input, &fp32, ctx, builder)?,
            cast(other, &fp32, ctx, builder)?,
        )
    } else if scalar.is_fp() {
        (input, other)
    } else {
        return Err(Error::unreachable("div"));
    };
    let ret = builder.create_binary(BinOp::FDiv, input.ir, other.ir);
    Ok(ctx.create_value(ret, input.ty))
}

/// `//`: integer-only division, signed or unsigned by the promoted type.
pub fn floordiv(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, true, DivOrMod::Yes)?;
    let scalar = input.scalar_ty().clone();
    if scalar.is_int() {
        let op = if scalar.is_signed_int() {
            BinOp::SDiv
        } else {
            BinOp::UDiv
        };
        let ret = builder.create_binary(op, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    Err(Error::unreachable("floordiv"))
}

/// Raw floating-point division with an explicit IEEE-rounding request.
/// Unlike `truediv`, integers are rejected rather than promoted.
pub fn fdiv(
    input: FrontendValue,
    other: FrontendValue,
    ieee_rounding: bool,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if !input.scalar_ty().is_fp() || !other.scalar_ty().is_fp() {
        return Err(SemanticError::NonFloatFdiv.into());
    }
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, false, DivOrMod::Yes)?;
    let ret = builder.create_binary(BinOp::FDiv, input.ir, other.ir);
    builder.set_fdiv_ieee_rounding(ret, ieee_rounding);
    Ok(ctx.create_value(ret, input.ty))
}

pub fn modulo(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, true, DivOrMod::Yes)?;
    let scalar = input.scalar_ty().clone();
    // float % float
    if scalar.is_fp() {
        let ret = builder.create_binary(BinOp::FRem, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    // int % int; mixed signedness was rejected by the computation type
    if scalar.is_int() {
        let op = if scalar.is_signed_int() {
            BinOp::SRem
        } else {
            BinOp::URem
        };
        let ret = builder.create_binary(op, input.ir, other.ir);
        return Ok(ctx.create_value(ret, input.ty));
    }
    Err(Error::unreachable("mod"))
}

// ---------------------------------------------------------------------------
// Bitwise operators
// ---------------------------------------------------------------------------

fn bitwise_op_type_checking(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<(FrontendValue, FrontendValue), Error> {
    let (mut input, mut other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, false, DivOrMod::No)?;
    let input_sca = input.scalar_ty().clone();
    let other_sca = other.scalar_ty().clone();
    if !input_sca.is_int() || !other_sca.is_int() {
        return Err(incompatible(&input_sca, &other_sca));
    }
    let ret_sca = integer_promote(&input_sca, &other_sca)?;
    if ret_sca != input_sca {
        input = cast(input, &ret_sca, ctx, builder)?;
    }
    if ret_sca != other_sca {
        other = cast(other, &ret_sca, ctx, builder)?;
    }
    Ok((input, other))
}

fn bitwise_binary(
    op: BinOp,
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (input, other) = bitwise_op_type_checking(input, other, ctx, builder)?;
    let ret = builder.create_binary(op, input.ir, other.ir);
    Ok(ctx.create_value(ret, input.ty))
}

pub fn bit_and(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    bitwise_binary(BinOp::And, input, other, ctx, builder)
}

pub fn bit_or(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    bitwise_binary(BinOp::Or, input, other, ctx, builder)
}

pub fn bit_xor(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    bitwise_binary(BinOp::Xor, input, other, ctx, builder)
}

pub fn shl(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    bitwise_binary(BinOp::Shl, input, other, ctx, builder)
}

pub fn lshr(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    bitwise_binary(BinOp::LShr, input, other, ctx, builder)
}

// ---------------------------------------------------------------------------
// Unary operators
// ---------------------------------------------------------------------------

pub fn plus(input: FrontendValue) -> Result<FrontendValue, Error> {
    Ok(input)
}

pub fn minus(
    input: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let scalar = input.scalar_ty().clone();
    if scalar.is_ptr() {
        return Err(SemanticError::InvalidUnaryOperand {
            op: "minus",
            ty: scalar.to_string(),
        }
        .into());
    }
    let zero = builder.get_null(scalar.ir_type());
    let zero = ctx.create_value(zero, scalar);
    sub(zero, input, ctx, builder)
}

pub fn invert(
    input: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let scalar = input.scalar_ty().clone();
    if scalar.is_ptr() || scalar.is_fp() {
        return Err(SemanticError::InvalidUnaryOperand {
            op: "invert",
            ty: scalar.to_string(),
        }
        .into());
    }
    let ones = builder.get_all_ones(scalar.ir_type());
    let ones = ctx.create_value(ones, scalar);
    bit_xor(input, ones, ctx, builder)
}

// ---------------------------------------------------------------------------
// Comparison operators
// ---------------------------------------------------------------------------

/// Bool with the same shape as `ty`.
fn bool_like(ty: &FrontendType) -> FrontendType {
    match ty.block_shape() {
        Some(shape) => FrontendType::block(FrontendType::bool_ty(), shape.clone()),
        None => FrontendType::bool_ty(),
    }
}

#[allow(clippy::too_many_arguments)]
fn compare_op(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
    fpred: FcmpPred,
    signed_pred: IcmpPred,
    unsigned_pred: IcmpPred,
    key: &'static str,
) -> Result<FrontendValue, Error> {
    let (input, other) =
        binary_op_type_checking(input, other, ctx, builder, false, false, true, DivOrMod::No)?;
    let ret_ty = bool_like(&input.ty);
    let scalar = input.scalar_ty().clone();
    if scalar.is_fp() {
        let ret = builder.create_fcmp(fpred, input.ir, other.ir);
        return Ok(ctx.create_value(ret, ret_ty));
    }
    if scalar.is_int() {
        let pred = if scalar.is_signed_int() {
            signed_pred
        } else {
            unsigned_pred
        };
        let ret = builder.create_icmp(pred, input.ir, other.ir);
        return Ok(ctx.create_value(ret, ret_ty));
    }
    Err(Error::unreachable(key))
}

pub fn greater_than(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Ogt,
        IcmpPred::Sgt,
        IcmpPred::Ugt,
        "greater_than",
    )
}

pub fn greater_equal(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Oge,
        IcmpPred::Sge,
        IcmpPred::Uge,
        "greater_equal",
    )
}

pub fn less_than(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Olt,
        IcmpPred::Slt,
        IcmpPred::Ult,
        "less_than",
    )
}

pub fn less_equal(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Ole,
        IcmpPred::Sle,
        IcmpPred::Ule,
        "less_equal",
    )
}

pub fn equal(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Oeq,
        IcmpPred::Eq,
        IcmpPred::Eq,
        "equal",
    )
}

pub fn not_equal(
    input: FrontendValue,
    other: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    compare_op(
        input,
        other,
        ctx,
        builder,
        FcmpPred::Une,
        IcmpPred::Ne,
        IcmpPred::Ne,
        "not_equal",
    )
}

// ---------------------------------------------------------------------------
// Block creation
// ---------------------------------------------------------------------------

/// The int32 block `{start, .., end-1}`.
pub fn arange(
    start: i32,
    end: i32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if end <= start {
        return Err(SemanticError::EmptyRange { start, end }.into());
    }
    let ret = builder.get_range(start, end);
    Ok(ctx.value_from_ir(builder, ret, Signedness::Signed))
}

/// A block of `dtype` filled with its null value.
pub fn zeros(
    shape: Shape,
    dtype: &FrontendType,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if shape.is_empty() {
        return Err(SemanticError::ZeroRankBlock.into());
    }
    let zero = builder.get_null(dtype.ir_type());
    let ret = builder.create_splat(zero, shape);
    Ok(ctx.value_from_ir(builder, ret, dtype.signedness()))
}

// ---------------------------------------------------------------------------
// Shape manipulation
// ---------------------------------------------------------------------------

pub fn reshape(
    input: FrontendValue,
    dst_shape: Shape,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if dst_shape.is_empty() {
        return Err(SemanticError::ZeroRankBlock.into());
    }
    let numel: u64 = dst_shape.iter().map(|&d| u64::from(d)).product();
    if input.ty.num_elements() != numel {
        return Err(SemanticError::CannotReshape {
            src: input.ty.num_elements(),
            dst: numel,
        }
        .into());
    }
    let signedness = input.ty.signedness();
    let ret = builder.create_reshape(input.ir, dst_shape);
    Ok(ctx.value_from_ir(builder, ret, signedness))
}

/// Concatenation along the leading axis.
pub fn cat(
    lhs: FrontendValue,
    rhs: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let signedness = lhs.ty.signedness();
    let ret = builder.create_cat(lhs.ir, rhs.ir);
    Ok(ctx.value_from_ir(builder, ret, signedness))
}

/// Broadcasts `input` to `shape`: scalars are splatted, blocks of the same
/// rank are stretched. Broadcasting never changes rank.
pub fn broadcast(
    input: FrontendValue,
    shape: Shape,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if shape.is_empty() {
        return Err(SemanticError::ZeroRankBlock.into());
    }
    let signedness = input.ty.signedness();
    let src_shape = match input.ty.block_shape() {
        None => {
            let ret = builder.create_splat(input.ir, shape);
            return Ok(ctx.value_from_ir(builder, ret, signedness));
        }
        Some(src) => src.clone(),
    };
    if src_shape.len() != shape.len() {
        return Err(SemanticError::CannotBroadcast {
            src: src_shape.len(),
            dst: shape.len(),
        }
        .into());
    }
    if src_shape == shape {
        return Ok(input);
    }
    let ret = builder.create_broadcast(input.ir, shape);
    Ok(ctx.value_from_ir(builder, ret, signedness))
}

/// Makes two values shape-compatible: a scalar is splatted to the other
/// side's shape; two blocks are reconciled dimension by dimension.
pub fn broadcast_pair(
    lhs: FrontendValue,
    rhs: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<(FrontendValue, FrontendValue), Error> {
    let lhs_shape = lhs.ty.block_shape().cloned();
    let rhs_shape = rhs.ty.block_shape().cloned();
    match (lhs_shape, rhs_shape) {
        (Some(shape), None) => {
            let ty = FrontendType::block(rhs.ty.clone(), shape.clone());
            let ir = builder.create_splat(rhs.ir, shape);
            Ok((lhs, ctx.create_value(ir, ty)))
        }
        (None, Some(shape)) => {
            let ty = FrontendType::block(lhs.ty.clone(), shape.clone());
            let ir = builder.create_splat(lhs.ir, shape);
            Ok((ctx.create_value(ir, ty), rhs))
        }
        (Some(lhs_shape), Some(rhs_shape)) => {
            let ret_shape = broadcast_shapes(&lhs_shape, &rhs_shape)?;
            let mut lhs = lhs;
            let mut rhs = rhs;
            if lhs_shape != ret_shape {
                let ty = FrontendType::block(lhs.scalar_ty().clone(), ret_shape.clone());
                let ir = builder.create_broadcast(lhs.ir, ret_shape.clone());
                lhs = ctx.create_value(ir, ty);
            }
            if rhs_shape != ret_shape {
                let ty = FrontendType::block(rhs.scalar_ty().clone(), ret_shape.clone());
                let ir = builder.create_broadcast(rhs.ir, ret_shape);
                rhs = ctx.create_value(ir, ty);
            }
            Ok((lhs, rhs))
        }
        (None, None) => Ok((lhs, rhs)),
    }
}

// ---------------------------------------------------------------------------
// Casts
// ---------------------------------------------------------------------------

/// Reinterprets the bits of `input` as `dst_ty`. Requires matching
/// primitive widths; pointer casts of any kind go through `cast`.
pub fn bitcast(
    input: FrontendValue,
    dst: &FrontendType,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let src_ty = input.ty.clone();
    let dst_ty = match src_ty.block_shape() {
        Some(shape) => FrontendType::block(dst.scalar_ty().clone(), shape.clone()),
        None => dst.clone(),
    };
    if src_ty == dst_ty {
        return Ok(input);
    }
    let src_sca = src_ty.scalar_ty();
    let dst_sca = dst_ty.scalar_ty();
    if src_sca.is_ptr() || dst_sca.is_ptr() {
        return cast(input, dst, ctx, builder);
    }
    let src_bits = src_sca
        .primitive_bits()
        .ok_or_else(|| Error::unreachable("bitcast"))?;
    let dst_bits = dst_sca
        .primitive_bits()
        .ok_or_else(|| Error::unreachable("bitcast"))?;
    if src_bits != dst_bits {
        return Err(SemanticError::BitcastWidthMismatch {
            src: src_bits,
            dst: dst_bits,
        }
        .into());
    }
    let ret = builder.create_cast(CastOp::Bitcast, input.ir, dst_ty.ir_type());
    Ok(ctx.create_value(ret, dst_ty))
}

/// Converts `input` to `dst` per the language's cast matrix. When the
/// source is a block, `dst` is promoted to a block of the same shape.
pub fn cast(
    input: FrontendValue,
    dst: &FrontendType,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let src_ty = input.ty.clone();
    let dst_ty = match src_ty.block_shape() {
        Some(shape) => FrontendType::block(dst.scalar_ty().clone(), shape.clone()),
        None => dst.clone(),
    };
    if src_ty == dst_ty {
        return Ok(input);
    }
    let src_sca = src_ty.scalar_ty().clone();
    let dst_sca = dst_ty.scalar_ty().clone();

    // fp truncation / extension, by mantissa width
    if src_sca.is_fp() && dst_sca.is_fp() {
        let op = if src_sca.mantissa_width() > dst_sca.mantissa_width() {
            CastOp::FpTrunc
        } else {
            CastOp::FpExt
        };
        let ret = builder.create_cast(op, input.ir, dst_ty.ir_type());
        return Ok(ctx.create_value(ret, dst_ty));
    }
    // int cast: width or signedness change
    if let (
        FrontendType::Int {
            bits: src_bits,
            signedness: src_sn,
        },
        FrontendType::Int {
            bits: dst_bits,
            signedness: dst_sn,
        },
    ) = (&src_sca, &dst_sca)
    {
        if src_bits != dst_bits || src_sn != dst_sn {
            // bool widens with zeros regardless of target signedness
            let sign_extend = *src_sn == Signedness::Signed && *src_bits != 1;
            let ret =
                builder.create_cast(CastOp::IntCast { sign_extend }, input.ir, dst_ty.ir_type());
            return Ok(ctx.create_value(ret, dst_ty));
        }
    }
    // float -> int
    if src_sca.is_fp() && dst_sca.is_int() {
        let op = if dst_sca.is_bool() {
            CastOp::FpToUi
        } else {
            CastOp::FpToSi
        };
        let ret = builder.create_cast(op, input.ir, dst_ty.ir_type());
        return Ok(ctx.create_value(ret, dst_ty));
    }
    // int -> float
    if src_sca.is_int() && dst_sca.is_fp() {
        let op = if src_sca.is_bool() || !src_sca.is_signed_int() {
            CastOp::UiToFp
        } else {
            CastOp::SiToFp
        };
        let ret = builder.create_cast(op, input.ir, dst_ty.ir_type());
        return Ok(ctx.create_value(ret, dst_ty));
    }
    // ptr -> int: only i64 directly; i1 goes through a null test
    if src_sca.is_ptr() && dst_sca.is_int() {
        if matches!(dst_sca, FrontendType::Int { bits: 64, .. }) {
            let ret = builder.create_cast(CastOp::PtrToInt, input.ir, dst_ty.ir_type());
            return Ok(ctx.create_value(ret, dst_ty));
        }
        if dst_sca.is_bool() {
            let as_int = cast(input, &FrontendType::int64(), ctx, builder)?;
            let zero = builder.get_int64(0);
            let zero = ctx.create_value(zero, FrontendType::int64());
            return not_equal(as_int, zero, ctx, builder);
        }
    }
    // int -> ptr
    if !src_sca.is_ptr() && dst_sca.is_ptr() {
        let ret = builder.create_cast(CastOp::IntToPtr, input.ir, dst_ty.ir_type());
        return Ok(ctx.create_value(ret, dst_ty));
    }
    // ptr -> ptr
    if src_sca.is_ptr() && dst_sca.is_ptr() {
        let ret = builder.create_cast(CastOp::Bitcast, input.ir, dst_ty.ir_type());
        return Ok(ctx.create_value(ret, dst_ty));
    }
    // * -> bool: compare against zero
    if dst_sca.is_bool() {
        let mut input = input;
        if input.scalar_ty().is_ptr() {
            input = cast(input, &FrontendType::int64(), ctx, builder)?;
        }
        let zero = builder.get_int64(0);
        let mut other = ctx.create_value(zero, FrontendType::int64());
        if let Some(shape) = input.ty.block_shape().cloned() {
            let ty = FrontendType::block(other.ty.clone(), shape.clone());
            let ir = builder.create_splat(other.ir, shape);
            other = ctx.create_value(ir, ty);
        }
        let ret = builder.create_icmp(IcmpPred::Ne, input.ir, other.ir);
        return Ok(ctx.create_value(ret, dst_ty));
    }
    Err(Error::unreachable(format!(
        "cast {} -> {}",
        src_sca, dst_sca
    )))
}

// ---------------------------------------------------------------------------
// Memory operators
// ---------------------------------------------------------------------------

pub fn parse_cache_modifier(s: &str) -> Result<CacheModifier, Error> {
    match s {
        "" => Ok(CacheModifier::None),
        ".ca" => Ok(CacheModifier::Ca),
        ".cg" => Ok(CacheModifier::Cg),
        other => Err(SemanticError::UnsupportedCacheModifier(other.to_owned()).into()),
    }
}

/// Rewrites a `*bool` pointer as `*i8`: bool blocks are stored as bytes.
/// Returns the (possibly cast) pointer and the element type to load/store.
fn element_ty_for_access(
    ptr: FrontendValue,
    op: &'static str,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<(FrontendValue, FrontendType), Error> {
    let (pointee, address_space) = match ptr.scalar_ty() {
        FrontendType::Ptr {
            pointee,
            address_space,
        } => ((**pointee).clone(), *address_space),
        _ => return Err(Error::unreachable(op)),
    };
    if pointee.is_bool() {
        let elt = FrontendType::int(8, Signedness::Signed);
        let ptr_ty = FrontendType::ptr(elt.clone(), address_space);
        let ptr = cast(ptr, &ptr_ty, ctx, builder)?;
        return Ok((ptr, elt));
    }
    Ok((ptr, pointee))
}

pub fn load(
    ptr: FrontendValue,
    mask: Option<FrontendValue>,
    other: Option<FrontendValue>,
    cache_modifier: &str,
    is_volatile: bool,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if !ptr.scalar_ty().is_ptr() {
        return Err(SemanticError::ExpectedPointer {
            op: "load",
            ty: ptr.ty.to_string(),
        }
        .into());
    }
    let mut mask = mask;
    let mut other = other;
    if let Some(shape) = ptr.ty.block_shape().cloned() {
        if let Some(m) = mask.take() {
            mask = Some(broadcast(m, shape.clone(), ctx, builder)?);
        }
        if let Some(o) = other.take() {
            let o = broadcast(o, shape, ctx, builder)?;
            let pointee = ptr
                .scalar_ty()
                .pointee()
                .cloned()
                .ok_or_else(|| Error::unreachable("load"))?;
            other = Some(cast(o, &pointee, ctx, builder)?);
        }
    }
    let (ptr, elt_ty) = element_ty_for_access(ptr, "load", ctx, builder)?;
    let cache = parse_cache_modifier(cache_modifier)?;
    match (mask, other) {
        (None, None) => {
            let ret = builder.create_load(ptr.ir, cache, is_volatile);
            Ok(ctx.value_from_ir(builder, ret, elt_ty.signedness()))
        }
        (None, Some(_)) => Err(SemanticError::OtherWithoutMask.into()),
        (Some(mask), other) => {
            let other = match other {
                Some(o) => o,
                None => {
                    // unmasked lanes read as undef
                    let undef = builder.get_undef(elt_ty.ir_type());
                    let mut o = ctx.create_value(undef, elt_ty.clone());
                    if let Some(shape) = ptr.ty.block_shape().cloned() {
                        let ty = FrontendType::block(elt_ty.clone(), shape.clone());
                        let ir = builder.create_splat(o.ir, shape);
                        o = ctx.create_value(ir, ty);
                    }
                    o
                }
            };
            let ret = builder.create_masked_load(ptr.ir, mask.ir, other.ir, cache, is_volatile);
            Ok(ctx.value_from_ir(builder, ret, elt_ty.signedness()))
        }
    }
}

pub fn store(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if !ptr.scalar_ty().is_ptr() {
        return Err(SemanticError::ExpectedPointer {
            op: "store",
            ty: ptr.ty.to_string(),
        }
        .into());
    }
    let mut val = val;
    let mut mask = mask;
    if let Some(shape) = ptr.ty.block_shape().cloned() {
        val = broadcast(val, shape.clone(), ctx, builder)?;
        if let Some(m) = mask.take() {
            mask = Some(broadcast(m, shape, ctx, builder)?);
        }
    }
    let (ptr, elt_ty) = element_ty_for_access(ptr, "store", ctx, builder)?;
    let val = cast(val, &elt_ty, ctx, builder)?;
    match mask {
        None => {
            let ret = builder.create_store(ptr.ir, val.ir);
            Ok(ctx.create_value(ret, FrontendType::Void))
        }
        Some(mask) => {
            if !mask.scalar_ty().is_bool() {
                return Err(SemanticError::NonBooleanMask(mask.ty.to_string()).into());
            }
            let ret = builder.create_masked_store(ptr.ir, val.ir, mask.ir);
            Ok(ctx.create_value(ret, FrontendType::Void))
        }
    }
}

pub fn atomic_cas(
    ptr: FrontendValue,
    cmp: FrontendValue,
    val: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let ret = builder.create_atomic_cas(ptr.ir, cmp.ir, val.ir);
    Ok(ctx.create_value(ret, val.ty))
}

/// Shared preamble of the atomic RMWs: pointer check, broadcast of value
/// and mask to the pointer's shape, value cast to the pointee type, and an
/// all-true mask when none is given.
fn atom_red_typechecking(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<(FrontendValue, FrontendValue, FrontendValue), Error> {
    if !ptr.scalar_ty().is_ptr() {
        return Err(SemanticError::ExpectedPointer {
            op: "atomic",
            ty: ptr.ty.to_string(),
        }
        .into());
    }
    let mut val = val;
    let mut mask = mask;
    if let Some(shape) = ptr.ty.block_shape().cloned() {
        if let Some(m) = mask.take() {
            mask = Some(broadcast(m, shape.clone(), ctx, builder)?);
        }
        val = broadcast(val, shape, ctx, builder)?;
    }
    let pointee = ptr
        .scalar_ty()
        .pointee()
        .cloned()
        .ok_or_else(|| Error::unreachable("atomic"))?;
    let val = cast(val, &pointee, ctx, builder)?;
    let mask = match mask {
        Some(m) => m,
        None => {
            let all = builder.get_int1(true);
            let mut m = ctx.create_value(all, FrontendType::bool_ty());
            if let Some(shape) = ptr.ty.block_shape().cloned() {
                let ty = FrontendType::block(FrontendType::bool_ty(), shape.clone());
                let ir = builder.create_splat(m.ir, shape);
                m = ctx.create_value(ir, ty);
            }
            m
        }
    };
    Ok((ptr, val, mask))
}

fn atomic_rmw_direct(
    op: RmwOp,
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (ptr, val, mask) = atom_red_typechecking(ptr, val, mask, ctx, builder)?;
    let ret = builder.create_atomic_rmw(op, ptr.ir, val.ir, mask.ir);
    Ok(ctx.create_value(ret, val.ty))
}

pub fn atomic_add(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (ptr, val, mask) = atom_red_typechecking(ptr, val, mask, ctx, builder)?;
    let op = if val.scalar_ty().is_fp() {
        RmwOp::FAdd
    } else {
        RmwOp::Add
    };
    let ret = builder.create_atomic_rmw(op, ptr.ir, val.ir, mask.ir);
    Ok(ctx.create_value(ret, val.ty))
}

pub fn atomic_and(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_rmw_direct(RmwOp::And, ptr, val, mask, ctx, builder)
}

pub fn atomic_or(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_rmw_direct(RmwOp::Or, ptr, val, mask, ctx, builder)
}

pub fn atomic_xor(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_rmw_direct(RmwOp::Xor, ptr, val, mask, ctx, builder)
}

pub fn atomic_xchg(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_rmw_direct(RmwOp::Xchg, ptr, val, mask, ctx, builder)
}

/// Float atomic max/min run two RMWs on an int32 reinterpretation — one
/// op over the non-negative lanes, the reversed unsigned op over the
/// negative lanes — and select by sign. IEEE floats order like
/// sign-magnitude integers within each sign bucket, so `Max` is correct
/// for values >= 0 and `UMin` picks the most negative value. f32 only;
/// other widths fail the 32-bit reinterpretation.
#[allow(clippy::too_many_arguments)]
fn atomic_extremum(
    int_signed_op: RmwOp,
    int_unsigned_op: RmwOp,
    float_pos_op: RmwOp,
    float_neg_op: RmwOp,
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (ptr, val, mask) = atom_red_typechecking(ptr, val, mask, ctx, builder)?;
    let scalar = val.scalar_ty().clone();
    if scalar.is_int() {
        let op = if scalar.is_signed_int() {
            int_signed_op
        } else {
            int_unsigned_op
        };
        let ret = builder.create_atomic_rmw(op, ptr.ir, val.ir, mask.ir);
        return Ok(ctx.create_value(ret, val.ty));
    }
    let fp_kind = match &scalar {
        FrontendType::Float(kind) => *kind,
        _ => return Err(Error::unreachable("atomic_max/min")),
    };
    let address_space = match ptr.scalar_ty() {
        FrontendType::Ptr { address_space, .. } => *address_space,
        _ => return Err(Error::unreachable("atomic_max/min")),
    };
    let i32_ty = FrontendType::int32();
    let i_val = bitcast(val.clone(), &i32_ty, ctx, builder)?;
    let i_ptr = bitcast(
        ptr,
        &FrontendType::ptr(i32_ty, address_space),
        ctx,
        builder,
    )?;
    let zero = builder.get_float(fp_kind, 0.0);
    let zero = ctx.create_value(zero, scalar);
    let pos = greater_equal(val.clone(), zero.clone(), ctx, builder)?;
    let neg = less_than(val, zero, ctx, builder)?;
    let pos_mask = bit_and(mask.clone(), pos.clone(), ctx, builder)?;
    let neg_mask = bit_and(mask, neg, ctx, builder)?;
    let pos_ret = builder.create_atomic_rmw(float_pos_op, i_ptr.ir, i_val.ir, pos_mask.ir);
    let pos_ret = ctx.create_value(pos_ret, i_val.ty.clone());
    let neg_ret = builder.create_atomic_rmw(float_neg_op, i_ptr.ir, i_val.ir, neg_mask.ir);
    let neg_ret = ctx.create_value(neg_ret, i_val.ty.clone());
    select(pos, pos_ret, neg_ret, ctx, builder)
}

pub fn atomic_max(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_extremum(
        RmwOp::Max,
        RmwOp::UMax,
        RmwOp::Max,
        RmwOp::UMin,
        ptr,
        val,
        mask,
        ctx,
        builder,
    )
}

pub fn atomic_min(
    ptr: FrontendValue,
    val: FrontendValue,
    mask: Option<FrontendValue>,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    atomic_extremum(
        RmwOp::Min,
        RmwOp::UMin,
        RmwOp::Min,
        RmwOp::UMax,
        ptr,
        val,
        mask,
        ctx,
        builder,
    )
}

// ---------------------------------------------------------------------------
// Linear algebra
// ---------------------------------------------------------------------------

/// `[M,K] x [K,N] -> [M,N]` matrix product. The accumulator starts at zero
/// in int32 for integer inputs and f32 otherwise; K agreement is left to
/// the IR.
pub fn dot(
    lhs: FrontendValue,
    rhs: FrontendValue,
    allow_tf32: bool,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (m, n) = match (lhs.ty.block_shape(), rhs.ty.block_shape()) {
        (Some(l), Some(r)) if l.len() == 2 && r.len() == 2 => (l[0], r[1]),
        _ => {
            return Err(SemanticError::DotRankMismatch {
                lhs: lhs.ty.to_string(),
                rhs: rhs.ty.to_string(),
            }
            .into())
        }
    };
    let zero = if lhs.scalar_ty().is_int() {
        builder.get_int32(0)
    } else {
        builder.get_float32(0.0)
    };
    let acc = builder.create_splat(zero, vec![m, n]);
    let ret = builder.create_dot(lhs.ir, rhs.ir, acc, allow_tf32);
    Ok(ctx.value_from_ir(builder, ret, Signedness::Signed))
}

// ---------------------------------------------------------------------------
// Indexing
// ---------------------------------------------------------------------------

/// Lane-wise selection (the language's `where`): casts the condition to
/// bool, broadcasts both arms to its shape, and promotes the arms to a
/// common type.
pub fn select(
    condition: FrontendValue,
    x: FrontendValue,
    y: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let condition = cast(condition, &FrontendType::bool_ty(), ctx, builder)?;
    let mut x = x;
    let mut y = y;
    if let Some(shape) = condition.ty.block_shape().cloned() {
        x = broadcast(x, shape.clone(), ctx, builder)?;
        y = broadcast(y, shape, ctx, builder)?;
    }
    let ty = computation_type(x.scalar_ty(), y.scalar_ty(), DivOrMod::No)?;
    let x = cast(x, &ty, ctx, builder)?;
    let y = cast(y, &ty, ctx, builder)?;
    let ret = builder.create_select(condition.ir, x.ir, y.ir);
    Ok(ctx.value_from_ir(builder, ret, ty.signedness()))
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

fn reduce_impl(
    input: FrontendValue,
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
    key: &'static str,
    float_op: ReduceOp,
    int_op: ReduceOp,
) -> Result<FrontendValue, Error> {
    if !input.ty.is_block() {
        return Err(SemanticError::ReduceOnScalar(input.ty.to_string()).into());
    }
    // Narrow integers are extended to 32 bits first: better accuracy, and
    // free on the hardware. The input's signedness carries through.
    let narrow = match input.scalar_ty() {
        &FrontendType::Int { bits, signedness } if bits <= 32 => Some(signedness),
        _ => None,
    };
    let input = match narrow {
        Some(sn) => cast(input, &FrontendType::int(32, sn), ctx, builder)?,
        None => input,
    };
    let signedness = input.ty.signedness();
    let scalar = input.scalar_ty().clone();
    if scalar.is_fp() {
        let ret = builder.create_reduce(float_op, input.ir, axis);
        return Ok(ctx.value_from_ir(builder, ret, signedness));
    }
    if scalar.is_int() {
        let ret = builder.create_reduce(int_op, input.ir, axis);
        return Ok(ctx.value_from_ir(builder, ret, signedness));
    }
    Err(Error::unreachable(key))
}

pub fn min(
    input: FrontendValue,
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    reduce_impl(input, axis, ctx, builder, "min", ReduceOp::FMin, ReduceOp::Min)
}

pub fn max(
    input: FrontendValue,
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    reduce_impl(input, axis, ctx, builder, "max", ReduceOp::FMax, ReduceOp::Max)
}

pub fn sum(
    input: FrontendValue,
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    reduce_impl(input, axis, ctx, builder, "sum", ReduceOp::FAdd, ReduceOp::Add)
}

pub fn xor_sum(
    input: FrontendValue,
    axis: u32,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    if !input.scalar_ty().is_int() {
        return Err(SemanticError::XorSumOnFloat.into());
    }
    reduce_impl(input, axis, ctx, builder, "xor_sum", ReduceOp::Xor, ReduceOp::Xor)
}

// ---------------------------------------------------------------------------
// Math
// ---------------------------------------------------------------------------

/// High half of the full-width product.
pub fn umulhi(
    x: FrontendValue,
    y: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let (x, y) = binary_op_type_checking(x, y, ctx, builder, false, false, true, DivOrMod::No)?;
    let ret = builder.create_umulhi(x.ir, y.ir);
    Ok(ctx.create_value(ret, x.ty))
}

fn math_unary(
    op: MathOp,
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let ret = builder.create_math(op, x.ir);
    Ok(ctx.create_value(ret, x.ty))
}

pub fn exp(
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    math_unary(MathOp::Exp, x, ctx, builder)
}

pub fn log(
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    math_unary(MathOp::Log, x, ctx, builder)
}

pub fn cos(
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    math_unary(MathOp::Cos, x, ctx, builder)
}

pub fn sin(
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    math_unary(MathOp::Sin, x, ctx, builder)
}

pub fn sqrt(
    x: FrontendValue,
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    math_unary(MathOp::Sqrt, x, ctx, builder)
}

// ---------------------------------------------------------------------------
// Metadata hints
// ---------------------------------------------------------------------------

fn attach_hint(
    x: FrontendValue,
    hint: MetadataHint,
    key: &'static str,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    // Hints attach to instructions; constants and arguments take none.
    if !builder.current_function().is_instruction_result(x.ir) {
        return Err(Error::unreachable(key));
    }
    builder.set_metadata(x.ir, hint);
    Ok(x)
}

/// Promises that every element of `x` is a multiple of `value`.
pub fn multiple_of(
    x: FrontendValue,
    value: u32,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    attach_hint(x, MetadataHint::MultipleOf(value), "multiple_of", builder)
}

/// Promises that `x` is contiguous in chunks of `value` elements.
pub fn max_contiguous(
    x: FrontendValue,
    value: u32,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    attach_hint(x, MetadataHint::MaxContiguous(value), "max_contiguous", builder)
}

pub fn debug_barrier(
    ctx: &mut TypeContext,
    builder: &mut IrBuilder,
) -> Result<FrontendValue, Error> {
    let ret = builder.create_barrier();
    Ok(ctx.value_from_ir(builder, ret, Signedness::Signed))
}
