//! Numeric promotion and shape reconciliation rules.
//!
//! These are pure functions over frontend scalar types; the dispatch layer
//! consults them before emitting any typed instruction.

use crate::error::{Error, SemanticError};
use crate::ir::types::Shape;
use crate::sema::types::{FrontendType, Signedness};

/// Whether the operation being typed is a division or remainder. The
/// target ISA has no native fp16 div/mod, and mixed-signedness integer
/// div/mod is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivOrMod {
    No,
    Yes,
}

/// Usual arithmetic conversions for two integer types.
///
/// Equal signedness takes the wider operand (ties prefer `a`). Otherwise
/// the unsigned operand wins when its rank is at least the signed
/// operand's; the signed operand wins when it is strictly wider.
pub fn integer_promote(a: &FrontendType, b: &FrontendType) -> Result<FrontendType, Error> {
    let (a_rank, a_sn) = match a {
        FrontendType::Int { bits, signedness } => (*bits, *signedness),
        _ => return Err(Error::unreachable("integer_promote")),
    };
    let (b_rank, b_sn) = match b {
        FrontendType::Int { bits, signedness } => (*bits, *signedness),
        _ => return Err(Error::unreachable("integer_promote")),
    };
    let ty = if a_sn == b_sn {
        if a_rank >= b_rank {
            a
        } else {
            b
        }
    } else if a_sn == Signedness::Unsigned {
        if a_rank >= b_rank {
            a
        } else {
            b
        }
    } else {
        // b is the unsigned operand.
        if b_rank >= a_rank {
            b
        } else {
            a
        }
    };
    Ok(ty.clone())
}

/// The common type two scalar operands are converted to before an
/// arithmetic operation.
pub fn computation_type(
    a: &FrontendType,
    b: &FrontendType,
    div_or_mod: DivOrMod,
) -> Result<FrontendType, Error> {
    // 1) if one operand is f64, the other is implicitly converted to f64
    if a.is_fp64() || b.is_fp64() {
        return Ok(FrontendType::fp64());
    }
    // 2) if one operand is f32, the other is implicitly converted to f32
    if a.is_fp32() || b.is_fp32() {
        return Ok(FrontendType::fp32());
    }
    // 3) if one operand is half precision, the other is converted to it,
    //    unless we're doing / or %, which have no native half-precision
    //    lowering and go through f32 instead.
    if a.is_half() || b.is_half() {
        if div_or_mod == DivOrMod::Yes {
            return Ok(FrontendType::fp32());
        }
        return Ok(if a.is_half() { a.clone() } else { b.clone() });
    }
    if !a.is_int() || !b.is_int() {
        return Err(Error::unreachable("computation_type"));
    }
    // 4) both operands are integer and undergo integer promotion
    if div_or_mod == DivOrMod::Yes && a.signedness() != b.signedness() {
        return Err(SemanticError::DifferentSignedness {
            lhs: a.to_string(),
            rhs: b.to_string(),
        }
        .into());
    }
    integer_promote(a, b)
}

/// Reconciles two block shapes element-wise: a dimension of 1 stretches to
/// match the other side; equal dimensions pass through; anything else is a
/// user error. Ranks must match.
pub fn broadcast_shapes(a: &Shape, b: &Shape) -> Result<Shape, Error> {
    if a.len() != b.len() {
        return Err(SemanticError::BroadcastRankMismatch.into());
    }
    let mut out = Shape::with_capacity(a.len());
    for (i, (&left, &right)) in a.iter().zip(b.iter()).enumerate() {
        if left == 1 {
            out.push(right);
        } else if right == 1 || left == right {
            out.push(left);
        } else {
            return Err(SemanticError::IncompatibleDimensions {
                index: i,
                left,
                right,
            }
            .into());
        }
    }
    Ok(out)
}
