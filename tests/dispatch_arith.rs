//! Arithmetic dispatch: broadcasting, numeric promotion, and the
//! per-operation instruction selection.

use tessera::error::{Error, SemanticError};
use tessera::ir::{BinOp, IrBuilder, IrInstr, IrType};
use tessera::sema::{dispatch, DivOrMod, FrontendType, FrontendValue, Signedness, TypeContext};

/// Builds a kernel whose arguments carry the given frontend types and
/// returns the builder, context, and argument values.
fn kernel(params: &[(&str, FrontendType)]) -> (IrBuilder, TypeContext, Vec<FrontendValue>) {
    let mut builder = IrBuilder::new("test");
    let ir_params: Vec<(&str, IrType)> = params
        .iter()
        .map(|(name, ty)| (*name, ty.ir_type()))
        .collect();
    let (_, args) = builder.begin_function("kernel", &ir_params, IrType::Void);
    let mut ctx = TypeContext::new();
    let values = args
        .iter()
        .zip(params.iter())
        .map(|(id, (_, ty))| ctx.create_value(*id, ty.clone()))
        .collect();
    (builder, ctx, values)
}

fn entry_instrs(builder: &IrBuilder) -> &[IrInstr] {
    &builder.current_function().entry_block().instrs
}

// ------------------------------------------------------------------
// 1. Scalar operand is splatted before a block add
// ------------------------------------------------------------------
#[test]
fn test_add_broadcasts_scalar() {
    let blk = FrontendType::block(FrontendType::int32(), vec![4]);
    let (mut builder, mut ctx, args) = kernel(&[("x", blk.clone()), ("s", FrontendType::int32())]);
    let (x, s) = (args[0].clone(), args[1].clone());

    let sum = dispatch::add(x, s, &mut ctx, &mut builder).expect("add");
    assert_eq!(sum.ty, blk);

    let instrs = entry_instrs(&builder);
    assert!(matches!(instrs[0], IrInstr::Splat { .. }));
    assert!(matches!(
        instrs[1],
        IrInstr::Binary { op: BinOp::Add, .. }
    ));
    // the add consumes the splatted rhs
    let splat_result = instrs[0].result().unwrap();
    assert!(instrs[1].operands().contains(&splat_result));
}

// ------------------------------------------------------------------
// 2. int/int true division promotes to f32
// ------------------------------------------------------------------
#[test]
fn test_truediv_int_promotes_to_f32() {
    let (mut builder, mut ctx, _) = kernel(&[]);
    let seven = builder.get_int32(7);
    let seven = ctx.create_value(seven, FrontendType::int32());
    let two = builder.get_int32(2);
    let two = ctx.create_value(two, FrontendType::int32());

    let q = dispatch::truediv(seven, two, &mut ctx, &mut builder).expect("truediv");
    assert_eq!(q.ty, FrontendType::fp32());

    let instrs = entry_instrs(&builder);
    let casts = instrs
        .iter()
        .filter(|i| matches!(i, IrInstr::Cast { op: tessera::ir::CastOp::SiToFp, .. }))
        .count();
    assert_eq!(casts, 2, "both integer operands go through si->fp");
    assert!(matches!(
        instrs.last().unwrap(),
        IrInstr::Binary { op: BinOp::FDiv, .. }
    ));
}

// ------------------------------------------------------------------
// 3. Mixed-signedness mod is a semantic error
// ------------------------------------------------------------------
#[test]
fn test_mod_mixed_signedness_rejected() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::int32()),
        ("b", FrontendType::uint32()),
    ]);
    let err = dispatch::modulo(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect_err("mixed signedness must be rejected");
    assert!(matches!(
        err,
        Error::Semantic(SemanticError::DifferentSignedness { .. })
    ));
}

// ------------------------------------------------------------------
// 4. Pointer arithmetic lowers to GEP, pointer stays on the left
// ------------------------------------------------------------------
#[test]
fn test_ptr_add_commutes_to_gep() {
    let ptr_ty = FrontendType::ptr(FrontendType::fp32(), 1);
    let (mut builder, mut ctx, args) = kernel(&[
        ("off", FrontendType::int32()),
        ("p", ptr_ty.clone()),
    ]);
    // offset + ptr: still a GEP with the pointer's type
    let sum = dispatch::add(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect("offset + ptr");
    assert_eq!(sum.ty, ptr_ty);
    assert!(matches!(
        entry_instrs(&builder).last().unwrap(),
        IrInstr::Gep { .. }
    ));
}

#[test]
fn test_ptr_sub_negates_offset() {
    let ptr_ty = FrontendType::ptr(FrontendType::fp32(), 1);
    let (mut builder, mut ctx, args) = kernel(&[
        ("p", ptr_ty.clone()),
        ("off", FrontendType::int32()),
    ]);
    let diff = dispatch::sub(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect("ptr - offset");
    assert_eq!(diff.ty, ptr_ty);
    let instrs = entry_instrs(&builder);
    // minus(off) is a sub from zero, then the GEP
    assert!(matches!(instrs[0], IrInstr::Binary { op: BinOp::Sub, .. }));
    assert!(matches!(instrs[1], IrInstr::Gep { .. }));
}

#[test]
fn test_ptr_plus_float_rejected() {
    let ptr_ty = FrontendType::ptr(FrontendType::fp32(), 1);
    let (mut builder, mut ctx, args) =
        kernel(&[("p", ptr_ty), ("f", FrontendType::fp32())]);
    let err = dispatch::add(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect_err("ptr + float is invalid");
    assert!(matches!(
        err,
        Error::Semantic(SemanticError::IncompatibleTypes { .. })
    ));
}

// ------------------------------------------------------------------
// 5. floordiv picks signed/unsigned division; floats are unreachable
// ------------------------------------------------------------------
#[test]
fn test_floordiv_signedness() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::int32()),
        ("b", FrontendType::int32()),
        ("c", FrontendType::uint32()),
        ("d", FrontendType::uint32()),
    ]);
    dispatch::floordiv(args[0].clone(), args[1].clone(), &mut ctx, &mut builder).expect("sdiv");
    dispatch::floordiv(args[2].clone(), args[3].clone(), &mut ctx, &mut builder).expect("udiv");
    let instrs = entry_instrs(&builder);
    assert!(matches!(instrs[0], IrInstr::Binary { op: BinOp::SDiv, .. }));
    assert!(matches!(instrs[1], IrInstr::Binary { op: BinOp::UDiv, .. }));
}

#[test]
fn test_floordiv_float_is_unreachable() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::fp32()),
        ("b", FrontendType::fp32()),
    ]);
    let err = dispatch::floordiv(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect_err("floordiv of floats is an internal error");
    assert!(matches!(err, Error::Unreachable(_)));
}

// ------------------------------------------------------------------
// 6. fdiv: floats only, IEEE flag lands on the emitted binop
// ------------------------------------------------------------------
#[test]
fn test_fdiv_requires_floats() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::fp32()),
        ("b", FrontendType::int32()),
    ]);
    let err = dispatch::fdiv(args[0].clone(), args[1].clone(), false, &mut ctx, &mut builder)
        .expect_err("fdiv with an int operand");
    assert!(matches!(err, Error::Semantic(SemanticError::NonFloatFdiv)));
}

#[test]
fn test_fdiv_sets_ieee_rounding() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::fp32()),
        ("b", FrontendType::fp32()),
    ]);
    dispatch::fdiv(args[0].clone(), args[1].clone(), true, &mut ctx, &mut builder).expect("fdiv");
    assert!(entry_instrs(&builder).iter().any(|i| matches!(
        i,
        IrInstr::Binary {
            op: BinOp::FDiv,
            fdiv_ieee_rounding: true,
            ..
        }
    )));
}

// ------------------------------------------------------------------
// 7. Unary operators
// ------------------------------------------------------------------
#[test]
fn test_plus_is_identity() {
    let (_builder, _ctx, args) = kernel(&[("x", FrontendType::int32())]);
    let x = args[0].clone();
    let y = dispatch::plus(x.clone()).expect("plus");
    assert_eq!(x, y);
}

#[test]
fn test_minus_is_sub_from_zero() {
    let (mut builder, mut ctx, args) = kernel(&[("x", FrontendType::int32())]);
    let neg = dispatch::minus(args[0].clone(), &mut ctx, &mut builder).expect("minus");
    assert_eq!(neg.ty, FrontendType::int32());
    let instrs = entry_instrs(&builder);
    assert!(matches!(instrs[0], IrInstr::Binary { op: BinOp::Sub, .. }));
    // double negation emits a second sub against zero
    let back = dispatch::minus(neg, &mut ctx, &mut builder).expect("minus minus");
    assert_eq!(back.ty, FrontendType::int32());
    assert_eq!(entry_instrs(&builder).len(), 2);
}

#[test]
fn test_minus_rejects_pointers() {
    let (mut builder, mut ctx, args) =
        kernel(&[("p", FrontendType::ptr(FrontendType::fp32(), 1))]);
    let err = dispatch::minus(args[0].clone(), &mut ctx, &mut builder).expect_err("minus on ptr");
    assert!(matches!(
        err,
        Error::Semantic(SemanticError::InvalidUnaryOperand { op: "minus", .. })
    ));
}

#[test]
fn test_invert_is_xor_all_ones_and_int_only() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("x", FrontendType::int32()),
        ("f", FrontendType::fp32()),
    ]);
    let inv = dispatch::invert(args[0].clone(), &mut ctx, &mut builder).expect("invert");
    assert_eq!(inv.ty, FrontendType::int32());
    assert!(matches!(
        entry_instrs(&builder).last().unwrap(),
        IrInstr::Binary { op: BinOp::Xor, .. }
    ));
    assert!(dispatch::invert(args[1].clone(), &mut ctx, &mut builder).is_err());
}

// ------------------------------------------------------------------
// 8. Promotion rules
// ------------------------------------------------------------------
#[test]
fn test_computation_type_is_idempotent_on_equal_types() {
    use tessera::sema::computation_type;
    for ty in [
        FrontendType::int32(),
        FrontendType::uint32(),
        FrontendType::fp32(),
        FrontendType::fp64(),
    ] {
        let c = computation_type(&ty, &ty, DivOrMod::No).expect("computation_type");
        assert_eq!(c, ty);
    }
}

#[test]
fn test_integer_promote_prefers_width_then_unsigned() {
    use tessera::sema::integer_promote;
    let short = FrontendType::int(16, Signedness::Signed);
    let signed = FrontendType::int32();
    let unsigned = FrontendType::uint32();
    let byte = FrontendType::int(8, Signedness::Unsigned);

    // same signedness: wider wins, commutatively
    assert_eq!(integer_promote(&short, &signed).unwrap(), signed);
    assert_eq!(integer_promote(&signed, &short).unwrap(), signed);
    // unsigned wins at equal rank
    assert_eq!(integer_promote(&signed, &unsigned).unwrap(), unsigned);
    assert_eq!(integer_promote(&unsigned, &signed).unwrap(), unsigned);
    // strictly wider signed operand beats a narrow unsigned one
    assert_eq!(integer_promote(&byte, &signed).unwrap(), signed);
    // non-integers are an internal error
    assert!(integer_promote(&FrontendType::fp32(), &signed).is_err());
}

#[test]
fn test_half_precision_div_promotes_to_f32() {
    use tessera::sema::computation_type;
    let f16 = FrontendType::fp16();
    assert_eq!(
        computation_type(&f16, &f16, DivOrMod::No).unwrap(),
        f16
    );
    assert_eq!(
        computation_type(&f16, &f16, DivOrMod::Yes).unwrap(),
        FrontendType::fp32()
    );
}

// ------------------------------------------------------------------
// 9. Bitwise ops promote to the common integer type
// ------------------------------------------------------------------
#[test]
fn test_bitwise_promotion() {
    let byte = FrontendType::int(8, Signedness::Unsigned);
    let (mut builder, mut ctx, args) =
        kernel(&[("a", byte), ("b", FrontendType::int32())]);
    let out = dispatch::bit_and(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect("bit_and");
    assert_eq!(out.ty, FrontendType::int32());
    assert!(matches!(
        entry_instrs(&builder).last().unwrap(),
        IrInstr::Binary { op: BinOp::And, .. }
    ));
}

#[test]
fn test_bitwise_rejects_floats() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", FrontendType::fp32()),
        ("b", FrontendType::int32()),
    ]);
    assert!(
        dispatch::bit_xor(args[0].clone(), args[1].clone(), &mut ctx, &mut builder).is_err()
    );
}

// ------------------------------------------------------------------
// 10. Comparisons yield bool-shaped results and honor signedness
// ------------------------------------------------------------------
#[test]
fn test_compare_types_and_predicates() {
    let blk = FrontendType::block(FrontendType::uint32(), vec![8]);
    let (mut builder, mut ctx, args) = kernel(&[
        ("a", blk.clone()),
        ("b", blk),
        ("x", FrontendType::fp32()),
        ("y", FrontendType::fp32()),
    ]);
    let cmp = dispatch::greater_than(args[0].clone(), args[1].clone(), &mut ctx, &mut builder)
        .expect("ugt");
    assert_eq!(
        cmp.ty,
        FrontendType::block(FrontendType::bool_ty(), vec![8])
    );
    assert!(matches!(
        entry_instrs(&builder).last().unwrap(),
        IrInstr::Icmp {
            pred: tessera::ir::IcmpPred::Ugt,
            ..
        }
    ));

    let fcmp = dispatch::less_equal(args[2].clone(), args[3].clone(), &mut ctx, &mut builder)
        .expect("ole");
    assert_eq!(fcmp.ty, FrontendType::bool_ty());
    assert!(matches!(
        entry_instrs(&builder).last().unwrap(),
        IrInstr::Fcmp {
            pred: tessera::ir::FcmpPred::Ole,
            ..
        }
    ));
}

// ------------------------------------------------------------------
// 11. Every dispatch result's frontend type matches its IR type
// ------------------------------------------------------------------
#[test]
fn test_frontend_ir_type_consistency() {
    let blk = FrontendType::block(FrontendType::int32(), vec![4]);
    let (mut builder, mut ctx, args) = kernel(&[
        ("x", blk),
        ("s", FrontendType::int32()),
        ("f", FrontendType::fp32()),
    ]);
    let sum = dispatch::add(args[0].clone(), args[1].clone(), &mut ctx, &mut builder).unwrap();
    let prod = dispatch::mul(sum.clone(), args[1].clone(), &mut ctx, &mut builder).unwrap();
    let _ = dispatch::truediv(prod, args[2].clone(), &mut ctx, &mut builder).unwrap();
    let _ = dispatch::equal(args[0].clone(), args[1].clone(), &mut ctx, &mut builder).unwrap();
    ctx.check_consistency(&builder).expect("types consistent");
}
