//! The cast matrix: float width changes, integer resizes, pointer
//! conversions, and bit reinterpretation.

use tessera::error::{Error, SemanticError};
use tessera::ir::{CastOp, IcmpPred, IrBuilder, IrInstr, IrType};
use tessera::sema::{dispatch, FrontendType, FrontendValue, Signedness, TypeContext};

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

fn last_cast_op(builder: &IrBuilder) -> CastOp {
    match builder.current_function().entry_block().instrs.last() {
        Some(IrInstr::Cast { op, .. }) => *op,
        other => panic!("expected a cast instruction, got {:?}", other),
    }
}

// ------------------------------------------------------------------
// 1. Identity cast returns the very same value and emits nothing
// ------------------------------------------------------------------
#[test]
fn test_cast_identity() {
    let (mut builder, mut ctx, args) = kernel(&[("x", FrontendType::int32())]);
    let x = args[0].clone();
    let y = dispatch::cast(x.clone(), &FrontendType::int32(), &mut ctx, &mut builder)
        .expect("identity cast");
    assert_eq!(x, y);
    assert!(builder.current_function().entry_block().instrs.is_empty());
}

// ------------------------------------------------------------------
// 2. Float-to-float follows the mantissa width
// ------------------------------------------------------------------
#[test]
fn test_fp_trunc_and_ext() {
    let (mut builder, mut ctx, args) = kernel(&[("x", FrontendType::fp32())]);
    let half = dispatch::cast(args[0].clone(), &FrontendType::fp16(), &mut ctx, &mut builder)
        .expect("f32 -> f16");
    assert_eq!(last_cast_op(&builder), CastOp::FpTrunc);
    assert_eq!(half.ty, FrontendType::fp16());

    let wide = dispatch::cast(half, &FrontendType::fp64(), &mut ctx, &mut builder)
        .expect("f16 -> f64");
    assert_eq!(last_cast_op(&builder), CastOp::FpExt);
    assert_eq!(wide.ty, FrontendType::fp64());

    // bf16 has a narrower mantissa than f16
    let bf16 = FrontendType::Float(tessera::ir::FpKind::Bf16);
    let bf = dispatch::cast(wide, &bf16, &mut ctx, &mut builder).expect("f64 -> bf16");
    assert_eq!(last_cast_op(&builder), CastOp::FpTrunc);
    let _ = dispatch::cast(bf, &FrontendType::fp16(), &mut ctx, &mut builder)
        .expect("bf16 -> f16");
    assert_eq!(last_cast_op(&builder), CastOp::FpExt);
}

// ------------------------------------------------------------------
// 3. Integer resizes: sign-extend iff the source is signed non-bool
// ------------------------------------------------------------------
#[test]
fn test_int_cast_sign_extension() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("i", FrontendType::int32()),
        ("u", FrontendType::uint32()),
        ("b", FrontendType::bool_ty()),
    ]);
    let _ = dispatch::cast(args[0].clone(), &FrontendType::int64(), &mut ctx, &mut builder)
        .expect("i32 -> i64");
    assert_eq!(last_cast_op(&builder), CastOp::IntCast { sign_extend: true });

    let _ = dispatch::cast(args[1].clone(), &FrontendType::int64(), &mut ctx, &mut builder)
        .expect("u32 -> i64");
    assert_eq!(last_cast_op(&builder), CastOp::IntCast { sign_extend: false });

    let _ = dispatch::cast(args[2].clone(), &FrontendType::int32(), &mut ctx, &mut builder)
        .expect("bool -> i32");
    assert_eq!(last_cast_op(&builder), CastOp::IntCast { sign_extend: false });
}

// ------------------------------------------------------------------
// 4. Float/integer conversions honor signedness and bool
// ------------------------------------------------------------------
#[test]
fn test_fp_int_conversions() {
    let (mut builder, mut ctx, args) = kernel(&[
        ("f", FrontendType::fp32()),
        ("i", FrontendType::int32()),
        ("u", FrontendType::uint32()),
        ("b", FrontendType::bool_ty()),
    ]);
    let _ = dispatch::cast(args[0].clone(), &FrontendType::int32(), &mut ctx, &mut builder)
        .expect("f32 -> i32");
    assert_eq!(last_cast_op(&builder), CastOp::FpToSi);

    let _ = dispatch::cast(args[0].clone(), &FrontendType::bool_ty(), &mut ctx, &mut builder)
        .expect("f32 -> bool");
    assert_eq!(last_cast_op(&builder), CastOp::FpToUi);

    let _ = dispatch::cast(args[1].clone(), &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("i32 -> f32");
    assert_eq!(last_cast_op(&builder), CastOp::SiToFp);

    let _ = dispatch::cast(args[2].clone(), &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("u32 -> f32");
    assert_eq!(last_cast_op(&builder), CastOp::UiToFp);

    let _ = dispatch::cast(args[3].clone(), &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("bool -> f32");
    assert_eq!(last_cast_op(&builder), CastOp::UiToFp);
}

// ------------------------------------------------------------------
// 5. Pointer conversions; ptr -> bool is a null test
// ------------------------------------------------------------------
#[test]
fn test_pointer_casts() {
    let i8_ptr = FrontendType::ptr(FrontendType::int(8, Signedness::Signed), 1);
    let f32_ptr = FrontendType::ptr(FrontendType::fp32(), 1);
    let (mut builder, mut ctx, args) = kernel(&[
        ("p", i8_ptr.clone()),
        ("i", FrontendType::int64()),
    ]);

    let as_int = dispatch::cast(args[0].clone(), &FrontendType::int64(), &mut ctx, &mut builder)
        .expect("ptr -> i64");
    assert_eq!(last_cast_op(&builder), CastOp::PtrToInt);
    assert_eq!(as_int.ty, FrontendType::int64());

    let as_ptr = dispatch::cast(args[1].clone(), &f32_ptr, &mut ctx, &mut builder)
        .expect("i64 -> ptr");
    assert_eq!(last_cast_op(&builder), CastOp::IntToPtr);

    let _ = dispatch::cast(as_ptr, &i8_ptr, &mut ctx, &mut builder).expect("ptr -> ptr");
    assert_eq!(last_cast_op(&builder), CastOp::Bitcast);
}

#[test]
fn test_ptr_to_bool_lowers_to_null_test() {
    let i8_ptr = FrontendType::ptr(FrontendType::int(8, Signedness::Signed), 1);
    let (mut builder, mut ctx, args) = kernel(&[("p", i8_ptr)]);
    let flag = dispatch::cast(args[0].clone(), &FrontendType::bool_ty(), &mut ctx, &mut builder)
        .expect("ptr -> bool");
    assert_eq!(flag.ty, FrontendType::bool_ty());

    let instrs = &builder.current_function().entry_block().instrs;
    assert!(matches!(
        instrs[0],
        IrInstr::Cast {
            op: CastOp::PtrToInt,
            ..
        }
    ));
    assert!(matches!(
        instrs[1],
        IrInstr::Icmp {
            pred: IcmpPred::Ne,
            ..
        }
    ));
}

// ------------------------------------------------------------------
// 6. Block sources promote the destination to a block of equal shape
// ------------------------------------------------------------------
#[test]
fn test_block_cast_keeps_shape() {
    let blk = FrontendType::block(FrontendType::int32(), vec![2, 2]);
    let (mut builder, mut ctx, args) = kernel(&[("x", blk)]);
    let out = dispatch::cast(args[0].clone(), &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("block int -> block fp");
    assert_eq!(
        out.ty,
        FrontendType::block(FrontendType::fp32(), vec![2, 2])
    );
    ctx.check_consistency(&builder).expect("types consistent");
}

// ------------------------------------------------------------------
// 7. bitcast: equal widths only; pointers delegate to cast
// ------------------------------------------------------------------
#[test]
fn test_bitcast_width_rules() {
    let (mut builder, mut ctx, args) = kernel(&[("f", FrontendType::fp32())]);
    let bits = dispatch::bitcast(args[0].clone(), &FrontendType::int32(), &mut ctx, &mut builder)
        .expect("f32 <-> i32 are the same width");
    assert_eq!(bits.ty, FrontendType::int32());
    assert_eq!(last_cast_op(&builder), CastOp::Bitcast);

    // round-trip restores the original type
    let back = dispatch::bitcast(bits, &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("round trip");
    assert_eq!(back.ty, FrontendType::fp32());

    let err = dispatch::bitcast(args[0].clone(), &FrontendType::int64(), &mut ctx, &mut builder)
        .expect_err("f32 -> i64 widths differ");
    assert!(matches!(
        err,
        Error::Semantic(SemanticError::BitcastWidthMismatch { src: 32, dst: 64 })
    ));
}

#[test]
fn test_bitcast_identity() {
    let (mut builder, mut ctx, args) = kernel(&[("f", FrontendType::fp32())]);
    let same = dispatch::bitcast(args[0].clone(), &FrontendType::fp32(), &mut ctx, &mut builder)
        .expect("identity");
    assert_eq!(same, args[0]);
    assert!(builder.current_function().entry_block().instrs.is_empty());
}
