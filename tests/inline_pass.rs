//! Function inlining: call replacement, return merging, nested calls,
//! and recursion rejection.

use tessera::error::PassError;
use tessera::ir::{BinOp, IrBuilder, IrFunction, IrInstr, IrModule, IrType};
use tessera::pass::{InlinePass, Pass, ValidatePass};

fn count_calls(func: &IrFunction) -> usize {
    func.blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Call { .. }))
        .count()
}

fn phis(func: &IrFunction) -> Vec<&IrInstr> {
    func.blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Phi { .. }))
        .collect()
}

fn run_inline(module: &mut IrModule) {
    InlinePass.run(module).expect("inline pass");
    ValidatePass.run(module).expect("module valid after inlining");
}

// ------------------------------------------------------------------
// 1. Single-return callee: call is gone, one incoming on the merge phi
// ------------------------------------------------------------------
#[test]
fn test_inline_identity_function() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);

    let (callee, cargs) = builder.begin_function("identity", &[("x", i32_ty.clone())], i32_ty.clone());
    builder.create_ret(Some(cargs[0]));

    let (_, kargs) = builder.begin_function("kernel", &[("a", i32_ty.clone())], i32_ty);
    let r = builder.create_call(callee, vec![kargs[0]]).expect("non-void call");
    builder.create_ret(Some(r));

    let mut module = builder.finish();
    run_inline(&mut module);

    assert!(module.function_by_name("identity").is_none(), "callee removed");
    let kernel = module.function_by_name("kernel").expect("kernel kept");
    assert_eq!(count_calls(kernel), 0, "call site replaced");

    let merge = phis(kernel);
    assert_eq!(merge.len(), 1);
    match merge[0] {
        IrInstr::Phi { incomings, .. } => {
            assert_eq!(incomings.len(), 1);
            // the callee argument was substituted by the call argument
            assert_eq!(incomings[0].0, kargs[0]);
        }
        _ => unreachable!(),
    }

    // the caller's return flows through the merge phi
    let phi_result = merge[0].result().unwrap();
    let ret_value = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .find_map(|i| match i {
            IrInstr::Return { value } => *value,
            _ => None,
        })
        .expect("kernel still returns");
    assert_eq!(ret_value, phi_result);
}

// ------------------------------------------------------------------
// 2. Instructions after the call stay behind the merge point
// ------------------------------------------------------------------
#[test]
fn test_code_after_call_survives() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);

    let (callee, cargs) = builder.begin_function("double", &[("x", i32_ty.clone())], i32_ty.clone());
    let two = builder.get_int32(2);
    let d = builder.create_binary(BinOp::Mul, cargs[0], two);
    builder.create_ret(Some(d));

    let (_, kargs) = builder.begin_function("kernel", &[("a", i32_ty.clone())], i32_ty);
    let before = builder.create_binary(BinOp::Add, kargs[0], kargs[0]);
    let r = builder.create_call(callee, vec![before]).expect("non-void call");
    let after = builder.create_binary(BinOp::Add, r, before);
    builder.create_ret(Some(after));

    let mut module = builder.finish();
    run_inline(&mut module);

    let kernel = module.function_by_name("kernel").expect("kernel kept");
    assert_eq!(count_calls(kernel), 0);
    // cloned mul arrived, both original adds survive
    let muls = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Binary { op: BinOp::Mul, .. }))
        .count();
    let adds = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Binary { op: BinOp::Add, .. }))
        .count();
    assert_eq!(muls, 1);
    assert_eq!(adds, 2);
}

// ------------------------------------------------------------------
// 3. Multi-return callee: one incoming per return path
// ------------------------------------------------------------------
#[test]
fn test_inline_multi_return_callee() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);
    let bool_ty = IrType::Int(1);

    let (callee, cargs) = builder.begin_function("pick", &[("c", bool_ty)], i32_ty.clone());
    let then_bb = builder.create_block(callee, Some("then"));
    let else_bb = builder.create_block(callee, Some("else"));
    builder.create_cond_br(cargs[0], then_bb, else_bb);
    builder.set_insert_point_end(callee, then_bb);
    let one = builder.get_int32(1);
    builder.create_ret(Some(one));
    builder.set_insert_point_end(callee, else_bb);
    let two = builder.get_int32(2);
    builder.create_ret(Some(two));

    let (_, kargs) = builder.begin_function("kernel", &[("c", IrType::Int(1))], i32_ty);
    let r = builder.create_call(callee, vec![kargs[0]]).expect("non-void call");
    builder.create_ret(Some(r));

    let mut module = builder.finish();
    run_inline(&mut module);

    let kernel = module.function_by_name("kernel").expect("kernel kept");
    assert_eq!(count_calls(kernel), 0);
    let merge = phis(kernel);
    assert_eq!(merge.len(), 1);
    match merge[0] {
        IrInstr::Phi { incomings, .. } => {
            assert_eq!(incomings.len(), 2, "one incoming per ret");
            let (a, b) = (incomings[0].1, incomings[1].1);
            assert_ne!(a, b, "each ret branches from its own block");
        }
        _ => unreachable!(),
    }
    // both callee branches became branches to the exit block
    let branches = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Br { .. }))
        .count();
    assert!(branches >= 2);
}

// ------------------------------------------------------------------
// 4. Nested calls are inlined transitively
// ------------------------------------------------------------------
#[test]
fn test_nested_calls_inline_transitively() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);

    let (inner, iargs) = builder.begin_function("inner", &[("x", i32_ty.clone())], i32_ty.clone());
    let one = builder.get_int32(1);
    let inc = builder.create_binary(BinOp::Add, iargs[0], one);
    builder.create_ret(Some(inc));

    let (outer, oargs) = builder.begin_function("outer", &[("x", i32_ty.clone())], i32_ty.clone());
    let a = builder.create_call(inner, vec![oargs[0]]).expect("call inner");
    let b = builder.create_call(inner, vec![a]).expect("call inner again");
    builder.create_ret(Some(b));

    let (_, kargs) = builder.begin_function("kernel", &[("x", i32_ty.clone())], i32_ty);
    let r = builder.create_call(outer, vec![kargs[0]]).expect("call outer");
    builder.create_ret(Some(r));

    let mut module = builder.finish();
    run_inline(&mut module);

    assert!(module.function_by_name("inner").is_none());
    assert!(module.function_by_name("outer").is_none());
    let kernel = module.function_by_name("kernel").expect("kernel kept");
    assert_eq!(count_calls(kernel), 0);
    // both increments made it into the kernel body
    let adds = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .filter(|i| matches!(i, IrInstr::Binary { op: BinOp::Add, .. }))
        .count();
    assert_eq!(adds, 2);
}

// ------------------------------------------------------------------
// 5. Void callees get no merge phi
// ------------------------------------------------------------------
#[test]
fn test_void_callee_has_no_phi() {
    let mut builder = IrBuilder::new("m");
    let (callee, _) = builder.begin_function("noop", &[], IrType::Void);
    builder.create_ret(None);

    let (_, _) = builder.begin_function("kernel", &[], IrType::Void);
    assert!(builder.create_call(callee, vec![]).is_none());
    builder.create_ret(None);

    let mut module = builder.finish();
    run_inline(&mut module);

    let kernel = module.function_by_name("kernel").expect("kernel kept");
    assert_eq!(count_calls(kernel), 0);
    assert!(phis(kernel).is_empty());
}

// ------------------------------------------------------------------
// 6. Recursion is rejected, not unrolled forever
// ------------------------------------------------------------------
#[test]
fn test_self_recursion_rejected() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);
    let (f, fargs) = builder.begin_function("f", &[("x", i32_ty.clone())], i32_ty);
    let r = builder.create_call(f, vec![fargs[0]]).expect("self call");
    builder.create_ret(Some(r));

    let mut module = builder.finish();
    let err = InlinePass.run(&mut module).expect_err("self recursion");
    assert!(matches!(err, PassError::RecursionDetected { .. }));
}

#[test]
fn test_mutual_recursion_rejected() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);
    // declare g first so f can call it; fill g's body afterwards
    let (g, _) = builder.begin_function("g", &[("x", i32_ty.clone())], i32_ty.clone());
    let g_entry = builder.insert_point().unwrap().block;
    let (f, fargs) = builder.begin_function("f", &[("x", i32_ty.clone())], i32_ty);
    let rf = builder.create_call(g, vec![fargs[0]]).expect("f calls g");
    builder.create_ret(Some(rf));

    builder.set_insert_point_end(g, g_entry);
    let g_arg = builder.module().function(g).args()[0].id;
    let rg = builder.create_call(f, vec![g_arg]).expect("g calls f");
    builder.create_ret(Some(rg));

    let mut module = builder.finish();
    let err = InlinePass.run(&mut module).expect_err("mutual recursion");
    assert!(matches!(err, PassError::RecursionDetected { .. }));
}

// ------------------------------------------------------------------
// 7. Callee constants are re-materialized in the caller
// ------------------------------------------------------------------
#[test]
fn test_callee_constants_materialize_in_caller() {
    let mut builder = IrBuilder::new("m");
    let i32_ty = IrType::Int(32);

    let (callee, cargs) = builder.begin_function("addk", &[("x", i32_ty.clone())], i32_ty.clone());
    let k = builder.get_int32(41);
    let sum = builder.create_binary(BinOp::Add, cargs[0], k);
    builder.create_ret(Some(sum));

    let (_, kargs) = builder.begin_function("kernel", &[("x", i32_ty.clone())], i32_ty);
    let r = builder.create_call(callee, vec![kargs[0]]).expect("call");
    builder.create_ret(Some(r));

    let mut module = builder.finish();
    run_inline(&mut module);

    let kernel = module.function_by_name("kernel").expect("kernel kept");
    let add = kernel
        .blocks()
        .iter()
        .flat_map(|b| b.instrs.iter())
        .find(|i| matches!(i, IrInstr::Binary { op: BinOp::Add, .. }))
        .expect("cloned add");
    // the cloned add's constant operand has a definition in the caller
    for op in add.operands() {
        assert!(
            kernel.value_def(op).is_some(),
            "operand {} has no caller definition",
            op
        );
    }
}
